use tracing::debug;
use x509_parser::extensions::{DistributionPointName, GeneralName, ParsedExtension};
use x509_parser::pem::{Pem, parse_x509_pem};
use x509_parser::prelude::*;

use super::errors::{CrlError, CrlResult};
use super::types::RevocationList;

/// Decode a PEM-wrapped CRL into a [`RevocationList`]
///
/// Only the first PEM block is considered.
pub fn parse_pem_crl(data: &[u8]) -> CrlResult<RevocationList> {
    let (_, pem) = parse_x509_pem(data)
        .map_err(|e| CrlError::Parse(format!("no PEM block found: {e}")))?;
    RevocationList::from_der(pem.contents)
}

/// DER contents of every CERTIFICATE block in a PEM bundle, in file order
pub fn parse_pem_certificates(data: &[u8]) -> CrlResult<Vec<Vec<u8>>> {
    let mut ders = Vec::new();
    for pem in Pem::iter_from_buffer(data) {
        let pem = pem.map_err(|e| CrlError::Parse(format!("invalid PEM block: {e:?}")))?;
        if pem.label == "CERTIFICATE" {
            ders.push(pem.contents);
        }
    }
    Ok(ders)
}

/// First URI of the CRL Distribution Points extension (OID: 2.5.29.31)
pub fn distribution_point(cert: &X509Certificate<'_>) -> Option<String> {
    for ext in cert.extensions() {
        let ParsedExtension::CRLDistributionPoints(points) = ext.parsed_extension() else {
            continue;
        };

        for point in points.iter() {
            let Some(DistributionPointName::FullName(names)) = &point.distribution_point else {
                continue;
            };
            if let Some(uri) = names.iter().find_map(|name| match name {
                GeneralName::URI(uri) => Some(*uri),
                _ => None,
            }) {
                debug!("Found CRL distribution point: {}", uri);
                return Some(uri.to_string());
            }
        }
    }

    None
}

/// Value of the serialNumber attribute (OID: 2.5.4.5) of a distinguished name
///
/// Empty when the attribute is absent or not a string.
pub fn name_serial_number<'a>(name: &'a X509Name<'_>) -> &'a str {
    name.iter_attributes()
        .find(|attr| attr.attr_type().to_id_string() == "2.5.4.5")
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or_default()
}
