use x509_parser::prelude::*;

use super::parser::name_serial_number;

/// Determines which certificate issued the one at `position` in `certs`
pub trait IssuerStrategy {
    /// `None` means no issuer could be identified among `certs`
    fn issuer_of<'s, 'a>(
        &self,
        certs: &'s [X509Certificate<'a>],
        position: usize,
    ) -> Option<&'s X509Certificate<'a>>;
}

/// Chains already validated by the TLS layer, ordered leaf to root
///
/// The issuer is the next element; the last element issued itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifiedChainIssuer;

impl IssuerStrategy for VerifiedChainIssuer {
    fn issuer_of<'s, 'a>(
        &self,
        certs: &'s [X509Certificate<'a>],
        position: usize,
    ) -> Option<&'s X509Certificate<'a>> {
        certs.get(position + 1).or_else(|| certs.get(position))
    }
}

/// Unordered, unverified peer certificates, searched by subject name
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectMatchIssuer;

impl IssuerStrategy for SubjectMatchIssuer {
    fn issuer_of<'s, 'a>(
        &self,
        certs: &'s [X509Certificate<'a>],
        position: usize,
    ) -> Option<&'s X509Certificate<'a>> {
        let target = certs.get(position)?;
        find_issuer(target.issuer(), certs)
    }
}

/// Find the candidate whose subject matches `issuer`
///
/// When both names carry a serialNumber attribute only those are compared.
/// Otherwise the full subject strings must be equal. A serialNumber match
/// always wins over a string match.
pub fn find_issuer<'s, 'a>(
    issuer: &X509Name<'_>,
    candidates: &'s [X509Certificate<'a>],
) -> Option<&'s X509Certificate<'a>> {
    let wanted_serial = name_serial_number(issuer);

    if !wanted_serial.is_empty() {
        let by_serial = candidates.iter().find(|candidate| {
            let serial = name_serial_number(candidate.subject());
            !serial.is_empty() && serial == wanted_serial
        });
        if by_serial.is_some() {
            return by_serial;
        }
    }

    let wanted = issuer.to_string();
    candidates.iter().find(|candidate| {
        let serial = name_serial_number(candidate.subject());
        (serial.is_empty() || wanted_serial.is_empty()) && candidate.subject().to_string() == wanted
    })
}
