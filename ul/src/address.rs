//! Addresses to nodes in DICOM networks.
//!
//! An [`AeAddr`] couples a network address with an optional
//! application entity (AE) title.
//! The syntax is `«ae_title»@«network_address»:«port»`,
//! where the AE title part may be left out.
//! This works with IPv4 and IPv6 addresses as well as domain names.
use std::{
    fmt,
    net::{SocketAddr, ToSocketAddrs},
    str::FromStr,
};

use snafu::{ensure, Snafu};

/// A error which occurred when parsing an AE address.
#[derive(Debug, Clone, Eq, PartialEq, Snafu)]
pub enum ParseAeAddressError {
    /// Empty AE title before `@`
    EmptyAeTitle,

    /// AE title longer than 16 characters
    AeTitleTooLong,

    #[snafu(display("Missing port in network address `{}`", address))]
    MissingPort { address: String },
}

/// A network address to a DICOM node,
/// with an optional AE title.
///
/// # Example
///
/// ```
/// # use dcm_ul::AeAddr;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let addr: AeAddr = "STORE-SCP@127.0.0.1:104".parse()?;
/// assert_eq!(addr.ae_title(), Some("STORE-SCP"));
/// assert_eq!(addr.socket_addr(), "127.0.0.1:104");
///
/// let addr: AeAddr = "pacs.local:11112".parse()?;
/// assert_eq!(addr.ae_title(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AeAddr {
    ae_title: Option<String>,
    socket_addr: String,
}

impl AeAddr {
    /// Create an AE address from its constituent parts.
    pub fn new(ae_title: Option<String>, socket_addr: impl Into<String>) -> Self {
        AeAddr {
            ae_title,
            socket_addr: socket_addr.into(),
        }
    }

    /// Retrieve the application entity title portion, if any.
    pub fn ae_title(&self) -> Option<&str> {
        self.ae_title.as_deref()
    }

    /// Retrieve the network address portion.
    pub fn socket_addr(&self) -> &str {
        &self.socket_addr
    }

    pub fn into_parts(self) -> (Option<String>, String) {
        (self.ae_title, self.socket_addr)
    }
}

impl FromStr for AeAddr {
    type Err = ParseAeAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ae_title, address) = match s.split_once('@') {
            Some((ae_title, address)) => {
                ensure!(!ae_title.is_empty(), EmptyAeTitleSnafu);
                ensure!(ae_title.len() <= 16, AeTitleTooLongSnafu);
                (Some(ae_title.to_string()), address)
            }
            None => (None, s),
        };
        let has_port = address
            .rsplit_once(':')
            .map(|(_, port)| port.parse::<u16>().is_ok())
            .unwrap_or(false);
        ensure!(has_port, MissingPortSnafu { address });
        Ok(AeAddr::new(ae_title, address))
    }
}

impl ToSocketAddrs for AeAddr {
    type Iter = std::vec::IntoIter<SocketAddr>;

    fn to_socket_addrs(&self) -> std::io::Result<Self::Iter> {
        self.socket_addr.to_socket_addrs()
    }
}

impl fmt::Display for AeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ae_title) = &self.ae_title {
            write!(f, "{}@", ae_title)?;
        }
        f.write_str(&self.socket_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parse_ae_address() {
        let addr: AeAddr = "SCP-STORAGE@127.0.0.1:104".parse().unwrap();
        assert_eq!(addr.ae_title(), Some("SCP-STORAGE"));
        assert_eq!(addr.socket_addr(), "127.0.0.1:104");
        assert_eq!(addr.to_string(), "SCP-STORAGE@127.0.0.1:104");

        let addr: AeAddr = "[::1]:11112".parse().unwrap();
        assert_eq!(addr.ae_title(), None);
        assert_eq!(addr.to_string(), "[::1]:11112");
        let resolved: Vec<_> = addr.to_socket_addrs().unwrap().collect();
        assert_eq!(resolved[0].port(), 11112);
    }

    #[rstest]
    #[case("@127.0.0.1:104", ParseAeAddressError::EmptyAeTitle)]
    #[case("THIS-TITLE-IS-TOO-LONG@127.0.0.1:104", ParseAeAddressError::AeTitleTooLong)]
    #[case("SCP@localhost", ParseAeAddressError::MissingPort { address: "localhost".into() })]
    #[case("pacs:dicom", ParseAeAddressError::MissingPort { address: "pacs:dicom".into() })]
    fn bad_ae_addresses(#[case] input: &str, #[case] expected: ParseAeAddressError) {
        assert_eq!(input.parse::<AeAddr>(), Err(expected));
    }
}
