//! Endpoint string parsing
//!
//! The membership service registers servers in whatever form the member
//! announced itself with: `host:port`, a bare host, or a URL such as
//! `http://db1:8800/`. Only host and port are kept.

use crate::endpoint::EndpointSet;
use crate::error::{AddressErrorCause, AddressParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Port assumed when an endpoint does not carry one
pub const DEFAULT_PORT: u16 = 27017;

/// A member server's network address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ServerAddress {
    type Err = AddressParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let fail = |cause| AddressParseError::new(raw, cause);

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(fail(AddressErrorCause::Empty));
        }

        // Drop scheme, path/query/fragment and userinfo
        let without_scheme = match trimmed.split_once("://") {
            Some((_, rest)) => rest,
            None => trimmed,
        };
        let authority = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let authority = match authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => authority,
        };

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, rest) = bracketed
                .split_once(']')
                .ok_or_else(|| fail(AddressErrorCause::UnterminatedBracket))?;
            let port = match rest {
                "" => None,
                _ => Some(rest.strip_prefix(':').ok_or_else(|| {
                    fail(AddressErrorCause::TrailingCharacters(rest.to_string()))
                })?),
            };
            (host, port)
        } else if authority.matches(':').count() > 1 {
            // Bare IPv6 literal, no room for a port
            (authority, None)
        } else {
            match authority.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            }
        };

        if host.is_empty() {
            return Err(fail(AddressErrorCause::MissingHost));
        }

        let port = match port {
            None => DEFAULT_PORT,
            Some(value) => {
                let port = value.parse::<u16>().map_err(|source| {
                    fail(AddressErrorCause::InvalidPort {
                        value: value.to_string(),
                        source,
                    })
                })?;
                if port == 0 {
                    return Err(fail(AddressErrorCause::ZeroPort));
                }
                port
            }
        };

        Ok(ServerAddress::new(host, port))
    }
}

/// Convert every endpoint of a set into a `ServerAddress`
///
/// Stops at the first malformed endpoint; the caller gets either every
/// address or none.
pub fn parse_endpoints(endpoints: &EndpointSet) -> Result<Vec<ServerAddress>, AddressParseError> {
    endpoints.iter().map(ServerAddress::from_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<ServerAddress, AddressParseError> {
        raw.parse()
    }

    #[test]
    fn test_host_and_port() {
        assert_eq!(parse("host1:1000").unwrap(), ServerAddress::new("host1", 1000));
    }

    #[test]
    fn test_default_port() {
        assert_eq!(parse("db1").unwrap(), ServerAddress::new("db1", DEFAULT_PORT));
    }

    #[test]
    fn test_url_forms() {
        assert_eq!(
            parse("http://localhost:8800").unwrap(),
            ServerAddress::new("localhost", 8800)
        );
        assert_eq!(
            parse("mongodb://admin@db1:27018/orders?replicaSet=rs0").unwrap(),
            ServerAddress::new("db1", 27018)
        );
        assert_eq!(
            parse("https://db2/").unwrap(),
            ServerAddress::new("db2", DEFAULT_PORT)
        );
    }

    #[test]
    fn test_ipv6() {
        assert_eq!(parse("[::1]:27019").unwrap(), ServerAddress::new("::1", 27019));
        assert_eq!(parse("[fe80::1]").unwrap(), ServerAddress::new("fe80::1", DEFAULT_PORT));
        assert_eq!(parse("::1").unwrap(), ServerAddress::new("::1", DEFAULT_PORT));
        assert_eq!(ServerAddress::new("::1", 27019).to_string(), "[::1]:27019");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(parse("  host1:1000 ").unwrap(), ServerAddress::new("host1", 1000));
    }

    #[test]
    fn test_invalid_port() {
        let err = parse("host1:abc").unwrap_err();
        assert_eq!(err.endpoint, "host1:abc");
        assert!(matches!(err.cause, AddressErrorCause::InvalidPort { ref value, .. } if value == "abc"));

        let err = parse("host1:70000").unwrap_err();
        assert!(matches!(err.cause, AddressErrorCause::InvalidPort { .. }));

        let err = parse("host1:").unwrap_err();
        assert!(matches!(err.cause, AddressErrorCause::InvalidPort { .. }));
    }

    #[test]
    fn test_zero_port() {
        let err = parse("host1:0").unwrap_err();
        assert_eq!(err.cause, AddressErrorCause::ZeroPort);
    }

    #[test]
    fn test_missing_host() {
        assert_eq!(parse(":1000").unwrap_err().cause, AddressErrorCause::MissingHost);
        assert_eq!(parse("http://").unwrap_err().cause, AddressErrorCause::MissingHost);
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse("   ").unwrap_err().cause, AddressErrorCause::Empty);
    }

    #[test]
    fn test_bad_brackets() {
        assert_eq!(
            parse("[::1:27017").unwrap_err().cause,
            AddressErrorCause::UnterminatedBracket
        );
        assert_eq!(
            parse("[::1]x27017").unwrap_err().cause,
            AddressErrorCause::TrailingCharacters("x27017".to_string())
        );
    }

    #[test]
    fn test_error_message_names_endpoint() {
        let err = parse("host1:abc").unwrap_err();
        assert!(err.to_string().contains("host1:abc"));
    }

    #[test]
    fn test_parse_endpoints_all_or_nothing() {
        let good: EndpointSet = ["host1:1000", "host2:2000"].into_iter().collect();
        let addresses = parse_endpoints(&good).unwrap();
        assert_eq!(
            addresses,
            vec![ServerAddress::new("host1", 1000), ServerAddress::new("host2", 2000)]
        );

        let bad: EndpointSet = ["host1:1000", "host2:bad"].into_iter().collect();
        let err = parse_endpoints(&bad).unwrap_err();
        assert_eq!(err.endpoint, "host2:bad");
    }
}
