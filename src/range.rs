use anyhow::Result;
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::DhcpError;

/// Advisory outcome of a pool range check. Failed checks are values rather
/// than errors so UI/API consumers can render them without unwinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeCheck {
    Valid,
    StartAfterEnd,
    OutsideSubnet {
        addr: Ipv4Addr,
        network: Ipv4Net,
        lower: Ipv4Addr,
        upper: Ipv4Addr,
    },
}

impl RangeCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, RangeCheck::Valid)
    }
}

impl fmt::Display for RangeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeCheck::Valid => write!(f, "Valid IP range."),
            RangeCheck::StartAfterEnd => write!(f, "First IP must come before last IP!"),
            RangeCheck::OutsideSubnet {
                addr,
                network,
                lower,
                upper,
            } => write!(
                f,
                "{addr} is outside parent subnet {network}. Addresses in this pool \
                 must come from the range {lower}-{upper}."
            ),
        }
    }
}

/// Check that a proposed pool range is ordered and lies within the parent
/// subnet's inclusive [network, broadcast] span. Checks short-circuit in that
/// order. Pure arithmetic; the only error is a prefix length over 32.
pub fn validate_pool_range(
    subnet_addr: Ipv4Addr,
    prefix: u8,
    start: Ipv4Addr,
    end: Ipv4Addr,
) -> Result<RangeCheck> {
    let network =
        Ipv4Net::new(subnet_addr, prefix).map_err(|_| DhcpError::InvalidPrefix(prefix))?;
    let lower = network.network();
    let upper = network.broadcast();

    if start > end {
        return Ok(RangeCheck::StartAfterEnd);
    }

    for addr in [start, end] {
        if addr < lower || addr > upper {
            return Ok(RangeCheck::OutsideSubnet {
                addr,
                network: network.trunc(),
                lower,
                upper,
            });
        }
    }

    Ok(RangeCheck::Valid)
}

/// Parse the `range` attribute wire format: two dotted quads separated by a
/// single space, e.g. `"10.0.0.5 10.0.0.10"`.
pub fn parse_range(range: &str) -> Result<(Ipv4Addr, Ipv4Addr)> {
    let mut parts = range.split(' ');
    let (Some(first), Some(last), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DhcpError::InvalidRange(range.to_string()).into());
    };

    let start = Ipv4Addr::from_str(first)
        .map_err(|_| DhcpError::InvalidIpAddress(first.to_string()))?;
    let end =
        Ipv4Addr::from_str(last).map_err(|_| DhcpError::InvalidIpAddress(last.to_string()))?;

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        Ipv4Addr::from_str(s).unwrap()
    }

    #[test]
    fn test_valid_range() {
        let check =
            validate_pool_range(ip("10.0.0.0"), 24, ip("10.0.0.5"), ip("10.0.0.10")).unwrap();
        assert_eq!(check, RangeCheck::Valid);
        assert_eq!(check.to_string(), "Valid IP range.");
    }

    #[test]
    fn test_start_after_end() {
        let check =
            validate_pool_range(ip("10.0.0.0"), 24, ip("10.0.0.10"), ip("10.0.0.5")).unwrap();
        assert_eq!(check, RangeCheck::StartAfterEnd);
    }

    #[test]
    fn test_outside_subnet() {
        let check =
            validate_pool_range(ip("10.0.0.0"), 24, ip("10.0.1.5"), ip("10.0.1.10")).unwrap();
        match &check {
            RangeCheck::OutsideSubnet { addr, lower, upper, .. } => {
                // First offending address is reported.
                assert_eq!(*addr, ip("10.0.1.5"));
                assert_eq!(*lower, ip("10.0.0.0"));
                assert_eq!(*upper, ip("10.0.0.255"));
            }
            other => panic!("expected OutsideSubnet, got {other:?}"),
        }
        assert!(check.to_string().contains("outside parent subnet 10.0.0.0/24"));
        assert!(check.to_string().contains("10.0.0.0-10.0.0.255"));
    }

    #[test]
    fn test_end_outside_subnet() {
        let check =
            validate_pool_range(ip("10.0.0.0"), 24, ip("10.0.0.250"), ip("10.0.1.2")).unwrap();
        assert!(matches!(
            check,
            RangeCheck::OutsideSubnet { addr, .. } if addr == ip("10.0.1.2")
        ));
    }

    #[test]
    fn test_order_check_runs_first() {
        // Both addresses are outside the subnet, but the ordering failure
        // short-circuits ahead of the bounds check.
        let check =
            validate_pool_range(ip("10.0.0.0"), 24, ip("10.0.1.10"), ip("10.0.1.5")).unwrap();
        assert_eq!(check, RangeCheck::StartAfterEnd);
    }

    #[test]
    fn test_inclusive_bounds() {
        let check =
            validate_pool_range(ip("192.168.1.0"), 24, ip("192.168.1.0"), ip("192.168.1.255"))
                .unwrap();
        assert_eq!(check, RangeCheck::Valid);
    }

    #[test]
    fn test_invalid_prefix() {
        let err =
            validate_pool_range(ip("10.0.0.0"), 33, ip("10.0.0.1"), ip("10.0.0.2")).unwrap_err();
        let err = err.downcast_ref::<DhcpError>().unwrap();
        assert!(matches!(err, DhcpError::InvalidPrefix(33)));
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_range("10.0.0.5 10.0.0.10").unwrap(),
            (ip("10.0.0.5"), ip("10.0.0.10"))
        );
        assert!(parse_range("10.0.0.5").is_err());
        assert!(parse_range("10.0.0.5 10.0.0.10 10.0.0.20").is_err());
        assert!(parse_range("10.0.0.5 not-an-ip").is_err());
    }
}
