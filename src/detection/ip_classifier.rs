//! RFC 1918 address classification

use std::net::IpAddr;

/// Whether `address` is inside 10.0.0.0/8, 172.16.0.0/12 or 192.168.0.0/16.
///
/// Anything that does not parse as an IP address, and every IPv6 address,
/// is treated as external so it still gets flagged.
pub fn is_internal(address: &str) -> bool {
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private(),
        Ok(IpAddr::V6(_)) => false,
        Err(_) => {
            log::debug!("Unparseable IP address {:?}, treating as external", address);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_ranges() {
        for ip in [
            "10.0.0.1",
            "10.255.255.255",
            "172.16.0.1",
            "172.31.255.254",
            "192.168.0.1",
            "192.168.255.255",
        ] {
            assert!(is_internal(ip), "{} should be internal", ip);
        }
    }

    #[test]
    fn test_range_boundaries() {
        assert!(!is_internal("172.15.255.255"));
        assert!(!is_internal("172.32.0.0"));
        assert!(!is_internal("11.0.0.1"));
        assert!(!is_internal("192.169.0.1"));
    }

    #[test]
    fn test_public_ip() {
        assert!(!is_internal("8.8.8.8"));
        assert!(!is_internal("1.1.1.1"));
    }

    #[test]
    fn test_malformed_is_external() {
        assert!(!is_internal("not-an-ip"));
        assert!(!is_internal("300.1.1.1"));
        assert!(!is_internal(""));
    }

    #[test]
    fn test_ipv6_is_external() {
        assert!(!is_internal("2001:db8::1"));
        assert!(!is_internal("::ffff:10.0.0.1"));
    }
}
