//! Checks for the custom scalars the gateway knows by name
//!
//! `IP`, `IPRange` and `MAC` are plain strings on the wire. Rejecting a bad
//! value here stops the request before the engine is called.

use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScalarError {
    #[error("invalid IP address '{0}'")]
    InvalidIp(String),

    #[error("invalid IPRange '{0}'")]
    InvalidIpRange(String),

    #[error("invalid MAC address '{0}'")]
    InvalidMac(String),
}

static MAC_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(?::[0-9A-Fa-f]{2})*$").expect("valid MAC regex")
});
static MAC_HYPHEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(?:-[0-9A-Fa-f]{2})*$").expect("valid MAC regex")
});
static MAC_DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{4}(?:\.[0-9A-Fa-f]{4})*$").expect("valid MAC regex")
});

/// Validate `value` if `type_name` is a custom scalar with known rules
///
/// Unknown scalar names always pass.
pub fn validate(type_name: &str, value: &str) -> Result<(), ScalarError> {
    match type_name {
        "IP" => validate_ip(value),
        "IPRange" => validate_ip_range(value),
        "MAC" => validate_mac(value),
        _ => Ok(()),
    }
}

/// An empty string or a single IPv4/IPv6 address
pub fn validate_ip(value: &str) -> Result<(), ScalarError> {
    if value.is_empty() || value.parse::<IpAddr>().is_ok() {
        Ok(())
    } else {
        Err(ScalarError::InvalidIp(value.to_string()))
    }
}

/// One address, or two addresses joined by `-`
///
/// The two ends are not compared.
pub fn validate_ip_range(value: &str) -> Result<(), ScalarError> {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() > 2 || parts.iter().any(|ip| ip.parse::<IpAddr>().is_err()) {
        return Err(ScalarError::InvalidIpRange(value.to_string()));
    }
    Ok(())
}

/// An empty string or an EUI-48, EUI-64 or 20-octet IP-over-InfiniBand address
pub fn validate_mac(value: &str) -> Result<(), ScalarError> {
    if value.is_empty() {
        return Ok(());
    }

    let valid = if MAC_COLON.is_match(value) || MAC_HYPHEN.is_match(value) {
        let octets = (value.len() + 1) / 3;
        matches!(octets, 6 | 8 | 20)
    } else if MAC_DOTTED.is_match(value) {
        let groups = (value.len() + 1) / 5;
        matches!(groups, 3 | 4 | 10)
    } else {
        false
    };

    if valid {
        Ok(())
    } else {
        Err(ScalarError::InvalidMac(value.to_string()))
    }
}
