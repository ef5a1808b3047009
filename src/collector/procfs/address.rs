//! Decoding of kernel socket table endpoints.
//!
//! `/proc/net/{tcp,udp}[6]` print endpoints as `ADDR:PORT` in hex. The
//! address is the raw `in_addr`/`in6_addr` dumped as host-order 32-bit
//! words (little-endian on every supported target); the port is plain hex.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::model::{Address, ConnectionStatus};

/// Decodes an `ADDR:PORT` token.
///
/// Malformed tokens decode to `0.0.0.0:0` instead of failing.
pub fn parse_endpoint(token: &str) -> Address {
    decode_endpoint(token)
        .map(|(ip, port)| Address::new(ip.to_string(), port))
        .unwrap_or_else(Address::unspecified)
}

/// Decodes a remote endpoint; the all-zero endpoint of an unconnected
/// socket yields `None`.
pub fn parse_remote_endpoint(token: &str) -> Option<Address> {
    match decode_endpoint(token) {
        Some((ip, 0)) if ip.is_unspecified() => None,
        Some((ip, port)) => Some(Address::new(ip.to_string(), port)),
        None => Some(Address::unspecified()),
    }
}

fn decode_endpoint(token: &str) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = token.split_once(':')?;
    if !addr_hex.bytes().all(|b| b.is_ascii_hexdigit())
        || !port_hex.bytes().all(|b| b.is_ascii_hexdigit())
        || port_hex.len() != 4
    {
        return None;
    }

    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let ip = match addr_hex.len() {
        8 => IpAddr::V4(parse_ipv4(addr_hex)?),
        32 => IpAddr::V6(parse_ipv6(addr_hex)?),
        _ => return None,
    };
    Some((ip, port))
}

fn parse_ipv4(addr_hex: &str) -> Option<Ipv4Addr> {
    let raw = u32::from_str_radix(addr_hex, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}

fn parse_ipv6(addr_hex: &str) -> Option<Ipv6Addr> {
    let mut bytes = [0u8; 16];
    for (i, chunk) in bytes.chunks_exact_mut(4).enumerate() {
        let word = u32::from_str_radix(&addr_hex[i * 8..i * 8 + 8], 16).ok()?;
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    Some(Ipv6Addr::from(bytes))
}

/// Maps the two-digit hex TCP state of a socket table row.
pub fn tcp_status(code: &str) -> ConnectionStatus {
    if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
        return ConnectionStatus::Unknown;
    }
    match u8::from_str_radix(code, 16) {
        Ok(0x01) => ConnectionStatus::Established,
        Ok(0x02) => ConnectionStatus::SynSent,
        Ok(0x03) => ConnectionStatus::SynRecv,
        Ok(0x04) => ConnectionStatus::FinWait1,
        Ok(0x05) => ConnectionStatus::FinWait2,
        Ok(0x06) => ConnectionStatus::TimeWait,
        Ok(0x07) => ConnectionStatus::Close,
        Ok(0x08) => ConnectionStatus::CloseWait,
        Ok(0x09) => ConnectionStatus::LastAck,
        Ok(0x0A) => ConnectionStatus::Listen,
        Ok(0x0B) => ConnectionStatus::Closing,
        Ok(0x0C) => ConnectionStatus::NewSynRecv,
        _ => ConnectionStatus::Unknown,
    }
}
