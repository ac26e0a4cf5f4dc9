//! `[inet]` and the bare address form used inside `[reason map]`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};

fn require(buf: &impl Buf, needed: usize) -> Result<()> {
    let available = buf.remaining();
    if available < needed {
        return Err(ProtocolError::ShortRead {
            needed: needed - available,
            available,
        });
    }
    Ok(())
}

/// Read a bare address: `[byte] addrlen` (4 or 16) then `addrlen` raw
/// bytes. Used by `[reason map]`, which carries no port.
pub(crate) fn read_addr(buf: &mut impl Buf) -> Result<IpAddr> {
    require(buf, 1)?;
    let addr_len = buf.get_u8();
    match addr_len {
        4 => {
            require(buf, 4)?;
            let mut octets = [0u8; 4];
            buf.copy_to_slice(&mut octets);
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            require(buf, 16)?;
            let mut octets = [0u8; 16];
            buf.copy_to_slice(&mut octets);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        other => Err(ProtocolError::precondition(
            "inet.addrlen",
            format!("expected 4 or 16, got {other}"),
        )),
    }
}

/// Write a bare address (no port).
pub(crate) fn write_addr(buf: &mut impl BufMut, addr: IpAddr) {
    match addr {
        IpAddr::V4(v4) => {
            buf.put_u8(4);
            buf.put_slice(&v4.octets());
        }
        IpAddr::V6(v6) => {
            buf.put_u8(16);
            buf.put_slice(&v6.octets());
        }
    }
}

/// Byte length of a bare address.
pub(crate) fn encoded_len_addr(addr: IpAddr) -> usize {
    1 + match addr {
        IpAddr::V4(_) => 4,
        IpAddr::V6(_) => 16,
    }
}

/// `[inet]`: `[byte] addrlen`, `addrlen` raw bytes, `[int] port`.
pub fn read_inet(buf: &mut impl Buf) -> Result<(IpAddr, i32)> {
    let addr = read_addr(buf)?;
    require(buf, 4)?;
    let port = buf.get_i32();
    Ok((addr, port))
}

/// Encode an `[inet]`.
pub fn write_inet(buf: &mut impl BufMut, addr: IpAddr, port: i32) {
    write_addr(buf, addr);
    buf.put_i32(port);
}

/// Byte length of an encoded `[inet]`.
pub fn encoded_len_inet(addr: IpAddr) -> usize {
    encoded_len_addr(addr) + 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_round_trips() {
        let mut buf = Vec::new();
        let addr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        write_inet(&mut buf, addr, 9042);
        assert_eq!(encoded_len_inet(addr), buf.len());
        let mut slice = &buf[..];
        assert_eq!(read_inet(&mut slice).unwrap(), (addr, 9042));
    }

    #[test]
    fn ipv6_round_trips() {
        let mut buf = Vec::new();
        let addr = IpAddr::V6(Ipv6Addr::LOCALHOST);
        write_inet(&mut buf, addr, 9042);
        let mut slice = &buf[..];
        assert_eq!(read_inet(&mut slice).unwrap(), (addr, 9042));
    }

    #[test]
    fn invalid_addr_len_is_rejected() {
        let bytes = [6u8, 0, 0, 0, 0, 0, 0];
        let mut slice = &bytes[..];
        assert!(read_addr(&mut slice).is_err());
    }
}
