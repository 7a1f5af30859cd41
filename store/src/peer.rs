//! Persistent peer cache: endpoint -> last-seen time.
//!
//! Endpoints are stored as IPv6 (IPv4 mapped) address bytes followed by the
//! big-endian port.

use std::net::{Ipv6Addr, SocketAddrV6};

use lattice_types::Timestamp;

use crate::record::fixed;
use crate::{ReadTxn, StoreError, Table, WriteTxn};

fn endpoint_key(endpoint: &SocketAddrV6) -> [u8; 18] {
    let mut key = [0u8; 18];
    key[..16].copy_from_slice(&endpoint.ip().octets());
    key[16..].copy_from_slice(&endpoint.port().to_be_bytes());
    key
}

fn endpoint_from_key(bytes: &[u8]) -> Result<SocketAddrV6, StoreError> {
    let key: [u8; 18] = fixed(bytes, "peer endpoint")?;
    let mut ip = [0u8; 16];
    ip.copy_from_slice(&key[..16]);
    let port = u16::from_be_bytes([key[16], key[17]]);
    Ok(SocketAddrV6::new(Ipv6Addr::from(ip), port, 0, 0))
}

pub trait PeerStore: ReadTxn {
    fn peers_all(&self) -> Result<Vec<(SocketAddrV6, Timestamp)>, StoreError> {
        self.iter(Table::Peers)?
            .map(|entry| {
                let (key, value) = entry?;
                let seen = u64::from_be_bytes(fixed(&value, "peer timestamp")?);
                Ok((endpoint_from_key(&key)?, Timestamp::new(seen)))
            })
            .collect()
    }

    fn peer_count(&self) -> Result<u64, StoreError> {
        self.count(Table::Peers)
    }
}

impl<T: ReadTxn + ?Sized> PeerStore for T {}

pub trait PeerStoreMut: WriteTxn {
    fn peer_put(&mut self, endpoint: &SocketAddrV6, seen: Timestamp) -> Result<(), StoreError> {
        self.put(
            Table::Peers,
            &endpoint_key(endpoint),
            &seen.as_secs().to_be_bytes(),
        )
    }
}

impl<T: WriteTxn + ?Sized> PeerStoreMut for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_key_round_trip() {
        let endpoint = SocketAddrV6::new(Ipv6Addr::LOCALHOST, 7075, 0, 0);
        let key = endpoint_key(&endpoint);
        assert_eq!(endpoint_from_key(&key).unwrap(), endpoint);
        assert!(endpoint_from_key(&key[..17]).is_err());
    }
}
