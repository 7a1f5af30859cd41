//! Account address text form.
//!
//! `lat_` + base32(account key, 52 chars) + base32(checksum, 8 chars), where
//! the checksum is the first 5 bytes of Blake2b-256(account key). The
//! alphabet `13456789abcdefghijkmnopqrstuwxyz` leaves out look-alike
//! characters. Total length: 4 + 52 + 8 = 64 characters.

use lattice_types::Account;

const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const PREFIX: &str = "lat_";
const KEY_CHARS: usize = 52;
const CHECKSUM_CHARS: usize = 8;

fn encode_base32(bytes: &[u8]) -> String {
    let total_bits = bytes.len() * 8;
    let num_chars = total_bits.div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits_in_buffer += 8;
        while bits_in_buffer >= 5 {
            bits_in_buffer -= 5;
            let idx = ((buffer >> bits_in_buffer) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
    }
    // Remaining bits (padded with zeros on the right).
    if bits_in_buffer > 0 {
        let idx = ((buffer << (5 - bits_in_buffer)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

/// Decode into exactly `N` bytes; `None` on a bad character or short input.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits_in_buffer = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits_in_buffer += 5;
        if bits_in_buffer >= 8 {
            bits_in_buffer -= 8;
            if pos < N {
                result[pos] = (buffer >> bits_in_buffer) as u8;
                pos += 1;
            }
        }
    }

    if pos < N {
        return None;
    }
    Some(result)
}

/// Render an account as its `lat_` address.
pub fn encode_account(account: &Account) -> String {
    let checksum = crate::blake2b_256(account.as_bytes());
    format!(
        "{}{}{}",
        PREFIX,
        encode_base32(account.as_bytes()),
        encode_base32(&checksum[..5])
    )
}

/// Parse a `lat_` address, verifying its checksum.
pub fn decode_account(address: &str) -> Option<Account> {
    let encoded = address.strip_prefix(PREFIX)?;
    if encoded.len() != KEY_CHARS + CHECKSUM_CHARS {
        return None;
    }
    let (key_part, checksum_part) = encoded.split_at(KEY_CHARS);
    let key: [u8; 32] = decode_base32_fixed(key_part)?;
    let checksum: [u8; 5] = decode_base32_fixed(checksum_part)?;
    if checksum != crate::blake2b_256(&key)[..5] {
        return None;
    }
    Some(Account::new(key))
}

pub fn validate_address(address: &str) -> bool {
    decode_account(address).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_round_trip() {
        let account = Account::new([0x5A; 32]);
        let address = encode_account(&account);
        assert!(address.starts_with("lat_"));
        assert_eq!(address.len(), 64);
        assert_eq!(decode_account(&address), Some(account));
    }

    #[test]
    fn burn_account_has_an_address() {
        let address = encode_account(&Account::ZERO);
        assert_eq!(decode_account(&address), Some(Account::ZERO));
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let mut address = encode_account(&Account::new([7; 32]));
        let last = address.pop().unwrap();
        address.push(if last == '1' { '3' } else { '1' });
        assert!(!validate_address(&address));
    }

    #[test]
    fn wrong_prefix_or_length_rejected() {
        let address = encode_account(&Account::new([7; 32]));
        assert!(!validate_address(&address.replacen("lat_", "xrb_", 1)));
        assert!(!validate_address("lat_tooshort"));
        assert!(!validate_address(""));
    }
}
