//! Hex parsing for addresses, words and signatures.

use sale_types::{Address, Signature, Word};

use crate::bid::SealError;

fn decode(s: &str) -> Result<Vec<u8>, SealError> {
    hex::decode(s.trim_start_matches("0x")).map_err(|e| SealError::InvalidHex(e.to_string()))
}

fn decode_array<const N: usize>(s: &str) -> Result<[u8; N], SealError> {
    let bytes = decode(s)?;
    let got = bytes.len();
    bytes.try_into().map_err(|_| SealError::InvalidLength { expected: N, got })
}

pub fn parse_address(s: &str) -> Result<Address, SealError> {
    decode_array::<20>(s)
}

pub fn parse_word(s: &str) -> Result<Word, SealError> {
    decode_array::<32>(s)
}

pub fn parse_signature(s: &str) -> Result<Signature, SealError> {
    decode_array::<65>(s).map(Signature)
}

pub fn parse_bytes(s: &str) -> Result<Vec<u8>, SealError> {
    decode(s)
}

/// `0x`-prefixed lowercase hex.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}
