//! Just enough Solidity ABI to drive the registry contract.
//!
//! Two functions are involved: `adopt(uint256)` and `getAdopters()`. The
//! latter returns a static address array, which encodes as exactly one
//! 32-byte word per slot with the address right-aligned in its word.

use rehome_core::{Error, Result, address::Address, catalog::ItemId};
use sha3::{Digest, Keccak256};

const WORD: usize = 32;
/// An address occupies the low 20 bytes of its word; the rest is padding.
const ADDRESS_OFFSET: usize = WORD - 20;

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
  let digest = Keccak256::digest(signature.as_bytes());
  let mut out = [0u8; 4];
  out.copy_from_slice(&digest[..4]);
  out
}

/// Calldata for `getAdopters()`.
pub fn encode_get_adopters() -> Vec<u8> {
  selector("getAdopters()").to_vec()
}

/// Calldata for `adopt(uint256)`.
pub fn encode_adopt(item_id: ItemId) -> Vec<u8> {
  let mut data = selector("adopt(uint256)").to_vec();
  let mut word = [0u8; WORD];
  word[WORD - 8..].copy_from_slice(&u64::from(item_id).to_be_bytes());
  data.extend_from_slice(&word);
  data
}

/// Decode the return of `getAdopters()` into a positional owner table of
/// exactly `len` entries. Anything but `len` clean address words is a
/// malformed response.
pub fn decode_address_table(data: &[u8], len: usize) -> Result<Vec<Address>> {
  if data.len() != len * WORD {
    return Err(Error::MalformedResponse(format!(
      "owner table is {} bytes, expected {} for {len} entries",
      data.len(),
      len * WORD,
    )));
  }
  let mut table = Vec::with_capacity(len);
  for word in data.chunks_exact(WORD) {
    if word[..ADDRESS_OFFSET].iter().any(|b| *b != 0) {
      return Err(Error::MalformedResponse(
        "address word carries non-zero padding".to_string(),
      ));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[ADDRESS_OFFSET..]);
    table.push(Address(bytes));
  }
  Ok(table)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
