//! Fixed-width ledger primitives: account addresses and transaction hashes.
//!
//! Both render as `0x`-prefixed lowercase hex and serialize as that string.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A 20-byte ledger account address.
///
/// The all-zero address is the sentinel "unowned" value in ownership tables;
/// no real account ever has it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
  /// The sentinel unowned value.
  pub const ZERO: Address = Address([0u8; 20]);

  pub fn is_zero(&self) -> bool {
    *self == Self::ZERO
  }

  pub fn as_bytes(&self) -> &[u8; 20] {
    &self.0
  }
}

impl fmt::Display for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl fmt::Debug for Address {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    decode_fixed::<20>(s)
      .map(Address)
      .ok_or_else(|| Error::InvalidAddress(s.to_string()))
  }
}

impl Serialize for Address {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Address {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }
}

impl fmt::Display for TxHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl fmt::Debug for TxHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

impl FromStr for TxHash {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    decode_fixed::<32>(s)
      .map(TxHash)
      .ok_or_else(|| Error::InvalidTxHash(s.to_string()))
  }
}

impl Serialize for TxHash {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for TxHash {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

/// Decode a hex token (with or without `0x`) into exactly `N` bytes.
fn decode_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
  let stripped = s.strip_prefix("0x").unwrap_or(s);
  let bytes = hex::decode(stripped).ok()?;
  bytes.try_into().ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn address_display_round_trips() {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xde;
    bytes[19] = 0x01;
    let address = Address(bytes);

    let rendered = address.to_string();
    assert!(rendered.starts_with("0x"));
    assert_eq!(rendered.len(), 42);
    assert_eq!(rendered.parse::<Address>().unwrap(), address);
  }

  #[test]
  fn address_parse_accepts_bare_hex() {
    let with_prefix: Address =
      "0x00000000000000000000000000000000000000ff".parse().unwrap();
    let bare: Address =
      "00000000000000000000000000000000000000ff".parse().unwrap();
    assert_eq!(with_prefix, bare);
  }

  #[test]
  fn address_parse_rejects_bad_tokens() {
    assert!("0x1234".parse::<Address>().is_err());
    assert!(
      "0xzz000000000000000000000000000000000000zz"
        .parse::<Address>()
        .is_err()
    );
    assert!("".parse::<Address>().is_err());
  }

  #[test]
  fn zero_is_the_sentinel() {
    assert!(Address::ZERO.is_zero());
    let real: Address =
      "0x0000000000000000000000000000000000000001".parse().unwrap();
    assert!(!real.is_zero());
  }

  #[test]
  fn address_serde_is_the_hex_string() {
    let address: Address =
      "0x00000000000000000000000000000000000000ab".parse().unwrap();
    let json = serde_json::to_string(&address).unwrap();
    assert_eq!(json, "\"0x00000000000000000000000000000000000000ab\"");
    let back: Address = serde_json::from_str(&json).unwrap();
    assert_eq!(back, address);
  }

  #[test]
  fn tx_hash_round_trips() {
    let mut bytes = [0u8; 32];
    bytes[31] = 0x2a;
    let hash = TxHash(bytes);
    assert_eq!(hash.to_string().len(), 66);
    assert_eq!(hash.to_string().parse::<TxHash>().unwrap(), hash);
    assert!("0xbeef".parse::<TxHash>().is_err());
  }
}
