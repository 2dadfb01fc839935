//! Byte order representation for multi-register meter values

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::MeterError;

/// Byte/word order of 16/32/64-bit register values
///
/// # Naming Convention
/// Uses ABCD notation where:
/// - A = Most significant byte (MSB)
/// - D = Least significant byte (LSB)
///
/// For 32-bit value `0x12345678` the registers on the wire read:
/// - `BigEndian (ABCD)`: [0x1234, 0x5678]
/// - `LittleEndian (DCBA)`: [0x7856, 0x3412]
/// - `BigEndianSwap (CDAB)`: [0x5678, 0x1234] (word swapped, common on meters)
/// - `LittleEndianSwap (BADC)`: [0x3412, 0x7856]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
    /// Big-endian: ABCD (most significant byte first)
    ///
    /// Modbus standard register order.
    #[default]
    BigEndian,

    /// Little-endian: DCBA (least significant byte first)
    LittleEndian,

    /// Big-endian with swapped words: CDAB
    ///
    /// Low word first, each word big-endian.
    BigEndianSwap,

    /// Little-endian with swapped words: BADC
    ///
    /// Rare, but exists in some devices.
    LittleEndianSwap,
}

impl ByteOrder {
    /// ABCD code of this order
    pub fn code(&self) -> &'static str {
        match self {
            Self::BigEndian => "ABCD",
            Self::LittleEndian => "DCBA",
            Self::BigEndianSwap => "CDAB",
            Self::LittleEndianSwap => "BADC",
        }
    }

    /// Get descriptive name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigEndian => "ABCD (Big-Endian)",
            Self::LittleEndian => "DCBA (Little-Endian)",
            Self::BigEndianSwap => "CDAB (Big-Endian Swap)",
            Self::LittleEndianSwap => "BADC (Little-Endian Swap)",
        }
    }

    /// Check if bytes inside each register are swapped
    pub fn has_byte_swap(&self) -> bool {
        matches!(self, Self::LittleEndian | Self::LittleEndianSwap)
    }

    /// Check if registers are in reverse order
    pub fn has_word_swap(&self) -> bool {
        matches!(self, Self::LittleEndian | Self::BigEndianSwap)
    }
}

impl FromStr for ByteOrder {
    type Err = MeterError;

    /// Supports the common spellings:
    /// - "ABCD", "AB-CD", "BE", "BIG_ENDIAN" → BigEndian
    /// - "DCBA", "LE", "LITTLE_ENDIAN" → LittleEndian
    /// - "CDAB", "BIG_ENDIAN_SWAP" → BigEndianSwap
    /// - "BADC", "LITTLE_ENDIAN_SWAP" → LittleEndianSwap
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "");
        match normalized.as_str() {
            "ABCD" | "BE" | "BIG_ENDIAN" | "BIGENDIAN" | "ABCDEFGH" => Ok(Self::BigEndian),
            "DCBA" | "LE" | "LITTLE_ENDIAN" | "LITTLEENDIAN" | "HGFEDCBA" => Ok(Self::LittleEndian),
            "CDAB" | "BIG_ENDIAN_SWAP" | "BIGENDIANSWAP" => Ok(Self::BigEndianSwap),
            "BADC" | "LITTLE_ENDIAN_SWAP" | "LITTLEENDIANSWAP" => Ok(Self::LittleEndianSwap),
            _ => Err(MeterError::InvalidByteOrder(s.to_string())),
        }
    }
}

impl std::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ByteOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for ByteOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
