//! Decode transforms
//!
//! A [`Transform`] turns the raw bytes of one register read into an
//! engineering-unit `f64`. It is plain data (encoding, byte order, scale),
//! so operations stay comparable and printable, and all decoding logic
//! lives here instead of in the drivers.
//!
//! ```text
//! bytes ──► reorder (ByteOrder) ──► decode (Encoding) ──► × scale ──► f64
//! ```

use serde::{Deserialize, Serialize};

use crate::bytes::{reorder_2, reorder_4, reorder_8, ByteOrder};
use crate::error::{MeterError, Result};

/// Raw register encoding of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    /// IEEE-754 single precision
    Float32,
    /// IEEE-754 double precision
    Float64,
}

impl Encoding {
    /// Number of 16-bit registers the value occupies
    pub fn register_count(&self) -> u16 {
        match self {
            Encoding::Uint16 | Encoding::Int16 => 1,
            Encoding::Uint32 | Encoding::Int32 | Encoding::Float32 => 2,
            Encoding::Uint64 | Encoding::Float64 => 4,
        }
    }

    /// Number of bytes the value occupies
    pub fn byte_len(&self) -> usize {
        self.register_count() as usize * 2
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Encoding::Uint16 => "uint16",
            Encoding::Int16 => "int16",
            Encoding::Uint32 => "uint32",
            Encoding::Int32 => "int32",
            Encoding::Uint64 => "uint64",
            Encoding::Float32 => "float32",
            Encoding::Float64 => "float64",
        };
        f.write_str(s)
    }
}

/// Stateless decode function `bytes → f64`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub encoding: Encoding,
    #[serde(default)]
    pub order: ByteOrder,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Transform {
    /// Unscaled big-endian transform for the given encoding
    pub const fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            order: ByteOrder::BigEndian,
            scale: 1.0,
        }
    }

    /// 32-bit IEEE-754 float from two registers
    pub const fn ieee754_f32() -> Self {
        Self::new(Encoding::Float32)
    }

    /// 64-bit IEEE-754 double from four registers
    pub const fn ieee754_f64() -> Self {
        Self::new(Encoding::Float64)
    }

    /// Same transform reading the device's register layout
    pub fn with_order(self, order: ByteOrder) -> Self {
        Self { order, ..self }
    }

    /// Scaling combinator: `factor * self(bytes)`
    ///
    /// Scales compose multiplicatively, so `t.scaled(a).scaled(b)` equals
    /// `t.scaled(a * b)`.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            ..self
        }
    }

    /// Apply an optional scale factor, identity when `None`
    pub fn maybe_scaled(self, factor: Option<f64>) -> Self {
        match factor {
            Some(f) => self.scaled(f),
            None => self,
        }
    }

    /// Number of registers this transform consumes
    pub fn register_count(&self) -> u16 {
        self.encoding.register_count()
    }

    /// Decode bytes in register order
    ///
    /// Total for inputs of exactly `encoding.byte_len()` bytes. Any other
    /// length is an upstream framing problem and is reported, never guessed
    /// around.
    pub fn apply(&self, bytes: &[u8]) -> Result<f64> {
        let expected = self.encoding.byte_len();
        if bytes.len() != expected {
            return Err(MeterError::DecodeLength {
                expected,
                actual: bytes.len(),
            });
        }

        let raw = match self.encoding {
            Encoding::Uint16 => u16::from_be_bytes(reorder_2(array(bytes), self.order)) as f64,
            Encoding::Int16 => i16::from_be_bytes(reorder_2(array(bytes), self.order)) as f64,
            Encoding::Uint32 => u32::from_be_bytes(reorder_4(array(bytes), self.order)) as f64,
            Encoding::Int32 => i32::from_be_bytes(reorder_4(array(bytes), self.order)) as f64,
            Encoding::Uint64 => u64::from_be_bytes(reorder_8(array(bytes), self.order)) as f64,
            Encoding::Float32 => f32::from_be_bytes(reorder_4(array(bytes), self.order)) as f64,
            Encoding::Float64 => f64::from_be_bytes(reorder_8(array(bytes), self.order)),
        };

        Ok(raw * self.scale)
    }
}

// Length is checked by the caller
fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
