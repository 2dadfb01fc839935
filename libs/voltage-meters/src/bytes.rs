//! Register byte handling
//!
//! Byte/word order normalisation for multi-register meter values.
//! The transport hands over bytes in register order (each 16-bit register
//! big-endian, registers in address order); these helpers rearrange them
//! into plain big-endian order according to the device's documented layout.

pub mod byte_order;
pub mod conversions;

pub use byte_order::ByteOrder;
pub use conversions::*;
