//! Register ↔ byte conversions with byte order support
//!
//! Provides functions for converting between:
//! - Register-order bytes ↔ big-endian bytes (`normalize`, `reorder_*`)
//! - Register arrays (u16[]) ↔ register-order bytes
//! - Numeric values → register arrays (for simulators and tests)

use super::ByteOrder;

// ============================================================================
// Byte Normalisation
// ============================================================================

/// Rearrange `N` register-order bytes into big-endian order
///
/// `N` must be even. Word swapping reverses the register sequence, byte
/// swapping exchanges the two bytes inside each register. Both are
/// involutions, so the same function also converts big-endian bytes back
/// into the device's register layout.
pub fn normalize<const N: usize>(bytes: [u8; N], order: ByteOrder) -> [u8; N] {
    let words = N / 2;
    let mut out = [0u8; N];

    for i in 0..words {
        let src = if order.has_word_swap() { words - 1 - i } else { i };
        let (hi, lo) = (bytes[2 * src], bytes[2 * src + 1]);
        if order.has_byte_swap() {
            out[2 * i] = lo;
            out[2 * i + 1] = hi;
        } else {
            out[2 * i] = hi;
            out[2 * i + 1] = lo;
        }
    }

    out
}

/// Normalise a single register (16-bit value)
pub fn reorder_2(bytes: [u8; 2], order: ByteOrder) -> [u8; 2] {
    normalize(bytes, order)
}

/// Normalise a double register (32-bit value)
pub fn reorder_4(bytes: [u8; 4], order: ByteOrder) -> [u8; 4] {
    normalize(bytes, order)
}

/// Normalise a quad register (64-bit value)
pub fn reorder_8(bytes: [u8; 8], order: ByteOrder) -> [u8; 8] {
    normalize(bytes, order)
}

// ============================================================================
// Register Arrays
// ============================================================================

/// Flatten registers into register-order bytes, as a transport delivers them
pub fn registers_to_bytes(regs: &[u16]) -> Vec<u8> {
    regs.iter().flat_map(|r| r.to_be_bytes()).collect()
}

/// Split register-order bytes back into registers
///
/// A trailing odd byte is ignored.
pub fn bytes_to_registers(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

fn to_registers<const N: usize>(be_bytes: [u8; N], order: ByteOrder) -> Vec<u16> {
    bytes_to_registers(&normalize(be_bytes, order))
}

// ============================================================================
// Numeric Type → Registers
// ============================================================================

/// Encode f32 as 2 registers in the given order
pub fn f32_to_registers(value: f32, order: ByteOrder) -> [u16; 2] {
    let regs = to_registers(value.to_be_bytes(), order);
    [regs[0], regs[1]]
}

/// Encode f64 as 4 registers in the given order
pub fn f64_to_registers(value: f64, order: ByteOrder) -> [u16; 4] {
    let regs = to_registers(value.to_be_bytes(), order);
    [regs[0], regs[1], regs[2], regs[3]]
}

/// Encode u32 as 2 registers in the given order
pub fn u32_to_registers(value: u32, order: ByteOrder) -> [u16; 2] {
    let regs = to_registers(value.to_be_bytes(), order);
    [regs[0], regs[1]]
}
