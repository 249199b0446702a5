//! Flat 64 KiB memory.

use crate::error::{ChipsimError, Result};

/// Address of the little-endian reset vector.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Memory seen by the chip's address and data buses.
pub trait Bus {
    /// Serve a read cycle.
    fn read(&mut self, addr: u16) -> u8;
    /// Serve a write cycle.
    fn write(&mut self, addr: u16, value: u8);
}

/// A full 16-bit address space of RAM.
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Zero-filled memory.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; 0x10000],
        }
    }

    /// Copy `data` into memory starting at `addr`.
    pub fn load(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        let start = addr as usize;
        let end = start + data.len();
        if end > self.bytes.len() {
            return Err(ChipsimError::invalid_param(format!(
                "{} bytes at ${:04X} run past the end of memory",
                data.len(),
                addr
            )));
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Point the reset vector at `target`.
    pub fn set_reset_vector(&mut self, target: u16) {
        let [lo, hi] = target.to_le_bytes();
        self.bytes[RESET_VECTOR as usize] = lo;
        self.bytes[RESET_VECTOR as usize + 1] = hi;
    }

    pub fn peek(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for Memory {
    fn read(&mut self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_bounds() {
        let mut mem = Memory::new();
        mem.load(0xFFFE, &[0x12, 0x34]).unwrap();
        assert_eq!(mem.peek(0xFFFE), 0x12);
        assert_eq!(mem.peek(0xFFFF), 0x34);
        assert!(matches!(
            mem.load(0xFFFF, &[1, 2]),
            Err(ChipsimError::InvalidSimulationParam { .. })
        ));
        assert_eq!(mem.peek(0xFFFF), 0x34);
    }

    #[test]
    fn test_reset_vector_is_little_endian() {
        let mut mem = Memory::new();
        mem.set_reset_vector(0x0400);
        assert_eq!(mem.read(0xFFFC), 0x00);
        assert_eq!(mem.read(0xFFFD), 0x04);
    }
}
