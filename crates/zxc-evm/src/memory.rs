//! Frame memory
//!
//! Byte-addressed, zero-filled, grows in 32-byte words and never shrinks.
//! Gas for growth is charged by the interpreter before [`Memory::grow`] is
//! called, so every access below is already in bounds.

use primitive_types::U256;

/// Frame memory buffer
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Current size in bytes, always a multiple of 32
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Current size in words
    pub fn words(&self) -> u64 {
        (self.data.len() / 32) as u64
    }

    /// Grow to cover `end` bytes, rounded up to a whole word
    pub fn grow(&mut self, end: usize) {
        let aligned = end.div_ceil(32) * 32;
        if aligned > self.data.len() {
            self.data.resize(aligned, 0);
        }
    }

    /// Load a 32-byte word
    pub fn load_word(&self, offset: usize) -> U256 {
        U256::from_big_endian(&self.data[offset..offset + 32])
    }

    /// Store a 32-byte word
    pub fn store_word(&mut self, offset: usize, value: &U256) {
        value.to_big_endian(&mut self.data[offset..offset + 32]);
    }

    /// Store a single byte
    pub fn store_byte(&mut self, offset: usize, value: u8) {
        self.data[offset] = value;
    }

    /// Borrow a region
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        if size == 0 {
            return &[];
        }
        &self.data[offset..offset + size]
    }

    /// Mutably borrow a region
    pub fn slice_mut(&mut self, offset: usize, size: usize) -> &mut [u8] {
        if size == 0 {
            return &mut [];
        }
        &mut self.data[offset..offset + size]
    }

    /// Copy `size` bytes of `src` starting at `src_offset` into memory at
    /// `dest`, zero-filling whatever lies past the end of `src`.
    pub fn copy_padded(&mut self, dest: usize, src: &[u8], src_offset: usize, size: usize) {
        if size == 0 {
            return;
        }
        let target = &mut self.data[dest..dest + size];
        let available = src.len().saturating_sub(src_offset).min(size);
        if available > 0 {
            target[..available].copy_from_slice(&src[src_offset..src_offset + available]);
        }
        target[available..].fill(0);
    }

    /// Move a region out of memory, consuming the buffer.
    ///
    /// Used by RETURN and REVERT, which end the frame.
    pub fn take_region(&mut self, offset: usize, size: usize) -> Vec<u8> {
        if size == 0 {
            return Vec::new();
        }
        let mut buf = std::mem::take(&mut self.data);
        buf.truncate(offset + size);
        buf.drain(..offset);
        buf
    }
}
