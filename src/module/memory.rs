// src/module/memory.rs

//! Byte-addressed module memory and bounds-checked access to regions of it.

use std::fmt;

/// Size of one growth step, matching a WebAssembly page.
pub const PAGE_SIZE: usize = 64 * 1024;

/// A `(pointer, length)` pair that does not fit inside module memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionError {
    pub pointer: u32,
    pub byte_len: usize,
    pub memory_len: usize,
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "region of {} bytes at {:#x} exceeds module memory of {} bytes",
            self.byte_len, self.pointer, self.memory_len
        )
    }
}

impl std::error::Error for RegionError {}

/// Borrows `byte_len` bytes starting at `pointer`.
pub fn region(memory: &[u8], pointer: u32, byte_len: usize) -> Result<&[u8], RegionError> {
    let start = pointer as usize;
    start
        .checked_add(byte_len)
        .and_then(|end| memory.get(start..end))
        .ok_or(RegionError {
            pointer,
            byte_len,
            memory_len: memory.len(),
        })
}

/// Growable linear memory with a bump allocator, owned by a native module.
///
/// Growing reallocates the backing storage, so any slice handed out before a
/// `grow` is gone afterwards. The borrow checker enforces this for native
/// code; the host treats every slice it receives the same way.
#[derive(Debug, Clone)]
pub struct LinearMemory {
    bytes: Vec<u8>,
    next: usize,
}

impl LinearMemory {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            bytes: vec![0; pages * PAGE_SIZE],
            next: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn pages(&self) -> usize {
        self.bytes.len() / PAGE_SIZE
    }

    /// Grows memory by `pages`, moving it to a fresh allocation.
    pub fn grow(&mut self, pages: usize) {
        let mut grown = vec![0; self.bytes.len() + pages * PAGE_SIZE];
        grown[..self.bytes.len()].copy_from_slice(&self.bytes);
        self.bytes = grown;
    }

    /// Reserves `len` bytes aligned to 4, growing as needed. Returns the offset.
    pub fn alloc(&mut self, len: usize) -> u32 {
        let start = (self.next + 3) & !3;
        let end = start + len;
        if end > self.bytes.len() {
            let missing = end - self.bytes.len();
            self.grow(missing.div_ceil(PAGE_SIZE));
        }
        self.next = end;
        start as u32
    }

    pub fn write_bytes(&mut self, pointer: u32, data: &[u8]) {
        let start = pointer as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
    }

    pub fn write_i32(&mut self, pointer: u32, value: i32) {
        self.write_bytes(pointer, &value.to_le_bytes());
    }

    /// Copies `data` into freshly allocated memory and returns `(pointer, len)`.
    pub fn store(&mut self, data: &[u8]) -> (u32, u32) {
        let pointer = self.alloc(data.len());
        self.write_bytes(pointer, data);
        (pointer, data.len() as u32)
    }
}
