//! Raw byte access to another process's address space.

mod procmem;

#[cfg(test)]
pub mod mock;

pub use procmem::ProcMem;

#[cfg(test)]
pub use mock::{MockMemory, MockMemoryBuilder};

/// Byte-level access to one process's memory.
///
/// Failure is part of normal operation here: the process can exit between
/// any two calls, and the kernel can refuse access at any time. Both
/// conditions surface as `None`/`false`, never as a panic or an error type.
pub trait ProcessMemory {
    /// Read exactly `len` bytes starting at `address`.
    ///
    /// Returns `None` on any failure, including a short read. A returned
    /// buffer always has length `len`.
    fn read_bytes(&self, address: u64, len: usize) -> Option<Vec<u8>>;

    /// Write `bytes` starting at `address`.
    ///
    /// Returns `true` only when every byte was written. A partial write
    /// never reports success.
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> bool;
}
