//! In-memory fake of [`ProcessMemory`] for tests.

use std::sync::{Arc, Mutex};

use super::ProcessMemory;

#[derive(Default)]
struct Inner {
    regions: Vec<(u64, Vec<u8>)>,
    fail_reads: bool,
    fail_writes: bool,
    /// Return at most this many bytes per read, violating the exact-length
    /// contract on purpose so callers' guards can be exercised.
    truncate_reads: Option<usize>,
    writes: Vec<(u64, Vec<u8>)>,
    reads: usize,
}

/// Cheap to clone; clones share the same backing state, the way separate
/// `ProcMem` handles share one real address space.
#[derive(Clone, Default)]
pub struct MockMemory {
    inner: Arc<Mutex<Inner>>,
}

impl MockMemory {
    pub fn builder() -> MockMemoryBuilder {
        MockMemoryBuilder::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(u64, Vec<u8>)> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn read_count(&self) -> usize {
        self.inner.lock().unwrap().reads
    }
}

impl ProcessMemory for MockMemory {
    fn read_bytes(&self, address: u64, len: usize) -> Option<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.reads += 1;
        if inner.fail_reads {
            return None;
        }

        let limit = inner.truncate_reads.unwrap_or(len).min(len);
        for (start, data) in &inner.regions {
            let Some(offset) = address.checked_sub(*start) else {
                continue;
            };
            let offset = offset as usize;
            if offset + limit <= data.len() {
                return Some(data[offset..offset + limit].to_vec());
            }
        }
        None
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return false;
        }

        for (start, data) in &mut inner.regions {
            let Some(offset) = address.checked_sub(*start) else {
                continue;
            };
            let offset = offset as usize;
            if offset + bytes.len() <= data.len() {
                data[offset..offset + bytes.len()].copy_from_slice(bytes);
                break;
            }
        }
        inner.writes.push((address, bytes.to_vec()));
        true
    }
}

#[derive(Default)]
pub struct MockMemoryBuilder {
    inner: Inner,
}

impl MockMemoryBuilder {
    pub fn with_bytes(mut self, address: u64, bytes: &[u8]) -> Self {
        self.inner.regions.push((address, bytes.to_vec()));
        self
    }

    pub fn with_u32_le(self, address: u64, value: u32) -> Self {
        self.with_bytes(address, &value.to_le_bytes())
    }

    pub fn truncate_reads(mut self, limit: usize) -> Self {
        self.inner.truncate_reads = Some(limit);
        self
    }

    pub fn build(self) -> MockMemory {
        MockMemory {
            inner: Arc::new(Mutex::new(self.inner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_populated_bytes() {
        let mem = MockMemory::builder()
            .with_bytes(0x1000, &[0xaa, 0xbb, 0xcc, 0xdd])
            .build();
        assert_eq!(mem.read_bytes(0x1001, 2), Some(vec![0xbb, 0xcc]));
        assert!(mem.read_bytes(0x2000, 1).is_none());
    }

    #[test]
    fn writes_are_recorded_and_visible() {
        let mem = MockMemory::builder().with_bytes(0x1000, &[0; 4]).build();
        assert!(mem.write_bytes(0x1002, &[0x7f]));
        assert_eq!(mem.read_bytes(0x1000, 4), Some(vec![0, 0, 0x7f, 0]));
        assert_eq!(mem.writes(), vec![(0x1002, vec![0x7f])]);
    }

    #[test]
    fn truncated_reads_return_short_buffers() {
        let mem = MockMemory::builder()
            .with_bytes(0x1000, &[1, 2, 3, 4])
            .truncate_reads(2)
            .build();
        assert_eq!(mem.read_bytes(0x1000, 4), Some(vec![1, 2]));
    }
}
