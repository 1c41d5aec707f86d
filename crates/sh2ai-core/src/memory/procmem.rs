use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;

use tracing::trace;

use super::ProcessMemory;
use crate::process::Pid;

/// Memory access through `/proc/<pid>/mem`.
///
/// Stateless over the pid: the file is opened per call, so a `ProcMem` can
/// outlive the process it points at and simply start failing. Accessing
/// another user's process this way requires root or CAP_SYS_PTRACE.
pub struct ProcMem {
    pid: Pid,
}

impl ProcMem {
    pub fn new(pid: Pid) -> Self {
        Self { pid }
    }

    fn open(&self, write: bool) -> std::io::Result<File> {
        OpenOptions::new()
            .read(!write)
            .write(write)
            .open(format!("/proc/{}/mem", self.pid))
    }
}

impl ProcessMemory for ProcMem {
    fn read_bytes(&self, address: u64, len: usize) -> Option<Vec<u8>> {
        let file = match self.open(false) {
            Ok(file) => file,
            Err(e) => {
                trace!("open mem for pid {} failed: {e}", self.pid);
                return None;
            }
        };

        let mut buf = vec![0u8; len];
        let mut done = 0;
        while done < len {
            match file.read_at(&mut buf[done..], address + done as u64) {
                Ok(0) => return None,
                Ok(n) => done += n,
                Err(e) => {
                    trace!(
                        "read of {len} bytes at {address:#x} (pid {}) failed: {e}",
                        self.pid
                    );
                    return None;
                }
            }
        }
        Some(buf)
    }

    fn write_bytes(&self, address: u64, bytes: &[u8]) -> bool {
        let file = match self.open(true) {
            Ok(file) => file,
            Err(e) => {
                trace!("open mem for pid {} failed: {e}", self.pid);
                return false;
            }
        };

        let mut done = 0;
        while done < bytes.len() {
            match file.write_at(&bytes[done..], address + done as u64) {
                Ok(0) => return false,
                Ok(n) => done += n,
                Err(e) => {
                    trace!(
                        "write of {} bytes at {address:#x} (pid {}) failed: {e}",
                        bytes.len(),
                        self.pid
                    );
                    return false;
                }
            }
        }
        true
    }
}
