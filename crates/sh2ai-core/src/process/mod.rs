//! Target process discovery.

pub mod maps;

use std::path::Path;

use sysinfo::System;
use tracing::debug;

use crate::memory::{ProcMem, ProcessMemory};

/// Operating-system process identifier. Only meaningful while the process
/// is alive; every OS call can leave a held pid stale.
pub type Pid = u32;

/// Find a live process matching `target` by image name.
///
/// Matches case-sensitively against the process name or any command-line
/// argument containing the target (Wine launches the game as an argument to
/// the loader, so the comm name alone is not enough). Pids whose `/proc`
/// metadata has already vanished are skipped; with several matches the first
/// accessible one wins.
///
/// Absence of the process is the normal idle condition, so this never
/// returns an error.
pub fn find_target_process(target: &str) -> Option<Pid> {
    let mut system = System::new();
    system.refresh_processes();

    for (pid, process) in system.processes() {
        if !matches_target(process.name(), process.cmd(), target) {
            continue;
        }
        let pid = pid.as_u32();
        if !metadata_accessible(pid) {
            debug!("pid {pid} matched {target} but vanished before use");
            continue;
        }
        return Some(pid);
    }
    None
}

fn matches_target(name: &str, cmd: &[String], target: &str) -> bool {
    name == target || cmd.iter().any(|arg| arg.contains(target))
}

fn metadata_accessible(pid: Pid) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// The loop's seam over the operating system.
///
/// The real implementation is [`SystemProvider`]; tests substitute a mock so
/// the whole patch loop runs against scripted processes and memory.
pub trait ProcessProvider: Send + Sync {
    type Memory: ProcessMemory;

    /// Locate the target process, if it is currently running.
    fn find_target_process(&self) -> Option<Pid>;

    /// Load address of the target image inside `pid`, if mapped.
    fn module_base(&self, pid: Pid) -> Option<u64>;

    /// Memory access scoped to `pid`'s address space.
    fn memory(&self, pid: Pid) -> Self::Memory;
}

/// [`ProcessProvider`] backed by the live process list and `/proc`.
pub struct SystemProvider {
    target: String,
}

impl SystemProvider {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl ProcessProvider for SystemProvider {
    type Memory = ProcMem;

    fn find_target_process(&self) -> Option<Pid> {
        find_target_process(&self.target)
    }

    fn module_base(&self, pid: Pid) -> Option<u64> {
        maps::module_base(pid, &self.target)
    }

    fn memory(&self, pid: Pid) -> ProcMem {
        ProcMem::new(pid)
    }
}
