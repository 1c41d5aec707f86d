use thiserror::Error;

use crate::process::Pid;

/// Errors the core can actually fail with.
///
/// Most of the crate deliberately does not use this type: the absence of the
/// target process, a failed read along the pointer chain, and a failed write
/// are all expected, recurring conditions and are signaled through
/// `Option`/`bool` contracts instead. The enum covers what is genuinely
/// exceptional.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "insufficient privilege for process memory access (euid {euid}): \
         run as root or grant CAP_SYS_PTRACE"
    )]
    InsufficientPrivilege { euid: u32 },

    #[error("failed to read memory maps for pid {pid}: {source}")]
    MapsUnreadable { pid: Pid, source: std::io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
