//! Privilege precondition check.
//!
//! Reaching into another user's process through `/proc/<pid>/mem` needs
//! root on stock kernels. Elevation itself is the caller's problem (the
//! front end may re-exec under `pkexec`, prompt, or refuse); the core only
//! reports the precondition clearly instead of failing obscurely on the
//! first read.

use nix::unistd::geteuid;

use crate::error::{Error, Result};

/// Verify the process can plausibly access foreign process memory.
///
/// Checks the effective uid only. A non-root process holding
/// CAP_SYS_PTRACE would also work and is reported as an error here; callers
/// in such setups can skip the check.
pub fn check_memory_access() -> Result<()> {
    let euid = geteuid();
    if euid.is_root() {
        Ok(())
    } else {
        Err(Error::InsufficientPrivilege {
            euid: euid.as_raw(),
        })
    }
}
