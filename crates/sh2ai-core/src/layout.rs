//! Compiled-in constants for the Stronghold 2 patch target.
//!
//! These values are reverse-engineered against one executable version.
//! They are configuration data, not computed values; a new game build means
//! new offsets here.

/// Target image identification
pub mod target {
    /// Image name of the game executable as it appears in the process list
    /// and in `/proc/<pid>/maps` (the game runs under Wine/Proton).
    pub const IMAGE_NAME: &str = "Stronghold2.exe";
}

/// Pointer chain from the module base to the AI flag
pub mod chain {
    /// Offset from the module base to the 4-byte pointer slot.
    pub const POINTER_OFFSET: u64 = 0x00ec_5f28;

    /// Offset added to the value stored in the pointer slot to reach the
    /// AI flag itself.
    pub const ADDRESS_OFFSET: u64 = 0xd28;

    /// Width of the pointer slot. The image is 32-bit.
    pub const POINTER_BYTES: usize = 4;
}

/// Patch payload
pub mod patch {
    /// Value that switches AI opponents on.
    pub const ENABLE_BYTE: u8 = 0x01;
}

/// Timing constants for the patch loop
pub mod timing {
    /// Delay before the next cycle after a completed pass (ms).
    pub const CYCLE_INTERVAL_MS: u64 = 1000;

    /// Delay before retrying while the process is missing or the pointer
    /// chain failed to resolve (ms).
    pub const RETRY_INTERVAL_MS: u64 = 2000;
}
