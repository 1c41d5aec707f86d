//! # sh2ai-core
//!
//! Core library for the Stronghold 2 AI enabler.
//!
//! This crate provides:
//! - Target process discovery over the live process list
//! - Module base lookup via `/proc/<pid>/maps`
//! - Raw process memory access via `/proc/<pid>/mem`
//! - Pointer-chain resolution of the AI flag address
//! - The background patch loop that rewrites the flag every cycle
//!
//! The crate performs no terminal or GUI I/O. Front ends construct a
//! [`Patcher`], consume [`PatchEvent`]s from the channel it hands out, and
//! drive the loop through [`Patcher::start`] and [`Patcher::stop`]. Writing
//! to another process's memory requires root or CAP_SYS_PTRACE; see
//! [`privilege::check_memory_access`].

pub mod error;
pub mod layout;
pub mod memory;
pub mod patcher;
pub mod privilege;
pub mod process;
pub mod resolve;
pub mod shutdown;

pub use error::{Error, Result};
pub use memory::{ProcMem, ProcessMemory};
pub use patcher::{
    LoopState, PatchEvent, PatchTarget, Patcher, PatcherConfig, PatcherConfigBuilder,
};
pub use privilege::check_memory_access;
pub use process::maps::{MapRegion, module_base, read_regions};
pub use process::{Pid, ProcessProvider, SystemProvider, find_target_process};
pub use resolve::{PointerChain, resolve_patch_address};
pub use shutdown::StopSignal;
