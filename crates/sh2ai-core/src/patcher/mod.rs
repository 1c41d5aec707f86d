//! The patch loop: discovery, resolution, and the once-a-second rewrite of
//! the AI flag.
//!
//! [`Patcher`] owns a single background worker thread. Front ends drive it
//! through [`Patcher::start`] / [`Patcher::stop`] and observe it through the
//! ordered [`PatchEvent`] channel handed out at construction; they never
//! touch loop state directly.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::layout::{patch, target, timing};
use crate::memory::ProcessMemory;
use crate::process::{Pid, ProcessProvider, SystemProvider};
use crate::resolve::{self, PointerChain};
use crate::shutdown::StopSignal;

/// One notification from the loop to its collaborator.
///
/// Every cycle produces exactly one terminal event (`Waiting`,
/// `ResolutionFailed`, `Patched`, or `WriteFailed`); `Found` is emitted
/// additionally on the cycle where a new process resolves. Events are
/// language-neutral; any localization is the consumer's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PatchEvent {
    /// The target process is not running.
    Waiting,
    /// A new target process resolved successfully.
    Found { pid: Pid },
    /// The pointer chain could not be read in the located process.
    ResolutionFailed,
    /// The enable byte was written this cycle.
    Patched,
    /// The write failed; the tracked target was discarded.
    WriteFailed,
}

impl PatchEvent {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Found { .. } | Self::Patched)
    }

    /// Human-readable status for display.
    pub fn message(&self) -> String {
        match self {
            Self::Waiting => "Waiting for Stronghold 2 to start...".into(),
            Self::Found { pid } => format!("Stronghold 2 found (pid {pid})"),
            Self::ResolutionFailed => "Failed to resolve the AI flag address".into(),
            Self::Patched => "AI enabled".into(),
            Self::WriteFailed => "Error enabling AI".into(),
        }
    }
}

/// Where the loop currently is. Owned exclusively by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopState {
    Idle,
    Searching,
    Found(Pid),
    Patching,
    Stopped,
}

/// The single tracked (pid, resolved address) pair.
///
/// An address is only meaningful inside the address space of the pid it was
/// resolved in; the pair is discarded whole whenever either half goes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchTarget {
    pub pid: Pid,
    pub address: u64,
}

/// Loop configuration. Defaults come from [`crate::layout`]; the builder
/// exists for tests and embedders, not for runtime reconfiguration.
#[derive(Debug, Clone)]
pub struct PatcherConfig {
    pub target_name: String,
    pub chain: PointerChain,
    pub enable_byte: u8,
    /// Delay after a completed cycle.
    pub cycle_interval: Duration,
    /// Delay after a missing process or failed resolution.
    pub retry_interval: Duration,
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            target_name: target::IMAGE_NAME.to_owned(),
            chain: PointerChain::default(),
            enable_byte: patch::ENABLE_BYTE,
            cycle_interval: Duration::from_millis(timing::CYCLE_INTERVAL_MS),
            retry_interval: Duration::from_millis(timing::RETRY_INTERVAL_MS),
        }
    }
}

impl PatcherConfig {
    pub fn builder() -> PatcherConfigBuilder {
        PatcherConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PatcherConfigBuilder {
    target_name: Option<String>,
    chain: Option<PointerChain>,
    enable_byte: Option<u8>,
    cycle_interval: Option<Duration>,
    retry_interval: Option<Duration>,
}

impl PatcherConfigBuilder {
    pub fn target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn chain(mut self, chain: PointerChain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn enable_byte(mut self, value: u8) -> Self {
        self.enable_byte = Some(value);
        self
    }

    pub fn cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = Some(interval);
        self
    }

    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = Some(interval);
        self
    }

    pub fn build(self) -> PatcherConfig {
        let default = PatcherConfig::default();
        PatcherConfig {
            target_name: self.target_name.unwrap_or(default.target_name),
            chain: self.chain.unwrap_or(default.chain),
            enable_byte: self.enable_byte.unwrap_or(default.enable_byte),
            cycle_interval: self.cycle_interval.unwrap_or(default.cycle_interval),
            retry_interval: self.retry_interval.unwrap_or(default.retry_interval),
        }
    }
}

struct PatchLoop<P: ProcessProvider> {
    provider: Arc<P>,
    config: PatcherConfig,
    events: Sender<PatchEvent>,
    target: Option<PatchTarget>,
    state: LoopState,
    patch_count: u64,
}

impl<P: ProcessProvider> PatchLoop<P> {
    fn new(provider: Arc<P>, config: PatcherConfig, events: Sender<PatchEvent>) -> Self {
        Self {
            provider,
            config,
            events,
            target: None,
            state: LoopState::Idle,
            patch_count: 0,
        }
    }

    fn emit(&self, event: PatchEvent) {
        // A vanished collaborator must not stop the patching.
        let _ = self.events.send(event);
    }

    fn resolve(&self, pid: Pid) -> Option<u64> {
        let base = self.provider.module_base(pid)?;
        let memory = self.provider.memory(pid);
        resolve::resolve_patch_address(&memory, base, &self.config.chain)
    }

    /// One full pass: locate, re-resolve on identity change, write.
    /// Returns how long to wait before the next pass.
    fn cycle(&mut self) -> Duration {
        let Some(pid) = self.provider.find_target_process() else {
            self.target = None;
            self.state = LoopState::Searching;
            self.emit(PatchEvent::Waiting);
            return self.config.retry_interval;
        };

        let target = match self.target {
            Some(target) if target.pid == pid => target,
            // New or replaced process: any previously resolved address
            // belongs to a dead address space, even if the number looks
            // plausible.
            _ => match self.resolve(pid) {
                Some(address) => {
                    info!("resolved AI flag at {address:#x} in pid {pid}");
                    let target = PatchTarget { pid, address };
                    self.target = Some(target);
                    self.state = LoopState::Found(pid);
                    self.emit(PatchEvent::Found { pid });
                    target
                }
                None => {
                    debug!("pointer chain did not resolve in pid {pid}");
                    self.target = None;
                    self.state = LoopState::Searching;
                    self.emit(PatchEvent::ResolutionFailed);
                    return self.config.retry_interval;
                }
            },
        };

        // Re-assert the flag every cycle; the game clears it on its own
        // (match start, lobby reload), so one successful write is never
        // enough. The byte is not read back afterwards.
        let memory = self.provider.memory(target.pid);
        if memory.write_bytes(target.address, &[self.config.enable_byte]) {
            self.patch_count += 1;
            self.state = LoopState::Patching;
            self.emit(PatchEvent::Patched);
        } else {
            // A failing write means the target went stale; rediscover
            // instead of hammering the same address.
            warn!("enable write failed in pid {}, rediscovering", target.pid);
            self.target = None;
            self.state = LoopState::Searching;
            self.emit(PatchEvent::WriteFailed);
        }

        self.config.cycle_interval
    }

    fn run(&mut self, stop: &StopSignal) {
        while !stop.is_requested() {
            let wait = self.cycle();
            trace!("cycle complete (state: {})", self.state);
            if stop.wait(wait) {
                break;
            }
        }
        self.state = LoopState::Stopped;
        debug!("patch loop stopped after {} patches", self.patch_count);
    }
}

/// Handle to the background patch loop.
///
/// Construction hands out the receiving end of the event channel once;
/// `start` and `stop` may be called repeatedly. Writes are fire-and-forget:
/// the patched byte is never read back for verification.
pub struct Patcher<P: ProcessProvider + 'static = SystemProvider> {
    config: PatcherConfig,
    provider: Arc<P>,
    events: Sender<PatchEvent>,
    worker: Option<(Arc<StopSignal>, JoinHandle<()>)>,
}

impl Patcher<SystemProvider> {
    pub fn new(config: PatcherConfig) -> (Self, Receiver<PatchEvent>) {
        let provider = SystemProvider::new(config.target_name.clone());
        Self::with_provider(provider, config)
    }
}

impl<P: ProcessProvider + 'static> Patcher<P> {
    pub fn with_provider(provider: P, config: PatcherConfig) -> (Self, Receiver<PatchEvent>) {
        let (events, receiver) = mpsc::channel();
        let patcher = Self {
            config,
            provider: Arc::new(provider),
            events,
            worker: None,
        };
        (patcher, receiver)
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Spawn the worker thread. Idempotent: calling while the loop is
    /// already running is a no-op, so two loops can never run at once.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            debug!("patch loop already running, ignoring start");
            return;
        }

        let stop = Arc::new(StopSignal::new());
        let worker_stop = Arc::clone(&stop);
        let mut patch_loop = PatchLoop::new(
            Arc::clone(&self.provider),
            self.config.clone(),
            self.events.clone(),
        );

        let handle = thread::spawn(move || patch_loop.run(&worker_stop));
        self.worker = Some((stop, handle));
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Synchronous by contract: once this returns, the thread is gone and no
    /// further events will be delivered. A no-op when not running.
    pub fn stop(&mut self) {
        let Some((stop, handle)) = self.worker.take() else {
            return;
        };
        stop.request();
        if handle.join().is_err() {
            error!("patch loop worker panicked");
        }
    }
}

impl<P: ProcessProvider + 'static> Drop for Patcher<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
