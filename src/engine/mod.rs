//! The reconciliation engine.
//!
//! # Responsibilities
//! - Observe endpoint-set changes and coalesce them into scheduled updates
//! - Regenerate and persist the launch command when it goes stale
//! - Tear down running mirror processes so the supervisor restarts them
//!   against the fresh script
//!
//! # Design Decisions
//! - Updates are debounced: a burst of add/remove notifications folds into
//!   the next scheduled tick instead of rewriting the script per event
//! - The tick loop always re-arms. A failed attempt degrades to "retry
//!   after the update interval", never to a dead loop
//! - gor has no graceful reload; the only lever is rewriting the script and
//!   killing the running process so the supervisor restarts it

mod state;

pub use state::{AttemptGuard, ReconcileState, StateCell};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::command::{generate_command, CommandContext};
use crate::config::MirrorConfig;
use crate::reaper::{Reaper, SystemReaper};
use crate::script::write_launch_script;
use crate::source::EndpointSource;

/// Keeps the gor launch script in sync with the endpoint source.
pub struct MirrorUpdater {
    source: Arc<dyn EndpointSource>,
    reaper: Arc<dyn Reaper>,
    config: MirrorConfig,
    state: StateCell,
}

impl MirrorUpdater {
    /// Build an engine against the live process table and subscribe it to
    /// `source` change notifications.
    pub fn new(source: Arc<dyn EndpointSource>, config: MirrorConfig) -> Arc<Self> {
        Self::with_reaper(source, Arc::new(SystemReaper), config)
    }

    /// Build an engine with an explicit reaper.
    pub fn with_reaper(
        source: Arc<dyn EndpointSource>,
        reaper: Arc<dyn Reaper>,
        config: MirrorConfig,
    ) -> Arc<Self> {
        let updater = Arc::new(Self {
            source,
            reaper,
            config,
            state: StateCell::new(),
        });

        // Weak handles: the source's callback list must not keep the engine
        // alive in a cycle. The callbacks do nothing but mark dirty; they can
        // fire from anywhere without touching the attempt itself.
        let handle = Arc::downgrade(&updater);
        updater.source.register_on_add(Box::new(move |_| {
            if let Some(updater) = handle.upgrade() {
                updater.state.mark_dirty();
            }
        }));
        let handle = Arc::downgrade(&updater);
        updater.source.register_on_remove(Box::new(move |_| {
            if let Some(updater) = handle.upgrade() {
                updater.state.mark_dirty();
            }
        }));

        updater
    }

    /// One-off generation of the mirroring launch script, used before any
    /// mirror process has been launched. Kills nothing.
    pub fn set_up(&self) {
        self.source.start();
        self.update(false);
    }

    /// Start the long-running reconcile loop. Returns immediately; the loop
    /// runs for the life of the process.
    pub fn start(self: &Arc<Self>) {
        self.source.start();
        let updater = Arc::clone(self);
        tokio::spawn(async move {
            // This loop is the "always reschedule" guarantee: every attempt
            // outcome falls through to the next sleep.
            loop {
                sleep(Duration::from_secs(updater.config.update_frequency_secs)).await;
                updater.update(true);
            }
        });
    }

    /// Drive one reconciliation attempt.
    ///
    /// Skips all work unless the state is dirty and no other attempt is in
    /// flight. Nothing escapes: every failure inside the attempt is logged
    /// and converted into a retry on the next tick.
    pub fn update(&self, kill_running: bool) {
        if !self.state.begin_attempt() {
            return;
        }
        let guard = AttemptGuard::new(&self.state);
        tracing::info!("Updating traffic mirror configuration");

        let success = self.attempt(kill_running);
        if !success {
            tracing::warn!("Failed to update! Rescheduling.");
        }
        guard.complete(success);
    }

    /// Current debounce state, for observation.
    pub fn state(&self) -> ReconcileState {
        self.state.current()
    }

    fn attempt(&self, kill_running: bool) -> bool {
        let endpoints = self.source.endpoints();
        let ctx = CommandContext {
            gor_path: &self.config.paths.binary,
            ports: &self.config.ports,
            endpoints: &endpoints,
            max_qps: self.config.max_qps,
        };
        let command = match generate_command(&self.config.paths.template, &ctx) {
            Ok(command) => command,
            Err(e) => {
                tracing::error!(error = %e, "Failed to generate mirror command");
                return false;
            }
        };
        self.apply(&command, kill_running)
    }

    /// Persist the command and, when asked, sweep stale mirror processes so
    /// the supervisor relaunches against the fresh script.
    fn apply(&self, command: &str, kill_running: bool) -> bool {
        if !write_launch_script(command, &self.config.paths.script) {
            return false;
        }
        if kill_running {
            let signature = self.config.paths.binary.display().to_string();
            return self.reaper.kill_matching(&signature);
        }
        true
    }
}
