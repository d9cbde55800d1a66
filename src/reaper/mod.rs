//! Best-effort teardown of running mirror processes.
//!
//! # Responsibilities
//! - Sweep the OS process table for mirroring and fallback processes
//! - Send a kill signal to each match
//!
//! # Design Decisions
//! - Matching is by command-line substring, not tracked PIDs: the mirror
//!   process is spawned and owned by an external supervisor this engine
//!   never observes, so the command-line signature is the only correlation
//!   available. A process that merely embeds the same substring will be
//!   killed too; accepted limitation.
//! - Finding nothing to kill is informational, not an error

use sysinfo::{Pid, PidExt, ProcessExt, System, SystemExt};

use crate::command::FALLBACK_MSG;

/// Sweeps the process table and terminates mirror processes.
pub trait Reaper: Send + Sync {
    /// Kill every process whose command line contains `signature` or the
    /// fallback sentinel. Returns false when the sweep itself failed, not
    /// when there was simply nothing to kill.
    fn kill_matching(&self, signature: &str) -> bool;
}

/// True when a command line identifies a mirror or fallback process.
pub fn matches_signature(cmdline: &str, signature: &str) -> bool {
    cmdline.contains(signature) || cmdline.contains(FALLBACK_MSG)
}

/// Select the PIDs to kill from `(pid, cmdline)` pairs.
pub fn select_victims<'a, I>(processes: I, signature: &str) -> Vec<u32>
where
    I: IntoIterator<Item = (u32, &'a str)>,
{
    processes
        .into_iter()
        .filter(|(_, cmdline)| matches_signature(cmdline, signature))
        .map(|(pid, _)| pid)
        .collect()
}

/// Reaper backed by the live OS process table.
pub struct SystemReaper;

impl Reaper for SystemReaper {
    fn kill_matching(&self, signature: &str) -> bool {
        tracing::info!("Looking for existing traffic mirror processes");
        let mut system = System::new();
        system.refresh_processes();

        let table: Vec<(u32, String)> = system
            .processes()
            .iter()
            .map(|(pid, process)| (pid.as_u32(), process.cmd().join(" ")))
            .collect();
        let victims = select_victims(
            table.iter().map(|(pid, cmdline)| (*pid, cmdline.as_str())),
            signature,
        );

        let mut success = true;
        let mut killed_any = false;
        for pid in victims {
            // The process may have exited between the scan and the signal.
            let killed = system
                .process(Pid::from_u32(pid))
                .map(|process| {
                    tracing::info!(pid, command = %process.cmd().join(" "), "Killing traffic mirror process");
                    process.kill()
                })
                .unwrap_or(false);
            if killed {
                killed_any = true;
            } else {
                tracing::error!(pid, "Attempt to kill traffic mirror process failed!");
                success = false;
            }
        }
        if !killed_any {
            tracing::info!("Did not kill any traffic mirror processes");
        }
        success
    }
}
