//! Configuration schema definitions.

use std::path::PathBuf;

/// Seconds between reconciliation attempts when none is configured.
pub const DEFAULT_UPDATE_FREQUENCY_SECS: u64 = 10;

/// Construction-time configuration for the mirror updater.
///
/// Every field is fixed at construction and immutable for the life of the
/// process.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Local ports whose traffic is mirrored. Example: `[8080, 8081]`.
    pub ports: Vec<u16>,

    /// Max QPS to mirror to each repeater.
    pub max_qps: u32,

    /// Seconds between updates of the mirror configuration.
    pub update_frequency_secs: u64,

    /// Filesystem locations the engine reads and writes.
    pub paths: MirrorPaths,
}

/// Fixed filesystem locations.
#[derive(Debug, Clone)]
pub struct MirrorPaths {
    /// The gor binary the launch script invokes. Also the signature the
    /// process reaper matches against.
    pub binary: PathBuf,

    /// Dynamic launch script consumed by the external supervisor.
    pub script: PathBuf,

    /// Command template rendered on each update.
    pub template: PathBuf,
}

impl Default for MirrorPaths {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("/opt/go/bin/gor"),
            script: PathBuf::from("/etc/mirror-updater/gor/mirror.sh"),
            template: PathBuf::from("templates/gor/mirror.sh.template"),
        }
    }
}
