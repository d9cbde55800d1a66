//! Endpoint sources.
//!
//! # Responsibilities
//! - Expose the current set of mirror destination endpoints
//! - Notify registered observers when an endpoint joins or leaves the set
//! - Construct the concrete source variant from a tagged config payload
//!
//! # Design Decisions
//! - Observer registration is an explicit interface (`register_on_add` /
//!   `register_on_remove`), not ad-hoc attribute wiring
//! - Callbacks carry the affected endpoint only; observers that need the
//!   full set read it back through `endpoints()`

pub mod endpoint;
pub mod static_list;

pub use endpoint::Endpoint;
pub use static_list::StaticSource;

use std::sync::Arc;

use serde::Deserialize;

/// Callback invoked when the endpoint set changes.
///
/// Must not call back into the source that fired it.
pub type EndpointCallback = Box<dyn Fn(&Endpoint) + Send + Sync>;

/// A source of mirror destination endpoints.
pub trait EndpointSource: Send + Sync {
    /// Begin endpoint discovery. Invoked once, before the first
    /// reconciliation attempt.
    fn start(&self);

    /// Snapshot of the current endpoint set.
    fn endpoints(&self) -> Vec<Endpoint>;

    /// Register a callback fired when an endpoint joins the set.
    fn register_on_add(&self, callback: EndpointCallback);

    /// Register a callback fired when an endpoint leaves the set.
    fn register_on_remove(&self, callback: EndpointCallback);
}

/// Tagged source configuration payload.
///
/// The `source_class` discriminator selects the concrete variant; the
/// remaining fields are variant-specific.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "source_class", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Fixed endpoint list, given up front.
    Static { endpoints: Vec<Endpoint> },
}

/// Build an endpoint source from its configuration payload.
pub fn build_source(config: SourceConfig) -> Arc<dyn EndpointSource> {
    match config {
        SourceConfig::Static { endpoints } => Arc::new(StaticSource::new(endpoints)),
    }
}
