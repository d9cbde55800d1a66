//! Fixed-list endpoint source.

use std::sync::Mutex;

use super::{Endpoint, EndpointCallback, EndpointSource};

/// An endpoint source backed by an in-memory list.
///
/// Serves static deployments where the repeater fleet is known up front, and
/// doubles as the harness for exercising the reconciliation engine: `add`
/// and `remove` fire the registered callbacks exactly the way a
/// discovery-backed source would.
pub struct StaticSource {
    inner: Mutex<Inner>,
}

struct Inner {
    endpoints: Vec<Endpoint>,
    on_add: Vec<EndpointCallback>,
    on_remove: Vec<EndpointCallback>,
}

impl StaticSource {
    /// Create a source seeded with `endpoints`.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                endpoints,
                on_add: Vec::new(),
                on_remove: Vec::new(),
            }),
        }
    }

    /// Add an endpoint and notify observers. Duplicates are ignored.
    pub fn add(&self, endpoint: Endpoint) {
        let mut inner = self.lock();
        if inner.endpoints.contains(&endpoint) {
            return;
        }
        inner.endpoints.push(endpoint.clone());
        for callback in &inner.on_add {
            callback(&endpoint);
        }
    }

    /// Remove an endpoint and notify observers. Absent endpoints are ignored.
    pub fn remove(&self, endpoint: &Endpoint) {
        let mut inner = self.lock();
        let before = inner.endpoints.len();
        inner.endpoints.retain(|e| e != endpoint);
        if inner.endpoints.len() == before {
            return;
        }
        for callback in &inner.on_remove {
            callback(endpoint);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl EndpointSource for StaticSource {
    fn start(&self) {
        tracing::info!(
            endpoints = self.lock().endpoints.len(),
            "Static endpoint source started"
        );
    }

    fn endpoints(&self) -> Vec<Endpoint> {
        self.lock().endpoints.clone()
    }

    fn register_on_add(&self, callback: EndpointCallback) {
        self.lock().on_add.push(callback);
    }

    fn register_on_remove(&self, callback: EndpointCallback) {
        self.lock().on_remove.push(callback);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_add_and_remove_fire_callbacks() {
        let source = StaticSource::new(vec![]);
        let adds = Arc::new(AtomicUsize::new(0));
        let removes = Arc::new(AtomicUsize::new(0));

        let counter = adds.clone();
        source.register_on_add(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = removes.clone();
        source.register_on_remove(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let ep = Endpoint::new("10.0.0.5", 9000);
        source.add(ep.clone());
        source.add(ep.clone()); // duplicate, no second callback
        assert_eq!(adds.load(Ordering::SeqCst), 1);
        assert_eq!(source.endpoints().len(), 1);

        source.remove(&ep);
        source.remove(&ep); // already gone, no second callback
        assert_eq!(removes.load(Ordering::SeqCst), 1);
        assert!(source.endpoints().is_empty());
    }

    #[test]
    fn test_endpoints_returns_snapshot() {
        let source = StaticSource::new(vec![Endpoint::new("a", 1)]);
        let snapshot = source.endpoints();
        source.add(Endpoint::new("b", 2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(source.endpoints().len(), 2);
    }
}
