//! Selection bridge: the escape hatch for foreign-rendered interactive
//! content.
//!
//! Engine-rendered popups execute as markup outside the crate's call graph,
//! so marker clicks reach first-party logic through a single named,
//! process-wide callable. The registration is a scoped resource, not global
//! state: [`SelectionBridge`] deregisters on drop, unconditionally and
//! idempotently, and a stale entry surviving an unmount is a defect.
//! Registrations are tokenized so dropping an old guard never removes a newer
//! registration that reused its name.

use once_cell::sync::Lazy;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use crate::prelude::HashMap;

type SelectionCallback = Arc<dyn Fn(u64) + Send + Sync>;

static REGISTRY: Lazy<Mutex<HashMap<String, (u64, SelectionCallback)>>> =
    Lazy::new(|| Mutex::new(HashMap::default()));
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Owned registration of a named selection callback.
///
/// Alive for the component's active lifetime; dropping it releases the
/// registry entry.
pub struct SelectionBridge {
    name: String,
    token: u64,
}

impl SelectionBridge {
    /// Registers `callback` under `name`, replacing any previous registration
    /// with that name.
    pub fn register<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let name = name.into();
        let token = NEXT_TOKEN.fetch_add(1, Ordering::SeqCst);

        let mut registry = REGISTRY.lock().expect("selection registry poisoned");
        registry.insert(name.clone(), (token, Arc::new(callback)));
        log::trace!("selection callback '{name}' registered");

        Self { name, token }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SelectionBridge {
    fn drop(&mut self) {
        let mut registry = match REGISTRY.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Only remove the entry if it is still ours.
        if registry
            .get(&self.name)
            .map(|(token, _)| *token == self.token)
            .unwrap_or(false)
        {
            registry.remove(&self.name);
            log::trace!("selection callback '{}' deregistered", self.name);
        }
    }
}

/// Entry point for the foreign context: invokes the callback registered under
/// `name` with the clicked issue id. Returns whether a registration existed;
/// an unknown name is a no-op.
pub fn invoke(name: &str, issue_id: u64) -> bool {
    let callback = {
        let registry = REGISTRY.lock().expect("selection registry poisoned");
        registry.get(name).map(|(_, cb)| cb.clone())
    };

    match callback {
        Some(callback) => {
            callback(issue_id);
            true
        }
        None => {
            log::trace!("selection callback '{name}' not registered; click ignored");
            false
        }
    }
}

/// Whether a callback is currently registered under `name`
pub fn is_registered(name: &str) -> bool {
    REGISTRY
        .lock()
        .expect("selection registry poisoned")
        .contains_key(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64 as Counter;

    #[test]
    fn test_register_invoke_deregister() {
        let seen = Arc::new(Counter::new(0));
        let seen_in_cb = seen.clone();
        let bridge = SelectionBridge::register("test.bridge.basic", move |id| {
            seen_in_cb.store(id, Ordering::SeqCst);
        });

        assert!(is_registered("test.bridge.basic"));
        assert!(invoke("test.bridge.basic", 99));
        assert_eq!(seen.load(Ordering::SeqCst), 99);

        drop(bridge);
        assert!(!is_registered("test.bridge.basic"));
        assert!(!invoke("test.bridge.basic", 1));
    }

    #[test]
    fn test_unknown_name_is_noop() {
        assert!(!invoke("test.bridge.never-registered", 5));
    }

    #[test]
    fn test_old_guard_does_not_clobber_newer_registration() {
        let first = SelectionBridge::register("test.bridge.reuse", |_| {});
        let second = SelectionBridge::register("test.bridge.reuse", |_| {});

        // Dropping the superseded guard leaves the active registration alone
        drop(first);
        assert!(is_registered("test.bridge.reuse"));

        drop(second);
        assert!(!is_registered("test.bridge.reuse"));
    }
}
