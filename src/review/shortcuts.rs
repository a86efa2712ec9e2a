//! Keyboard shortcuts for the focused record.
//!
//! A binding exists only while a record detail view is mounted. Binding
//! returns a [`Subscription`]; dropping it removes the binding, so an
//! unmounted view can never receive keys. At most one record is bound at a
//! time: binding a new record supersedes the previous binding.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;

pub const KEY_ACCEPT: char = 'a';
pub const KEY_REJECT: char = 's';
pub const KEY_GO_TO_TIME: char = 'd';

/// What a key press asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Accept(String),
    Reject(String),
    GoToTime(String),
}

impl ReviewAction {
    pub fn for_key(key: char, record_id: &str) -> Option<Self> {
        let id = record_id.to_string();
        match key {
            KEY_ACCEPT => Some(Self::Accept(id)),
            KEY_REJECT => Some(Self::Reject(id)),
            KEY_GO_TO_TIME => Some(Self::GoToTime(id)),
            _ => None,
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            Self::Accept(id) | Self::Reject(id) | Self::GoToTime(id) => id,
        }
    }
}

#[derive(Debug, Default)]
struct Binding {
    next_token: u64,
    active: Option<(u64, String)>,
}

/// Document-level key dispatch, scoped to the focused record.
#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    inner: Arc<Mutex<Binding>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the shortcut keys to `record_id` until the returned guard drops.
    #[must_use = "the binding is removed as soon as the subscription is dropped"]
    pub fn bind(&self, record_id: &str) -> Subscription {
        let mut binding = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        binding.next_token += 1;
        let token = binding.next_token;
        if let Some((_, previous)) = binding.active.replace((token, record_id.to_string())) {
            debug!(previous = %previous, record_id, "Shortcut binding superseded");
        }
        debug!(record_id, token, "Shortcuts bound");

        Subscription {
            token,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Resolves a key press against the current binding.
    pub fn dispatch(&self, key: char) -> Option<ReviewAction> {
        let binding = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        binding
            .active
            .as_ref()
            .and_then(|(_, record_id)| ReviewAction::for_key(key, record_id))
    }

    pub fn bound_record(&self) -> Option<String> {
        let binding = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        binding.active.as_ref().map(|(_, id)| id.clone())
    }

    pub fn is_bound(&self) -> bool {
        self.bound_record().is_some()
    }
}

/// Guard for one binding. Unbinds on drop.
#[derive(Debug)]
pub struct Subscription {
    token: u64,
    registry: Weak<Mutex<Binding>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|inner| {
            let binding = inner.lock().unwrap_or_else(PoisonError::into_inner);
            matches!(binding.active, Some((token, _)) if token == self.token)
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let mut binding = inner.lock().unwrap_or_else(PoisonError::into_inner);
        // A superseded guard must not remove its successor's binding.
        if matches!(binding.active, Some((token, _)) if token == self.token) {
            if let Some((_, record_id)) = binding.active.take() {
                debug!(record_id = %record_id, "Shortcuts unbound");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_map_to_actions() {
        let registry = ShortcutRegistry::new();
        let _sub = registry.bind("p-1");

        assert_eq!(registry.dispatch('a'), Some(ReviewAction::Accept("p-1".into())));
        assert_eq!(registry.dispatch('s'), Some(ReviewAction::Reject("p-1".into())));
        assert_eq!(registry.dispatch('d'), Some(ReviewAction::GoToTime("p-1".into())));
        assert_eq!(registry.dispatch('x'), None);
    }

    #[test]
    fn test_drop_unbinds() {
        let registry = ShortcutRegistry::new();
        let sub = registry.bind("p-1");
        assert!(sub.is_active());
        drop(sub);

        assert!(!registry.is_bound());
        assert_eq!(registry.dispatch('a'), None);
    }

    #[test]
    fn test_rebinding_leaves_single_binding() {
        let registry = ShortcutRegistry::new();
        let first = registry.bind("p-1");
        let second = registry.bind("p-2");

        assert!(!first.is_active());
        assert!(second.is_active());
        assert_eq!(registry.dispatch('a'), Some(ReviewAction::Accept("p-2".into())));

        // Dropping the superseded guard leaves the new binding in place.
        drop(first);
        assert_eq!(registry.bound_record().as_deref(), Some("p-2"));

        drop(second);
        assert!(!registry.is_bound());
    }

    #[test]
    fn test_mount_unmount_cycles_do_not_accumulate() {
        let registry = ShortcutRegistry::new();
        for _ in 0..5 {
            let sub = registry.bind("p-1");
            assert_eq!(registry.dispatch('a'), Some(ReviewAction::Accept("p-1".into())));
            drop(sub);
        }
        assert_eq!(registry.dispatch('a'), None);
    }

    #[test]
    fn test_guard_outliving_registry_is_harmless() {
        let registry = ShortcutRegistry::new();
        let sub = registry.bind("p-1");
        drop(registry);
        assert!(!sub.is_active());
        drop(sub);
    }
}
