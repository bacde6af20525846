//! Listener handles and the entries stored in an emitter's registry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use herald_core::{EventId, ListenerId};

use crate::arg::Arg;
use crate::emitter::Emitter;

/// Outcome of a listener body. Failures are redirected to the `"error"` event.
pub type ListenerResult = anyhow::Result<()>;

type Callback = dyn Fn(&Emitter, &[Arg]) -> ListenerResult + Send + Sync;

/// A shareable callback with a stable identity.
///
/// Closures have no identity of their own, so each `Listener` gets a
/// [`ListenerId`] when it is created. Keep a clone of the handle to remove the
/// listener later; equality is identity, never behaviour.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Arc<Callback>,
}

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Emitter, &[Arg]) -> ListenerResult + Send + Sync + 'static,
    {
        Self::with_id(ListenerId::new(), callback)
    }

    pub(crate) fn with_id<F>(id: ListenerId, callback: F) -> Self
    where
        F: Fn(&Emitter, &[Arg]) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            id,
            callback: Arc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the callback with `emitter` as its context.
    pub fn call(&self, emitter: &Emitter, args: &[Arg]) -> ListenerResult {
        (self.callback)(emitter, args)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl core::hash::Hash for Listener {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Debug for Listener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// A registry entry.
///
/// `Once` stores the self-removing `wrapper` that is actually invoked next to
/// the caller's `original`, which is only used to match removals and for
/// introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEntry {
    Plain(Listener),
    Once { wrapper: Listener, original: Listener },
}

impl ListenerEntry {
    /// Build a once-entry for `event`.
    ///
    /// The wrapper runs at most once across every copy of it: it detaches its
    /// own entry from the emitter and then calls `original`.
    pub(crate) fn once(event: EventId, original: Listener) -> Self {
        let wrapper_id = ListenerId::new();
        let fired = AtomicBool::new(false);
        let target = original.clone();

        let wrapper = Listener::with_id(wrapper_id, move |emitter: &Emitter, args: &[Arg]| {
            if fired.swap(true, Ordering::AcqRel) {
                return Ok(());
            }
            emitter.detach(&event, wrapper_id)?;
            target.call(emitter, args)
        });

        ListenerEntry::Once { wrapper, original }
    }

    /// True if `listener` is the stored callback or, for once-entries, the
    /// original the caller registered.
    pub fn matches(&self, listener: &Listener) -> bool {
        match self {
            ListenerEntry::Plain(l) => l == listener,
            ListenerEntry::Once { wrapper, original } => wrapper == listener || original == listener,
        }
    }

    /// The listener the emitter invokes.
    pub fn invoker(&self) -> &Listener {
        match self {
            ListenerEntry::Plain(l) => l,
            ListenerEntry::Once { wrapper, .. } => wrapper,
        }
    }

    /// The listener as the caller registered it.
    pub fn original(&self) -> &Listener {
        match self {
            ListenerEntry::Plain(l) => l,
            ListenerEntry::Once { original, .. } => original,
        }
    }

    pub fn is_once(&self) -> bool {
        matches!(self, ListenerEntry::Once { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Listener::new(|_, _| Ok(()))
    }

    #[test]
    fn clones_share_identity() {
        let a = noop();
        let b = noop();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn once_entry_matches_wrapper_and_original() {
        let original = noop();
        let entry = ListenerEntry::once(EventId::from("x"), original.clone());

        assert!(entry.is_once());
        assert!(entry.matches(&original));
        assert!(entry.matches(entry.invoker()));
        assert_ne!(entry.invoker(), &original);
        assert_eq!(entry.original(), &original);
        assert!(!entry.matches(&noop()));
    }

    #[test]
    fn plain_entry_is_its_own_original() {
        let l = noop();
        let entry = ListenerEntry::Plain(l.clone());
        assert!(!entry.is_once());
        assert_eq!(entry.invoker(), &l);
        assert_eq!(entry.original(), &l);
    }
}
