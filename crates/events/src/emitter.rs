//! Synchronous, in-process event emitter.
//!
//! An [`Emitter`] maps event identifiers to ordered listener sequences and
//! invokes them, in order, from inside [`Emitter::emit`].
//!
//! ## Dispatch
//!
//! ```text
//! emit(id, args)
//!   ├─ lock, snapshot id's sequence, unlock
//!   ├─ empty ──► "error" ? Err(Unhandled(args[0])) : Ok(false)
//!   └─ for each listener in snapshot:
//!        └─ Err(e) ──► log, emit("error", e)   (first escalation is kept)
//! ```
//!
//! Listeners run with the lock released, so they may register, remove and
//! emit on the same emitter. Changes they make apply to later emissions, never
//! to the pass already in progress.
//!
//! ## Meta-events
//!
//! - `"newListener"` `(event, listener)`: before a listener is added to any
//!   other event.
//! - `"removeListener"` `(event, listener)`: after `remove_listener` (or a
//!   once-listener firing) took an entry out.
//! - `"error"` `(error)`: listener failures; escalates when unheard.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::{debug, error, trace, warn};

use herald_core::{
    EmitterConfig, EmitterError, EmitterResult, EventId, ListenerId, OverflowPolicy, SharedError,
};

use crate::arg::Arg;
use crate::listener::{Listener, ListenerEntry};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Position {
    Front,
    Back,
}

#[derive(Debug)]
struct Registry {
    // Keys stay in first-registration order.
    events: IndexMap<EventId, Vec<ListenerEntry>>,
    max_listeners: usize,
    overflow: OverflowPolicy,
}

impl Registry {
    fn len_of(&self, event: &EventId) -> usize {
        self.events.get(event).map(Vec::len).unwrap_or(0)
    }

    /// Check one more listener for `event` against the limit.
    ///
    /// Under `Reject` an overflow is an error; under `Warn` the would-be
    /// count is returned so the caller can report it.
    fn admit(&self, event: &EventId) -> EmitterResult<Option<usize>> {
        let count = self.len_of(event) + 1;
        if count <= self.max_listeners {
            return Ok(None);
        }
        match self.overflow {
            OverflowPolicy::Reject => Err(EmitterError::max_listeners_exceeded(
                event.clone(),
                count,
                self.max_listeners,
            )),
            OverflowPolicy::Warn => Ok(Some(count)),
        }
    }

    fn take(&mut self, event: &EventId, pred: impl Fn(&ListenerEntry) -> bool) -> Option<ListenerEntry> {
        let list = self.events.get_mut(event)?;
        let removed = list.iter().position(pred).map(|idx| list.remove(idx));
        if list.is_empty() {
            self.events.shift_remove(event);
        }
        removed
    }
}

/// In-process publish/subscribe registry.
///
/// There is no process-wide default instance: construct one and share it
/// (`Arc<Emitter>`) with whatever produces or consumes its events.
pub struct Emitter {
    registry: Mutex<Registry>,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::with_config(EmitterConfig::default())
    }
}

impl core::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let reg = self.registry();
        f.debug_struct("Emitter")
            .field("events", &reg.events.len())
            .field("max_listeners", &reg.max_listeners)
            .field("overflow", &reg.overflow)
            .finish()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EmitterConfig) -> Self {
        Self {
            registry: Mutex::new(Registry {
                events: IndexMap::new(),
                max_listeners: config.max_listeners,
                overflow: config.overflow,
            }),
        }
    }

    pub fn with_max_listeners(max: usize) -> Self {
        Self::with_config(EmitterConfig::default().with_max_listeners(max))
    }

    // No user code runs while the lock is held, so a poisoned registry is
    // still consistent.
    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- registration ----

    /// Append `listener` to `event`'s sequence.
    pub fn add_listener(&self, event: impl Into<EventId>, listener: Listener) -> EmitterResult<&Self> {
        self.register(event.into(), ListenerEntry::Plain(listener), Position::Back)
    }

    /// Alias of [`Emitter::add_listener`].
    pub fn on(&self, event: impl Into<EventId>, listener: Listener) -> EmitterResult<&Self> {
        self.add_listener(event, listener)
    }

    /// Insert `listener` at the front of `event`'s sequence.
    pub fn prepend_listener(&self, event: impl Into<EventId>, listener: Listener) -> EmitterResult<&Self> {
        self.register(event.into(), ListenerEntry::Plain(listener), Position::Front)
    }

    /// Append a listener that removes itself before its first invocation.
    ///
    /// The returned entry can still be removed with the original `listener`
    /// handle until it fires.
    pub fn once(&self, event: impl Into<EventId>, listener: Listener) -> EmitterResult<&Self> {
        let event = event.into();
        let entry = ListenerEntry::once(event.clone(), listener);
        self.register(event, entry, Position::Back)
    }

    /// [`Emitter::once`], inserted at the front.
    pub fn prepend_once_listener(
        &self,
        event: impl Into<EventId>,
        listener: Listener,
    ) -> EmitterResult<&Self> {
        let event = event.into();
        let entry = ListenerEntry::once(event.clone(), listener);
        self.register(event, entry, Position::Front)
    }

    fn register(&self, event: EventId, entry: ListenerEntry, position: Position) -> EmitterResult<&Self> {
        // Check first so a rejected listener is never announced.
        let over = {
            let reg = self.registry();
            reg.admit(&event)?.map(|count| (count, reg.max_listeners))
        };
        if let Some((count, max)) = over {
            warn_capacity(&event, count, max);
        }

        if !event.is_new_listener() {
            self.emit(
                EventId::NEW_LISTENER,
                &[Arg::Event(event.clone()), Arg::Listener(entry.original().clone())],
            )?;
        }

        let mut reg = self.registry();
        // "newListener" handlers may have registered on the same event.
        if let (Some(count), None) = (reg.admit(&event)?, over) {
            warn_capacity(&event, count, reg.max_listeners);
        }
        let list = reg.events.entry(event).or_default();
        match position {
            Position::Back => list.push(entry),
            Position::Front => list.insert(0, entry),
        }
        drop(reg);

        Ok(self)
    }

    // ---- removal ----

    /// Remove the first entry registered as `listener` (or registered through
    /// `once` with `listener`). Unknown listeners are ignored.
    pub fn remove_listener(&self, event: impl Into<EventId>, listener: &Listener) -> EmitterResult<&Self> {
        let event = event.into();
        let removed = self.registry().take(&event, |entry| entry.matches(listener));
        if removed.is_some() {
            self.announce_removal(event, listener.clone())?;
        }
        Ok(self)
    }

    /// Alias of [`Emitter::remove_listener`].
    pub fn off(&self, event: impl Into<EventId>, listener: &Listener) -> EmitterResult<&Self> {
        self.remove_listener(event, listener)
    }

    /// Drop every listener for `event`, or for all events when `None`.
    ///
    /// No `"removeListener"` events are emitted.
    pub fn remove_all_listeners(&self, event: Option<EventId>) -> &Self {
        let mut reg = self.registry();
        match event {
            Some(event) => {
                reg.events.shift_remove(&event);
            }
            None => reg.events.clear(),
        }
        self
    }

    /// Remove the entry whose invoked listener is `id`, announcing the
    /// listener the caller originally registered.
    pub(crate) fn detach(&self, event: &EventId, id: ListenerId) -> EmitterResult<()> {
        let removed = self.registry().take(event, |entry| entry.invoker().id() == id);
        if let Some(entry) = removed {
            let original = match entry {
                ListenerEntry::Plain(l) => l,
                ListenerEntry::Once { original, .. } => original,
            };
            self.announce_removal(event.clone(), original)?;
        }
        Ok(())
    }

    fn announce_removal(&self, event: EventId, listener: Listener) -> EmitterResult<()> {
        self.emit(
            EventId::REMOVE_LISTENER,
            &[Arg::Event(event), Arg::Listener(listener)],
        )?;
        Ok(())
    }

    // ---- emission ----

    /// Invoke every listener registered for `event`, in order.
    ///
    /// Returns `Ok(false)` when nobody listens. Emitting `"error"` with no
    /// listener fails with [`EmitterError::Unhandled`] instead.
    pub fn emit(&self, event: impl Into<EventId>, args: &[Arg]) -> EmitterResult<bool> {
        let event = event.into();

        let snapshot: Vec<Listener> = match self.registry().events.get(&event) {
            Some(list) if !list.is_empty() => list.iter().map(|e| e.invoker().clone()).collect(),
            _ => {
                if event.is_error() {
                    return Err(unhandled(args));
                }
                return Ok(false);
            }
        };

        trace!(event = %event, listeners = snapshot.len(), "emit");

        let mut escalation = None;
        for listener in &snapshot {
            if let Err(err) = listener.call(self, args) {
                if let Err(escalated) = self.redirect_failure(&event, err) {
                    escalation.get_or_insert(escalated);
                }
            }
        }

        match escalation {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }

    fn redirect_failure(&self, event: &EventId, err: anyhow::Error) -> EmitterResult<()> {
        error!(event = %event, error = %err, "listener failed");

        let err: SharedError = match err.downcast::<EmitterError>() {
            Ok(EmitterError::Unhandled(inner)) => inner,
            Ok(other) => Arc::new(other.into()),
            Err(err) => Arc::new(err),
        };

        // A failing "error" listener would only feed itself.
        if event.is_error() {
            return Err(EmitterError::Unhandled(err));
        }
        self.emit(EventId::ERROR, &[Arg::Error(err)])?;
        Ok(())
    }

    // ---- introspection ----

    /// Events with at least one listener.
    pub fn event_names(&self) -> Vec<EventId> {
        self.registry().events.keys().cloned().collect()
    }

    /// Number of listeners for `event`, optionally only those registered as
    /// `listener`.
    pub fn listener_count(&self, event: impl Into<EventId>, listener: Option<&Listener>) -> usize {
        let event = event.into();
        let reg = self.registry();
        let Some(list) = reg.events.get(&event) else {
            return 0;
        };
        match listener {
            Some(l) => list.iter().filter(|entry| entry.matches(l)).count(),
            None => list.len(),
        }
    }

    /// Copy of `event`'s listeners as registered (once-wrappers unwrapped).
    pub fn listeners(&self, event: impl Into<EventId>) -> Vec<Listener> {
        let event = event.into();
        self.registry()
            .events
            .get(&event)
            .map(|list| list.iter().map(|e| e.original().clone()).collect())
            .unwrap_or_default()
    }

    /// Copy of `event`'s registry entries, once-wrappers included.
    pub fn raw_listeners(&self, event: impl Into<EventId>) -> Vec<ListenerEntry> {
        let event = event.into();
        self.registry().events.get(&event).cloned().unwrap_or_default()
    }

    /// Set the per-event listener limit.
    pub fn set_max_listeners<N>(&self, n: N) -> EmitterResult<&Self>
    where
        N: TryInto<usize> + core::fmt::Display + Copy,
    {
        let max = n
            .try_into()
            .map_err(|_| EmitterError::invalid_max_listeners(n))?;
        self.registry().max_listeners = max;
        Ok(self)
    }

    pub fn get_max_listeners(&self) -> usize {
        self.registry().max_listeners
    }

    pub fn set_overflow_policy(&self, overflow: OverflowPolicy) -> &Self {
        self.registry().overflow = overflow;
        self
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.registry().overflow
    }
}

fn warn_capacity(event: &EventId, count: usize, max: usize) {
    warn!(
        event = %event,
        count,
        max,
        "possible emitter leak detected: {count} {event} listeners added, use set_max_listeners to raise the limit"
    );
}

fn unhandled(args: &[Arg]) -> EmitterError {
    let err: SharedError = match args.first() {
        Some(Arg::Error(err)) => Arc::clone(err),
        Some(other) => Arc::new(anyhow::anyhow!("Unhandled error: {other}")),
        None => Arc::new(anyhow::anyhow!("Unhandled error: undefined")),
    };
    debug!(error = %err, "unhandled error event");
    EmitterError::Unhandled(err)
}
