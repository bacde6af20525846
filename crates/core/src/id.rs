//! Identifiers: event identifiers (names and symbols) and listener identities.

use std::borrow::Cow;
use std::sync::Arc;

use uuid::Uuid;

/// Identity of a registered listener handle.
///
/// Clones of a listener share its id; two independently created listeners
/// never do, even when they wrap the same function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new identifier (UUIDv7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Opaque, unforgeable event token.
///
/// Equality and hashing use the token's identity only: two symbols created
/// with the same description are different identifiers.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: Uuid,
    description: Option<Arc<str>>,
}

impl Symbol {
    pub fn new(description: impl Into<Arc<str>>) -> Self {
        Self {
            id: Uuid::now_v7(),
            description: Some(description.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            id: Uuid::now_v7(),
            description: None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl core::hash::Hash for Symbol {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for Symbol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

/// Key under which listeners are grouped and emissions are routed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventId {
    Name(Cow<'static, str>),
    Symbol(Symbol),
}

impl EventId {
    /// Announced before a listener is added to any other event.
    pub const NEW_LISTENER: EventId = EventId::Name(Cow::Borrowed("newListener"));

    /// Announced after a listener has been removed.
    pub const REMOVE_LISTENER: EventId = EventId::Name(Cow::Borrowed("removeListener"));

    /// Carries listener failures; escalates when nobody listens.
    pub const ERROR: EventId = EventId::Name(Cow::Borrowed("error"));

    pub fn name(&self) -> Option<&str> {
        match self {
            EventId::Name(name) => Some(name),
            EventId::Symbol(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        *self == Self::ERROR
    }

    pub fn is_new_listener(&self) -> bool {
        *self == Self::NEW_LISTENER
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EventId::Name(name) => f.write_str(name),
            EventId::Symbol(symbol) => core::fmt::Display::fmt(symbol, f),
        }
    }
}

impl From<&'static str> for EventId {
    fn from(value: &'static str) -> Self {
        EventId::Name(Cow::Borrowed(value))
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        EventId::Name(Cow::Owned(value))
    }
}

impl From<Symbol> for EventId {
    fn from(value: Symbol) -> Self {
        EventId::Symbol(value)
    }
}

impl From<&Symbol> for EventId {
    fn from(value: &Symbol) -> Self {
        EventId::Symbol(value.clone())
    }
}

impl From<&EventId> for EventId {
    fn from(value: &EventId) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn borrowed_and_owned_names_are_the_same_event() {
        let a = EventId::from("data");
        let b = EventId::from(String::from("data"));
        assert_eq!(a, b);

        let set: HashSet<EventId> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn symbols_compare_by_identity() {
        let a = Symbol::new("tick");
        let b = Symbol::new("tick");
        assert_ne!(EventId::from(&a), EventId::from(&b));
        assert_eq!(EventId::from(&a), EventId::from(a.clone()));
        assert_eq!(a.description(), Some("tick"));
    }

    #[test]
    fn symbol_never_collides_with_a_name() {
        let sym = Symbol::new("error");
        assert!(!EventId::from(sym).is_error());
        assert!(EventId::from("error").is_error());
    }

    #[test]
    fn display_names_and_symbols() {
        assert_eq!(EventId::NEW_LISTENER.to_string(), "newListener");
        assert_eq!(EventId::from(Symbol::new("ready")).to_string(), "Symbol(ready)");
        assert_eq!(EventId::from(Symbol::anonymous()).to_string(), "Symbol()");
    }

    #[test]
    fn listener_ids_are_unique() {
        let a = ListenerId::new();
        let b = ListenerId::new();
        assert_ne!(a, b);
        let copy = a;
        assert_eq!(a, copy);
        assert_ne!(a.to_string(), b.to_string());
    }
}
