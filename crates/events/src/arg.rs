//! Dynamically typed emission arguments.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use herald_core::{EmitterError, EventId, SharedError};

use crate::listener::Listener;

/// One argument passed from `emit` to every listener.
///
/// Emitters carry heterogeneous payloads: plain data, errors (for the
/// `"error"` event), and the `(event, listener)` pairs announced by the
/// `"newListener"` / `"removeListener"` meta-events. Anything else can travel
/// as an [`Arg::Opaque`] value and be downcast by the receiver.
#[derive(Clone)]
pub enum Arg {
    Value(JsonValue),
    Error(SharedError),
    Event(EventId),
    Listener(Listener),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Arg {
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Arg::Opaque(Arc::new(value))
    }

    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            Arg::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(JsonValue::as_i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(JsonValue::as_str)
    }

    pub fn as_error(&self) -> Option<&SharedError> {
        match self {
            Arg::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventId> {
        match self {
            Arg::Event(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Arg::Listener(l) => Some(l),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Arg::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

// Errors and opaque payloads have no value equality; they compare by allocation.
impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Value(a), Arg::Value(b)) => a == b,
            (Arg::Error(a), Arg::Error(b)) => Arc::ptr_eq(a, b),
            (Arg::Event(a), Arg::Event(b)) => a == b,
            (Arg::Listener(a), Arg::Listener(b)) => a == b,
            (Arg::Opaque(a), Arg::Opaque(b)) => {
                core::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl core::fmt::Debug for Arg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Arg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Arg::Error(err) => f.debug_tuple("Error").field(&format_args!("{err}")).finish(),
            Arg::Event(id) => f.debug_tuple("Event").field(id).finish(),
            Arg::Listener(l) => f.debug_tuple("Listener").field(&l.id()).finish(),
            Arg::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl core::fmt::Display for Arg {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Arg::Value(JsonValue::String(s)) => f.write_str(s),
            Arg::Value(v) => core::fmt::Display::fmt(v, f),
            Arg::Error(err) => core::fmt::Display::fmt(err, f),
            Arg::Event(id) => core::fmt::Display::fmt(id, f),
            Arg::Listener(l) => write!(f, "[listener {}]", l.id()),
            Arg::Opaque(_) => f.write_str("[opaque]"),
        }
    }
}

macro_rules! impl_from_json {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Arg {
                fn from(value: $t) -> Self {
                    Arg::Value(JsonValue::from(value))
                }
            }
        )+
    };
}

impl_from_json!(bool, i32, i64, u32, u64, usize, f64, &str, String);

impl From<JsonValue> for Arg {
    fn from(value: JsonValue) -> Self {
        Arg::Value(value)
    }
}

impl From<anyhow::Error> for Arg {
    fn from(value: anyhow::Error) -> Self {
        Arg::Error(Arc::new(value))
    }
}

impl From<SharedError> for Arg {
    fn from(value: SharedError) -> Self {
        Arg::Error(value)
    }
}

impl From<EmitterError> for Arg {
    fn from(value: EmitterError) -> Self {
        match value {
            EmitterError::Unhandled(err) => Arg::Error(err),
            other => Arg::Error(Arc::new(other.into())),
        }
    }
}

impl From<EventId> for Arg {
    fn from(value: EventId) -> Self {
        Arg::Event(value)
    }
}

impl From<Listener> for Arg {
    fn from(value: Listener) -> Self {
        Arg::Listener(value)
    }
}

/// Build a `Vec<Arg>` from values convertible into [`Arg`].
///
/// ```ignore
/// emitter.emit("data", &args![1, "two", true])?;
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_converts_each_value() {
        let args = crate::args![1, "two", true];
        assert_eq!(args.len(), 3);
        assert_eq!(args[0].as_i64(), Some(1));
        assert_eq!(args[1].as_str(), Some("two"));
        assert_eq!(args[2], Arg::from(true));
        assert!(crate::args![].is_empty());
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(Arg::from("plain").to_string(), "plain");
        assert_eq!(Arg::from(serde_json::json!({"a": 1})).to_string(), r#"{"a":1}"#);
        assert_eq!(Arg::from(anyhow::anyhow!("bad")).to_string(), "bad");
    }

    #[test]
    fn errors_compare_by_allocation() {
        let err: SharedError = Arc::new(anyhow::anyhow!("same text"));
        let a = Arg::from(Arc::clone(&err));
        let b = Arg::from(err);
        let c = Arg::from(anyhow::anyhow!("same text"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn opaque_payloads_downcast() {
        #[derive(Debug, PartialEq)]
        struct ExitCode(i32);

        let arg = Arg::opaque(ExitCode(3));
        assert_eq!(arg.downcast_ref::<ExitCode>(), Some(&ExitCode(3)));
        assert_eq!(arg.downcast_ref::<String>(), None);
        assert_eq!(arg.clone(), arg);
    }

    #[test]
    fn unhandled_emitter_error_unwraps_payload() {
        let inner: SharedError = Arc::new(anyhow::anyhow!("root cause"));
        let arg = Arg::from(EmitterError::Unhandled(Arc::clone(&inner)));
        assert!(Arc::ptr_eq(arg.as_error().unwrap(), &inner));
    }
}
