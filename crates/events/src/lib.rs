//! `herald-events` — synchronous in-process event emitter.
//!
//! Producers call [`Emitter::emit`]; every listener registered for that
//! event runs immediately, in registration order (front-inserted listeners
//! first), in the caller's thread. The emitter does not know what produces
//! its events: timers, sockets, child processes and plain application code
//! all look the same from here.
//!
//! ```ignore
//! use herald_events::{Emitter, Listener, args};
//!
//! let emitter = Emitter::new();
//! let greet = Listener::new(|_, args| {
//!     println!("hello {}", args[0]);
//!     Ok(())
//! });
//! emitter.on("greet", greet.clone())?;
//! emitter.emit("greet", &args!["world"])?;
//! emitter.off("greet", &greet)?;
//! ```

pub mod arg;
pub mod emitter;
pub mod listener;
pub mod subscription;

pub use arg::Arg;
pub use emitter::Emitter;
pub use listener::{Listener, ListenerEntry, ListenerResult};
pub use subscription::Subscription;

pub use herald_core::{
    EmitterConfig, EmitterError, EmitterResult, ErrorKind, EventId, ListenerId, OverflowPolicy,
    SharedError, Symbol,
};
