//! Channel-backed subscriptions.
//!
//! A [`Subscription`] turns synchronous emissions into messages on a
//! `std::sync::mpsc` channel, so a consumer on another thread can pull them at
//! its own pace. The emitter itself still delivers synchronously: the
//! forwarding listener only pushes the arguments into the channel.
//!
//! ## Usage Pattern
//!
//! ```ignore
//! let emitter = Arc::new(Emitter::new());
//! let exits = emitter.subscribe("exit")?;
//!
//! loop {
//!     match exits.recv_timeout(Duration::from_secs(1)) {
//!         Ok(args) => handle(args),
//!         Err(RecvTimeoutError::Timeout) => continue,  // check for shutdown
//!         Err(RecvTimeoutError::Disconnected) => break, // emitter gone
//!     }
//! }
//! ```
//!
//! Dropping the subscription does not unregister the listener immediately;
//! it detaches itself on the next emission that finds the receiver gone. Use
//! [`Subscription::unsubscribe`] to detach eagerly.

use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use herald_core::{EmitterResult, EventId, ListenerId};

use crate::arg::Arg;
use crate::emitter::Emitter;
use crate::listener::Listener;

/// Receiving end of [`Emitter::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    event: EventId,
    listener: Listener,
    receiver: Receiver<Vec<Arg>>,
}

impl Subscription {
    pub fn event(&self) -> &EventId {
        &self.event
    }

    /// The forwarding listener registered on the emitter.
    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    /// Block until the next emission arrives.
    pub fn recv(&self) -> Result<Vec<Arg>, RecvError> {
        self.receiver.recv()
    }

    /// Take the next emission without blocking.
    pub fn try_recv(&self) -> Result<Vec<Arg>, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for an emission.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Vec<Arg>, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Remove the forwarding listener; already queued emissions are dropped.
    pub fn unsubscribe(self, emitter: &Emitter) -> EmitterResult<()> {
        emitter.remove_listener(self.event, &self.listener)?;
        Ok(())
    }
}

impl Emitter {
    /// Register a listener that forwards every emission of `event` into a
    /// channel and return its receiving end.
    pub fn subscribe(&self, event: impl Into<EventId>) -> EmitterResult<Subscription> {
        let event = event.into();
        let (tx, rx) = mpsc::channel::<Vec<Arg>>();

        let id = ListenerId::new();
        let target = event.clone();
        let listener = Listener::with_id(id, move |emitter: &Emitter, args: &[Arg]| {
            if tx.send(args.to_vec()).is_err() {
                emitter.detach(&target, id)?;
            }
            Ok(())
        });

        self.on(event.clone(), listener.clone())?;

        Ok(Subscription {
            event,
            listener,
            receiver: rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn forwards_each_emission() {
        let emitter = Emitter::new();
        let sub = emitter.subscribe("data").unwrap();

        emitter.emit("data", &args![1]).unwrap();
        emitter.emit("data", &args!["two", 3]).unwrap();

        assert_eq!(sub.try_recv().unwrap(), args![1]);
        assert_eq!(sub.try_recv().unwrap(), args!["two", 3]);
        assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn unsubscribe_removes_forwarding_listener() {
        let emitter = Emitter::new();
        let sub = emitter.subscribe("data").unwrap();
        assert_eq!(emitter.listener_count("data", Some(sub.listener())), 1);

        sub.unsubscribe(&emitter).unwrap();
        assert_eq!(emitter.listener_count("data", None), 0);
        assert!(!emitter.emit("data", &[]).unwrap());
    }

    #[test]
    fn dropped_subscription_detaches_on_next_emit() {
        let emitter = Emitter::new();
        let sub = emitter.subscribe("data").unwrap();
        drop(sub);

        assert_eq!(emitter.listener_count("data", None), 1);
        assert!(emitter.emit("data", &[]).unwrap());
        assert_eq!(emitter.listener_count("data", None), 0);
    }
}
