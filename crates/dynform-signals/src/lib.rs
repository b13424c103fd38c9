//! # dynform-signals
//!
//! Notification dispatcher for the dynform engine. A form engine announces
//! what happened (validity changed, submit requested, photo removed, ...)
//! through a [`Signal`], and the owning view connects receivers without the
//! engine knowing who listens.
//!
//! ## Usage
//!
//! ```
//! use dynform_signals::Signal;
//! use std::sync::Arc;
//!
//! let signal: Signal<bool> = Signal::new();
//!
//! signal.connect("status_bar", Arc::new(|valid: &bool| {
//!     println!("form valid: {valid}");
//! }));
//!
//! assert_eq!(signal.send(&true), 1);
//! ```

use std::sync::{Arc, Mutex, RwLock};

/// The type signature for a signal receiver callback.
///
/// Receivers must be `Send + Sync` so that a form engine holding the signal
/// can move across `.await` points on a multi-threaded runtime.
pub type SignalReceiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A signal that can be connected to and dispatched.
///
/// Each signal carries a payload type `T`. Receivers are called
/// synchronously, in the order they were connected.
///
/// # Examples
///
/// ```
/// use dynform_signals::Signal;
/// use std::sync::Arc;
///
/// let signal: Signal<String> = Signal::new();
///
/// signal.connect("logger", Arc::new(|msg: &String| {
///     println!("Received: {msg}");
/// }));
///
/// signal.send(&"hello".to_string());
/// ```
pub struct Signal<T: 'static> {
    receivers: RwLock<Vec<(String, SignalReceiver<T>)>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("receivers", &self.receiver_ids())
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub const fn new() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Connects a receiver to this signal.
    ///
    /// The `receiver_id` is used to identify the receiver for later disconnection.
    /// If a receiver with the same ID is already connected, it is replaced in place
    /// and keeps its position in the dispatch order.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.receivers.write().expect("signal lock poisoned");

        if let Some(entry) = receivers.iter_mut().find(|(rid, _)| *rid == id) {
            entry.1 = callback;
        } else {
            receivers.push((id, callback));
        }
    }

    /// Disconnects the receiver with the given ID.
    ///
    /// Returns `true` if a receiver was found and removed.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        let len_before = receivers.len();
        receivers.retain(|(id, _)| id != receiver_id);
        receivers.len() < len_before
    }

    /// Sends the signal to all connected receivers.
    ///
    /// Returns the number of receivers that were notified.
    pub fn send(&self, payload: &T) -> usize {
        // Snapshot the receivers so a callback may connect or disconnect
        // without deadlocking on the lock.
        let snapshot: Vec<SignalReceiver<T>> = self
            .receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &snapshot {
            callback(payload);
        }
        tracing::trace!(receivers = snapshot.len(), "signal sent");
        snapshot.len()
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().expect("signal lock poisoned").len()
    }

    /// Returns the IDs of connected receivers in dispatch order.
    pub fn receiver_ids(&self) -> Vec<String> {
        self.receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl<T: Clone + Send + 'static> Signal<T> {
    /// Connects a [`Recorder`] that keeps a copy of every payload sent.
    pub fn record(&self, receiver_id: impl Into<String>) -> Recorder<T> {
        let recorder = Recorder::new();
        let sink = recorder.clone();
        self.connect(
            receiver_id,
            Arc::new(move |payload: &T| sink.push(payload.clone())),
        );
        recorder
    }
}

/// A cloneable log of payloads received from a [`Signal`].
///
/// Useful for tests and for tools that want to inspect what a form emitted
/// after the fact.
///
/// # Examples
///
/// ```
/// use dynform_signals::Signal;
///
/// let signal: Signal<u32> = Signal::new();
/// let log = signal.record("log");
/// signal.send(&1);
/// signal.send(&2);
/// assert_eq!(log.take(), vec![1, 2]);
/// assert!(log.is_empty());
/// ```
#[derive(Debug)]
pub struct Recorder<T> {
    events: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Recorder<T> {
    /// Creates an empty recorder not connected to anything.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(&self, payload: T) {
        self.events.lock().expect("recorder lock poisoned").push(payload);
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.events.lock().expect("recorder lock poisoned"))
    }

    /// Returns the number of recorded payloads.
    pub fn len(&self) -> usize {
        self.events.lock().expect("recorder lock poisoned").len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Recorder<T> {
    /// Returns a copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<T> {
        self.events.lock().expect("recorder lock poisoned").clone()
    }
}
