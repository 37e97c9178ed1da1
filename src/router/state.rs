//! State reconstruction from event history.

use prost_types::Any;
use tonic::Status;

use crate::convert::type_suffix;
use crate::proto::{event_page, EventBook};

/// Boxed applier invoked with mutable state and the raw event payload.
type ApplyFn<S> = Box<dyn Fn(&mut S, &Any) -> Result<(), Status> + Send + Sync>;

/// Boxed decoder turning a snapshot payload into a state baseline.
type SnapshotFn<S> = Box<dyn Fn(&Any) -> Result<S, Status> + Send + Sync>;

/// Factory function type for creating initial state.
pub type StateFactory<S> = Box<dyn Fn() -> S + Send + Sync>;

/// Folds an ordered event history into a typed state.
///
/// Maintains an ordered applier table keyed by event type suffix. Register
/// once at startup; `fold` per rebuild. Appliers decode the event into their
/// registered prost type and mutate a freshly constructed state; callers
/// never observe shared state.
///
/// # Example
///
/// ```rust,ignore
/// fn apply_registered(state: &mut PlayerState, event: PlayerRegistered) {
///     state.display_name = event.display_name;
///     state.exists = true;
/// }
///
/// let router = StateRouter::<PlayerState>::new()
///     .on::<PlayerRegistered>("PlayerRegistered", apply_registered)
///     .on::<FundsDeposited>("FundsDeposited", apply_deposited);
///
/// let state = router.fold(&event_book)?;
/// ```
pub struct StateRouter<S> {
    appliers: Vec<(String, ApplyFn<S>)>,
    factory: Option<StateFactory<S>>,
    snapshot: Option<SnapshotFn<S>>,
}

impl<S: Default + 'static> Default for StateRouter<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Default + 'static> StateRouter<S> {
    /// Create a new StateRouter using `S::default()` for state creation.
    pub fn new() -> Self {
        Self {
            appliers: Vec::new(),
            factory: None,
            snapshot: None,
        }
    }

    /// Create a StateRouter with a custom state factory.
    ///
    /// Use this when the state needs non-default initialization.
    pub fn with_factory(factory: fn() -> S) -> Self {
        Self {
            appliers: Vec::new(),
            factory: Some(Box::new(factory)),
            snapshot: None,
        }
    }

    /// Register an applier for events with the given type suffix.
    ///
    /// Registration is idempotent and last-wins: re-registering a suffix
    /// replaces the applier in place, preserving table order. Decode failure
    /// of a registered suffix is fatal at fold time.
    ///
    /// # Type Parameters
    ///
    /// - `E`: the prost event type the applier receives
    pub fn on<E>(mut self, suffix: impl Into<String>, handler: fn(&mut S, E)) -> Self
    where
        E: prost::Message + Default + 'static,
    {
        let suffix = suffix.into();
        let boxed: ApplyFn<S> = Box::new(move |state, event: &Any| {
            let decoded = E::decode(event.value.as_slice()).map_err(|e| {
                Status::invalid_argument(format!(
                    "Failed to decode event {}: {}",
                    event.type_url, e
                ))
            })?;
            handler(state, decoded);
            Ok(())
        });
        if let Some(entry) = self.appliers.iter_mut().find(|(s, _)| *s == suffix) {
            entry.1 = boxed;
        } else {
            self.appliers.push((suffix, boxed));
        }
        self
    }

    /// Register the decoder for snapshot baselines.
    ///
    /// When a folded book carries a snapshot with inline state, the decoder
    /// turns that payload into the starting state. Without a registered
    /// decoder the fold starts from the factory/default state; the snapshot
    /// sequence baseline still applies either way.
    pub fn snapshot_as<P>(mut self, from: fn(P) -> S) -> Self
    where
        P: prost::Message + Default + 'static,
    {
        self.snapshot = Some(Box::new(move |state: &Any| {
            let decoded = P::decode(state.value.as_slice()).map_err(|e| {
                Status::invalid_argument(format!(
                    "Failed to decode snapshot {}: {}",
                    state.type_url, e
                ))
            })?;
            Ok(from(decoded))
        }));
        self
    }

    /// Get the list of registered event type suffixes, in registration order.
    pub fn event_types(&self) -> Vec<String> {
        self.appliers.iter().map(|(s, _)| s.clone()).collect()
    }

    fn create_state(&self) -> S {
        match &self.factory {
            Some(factory) => factory(),
            None => S::default(),
        }
    }

    /// Fold an event book into a freshly constructed state.
    ///
    /// A present snapshot provides the baseline: its state is decoded as the
    /// starting point and pages at or below its sequence are skipped.
    /// External-only pages and unknown suffixes are skipped silently
    /// (future-version tolerance). Fold is a pure function of its input.
    pub fn fold(&self, book: &EventBook) -> Result<S, Status> {
        let mut state = match &book.snapshot {
            Some(snap) => match (&snap.state, &self.snapshot) {
                (Some(any), Some(decode)) => decode(any)?,
                _ => self.create_state(),
            },
            None => self.create_state(),
        };

        let baseline = book.snapshot.as_ref().map(|s| s.sequence);

        for page in &book.pages {
            if let Some(b) = baseline {
                if page.sequence <= b {
                    continue;
                }
            }
            match &page.payload {
                Some(event_page::Payload::Event(event)) => self.apply(&mut state, event)?,
                // External payloads are opaque to the core; skip.
                Some(event_page::Payload::External(_)) | None => continue,
            }
        }

        Ok(state)
    }

    /// Apply a single event to existing state.
    ///
    /// Unknown suffixes are a no-op; decode failure of a registered suffix
    /// propagates.
    pub fn apply(&self, state: &mut S, event: &Any) -> Result<(), Status> {
        let suffix = type_suffix(&event.type_url);
        for (registered, applier) in &self.appliers {
            if registered == suffix {
                return applier(state, event);
            }
        }
        Ok(())
    }
}
