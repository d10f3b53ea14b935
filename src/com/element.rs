//! # Typed data element with change-notification fan-out.
//!
//! A [`DataElement`] is one named slot of the provider/consumer contract:
//! the provider publishes values into it, consumers read the latest sample
//! or subscribe to changes. Publishing is zero-copy capable — a provider
//! fills a [`DataBuffer`], hands it over, and every subscriber observes the
//! same shared [`Sample`].
//!
//! ## Fan-out
//! Publishing replaces the cached sample and then invokes every *active*
//! change handler with a clone of the new sample. Handlers are invoked from
//! a snapshot of the handler table taken before the first call, so a handler
//! that re-enters `set` affects only the next publication. The internal lock
//! is released while handlers run.
//!
//! ## Activation gating
//! Handlers are registered under the name of the module that owns them and
//! stay dormant until that owner appears in the element's [`ActiveOwners`]
//! set — which the executable controller drives from module lifecycle
//! transitions. A handler registered while its owner is already active is
//! active immediately.
//!
//! ## Threading
//! All state sits behind a mutex: publications normally originate on the
//! scheduler's tick loop, but external transports may call in from their own
//! threads and must observe consistent state.

use std::sync::{Arc, Mutex};

use crate::com::handle::{DataBuffer, Sample};
use crate::error::{Error, Result};

/// Set of module names whose change handlers are currently admitted.
///
/// One set is shared by all elements of a channel module; the channel's
/// `start_event_handler_for_module` / `stop_event_handler_for_module`
/// implementations mutate it.
#[derive(Debug, Default)]
pub struct ActiveOwners {
    names: Mutex<Vec<String>>,
}

impl ActiveOwners {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an owner; idempotent.
    pub fn add(&self, name: &str) {
        let mut names = self.names.lock().expect("active-owner set poisoned");
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    /// Removes an owner if present.
    pub fn remove(&self, name: &str) {
        let mut names = self.names.lock().expect("active-owner set poisoned");
        names.retain(|n| n != name);
    }

    /// True when the owner is currently admitted.
    pub fn contains(&self, name: &str) -> bool {
        let names = self.names.lock().expect("active-owner set poisoned");
        names.iter().any(|n| n == name)
    }
}

/// Activation surface of a data element, type-erased.
///
/// A channel module holds one gate per element so it can flip all handlers
/// of an owner without knowing the element's value type.
pub trait ElementGate: Send + Sync {
    /// Marks every handler registered under `owner` active.
    fn activate_for(&self, owner: &str);

    /// Marks every handler registered under `owner` dormant.
    fn deactivate_for(&self, owner: &str);
}

/// Change handler bound to an owner module name.
struct ReceiverHandler<T> {
    owner: String,
    handler: Arc<dyn Fn(Sample<T>) + Send + Sync>,
    is_active: bool,
}

struct ElementState<T> {
    sample: Option<Sample<T>>,
    handlers: Vec<ReceiverHandler<T>>,
}

/// One named, typed data element of an interface.
pub struct DataElement<T> {
    name: String,
    owners: Arc<ActiveOwners>,
    state: Mutex<ElementState<T>>,
}

impl<T: Send + Sync + 'static> DataElement<T> {
    /// Creates an element wired to the given active-owner set.
    pub fn new(name: impl Into<String>, owners: Arc<ActiveOwners>) -> Self {
        Self {
            name: name.into(),
            owners,
            state: Mutex::new(ElementState {
                sample: None,
                handlers: Vec::new(),
            }),
        }
    }

    /// Returns the element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hands back a fresh buffer for zero-copy publication.
    pub fn allocate(&self) -> Result<DataBuffer<T>>
    where
        T: Default,
    {
        Ok(DataBuffer::default())
    }

    /// Publishes an already-filled buffer; transfers ownership.
    pub fn set_allocated(&self, buffer: DataBuffer<T>) -> Result<()> {
        if buffer.is_empty() {
            return Err(Error::not_ok(format!(
                "cannot publish an empty buffer to '{}'",
                self.name
            )));
        }
        self.publish(Sample::from(buffer));
        Ok(())
    }

    /// Copy-publishes a value.
    pub fn set(&self, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.publish(Sample::new(value.clone()));
        Ok(())
    }

    /// Returns the latest sample, or an error when nothing was produced yet.
    pub fn get_allocated(&self) -> Result<Sample<T>> {
        let state = self.state.lock().expect("data element poisoned");
        state.sample.clone().ok_or_else(|| {
            Error::not_ok(format!("no sample available for '{}'", self.name))
        })
    }

    /// Returns a value-copy of the latest sample, or a default value.
    pub fn get(&self) -> T
    where
        T: Clone + Default,
    {
        let state = self.state.lock().expect("data element poisoned");
        state
            .sample
            .as_ref()
            .map(|s| (**s).clone())
            .unwrap_or_default()
    }

    /// Registers a change handler owned by `owner`.
    ///
    /// The handler starts active only if the owner is already admitted; it
    /// observes publications from the next `set` on, never the historical
    /// sample.
    pub fn register_handler(
        &self,
        owner: impl Into<String>,
        handler: impl Fn(Sample<T>) + Send + Sync + 'static,
    ) {
        let owner = owner.into();
        let is_active = self.owners.contains(&owner);
        let mut state = self.state.lock().expect("data element poisoned");
        state.handlers.push(ReceiverHandler {
            owner,
            handler: Arc::new(handler),
            is_active,
        });
    }

    /// Replaces the cached sample and notifies active handlers.
    fn publish(&self, sample: Sample<T>) {
        let snapshot: Vec<Arc<dyn Fn(Sample<T>) + Send + Sync>> = {
            let mut state = self.state.lock().expect("data element poisoned");
            state.sample = Some(sample.clone());
            state
                .handlers
                .iter()
                .filter(|h| h.is_active)
                .map(|h| Arc::clone(&h.handler))
                .collect()
        };
        for handler in snapshot {
            handler(sample.clone());
        }
    }
}

impl<T: Send + Sync + 'static> ElementGate for DataElement<T> {
    fn activate_for(&self, owner: &str) {
        let mut state = self.state.lock().expect("data element poisoned");
        for h in state.handlers.iter_mut().filter(|h| h.owner == owner) {
            h.is_active = true;
        }
    }

    fn deactivate_for(&self, owner: &str) {
        let mut state = self.state.lock().expect("data element poisoned");
        for h in state.handlers.iter_mut().filter(|h| h.owner == owner) {
            h.is_active = false;
        }
    }
}
