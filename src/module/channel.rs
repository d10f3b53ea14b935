//! # Shared plumbing for in-process channel modules.
//!
//! A channel module implements both the provider and the consumer facade of
//! one interface: providers publish into its [`DataElement`]s, consumers
//! read, subscribe, and invoke its [`Operation`]s. The per-interface facade
//! itself is a concrete type written (or generated) per application — what
//! is common to all of them lives here.
//!
//! [`ChannelCore`] owns the interface-wide subscriber state: the set of
//! owner modules whose handlers are currently admitted, and one
//! [`ElementGate`] per data element so activation can be flipped across all
//! elements at once when the controller announces a module's lifecycle
//! transition.
//!
//! ## Usage
//! ```rust,no_run
//! use chassis::{ChannelCore, DataElement, Operation};
//! use std::sync::Arc;
//!
//! struct SpeedInterface {
//!     core: ChannelCore,
//!     velocity: Arc<DataElement<f64>>,
//!     adjust: Operation<(f64, f64), f64>,
//! }
//!
//! impl SpeedInterface {
//!     fn new() -> Self {
//!         let core = ChannelCore::new();
//!         let velocity = core.element::<f64>("velocity");
//!         Self { core, velocity, adjust: Operation::new("adjust") }
//!     }
//! }
//! ```
//! The enclosing module forwards its `start_event_handler_for_module` /
//! `stop_event_handler_for_module` call-ins to
//! [`ChannelCore::activate_module`] / [`ChannelCore::deactivate_module`].
//!
//! [`Operation`]: crate::com::Operation

use std::sync::{Arc, Mutex};

use crate::com::{ActiveOwners, DataElement, ElementGate};

/// Interface-wide subscriber state of one channel module.
#[derive(Default)]
pub struct ChannelCore {
    owners: Arc<ActiveOwners>,
    gates: Mutex<Vec<Arc<dyn ElementGate>>>,
}

impl ChannelCore {
    /// Creates an empty core; elements are added with [`element`](Self::element).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a data element wired to this core's active-owner set.
    ///
    /// The element takes part in [`activate_module`](Self::activate_module) /
    /// [`deactivate_module`](Self::deactivate_module) from now on.
    pub fn element<T: Send + Sync + 'static>(&self, name: &str) -> Arc<DataElement<T>> {
        let element = Arc::new(DataElement::new(name, Arc::clone(&self.owners)));
        self.gates
            .lock()
            .expect("channel gates poisoned")
            .push(element.clone() as Arc<dyn ElementGate>);
        element
    }

    /// Admits every handler registered under `module`, on all elements.
    ///
    /// Also records the owner so handlers it registers later start active.
    pub fn activate_module(&self, module: &str) {
        self.owners.add(module);
        let gates = self.gates.lock().expect("channel gates poisoned");
        for gate in gates.iter() {
            gate.activate_for(module);
        }
    }

    /// Withdraws every handler registered under `module`, on all elements.
    pub fn deactivate_module(&self, module: &str) {
        self.owners.remove(module);
        let gates = self.gates.lock().expect("channel gates poisoned");
        for gate in gates.iter() {
            gate.deactivate_for(module);
        }
    }

    /// True while `module`'s handlers are admitted.
    pub fn is_module_active(&self, module: &str) -> bool {
        self.owners.contains(module)
    }
}
