//! # Module registry: records, dependency validation, topological order.
//!
//! The registry owns one [`ModuleRecord`] per registered module. It is
//! mutated only during the lifecycle phases — never concurrently with the
//! tick loop — so plain vector storage in dependency order is all that is
//! needed: after [`Registry::validate_and_sort`] the record order is a
//! topological order of the dependency graph, and the controller walks it
//! forwards for init/start and backwards for stop/deinit.
//!
//! ## Rules
//! - Duplicate names are rejected at registration.
//! - Unknown dependency names and dependency cycles are fatal configuration
//!   errors detected by `validate_and_sort` at the head of Initialize.
//! - Sorting is stable: among unconstrained modules, registration order wins.

use std::sync::Arc;

use crate::error::RuntimeError;
use crate::module::{Module, ModuleState};

/// Per-module bookkeeping owned by the executable controller.
pub(crate) struct ModuleRecord {
    pub module: Arc<dyn Module>,
    pub state: ModuleState,
    /// Start-poll checks spent in the Starting state, for stall detection.
    pub starting_checks: u32,
}

impl ModuleRecord {
    fn new(module: Arc<dyn Module>) -> Self {
        Self {
            module,
            state: ModuleState::NotInitialized,
            starting_checks: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }
}

/// Ordered collection of module records.
#[derive(Default)]
pub(crate) struct Registry {
    records: Vec<ModuleRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module; rejects duplicate names.
    pub fn insert(&mut self, module: Arc<dyn Module>) -> Result<(), RuntimeError> {
        if self.records.iter().any(|r| r.name() == module.name()) {
            return Err(RuntimeError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        self.records.push(ModuleRecord::new(module));
        Ok(())
    }

    /// Verifies the dependency graph and reorders records topologically.
    ///
    /// Kahn's algorithm over the "dependency before dependent" relation;
    /// a non-empty remainder means a cycle and names a module on it.
    pub fn validate_and_sort(&mut self) -> Result<(), RuntimeError> {
        for record in &self.records {
            for dep in record.module.dependencies() {
                if !self.records.iter().any(|r| r.name() == dep) {
                    return Err(RuntimeError::UnknownDependency {
                        module: record.name().to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let n = self.records.len();
        let mut placed = vec![false; n];
        let mut order: Vec<usize> = Vec::with_capacity(n);

        while order.len() < n {
            let mut progressed = false;
            for i in 0..n {
                if placed[i] {
                    continue;
                }
                let deps_placed = self.records[i].module.dependencies().iter().all(|dep| {
                    self.records
                        .iter()
                        .enumerate()
                        .any(|(j, r)| placed[j] && r.name() == dep)
                });
                if deps_placed {
                    placed[i] = true;
                    order.push(i);
                    progressed = true;
                }
            }
            if !progressed {
                let stuck = self
                    .records
                    .iter()
                    .enumerate()
                    .find(|(i, _)| !placed[*i])
                    .map(|(_, r)| r.name().to_string())
                    .unwrap_or_default();
                return Err(RuntimeError::DependencyCycle { name: stuck });
            }
        }

        let mut sorted = Vec::with_capacity(n);
        // Drain in topological order, preserving record state.
        let mut taken: Vec<Option<ModuleRecord>> =
            self.records.drain(..).map(Some).collect();
        for i in order {
            sorted.push(taken[i].take().expect("record drained twice"));
        }
        self.records = sorted;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, idx: usize) -> &ModuleRecord {
        &self.records[idx]
    }

    pub fn record_mut(&mut self, idx: usize) -> &mut ModuleRecord {
        &mut self.records[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.name() == name)
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ModuleRecord> {
        self.records.iter_mut()
    }

    /// True when every module reached Operational.
    pub fn all_operational(&self) -> bool {
        self.records
            .iter()
            .all(|r| r.state == ModuleState::Operational)
    }

    /// True when every dependency of `idx` reached Operational.
    pub fn dependencies_operational(&self, idx: usize) -> bool {
        self.records[idx].module.dependencies().iter().all(|dep| {
            self.records
                .iter()
                .any(|r| r.name() == dep && r.state == ModuleState::Operational)
        })
    }
}
