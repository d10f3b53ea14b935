//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the executable
//! controller and the scheduler it owns.
//!
//! ## Sentinel values
//! - `bus_capacity` is clamped to a minimum of 1 by [`Config::bus_capacity_clamped`]
//! - a task budget of `Duration::ZERO` means "unmonitored" (per-task setting,
//!   not part of this struct, documented here for discoverability)

use std::time::Duration;

/// Global configuration for one executable.
///
/// Defines:
/// - **Tick period**: the scheduler's fundamental time quantum; every task
///   period must be a whole multiple of it
/// - **Stall detection**: how many start-poll checks a module may spend in
///   the Starting state before the controller raises a critical error
/// - **Event system**: broadcast bus capacity for diagnostics delivery
#[derive(Clone, Debug)]
pub struct Config {
    /// Scheduler tick period.
    ///
    /// Time advances in whole ticks; a task with period `p` runs every
    /// `p / tick` ticks. Registering a task whose period is not a positive
    /// multiple of this value is a configuration error.
    pub tick: Duration,

    /// Number of start-phase checks a module may remain in Starting.
    ///
    /// The controller polls once per tick during the start phase. A module
    /// that has neither reported operational nor skipped starting after this
    /// many checks is considered stalled; the controller raises a critical
    /// error naming it and initiates shutdown.
    pub starting_check_limit: u32,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers lagging behind more than this many events skip the
    /// older ones. Minimum effective value is 1.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the bus capacity clamped to a minimum of 1.
    ///
    /// The [`Bus`](crate::events::Bus) uses this value to avoid constructing
    /// an invalid channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `tick = 10ms` (common control-loop quantum)
    /// - `starting_check_limit = 500` (5 s of checks at the default tick)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(10),
            starting_check_limit: 500,
            bus_capacity: 1024,
        }
    }
}
