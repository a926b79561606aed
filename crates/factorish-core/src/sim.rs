//! Tick bookkeeping and the world state hash.
//!
//! The world advances in whole ticks. Hosts driven by a frame clock instead
//! of a fixed timer use [`SimulationStrategy::Delta`], which banks elapsed
//! time and runs as many whole ticks as fit.

use crate::fixed::{Fixed64, Ticks};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Simulation strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStrategy {
    /// One tick per `advance` call.
    #[default]
    Tick,
    /// `advance(elapsed)` accumulates time and runs one tick per
    /// `tick_length` units, carrying the remainder forward.
    Delta { tick_length: Ticks },
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// Ticks run since the world was created.
    pub tick: Ticks,
    /// Time banked towards the next tick in delta mode.
    pub accumulator: Ticks,
    pub strategy: SimulationStrategy,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks to run for `elapsed` time units.
    pub fn steps_for(&mut self, elapsed: Ticks) -> u64 {
        match self.strategy {
            SimulationStrategy::Tick => 1,
            SimulationStrategy::Delta { tick_length } => {
                if tick_length == 0 {
                    return 0;
                }
                self.accumulator = self.accumulator.saturating_add(elapsed);
                let steps = self.accumulator / tick_length;
                self.accumulator %= tick_length;
                steps
            }
        }
    }
}

/// Outcome of [`World::advance`](crate::world::World::advance).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceResult {
    pub steps_run: u64,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A deterministic hash of world state for desync detection.
///
/// FNV-1a (64-bit). Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[u8::from(v)]);
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(&self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
