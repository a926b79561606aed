//! Replay recording and playback.
//!
//! A [`ReplayLog`] starts from a binary world snapshot and records every tick
//! and player command after it. Playing it back must land on the same state
//! hashes that were recorded along the way.

use crate::command::Command;
use crate::fixed::Ticks;
use crate::serialize::{DeserializeError, SerializeError};
use crate::world::World;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ReplayCommand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayCommand {
    Tick,
    Advance { elapsed: Ticks },
    /// A player command. Its outcome is not recorded; a rejected command
    /// is rejected again on playback.
    Apply(Command),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Where playback first disagreed with the recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub command_index: usize,
    pub expected_hash: u64,
    pub actual_hash: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("replay snapshot could not be restored: {0}")]
    Snapshot(#[from] DeserializeError),
    #[error(
        "replay diverged at command {}: expected hash {:#018x}, got {:#018x}",
        .0.command_index,
        .0.expected_hash,
        .0.actual_hash
    )]
    Divergence(ReplayMismatch),
}

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayLog {
    pub initial_snapshot: Vec<u8>,
    pub commands: Vec<ReplayCommand>,
    /// `(command index, state hash after that command)`.
    pub hash_checkpoints: Vec<(usize, u64)>,
}

impl ReplayLog {
    /// Start recording from the current state of `world`.
    pub fn new(world: &World) -> Result<Self, SerializeError> {
        Ok(Self {
            initial_snapshot: world.serialize()?,
            commands: Vec::new(),
            hash_checkpoints: Vec::new(),
        })
    }

    pub fn record(&mut self, command: ReplayCommand) {
        self.commands.push(command);
    }

    pub fn record_with_hash(&mut self, command: ReplayCommand, hash: u64) {
        self.hash_checkpoints.push((self.commands.len(), hash));
        self.commands.push(command);
    }

    /// Run `command` on `world` and record it with the resulting hash.
    pub fn run(&mut self, world: &mut World, command: ReplayCommand) {
        apply_command(world, &command);
        self.record_with_hash(command, world.state_hash());
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        bitcode::serialize(self).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ReplayResult {
    pub world: World,
    pub commands_executed: usize,
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    pub fn is_verified(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

fn apply_command(world: &mut World, command: &ReplayCommand) {
    match command {
        ReplayCommand::Tick => world.tick(),
        ReplayCommand::Advance { elapsed } => {
            world.advance(*elapsed);
        }
        ReplayCommand::Apply(command) => {
            let _ = world.apply(command.clone());
        }
    }
}

/// Play the whole log, comparing every checkpoint.
pub fn replay_and_verify(log: &ReplayLog) -> Result<ReplayResult, DeserializeError> {
    let mut world = World::deserialize(&log.initial_snapshot)?;
    let mut first_mismatch = None;
    let mut checkpoints = log.hash_checkpoints.iter().peekable();

    for (index, command) in log.commands.iter().enumerate() {
        apply_command(&mut world, command);
        while let Some(&&(at, expected_hash)) = checkpoints.peek()
            && at <= index
        {
            checkpoints.next();
            let actual_hash = world.state_hash();
            if at == index && actual_hash != expected_hash && first_mismatch.is_none() {
                first_mismatch = Some(ReplayMismatch {
                    command_index: index,
                    expected_hash,
                    actual_hash,
                });
            }
        }
    }

    Ok(ReplayResult {
        world,
        commands_executed: log.commands.len(),
        first_mismatch,
    })
}

/// Play the log and fail on the first divergence.
pub fn verify(log: &ReplayLog) -> Result<World, ReplayError> {
    let result = replay_and_verify(log)?;
    match result.first_mismatch {
        Some(mismatch) => Err(ReplayError::Divergence(mismatch)),
        None => Ok(result.world),
    }
}

/// Play the log without checking hashes.
pub fn replay(log: &ReplayLog) -> Result<World, DeserializeError> {
    let mut world = World::deserialize(&log.initial_snapshot)?;
    for command in &log.commands {
        apply_command(&mut world, command);
    }
    Ok(world)
}
