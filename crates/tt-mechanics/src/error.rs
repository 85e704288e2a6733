//! Error types for the mechanics engine.

use tt_core::{CharacterId, Side};

/// Errors that can occur during mechanics operations.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// The character already fights in this battle.
    #[error("character {id} is already on the {side} side")]
    DuplicateCombatant {
        /// The character that was added twice.
        id: CharacterId,
        /// The side it is already on.
        side: Side,
    },

    /// A record the operation depends on is missing.
    #[error(transparent)]
    Core(#[from] tt_core::CoreError),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
