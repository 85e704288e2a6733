//! Core types for the tabletop companion: characters, teams, battles, and
//! the record store that persists them.
//!
//! Records reference each other by integer ID and are never embedded. A
//! team or battle may keep an ID whose character has since been deleted;
//! lookups for such IDs resolve to `None` instead of failing.

/// Battle records and per-battle combatant state.
pub mod battle;
/// Character templates and their abilities.
pub mod character;
/// Error types used throughout the crate.
pub mod error;
/// In-memory record store with a JSON snapshot on disk.
pub mod store;
/// Teams: ordered rosters of character IDs with ability selections.
pub mod team;

/// Re-export battle types.
pub use battle::{Battle, BattleCharacterState, BattleId, BattleState, NewBattle, Side};
/// Re-export character types.
pub use character::{Ability, Character, CharacterId, NewCharacter};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export the store and owner ID.
pub use store::{Store, UserId};
/// Re-export team types.
pub use team::{Team, TeamId, TeamRules};
