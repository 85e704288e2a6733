//! Tabletop mechanics: a dice formula evaluator and a battle turn engine.
//!
//! The evaluator turns strings like `"2d6+3"` into a total and a readable
//! breakdown, drawing die faces from an injected [`RandomSource`]. It never
//! fails: malformed input yields an invalid outcome with a zero total.
//!
//! The turn engine tracks two rosters of combatants and derives the active
//! combatant from the global turn counter on every read.

pub mod combat;
pub mod config;
pub mod dice;
pub mod error;

pub use combat::{CombatantUpdate, TurnEngine, build_battle_state, start_battle};
pub use config::RollConfig;
pub use dice::{
    Die, OutcomeKind, RandomSource, RollOutcome, RolledTerm, SequenceSource, roll_formula,
    roll_formula_with,
};
pub use error::{MechError, MechResult};
