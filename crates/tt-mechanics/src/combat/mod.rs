//! Battle turn engine.
//!
//! Tracks both rosters of a battle and the global turn counter. The active
//! combatant is never stored: it is derived from the rosters and the counter
//! each time it is read, so roster edits between turns cannot leave a stale
//! pointer behind.

pub mod setup;

pub use setup::{build_battle_state, start_battle};

use tracing::debug;
use tt_core::{Battle, BattleCharacterState, BattleState, Character, CharacterId, Side};

use crate::error::{MechError, MechResult};

/// A partial update to one combatant. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatantUpdate {
    /// New hit points.
    pub current_hp: Option<u32>,
    /// New status label.
    pub status: Option<String>,
}

impl CombatantUpdate {
    /// Set hit points.
    pub fn hp(mut self, hp: u32) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Set the status label.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// The turn state of one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnEngine {
    state: BattleState,
    current_turn: u32,
}

impl TurnEngine {
    /// Start at turn 1.
    pub fn new(state: BattleState) -> Self {
        Self::with_turn(state, 1)
    }

    /// Resume at a given turn. Turn 0 is treated as turn 1.
    pub fn with_turn(state: BattleState, current_turn: u32) -> Self {
        Self {
            state,
            current_turn: current_turn.max(1),
        }
    }

    /// Load the rosters and counter of a stored battle.
    pub fn from_battle(battle: &Battle) -> Self {
        Self::with_turn(battle.battle_state.clone(), battle.current_turn)
    }

    /// Copy the rosters and counter back into a stored battle.
    pub fn write_back(&self, battle: &mut Battle) {
        battle.battle_state = self.state.clone();
        battle.current_turn = self.current_turn;
    }

    /// Both rosters.
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Consume the engine, returning the rosters.
    pub fn into_state(self) -> BattleState {
        self.state
    }

    /// The global turn counter (1-based).
    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    /// Move to the next turn. Returns the new counter.
    pub fn advance_turn(&mut self) -> u32 {
        self.current_turn = self.current_turn.saturating_add(1);
        debug!(turn = self.current_turn, "advanced turn");
        self.current_turn
    }

    /// Every combatant in initiative sequence: ascending `turn_order`, ties
    /// kept in roster position with allies before opponents.
    pub fn initiative_order(&self) -> Vec<(Side, &BattleCharacterState)> {
        let mut order: Vec<_> = self.state.combatants().collect();
        order.sort_by_key(|(_, c)| c.turn_order);
        order
    }

    /// Position of the active combatant in [`initiative_order`](Self::initiative_order),
    /// or `None` when no one is fighting.
    pub fn active_index(&self) -> Option<usize> {
        let n = self.state.len();
        if n == 0 {
            return None;
        }
        Some((self.current_turn.max(1) - 1) as usize % n)
    }

    /// The combatant whose turn it is, or `None` when no one is fighting.
    pub fn active_combatant(&self) -> Option<(Side, &BattleCharacterState)> {
        let index = self.active_index()?;
        self.initiative_order().into_iter().nth(index)
    }

    /// The active combatant together with its character template. Returns
    /// `None` if there is no active combatant or its template is gone.
    pub fn active_with_template<'c, F>(
        &self,
        lookup: F,
    ) -> Option<(Side, &BattleCharacterState, &'c Character)>
    where
        F: Fn(CharacterId) -> Option<&'c Character>,
    {
        let (side, state) = self.active_combatant()?;
        let character = lookup(state.character_id)?;
        Some((side, state, character))
    }

    /// 1-based round number: how many times the initiative order has been
    /// cycled through. `None` when no one is fighting.
    pub fn round(&self) -> Option<u32> {
        let n = u32::try_from(self.state.len()).ok().filter(|&n| n > 0)?;
        Some((self.current_turn.max(1) - 1) / n + 1)
    }

    /// Which side a character fights on, if any.
    pub fn side_of(&self, id: CharacterId) -> Option<Side> {
        if self.state.allies.iter().any(|c| c.character_id == id) {
            Some(Side::Allies)
        } else if self.state.opponents.iter().any(|c| c.character_id == id) {
            Some(Side::Opponents)
        } else {
            None
        }
    }

    /// Look up a combatant on either side.
    pub fn combatant(&self, id: CharacterId) -> Option<(Side, &BattleCharacterState)> {
        self.state.combatants().find(|(_, c)| c.character_id == id)
    }

    /// Apply a partial update to the combatant with `id` on `side`. Roster
    /// order is untouched. Returns false, changing nothing, if no such
    /// combatant exists on that side.
    pub fn update_combatant(&mut self, side: Side, id: CharacterId, update: CombatantUpdate) -> bool {
        let Some(entry) = self
            .state
            .roster_mut(side)
            .iter_mut()
            .find(|c| c.character_id == id)
        else {
            debug!(%id, %side, "no combatant to update");
            return false;
        };
        if let Some(hp) = update.current_hp {
            entry.current_hp = hp;
        }
        if let Some(status) = update.status {
            entry.status = status;
        }
        true
    }

    /// Add `delta` to a combatant's hit points, stopping at 0. There is no
    /// upper limit. Returns the new value, or `None` if no such combatant
    /// exists on that side.
    pub fn adjust_hp(&mut self, side: Side, id: CharacterId, delta: i64) -> Option<u32> {
        let current = self
            .state
            .roster(side)
            .iter()
            .find(|c| c.character_id == id)?
            .current_hp;
        let hp = i64::from(current)
            .saturating_add(delta)
            .clamp(0, i64::from(u32::MAX)) as u32;
        self.update_combatant(side, id, CombatantUpdate::default().hp(hp));
        Some(hp)
    }

    /// Add a combatant to the end of a roster. A character can only fight
    /// on one side at a time.
    pub fn add_combatant(&mut self, side: Side, combatant: BattleCharacterState) -> MechResult<()> {
        let id = combatant.character_id;
        if let Some(existing) = self.side_of(id) {
            return Err(MechError::DuplicateCombatant { id, side: existing });
        }
        debug!(%id, %side, turn_order = combatant.turn_order, "added combatant");
        self.state.roster_mut(side).push(combatant);
        Ok(())
    }

    /// Remove a combatant from a roster, returning its state.
    pub fn remove_combatant(&mut self, side: Side, id: CharacterId) -> Option<BattleCharacterState> {
        let roster = self.state.roster_mut(side);
        let index = roster.iter().position(|c| c.character_id == id)?;
        debug!(%id, %side, "removed combatant");
        Some(roster.remove(index))
    }
}
