use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::character::CharacterId;
use crate::store::UserId;
use crate::team::TeamId;

/// Integer identifier of a battle record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(pub u64);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two rosters in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The player's team.
    Allies,
    /// The opposing team.
    Opponents,
}

impl Side {
    /// Parse a side name: `ally`, `allies`, `opponent`, or `opponents`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ally" | "allies" => Some(Self::Allies),
            "opponent" | "opponents" => Some(Self::Opponents),
            _ => None,
        }
    }

    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Allies => Self::Opponents,
            Self::Opponents => Self::Allies,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allies => write!(f, "allies"),
            Self::Opponents => write!(f, "opponents"),
        }
    }
}

/// A combatant's state for one battle.
///
/// This is separate from the [`Character`](crate::Character) template:
/// `current_hp` may exceed the template's maximum, and `turn_order` only
/// applies within this battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleCharacterState {
    /// The character template this combatant was created from.
    pub character_id: CharacterId,
    /// Hit points remaining. Never negative.
    pub current_hp: u32,
    /// Free-text status label, e.g. `"prone"` or `"blessed"`.
    #[serde(default)]
    pub status: String,
    /// Initiative position. Lower values act first; gaps are allowed.
    pub turn_order: i32,
}

impl BattleCharacterState {
    /// Create a combatant with an empty status.
    pub fn new(character_id: CharacterId, current_hp: u32, turn_order: i32) -> Self {
        Self {
            character_id,
            current_hp,
            status: String::new(),
            turn_order,
        }
    }
}

/// Both rosters of a battle. A character ID appears on at most one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    /// The player's combatants.
    #[serde(default)]
    pub allies: Vec<BattleCharacterState>,
    /// The opposing combatants.
    #[serde(default)]
    pub opponents: Vec<BattleCharacterState>,
}

impl BattleState {
    /// The roster for a side.
    pub fn roster(&self, side: Side) -> &[BattleCharacterState] {
        match side {
            Side::Allies => &self.allies,
            Side::Opponents => &self.opponents,
        }
    }

    /// Mutable access to the roster for a side.
    pub fn roster_mut(&mut self, side: Side) -> &mut Vec<BattleCharacterState> {
        match side {
            Side::Allies => &mut self.allies,
            Side::Opponents => &mut self.opponents,
        }
    }

    /// Total number of combatants on both sides.
    pub fn len(&self) -> usize {
        self.allies.len() + self.opponents.len()
    }

    /// Returns true if neither side has combatants.
    pub fn is_empty(&self) -> bool {
        self.allies.is_empty() && self.opponents.is_empty()
    }

    /// Allies followed by opponents, each tagged with its side.
    pub fn combatants(&self) -> impl Iterator<Item = (Side, &BattleCharacterState)> {
        self.allies
            .iter()
            .map(|c| (Side::Allies, c))
            .chain(self.opponents.iter().map(|c| (Side::Opponents, c)))
    }
}

/// A saved battle between two rosters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    /// Store-assigned identifier.
    pub id: BattleId,
    /// The user who started this battle.
    pub owner: UserId,
    /// Display name.
    pub name: String,
    /// The team the allies were drawn from.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    /// The team the opponents were drawn from.
    #[serde(default)]
    pub opponent_team_id: Option<TeamId>,
    /// Global turn counter, starting at 1.
    pub current_turn: u32,
    /// Combatant state for both sides.
    pub battle_state: BattleState,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// The fields supplied when creating a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBattle {
    /// Display name.
    pub name: String,
    /// The team the allies were drawn from.
    pub team_id: Option<TeamId>,
    /// The team the opponents were drawn from.
    pub opponent_team_id: Option<TeamId>,
    /// Starting turn; `None` starts at 1.
    pub current_turn: Option<u32>,
    /// Initial combatant state.
    pub battle_state: BattleState,
}

impl NewBattle {
    /// A battle with empty rosters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parse() {
        assert_eq!(Side::parse("ally"), Some(Side::Allies));
        assert_eq!(Side::parse("Allies"), Some(Side::Allies));
        assert_eq!(Side::parse(" opponents "), Some(Side::Opponents));
        assert_eq!(Side::parse("opponent"), Some(Side::Opponents));
        assert_eq!(Side::parse("enemy"), None);
        assert_eq!(Side::Allies.opposite(), Side::Opponents);
    }

    #[test]
    fn roster_access() {
        let mut state = BattleState::default();
        assert!(state.is_empty());
        state
            .roster_mut(Side::Opponents)
            .push(BattleCharacterState::new(CharacterId(2), 7, 1));
        assert_eq!(state.roster(Side::Opponents).len(), 1);
        assert!(state.roster(Side::Allies).is_empty());
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn combatants_lists_allies_first() {
        let state = BattleState {
            allies: vec![BattleCharacterState::new(CharacterId(1), 10, 5)],
            opponents: vec![BattleCharacterState::new(CharacterId(2), 10, 1)],
        };
        let sides: Vec<Side> = state.combatants().map(|(side, _)| side).collect();
        assert_eq!(sides, vec![Side::Allies, Side::Opponents]);
    }

    #[test]
    fn state_blob_uses_camel_case() {
        let state = BattleState {
            allies: vec![BattleCharacterState::new(CharacterId(1), 12, 2)],
            opponents: Vec::new(),
        };
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"allies":[{"characterId":1,"currentHp":12,"status":"","turnOrder":2}],"opponents":[]}"#
        );
    }

    #[test]
    fn state_blob_tolerates_missing_status() {
        let json = r#"{"allies":[{"characterId":3,"currentHp":4,"turnOrder":1}]}"#;
        let state: BattleState = serde_json::from_str(json).unwrap();
        assert_eq!(state.allies[0].status, "");
        assert!(state.opponents.is_empty());
    }
}
