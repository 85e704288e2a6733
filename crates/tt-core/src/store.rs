use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::{Battle, BattleId, NewBattle};
use crate::character::{Character, CharacterId, NewCharacter};
use crate::error::{CoreError, CoreResult};
use crate::team::{Team, TeamId, TeamRules};

/// Identifier of the user who owns a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory record store for characters, teams, and battles.
///
/// IDs are assigned from per-kind counters starting at 1 and are never
/// reused. Deleting a character does not touch the teams or battles that
/// reference it. Listings are returned in ascending ID order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    characters: BTreeMap<CharacterId, Character>,
    teams: BTreeMap<TeamId, Team>,
    battles: BTreeMap<BattleId, Battle>,
    next_character_id: u64,
    next_team_id: u64,
    next_battle_id: u64,
    #[serde(skip)]
    rules: TeamRules,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            characters: BTreeMap::new(),
            teams: BTreeMap::new(),
            battles: BTreeMap::new(),
            next_character_id: 1,
            next_team_id: 1,
            next_battle_id: 1,
            rules: TeamRules::default(),
        }
    }

    /// Replace the roster rules used for team edits.
    pub fn with_team_rules(mut self, rules: TeamRules) -> Self {
        self.rules = rules;
        self
    }

    /// The roster rules used for team edits.
    pub fn team_rules(&self) -> TeamRules {
        self.rules
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Load a store snapshot. A missing file yields an empty store.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no store snapshot, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            characters = store.characters.len(),
            teams = store.teams.len(),
            battles = store.battles.len(),
            "loaded store snapshot"
        );
        Ok(store)
    }

    /// Write the store to disk as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "saved store snapshot");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Create a character owned by `owner`. Returns its ID.
    pub fn create_character(&mut self, owner: UserId, new: NewCharacter) -> CoreResult<CharacterId> {
        let id = CharacterId(self.next_character_id);
        let character = Character::from_new(id, owner, new)?;
        self.next_character_id += 1;
        debug!(%id, name = %character.name, "created character");
        self.characters.insert(id, character);
        Ok(id)
    }

    /// Get a character by ID.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Apply a partial update to a character. The update runs on a copy and
    /// is only stored if it succeeds and leaves a valid record. The ID, owner,
    /// and creation time cannot be changed.
    pub fn update_character<F>(&mut self, id: CharacterId, update: F) -> CoreResult<&Character>
    where
        F: FnOnce(&mut Character) -> CoreResult<()>,
    {
        let existing = self
            .characters
            .get(&id)
            .ok_or(CoreError::CharacterNotFound(id))?;
        let mut edited = existing.clone();
        update(&mut edited)?;
        edited.id = existing.id;
        edited.owner = existing.owner;
        edited.created_at = existing.created_at;
        edited.check()?;
        self.characters.insert(id, edited);
        Ok(&self.characters[&id])
    }

    /// Delete a character. Returns whether a record was removed.
    pub fn delete_character(&mut self, id: CharacterId) -> bool {
        let removed = self.characters.remove(&id).is_some();
        if removed {
            debug!(%id, "deleted character");
        }
        removed
    }

    /// All characters, or only those owned by `owner`.
    pub fn characters(&self, owner: Option<UserId>) -> Vec<&Character> {
        self.characters
            .values()
            .filter(|c| owner.is_none_or(|o| c.owner == o))
            .collect()
    }

    /// Characters marked public, regardless of owner.
    pub fn public_characters(&self) -> Vec<&Character> {
        self.characters.values().filter(|c| c.is_public).collect()
    }

    /// Resolve a list of IDs to their templates, keeping dangling IDs as
    /// `None` so callers can skip them.
    pub fn resolve_roster(&self, ids: &[CharacterId]) -> Vec<(CharacterId, Option<&Character>)> {
        ids.iter().map(|&id| (id, self.character(id))).collect()
    }

    // -----------------------------------------------------------------------
    // Teams
    // -----------------------------------------------------------------------

    /// Create a team owned by `owner`. Returns its ID.
    pub fn create_team(
        &mut self,
        owner: UserId,
        name: impl Into<String>,
        members: &[CharacterId],
    ) -> CoreResult<TeamId> {
        let id = TeamId(self.next_team_id);
        let team = Team::new(id, owner, name, members, self.rules)?;
        self.next_team_id += 1;
        debug!(%id, name = %team.name, members = team.len(), "created team");
        self.teams.insert(id, team);
        Ok(id)
    }

    /// Get a team by ID.
    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.get(&id)
    }

    /// Apply an edit to a team. The edit receives the store's roster rules,
    /// runs on a copy, and is only stored if it succeeds and the result still
    /// satisfies those rules.
    pub fn update_team<F>(&mut self, id: TeamId, update: F) -> CoreResult<&Team>
    where
        F: FnOnce(&mut Team, TeamRules) -> CoreResult<()>,
    {
        let existing = self.teams.get(&id).ok_or(CoreError::TeamNotFound(id))?;
        let mut edited = existing.clone();
        update(&mut edited, self.rules)?;
        edited.id = existing.id;
        edited.owner = existing.owner;
        edited.created_at = existing.created_at;
        edited.check(self.rules)?;
        self.teams.insert(id, edited);
        Ok(&self.teams[&id])
    }

    /// Delete a team. Returns whether a record was removed.
    pub fn delete_team(&mut self, id: TeamId) -> bool {
        self.teams.remove(&id).is_some()
    }

    /// All teams, or only those owned by `owner`.
    pub fn teams(&self, owner: Option<UserId>) -> Vec<&Team> {
        self.teams
            .values()
            .filter(|t| owner.is_none_or(|o| t.owner == o))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Battles
    // -----------------------------------------------------------------------

    /// Create a battle owned by `owner`. Returns its ID.
    pub fn create_battle(&mut self, owner: UserId, new: NewBattle) -> CoreResult<BattleId> {
        if new.name.trim().is_empty() {
            return Err(CoreError::Validation("battle name is required".into()));
        }
        let id = BattleId(self.next_battle_id);
        self.next_battle_id += 1;
        let battle = Battle {
            id,
            owner,
            name: new.name,
            team_id: new.team_id,
            opponent_team_id: new.opponent_team_id,
            current_turn: new.current_turn.unwrap_or(1),
            battle_state: new.battle_state,
            created_at: Utc::now(),
        };
        debug!(%id, name = %battle.name, combatants = battle.battle_state.len(), "created battle");
        self.battles.insert(id, battle);
        Ok(id)
    }

    /// Get a battle by ID.
    pub fn battle(&self, id: BattleId) -> Option<&Battle> {
        self.battles.get(&id)
    }

    /// Apply an edit to a battle. The last write wins.
    pub fn update_battle<F>(&mut self, id: BattleId, update: F) -> CoreResult<&Battle>
    where
        F: FnOnce(&mut Battle) -> CoreResult<()>,
    {
        let existing = self
            .battles
            .get(&id)
            .ok_or(CoreError::BattleNotFound(id))?;
        let mut edited = existing.clone();
        update(&mut edited)?;
        edited.id = existing.id;
        edited.owner = existing.owner;
        edited.created_at = existing.created_at;
        self.battles.insert(id, edited);
        Ok(&self.battles[&id])
    }

    /// Delete a battle. Returns whether a record was removed.
    pub fn delete_battle(&mut self, id: BattleId) -> bool {
        self.battles.remove(&id).is_some()
    }

    /// All battles, or only those owned by `owner`.
    pub fn battles(&self, owner: Option<UserId>) -> Vec<&Battle> {
        self.battles
            .values()
            .filter(|b| owner.is_none_or(|o| b.owner == o))
            .collect()
    }
}
