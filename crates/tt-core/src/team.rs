use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::character::CharacterId;
use crate::error::{CoreError, CoreResult};
use crate::store::UserId;

/// Integer identifier of a team record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub u64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Limits applied when editing a team roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamRules {
    /// Maximum number of members on one roster.
    pub max_members: usize,
}

impl Default for TeamRules {
    fn default() -> Self {
        Self { max_members: 6 }
    }
}

impl TeamRules {
    /// Set the roster capacity (at least 1).
    pub fn with_max_members(mut self, max: usize) -> Self {
        self.max_members = max.max(1);
        self
    }
}

/// A named roster of characters plus the abilities picked for each member.
///
/// Roster order is insertion order. Member IDs are not checked against the
/// store, so a deleted character stays on the roster as a dangling ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Store-assigned identifier.
    pub id: TeamId,
    /// The user who created this team.
    pub owner: UserId,
    /// Display name.
    pub name: String,
    /// Members in roster order, without duplicates.
    pub character_ids: Vec<CharacterId>,
    /// Ability IDs selected for each member.
    #[serde(default)]
    pub character_abilities: BTreeMap<CharacterId, BTreeSet<String>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub(crate) fn new(
        id: TeamId,
        owner: UserId,
        name: impl Into<String>,
        members: &[CharacterId],
        rules: TeamRules,
    ) -> CoreResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        let mut team = Self {
            id,
            owner,
            name,
            character_ids: Vec::new(),
            character_abilities: BTreeMap::new(),
            created_at: Utc::now(),
        };
        for &member in members {
            team.add_member(member, rules)?;
        }
        Ok(team)
    }

    /// Rename the team. Blank names are rejected.
    pub fn rename(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Returns true if the character is on the roster.
    pub fn contains(&self, character: CharacterId) -> bool {
        self.character_ids.contains(&character)
    }

    /// Number of members on the roster.
    pub fn len(&self) -> usize {
        self.character_ids.len()
    }

    /// Returns true if the roster is empty.
    pub fn is_empty(&self) -> bool {
        self.character_ids.is_empty()
    }

    /// Append a member. Adding an existing member is a no-op.
    pub fn add_member(&mut self, character: CharacterId, rules: TeamRules) -> CoreResult<()> {
        if self.contains(character) {
            return Ok(());
        }
        if self.character_ids.len() >= rules.max_members {
            return Err(CoreError::TeamFull {
                team: self.name.clone(),
                max: rules.max_members,
            });
        }
        self.character_ids.push(character);
        Ok(())
    }

    /// Remove a member and its ability selection. Returns whether the
    /// member was on the roster.
    pub fn remove_member(&mut self, character: CharacterId) -> bool {
        let before = self.character_ids.len();
        self.character_ids.retain(|id| *id != character);
        self.character_abilities.remove(&character);
        self.character_ids.len() != before
    }

    /// Select an ability for a member.
    pub fn select_ability(
        &mut self,
        character: CharacterId,
        ability_id: impl Into<String>,
    ) -> CoreResult<()> {
        if !self.contains(character) {
            return Err(CoreError::NotAMember {
                team: self.name.clone(),
                character,
            });
        }
        self.character_abilities
            .entry(character)
            .or_default()
            .insert(ability_id.into());
        Ok(())
    }

    /// Drop an ability selection. Returns whether it was selected.
    pub fn deselect_ability(&mut self, character: CharacterId, ability_id: &str) -> bool {
        let Some(selected) = self.character_abilities.get_mut(&character) else {
            return false;
        };
        let removed = selected.remove(ability_id);
        if selected.is_empty() {
            self.character_abilities.remove(&character);
        }
        removed
    }

    /// The abilities selected for a member, in ID order.
    pub fn selected_abilities(&self, character: CharacterId) -> Vec<&str> {
        self.character_abilities
            .get(&character)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Re-check the roster rules on a team whose fields were edited directly.
    pub(crate) fn check(&self, rules: TeamRules) -> CoreResult<()> {
        validate_name(&self.name)?;
        if self.character_ids.len() > rules.max_members {
            return Err(CoreError::TeamFull {
                team: self.name.clone(),
                max: rules.max_members,
            });
        }
        let mut seen = BTreeSet::new();
        if let Some(dup) = self.character_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(CoreError::Validation(format!(
                "character {dup} is listed twice on team \"{}\"",
                self.name
            )));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("team name is required".into()));
    }
    Ok(())
}
