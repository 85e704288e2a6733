use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::store::UserId;

/// Integer identifier of a character record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something a character can do: an attack, a spell, a trait.
///
/// `damage` is usually a dice formula such as `"2d6+3"`, but it is stored as
/// typed by the user and only evaluated when rolled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Identifier, unique within the owning character.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Damage formula, if the ability deals damage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<String>,
    /// Range, e.g. `"30 ft"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// Additional effect text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    /// Passive abilities are always on and never "used".
    #[serde(default)]
    pub is_passive: bool,
}

impl Ability {
    /// Create an active ability with no damage, range, or effect.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            damage: None,
            range: None,
            effect: None,
            is_passive: false,
        }
    }

    /// Set the damage formula.
    pub fn with_damage(mut self, formula: impl Into<String>) -> Self {
        self.damage = Some(formula.into());
        self
    }

    /// Mark the ability as passive.
    pub fn passive(mut self) -> Self {
        self.is_passive = true;
        self
    }
}

/// The fields supplied when creating a character. The store assigns the
/// ID, owner, and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    /// Display name.
    pub name: String,
    /// Maximum hit points.
    pub hp: u32,
    /// Movement speed.
    pub speed: u32,
    /// Armor class.
    pub ac: u32,
    /// Initiative modifier (may be negative).
    pub initiative: i32,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Abilities in display order.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Whether other users may see this character.
    #[serde(default)]
    pub is_public: bool,
}

impl NewCharacter {
    /// Start a character with the given name and maximum hit points.
    pub fn new(name: impl Into<String>, hp: u32) -> Self {
        Self {
            name: name.into(),
            hp,
            speed: 30,
            ac: 10,
            initiative: 0,
            tags: Vec::new(),
            abilities: Vec::new(),
            is_public: false,
        }
    }

    /// Set the initiative modifier.
    pub fn with_initiative(mut self, initiative: i32) -> Self {
        self.initiative = initiative;
        self
    }

    /// Set the armor class.
    pub fn with_ac(mut self, ac: u32) -> Self {
        self.ac = ac;
        self
    }

    /// Append an ability.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }
}

/// A character template. Teams and battles refer to it by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Store-assigned identifier.
    pub id: CharacterId,
    /// The user who created this character.
    pub owner: UserId,
    /// Display name.
    pub name: String,
    /// Maximum hit points.
    pub hp: u32,
    /// Movement speed.
    pub speed: u32,
    /// Armor class.
    pub ac: u32,
    /// Initiative modifier (may be negative).
    pub initiative: i32,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Abilities in display order.
    #[serde(default)]
    pub abilities: Vec<Ability>,
    /// Whether other users may see this character.
    #[serde(default)]
    pub is_public: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Character {
    pub(crate) fn from_new(id: CharacterId, owner: UserId, new: NewCharacter) -> CoreResult<Self> {
        if new.name.trim().is_empty() {
            return Err(CoreError::Validation("character name is required".into()));
        }
        let mut character = Self {
            id,
            owner,
            name: new.name,
            hp: new.hp,
            speed: new.speed,
            ac: new.ac,
            initiative: new.initiative,
            tags: new.tags,
            abilities: Vec::with_capacity(new.abilities.len()),
            is_public: new.is_public,
            created_at: Utc::now(),
        };
        for ability in new.abilities {
            character.add_ability(ability)?;
        }
        Ok(character)
    }

    /// Look up an ability by its ID.
    pub fn ability(&self, id: &str) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.id == id)
    }

    /// Append an ability. Ability IDs must be unique within a character.
    pub fn add_ability(&mut self, ability: Ability) -> CoreResult<()> {
        if self.ability(&ability.id).is_some() {
            return Err(CoreError::DuplicateAbility(ability.id));
        }
        self.abilities.push(ability);
        Ok(())
    }

    /// Returns true if the character carries the tag (case-insensitive).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Re-check a character whose fields were edited directly.
    pub(crate) fn check(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("character name is required".into()));
        }
        let mut seen = HashSet::new();
        match self.abilities.iter().find(|a| !seen.insert(a.id.as_str())) {
            Some(dup) => Err(CoreError::DuplicateAbility(dup.id.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(new: NewCharacter) -> Character {
        Character::from_new(CharacterId(1), UserId(1), new).unwrap()
    }

    #[test]
    fn from_new_copies_fields() {
        let c = make(NewCharacter::new("Kael", 24).with_initiative(3).with_ac(15));
        assert_eq!(c.id, CharacterId(1));
        assert_eq!(c.name, "Kael");
        assert_eq!(c.hp, 24);
        assert_eq!(c.ac, 15);
        assert_eq!(c.initiative, 3);
        assert!(!c.is_public);
    }

    #[test]
    fn blank_name_rejected() {
        let result = Character::from_new(CharacterId(1), UserId(1), NewCharacter::new("  ", 5));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn duplicate_ability_rejected() {
        let mut c = make(NewCharacter::new("Kael", 24).with_ability(Ability::new("slash", "Slash")));
        let err = c.add_ability(Ability::new("slash", "Other")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateAbility(id) if id == "slash"));
        assert_eq!(c.abilities.len(), 1);
    }

    #[test]
    fn duplicate_ability_in_new_rejected() {
        let new = NewCharacter::new("Kael", 24)
            .with_ability(Ability::new("a", "A"))
            .with_ability(Ability::new("a", "B"));
        assert!(Character::from_new(CharacterId(1), UserId(1), new).is_err());
    }

    #[test]
    fn ability_lookup() {
        let c = make(
            NewCharacter::new("Mira", 18)
                .with_ability(Ability::new("bolt", "Fire Bolt").with_damage("1d10"))
                .with_ability(Ability::new("ward", "Ward").passive()),
        );
        assert_eq!(c.ability("bolt").unwrap().damage.as_deref(), Some("1d10"));
        assert!(c.ability("ward").unwrap().is_passive);
        assert!(c.ability("missing").is_none());
    }

    #[test]
    fn tags_case_insensitive() {
        let mut new = NewCharacter::new("Mira", 18);
        new.tags = vec!["Caster".into(), "elf".into()];
        let c = make(new);
        assert!(c.has_tag("caster"));
        assert!(c.has_tag("ELF"));
        assert!(!c.has_tag("dwarf"));
    }

    #[test]
    fn ability_serializes_camel_case() {
        let json = serde_json::to_value(Ability::new("ward", "Ward").passive()).unwrap();
        assert_eq!(json["isPassive"], true);
        assert!(json.get("damage").is_none());
    }
}
