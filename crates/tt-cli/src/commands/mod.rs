pub mod battle;
pub mod character;
pub mod roll;
pub mod team;

use std::path::Path;

use tt_core::{Character, CharacterId, Store, UserId};

/// Where the store lives and who is acting.
pub struct Context<'a> {
    store_path: &'a Path,
    user: UserId,
}

impl<'a> Context<'a> {
    pub fn new(store_path: &'a Path, user: UserId) -> Self {
        Self { store_path, user }
    }

    fn load(&self) -> Result<Store, String> {
        Store::load(self.store_path)
            .map_err(|e| format!("cannot read {}: {e}", self.store_path.display()))
    }

    fn save(&self, store: &Store) -> Result<(), String> {
        store
            .save(self.store_path)
            .map_err(|e| format!("cannot write {}: {e}", self.store_path.display()))
    }

    /// Fail unless the acting user owns a record.
    fn ensure_owner(&self, owner: UserId, what: &str) -> Result<(), String> {
        if owner == self.user {
            Ok(())
        } else {
            Err(format!("{what} belongs to another user"))
        }
    }

    /// Look up a character the acting user owns or that is public.
    fn visible_character<'s>(
        &self,
        store: &'s Store,
        id: CharacterId,
    ) -> Result<&'s Character, String> {
        store
            .character(id)
            .filter(|c| c.owner == self.user || c.is_public)
            .ok_or_else(|| format!("character not found: {id}"))
    }
}

/// Placeholder for empty cells.
fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
