use crate::battle::BattleId;
use crate::character::CharacterId;
use crate::team::TeamId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating records in the store.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested character ID does not exist.
    #[error("character not found: {0}")]
    CharacterNotFound(CharacterId),

    /// The requested team ID does not exist.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// The requested battle ID does not exist.
    #[error("battle not found: {0}")]
    BattleNotFound(BattleId),

    /// An ability with the same ID is already attached to the character.
    #[error("ability already exists: \"{0}\"")]
    DuplicateAbility(String),

    /// The character is not a member of the team.
    #[error("character {character} is not a member of team \"{team}\"")]
    NotAMember {
        /// The team that was edited.
        team: String,
        /// The character that was referenced.
        character: CharacterId,
    },

    /// The team roster is already at capacity.
    #[error("team \"{team}\" is full ({max} members)")]
    TeamFull {
        /// The team that was edited.
        team: String,
        /// The roster capacity.
        max: usize,
    },

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),

    /// Reading or writing the store snapshot failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store snapshot could not be encoded or decoded.
    #[error("store format error: {0}")]
    Format(#[from] serde_json::Error),
}
