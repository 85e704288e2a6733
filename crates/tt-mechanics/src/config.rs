//! Limits applied when evaluating dice formulas.

/// Bounds on the dice a single formula may roll.
///
/// A formula that exceeds either bound is treated like any other malformed
/// formula and evaluates to the invalid outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollConfig {
    /// Maximum number of dice across all terms of one formula.
    pub max_dice: u32,
    /// Maximum number of sides on one die.
    pub max_sides: u32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            max_dice: 1000,
            max_sides: 1_000_000,
        }
    }
}

impl RollConfig {
    /// Set the dice budget (at least 1).
    pub fn with_max_dice(mut self, max: u32) -> Self {
        self.max_dice = max.max(1);
        self
    }

    /// Set the largest allowed die (at least 1).
    pub fn with_max_sides(mut self, max: u32) -> Self {
        self.max_sides = max.max(1);
        self
    }
}
