//! Dice formulas, random sources, and roll outcomes.
//!
//! A formula is a left-to-right sum of `NdM` dice terms and integer
//! modifiers, e.g. `"2d6+3"` or `"1d20-1d4+2"`. A formula without dice is
//! evaluated as plain integer arithmetic (`+ - * /` and parentheses).

mod arith;
mod formula;
mod lexer;
pub mod roll;
pub mod source;

pub use formula::{roll_formula, roll_formula_with};
pub use roll::{OutcomeKind, RollOutcome, RolledTerm};
pub use source::{RandomSource, SequenceSource};

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Die {
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
    /// A die with a custom number of sides.
    Custom(u32),
}

impl Die {
    /// The dice offered for one-click rolls.
    pub const QUICK: [Die; 6] = [Die::D4, Die::D6, Die::D8, Die::D10, Die::D12, Die::D20];

    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::Custom(n) => n,
        }
    }

    /// Parse a die from a string like "d20", "d6", "d100".
    pub fn from_str_tag(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "d4" => Some(Self::D4),
            "d6" => Some(Self::D6),
            "d8" => Some(Self::D8),
            "d10" => Some(Self::D10),
            "d12" => Some(Self::D12),
            "d20" => Some(Self::D20),
            "d100" => Some(Self::D100),
            other => {
                let num = other.strip_prefix('d')?.parse::<u32>().ok()?;
                if num >= 2 {
                    Some(Self::Custom(num))
                } else {
                    None
                }
            }
        }
    }

    /// The formula rolling one of this die, e.g. `"1d20"`.
    pub fn formula(self) -> String {
        format!("1d{}", self.sides())
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_sides() {
        assert_eq!(Die::D4.sides(), 4);
        assert_eq!(Die::D20.sides(), 20);
        assert_eq!(Die::D100.sides(), 100);
        assert_eq!(Die::Custom(30).sides(), 30);
    }

    #[test]
    fn die_from_str() {
        assert_eq!(Die::from_str_tag("d20"), Some(Die::D20));
        assert_eq!(Die::from_str_tag("D6"), Some(Die::D6));
        assert_eq!(Die::from_str_tag("d30"), Some(Die::Custom(30)));
        assert_eq!(Die::from_str_tag("d1"), None);
        assert_eq!(Die::from_str_tag("2d6"), None);
    }

    #[test]
    fn die_formula_and_display() {
        assert_eq!(Die::D20.formula(), "1d20");
        assert_eq!(Die::Custom(30).to_string(), "d30");
        let quick: Vec<String> = Die::QUICK.iter().map(|d| d.to_string()).collect();
        assert_eq!(quick, ["d4", "d6", "d8", "d10", "d12", "d20"]);
    }
}
