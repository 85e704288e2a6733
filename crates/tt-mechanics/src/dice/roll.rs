//! Roll outcomes and their breakdown text.

use serde::{Deserialize, Serialize};

/// Breakdown text of a formula that could not be evaluated.
pub const INVALID_BREAKDOWN: &str = "invalid formula";

/// One evaluated term of a dice formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolledTerm {
    /// A dice term and its individual faces.
    Dice {
        /// Whether the subtotal is subtracted.
        negative: bool,
        /// Sides per die.
        sides: u32,
        /// The face each die landed on.
        rolls: Vec<u32>,
    },
    /// A flat, signed modifier.
    Modifier(i64),
}

impl RolledTerm {
    /// The signed contribution of this term to the total.
    pub fn value(&self) -> i64 {
        match self {
            Self::Dice {
                negative, rolls, ..
            } => {
                let subtotal: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
                if *negative { -subtotal } else { subtotal }
            }
            Self::Modifier(value) => *value,
        }
    }

    /// Sum of the faces, ignoring sign. Zero for modifiers.
    pub fn subtotal(&self) -> i64 {
        match self {
            Self::Dice { rolls, .. } => rolls.iter().map(|&r| i64::from(r)).sum(),
            Self::Modifier(_) => 0,
        }
    }

    fn is_negative(&self) -> bool {
        match self {
            Self::Dice { negative, .. } => *negative,
            Self::Modifier(value) => *value < 0,
        }
    }

    /// The unsigned text of this term: `(3+5)` for several dice, `4` for
    /// one die or a modifier.
    fn magnitude(&self) -> String {
        match self {
            Self::Dice { rolls, .. } if rolls.len() == 1 => rolls[0].to_string(),
            Self::Dice { rolls, .. } => {
                let faces: Vec<String> = rolls.iter().map(u32::to_string).collect();
                format!("({})", faces.join("+"))
            }
            Self::Modifier(value) => value.unsigned_abs().to_string(),
        }
    }
}

/// How a formula was evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// At least one dice term was rolled.
    Dice,
    /// No dice; the formula was plain arithmetic.
    Flat,
    /// The formula could not be evaluated.
    Invalid,
}

/// The total of a formula and a human-readable account of how it was
/// reached. The breakdown is for display only and is not meant to be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    /// The total.
    pub result: i64,
    /// Display text, e.g. `(2+5)+3` for `2d6+3`.
    pub breakdown: String,
    /// How the formula was evaluated.
    pub kind: OutcomeKind,
    /// The evaluated terms, in formula order. Empty for invalid formulas.
    pub terms: Vec<RolledTerm>,
}

impl RollOutcome {
    /// Total and breakdown from evaluated dice terms.
    pub(crate) fn from_terms(terms: Vec<RolledTerm>) -> Option<Self> {
        let mut result: i64 = 0;
        let mut breakdown = String::new();
        for (i, term) in terms.iter().enumerate() {
            result = result.checked_add(term.value())?;
            if term.is_negative() {
                breakdown.push('-');
            } else if i > 0 {
                breakdown.push('+');
            }
            breakdown.push_str(&term.magnitude());
        }
        Some(Self {
            result,
            breakdown,
            kind: OutcomeKind::Dice,
            terms,
        })
    }

    /// The outcome of a dice-free arithmetic expression.
    pub(crate) fn flat(value: i64, expression: &str) -> Self {
        Self {
            result: value,
            breakdown: expression.to_string(),
            kind: OutcomeKind::Flat,
            terms: vec![RolledTerm::Modifier(value)],
        }
    }

    /// The outcome of a formula that could not be evaluated.
    pub fn invalid() -> Self {
        Self {
            result: 0,
            breakdown: INVALID_BREAKDOWN.to_string(),
            kind: OutcomeKind::Invalid,
            terms: Vec::new(),
        }
    }

    /// Returns true unless the formula was invalid.
    pub fn is_valid(&self) -> bool {
        self.kind != OutcomeKind::Invalid
    }

    /// All individual die faces, in formula order.
    pub fn faces(&self) -> Vec<u32> {
        self.terms
            .iter()
            .flat_map(|t| match t {
                RolledTerm::Dice { rolls, .. } => rolls.clone(),
                RolledTerm::Modifier(_) => Vec::new(),
            })
            .collect()
    }
}

impl std::fmt::Display for RollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.breakdown, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dice(negative: bool, sides: u32, rolls: &[u32]) -> RolledTerm {
        RolledTerm::Dice {
            negative,
            sides,
            rolls: rolls.to_vec(),
        }
    }

    #[test]
    fn several_dice_are_parenthesized() {
        let out = RollOutcome::from_terms(vec![dice(false, 6, &[2, 5]), RolledTerm::Modifier(3)])
            .unwrap();
        assert_eq!(out.result, 10);
        assert_eq!(out.breakdown, "(2+5)+3");
        assert_eq!(out.to_string(), "(2+5)+3 = 10");
    }

    #[test]
    fn single_die_is_bare() {
        let out = RollOutcome::from_terms(vec![dice(false, 20, &[14]), RolledTerm::Modifier(-1)])
            .unwrap();
        assert_eq!(out.result, 13);
        assert_eq!(out.breakdown, "14-1");
    }

    #[test]
    fn negative_dice_subtract() {
        let out = RollOutcome::from_terms(vec![
            dice(true, 4, &[3]),
            dice(false, 6, &[1, 1]),
            dice(true, 8, &[2, 7]),
        ])
        .unwrap();
        assert_eq!(out.result, -3 + 2 - 9);
        assert_eq!(out.breakdown, "-3+(1+1)-(2+7)");
    }

    #[test]
    fn subtotal_and_faces() {
        let term = dice(true, 6, &[4, 6]);
        assert_eq!(term.subtotal(), 10);
        assert_eq!(term.value(), -10);
        assert_eq!(RolledTerm::Modifier(5).subtotal(), 0);

        let out = RollOutcome::from_terms(vec![dice(false, 6, &[1]), term]).unwrap();
        assert_eq!(out.faces(), vec![1, 4, 6]);
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let terms = vec![RolledTerm::Modifier(i64::MAX), RolledTerm::Modifier(1)];
        assert!(RollOutcome::from_terms(terms).is_none());
    }

    #[test]
    fn invalid_outcome() {
        let out = RollOutcome::invalid();
        assert_eq!(out.result, 0);
        assert_eq!(out.breakdown, INVALID_BREAKDOWN);
        assert!(!out.is_valid());
        assert!(out.faces().is_empty());
    }
}
