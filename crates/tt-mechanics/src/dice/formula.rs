//! Formula parsing and evaluation.

use tracing::debug;

use super::arith;
use super::lexer::{Token, lex};
use super::roll::{RollOutcome, RolledTerm};
use super::source::RandomSource;
use crate::config::RollConfig;

/// Why a formula could not be read. Never surfaced to callers: every error
/// collapses into [`RollOutcome::invalid`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum FormulaError {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(String),
    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),
    #[error("unexpected end of formula")]
    UnexpectedEnd,
    #[error("formula contains no dice")]
    NoDice,
    #[error("dice term {0:?} needs a positive count and sides")]
    EmptyDice(String),
    #[error("dice term {0:?} exceeds the roll limits")]
    TooManyDice(String),
    #[error("operator {0:?} is not allowed next to dice")]
    UnsupportedOperator(String),
    #[error("number out of range")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("parentheses nested too deeply")]
    TooDeep,
}

/// A parsed term, before rolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Dice { negative: bool, count: u32, sides: u32 },
    Modifier(i64),
}

/// Roll a formula with the default [`RollConfig`].
pub fn roll_formula<R>(formula: &str, rng: &mut R) -> RollOutcome
where
    R: RandomSource + ?Sized,
{
    roll_formula_with(formula, rng, &RollConfig::default())
}

/// Roll a formula such as `"2d6+3"`.
///
/// Whitespace is ignored. If the formula has no usable dice term it is
/// evaluated as integer arithmetic; if that fails too the invalid outcome
/// (total 0) is returned.
pub fn roll_formula_with<R>(formula: &str, rng: &mut R, config: &RollConfig) -> RollOutcome
where
    R: RandomSource + ?Sized,
{
    let normalized: String = formula.chars().filter(|c| !c.is_whitespace()).collect();

    let outcome = lex(&normalized).and_then(|tokens| {
        match parse_dice_terms(&tokens, config) {
            Ok(terms) => roll_terms(&terms, rng),
            Err(reason) => {
                debug!(formula = %normalized, %reason, "not a dice formula, trying arithmetic");
                arith::evaluate(&tokens).map(|value| RollOutcome::flat(value, &normalized))
            }
        }
    });

    match outcome {
        Ok(outcome) => {
            debug!(
                formula = %normalized,
                result = outcome.result,
                breakdown = %outcome.breakdown,
                "rolled"
            );
            outcome
        }
        Err(reason) => {
            debug!(formula = %normalized, %reason, "invalid formula");
            RollOutcome::invalid()
        }
    }
}

/// Parse `sign? term (('+' | '-') sign? term)*` where a term is `NdM` or an
/// integer. Fails with [`FormulaError::NoDice`] when no term is a dice term.
fn parse_dice_terms(
    tokens: &[(Token, &str)],
    config: &RollConfig,
) -> Result<Vec<Term>, FormulaError> {
    if !tokens.iter().any(|(t, _)| *t == Token::Dice) {
        return Err(FormulaError::NoDice);
    }

    let mut terms = Vec::new();
    let mut dice_budget = config.max_dice;
    let mut pos = 0;
    let mut negative = false;
    let mut expect_term = true;

    while pos < tokens.len() {
        let (token, text) = tokens[pos];
        pos += 1;

        if !expect_term {
            match token {
                Token::Plus => negative = false,
                Token::Minus => negative = true,
                Token::Star | Token::Slash | Token::LParen | Token::RParen => {
                    return Err(FormulaError::UnsupportedOperator(text.to_string()));
                }
                _ => return Err(FormulaError::UnexpectedToken(text.to_string())),
            }
            expect_term = true;
            // One extra sign may directly follow the operator: `1d6+-2`.
            if let Some(&(sign @ (Token::Plus | Token::Minus), _)) = tokens.get(pos) {
                negative ^= sign == Token::Minus;
                pos += 1;
            }
            continue;
        }

        match token {
            Token::Plus if pos == 1 => {}
            Token::Minus if pos == 1 => negative = true,
            Token::Dice => {
                let (count, sides) = parse_dice_token(text, config)?;
                dice_budget = dice_budget
                    .checked_sub(count)
                    .ok_or_else(|| FormulaError::TooManyDice(text.to_string()))?;
                terms.push(Term::Dice {
                    negative,
                    count,
                    sides,
                });
                expect_term = false;
            }
            Token::Number => {
                let value: i64 = text.parse().map_err(|_| FormulaError::Overflow)?;
                terms.push(Term::Modifier(if negative { -value } else { value }));
                expect_term = false;
            }
            Token::Star | Token::Slash | Token::LParen | Token::RParen => {
                return Err(FormulaError::UnsupportedOperator(text.to_string()));
            }
            _ => return Err(FormulaError::UnexpectedToken(text.to_string())),
        }
    }

    if expect_term {
        return Err(FormulaError::UnexpectedEnd);
    }
    Ok(terms)
}

fn parse_dice_token(text: &str, config: &RollConfig) -> Result<(u32, u32), FormulaError> {
    let (count, sides) = text
        .split_once(['d', 'D'])
        .ok_or_else(|| FormulaError::UnexpectedToken(text.to_string()))?;
    let too_many = || FormulaError::TooManyDice(text.to_string());
    let count: u32 = count.parse().map_err(|_| too_many())?;
    let sides: u32 = sides.parse().map_err(|_| too_many())?;
    if count == 0 || sides == 0 {
        return Err(FormulaError::EmptyDice(text.to_string()));
    }
    if count > config.max_dice || sides > config.max_sides {
        return Err(too_many());
    }
    Ok((count, sides))
}

fn roll_terms<R>(terms: &[Term], rng: &mut R) -> Result<RollOutcome, FormulaError>
where
    R: RandomSource + ?Sized,
{
    let rolled = terms
        .iter()
        .map(|term| match *term {
            Term::Dice {
                negative,
                count,
                sides,
            } => RolledTerm::Dice {
                negative,
                sides,
                rolls: (0..count).map(|_| rng.roll_die(sides)).collect(),
            },
            Term::Modifier(value) => RolledTerm::Modifier(value),
        })
        .collect();
    RollOutcome::from_terms(rolled).ok_or(FormulaError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::roll::{INVALID_BREAKDOWN, OutcomeKind};
    use crate::dice::source::SequenceSource;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn roll(formula: &str, faces: &[u32], sides: u32) -> RollOutcome {
        let mut src = SequenceSource::for_faces(faces, sides);
        roll_formula(formula, &mut src)
    }

    fn assert_invalid(formula: &str) {
        let out = roll(formula, &[1], 6);
        assert_eq!(out.result, 0, "{formula:?}");
        assert_eq!(out.breakdown, INVALID_BREAKDOWN, "{formula:?}");
        assert_eq!(out.kind, OutcomeKind::Invalid, "{formula:?}");
    }

    #[test]
    fn degenerate_die_has_no_variance() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let out = roll_formula("1d1", &mut rng);
            assert_eq!(out.result, 1);
            assert_eq!(out.breakdown, "1");
        }
    }

    #[test]
    fn flat_number() {
        let out = roll("3", &[], 6);
        assert_eq!(out.result, 3);
        assert_eq!(out.breakdown, "3");
        assert_eq!(out.kind, OutcomeKind::Flat);
    }

    #[test]
    fn dice_with_modifier() {
        let out = roll("2d6+3", &[2, 5], 6);
        assert_eq!(out.result, 10);
        assert_eq!(out.breakdown, "(2+5)+3");
        assert_eq!(out.kind, OutcomeKind::Dice);
    }

    #[test]
    fn negative_modifier() {
        let out = roll("1d20-1", &[14], 20);
        assert_eq!(out.result, 13);
        assert_eq!(out.breakdown, "14-1");
    }

    #[test]
    fn whitespace_is_ignored() {
        let out = roll(" 2 d 6 + 3 ", &[1, 1], 6);
        assert_eq!(out.result, 5);
        assert_eq!(out.breakdown, "(1+1)+3");
    }

    #[test]
    fn uppercase_d() {
        assert_eq!(roll("1D4", &[3], 4).result, 3);
    }

    #[test]
    fn modifier_between_dice_accumulates_left_to_right() {
        let mut src = SequenceSource::new(vec![0.99, 0.0]);
        let out = roll_formula("1d6+2+1d4", &mut src);
        assert_eq!(out.result, 6 + 2 + 1);
        assert_eq!(out.breakdown, "6+2+1");
        assert_eq!(out.terms.len(), 3);
    }

    #[test]
    fn subtracted_dice() {
        let mut src = SequenceSource::new(vec![0.99, 0.99]);
        let out = roll_formula("1d20-1d4", &mut src);
        assert_eq!(out.result, 16);
        assert_eq!(out.breakdown, "20-4");
    }

    #[test]
    fn leading_sign() {
        assert_eq!(roll("-1d4+10", &[2], 4).breakdown, "-2+10");
        assert_eq!(roll("-1d4+10", &[2], 4).result, 8);
        assert_eq!(roll("+1d4", &[2], 4).result, 2);
    }

    #[test]
    fn signed_modifier_after_operator() {
        let out = roll("2d6+-3", &[4, 4], 6);
        assert_eq!(out.result, 5);
        assert_eq!(out.breakdown, "(4+4)-3");
        assert_eq!(roll("1d6--3", &[1], 6).result, 4);
    }

    #[test]
    fn arithmetic_fallback() {
        let out = roll("(2+3)*4", &[], 6);
        assert_eq!(out.result, 20);
        assert_eq!(out.breakdown, "(2+3)*4");
        assert_eq!(roll("7/2", &[], 6).result, 3);
        assert_eq!(roll("-5", &[], 6).result, -5);
    }

    #[test]
    fn invalid_formulas() {
        for formula in [
            "", "   ", "abc", "d6", "2d", "0d6", "2d0", "1d6+", "++1d6", "2d6*2", "2d6/2",
            "(1d6)", "1d6+(2)", "1/0", "1+", "(1+2", "99999999999999999999",
        ] {
            assert_invalid(formula);
        }
    }

    #[test]
    fn zero_count_anywhere_is_invalid() {
        assert_invalid("1d6+0d4");
    }

    #[test]
    fn dice_limits() {
        let mut src = SequenceSource::new(vec![0.0]);
        let config = RollConfig::default().with_max_dice(10).with_max_sides(100);
        assert!(roll_formula_with("10d100", &mut src, &config).is_valid());
        assert!(!roll_formula_with("11d6", &mut src, &config).is_valid());
        assert!(!roll_formula_with("1d101", &mut src, &config).is_valid());
        assert!(!roll_formula_with("6d6+5d6", &mut src, &config).is_valid());
        assert!(!roll_formula("4294967296d6", &mut src).is_valid());
    }

    #[test]
    fn widest_die_tops_out_at_its_side_count() {
        let mut src = SequenceSource::new(vec![1.0]);
        let config = RollConfig::default().with_max_sides(u32::MAX);
        let out = roll_formula_with("1d4294967295", &mut src, &config);
        assert_eq!(out.result, i64::from(u32::MAX));
    }

    #[test]
    fn never_panics_on_garbage() {
        let mut rng = StdRng::seed_from_u64(1);
        for formula in ["+", "-", "--", "()", "1d6+-", "d", "1dd6", "1d6d6", "))((", "9d9d9"] {
            let out = roll_formula(formula, &mut rng);
            assert!(!out.is_valid(), "{formula:?}");
        }
    }

    proptest! {
        #[test]
        fn dice_subtotal_within_bounds(count in 1u32..=20, sides in 1u32..=100, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = roll_formula(&format!("{count}d{sides}"), &mut rng);
            let total = i64::from(count) * i64::from(sides);
            prop_assert!(out.result >= i64::from(count));
            prop_assert!(out.result <= total);
            prop_assert_eq!(out.faces().len(), count as usize);
        }

        #[test]
        fn modifier_shifts_total(sides in 1u32..=20, modifier in -50i64..=50, seed in any::<u64>()) {
            let formula = if modifier < 0 {
                format!("1d{sides}{modifier}")
            } else {
                format!("1d{sides}+{modifier}")
            };
            let mut rng = StdRng::seed_from_u64(seed);
            let out = roll_formula(&formula, &mut rng);
            let face = i64::from(out.faces()[0]);
            prop_assert_eq!(out.result, face + modifier);
        }
    }
}
