//! Integer arithmetic for formulas without dice.
//!
//! Supports `+ - * /`, unary signs, and parentheses with the usual
//! precedence. Division truncates toward zero. Nothing else is accepted.

use super::formula::FormulaError;
use super::lexer::Token;

const MAX_DEPTH: usize = 64;

/// Evaluate a dice-free token stream.
pub(crate) fn evaluate(tokens: &[(Token, &str)]) -> Result<i64, FormulaError> {
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr(0)?;
    match parser.peek() {
        None => Ok(value),
        Some((_, text)) => Err(FormulaError::UnexpectedToken(text.to_string())),
    }
}

struct Parser<'t, 's> {
    tokens: &'t [(Token, &'s str)],
    pos: usize,
}

impl<'s> Parser<'_, 's> {
    fn peek(&self) -> Option<(Token, &'s str)> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(Token, &'s str)> {
        let next = self.peek();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn expr(&mut self, depth: usize) -> Result<i64, FormulaError> {
        let mut value = self.product(depth)?;
        while let Some((op @ (Token::Plus | Token::Minus), _)) = self.peek() {
            self.pos += 1;
            let rhs = self.product(depth)?;
            value = if op == Token::Plus {
                value.checked_add(rhs)
            } else {
                value.checked_sub(rhs)
            }
            .ok_or(FormulaError::Overflow)?;
        }
        Ok(value)
    }

    fn product(&mut self, depth: usize) -> Result<i64, FormulaError> {
        let mut value = self.unary(depth)?;
        while let Some((op @ (Token::Star | Token::Slash), _)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary(depth)?;
            value = if op == Token::Star {
                value.checked_mul(rhs).ok_or(FormulaError::Overflow)?
            } else if rhs == 0 {
                return Err(FormulaError::DivisionByZero);
            } else {
                value.checked_div(rhs).ok_or(FormulaError::Overflow)?
            };
        }
        Ok(value)
    }

    fn unary(&mut self, depth: usize) -> Result<i64, FormulaError> {
        if depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        match self.peek() {
            Some((Token::Minus, _)) => {
                self.pos += 1;
                self.unary(depth + 1)?
                    .checked_neg()
                    .ok_or(FormulaError::Overflow)
            }
            Some((Token::Plus, _)) => {
                self.pos += 1;
                self.unary(depth + 1)
            }
            _ => self.primary(depth),
        }
    }

    fn primary(&mut self, depth: usize) -> Result<i64, FormulaError> {
        match self.bump() {
            Some((Token::Number, text)) => text.parse().map_err(|_| FormulaError::Overflow),
            Some((Token::LParen, _)) => {
                let value = self.expr(depth + 1)?;
                match self.bump() {
                    Some((Token::RParen, _)) => Ok(value),
                    Some((_, text)) => Err(FormulaError::UnexpectedToken(text.to_string())),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((_, text)) => Err(FormulaError::UnexpectedToken(text.to_string())),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::lexer::lex;

    fn eval(source: &str) -> Result<i64, FormulaError> {
        evaluate(&lex(source).unwrap())
    }

    #[test]
    fn literals_and_signs() {
        assert_eq!(eval("42"), Ok(42));
        assert_eq!(eval("-7"), Ok(-7));
        assert_eq!(eval("+3"), Ok(3));
        assert_eq!(eval("--2"), Ok(2));
    }

    #[test]
    fn precedence() {
        assert_eq!(eval("2+3*4"), Ok(14));
        assert_eq!(eval("(2+3)*4"), Ok(20));
        assert_eq!(eval("10-4-3"), Ok(3));
        assert_eq!(eval("20/2/5"), Ok(2));
        assert_eq!(eval("2*-3"), Ok(-6));
    }

    #[test]
    fn division_truncates() {
        assert_eq!(eval("7/2"), Ok(3));
        assert_eq!(eval("-7/2"), Ok(-3));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(eval("1/0"), Err(FormulaError::DivisionByZero));
        assert_eq!(eval("5/(2-2)"), Err(FormulaError::DivisionByZero));
    }

    #[test]
    fn overflow() {
        assert_eq!(eval("9223372036854775807+1"), Err(FormulaError::Overflow));
        assert_eq!(eval("99999999999999999999"), Err(FormulaError::Overflow));
    }

    #[test]
    fn malformed() {
        assert_eq!(eval(""), Err(FormulaError::UnexpectedEnd));
        assert_eq!(eval("(1+2"), Err(FormulaError::UnexpectedEnd));
        assert!(eval("1+2)").is_err());
        assert!(eval("()").is_err());
        assert!(eval("2d6").is_err());
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(eval(&deep), Err(FormulaError::TooDeep));
        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval(&shallow), Ok(1));
        assert_eq!(eval(&"-".repeat(500)), Err(FormulaError::TooDeep));
    }
}
