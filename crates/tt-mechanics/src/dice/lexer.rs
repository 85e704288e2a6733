use logos::Logos;

use super::formula::FormulaError;

/// A formula token. Whitespace is removed before lexing, so none is skipped
/// here.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    #[regex(r"[0-9]+[dD][0-9]+")]
    Dice,

    #[regex(r"[0-9]+")]
    Number,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

/// Lex a whitespace-free formula into tokens paired with their source text.
pub(crate) fn lex(source: &str) -> Result<Vec<(Token, &str)>, FormulaError> {
    Token::lexer(source)
        .spanned()
        .map(|(result, span)| {
            let text = &source[span];
            result
                .map(|token| (token, text))
                .map_err(|()| FormulaError::UnexpectedChar(text.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn dice_and_modifier() {
        assert_eq!(kinds("2d6+3"), vec![Token::Dice, Token::Plus, Token::Number]);
        assert_eq!(lex("12D20").unwrap(), vec![(Token::Dice, "12D20")]);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(
            kinds("(1+2)*3/4-5"),
            vec![
                Token::LParen,
                Token::Number,
                Token::Plus,
                Token::Number,
                Token::RParen,
                Token::Star,
                Token::Number,
                Token::Slash,
                Token::Number,
                Token::Minus,
                Token::Number,
            ]
        );
    }

    #[test]
    fn missing_count_is_an_error() {
        assert!(matches!(lex("d6"), Err(FormulaError::UnexpectedChar(_))));
    }

    #[test]
    fn letters_are_errors() {
        assert!(lex("abc").is_err());
        assert!(lex("2d6+x").is_err());
    }

    #[test]
    fn empty_source() {
        assert!(lex("").unwrap().is_empty());
    }
}
