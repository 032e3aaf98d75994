//! SQL/PLSQL token stream
//!
//! Wraps the `sqlparser` tokenizer and flattens its tokens into what
//! statement recognition needs: words, parentheses, semicolons and other
//! symbols, each tagged with its line. Whitespace and comments are dropped,
//! so keywords inside comments and literals never leak.

use crate::{Error, Result};
use sqlparser::dialect::GenericDialect;
use sqlparser::tokenizer::{Token as SqlToken, TokenWithSpan, Tokenizer, TokenizerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare identifier or keyword
    Word,
    /// `"Quoted"` identifier
    QuotedIdent,
    /// String literal
    Literal,
    Number,
    OpenParen,
    CloseParen,
    Semicolon,
    /// Operators and punctuation
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Line where the token starts (1-indexed)
    pub line: u32,
}

impl Token {
    pub fn is_word(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    fn from_sql(spanned: TokenWithSpan) -> Option<Self> {
        let line = spanned.span.start.line as u32;
        let (kind, text) = match spanned.token {
            SqlToken::Whitespace(_) | SqlToken::EOF => return None,
            SqlToken::Word(word) => match word.quote_style {
                None => (TokenKind::Word, word.value),
                Some(_) => (TokenKind::QuotedIdent, word.value),
            },
            SqlToken::SingleQuotedString(s)
            | SqlToken::DoubleQuotedString(s)
            | SqlToken::NationalStringLiteral(s)
            | SqlToken::EscapedStringLiteral(s)
            | SqlToken::HexStringLiteral(s) => (TokenKind::Literal, s),
            SqlToken::Number(n, _) => (TokenKind::Number, n),
            SqlToken::LParen => (TokenKind::OpenParen, "(".to_string()),
            SqlToken::RParen => (TokenKind::CloseParen, ")".to_string()),
            SqlToken::SemiColon => (TokenKind::Semicolon, ";".to_string()),
            other => (TokenKind::Symbol, other.to_string()),
        };
        Some(Self { kind, text, line })
    }
}

fn parse_error(err: TokenizerError) -> Error {
    Error::Parse {
        line: err.location.line as u32,
        message: err.message,
    }
}

/// Split source text into tokens, skipping whitespace and comments
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, text)
        .tokenize_with_location()
        .map_err(parse_error)?;
    Ok(tokens.into_iter().filter_map(Token::from_sql).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text.to_uppercase())
            .collect()
    }

    #[test]
    fn test_comments_and_literals_hide_keywords() {
        let text = "-- SELECT in a comment\n/* UPDATE\n DELETE */ x := 'INSERT '' MERGE'; y := 'SELECT';";
        assert_eq!(words(text), vec!["X", "Y"]);
    }

    #[test]
    fn test_lines_are_tracked_across_comments() {
        let tokens = tokenize("a\n/* one\ntwo */ b\n'x\ny' c").unwrap();
        let lines: Vec<_> = tokens.iter().map(|t| (t.text.as_str(), t.line)).collect();
        assert_eq!(lines, vec![("a", 1), ("b", 3), ("x\ny", 4), ("c", 5)]);
    }

    #[test]
    fn test_quoted_identifier_is_one_token() {
        let tokens = tokenize("\"Sch\".\"Pkg 1\"").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::QuotedIdent);
        assert_eq!(tokens[2].text, "Pkg 1");
        assert!(tokens[1].is_symbol("."));
    }

    #[test]
    fn test_structural_tokens() {
        let kinds: Vec<_> = tokenize("f(1) / 2;").unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Word,
                TokenKind::OpenParen,
                TokenKind::Number,
                TokenKind::CloseParen,
                TokenKind::Symbol,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
        assert!(tokenize("a / b").unwrap()[1].is_symbol("/"));
    }

    #[test]
    fn test_non_ascii_identifiers() {
        assert_eq!(words("고객_테이블 t"), vec!["고객_테이블", "T"]);
    }

    #[test]
    fn test_unterminated_constructs_are_errors() {
        assert!(matches!(tokenize("x\n'abc").unwrap_err(), Error::Parse { .. }));
        assert!(tokenize("/* open").is_err());
        assert!(tokenize("\"open").is_err());
    }
}
