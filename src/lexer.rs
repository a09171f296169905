//! Tokenizer for query option values.
//!
//! The lexer works on the percent-decoded option value and is pulled one
//! token at a time, so callers can stop tokenizing and take a raw slice of
//! the remaining input (`$search` and friends are not expression grammar).

use crate::error::{QueryError, QuerySyntaxError};
use crate::literal::{Literal, is_guid};

/// Length of a GUID in 8-4-4-4-12 form.
const GUID_LEN: usize = 36;

/// The kind of a lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// A name: property, keyword, function, `$it`, `$count`, `@alias`.
    /// Dots are kept so qualified names lex as one identifier.
    Identifier(String),
    Literal(Literal),
    Slash,
    OpenParen,
    CloseParen,
    Comma,
    Colon,
    Semicolon,
    Ampersand,
    Equals,
    Star,
    Minus,
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

/// Pull tokenizer over a decoded option value.
#[derive(Debug, Clone)]
pub(crate) struct Lexer<'a> {
    option: &'a str,
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub const fn new(option: &'a str, source: &'a str) -> Self {
        Self {
            option,
            source,
            pos: 0,
        }
    }

    /// Byte offset of the next unread character.
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Moves the read position; `pos` must be a char boundary.
    pub const fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Lexes the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, QueryError> {
        self.skip_whitespace();

        let start = self.pos;
        let rest = &self.source[start..];
        let Some(c) = rest.chars().next() else {
            return Ok(None);
        };

        let kind = match c {
            '/' => self.punct(TokenKind::Slash),
            '(' => self.punct(TokenKind::OpenParen),
            ')' => self.punct(TokenKind::CloseParen),
            ',' => self.punct(TokenKind::Comma),
            ':' => self.punct(TokenKind::Colon),
            ';' => self.punct(TokenKind::Semicolon),
            '&' => self.punct(TokenKind::Ampersand),
            '=' => self.punct(TokenKind::Equals),
            '*' => self.punct(TokenKind::Star),
            '\'' => self.string()?,
            c if c.is_ascii_hexdigit() && self.at_guid() => self.guid(),
            '-' if rest[1..].starts_with(|n: char| n.is_ascii_digit()) => self.number()?,
            '-' => self.punct(TokenKind::Minus),
            c if c.is_ascii_digit() => self.number()?,
            c if is_identifier_start(c) => self.identifier()?,
            other => {
                return Err(self.error(start, "a token", Some(other.to_string())));
            }
        };

        Ok(Some(Token {
            kind,
            start,
            end: self.pos,
        }))
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.source[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn at_guid(&self) -> bool {
        let end = self.pos + GUID_LEN;
        self.source.get(self.pos..end).is_some_and(is_guid)
            && !self.source[end..].starts_with(is_identifier_continue)
    }

    fn guid(&mut self) -> TokenKind {
        let text = &self.source[self.pos..self.pos + GUID_LEN];
        self.pos += GUID_LEN;
        TokenKind::Literal(Literal::Guid(text.to_ascii_lowercase()))
    }

    fn number(&mut self) -> Result<TokenKind, QueryError> {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let digits_from = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };
        let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

        let mut end = digits_from(if bytes[start] == b'-' { start + 1 } else { start });

        if bytes.get(end) == Some(&b'.') && digit_at(end + 1) {
            end = digits_from(end + 1);
        }

        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
            if digit_at(end + 1 + sign) {
                end = digits_from(end + 1 + sign);
            }
        }

        if self.source[end..].starts_with(is_identifier_continue) {
            let found = self.source[start..].split(char::is_whitespace).next();
            return Err(self.error(start, "a number", found.map(str::to_string)));
        }

        self.pos = end;
        Ok(TokenKind::Literal(Literal::parse(&self.source[start..end])?))
    }

    /// Scans a quoted string starting at `self.pos`, returning its end.
    fn quoted_end(&self, open: usize) -> Result<usize, QueryError> {
        let bytes = self.source.as_bytes();
        let mut i = open + 1;
        loop {
            match bytes.get(i) {
                Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                Some(b'\'') => return Ok(i + 1),
                Some(_) => i += 1,
                None => return Err(self.error(open, "a closing quote", None)),
            }
        }
    }

    fn string(&mut self) -> Result<TokenKind, QueryError> {
        let start = self.pos;
        let end = self.quoted_end(start)?;
        self.pos = end;
        Ok(TokenKind::Literal(Literal::parse(&self.source[start..end])?))
    }

    fn identifier(&mut self) -> Result<TokenKind, QueryError> {
        let start = self.pos;
        let rest = &self.source[start..];
        let len = rest
            .char_indices()
            .skip(1)
            .find(|&(_, c)| !is_identifier_continue(c))
            .map_or(rest.len(), |(i, _)| i);
        let end = start + len;
        let name = &self.source[start..end];

        // `NS.Color'Red'`
        if name.contains('.') && self.source[end..].starts_with('\'') {
            let literal_end = self.quoted_end(end)?;
            self.pos = literal_end;
            return Ok(TokenKind::Literal(Literal::parse(
                &self.source[start..literal_end],
            )?));
        }

        self.pos = end;
        Ok(match name {
            "null" => TokenKind::Literal(Literal::Null),
            "true" => TokenKind::Literal(Literal::Boolean(true)),
            "false" => TokenKind::Literal(Literal::Boolean(false)),
            _ => TokenKind::Identifier(name.to_string()),
        })
    }

    pub fn error(&self, position: usize, expected: &'static str, found: Option<String>) -> QueryError {
        QueryError::Syntax(QuerySyntaxError {
            option: self.option.to_string(),
            position,
            expected,
            found,
        })
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$' | '@')
}

fn is_identifier_continue(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.')
}

/// Byte offset of the first `;`, `&` or unbalanced `)` outside quotes and
/// parentheses, starting at `from`; the end of `source` if there is none.
pub(crate) fn scan_to_separator(source: &str, from: usize) -> usize {
    let mut depth = 0usize;
    let mut in_quote = false;

    for (i, c) in source[from..].char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            _ if in_quote => {}
            '(' => depth += 1,
            ')' if depth == 0 => return from + i,
            ')' => depth -= 1,
            ';' | '&' if depth == 0 => return from + i,
            _ => {}
        }
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new("$filter", source);
        let mut out = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            out.push(token.kind);
        }
        out
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Identifier(s.to_string())
    }

    #[test]
    fn lexes_comparison() {
        assert_eq!(
            kinds("ID eq 123"),
            vec![ident("ID"), ident("eq"), TokenKind::Literal(Literal::Integer(123))]
        );
    }

    #[test]
    fn lexes_count_path() {
        assert_eq!(
            kinds("MyPaintings/$count gt 1"),
            vec![
                ident("MyPaintings"),
                TokenKind::Slash,
                ident("$count"),
                ident("gt"),
                TokenKind::Literal(Literal::Integer(1)),
            ]
        );
    }

    #[test]
    fn lexes_nested_options() {
        assert_eq!(
            kinds("$count($filter=A eq 1;$top=2)"),
            vec![
                ident("$count"),
                TokenKind::OpenParen,
                ident("$filter"),
                TokenKind::Equals,
                ident("A"),
                ident("eq"),
                TokenKind::Literal(Literal::Integer(1)),
                TokenKind::Semicolon,
                ident("$top"),
                TokenKind::Equals,
                TokenKind::Literal(Literal::Integer(2)),
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn lexes_negative_number_and_minus() {
        assert_eq!(
            kinds("-1 - -x"),
            vec![
                TokenKind::Literal(Literal::Integer(-1)),
                TokenKind::Minus,
                TokenKind::Minus,
                ident("x"),
            ]
        );
    }

    #[test]
    fn lexes_decimals_and_exponents() {
        assert_eq!(
            kinds("1.5 2e10 3.0E-2"),
            vec![
                TokenKind::Literal(Literal::Decimal("1.5".into())),
                TokenKind::Literal(Literal::Decimal("2e10".into())),
                TokenKind::Literal(Literal::Decimal("3.0E-2".into())),
            ]
        );
    }

    #[test]
    fn lexes_strings_with_escaped_quotes() {
        assert_eq!(
            kinds("'O''Neil' eq 'a;b)'"),
            vec![
                TokenKind::Literal(Literal::String("O'Neil".into())),
                ident("eq"),
                TokenKind::Literal(Literal::String("a;b)".into())),
            ]
        );
    }

    #[test]
    fn lexes_keywords_as_literals() {
        assert_eq!(
            kinds("null true false"),
            vec![
                TokenKind::Literal(Literal::Null),
                TokenKind::Literal(Literal::Boolean(true)),
                TokenKind::Literal(Literal::Boolean(false)),
            ]
        );
    }

    #[test]
    fn lexes_guid_before_identifier() {
        let guid = "ABCDEF01-2345-6789-abcd-ef0123456789";
        assert_eq!(
            kinds(guid),
            vec![TokenKind::Literal(Literal::Guid(guid.to_ascii_lowercase()))]
        );
    }

    #[test]
    fn lexes_enum_literal() {
        assert_eq!(
            kinds("Style has NS.Color'Red'"),
            vec![
                ident("Style"),
                ident("has"),
                TokenKind::Literal(Literal::Enum {
                    type_name: "NS.Color".into(),
                    value: "Red".into()
                }),
            ]
        );
    }

    #[test]
    fn token_spans() {
        let mut lexer = Lexer::new("$filter", "  Name  eq");
        let token = lexer.next_token().unwrap().unwrap();
        assert_eq!((token.start, token.end), (2, 6));
        assert_eq!(token.kind, ident("Name"));
        let token = lexer.next_token().unwrap().unwrap();
        assert_eq!((token.start, token.end), (8, 10));
        assert!(lexer.next_token().unwrap().is_none());
    }

    #[test]
    fn unterminated_string_fails() {
        let mut lexer = Lexer::new("$filter", "Name eq 'abc");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(
            err,
            QueryError::Syntax(QuerySyntaxError { position: 8, expected: "a closing quote", .. })
        ));
    }

    #[test]
    fn unexpected_character_fails() {
        let err = Lexer::new("$filter", "#").next_token().unwrap_err();
        assert!(matches!(err, QueryError::Syntax(e) if e.found.as_deref() == Some("#")));
    }

    #[test]
    fn number_glued_to_name_fails() {
        assert!(Lexer::new("$filter", "12abc").next_token().is_err());
    }

    #[test]
    fn separator_scan() {
        let source = "A eq 'x;y' and f(1;2);$top=1";
        assert_eq!(scan_to_separator(source, 0), 21);
        assert_eq!(scan_to_separator("blue green)", 0), 10);
        assert_eq!(scan_to_separator("blue", 0), 4);
    }
}
