//! Depth-guarded recursive descent over query option values.
//!
//! Precedence, lowest first: `or`, `and`, comparison (`eq ne gt ge lt le
//! has`), additive (`add sub`), multiplicative (`mul div divby mod`), unary
//! (`not`, `-`), primary. Every binary level is left-associative.
//!
//! Each nested construct (parenthesized group, unary operand, function
//! arguments, lambda body, nested option list) runs one level deeper; the
//! parser fails with [`QueryTooComplexError`] once `max_depth` is exceeded.

use std::collections::VecDeque;

use crate::constants::{COUNT_SEGMENT, IMPLICIT_RANGE_VARIABLE, REF_SEGMENT};
use crate::error::{InvalidLiteralError, QueryError, QueryTooComplexError};
use crate::expression::{BinaryOperator, Expression, LambdaKind, PropertyAccess, UnaryOperator};
use crate::lexer::{Lexer, Token, TokenKind, scan_to_separator};
use crate::literal::{Literal, normalize_count, normalize_non_negative};
use crate::option::{
    ExpandItem, ExpandTarget, Levels, OptionValue, OrderByItem, ParsedOption, SelectItem,
    SortDirection,
};
use crate::path_segment::is_identifier;
use crate::query::SystemOption;

/// Parses the decoded value of a top-level system query option.
///
/// # Errors
///
/// Returns [`QueryError`] if the value does not match the option's grammar,
/// a literal is malformed, or nesting exceeds `max_depth`.
///
/// # Examples
///
/// ```
/// use odata_uri::{OptionValue, SystemOption, parse_option_value};
///
/// let value = parse_option_value(SystemOption::Count, "  true ", 32).unwrap();
/// assert_eq!(value, OptionValue::Count(true));
///
/// let value = parse_option_value(SystemOption::Filter, "ID eq 123", 32).unwrap();
/// assert_eq!(value.to_string(), "ID eq 123");
/// ```
pub fn parse_option_value(
    option: SystemOption,
    raw: &str,
    max_depth: usize,
) -> Result<OptionValue, QueryError> {
    let mut parser = Parser::new(option.as_str(), raw, max_depth);
    let value = parser.parse_value(option)?;
    parser.expect_end()?;
    Ok(value)
}

/// Parses a standalone `$filter` expression.
///
/// # Errors
///
/// Returns [`QueryError`] as [`parse_option_value`] does.
pub fn parse_expression(raw: &str, max_depth: usize) -> Result<Expression, QueryError> {
    let mut parser = Parser::new(SystemOption::Filter.as_str(), raw, max_depth);
    let expression = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(expression)
}

/// Name resolution scopes, innermost last.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    /// Inside `path/$count(...)`; bare paths take `$it`
    Subquery,
    /// Inside `$expand` item options; bare paths stay bare
    Expand,
    /// Inside a lambda body with this range variable
    Lambda(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListContext {
    Count,
    Expand,
}

impl ListContext {
    const fn allows(self, option: SystemOption) -> bool {
        match self {
            Self::Count => matches!(option, SystemOption::Filter | SystemOption::Search),
            Self::Expand => true,
        }
    }

    const fn expected(self) -> &'static str {
        match self {
            Self::Count => "$filter or $search",
            Self::Expand => "a system query option",
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    lookahead: VecDeque<Token>,
    depth: usize,
    max_depth: usize,
    scopes: Vec<Scope>,
}

type ParseResult<T> = Result<T, QueryError>;

impl<'a> Parser<'a> {
    fn new(option: &'a str, source: &'a str, max_depth: usize) -> Self {
        Self {
            source,
            lexer: Lexer::new(option, source),
            lookahead: VecDeque::with_capacity(3),
            depth: 0,
            max_depth,
            scopes: Vec::new(),
        }
    }

    // Token plumbing

    fn fill(&mut self, n: usize) -> ParseResult<()> {
        while self.lookahead.len() <= n {
            match self.lexer.next_token()? {
                Some(token) => self.lookahead.push_back(token),
                None => break,
            }
        }
        Ok(())
    }

    fn peek(&mut self, n: usize) -> ParseResult<Option<&TokenKind>> {
        self.fill(n)?;
        Ok(self.lookahead.get(n).map(|t| &t.kind))
    }

    fn peek_is(&mut self, n: usize, kind: &TokenKind) -> ParseResult<bool> {
        Ok(self.peek(n)? == Some(kind))
    }

    fn peek_identifier(&mut self, n: usize, name: &str) -> ParseResult<bool> {
        Ok(matches!(self.peek(n)?, Some(TokenKind::Identifier(id)) if id == name))
    }

    fn advance(&mut self) -> ParseResult<Option<Token>> {
        self.fill(0)?;
        Ok(self.lookahead.pop_front())
    }

    fn eat(&mut self, kind: &TokenKind) -> ParseResult<bool> {
        if self.peek_is(0, kind)? {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_identifier(&mut self, name: &str) -> ParseResult<bool> {
        if self.peek_identifier(0, name)? {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consumes `/` followed by the given `$` segment.
    fn eat_control_segment(&mut self, segment: &str) -> ParseResult<bool> {
        if self.peek_is(0, &TokenKind::Slash)? && self.peek_identifier(1, segment)? {
            self.advance()?;
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> ParseResult<()> {
        if self.eat(kind)? {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &'static str) -> ParseResult<(String, usize)> {
        self.fill(0)?;
        match self.lookahead.pop_front() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                start,
                ..
            }) => Ok((name, start)),
            Some(other) => {
                self.lookahead.push_front(other);
                Err(self.unexpected(expected))
            }
            None => Err(self.unexpected(expected)),
        }
    }

    fn expect_end(&mut self) -> ParseResult<()> {
        if self.peek(0)?.is_some() {
            return Err(self.unexpected("end of input"));
        }
        Ok(())
    }

    fn unexpected(&mut self, expected: &'static str) -> QueryError {
        if let Err(e) = self.fill(0) {
            return e;
        }
        match self.lookahead.front() {
            Some(token) => self.lexer.error(
                token.start,
                expected,
                Some(self.source[token.start..token.end].to_string()),
            ),
            None => self.lexer.error(self.source.len(), expected, None),
        }
    }

    /// Raw text of a scalar option value, up to the end of its option.
    fn raw_value(&mut self) -> &'a str {
        let start = self
            .lookahead
            .front()
            .map_or(self.lexer.position(), |t| t.start);
        let end = if self.scopes.is_empty() {
            self.source.len()
        } else {
            scan_to_separator(self.source, start)
        };
        self.lookahead.clear();
        self.lexer.seek(end);
        &self.source[start..end]
    }

    fn opaque_text(&mut self) -> ParseResult<String> {
        let text = self.raw_value().trim();
        if text.is_empty() {
            return Err(self.unexpected("a value"));
        }
        Ok(text.to_string())
    }

    // Depth and scope

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            return Err(QueryTooComplexError {
                max_depth: self.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn scoped<T>(
        &mut self,
        scope: Scope,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.scopes.push(scope);
        let result = self.nested(parse);
        self.scopes.pop();
        result
    }

    fn is_lambda_variable(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .any(|s| matches!(s, Scope::Lambda(v) if v == name))
    }

    /// The qualifier a bare path takes in the current scope.
    fn implicit_qualifier(&self) -> Option<&'static str> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| match scope {
                Scope::Subquery => Some(Some(IMPLICIT_RANGE_VARIABLE)),
                Scope::Expand => Some(None),
                Scope::Lambda(_) => None,
            })
            .flatten()
    }

    fn resolve(&self, qualifier: Option<String>, path: Vec<String>) -> PropertyAccess {
        PropertyAccess {
            qualifier: qualifier.or_else(|| self.implicit_qualifier().map(str::to_string)),
            path,
        }
    }

    fn check_member_name(&self, name: &str, start: usize) -> ParseResult<()> {
        if name.starts_with('@') {
            return Err(self.lexer.error(
                start,
                "a property name (parameter aliases are not supported)",
                Some(name.to_string()),
            ));
        }
        if name.starts_with('$') {
            return Err(self
                .lexer
                .error(start, "a property name", Some(name.to_string())));
        }
        Ok(())
    }

    // Option values

    fn parse_value(&mut self, option: SystemOption) -> ParseResult<OptionValue> {
        Ok(match option {
            SystemOption::Filter => OptionValue::Filter(self.parse_expression()?),
            SystemOption::OrderBy => OptionValue::OrderBy(self.parse_orderby()?),
            SystemOption::Select => OptionValue::Select(self.parse_select()?),
            SystemOption::Expand => OptionValue::Expand(self.parse_expand()?),
            SystemOption::Count => OptionValue::Count(normalize_count(self.raw_value())?),
            SystemOption::Top => OptionValue::Top(normalize_non_negative(self.raw_value())?),
            SystemOption::Skip => OptionValue::Skip(normalize_non_negative(self.raw_value())?),
            SystemOption::Levels => OptionValue::Levels(normalize_levels(self.raw_value())?),
            SystemOption::Search => OptionValue::Search(self.opaque_text()?),
            SystemOption::Apply => OptionValue::Apply(self.opaque_text()?),
            SystemOption::Format => OptionValue::Format(self.opaque_text()?),
        })
    }

    /// `name=value` pairs separated by `;` or `&`, up to (not including) `)`.
    fn parse_option_list(&mut self, context: ListContext) -> ParseResult<Vec<ParsedOption>> {
        let mut options: Vec<ParsedOption> = Vec::new();

        loop {
            let (name, start) = self.expect_identifier(context.expected())?;
            let option = SystemOption::from_name(&name)
                .filter(|o| context.allows(*o))
                .ok_or_else(|| self.lexer.error(start, context.expected(), Some(name.clone())))?;

            if options.iter().any(|o| o.name == option) {
                return Err(self
                    .lexer
                    .error(start, "each nested option at most once", Some(name)));
            }

            self.expect(&TokenKind::Equals, "'=' after the option name")?;
            let value = self.parse_value(option)?;
            options.push(ParsedOption {
                name: option,
                value,
            });

            if !(self.eat(&TokenKind::Semicolon)? || self.eat(&TokenKind::Ampersand)?) {
                break;
            }
        }

        Ok(options)
    }

    fn comma_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<Vec<T>> {
        let mut items = vec![item(self)?];
        while self.eat(&TokenKind::Comma)? {
            items.push(item(self)?);
        }
        Ok(items)
    }

    fn parse_orderby(&mut self) -> ParseResult<Vec<OrderByItem>> {
        self.comma_list(|p| {
            let expression = p.parse_expression()?;
            let direction = if p.eat_identifier("desc")? {
                SortDirection::Descending
            } else {
                p.eat_identifier("asc")?;
                SortDirection::Ascending
            };
            Ok(OrderByItem {
                expression,
                direction,
            })
        })
    }

    fn parse_select(&mut self) -> ParseResult<Vec<SelectItem>> {
        self.comma_list(|p| {
            if p.eat(&TokenKind::Star)? {
                return Ok(SelectItem::All);
            }
            let path = p.parse_member_path()?;
            if p.eat_control_segment(COUNT_SEGMENT)? {
                Ok(SelectItem::Count(path))
            } else {
                Ok(SelectItem::Path(path))
            }
        })
    }

    fn parse_expand(&mut self) -> ParseResult<Vec<ExpandItem>> {
        self.comma_list(|p| {
            let target = if p.eat(&TokenKind::Star)? {
                if p.eat_control_segment(REF_SEGMENT)? {
                    ExpandTarget::AllRefs
                } else {
                    ExpandTarget::All
                }
            } else {
                let path = p.parse_member_path()?;
                if p.eat_control_segment(COUNT_SEGMENT)? {
                    ExpandTarget::Count(path)
                } else if p.eat_control_segment(REF_SEGMENT)? {
                    ExpandTarget::Ref(path)
                } else {
                    ExpandTarget::Path(path)
                }
            };

            let options = if p.eat(&TokenKind::OpenParen)? {
                let options =
                    p.scoped(Scope::Expand, |inner| inner.parse_option_list(ListContext::Expand))?;
                p.expect(&TokenKind::CloseParen, "';' or ')' after the expand options")?;
                options
            } else {
                Vec::new()
            };

            Ok(ExpandItem { target, options })
        })
    }

    /// A plain member path for `$select` and `$expand`; stops before `/$...`.
    fn parse_member_path(&mut self) -> ParseResult<PropertyAccess> {
        let mut path = Vec::new();
        loop {
            let (name, start) = self.expect_identifier("a property name")?;
            self.check_member_name(&name, start)?;
            path.push(name);

            let continues = self.peek_is(0, &TokenKind::Slash)?
                && matches!(self.peek(1)?, Some(TokenKind::Identifier(n)) if !n.starts_with('$'));
            if !continues {
                break;
            }
            self.advance()?;
        }
        Ok(PropertyAccess::bare(path))
    }

    // Expressions

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        self.parse_left_assoc(&[BinaryOperator::Or], Self::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        self.parse_left_assoc(&[BinaryOperator::And], Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        self.parse_left_assoc(&BinaryOperator::COMPARISON, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        self.parse_left_assoc(&BinaryOperator::ADDITIVE, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        self.parse_left_assoc(&BinaryOperator::MULTIPLICATIVE, Self::parse_unary)
    }

    fn parse_left_assoc(
        &mut self,
        operators: &[BinaryOperator],
        operand: fn(&mut Self) -> ParseResult<Expression>,
    ) -> ParseResult<Expression> {
        let mut left = operand(self)?;
        while let Some(op) = self.peek_operator(operators)? {
            self.advance()?;
            let right = operand(self)?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn peek_operator(&mut self, operators: &[BinaryOperator]) -> ParseResult<Option<BinaryOperator>> {
        Ok(match self.peek(0)? {
            Some(TokenKind::Identifier(word)) => {
                operators.iter().copied().find(|op| op.keyword() == word)
            }
            _ => None,
        })
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.eat_identifier("not")? {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expression::unary(UnaryOperator::Not, operand));
        }
        if self.eat(&TokenKind::Minus)? {
            let non_numeric = matches!(
                self.peek(0)?,
                Some(TokenKind::Literal(literal))
                    if !matches!(literal, Literal::Integer(_) | Literal::Decimal(_))
            );
            if non_numeric {
                return Err(self.unexpected("a numeric operand after '-'"));
            }
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expression::unary(UnaryOperator::Negate, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.peek(0)? {
            Some(TokenKind::Literal(_)) => match self.advance()? {
                Some(Token {
                    kind: TokenKind::Literal(literal),
                    ..
                }) => Ok(Expression::Literal(literal)),
                _ => Err(self.unexpected("a literal")),
            },
            Some(TokenKind::OpenParen) => {
                self.advance()?;
                let inner = self.nested(Self::parse_expression)?;
                self.expect(&TokenKind::CloseParen, "')'")?;
                Ok(inner)
            }
            Some(TokenKind::Identifier(name)) if name.starts_with('@') => Err(
                self.unexpected("an expression (parameter aliases are not supported)"),
            ),
            Some(TokenKind::Identifier(_)) => {
                if self.peek_is(1, &TokenKind::OpenParen)? {
                    self.parse_function_call()
                } else {
                    self.parse_path_expression()
                }
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_function_call(&mut self) -> ParseResult<Expression> {
        let (name, start) = self.expect_identifier("a function name")?;
        if name.starts_with('$') {
            return Err(self.lexer.error(start, "a function name", Some(name)));
        }
        self.expect(&TokenKind::OpenParen, "'('")?;

        let arguments = self.nested(|p| {
            if p.peek_is(0, &TokenKind::CloseParen)? {
                return Ok(Vec::new());
            }
            p.comma_list(Self::parse_expression)
        })?;

        self.expect(&TokenKind::CloseParen, "',' or ')'")?;
        Ok(Expression::FunctionCall { name, arguments })
    }

    /// A member path, ending in `/$count`, `/$count(...)`, a lambda, or
    /// nothing.
    fn parse_path_expression(&mut self) -> ParseResult<Expression> {
        let (head, start) = self.expect_identifier("a property path")?;
        let mut qualifier = None;
        let mut path = Vec::new();

        if head == IMPLICIT_RANGE_VARIABLE || self.is_lambda_variable(&head) {
            qualifier = Some(head);
        } else {
            self.check_member_name(&head, start)?;
            path.push(head);
        }

        while self.peek_is(0, &TokenKind::Slash)? {
            if self.peek_identifier(1, COUNT_SEGMENT)? {
                self.advance()?;
                self.advance()?;
                let collection = self.resolve(qualifier, path);

                if !self.eat(&TokenKind::OpenParen)? {
                    return Ok(Expression::CollectionCount(collection));
                }

                let options =
                    self.scoped(Scope::Subquery, |p| p.parse_option_list(ListContext::Count))?;
                self.expect(&TokenKind::CloseParen, "';' or ')' after the nested options")?;
                return Ok(Expression::NestedSubquery {
                    collection,
                    options,
                });
            }

            if let Some(kind) = self.peek_lambda()? {
                self.advance()?;
                self.advance()?;
                self.advance()?;
                let collection = self.resolve(qualifier, path);
                return self.parse_lambda(kind, collection);
            }

            self.advance()?;
            let (name, start) = self.expect_identifier("a property name after '/'")?;
            self.check_member_name(&name, start)?;
            path.push(name);
        }

        match qualifier {
            Some(variable) if path.is_empty() => Ok(Expression::RangeVariable(variable)),
            qualifier => Ok(Expression::PropertyAccess(self.resolve(qualifier, path))),
        }
    }

    /// Detects `/any(` or `/all(` at the cursor.
    fn peek_lambda(&mut self) -> ParseResult<Option<LambdaKind>> {
        let kind = match self.peek(1)? {
            Some(TokenKind::Identifier(word)) if word == "any" => LambdaKind::Any,
            Some(TokenKind::Identifier(word)) if word == "all" => LambdaKind::All,
            _ => return Ok(None),
        };
        Ok(self.peek_is(2, &TokenKind::OpenParen)?.then_some(kind))
    }

    /// Parses after `path/any(`.
    fn parse_lambda(&mut self, kind: LambdaKind, collection: PropertyAccess) -> ParseResult<Expression> {
        if kind == LambdaKind::Any && self.eat(&TokenKind::CloseParen)? {
            return Ok(Expression::Lambda {
                kind,
                collection,
                range_variable: None,
                body: None,
            });
        }

        let (variable, start) = self.expect_identifier("a range variable")?;
        if !is_identifier(&variable) {
            return Err(self.lexer.error(start, "a range variable", Some(variable)));
        }
        self.expect(&TokenKind::Colon, "':' after the range variable")?;

        let body = self.scoped(Scope::Lambda(variable.clone()), Self::parse_expression)?;
        self.expect(&TokenKind::CloseParen, "')' to close the lambda")?;

        Ok(Expression::Lambda {
            kind,
            collection,
            range_variable: Some(variable),
            body: Some(Box::new(body)),
        })
    }
}

fn normalize_levels(raw: &str) -> Result<Levels, InvalidLiteralError> {
    match raw.trim() {
        "max" => Ok(Levels::Max),
        other => normalize_non_negative(other)
            .map(Levels::Depth)
            .map_err(|e| InvalidLiteralError {
                expected: "a non-negative integer or 'max'",
                ..e
            }),
    }
}
