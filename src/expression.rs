//! Expression tree for `$filter`, `$orderby` and nested query bodies.

use crate::literal::Literal;
use crate::option::ParsedOption;

/// A `/`-separated member path, optionally rooted at a range variable.
///
/// A `qualifier` of `$it` is emitted by the parser for bare paths inside a
/// nested subquery, so `Name` and `$it/Name` in that scope build the same
/// tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyAccess {
    /// Range variable the path starts from (`$it` or a lambda variable)
    pub qualifier: Option<String>,
    /// Member names, in order
    pub path: Vec<String>,
}

impl PropertyAccess {
    /// Creates an unqualified path.
    #[must_use]
    pub fn bare<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            qualifier: None,
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the same path rooted at `qualifier`.
    #[must_use]
    pub fn qualified(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

/// Binary operators, grouped by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOperator {
    /// `or`
    Or,
    /// `and`
    And,
    /// `eq`
    Eq,
    /// `ne`
    Ne,
    /// `gt`
    Gt,
    /// `ge`
    Ge,
    /// `lt`
    Lt,
    /// `le`
    Le,
    /// `has`
    Has,
    /// `add`
    Add,
    /// `sub`
    Sub,
    /// `mul`
    Mul,
    /// `div`
    Div,
    /// `divby`
    DivBy,
    /// `mod`
    Mod,
}

impl BinaryOperator {
    /// Operators of the comparison level.
    pub const COMPARISON: [Self; 7] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Ge,
        Self::Lt,
        Self::Le,
        Self::Has,
    ];

    /// Operators of the additive level.
    pub const ADDITIVE: [Self; 2] = [Self::Add, Self::Sub];

    /// Operators of the multiplicative level.
    pub const MULTIPLICATIVE: [Self; 4] = [Self::Mul, Self::Div, Self::DivBy, Self::Mod];

    /// Returns the lower-case keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Has => "has",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::DivBy => "divby",
            Self::Mod => "mod",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne | Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::Has => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::DivBy | Self::Mod => 5,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOperator {
    /// `not`
    Not,
    /// `-`
    Negate,
}

/// Precedence of unary operators; above every binary operator.
pub(crate) const UNARY_PRECEDENCE: u8 = 6;

/// Precedence of atoms (literals, paths, calls).
pub(crate) const PRIMARY_PRECEDENCE: u8 = 7;

/// `any` or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LambdaKind {
    /// `any`
    Any,
    /// `all`
    All,
}

impl LambdaKind {
    /// Returns the lower-case keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::All => "all",
        }
    }
}

/// A parsed query expression.
///
/// Each node owns its children; trees are finite and acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expression {
    /// A scalar literal
    Literal(Literal),
    /// A member path
    PropertyAccess(PropertyAccess),
    /// A range variable used on its own, such as `$it`
    RangeVariable(String),
    /// `left op right`
    Binary {
        /// Operator
        op: BinaryOperator,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOperator,
        /// Operand
        operand: Box<Expression>,
    },
    /// `path/$count`
    CollectionCount(PropertyAccess),
    /// `path/$count(options)`; the options are scoped to the collection's
    /// elements
    NestedSubquery {
        /// The counted collection
        collection: PropertyAccess,
        /// Options applied before counting
        options: Vec<ParsedOption>,
    },
    /// `path/any(v:body)` or `path/all(v:body)`
    Lambda {
        /// `any` or `all`
        kind: LambdaKind,
        /// The collection the lambda ranges over
        collection: PropertyAccess,
        /// Declared range variable; `None` only for `any()`
        range_variable: Option<String>,
        /// Predicate; `None` only for `any()`
        body: Option<Box<Expression>>,
    },
    /// `name(arg, ...)`
    FunctionCall {
        /// Function name, possibly namespace-qualified
        name: String,
        /// Arguments in order
        arguments: Vec<Expression>,
    },
}

impl Expression {
    /// Builds a binary node.
    #[must_use]
    pub fn binary(op: BinaryOperator, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds a unary node.
    #[must_use]
    pub fn unary(op: UnaryOperator, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Binding strength of the node's outermost operator.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Binary { op, .. } => op.precedence(),
            Self::Unary { .. } => UNARY_PRECEDENCE,
            _ => PRIMARY_PRECEDENCE,
        }
    }
}
