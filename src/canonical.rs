//! Canonical text for expression and option trees.
//!
//! Rendering rules: one space around binary operators, lower-case
//! keywords, parentheses only where precedence requires them, nested option
//! lists joined with `;`, comma lists without spaces, `asc` omitted, and
//! every range variable qualifier written out (`$it/Name`).
//!
//! The output is unescaped; the builder applies the query-value profile.

use std::fmt;

use crate::constants::{COUNT_SEGMENT, REF_SEGMENT};
use crate::expression::{BinaryOperator, Expression, LambdaKind, PropertyAccess, UnaryOperator};
use crate::option::{
    ExpandItem, ExpandTarget, Levels, OptionValue, OrderByItem, ParsedOption, SelectItem,
    SortDirection,
};

impl fmt::Display for PropertyAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for part in self.qualifier.iter().chain(&self.path) {
            if !first {
                f.write_str("/")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for LambdaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Writes `expr`, parenthesized when it binds looser than `min`.
fn operand(f: &mut fmt::Formatter<'_>, expr: &Expression, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::PropertyAccess(access) => write!(f, "{access}"),
            Self::RangeVariable(name) => f.write_str(name),
            Self::Binary { op, left, right } => {
                let precedence = op.precedence();
                operand(f, left, precedence)?;
                write!(f, " {op} ")?;
                // Left-associative: an equal-precedence right child keeps its
                // parentheses.
                operand(f, right, precedence + 1)
            }
            Self::Unary { op, operand: inner } => {
                match op {
                    UnaryOperator::Not => f.write_str("not ")?,
                    UnaryOperator::Negate => f.write_str("-")?,
                }
                operand(f, inner, self.precedence())
            }
            Self::CollectionCount(collection) => write_count(f, collection),
            Self::NestedSubquery {
                collection,
                options,
            } => {
                write_count(f, collection)?;
                f.write_str("(")?;
                joined(f, options, ";")?;
                f.write_str(")")
            }
            Self::Lambda {
                kind,
                collection,
                range_variable,
                body,
            } => {
                write!(f, "{collection}/{kind}(")?;
                if let (Some(variable), Some(body)) = (range_variable, body) {
                    write!(f, "{variable}:{body}")?;
                }
                f.write_str(")")
            }
            Self::FunctionCall { name, arguments } => {
                write!(f, "{name}(")?;
                joined(f, arguments, ",")?;
                f.write_str(")")
            }
        }
    }
}

fn write_count(f: &mut fmt::Formatter<'_>, collection: &PropertyAccess) -> fmt::Result {
    write!(f, "{collection}/{COUNT_SEGMENT}")
}

impl fmt::Display for OrderByItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.expression),
            SortDirection::Descending => write!(f, "{} desc", self.expression),
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Path(path) => write!(f, "{path}"),
            Self::Count(path) => write!(f, "{path}/{COUNT_SEGMENT}"),
        }
    }
}

impl fmt::Display for ExpandTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::AllRefs => write!(f, "*/{REF_SEGMENT}"),
            Self::Path(path) => write!(f, "{path}"),
            Self::Count(path) => write!(f, "{path}/{COUNT_SEGMENT}"),
            Self::Ref(path) => write!(f, "{path}/{REF_SEGMENT}"),
        }
    }
}

impl fmt::Display for ExpandItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if !self.options.is_empty() {
            f.write_str("(")?;
            joined(f, &self.options, ";")?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Levels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth(depth) => write!(f, "{depth}"),
            Self::Max => f.write_str("max"),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(expr) => write!(f, "{expr}"),
            Self::OrderBy(items) => joined(f, items, ","),
            Self::Select(items) => joined(f, items, ","),
            Self::Expand(items) => joined(f, items, ","),
            Self::Top(n) | Self::Skip(n) => write!(f, "{n}"),
            Self::Count(b) => write!(f, "{b}"),
            Self::Search(text) | Self::Apply(text) | Self::Format(text) => f.write_str(text),
            Self::Levels(levels) => write!(f, "{levels}"),
        }
    }
}

/// `name=value`, as written inside a nested option list.
impl fmt::Display for ParsedOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
