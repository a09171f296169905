//! Parsed system query options.

use crate::expression::{Expression, PropertyAccess};
use crate::query::SystemOption;

/// A system query option with its parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedOption {
    /// Which option this is
    pub name: SystemOption,
    /// The parsed value
    pub value: OptionValue,
}

/// The parsed value of a system query option.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionValue {
    /// `$filter`
    Filter(Expression),
    /// `$orderby`
    OrderBy(Vec<OrderByItem>),
    /// `$select`
    Select(Vec<SelectItem>),
    /// `$expand`
    Expand(Vec<ExpandItem>),
    /// `$top`
    Top(u64),
    /// `$skip`
    Skip(u64),
    /// `$count`
    Count(bool),
    /// `$search`, kept as trimmed text
    Search(String),
    /// `$apply`, kept as trimmed text
    Apply(String),
    /// `$format`, kept as trimmed text
    Format(String),
    /// `$levels`
    Levels(Levels),
}

/// Sort direction of an `$orderby` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    /// `asc`, the default
    #[default]
    Ascending,
    /// `desc`
    Descending,
}

/// One `$orderby` item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderByItem {
    /// The sort key
    pub expression: Expression,
    /// The direction
    pub direction: SortDirection,
}

/// One `$select` item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectItem {
    /// `*`
    All,
    /// A member path
    Path(PropertyAccess),
    /// `path/$count`
    Count(PropertyAccess),
}

/// What an `$expand` item expands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpandTarget {
    /// `*`
    All,
    /// `*/$ref`
    AllRefs,
    /// A navigation path
    Path(PropertyAccess),
    /// `path/$count`
    Count(PropertyAccess),
    /// `path/$ref`
    Ref(PropertyAccess),
}

/// One `$expand` item with its nested options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpandItem {
    /// The expanded navigation
    pub target: ExpandTarget,
    /// Options in the parentheses after the target, in input order
    pub options: Vec<ParsedOption>,
}

impl ExpandItem {
    /// Returns the target path, if the target is not `*`.
    #[must_use]
    pub const fn path(&self) -> Option<&PropertyAccess> {
        match &self.target {
            ExpandTarget::Path(p) | ExpandTarget::Count(p) | ExpandTarget::Ref(p) => Some(p),
            ExpandTarget::All | ExpandTarget::AllRefs => None,
        }
    }
}

/// Value of `$levels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Levels {
    /// A fixed depth
    Depth(u64),
    /// `max`
    Max,
}
