//! Constants for OData request URI canonicalization.

/// Default maximum accepted length of a raw request URI, in bytes.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 8192;

/// Default maximum nesting depth for query option expressions.
///
/// Counts parenthesized groups, nested sub-queries, lambda bodies,
/// function arguments, unary operands and `$expand` option lists.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Name of the implicit range variable of a nested scope.
pub const IMPLICIT_RANGE_VARIABLE: &str = "$it";

/// Path segment addressing the count of a collection.
pub const COUNT_SEGMENT: &str = "$count";

/// Path segment addressing an entity reference.
pub const REF_SEGMENT: &str = "$ref";

/// Path segment addressing the raw value of a property or media entity.
pub const VALUE_SEGMENT: &str = "$value";

/// Path segment addressing the service metadata document.
pub const METADATA_SEGMENT: &str = "$metadata";

/// Path segment addressing the batch endpoint.
pub const BATCH_SEGMENT: &str = "$batch";

/// Prefix shared by every system query option name.
pub const SYSTEM_OPTION_PREFIX: char = '$';

/// Prefix of a parameter alias name.
pub const PARAMETER_ALIAS_PREFIX: char = '@';
