//! Optional navigation lookups against an entity data model.
//!
//! The builder is purely syntactic unless a [`NavigationResolver`] is
//! injected. With one, every entity set and navigation in the resource path,
//! every `$expand` path, and every collection that `$count`, a nested query
//! or a lambda is applied to must resolve.
//!
//! Plain property references inside expressions are not checked; the
//! resolver only describes navigation.

use std::fmt;

use crate::constants::IMPLICIT_RANGE_VARIABLE;
use crate::error::SemanticError;
use crate::expression::{Expression, PropertyAccess};
use crate::option::{ExpandTarget, OptionValue, ParsedOption, SelectItem};
use crate::path_segment::PathSegment;
use crate::resource_path::ResourcePath;

/// The type a navigation resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementType {
    /// Qualified type name, such as `NS.Person`
    pub name: String,
    /// True if the navigation yields a collection of this type
    pub is_collection: bool,
}

impl ElementType {
    /// A collection of `name`.
    #[must_use]
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_collection: true,
        }
    }

    /// A single instance of `name`.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_collection: false,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collection {
            write!(f, "Collection({})", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Looks up entity sets and navigation properties.
///
/// Implementations must be shareable across threads; a configured
/// [`UriBuilder`](crate::UriBuilder) holds one behind an `Arc`.
///
/// # Examples
///
/// ```
/// use odata_uri::{ElementType, NavigationResolver};
///
/// struct People;
///
/// impl NavigationResolver for People {
///     fn resolve_navigation_property(
///         &self,
///         type_context: Option<&ElementType>,
///         name: &str,
///     ) -> Option<ElementType> {
///         match (type_context.map(|t| t.name.as_str()), name) {
///             (None, "People") => Some(ElementType::collection("NS.Person")),
///             (Some("NS.Person"), "Friends") => Some(ElementType::collection("NS.Person")),
///             _ => None,
///         }
///     }
/// }
///
/// assert!(People.resolve_navigation_property(None, "People").is_some());
/// ```
pub trait NavigationResolver: Send + Sync {
    /// Resolves `name` on `type_context`, or on the entity container when
    /// `type_context` is `None`.
    fn resolve_navigation_property(
        &self,
        type_context: Option<&ElementType>,
        name: &str,
    ) -> Option<ElementType>;
}

/// Runs the lookup pass over a parsed request.
pub(crate) fn check<'o>(
    resolver: &dyn NavigationResolver,
    path: &ResourcePath,
    options: impl IntoIterator<Item = &'o ParsedOption>,
) -> Result<(), SemanticError> {
    let checker = Checker { resolver };
    match checker.check_path(path)? {
        Some(target) => checker.check_options(&target, options, &mut Vec::new()),
        None => Ok(()),
    }
}

struct Checker<'r> {
    resolver: &'r dyn NavigationResolver,
}

impl Checker<'_> {
    fn lookup(&self, context: Option<&ElementType>, name: &str) -> Result<ElementType, SemanticError> {
        self.resolver
            .resolve_navigation_property(context, name)
            .ok_or_else(|| SemanticError::UnknownProperty {
                name: name.to_string(),
                type_context: context.map(|t| t.name.clone()),
            })
    }

    /// The type the path addresses; `None` when the resolver cannot
    /// describe it (service document, `$metadata`, bound operations).
    fn check_path(&self, path: &ResourcePath) -> Result<Option<ElementType>, SemanticError> {
        let mut current: Option<ElementType> = None;
        let mut last_name = "";

        for segment in path.segments() {
            match segment {
                PathSegment::EntitySet(name) | PathSegment::Navigation(name) => {
                    current = Some(self.lookup(current.as_ref(), name)?);
                    last_name = name;
                }
                PathSegment::Key(_) => {
                    if let Some(target) = current.as_mut() {
                        target.is_collection = false;
                    }
                }
                PathSegment::Count => {
                    if current.as_ref().is_some_and(|t| !t.is_collection) {
                        return Err(SemanticError::NotACollection {
                            name: last_name.to_string(),
                        });
                    }
                }
                PathSegment::BoundOperation(_) => return Ok(None),
                PathSegment::Ref | PathSegment::Value | PathSegment::Metadata | PathSegment::Batch => {}
            }
        }

        Ok(current)
    }

    fn check_options<'o>(
        &self,
        it: &ElementType,
        options: impl IntoIterator<Item = &'o ParsedOption>,
        variables: &mut Vec<(String, ElementType)>,
    ) -> Result<(), SemanticError> {
        for option in options {
            match &option.value {
                OptionValue::Filter(expr) => self.check_expression(it, expr, variables)?,
                OptionValue::OrderBy(items) => {
                    for item in items {
                        self.check_expression(it, &item.expression, variables)?;
                    }
                }
                OptionValue::Select(items) => {
                    for item in items {
                        if let SelectItem::Count(path) = item {
                            self.resolve_collection(it, path, variables)?;
                        }
                    }
                }
                OptionValue::Expand(items) => {
                    for item in items {
                        let target = match &item.target {
                            ExpandTarget::All | ExpandTarget::AllRefs => continue,
                            ExpandTarget::Count(path) => self.resolve_collection(it, path, variables)?,
                            ExpandTarget::Path(path) | ExpandTarget::Ref(path) => {
                                self.resolve(it, path, variables)?
                            }
                        };
                        if let Some(target) = target {
                            self.check_options(&target, &item.options, variables)?;
                        }
                    }
                }
                OptionValue::Top(_)
                | OptionValue::Skip(_)
                | OptionValue::Count(_)
                | OptionValue::Search(_)
                | OptionValue::Apply(_)
                | OptionValue::Format(_)
                | OptionValue::Levels(_) => {}
            }
        }
        Ok(())
    }

    fn check_expression(
        &self,
        it: &ElementType,
        expr: &Expression,
        variables: &mut Vec<(String, ElementType)>,
    ) -> Result<(), SemanticError> {
        match expr {
            Expression::Literal(_) | Expression::PropertyAccess(_) | Expression::RangeVariable(_) => {
                Ok(())
            }
            Expression::Binary { left, right, .. } => {
                self.check_expression(it, left, variables)?;
                self.check_expression(it, right, variables)
            }
            Expression::Unary { operand, .. } => self.check_expression(it, operand, variables),
            Expression::FunctionCall { arguments, .. } => arguments
                .iter()
                .try_for_each(|arg| self.check_expression(it, arg, variables)),
            Expression::CollectionCount(collection) => {
                self.resolve_collection(it, collection, variables).map(drop)
            }
            Expression::NestedSubquery {
                collection,
                options,
            } => match self.resolve_collection(it, collection, variables)? {
                Some(element) => self.check_options(&element, options, variables),
                None => Ok(()),
            },
            Expression::Lambda {
                collection,
                range_variable,
                body,
                ..
            } => {
                let element = self.resolve_collection(it, collection, variables)?;
                let (Some(element), Some(variable), Some(body)) = (element, range_variable, body)
                else {
                    return Ok(());
                };
                variables.push((variable.clone(), element));
                let result = self.check_expression(it, body, variables);
                variables.pop();
                result
            }
        }
    }

    /// Walks `access` from its root; `None` if the root is a variable the
    /// pass has no type for.
    fn resolve(
        &self,
        it: &ElementType,
        access: &PropertyAccess,
        variables: &[(String, ElementType)],
    ) -> Result<Option<ElementType>, SemanticError> {
        let mut current = match access.qualifier.as_deref() {
            None | Some(IMPLICIT_RANGE_VARIABLE) => it.clone(),
            Some(variable) => match variables.iter().rev().find(|(name, _)| name == variable) {
                Some((_, element)) => element.clone(),
                None => return Ok(None),
            },
        };

        // Type-cast segments (`NS.Derived`) keep the current type.
        for name in access.path.iter().filter(|name| !name.contains('.')) {
            current = self.lookup(Some(&current), name)?;
        }

        Ok(Some(current))
    }

    fn resolve_collection(
        &self,
        it: &ElementType,
        access: &PropertyAccess,
        variables: &[(String, ElementType)],
    ) -> Result<Option<ElementType>, SemanticError> {
        let resolved = self.resolve(it, access, variables)?;
        if resolved.as_ref().is_some_and(|t| !t.is_collection) {
            return Err(SemanticError::NotACollection {
                name: access.to_string(),
            });
        }
        Ok(resolved)
    }
}
