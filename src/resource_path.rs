//! Resource path resolution and canonical rendering.

use crate::error::PathSyntaxError;
use crate::escape::{escape_path_segment, unescape};
use crate::literal::Literal;
use crate::path_segment::{KeyPredicate, PathSegment, invalid_identifier_char};
use crate::settings::KeyDelimiterStyle;

/// The resolved resource path of a request.
///
/// # Examples
///
/// ```
/// use odata_uri::{KeyDelimiterStyle, PathSegment, ResourcePath};
///
/// let path = ResourcePath::parse("People(1)/Friends/$count", KeyDelimiterStyle::Parentheses).unwrap();
/// assert_eq!(path.segments().len(), 4);
/// assert_eq!(path.segments()[3], PathSegment::Count);
///
/// assert_eq!(path.render(KeyDelimiterStyle::Slash), "People/1/Friends/$count");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePath {
    segments: Vec<PathSegment>,
}

impl ResourcePath {
    /// Parses a relative resource path (no service root, no query).
    ///
    /// Key predicates in parentheses are accepted in either style; a bare
    /// literal segment after an entity set or navigation is taken as a key
    /// only under [`KeyDelimiterStyle::Slash`]. An empty path addresses the
    /// service document and has no segments.
    ///
    /// # Errors
    ///
    /// Returns [`PathSyntaxError`] for empty segments, unterminated or
    /// malformed key predicates, invalid identifiers, and control segments in
    /// positions the path grammar forbids.
    pub fn parse(input: &str, style: KeyDelimiterStyle) -> Result<Self, PathSyntaxError> {
        if input.is_empty() {
            return Ok(Self::default());
        }

        let decoded = unescape(input).map_err(|_| PathSyntaxError::InvalidPercentEncoding {
            segment: input.to_string(),
        })?;

        let tokens = split_path(&decoded)?;
        let mut classified: Vec<(usize, PathSegment)> = Vec::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            if token.is_empty() {
                return Err(PathSyntaxError::EmptySegment { index });
            }

            if let Some(control) = PathSegment::control(token) {
                classified.push((index, control));
                continue;
            }

            if let Some(open) = token.find('(') {
                let inner = token[open + 1..].strip_suffix(')').ok_or_else(|| {
                    PathSyntaxError::InvalidKeyPredicate {
                        segment: (*token).to_string(),
                        reason: "unexpected characters after ')'",
                    }
                })?;
                classified.push((index, classify_name(token, &token[..open], index)?));
                classified.push((index, PathSegment::Key(KeyPredicate::parse(token, inner)?)));
                continue;
            }

            let slash_literal = if style == KeyDelimiterStyle::Slash && accepts_slash_key(classified.last()) {
                slash_key(token)
            } else {
                None
            };
            if let Some(literal) = slash_literal {
                classified.push((index, PathSegment::Key(KeyPredicate::Single(literal))));
                continue;
            }

            classified.push((index, classify_name(token, token, index)?));
        }

        check_order(&classified, tokens.len())?;

        Ok(Self {
            segments: classified.into_iter().map(|(_, s)| s).collect(),
        })
    }

    /// Returns the classified segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns true if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if the path ends in `$count`.
    #[must_use]
    pub fn is_count(&self) -> bool {
        self.segments.last() == Some(&PathSegment::Count)
    }

    /// Renders the path with path-profile escaping.
    #[must_use]
    pub fn render(&self, style: KeyDelimiterStyle) -> String {
        let mut rendered: Vec<String> = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                PathSegment::Key(KeyPredicate::Single(literal))
                    if style == KeyDelimiterStyle::Slash && is_slash_literal(literal) =>
                {
                    rendered.push(escape_path_segment(&literal.to_string()).into_owned());
                }
                PathSegment::Key(key) => {
                    let predicate = format!("({key})");
                    match rendered.last_mut() {
                        Some(last) => last.push_str(&escape_path_segment(&predicate)),
                        None => rendered.push(escape_path_segment(&predicate).into_owned()),
                    }
                }
                other => rendered.push(escape_path_segment(&other.to_string()).into_owned()),
            }
        }

        rendered.join("/")
    }
}

/// Splits a decoded path on `/` outside parentheses and quotes.
fn split_path(path: &str) -> Result<Vec<&str>, PathSyntaxError> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;

    for (i, c) in path.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    PathSyntaxError::InvalidKeyPredicate {
                        segment: path[start..=i].to_string(),
                        reason: "unbalanced ')'",
                    }
                })?;
            }
            '/' if !in_quote && depth == 0 => {
                tokens.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth > 0 || in_quote {
        return Err(PathSyntaxError::UnterminatedKeyPredicate {
            segment: path[start..].to_string(),
        });
    }

    tokens.push(&path[start..]);
    Ok(tokens)
}

/// Classifies an identifier: entity set first, then navigation or bound
/// operation depending on namespace qualification.
fn classify_name(segment: &str, name: &str, index: usize) -> Result<PathSegment, PathSyntaxError> {
    if name.is_empty() {
        return Err(PathSyntaxError::InvalidKeyPredicate {
            segment: segment.to_string(),
            reason: "key predicate has no entity set or navigation before it",
        });
    }

    let qualified = index > 0 && name.contains('.');
    let parts: Vec<&str> = if qualified {
        name.split('.').collect()
    } else {
        vec![name]
    };

    let mut offset = 0;
    for part in &parts {
        if part.is_empty() {
            return Err(PathSyntaxError::InvalidIdentifier {
                segment: segment.to_string(),
                char: '.',
                position: offset,
            });
        }
        if let Some((position, char)) = invalid_identifier_char(part) {
            return Err(PathSyntaxError::InvalidIdentifier {
                segment: segment.to_string(),
                char,
                position: offset + position,
            });
        }
        offset += part.chars().count() + 1;
    }

    Ok(if index == 0 {
        PathSegment::EntitySet(name.to_string())
    } else if qualified {
        PathSegment::BoundOperation(name.to_string())
    } else {
        PathSegment::Navigation(name.to_string())
    })
}

fn accepts_slash_key(previous: Option<&(usize, PathSegment)>) -> bool {
    matches!(
        previous,
        Some((_, PathSegment::EntitySet(_) | PathSegment::Navigation(_)))
    )
}

fn slash_key(token: &str) -> Option<Literal> {
    Literal::parse(token).ok().filter(is_slash_literal)
}

/// A slash-style key must be a literal that cannot be mistaken for a name.
/// Other single keys keep their parentheses under either style.
fn is_slash_literal(literal: &Literal) -> bool {
    matches!(
        literal,
        Literal::Integer(_) | Literal::Decimal(_) | Literal::String(_) | Literal::Guid(_)
    )
}

/// Enforces where control segments and keys may appear.
fn check_order(classified: &[(usize, PathSegment)], token_count: usize) -> Result<(), PathSyntaxError> {
    let misplaced = |segment: &PathSegment, index: usize, reason| PathSyntaxError::MisplacedSegment {
        segment: segment.to_string(),
        index,
        reason,
    };

    for (pos, (index, segment)) in classified.iter().enumerate() {
        let index = *index;
        let previous = pos.checked_sub(1).map(|p| &classified[p].1);
        let is_last_token = index + 1 == token_count;

        match segment {
            PathSegment::Metadata | PathSegment::Batch => {
                if token_count != 1 {
                    return Err(misplaced(segment, index, "must be the only segment"));
                }
            }
            PathSegment::Count | PathSegment::Ref | PathSegment::Value => {
                if !is_last_token {
                    return Err(misplaced(segment, index, "must be the last segment"));
                }
                let allowed = match segment {
                    PathSegment::Count => previous.is_some_and(PathSegment::is_collection_like),
                    PathSegment::Ref => previous.is_some_and(|p| {
                        matches!(
                            p,
                            PathSegment::EntitySet(_) | PathSegment::Navigation(_) | PathSegment::Key(_)
                        )
                    }),
                    _ => previous.is_some_and(|p| {
                        matches!(
                            p,
                            PathSegment::Key(_) | PathSegment::Navigation(_) | PathSegment::BoundOperation(_)
                        )
                    }),
                };
                if !allowed {
                    return Err(misplaced(segment, index, "must follow a resource it can apply to"));
                }
            }
            PathSegment::Key(_) => {
                let keyed = previous.is_some_and(|p| {
                    matches!(p, PathSegment::EntitySet(_) | PathSegment::Navigation(_))
                });
                if !keyed {
                    return Err(misplaced(
                        segment,
                        index,
                        "keys apply only to entity sets and navigation properties",
                    ));
                }
            }
            _ => {}
        }
    }

    Ok(())
}
