//! Single-value property path selector
//!
//! Supports a JSONPath-like subset: an optional leading `$`, dotted field
//! access (`.name`), index access (`[0]`) and quoted field access
//! (`['first name']`, `["first name"]`). A bare leading field (`a.b`) is
//! accepted as shorthand for `$.a.b`. Wildcards, slices and filters are not
//! supported.

use crate::graph::{GraphError, GraphResult, PropertyMap, PropertyValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// A parsed property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> GraphResult<Self> {
        let invalid = |why: &str| GraphError::InvalidPath(format!("{:?}: {}", path, why));

        let mut rest = path.trim();
        if let Some(stripped) = rest.strip_prefix('$') {
            rest = stripped;
        } else if !rest.is_empty() && !rest.starts_with('.') && !rest.starts_with('[') {
            // bare leading field
            let end = rest.find(['.', '[', ']']).unwrap_or(rest.len());
            let mut segments = vec![Segment::Field(rest[..end].to_string())];
            segments.extend(Self::parse_tail(&rest[end..], &invalid)?);
            return Ok(Self { segments });
        }

        let segments = Self::parse_tail(rest, &invalid)?;
        if segments.is_empty() {
            return Err(invalid("path selects no property"));
        }
        Ok(Self { segments })
    }

    fn parse_tail(
        mut rest: &str,
        invalid: &dyn Fn(&str) -> GraphError,
    ) -> GraphResult<Vec<Segment>> {
        let mut segments = Vec::new();
        while !rest.is_empty() {
            if let Some(after_dot) = rest.strip_prefix('.') {
                let end = after_dot.find(['.', '[', ']']).unwrap_or(after_dot.len());
                if end == 0 {
                    return Err(invalid("empty field name"));
                }
                segments.push(Segment::Field(after_dot[..end].to_string()));
                rest = &after_dot[end..];
            } else if let Some(inner) = rest.strip_prefix('[') {
                let (segment, consumed) = Self::parse_bracket(inner, invalid)?;
                segments.push(segment);
                rest = &inner[consumed..];
            } else {
                return Err(invalid("expected '.' or '['"));
            }
        }
        Ok(segments)
    }

    /// Parse the contents after `[`; returns the segment and bytes consumed including `]`
    fn parse_bracket(
        inner: &str,
        invalid: &dyn Fn(&str) -> GraphError,
    ) -> GraphResult<(Segment, usize)> {
        let quote = inner.chars().next().filter(|c| *c == '\'' || *c == '"');
        if let Some(q) = quote {
            let body = &inner[1..];
            let close = body.find(q).ok_or_else(|| invalid("unterminated quote"))?;
            if !body[close + 1..].starts_with(']') {
                return Err(invalid("expected ']' after quoted field"));
            }
            Ok((Segment::Field(body[..close].to_string()), close + 3))
        } else {
            let close = inner.find(']').ok_or_else(|| invalid("unterminated '['"))?;
            let index = inner[..close]
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("index must be a non-negative integer"))?;
            Ok((Segment::Index(index), close + 1))
        }
    }

    /// Resolve the path against a property bag
    pub fn select<'a>(&self, properties: &'a PropertyMap) -> Option<&'a PropertyValue> {
        let (first, tail) = self.segments.split_first()?;
        let mut current = match first {
            Segment::Field(name) => properties.get(name)?,
            Segment::Index(_) => return None,
        };
        for segment in tail {
            current = match segment {
                Segment::Field(name) => current.as_object()?.get(name)?,
                Segment::Index(i) => current.as_array()?.get(*i)?,
            };
        }
        Some(current)
    }
}

/// Parse and resolve in one step
pub fn select<'a>(properties: &'a PropertyMap, path: &str) -> GraphResult<Option<&'a PropertyValue>> {
    Ok(PropertyPath::parse(path)?.select(properties))
}
