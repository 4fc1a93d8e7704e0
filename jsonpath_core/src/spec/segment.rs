//! Types representing segments in JSONPath
use crate::{context::EvalContext, error::Error, node::Node};

use super::{query::Queryable, selector::Selector};

/// A segment of a JSONPath query
#[derive(Debug, PartialEq, Clone)]
pub struct QuerySegment {
    /// The kind of segment
    pub kind: QuerySegmentKind,
    /// The segment
    pub segment: Segment,
}

impl QuerySegment {
    /// Is this a normal child segment
    pub fn is_child(&self) -> bool {
        matches!(self.kind, QuerySegmentKind::Child)
    }

    /// Is this a recursive descent child
    pub fn is_descendent(&self) -> bool {
        !self.is_child()
    }
}

impl std::fmt::Display for QuerySegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if matches!(self.kind, QuerySegmentKind::Descendant) {
            write!(f, "..")?;
        }
        write!(f, "{segment}", segment = self.segment)
    }
}

/// The kind of query segment
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum QuerySegmentKind {
    /// A normal child
    ///
    /// Addresses the direct descendant of the preceding segment
    Child,
    /// A descendant child
    ///
    /// Addresses all descendant children of the preceding segment, recursively
    Descendant,
}

impl Queryable for QuerySegment {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Path Segment", level = "trace", parent = None, ret))]
    fn query<'b>(&self, ctx: &EvalContext, current: &Node<'b>, depth: usize) -> Result<Vec<Node<'b>>, Error> {
        let mut query = self.segment.query(ctx, current, depth)?;
        if matches!(self.kind, QuerySegmentKind::Descendant) {
            query.append(&mut descend(ctx, self, current, depth)?);
        }
        Ok(query)
    }
}

#[cfg_attr(feature = "trace", tracing::instrument(name = "Descend", level = "trace", parent = None, ret))]
fn descend<'b>(
    ctx: &EvalContext,
    segment: &QuerySegment,
    current: &Node<'b>,
    depth: usize,
) -> Result<Vec<Node<'b>>, Error> {
    let depth = depth + 1;
    if depth > ctx.max_recursion_depth {
        return Err(Error::Recursion(ctx.max_recursion_depth));
    }
    let mut query = Vec::new();
    if let Some(list) = current.value().as_array() {
        for (i, v) in list.iter().enumerate() {
            let child = current.clone_and_push(v, i);
            query.append(&mut segment.query(ctx, &child, depth)?);
        }
    } else if let Some(obj) = current.value().as_object() {
        let mut entries: Vec<_> = obj.iter().collect();
        ctx.shuffle(&mut entries);
        for (k, v) in entries {
            let child = current.clone_and_push(v, k);
            query.append(&mut segment.query(ctx, &child, depth)?);
        }
    }
    Ok(query)
}

/// Represents the different forms of JSONPath segment
#[derive(Debug, PartialEq, Clone)]
pub enum Segment {
    /// Long hand segments contain multiple selectors inside square brackets
    LongHand(Vec<Selector>),
    /// Dot-name selectors are a short form for representing keys in an object
    DotName(String),
    /// The wildcard shorthand `.*`
    Wildcard,
}

impl Segment {
    /// Does this segment extract a singular node
    pub fn is_singular(&self) -> bool {
        match self {
            Segment::LongHand(selectors) => {
                if selectors.len() > 1 {
                    return false;
                }
                if let Some(s) = selectors.first() {
                    s.is_singular()
                } else {
                    // an empty selector list would not be a valid JSONPath, but it would select
                    // nothing, which can be considered singular.
                    true
                }
            }
            Segment::DotName(_) => true,
            Segment::Wildcard => false,
        }
    }

    /// Optionally produce self as a slice of selectors, from a long hand segment
    pub fn as_long_hand(&self) -> Option<&[Selector]> {
        match self {
            Segment::LongHand(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Optionally produce self as a single name segment
    pub fn as_dot_name(&self) -> Option<&str> {
        match self {
            Segment::DotName(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::LongHand(selectors) => {
                write!(f, "[")?;
                for (i, s) in selectors.iter().enumerate() {
                    write!(
                        f,
                        "{s}{comma}",
                        comma = if i == selectors.len() - 1 { "" } else { "," }
                    )?;
                }
                write!(f, "]")?;
            }
            Segment::DotName(name) => write!(f, ".{name}")?,
            Segment::Wildcard => write!(f, ".*")?,
        }
        Ok(())
    }
}

impl Queryable for Segment {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Segment", level = "trace", parent = None, ret))]
    fn query<'b>(&self, ctx: &EvalContext, current: &Node<'b>, depth: usize) -> Result<Vec<Node<'b>>, Error> {
        let mut query = Vec::new();
        match self {
            Segment::LongHand(selectors) => {
                for selector in selectors {
                    query.append(&mut selector.query(ctx, current, depth)?);
                }
            }
            Segment::DotName(key) => {
                if let Some((k, v)) = current.value().as_object().and_then(|o| o.get_key_value(key)) {
                    query.push(current.clone_and_push(v, k));
                }
            }
            Segment::Wildcard => {
                if let Some(list) = current.value().as_array() {
                    for (i, v) in list.iter().enumerate() {
                        query.push(current.clone_and_push(v, i));
                    }
                } else if let Some(obj) = current.value().as_object() {
                    let mut entries: Vec<_> = obj.iter().collect();
                    ctx.shuffle(&mut entries);
                    for (k, v) in entries {
                        query.push(current.clone_and_push(v, k));
                    }
                }
            }
        }
        Ok(query)
    }
}
