//! Slice selectors for selecting array slices in JSONPath
use crate::{context::EvalContext, error::Error, node::Node, spec::query::Queryable};

/// A slice selector
#[derive(Debug, PartialEq, Eq, Default, Clone, Copy)]
pub struct Slice {
    /// The start of the slice
    ///
    /// This can be negative to start the slice from a position relative to the end of the array
    /// being sliced.
    pub start: Option<isize>,
    /// The end of the slice
    ///
    /// This can be negative to end the slice at a position relative to the end of the array being
    /// sliced.
    pub end: Option<isize>,
    /// The step slice for the slice
    ///
    /// This can be negative to step in reverse order.
    pub step: Option<isize>,
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{start}")?;
        }
        write!(f, ":")?;
        if let Some(end) = self.end {
            write!(f, "{end}")?;
        }
        if let Some(step) = self.step {
            write!(f, ":{step}")?;
        }
        Ok(())
    }
}

#[doc(hidden)]
impl Slice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start(mut self, start: isize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: isize) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }
}

impl Queryable for Slice {
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Query Slice", level = "trace", parent = None, ret))]
    fn query<'b>(&self, _ctx: &EvalContext, current: &Node<'b>, _depth: usize) -> Result<Vec<Node<'b>>, Error> {
        let Some(list) = current.value().as_array() else {
            return Ok(vec![]);
        };
        let mut query = Vec::new();
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Ok(vec![]);
        }
        let Ok(len) = isize::try_from(list.len()) else {
            return Ok(vec![]);
        };
        if step > 0 {
            let start_default = self.start.unwrap_or(0);
            let end_default = self.end.unwrap_or(len);
            let start = normalize_slice_index(start_default, len)
                .unwrap_or(0)
                .max(0);
            let end = normalize_slice_index(end_default, len).unwrap_or(0).max(0);
            let lower = start.min(len);
            let upper = end.min(len);
            let mut i = lower;
            while i < upper {
                if let Some((i, v)) = usize::try_from(i).ok().and_then(|i| list.get(i).map(|v| (i, v))) {
                    query.push(current.clone_and_push(v, i));
                }
                i += step;
            }
        } else {
            let start_default = self.start.unwrap_or(len.saturating_sub(1));
            let end_default = self.end.unwrap_or(len.saturating_neg().saturating_sub(1));
            let start = normalize_slice_index(start_default, len)
                .unwrap_or(0)
                .max(-1);
            let end = normalize_slice_index(end_default, len).unwrap_or(0).max(-1);
            let lower = end.min(len.checked_sub(1).unwrap_or(len));
            let upper = start.min(len.checked_sub(1).unwrap_or(len));
            let mut i = upper;
            while lower < i {
                if let Some((i, v)) = usize::try_from(i).ok().and_then(|i| list.get(i).map(|v| (i, v))) {
                    query.push(current.clone_and_push(v, i));
                }
                i += step;
            }
        }
        Ok(query)
    }
}

fn normalize_slice_index(index: isize, len: isize) -> Option<isize> {
    if index >= 0 {
        Some(index)
    } else {
        index.checked_abs().and_then(|i| len.checked_sub(i))
    }
}

#[cfg(test)]
mod tests {
    use super::Slice;

    #[test]
    fn display_all_default_has_one_colon() {
        assert_eq!(Slice::new().to_string(), ":");
    }

    #[test]
    fn display_omits_step_when_unset() {
        assert_eq!(Slice::new().with_start(1).with_end(3).to_string(), "1:3");
    }

    #[test]
    fn display_includes_step_when_set() {
        assert_eq!(
            Slice::new().with_start(1).with_end(5).with_step(2).to_string(),
            "1:5:2"
        );
    }
}
