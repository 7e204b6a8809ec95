use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::wikidata::ItemRef;

/// Predecessor trace recorded during graph exploration, keyed by the node
/// that was discovered and pointing at the node it was reached from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachedFromTrace(pub BTreeMap<ItemRef, ItemRef>);

impl ReachedFromTrace {
    /// Number of discovered nodes in the trace.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the trace is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ReachedFromTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (item, from) in &self.0 {
            if !first {
                writeln!(f)?;
            }
            write!(f, "  {item} <- {from}")?;
            first = false;
        }
        Ok(())
    }
}

/// Main error type for mediagraph
#[derive(Error, Debug)]
pub enum MediaGraphError {
    /// Malformed identifier, unexpected value shape from the data source,
    /// unsupported calendar/timezone in a time value, or an unrecognized
    /// relation category in a query response.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport or HTTP failure from the underlying data source. Not
    /// retried at this layer.
    #[error("data fetch error: {0}")]
    DataFetch(String),

    /// Traversal discovered more nodes than the fixed budget allows. Carries
    /// the full predecessor trace for diagnosis.
    #[error("exploration exceeded {limit} nodes; reached-from trace:\n{trace}")]
    Explosion {
        limit: usize,
        trace: ReachedFromTrace,
    },
}

/// Convenient Result type using MediaGraphError
pub type Result<T> = std::result::Result<T, MediaGraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: u64) -> ItemRef {
        ItemRef::from_numeric(n)
    }

    #[test]
    fn test_error_display() {
        let err = MediaGraphError::Validation("bad identifier".to_string());
        assert!(err.to_string().contains("validation error"));
        assert!(err.to_string().contains("bad identifier"));
    }

    #[test]
    fn test_explosion_display_includes_trace() {
        let mut map = BTreeMap::new();
        map.insert(q(2), q(1));
        map.insert(q(3), q(2));
        let err = MediaGraphError::Explosion {
            limit: 1000,
            trace: ReachedFromTrace(map),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("exceeded 1000 nodes"));
        assert!(rendered.contains("Q2 <- Q1"));
        assert!(rendered.contains("Q3 <- Q2"));
    }

    #[test]
    fn test_trace_display_ordered() {
        let mut map = BTreeMap::new();
        map.insert(q(10), q(1));
        map.insert(q(2), q(1));
        let trace = ReachedFromTrace(map);
        let rendered = trace.to_string();
        let q2 = rendered.find("Q2 <-").unwrap();
        let q10 = rendered.find("Q10 <-").unwrap();
        assert!(q2 < q10);
        assert_eq!(trace.len(), 2);
        assert!(!trace.is_empty());
    }
}
