//! Deferred field cells for lazy attribute materialization.

use std::cell::OnceCell;

use super::NodeError;

/// A field that starts unresolved and caches its resolver outcome, including
/// failures, on first read. Later reads never run the resolver again.
#[derive(Debug)]
pub(crate) struct LazyField<T> {
    cell: OnceCell<Result<T, NodeError>>,
}

impl<T> LazyField<T> {
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub(crate) fn get_or_resolve(
        &self,
        resolve: impl FnOnce() -> Result<T, NodeError>,
    ) -> Result<&T, NodeError> {
        match self.cell.get_or_init(resolve) {
            Ok(value) => Ok(value),
            Err(err) => Err(err.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::NodeTag;

    #[test]
    fn resolver_runs_exactly_once() {
        let field = LazyField::new();
        let mut calls = 0;

        for _ in 0..3 {
            let value = field.get_or_resolve(|| {
                calls += 1;
                Ok(42)
            });
            assert_eq!(value, Ok(&42));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn failures_are_cached_and_replayed() {
        let field: LazyField<u32> = LazyField::new();
        let mut calls = 0;

        for _ in 0..2 {
            let value = field.get_or_resolve(|| {
                calls += 1;
                Err(NodeError::UnsupportedTypeNode(NodeTag::Unknown))
            });
            assert_eq!(
                value,
                Err(NodeError::UnsupportedTypeNode(NodeTag::Unknown))
            );
        }
        assert_eq!(calls, 1);
    }
}
