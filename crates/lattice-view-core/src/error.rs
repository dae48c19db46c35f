//! Error types for Lattice View.

/// A specialized Result type for Lattice View operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// The main error type for view and collection operations.
///
/// Precondition failures (`IndexOutOfRange`, `RangeOutOfBounds`,
/// `ItemNotFound`) are always reported before anything is mutated.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// An index argument is outside the valid bounds of the collection.
    #[error("index {index} is out of range for a collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A `(index, count)` range does not fit inside the collection.
    #[error("range starting at {index} with count {count} exceeds collection length {len}")]
    RangeOutOfBounds {
        index: usize,
        count: usize,
        len: usize,
    },

    /// The referenced item is not present in the collection.
    #[error("item not found in collection")]
    ItemNotFound,

    /// An asynchronous load was cancelled before it mutated anything.
    #[error("operation was cancelled")]
    Cancelled,

    /// The fetch function of an asynchronous load failed.
    #[error("fetch failed: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The dispatcher could not accept work (its consumer has shut down).
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

impl ViewError {
    /// Create an index error.
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create a range error.
    pub fn range_out_of_bounds(index: usize, count: usize, len: usize) -> Self {
        Self::RangeOutOfBounds { index, count, len }
    }

    /// Create a fetch error from any boxed error source.
    pub fn fetch(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Fetch(source.into())
    }

    /// Returns `true` for errors raised by argument validation.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::RangeOutOfBounds { .. } | Self::ItemNotFound
        )
    }
}

/// Validates that `index` addresses an existing element of a collection of `len`.
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(ViewError::index_out_of_range(index, len))
    }
}

/// Validates that `index` is a valid insertion point (`0..=len`).
pub fn check_insert_index(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(ViewError::index_out_of_range(index, len))
    }
}

/// Validates that `index..index + count` lies within `0..=len`.
pub fn check_range(index: usize, count: usize, len: usize) -> Result<()> {
    match index.checked_add(count) {
        Some(end) if end <= len => Ok(()),
        _ => Err(ViewError::range_out_of_bounds(index, count, len)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_index() {
        assert!(check_index(0, 1).is_ok());
        assert!(matches!(
            check_index(1, 1),
            Err(ViewError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(check_index(0, 0).is_err());
    }

    #[test]
    fn test_check_insert_index() {
        assert!(check_insert_index(0, 0).is_ok());
        assert!(check_insert_index(3, 3).is_ok());
        assert!(check_insert_index(4, 3).is_err());
    }

    #[test]
    fn test_check_range() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(1, 2, 3).is_ok());
        assert!(check_range(2, 2, 3).is_err());
        assert!(check_range(usize::MAX, 2, 3).is_err());
    }

    #[test]
    fn test_display() {
        let err = ViewError::index_out_of_range(5, 2);
        assert_eq!(
            err.to_string(),
            "index 5 is out of range for a collection of length 2"
        );
        assert!(err.is_precondition());
        assert!(!ViewError::Cancelled.is_precondition());
    }

    #[test]
    fn test_fetch_source() {
        let err = ViewError::fetch("connection reset");
        assert_eq!(err.to_string(), "fetch failed: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }
}
