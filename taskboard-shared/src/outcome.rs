/// Tagged result for domain access operations
///
/// Every access-layer call reports one of three outcomes so callers can tell
/// "there is nothing to show" apart from "the request failed":
///
/// - `Ok(value)`: the operation produced data
/// - `Empty`: the operation succeeded but there is nothing visible
///   (no rows, or rows hidden by the membership policy)
/// - `Failed(reason)`: the operation failed; the reason is typed
///
/// # Example
///
/// ```
/// use taskboard_shared::outcome::Outcome;
///
/// let found: Outcome<u32> = Outcome::from_option(Some(7));
/// assert_eq!(found.ok(), Some(7));
///
/// let nothing: Outcome<Vec<u32>> = Outcome::from_vec(Vec::new());
/// assert!(nothing.is_empty());
/// ```

use crate::access::AccessError;

/// Result of a domain access operation
#[derive(Debug)]
#[must_use]
pub enum Outcome<T> {
    /// The operation produced a value
    Ok(T),

    /// The operation succeeded without anything to return
    Empty,

    /// The operation failed
    Failed(AccessError),
}

impl<T> Outcome<T> {
    /// Wraps an optional value: `None` becomes `Empty`
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Outcome::Ok(value),
            None => Outcome::Empty,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Returns the value if the outcome is `Ok`
    pub fn ok(self) -> Option<T> {
        match self {
            Outcome::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure reason if the outcome is `Failed`
    pub fn failure(&self) -> Option<&AccessError> {
        match self {
            Outcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Maps the `Ok` value, leaving `Empty` and `Failed` untouched
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(err) => Outcome::Failed(err),
        }
    }

    /// Converts back into a `Result`, with `Empty` as `Ok(None)`
    pub fn into_result(self) -> Result<Option<T>, AccessError> {
        match self {
            Outcome::Ok(value) => Ok(Some(value)),
            Outcome::Empty => Ok(None),
            Outcome::Failed(err) => Err(err),
        }
    }
}

impl<T> Outcome<Vec<T>> {
    /// Wraps a collection: an empty collection becomes `Empty`
    pub fn from_vec(items: Vec<T>) -> Self {
        if items.is_empty() {
            Outcome::Empty
        } else {
            Outcome::Ok(items)
        }
    }

    /// Returns the items, treating `Empty` as no items
    ///
    /// Returns `Err` only when the outcome is `Failed`.
    pub fn into_items(self) -> Result<Vec<T>, AccessError> {
        match self {
            Outcome::Ok(items) => Ok(items),
            Outcome::Empty => Ok(Vec::new()),
            Outcome::Failed(err) => Err(err),
        }
    }
}

impl<T> From<Result<Option<T>, AccessError>> for Outcome<T> {
    fn from(result: Result<Option<T>, AccessError>) -> Self {
        match result {
            Ok(value) => Outcome::from_option(value),
            Err(err) => Outcome::Failed(err),
        }
    }
}
