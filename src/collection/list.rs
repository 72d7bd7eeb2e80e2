//! Ordered error lists.

use parking_lot::Mutex;

use crate::Error;

/// An ordered, growable collection of errors with no deduplication.
///
/// # Examples
///
/// ```
/// use errkit::{Error, ErrorList};
///
/// let mut list = ErrorList::new();
/// list.push(Error::new("first"));
/// list.push(Error::new("second"));
///
/// let combined = list.error().unwrap();
/// assert!(combined.to_string().contains("first"));
/// assert!(combined.to_string().contains("second"));
/// ```
#[derive(Clone, Default)]
pub struct ErrorList {
    errors: Vec<Error>,
}

impl ErrorList {
    /// Creates an empty list.
    pub fn new() -> Self {
        ErrorList { errors: Vec::new() }
    }

    /// Appends an error to the end of the list.
    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Returns the error at `index`, or [`None`] when out of range.
    pub fn get(&self, index: usize) -> Option<&Error> {
        self.errors.get(index)
    }

    /// Number of errors in the list.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates the errors in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Removes and returns the error at `index`. An out-of-range index is a
    /// caller mistake reported by [`None`], never a panic.
    pub fn remove(&mut self, index: usize) -> Option<Error> {
        if index < self.errors.len() {
            Some(self.errors.remove(index))
        } else {
            None
        }
    }

    /// Collapses the list into at most one error.
    ///
    /// Empty list → [`None`]. One entry → that entry, unwrapped. Two or more
    /// → a multi-error whose text enumerates every entry.
    pub fn error(&self) -> Option<Error> {
        super::assemble(self.errors.iter().map(|e| (e.clone(), 1)).collect())
    }
}

impl Extend<Error> for ErrorList {
    fn extend<I: IntoIterator<Item = Error>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl FromIterator<Error> for ErrorList {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> Self {
        ErrorList {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a Error;
    type IntoIter = core::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// An [`ErrorList`] whose every operation is serialized behind one lock.
///
/// Operations are synchronous and never block indefinitely: sizes are
/// bounded by what callers insert and no operation suspends while holding
/// the lock.
#[derive(Default)]
pub struct SyncErrorList {
    inner: Mutex<ErrorList>,
}

impl SyncErrorList {
    /// Creates an empty concurrent list.
    pub fn new() -> Self {
        SyncErrorList {
            inner: Mutex::new(ErrorList::new()),
        }
    }

    /// Appends an error.
    pub fn push(&self, error: Error) {
        self.inner.lock().push(error);
    }

    /// Number of errors in the list.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes and returns the error at `index`, if in range.
    pub fn remove(&self, index: usize) -> Option<Error> {
        self.inner.lock().remove(index)
    }

    /// Collapses the list into at most one error.
    pub fn error(&self) -> Option<Error> {
        self.inner.lock().error()
    }

    /// Returns an independent copy sharing no further mutation with this
    /// instance.
    pub fn snapshot(&self) -> ErrorList {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order_without_dedup() {
        let mut list = ErrorList::new();
        list.push(Error::new("same"));
        list.push(Error::new("same"));
        list.push(Error::new("other"));

        assert_eq!(list.len(), 3);
        let messages: Vec<String> = list.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, ["same", "same", "other"]);
    }

    #[test]
    fn error_is_tri_state() {
        let mut list = ErrorList::new();
        assert!(list.error().is_none());

        let single = Error::new("only").with_id("only-id");
        list.push(single.clone());
        let unwrapped = list.error().unwrap();
        assert!(unwrapped.is(&single));
        assert_eq!(unwrapped.id(), Some("only-id"));

        list.push(Error::new("second"));
        let multi = list.error().unwrap();
        let text = multi.to_string();
        assert!(text.contains("2 errors occurred"));
        assert!(text.contains("[only]"));
        assert!(text.contains("[second]"));
    }

    #[test]
    fn remove_reports_out_of_range_by_none() {
        let mut list = ErrorList::new();
        list.push(Error::new("a"));
        assert!(list.remove(5).is_none());
        assert_eq!(list.remove(0).unwrap().to_string(), "a");
        assert!(list.is_empty());
    }

    #[test]
    fn snapshot_is_independent() {
        let shared = SyncErrorList::new();
        shared.push(Error::new("a"));
        let snapshot = shared.snapshot();
        shared.push(Error::new("b"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn sync_list_is_send_sync() {
        static_assertions::assert_impl_all!(SyncErrorList: Send, Sync);
        static_assertions::assert_impl_all!(ErrorList: Send, Sync, Clone);
    }
}
