//! Key-deduplicated error sets.

use indexmap::{map::Entry, IndexMap};
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;

use crate::Error;

/// A pure function deriving the deduplication key for an error.
pub type KeyExtractor = fn(&Error) -> String;

fn message_key(error: &Error) -> String {
    error.to_string()
}

/// One stored entry of an [`ErrorSet`]: the first error seen for its key and
/// a count of how many equivalent adds it absorbed.
#[derive(Clone)]
pub struct SetEntry {
    error: Error,
    count: usize,
}

impl SetEntry {
    /// The stored error.
    pub fn error(&self) -> &Error {
        &self.error
    }

    /// Number of [`add`](ErrorSet::add) calls that shared this entry's key.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// A position-stable collection holding at most one error per derived key.
///
/// [`add`](Self::add) computes a key — the assembled message text by
/// default, or whatever [`with_key_extractor`](Self::with_key_extractor)
/// supplies — and either stores a new entry or bumps the existing entry's
/// counter without storing anything. Entries keep their insertion position
/// for as long as they live.
///
/// # Examples
///
/// ```
/// use errkit::{Error, ErrorSet};
///
/// let mut set = ErrorSet::new();
/// set.add(Error::new("connection reset"));
/// set.add(Error::new("connection reset"));
/// set.add(Error::new("timeout"));
///
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.get(0).unwrap().count(), 2);
/// ```
#[derive(Clone)]
pub struct ErrorSet {
    entries: IndexMap<Box<str>, SetEntry, FxBuildHasher>,
    key_fn: KeyExtractor,
}

impl ErrorSet {
    /// Creates an empty set keyed by assembled message text.
    pub fn new() -> Self {
        Self::with_key_extractor(message_key)
    }

    /// Creates an empty set with a custom key extractor.
    ///
    /// ```
    /// use errkit::{Error, ErrorSet};
    ///
    /// // Deduplicate by identifier rather than message.
    /// let mut set = ErrorSet::with_key_extractor(|e| e.id().unwrap_or_default().to_string());
    /// set.add(Error::new("one wording").with_id("dup"));
    /// set.add(Error::new("another wording").with_id("dup"));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn with_key_extractor(key_fn: KeyExtractor) -> Self {
        ErrorSet {
            entries: IndexMap::with_hasher(FxBuildHasher),
            key_fn,
        }
    }

    /// Adds an error, deduplicating by derived key.
    ///
    /// A new key appends an entry with count 1; a known key increments the
    /// existing entry's count and drops the new error.
    pub fn add(&mut self, error: Error) {
        let key = (self.key_fn)(&error).into_boxed_str();
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => occupied.get_mut().count += 1,
            Entry::Vacant(vacant) => {
                vacant.insert(SetEntry { error, count: 1 });
            }
        }
    }

    /// Returns the entry at `index`, or [`None`] when out of range.
    pub fn get(&self, index: usize) -> Option<&SetEntry> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SetEntry> {
        self.entries.values()
    }

    /// Removes and returns the entry at `index`, keeping the key index
    /// consistent and the remaining entries in order. Out of range is
    /// reported by [`None`].
    pub fn remove(&mut self, index: usize) -> Option<Error> {
        self.entries
            .shift_remove_index(index)
            .map(|(_, entry)| entry.error)
    }

    /// Removes the entry whose key matches `error`'s derived key. Returns
    /// whether an entry was removed.
    pub fn remove_error(&mut self, error: &Error) -> bool {
        let key = (self.key_fn)(error);
        self.entries.shift_remove(key.as_str()).is_some()
    }

    /// Collapses the set into at most one error.
    ///
    /// Empty set → [`None`]. One entry → that entry, unwrapped. Two or more
    /// → a multi-error enumerating every entry and each suppressed-duplicate
    /// count.
    pub fn error(&self) -> Option<Error> {
        super::assemble(
            self.entries
                .values()
                .map(|entry| (entry.error.clone(), entry.count))
                .collect(),
        )
    }
}

impl Default for ErrorSet {
    fn default() -> Self {
        ErrorSet::new()
    }
}

/// An [`ErrorSet`] whose every operation is serialized behind one lock.
///
/// # Examples
///
/// ```
/// use std::{sync::Arc, thread};
///
/// use errkit::{Error, SyncErrorSet};
///
/// let set = Arc::new(SyncErrorSet::new());
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let set = Arc::clone(&set);
///         thread::spawn(move || set.add(Error::new("shared failure")))
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Default)]
pub struct SyncErrorSet {
    inner: Mutex<ErrorSet>,
}

impl SyncErrorSet {
    /// Creates an empty concurrent set keyed by assembled message text.
    pub fn new() -> Self {
        SyncErrorSet {
            inner: Mutex::new(ErrorSet::new()),
        }
    }

    /// Creates an empty concurrent set with a custom key extractor.
    pub fn with_key_extractor(key_fn: KeyExtractor) -> Self {
        SyncErrorSet {
            inner: Mutex::new(ErrorSet::with_key_extractor(key_fn)),
        }
    }

    /// Adds an error, deduplicating by derived key.
    pub fn add(&self, error: Error) {
        self.inner.lock().add(error);
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes and returns the entry at `index`, if in range.
    pub fn remove(&self, index: usize) -> Option<Error> {
        self.inner.lock().remove(index)
    }

    /// Removes the entry matching `error`'s derived key.
    pub fn remove_error(&self, error: &Error) -> bool {
        self.inner.lock().remove_error(error)
    }

    /// Collapses the set into at most one error.
    pub fn error(&self) -> Option<Error> {
        self.inner.lock().error()
    }

    /// Returns an independent copy sharing no further mutation with this
    /// instance.
    pub fn snapshot(&self) -> ErrorSet {
        self.inner.lock().clone()
    }
}
