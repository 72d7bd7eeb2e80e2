//! The classification triad carried by every root error.
//!
//! A root error records three orthogonal labels: a [`Class`] describing what
//! kind of failure occurred, a [`Category`] naming the subsystem it occurred
//! in, and a [`Severity`]. All three are plain data — mapping a [`Class`] to
//! an HTTP status, a metric label, or a log level is the job of the layers
//! consuming this crate.

use core::{fmt, str::FromStr};
use std::borrow::Cow;

use crate::limits::{self, MAX_TAG_LEN};

/// The kind of failure a root error describes.
///
/// The set of classes is closed and deliberately transport-agnostic. A class
/// answers "what went wrong", not "what should the HTTP response be".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Class {
    /// No class assigned.
    #[default]
    Unknown,
    /// Input failed validation.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The operation conflicts with existing state.
    Conflict,
    /// The caller is authenticated but not allowed to do this.
    PermissionDenied,
    /// The caller is not authenticated.
    Unauthenticated,
    /// The operation ran out of time.
    Timeout,
    /// The caller exceeded a rate limit.
    RateLimited,
    /// A required collaborator is temporarily unavailable.
    Unavailable,
    /// The operation was cancelled before completion.
    Cancelled,
    /// An internal invariant was violated.
    Internal,
}

impl Class {
    /// The canonical string form of this class.
    pub const fn as_str(self) -> &'static str {
        match self {
            Class::Unknown => "unknown",
            Class::Validation => "validation",
            Class::NotFound => "not_found",
            Class::Conflict => "conflict",
            Class::PermissionDenied => "permission_denied",
            Class::Unauthenticated => "unauthenticated",
            Class::Timeout => "timeout",
            Class::RateLimited => "rate_limited",
            Class::Unavailable => "unavailable",
            Class::Cancelled => "cancelled",
            Class::Internal => "internal",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Class {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Class::Unknown),
            "validation" => Ok(Class::Validation),
            "not_found" => Ok(Class::NotFound),
            "conflict" => Ok(Class::Conflict),
            "permission_denied" => Ok(Class::PermissionDenied),
            "unauthenticated" => Ok(Class::Unauthenticated),
            "timeout" => Ok(Class::Timeout),
            "rate_limited" => Ok(Class::RateLimited),
            "unavailable" => Ok(Class::Unavailable),
            "cancelled" => Ok(Class::Cancelled),
            "internal" => Ok(Class::Internal),
            _ => Err(ParseTaxonomyError::new("class", s)),
        }
    }
}

/// How serious a root error is.
///
/// Ordered from least to most severe, so severities can be compared:
///
/// ```
/// use errkit::Severity;
///
/// assert!(Severity::Critical > Severity::Warning);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum Severity {
    /// Diagnostic detail, not actionable on its own.
    Debug,
    /// Expected condition worth recording.
    Info,
    /// Degraded but functioning.
    Warning,
    /// The operation failed.
    #[default]
    Error,
    /// The process or a whole subsystem is compromised.
    Critical,
}

impl Severity {
    /// The canonical string form of this severity.
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" => Ok(Severity::Critical),
            _ => Err(ParseTaxonomyError::new("severity", s)),
        }
    }
}

/// The subsystem a root error is attributed to.
///
/// Unlike [`Class`], the set of categories is open: the constants below cover
/// common subsystems, and [`Category::new`] accepts any tag. Tags longer than
/// [`MAX_TAG_LEN`] bytes are truncated, never rejected.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Category(Cow<'static, str>);

impl Category {
    /// No particular subsystem.
    pub const GENERAL: Category = Category(Cow::Borrowed("general"));
    /// Persistent storage.
    pub const DATABASE: Category = Category(Cow::Borrowed("database"));
    /// Network transport.
    pub const NETWORK: Category = Category(Cow::Borrowed("network"));
    /// Local filesystem and devices.
    pub const IO: Category = Category(Cow::Borrowed("io"));
    /// Configuration loading and validation.
    pub const CONFIG: Category = Category(Cow::Borrowed("config"));
    /// Authentication and authorization.
    pub const AUTH: Category = Category(Cow::Borrowed("auth"));
    /// A third-party service.
    pub const EXTERNAL: Category = Category(Cow::Borrowed("external"));

    /// Creates a category from an arbitrary tag, clamped to [`MAX_TAG_LEN`].
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        let tag = tag.into();
        if tag.len() <= MAX_TAG_LEN {
            Category(tag)
        } else {
            Category(Cow::Owned(limits::clamp(tag.into_owned(), MAX_TAG_LEN)))
        }
    }

    /// The tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::GENERAL
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Category {
    type Err = ParseTaxonomyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Category::new(s.to_string()))
    }
}

/// Error returned when parsing a taxonomy label from text fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseTaxonomyError {
    kind: &'static str,
    value: String,
}

impl ParseTaxonomyError {
    fn new(kind: &'static str, value: &str) -> Self {
        ParseTaxonomyError {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseTaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {} label: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for ParseTaxonomyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_round_trips_through_text() {
        for class in [
            Class::Unknown,
            Class::Validation,
            Class::NotFound,
            Class::Conflict,
            Class::PermissionDenied,
            Class::Unauthenticated,
            Class::Timeout,
            Class::RateLimited,
            Class::Unavailable,
            Class::Cancelled,
            Class::Internal,
        ] {
            assert_eq!(class.as_str().parse::<Class>().unwrap(), class);
        }
    }

    #[test]
    fn unknown_class_label_is_an_error() {
        let err = "teapot".parse::<Class>().unwrap_err();
        assert!(err.to_string().contains("teapot"));
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Critical);
        assert_eq!(Severity::default(), Severity::Error);
    }

    #[test]
    fn category_clamps_long_tags() {
        let tag = "x".repeat(MAX_TAG_LEN * 2);
        assert_eq!(Category::new(tag).as_str().len(), MAX_TAG_LEN);
        assert_eq!(Category::default(), Category::GENERAL);
    }
}
