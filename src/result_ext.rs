//! Extension methods for `Result`, the main ergonomic entry point.

use crate::Error;

mod sealed {
    pub trait Sealed {}
    impl<T, E> Sealed for Result<T, E> {}
}

/// Adds context-attaching combinators to any `Result` whose error satisfies
/// the plain [`std::error::Error`] contract.
///
/// A foreign error is absorbed into a new root; a `Result<_, errkit::Error>`
/// is wrapped instead, so the existing chain's stack and classification
/// survive.
///
/// # Examples
///
/// ```
/// use errkit::ResultExt;
///
/// fn read_config(path: &str) -> errkit::Result<String> {
///     let raw = std::fs::read_to_string(path)
///         .with_context(|| format!("failed to read configuration file {path}"))?;
///     Ok(raw)
/// }
///
/// let err = read_config("/definitely/not/here").unwrap_err();
/// assert!(err.to_string().starts_with("failed to read configuration file"));
/// ```
pub trait ResultExt<T>: sealed::Sealed {
    /// Attaches a context message to the error, if any.
    #[must_use]
    fn context(self, message: impl Into<String>) -> Result<T, Error>;

    /// Attaches a lazily-built context message to the error, if any. The
    /// closure only runs on the error path.
    #[must_use]
    fn with_context<F, S>(self, message: F) -> Result<T, Error>
    where
        F: FnOnce() -> S,
        S: Into<String>;

    /// Converts the error without attaching a message.
    #[must_use]
    fn into_error(self) -> Result<T, Error>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T, Error> {
        self.map_err(|error| Error::absorb(Box::new(error), message.into()))
    }

    fn with_context<F, S>(self, message: F) -> Result<T, Error>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|error| Error::absorb(Box::new(error), message().into()))
    }

    fn into_error(self) -> Result<T, Error> {
        self.map_err(|error| Error::absorb(Box::new(error), String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_absorbs_foreign_errors() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::other("no device"));
        let err = result.context("writing snapshot").unwrap_err();
        assert_eq!(err.to_string(), "writing snapshot: no device");
        assert!(err.cause().is_some());
    }

    #[test]
    fn context_wraps_errkit_errors() {
        let classified = Error::new("root").with_id("keep-me");
        let result: Result<(), Error> = Err(classified);
        let err = result.context("outer").unwrap_err();

        assert_eq!(err.to_string(), "outer: root");
        // Wrapped, not absorbed: the chain's root identity survives.
        assert_eq!(err.id(), Some("keep-me"));
        assert_eq!(err.depth(), 1);
    }

    #[test]
    fn with_context_is_lazy() {
        let ok: Result<u32, std::io::Error> = Ok(7);
        let value = ok
            .with_context(|| -> String { panic!("must not run on the success path") })
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn into_error_keeps_the_cause_text() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::other("raw cause"));
        let err = result.into_error().unwrap_err();
        assert_eq!(err.to_string(), "raw cause");
        assert_eq!(err.message(), "");
    }
}
