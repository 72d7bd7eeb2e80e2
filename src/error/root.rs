//! Root node data and construction.

use std::time::SystemTime;

use triomphe::Arc;

use crate::{
    classification::{Category, Class, Severity},
    fields::{self, Field},
    frame::FrameFormat,
    hooks,
    limits::{self, MAX_ID_LEN, MAX_MESSAGE_LEN},
    stack::RawStack,
};

use super::{Error, ErrorNode};

/// The classification record of a root error.
///
/// Kept separate from [`RootBody`] so the copy-on-write setters can replace
/// it without touching the absorbed cause or captured stack.
#[derive(Clone, Debug, Default)]
pub(crate) struct Meta {
    pub(crate) class: Class,
    pub(crate) category: Category,
    pub(crate) severity: Severity,
    pub(crate) id: Option<Box<str>>,
    pub(crate) retryable: bool,
}

/// Everything a root error owns exactly once: message, absorbed cause,
/// captured stack, timestamp, fields. Shared, never copied, by every node
/// built on top of it.
pub(crate) struct RootBody {
    pub(crate) message: Box<str>,
    pub(crate) cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    pub(crate) stack: Option<RawStack>,
    pub(crate) created_at: SystemTime,
    pub(crate) fields: Vec<Field>,
    pub(crate) format: Option<FrameFormat>,
}

/// A root chain node: classification plus a shared body.
pub(crate) struct RootNode {
    pub(crate) meta: Meta,
    pub(crate) body: Arc<RootBody>,
}

impl Error {
    /// Creates a new root error with the given message.
    ///
    /// No stack is captured; use the [`Builder`](crate::Builder) to request
    /// one. The message is clamped to
    /// [`MAX_MESSAGE_LEN`](crate::limits::MAX_MESSAGE_LEN).
    ///
    /// # Examples
    ///
    /// ```
    /// use errkit::Error;
    ///
    /// let err = Error::new("disk full");
    /// assert_eq!(err.to_string(), "disk full");
    /// ```
    pub fn new(message: impl Into<String>) -> Error {
        Self::new_root(message.into(), None, Vec::new())
    }

    /// Creates a root error with message and a flat alternating field list.
    ///
    /// An odd trailing key is kept and paired with
    /// [`MISSING_VALUE`](crate::fields::MISSING_VALUE).
    pub fn with_context<I, S>(message: impl Into<String>, context: I) -> Error
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new_root(message.into(), None, fields::normalize(context))
    }

    /// Creates a root error that absorbs `cause`.
    ///
    /// If `cause` is itself an [`Error`], no new root is created — the
    /// existing chain is wrapped instead, so its stack, classification, and
    /// fields are preserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use errkit::Error;
    ///
    /// let io = std::io::Error::other("device gone");
    /// let err = Error::from_cause(io, "flush failed");
    /// assert_eq!(err.to_string(), "flush failed: device gone");
    /// ```
    pub fn from_cause<E>(cause: E, message: impl Into<String>) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::absorb(Box::new(cause), message.into())
    }

    /// Boxed-cause form of [`from_cause`](Self::from_cause), routing existing
    /// [`Error`] chains to the wrap path.
    pub(crate) fn absorb(
        cause: Box<dyn std::error::Error + Send + Sync + 'static>,
        message: String,
    ) -> Error {
        match cause.downcast::<Error>() {
            Ok(inner) => {
                if message.is_empty() {
                    inner.wrap_silent()
                } else {
                    inner.wrap(message)
                }
            }
            Err(foreign) => Self::new_root(message, Some(foreign), Vec::new()),
        }
    }

    pub(crate) fn new_root(
        message: String,
        cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
        fields: Vec<Field>,
    ) -> Error {
        Self::new_root_full(message, cause, fields, Meta::default(), None, None)
    }

    /// The single materialization point for root nodes. Fires the global
    /// creation hooks exactly once per root.
    pub(crate) fn new_root_full(
        message: String,
        cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
        fields: Vec<Field>,
        meta: Meta,
        stack: Option<RawStack>,
        format: Option<FrameFormat>,
    ) -> Error {
        let error = Error::from_node(ErrorNode::Root(RootNode {
            meta,
            body: Arc::new(RootBody {
                message: limits::clamp(message, MAX_MESSAGE_LEN).into_boxed_str(),
                cause,
                stack,
                created_at: SystemTime::now(),
                fields,
                format,
            }),
        }));
        hooks::notify_error_created(&error);
        error
    }

    /// Returns a copy of this root with `class` replaced.
    ///
    /// Classification lives on the root record; calling any `with_*`
    /// classification setter on a wrap is a lenient no-op that returns the
    /// chain unchanged.
    pub fn with_class(&self, class: Class) -> Error {
        self.with_meta(|meta| meta.class = class)
    }

    /// Returns a copy of this root with `category` replaced.
    pub fn with_category(&self, category: Category) -> Error {
        self.with_meta(|meta| meta.category = category)
    }

    /// Returns a copy of this root with `severity` replaced.
    pub fn with_severity(&self, severity: Severity) -> Error {
        self.with_meta(|meta| meta.severity = severity)
    }

    /// Returns a copy of this root with the identifier replaced, clamped to
    /// [`MAX_ID_LEN`](crate::limits::MAX_ID_LEN).
    pub fn with_id(&self, id: impl Into<String>) -> Error {
        let id = limits::clamp(id.into(), MAX_ID_LEN).into_boxed_str();
        self.with_meta(|meta| meta.id = Some(id))
    }

    /// Returns a copy of this root with the retryable flag replaced.
    pub fn with_retryable(&self, retryable: bool) -> Error {
        self.with_meta(|meta| meta.retryable = retryable)
    }

    fn with_meta(&self, apply: impl FnOnce(&mut Meta)) -> Error {
        match self.node() {
            ErrorNode::Root(root) => {
                let mut meta = root.meta.clone();
                apply(&mut meta);
                Error::from_node(ErrorNode::Root(RootNode {
                    meta,
                    body: root.body.clone(),
                }))
            }
            ErrorNode::Wrap(_) => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_defaults() {
        let err = Error::new("boom");
        assert_eq!(err.message(), "boom");
        assert_eq!(err.class(), Class::Unknown);
        assert_eq!(err.category(), &Category::GENERAL);
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.id(), None);
        assert!(!err.retryable());
        assert!(!err.has_stack());
    }

    #[test]
    fn with_setters_are_copy_on_write() {
        let base = Error::new("boom");
        let classified = base.with_class(Class::Timeout).with_retryable(true);

        assert_eq!(base.class(), Class::Unknown);
        assert!(!base.retryable());
        assert_eq!(classified.class(), Class::Timeout);
        assert!(classified.retryable());
        // The body is shared, not copied.
        assert_eq!(base.message(), classified.message());
        assert_eq!(base.created_at(), classified.created_at());
    }

    #[test]
    fn classification_setter_on_wrap_is_a_noop() {
        let wrapped = Error::new("boom").wrap("outer");
        let same = wrapped.with_class(Class::Timeout);
        assert_eq!(same.class(), Class::Unknown);
        assert_eq!(same.to_string(), wrapped.to_string());
    }

    #[test]
    fn absorbing_an_errkit_error_wraps_instead() {
        let inner = Error::new("root").with_id("err-1");
        let outer = Error::from_cause(inner, "outer");
        assert_eq!(outer.to_string(), "outer: root");
        // The original root survives as the chain's root, id intact.
        assert_eq!(outer.id(), Some("err-1"));
    }

    #[test]
    fn oversized_inputs_are_clamped_not_rejected() {
        let long = "m".repeat(limits::MAX_MESSAGE_LEN * 2);
        let err = Error::new(long).with_id("i".repeat(limits::MAX_ID_LEN * 2));
        assert_eq!(err.message().len(), limits::MAX_MESSAGE_LEN);
        assert_eq!(err.id().unwrap().len(), limits::MAX_ID_LEN);
    }
}
