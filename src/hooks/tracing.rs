//! Span recorder backed by the `tracing` ecosystem.

use crate::{fields::Field, Error};

use super::SpanRecorder;

/// A [`SpanRecorder`] that emits the built error as a `tracing` event in the
/// current span.
///
/// `tracing` spans do not expose distributed-trace identifiers, so the
/// identifier accessors keep their [`None`] defaults; an OpenTelemetry layer
/// on the subscriber side attaches them downstream.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use errkit::{hooks::TracingSpanRecorder, Builder, Class};
///
/// let err = Builder::new("upstream returned garbage")
///     .class(Class::Unavailable)
///     .span(Arc::new(TracingSpanRecorder))
///     .build();
/// assert_eq!(err.class(), Class::Unavailable);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSpanRecorder;

impl SpanRecorder for TracingSpanRecorder {
    fn record_error(&self, error: &Error) {
        tracing::error!(
            target: "errkit",
            class = error.class().as_str(),
            category = error.category().as_str(),
            severity = error.severity().as_str(),
            retryable = error.retryable(),
            "{error}"
        );
    }

    fn set_attributes(&self, fields: &[&Field]) {
        for field in fields {
            tracing::debug!(
                target: "errkit",
                key = field.key(),
                value = field.value(),
                "error attribute"
            );
        }
    }
}
