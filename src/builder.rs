//! Staged construction of classified root errors.

use std::sync::Arc;

use crate::{
    classification::{Category, Class, Severity},
    error::root::Meta,
    fields,
    frame::FrameFormat,
    hooks::{EventSink, MetricsRecorder, SpanRecorder},
    limits::{self, MAX_ID_LEN},
    stack::RawStack,
    Error,
};

/// A staging record for building one classified root error.
///
/// Setters mutate the staging record; [`build`](Builder::build) materializes
/// the final chain node exactly once, regardless of how much context was
/// staged. Builders are single-threaded staging objects — only the immutable
/// [`Error`] they produce is meant to cross thread boundaries.
///
/// # Examples
///
/// ```
/// use errkit::{Builder, Category, Class, Severity};
///
/// let err = Builder::new("replica lag exceeded threshold")
///     .class(Class::Unavailable)
///     .category(Category::DATABASE)
///     .severity(Severity::Warning)
///     .id("replica-lag")
///     .retryable(true)
///     .field("replica", "eu-west-2a")
///     .build();
///
/// assert_eq!(err.class(), Class::Unavailable);
/// assert_eq!(err.id(), Some("replica-lag"));
/// assert_eq!(err.to_string(), "replica lag exceeded threshold replica=eu-west-2a");
/// ```
#[must_use]
pub struct Builder {
    message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    class: Class,
    category: Category,
    severity: Severity,
    id: Option<String>,
    retryable: bool,
    fields: Vec<String>,
    capture_stack: bool,
    stack_skip: usize,
    format: Option<FrameFormat>,
    span: Option<Arc<dyn SpanRecorder>>,
    metrics: Option<Arc<dyn MetricsRecorder>>,
    events: Option<Arc<dyn EventSink>>,
}

impl Builder {
    /// Starts a builder with the given base message.
    pub fn new(message: impl Into<String>) -> Self {
        Builder {
            message: message.into(),
            cause: None,
            class: Class::default(),
            category: Category::default(),
            severity: Severity::default(),
            id: None,
            retryable: false,
            fields: Vec::new(),
            capture_stack: false,
            stack_skip: 0,
            format: None,
            span: None,
            metrics: None,
            events: None,
        }
    }

    /// Absorbs a cause into the error being built.
    ///
    /// If the cause is an [`Error`] that already carries a captured stack,
    /// [`build`](Self::build) will not capture a second one even when
    /// [`capture_stack`](Self::capture_stack) was requested — one logical
    /// failure gets one trace.
    pub fn cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Sets the failure class.
    pub fn class(mut self, class: Class) -> Self {
        self.class = class;
        self
    }

    /// Sets the subsystem category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the identifier, clamped to [`MAX_ID_LEN`].
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Marks the error retryable.
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Stages one key/value field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(key.into());
        self.fields.push(value.into());
        self
    }

    /// Stages a flat alternating field list. An odd trailing key is kept and
    /// paired with the sentinel value at build time.
    pub fn fields<I, S>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(context.into_iter().map(Into::into));
        self
    }

    /// Requests a stack capture at build time. Off by default, keeping plain
    /// construction off the capture path.
    pub fn capture_stack(mut self) -> Self {
        self.capture_stack = true;
        self
    }

    /// Drops `skip` additional leading frames from the captured stack.
    pub fn stack_skip(mut self, skip: usize) -> Self {
        self.stack_skip = skip;
        self
    }

    /// Stages a frame format used whenever the built error renders its
    /// stack.
    pub fn frame_format(mut self, format: FrameFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Attaches a span recorder, invoked once at build time.
    pub fn span(mut self, span: Arc<dyn SpanRecorder>) -> Self {
        self.span = Some(span);
        self
    }

    /// Attaches a metrics recorder, invoked once at build time.
    pub fn metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Attaches an event sink, invoked once at build time.
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Materializes the error.
    ///
    /// Allocates the final chain node exactly once, then fires the staged
    /// collaborators in fixed order — span, event, metrics — each at most
    /// once. Absent collaborators are skipped; nothing a collaborator does
    /// can prevent this method from returning the built error.
    pub fn build(self) -> Error {
        let cause_has_stack = match self.cause.as_deref() {
            Some(cause) => {
                let cause: &(dyn std::error::Error + 'static) = cause;
                cause.downcast_ref::<Error>().is_some_and(Error::has_stack)
            }
            None => false,
        };

        let stack = if self.capture_stack && !cause_has_stack {
            Some(RawStack::capture(self.stack_skip))
        } else {
            None
        };

        let meta = Meta {
            class: self.class,
            category: self.category,
            severity: self.severity,
            id: self
                .id
                .map(|id| limits::clamp(id, MAX_ID_LEN).into_boxed_str()),
            retryable: self.retryable,
        };

        let error = Error::new_root_full(
            self.message,
            self.cause,
            fields::normalize(self.fields),
            meta,
            stack,
            self.format,
        );

        if let Some(span) = &self.span {
            span.record_error(&error);
            span.set_attributes(&error.fields());
        }
        if let Some(events) = &self.events {
            events.send_event(&error);
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_error(&error);
        }

        error
    }
}

impl Error {
    /// Starts a [`Builder`] with the given base message.
    pub fn builder(message: impl Into<String>) -> Builder {
        Builder::new(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::fields::Field;

    #[test]
    fn build_round_trips_every_staged_value() {
        let err = Builder::new("boom")
            .class(Class::Conflict)
            .category(Category::NETWORK)
            .severity(Severity::Critical)
            .id("err-42")
            .retryable(true)
            .fields(["a", "1", "b", "2"])
            .build();

        assert_eq!(err.message(), "boom");
        assert_eq!(err.class(), Class::Conflict);
        assert_eq!(err.category(), &Category::NETWORK);
        assert_eq!(err.severity(), Severity::Critical);
        assert_eq!(err.id(), Some("err-42"));
        assert!(err.retryable());
        let fields: Vec<String> = err.fields().iter().map(|f| f.to_string()).collect();
        assert_eq!(fields, ["a=1", "b=2"]);
    }

    #[test]
    fn odd_staged_fields_get_the_sentinel() {
        let err = Builder::new("boom").fields(["a", "1", "tail"]).build();
        let fields = err.fields();
        assert_eq!(fields[1].key(), "tail");
        assert_eq!(fields[1].value(), crate::fields::MISSING_VALUE);
    }

    #[test]
    fn capture_stack_is_opt_in() {
        assert!(!Builder::new("quiet").build().has_stack());
        assert!(Builder::new("traced").capture_stack().build().has_stack());
    }

    #[test]
    fn capture_is_skipped_when_the_cause_already_has_a_stack() {
        let traced = Builder::new("inner").capture_stack().build();
        let outer = Builder::new("outer").cause(traced).capture_stack().build();
        assert!(!outer.has_stack());

        let untraced = Error::new("inner");
        let outer = Builder::new("outer").cause(untraced).capture_stack().build();
        assert!(outer.has_stack());
    }

    struct Recorder {
        calls: Mutex<Vec<&'static str>>,
    }

    impl crate::hooks::SpanRecorder for Recorder {
        fn record_error(&self, _: &Error) {
            self.calls.lock().unwrap().push("span");
        }
        fn set_attributes(&self, _: &[&Field]) {
            self.calls.lock().unwrap().push("attrs");
        }
    }

    impl crate::hooks::EventSink for Recorder {
        fn send_event(&self, _: &Error) {
            self.calls.lock().unwrap().push("event");
        }
    }

    impl crate::hooks::MetricsRecorder for Recorder {
        fn record_error(&self, _: &Error) {
            self.calls.lock().unwrap().push("metrics");
        }
    }

    #[test]
    fn collaborators_fire_once_in_fixed_order() {
        let recorder = Arc::new(Recorder {
            calls: Mutex::new(Vec::new()),
        });

        let _ = Builder::new("observed")
            .span(recorder.clone())
            .events(recorder.clone())
            .metrics(recorder.clone())
            .build();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(*calls, ["span", "attrs", "event", "metrics"]);
    }

    #[test]
    fn absent_collaborators_are_no_ops() {
        let err = Builder::new("plain").build();
        assert_eq!(err.message(), "plain");
    }
}
