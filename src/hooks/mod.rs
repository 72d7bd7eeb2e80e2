//! Collaborator traits and global creation hooks.
//!
//! Errors built here frequently need to reach observability systems the
//! crate knows nothing about: a tracing span, a metrics pipeline, an event
//! bus. Those collaborators are modeled as the three traits below, attached
//! per-build through the [`Builder`](crate::Builder) and invoked at most
//! once each. All of them are optional and best-effort: the traits have no
//! error path, so a misbehaving backend cannot keep a build from returning
//! its error.
//!
//! Separately, [`register_error_hook`] installs process-wide observers that
//! run once for every root error materialized anywhere in the process —
//! useful for central logging or counting without threading a collaborator
//! through every call site.
//!
//! # Examples
//!
//! ```
//! use errkit::{hooks::register_error_hook, Error};
//!
//! register_error_hook(|error: &Error| {
//!     // forward to your logging backend
//!     let _ = error;
//! });
//!
//! let _err = Error::new("observed by the hook above");
//! ```

mod hook_lock;
#[cfg(feature = "tracing")]
mod tracing;

#[cfg(feature = "tracing")]
pub use self::tracing::TracingSpanRecorder;

use core::{fmt, panic::Location};

use crate::{fields::Field, Error};

use self::hook_lock::HookLock;

/// A tracing-span capability consumed at build time.
///
/// Implementations typically record the error on the active span and expose
/// the span's identifiers for correlation. The identifier accessors default
/// to [`None`] for backends without distributed-trace identity.
pub trait SpanRecorder: Send + Sync {
    /// Records the built error on the active span.
    fn record_error(&self, error: &Error);

    /// Forwards the error's flattened fields as span attributes.
    fn set_attributes(&self, fields: &[&Field]);

    /// The active trace identifier, if the backend has one.
    fn trace_id(&self) -> Option<String> {
        None
    }

    /// The active span identifier, if the backend has one.
    fn span_id(&self) -> Option<String> {
        None
    }

    /// The parent span identifier, if the backend has one.
    fn parent_span_id(&self) -> Option<String> {
        None
    }
}

/// A metrics-recording capability consumed at build time.
pub trait MetricsRecorder: Send + Sync {
    /// Counts or otherwise records the built error.
    fn record_error(&self, error: &Error);
}

/// An event-dispatch capability consumed at build time.
///
/// Implementations close over whatever request state they need; the crate
/// passes only the error.
pub trait EventSink: Send + Sync {
    /// Dispatches the built error to the backend.
    fn send_event(&self, error: &Error);
}

/// A process-wide observer of root-error creation.
///
/// Any `Fn(&Error) + Send + Sync + 'static` closure qualifies.
pub trait ErrorHook: Send + Sync + 'static {
    /// Called once per root error materialized in this process.
    fn on_error(&self, error: &Error);
}

impl<F> ErrorHook for F
where
    F: Fn(&Error) + Send + Sync + 'static,
{
    fn on_error(&self, error: &Error) {
        self(error)
    }
}

struct RegisteredHook {
    hook: Box<dyn ErrorHook>,
    added_at: &'static Location<'static>,
}

impl fmt::Debug for RegisteredHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error hook registered at {}:{}",
            self.added_at.file(),
            self.added_at.line()
        )
    }
}

static HOOKS: HookLock<Vec<RegisteredHook>> = HookLock::new();

/// Registers a process-wide creation hook.
///
/// Hooks run in registration order, once per root error, on the thread that
/// created the error. They cannot be unregistered; register at startup.
#[track_caller]
pub fn register_error_hook<H: ErrorHook>(hook: H) {
    let added_at = Location::caller();
    let mut guard = HOOKS.write();
    guard
        .get()
        .get_or_insert_with(Vec::new)
        .push(RegisteredHook {
            hook: Box::new(hook),
            added_at,
        });
}

/// Number of registered creation hooks.
pub fn error_hook_count() -> usize {
    HOOKS.read().get().map_or(0, Vec::len)
}

pub(crate) fn notify_error_created(error: &Error) {
    let guard = HOOKS.read();
    if let Some(hooks) = guard.get() {
        for registered in hooks {
            registered.hook.on_error(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn hooks_fire_once_per_root_creation() {
        static SEEN: AtomicUsize = AtomicUsize::new(0);
        const MARKER: &str = "hook-test-marker-7f3a";

        register_error_hook(|error: &Error| {
            if error.message() == MARKER {
                SEEN.fetch_add(1, Ordering::SeqCst);
            }
        });

        let err = Error::new(MARKER);
        assert_eq!(SEEN.load(Ordering::SeqCst), 1);

        // Wrapping is not a root creation.
        let _wrapped = err.wrap("outer");
        assert_eq!(SEEN.load(Ordering::SeqCst), 1);

        assert!(error_hook_count() >= 1);
    }
}
