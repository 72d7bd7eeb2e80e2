//! Two-phase call-stack handling: cheap capture now, resolution on demand.
//!
//! [`RawStack::capture`] walks the stack and stores raw return addresses
//! only — no symbolication, no allocation beyond one buffer. Turning those
//! addresses into human-readable, classified [`Frame`]s happens in
//! [`RawStack::resolve`], which is pure and repeatable: resolving the same
//! raw stack twice yields the same frames. Nothing here caches resolution
//! results; callers that resolve concurrently duplicate work instead of
//! racing.

mod render;

pub use self::render::render_stack;

use core::ffi::c_void;

use crate::{frame::Frame, limits::MAX_STACK_DEPTH};

/// An unresolved sequence of return addresses.
///
/// Immutable once captured. The addresses are opaque; they only become
/// meaningful through [`resolve`](Self::resolve).
///
/// # Examples
///
/// ```
/// use errkit::RawStack;
///
/// let stack = RawStack::capture(0);
/// let once = stack.resolve();
/// let twice = stack.resolve();
/// assert_eq!(once, twice);
/// ```
#[derive(Clone, Debug)]
pub struct RawStack {
    ips: Box<[usize]>,
}

impl RawStack {
    /// Captures the current stack, dropping the first `skip` frames, up to
    /// [`MAX_STACK_DEPTH`] addresses.
    ///
    /// Returns immediately without resolving any symbols. If the stack
    /// cannot be enumerated on this platform the result is simply empty;
    /// capture never fails.
    #[inline(never)]
    pub fn capture(skip: usize) -> Self {
        let mut ips = Vec::with_capacity(MAX_STACK_DEPTH);
        let mut index = 0usize;
        backtrace::trace(|frame| {
            index += 1;
            if index <= skip {
                return true;
            }
            ips.push(frame.ip() as usize);
            ips.len() < MAX_STACK_DEPTH
        });
        RawStack {
            ips: ips.into_boxed_slice(),
        }
    }

    /// Number of raw addresses captured.
    pub fn len(&self) -> usize {
        self.ips.len()
    }

    /// Whether the capture produced no addresses.
    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }

    /// Resolves the raw addresses into classified frames.
    ///
    /// Runtime machinery and this crate's own capture helpers are filtered
    /// out; the walk continues to completion even when interior frames are
    /// removed. Addresses without symbol or file information are skipped.
    pub fn resolve(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        for &ip in &self.ips {
            resolve_ip(ip, &mut frames);
        }
        frames.retain(|frame| !frame.is_runtime() && !frame.is_internal());
        frames
    }

    /// The first user-code frame, falling back to the first resolved frame
    /// when no frame qualifies as user code.
    pub fn top_user_frame(&self) -> Option<Frame> {
        let frames = self.resolve();
        frames
            .iter()
            .find(|frame| frame.is_user())
            .or_else(|| frames.first())
            .cloned()
    }
}

/// Captures a single return address, dropping the first `skip` frames.
/// Returns `0` when the stack cannot be enumerated.
#[inline(never)]
pub(crate) fn capture_return_address(skip: usize) -> usize {
    let mut index = 0usize;
    let mut ip = 0usize;
    backtrace::trace(|frame| {
        index += 1;
        if index <= skip {
            return true;
        }
        ip = frame.ip() as usize;
        false
    });
    ip
}

/// Resolves a wrap point to its frame, if the address is non-zero and does
/// not land in capture machinery.
pub(crate) fn resolve_wrap_point(ip: usize) -> Option<Frame> {
    if ip == 0 {
        return None;
    }
    let mut frames = Vec::new();
    resolve_ip(ip, &mut frames);
    frames
        .into_iter()
        .find(|frame| !frame.is_runtime() && !frame.is_internal())
}

fn resolve_ip(ip: usize, out: &mut Vec<Frame>) {
    backtrace::resolve(ip as *mut c_void, |symbol| {
        // Frames without symbol names or filenames carry no diagnostic
        // value; skip them and keep walking.
        let (Some(name), Some(file)) = (symbol.name(), symbol.filename()) else {
            return;
        };
        out.push(Frame::new(
            format!("{name:#}"),
            Some(file.to_string_lossy().into_owned()),
            symbol.lineno(),
        ));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_bounded() {
        let stack = RawStack::capture(0);
        assert!(stack.len() <= MAX_STACK_DEPTH);
    }

    #[test]
    fn skip_removes_leading_frames() {
        let full = RawStack::capture(0);
        let skipped = RawStack::capture(2);
        assert!(skipped.len() <= full.len());
    }

    #[test]
    fn resolution_is_idempotent() {
        let stack = RawStack::capture(0);
        assert_eq!(stack.resolve(), stack.resolve());
    }

    #[test]
    fn resolved_frames_exclude_noise() {
        let stack = RawStack::capture(0);
        for frame in stack.resolve() {
            assert!(!frame.is_runtime(), "runtime frame survived: {frame:?}");
            assert!(!frame.is_internal(), "internal frame survived: {frame:?}");
        }
    }

    #[test]
    fn own_test_frames_stay_visible() {
        let stack = RawStack::capture(0);
        let frames = stack.resolve();
        assert!(
            frames
                .iter()
                .any(|frame| frame.qualified_name().contains("stack::tests")),
            "expected this test in {frames:?}"
        );
    }

    #[test]
    fn top_user_frame_prefers_user_code() {
        let stack = RawStack::capture(0);
        let top = stack.top_user_frame().expect("non-empty stack");
        assert!(top.is_user() || !stack.resolve().iter().any(Frame::is_user));
    }

    #[test]
    fn return_address_capture() {
        let ip = capture_return_address(0);
        assert_ne!(ip, 0);
        assert!(resolve_wrap_point(0).is_none());
    }
}
