//! Stack trace rendering.

use std::panic::{self, AssertUnwindSafe};

use crate::frame::{Frame, FrameFormat};

/// Fallback emitted when rendering a stack trace itself fails.
pub(crate) const RENDER_FALLBACK: &str = "<stack trace unavailable>";

/// Renders resolved frames as one line per frame, honoring `format`.
///
/// This is the crate's single defensive recovery point: a panic raised while
/// formatting degrades to a fallback string instead of propagating out of a
/// diagnostic path.
pub fn render_stack(frames: &[Frame], format: &FrameFormat) -> String {
    panic::catch_unwind(AssertUnwindSafe(|| render_inner(frames, format)))
        .unwrap_or_else(|_| RENDER_FALLBACK.to_string())
}

fn render_inner(frames: &[Frame], format: &FrameFormat) -> String {
    let mut out = String::new();
    for frame in frames.iter().take(format.max_frames) {
        out.push_str(&frame.render(format));
        out.push('\n');
    }
    let omitted = frames.len().saturating_sub(format.max_frames);
    if omitted > 0 {
        out.push_str(&format!("note: {omitted} frame(s) omitted.\n"));
    }
    out
}
