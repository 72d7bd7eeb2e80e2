//! Resolved stack frames: classification and formatting.
//!
//! A [`Frame`] is one resolved call-stack location. Classification into
//! runtime / standard-library / test / internal / user code is a pure
//! function of the frame's static fields, driven by the read-only tables in
//! this module. Detection is deliberately conservative: a frame that cannot
//! be confidently classified stays user code, because a false positive here
//! hides someone's code from their own stack trace.

use core::panic::Location;
use std::{borrow::Cow, fmt, sync::OnceLock};

/// First path segments that identify the Rust standard library.
static STD_SEGMENTS: &[&str] = &["std", "core", "alloc", "proc_macro", "test"];

/// Symbol prefixes for runtime machinery: thread spawn trampolines, panic
/// plumbing, closure call shims, and the test harness driver.
static RUNTIME_PREFIXES: &[&str] = &[
    "std::rt::",
    "std::panicking::",
    "std::panic::",
    "std::sys::",
    "std::thread::Builder::spawn_unchecked",
    "core::ops::function::FnOnce::call_once",
    "core::ops::function::FnMut::call_mut",
    "core::ops::function::Fn::call",
    "test::run_test",
];

/// Symbols that are runtime machinery when matched exactly.
static RUNTIME_EXACT: &[&str] = &[
    "main",
    "_start",
    "__libc_start_main",
    "__libc_start_call_main",
    "rust_begin_unwind",
    "__rust_try",
];

/// Substrings marking the short-backtrace fences the runtime plants around
/// user code.
static RUNTIME_MARKERS: &[&str] = &["__rust_begin_short_backtrace", "__rust_end_short_backtrace"];

/// Helper symbols of this crate's own capture machinery. These show up at
/// the top of every captured stack and carry no diagnostic value. The
/// `backtrace::` entries cover the walker this crate drives during capture.
static INTERNAL_PREFIXES: &[&str] = &[
    "errkit::",
    "<errkit::",
    "backtrace::",
    "<backtrace::",
];

const fn crate_src_prefix() -> Option<&'static str> {
    let file = Location::caller().file();

    let Some(prefix_len) = file.len().checked_sub("/src/frame.rs".len()) else {
        return None;
    };

    let (prefix, suffix) = file.split_at(prefix_len);
    if std::path::MAIN_SEPARATOR == '/' {
        if !suffix.eq_ignore_ascii_case("/src/frame.rs") {
            return None;
        }
    } else if !suffix.eq_ignore_ascii_case(r#"/src\frame.rs"#) {
        return None;
    }

    Some(prefix)
}

/// Absolute source prefix of this crate, when the build records one.
/// Relative-path builds disable file-based internal detection and rely on
/// symbol names alone.
const CRATE_SRC_PREFIX: Option<&str> = crate_src_prefix();

/// Extracts the crate name from a source file path, when the path shape
/// gives it away (rustc source trees and cargo registry checkouts).
pub(crate) fn crate_of_path(path: &str) -> Option<Cow<'static, str>> {
    static REGEXES: OnceLock<[regex::Regex; 2]> = OnceLock::new();
    let [std_regex, registry_regex] = REGEXES.get_or_init(|| {
        [
            regex::Regex::new(
                r"(?:/lib/rustlib/src/rust|^/rustc/[0-9a-f]{40})/library/(std|core|alloc)/src/.*$",
            )
            .unwrap(),
            regex::Regex::new(
                r"/\.cargo/registry/src/[^/]+-[0-9a-f]{16}/([^./]+)-[0-9]+\.[^/]*/src/.*$",
            )
            .unwrap(),
        ]
    });

    if let Some(captures) = std_regex.captures(path) {
        return Some(Cow::Owned(captures.get(1).unwrap().as_str().to_string()));
    }
    if let Some(captures) = registry_regex.captures(path) {
        return Some(Cow::Owned(captures.get(1).unwrap().as_str().to_string()));
    }
    None
}

/// One resolved, classified stack-trace location.
///
/// All fields are captured at resolution time; the classification predicates
/// are pure functions of them and always return the same answer for the same
/// frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    qualified_name: Box<str>,
    short_name: Box<str>,
    package: Box<str>,
    file: Box<str>,
    file_name: Box<str>,
    line: Option<u32>,
}

impl Frame {
    /// Builds a frame from a demangled symbol name and an optional source
    /// location.
    pub(crate) fn new(qualified_name: String, file: Option<String>, line: Option<u32>) -> Self {
        let short_name = qualified_name
            .rsplit_once("::")
            .map_or(qualified_name.as_str(), |(_, short)| short)
            .to_string();
        let package = qualified_name
            .rsplit_once("::")
            .map_or("", |(package, _)| package)
            .to_string();
        let file = file.unwrap_or_default();
        let file_name = file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .to_string();

        Frame {
            qualified_name: qualified_name.into_boxed_str(),
            short_name: short_name.into_boxed_str(),
            package: package.into_boxed_str(),
            file: file.into_boxed_str(),
            file_name: file_name.into_boxed_str(),
            line,
        }
    }

    /// The fully-qualified, demangled function name.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// The final path segment of the function name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The module path portion of the function name, empty when the symbol
    /// has no `::` separators.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The source file path, empty when debug info carried none.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The final component of the source file path.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The line number, when debug info carried one.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// The first path segment of the qualified name, with any leading
    /// trait-impl bracket stripped.
    fn first_segment(&self) -> &str {
        let name = self.qualified_name.trim_start_matches('<');
        name.split("::").next().unwrap_or(name)
    }

    /// Runtime machinery: thread trampolines, panic plumbing, closure call
    /// shims, process entry points.
    pub fn is_runtime(&self) -> bool {
        let name = &*self.qualified_name;
        if RUNTIME_EXACT.contains(&name) {
            return true;
        }
        if RUNTIME_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            return true;
        }
        RUNTIME_MARKERS.iter().any(|marker| name.contains(marker))
    }

    /// Standard-library code that is not runtime machinery.
    ///
    /// Matching is conservative: the first path segment must appear in an
    /// explicit list, or the file path must sit inside a rustc source tree.
    pub fn is_std(&self) -> bool {
        if self.is_runtime() {
            return false;
        }
        if STD_SEGMENTS.contains(&self.first_segment()) {
            return true;
        }
        matches!(
            crate_of_path(&self.file).as_deref(),
            Some("std" | "core" | "alloc")
        )
    }

    /// Test code: `tests` modules, integration test files, and `_test.rs` /
    /// `_tests.rs` sources.
    pub fn is_test(&self) -> bool {
        if self.is_runtime() || self.is_std() {
            return false;
        }
        if self.qualified_name.contains("::tests::") {
            return true;
        }
        let file = &*self.file;
        file.starts_with("tests/")
            || file.contains("/tests/")
            || file.contains("\\tests\\")
            || file.ends_with("_test.rs")
            || file.ends_with("_tests.rs")
    }

    /// This crate's own capture helpers. Suppressed for test frames so that
    /// this crate's tests remain visible in their own stack traces.
    pub fn is_internal(&self) -> bool {
        if self.is_runtime() || self.is_std() || self.is_test() {
            return false;
        }
        let name = &*self.qualified_name;
        if INTERNAL_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            return true;
        }
        if let Some(prefix) = CRATE_SRC_PREFIX
            && !self.file.is_empty()
            && self.file.starts_with(prefix)
        {
            return true;
        }
        false
    }

    /// User code: everything the other predicates do not claim.
    pub fn is_user(&self) -> bool {
        !self.is_runtime() && !self.is_std() && !self.is_test() && !self.is_internal()
    }

    /// Renders this frame according to `format`. The output never includes
    /// data the format suppresses, so a strict format can be handed an
    /// untrusted sink.
    pub fn render(&self, format: &FrameFormat) -> String {
        let mut out = String::new();

        if format.show_file && !self.file.is_empty() {
            if format.path_depth == 0 {
                out.push_str(&format.redaction);
            } else {
                let components: Vec<&str> = self.file.split(['/', '\\']).collect();
                if components.len() > format.path_depth {
                    out.push_str("[..]/");
                    out.push_str(&components[components.len() - format.path_depth..].join("/"));
                } else {
                    out.push_str(&self.file);
                }
            }
            if format.show_line && let Some(line) = self.line {
                out.push_str(&format!(":{line}"));
            }
        }

        if format.show_function {
            if !out.is_empty() {
                out.push_str(" - ");
            }
            if format.qualify_function {
                out.push_str(&self.qualified_name);
            } else {
                out.push_str(&self.short_name);
            }
        }

        out
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&FrameFormat::default()))
    }
}

/// Controls how frames and stacks are rendered.
///
/// Formatting is entirely separate from capture: the same resolved stack can
/// be rendered under different postures without re-walking anything.
///
/// # Examples
///
/// ```
/// use errkit::FrameFormat;
///
/// let strict = FrameFormat::strict();
/// assert!(!strict.show_line);
/// assert!(strict.max_frames < FrameFormat::development().max_frames);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFormat {
    /// Render the function name.
    pub show_function: bool,
    /// Render the fully-qualified name instead of the short name.
    pub qualify_function: bool,
    /// Render the source file path.
    pub show_file: bool,
    /// Number of trailing path components to keep. `0` replaces the whole
    /// path with [`redaction`](Self::redaction).
    pub path_depth: usize,
    /// Render the line number.
    pub show_line: bool,
    /// Maximum number of frames rendered per stack.
    pub max_frames: usize,
    /// Placeholder substituted for redacted paths.
    pub redaction: Cow<'static, str>,
}

impl FrameFormat {
    /// Everything visible, full paths, full depth.
    pub fn development() -> Self {
        FrameFormat {
            show_function: true,
            qualify_function: true,
            show_file: true,
            path_depth: usize::MAX,
            show_line: true,
            max_frames: crate::limits::MAX_STACK_DEPTH,
            redaction: Cow::Borrowed("[redacted]"),
        }
    }

    /// Short function names, file name only, capped depth.
    pub fn production() -> Self {
        FrameFormat {
            show_function: true,
            qualify_function: false,
            show_file: true,
            path_depth: 1,
            show_line: true,
            max_frames: 16,
            redaction: Cow::Borrowed("[redacted]"),
        }
    }

    /// Function short names only; paths and lines are redacted.
    pub fn strict() -> Self {
        FrameFormat {
            show_function: true,
            qualify_function: false,
            show_file: true,
            path_depth: 0,
            show_line: false,
            max_frames: 8,
            redaction: Cow::Borrowed("[redacted]"),
        }
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        FrameFormat::development()
    }
}
