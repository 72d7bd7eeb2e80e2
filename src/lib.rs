#![deny(
    missing_docs,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Structured, inspectable errors for Rust.
//!
//! ## Overview
//!
//! This crate augments the plain [`std::error::Error`] convention with
//! structured error objects: a human message, arbitrary key/value context,
//! a classification taxonomy, and an optional captured call stack. An
//! [`Error`] still implements [`Display`](core::fmt::Display) and
//! [`std::error::Error`], so existing code that only checks "did this fail"
//! keeps working unmodified — while code that needs to route, count, or
//! debug failures can inspect them programmatically.
//!
//! ## Quick Example
//!
//! ```
//! use errkit::prelude::*;
//!
//! fn read_config(path: &str) -> errkit::Result<String> {
//!     let raw = std::fs::read_to_string(path)
//!         .context("failed to read configuration file")?;
//!     Ok(raw)
//! }
//! ```
//!
//! ## Core Concepts
//!
//! An error here is a node in an immutable, singly linked **chain**:
//!
//! - The **root** is created once per independent failure. It is the sole
//!   owner of the base message, the absorbed foreign cause (if any), the
//!   captured stack, the creation timestamp, and the classification triad
//!   ([`Class`] / [`Category`] / [`Severity`]).
//! - A **wrap** adds an incremental message and fields on top of an inner
//!   chain. Wrapping never copies the inner chain and records only a single
//!   return address — the *wrap point* — instead of a whole stack.
//!
//! Because nodes are immutable after construction, any number of threads
//! may read, log, or wrap the same chain concurrently without
//! synchronization.
//!
//! ## Stacks Are Lazy
//!
//! Capturing a stack stores raw return addresses only; symbol resolution
//! and classification into runtime / standard-library / test / internal /
//! user frames happen on demand, in [`Error::stack`] or
//! [`RawStack::resolve`]. Construction stays cheap even with capture
//! enabled, and errors that are handled without being logged never pay for
//! symbolication.
//!
//! ## Aggregation
//!
//! [`ErrorList`] collects failures in order; [`ErrorSet`] deduplicates them
//! by a derived key and counts suppressed duplicates. Both collapse into at
//! most one error via their `error()` method, and both have lock-protected
//! `Sync` variants for concurrent collection.
//!
//! ## What This Crate Does Not Do
//!
//! HTTP status mapping, message templates, JSON serialization, and logging
//! backends are deliberately out of scope. The [`hooks`] module defines the
//! trait boundary those layers plug into.

#[macro_use]
mod macros;

mod builder;
mod classification;
mod error;
mod frame;
mod result_ext;

pub mod collection;
pub mod fields;
pub mod hooks;
pub mod limits;
pub mod prelude;
pub mod stack;

pub use self::{
    builder::Builder,
    classification::{Category, Class, ParseTaxonomyError, Severity},
    collection::{ErrorList, ErrorSet, KeyExtractor, SetEntry, SyncErrorList, SyncErrorSet},
    error::{Error, ErrorIter, MAX_WRAP_DEPTH_EXCEEDED},
    fields::Field,
    frame::{Frame, FrameFormat},
    result_ext::ResultExt,
    stack::{render_stack, RawStack},
};

/// A [`Result`](core::result::Result) type alias where the error defaults
/// to [`Error`].
///
/// # Examples
///
/// ```
/// fn might_fail() -> errkit::Result<String> {
///     Ok("success".to_string())
/// }
/// ```
pub type Result<T, E = Error> = core::result::Result<T, E>;

// Not public API. Referenced by macro-generated code.
#[doc(hidden)]
pub mod __private {
    use core::fmt;

    #[doc(hidden)]
    pub use core::{format_args, result::Result::Err};

    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub fn format_error(args: fmt::Arguments<'_>) -> crate::Error {
        match args.as_str() {
            Some(message) => crate::Error::new(message),
            None => crate::Error::new(std::fmt::format(args)),
        }
    }
}
