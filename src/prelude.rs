//! Convenient imports for typical usage.
//!
//! ```
//! use errkit::prelude::*;
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::new("nope").with_class(Class::Unavailable))
//! }
//! # assert!(might_fail().is_err());
//! ```

pub use crate::{
    classification::{Category, Class, Severity},
    collection::{ErrorList, ErrorSet, SyncErrorList, SyncErrorSet},
    result_ext::ResultExt,
    Builder, Error, Result,
};
