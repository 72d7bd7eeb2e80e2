//! The immutable error-chain model.
//!
//! An [`Error`] is a pointer-sized handle to one node of a chain. Nodes come
//! in exactly two kinds — a root, created once per independent failure, and
//! wraps layered on top of it — and are immutable after construction. Any
//! number of threads may read, log, or wrap a node concurrently without
//! synchronization, because wrapping never touches the inner chain's data.

pub(crate) mod iter;
pub(crate) mod root;
pub(crate) mod wrap;

pub use self::{iter::ErrorIter, wrap::MAX_WRAP_DEPTH_EXCEEDED};

use core::fmt;
use std::time::SystemTime;

use triomphe::Arc;

use crate::{
    classification::{Category, Class, Severity},
    fields::Field,
    frame::{Frame, FrameFormat},
    stack::{self, RawStack},
};

use self::{root::RootNode, wrap::WrapNode};

/// A structured, inspectable error.
///
/// `Error` satisfies the plain [`std::error::Error`] contract, so code that
/// only checks "did this fail" keeps working unmodified, while the accessors
/// on this type expose the message, key/value fields, classification triad,
/// and captured call stack underneath.
///
/// Cloning is cheap (one atomic increment) and the clone observes the exact
/// same immutable chain.
///
/// # Examples
///
/// ```
/// use errkit::{Class, Error};
///
/// let err = Error::new("connection refused")
///     .with_class(Class::Unavailable)
///     .with_retryable(true)
///     .wrap("fetching user profile");
///
/// assert_eq!(err.to_string(), "fetching user profile: connection refused");
/// assert_eq!(err.class(), Class::Unavailable);
/// assert!(err.retryable());
/// ```
#[derive(Clone)]
pub struct Error {
    node: Arc<ErrorNode>,
}

/// The two node kinds of a chain. Closed by design: code matching on a chain
/// never has to reckon with an open set of node types.
pub(crate) enum ErrorNode {
    Root(RootNode),
    Wrap(WrapNode),
}

impl Error {
    pub(crate) fn from_node(node: ErrorNode) -> Error {
        Error {
            node: Arc::new(node),
        }
    }

    pub(crate) fn node(&self) -> &ErrorNode {
        &self.node
    }

    /// This node's own message. For the chain's assembled text, use the
    /// [`Display`](fmt::Display) impl.
    pub fn message(&self) -> &str {
        match self.node() {
            ErrorNode::Root(root) => &root.body.message,
            ErrorNode::Wrap(wrap) => &wrap.message,
        }
    }

    /// The chain's root error.
    pub fn root(&self) -> &Error {
        let mut cur = self;
        while let ErrorNode::Wrap(wrap) = cur.node() {
            cur = &wrap.inner;
        }
        cur
    }

    fn root_node(&self) -> &RootNode {
        match self.root().node() {
            ErrorNode::Root(root) => root,
            ErrorNode::Wrap(_) => unreachable!("root() terminates at a root node"),
        }
    }

    /// Number of wrap records between this node and the root.
    pub fn depth(&self) -> usize {
        match self.node() {
            ErrorNode::Root(_) => 0,
            ErrorNode::Wrap(wrap) => wrap.depth as usize,
        }
    }

    /// The root's failure class.
    pub fn class(&self) -> Class {
        self.root_node().meta.class
    }

    /// The root's subsystem category.
    pub fn category(&self) -> &Category {
        &self.root_node().meta.category
    }

    /// The root's severity.
    pub fn severity(&self) -> Severity {
        self.root_node().meta.severity
    }

    /// The root's identifier, if one was assigned.
    pub fn id(&self) -> Option<&str> {
        self.root_node().meta.id.as_deref()
    }

    /// Whether the root was marked retryable.
    pub fn retryable(&self) -> bool {
        self.root_node().meta.retryable
    }

    /// When the root was created.
    pub fn created_at(&self) -> SystemTime {
        self.root_node().body.created_at
    }

    /// The foreign error absorbed by the root, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.root_node()
            .body
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn std::error::Error + 'static))
    }

    /// All fields on the chain, wrap fields outermost-to-innermost followed
    /// by the root's fields.
    pub fn fields(&self) -> Vec<&Field> {
        let mut out = Vec::new();
        for err in self.iter() {
            match err.node() {
                ErrorNode::Wrap(wrap) => out.extend(wrap.fields.iter()),
                ErrorNode::Root(root) => out.extend(root.body.fields.iter()),
            }
        }
        out
    }

    /// Whether the chain's root captured a stack.
    pub fn has_stack(&self) -> bool {
        self.root_node().body.stack.is_some()
    }

    /// The root's raw captured stack, if any.
    pub fn raw_stack(&self) -> Option<&RawStack> {
        self.root_node().body.stack.as_ref()
    }

    /// The frame format staged on the root, if any.
    pub fn frame_format(&self) -> Option<&FrameFormat> {
        self.root_node().body.format.as_ref()
    }

    /// Resolves the chain's full stack.
    ///
    /// On a wrap this is the wrap's own resolved wrap-point frame followed
    /// by the inner chain's stack, recursively: the outermost entry is the
    /// most recent wrap site and the innermost entries come from the root's
    /// original capture. Resolution is pure; calling this twice yields the
    /// same frames.
    pub fn stack(&self) -> Vec<Frame> {
        match self.node() {
            ErrorNode::Wrap(wrap) => {
                let mut frames = Vec::new();
                if let Some(frame) = stack::resolve_wrap_point(wrap.wrap_point) {
                    frames.push(frame);
                }
                frames.extend(wrap.inner.stack());
                frames
            }
            ErrorNode::Root(root) => root
                .body
                .stack
                .as_ref()
                .map(RawStack::resolve)
                .unwrap_or_default(),
        }
    }

    /// The first user-code frame of the root's stack, falling back to the
    /// first frame overall.
    pub fn top_user_frame(&self) -> Option<Frame> {
        self.raw_stack().and_then(RawStack::top_user_frame)
    }

    /// This wrap's resolved wrap-point frame.
    ///
    /// [`None`] on roots, and on wraps whose recorded return address did not
    /// resolve outside the capture machinery.
    pub fn wrap_point(&self) -> Option<Frame> {
        match self.node() {
            ErrorNode::Wrap(wrap) => stack::resolve_wrap_point(wrap.wrap_point),
            ErrorNode::Root(_) => None,
        }
    }

    /// Renders the chain's stack using the root's staged format, or the
    /// default format when none was staged.
    pub fn render_stack(&self) -> String {
        let format = self.frame_format().cloned().unwrap_or_default();
        stack::render_stack(&self.stack(), &format)
    }

    /// Iterates the chain's nodes, outermost to innermost.
    pub fn iter(&self) -> ErrorIter<'_> {
        ErrorIter::new(self)
    }

    /// Whether this chain matches `target`.
    ///
    /// Checked in order, first match wins, against every node of this
    /// chain: pointer identity, identifier equality (both non-empty),
    /// assembled-message equality, and finally the absorbed foreign cause's
    /// `source()` chain compared by message.
    ///
    /// # Examples
    ///
    /// ```
    /// use errkit::Error;
    ///
    /// let root = Error::new("root error");
    /// let wrapped = root.wrap("context");
    /// assert!(wrapped.is(&root));
    /// assert!(!root.is(&wrapped));
    /// ```
    pub fn is(&self, target: &Error) -> bool {
        let target_text = target.to_string();
        for err in self.iter() {
            if Arc::ptr_eq(&err.node, &target.node) {
                return true;
            }
            if let (Some(a), Some(b)) = (err.id(), target.id())
                && !a.is_empty()
                && !b.is_empty()
                && a == b
            {
                return true;
            }
            if err.to_string() == target_text {
                return true;
            }
            if let ErrorNode::Root(root) = err.node()
                && let Some(cause) = &root.body.cause
            {
                let mut source: Option<&(dyn std::error::Error + 'static)> =
                    Some(&**cause as &(dyn std::error::Error + 'static));
                while let Some(cur) = source {
                    if cur.to_string() == target_text {
                        return true;
                    }
                    source = cur.source();
                }
            }
        }
        false
    }
}

fn write_level(f: &mut fmt::Formatter<'_>, message: &str, fields: &[Field]) -> fmt::Result {
    let mut wrote = !message.is_empty();
    if wrote {
        f.write_str(message)?;
    }
    for field in fields {
        if wrote {
            write!(f, " {field}")?;
        } else {
            write!(f, "{field}")?;
            wrote = true;
        }
    }
    Ok(())
}

impl fmt::Display for Error {
    /// Assembles the chain's text, outermost to innermost: each level's
    /// message with its `key=value` tokens, levels joined by `": "`,
    /// terminating in the root message and absorbed cause text. Output is
    /// identical across repeated calls on the same chain.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        for err in self.iter() {
            match err.node() {
                ErrorNode::Wrap(wrap) => {
                    if wrap.message.is_empty() && wrap.fields.is_empty() {
                        continue;
                    }
                    if wrote {
                        f.write_str(": ")?;
                    }
                    write_level(f, &wrap.message, &wrap.fields)?;
                    wrote = true;
                }
                ErrorNode::Root(root) => {
                    if !root.body.message.is_empty() || !root.body.fields.is_empty() {
                        if wrote {
                            f.write_str(": ")?;
                        }
                        write_level(f, &root.body.message, &root.body.fields)?;
                        wrote = true;
                    }
                    if let Some(cause) = &root.body.cause {
                        if wrote {
                            f.write_str(": ")?;
                        }
                        write!(f, "{cause}")?;
                        wrote = true;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")?;
        let root = self.root_node();
        write!(
            f,
            "\n  class={} category={} severity={} retryable={}",
            root.meta.class, root.meta.category, root.meta.severity, root.meta.retryable
        )?;
        if let Some(id) = &root.meta.id {
            write!(f, " id={id}")?;
        }
        if self.has_stack() {
            write!(f, "\nstack:\n{}", self.render_stack())?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.node() {
            ErrorNode::Wrap(wrap) => Some(&wrap.inner),
            ErrorNode::Root(root) => root
                .body
                .cause
                .as_ref()
                .map(|cause| &**cause as &(dyn std::error::Error + 'static)),
        }
    }
}
