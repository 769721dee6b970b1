//! Cancellation contexts for template execution.
//!
//! A [`CancelContext`] is a cheap, clonable handle that rendering consults
//! before every write. It ends in one of two ways:
//!
//! - explicitly, through the [`Canceler`] returned alongside it
//! - implicitly, once its deadline has passed
//!
//! Contexts form a tree: a child observes its parent's cancellation and
//! deadline, while canceling a child never affects the parent.
//!
//! ```rust
//! use std::time::Duration;
//! use templator::cancel::{CancelContext, ContextError};
//!
//! let (ctx, canceler) = CancelContext::background().with_cancel();
//! assert_eq!(ctx.err(), None);
//!
//! canceler.cancel();
//! assert_eq!(ctx.err(), Some(ContextError::Canceled));
//!
//! let (ctx, _canceler) = CancelContext::background().with_timeout(Duration::ZERO);
//! assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellation signal with an optional deadline.
///
/// Clones share state: canceling through a [`Canceler`] is visible to every
/// clone of the context it was created with, and to all of its children.
#[derive(Debug, Clone)]
pub struct CancelContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelContext {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    fn child(&self, deadline: Option<Instant>) -> (Self, Canceler) {
        let deadline = match (self.deadline, deadline) {
            (Some(parent), Some(own)) => Some(parent.min(own)),
            (parent, own) => parent.or(own),
        };
        let token = self.token.child_token();
        let canceler = Canceler {
            token: token.clone(),
        };
        (Self { token, deadline }, canceler)
    }

    /// Derive a child context that can be canceled explicitly.
    pub fn with_cancel(&self) -> (Self, Canceler) {
        self.child(None)
    }

    /// Derive a child context that ends at `deadline`.
    ///
    /// A parent deadline that is earlier still applies.
    pub fn with_deadline(&self, deadline: Instant) -> (Self, Canceler) {
        self.child(Some(deadline))
    }

    /// Derive a child context that ends `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> (Self, Canceler) {
        let deadline = Instant::now().checked_add(timeout);
        self.child(deadline)
    }

    /// Why the context is done, or `None` while it is still live.
    ///
    /// Explicit cancellation is reported before an expired deadline.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Canceled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(ContextError::DeadlineExceeded);
        }
        None
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// The earliest deadline in effect for this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Default for CancelContext {
    fn default() -> Self {
        Self::background()
    }
}

/// Cancels the context it was created with.
#[derive(Debug, Clone)]
pub struct Canceler {
    token: CancellationToken,
}

impl Canceler {
    /// Cancel the context and its children. Calling this more than once has
    /// no further effect.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Writer that refuses to write once its context is done.
///
/// The check happens before delegating, so a sink that fails after the
/// context ended never gets the chance to mask the cancellation.
pub(crate) struct ContextWriter<'a, W> {
    ctx: &'a CancelContext,
    inner: W,
}

impl<'a, W: Write> ContextWriter<'a, W> {
    pub(crate) fn new(ctx: &'a CancelContext, inner: W) -> Self {
        Self { ctx, inner }
    }
}

impl<W: Write> Write for ContextWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(err) = self.ctx.err() {
            return Err(io::Error::other(err));
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.ctx.err() {
            return Err(io::Error::other(err));
        }
        self.inner.flush()
    }
}
