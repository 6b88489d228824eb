//! Cancellation scopes.
//!
//! A [`CancellationScope`] is a cheap, cloneable handle that ties asynchronous
//! work to the lifetime of whatever owns it. The runtime creates one root scope
//! per store and a child scope for every cancellable effect; disposing the store
//! cancels the root, which cancels every child.
//!
//! # Example
//!
//! ```
//! use campus_core::CancellationScope;
//!
//! # async fn example() {
//! let root = CancellationScope::new();
//! let request = root.child();
//!
//! root.cancel();
//! assert!(request.is_cancelled());
//!
//! // Work raced against a cancelled scope never completes.
//! let result = request.run(async { 42 }).await;
//! assert_eq!(result, None);
//! # }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::watch;

#[derive(Debug)]
struct Node {
    flag: watch::Sender<bool>,
    children: Mutex<Vec<Weak<Node>>>,
}

impl Node {
    fn new(cancelled: bool) -> Arc<Self> {
        let (flag, _) = watch::channel(cancelled);
        Arc::new(Self {
            flag,
            children: Mutex::new(Vec::new()),
        })
    }

    fn cancel(&self) {
        self.flag.send_replace(true);

        let children: Vec<Weak<Node>> = self
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

/// Handle to a cancellable scope of asynchronous work.
///
/// Clones share the same flag. A child is cancelled when it is cancelled
/// directly or when any ancestor is; cancelling a child never affects its
/// parent.
#[derive(Clone, Debug)]
pub struct CancellationScope {
    node: Arc<Node>,
}

impl CancellationScope {
    /// Create a new root scope
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: Node::new(false),
        }
    }

    /// Create a child scope, cancelled together with this one
    ///
    /// A child of an already cancelled scope starts out cancelled.
    #[must_use]
    pub fn child(&self) -> Self {
        let mut children = self
            .node
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let node = Node::new(self.is_cancelled());
        children.retain(|child| child.strong_count() > 0);
        children.push(Arc::downgrade(&node));

        Self { node }
    }

    /// Cancel this scope and all of its children
    ///
    /// Idempotent.
    pub fn cancel(&self) {
        self.node.cancel();
    }

    /// Whether this scope has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.node.flag.borrow()
    }

    /// Resolve once this scope is cancelled
    pub async fn cancelled(&self) {
        let mut flag = self.node.flag.subscribe();
        loop {
            if *flag.borrow_and_update() {
                return;
            }
            if flag.changed().await.is_err() {
                return;
            }
        }
    }

    /// Drive `fut` to completion unless the scope is cancelled first
    ///
    /// Returns `None` if cancellation won; `fut` is dropped in that case, which
    /// aborts any I/O it was waiting on.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            () = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

impl Default for CancellationScope {
    fn default() -> Self {
        Self::new()
    }
}
