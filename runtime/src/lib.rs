//! # Campus Runtime
//!
//! Runtime implementation for Campus client flows.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling for one flow session (for example one checkout).
//!
//! ## Core Components
//!
//! - **Store**: Owns the session state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to the reducer
//! - **Cancellation**: Every effect runs inside the store's cancellation scope;
//!   [`Store::dispose`] drops in-flight work so late responses never reach state
//!
//! ## Example
//!
//! ```ignore
//! use campus_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//!
//! // Owner goes away: cancel everything still running
//! store.dispose();
//! ```

use campus_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, watch};

/// Retry logic with exponential backoff
pub mod retry;

pub use retry::RetryPolicy;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The store has been disposed and no longer accepts actions
        #[error("Store has been disposed")]
        Disposed,

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects spawned
/// directly by that action. Actions fed back by those effects get their own
/// handles; use [`Store::send_and_wait_for`] to wait for a whole chain.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };
        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (handle, _) = Self::new();
        handle
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete (or be cancelled)
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: std::time::Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: completion counter shared by the effects of one action
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notifier.send_replace(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs on completion, cancellation and panic alike.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, Effect, EffectHandle, EffectTracking, DecrementGuard, Ordering, Reducer, RwLock,
        StoreError, watch,
    };
    use campus_core::{CancellationScope, EffectId};
    use std::collections::HashMap;
    use std::sync::{Mutex, PoisonError};
    use std::time::Duration;
    use tokio::sync::broadcast;

    const ACTION_BROADCAST_CAPACITY: usize = 64;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer is the only writer)
    /// 2. Reducer (flow logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. A cancellation scope covering every effect it spawns
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        scope: CancellationScope,
        in_flight: Arc<Mutex<HashMap<EffectId, CancellationScope>>>,
        /// Actions produced by effects are broadcast to observers.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            let (action_broadcast, _) = broadcast::channel(ACTION_BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                scope: CancellationScope::new(),
                in_flight: Arc::new(Mutex::new(HashMap::new())),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Starts the returned effects asynchronously
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Concurrent `send()` calls serialize at the reducer.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Disposed`] if [`Store::dispose`] has been called.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.scope.is_cancelled() {
                return Err(Self::dropped_after_dispose());
            }

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                // dispose() may have run while this send waited for the lock
                if self.scope.is_cancelled() {
                    return Err(Self::dropped_after_dispose());
                }
                metrics::counter!("store.actions.processed").increment(1);
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, tracking.clone(), &self.scope);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by effects
        ///
        /// Subscribes to the action broadcast before sending, so a fast effect
        /// cannot slip past. Only actions produced by effects are matched,
        /// never the initial action. When this returns, the matching action has
        /// already been applied to state.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before `timeout`
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        /// - [`StoreError::Disposed`]: the store has been disposed
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to every action produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let step = store.state(|s| s.step.index()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Tear down the store
        ///
        /// Cancels every in-flight effect (dropping their futures, which aborts
        /// pending requests) and rejects all further actions, including those
        /// produced by effects that complete after this call. Idempotent.
        pub fn dispose(&self) {
            if self.scope.is_cancelled() {
                return;
            }
            tracing::debug!("Disposing store");
            self.scope.cancel();
            self.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }

        fn dropped_after_dispose() -> StoreError {
            tracing::debug!("Dropping action: store disposed");
            metrics::counter!("store.actions.dropped_after_dispose").increment(1);
            StoreError::Disposed
        }

        /// Whether [`Store::dispose`] has been called
        #[must_use]
        pub fn is_disposed(&self) -> bool {
            self.scope.is_cancelled()
        }

        fn register(&self, id: EffectId, scope: CancellationScope) {
            let previous = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, scope);

            if let Some(previous) = previous {
                tracing::debug!(effect_id = %id, "Replacing in-flight effect");
                previous.cancel();
            }
        }

        fn cancel(&self, id: EffectId) {
            let scope = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);

            if let Some(scope) = scope {
                tracing::debug!(effect_id = %id, "Cancelling effect");
                metrics::counter!("store.effects.cancelled", "id" => id.as_str()).increment(1);
                scope.cancel();
            }
        }

        /// Feed an action produced by an effect back into the store
        ///
        /// The action is broadcast only after the reducer has applied it, so
        /// observers always see state that already reflects it.
        async fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            match self.send(action.clone()).await {
                Ok(_) => {
                    let _ = self.action_broadcast.send(action);
                },
                Err(error) => tracing::debug!(%error, "Effect result discarded"),
            }
        }

        /// Execute an effect inside `scope`
        ///
        /// Futures and delays are spawned and raced against the scope; if the
        /// scope is cancelled first their result is discarded.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into spawned tasks
        fn execute_effect(&self, effect: Effect<A>, tracking: EffectTracking, scope: &CancellationScope)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    let guard = DecrementGuard(tracking);
                    let store = self.clone();
                    let scope = scope.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        match scope.run(fut).await {
                            Some(Some(action)) => store.feed_back(action).await,
                            Some(None) => tracing::trace!("Effect::Future completed with no action"),
                            None => tracing::debug!("Effect::Future cancelled"),
                        }
                    });
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tracking.increment();

                    let guard = DecrementGuard(tracking);
                    let store = self.clone();
                    let scope = scope.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        if scope.run(tokio::time::sleep(duration)).await.is_some() {
                            store.feed_back(*action).await;
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking.clone(), scope);
                    }
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                    tracking.increment();

                    let guard = DecrementGuard(tracking);
                    let store = self.clone();
                    let scope = scope.clone();

                    tokio::spawn(async move {
                        let _guard = guard;
                        let effect_count = effects.len();

                        for (idx, effect) in effects.into_iter().enumerate() {
                            if scope.is_cancelled() {
                                tracing::debug!("Effect::Sequential cancelled at step {}", idx + 1);
                                break;
                            }

                            let (sub_tx, mut sub_rx) = watch::channel(());
                            let sub_tracking = EffectTracking {
                                counter: Arc::new(std::sync::atomic::AtomicUsize::new(0)),
                                notifier: Arc::new(sub_tx),
                            };

                            store.execute_effect(effect, sub_tracking.clone(), &scope);

                            while sub_tracking.counter.load(Ordering::SeqCst) > 0 {
                                if sub_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                            tracing::trace!("Sequential effect {} of {} done", idx + 1, effect_count);
                        }
                    });
                },
                Effect::Cancellable { id, effect } => {
                    let child = scope.child();
                    self.register(id, child.clone());
                    self.execute_effect(*effect, tracking, &child);
                },
                Effect::Cancel(id) => self.cancel(id),
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                scope: self.scope.clone(),
                in_flight: Arc::clone(&self.in_flight),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

pub use store::Store;
