// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Single-Flight Refresh Cell
//!
//! A cached value with at most one refresh in flight at any time.
//!
//! ## States
//!
//! - `Empty` - nothing cached; the next caller starts a refresh
//! - `Valid(T)` - cached value; served while the caller's freshness check passes
//! - `Refreshing` - a refresh task is running; callers join it
//!
//! ## Refresh semantics
//!
//! The refresh future runs on its own spawned task and every joined caller
//! waits on a `tokio::sync::watch` channel for the outcome. A caller that
//! stops waiting drops only its receiver; the refresh still completes and
//! updates the cell. Success moves the cell to `Valid`, failure to `Empty`,
//! and all waiters receive the same cloned result.
//!
//! [`SingleFlightCell::discard`] also supersedes an in-flight refresh: its
//! waiters still get its outcome, but the outcome is never stored and the
//! next caller starts a new refresh.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use utoipa::ToSchema;

use crate::flags::RolloutError;
use crate::session::AuthError;

/// A refresh task ended without producing an outcome.
#[derive(Debug, Clone, Copy)]
pub struct RefreshAborted;

impl From<RefreshAborted> for AuthError {
    fn from(_: RefreshAborted) -> Self {
        AuthError::ServerError("refresh task ended without a result".to_string())
    }
}

impl From<RefreshAborted> for RolloutError {
    fn from(_: RefreshAborted) -> Self {
        RolloutError::Unavailable("refresh task ended without a result".to_string())
    }
}

/// Outcome slot shared by all waiters of one refresh.
type Outcome<T, E> = Option<Result<T, E>>;

enum CellState<T, E> {
    Empty,
    Valid(T),
    Refreshing(watch::Receiver<Outcome<T, E>>),
}

struct Inner<T, E> {
    state: CellState<T, E>,
    /// Bumped by `discard`; a refresh only stores its outcome if the
    /// generation it started under is still current.
    generation: u64,
}

/// Observable cell state, without the cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    Empty,
    Valid,
    Refreshing,
}

/// Cached value guarded by a single-flight refresh.
pub struct SingleFlightCell<T, E = AuthError> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Clone for SingleFlightCell<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Default for SingleFlightCell<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + From<RefreshAborted> + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn lock_inner<T, E>(inner: &Mutex<Inner<T, E>>) -> MutexGuard<'_, Inner<T, E>> {
    // State is replaced wholesale, so a poisoned guard still holds a coherent value.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T, E> SingleFlightCell<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + From<RefreshAborted> + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: CellState::Empty,
                generation: 0,
            })),
        }
    }

    /// Return the cached value if `is_fresh` accepts it, otherwise join or
    /// start a refresh and wait for its outcome.
    ///
    /// `refresh` is only invoked when this caller starts a new refresh.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        is_fresh: impl Fn(&T) -> bool,
        refresh: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let mut receiver = {
            let mut inner = lock_inner(&self.inner);
            let joinable = match &inner.state {
                CellState::Valid(value) if is_fresh(value) => return Ok(value.clone()),
                // A closed sender means the refresh task died; start over.
                CellState::Refreshing(rx) if rx.has_changed().is_ok() => Some(rx.clone()),
                _ => None,
            };
            match joinable {
                Some(rx) => rx,
                None => {
                    let (tx, rx) = watch::channel(None);
                    inner.state = CellState::Refreshing(rx.clone());
                    self.spawn_refresh(tx, inner.generation, refresh());
                    rx
                }
            }
        };

        let settled = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| E::from(RefreshAborted))?;
        let outcome = settled.clone();
        drop(settled);
        outcome.unwrap_or_else(|| Err(E::from(RefreshAborted)))
    }

    fn spawn_refresh<Fut>(&self, tx: watch::Sender<Outcome<T, E>>, generation: u64, refresh: Fut)
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = refresh.await;
            {
                let mut inner = lock_inner(&inner);
                if inner.generation == generation {
                    inner.state = match &outcome {
                        Ok(value) => CellState::Valid(value.clone()),
                        Err(_) => CellState::Empty,
                    };
                }
            }
            // No receivers left is fine: the cell already holds the result.
            let _ = tx.send(Some(outcome));
        });
    }

    /// Drop a cached value. No-op while empty or refreshing.
    ///
    /// Returns `true` if a cached value was discarded.
    pub fn invalidate(&self) -> bool {
        self.invalidate_if(|_| true)
    }

    /// Drop the cached value only if `matches` accepts it.
    ///
    /// Returns `true` if a cached value was discarded.
    pub fn invalidate_if(&self, matches: impl FnOnce(&T) -> bool) -> bool {
        let mut inner = lock_inner(&self.inner);
        match &inner.state {
            CellState::Valid(value) if matches(value) => {
                inner.state = CellState::Empty;
                true
            }
            _ => false,
        }
    }

    /// Drop the cached value and supersede any in-flight refresh.
    ///
    /// Callers already waiting on the refresh still receive its outcome;
    /// the next caller starts a new one. Returns `true` if anything was
    /// dropped.
    pub fn discard(&self) -> bool {
        let mut inner = lock_inner(&self.inner);
        let dropped = !matches!(inner.state, CellState::Empty);
        inner.generation = inner.generation.wrapping_add(1);
        inner.state = CellState::Empty;
        dropped
    }

    /// Cached value, regardless of freshness.
    pub fn peek(&self) -> Option<T> {
        match &lock_inner(&self.inner).state {
            CellState::Valid(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn status(&self) -> CellStatus {
        match &lock_inner(&self.inner).state {
            CellState::Empty => CellStatus::Empty,
            CellState::Valid(_) => CellStatus::Valid,
            CellState::Refreshing(_) => CellStatus::Refreshing,
        }
    }
}
