//! Synchronous object pool
//!
//! Recycles values of any type behind a caller-supplied factory.
//!
//! # Lifecycle
//!
//! ```text
//! rent()  ── free list hit ──> on_rent hook ─> rent dispatch ─> caller
//!    └──── free list miss ──> factory() ───────────────────────> caller
//! release(v) ─> on_return hook ─> return dispatch ─> push
//! prewarm(n) ─> n × factory() ─> return dispatch ─> push
//! clear()    ─> pop all ─> on_destroy hook ─> drop
//! dispose()  ─> clear() ─> disposed
//! ```

use super::builder::{PoolBuilder, SyncFactory};
use super::callbacks::PoolCallbackReceiver;
use super::error::PoolResult;
use super::free_list::FreeList;
use super::hooks::PoolHooks;
use super::recycler::Recycler;
use super::Pool;
use crate::config::DEFAULT_INITIAL_CAPACITY;
use std::fmt;

pub(crate) const KIND: &str = "ObjectPool";

/// Pool of reusable values created on demand by a factory
///
/// Freshly created instances are handed out untouched; hooks and receiver
/// callbacks only run on instances coming back out of the free list. Every
/// pooled type is a [`PoolCallbackReceiver`], so callbacks always reach it.
pub struct ObjectPool<T> {
    factory: SyncFactory<T>,
    recycler: Recycler<T>,
}

impl<T: PoolCallbackReceiver + 'static> ObjectPool<T> {
    /// Create a pool with no hooks
    pub fn new(factory: impl FnMut() -> T + 'static) -> Self {
        let free = FreeList::with_capacity(KIND, DEFAULT_INITIAL_CAPACITY);
        Self::from_parts(Box::new(factory), Recycler::new(free, PoolHooks::new()))
    }

    /// Start building a pool with hooks or settings
    pub fn builder() -> PoolBuilder<T, SyncFactory<T>> {
        PoolBuilder::new()
    }
}

impl<T> ObjectPool<T> {
    pub(crate) fn from_parts(factory: SyncFactory<T>, recycler: Recycler<T>) -> Self {
        Self { factory, recycler }
    }

    /// Number of idle instances
    pub fn count(&self) -> usize {
        self.recycler.count()
    }

    /// Whether [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.recycler.is_disposed()
    }
}

impl<T: PoolCallbackReceiver> ObjectPool<T> {
    /// Rent an instance, reusing the most recently returned one if possible
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`](super::PoolError::Disposed) after [`dispose`](Self::dispose).
    pub fn rent(&mut self) -> PoolResult<T> {
        if let Some(instance) = self.recycler.take()? {
            return Ok(instance);
        }
        log::trace!("{} miss, creating a new instance", KIND);
        Ok((self.factory)())
    }

    /// Return an instance so the next [`rent`](Self::rent) hands it out again
    ///
    /// The pool does not check where the instance came from, nor whether it
    /// is already idle.
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`](super::PoolError::Disposed) after [`dispose`](Self::dispose).
    pub fn release(&mut self, instance: T) -> PoolResult<()> {
        self.recycler.give_back(instance)
    }

    /// Drop every idle instance; the pool stays usable
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`](super::PoolError::Disposed) after [`dispose`](Self::dispose).
    pub fn clear(&mut self) -> PoolResult<()> {
        self.recycler.clear().map(|_| ())
    }

    /// Create `count` instances straight into the free list
    ///
    /// Each instance receives the return dispatch; the `on_return` hook is
    /// not run.
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`](super::PoolError::Disposed) after [`dispose`](Self::dispose).
    pub fn prewarm(&mut self, count: usize) -> PoolResult<()> {
        self.recycler.ensure_live()?;
        for _ in 0..count {
            let instance = (self.factory)();
            self.recycler.stash_prewarmed(instance);
        }
        log::debug!("{} prewarmed {} instances", KIND, count);
        Ok(())
    }

    /// Clear the pool and refuse every further mutation
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`](super::PoolError::Disposed) when already disposed.
    pub fn dispose(&mut self) -> PoolResult<()> {
        self.recycler.dispose()
    }
}

impl<T: PoolCallbackReceiver> Pool<T> for ObjectPool<T> {
    fn rent(&mut self) -> PoolResult<T> {
        ObjectPool::rent(self)
    }

    fn release(&mut self, instance: T) -> PoolResult<()> {
        ObjectPool::release(self, instance)
    }

    fn count(&self) -> usize {
        ObjectPool::count(self)
    }

    fn is_disposed(&self) -> bool {
        ObjectPool::is_disposed(self)
    }

    fn dispose(&mut self) -> PoolResult<()> {
        ObjectPool::dispose(self)
    }
}

impl<T> fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(KIND)
            .field("count", &self.count())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
