//! Generic pooling
//!
//! Value pools recycle instances of any type behind a factory:
//!
//! - [`ObjectPool`] creates synchronously
//! - [`AsyncObjectPool`] creates through a suspending, cancellable factory
//!
//! Both share the same free list discipline (LIFO), the same injected
//! [`PoolHooks`] and the same [`PoolCallbackReceiver`] dispatch. Callers that
//! only need rent/return can stay generic over [`Pool`] or [`AsyncPool`].

pub mod async_pool;
pub mod builder;
pub mod callbacks;
pub mod error;
pub mod free_list;
pub mod hooks;
pub mod object_pool;
mod recycler;

pub use async_pool::AsyncObjectPool;
pub use builder::{AsyncFactory, PoolBuilder, SyncFactory};
pub use callbacks::{CallbackDispatcher, PoolCallbackReceiver, PoolEvent};
pub use error::{PoolError, PoolResult};
pub use free_list::FreeList;
pub use hooks::PoolHooks;
pub use object_pool::ObjectPool;

use futures::future::LocalBoxFuture;
use tokio_util::sync::CancellationToken;

/// Common rent/return interface of synchronous pools
pub trait Pool<T> {
    /// Rent an instance, reused or newly created
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] once the pool is disposed.
    fn rent(&mut self) -> PoolResult<T>;

    /// Hand an instance back for reuse
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] once the pool is disposed.
    fn release(&mut self, instance: T) -> PoolResult<()>;

    /// Number of idle instances
    fn count(&self) -> usize;

    /// Whether the pool has been disposed
    fn is_disposed(&self) -> bool;

    /// Destroy idle instances and refuse further use
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] when already disposed.
    fn dispose(&mut self) -> PoolResult<()>;
}

/// Common rent/return interface of suspending pools
pub trait AsyncPool<T> {
    /// Rent an instance, suspending only when one has to be created
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] once the pool is disposed,
    /// [`PoolError::Cancelled`] when `cancel` fires before creation completes.
    fn rent<'a>(&'a mut self, cancel: &'a CancellationToken) -> LocalBoxFuture<'a, PoolResult<T>>;

    /// Hand an instance back for reuse
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] once the pool is disposed.
    fn release(&mut self, instance: T) -> PoolResult<()>;

    /// Number of idle instances
    fn count(&self) -> usize;

    /// Whether the pool has been disposed
    fn is_disposed(&self) -> bool;

    /// Destroy idle instances and refuse further use
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] when already disposed.
    fn dispose(&mut self) -> PoolResult<()>;
}
