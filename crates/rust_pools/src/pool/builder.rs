//! Construction of the value pools
//!
//! One builder serves both [`ObjectPool`] and [`AsyncObjectPool`]; the factory
//! type parameter decides which pool `build` produces.

use super::async_pool::{self, AsyncObjectPool};
use super::callbacks::PoolCallbackReceiver;
use super::error::{PoolError, PoolResult};
use super::free_list::FreeList;
use super::hooks::PoolHooks;
use super::object_pool::{self, ObjectPool};
use super::recycler::Recycler;
use crate::config::PoolSettings;
use futures::future::{FutureExt, LocalBoxFuture};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Factory of a synchronous pool
pub type SyncFactory<T> = Box<dyn FnMut() -> T>;

/// Factory of a suspending pool
///
/// Receives the cancellation token of the rent or prewarm that triggered it.
pub type AsyncFactory<T> = Box<dyn FnMut(CancellationToken) -> LocalBoxFuture<'static, PoolResult<T>>>;

/// Builder for pools with a factory and optional hooks
///
/// ```text
/// ObjectPool::builder()
///     .factory(|| Bullet::default())
///     .on_rent(|b| b.reset())
///     .build()?
/// ```
pub struct PoolBuilder<T, F> {
    factory: Option<F>,
    hooks: PoolHooks<T>,
    settings: PoolSettings,
}

impl<T, F> PoolBuilder<T, F> {
    pub(crate) fn new() -> Self {
        Self {
            factory: None,
            hooks: PoolHooks::new(),
            settings: PoolSettings::default(),
        }
    }

    /// Run `hook` on every instance reused from the free list
    #[must_use]
    pub fn on_rent(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.hooks = self.hooks.with_on_rent(hook);
        self
    }

    /// Run `hook` on every instance released back to the pool
    #[must_use]
    pub fn on_return(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.hooks = self.hooks.with_on_return(hook);
        self
    }

    /// Run `hook` on every instance dropped by `clear` or `dispose`
    #[must_use]
    pub fn on_destroy(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.hooks = self.hooks.with_on_destroy(hook);
        self
    }

    /// Replace all hooks at once
    #[must_use]
    pub fn hooks(mut self, hooks: PoolHooks<T>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Apply pool tuning
    #[must_use]
    pub fn settings(mut self, settings: &PoolSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    fn into_parts(self, owner: &'static str) -> PoolResult<(F, Recycler<T>)> {
        let factory = self.factory.ok_or(PoolError::NullArgument { name: "factory" })?;
        let free = FreeList::with_capacity(owner, self.settings.initial_capacity);
        Ok((factory, Recycler::new(free, self.hooks)))
    }
}

impl<T: PoolCallbackReceiver + 'static> PoolBuilder<T, SyncFactory<T>> {
    /// Set the function that creates instances on a miss
    #[must_use]
    pub fn factory(mut self, factory: impl FnMut() -> T + 'static) -> Self {
        let factory: SyncFactory<T> = Box::new(factory);
        self.factory = Some(factory);
        self
    }

    /// Build the pool
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when no factory was set.
    pub fn build(self) -> PoolResult<ObjectPool<T>> {
        let (factory, recycler) = self.into_parts(object_pool::KIND)?;
        Ok(ObjectPool::from_parts(factory, recycler))
    }
}

impl<T: PoolCallbackReceiver + 'static> PoolBuilder<T, AsyncFactory<T>> {
    /// Set the suspending function that creates instances on a miss
    #[must_use]
    pub fn factory<C, Fut>(mut self, mut factory: C) -> Self
    where
        C: FnMut(CancellationToken) -> Fut + 'static,
        Fut: Future<Output = PoolResult<T>> + 'static,
    {
        let factory: AsyncFactory<T> = Box::new(move |token: CancellationToken| factory(token).boxed_local());
        self.factory = Some(factory);
        self
    }

    /// Build the pool
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when no factory was set.
    pub fn build(self) -> PoolResult<AsyncObjectPool<T>> {
        let (factory, recycler) = self.into_parts(async_pool::KIND)?;
        Ok(AsyncObjectPool::from_parts(factory, recycler))
    }
}
