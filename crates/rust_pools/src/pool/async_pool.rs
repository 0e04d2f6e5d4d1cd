//! Suspending object pool
//!
//! Same contract as [`ObjectPool`](super::ObjectPool), except that creating an
//! instance on a miss may suspend. Creation races the caller's
//! [`CancellationToken`]; a cancelled creation is dropped before it reaches the
//! caller or the free list. Release, clear and dispose never suspend.

use super::builder::{AsyncFactory, PoolBuilder};
use super::callbacks::PoolCallbackReceiver;
use super::error::{PoolError, PoolResult};
use super::free_list::FreeList;
use super::hooks::PoolHooks;
use super::recycler::Recycler;
use super::AsyncPool;
use crate::config::DEFAULT_INITIAL_CAPACITY;
use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

pub(crate) const KIND: &str = "AsyncObjectPool";

/// Await `creation` unless `cancel` fires first
///
/// The token is polled before the creation on every wakeup. Callers pass a
/// lazy future (an `async` block that calls the factory), so an already
/// cancelled token never lets a creation start.
pub(crate) async fn create_cancellable<T>(
    cancel: &CancellationToken,
    creation: impl Future<Output = PoolResult<T>>,
) -> PoolResult<T> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(PoolError::Cancelled),
        result = creation => result,
    }
}

/// Pool whose factory is asynchronous
pub struct AsyncObjectPool<T> {
    factory: AsyncFactory<T>,
    recycler: Recycler<T>,
}

impl<T: PoolCallbackReceiver + 'static> AsyncObjectPool<T> {
    /// Create a pool with no hooks
    pub fn new<C, Fut>(mut factory: C) -> Self
    where
        C: FnMut(CancellationToken) -> Fut + 'static,
        Fut: Future<Output = PoolResult<T>> + 'static,
    {
        let factory: AsyncFactory<T> = Box::new(move |token: CancellationToken| factory(token).boxed_local());
        let free = FreeList::with_capacity(KIND, DEFAULT_INITIAL_CAPACITY);
        Self::from_parts(factory, Recycler::new(free, PoolHooks::new()))
    }

    /// Start building a pool with hooks or settings
    pub fn builder() -> PoolBuilder<T, AsyncFactory<T>> {
        PoolBuilder::new()
    }
}

impl<T> AsyncObjectPool<T> {
    pub(crate) fn from_parts(factory: AsyncFactory<T>, recycler: Recycler<T>) -> Self {
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

impl<T: PoolCallbackReceiver> AsyncObjectPool<T> {
    /// Rent an instance, suspending only when one has to be created
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose),
    /// [`PoolError::Cancelled`] when `cancel` fires before creation completes,
    /// or whatever error the factory reports.
    pub async fn rent(&mut self, cancel: &CancellationToken) -> PoolResult<T> {
        if let Some(instance) = self.recycler.take()? {
            return Ok(instance);
        }
        self.create(cancel).await
    }

    /// Return an instance so the next [`rent`](Self::rent) hands it out again
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose).
    pub fn release(&mut self, instance: T) -> PoolResult<()> {
        self.recycler.give_back(instance)
    }

    /// Drop every idle instance; the pool stays usable
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose).
    pub fn clear(&mut self) -> PoolResult<()> {
        self.recycler.clear().map(|_| ())
    }

    /// Create `count` instances into the free list, one after another
    ///
    /// Each creation completes and is stored before the next one starts.
    /// Instances stored before a cancellation stay in the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose),
    /// [`PoolError::Cancelled`] or a factory error, which stop the loop.
    pub async fn prewarm(&mut self, count: usize, cancel: &CancellationToken) -> PoolResult<()> {
        self.recycler.ensure_live()?;
        for _ in 0..count {
            let instance = self.create(cancel).await?;
            self.recycler.stash_prewarmed(instance);
        }
        log::debug!("{} prewarmed {} instances", KIND, count);
        Ok(())
    }

    /// Clear the pool and refuse every further mutation
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] when already disposed.
    pub fn dispose(&mut self) -> PoolResult<()> {
        self.recycler.dispose()
    }

    async fn create(&mut self, cancel: &CancellationToken) -> PoolResult<T> {
        let factory = &mut self.factory;
        create_cancellable(cancel, async move {
            log::trace!("{} miss, awaiting a new instance", KIND);
            factory(cancel.clone()).await
        })
        .await
    }
}

impl<T: PoolCallbackReceiver> AsyncPool<T> for AsyncObjectPool<T> {
    fn rent<'a>(&'a mut self, cancel: &'a CancellationToken) -> LocalBoxFuture<'a, PoolResult<T>> {
        AsyncObjectPool::rent(self, cancel).boxed_local()
    }

    fn release(&mut self, instance: T) -> PoolResult<()> {
        AsyncObjectPool::release(self, instance)
    }

    fn count(&self) -> usize {
        AsyncObjectPool::count(self)
    }

    fn is_disposed(&self) -> bool {
        AsyncObjectPool::is_disposed(self)
    }

    fn dispose(&mut self) -> PoolResult<()> {
        AsyncObjectPool::dispose(self)
    }
}

impl<T> fmt::Debug for AsyncObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(KIND)
            .field("count", &self.count())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolCallbackReceiver;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Shell {
        id: u32,
        rents: u32,
        returns: u32,
    }

    impl PoolCallbackReceiver for Shell {
        fn on_rent(&mut self) {
            self.rents += 1;
        }

        fn on_return(&mut self) {
            self.returns += 1;
        }
    }

    /// Factory that yields once before producing a numbered shell
    fn loader(created: &Rc<Cell<u32>>) -> impl FnMut(CancellationToken) -> futures::future::LocalBoxFuture<'static, PoolResult<Shell>> + 'static {
        let created = Rc::clone(created);
        move |_token| {
            let created = Rc::clone(&created);
            let creation: futures::future::LocalBoxFuture<'static, PoolResult<Shell>> = Box::pin(async move {
                tokio::task::yield_now().await;
                let id = created.get();
                created.set(id + 1);
                let shell: PoolResult<Shell> = Ok(Shell { id, ..Default::default() });
                shell
            });
            creation
        }
    }

    #[tokio::test]
    async fn test_rent_release_rent_returns_same_instance() {
        let created = Rc::new(Cell::new(0));
        let mut pool = AsyncObjectPool::new(loader(&created));
        let cancel = CancellationToken::new();

        let first = pool.rent(&cancel).await.unwrap();
        pool.release(first).unwrap();
        let again = pool.rent(&cancel).await.unwrap();

        assert_eq!(again.id, 0);
        assert_eq!(created.get(), 1);
    }

    #[tokio::test]
    async fn test_hooks_and_receivers_on_reuse_only() {
        let created = Rc::new(Cell::new(0));
        let rented = Rc::new(Cell::new(0));
        let seen = Rc::clone(&rented);
        let mut pool = AsyncObjectPool::builder()
            .factory(loader(&created))
            .on_rent(move |_| seen.set(seen.get() + 1))
            .build()
            .unwrap();
        let cancel = CancellationToken::new();

        let fresh = pool.rent(&cancel).await.unwrap();
        assert_eq!((fresh.rents, fresh.returns, rented.get()), (0, 0, 0));

        pool.release(fresh).unwrap();
        let reused = pool.rent(&cancel).await.unwrap();

        assert_eq!((reused.rents, reused.returns, rented.get()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_cancelled_rent_creates_nothing() {
        let created = Rc::new(Cell::new(0));
        let mut pool = AsyncObjectPool::new(loader(&created));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pool.rent(&cancel).await;

        assert_eq!(result.unwrap_err(), PoolError::Cancelled);
        assert_eq!(created.get(), 0);
        assert_eq!(pool.count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_rent_never_calls_factory() {
        let calls = Rc::new(Cell::new(0));
        let counted = Rc::clone(&calls);
        let mut pool = AsyncObjectPool::new(move |_token| {
            counted.set(counted.get() + 1);
            async { Ok::<_, PoolError>(Shell::default()) }
        });
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(pool.rent(&cancel).await.unwrap_err(), PoolError::Cancelled);
        assert_eq!(pool.prewarm(2, &cancel).await.unwrap_err(), PoolError::Cancelled);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn test_prewarm_cancelled_midway_keeps_finished_instances() {
        let made = Rc::new(Cell::new(0));
        let counted = Rc::clone(&made);
        let mut pool = AsyncObjectPool::new(move |token: CancellationToken| {
            counted.set(counted.get() + 1);
            let stall = counted.get() == 3;
            async move {
                if stall {
                    token.cancel();
                    std::future::pending::<()>().await;
                }
                Ok::<_, PoolError>(Shell::default())
            }
        });

        let result = pool.prewarm(5, &CancellationToken::new()).await;

        assert_eq!(result.unwrap_err(), PoolError::Cancelled);
        assert_eq!(pool.count(), 2);
        assert_eq!(made.get(), 3);
    }

    #[tokio::test]
    async fn test_cancel_during_creation() {
        let mut pool = AsyncObjectPool::new(|_token| async {
            std::future::pending::<()>().await;
            Ok::<_, PoolError>(Shell::default())
        });
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let (result, ()) = tokio::join!(pool.rent(&cancel), async move {
            tokio::task::yield_now().await;
            trigger.cancel();
        });

        assert_eq!(result.unwrap_err(), PoolError::Cancelled);
        assert_eq!(pool.count(), 0);
    }

    #[tokio::test]
    async fn test_rent_from_free_list_ignores_cancellation() {
        let created = Rc::new(Cell::new(0));
        let mut pool = AsyncObjectPool::new(loader(&created));
        pool.prewarm(1, &CancellationToken::new()).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let shell = pool.rent(&cancel).await.unwrap();

        assert_eq!(shell.id, 0);
    }

    #[tokio::test]
    async fn test_prewarm_is_sequential() {
        let in_flight = Rc::new(Cell::new(0));
        let peak = Rc::new(Cell::new(0));
        let (flight, high) = (Rc::clone(&in_flight), Rc::clone(&peak));
        let mut pool = AsyncObjectPool::builder()
            .factory(move |_token| {
                let (flight, high) = (Rc::clone(&flight), Rc::clone(&high));
                async move {
                    flight.set(flight.get() + 1);
                    high.set(high.get().max(flight.get()));
                    tokio::task::yield_now().await;
                    flight.set(flight.get() - 1);
                    Ok::<_, PoolError>(Shell::default())
                }
            })
            .build()
            .unwrap();

        pool.prewarm(4, &CancellationToken::new()).await.unwrap();

        assert_eq!(pool.count(), 4);
        assert_eq!(peak.get(), 1);
        let shell = pool.rent(&CancellationToken::new()).await.unwrap();
        assert_eq!((shell.returns, shell.rents), (1, 1));
    }

    #[tokio::test]
    async fn test_factory_error_surfaces() {
        let mut pool = AsyncObjectPool::<Shell>::new(|_token| async {
            Err(PoolError::Creation("asset missing".to_string()))
        });

        let result = pool.rent(&CancellationToken::new()).await;

        assert_eq!(result.unwrap_err(), PoolError::Creation("asset missing".to_string()));
    }

    #[tokio::test]
    async fn test_disposed_pool_rejects_mutation() {
        let created = Rc::new(Cell::new(0));
        let mut pool = AsyncObjectPool::new(loader(&created));
        let cancel = CancellationToken::new();
        pool.prewarm(2, &cancel).await.unwrap();

        pool.dispose().unwrap();

        let disposed = PoolError::Disposed { pool: "AsyncObjectPool" };
        assert_eq!(pool.count(), 0);
        assert!(pool.is_disposed());
        assert_eq!(pool.rent(&cancel).await.unwrap_err(), disposed);
        assert_eq!(pool.release(Shell::default()).unwrap_err(), disposed);
        assert_eq!(pool.clear().unwrap_err(), disposed);
        assert_eq!(pool.prewarm(1, &cancel).await.unwrap_err(), disposed);
        assert_eq!(pool.dispose().unwrap_err(), disposed);
    }

    #[tokio::test]
    async fn test_usable_through_async_pool_trait() {
        async fn cycle<P: AsyncPool<Shell>>(pool: &mut P, cancel: &CancellationToken) -> Shell {
            let shell = pool.rent(cancel).await.unwrap();
            pool.release(shell).unwrap();
            pool.rent(cancel).await.unwrap()
        }

        let created = Rc::new(Cell::new(0));
        let mut pool = AsyncObjectPool::new(loader(&created));

        let shell = cycle(&mut pool, &CancellationToken::new()).await;

        assert_eq!((shell.id, shell.rents, shell.returns), (0, 1, 1));
        assert_eq!(AsyncPool::count(&pool), 0);
        AsyncPool::dispose(&mut pool).unwrap();
        assert!(AsyncPool::is_disposed(&pool));
    }

    #[test]
    fn test_builder_requires_factory() {
        let result = AsyncObjectPool::<Shell>::builder().build();
        assert_eq!(result.unwrap_err(), PoolError::NullArgument { name: "factory" });
    }
}
