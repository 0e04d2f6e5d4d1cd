//! Entity pool backed by an asynchronous loader
//!
//! Misses go through an [`AsyncSceneLoader`] instead of cloning a prototype
//! that already sits in the scene. Clearing hands idle entities back to the
//! loader rather than destroying them directly.

use crate::config::PoolSettings;
use crate::foundation::collections::Entity;
use crate::pool::async_pool::create_cancellable;
use crate::pool::{CallbackDispatcher, FreeList, PoolError, PoolResult};
use crate::scene::{AssetKey, AsyncSceneLoader, Placement, SceneHost};
use tokio_util::sync::CancellationToken;

pub(crate) const KIND: &str = "AsyncEntityPool";

/// Pool of entities instantiated from a loader asset
#[derive(Debug)]
pub struct AsyncEntityPool {
    key: AssetKey,
    free: FreeList<Entity>,
    dispatcher: CallbackDispatcher,
}

impl AsyncEntityPool {
    /// Create a pool for the asset under `key`
    pub fn new(key: impl Into<AssetKey>) -> Self {
        Self::with_settings(key, &PoolSettings::default())
    }

    /// Create a pool for the asset under `key` with explicit settings
    pub fn with_settings(key: impl Into<AssetKey>, settings: &PoolSettings) -> Self {
        Self {
            key: key.into(),
            free: FreeList::with_capacity(KIND, settings.initial_capacity),
            dispatcher: CallbackDispatcher::new(),
        }
    }

    /// The asset this pool instantiates
    pub fn key(&self) -> &AssetKey {
        &self.key
    }

    /// Rent an entity, suspending only when the loader has to create one
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose),
    /// [`PoolError::Cancelled`] when `cancel` fires before the loader
    /// finishes, or the loader's own error.
    pub async fn rent<H, L>(
        &mut self,
        host: &mut H,
        loader: &mut L,
        placement: &Placement,
        cancel: &CancellationToken,
    ) -> PoolResult<Entity>
    where
        H: SceneHost + ?Sized,
        L: AsyncSceneLoader<H> + ?Sized,
    {
        self.free.ensure_live()?;

        let entity = match self.free.pop() {
            Some(entity) => {
                if !placement.is_empty() {
                    host.set_placement(entity, placement);
                }
                entity
            }
            None => Self::load(&self.key, host, loader, *placement, cancel).await?,
        };

        host.set_active(entity, true);
        self.dispatcher.dispatch_rent(host, entity);
        Ok(entity)
    }

    /// Deactivate `entity` and keep it for the next rent
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose),
    /// [`PoolError::NullArgument`] when `entity` is not alive.
    pub fn release<H: SceneHost + ?Sized>(&mut self, host: &mut H, entity: Entity) -> PoolResult<()> {
        self.free.ensure_live()?;
        if !host.is_alive(entity) {
            return Err(PoolError::NullArgument { name: "instance" });
        }

        self.free.push(entity);
        host.set_active(entity, false);
        self.dispatcher.dispatch_return(host, entity);
        Ok(())
    }

    /// Hand every idle entity back to the loader; the pool stays usable
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose).
    pub fn clear<H, L>(&mut self, host: &mut H, loader: &mut L) -> PoolResult<()>
    where
        H: SceneHost + ?Sized,
        L: AsyncSceneLoader<H> + ?Sized,
    {
        self.free.ensure_live()?;
        while let Some(entity) = self.free.pop() {
            loader.release_instance(host, entity);
        }
        Ok(())
    }

    /// Load `count` inactive entities into the free list, one at a time
    ///
    /// Entities loaded before a cancellation stay in the pool.
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose),
    /// [`PoolError::Cancelled`] or a loader error, which stop the loop.
    pub async fn prewarm<H, L>(
        &mut self,
        host: &mut H,
        loader: &mut L,
        count: usize,
        cancel: &CancellationToken,
    ) -> PoolResult<()>
    where
        H: SceneHost + ?Sized,
        L: AsyncSceneLoader<H> + ?Sized,
    {
        self.free.ensure_live()?;
        for _ in 0..count {
            let entity = Self::load(&self.key, host, loader, Placement::none(), cancel).await?;
            self.free.push(entity);
            host.set_active(entity, false);
            self.dispatcher.dispatch_return(host, entity);
        }
        log::debug!("{} prewarmed {} entities of `{}`", KIND, count, self.key);
        Ok(())
    }

    /// Release idle entities and refuse every further mutation
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] when already disposed.
    pub fn dispose<H, L>(&mut self, host: &mut H, loader: &mut L) -> PoolResult<()>
    where
        H: SceneHost + ?Sized,
        L: AsyncSceneLoader<H> + ?Sized,
    {
        self.clear(host, loader)?;
        self.free.mark_disposed();
        Ok(())
    }

    /// Number of idle entities
    pub fn count(&self) -> usize {
        self.free.len()
    }

    /// Whether [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        self.free.is_disposed()
    }

    async fn load<H, L>(
        key: &AssetKey,
        host: &mut H,
        loader: &mut L,
        placement: Placement,
        cancel: &CancellationToken,
    ) -> PoolResult<Entity>
    where
        H: SceneHost + ?Sized,
        L: AsyncSceneLoader<H> + ?Sized,
    {
        create_cancellable(cancel, async move {
            log::trace!("{} miss, loading `{}`", KIND, key);
            loader.instantiate(host, key, placement, cancel.clone()).await
        })
        .await
    }
}
