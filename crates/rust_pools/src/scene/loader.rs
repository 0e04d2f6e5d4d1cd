//! Asynchronous instantiation boundary
//!
//! Assets that live outside the scene (streamed, downloaded, decoded on
//! demand) are instantiated through an [`AsyncSceneLoader`] keyed by
//! [`AssetKey`]. The loader also owns the teardown of what it created.

use super::host::SceneHost;
use super::placement::Placement;
use crate::foundation::collections::Entity;
use crate::pool::{PoolError, PoolResult};
use futures::future::LocalBoxFuture;
use std::collections::HashMap;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Identifier of an asset known to a loader
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    /// Create a key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for AssetKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asynchronous instantiation of keyed assets into a host
pub trait AsyncSceneLoader<H: SceneHost + ?Sized> {
    /// Instantiate the asset under `key`, placed per `placement`
    ///
    /// Implementations should stop early once `cancel` fires; the caller
    /// drops the returned future as soon as it does.
    fn instantiate<'a>(
        &'a mut self,
        host: &'a mut H,
        key: &'a AssetKey,
        placement: Placement,
        cancel: CancellationToken,
    ) -> LocalBoxFuture<'a, PoolResult<Entity>>;

    /// Tear down an instance this loader created
    fn release_instance(&mut self, host: &mut H, instance: Entity);
}

/// Loader that resolves keys to prototype entities already in the scene
///
/// Useful when assets are preloaded into hidden prototypes; the entity pools
/// activate every instance they rent.
#[derive(Debug, Default)]
pub struct PrototypeCatalog {
    prototypes: HashMap<AssetKey, Entity>,
    released: usize,
}

impl PrototypeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prototype` under `key`, replacing any previous entry
    pub fn register(&mut self, key: impl Into<AssetKey>, prototype: Entity) -> Option<Entity> {
        self.prototypes.insert(key.into(), prototype)
    }

    /// Prototype registered under `key`
    pub fn prototype(&self, key: &AssetKey) -> Option<Entity> {
        self.prototypes.get(key).copied()
    }

    /// Number of instances handed back through [`AsyncSceneLoader::release_instance`]
    pub fn released(&self) -> usize {
        self.released
    }
}

impl<H: SceneHost + ?Sized> AsyncSceneLoader<H> for PrototypeCatalog {
    fn instantiate<'a>(
        &'a mut self,
        host: &'a mut H,
        key: &'a AssetKey,
        placement: Placement,
        cancel: CancellationToken,
    ) -> LocalBoxFuture<'a, PoolResult<Entity>> {
        let prototype = self.prototype(key);
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(PoolError::Cancelled);
            }
            let Some(prototype) = prototype else {
                return Err(PoolError::Creation(format!("no asset registered under `{key}`")));
            };
            host.instantiate(prototype, &placement)
                .map_err(|_| PoolError::Creation(format!("prototype for `{key}` was destroyed")))
        })
    }

    fn release_instance(&mut self, host: &mut H, instance: Entity) {
        host.destroy(instance);
        self.released += 1;
    }
}
