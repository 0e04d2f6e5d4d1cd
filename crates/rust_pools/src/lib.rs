//! # Rust Pools
//!
//! Rent/return pooling for resources that are expensive to create, and for
//! scene entities that are expensive to instantiate.
//!
//! ## Features
//!
//! - **Value Pools**: [`ObjectPool`](pool::ObjectPool) and a suspending,
//!   cancellable [`AsyncObjectPool`](pool::AsyncObjectPool)
//! - **Lifecycle Hooks**: injected `on_rent` / `on_return` / `on_destroy`
//! - **Callbacks**: resources implementing
//!   [`PoolCallbackReceiver`](pool::PoolCallbackReceiver) are told when they
//!   leave and re-enter a pool, nested receivers included
//! - **Entity Pools**: single-prototype pools and a shared registry that routes
//!   every release back to the pool it came from
//! - **Configuration**: [`PoolSettings`](config::PoolSettings) in TOML or RON
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_pools::prelude::*;
//!
//! #[derive(Default)]
//! struct Buffer(Vec<u8>);
//!
//! impl PoolCallbackReceiver for Buffer {
//!     fn on_return(&mut self) {
//!         self.0.clear();
//!     }
//! }
//!
//! fn main() -> Result<(), PoolError> {
//!     let mut buffers = ObjectPool::new(|| Buffer(Vec::with_capacity(4096)));
//!
//!     let mut buffer = buffers.rent()?;
//!     buffer.0.extend_from_slice(b"frame");
//!     buffers.release(buffer)?;
//!     assert_eq!(buffers.count(), 1);
//!     assert!(buffers.rent()?.0.is_empty());
//!
//!     let mut world = SceneWorld::new();
//!     let asteroid = world.spawn("asteroid");
//!     let mut registry = SharedPoolRegistry::new();
//!
//!     let rock = registry.rent(&mut world, asteroid, &Placement::none())?;
//!     registry.release(&mut world, rock)?;
//!     assert_eq!(registry.rent(&mut world, asteroid, &Placement::none())?, rock);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod entity;
pub mod foundation;
pub mod pool;
pub mod scene;

/// Common imports for pool users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PoolSettings},
        entity::{AsyncEntityPool, EntityPool, SharedPoolRegistry},
        foundation::{
            collections::{ComponentRef, Entity},
            math::{Pose, Quat, Vec3},
        },
        pool::{
            AsyncObjectPool, AsyncPool, ObjectPool, Pool, PoolCallbackReceiver, PoolError, PoolEvent, PoolHooks,
            PoolResult,
        },
        scene::{AssetKey, AsyncSceneLoader, Placement, PrototypeCatalog, SceneComponent, SceneHost, SceneWorld},
    };
    pub use tokio_util::sync::CancellationToken;
}
