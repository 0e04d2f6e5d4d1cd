//! Entity pooling
//!
//! Pools whose instances are scene entities rather than plain values. They
//! never own the entities; every structural change goes through a
//! [`SceneHost`](crate::scene::SceneHost), and rent/return notifications reach
//! every receiver component in the entity's hierarchy.
//!
//! - [`EntityPool`] clones one prototype
//! - [`AsyncEntityPool`] loads one asset through an asynchronous loader
//! - [`SharedPoolRegistry`] keeps a pool per prototype and routes releases back
//!   to the right one

pub mod async_entity_pool;
pub mod entity_pool;
pub mod registry;

pub use async_entity_pool::AsyncEntityPool;
pub use entity_pool::EntityPool;
pub use registry::SharedPoolRegistry;
