//! Scene boundary
//!
//! The pools never create, destroy or move entities themselves. They go
//! through [`SceneHost`] for the synchronous engine primitives and through
//! [`AsyncSceneLoader`] for asynchronous asset instantiation.
//!
//! [`SceneWorld`] is a small in-memory host with a parent/child hierarchy,
//! activation flags, poses and components.

pub mod host;
pub mod loader;
pub mod placement;
pub mod world;

pub use host::SceneHost;
pub use loader::{AssetKey, AsyncSceneLoader, PrototypeCatalog};
pub use placement::{ParentChange, Placement};
pub use world::{SceneComponent, SceneStats, SceneWorld};
