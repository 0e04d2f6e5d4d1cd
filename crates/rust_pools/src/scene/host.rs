//! Engine primitives the entity pools call into

use super::placement::Placement;
use crate::foundation::collections::Entity;
use crate::pool::{PoolCallbackReceiver, PoolResult};

/// Synchronous engine operations on entities
///
/// Implementations own the entities; the pools only hold handles. Every
/// method other than [`instantiate`](Self::instantiate) must tolerate
/// handles that are no longer alive.
pub trait SceneHost {
    /// Clone `prototype`, including its components and descendants, and
    /// apply `placement` to the clone
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`](crate::pool::PoolError::NullArgument)
    /// when `prototype` is not alive.
    fn instantiate(&mut self, prototype: Entity, placement: &Placement) -> PoolResult<Entity>;

    /// Destroy an entity and its descendants
    fn destroy(&mut self, entity: Entity);

    /// Show or hide an entity
    fn set_active(&mut self, entity: Entity, active: bool);

    /// Apply a parent change and pose
    fn set_placement(&mut self, entity: Entity, placement: &Placement);

    /// Whether the handle still refers to an entity
    fn is_alive(&self, entity: Entity) -> bool;

    /// Append `root` and all its descendants to `out`, root first,
    /// depth-first
    fn collect_hierarchy(&self, root: Entity, out: &mut Vec<Entity>);

    /// Visit every component of `entity` that receives pool callbacks
    fn for_each_receiver(&mut self, entity: Entity, visit: &mut dyn FnMut(&mut dyn PoolCallbackReceiver));
}
