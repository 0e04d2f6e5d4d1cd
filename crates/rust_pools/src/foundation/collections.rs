//! Specialized collection types

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Stable, generational handle to an entity living in a scene
    ///
    /// A handle outlives the entity it points to; hosts report such a
    /// handle as no longer alive instead of reusing it.
    pub struct Entity;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<T> = SlotMap<Entity, T>;

/// Side table keyed by entity handles
pub type EntityMap<T> = SecondaryMap<Entity, T>;

/// Typed handle to a component attached to an entity
///
/// The handle carries only the owning entity; the component type is tracked
/// at compile time so pooled clones of a prototype can be handed back under
/// the same component type.
pub struct ComponentRef<C> {
    entity: Entity,
    _phantom: std::marker::PhantomData<fn() -> C>,
}

impl<C> ComponentRef<C> {
    /// Create a new typed handle for the component of type `C` on `entity`
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Get the owning entity
    pub fn entity(&self) -> Entity {
        self.entity
    }
}

// Manual impls: derives would require `C: Debug`/`C: Clone`/`C: PartialEq`.
impl<C> std::fmt::Debug for ComponentRef<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRef").field("entity", &self.entity).finish()
    }
}

impl<C> Clone for ComponentRef<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for ComponentRef<C> {}

impl<C> PartialEq for ComponentRef<C> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<C> Eq for ComponentRef<C> {}
