//! Shared pool registry
//!
//! One free list per prototype, created lazily on first use, plus an
//! ownership table so a rented instance can be released without the caller
//! knowing which prototype it came from.
//!
//! The registry is an explicit context object: construct one per scene (or
//! per play session) and call [`SharedPoolRegistry::reset`] when that context
//! is torn down.

use crate::config::PoolSettings;
use crate::foundation::collections::{ComponentRef, Entity, EntityMap};
use crate::pool::{CallbackDispatcher, PoolError, PoolResult};
use crate::scene::{Placement, SceneHost};
use std::collections::HashMap;

/// Prototype-keyed entity pools with return-to-origin release
#[derive(Debug, Default)]
pub struct SharedPoolRegistry {
    pools: HashMap<Entity, Vec<Entity>>,
    owners: EntityMap<Entity>,
    dispatcher: CallbackDispatcher,
    settings: PoolSettings,
}

impl SharedPoolRegistry {
    /// Create an empty registry with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with explicit settings
    pub fn with_settings(settings: PoolSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Settings used for every prototype pool
    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Rent an instance of `prototype`
    ///
    /// Idle entries the host no longer knows about are discarded on the way.
    /// A reused instance is placed; otherwise a new one is instantiated with
    /// `placement`. Either way the instance comes back active. Rent callbacks
    /// reach every receiver in the instance's hierarchy.
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when `prototype` is not alive, or the
    /// host's instantiation error.
    pub fn rent<H: SceneHost + ?Sized>(&mut self, host: &mut H, prototype: Entity, placement: &Placement) -> PoolResult<Entity> {
        if !host.is_alive(prototype) {
            return Err(PoolError::NullArgument { name: "prototype" });
        }
        self.ensure_pool(host, prototype)?;

        let instance = match self.pop_live(host, prototype) {
            Some(instance) => {
                if !placement.is_empty() {
                    host.set_placement(instance, placement);
                }
                instance
            }
            None => {
                log::trace!("Registry miss for {:?}, instantiating", prototype);
                host.instantiate(prototype, placement)?
            }
        };

        host.set_active(instance, true);
        self.owners.insert(instance, prototype);
        self.dispatcher.dispatch_rent(host, instance);
        Ok(instance)
    }

    /// Return `instance` to the pool of the prototype it was rented from
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when `instance` is not alive (its rental
    /// record is dropped), [`PoolError::UnknownInstance`] when it is not
    /// currently rented from this registry.
    pub fn release<H: SceneHost + ?Sized>(&mut self, host: &mut H, instance: Entity) -> PoolResult<()> {
        if !host.is_alive(instance) {
            if self.owners.remove(instance).is_some() {
                log::debug!("Dropped rental record of destroyed entity {:?}", instance);
            }
            return Err(PoolError::NullArgument { name: "instance" });
        }
        let prototype = self
            .owners
            .remove(instance)
            .ok_or(PoolError::UnknownInstance { instance })?;

        host.set_active(instance, false);
        self.pools.entry(prototype).or_default().push(instance);
        self.dispatcher.dispatch_return(host, instance);
        Ok(())
    }

    /// Create `count` idle instances of `prototype` up front
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when `prototype` is not alive, or the
    /// host's instantiation error.
    pub fn prewarm<H: SceneHost + ?Sized>(&mut self, host: &mut H, prototype: Entity, count: usize) -> PoolResult<()> {
        if !host.is_alive(prototype) {
            return Err(PoolError::NullArgument { name: "prototype" });
        }
        self.ensure_pool(host, prototype)?;
        self.fill(host, prototype, count)
    }

    /// Rent through a typed component handle on the prototype
    ///
    /// The returned handle points at the same component type on the rented
    /// instance.
    ///
    /// # Errors
    ///
    /// Same as [`rent`](Self::rent).
    pub fn rent_component<H: SceneHost + ?Sized, C>(
        &mut self,
        host: &mut H,
        prototype: ComponentRef<C>,
        placement: &Placement,
    ) -> PoolResult<ComponentRef<C>> {
        let instance = self.rent(host, prototype.entity(), placement)?;
        Ok(ComponentRef::new(instance))
    }

    /// Release through a typed component handle on a rented instance
    ///
    /// # Errors
    ///
    /// Same as [`release`](Self::release).
    pub fn release_component<H: SceneHost + ?Sized, C>(&mut self, host: &mut H, instance: ComponentRef<C>) -> PoolResult<()> {
        self.release(host, instance.entity())
    }

    /// Idle instances held for `prototype`
    pub fn pooled_count(&self, prototype: Entity) -> usize {
        self.pools.get(&prototype).map_or(0, Vec::len)
    }

    /// Instances currently rented, across all prototypes
    pub fn rented_count(&self) -> usize {
        self.owners.len()
    }

    /// Whether `instance` is currently rented from this registry
    pub fn is_rented(&self, instance: Entity) -> bool {
        self.owners.contains_key(instance)
    }

    /// Prototype a rented instance came from
    pub fn prototype_of(&self, instance: Entity) -> Option<Entity> {
        self.owners.get(instance).copied()
    }

    /// Number of prototypes with a pool
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Forget every pool and every ownership record
    ///
    /// The host is not touched: idle and rented instances stay in the scene.
    pub fn reset(&mut self) {
        log::info!(
            "Resetting pool registry ({} pools, {} rented)",
            self.pools.len(),
            self.owners.len()
        );
        self.pools.clear();
        self.owners.clear();
    }

    fn ensure_pool<H: SceneHost + ?Sized>(&mut self, host: &mut H, prototype: Entity) -> PoolResult<()> {
        if self.pools.contains_key(&prototype) {
            return Ok(());
        }
        self.pools
            .insert(prototype, Vec::with_capacity(self.settings.initial_capacity));
        log::debug!("Created registry pool for {:?}", prototype);
        self.fill(host, prototype, self.settings.registry_prewarm)
    }

    fn fill<H: SceneHost + ?Sized>(&mut self, host: &mut H, prototype: Entity, count: usize) -> PoolResult<()> {
        for _ in 0..count {
            let instance = host.instantiate(prototype, &Placement::none())?;
            host.set_active(instance, false);
            self.pools.entry(prototype).or_default().push(instance);
            self.dispatcher.dispatch_return(host, instance);
        }
        Ok(())
    }

    /// Pop the most recent idle instance the host still knows about
    fn pop_live<H: SceneHost + ?Sized>(&mut self, host: &H, prototype: Entity) -> Option<Entity> {
        let free = self.pools.get_mut(&prototype)?;
        while let Some(candidate) = free.pop() {
            if host.is_alive(candidate) {
                return Some(candidate);
            }
            log::warn!("Discarding destroyed entity {:?} pooled for {:?}", candidate, prototype);
        }
        None
    }
}
