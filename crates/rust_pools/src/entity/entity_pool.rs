//! Single-prototype entity pool
//!
//! Recycles clones of one prototype entity. Unlike the value pools, every
//! rented entity receives rent callbacks, including freshly instantiated ones,
//! because the pool is also what activates and places it. A rented entity is
//! always active, even when the prototype itself is kept hidden.

use crate::config::PoolSettings;
use crate::foundation::collections::Entity;
use crate::pool::{CallbackDispatcher, FreeList, PoolError, PoolResult};
use crate::scene::{Placement, SceneHost};

pub(crate) const KIND: &str = "EntityPool";

/// Pool of clones of a single prototype entity
#[derive(Debug)]
pub struct EntityPool {
    prototype: Entity,
    free: FreeList<Entity>,
    dispatcher: CallbackDispatcher,
}

impl EntityPool {
    /// Create a pool for `prototype`
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when `prototype` is not alive.
    pub fn new<H: SceneHost + ?Sized>(host: &H, prototype: Entity) -> PoolResult<Self> {
        Self::with_settings(host, prototype, &PoolSettings::default())
    }

    /// Create a pool for `prototype` with explicit settings
    ///
    /// # Errors
    ///
    /// [`PoolError::NullArgument`] when `prototype` is not alive.
    pub fn with_settings<H: SceneHost + ?Sized>(host: &H, prototype: Entity, settings: &PoolSettings) -> PoolResult<Self> {
        if !host.is_alive(prototype) {
            return Err(PoolError::NullArgument { name: "prototype" });
        }
        Ok(Self {
            prototype,
            free: FreeList::with_capacity(KIND, settings.initial_capacity),
            dispatcher: CallbackDispatcher::new(),
        })
    }

    /// The entity every instance is cloned from
    pub fn prototype(&self) -> Entity {
        self.prototype
    }

    /// Rent an entity: reuse the most recently returned one, or clone the
    /// prototype
    ///
    /// A reused entity is placed; a new one is instantiated with the
    /// placement. Both are activated and receive rent callbacks.
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose), or the
    /// host's instantiation error.
    pub fn rent<H: SceneHost + ?Sized>(&mut self, host: &mut H, placement: &Placement) -> PoolResult<Entity> {
        self.free.ensure_live()?;

        let entity = match self.free.pop() {
            Some(entity) => {
                if !placement.is_empty() {
                    host.set_placement(entity, placement);
                }
                entity
            }
            None => {
                log::trace!("{} miss, instantiating {:?}", KIND, self.prototype);
                host.instantiate(self.prototype, placement)?
            }
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

    /// Destroy every idle entity; the pool stays usable
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose).
    pub fn clear<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> PoolResult<()> {
        self.free.ensure_live()?;
        let mut destroyed = 0;
        while let Some(entity) = self.free.pop() {
            host.destroy(entity);
            destroyed += 1;
        }
        log::debug!("{} cleared {} idle entities of {:?}", KIND, destroyed, self.prototype);
        Ok(())
    }

    /// Instantiate `count` inactive entities straight into the free list
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] after [`dispose`](Self::dispose), or the
    /// host's instantiation error.
    pub fn prewarm<H: SceneHost + ?Sized>(&mut self, host: &mut H, count: usize) -> PoolResult<()> {
        self.free.ensure_live()?;
        for _ in 0..count {
            let entity = host.instantiate(self.prototype, &Placement::none())?;
            self.free.push(entity);
            host.set_active(entity, false);
            self.dispatcher.dispatch_return(host, entity);
        }
        Ok(())
    }

    /// Destroy idle entities and refuse every further mutation
    ///
    /// # Errors
    ///
    /// [`PoolError::Disposed`] when already disposed.
    pub fn dispose<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> PoolResult<()> {
        self.clear(host)?;
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use crate::pool::PoolCallbackReceiver;
    use crate::scene::{SceneComponent, SceneWorld};

    #[derive(Debug, Clone, Default)]
    struct Lifetime {
        rents: u32,
        returns: u32,
    }

    impl PoolCallbackReceiver for Lifetime {
        fn on_rent(&mut self) {
            self.rents += 1;
        }

        fn on_return(&mut self) {
            self.returns += 1;
        }
    }

    impl SceneComponent for Lifetime {
        fn as_receiver(&mut self) -> Option<&mut dyn PoolCallbackReceiver> {
            Some(self)
        }
    }

    fn bullet_scene() -> (SceneWorld, Entity) {
        let mut world = SceneWorld::new();
        let bullet = world.spawn("bullet");
        world.add_component(bullet, Lifetime::default());
        (world, bullet)
    }

    fn lifetime(world: &SceneWorld, entity: Entity) -> (u32, u32) {
        let lifetime = world.component::<Lifetime>(entity).unwrap();
        (lifetime.rents, lifetime.returns)
    }

    #[test]
    fn test_new_requires_live_prototype() {
        let (mut world, bullet) = bullet_scene();
        world.destroy(bullet);

        let result = EntityPool::new(&world, bullet);

        assert_eq!(result.unwrap_err(), PoolError::NullArgument { name: "prototype" });
    }

    #[test]
    fn test_rent_release_rent_reuses_entity() {
        let (mut world, bullet) = bullet_scene();
        let mut pool = EntityPool::new(&world, bullet).unwrap();

        let first = pool.rent(&mut world, &Placement::none()).unwrap();
        assert_eq!(lifetime(&world, first), (1, 0));

        pool.release(&mut world, first).unwrap();
        assert!(!world.is_active_self(first));
        assert_eq!(pool.count(), 1);

        let second = pool.rent(&mut world, &Placement::none()).unwrap();
        assert_eq!(second, first);
        assert!(world.is_active_self(second));
        assert_eq!(lifetime(&world, second), (2, 1));
        assert_eq!(world.stats().instantiated, 1);
    }

    #[test]
    fn test_hidden_prototype_rents_active_entities() {
        let (mut world, bullet) = bullet_scene();
        world.set_active(bullet, false);
        let mut pool = EntityPool::new(&world, bullet).unwrap();

        let fresh = pool.rent(&mut world, &Placement::none()).unwrap();
        assert!(world.is_active_self(fresh));
        pool.release(&mut world, fresh).unwrap();
        let reused = pool.rent(&mut world, &Placement::none()).unwrap();

        assert!(world.is_active_self(reused));
        assert!(!world.is_active_self(bullet));
    }

    #[test]
    fn test_rent_applies_placement() {
        let (mut world, bullet) = bullet_scene();
        let gun = world.spawn("gun");
        let mut pool = EntityPool::new(&world, bullet).unwrap();
        let placement = Placement::at(Vec3::new(0.0, 5.0, 0.0), Quat::identity()).with_parent(gun);

        let fresh = pool.rent(&mut world, &placement).unwrap();
        pool.release(&mut world, fresh).unwrap();
        world.set_placement(fresh, &Placement::at(Vec3::zeros(), Quat::identity()).detached());
        let reused = pool.rent(&mut world, &placement).unwrap();

        assert_eq!(world.parent(reused), Some(gun));
        assert_eq!(world.pose(reused).map(|p| p.position), Some(Vec3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_prewarm_creates_inactive_entities() {
        let (mut world, bullet) = bullet_scene();
        let mut pool = EntityPool::new(&world, bullet).unwrap();

        pool.prewarm(&mut world, 3).unwrap();

        assert_eq!(pool.count(), 3);
        assert_eq!(world.stats().instantiated, 3);
        let rented: Vec<_> = (0..3).map(|_| pool.rent(&mut world, &Placement::none()).unwrap()).collect();
        assert_eq!(world.stats().instantiated, 3);
        for entity in rented {
            assert!(world.is_active_self(entity));
            assert_eq!(lifetime(&world, entity), (1, 1));
        }
    }

    #[test]
    fn test_release_dead_entity_fails() {
        let (mut world, bullet) = bullet_scene();
        let mut pool = EntityPool::new(&world, bullet).unwrap();
        let entity = pool.rent(&mut world, &Placement::none()).unwrap();
        world.destroy(entity);

        let result = pool.release(&mut world, entity);

        assert_eq!(result.unwrap_err(), PoolError::NullArgument { name: "instance" });
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn test_clear_destroys_idle_entities() {
        let (mut world, bullet) = bullet_scene();
        let mut pool = EntityPool::new(&world, bullet).unwrap();
        pool.prewarm(&mut world, 3).unwrap();

        pool.clear(&mut world).unwrap();

        assert_eq!(pool.count(), 0);
        assert_eq!(world.stats().destroyed, 3);
        assert_eq!(world.len(), 1);
        assert!(pool.rent(&mut world, &Placement::none()).is_ok());
    }

    #[test]
    fn test_disposed_pool_rejects_mutation() {
        let (mut world, bullet) = bullet_scene();
        let mut pool = EntityPool::new(&world, bullet).unwrap();
        let rented = pool.rent(&mut world, &Placement::none()).unwrap();
        pool.prewarm(&mut world, 2).unwrap();

        pool.dispose(&mut world).unwrap();

        let disposed = PoolError::Disposed { pool: "EntityPool" };
        assert!(pool.is_disposed());
        assert_eq!(pool.count(), 0);
        assert_eq!(pool.rent(&mut world, &Placement::none()).unwrap_err(), disposed);
        assert_eq!(pool.release(&mut world, rented).unwrap_err(), disposed);
        assert_eq!(pool.clear(&mut world).unwrap_err(), disposed);
        assert_eq!(pool.prewarm(&mut world, 1).unwrap_err(), disposed);
        assert_eq!(pool.dispose(&mut world).unwrap_err(), disposed);
        assert!(world.is_alive(rented));
    }
}
