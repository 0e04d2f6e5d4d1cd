//! In-memory scene host
//!
//! A minimal hierarchy of named entities backed by a slot map. Each entity
//! carries an activation flag, a local pose, an optional parent and a list of
//! components. Instantiation deep-copies a prototype's subtree.

use super::host::SceneHost;
use super::placement::{ParentChange, Placement};
use crate::foundation::collections::{ComponentRef, Entity, HandleMap};
use crate::foundation::math::Pose;
use crate::pool::{PoolCallbackReceiver, PoolError, PoolResult};
use std::any::Any;

/// Object-safe plumbing every component gets for free
///
/// Implemented for every `Clone` type that implements [`SceneComponent`].
pub trait ComponentBase: Any {
    /// Clone into a new boxed component
    fn clone_boxed(&self) -> Box<dyn SceneComponent>;

    /// Upcast for downcasting to the concrete component type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete component type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: SceneComponent + Clone> ComponentBase for C {
    fn clone_boxed(&self) -> Box<dyn SceneComponent> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Data attached to an entity
///
/// A component opts in to pool notifications by returning itself from
/// [`as_receiver`](Self::as_receiver).
pub trait SceneComponent: ComponentBase {
    /// The pool-callback capability of this component, if it has one
    fn as_receiver(&mut self) -> Option<&mut dyn PoolCallbackReceiver> {
        None
    }
}

/// Counters for host-level entity churn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    /// Entities created through [`SceneHost::instantiate`]
    pub instantiated: usize,
    /// Entities removed through [`SceneHost::destroy`], counting roots only
    pub destroyed: usize,
}

struct Node {
    name: String,
    active: bool,
    pose: Pose,
    parent: Option<Entity>,
    children: Vec<Entity>,
    components: Vec<Box<dyn SceneComponent>>,
}

impl Node {
    fn new(name: &str, parent: Option<Entity>) -> Self {
        Self {
            name: name.to_string(),
            active: true,
            pose: Pose::identity(),
            parent,
            children: Vec::new(),
            components: Vec::new(),
        }
    }
}

/// Reference [`SceneHost`] implementation
#[derive(Default)]
pub struct SceneWorld {
    nodes: HandleMap<Node>,
    stats: SceneStats,
}

impl SceneWorld {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an active root entity
    pub fn spawn(&mut self, name: &str) -> Entity {
        self.nodes.insert(Node::new(name, None))
    }

    /// Create an active entity under `parent`
    ///
    /// Returns `None` when `parent` is not alive.
    pub fn spawn_child(&mut self, parent: Entity, name: &str) -> Option<Entity> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let child = self.nodes.insert(Node::new(name, Some(parent)));
        self.nodes[parent].children.push(child);
        Some(child)
    }

    /// Attach a component; returns a typed handle to it
    pub fn add_component<C: SceneComponent>(&mut self, entity: Entity, component: C) -> Option<ComponentRef<C>> {
        let node = self.nodes.get_mut(entity)?;
        node.components.push(Box::new(component));
        Some(ComponentRef::new(entity))
    }

    /// First component of type `C` on `entity`
    pub fn component<C: SceneComponent>(&self, entity: Entity) -> Option<&C> {
        self.nodes
            .get(entity)?
            .components
            .iter()
            .find_map(|component| (**component).as_any().downcast_ref::<C>())
    }

    /// First component of type `C` on `entity`, mutably
    pub fn component_mut<C: SceneComponent>(&mut self, entity: Entity) -> Option<&mut C> {
        self.nodes
            .get_mut(entity)?
            .components
            .iter_mut()
            .find_map(|component| (**component).as_any_mut().downcast_mut::<C>())
    }

    /// Resolve a typed component handle
    pub fn resolve<C: SceneComponent>(&self, handle: ComponentRef<C>) -> Option<&C> {
        self.component(handle.entity())
    }

    /// Reparent `child`; `None` moves it to the root
    ///
    /// Ignored when either entity is dead or when it would create a cycle.
    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) {
        if !self.nodes.contains_key(child) {
            return;
        }
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) || self.is_ancestor_or_self(child, parent) {
                log::warn!("Refusing to parent {:?} under {:?}", child, parent);
                return;
            }
        }

        self.unlink(child);
        self.nodes[child].parent = parent;
        if let Some(parent) = parent {
            self.nodes[parent].children.push(child);
        }
    }

    /// Parent of `entity`, if it has one
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.nodes.get(entity)?.parent
    }

    /// Direct children of `entity`
    pub fn children(&self, entity: Entity) -> &[Entity] {
        self.nodes.get(entity).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    /// Name of `entity`
    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.nodes.get(entity).map(|node| node.name.as_str())
    }

    /// Own activation flag of `entity`
    pub fn is_active_self(&self, entity: Entity) -> bool {
        self.nodes.get(entity).is_some_and(|node| node.active)
    }

    /// Whether `entity` and all its ancestors are active
    pub fn is_active_in_hierarchy(&self, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            match self.nodes.get(id) {
                Some(node) if node.active => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Local pose of `entity`
    pub fn pose(&self, entity: Entity) -> Option<Pose> {
        self.nodes.get(entity).map(|node| node.pose)
    }

    /// Pose of `entity` composed with all its ancestors
    pub fn world_pose(&self, entity: Entity) -> Option<Pose> {
        let node = self.nodes.get(entity)?;
        match node.parent {
            Some(parent) => Some(self.world_pose(parent)?.compose(&node.pose)),
            None => Some(node.pose),
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Instantiate/destroy counters
    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    fn is_ancestor_or_self(&self, candidate: Entity, entity: Entity) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.nodes.get(id).and_then(|node| node.parent);
        }
        false
    }

    fn unlink(&mut self, child: Entity) {
        if let Some(old_parent) = self.nodes[child].parent.take() {
            if let Some(node) = self.nodes.get_mut(old_parent) {
                node.children.retain(|&c| c != child);
            }
        }
    }

    fn clone_subtree(&mut self, source: Entity, parent: Option<Entity>) -> Option<Entity> {
        let node = self.nodes.get(source)?;
        let copy = Node {
            name: node.name.clone(),
            active: node.active,
            pose: node.pose,
            parent,
            children: Vec::new(),
            components: node.components.iter().map(|component| (**component).clone_boxed()).collect(),
        };
        let children = node.children.clone();

        let entity = self.nodes.insert(copy);
        for child in children {
            if let Some(cloned) = self.clone_subtree(child, Some(entity)) {
                self.nodes[entity].children.push(cloned);
            }
        }
        Some(entity)
    }

    fn collect_into(&self, entity: Entity, out: &mut Vec<Entity>) {
        if let Some(node) = self.nodes.get(entity) {
            out.push(entity);
            for &child in &node.children {
                self.collect_into(child, out);
            }
        }
    }
}

impl SceneHost for SceneWorld {
    fn instantiate(&mut self, prototype: Entity, placement: &Placement) -> PoolResult<Entity> {
        let clone = self
            .clone_subtree(prototype, None)
            .ok_or(PoolError::NullArgument { name: "prototype" })?;

        let node = &mut self.nodes[clone];
        node.name = format!("{} (clone)", node.name);
        self.set_placement(clone, placement);
        self.stats.instantiated += 1;
        Ok(clone)
    }

    fn destroy(&mut self, entity: Entity) {
        if !self.nodes.contains_key(entity) {
            return;
        }
        self.unlink(entity);

        let mut doomed = Vec::new();
        self.collect_into(entity, &mut doomed);
        for id in doomed {
            self.nodes.remove(id);
        }
        self.stats.destroyed += 1;
    }

    fn set_active(&mut self, entity: Entity, active: bool) {
        if let Some(node) = self.nodes.get_mut(entity) {
            node.active = active;
        }
    }

    fn set_placement(&mut self, entity: Entity, placement: &Placement) {
        match placement.parent {
            ParentChange::Keep => {}
            ParentChange::Attach(parent) => self.set_parent(entity, Some(parent)),
            ParentChange::Detach => self.set_parent(entity, None),
        }
        if let (Some(pose), Some(node)) = (placement.pose, self.nodes.get_mut(entity)) {
            node.pose = pose;
        }
    }

    fn is_alive(&self, entity: Entity) -> bool {
        self.nodes.contains_key(entity)
    }

    fn collect_hierarchy(&self, root: Entity, out: &mut Vec<Entity>) {
        self.collect_into(root, out);
    }

    fn for_each_receiver(&mut self, entity: Entity, visit: &mut dyn FnMut(&mut dyn PoolCallbackReceiver)) {
        if let Some(node) = self.nodes.get_mut(entity) {
            for component in &mut node.components {
                if let Some(receiver) = component.as_receiver() {
                    visit(receiver);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use crate::pool::CallbackDispatcher;

    #[derive(Debug, Clone, Default)]
    struct Health(u32);

    impl SceneComponent for Health {}

    #[derive(Debug, Clone, Default)]
    struct Spinner {
        rents: u32,
        returns: u32,
    }

    impl PoolCallbackReceiver for Spinner {
        fn on_rent(&mut self) {
            self.rents += 1;
        }

        fn on_return(&mut self) {
            self.returns += 1;
        }
    }

    impl SceneComponent for Spinner {
        fn as_receiver(&mut self) -> Option<&mut dyn PoolCallbackReceiver> {
            Some(self)
        }
    }

    fn ship(world: &mut SceneWorld) -> (Entity, Entity, Entity) {
        let root = world.spawn("ship");
        let turret = world.spawn_child(root, "turret").unwrap();
        let barrel = world.spawn_child(turret, "barrel").unwrap();
        world.add_component(root, Health(10));
        world.add_component(root, Spinner::default());
        world.add_component(barrel, Spinner::default());
        (root, turret, barrel)
    }

    #[test]
    fn test_instantiate_copies_subtree() {
        let mut world = SceneWorld::new();
        let (root, _, _) = ship(&mut world);

        let clone = world.instantiate(root, &Placement::none()).unwrap();

        assert_eq!(world.len(), 6);
        assert_eq!(world.name(clone), Some("ship (clone)"));
        assert_eq!(world.component::<Health>(clone).map(|h| h.0), Some(10));
        let turret = world.children(clone)[0];
        assert_eq!(world.name(turret), Some("turret"));
        assert_eq!(world.parent(turret), Some(clone));
        assert_eq!(world.stats().instantiated, 1);
    }

    #[test]
    fn test_instantiate_dead_prototype_fails() {
        let mut world = SceneWorld::new();
        let prototype = world.spawn("gone");
        world.destroy(prototype);

        let result = world.instantiate(prototype, &Placement::none());

        assert_eq!(result.unwrap_err(), PoolError::NullArgument { name: "prototype" });
    }

    #[test]
    fn test_destroy_removes_descendants() {
        let mut world = SceneWorld::new();
        let holder = world.spawn("holder");
        let (root, turret, barrel) = ship(&mut world);
        world.set_parent(root, Some(holder));

        world.destroy(root);

        assert!(!world.is_alive(root));
        assert!(!world.is_alive(turret));
        assert!(!world.is_alive(barrel));
        assert!(world.children(holder).is_empty());
        assert_eq!(world.stats().destroyed, 1);
    }

    #[test]
    fn test_placement_reparents_then_poses() {
        let mut world = SceneWorld::new();
        let parent = world.spawn("parent");
        world.set_placement(parent, &Placement::at(Vec3::new(10.0, 0.0, 0.0), Quat::identity()));
        let entity = world.spawn("entity");

        world.set_placement(entity, &Placement::at(Vec3::new(1.0, 0.0, 0.0), Quat::identity()).with_parent(parent));

        assert_eq!(world.parent(entity), Some(parent));
        assert_eq!(world.pose(entity).map(|p| p.position), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(world.world_pose(entity).map(|p| p.position), Some(Vec3::new(11.0, 0.0, 0.0)));

        world.set_placement(entity, &Placement::none().detached());
        assert_eq!(world.parent(entity), None);
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut world = SceneWorld::new();
        let (root, _, barrel) = ship(&mut world);

        world.set_parent(root, Some(barrel));

        assert_eq!(world.parent(root), None);
    }

    #[test]
    fn test_activation_in_hierarchy() {
        let mut world = SceneWorld::new();
        let (root, _, barrel) = ship(&mut world);

        world.set_active(root, false);

        assert!(world.is_active_self(barrel));
        assert!(!world.is_active_in_hierarchy(barrel));
    }

    #[test]
    fn test_hierarchy_is_preorder() {
        let mut world = SceneWorld::new();
        let (root, turret, barrel) = ship(&mut world);
        let hatch = world.spawn_child(root, "hatch").unwrap();
        let mut out = Vec::new();

        world.collect_hierarchy(root, &mut out);

        assert_eq!(out, vec![root, turret, barrel, hatch]);
    }

    #[test]
    fn test_dispatcher_notifies_nested_receivers() {
        let mut world = SceneWorld::new();
        let (root, _, barrel) = ship(&mut world);
        let mut dispatcher = CallbackDispatcher::new();

        assert_eq!(dispatcher.dispatch_rent(&mut world, root), 2);
        assert_eq!(dispatcher.dispatch_return(&mut world, root), 2);

        let spinner = world.component::<Spinner>(barrel).unwrap();
        assert_eq!((spinner.rents, spinner.returns), (1, 1));
    }

    #[test]
    fn test_dispatcher_without_receivers_is_noop() {
        let mut world = SceneWorld::new();
        let rock = world.spawn("rock");
        world.add_component(rock, Health(1));

        assert_eq!(CallbackDispatcher::new().dispatch_rent(&mut world, rock), 0);
    }

    #[test]
    fn test_component_handles() {
        let mut world = SceneWorld::new();
        let entity = world.spawn("e");
        let handle = world.add_component(entity, Health(3)).unwrap();

        world.component_mut::<Health>(entity).unwrap().0 = 4;

        assert_eq!(world.resolve(handle).map(|h| h.0), Some(4));
        assert!(world.component::<Spinner>(entity).is_none());
    }
}
