//! Where a rented entity ends up

use crate::foundation::collections::Entity;
use crate::foundation::math::{Pose, Quat, Vec3};

/// How a placement affects the entity's parent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ParentChange {
    /// Leave the parent as it is
    #[default]
    Keep,
    /// Reparent under the given entity
    Attach(Entity),
    /// Move to the scene root
    Detach,
}

/// Optional parent and pose applied to an entity when it is rented
///
/// The parent change is applied before the pose. An empty placement leaves
/// the entity exactly where it was when it was returned.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    /// Pose to assign, if any
    pub pose: Option<Pose>,
    /// Parent change to apply
    pub parent: ParentChange,
}

impl Placement {
    /// Placement that changes nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// Place at a position and rotation
    pub fn at(position: Vec3, rotation: Quat) -> Self {
        Self {
            pose: Some(Pose::new(position, rotation)),
            parent: ParentChange::Keep,
        }
    }

    /// Place under a parent without touching the pose
    pub fn under(parent: Entity) -> Self {
        Self {
            pose: None,
            parent: ParentChange::Attach(parent),
        }
    }

    /// Also reparent under `parent`
    #[must_use]
    pub fn with_parent(mut self, parent: Entity) -> Self {
        self.parent = ParentChange::Attach(parent);
        self
    }

    /// Also move to the scene root
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.parent = ParentChange::Detach;
        self
    }

    /// Whether applying this placement is a no-op
    pub fn is_empty(&self) -> bool {
        self.pose.is_none() && self.parent == ParentChange::Keep
    }
}
