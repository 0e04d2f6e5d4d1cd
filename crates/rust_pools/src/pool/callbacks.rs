//! Pool callback dispatch
//!
//! Resources that want to know when they leave or re-enter a pool implement
//! [`PoolCallbackReceiver`]. Notifications reach the resource itself and every
//! nested receiver it exposes, in pre-order.
//!
//! ```text
//! dispatch(root)
//!     ├── root entity components ── receiver? ── on_rent()/on_return()
//!     │       └── nested receivers (visit_nested)
//!     └── child entities (depth-first, in hierarchy order)
//!             └── ...
//! ```

use crate::foundation::collections::Entity;
use crate::scene::SceneHost;

/// Which side of the rent/return cycle is being notified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolEvent {
    /// The resource was handed out by a pool
    Rent,
    /// The resource went back into a pool
    Return,
}

impl PoolEvent {
    /// Invoke the matching notification on a single receiver
    pub fn notify(self, receiver: &mut dyn PoolCallbackReceiver) {
        match self {
            Self::Rent => receiver.on_rent(),
            Self::Return => receiver.on_return(),
        }
    }
}

/// Capability for resources that react to being rented and returned
///
/// Both notifications default to no-ops, so an implementor only overrides
/// the side it cares about. Value pools require this trait of everything
/// they hold; an empty `impl PoolCallbackReceiver for X {}` means "nothing to
/// notify".
pub trait PoolCallbackReceiver {
    /// Called after the resource is taken out of a pool
    fn on_rent(&mut self) {}

    /// Called after the resource is put back into a pool
    fn on_return(&mut self) {}

    /// Visit nested sub-resources that also receive notifications
    ///
    /// Notifications are delivered to `self` before anything visited here.
    fn visit_nested(&mut self, _visit: &mut dyn FnMut(&mut dyn PoolCallbackReceiver)) {}
}

/// Notify `receiver` and, recursively, everything nested under it
///
/// Returns the number of receivers notified.
pub fn notify_tree(receiver: &mut dyn PoolCallbackReceiver, event: PoolEvent) -> usize {
    event.notify(receiver);
    let mut notified = 1;
    receiver.visit_nested(&mut |nested| notified += notify_tree(nested, event));
    notified
}

/// Delivers rent/return notifications to an entity and its descendants
///
/// The hierarchy walk is buffered in a scratch vector that is reused between
/// dispatches.
#[derive(Debug, Default)]
pub struct CallbackDispatcher {
    scratch: Vec<Entity>,
}

impl CallbackDispatcher {
    /// Create a dispatcher with an empty scratch buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify every receiver under `root` that it was rented
    pub fn dispatch_rent<H: SceneHost + ?Sized>(&mut self, host: &mut H, root: Entity) -> usize {
        self.dispatch(host, root, PoolEvent::Rent)
    }

    /// Notify every receiver under `root` that it was returned
    pub fn dispatch_return<H: SceneHost + ?Sized>(&mut self, host: &mut H, root: Entity) -> usize {
        self.dispatch(host, root, PoolEvent::Return)
    }

    /// Notify every receiver component of `root` and its descendants
    ///
    /// Entities are visited root first, depth-first; components in the order
    /// the host stores them. Returns the number of receivers notified.
    pub fn dispatch<H: SceneHost + ?Sized>(&mut self, host: &mut H, root: Entity, event: PoolEvent) -> usize {
        self.scratch.clear();
        host.collect_hierarchy(root, &mut self.scratch);

        let mut notified = 0;
        for &entity in &self.scratch {
            host.for_each_receiver(entity, &mut |receiver| notified += notify_tree(receiver, event));
        }
        self.scratch.clear();

        log::trace!("Dispatched {:?} to {} receivers under {:?}", event, notified, root);
        notified
    }
}
