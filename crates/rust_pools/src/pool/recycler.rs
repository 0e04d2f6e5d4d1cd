//! Rent/return bookkeeping shared by the value pools
//!
//! [`ObjectPool`](super::ObjectPool) and
//! [`AsyncObjectPool`](super::AsyncObjectPool) differ only in how a miss
//! creates an instance. Everything that happens to an instance that already
//! exists is implemented once here.

use super::callbacks::{notify_tree, PoolCallbackReceiver, PoolEvent};
use super::error::PoolResult;
use super::free_list::FreeList;
use super::hooks::PoolHooks;

/// Free list plus the hooks applied to its entries
pub(crate) struct Recycler<T> {
    free: FreeList<T>,
    hooks: PoolHooks<T>,
}

impl<T> Recycler<T> {
    pub(crate) fn new(free: FreeList<T>, hooks: PoolHooks<T>) -> Self {
        Self { free, hooks }
    }

    pub(crate) fn count(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.free.is_disposed()
    }
}

impl<T: PoolCallbackReceiver> Recycler<T> {
    pub(crate) fn ensure_live(&self) -> PoolResult<()> {
        self.free.ensure_live()
    }

    /// Take the most recently returned instance, if any
    ///
    /// Reused instances get the `on_rent` hook, then the rent dispatch.
    pub(crate) fn take(&mut self) -> PoolResult<Option<T>> {
        self.free.ensure_live()?;
        let Some(mut instance) = self.free.pop() else {
            return Ok(None);
        };

        self.hooks.rented(&mut instance);
        Self::notify(&mut instance, PoolEvent::Rent);
        log::trace!("{} reused an instance, {} left idle", self.free.owner(), self.free.len());
        Ok(Some(instance))
    }

    /// Put a rented instance back: `on_return` hook, return dispatch, push
    pub(crate) fn give_back(&mut self, mut instance: T) -> PoolResult<()> {
        self.free.ensure_live()?;
        self.hooks.returned(&mut instance);
        Self::notify(&mut instance, PoolEvent::Return);
        self.free.push(instance);
        Ok(())
    }

    /// Store a freshly created instance; only the return dispatch fires
    pub(crate) fn stash_prewarmed(&mut self, mut instance: T) {
        Self::notify(&mut instance, PoolEvent::Return);
        self.free.push(instance);
    }

    /// Drop every idle instance, running `on_destroy` on each
    pub(crate) fn clear(&mut self) -> PoolResult<usize> {
        self.free.ensure_live()?;
        let mut destroyed = 0;
        while let Some(mut instance) = self.free.pop() {
            self.hooks.destroyed(&mut instance);
            destroyed += 1;
        }
        log::debug!("{} cleared {} idle instances", self.free.owner(), destroyed);
        Ok(destroyed)
    }

    pub(crate) fn dispose(&mut self) -> PoolResult<()> {
        self.clear()?;
        self.free.mark_disposed();
        log::debug!("{} disposed", self.free.owner());
        Ok(())
    }

    fn notify(instance: &mut T, event: PoolEvent) {
        notify_tree(instance, event);
    }
}
