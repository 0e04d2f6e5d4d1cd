//! Injected lifecycle hooks
//!
//! A pool's behavior is the closed set {create, on-rent, on-return,
//! on-destroy}. The factory is owned by the pool itself; the three optional
//! callbacks live here so every pool kind shares them.

use std::fmt;

/// Boxed lifecycle callback
pub type Hook<T> = Box<dyn FnMut(&mut T)>;

/// Optional callbacks run around rent, return and destruction
pub struct PoolHooks<T> {
    on_rent: Option<Hook<T>>,
    on_return: Option<Hook<T>>,
    on_destroy: Option<Hook<T>>,
}

impl<T> PoolHooks<T> {
    /// Hooks that do nothing
    pub fn new() -> Self {
        Self {
            on_rent: None,
            on_return: None,
            on_destroy: None,
        }
    }

    /// Run `hook` on every instance reused from the free list
    #[must_use]
    pub fn with_on_rent(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_rent = Some(Box::new(hook));
        self
    }

    /// Run `hook` on every instance released back to the pool
    #[must_use]
    pub fn with_on_return(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_return = Some(Box::new(hook));
        self
    }

    /// Run `hook` on every instance the pool drops while clearing
    #[must_use]
    pub fn with_on_destroy(mut self, hook: impl FnMut(&mut T) + 'static) -> Self {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    pub(crate) fn rented(&mut self, instance: &mut T) {
        if let Some(hook) = self.on_rent.as_mut() {
            hook(instance);
        }
    }

    pub(crate) fn returned(&mut self, instance: &mut T) {
        if let Some(hook) = self.on_return.as_mut() {
            hook(instance);
        }
    }

    pub(crate) fn destroyed(&mut self, instance: &mut T) {
        if let Some(hook) = self.on_destroy.as_mut() {
            hook(instance);
        }
    }
}

impl<T> Default for PoolHooks<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PoolHooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolHooks")
            .field("on_rent", &self.on_rent.is_some())
            .field("on_return", &self.on_return.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}
