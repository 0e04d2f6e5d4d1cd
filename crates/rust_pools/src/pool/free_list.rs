//! LIFO free list with a disposal guard

use super::error::{PoolError, PoolResult};

/// Stack of idle instances shared by every pool kind
///
/// The most recently pushed instance is the next one handed out. Once
/// disposed, [`FreeList::ensure_live`] fails for good.
#[derive(Debug)]
pub struct FreeList<T> {
    items: Vec<T>,
    disposed: bool,
    owner: &'static str,
}

impl<T> FreeList<T> {
    /// Create an empty free list for the pool kind named `owner`
    pub fn with_capacity(owner: &'static str, capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            disposed: false,
            owner,
        }
    }

    /// Fail with [`PoolError::Disposed`] once the owning pool is disposed
    pub fn ensure_live(&self) -> PoolResult<()> {
        if self.disposed {
            Err(PoolError::Disposed { pool: self.owner })
        } else {
            Ok(())
        }
    }

    /// Push an idle instance
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Pop the most recently pushed instance
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Number of idle instances
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no instance is idle
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the owning pool has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Mark the owning pool as disposed
    pub fn mark_disposed(&mut self) {
        self.disposed = true;
    }

    /// Name of the owning pool kind, for logs and errors
    pub fn owner(&self) -> &'static str {
        self.owner
    }
}
