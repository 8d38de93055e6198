//! Scope Module
//!
//! A depth-counted active region and the RAII guard used to enter it.
//! Scopes nest: every enter must be paired with an exit, and only the exit
//! that brings the depth back to zero ends the region.

use std::ops::{Deref, DerefMut};

use crate::error::ScopeError;

// == Region ==
/// Depth counter behind a scoped cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Region {
    depth: usize,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn enter(&mut self) {
        self.depth += 1;
    }

    /// Leaves one level. Returns `true` only when this exit closed the
    /// outermost level; exiting an inactive region does nothing.
    pub fn exit(&mut self) -> bool {
        match self.depth {
            0 => false,
            1 => {
                self.depth = 0;
                true
            }
            _ => {
                self.depth -= 1;
                false
            }
        }
    }

    /// Drops straight back to inactive, returning the depth it was at.
    pub fn reset(&mut self) -> usize {
        std::mem::take(&mut self.depth)
    }
}

// == Scoped ==
/// Caches that hold state only while a scope is active.
pub trait Scoped {
    fn enter(&mut self);

    /// Closes one level; the outermost exit discards scope state.
    fn exit(&mut self);

    fn depth(&self) -> usize;

    fn is_active(&self) -> bool {
        self.depth() > 0
    }

    /// Fails if a scope is still open.
    ///
    /// On failure the scope state is discarded and the region reset, so the
    /// stale state cannot leak into later work.
    fn check_exited(&mut self) -> Result<(), ScopeError>;

    /// Enters a scope that is exited when the guard drops.
    fn scope(&mut self) -> Scope<'_, Self>
    where
        Self: Sized,
    {
        Scope::new(self)
    }
}

// == Scope Guard ==
/// Keeps a scope open for its lifetime and dereferences to the cache.
///
/// The exit runs on every path out of the guard, including unwinding.
#[derive(Debug)]
pub struct Scope<'a, C: Scoped> {
    cache: &'a mut C,
}

impl<'a, C: Scoped> Scope<'a, C> {
    fn new(cache: &'a mut C) -> Self {
        cache.enter();
        Self { cache }
    }
}

impl<C: Scoped> Deref for Scope<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.cache
    }
}

impl<C: Scoped> DerefMut for Scope<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.cache
    }
}

impl<C: Scoped> Drop for Scope<'_, C> {
    fn drop(&mut self) {
        self.cache.exit();
    }
}
