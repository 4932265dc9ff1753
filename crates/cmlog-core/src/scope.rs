//! Scoped actor switching.
//!
//! [`ActorScope`] switches a [`CommandExecutor`]'s current actor on
//! construction and restores the previous one when dropped, so a replayed
//! command can never leak a changed identity into the rest of the tick.

use std::ops::{Deref, DerefMut};

use crate::id::ActorId;
use crate::traits::CommandExecutor;

/// Guard that holds an executor under a temporary actor identity.
///
/// Dereferences to the wrapped executor, so callers run commands
/// through the guard itself.
pub struct ActorScope<'a, E: CommandExecutor + ?Sized> {
    executor: &'a mut E,
    previous: ActorId,
}

impl<'a, E: CommandExecutor + ?Sized> ActorScope<'a, E> {
    /// Switch `executor` to `actor` until the guard is dropped.
    pub fn enter(executor: &'a mut E, actor: ActorId) -> Self {
        let previous = executor.current_actor();
        executor.set_current_actor(actor);
        Self { executor, previous }
    }

    /// The actor that will be restored on drop.
    pub fn previous(&self) -> ActorId {
        self.previous
    }
}

impl<E: CommandExecutor + ?Sized> Deref for ActorScope<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.executor
    }
}

impl<E: CommandExecutor + ?Sized> DerefMut for ActorScope<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.executor
    }
}

impl<E: CommandExecutor + ?Sized> Drop for ActorScope<'_, E> {
    fn drop(&mut self) {
        self.executor.set_current_actor(self.previous);
    }
}
