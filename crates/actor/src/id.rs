//! Weak, copyable actor handle.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::actor::{Actor, ActorContext, ActorTag, Inherits};
use crate::context::{self, ContextId};
use crate::pool::WeakPtr;
use crate::record::{ActorGuard, ActorRecord};

/// Non-owning handle to an actor, tagged with actor type `A`.
///
/// Treat it as a pointer: copying and comparing never touch actor state and
/// are safe from any thread. The actor may die at any time; every accessor
/// then degrades to "not alive" or `None`.
pub struct ActorId<A: ?Sized = dyn Actor> {
	ptr: WeakPtr,
	_tag: PhantomData<fn() -> *const A>,
}

impl<A: ?Sized> Clone for ActorId<A> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<A: ?Sized> Copy for ActorId<A> {}

impl<A: ?Sized> Default for ActorId<A> {
	fn default() -> Self {
		Self::empty()
	}
}

impl<A: ?Sized> ActorId<A> {
	/// The empty handle.
	pub const fn empty() -> Self {
		Self::from_ptr(WeakPtr::EMPTY)
	}

	/// Wraps a pool-issued weak pointer.
	pub const fn from_ptr(ptr: WeakPtr) -> Self {
		Self { ptr, _tag: PhantomData }
	}

	/// Underlying weak pointer.
	pub fn ptr(&self) -> WeakPtr {
		self.ptr
	}

	/// Returns `true` for the empty handle.
	pub fn is_empty(&self) -> bool {
		self.ptr.is_empty()
	}

	/// Resets to the empty handle.
	pub fn clear(&mut self) {
		self.ptr.clear();
	}

	/// Moves the handle out, leaving this one empty.
	#[must_use]
	pub fn take(&mut self) -> Self {
		std::mem::take(self)
	}

	/// Racy liveness snapshot; `true` says nothing about the next access.
	pub fn is_alive(&self) -> bool {
		self.ptr.is_alive()
	}

	/// Resolves the actor record without any context check.
	///
	/// Only the metadata on [`ActorRecord`] is meaningful off-context.
	pub fn record(&self) -> Option<Arc<ActorRecord>> {
		self.ptr.resolve()
	}

	/// Diagnostic name; readable from any context.
	pub fn name(&self) -> Option<Arc<str>> {
		self.record().map(|record| record.name_arc())
	}

	/// Execution context the actor is bound to, while it is alive.
	pub fn context_id(&self) -> Option<ContextId> {
		self.record().map(|record| record.context_id())
	}

	/// Reinterprets the tag without any check.
	///
	/// The caller asserts the actor really is a `B`. A wrong tag is not
	/// unsound; state accessors on the result return `None`.
	pub fn cast_unchecked<B: ?Sized>(self) -> ActorId<B> {
		ActorId::from_ptr(self.ptr)
	}
}

impl<A: ?Sized + ActorTag> ActorId<A> {
	/// Converts to a handle tagged with a supertype of `A`.
	pub fn upcast<B>(self) -> ActorId<B>
	where
		B: ?Sized + ActorTag,
		A: Inherits<B>,
	{
		ActorId::from_ptr(self.ptr)
	}

	/// Converts to the type-erased handle.
	pub fn erase(self) -> ActorId {
		ActorId::from_ptr(self.ptr)
	}

	/// Borrows the actor state without checking the calling context.
	///
	/// Only valid from the actor's own context for anything beyond metadata.
	/// Returns `None` if the actor is dead, already borrowed, or not an `A`.
	/// While the guard is held, hooks, closures and hangups for the actor stay
	/// queued on its context and run once the guard is dropped.
	pub fn actor_unchecked(&self) -> Option<ActorGuard<A>> {
		ActorGuard::acquire(self.record()?)
	}

	/// Borrows the actor state if this thread is running the actor's context.
	///
	/// Off-context callers get `None` even while the actor is alive.
	pub fn try_actor(&self) -> Option<ActorGuard<A>> {
		let record = self.record()?;
		if context::current() != Some(record.context_id()) {
			return None;
		}
		ActorGuard::acquire(record)
	}

	/// Runs `f` against the actor on its own context in a later turn.
	///
	/// Returns `false` if the actor is dead or its context is gone. A closure
	/// whose target died, or does not project to `A`, is dropped at delivery.
	pub fn send_closure<F>(&self, f: F) -> bool
	where
		F: FnOnce(&mut A, &mut ActorContext) + Send + 'static,
	{
		crate::dispatch::post_closure(self.erase(), move |actor, ctx| {
			if let Some(actor) = A::project(actor) {
				f(actor, ctx);
			} else {
				tracing::trace!(actor = ?ctx.self_id(), "actor.closure.tag_mismatch");
			}
		})
	}
}

impl<A: ?Sized> PartialEq for ActorId<A> {
	fn eq(&self, other: &Self) -> bool {
		self.ptr == other.ptr
	}
}

impl<A: ?Sized> Eq for ActorId<A> {}

impl<A: ?Sized> Hash for ActorId<A> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.ptr.hash(state);
	}
}

impl<A: ?Sized> std::fmt::Debug for ActorId<A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("ActorId").field(&self.ptr).finish()
	}
}
