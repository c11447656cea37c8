//! Exclusive ownership of an actor.

use crate::actor::{Actor, ActorTag, Inherits};
use crate::dispatch;
use crate::id::ActorId;

/// Sole owner of an actor.
///
/// Treat [`ActorId`] as a pointer and `ActorOwn` as its `Box`: losing the
/// owner other than through [`release`](Self::release) posts one hangup to
/// the actor. Nothing prevents a second owner for the same actor; each fires
/// its own hangup.
#[must_use = "dropping an ActorOwn hangs up the actor"]
pub struct ActorOwn<A: ?Sized + ActorTag = dyn Actor> {
	id: ActorId<A>,
}

impl<A: ?Sized + ActorTag> Default for ActorOwn<A> {
	fn default() -> Self {
		Self { id: ActorId::empty() }
	}
}

impl<A: ?Sized + ActorTag> ActorOwn<A> {
	/// Takes ownership of `id`.
	pub fn new(id: ActorId<A>) -> Self {
		Self { id }
	}

	/// Takes ownership of an id tagged with a subtype of `A`.
	pub fn from_id<B>(id: ActorId<B>) -> Self
	where
		B: Inherits<A> + ?Sized,
	{
		Self::new(id.upcast())
	}

	/// Returns `true` when nothing is owned.
	pub fn is_empty(&self) -> bool {
		self.id.is_empty()
	}

	/// Racy liveness snapshot of the owned actor.
	pub fn is_alive(&self) -> bool {
		self.id.is_alive()
	}

	/// Copy of the owned id; ownership stays here.
	pub fn get(&self) -> ActorId<A> {
		self.id
	}

	/// Hands ownership to the caller without a hangup.
	#[must_use = "the released id is the only record of ownership"]
	pub fn release(&mut self) -> ActorId<A> {
		self.id.take()
	}

	/// Replaces the owned id, hanging up the previous one if any.
	pub fn reset(&mut self, other: ActorId<A>) {
		let old = std::mem::replace(&mut self.id, other);
		if !old.is_empty() {
			dispatch::post_hangup(old.erase(), 0);
		}
	}

	/// [`reset`](Self::reset) with an id tagged with a subtype of `A`.
	pub fn reset_from<B>(&mut self, other: ActorId<B>)
	where
		B: Inherits<A> + ?Sized,
	{
		self.reset(other.upcast());
	}

	/// Posts a hangup to the owned actor while keeping ownership.
	pub fn hangup(&self) {
		if !self.id.is_empty() {
			dispatch::post_hangup(self.id.erase(), 0);
		}
	}

	/// Moves ownership into a handle tagged with a supertype of `A`.
	pub fn upcast<B>(mut self) -> ActorOwn<B>
	where
		B: ?Sized + ActorTag,
		A: Inherits<B>,
	{
		ActorOwn::new(self.release().upcast())
	}
}

impl<A: ?Sized + ActorTag> std::ops::Deref for ActorOwn<A> {
	type Target = ActorId<A>;

	fn deref(&self) -> &ActorId<A> {
		&self.id
	}
}

impl<A: ?Sized + ActorTag> Drop for ActorOwn<A> {
	fn drop(&mut self) {
		self.reset(ActorId::empty());
	}
}

impl<A: ?Sized + ActorTag> std::fmt::Debug for ActorOwn<A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("ActorOwn").field(&self.id).finish()
	}
}
