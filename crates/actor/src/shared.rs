//! Shared ownership of an actor, tagged with a caller-chosen token.

use crate::actor::{Actor, ActorTag, Inherits};
use crate::dispatch;
use crate::id::ActorId;
use crate::own::ActorOwn;

/// One of possibly many owners of an actor.
///
/// Losing the owner posts a hangup carrying its token, so the actor can tell
/// its owners apart. Token 0 is delivered like an exclusive hangup; any other
/// token reaches [`Actor::on_hangup_shared`].
#[must_use = "dropping an ActorShared hangs up the actor"]
pub struct ActorShared<A: ?Sized + ActorTag = dyn Actor> {
	id: ActorId<A>,
	token: u64,
}

impl<A: ?Sized + ActorTag> Default for ActorShared<A> {
	fn default() -> Self {
		Self {
			id: ActorId::empty(),
			token: 0,
		}
	}
}

impl<A: ?Sized + ActorTag> ActorShared<A> {
	/// Shares ownership of `id` under `token`.
	pub fn new(id: ActorId<A>, token: u64) -> Self {
		Self { id, token }
	}

	/// Shares ownership of an id tagged with a subtype of `A`.
	pub fn from_id<B>(id: ActorId<B>, token: u64) -> Self
	where
		B: Inherits<A> + ?Sized,
	{
		Self::new(id.upcast(), token)
	}

	pub fn is_empty(&self) -> bool {
		self.id.is_empty()
	}

	pub fn is_alive(&self) -> bool {
		self.id.is_alive()
	}

	/// Copy of the shared id; ownership stays here.
	pub fn get(&self) -> ActorId<A> {
		self.id
	}

	/// Token delivered with this owner's hangup.
	pub fn token(&self) -> u64 {
		self.token
	}

	/// Gives up ownership without a hangup. The token is kept.
	#[must_use = "the released id is the only record of ownership"]
	pub fn release(&mut self) -> ActorId<A> {
		self.id.take()
	}

	/// Replaces the shared id, hanging up the previous one with the current
	/// token. The token itself does not change.
	pub fn reset(&mut self, other: ActorId<A>) {
		let old = std::mem::replace(&mut self.id, other);
		if !old.is_empty() {
			dispatch::post_hangup(old.erase(), self.token);
		}
	}

	/// [`reset`](Self::reset) with an id tagged with a subtype of `A`.
	pub fn reset_from<B>(&mut self, other: ActorId<B>)
	where
		B: Inherits<A> + ?Sized,
	{
		self.reset(other.upcast());
	}

	/// Posts this owner's hangup while keeping ownership.
	pub fn hangup(&self) {
		if !self.id.is_empty() {
			dispatch::post_hangup(self.id.erase(), self.token);
		}
	}

	/// Moves ownership into a handle tagged with a supertype of `A`.
	pub fn upcast<B>(mut self) -> ActorShared<B>
	where
		B: ?Sized + ActorTag,
		A: Inherits<B>,
	{
		ActorShared::new(self.release().upcast(), self.token)
	}
}

impl<A, B> From<ActorOwn<B>> for ActorShared<A>
where
	A: ?Sized + ActorTag,
	B: ?Sized + Inherits<A>,
{
	/// Converts exclusive ownership of `B` into a token-0 shared owner of a
	/// supertype `A`. No hangup is posted by the conversion itself.
	fn from(mut own: ActorOwn<B>) -> Self {
		Self::from_id(own.release(), 0)
	}
}

impl<A: ?Sized + ActorTag> std::ops::Deref for ActorShared<A> {
	type Target = ActorId<A>;

	fn deref(&self) -> &ActorId<A> {
		&self.id
	}
}

impl<A: ?Sized + ActorTag> Drop for ActorShared<A> {
	fn drop(&mut self) {
		self.reset(ActorId::empty());
	}
}

impl<A: ?Sized + ActorTag> std::fmt::Debug for ActorShared<A> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActorShared").field("id", &self.id).field("token", &self.token).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Leaf;
	impl Actor for Leaf {}

	#[test]
	fn release_keeps_token() {
		let mut shared = ActorShared::<Leaf>::new(ActorId::empty(), 9);
		let _ = shared.release();
		assert!(shared.is_empty());
		assert_eq!(shared.token(), 9);
		shared.reset(ActorId::empty());
		assert_eq!(shared.token(), 9);
	}

	#[test]
	fn converted_owner_carries_token_zero() {
		let shared: ActorShared<Leaf> = ActorOwn::<Leaf>::default().into();
		assert_eq!(shared.token(), 0);
		assert!(shared.is_empty());
		let erased: ActorShared = shared.upcast();
		assert_eq!(erased.token(), 0);
	}

	#[test]
	fn owner_converts_across_tags() {
		let erased: ActorShared = ActorShared::from(ActorOwn::<Leaf>::default());
		assert!(erased.is_empty());
		assert_eq!(erased.token(), 0);
	}
}
