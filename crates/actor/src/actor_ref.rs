//! Type-erased reference used where the actor type does not matter.

use crate::actor::{Actor, ActorTag};
use crate::id::ActorId;
use crate::own::ActorOwn;
use crate::shared::ActorShared;

/// Erased id plus the token a hangup through it would carry.
///
/// Built from weak ids (token 0) or by reference from owning handles, so
/// forming one never gives up ownership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActorRef {
	id: ActorId,
	token: u64,
}

impl ActorRef {
	pub fn get(&self) -> ActorId {
		self.id
	}

	pub fn token(&self) -> u64 {
		self.token
	}
}

impl<A: ?Sized + ActorTag> From<ActorId<A>> for ActorRef {
	fn from(id: ActorId<A>) -> Self {
		Self { id: id.erase(), token: 0 }
	}
}

impl<A: ?Sized + ActorTag> From<&ActorId<A>> for ActorRef {
	fn from(id: &ActorId<A>) -> Self {
		Self::from(*id)
	}
}

impl<A: ?Sized + ActorTag> From<&ActorOwn<A>> for ActorRef {
	fn from(own: &ActorOwn<A>) -> Self {
		Self::from(own.get())
	}
}

impl<A: ?Sized + ActorTag> From<&ActorShared<A>> for ActorRef {
	fn from(shared: &ActorShared<A>) -> Self {
		Self {
			id: shared.get().erase(),
			token: shared.token(),
		}
	}
}

impl From<ActorRef> for ActorId<dyn Actor> {
	fn from(actor_ref: ActorRef) -> Self {
		actor_ref.id
	}
}
