//! Deferred delivery into an actor's own execution context.
//!
//! Nothing here touches actor state: envelopes are posted to the target's
//! context queue and run there in a later turn.

use crate::actor::{Actor, ActorContext};
use crate::actor_ref::ActorRef;
use crate::context::Envelope;
use crate::id::ActorId;

/// Posts an ownership-lost notification carrying the reference's token.
///
/// Token 0 reaches [`Actor::on_hangup`], any other token
/// [`Actor::on_hangup_shared`]. Returns `false` if the target is empty, dead,
/// or its context has shut down.
pub fn send_hangup(target: impl Into<ActorRef>) -> bool {
	let target = target.into();
	post_hangup(target.get(), target.token())
}

pub(crate) fn post_hangup(target: ActorId, token: u64) -> bool {
	let Some(record) = target.record() else {
		tracing::trace!(actor = ?target, token, "actor.hangup.dead");
		return false;
	};
	tracing::trace!(actor = %record.name(), token, "actor.hangup.post");
	record.context().post(Envelope::Hangup { target: target.ptr(), token }).is_ok()
}

pub(crate) fn post_closure<F>(target: ActorId, f: F) -> bool
where
	F: FnOnce(&mut (dyn Actor + 'static), &mut ActorContext) + Send + 'static,
{
	let Some(record) = target.record() else {
		return false;
	};
	record
		.context()
		.post(Envelope::Closure {
			target: target.ptr(),
			run: Box::new(f),
		})
		.is_ok()
}
