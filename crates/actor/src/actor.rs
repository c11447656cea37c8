//! Actor base trait and compile-time handle tags.

use std::any::Any;

use crate::context::ContextHandle;
use crate::id::ActorId;

/// Actor behavior hooks, run on the actor's own execution context.
///
/// Every hook receives the [`ActorContext`] for the current turn. Hooks are
/// never invoked inline from a foreign context.
pub trait Actor: Any + Send {
	/// Runs once on the actor's context before any other hook.
	fn on_start(&mut self, _ctx: &mut ActorContext) {}

	/// The exclusive owner (or a token-0 shared owner) went away.
	///
	/// Stops the actor unless overridden.
	fn on_hangup(&mut self, ctx: &mut ActorContext) {
		ctx.stop();
	}

	/// A shared owner holding `token` went away.
	fn on_hangup_shared(&mut self, _token: u64, _ctx: &mut ActorContext) {}

	/// Runs once after a stop was requested, before the pool reclaims the actor.
	fn on_stop(&mut self, _ctx: &mut ActorContext) {}
}

/// Compile-time tag carried by handles.
///
/// The tag only gates which handle conversions type-check. State access
/// projects the erased actor to the tag and yields nothing on mismatch.
pub trait ActorTag: 'static {
	/// Projects an erased actor to this tag.
	fn project<'a>(actor: &'a mut (dyn Actor + 'static)) -> Option<&'a mut Self>;
}

impl ActorTag for dyn Actor {
	fn project<'a>(actor: &'a mut (dyn Actor + 'static)) -> Option<&'a mut Self> {
		Some(actor)
	}
}

impl<A: Actor> ActorTag for A {
	fn project<'a>(actor: &'a mut (dyn Actor + 'static)) -> Option<&'a mut Self> {
		(actor as &mut dyn Any).downcast_mut::<A>()
	}
}

/// `Self` may be addressed through handles tagged `Base`.
///
/// Drives [`ActorId::upcast`] and the cross-tag constructors of the owning
/// handles. Every tag inherits itself and every concrete actor inherits
/// `dyn Actor`; applications declare further edges for their own hierarchies.
pub trait Inherits<Base: ?Sized + ActorTag>: ActorTag {}

impl<T: ?Sized + ActorTag> Inherits<T> for T {}

impl<A: Actor> Inherits<dyn Actor> for A {}

/// Per-turn context handed to actor hooks.
pub struct ActorContext {
	id: ActorId,
	context: ContextHandle,
	stopping: bool,
}

impl ActorContext {
	pub(crate) fn new(id: ActorId, context: ContextHandle) -> Self {
		Self { id, context, stopping: false }
	}

	/// Weak handle to the actor running this turn.
	pub fn self_id(&self) -> ActorId {
		self.id
	}

	/// Execution context the actor runs on.
	pub fn context(&self) -> &ContextHandle {
		&self.context
	}

	/// Requests that the actor stop once the current hook returns.
	pub fn stop(&mut self) {
		self.stopping = true;
	}

	/// Returns whether a stop has been requested this turn.
	pub fn is_stopping(&self) -> bool {
		self.stopping
	}
}
