use std::sync::Arc;

use parking_lot::Mutex;

use crate::actor::{Actor, ActorContext};
use crate::actor_ref::ActorRef;
use crate::context::{ContextSpec, ExecutionContext};
use crate::id::ActorId;
use crate::own::ActorOwn;
use crate::pool::ActorPool;
use crate::shared::ActorShared;

#[derive(Default)]
struct Counter {
	hangups: Arc<Mutex<Vec<u64>>>,
}

impl Actor for Counter {
	fn on_hangup(&mut self, _ctx: &mut ActorContext) {
		self.hangups.lock().push(0);
	}

	fn on_hangup_shared(&mut self, token: u64, _ctx: &mut ActorContext) {
		self.hangups.lock().push(token);
	}
}

fn context(name: &str) -> ExecutionContext {
	let _ = tracing_subscriber::fmt::try_init();
	ExecutionContext::spawn(ContextSpec::new(name).pool(Arc::new(ActorPool::new()))).expect("spawn context")
}

fn counted(ctx: &ExecutionContext) -> (ActorOwn<Counter>, Arc<Mutex<Vec<u64>>>) {
	let counter = Counter::default();
	let hangups = Arc::clone(&counter.hangups);
	(ctx.create_actor("counter", counter).expect("create actor"), hangups)
}

/// Must report every empty handle as not alive.
///
/// * Enforced in: `WeakPtr::is_alive`, `ActorId::is_alive`
/// * Failure symptom: Callers dereference a handle that was never bound.
#[cfg_attr(test, test)]
pub(crate) fn test_empty_handles_are_never_alive() {
	assert!(!ActorId::<Counter>::empty().is_alive());
	assert!(!ActorOwn::<Counter>::default().is_alive());
	assert!(!ActorShared::<Counter>::default().is_alive());
	assert!(!ActorRef::default().get().is_alive());
}

/// Must not post a hangup from a handle that was moved out of.
///
/// * Enforced in: `ActorOwn::release`, `ActorId::take`, `ActorOwn::drop`
/// * Failure symptom: Actors stop while a live owner still holds them.
#[cfg_attr(test, test)]
pub(crate) fn test_moved_from_owner_is_silent() {
	let ctx = context("moved-from");
	let (mut own, hangups) = counted(&ctx);

	let moved = ActorOwn::new(own.release());
	drop(own);
	ctx.call(|| ()).expect("flush");
	assert!(hangups.lock().is_empty());
	assert!(moved.is_alive());

	drop(moved);
	ctx.call(|| ()).expect("flush");
	assert_eq!(*hangups.lock(), [0]);
	ctx.shutdown();
}

/// Must leave an owner unchanged when it is reassigned from itself.
///
/// * Enforced in: `ActorOwn::reset`, `ActorShared::reset`
/// * Failure symptom: Self-assignment hangs up the actor it keeps owning.
#[cfg_attr(test, test)]
pub(crate) fn test_self_reassignment_is_noop() {
	let ctx = context("self-assign");
	let (mut own, hangups) = counted(&ctx);
	let id = own.get();

	let taken = std::mem::take(&mut own);
	own = taken;
	let mut shared: ActorShared<Counter> = ActorShared::from(own);
	let taken = std::mem::take(&mut shared);
	shared = taken;
	ctx.call(|| ()).expect("flush");

	assert_eq!(shared.get(), id);
	assert!(hangups.lock().is_empty());
	drop(shared);
	ctx.shutdown();
}

/// Must keep actor identity across upcasts, erasure and unchecked casts.
///
/// * Enforced in: `ActorId::upcast`, `ActorId::erase`, `ActorId::cast_unchecked`
/// * Failure symptom: Handle equality and hashing disagree for the same actor.
#[cfg_attr(test, test)]
pub(crate) fn test_casts_preserve_identity() {
	let ctx = context("casts");
	let (own, _hangups) = counted(&ctx);
	let id = own.get();

	assert_eq!(id.erase(), id.upcast());
	assert_eq!(id.erase().cast_unchecked::<Counter>(), id);
	assert_eq!(ActorRef::from(&own).get(), id.erase());

	let erased: ActorOwn = own.upcast();
	assert_eq!(erased.get(), id.erase());
	drop(erased);
	ctx.shutdown();
}

/// Must hand out at most one state guard per actor at a time.
///
/// * Enforced in: `ActorGuard::acquire`
/// * Failure symptom: Two `&mut` views of the same actor state.
#[cfg_attr(test, test)]
pub(crate) fn test_state_guard_is_exclusive() {
	let ctx = context("guard");
	let (own, _hangups) = counted(&ctx);
	let id = own.get();
	ctx.call(|| ()).expect("flush");

	let guard = id.actor_unchecked().expect("first guard");
	assert!(id.actor_unchecked().is_none());
	assert!(id.erase().actor_unchecked().is_none());
	drop(guard);
	assert!(id.actor_unchecked().is_some());

	drop(own);
	ctx.shutdown();
}
