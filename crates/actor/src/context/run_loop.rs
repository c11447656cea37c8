use std::any::Any;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::thread;

use super::{ClosureFn, ContextHandle, Entered, Envelope};
use crate::actor::{Actor, ActorContext};
use crate::id::ActorId;
use crate::pool::WeakPtr;
use crate::record::ActorGuard;

/// Extracts the message from a caught panic payload.
pub(super) fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(s) = payload.downcast_ref::<&str>() {
		return Some((*s).to_string());
	}
	payload.downcast_ref::<String>().cloned()
}

/// Single-threaded envelope loop for one context.
pub(super) struct RunLoop {
	handle: ContextHandle,
	actors: HashSet<WeakPtr>,
}

impl RunLoop {
	pub(super) fn new(handle: ContextHandle) -> Self {
		Self {
			handle,
			actors: HashSet::new(),
		}
	}

	pub(super) fn run(mut self, rx: mpsc::Receiver<Envelope>) {
		let _entered = Entered::enter(self.handle.id());
		tracing::debug!(context = %self.handle.id(), name = self.handle.name(), "actor.context.start");

		let mut ack = None;
		while let Ok(envelope) = rx.recv() {
			match envelope {
				Envelope::Start(ticket) => {
					let target = ticket.accept();
					self.actors.insert(target);
					if self.turn(target, |actor, ctx| actor.on_start(ctx)).is_err() {
						let run: Box<ClosureFn> =
							Box::new(|actor: &mut (dyn Actor + 'static), ctx: &mut ActorContext| actor.on_start(ctx));
						self.requeue(Envelope::Closure { target, run });
					}
				}
				Envelope::Hangup { target, token } => {
					let hangup = move |actor: &mut (dyn Actor + 'static), ctx: &mut ActorContext| {
						if token == 0 {
							actor.on_hangup(ctx);
						} else {
							actor.on_hangup_shared(token, ctx);
						}
					};
					if self.turn(target, hangup).is_err() {
						self.requeue(Envelope::Hangup { target, token });
					}
				}
				Envelope::Closure { target, run } => {
					if let Err(run) = self.turn(target, run) {
						self.requeue(Envelope::Closure { target, run });
					}
				}
				Envelope::Job(job) => {
					if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
						tracing::error!(
							context = %self.handle.id(),
							panic = panic_message(&*payload).as_deref().unwrap_or("<unknown panic>"),
							"actor.context.job_panicked"
						);
					}
				}
				Envelope::Shutdown { ack: reply } => {
					ack = reply;
					break;
				}
			}
		}

		// Actors created after the shutdown request still have a queued start.
		for envelope in rx.try_iter() {
			if let Envelope::Start(ticket) = envelope {
				self.actors.insert(ticket.accept());
			}
		}
		drop(rx);

		for target in std::mem::take(&mut self.actors) {
			let Some(guard) = target.resolve().and_then(ActorGuard::<dyn Actor>::acquire) else {
				continue;
			};
			let mut ctx = ActorContext::new(ActorId::from_ptr(target), self.handle.clone());
			ctx.stop();
			self.finish(target, guard, &mut ctx);
		}

		tracing::debug!(context = %self.handle.id(), "actor.context.exit");
		if let Some(ack) = ack {
			let _ = ack.send(());
		}
	}

	/// Runs one hook for `target`, then stops it if the hook asked to.
	///
	/// Hands `f` back when the actor's state is borrowed elsewhere. Dead or
	/// foreign targets consume it.
	fn turn<F>(&mut self, target: WeakPtr, f: F) -> Result<(), F>
	where
		F: FnOnce(&mut (dyn Actor + 'static), &mut ActorContext),
	{
		let Some(record) = target.resolve() else {
			self.actors.remove(&target);
			tracing::trace!(actor = ?target, "actor.turn.dead");
			return Ok(());
		};
		if record.context_id() != self.handle.id() {
			tracing::warn!(actor = record.name(), context = %self.handle.id(), "actor.turn.foreign");
			return Ok(());
		}
		let name = record.name_arc();
		let Some(mut actor) = ActorGuard::<dyn Actor>::acquire(record) else {
			tracing::trace!(actor = %name, "actor.turn.busy");
			return Err(f);
		};

		let mut ctx = ActorContext::new(ActorId::from_ptr(target), self.handle.clone());
		if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(&mut *actor, &mut ctx))) {
			tracing::error!(
				actor = %name,
				panic = panic_message(&*payload).as_deref().unwrap_or("<unknown panic>"),
				"actor.panicked"
			);
			drop(actor);
			self.reclaim(target);
			return Ok(());
		}
		if ctx.is_stopping() {
			self.finish(target, actor, &mut ctx);
		}
		Ok(())
	}

	/// Puts an envelope for a busy actor back at the end of the queue.
	fn requeue(&self, envelope: Envelope) {
		thread::yield_now();
		if self.handle.post(envelope).is_err() {
			tracing::warn!(context = %self.handle.id(), "actor.turn.requeue_failed");
		}
	}

	/// Runs `on_stop` and returns the slot to the pool.
	fn finish(&mut self, target: WeakPtr, mut actor: ActorGuard<dyn Actor>, ctx: &mut ActorContext) {
		let name = actor.record().name_arc();
		if let Err(payload) = catch_unwind(AssertUnwindSafe(|| actor.on_stop(ctx))) {
			tracing::error!(
				actor = %name,
				panic = panic_message(&*payload).as_deref().unwrap_or("<unknown panic>"),
				"actor.on_stop.panicked"
			);
		}
		drop(actor);
		self.reclaim(target);
		tracing::debug!(actor = %name, context = %self.handle.id(), "actor.stop");
	}

	fn reclaim(&mut self, target: WeakPtr) {
		self.actors.remove(&target);
		self.handle.pool().reclaim(target);
	}
}
