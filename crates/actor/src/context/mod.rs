//! Execution contexts.
//!
//! Each context is a dedicated OS thread draining one FIFO queue. Actors are
//! bound to exactly one context for their whole life; every hook, closure and
//! hangup for an actor runs on that thread, one envelope at a time.
//!
//! Shutdown is explicit: [`ExecutionContext::shutdown`] stops every actor still
//! bound to the context and joins the thread. Dropping an [`ExecutionContext`]
//! sends the same request and waits briefly for an ack without joining.

use std::cell::Cell;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::actor::{Actor, ActorContext};
use crate::error::ContextError;
use crate::id::ActorId;
use crate::own::ActorOwn;
use crate::pool::{ActorPool, WeakPtr};
use crate::record::ActorRecord;

mod run_loop;

use run_loop::RunLoop;

/// Identity of one execution context, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
	fn next() -> Self {
		static NEXT: AtomicU32 = AtomicU32::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}

	/// Raw numeric id.
	pub const fn get(self) -> u32 {
		self.0
	}
}

impl std::fmt::Display for ContextId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "ctx#{}", self.0)
	}
}

thread_local! {
	static CURRENT: Cell<Option<ContextId>> = const { Cell::new(None) };
}

/// Context running on the calling thread, if any.
pub fn current() -> Option<ContextId> {
	CURRENT.with(Cell::get)
}

/// Marks the calling thread as running `id` until dropped.
struct Entered {
	prev: Option<ContextId>,
}

impl Entered {
	fn enter(id: ContextId) -> Self {
		Self {
			prev: CURRENT.with(|current| current.replace(Some(id))),
		}
	}
}

impl Drop for Entered {
	fn drop(&mut self) {
		CURRENT.with(|current| current.set(self.prev));
	}
}

type ClosureFn = dyn FnOnce(&mut (dyn Actor + 'static), &mut ActorContext) + Send;

/// Start of a freshly created actor, queued on its context.
///
/// Reclaims the actor if dropped undelivered, so a queue torn down by
/// shutdown cannot leave it alive and unowned by any run loop.
pub(crate) struct StartTicket {
	target: WeakPtr,
	pool: Arc<ActorPool>,
}

impl StartTicket {
	/// Hands the actor to the run loop.
	fn accept(mut self) -> WeakPtr {
		let target = self.target;
		self.target.clear();
		target
	}
}

impl Drop for StartTicket {
	fn drop(&mut self) {
		if !self.target.is_empty() && self.pool.reclaim(self.target) {
			tracing::debug!(actor = ?self.target, "actor.start.dropped");
		}
	}
}

/// Unit of work queued on a context.
pub(crate) enum Envelope {
	Start(StartTicket),
	Hangup { target: WeakPtr, token: u64 },
	Closure { target: WeakPtr, run: Box<ClosureFn> },
	Job(Box<dyn FnOnce() + Send>),
	Shutdown { ack: Option<oneshot::Sender<()>> },
}

/// Configuration for one execution context.
#[derive(Debug, Clone)]
pub struct ContextSpec {
	pub(crate) name: String,
	pub(crate) pool: Option<Arc<ActorPool>>,
}

impl ContextSpec {
	/// Creates a spec; the name shows up in the thread name and in logs.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			pool: None,
		}
	}

	/// Places actors created on this context in `pool` instead of
	/// [`ActorPool::global`].
	#[must_use]
	pub fn pool(mut self, pool: Arc<ActorPool>) -> Self {
		self.pool = Some(pool);
		self
	}
}

/// Cloneable port into one execution context.
#[derive(Clone)]
pub struct ContextHandle {
	id: ContextId,
	name: Arc<str>,
	tx: mpsc::Sender<Envelope>,
	pool: Arc<ActorPool>,
}

impl ContextHandle {
	/// Context identity.
	pub fn id(&self) -> ContextId {
		self.id
	}

	/// Context name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Pool this context places its actors in.
	pub fn pool(&self) -> &Arc<ActorPool> {
		&self.pool
	}

	pub(crate) fn post(&self, envelope: Envelope) -> Result<(), ContextError> {
		self.tx.send(envelope).map_err(|_| ContextError::Closed)
	}

	/// Creates an actor bound to this context and takes exclusive ownership.
	///
	/// [`Actor::on_start`] runs on the context in a later turn.
	pub fn create_actor<A: Actor>(&self, name: impl Into<Arc<str>>, actor: A) -> Result<ActorOwn<A>, ContextError> {
		let name = name.into();
		let ptr = self
			.pool
			.insert(|generation| ActorRecord::new(Arc::clone(&name), generation, self.clone(), Box::new(actor)));
		self.post(Envelope::Start(StartTicket {
			target: ptr,
			pool: Arc::clone(&self.pool),
		}))?;
		tracing::trace!(actor = %name, context = %self.id, "actor.create");
		Ok(ActorOwn::new(ActorId::from_ptr(ptr)))
	}

	/// Queues `f` to run on this context.
	pub fn execute<F>(&self, f: F) -> Result<(), ContextError>
	where
		F: FnOnce() + Send + 'static,
	{
		self.post(Envelope::Job(Box::new(f)))
	}

	/// Runs `f` on this context and blocks until it returns.
	///
	/// Runs inline when called from this context. Must not be called from
	/// inside an async runtime.
	pub fn call<F, R>(&self, f: F) -> Result<R, ContextError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		if current() == Some(self.id) {
			return Ok(f());
		}
		let (reply_tx, reply_rx) = oneshot::channel();
		self.execute(move || {
			let _ = reply_tx.send(f());
		})?;
		reply_rx.blocking_recv().map_err(|_| ContextError::ReplyDropped)
	}

	/// Handle whose queue is already disconnected.
	#[cfg(test)]
	pub(crate) fn detached() -> Self {
		let (tx, _) = mpsc::channel();
		Self {
			id: ContextId::next(),
			name: "detached".into(),
			tx,
			pool: Arc::new(ActorPool::new()),
		}
	}
}

impl std::fmt::Debug for ContextHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContextHandle").field("id", &self.id).field("name", &self.name).finish_non_exhaustive()
	}
}

const SHUTDOWN_ACK_TIMEOUT: Duration = Duration::from_millis(100);

/// Owner of one execution context thread.
///
/// Derefs to its [`ContextHandle`].
pub struct ExecutionContext {
	handle: ContextHandle,
	thread: Option<thread::JoinHandle<()>>,
}

impl ExecutionContext {
	/// Starts a context thread.
	pub fn spawn(spec: ContextSpec) -> Result<Self, ContextError> {
		let (tx, rx) = mpsc::channel();
		let handle = ContextHandle {
			id: ContextId::next(),
			name: spec.name.as_str().into(),
			tx,
			pool: spec.pool.unwrap_or_else(ActorPool::global),
		};
		let run_loop = RunLoop::new(handle.clone());
		let thread = thread::Builder::new()
			.name(format!("xeno-actor-{}", spec.name))
			.spawn(move || run_loop.run(rx))?;
		Ok(Self {
			handle,
			thread: Some(thread),
		})
	}

	/// Port into this context.
	pub fn handle(&self) -> &ContextHandle {
		&self.handle
	}

	/// Stops every remaining actor and joins the context thread.
	///
	/// Called from the context itself, only requests the stop.
	pub fn shutdown(mut self) {
		let Some(thread) = self.thread.take() else {
			return;
		};
		if self.handle.post(Envelope::Shutdown { ack: None }).is_err() || current() == Some(self.handle.id) {
			return;
		}
		if thread.join().is_err() {
			tracing::warn!(context = %self.handle.id, "actor.context.join_failed");
		}
	}
}

impl std::ops::Deref for ExecutionContext {
	type Target = ContextHandle;

	fn deref(&self) -> &ContextHandle {
		&self.handle
	}
}

impl Drop for ExecutionContext {
	fn drop(&mut self) {
		if self.thread.is_none() {
			return;
		}

		let (ack_tx, mut ack_rx) = oneshot::channel();
		if self.handle.post(Envelope::Shutdown { ack: Some(ack_tx) }).is_err() || current() == Some(self.handle.id) {
			return;
		}

		let deadline = Instant::now() + SHUTDOWN_ACK_TIMEOUT;
		loop {
			match ack_rx.try_recv() {
				Ok(()) | Err(TryRecvError::Closed) => return,
				Err(TryRecvError::Empty) => {
					if Instant::now() >= deadline {
						tracing::debug!(context = %self.handle.id, "actor.context.shutdown_ack_timeout");
						return;
					}
					thread::yield_now();
				}
			}
		}
	}
}
