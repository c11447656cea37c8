//! Actor records stored in the pool.
//!
//! A record carries context-agnostic metadata (name, generation, assigned
//! context) plus the actor state. State access goes through [`ActorGuard`],
//! which holds a non-blocking borrow flag for its lifetime.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::actor::{Actor, ActorTag};
use crate::context::{ContextHandle, ContextId};

/// Boxed actor state behind a single-borrower flag.
pub(crate) struct ActorCell {
	borrowed: AtomicBool,
	actor: UnsafeCell<Box<dyn Actor>>,
}

// SAFETY: the actor is only reachable through `acquire`, which hands out at
// most one borrow at a time, and `dyn Actor` is `Send`.
unsafe impl Sync for ActorCell {}

impl ActorCell {
	fn new(actor: Box<dyn Actor>) -> Self {
		Self {
			borrowed: AtomicBool::new(false),
			actor: UnsafeCell::new(actor),
		}
	}

	/// Marks the cell borrowed. `None` while another borrow is outstanding.
	fn acquire(&self) -> Option<NonNull<dyn Actor>> {
		self.borrowed.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).ok()?;
		// SAFETY: the flag was clear, so no other reference into the box exists.
		let actor: &mut (dyn Actor + 'static) = unsafe { &mut **self.actor.get() };
		Some(NonNull::from(actor))
	}

	fn release(&self) {
		self.borrowed.store(false, Ordering::Release);
	}
}

/// Pool entry for one actor incarnation.
pub struct ActorRecord {
	name: Arc<str>,
	generation: u64,
	context: ContextHandle,
	cell: ActorCell,
}

impl ActorRecord {
	pub(crate) fn new(name: Arc<str>, generation: u64, context: ContextHandle, actor: Box<dyn Actor>) -> Self {
		Self {
			name,
			generation,
			context,
			cell: ActorCell::new(actor),
		}
	}

	/// Diagnostic name given at creation.
	pub fn name(&self) -> &str {
		&self.name
	}

	pub(crate) fn name_arc(&self) -> Arc<str> {
		Arc::clone(&self.name)
	}

	/// Generation stamp of this incarnation.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Execution context the actor is bound to.
	pub fn context_id(&self) -> ContextId {
		self.context.id()
	}

	pub(crate) fn context(&self) -> &ContextHandle {
		&self.context
	}
}

impl std::fmt::Debug for ActorRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActorRecord")
			.field("name", &self.name)
			.field("generation", &self.generation)
			.field("context", &self.context.id())
			.finish_non_exhaustive()
	}
}

/// Exclusive access to an actor's state, projected to tag `A`.
///
/// Keeps the record alive and the borrow flag set until dropped. Not `Send`:
/// the guard stays on the thread that acquired it.
pub struct ActorGuard<A: ?Sized + ActorTag> {
	record: Arc<ActorRecord>,
	actor: NonNull<A>,
	_not_send: PhantomData<*mut A>,
}

impl<A: ?Sized + ActorTag> ActorGuard<A> {
	/// Borrows the record's actor and projects it to `A`.
	///
	/// Returns `None` when the actor is already borrowed or is not an `A`.
	pub(crate) fn acquire(record: Arc<ActorRecord>) -> Option<Self> {
		let raw = record.cell.acquire()?;
		// SAFETY: `acquire` granted the only borrow; it ends in `Drop` or below.
		let actor = unsafe { &mut *raw.as_ptr() };
		match A::project(actor) {
			Some(actor) => Some(Self {
				actor: NonNull::from(actor),
				record,
				_not_send: PhantomData,
			}),
			None => {
				record.cell.release();
				None
			}
		}
	}

	/// Record the guarded actor belongs to.
	pub fn record(&self) -> &ActorRecord {
		&self.record
	}
}

impl<A: ?Sized + ActorTag> Deref for ActorGuard<A> {
	type Target = A;

	fn deref(&self) -> &A {
		// SAFETY: the borrow flag is held and `record` keeps the box alive.
		unsafe { self.actor.as_ref() }
	}
}

impl<A: ?Sized + ActorTag> DerefMut for ActorGuard<A> {
	fn deref_mut(&mut self) -> &mut A {
		// SAFETY: as in `deref`; `&mut self` makes this the only live reference.
		unsafe { self.actor.as_mut() }
	}
}

impl<A: ?Sized + ActorTag> Drop for ActorGuard<A> {
	fn drop(&mut self) {
		self.record.cell.release();
	}
}
