//! Slot + generation arena backing every actor handle.
//!
//! Slots are allocated once and never returned to the allocator, so a
//! [`WeakPtr`] can always be checked against its slot without dangling. A
//! slot is reused after [`ActorPool::reclaim`]; the generation stamp makes
//! every pointer issued for the previous occupant read as dead.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::record::ActorRecord;

/// Generation stored in a slot that holds no record.
const VACANT: u64 = 0;

/// Monotonic generation clock for slot occupants.
#[derive(Debug, Default)]
struct GenerationClock {
	next: AtomicU64,
}

impl GenerationClock {
	/// Returns the next generation ID. Never returns [`VACANT`].
	fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

struct Slot {
	/// Pool that leaked this slot; only it may reclaim or reuse it.
	owner: u64,
	generation: AtomicU64,
	record: ArcSwapOption<ActorRecord>,
}

impl Slot {
	fn leak(owner: u64) -> &'static Slot {
		Box::leak(Box::new(Slot {
			owner,
			generation: AtomicU64::new(VACANT),
			record: ArcSwapOption::empty(),
		}))
	}
}

/// Weak pointer into an [`ActorPool`] slot.
///
/// Cheap to copy and compare. Validity is a generation match, checked on
/// every access; a stale pointer resolves to nothing.
#[derive(Clone, Copy, Default)]
pub struct WeakPtr {
	slot: Option<&'static Slot>,
	generation: u64,
}

impl WeakPtr {
	/// The pointer that was never issued.
	pub const EMPTY: WeakPtr = WeakPtr { slot: None, generation: 0 };

	/// Returns `true` if this pointer was never issued or has been cleared.
	pub fn is_empty(&self) -> bool {
		self.slot.is_none()
	}

	/// Resets to the empty pointer.
	pub fn clear(&mut self) {
		*self = Self::EMPTY;
	}

	/// Racy liveness snapshot. `true` only means the slot still carried this
	/// generation at the instant of the load.
	pub fn is_alive(&self) -> bool {
		self.slot.is_some_and(|slot| slot.generation.load(Ordering::Acquire) == self.generation)
	}

	/// Generation stamp, or 0 for the empty pointer.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Resolves the record if the slot still holds this generation.
	pub(crate) fn resolve(&self) -> Option<Arc<ActorRecord>> {
		let record = self.slot?.record.load_full()?;
		(record.generation() == self.generation).then_some(record)
	}

	fn slot_addr(&self) -> usize {
		self.slot.map_or(0, |slot| slot as *const Slot as usize)
	}
}

impl PartialEq for WeakPtr {
	fn eq(&self, other: &Self) -> bool {
		self.slot_addr() == other.slot_addr() && self.generation == other.generation
	}
}

impl Eq for WeakPtr {}

impl Hash for WeakPtr {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.slot_addr().hash(state);
		self.generation.hash(state);
	}
}

impl std::fmt::Debug for WeakPtr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.is_empty() {
			return f.write_str("WeakPtr(empty)");
		}
		write!(f, "WeakPtr({:#x}@{})", self.slot_addr(), self.generation)
	}
}

/// Arena of actor records addressed by slot + generation.
pub struct ActorPool {
	id: u64,
	free: Mutex<Vec<&'static Slot>>,
	clock: GenerationClock,
	live: AtomicUsize,
}

impl ActorPool {
	/// Creates an empty pool.
	pub fn new() -> Self {
		static NEXT_POOL: AtomicU64 = AtomicU64::new(1);
		Self {
			id: NEXT_POOL.fetch_add(1, Ordering::Relaxed),
			free: Mutex::new(Vec::new()),
			clock: GenerationClock::default(),
			live: AtomicUsize::new(0),
		}
	}

	/// Process-wide pool used by contexts that do not configure their own.
	pub fn global() -> Arc<ActorPool> {
		static GLOBAL: OnceLock<Arc<ActorPool>> = OnceLock::new();
		Arc::clone(GLOBAL.get_or_init(|| Arc::new(ActorPool::new())))
	}

	/// Number of records currently published.
	pub fn live(&self) -> usize {
		self.live.load(Ordering::Acquire)
	}

	/// Publishes a record built for a fresh generation and returns its pointer.
	pub(crate) fn insert(&self, build: impl FnOnce(u64) -> ActorRecord) -> WeakPtr {
		let slot = self.free.lock().pop().unwrap_or_else(|| Slot::leak(self.id));
		let generation = self.clock.next();
		slot.record.store(Some(Arc::new(build(generation))));
		slot.generation.store(generation, Ordering::Release);
		self.live.fetch_add(1, Ordering::AcqRel);
		tracing::trace!(generation, "actor.pool.insert");
		WeakPtr {
			slot: Some(slot),
			generation,
		}
	}

	/// Retires the record `ptr` points at.
	///
	/// Returns `false` if `ptr` is empty, already stale, or was issued by
	/// another pool. The record itself is
	/// dropped once the last outstanding [`ActorGuard`](crate::ActorGuard) on it
	/// goes away.
	pub fn reclaim(&self, ptr: WeakPtr) -> bool {
		let Some(slot) = ptr.slot else {
			return false;
		};
		if slot.owner != self.id {
			tracing::warn!(generation = ptr.generation, "actor.pool.reclaim_foreign");
			return false;
		}
		if slot
			.generation
			.compare_exchange(ptr.generation, VACANT, Ordering::AcqRel, Ordering::Acquire)
			.is_err()
		{
			return false;
		}
		slot.record.store(None);
		self.live.fetch_sub(1, Ordering::AcqRel);
		self.free.lock().push(slot);
		tracing::trace!(generation = ptr.generation, "actor.pool.reclaim");
		true
	}
}

impl Default for ActorPool {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ActorPool {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ActorPool")
			.field("id", &self.id)
			.field("live", &self.live())
			.finish_non_exhaustive()
	}
}
