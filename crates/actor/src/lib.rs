//! Actor handles with explicit ownership and context affinity.
//!
//! Four handle kinds sit over one pool of generation-stamped actor slots:
//!
//! * [`ActorId`]: weak, copyable, safe to compare and test for liveness from
//!   anywhere.
//! * [`ActorOwn`]: sole owner; losing it posts one hangup to the actor.
//! * [`ActorShared`]: one of many owners; its hangup carries a token.
//! * [`ActorRef`]: type-erased id plus token, for code that does not care
//!   about the actor type.
//!
//! Actors live on an [`ExecutionContext`], a dedicated thread that runs
//! every hook, closure and hangup for its actors one turn at a time. State
//! access through a handle is only granted on that thread.

/// Actor trait, per-turn context and handle tags.
pub mod actor;
/// Type-erased handle.
pub mod actor_ref;
/// Execution context threads and their handles.
pub mod context;
/// Hangup delivery.
pub mod dispatch;
/// Context errors.
pub mod error;
/// Weak handle.
pub mod id;
/// Exclusive owner.
pub mod own;
/// Slot arena with generation checks.
pub mod pool;
/// Actor records and state guards.
pub mod record;
/// Shared owner with token.
pub mod shared;

#[cfg(test)]
mod invariants;

pub use actor::{Actor, ActorContext, ActorTag, Inherits};
pub use actor_ref::ActorRef;
pub use context::{ContextHandle, ContextId, ContextSpec, ExecutionContext};
pub use dispatch::send_hangup;
pub use error::ContextError;
pub use id::ActorId;
pub use own::ActorOwn;
pub use pool::{ActorPool, WeakPtr};
pub use record::{ActorGuard, ActorRecord};
pub use shared::ActorShared;
