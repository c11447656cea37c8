//! Error types for execution contexts.
//!
//! Handle operations never fail; stale or empty handles degrade to `None` or
//! `false`. Only talking to a context can.

use thiserror::Error;

/// Errors returned when posting to or starting an execution context.
#[derive(Debug, Error)]
pub enum ContextError {
	/// The context has shut down and no longer accepts work.
	#[error("execution context closed")]
	Closed,

	/// The context thread could not be started.
	#[error("failed to spawn execution context thread: {0}")]
	Spawn(#[from] std::io::Error),

	/// A queued call unwound before replying.
	#[error("execution context dropped the reply")]
	ReplyDropped,
}
