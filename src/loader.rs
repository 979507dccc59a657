//! One initialization attempt at a time.
//!
//! The loader owns the only two pieces of shared mutable state in the crate:
//! the outstanding attempt reference and the lifecycle cell. `load` joins the
//! cached attempt; `reload` supersedes it. Every attempt carries a generation
//! id, and a settlement is applied to the lifecycle only while its generation
//! is still the current one - a stale attempt settling late can never clobber
//! a newer attempt's outcome, regardless of arrival order.

use std::sync::{ Arc, Weak };

use futures::FutureExt ;
use futures::future::{ BoxFuture, Shared };
use parking_lot::Mutex ;
use tokio::sync::watch ;
use tracing::{ debug, warn };

use crate::error::BridgeError ;
use crate::lifecycle::{ LifecycleCell, Phase };
use crate::module::{ ModuleHandle, ModuleSource };

/// A pending-or-settled initialization attempt.
///
/// Cloning yields another join handle onto the same underlying attempt; the
/// initialization itself runs at most once however many callers await it.
pub type LoadAttempt = Shared<BoxFuture<'static, Result<ModuleHandle, BridgeError>>>;

struct AttemptSlot {
	/// Generation of the most recently started attempt. Monotonically
	/// increasing; the authoritative attempt is the one matching this value.
	generation: u64,
	attempt: Option<LoadAttempt>,
}

struct LoaderState {
	/// Never locked across an await point.
	slot: Mutex<AttemptSlot>,
	lifecycle: LifecycleCell,
}

/// Owns the single outstanding [`LoadAttempt`] and the cached outcome.
///
/// A failed attempt stays cached - joining it returns the same failure - until
/// [`reload`]( Self::reload ) explicitly discards it. A hung attempt leaves
/// the phase at [`Phase::Loading`] indefinitely; `reload` starts a fresh
/// attempt without waiting for the stuck one.
pub struct Loader {
	source: Arc<dyn ModuleSource>,
	state: Arc<LoaderState>,
}

impl Loader {
	pub fn new( source: impl ModuleSource + 'static ) -> Self {
		Self::from_arc( Arc::new( source ))
	}

	pub fn from_arc( source: Arc<dyn ModuleSource> ) -> Self {
		Self {
			source,
			state: Arc::new( LoaderState {
				slot: Mutex::new( AttemptSlot { generation: 0, attempt: None }),
				lifecycle: LifecycleCell::new(),
			}),
		}
	}

	/// Joins the cached attempt, or starts exactly one new attempt if none
	/// exists.
	///
	/// The attempt reference is cached before the underlying initialization
	/// settles, so a second caller arriving mid-flight joins the same attempt
	/// instead of starting another. The returned future must be polled (or
	/// spawned) for the initialization to make progress.
	pub fn load( &self ) -> LoadAttempt {
		let mut slot = self.state.slot.lock();
		if let Some( attempt ) = &slot.attempt {
			return attempt.clone();
		}
		slot.generation += 1;
		debug!( generation = slot.generation, "starting module initialization" );
		let attempt = self.start_attempt( slot.generation );
		slot.attempt = Some( attempt.clone() );
		attempt
	}

	/// Unconditionally discards the cached handle, error, and attempt
	/// reference, then starts a brand-new attempt.
	///
	/// Safe to call while a previous attempt is still outstanding: the old
	/// attempt keeps running (it cannot be aborted) but its settlement is
	/// discarded by the generation guard. Resolves only after the new attempt
	/// settles.
	///
	/// # Errors
	/// Returns [`BridgeError::Initialization`] if the fresh attempt fails.
	pub async fn reload( &self ) -> Result<ModuleHandle, BridgeError> {
		let attempt = {
			let mut slot = self.state.slot.lock();
			slot.generation += 1;
			debug!( generation = slot.generation, "reloading module" );
			let attempt = self.start_attempt( slot.generation );
			slot.attempt = Some( attempt.clone() );
			self.state.lifecycle.transition( Phase::Loading );
			attempt
		};
		attempt.await
	}

	/// Snapshot of the current phase.
	#[inline] pub fn current( &self ) -> Phase { self.state.lifecycle.current() }

	/// Receiver notified on every phase transition.
	#[inline] pub fn subscribe( &self ) -> watch::Receiver<Phase> { self.state.lifecycle.subscribe() }

	fn start_attempt( &self, generation: u64 ) -> LoadAttempt {
		let source = Arc::clone( &self.source );
		let state = Arc::downgrade( &self.state );
		async move {
			let outcome = source.initialize().await
				.map_err(| fault | fault.to_string() );
			apply_outcome( &state, generation, &outcome );
			outcome.map_err( BridgeError::Initialization )
		}
			.boxed()
			.shared()
	}
}

impl std::fmt::Debug for Loader {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		let slot = self.state.slot.lock();
		f.debug_struct( "Loader" )
			.field( "source", &"<ModuleSource>" )
			.field( "generation", &slot.generation )
			.field( "outstanding", &slot.attempt.is_some() )
			.field( "phase", &self.state.lifecycle.current() )
			.finish_non_exhaustive()
	}
}

/// Applies a settled outcome to the lifecycle, unless the attempt has been
/// superseded or its owning loader is already gone.
fn apply_outcome(
	state: &Weak<LoaderState>,
	generation: u64,
	outcome: &Result<ModuleHandle, String>,
) {
	let Some( state ) = state.upgrade() else {
		debug!( generation, "loader torn down before settlement; outcome dropped" );
		return;
	};
	let slot = state.slot.lock();
	if slot.generation != generation {
		debug!(
			generation,
			current = slot.generation,
			"superseded attempt settled; outcome dropped",
		);
		return;
	}
	match outcome {
		Ok( handle ) => {
			debug!( generation, "module ready" );
			state.lifecycle.transition( Phase::Ready( Arc::clone( handle )));
		}
		Err( message ) => {
			warn!( generation, %message, "module initialization failed" );
			state.lifecycle.transition( Phase::Failed( message.clone() ));
		}
	}
}
