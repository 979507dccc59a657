//! The provisioning scope and the capability bundle it hands out.
//!
//! A [`WasmBridge`] owns the loader for one module session. Downstream code
//! never touches the loader directly: it receives a [`BridgeSurface`] - one
//! cohesive read of readiness, error, reload, and the typed operations - and
//! the surface is only valid while its bridge is alive.

use std::sync::{ Arc, Weak };

use tokio::sync::watch ;
use tracing::debug ;

use crate::adapter ;
use crate::error::BridgeError ;
use crate::history::{ DecryptRequest, DecryptedNote };
use crate::lifecycle::Phase ;
use crate::loader::Loader ;
use crate::module::ModuleSource ;

/// The provisioning scope for one module session.
///
/// Owns the [`Loader`]. Constructing a bridge loads nothing; the first
/// [`surface`]( Self::surface ) call triggers the one initialization attempt
/// for the session.
pub struct WasmBridge {
	loader: Arc<Loader>,
}

impl WasmBridge {
	pub fn new( source: impl ModuleSource + 'static ) -> Self {
		Self { loader: Arc::new( Loader::new( source )) }
	}

	/// Hands out the capability bundle, triggering (or joining) the load
	/// attempt.
	///
	/// The attempt is driven by a spawned task, so the surface becomes ready
	/// without anyone awaiting it explicitly.
	///
	/// # Panics
	/// Panics when called outside a tokio runtime.
	pub fn surface( &self ) -> BridgeSurface {
		let attempt = self.loader.load();
		tokio::spawn( async move {
			// Outcome lands in the lifecycle; joiners observe it there.
			let _ = attempt.await;
		});
		debug!( "bridge surface handed out" );
		BridgeSurface {
			loader: Arc::downgrade( &self.loader ),
			phase: self.loader.subscribe(),
		}
	}
}

impl std::fmt::Debug for WasmBridge {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "WasmBridge" )
			.field( "loader", &self.loader )
			.finish()
	}
}

/// The capability bundle handed to downstream code.
///
/// Cheap to clone. A surface is only meaningful within the scope of the
/// [`WasmBridge`] that produced it; operations that reach the loader panic
/// once that scope is gone, because outliving the scope is a programming
/// error, not a runtime condition to degrade on.
#[derive( Clone )]
pub struct BridgeSurface {
	loader: Weak<Loader>,
	phase: watch::Receiver<Phase>,
}

impl BridgeSurface {
	/// True iff the module handle is cached and no error is cached.
	#[inline] pub fn ready( &self ) -> bool { self.phase.borrow().is_ready() }

	/// Message of the most recent failed attempt, unless superseded.
	pub fn error( &self ) -> Option<String> {
		self.phase.borrow().error().map( str::to_string )
	}

	/// Snapshot of the current phase.
	pub fn phase( &self ) -> Phase {
		self.phase.borrow().clone()
	}

	/// Receiver notified on every phase transition.
	pub fn subscribe( &self ) -> watch::Receiver<Phase> {
		self.phase.clone()
	}

	/// Discards the cached module and error, then loads afresh. Resolves
	/// after the new attempt settles.
	///
	/// # Errors
	/// Returns [`BridgeError::Initialization`] if the fresh attempt fails.
	///
	/// # Panics
	/// Panics if the owning [`WasmBridge`] scope has been torn down.
	pub async fn reload( &self ) -> Result<(), BridgeError> {
		self.scope().reload().await.map(| _handle | ())
	}

	/// Decrypts a batch of raw transactions into typed notes.
	///
	/// An empty batch resolves to an empty list without a module round trip.
	/// Output order and count exactly mirror the module's output.
	///
	/// # Errors
	/// [`BridgeError::NotReady`] before successful initialization;
	/// [`BridgeError::Invocation`] or [`BridgeError::Decode`] for per-call
	/// module faults. None of these affect the lifecycle.
	pub fn decrypt_history( &self, request: &DecryptRequest ) -> Result<Vec<DecryptedNote>, BridgeError> {
		// Snapshot the phase first so no watch read lock is held while the
		// module executes.
		let phase = self.phase.borrow().clone();
		adapter::decrypt_history( &phase, request )
	}

	fn scope( &self ) -> Arc<Loader> {
		self.loader.upgrade()
			.expect( "bridge surface used outside an active WasmBridge scope" )
	}
}

impl std::fmt::Debug for BridgeSurface {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "BridgeSurface" )
			.field( "scope_alive", &( self.loader.strong_count() > 0 ))
			.field( "phase", &*self.phase.borrow() )
			.finish()
	}
}
