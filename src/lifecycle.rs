//! The tri-state readiness projection.
//!
//! Exactly one of loading / ready / failed holds at any observation point;
//! encoding the projection as an enum makes the exclusivity invariant hold by
//! construction instead of by discipline across parallel flags.

use tokio::sync::watch ;

use crate::module::ModuleHandle ;

/// Lifecycle state of the module, as observed by consumers.
#[derive( Clone )]
pub enum Phase {
	/// No settled outcome yet: either no attempt has started or one is
	/// outstanding.
	Loading,
	/// The module is initialized; the handle is cached here.
	Ready( ModuleHandle ),
	/// The most recent attempt failed and has not been superseded.
	Failed( String ),
}

impl Phase {
	/// True iff a module handle is cached and no error is cached.
	#[inline] pub fn is_ready( &self ) -> bool { matches!( self, Self::Ready( _ ))}

	/// Message of the most recent failed attempt, if any.
	pub fn error( &self ) -> Option<&str> {
		match self {
			Self::Failed( message ) => Some( message ),
			Self::Loading | Self::Ready( _ ) => None,
		}
	}
}

impl std::fmt::Debug for Phase {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		match self {
			Self::Loading => f.write_str( "Loading" ),
			Self::Ready( _ ) => f.debug_tuple( "Ready" ).field( &"<ModuleHandle>" ).finish(),
			Self::Failed( message ) => f.debug_tuple( "Failed" ).field( message ).finish(),
		}
	}
}

/// Single-writer cell holding the current [`Phase`].
///
/// The loader is the only writer; everything else gets read and subscribe
/// access through [`watch::Receiver`]s handed out by [`subscribe`]( Self::subscribe ).
pub(crate) struct LifecycleCell {
	sender: watch::Sender<Phase>,
}

impl LifecycleCell {
	pub(crate) fn new() -> Self {
		let ( sender, _receiver ) = watch::channel( Phase::Loading );
		Self { sender }
	}

	/// Snapshot of the current phase.
	pub(crate) fn current( &self ) -> Phase {
		self.sender.borrow().clone()
	}

	/// Replaces the current phase and notifies subscribers.
	pub(crate) fn transition( &self, phase: Phase ) {
		self.sender.send_replace( phase );
	}

	/// A receiver notified on every transition.
	pub(crate) fn subscribe( &self ) -> watch::Receiver<Phase> {
		self.sender.subscribe()
	}
}

#[cfg( test )]
mod tests {
	use std::sync::Arc ;

	use super::* ;
	use crate::module::{ DecryptModule, ModuleFault };

	struct Inert ;

	impl DecryptModule for Inert {
		fn decrypt( &self, _: &str, _: &str, _: &str ) -> Result<String, ModuleFault> {
			Ok( String::new() )
		}
	}

	#[test]
	fn ready_and_error_are_mutually_exclusive() {
		let loading = Phase::Loading ;
		assert!( !loading.is_ready() && loading.error().is_none() );

		let ready = Phase::Ready( Arc::new( Inert ));
		assert!( ready.is_ready() && ready.error().is_none() );

		let failed = Phase::Failed( "no dice".to_string() );
		assert!( !failed.is_ready() && failed.error() == Some( "no dice" ));
	}

	#[test]
	fn transition_replaces_and_notifies() {
		let cell = LifecycleCell::new();
		let receiver = cell.subscribe();
		cell.transition( Phase::Failed( "nope".to_string() ));
		assert_eq!( cell.current().error(), Some( "nope" ));
		assert!( receiver.has_changed().expect( "sender alive" ));
	}
}
