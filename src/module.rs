//! The opaque module's capability contract.
//!
//! The decryption engine is a black box: the bridge knows exactly two entry
//! points, an asynchronous initialize and a synchronous decrypt. Representing
//! them as traits keeps the dependency an explicit contract rather than an
//! untyped bag of exports, and lets tests stand in for the real component
//! with a plain in-process value.

use std::sync::Arc ;

use async_trait::async_trait ;
use thiserror::Error ;

/// Uniform failure value for faults crossing the module boundary.
///
/// Whatever the underlying raw fault was - a structured error, a bare string,
/// a trap - it is coerced into this shape exactly once, where the module is
/// called. The message is guaranteed non-empty.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
#[error( "{message}" )]
pub struct ModuleFault {
	message: String,
}

impl ModuleFault {
	/// Wraps a raw fault message, substituting a placeholder if it is empty.
	pub fn new( message: impl Into<String> ) -> Self {
		let message = message.into();
		match message.is_empty() {
			true => Self { message: "module fault without a message".to_string() },
			false => Self { message },
		}
	}

	/// The normalized human-readable message.
	#[inline] pub fn message( &self ) -> &str { &self.message }
}

impl From<String> for ModuleFault {
	fn from( message: String ) -> Self { Self::new( message )}
}

impl From<&str> for ModuleFault {
	fn from( message: &str ) -> Self { Self::new( message )}
}

/// The fixed capability interface of a live, initialized module.
///
/// `decrypt` is synchronous from the caller's perspective and operates on the
/// module's wire format: a serialized transaction batch in, a serialized note
/// list out. Implementations must fail through [`ModuleFault`], never panic
/// across this boundary.
pub trait DecryptModule: Send + Sync {
	/// Decrypts a serialized transaction batch against a viewing key.
	///
	/// # Errors
	/// Returns a [`ModuleFault`] if the module rejects the input or fails
	/// mid-execution.
	fn decrypt( &self, viewing_key: &str, payload: &str, network: &str ) -> Result<String, ModuleFault>;
}

/// The live, initialized reference to the module, valid until a reload
/// discards it. The loader owns the cached handle; callers borrow it
/// read-only per call.
pub type ModuleHandle = Arc<dyn DecryptModule>;

/// The initialize entry point of the module.
///
/// Not assumed idempotent: the loader calls it again after every reload, and
/// deduplicates concurrent attempts itself.
#[async_trait]
pub trait ModuleSource: Send + Sync {
	/// Loads and instantiates the module, yielding its live handle.
	///
	/// # Errors
	/// Returns a [`ModuleFault`] if loading or instantiation fails.
	async fn initialize( &self ) -> Result<ModuleHandle, ModuleFault>;
}

#[cfg( test )]
mod tests {
	use super::* ;

	#[test]
	fn empty_fault_message_is_replaced() {
		let fault = ModuleFault::new( "" );
		assert!( !fault.message().is_empty() );
	}

	#[test]
	fn fault_displays_its_message() {
		let fault = ModuleFault::from( "boom" );
		assert_eq!( fault.to_string(), "boom" );
	}
}
