use thiserror::Error ;

/// Errors surfaced by the bridge to calling code.
///
/// Every variant carries (or is) a human-readable message, so callers never
/// have to inspect heterogeneous fault values. [`Initialization`]( Self::Initialization )
/// is lifecycle-affecting: it is also reflected in the shared [`Phase`]( crate::Phase )
/// and visible to every consumer. The remaining kinds are per-call and leave
/// the lifecycle untouched.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum BridgeError {
	/// The module failed to load or instantiate. Recoverable via reload.
	#[error( "Initialization Failure: {0}" )] Initialization( String ),
	/// An operation was invoked before the module became ready.
	#[error( "Module Not Ready" )] NotReady,
	/// The module returned output the bridge could not parse.
	#[error( "Decode Failure: {0}" )] Decode( String ),
	/// The module itself failed while executing the operation.
	#[error( "Invocation Failure: {0}" )] Invocation( String ),
}
