//! Wasmtime-backed module source.
//!
//! The production implementation of the module contract: the engine is a
//! compiled WebAssembly component exposing a single root `decrypt` export.
//! Everything wasmtime-specific - compilation, instantiation, export lookup,
//! `Val` marshalling - stays inside this module; the rest of the crate only
//! sees [`ModuleSource`] and [`DecryptModule`].

use std::sync::Arc ;

use async_trait::async_trait ;
use parking_lot::Mutex ;
use tracing::debug ;
use wasmtime::{ Engine, Store };
use wasmtime::component::{ Component, Instance, Linker, Val };

use crate::module::{ DecryptModule, ModuleFault, ModuleHandle, ModuleSource };

/// Name of the function export the bridge calls on the component root.
const DECRYPT_EXPORT: &str = "decrypt";

/// A [`ModuleSource`] backed by a compiled WebAssembly component binary.
///
/// You create your own [`Engine`], which allows you to define your own
/// wasmtime config. Initialization compiles and instantiates the binary anew
/// on every call, so a reload always observes fresh module state.
pub struct ComponentSource {
	engine: Engine,
	binary: Vec<u8>,
}

impl ComponentSource {
	/// Wraps a component binary (or WAT text) with the engine that will
	/// compile it.
	pub fn new( engine: Engine, binary: impl Into<Vec<u8>> ) -> Self {
		Self { engine, binary: binary.into() }
	}
}

impl std::fmt::Debug for ComponentSource {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ComponentSource" )
			.field( "binary_bytes", &self.binary.len() )
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl ModuleSource for ComponentSource {
	async fn initialize( &self ) -> Result<ModuleHandle, ModuleFault> {
		let component = Component::new( &self.engine, &self.binary )
			.map_err(| error | ModuleFault::new( format!( "failed to compile component: {error}" )))?;
		let linker = Linker::<()>::new( &self.engine );
		let mut store = Store::new( &self.engine, () );
		let instance = linker.instantiate( &mut store, &component )
			.map_err(| error | ModuleFault::new( format!( "failed to instantiate component: {error}" )))?;
		debug!( binary_bytes = self.binary.len(), "component instantiated" );
		Ok( Arc::new( ComponentModule {
			state: Mutex::new( ModuleState { store, instance }),
		}))
	}
}

struct ModuleState {
	store: Store<()>,
	instance: Instance,
}

/// A live component instance behind the [`DecryptModule`] capability.
struct ComponentModule {
	state: Mutex<ModuleState>,
}

impl ComponentModule {
	const PLACEHOLDER_VAL: Val = Val::Tuple( vec![] );
}

impl DecryptModule for ComponentModule {
	fn decrypt( &self, viewing_key: &str, payload: &str, network: &str ) -> Result<String, ModuleFault> {

		// Calls are modeled as blocking; a contended instance is a per-call
		// fault rather than a queue.
		let mut state = self.state.try_lock()
			.ok_or_else(|| ModuleFault::new( "module is busy with another call" ))?;
		let ModuleState { store, instance } = &mut *state;

		let func_index = instance
			.get_export_index( &mut *store, None, DECRYPT_EXPORT )
			.ok_or_else(|| ModuleFault::new( format!( "component does not export '{DECRYPT_EXPORT}'" )))?;
		let func = instance
			.get_func( &mut *store, func_index )
			.ok_or_else(|| ModuleFault::new( format!( "component export '{DECRYPT_EXPORT}' is not a function" )))?;

		let args = [
			Val::String( viewing_key.to_string() ),
			Val::String( payload.to_string() ),
			Val::String( network.to_string() ),
		];
		let mut results = [ Self::PLACEHOLDER_VAL ];
		func.call( &mut *store, &args, &mut results )
			.map_err(| error | ModuleFault::new( error.to_string() ))?;
		let _ = func.post_return( &mut *store );

		match std::mem::replace( &mut results[ 0 ], Self::PLACEHOLDER_VAL ) {
			Val::String( notes ) => Ok( notes ),
			other => Err( ModuleFault::new( format!( "expected a string result, found {other:?}" ))),
		}

	}
}
