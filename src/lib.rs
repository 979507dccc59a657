//! A lazy-loading host bridge around a WebAssembly decryption component.
//!
//! The component is a black box exposing two entry points - an asynchronous
//! initialize and a synchronous decrypt. `wasm_bridge` owns everything around
//! that box: the one-per-session load lifecycle, deduplication of concurrent
//! load attempts, reload-after-failure, and the translation between an
//! ergonomic typed request and the component's wire format. It implements no
//! cryptography itself.
//!
//! # Core Concepts
//!
//! - [`ModuleSource`] / [`DecryptModule`]: The capability contract of the
//! 	opaque module - exactly the two operations it is known to expose. The
//! 	production implementation is [`ComponentSource`], which compiles and
//! 	instantiates a wasm component; tests and examples can stand in with any
//! 	in-process value.
//!
//! - [`Loader`]: Owns the single outstanding initialization attempt. `load`
//! 	joins the cached attempt (exactly one initialization fires however many
//! 	callers arrive); `reload` discards handle, error, and attempt, and
//! 	starts fresh. Every attempt carries a generation id, and a settlement
//! 	is applied only while its generation is current - a stale attempt can
//! 	never clobber a newer one, whatever order they settle in.
//!
//! - [`Phase`]: The tri-state readiness projection (`Loading` / `Ready` /
//! 	`Failed`) consumers observe. Ready-with-handle and failed-with-error are
//! 	variants of one enum, so the two can never coexist.
//!
//! - [`WasmBridge`] / [`BridgeSurface`]: The provisioning scope and the
//! 	capability bundle it hands out - `ready`, `error`, `reload`, and the
//! 	typed [`decrypt_history`]( BridgeSurface::decrypt_history ) operation.
//! 	A surface is only valid within its scope; using one after the scope is
//! 	torn down is a programming error and panics.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc ;
//! use async_trait::async_trait ;
//! use wasm_bridge::{
//! 	DecryptModule, DecryptRequest, ModuleFault, ModuleHandle, ModuleSource,
//! 	Network, RawTransaction, WasmBridge,
//! };
//!
//! // Anything with an initialize/decrypt pair can stand behind the bridge.
//! // Production code would use `ComponentSource` with a compiled component.
//! struct Echo ;
//!
//! impl DecryptModule for Echo {
//! 	fn decrypt( &self, _key: &str, _payload: &str, _network: &str ) -> Result<String, ModuleFault> {
//! 		Ok( "[]".to_string() )
//! 	}
//! }
//!
//! #[async_trait]
//! impl ModuleSource for Echo {
//! 	async fn initialize( &self ) -> Result<ModuleHandle, ModuleFault> {
//! 		Ok( Arc::new( Echo ))
//! 	}
//! }
//!
//! tokio::runtime::Builder::new_current_thread()
//! 	.build()
//! 	.unwrap()
//! 	.block_on( async {
//! 		let bridge = WasmBridge::new( Echo );
//! 		let surface = bridge.surface();
//!
//! 		// Settles with the fresh attempt; afterwards the surface is ready.
//! 		surface.reload().await.unwrap();
//! 		assert!( surface.ready() );
//! 		assert_eq!( surface.error(), None );
//!
//! 		let notes = surface.decrypt_history( &DecryptRequest {
//! 			viewing_key: "zxviews1example".to_string(),
//! 			network: Network::Mainnet,
//! 			transactions: vec![ RawTransaction { raw_tx: "AAAA".to_string(), height: 100 }],
//! 		}).unwrap();
//! 		assert!( notes.is_empty() );
//! 	});
//! ```
//!
//! # Errors
//!
//! Every public operation returns a tagged [`BridgeError`] rather than
//! throwing heterogeneous fault values. Initialization failures update the
//! shared [`Phase`] and are visible to every consumer; `NotReady`, `Decode`,
//! and `Invocation` faults are returned only to the calling site and never
//! mutate the lifecycle.
//!
//! # Re-exports
//!
//! `wasm_bridge` re-exports [`Engine`] from `wasmtime` for convenience when
//! constructing a [`ComponentSource`]; see the
//! [wasmtime docs](https://docs.rs/wasmtime/latest/wasmtime/) for details.

mod adapter ;
mod bridge ;
mod component ;
mod error ;
mod history ;
mod lifecycle ;
mod loader ;
mod module ;

#[doc( no_inline )]
pub use wasmtime::Engine ;

pub use bridge::{ BridgeSurface, WasmBridge };
pub use component::ComponentSource ;
pub use error::BridgeError ;
pub use history::{
	DecryptRequest, DecryptedNote, Network, RawTransaction, ShieldedProtocol, TransferDirection,
};
pub use lifecycle::Phase ;
pub use loader::{ LoadAttempt, Loader };
pub use module::{ DecryptModule, ModuleFault, ModuleHandle, ModuleSource };
