// Shared module stand-ins for the integration suites. Spliced into each test
// crate with `include!`, so any one suite uses only part of this file.

use std::sync::Arc ;
use std::sync::atomic::{ AtomicUsize, Ordering };

use async_trait::async_trait ;
use parking_lot::Mutex ;
use tokio::sync::oneshot ;
use wasm_bridge::{
	BridgeSurface, DecryptModule, ModuleFault, ModuleHandle, ModuleSource, WasmBridge,
};

/// In-process module with a scripted decrypt response and call recording.
pub struct StubModule {
	decrypt_calls: AtomicUsize,
	last_call: Mutex<Option<( String, String, String )>>,
	response: Result<String, String>,
}

impl StubModule {
	/// A module whose decrypt always returns `json`.
	pub fn returning( json: &str ) -> Arc<Self> {
		Arc::new( Self {
			decrypt_calls: AtomicUsize::new( 0 ),
			last_call: Mutex::new( None ),
			response: Ok( json.to_string() ),
		})
	}

	/// A module whose decrypt always fails with `message`.
	pub fn failing( message: &str ) -> Arc<Self> {
		Arc::new( Self {
			decrypt_calls: AtomicUsize::new( 0 ),
			last_call: Mutex::new( None ),
			response: Err( message.to_string() ),
		})
	}

	pub fn decrypt_calls( &self ) -> usize {
		self.decrypt_calls.load( Ordering::SeqCst )
	}

	/// Arguments of the most recent decrypt call: viewing key, payload,
	/// network.
	pub fn last_call( &self ) -> Option<( String, String, String )> {
		self.last_call.lock().clone()
	}
}

impl DecryptModule for StubModule {
	fn decrypt( &self, viewing_key: &str, payload: &str, network: &str ) -> Result<String, ModuleFault> {
		self.decrypt_calls.fetch_add( 1, Ordering::SeqCst );
		*self.last_call.lock() = Some((
			viewing_key.to_string(),
			payload.to_string(),
			network.to_string(),
		));
		self.response.clone().map_err( ModuleFault::new )
	}
}

/// Source that resolves immediately with the given stub module.
#[derive( Clone )]
pub struct InstantSource {
	init_calls: Arc<AtomicUsize>,
	module: Arc<StubModule>,
}

impl InstantSource {
	pub fn new( module: Arc<StubModule> ) -> Self {
		Self { init_calls: Arc::new( AtomicUsize::new( 0 )), module }
	}

	pub fn init_calls( &self ) -> usize {
		self.init_calls.load( Ordering::SeqCst )
	}
}

#[async_trait]
impl ModuleSource for InstantSource {
	async fn initialize( &self ) -> Result<ModuleHandle, ModuleFault> {
		self.init_calls.fetch_add( 1, Ordering::SeqCst );
		let handle: ModuleHandle = self.module.clone();
		Ok( handle )
	}
}

/// Source whose initialization always fails with the given message.
#[derive( Clone )]
pub struct FailingSource {
	message: String,
}

impl FailingSource {
	pub fn new( message: &str ) -> Self {
		Self { message: message.to_string() }
	}
}

#[async_trait]
impl ModuleSource for FailingSource {
	async fn initialize( &self ) -> Result<ModuleHandle, ModuleFault> {
		Err( ModuleFault::new( self.message.clone() ))
	}
}

/// Source whose attempts stay pending until the test settles them by index.
#[derive( Clone )]
pub struct ManualSource {
	state: Arc<ManualSourceState>,
}

pub struct ManualSourceState {
	init_calls: AtomicUsize,
	pending: Mutex<Vec<Option<oneshot::Sender<Result<ModuleHandle, ModuleFault>>>>>,
}

impl ManualSource {
	pub fn new() -> Self {
		Self {
			state: Arc::new( ManualSourceState {
				init_calls: AtomicUsize::new( 0 ),
				pending: Mutex::new( Vec::new() ),
			}),
		}
	}

	/// Number of initialize calls observed so far.
	pub fn init_calls( &self ) -> usize {
		self.state.init_calls.load( Ordering::SeqCst )
	}

	/// Number of attempts still waiting to be settled.
	pub fn outstanding( &self ) -> usize {
		self.state.pending.lock().iter().filter(| sender | sender.is_some() ).count()
	}

	/// Settles attempt number `attempt` (0-based, in initialize order) with
	/// the given module.
	pub fn settle_ok( &self, attempt: usize, module: Arc<StubModule> ) {
		let handle: ModuleHandle = module ;
		self.settle( attempt, Ok( handle ));
	}

	/// Settles attempt number `attempt` with a failure.
	pub fn settle_err( &self, attempt: usize, message: &str ) {
		self.settle( attempt, Err( ModuleFault::new( message )));
	}

	fn settle( &self, attempt: usize, outcome: Result<ModuleHandle, ModuleFault> ) {
		let sender = self.state.pending.lock()[ attempt ]
			.take()
			.expect( "attempt already settled or never started" );
		let _ = sender.send( outcome );
	}
}

#[async_trait]
impl ModuleSource for ManualSource {
	async fn initialize( &self ) -> Result<ModuleHandle, ModuleFault> {
		let ( sender, receiver ) = oneshot::channel();
		self.state.pending.lock().push( Some( sender ));
		self.state.init_calls.fetch_add( 1, Ordering::SeqCst );
		receiver.await
			.unwrap_or_else(| _cancelled | Err( ModuleFault::new( "test harness dropped the attempt" )))
	}
}

/// Builds a bridge over `module` and waits for its surface to become ready.
pub async fn ready_surface( module: Arc<StubModule> ) -> ( WasmBridge, BridgeSurface ) {
	let bridge = WasmBridge::new( InstantSource::new( module ));
	let surface = bridge.surface();
	surface.reload().await.expect( "initialization should succeed" );
	( bridge, surface )
}

/// Yields to the scheduler until `predicate` holds.
pub async fn wait_until( mut predicate: impl FnMut() -> bool ) {
	for _ in 0..1024 {
		if predicate() {
			return;
		}
		tokio::task::yield_now().await;
	}
	panic!( "condition not reached after 1024 polls" );
}
