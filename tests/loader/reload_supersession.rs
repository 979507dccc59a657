use std::sync::Arc ;

use wasm_bridge::{ Loader, ModuleHandle, Phase };

use crate::{ wait_until, ManualSource, StubModule };

#[tokio::test]
async fn newer_attempt_wins_even_when_the_older_settles_last() {

	let source = ManualSource::new();
	let loader = Arc::new( Loader::new( source.clone() ));

	// Attempt A stays outstanding.
	let caller_a = tokio::spawn( loader.load() );
	wait_until(|| source.init_calls() == 1 ).await;

	// Reload supersedes it with attempt B while A is still pending.
	let caller_b = {
		let loader = Arc::clone( &loader );
		tokio::spawn( async move { loader.reload().await })
	};
	wait_until(|| source.init_calls() == 2 ).await;

	// B settles first.
	let module_b = StubModule::returning( "[]" );
	source.settle_ok( 1, Arc::clone( &module_b ));
	let handle_b = caller_b
		.await.expect( "reload task panicked" )
		.expect( "attempt B should succeed" );

	// A settles afterwards - with a failure - and must change nothing: its
	// joiners see its outcome, but the lifecycle belongs to B.
	source.settle_err( 0, "late failure from a stale attempt" );
	let error_a = caller_a.await.expect( "load task panicked" )
		.err().expect( "attempt A should fail" );
	assert!( error_a.to_string().contains( "late failure" ));

	match loader.current() {
		Phase::Ready( handle ) => {
			let expected: ModuleHandle = module_b ;
			assert!( Arc::ptr_eq( &handle, &expected ));
			assert!( Arc::ptr_eq( &handle, &handle_b ));
		}
		phase => panic!( "expected Ready after supersession, found: {:#?}", phase ),
	}
	assert_eq!( loader.current().error(), None );

}
