use wasm_bridge::{ DecryptRequest, Network, RawTransaction };

use crate::{ ready_surface, StubModule };

#[tokio::test]
async fn whole_batch_goes_through_one_invocation() {

	let module = StubModule::returning( "[]" );
	let ( _bridge, surface ) = ready_surface( module.clone() ).await;

	surface.decrypt_history( &DecryptRequest {
		viewing_key: "zxviews1batch".to_string(),
		network: Network::Testnet,
		transactions: vec![
			RawTransaction { raw_tx: "dead".to_string(), height: 10 },
			RawTransaction { raw_tx: "beef".to_string(), height: 11 },
		],
	}).expect( "decrypt should succeed" );

	assert_eq!( module.decrypt_calls(), 1 );
	let ( viewing_key, payload, network ) = module.last_call().expect( "module was called" );
	assert_eq!( viewing_key, "zxviews1batch" );
	assert_eq!( network, "testnet" );
	assert_eq!( payload, r#"[{"raw_tx":"dead","height":10},{"raw_tx":"beef","height":11}]"# );

}
