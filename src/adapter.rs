//! Translation between the typed decrypt-history call and the module's wire
//! format.
//!
//! The whole batch is serialized into a single JSON payload and sent through
//! one module invocation; the returned JSON note list is parsed and mapped
//! field-for-field into [`DecryptedNote`], preserving the module's output
//! order and count. Faults from serialization, invocation, and parsing are
//! normalized into [`BridgeError`]; none of them touch the lifecycle.

use serde::{ Deserialize, Serialize };
use tracing::{ debug, warn };

use crate::error::BridgeError ;
use crate::history::{
	DecryptRequest, DecryptedNote, RawTransaction, ShieldedProtocol, TransferDirection,
};
use crate::lifecycle::Phase ;

/// Wire shape of one transaction in the batch payload.
#[derive( Serialize )]
struct WireTransaction<'a> {
	raw_tx: &'a str,
	height: u32,
}

/// Wire shape of one decrypted note, as the module returns it.
#[derive( Deserialize )]
struct WireNote {
	txid: String,
	index: u32,
	value: u64,
	/// Memo bytes arrive as a sequence of small integers.
	memo: Vec<u8>,
	protocol: ShieldedProtocol,
	transfer_type: TransferDirection,
	height: u32,
}

impl From<WireNote> for DecryptedNote {
	fn from( note: WireNote ) -> Self {
		Self {
			transaction_id: note.txid,
			output_index: note.index,
			value: note.value,
			memo_bytes: note.memo,
			protocol: note.protocol,
			transfer_direction: note.transfer_type,
			block_height: note.height,
		}
	}
}

/// Runs one decrypt-history call against the current phase.
///
/// Fails fast with [`BridgeError::NotReady`] unless the module is ready, and
/// short-circuits an empty batch without a module round trip.
pub(crate) fn decrypt_history(
	phase: &Phase,
	request: &DecryptRequest,
) -> Result<Vec<DecryptedNote>, BridgeError> {

	let Phase::Ready( module ) = phase else {
		return Err( BridgeError::NotReady );
	};
	if request.transactions.is_empty() {
		return Ok( Vec::new() );
	}

	let payload = encode_batch( &request.transactions )?;
	debug!(
		transactions = request.transactions.len(),
		network = request.network.name(),
		"dispatching decrypt batch",
	);
	let raw_notes = module
		.decrypt( &request.viewing_key, &payload, request.network.name() )
		.map_err(| fault | BridgeError::Invocation( fault.to_string() ))?;
	decode_notes( &raw_notes )

}

fn encode_batch( transactions: &[RawTransaction] ) -> Result<String, BridgeError> {
	let wire: Vec<WireTransaction<'_>> = transactions.iter()
		.map(| tx | WireTransaction { raw_tx: &tx.raw_tx, height: tx.height })
		.collect();
	serde_json::to_string( &wire )
		.map_err(| error | BridgeError::Decode( format!( "failed to encode transaction batch: {error}" )))
}

fn decode_notes( raw: &str ) -> Result<Vec<DecryptedNote>, BridgeError> {
	let notes: Vec<WireNote> = serde_json::from_str( raw ).map_err(| error | {
		warn!( %error, "module returned an unparsable note list" );
		BridgeError::Decode( format!( "failed to parse decrypted notes: {error}" ))
	})?;
	Ok( notes.into_iter().map( DecryptedNote::from ).collect() )
}

#[cfg( test )]
mod tests {
	use super::* ;

	#[test]
	fn batch_encodes_with_wire_field_names() {
		let payload = encode_batch( &[
			RawTransaction { raw_tx: "dead".to_string(), height: 10 },
			RawTransaction { raw_tx: "beef".to_string(), height: 11 },
		]).unwrap();
		assert_eq!(
			payload,
			r#"[{"raw_tx":"dead","height":10},{"raw_tx":"beef","height":11}]"#,
		);
	}

	#[test]
	fn notes_decode_with_field_renames() {
		let notes = decode_notes(
			r#"[{
				"txid": "abc",
				"index": 0,
				"value": 1000,
				"memo": [1, 2, 3],
				"protocol": "Sapling",
				"transfer_type": "Incoming",
				"height": 100
			}]"#,
		).unwrap();
		assert_eq!( notes, vec![ DecryptedNote {
			transaction_id: "abc".to_string(),
			output_index: 0,
			value: 1000,
			memo_bytes: vec![ 1, 2, 3 ],
			protocol: ShieldedProtocol::Sapling,
			transfer_direction: TransferDirection::Incoming,
			block_height: 100,
		}]);
	}

	#[test]
	fn malformed_notes_are_a_decode_failure() {
		let error = decode_notes( "not json" ).unwrap_err();
		assert!( matches!( error, BridgeError::Decode( _ )));
	}

	#[test]
	fn memo_bytes_out_of_range_are_rejected() {
		let error = decode_notes(
			r#"[{
				"txid": "abc",
				"index": 0,
				"value": 1,
				"memo": [256],
				"protocol": "Orchard",
				"transfer_type": "Outgoing",
				"height": 1
			}]"#,
		).unwrap_err();
		assert!( matches!( error, BridgeError::Decode( _ )));
	}
}
