//! Typed request and response shapes for the decrypt-history operation.
//!
//! These are the ergonomic, caller-facing types; the module's wire shapes
//! (field names, serialization) live in the adapter that translates between
//! the two.

use serde::{ Deserialize, Serialize };

/// Supported networks.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Network {
	Mainnet,
	Testnet,
}

impl Network {
	/// The lowercase name the module expects.
	#[inline]
	pub fn name( self ) -> &'static str {
		match self {
			Self::Mainnet => "mainnet",
			Self::Testnet => "testnet",
		}
	}
}

impl std::fmt::Display for Network {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.write_str( self.name() )
	}
}

/// Shielded pool a note belongs to. Opaque to the bridge beyond being a tag.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize )]
pub enum ShieldedProtocol {
	Sapling,
	Orchard,
}

/// How the key holder relates to a decrypted note: funds received, sent, or
/// moved within the same holder's control.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize )]
pub enum TransferDirection {
	Incoming,
	Outgoing,
	Internal,
}

/// One raw transaction to decrypt, at the height it was mined.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct RawTransaction {
	/// Opaque encoded transaction bytes, passed through to the module
	/// untouched.
	pub raw_tx: String,
	pub height: u32,
}

/// A bulk decrypt-history request.
///
/// Transactions are processed independently and may contain duplicates; the
/// output order per item is stable.
#[derive( Debug, Clone )]
pub struct DecryptRequest {
	pub viewing_key: String,
	pub network: Network,
	pub transactions: Vec<RawTransaction>,
}

/// A decrypted shielded note.
///
/// Immutable once produced; its lifetime is the caller's - the bridge retains
/// no copy.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct DecryptedNote {
	pub transaction_id: String,
	pub output_index: u32,
	/// Note value in the smallest monetary unit.
	pub value: u64,
	pub memo_bytes: Vec<u8>,
	pub protocol: ShieldedProtocol,
	pub transfer_direction: TransferDirection,
	pub block_height: u32,
}
