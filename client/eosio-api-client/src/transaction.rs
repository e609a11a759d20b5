//! Transactions in their packed binary form, and how they get signed.

use crate::{
	abi::Encoder,
	keys::{PrivateKey, Signature},
	Checksum256, Name, Result, TimePointSec,
};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Permission every action of this client is authorized with.
pub const ACTIVE_PERMISSION: Name = Name::from_u64(3617214756542218240);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PermissionLevel {
	pub actor: Name,
	pub permission: Name,
}

impl PermissionLevel {
	pub fn active(actor: Name) -> Self {
		PermissionLevel { actor, permission: ACTIVE_PERMISSION }
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
	pub account: Name,
	pub name: Name,
	pub authorization: Vec<PermissionLevel>,
	/// ABI serialized arguments.
	pub data: Vec<u8>,
}

impl Action {
	fn pack_into(&self, enc: &mut Encoder) {
		enc.write_name(self.account);
		enc.write_name(self.name);
		enc.write_varuint32(self.authorization.len() as u32);
		for level in &self.authorization {
			enc.write_name(level.actor);
			enc.write_name(level.permission);
		}
		enc.write_bytes(&self.data);
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionHeader {
	pub expiration: TimePointSec,
	pub ref_block_num: u16,
	pub ref_block_prefix: u32,
	pub max_net_usage_words: u32,
	pub max_cpu_usage_ms: u8,
	pub delay_sec: u32,
}

impl TransactionHeader {
	/// Header referencing `block_num` (TaPoS), expiring at `expiration`.
	pub fn new(expiration: TimePointSec, block_num: u32, ref_block_prefix: u32) -> Self {
		TransactionHeader {
			expiration,
			ref_block_num: (block_num & 0xffff) as u16,
			ref_block_prefix,
			..Default::default()
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
	pub header: TransactionHeader,
	pub context_free_actions: Vec<Action>,
	pub actions: Vec<Action>,
	pub transaction_extensions: Vec<(u16, Vec<u8>)>,
}

impl Transaction {
	pub fn new(header: TransactionHeader, actions: Vec<Action>) -> Self {
		Transaction { header, actions, ..Default::default() }
	}

	pub fn pack(&self) -> Vec<u8> {
		let mut enc = Encoder::new();
		let h = &self.header;
		enc.write_u32(h.expiration.0);
		enc.write_u16(h.ref_block_num);
		enc.write_u32(h.ref_block_prefix);
		enc.write_varuint32(h.max_net_usage_words);
		enc.write_u8(h.max_cpu_usage_ms);
		enc.write_varuint32(h.delay_sec);

		for actions in [&self.context_free_actions, &self.actions] {
			enc.write_varuint32(actions.len() as u32);
			for action in actions {
				action.pack_into(&mut enc);
			}
		}

		enc.write_varuint32(self.transaction_extensions.len() as u32);
		for (kind, data) in &self.transaction_extensions {
			enc.write_u16(*kind);
			enc.write_bytes(data);
		}
		enc.into_bytes()
	}

	/// The transaction id is the hash of the packed transaction.
	pub fn id(&self) -> Checksum256 {
		Checksum256(Sha256::digest(self.pack()).into())
	}

	/// `sha256(chain_id ‖ packed_trx ‖ context free data digest)`; without
	/// context free data the last part is 32 zero bytes.
	pub fn signing_digest(&self, chain_id: &Checksum256) -> [u8; 32] {
		let mut hasher = Sha256::new();
		hasher.update(chain_id.as_bytes());
		hasher.update(self.pack());
		hasher.update([0u8; 32]);
		hasher.finalize().into()
	}

	pub fn sign(&self, chain_id: &Checksum256, keys: &[&PrivateKey]) -> Result<SignedTransaction> {
		let digest = self.signing_digest(chain_id);
		let signatures =
			keys.iter().map(|key| key.sign_digest(&digest)).collect::<Result<Vec<_>>>()?;
		Ok(SignedTransaction { signatures, packed_trx: self.pack() })
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
	pub signatures: Vec<Signature>,
	pub packed_trx: Vec<u8>,
}

/// Body of `/v1/chain/push_transaction`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PushTransactionRequest {
	pub signatures: Vec<String>,
	pub compression: u8,
	pub packed_context_free_data: String,
	pub packed_trx: String,
}

impl From<&SignedTransaction> for PushTransactionRequest {
	fn from(trx: &SignedTransaction) -> Self {
		PushTransactionRequest {
			signatures: trx.signatures.iter().map(ToString::to_string).collect(),
			compression: 0,
			packed_context_free_data: String::new(),
			packed_trx: hex::encode(&trx.packed_trx),
		}
	}
}
