use crate::{
	abi::Abi,
	keys::PrivateKey,
	rpc::{JsonRpc, TableQuery, TableRows},
	transaction::{Action, PermissionLevel, PushTransactionRequest, Transaction, TransactionHeader},
	Checksum256, Error, Name, Result, TimePointSec,
};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::HashMap, str::FromStr, sync::Arc};

pub type TransactionId = Checksum256;

/// How far below head the reference block is taken.
pub const DEFAULT_BLOCKS_BEHIND: u32 = 3;
/// Lifetime of a transaction counted from its reference block.
pub const DEFAULT_EXPIRE_SECONDS: u32 = 30;

/// The two chain primitives everything else is built on.
#[async_trait]
pub trait ChainApi: Send + Sync {
	/// Signs and broadcasts a single action authorized by `authorizer@active`.
	async fn submit_transaction(
		&self,
		contract: Name,
		action: Name,
		authorizer: Name,
		data: &Value,
	) -> Result<TransactionId>;

	async fn get_table_rows(&self, query: &TableQuery) -> Result<TableRows>;
}

/// [`ChainApi`] backed by a node's HTTP API and a local signing key.
pub struct Api {
	rpc: JsonRpc,
	signer: Option<PrivateKey>,
	blocks_behind: u32,
	expire_seconds: u32,
	abis: Mutex<HashMap<Name, Arc<Abi>>>,
}

impl Api {
	pub fn new(rpc: JsonRpc) -> Self {
		Api {
			rpc,
			signer: None,
			blocks_behind: DEFAULT_BLOCKS_BEHIND,
			expire_seconds: DEFAULT_EXPIRE_SECONDS,
			abis: Mutex::new(HashMap::new()),
		}
	}

	pub fn set_signer(&mut self, signer: PrivateKey) {
		info!("signing with {}", signer.public_key());
		self.signer = Some(signer);
	}

	pub fn set_tapos(&mut self, blocks_behind: u32, expire_seconds: u32) {
		self.blocks_behind = blocks_behind;
		self.expire_seconds = expire_seconds;
	}

	/// Fetches the ABI of `contract`, once per contract.
	pub async fn abi(&self, contract: Name) -> Result<Arc<Abi>> {
		if let Some(abi) = self.abis.lock().get(&contract) {
			return Ok(abi.clone())
		}
		debug!("fetching abi of {contract}");
		let def = self
			.rpc
			.get_abi(contract)
			.await?
			.abi
			.ok_or_else(|| Error::MissingAbi { contract: contract.to_string() })?;
		let abi = Arc::new(Abi::from(def));
		self.abis.lock().insert(contract, abi.clone());
		Ok(abi)
	}

	/// Serializes `data` against the contract ABI into a ready to sign action.
	pub async fn compose_action(
		&self,
		contract: Name,
		action: Name,
		authorizer: Name,
		data: &Value,
	) -> Result<Action> {
		let abi = self.abi(contract).await?;
		let data = abi.encode_action_data(action, data)?.ok_or_else(|| Error::UnknownAction {
			contract: contract.to_string(),
			action: action.to_string(),
		})?;
		Ok(Action {
			account: contract,
			name: action,
			authorization: vec![PermissionLevel::active(authorizer)],
			data,
		})
	}

	/// Wraps `actions` into a transaction referencing a recent block.
	pub async fn compose_transaction(
		&self,
		actions: Vec<Action>,
	) -> Result<(Transaction, Checksum256)> {
		let info = self.rpc.get_info().await?;
		let ref_block_num = info.head_block_num.saturating_sub(self.blocks_behind).max(1);
		let block = self.rpc.get_block(ref_block_num).await?;
		let expiration = TimePointSec::from_str(&block.timestamp)?
			.checked_add_secs(self.expire_seconds)
			.ok_or_else(|| Error::InvalidTime(block.timestamp.clone()))?;
		debug!(
			"tapos: ref block {} prefix {} expires {}",
			block.block_num, block.ref_block_prefix, expiration
		);

		let header = TransactionHeader::new(expiration, block.block_num, block.ref_block_prefix);
		Ok((Transaction::new(header, actions), info.chain_id))
	}

	pub async fn send_actions(&self, actions: Vec<Action>) -> Result<TransactionId> {
		let signer = self.signer.as_ref().ok_or(Error::NoSigner)?;
		let (trx, chain_id) = self.compose_transaction(actions).await?;
		let signed = trx.sign(&chain_id, &[signer])?;
		let response = self.rpc.push_transaction(&PushTransactionRequest::from(&signed)).await?;
		Ok(response.transaction_id)
	}
}

#[async_trait]
impl ChainApi for Api {
	async fn submit_transaction(
		&self,
		contract: Name,
		action: Name,
		authorizer: Name,
		data: &Value,
	) -> Result<TransactionId> {
		let action = self.compose_action(contract, action, authorizer, data).await?;
		self.send_actions(vec![action]).await
	}

	async fn get_table_rows(&self, query: &TableQuery) -> Result<TableRows> {
		self.rpc.get_table_rows(query).await
	}
}
