//! `/v1/chain` JSON-RPC endpoints of a node.

use crate::{abi::AbiDef, transaction::PushTransactionRequest, Checksum256, Error, Name, Result};
use log::{debug, trace};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Clone, Debug)]
pub struct JsonRpc {
	client: reqwest::Client,
	endpoint: String,
}

impl JsonRpc {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), endpoint)
	}

	pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
		let endpoint = endpoint.into().trim_end_matches('/').to_owned();
		JsonRpc { client, endpoint }
	}

	async fn call<B, R>(&self, method: &str, body: &B) -> Result<R>
	where
		B: Serialize + ?Sized,
		R: DeserializeOwned,
	{
		let url = format!("{}/v1/chain/{method}", self.endpoint);
		debug!("POST {url}");
		let response = self.client.post(&url).json(body).send().await?;
		let status = response.status();
		let text = response.text().await?;
		trace!("{method} -> {status}: {text}");

		if !status.is_success() {
			let err = serde_json::from_str::<RpcError>(&text)
				.unwrap_or_else(|_| RpcError::from_status(status.as_u16(), text));
			return Err(Error::Rpc(err))
		}
		Ok(serde_json::from_str(&text)?)
	}

	pub async fn get_info(&self) -> Result<ChainInfo> {
		self.call("get_info", &serde_json::json!({})).await
	}

	pub async fn get_block(&self, block_num: u32) -> Result<BlockInfo> {
		self.call("get_block", &serde_json::json!({ "block_num_or_id": block_num })).await
	}

	pub async fn get_abi(&self, account: Name) -> Result<GetAbiResponse> {
		self.call("get_abi", &serde_json::json!({ "account_name": account })).await
	}

	pub async fn get_table_rows(&self, query: &TableQuery) -> Result<TableRows> {
		self.call("get_table_rows", query).await
	}

	pub async fn push_transaction(
		&self,
		request: &PushTransactionRequest,
	) -> Result<PushTransactionResponse> {
		self.call("push_transaction", request).await
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChainInfo {
	pub chain_id: Checksum256,
	pub head_block_num: u32,
	#[serde(default)]
	pub last_irreversible_block_num: u32,
	#[serde(default)]
	pub head_block_time: String,
	#[serde(default)]
	pub server_version_string: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlockInfo {
	pub id: String,
	pub block_num: u32,
	pub timestamp: String,
	pub ref_block_prefix: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GetAbiResponse {
	pub account_name: String,
	#[serde(default)]
	pub abi: Option<AbiDef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PushTransactionResponse {
	pub transaction_id: Checksum256,
	#[serde(default)]
	pub processed: Value,
}

/// Parameters of `get_table_rows`. Rows always come back as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableQuery {
	json: bool,
	pub code: Name,
	pub scope: String,
	pub table: Name,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lower_bound: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub upper_bound: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub index_position: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub key_type: Option<String>,
	pub limit: u32,
	pub reverse: bool,
}

impl TableQuery {
	pub fn new(code: Name, scope: impl Into<String>, table: Name) -> Self {
		TableQuery {
			json: true,
			code,
			scope: scope.into(),
			table,
			lower_bound: None,
			upper_bound: None,
			index_position: None,
			key_type: None,
			limit: 10,
			reverse: false,
		}
	}

	pub fn lower_bound(mut self, bound: impl ToString) -> Self {
		self.lower_bound = Some(bound.to_string());
		self
	}

	pub fn upper_bound(mut self, bound: impl ToString) -> Self {
		self.upper_bound = Some(bound.to_string());
		self
	}

	/// Query a secondary index; position 1 is the primary key.
	pub fn index(mut self, position: u8, key_type: &str) -> Self {
		self.index_position = Some(position.to_string());
		self.key_type = Some(key_type.to_owned());
		self
	}

	pub fn limit(mut self, limit: u32) -> Self {
		self.limit = limit;
		self
	}

	pub fn reverse(mut self, reverse: bool) -> Self {
		self.reverse = reverse;
		self
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRows {
	pub rows: Vec<Value>,
	#[serde(default)]
	pub more: bool,
	#[serde(default)]
	pub next_key: String,
}

/// Error body returned by the node, e.g. for a failing `eosio_assert`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
	pub code: u16,
	pub message: String,
	#[serde(default)]
	pub error: RpcErrorInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorInfo {
	#[serde(default)]
	pub code: i64,
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub what: String,
	#[serde(default)]
	pub details: Vec<RpcErrorDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcErrorDetail {
	pub message: String,
	#[serde(default)]
	pub file: String,
	#[serde(default)]
	pub line_number: u64,
	#[serde(default)]
	pub method: String,
}

impl RpcError {
	fn from_status(code: u16, body: String) -> Self {
		RpcError { code, message: body, error: Default::default() }
	}

	/// The most specific message the node gave, usually the contract's assertion text.
	pub fn detail_message(&self) -> Option<&str> {
		self.error.details.first().map(|d| d.message.as_str())
	}
}

impl fmt::Display for RpcError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rpc error {}: {}", self.code, self.message)?;
		if !self.error.what.is_empty() {
			write!(f, " ({})", self.error.what)?;
		}
		if let Some(detail) = self.detail_message() {
			write!(f, ": {detail}")?;
		}
		Ok(())
	}
}

impl std::error::Error for RpcError {}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::str::FromStr;

	#[test]
	fn table_query_serializes_only_set_options() {
		let query = TableQuery::new(Name::from_str("mygenericdao").unwrap(), "proposal", Name::from_str("objects").unwrap())
			.index(2, "i64")
			.reverse(true)
			.limit(1);
		assert_eq!(
			serde_json::to_value(&query).unwrap(),
			json!({
				"json": true,
				"code": "mygenericdao",
				"scope": "proposal",
				"table": "objects",
				"index_position": "2",
				"key_type": "i64",
				"limit": 1,
				"reverse": true,
			})
		);
	}

	#[test]
	fn bounds_are_strings() {
		let query = TableQuery::new(Name::default(), "s", Name::default()).lower_bound(5).upper_bound(5);
		let value = serde_json::to_value(&query).unwrap();
		assert_eq!(value["lower_bound"], "5");
		assert_eq!(value["upper_bound"], "5");
	}

	#[test]
	fn node_errors_expose_assertion_text() {
		let body = json!({
			"code": 500,
			"message": "Internal Service Error",
			"error": {
				"code": 3050003,
				"name": "eosio_assert_message_exception",
				"what": "eosio_assert_message assertion failure",
				"details": [{
					"message": "assertion failure with message: Voting is still open",
					"file": "cf_system.cpp",
					"line_number": 14,
					"method": "eosio_assert"
				}]
			}
		});
		let err: RpcError = serde_json::from_value(body).unwrap();
		assert_eq!(err.detail_message(), Some("assertion failure with message: Voting is still open"));
		assert_eq!(
			err.to_string(),
			"rpc error 500: Internal Service Error (eosio_assert_message assertion failure): assertion failure with message: Voting is still open"
		);
	}

	#[test]
	fn plain_error_bodies_are_kept() {
		let err = RpcError::from_status(502, "bad gateway".into());
		assert_eq!(err.detail_message(), None);
		assert_eq!(err.to_string(), "rpc error 502: bad gateway");
	}

	#[test]
	fn table_rows_tolerate_missing_paging_fields() {
		let rows: TableRows = serde_json::from_value(json!({ "rows": [{ "id": 1 }] })).unwrap();
		assert_eq!(rows.rows.len(), 1);
		assert!(!rows.more);
	}
}
