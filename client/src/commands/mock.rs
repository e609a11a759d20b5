//! In-memory DAO contract for exercising the commands without a node.

use super::DaoContext;
use async_trait::async_trait;
use eosio_api_client::{
	action,
	rpc::{RpcErrorDetail, RpcErrorInfo},
	Checksum256, ChainApi, Error, Name, Result, RpcError, TableQuery, TableRows, TransactionId,
	CONFIG_TABLE, OBJECTS_TABLE,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::{str::FromStr, time::Duration};

#[derive(Clone, Debug, PartialEq)]
pub struct Submitted {
	pub contract: Name,
	pub action: Name,
	pub authorizer: Name,
	pub data: Value,
}

#[derive(Default)]
pub struct MockChain {
	pub proposals: Mutex<Vec<Value>>,
	pub config: Option<Value>,
	/// Proposals whose `closeprop` the contract refuses.
	pub open_ballots: Vec<u64>,
	/// Actions that always fail.
	pub rejected: Vec<Name>,
	/// No key loaded, every submission fails before reaching the node.
	pub unsigned: bool,
	pub submitted: Mutex<Vec<Submitted>>,
}

pub fn name(s: &str) -> Name {
	Name::from_str(s).unwrap()
}

pub fn proposal_row(id: u64, owner: &str) -> Value {
	json!({
		"id": id,
		"names": [
			{ "key": "owner", "value": owner },
			{ "key": "type", "value": "role" },
			{ "key": "ballot_id", "value": format!("ballot{id}") }
		],
		"strings": [{ "key": "title", "value": format!("proposal {id}") }],
		"created_date": "2024-01-01T00:00:00.000"
	})
}

fn assertion_failure(message: &str) -> Error {
	Error::Rpc(RpcError {
		code: 500,
		message: "Internal Service Error".into(),
		error: RpcErrorInfo {
			code: 3050003,
			name: "eosio_assert_message_exception".into(),
			what: "eosio_assert_message assertion failure".into(),
			details: vec![RpcErrorDetail {
				message: format!("assertion failure with message: {message}"),
				..Default::default()
			}],
		},
	})
}

impl MockChain {
	pub fn with_proposals(proposals: Vec<Value>) -> Self {
		MockChain { proposals: Mutex::new(proposals), ..Default::default() }
	}

	pub fn with_voting_period(mut self, secs: u64) -> Self {
		self.config = Some(json!({ "ints": [{ "key": "voting_duration_sec", "value": secs }] }));
		self
	}

	pub fn into_context(self) -> DaoContext<Self> {
		DaoContext {
			api: self,
			contract: name("mygenericdao"),
			decide_contract: name("telos.decide"),
			dryrun: false,
			settle_delay: Duration::ZERO,
			close_grace: Duration::ZERO,
		}
	}

	pub fn submitted(&self) -> Vec<Submitted> {
		self.submitted.lock().clone()
	}

	fn rows(&self, query: &TableQuery) -> Vec<Value> {
		if query.table == CONFIG_TABLE {
			return self.config.iter().cloned().collect()
		}
		if query.table != OBJECTS_TABLE {
			return vec![]
		}
		let proposals = self.proposals.lock();
		if query.index_position.is_some() {
			return proposals.last().cloned().into_iter().collect()
		}
		match (&query.lower_bound, &query.upper_bound) {
			(Some(lower), Some(upper)) => {
				let range = lower.parse::<u64>().unwrap_or(0)..=upper.parse::<u64>().unwrap_or(u64::MAX);
				proposals
					.iter()
					.filter(|p| range.contains(&p["id"].as_u64().unwrap_or(0)))
					.cloned()
					.collect()
			},
			_ => proposals.clone(),
		}
	}
}

#[async_trait]
impl ChainApi for MockChain {
	async fn submit_transaction(
		&self,
		contract: Name,
		action_name: Name,
		authorizer: Name,
		data: &Value,
	) -> Result<TransactionId> {
		if self.unsigned {
			return Err(Error::NoSigner)
		}
		if self.rejected.contains(&action_name) {
			return Err(assertion_failure(&format!("{action_name} rejected")))
		}
		if action_name == action::CLOSEPROP {
			let id = data["proposal_id"].as_u64().unwrap_or_default();
			if self.open_ballots.contains(&id) {
				return Err(assertion_failure("voting is still open"))
			}
		}
		if action_name == action::CREATE {
			let mut proposals = self.proposals.lock();
			let id = proposals.len() as u64;
			let mut row = data.clone();
			row["id"] = json!(id);
			if let Some(names) = row["names"].as_array_mut() {
				names.push(json!({ "key": "ballot_id", "value": format!("ballot{id}") }));
			}
			proposals.push(row);
		}

		let mut submitted = self.submitted.lock();
		submitted.push(Submitted { contract, action: action_name, authorizer, data: data.clone() });
		Ok(Checksum256([submitted.len() as u8; 32]))
	}

	async fn get_table_rows(&self, query: &TableQuery) -> Result<TableRows> {
		Ok(TableRows { rows: self.rows(query), more: false, next_key: String::new() })
	}
}
