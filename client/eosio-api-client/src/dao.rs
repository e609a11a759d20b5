//! Tables of the generic DAO contract and the queries the tooling runs on them.

use crate::{ChainApi, Name, Result, TableQuery};
use async_trait::async_trait;
use log::debug;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

pub const PROPOSAL_SCOPE: &str = "proposal";
pub const OBJECTS_TABLE: Name = Name::from_u64(11663940847224750080);
pub const CONFIG_TABLE: Name = Name::from_u64(4982871454518345728);
/// Secondary index of `objects` ordered by creation time.
pub const BY_CREATED_INDEX: u8 = 2;

const PAGE_SIZE: u32 = 100;

/// Actions of the DAO contract and of the ballot contract it delegates voting to.
pub mod action {
	use crate::Name;

	pub const CREATE: Name = Name::from_u64(5031766152489992192);
	pub const SETCONFIG: Name = Name::from_u64(14029427854381416448);
	pub const CLOSEPROP: Name = Name::from_u64(4929617875652050944);
	pub const ADDPERIOD: Name = Name::from_u64(3626335986445189120);
	pub const CASTVOTE: Name = Name::from_u64(4733738213611405312);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyValue<V> {
	pub key: String,
	pub value: V,
}

/// The key/value maps every DAO document carries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataMaps {
	#[serde(default)]
	pub names: Vec<KeyValue<String>>,
	#[serde(default)]
	pub strings: Vec<KeyValue<String>>,
	#[serde(default)]
	pub assets: Vec<KeyValue<String>>,
	#[serde(default)]
	pub time_points: Vec<KeyValue<String>>,
	#[serde(default)]
	pub ints: Vec<KeyValue<Value>>,
	#[serde(default)]
	pub floats: Vec<KeyValue<Value>>,
	#[serde(default)]
	pub trxs: Vec<KeyValue<Value>>,
}

fn lookup<'a, V>(map: &'a [KeyValue<V>], key: &str) -> Option<&'a V> {
	map.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
}

impl DataMaps {
	pub fn name(&self, key: &str) -> Option<&str> {
		lookup(&self.names, key).map(String::as_str)
	}

	pub fn string(&self, key: &str) -> Option<&str> {
		lookup(&self.strings, key).map(String::as_str)
	}

	pub fn asset(&self, key: &str) -> Option<&str> {
		lookup(&self.assets, key).map(String::as_str)
	}

	/// `int64` values come back as numbers, wider ones as strings.
	pub fn int(&self, key: &str) -> Option<i64> {
		match lookup(&self.ints, key)? {
			Value::Number(n) => n.as_i64(),
			Value::String(s) => s.parse().ok(),
			_ => None,
		}
	}
}

/// Row of the `objects` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaoObject {
	#[serde(deserialize_with = "number_or_string")]
	pub id: u64,
	#[serde(flatten)]
	pub data: DataMaps,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_date: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub updated_date: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl DaoObject {
	pub fn title(&self) -> Option<&str> {
		self.data.string("title")
	}

	pub fn owner(&self) -> Option<&str> {
		self.data.name("owner")
	}

	pub fn ballot_id(&self) -> Option<&str> {
		self.data.name("ballot_id")
	}
}

/// The singleton `config` row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DaoConfig {
	#[serde(flatten)]
	pub data: DataMaps,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl DaoConfig {
	pub fn voting_duration(&self) -> Option<Duration> {
		let secs = self.data.int("voting_duration_sec")?;
		u64::try_from(secs).ok().map(Duration::from_secs)
	}
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
	match Value::deserialize(deserializer)? {
		Value::Number(n) => n.as_u64().ok_or_else(|| de::Error::custom(format!("bad id {n}"))),
		Value::String(s) => s.parse().map_err(de::Error::custom),
		other => Err(de::Error::custom(format!("bad id {other}"))),
	}
}

/// DAO queries available on every [`ChainApi`].
#[async_trait]
pub trait DaoApi: ChainApi {
	/// Every proposal, following `next_key` until the table is exhausted.
	async fn get_proposals(&self, contract: Name) -> Result<Vec<DaoObject>> {
		let mut proposals = Vec::new();
		let mut query = TableQuery::new(contract, PROPOSAL_SCOPE, OBJECTS_TABLE).limit(PAGE_SIZE);
		loop {
			let page = self.get_table_rows(&query).await?;
			debug!("got {} proposals, more: {}", page.rows.len(), page.more);
			for row in page.rows {
				proposals.push(serde_json::from_value(row)?);
			}
			if !page.more || page.next_key.is_empty() {
				break
			}
			query = query.lower_bound(page.next_key);
		}
		Ok(proposals)
	}

	async fn get_proposal(&self, contract: Name, id: u64) -> Result<Option<DaoObject>> {
		let query = TableQuery::new(contract, PROPOSAL_SCOPE, OBJECTS_TABLE)
			.lower_bound(id)
			.upper_bound(id)
			.limit(1);
		let rows = self.get_table_rows(&query).await?.rows;
		match rows.into_iter().next() {
			Some(row) => {
				let proposal: DaoObject = serde_json::from_value(row)?;
				Ok((proposal.id == id).then_some(proposal))
			},
			None => Ok(None),
		}
	}

	async fn get_last_created_proposal(&self, contract: Name) -> Result<Option<DaoObject>> {
		let query = TableQuery::new(contract, PROPOSAL_SCOPE, OBJECTS_TABLE)
			.index(BY_CREATED_INDEX, "i64")
			.reverse(true)
			.limit(1);
		let rows = self.get_table_rows(&query).await?.rows;
		rows.into_iter().next().map(serde_json::from_value).transpose().map_err(Into::into)
	}

	async fn get_config(&self, contract: Name) -> Result<Option<DaoConfig>> {
		let query = TableQuery::new(contract, contract.to_string(), CONFIG_TABLE).limit(1);
		let rows = self.get_table_rows(&query).await?.rows;
		rows.into_iter().next().map(serde_json::from_value).transpose().map_err(Into::into)
	}

	async fn get_voting_period(&self, contract: Name) -> Result<Option<Duration>> {
		Ok(self.get_config(contract).await?.and_then(|config| config.voting_duration()))
	}
}

impl<T: ChainApi + ?Sized> DaoApi for T {}
