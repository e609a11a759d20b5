use crate::error::CommandError;
use eosio_api_client::Name;
use log::debug;
use serde_json::Value;

pub fn read_payload_from_file(path: &str) -> Result<Value, CommandError> {
	let payload_str = std::fs::read_to_string(path)
		.map_err(|source| CommandError::ReadFile { path: path.to_owned(), source })?;
	debug!("read {} bytes from {path}", payload_str.len());
	serde_json::from_str(&payload_str)
		.map_err(|source| CommandError::ParsePayload { path: path.to_owned(), source })
}

/// Lookups into a proposal or config payload, `{ "data": { "names": [{key, value}], ... } }`
pub trait DaoPayload {
	/// The part of the payload that is sent as action data.
	fn data(&self) -> Option<&Value>;

	/// Value of `key` in the key/value list `map` of the data.
	fn lookup(&self, map: &str, key: &str) -> Option<&Value>;

	fn title(&self) -> Option<&str> {
		self.lookup("strings", "title").and_then(Value::as_str)
	}

	fn proposal_type(&self) -> Option<&str> {
		self.lookup("names", "type").and_then(Value::as_str)
	}

	fn owner(&self) -> Option<&str> {
		self.lookup("names", "owner").and_then(Value::as_str)
	}

	fn reward_token_contract(&self) -> Option<&str> {
		self.lookup("names", "reward_token_contract").and_then(Value::as_str)
	}

	fn telos_decide_contract(&self) -> Option<&str> {
		self.lookup("names", "telos_decide_contract").and_then(Value::as_str)
	}
}

impl DaoPayload for Value {
	fn data(&self) -> Option<&Value> {
		self.get("data").filter(|data| data.is_object())
	}

	fn lookup(&self, map: &str, key: &str) -> Option<&Value> {
		self.data()?
			.get(map)?
			.as_array()?
			.iter()
			.find(|kv| kv["key"] == key)
			.map(|kv| &kv["value"])
	}
}

pub fn require_data<'a>(payload: &'a Value, path: &str) -> Result<&'a Value, CommandError> {
	payload.data().ok_or_else(|| CommandError::MissingData { path: path.to_owned() })
}

pub fn require<'a>(value: Option<&'a str>, path: &str, key: &str) -> Result<&'a str, CommandError> {
	value.ok_or_else(|| CommandError::MissingKey { path: path.to_owned(), key: key.to_owned() })
}

pub fn require_name(value: Option<&str>, path: &str, key: &str) -> Result<Name, CommandError> {
	let value = require(value, path, key)?;
	value.parse().map_err(|_| CommandError::InvalidName {
		path: path.to_owned(),
		key: key.to_owned(),
		value: value.to_owned(),
	})
}
