use crate::exit_code;
use eosio_api_client::{Error, Name};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
	#[error("cannot read {path}: {source}")]
	ReadFile { path: String, source: std::io::Error },

	#[error("{path} is not valid json: {source}")]
	ParsePayload { path: String, source: serde_json::Error },

	#[error("cannot read periods from {path}: {source}")]
	ParsePeriods { path: String, source: csv::Error },

	#[error("{path} has no `data` object")]
	MissingData { path: String },

	#[error("{path} has no `{key}`")]
	MissingKey { path: String, key: String },

	#[error("`{key}` in {path} is not an account name: {value}")]
	InvalidName { path: String, key: String, value: String },

	#[error("invalid private key: {0}")]
	InvalidKey(#[source] Error),

	#[error("there is no proposal with id {0}")]
	ProposalNotFound(u64),

	#[error("there are no proposals in {0}")]
	NoProposals(Name),

	#[error("proposal {id} has no `{key}`")]
	IncompleteProposal { id: u64, key: String },

	#[error("configuration of {0} has not been set")]
	ConfigNotSet(Name),

	#[error("proposal {0} could not be closed")]
	CloseFailed(u64),

	#[error("loading periods stopped after {loaded} of {total}")]
	PeriodsAborted { loaded: usize, total: usize },

	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Chain(#[from] Error),
}

impl CommandError {
	pub fn exit_code(&self) -> i32 {
		match self {
			Self::ReadFile { .. } |
			Self::ParsePayload { .. } |
			Self::ParsePeriods { .. } |
			Self::MissingData { .. } |
			Self::MissingKey { .. } |
			Self::InvalidName { .. } |
			Self::Chain(Error::Abi { .. } | Error::UnknownAction { .. }) => exit_code::INVALID_PAYLOAD,
			Self::InvalidKey(_) | Self::Chain(Error::NoSigner) => exit_code::INVALID_KEY,
			Self::ProposalNotFound(_) | Self::NoProposals(_) | Self::IncompleteProposal { .. } =>
				exit_code::NOT_FOUND,
			Self::ConfigNotSet(_) => exit_code::CONFIG_NOT_SET,
			Self::CloseFailed(_) | Self::Chain(Error::Rpc(_) | Error::Http(_)) => exit_code::RPC_ERROR,
			_ => 1,
		}
	}
}
