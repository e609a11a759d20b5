use crate::rpc::RpcError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// Transport level failure talking to the node.
	#[error("http request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// The node answered with an error body.
	#[error("{0}")]
	Rpc(RpcError),

	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("abi error at `{path}`: {message}")]
	Abi { path: String, message: String },

	#[error("contract {contract} has no abi")]
	MissingAbi { contract: String },

	#[error("action {action} is not declared in the abi of {contract}")]
	UnknownAction { contract: String, action: String },

	#[error("invalid name `{0}`")]
	InvalidName(String),

	#[error("invalid symbol `{0}`")]
	InvalidSymbol(String),

	#[error("invalid asset `{0}`")]
	InvalidAsset(String),

	#[error("invalid time point `{0}`")]
	InvalidTime(String),

	#[error("invalid key: {0}")]
	InvalidKey(String),

	#[error("invalid signature: {0}")]
	InvalidSignature(String),

	#[error("invalid checksum `{0}`")]
	InvalidChecksum(String),

	#[error("no signing key configured")]
	NoSigner,
}

impl Error {
	pub(crate) fn abi(path: impl Into<String>, message: impl Into<String>) -> Self {
		Error::Abi { path: path.into(), message: message.into() }
	}
}

impl From<RpcError> for Error {
	fn from(e: RpcError) -> Self {
		Error::Rpc(e)
	}
}
