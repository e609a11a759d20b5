//! Minimal client for EOSIO-style chains: ABI driven action serialization,
//! transaction signing and the `/v1/chain` JSON-RPC endpoints.
//!
//! The DAO tooling only talks to the chain through [`ChainApi`] and the
//! [`DaoApi`] extension on top of it.

pub use api::*;
pub use dao::*;
pub use error::{Error, Result};
pub use keys::{PrivateKey, PublicKey, Signature};
pub use rpc::{JsonRpc, RpcError, TableQuery, TableRows};
pub use types::{Asset, Checksum256, Name, Symbol, SymbolCode, TimePoint, TimePointSec};

pub mod abi;
mod api;
mod dao;
mod error;
pub mod keys;
pub mod rpc;
pub mod transaction;
pub mod types;
