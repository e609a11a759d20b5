//  Copyright (c) 2019 Alain Brenzikofer
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! a command line client for the generic DAO contract
//!
//! examples:
//! dao-client propose payloads/role-proposal.json --approve --close
//! dao-client -u https://test.telos.kitchen set-config payloads/config.json
//! dao-client close-all
//!

pub(crate) mod cli;
mod commands;
mod dao_payload;
mod error;
mod utils;

use clap::Parser;
use cli::Cli;
use log::error;

mod exit_code {
	pub const RPC_ERROR: i32 = 60;
	pub const NOT_FOUND: i32 = 61;
	pub const CONFIG_NOT_SET: i32 = 62;
	pub const INVALID_PAYLOAD: i32 = 70;
	pub const INVALID_KEY: i32 = 71;
}

#[tokio::main]
async fn main() {
	env_logger::init();
	let cli = Cli::parse();
	if let Err(e) = commands::run(&cli).await {
		error!("{e:?}");
		eprintln!("{e}");
		std::process::exit(e.exit_code());
	}
}
