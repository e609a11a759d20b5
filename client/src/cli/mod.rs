mod config;
mod period;
mod proposal;

pub use config::*;
pub use period::*;
pub use proposal::*;

use clap::{Parser, Subcommand};
use eosio_api_client::{Name, DEFAULT_BLOCKS_BEHIND, DEFAULT_EXPIRE_SECONDS};

#[derive(Parser)]
#[command(
	name = "dao-client",
	version,
	about = "submit and query transactions against the generic DAO contract"
)]
pub struct Cli {
	#[arg(short = 'u', long, global = true, default_value = "https://test.telos.kitchen")]
	pub node_url: String,

	#[arg(long, global = true, default_value = "mygenericdao", help = "account of the DAO contract")]
	pub contract: Name,

	#[arg(
		long,
		global = true,
		default_value = "telos.decide",
		help = "ballot contract the DAO delegates voting to"
	)]
	pub decide_contract: Name,

	#[arg(long, global = true, help = "never fall back to the development key")]
	pub prod: bool,

	#[arg(
		long,
		global = true,
		env = "PRIVATE_KEY",
		hide_env_values = true,
		help = "signing key, WIF or PVT_K1_ encoded"
	)]
	pub private_key: Option<String>,

	#[arg(short = 'd', long, global = true, help = "print the action instead of sending it")]
	pub dryrun: bool,

	#[arg(
		long,
		global = true,
		default_value_t = 10_000,
		value_name = "MS",
		help = "wait before reading back a freshly created proposal"
	)]
	pub settle_delay_ms: u64,

	#[arg(
		long,
		global = true,
		default_value_t = 20_000,
		value_name = "MS",
		help = "added to the voting period before closing"
	)]
	pub close_grace_ms: u64,

	#[arg(long, global = true, default_value_t = DEFAULT_BLOCKS_BEHIND)]
	pub blocks_behind: u32,

	#[arg(long, global = true, default_value_t = DEFAULT_EXPIRE_SECONDS)]
	pub expire_seconds: u32,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	#[command(flatten)]
	Config(ConfigCmd),
	#[command(flatten)]
	Proposal(ProposalCmd),
	#[command(flatten)]
	Period(PeriodCmd),
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn defaults() {
		let cli = Cli::parse_from(["dao-client", "close-all"]);
		assert_eq!(cli.node_url, "https://test.telos.kitchen");
		assert_eq!(cli.contract, Name::from_str("mygenericdao").unwrap());
		assert_eq!(cli.decide_contract, Name::from_str("telos.decide").unwrap());
		assert_eq!(cli.settle_delay_ms, 10_000);
		assert_eq!(cli.close_grace_ms, 20_000);
		assert_eq!(cli.blocks_behind, 3);
		assert_eq!(cli.expire_seconds, 30);
		assert!(!cli.prod);
		assert!(!cli.dryrun);
		assert!(matches!(cli.command, Commands::Proposal(ProposalCmd::CloseAll)));
	}

	#[test]
	fn global_args_after_subcommand() {
		let cli = Cli::parse_from([
			"dao-client",
			"propose",
			"payload.json",
			"-a",
			"--close",
			"--contract",
			"otherdao",
			"-d",
		]);
		assert!(cli.dryrun);
		assert_eq!(cli.contract, Name::from_str("otherdao").unwrap());
		match cli.command {
			Commands::Proposal(ProposalCmd::Propose { file, approve, close }) => {
				assert_eq!(file, "payload.json");
				assert!(approve);
				assert!(close);
			},
			_ => panic!("expected propose"),
		}
	}

	#[test]
	fn proposal_ids_are_numbers() {
		assert!(Cli::try_parse_from(["dao-client", "close", "abc"]).is_err());
		let cli = Cli::parse_from(["dao-client", "approve", "4", "--voter", "bob"]);
		match cli.command {
			Commands::Proposal(ProposalCmd::Approve { proposal_id, voter }) => {
				assert_eq!(proposal_id, 4);
				assert_eq!(voter, Some(Name::from_str("bob").unwrap()));
			},
			_ => panic!("expected approve"),
		}
	}

	#[test]
	fn contract_must_be_a_name() {
		assert!(Cli::try_parse_from(["dao-client", "--contract", "Not_A_Name", "close-all"]).is_err());
		assert!(Cli::try_parse_from(["dao-client", "--contract", "", "close-all"]).is_err());
		assert!(Cli::try_parse_from(["dao-client", "--decide-contract", "telos.", "close-all"]).is_err());
	}

	#[test]
	fn file_arguments_are_required() {
		assert!(Cli::try_parse_from(["dao-client", "set-config"]).is_err());
		assert!(Cli::try_parse_from(["dao-client", "load-periods"]).is_err());
	}
}
