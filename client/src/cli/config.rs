use clap::Subcommand;

use crate::{
	commands::{dao_config, DaoContext},
	error::CommandError,
};
use eosio_api_client::ChainApi;

#[derive(Subcommand)]
pub enum ConfigCmd {
	/// Submit the configuration of the DAO
	SetConfig {
		/// Config payload (json with a `data` object)
		file: String,
	},
	/// Print the configuration currently stored in the DAO
	PrintConfig,
}

impl ConfigCmd {
	pub async fn run<A: ChainApi>(&self, ctx: &DaoContext<A>) -> Result<(), CommandError> {
		match self {
			Self::SetConfig { file } => dao_config::set_config(ctx, file).await,
			Self::PrintConfig => dao_config::print_config(ctx).await,
		}
	}
}
