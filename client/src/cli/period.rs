use clap::Subcommand;

use crate::{
	commands::{dao_periods, DaoContext},
	error::CommandError,
};
use eosio_api_client::ChainApi;

#[derive(Subcommand)]
pub enum PeriodCmd {
	/// Add the periods of a csv file (`startdate,enddate` header) one by one
	LoadPeriods { file: String },
}

impl PeriodCmd {
	pub async fn run<A: ChainApi>(&self, ctx: &DaoContext<A>) -> Result<(), CommandError> {
		match self {
			Self::LoadPeriods { file } => dao_periods::load_periods(ctx, file).await,
		}
	}
}
