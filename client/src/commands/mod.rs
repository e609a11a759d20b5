pub mod dao_config;
pub mod dao_periods;
pub mod dao_proposals;

#[cfg(test)]
pub(crate) mod mock;

use crate::{
	cli::{Cli, Commands},
	error::CommandError,
	utils::get_chain_api,
};
use eosio_api_client::{transaction::PermissionLevel, ChainApi, Name, TransactionId};
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;

/// Everything a DAO command needs: the chain and the accounts it acts on.
pub struct DaoContext<A> {
	pub api: A,
	pub contract: Name,
	pub decide_contract: Name,
	pub dryrun: bool,
	pub settle_delay: Duration,
	pub close_grace: Duration,
}

impl<A: ChainApi> DaoContext<A> {
	pub fn new(api: A, cli: &Cli) -> Self {
		DaoContext {
			api,
			contract: cli.contract,
			decide_contract: cli.decide_contract,
			dryrun: cli.dryrun,
			settle_delay: Duration::from_millis(cli.settle_delay_ms),
			close_grace: Duration::from_millis(cli.close_grace_ms),
		}
	}

	/// Sends one action, or only prints it on a dry run (`None`).
	pub async fn submit(
		&self,
		contract: Name,
		action: Name,
		authorizer: Name,
		data: &Value,
	) -> Result<Option<TransactionId>, CommandError> {
		if self.dryrun {
			let action = json!({
				"account": contract,
				"name": action,
				"authorization": [PermissionLevel::active(authorizer)],
				"data": data,
			});
			println!("dry run, not sending:\n{}", serde_json::to_string_pretty(&action)?);
			return Ok(None)
		}
		debug!("submitting {contract}::{action} as {authorizer}");
		let trx_id = self.api.submit_transaction(contract, action, authorizer, data).await?;
		println!("Transaction successful : {trx_id}");
		Ok(Some(trx_id))
	}
}

pub async fn run(cli: &Cli) -> Result<(), CommandError> {
	let ctx = DaoContext::new(get_chain_api(cli)?, cli);
	match &cli.command {
		Commands::Config(cmd) => cmd.run(&ctx).await,
		Commands::Proposal(cmd) => cmd.run(&ctx).await,
		Commands::Period(cmd) => cmd.run(&ctx).await,
	}
}

#[cfg(test)]
mod tests {
	use super::{mock::MockChain, *};
	use std::str::FromStr;

	#[tokio::test]
	async fn dry_run_sends_nothing() {
		let mut ctx = MockChain::default().into_context();
		ctx.dryrun = true;
		let dao = ctx.contract;
		let sent = ctx
			.submit(dao, Name::from_str("closeprop").unwrap(), dao, &json!({ "proposal_id": 1 }))
			.await
			.unwrap();
		assert_eq!(sent, None);
		assert!(ctx.api.submitted().is_empty());
	}

	#[tokio::test]
	async fn submit_passes_through() {
		let ctx = MockChain::default().into_context();
		let dao = ctx.contract;
		let sent = ctx
			.submit(dao, Name::from_str("closeprop").unwrap(), dao, &json!({ "proposal_id": 1 }))
			.await
			.unwrap();
		assert!(sent.is_some());
		let submitted = ctx.api.submitted();
		assert_eq!(submitted.len(), 1);
		assert_eq!(submitted[0].authorizer, dao);
		assert_eq!(submitted[0].data, json!({ "proposal_id": 1 }));
	}
}
