use crate::{
	commands::DaoContext,
	dao_payload::{read_payload_from_file, require, require_data, require_name, DaoPayload},
	error::CommandError,
	utils::{self, report_close_failure, sleep},
};
use eosio_api_client::{action, ChainApi, DaoApi, DaoObject, Error, Name};
use log::{info, warn};
use serde_json::json;

/// The only option the tooling ever votes for.
const PASS: &str = "pass";

pub async fn propose<A: ChainApi>(
	ctx: &DaoContext<A>,
	path: &str,
	approve: bool,
	close: bool,
) -> Result<(), CommandError> {
	let proposal = read_payload_from_file(path)?;
	let data = require_data(&proposal, path)?;
	let title = require(proposal.title(), path, "strings.title")?;
	let proposal_type = require(proposal.proposal_type(), path, "names.type")?;
	let owner = require_name(proposal.owner(), path, "names.owner")?;

	println!("\nParsing the proposal from : {path}");
	println!("-- title            : {title}");
	println!("-- type             : {proposal_type}");
	println!("-- proposer         : {owner}");

	println!("\nSubmitting proposal : {path}");
	let created = ctx.submit(ctx.contract, action::CREATE, owner, data).await?;
	if !(approve || close) {
		return Ok(())
	}
	if created.is_none() {
		info!("dry run, the proposal does not exist and cannot be approved or closed");
		return Ok(())
	}

	// the table must reflect the new proposal before it can be read back
	sleep(ctx.settle_delay, "Eliminating likelihood of REVERT before retrieving proposal...").await;
	let last = ctx
		.api
		.get_last_created_proposal(ctx.contract)
		.await?
		.ok_or(CommandError::NoProposals(ctx.contract))?;
	if last.owner() != Some(owner.to_string().as_str()) {
		warn!("last created proposal {} is not owned by {owner}", last.id);
	}

	if approve {
		cast_vote(ctx, &last, owner).await?;
	}

	if close {
		println!("\nClosing the proposal (after the wait)");
		println!("-- calling closeprop with the following parms:");
		println!("-- -- proposal_id   : {}", last.id);

		let voting_period = ctx
			.api
			.get_voting_period(ctx.contract)
			.await?
			.ok_or(CommandError::ConfigNotSet(ctx.contract))?;
		let wait = voting_period + ctx.close_grace;
		sleep(
			wait,
			&format!("Waiting {} seconds while the ballot expiration expires...", wait.as_secs()),
		)
		.await;
		if !close_proposal(ctx, &last, owner).await? {
			return Err(CommandError::CloseFailed(last.id))
		}
	}
	Ok(())
}

pub async fn approve<A: ChainApi>(
	ctx: &DaoContext<A>,
	proposal_id: u64,
	voter: Option<Name>,
) -> Result<(), CommandError> {
	let proposal = get_proposal(ctx, proposal_id).await?;
	let voter = match voter {
		Some(voter) => voter,
		None => proposal.owner().and_then(|owner| owner.parse().ok()).ok_or_else(|| {
			CommandError::IncompleteProposal { id: proposal.id, key: "names.owner".into() }
		})?,
	};
	cast_vote(ctx, &proposal, voter).await
}

pub async fn close<A: ChainApi>(ctx: &DaoContext<A>, proposal_id: u64) -> Result<(), CommandError> {
	let proposal = get_proposal(ctx, proposal_id).await?;
	if !close_proposal(ctx, &proposal, ctx.contract).await? {
		return Err(CommandError::CloseFailed(proposal_id))
	}
	Ok(())
}

/// Tries every proposal in turn; a proposal that cannot be closed is reported and skipped.
pub async fn close_all<A: ChainApi>(ctx: &DaoContext<A>) -> Result<(), CommandError> {
	let proposals = ctx.api.get_proposals(ctx.contract).await?;
	if proposals.is_empty() {
		println!("There are no proposals");
		return Ok(())
	}

	let mut closed = 0;
	for proposal in &proposals {
		if close_proposal(ctx, proposal, ctx.contract).await? {
			closed += 1;
		}
	}
	println!("Closed {closed} of {} proposals", proposals.len());
	Ok(())
}

pub async fn print_proposal<A: ChainApi>(
	ctx: &DaoContext<A>,
	proposal_id: u64,
) -> Result<(), CommandError> {
	let proposal = get_proposal(ctx, proposal_id).await?;
	utils::print_proposal(&proposal)
}

pub async fn list_proposals<A: ChainApi>(ctx: &DaoContext<A>) -> Result<(), CommandError> {
	let proposals = ctx.api.get_proposals(ctx.contract).await?;
	if proposals.is_empty() {
		println!("There are no proposals");
	}
	for p in proposals {
		println!(
			"{:>6}  {:<12} {:<12} {}",
			p.id,
			p.data.name("type").unwrap_or("-"),
			p.owner().unwrap_or("-"),
			p.title().unwrap_or_default()
		);
	}
	Ok(())
}

async fn get_proposal<A: ChainApi>(
	ctx: &DaoContext<A>,
	proposal_id: u64,
) -> Result<DaoObject, CommandError> {
	ctx.api
		.get_proposal(ctx.contract, proposal_id)
		.await?
		.ok_or(CommandError::ProposalNotFound(proposal_id))
}

async fn cast_vote<A: ChainApi>(
	ctx: &DaoContext<A>,
	proposal: &DaoObject,
	voter: Name,
) -> Result<(), CommandError> {
	let ballot = proposal.ballot_id().ok_or_else(|| CommandError::IncompleteProposal {
		id: proposal.id,
		key: "names.ballot_id".into(),
	})?;

	println!("\nApproving the proposal");
	println!("-- calling {}::castvote with the following parms:", ctx.decide_contract);
	println!("-- -- voter       : {voter}");
	println!("-- -- ballot_id   : {ballot}");
	println!("-- -- options     : [{PASS}]");

	let data = json!({ "voter": voter, "ballot_name": ballot, "options": [PASS] });
	ctx.submit(ctx.decide_contract, action::CASTVOTE, voter, &data).await?;
	Ok(())
}

/// `Ok(false)` when the contract refused, after the refusal has been reported.
async fn close_proposal<A: ChainApi>(
	ctx: &DaoContext<A>,
	proposal: &DaoObject,
	authorizer: Name,
) -> Result<bool, CommandError> {
	let data = json!({ "proposal_id": proposal.id });
	match ctx.submit(ctx.contract, action::CLOSEPROP, authorizer, &data).await {
		Ok(_) => Ok(true),
		Err(CommandError::Chain(e)) if !matches!(e, Error::NoSigner) => {
			warn!("closing proposal {} failed: {e}", proposal.id);
			report_close_failure(&e, proposal)?;
			Ok(false)
		},
		Err(e) => Err(e),
	}
}
