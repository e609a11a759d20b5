use clap::Subcommand;

use crate::{
	commands::{dao_proposals, DaoContext},
	error::CommandError,
};
use eosio_api_client::{ChainApi, Name};

#[derive(Subcommand)]
pub enum ProposalCmd {
	/// Submit a proposal, optionally vote for it and close it once voting ended
	Propose {
		/// Proposal payload (json with a `data` object)
		file: String,
		/// Vote `pass` on the new proposal as its owner
		#[arg(short = 'a', long)]
		approve: bool,
		/// Wait for the voting period to end, then close the new proposal
		#[arg(short = 'c', long)]
		close: bool,
	},
	/// Vote `pass` on a proposal's ballot
	Approve {
		proposal_id: u64,
		/// Voting account, defaults to the proposal owner
		#[arg(long)]
		voter: Option<Name>,
	},
	/// Close a single proposal
	Close { proposal_id: u64 },
	/// Try to close every proposal, reporting the ones that cannot be closed
	CloseAll,
	/// Print a proposal as json
	PrintProposal { proposal_id: u64 },
	/// List all proposals, one per line
	ListProposals,
}

impl ProposalCmd {
	pub async fn run<A: ChainApi>(&self, ctx: &DaoContext<A>) -> Result<(), CommandError> {
		match self {
			Self::Propose { file, approve, close } =>
				dao_proposals::propose(ctx, file, *approve, *close).await,
			Self::Approve { proposal_id, voter } =>
				dao_proposals::approve(ctx, *proposal_id, *voter).await,
			Self::Close { proposal_id } => dao_proposals::close(ctx, *proposal_id).await,
			Self::CloseAll => dao_proposals::close_all(ctx).await,
			Self::PrintProposal { proposal_id } =>
				dao_proposals::print_proposal(ctx, *proposal_id).await,
			Self::ListProposals => dao_proposals::list_proposals(ctx).await,
		}
	}
}
