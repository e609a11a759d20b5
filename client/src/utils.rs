use crate::{cli::Cli, error::CommandError};
use eosio_api_client::{Api, DaoObject, Error, JsonRpc, PrivateKey};
use log::{info, warn};
use std::time::Duration;

/// Well known development key, used whenever no key is given outside of `--prod`.
pub const DEV_PRIVATE_KEY: &str = "5JsZRwcBkRyetarreHpLuVyBJwCimf1KxyLtbCpDtMB3Jz7mtt7";

pub fn get_signer(cli: &Cli) -> Result<Option<PrivateKey>, CommandError> {
	match (&cli.private_key, cli.prod) {
		(Some(key), _) => key.trim().parse().map(Some).map_err(CommandError::InvalidKey),
		(None, true) => {
			warn!("--prod given but PRIVATE_KEY is not set, transactions cannot be signed");
			Ok(None)
		},
		(None, false) => {
			info!("no PRIVATE_KEY set, signing with the development key");
			DEV_PRIVATE_KEY.parse().map(Some).map_err(CommandError::InvalidKey)
		},
	}
}

pub fn get_chain_api(cli: &Cli) -> Result<Api, CommandError> {
	info!("connecting to {}", cli.node_url);
	let mut api = Api::new(JsonRpc::new(cli.node_url.as_str()));
	api.set_tapos(cli.blocks_behind, cli.expire_seconds);
	if let Some(signer) = get_signer(cli)? {
		api.set_signer(signer);
	}
	Ok(api)
}

pub async fn sleep(duration: Duration, msg: &str) {
	println!("\nPlease wait : {} ms ... {msg}\n", duration.as_millis());
	tokio::time::sleep(duration).await;
}

pub fn print_proposal(proposal: &DaoObject) -> Result<(), CommandError> {
	println!("{}", serde_json::to_string_pretty(proposal)?);
	println!();
	Ok(())
}

/// Prints why `proposal` could not be closed, preferring the contract's own message.
pub fn report_close_failure(err: &Error, proposal: &DaoObject) -> Result<(), CommandError> {
	println!("------- BEGIN: Cannot close proposal ---------");
	match err {
		Error::Rpc(rpc) => match rpc.detail_message() {
			Some(detail) => println!("{detail}"),
			None => println!("{rpc}"),
		},
		other => println!("{other}"),
	}
	print_proposal(proposal)?;
	println!("------- END: Cannot close proposal ---------");
	println!("\n\n");
	Ok(())
}
