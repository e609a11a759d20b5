use crate::{
	commands::DaoContext,
	dao_payload::{read_payload_from_file, require, require_data, DaoPayload},
	error::CommandError,
};
use eosio_api_client::{action, ChainApi, DaoApi};

pub async fn set_config<A: ChainApi>(ctx: &DaoContext<A>, path: &str) -> Result<(), CommandError> {
	let config = read_payload_from_file(path)?;
	let data = require_data(&config, path)?;
	let reward_token_contract =
		require(config.reward_token_contract(), path, "names.reward_token_contract")?;
	let telos_decide_contract =
		require(config.telos_decide_contract(), path, "names.telos_decide_contract")?;

	println!("\nParsing the configuration from : {path}");
	println!("-- reward_token_contract   : {reward_token_contract}");
	println!("-- telos_decide_contract  : {telos_decide_contract}");

	println!("\nSubmitting configuration : {path}");
	ctx.submit(ctx.contract, action::SETCONFIG, ctx.contract, data).await?;
	Ok(())
}

pub async fn print_config<A: ChainApi>(ctx: &DaoContext<A>) -> Result<(), CommandError> {
	let config =
		ctx.api.get_config(ctx.contract).await?.ok_or(CommandError::ConfigNotSet(ctx.contract))?;
	println!("{}", serde_json::to_string_pretty(&config)?);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::commands::mock::{name, MockChain};
	use serde_json::json;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn payload_file(payload: serde_json::Value) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "{payload}").unwrap();
		file
	}

	fn config() -> serde_json::Value {
		json!({
			"data": {
				"names": [
					{ "key": "reward_token_contract", "value": "token.hypha" },
					{ "key": "telos_decide_contract", "value": "telos.decide" }
				],
				"ints": [{ "key": "voting_duration_sec", "value": 3600 }]
			}
		})
	}

	#[tokio::test]
	async fn set_config_sends_data_as_contract() {
		let ctx = MockChain::default().into_context();
		let file = payload_file(config());
		set_config(&ctx, file.path().to_str().unwrap()).await.unwrap();

		let sent = ctx.api.submitted();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].contract, name("mygenericdao"));
		assert_eq!(sent[0].action, action::SETCONFIG);
		assert_eq!(sent[0].authorizer, name("mygenericdao"));
		assert_eq!(sent[0].data, config()["data"]);
	}

	#[tokio::test]
	async fn set_config_requires_both_contracts() {
		let ctx = MockChain::default().into_context();
		let file = payload_file(json!({
			"data": { "names": [{ "key": "reward_token_contract", "value": "token.hypha" }] }
		}));
		let err = set_config(&ctx, file.path().to_str().unwrap()).await.unwrap_err();
		assert!(
			matches!(err, CommandError::MissingKey { ref key, .. } if key == "names.telos_decide_contract")
		);
		assert!(ctx.api.submitted().is_empty());
	}

	#[tokio::test]
	async fn print_config_reports_unset_config() {
		let ctx = MockChain::default().into_context();
		assert!(matches!(print_config(&ctx).await, Err(CommandError::ConfigNotSet(_))));

		let ctx = MockChain::default().with_voting_period(60).into_context();
		print_config(&ctx).await.unwrap();
	}
}
