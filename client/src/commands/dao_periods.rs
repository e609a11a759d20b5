use crate::{commands::DaoContext, error::CommandError};
use eosio_api_client::{action, ChainApi};
use serde::Deserialize;
use serde_json::json;

/// One row of a periods file.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Period {
	pub startdate: String,
	pub enddate: String,
}

pub fn read_periods_from_file(path: &str) -> Result<Vec<Period>, CommandError> {
	let err = |source| CommandError::ParsePeriods { path: path.to_owned(), source };
	let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path).map_err(err)?;
	reader.deserialize().collect::<Result<Vec<Period>, _>>().map_err(err)
}

/// Adds the periods in file order and stops at the first one the contract rejects.
pub async fn load_periods<A: ChainApi>(ctx: &DaoContext<A>, path: &str) -> Result<(), CommandError> {
	let periods = read_periods_from_file(path)?;
	if periods.is_empty() {
		println!("No periods found in {path}");
		return Ok(())
	}

	for (loaded, period) in periods.iter().enumerate() {
		println!("Adding a period: {}", period.startdate);
		let data = json!({ "start_time": period.startdate, "end_time": period.enddate });
		match ctx.submit(ctx.contract, action::ADDPERIOD, ctx.contract, &data).await {
			Ok(Some(_)) => println!("Successfully created period: {}", period.startdate),
			Ok(None) => {},
			Err(e) => {
				eprintln!("{e}");
				println!("Please, fix an error and run script again");
				return Err(CommandError::PeriodsAborted { loaded, total: periods.len() })
			},
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::commands::mock::MockChain;
	use std::io::Write;
	use tempfile::NamedTempFile;

	fn csv_file(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "{content}").unwrap();
		file
	}

	const PERIODS: &str = "startdate,enddate\n\
		2021-01-01T00:00:00.000, 2021-01-08T00:00:00.000\n\
		2021-01-08T00:00:00.000, 2021-01-15T00:00:00.000\n\
		2021-01-15T00:00:00.000, 2021-01-22T00:00:00.000\n";

	#[test]
	fn reads_rows_by_header() {
		let file = csv_file("enddate,startdate\nb,a\n");
		let periods = read_periods_from_file(file.path().to_str().unwrap()).unwrap();
		assert_eq!(periods, vec![Period { startdate: "a".into(), enddate: "b".into() }]);
	}

	#[test]
	fn missing_columns_are_errors() {
		let file = csv_file("start,end\na,b\n");
		assert!(matches!(
			read_periods_from_file(file.path().to_str().unwrap()),
			Err(CommandError::ParsePeriods { .. })
		));
	}

	#[tokio::test]
	async fn one_addperiod_per_row() {
		let ctx = MockChain::default().into_context();
		let file = csv_file(PERIODS);
		load_periods(&ctx, file.path().to_str().unwrap()).await.unwrap();

		let sent = ctx.api.submitted();
		assert_eq!(sent.len(), 3);
		assert!(sent.iter().all(|s| s.action == action::ADDPERIOD && s.authorizer == ctx.contract));
		assert_eq!(
			sent[1].data,
			json!({ "start_time": "2021-01-08T00:00:00.000", "end_time": "2021-01-15T00:00:00.000" })
		);
	}

	#[tokio::test]
	async fn stops_at_first_rejected_period() {
		let ctx = MockChain { rejected: vec![action::ADDPERIOD], ..Default::default() }.into_context();
		let file = csv_file(PERIODS);
		let err = load_periods(&ctx, file.path().to_str().unwrap()).await.unwrap_err();
		assert!(matches!(err, CommandError::PeriodsAborted { loaded: 0, total: 3 }));
		assert_eq!(err.exit_code(), 1);
	}

	#[tokio::test]
	async fn empty_file_sends_nothing() {
		let ctx = MockChain::default().into_context();
		let file = csv_file("startdate,enddate\n");
		load_periods(&ctx, file.path().to_str().unwrap()).await.unwrap();
		assert!(ctx.api.submitted().is_empty());
	}
}
