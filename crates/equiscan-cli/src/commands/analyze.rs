use serde_json::Value;

use equiscan_core::{Screener, Symbol};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

pub async fn run(screener: &Screener, args: &AnalyzeArgs) -> Result<Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let opportunity = screener.analyze(&symbol).await?;
    Ok(serde_json::to_value(opportunity)?)
}
