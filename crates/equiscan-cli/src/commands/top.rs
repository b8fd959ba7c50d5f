use serde::Serialize;
use serde_json::Value;

use equiscan_core::{Opportunity, Screener};

use crate::cli::TopArgs;
use crate::error::CliError;

use super::scan_and_wait;

#[derive(Debug, Serialize)]
struct TopResponseData {
    count: usize,
    opportunities: Vec<Opportunity>,
}

pub async fn run(screener: &Screener, args: &TopArgs) -> Result<Value, CliError> {
    scan_and_wait(screener, &args.scan).await?;
    let opportunities = screener.top(args.count);

    let data = TopResponseData {
        count: opportunities.len(),
        opportunities,
    };
    Ok(serde_json::to_value(data)?)
}
