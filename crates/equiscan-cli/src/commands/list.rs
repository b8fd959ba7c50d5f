use serde::Serialize;
use serde_json::Value;

use equiscan_core::{Opportunity, OpportunityFilter, Screener, TradeSignal};

use crate::cli::ListArgs;
use crate::error::CliError;

use super::scan_and_wait;

#[derive(Debug, Serialize)]
struct ListResponseData {
    matched: usize,
    opportunities: Vec<Opportunity>,
}

pub async fn run(screener: &Screener, args: &ListArgs) -> Result<Value, CliError> {
    let signal = args
        .signal
        .as_deref()
        .map(str::parse::<TradeSignal>)
        .transpose()?;
    let filter = OpportunityFilter {
        signal,
        min_score: args.min_score,
        sector: args.sector.clone(),
        limit: args.limit,
    };

    scan_and_wait(screener, &args.scan).await?;
    let opportunities = screener.opportunities(&filter);

    let data = ListResponseData {
        matched: opportunities.len(),
        opportunities,
    };
    Ok(serde_json::to_value(data)?)
}
