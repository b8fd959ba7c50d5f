use serde::Serialize;
use serde_json::Value;

use equiscan_core::{Opportunity, ScanTrigger, Screener};

use crate::cli::ScanArgs;
use crate::error::CliError;

use super::scan_and_wait;

#[derive(Debug, Serialize)]
struct ScanResponseData {
    trigger: ScanTrigger,
    ranked: usize,
    opportunities: Vec<Opportunity>,
}

pub async fn run(screener: &Screener, args: &ScanArgs) -> Result<Value, CliError> {
    let trigger = scan_and_wait(screener, args).await?;
    let opportunities = screener.opportunities(&Default::default());

    let data = ScanResponseData {
        trigger,
        ranked: opportunities.len(),
        opportunities,
    };
    Ok(serde_json::to_value(data)?)
}
