use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use equiscan_core::Screener;

use crate::cli::ScanArgs;
use crate::error::CliError;

use super::scan_and_wait;

#[derive(Debug, Serialize)]
struct SignalsResponseData {
    total: usize,
    distribution: BTreeMap<&'static str, usize>,
}

pub async fn run(screener: &Screener, args: &ScanArgs) -> Result<Value, CliError> {
    scan_and_wait(screener, args).await?;

    let distribution: BTreeMap<&'static str, usize> = screener
        .signal_distribution()
        .into_iter()
        .map(|(signal, count)| (signal.as_str(), count))
        .collect();
    let total = distribution.values().sum();

    let data = SignalsResponseData {
        total,
        distribution,
    };
    Ok(serde_json::to_value(data)?)
}
