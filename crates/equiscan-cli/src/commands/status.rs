use serde_json::Value;

use equiscan_core::Screener;

use crate::error::CliError;

pub fn run(screener: &Screener) -> Result<Value, CliError> {
    Ok(serde_json::to_value(screener.status())?)
}
