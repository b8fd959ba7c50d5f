use clap::{Args, Parser, Subcommand};

/// Equity opportunity scanner.
#[derive(Debug, Parser)]
#[command(name = "equiscan", version, about = "Screen equities for trading opportunities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Use deterministic built-in market data instead of a live feed.
    #[arg(long, global = true)]
    pub fixture: bool,

    /// Base URL of the market-data feed.
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    pub base_url: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full scan and print the ranked opportunities.
    Scan(ScanArgs),
    /// Scan, then list opportunities matching the filters.
    List(ListArgs),
    /// Scan, then print the top-ranked opportunities.
    Top(TopArgs),
    /// Screen a single symbol on demand.
    Analyze(AnalyzeArgs),
    /// Print the service status.
    Status,
    /// Scan, then print the signal distribution.
    Signals(ScanArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Upper bound on the number of stocks to screen.
    #[arg(long, default_value_t = 50)]
    pub max_stocks: usize,

    /// Ignore a fresh cached ranking and rescan.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// Only opportunities with this signal (e.g. STRONG_BUY).
    #[arg(long)]
    pub signal: Option<String>,

    /// Only opportunities scoring at least this overall value.
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Only opportunities in this sector.
    #[arg(long)]
    pub sector: Option<String>,

    /// Maximum number of opportunities to print.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct TopArgs {
    #[command(flatten)]
    pub scan: ScanArgs,

    /// How many top opportunities to print.
    #[arg(default_value_t = 10)]
    pub count: usize,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Ticker to screen.
    pub symbol: String,
}
