use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use core_types::{Portfolio, Timeframe};
use engine::AnalysisService;
use market_data::FixtureDataSource;
use portfolio::{AssetWeight, Constraints, Objective};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// The main entry point for the QuantLens analytics application.
fn main() {
    // Initialize structured logging; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Fall back to built-in defaults when no config.toml is present, so the
    // tool works out of the box.
    let config = match configuration::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("could not load config.toml ({}); using defaults", e);
            configuration::Config::default()
        }
    };

    let source = FixtureDataSource::from_file(&cli.data)
        .with_context(|| format!("loading price data from '{}'", cli.data.display()))?;
    let mut service = AnalysisService::new(Box::new(source), config);

    match cli.command {
        Commands::Performance(args) => handle_performance(&mut service, args),
        Commands::Compare(args) => handle_compare(&mut service, args),
        Commands::Technical(args) => handle_technical(&mut service, args),
        Commands::Matrix(args) => handle_matrix(&mut service, args),
        Commands::Rolling(args) => handle_rolling(&mut service, args),
        Commands::Volatility(args) => handle_volatility(&mut service, args),
        Commands::Portfolio(args) => handle_portfolio(&mut service, args),
        Commands::Optimize(args) => handle_optimize(&mut service, args),
        Commands::Rebalance(args) => handle_rebalance(&mut service, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance, correlation, and portfolio analytics over historical prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON file of price histories keyed by symbol.
    #[arg(long, global = true, default_value = "prices.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// The full performance report for one asset.
    Performance(PerformanceArgs),
    /// Side-by-side performance of several assets.
    Compare(CompareArgs),
    /// Latest technical indicator readings for one asset.
    Technical(TechnicalArgs),
    /// The pairwise correlation matrix over a set of assets.
    Matrix(MatrixArgs),
    /// Rolling correlation between two assets.
    Rolling(RollingArgs),
    /// Rolling annualized volatility for one asset.
    Volatility(VolatilityArgs),
    /// Valuation and risk analysis of a portfolio file.
    Portfolio(PortfolioArgs),
    /// Optimized weights for a set of candidate assets.
    Optimize(OptimizeArgs),
    /// Trades that move a portfolio to optimized target weights.
    Rebalance(RebalanceArgs),
}

#[derive(Parser)]
struct PerformanceArgs {
    /// The symbol to analyze (e.g., "BTC").
    #[arg(long)]
    symbol: String,

    /// Lookback window: 7d, 30d, 90d, 365d, or max.
    #[arg(long, default_value = "max")]
    timeframe: Timeframe,
}

#[derive(Parser)]
struct CompareArgs {
    /// The symbols to compare, in display order.
    #[arg(long, required = true, num_args = 2..)]
    symbols: Vec<String>,

    #[arg(long, default_value = "max")]
    timeframe: Timeframe,
}

#[derive(Parser)]
struct TechnicalArgs {
    /// The symbol to analyze (e.g., "BTC").
    #[arg(long)]
    symbol: String,

    #[arg(long, default_value = "max")]
    timeframe: Timeframe,
}

#[derive(Parser)]
struct MatrixArgs {
    #[arg(long, required = true, num_args = 2..)]
    symbols: Vec<String>,

    #[arg(long, default_value = "max")]
    timeframe: Timeframe,

    /// Highlight pairs whose |correlation| exceeds this threshold.
    #[arg(long, default_value_t = 0.7)]
    threshold: f64,
}

#[derive(Parser)]
struct RollingArgs {
    #[arg(long)]
    symbol_a: String,

    #[arg(long)]
    symbol_b: String,

    /// Window length in observations; defaults to the configured window.
    #[arg(long)]
    window: Option<usize>,

    #[arg(long, default_value = "max")]
    timeframe: Timeframe,
}

#[derive(Parser)]
struct VolatilityArgs {
    #[arg(long)]
    symbol: String,

    #[arg(long)]
    window: Option<usize>,

    #[arg(long, default_value = "max")]
    timeframe: Timeframe,
}

#[derive(Parser)]
struct PortfolioArgs {
    /// Path to a JSON portfolio: positions plus a timeframe.
    #[arg(long)]
    file: PathBuf,
}

#[derive(Parser)]
struct OptimizeArgs {
    #[arg(long, required = true, num_args = 2..)]
    symbols: Vec<String>,

    /// Either "max-sharpe" or "min-variance".
    #[arg(long, default_value = "max-sharpe", value_parser = parse_objective)]
    objective: Objective,

    #[arg(long, default_value_t = 0.0)]
    min_weight: f64,

    #[arg(long, default_value_t = 1.0)]
    max_weight: f64,

    #[arg(long, default_value = "max")]
    timeframe: Timeframe,
}

#[derive(Parser)]
struct RebalanceArgs {
    /// Path to a JSON portfolio: positions plus a timeframe.
    #[arg(long)]
    file: PathBuf,

    /// Objective used to derive the target weights.
    #[arg(long, default_value = "min-variance", value_parser = parse_objective)]
    objective: Objective,

    #[arg(long, default_value_t = 0.0)]
    min_weight: f64,

    #[arg(long, default_value_t = 1.0)]
    max_weight: f64,
}

fn parse_objective(s: &str) -> Result<Objective, String> {
    match s {
        "max-sharpe" => Ok(Objective::MaxSharpe),
        "min-variance" => Ok(Objective::MinVariance),
        other => Err(format!(
            "unknown objective '{}': expected 'max-sharpe' or 'min-variance'",
            other
        )),
    }
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn handle_performance(
    service: &mut AnalysisService,
    args: PerformanceArgs,
) -> anyhow::Result<()> {
    service.refresh(std::slice::from_ref(&args.symbol))?;
    let report = service.asset_performance(&args.symbol, args.timeframe)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Symbol"), Cell::new(&report.symbol)]);
    table.add_row(vec![
        Cell::new("Timeframe"),
        Cell::new(args.timeframe.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Observations"),
        Cell::new(report.observations.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Total Return"),
        Cell::new(fmt_pct(report.total_return)),
    ]);
    table.add_row(vec![
        Cell::new("Annualized Return"),
        Cell::new(fmt_pct(report.annualized_return)),
    ]);
    table.add_row(vec![
        Cell::new("Annualized Volatility"),
        Cell::new(fmt_pct(report.annualized_volatility)),
    ]);
    table.add_row(vec![
        Cell::new("Sharpe Ratio"),
        Cell::new(fmt_opt(report.sharpe_ratio)),
    ]);
    table.add_row(vec![
        Cell::new("Sortino Ratio"),
        Cell::new(fmt_opt(report.sortino_ratio)),
    ]);
    table.add_row(vec![
        Cell::new("Max Drawdown"),
        Cell::new(fmt_pct(report.max_drawdown)),
    ]);
    table.add_row(vec![
        Cell::new("Calmar Ratio"),
        Cell::new(fmt_opt(report.calmar_ratio)),
    ]);
    table.add_row(vec![
        Cell::new("VaR (95%)"),
        Cell::new(fmt_pct(report.var_95)),
    ]);
    table.add_row(vec![
        Cell::new("CVaR (95%)"),
        Cell::new(fmt_pct(report.cvar_95)),
    ]);
    println!("{table}");

    for warning in &report.warnings {
        println!("Warning: {:?}", warning);
    }
    Ok(())
}

fn handle_compare(service: &mut AnalysisService, args: CompareArgs) -> anyhow::Result<()> {
    service.refresh(&args.symbols)?;
    let summary = service.compare(&args.symbols, args.timeframe)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Symbol",
        "Total Return",
        "Ann. Return",
        "Ann. Vol",
        "Sharpe",
        "Max DD",
        "VaR 95%",
    ]);
    for m in &summary.metrics {
        table.add_row(vec![
            Cell::new(&m.symbol),
            Cell::new(fmt_pct(m.total_return)),
            Cell::new(fmt_pct(m.annualized_return)),
            Cell::new(fmt_pct(m.annualized_volatility)),
            Cell::new(fmt_opt(m.sharpe_ratio)),
            Cell::new(fmt_pct(m.max_drawdown)),
            Cell::new(fmt_pct(m.var_95)),
        ]);
    }
    println!("{table}");

    if let Some(best) = summary.best_by_sharpe() {
        println!("Best risk-adjusted: {}", best.symbol);
    }
    if let Some(worst) = summary.worst_drawdown() {
        println!("Deepest drawdown:   {}", worst.symbol);
    }
    Ok(())
}

fn handle_technical(service: &mut AnalysisService, args: TechnicalArgs) -> anyhow::Result<()> {
    service.refresh(std::slice::from_ref(&args.symbol))?;
    let snapshot = service.technical_snapshot(&args.symbol, args.timeframe)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Indicator", "Value", "Signal"]);
    table.add_row(vec![
        Cell::new("Price"),
        Cell::new(format!("{:.2}", snapshot.last_price)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("SMA (20)"),
        Cell::new(fmt_opt(snapshot.sma)),
        Cell::new(fmt_signal(snapshot.sma_trend.map(|t| format!("{:?}", t)))),
    ]);
    table.add_row(vec![
        Cell::new("EMA (20)"),
        Cell::new(format!("{:.3}", snapshot.ema)),
        Cell::new(format!("{:?}", snapshot.ema_trend)),
    ]);
    table.add_row(vec![
        Cell::new("RSI (14)"),
        Cell::new(fmt_opt(snapshot.rsi)),
        Cell::new(fmt_signal(
            snapshot.rsi_momentum.map(|m| format!("{:?}", m)),
        )),
    ]);
    table.add_row(vec![
        Cell::new("MACD (12/26/9)"),
        Cell::new(format!(
            "{:.4} / signal {:.4} / hist {:.4}",
            snapshot.macd, snapshot.macd_signal, snapshot.macd_histogram
        )),
        Cell::new(format!("{:?}", snapshot.macd_trend)),
    ]);
    table.add_row(vec![
        Cell::new("Bollinger (20, 2.0)"),
        Cell::new(match (
            snapshot.bollinger_lower,
            snapshot.bollinger_middle,
            snapshot.bollinger_upper,
        ) {
            (Some(l), Some(m), Some(u)) => format!("{:.3} / {:.3} / {:.3}", l, m, u),
            _ => "n/a".to_string(),
        }),
        Cell::new(fmt_signal(
            snapshot.bollinger_momentum.map(|m| format!("{:?}", m)),
        )),
    ]);
    println!("{table}");
    Ok(())
}

fn handle_matrix(service: &mut AnalysisService, args: MatrixArgs) -> anyhow::Result<()> {
    service.refresh(&args.symbols)?;
    let matrix = service.correlation_matrix(&args.symbols, args.timeframe)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    let mut header = vec![Cell::new("")];
    header.extend(matrix.symbols.iter().map(Cell::new));
    table.set_header(header);
    for (i, symbol) in matrix.symbols.iter().enumerate() {
        let mut row = vec![Cell::new(symbol)];
        row.extend(
            matrix.values[i]
                .iter()
                .map(|cell| Cell::new(fmt_opt(*cell))),
        );
        table.add_row(row);
    }
    println!("{table}");

    if let Some(mean) = matrix.mean_off_diagonal() {
        println!("Mean pairwise correlation: {:.3}", mean);
    }
    for pair in matrix.strong_pairs(args.threshold) {
        println!(
            "Strong pair: {} / {} ({:.3})",
            pair.symbol_a, pair.symbol_b, pair.value
        );
    }
    Ok(())
}

fn handle_rolling(service: &mut AnalysisService, args: RollingArgs) -> anyhow::Result<()> {
    service.refresh(&[args.symbol_a.clone(), args.symbol_b.clone()])?;
    let roll = service.rolling_correlation(
        &args.symbol_a,
        &args.symbol_b,
        args.window,
        args.timeframe,
    )?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Date".to_string(),
        format!("corr({}, {}) [{}]", roll.symbol_a, roll.symbol_b, roll.window),
    ]);
    for (t, value) in roll.timestamps.iter().zip(&roll.values) {
        table.add_row(vec![
            Cell::new(t.format("%Y-%m-%d").to_string()),
            Cell::new(fmt_opt(*value)),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_volatility(service: &mut AnalysisService, args: VolatilityArgs) -> anyhow::Result<()> {
    service.refresh(std::slice::from_ref(&args.symbol))?;
    let (timestamps, values) =
        service.volatility_series(&args.symbol, args.window, args.timeframe)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Date", "Annualized Volatility"]);
    for (t, value) in timestamps.iter().zip(&values) {
        table.add_row(vec![
            Cell::new(t.format("%Y-%m-%d").to_string()),
            Cell::new(value.map(fmt_pct).unwrap_or_else(|| "n/a".to_string())),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn handle_portfolio(service: &mut AnalysisService, args: PortfolioArgs) -> anyhow::Result<()> {
    let portfolio = load_portfolio(&args.file)?;
    service.refresh(&portfolio.symbols())?;
    let report = service.analyze_portfolio(&portfolio)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Symbol", "Quantity", "Avg Cost", "Price", "Value", "P&L", "Return", "Weight",
    ]);
    for p in &report.positions {
        table.add_row(vec![
            Cell::new(&p.symbol),
            Cell::new(p.quantity.to_string()),
            Cell::new(p.avg_cost.to_string()),
            Cell::new(p.current_price.to_string()),
            Cell::new(p.market_value.to_string()),
            Cell::new(p.unrealized_pnl.to_string()),
            Cell::new(
                p.return_pct
                    .map(fmt_pct)
                    .unwrap_or_else(|| "n/a".to_string()),
            ),
            Cell::new(fmt_pct(p.weight)),
        ]);
    }
    println!("{table}");

    println!("Total value:      {}", report.total_value);
    println!("Unrealized P&L:   {}", report.unrealized_pnl);
    println!(
        "Portfolio return: {}",
        report
            .return_pct
            .map(fmt_pct)
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!("Annualized vol:   {}", fmt_pct(report.annualized_volatility));
    println!("Sharpe ratio:     {}", fmt_opt(report.sharpe_ratio));
    println!("VaR (95%):        {}", fmt_pct(report.var_95));
    println!("CVaR (95%):       {}", fmt_pct(report.cvar_95));
    println!(
        "Mean correlation: {}",
        fmt_opt(report.mean_correlation)
    );
    for warning in &report.warnings {
        println!("Warning: {:?}", warning);
    }
    Ok(())
}

fn handle_optimize(service: &mut AnalysisService, args: OptimizeArgs) -> anyhow::Result<()> {
    service.refresh(&args.symbols)?;
    let constraints = Constraints {
        min_weight: args.min_weight,
        max_weight: args.max_weight,
    };
    let weights =
        service.optimize_weights(&args.symbols, args.objective, &constraints, args.timeframe)?;

    print_weights(&weights);
    Ok(())
}

fn handle_rebalance(service: &mut AnalysisService, args: RebalanceArgs) -> anyhow::Result<()> {
    let portfolio = load_portfolio(&args.file)?;
    service.refresh(&portfolio.symbols())?;

    let constraints = Constraints {
        min_weight: args.min_weight,
        max_weight: args.max_weight,
    };
    let target = service.optimize_weights(
        &portfolio.symbols(),
        args.objective,
        &constraints,
        portfolio.timeframe,
    )?;
    print_weights(&target);

    let trades = service.plan_rebalance(&portfolio, &target)?;
    if trades.is_empty() {
        println!("Portfolio is within the materiality threshold; no trades needed.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Symbol", "Side", "Quantity", "Value"]);
    for trade in &trades {
        table.add_row(vec![
            Cell::new(&trade.symbol),
            Cell::new(format!("{:?}", trade.side)),
            Cell::new(trade.delta_quantity.round_dp(8).to_string()),
            Cell::new(trade.delta_value.round_dp(2).to_string()),
        ]);
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Helpers
// ==============================================================================

/// On-disk portfolio shape; re-validated through `Portfolio::new` so a
/// hand-edited file cannot smuggle in duplicate or negative positions.
fn load_portfolio(path: &PathBuf) -> anyhow::Result<Portfolio> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading portfolio file '{}'", path.display()))?;
    let parsed: Portfolio = serde_json::from_str(&raw)
        .with_context(|| format!("parsing portfolio file '{}'", path.display()))?;
    Ok(Portfolio::new(parsed.positions, parsed.timeframe)?)
}

fn print_weights(weights: &[AssetWeight]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Symbol", "Target Weight"]);
    for w in weights {
        table.add_row(vec![Cell::new(&w.symbol), Cell::new(fmt_pct(w.weight))]);
    }
    println!("{table}");
}

fn fmt_pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn fmt_signal(value: Option<String>) -> String {
    value.unwrap_or_else(|| "n/a".to_string())
}
