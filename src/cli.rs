//! CLI definition and dispatch.

use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{read_bars, CsvAdapter};
use crate::adapters::csv_store::{write_extended_csv, CsvSeriesStore};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{parse_date, validate_config};
use crate::domain::error::{AnalysisError, SignalError};
use crate::domain::extended_series::compute_indicators;
use crate::domain::universe::{
    analyze_universe, parse_codes, AnalysisConfig, CodeReport, DEFAULT_LOOKBACK_DAYS,
};
use crate::domain::validation::check_series;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::series_store::SeriesStore;

#[derive(Parser, Debug)]
#[command(
    name = "stocksignal",
    about = "Technical indicators and trading signals for daily OHLCV series"
)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `stocksignal=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse one or more symbols and print a recommendation for each
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Symbol to analyse; repeatable, overrides `[analysis] codes`
        #[arg(long)]
        code: Vec<String>,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a single OHLCV CSV file
    Validate {
        #[arg(short, long)]
        data: PathBuf,
    },
    /// Write the indicator-extended series for a symbol as CSV
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let today = chrono::Local::now().date_naive();
    match cli.command {
        Command::Analyze { config, code, json } => run_analyze(&config, &code, json, today),
        Command::Validate { data } => run_validate(&data),
        Command::Indicators {
            config,
            code,
            output,
        } => run_indicators(&config, &code, output.as_deref(), today),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

fn fail(err: &SignalError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| fail(&e))?;
    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

/// Resolve paths, the fetch window and the code list. The window ends at
/// `end_date` (default `today`) and starts at `start_date` (default
/// `lookback_days` before the end).
pub fn build_analysis_config(
    adapter: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<AnalysisConfig, SignalError> {
    let data_path = adapter
        .get_string("data", "path")
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| SignalError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })?;

    let end_date = parse_date(adapter, "end_date")?.unwrap_or(today);
    let lookback = adapter.get_int("data", "lookback_days", DEFAULT_LOOKBACK_DAYS);
    let start_date = match parse_date(adapter, "start_date")? {
        Some(start) => start,
        None => end_date - Duration::days(lookback),
    };

    let store_path = adapter
        .get_string("store", "path")
        .filter(|p| !p.trim().is_empty())
        .filter(|_| adapter.get_bool("store", "enabled", true))
        .map(PathBuf::from);

    Ok(AnalysisConfig {
        data_path: PathBuf::from(data_path.trim()),
        store_path,
        start_date,
        end_date,
        codes: resolve_codes(&[], adapter)?,
    })
}

/// Command-line codes win over `[analysis] codes`.
pub fn resolve_codes(
    overrides: &[String],
    config: &dyn ConfigPort,
) -> Result<Vec<String>, SignalError> {
    if !overrides.is_empty() {
        let mut codes: Vec<String> = Vec::with_capacity(overrides.len());
        for code in overrides.iter().map(|c| c.trim().to_uppercase()) {
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
        return Ok(codes);
    }

    match config.get_string("analysis", "codes") {
        Some(codes) => parse_codes(&codes).map_err(|e| SignalError::ConfigInvalid {
            section: "analysis".into(),
            key: "codes".into(),
            reason: e.to_string(),
        }),
        None => Ok(Vec::new()),
    }
}

fn run_analyze(config_path: &Path, overrides: &[String], json: bool, today: NaiveDate) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let mut config = match build_analysis_config(&adapter, today) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(config.data_path.clone());
    if !overrides.is_empty() {
        config.codes = match resolve_codes(overrides, &adapter) {
            Ok(codes) => codes,
            Err(e) => return fail(&e),
        };
    }
    if config.codes.is_empty() {
        tracing::info!(
            path = %config.data_path.display(),
            "no codes configured, using all symbols"
        );
        config.codes = match data_port.list_symbols() {
            Ok(symbols) => symbols,
            Err(e) => return fail(&e),
        };
    }
    if config.codes.is_empty() {
        eprintln!("error: no codes configured and no symbols found");
        return ExitCode::from(2);
    }

    let store = config.store_path.clone().map(CsvSeriesStore::new);
    run_analysis_pipeline(
        &data_port,
        store.as_ref().map(|s| s as &dyn SeriesStore),
        &config,
        json,
        today,
    )
}

pub fn run_analysis_pipeline(
    data_port: &dyn DataPort,
    store: Option<&dyn SeriesStore>,
    config: &AnalysisConfig,
    json: bool,
    today: NaiveDate,
) -> ExitCode {
    tracing::info!(
        codes = config.codes.len(),
        start = %config.start_date,
        end = %config.end_date,
        "starting analysis"
    );

    let analysis = match analyze_universe(
        data_port,
        store,
        &config.codes,
        config.start_date,
        config.end_date,
        today,
    ) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    if json {
        let keyed: Result<serde_json::Map<String, serde_json::Value>, _> = analysis
            .reports
            .iter()
            .map(|r| serde_json::to_value(&r.report).map(|v| (r.code.clone(), v)))
            .collect();
        match keyed.and_then(|map| serde_json::to_string_pretty(&map)) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: failed to serialize reports: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        for code_report in &analysis.reports {
            print!("{}", format_report(code_report));
        }
    }

    for skipped in &analysis.skipped {
        eprintln!("skipped {}: {}", skipped.code, skipped.reason);
    }
    eprintln!(
        "Analysed {} of {} codes",
        analysis.reports.len(),
        config.codes.len()
    );
    ExitCode::SUCCESS
}

fn opt(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{v:.2}{suffix}"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn label<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Human-readable summary of one report.
pub fn format_report(code_report: &CodeReport) -> String {
    let r = &code_report.report;
    let signal = &r.trading_signal;
    let ctx = &r.market_context;
    let mut out = String::new();

    let _ = writeln!(out, "=== {} ({}) ===", code_report.code, r.date);
    let _ = writeln!(out, "Price:          {:.2}", r.current_price);
    let _ = writeln!(
        out,
        "Recommendation: {} (confidence {})",
        signal.recommendation, signal.confidence
    );
    for factor in &signal.supporting_factors {
        let _ = writeln!(out, "  - {factor}");
    }
    let _ = writeln!(
        out,
        "Trend:          {} ({:.2}% from MA50), MA crossover {}, price {}",
        r.trend.direction, r.trend.strength, r.trend.ma_crossover, r.trend.price_momentum
    );
    let _ = writeln!(
        out,
        "Momentum:       RSI {:.2} {} ({})",
        r.momentum.rsi_value, r.momentum.rsi_status, r.momentum.rsi_trend
    );
    let _ = writeln!(
        out,
        "Risk:           volatility {}, bands {} (position {}), volume {} ({}, {})",
        r.risk.volatility_level,
        r.risk.price_vs_bands,
        opt(r.risk.bb_position, ""),
        r.risk.volume_analysis.volume_trend,
        opt(r.risk.volume_analysis.volume_change, "%"),
        r.risk.volume_analysis.price_volume_alignment
    );
    let _ = writeln!(
        out,
        "Context:        short {}, medium {}, long {}; year high {}, year low {}",
        label(ctx.trend_strength.short_term),
        label(ctx.trend_strength.medium_term),
        label(ctx.trend_strength.long_term),
        opt(ctx.price_levels.year_high, ""),
        opt(ctx.price_levels.year_low, "")
    );
    let _ = writeln!(
        out,
        "Pattern:        double bottom {} (quality {})",
        r.pattern.double_bottom, r.pattern.pattern_quality
    );
    for location in &code_report.stored {
        let _ = writeln!(out, "Stored:         {location}");
    }
    out.push('\n');
    out
}

fn run_validate(data_path: &Path) -> ExitCode {
    let bars = match read_bars(data_path) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };

    match check_series(&bars) {
        Ok(()) => {
            if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
                println!(
                    "{}: {} rows, {} to {} [OK]",
                    data_path.display(),
                    bars.len(),
                    first.date,
                    last.date
                );
            }
            ExitCode::SUCCESS
        }
        Err(issue) => {
            println!("{}: {}", data_path.display(), issue);
            (&SignalError::from(AnalysisError::from(issue))).into()
        }
    }
}

fn run_indicators(
    config_path: &Path,
    code: &str,
    output: Option<&Path>,
    today: NaiveDate,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match build_analysis_config(&adapter, today) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let data_port = CsvAdapter::new(config.data_path);
    let bars = match data_port.fetch_ohlcv(code, config.start_date, config.end_date) {
        Ok(bars) => bars,
        Err(e) => return fail(&e),
    };
    let series = match compute_indicators(&bars) {
        Ok(s) => s,
        Err(e) => return fail(&e.into()),
    };

    let written = match output {
        Some(path) => fs::File::create(path)
            .map_err(SignalError::from)
            .and_then(|file| write_extended_csv(file, &series)),
        None => write_extended_csv(std::io::stdout().lock(), &series),
    };
    match written {
        Ok(()) => {
            if let Some(path) = output {
                eprintln!("Indicators written to: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data_path = adapter.get_string("data", "path").unwrap_or_default();

    match CsvAdapter::new(PathBuf::from(data_path.trim())).list_symbols() {
        Ok(symbols) => {
            for symbol in &symbols {
                println!("{symbol}");
            }
            eprintln!("{} symbols found", symbols.len());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
