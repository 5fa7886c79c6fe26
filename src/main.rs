use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use legalcase::config::PracticeConfig;
use legalcase::legal::advisory::{Advisor, GeminiModel};
use legalcase::legal::interchange;
use legalcase::legal::ledger::{self, format_amount};
use legalcase::legal::{CaseRecord, EntityType, PracticeSession};
use legalcase::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "legalcase")]
#[command(about = "Case files for a small legal practice")]
struct Cli {
    /// Settings file. Missing file means defaults.
    #[arg(long, default_value = "legalcase.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import reference records from CSV and write them back in canonical form.
    Import(ImportArgs),
    /// Print ledger totals for a case.
    Balance(CaseArgs),
    /// Summarize a case timeline with the advisory model.
    Summarize(CaseArgs),
    /// Ask the advisory model for strategy suggestions.
    Strategy(CaseArgs),
    /// Print the demonstration practice's case as JSON.
    Sample,
}

#[derive(Debug, Args)]
struct ImportArgs {
    #[arg(long, value_parser = parse_kind)]
    kind: EntityType,

    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CaseArgs {
    /// Case record as JSON.
    #[arg(long = "case")]
    case: PathBuf,
}

fn parse_kind(raw: &str) -> Result<EntityType, String> {
    EntityType::parse(&raw.trim().to_ascii_lowercase().replace('-', "_")).ok_or_else(|| {
        let known: Vec<&str> = EntityType::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown kind '{raw}', expected one of: {}", known.join(", "))
    })
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("legalcase=info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_case(path: &Path) -> Result<CaseRecord> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing case record {}", path.display()))
}

fn advisor(config: &PracticeConfig) -> Result<Advisor> {
    let model = GeminiModel::from_config(&config.advisory)
        .map_err(|e| anyhow!("advisory model unavailable: {e}"))?;
    Ok(Advisor::new(Arc::new(model), config.advisory.clone()))
}

fn run_import(args: ImportArgs, config: &PracticeConfig) -> Result<()> {
    let mut session = PracticeSession::new();
    let input = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let report = interchange::import_into(&mut session.registries, args.kind, input)?;
    println!(
        "{}: {} accepted, {} skipped",
        args.kind, report.accepted, report.skipped
    );

    if let Some(output) = args.output {
        let file = File::create(&output)
            .with_context(|| format!("creating {}", output.display()))?;
        let records = session.registries.records(args.kind);
        let written = interchange::export_records(
            args.kind,
            &records,
            BufWriter::new(file),
            &config.interchange,
        )?;
        println!("wrote {written} rows to {}", output.display());
    }
    Ok(())
}

fn run_balance(args: CaseArgs) -> Result<()> {
    let case = read_case(&args.case)?;
    let totals = ledger::totals(&case.ledger);
    println!("case     {} ({})", case.case_number(), case.status.as_str());
    for entry in &case.ledger {
        println!(
            "  {}  {:<8} {:>12}  {}",
            entry.date,
            entry.kind.as_str(),
            format_amount(entry.amount),
            entry.description
        );
    }
    println!("income   {}", format_amount(totals.income));
    println!("expense  {}", format_amount(totals.expense));
    println!("advance  {}", format_amount(totals.advance));
    println!("balance  {}", format_amount(totals.balance));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = Settings::load_or_default(&cli.config)?;
    let config = PracticeConfig::resolve(&settings)?;

    match cli.command {
        Command::Import(args) => run_import(args, &config)?,
        Command::Balance(args) => run_balance(args)?,
        Command::Summarize(args) => {
            let case = read_case(&args.case)?;
            println!("{}", advisor(&config)?.summarize_timeline(&case.timeline).await);
        }
        Command::Strategy(args) => {
            let case = read_case(&args.case)?;
            println!("{}", advisor(&config)?.suggest_strategy(&case).await);
        }
        Command::Sample => {
            let session = PracticeSession::with_sample_data()?;
            let case = session
                .cases
                .all()
                .first()
                .ok_or_else(|| anyhow!("sample practice has no cases"))?;
            println!("{}", serde_json::to_string_pretty(case)?);
        }
    }
    Ok(())
}
