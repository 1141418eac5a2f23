use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::PathBuf;
use tiger_five::args::{self, Command};
use tiger_five::export::{DEFAULT_EXPORT_FILE, to_csv, write_csv};
use tiger_five::metrics::{mistake_breakdown, recent, rolling_windows};
use tiger_five::model::{DATE_FORMAT, Metric};
use tiger_five::series::build_series;
use tiger_five::storage::{KeyValueStore, SqliteKvStore};
use tiger_five::{RemoteSync, RoundStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How many rounds the stats view lists individually.
const RECENT_ROUNDS_SHOWN: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = args::args_checks();

    let kv = SqliteKvStore::open(&args.db)
        .with_context(|| format!("open round log at {}", args.db))?;
    let mut store = RoundStore::load(kv);
    if let Some(config) = args.remote_config() {
        let mirror = RemoteSync::from_config(&config).context("build analytics client")?;
        info!(base_url = %config.base_url, "mirroring rounds to analytics service");
        store = store.with_mirror(mirror);
    }

    match &args.command {
        Command::Add(add) => {
            let round = store.append(&add.to_input()).context("save round")?;
            println!(
                "Saved {} on {} ({}): Tiger Five {} - {}",
                round.course(),
                round.date().format(DATE_FORMAT),
                round.total_score(),
                round.tiger_five(),
                round.goal_status().label()
            );
        }
        Command::Stats => print_stats(&store),
        Command::Series => {
            let series = build_series(store.rounds());
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
        Command::Export { output } => {
            let path = output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
            if path.as_os_str() == "-" {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", to_csv(store.rounds()))?;
            } else {
                write_csv(&path, store.rounds())
                    .with_context(|| format!("write {}", path.display()))?;
                println!("Wrote {} rounds to {}", store.len(), path.display());
            }
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all golf data without --yes, this cannot be undone");
            }
            let removed = store.clear().context("clear round log")?;
            println!("All data deleted successfully ({removed} rounds)");
        }
    }

    store.settle().await;

    if args.show_api_logs {
        print_api_logs(&store).await?;
    }
    Ok(())
}

fn print_stats<S: KeyValueStore>(store: &RoundStore<S>) {
    let rounds = store.rounds();
    if rounds.is_empty() {
        println!("No rounds recorded yet");
        return;
    }

    println!("Recent Performance");
    for window in rolling_windows(rounds) {
        let tiger_five = window
            .averages
            .get(&Metric::TigerFive)
            .map_or("-", String::as_str);
        println!(
            "  {:<16} Tiger Five {:>5}  ({} rounds, {})",
            window.label,
            tiger_five,
            window.count,
            window.status.label()
        );
    }

    if let Some(breakdown) = mistake_breakdown(rounds) {
        println!("Mistake Breakdown (Last 5 Rounds Average)");
        for (name, value) in breakdown {
            println!("  {name:<14} {value:>5.1}");
        }
    }

    println!("Recent Rounds");
    for round in recent(rounds, RECENT_ROUNDS_SHOWN) {
        println!(
            "  {}  {:<24} {:>4}  TF {:>2}  {}",
            round.date().format(DATE_FORMAT),
            round.course(),
            round.total_score(),
            round.tiger_five(),
            round.goal_status().label()
        );
    }
}

async fn print_api_logs<S: KeyValueStore>(store: &RoundStore<S>) -> Result<()> {
    let Some(mirror) = store.mirror() else {
        println!("No API calls yet");
        return Ok(());
    };
    let logs = mirror.diagnostics().await;
    if logs.is_empty() {
        println!("No API calls yet");
    }
    for log in logs {
        println!("{} {} {}", log.timestamp.to_rfc3339(), log.method, log.endpoint);
        println!("{}", serde_json::to_string_pretty(&log)?);
    }
    Ok(())
}
