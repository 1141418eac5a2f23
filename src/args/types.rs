use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::{MistakeCounters, RoundInput, parse_counter, parse_total_score};
use crate::remote::RemoteConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Track Tiger Five mistakes round by round", long_about = None)]
pub struct Args {
    /// Sqlite file holding the round log. `:memory:` keeps nothing between runs.
    #[arg(
        long,
        value_name = "DATABASE_PATH",
        env = "TIGER_FIVE_DB",
        default_value = "tiger_five.db"
    )]
    pub db: String,
    /// Base url of the analytics service. Rounds are not mirrored without it.
    #[arg(
        long,
        value_name = "REMOTE_URL",
        env = "TIGER_FIVE_REMOTE_URL",
        value_parser = crate::args::validation::check_remote_url
    )]
    pub remote_url: Option<String>,
    #[arg(long, value_name = "API_TOKEN", env = "TIGER_FIVE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
    #[arg(long, value_name = "APP_ID", env = "TIGER_FIVE_APP_ID")]
    pub app_id: Option<String>,
    #[arg(long, value_name = "USAGE_KEY", env = "TIGER_FIVE_USAGE_KEY", hide_env_values = true)]
    pub usage_key: Option<String>,
    /// Print the latest analytics calls before exiting.
    #[arg(long)]
    pub show_api_logs: bool,
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    #[must_use]
    pub fn remote_config(&self) -> Option<RemoteConfig> {
        self.remote_url.as_ref().map(|base_url| RemoteConfig {
            base_url: base_url.clone(),
            api_token: self.api_token.clone(),
            app_id: self.app_id.clone(),
            usage_key: self.usage_key.clone(),
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Save a new round
    Add(AddArgs),
    /// Rolling averages, mistake breakdown and the latest rounds
    Stats,
    /// Chart series for the latest 20 rounds, as json
    Series,
    /// Write every round to csv
    Export {
        /// Output file, `-` for stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Delete every round, locally and on the analytics service
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

/// Mirrors the round form: counters are lenient, course and score are checked on save.
#[derive(clap::Args, Debug, Clone)]
pub struct AddArgs {
    /// Round date, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long, default_value = "")]
    pub course: String,
    #[arg(long, value_name = "TOTAL_SCORE", default_value = "")]
    pub score: String,
    #[arg(long, default_value = "0")]
    pub double_bogey: String,
    #[arg(long, default_value = "0")]
    pub bogey_par5: String,
    #[arg(long, default_value = "0")]
    pub three_putts: String,
    #[arg(long, default_value = "0")]
    pub bogey_inside150: String,
    #[arg(long, default_value = "0")]
    pub missed_saves: String,
    #[arg(long, default_value = "0")]
    pub bad_drives: String,
}

impl AddArgs {
    #[must_use]
    pub fn to_input(&self) -> RoundInput {
        let mut input = RoundInput::new();
        if let Some(date) = &self.date {
            input.date.clone_from(date);
        }
        input.course.clone_from(&self.course);
        input.total_score = parse_total_score(&self.score);
        input.counters = MistakeCounters::new(
            parse_counter(&self.double_bogey),
            parse_counter(&self.bogey_par5),
            parse_counter(&self.three_putts),
            parse_counter(&self.bogey_inside150),
            parse_counter(&self.missed_saves),
        );
        input.bad_drives = parse_counter(&self.bad_drives);
        input
    }
}
