use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, Parser)]
#[command(name = "ch-optimizer", version, disable_version_flag = true)]
#[command(
    about = "Merges ClickHouse GraphiteMergeTree partitions that missed their rollup deadline",
    long_about = None
)]
pub struct Cli {
    /// Filename of the custom config. CLI arguments override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print default config values and exit
    #[arg(long)]
    pub print_defaults: bool,

    /// Print version and exit
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// DSN to connect to ClickHouse server
    #[arg(short, long, help_heading = "ClickHouse")]
    pub server_dsn: Option<String>,

    /// Active partitions won't be optimized more than once per this interval
    #[arg(long, value_parser = humantime::parse_duration, help_heading = "ClickHouse")]
    pub optimize_interval: Option<Duration>,

    /// Make only one optimization round instead of working in the loop (implied by --dry-run)
    #[arg(long, help_heading = "Daemon")]
    pub one_shot: bool,

    /// Check for partitions to merge once per this interval
    #[arg(long, value_parser = humantime::parse_duration, help_heading = "Daemon")]
    pub loop_interval: Option<Duration>,

    /// Print how many partitions would be merged without any action
    #[arg(short = 'n', long, help_heading = "Daemon")]
    pub dry_run: bool,

    /// The log file. '-' is accepted as STDOUT
    #[arg(long, help_heading = "Logging")]
    pub output: Option<String>,

    /// Valid options are: panic, fatal, error, warn, warning, info, debug, trace
    #[arg(long, help_heading = "Logging")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Config keys for the flags that were given on the command line.
    pub fn overrides(&self) -> Vec<(&'static str, config::Value)> {
        let mut out: Vec<(&'static str, config::Value)> = Vec::new();

        if let Some(dsn) = &self.server_dsn {
            out.push(("clickhouse.server-dsn", dsn.clone().into()));
        }
        if let Some(interval) = self.optimize_interval {
            out.push((
                "clickhouse.optimize-interval",
                humantime::format_duration(interval).to_string().into(),
            ));
        }
        if self.one_shot {
            out.push(("daemon.one-shot", true.into()));
        }
        if let Some(interval) = self.loop_interval {
            out.push((
                "daemon.loop-interval",
                humantime::format_duration(interval).to_string().into(),
            ));
        }
        if self.dry_run {
            out.push(("daemon.dry-run", true.into()));
        }
        if let Some(output) = &self.output {
            out.push(("logging.output", output.clone().into()));
        }
        if let Some(level) = &self.log_level {
            out.push(("logging.level", level.clone().into()));
        }

        out
    }
}
