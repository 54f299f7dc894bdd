use clap::{Parser, Subcommand};

use vertifarm::provider::ProviderKind;

#[derive(Parser, Debug)]
#[command(
    name = "vertifarm",
    version,
    about = "Vertical-farm AI advisor with last-good-result fallback"
)]
pub struct Args {
    /// TOML config file; flags below override it.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// SQLite file holding cached results.
    #[arg(long)]
    pub store: Option<String>,

    #[arg(long)]
    pub transcript_dir: Option<String>,

    /// Print the `{data, error, stale}` envelope instead of formatted output.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Yield optimization for current sensor readings.
    Optimize {
        #[arg(long)]
        input: String,
    },
    RecommendCrop {
        #[arg(long)]
        input: String,
    },
    Climate {
        #[arg(long)]
        input: String,
    },
    Alerts {
        #[arg(long)]
        input: String,
    },
    Fertilizer {
        #[arg(long)]
        input: String,
    },
    /// Ideal growing conditions for a crop.
    Conditions {
        #[arg(long)]
        input: String,
    },
    /// Climate plus crop recommendation for the farm location.
    Dashboard {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Regenerate alerts on the configured interval.
    WatchAlerts {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        iterations: Option<u64>,
        /// Show resolved alerts too.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Simulated live sensor readings around the farm's climate.
    WatchMetrics {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        iterations: Option<u64>,
    },
    /// Clear every cached feature result.
    Reset {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct LocationArgs {
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
}
