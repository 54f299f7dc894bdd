use anyhow::Context;
use clap::Parser;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use vertifarm::alerts::AlertBoard;
use vertifarm::config::Config;
use vertifarm::feature::{
    CityClimateLookup, Feature, GenerateAlerts, IdealConditionsLookup, OptimizeYield,
    RecommendCrop, RecommendFertilizer,
};
use vertifarm::invoker::Invoker;
use vertifarm::log::{self, Transcript};
use vertifarm::poll::Poller;
use vertifarm::provider;
use vertifarm::sensors::SensorSimulator;
use vertifarm::session::{AlertRefresh, FarmLocation, FarmSession};
use vertifarm::store::{ResultCache, SqliteStore};
use vertifarm::wire::AlertStatus;
use vertifarm::Orchestrator;

mod cli;
mod ux;

use cli::{Args, Command, LocationArgs};

fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut cfg = match &args.config {
        Some(p) => Config::load(Path::new(p))?,
        None => Config::default(),
    };
    if let Some(p) = args.provider {
        cfg.provider = p;
    }
    if let Some(m) = &args.model {
        cfg.model = m.clone();
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }
    if let Some(s) = &args.store {
        cfg.store_path = s.clone();
    }
    if args.transcript_dir.is_some() {
        cfg.transcript_dir = args.transcript_dir.clone();
    }
    Ok(cfg)
}

fn location(cfg: &Config, args: &LocationArgs) -> FarmLocation {
    FarmLocation {
        city: args.city.clone().unwrap_or_else(|| cfg.default_city.clone()),
        state: args.state.clone().unwrap_or_else(|| cfg.default_state.clone()),
    }
}

async fn one_shot<F: Feature>(orch: &Orchestrator, input: &str, as_json: bool) -> anyhow::Result<bool> {
    let raw: Value = serde_json::from_str(input).context("--input must be valid JSON")?;
    let out = ux::with_spinner("Generating...", orch.run::<F>(&raw)).await;
    ux::print_outcome(F::KIND.label(), out, as_json)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log::init(args.debug);

    let cfg = resolve_config(&args)?;
    let store = SqliteStore::open(Path::new(&cfg.store_path))
        .with_context(|| format!("opening result store {}", cfg.store_path))?;
    let cache = ResultCache::new(Arc::new(store));

    let backend = provider::make_backend(&cfg)?;
    let mut invoker = Invoker::new(backend);
    if let Some(dir) = &cfg.transcript_dir {
        invoker = invoker.with_transcript(Transcript::new(dir));
    }
    let orch = Orchestrator::new(invoker, cache);
    info!(provider = ?cfg.provider, model = %cfg.model, "ready");

    let ok = match &args.command {
        Command::Optimize { input } => one_shot::<OptimizeYield>(&orch, input, args.json).await?,
        Command::RecommendCrop { input } => one_shot::<RecommendCrop>(&orch, input, args.json).await?,
        Command::Climate { input } => one_shot::<CityClimateLookup>(&orch, input, args.json).await?,
        Command::Alerts { input } => one_shot::<GenerateAlerts>(&orch, input, args.json).await?,
        Command::Fertilizer { input } => {
            one_shot::<RecommendFertilizer>(&orch, input, args.json).await?
        }
        Command::Conditions { input } => {
            one_shot::<IdealConditionsLookup>(&orch, input, args.json).await?
        }
        Command::Dashboard { location: loc } => {
            let mut session = FarmSession::new(orch, location(&cfg, loc));
            let dash = ux::with_spinner("Loading farm...", session.initialize()).await;
            ux::print_dashboard(&dash);
            true
        }
        Command::WatchAlerts { location: loc, iterations, all } => {
            let session = Arc::new(FarmSession::new(orch, location(&cfg, loc)));
            let board = Arc::new(parking_lot::Mutex::new(AlertBoard::new()));
            let filter = if *all { None } else { Some(AlertStatus::Active) };
            let mut poller = Poller::new(cfg.alert_interval());
            if let Some(n) = iterations {
                poller = poller.limit(*n);
            }
            poller
                .run(|_| {
                    let session = session.clone();
                    let board = board.clone();
                    async move {
                        match session.refresh_alerts().await {
                            AlertRefresh::Updated { alerts, stale } => {
                                let mut b = board.lock();
                                b.replace(alerts);
                                ux::print_alerts(&b.view(filter, None), stale);
                            }
                            AlertRefresh::Skipped => println!("No crop context yet; skipping alerts."),
                            AlertRefresh::Failed(msg) => eprintln!("{msg}"),
                        }
                    }
                })
                .await;
            true
        }
        Command::WatchMetrics { location: loc, iterations } => {
            let mut session = FarmSession::new(orch, location(&cfg, loc));
            let dash = ux::with_spinner("Loading climate...", session.initialize()).await;
            ux::print_dashboard(&dash);
            let mut sim = SensorSimulator::new(dash.climate.base);
            let mut poller = Poller::new(cfg.metrics_interval());
            if let Some(n) = iterations {
                poller = poller.limit(*n);
            }
            poller
                .run(|i| {
                    let m = sim.sample();
                    async move { ux::print_metrics(i, &m) }
                })
                .await;
            true
        }
        Command::Reset { yes } => {
            if *yes || ux::confirm("Clear every cached AI result?") {
                let home = FarmLocation { city: cfg.default_city.clone(), state: cfg.default_state.clone() };
                let mut session = FarmSession::new(orch, home);
                session.factory_reset()?;
                println!("Factory reset complete.");
            } else {
                println!("Aborted by user.");
            }
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
