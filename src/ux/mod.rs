use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use vertifarm::sensors::LiveMetrics;
use vertifarm::session::{ClimateView, Dashboard};
use vertifarm::wire::{Alert, AlertStatus, Severity};
use vertifarm::Outcome;

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// Await `fut` behind a spinner.
pub async fn with_spinner<T>(msg: &str, fut: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = fut.await;
    pb.finish_and_clear();
    out
}

/// Print an outcome. Returns false for rejected or failed invocations.
pub fn print_outcome<T: Serialize>(title: &str, out: Outcome<T>, as_json: bool) -> anyhow::Result<bool> {
    let ok = out.data().is_some();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&out.into_reply())?);
        return Ok(ok);
    }

    println!("\n{}", format!("=== {} ===", title).bold());
    match out {
        Outcome::Fresh(data) => {
            println!("{}", "[FRESH]".green().bold());
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Outcome::Fallback { data, written_at, cause } => {
            println!(
                "{}  generation failed ({}); showing result cached {}",
                "[CACHED]".yellow().bold(),
                cause,
                written_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Outcome::Rejected { message, errors } => {
            println!("{}  {}", "[REJECTED]".red().bold(), message);
            for field in errors.fields() {
                let msgs = errors.get(field).unwrap_or_default();
                println!("  - {}: {}", field.bold(), msgs.join(", "));
            }
        }
        Outcome::Failed(msg) => {
            println!("{}  {}", "[FAILED]".red().bold(), msg);
        }
    }
    println!();
    Ok(ok)
}

pub fn print_dashboard(d: &Dashboard) {
    println!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ Farm ━━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    print_climate(&d.climate);
    match &d.recommendation {
        Outcome::Fresh(r) | Outcome::Fallback { data: r, .. } => {
            let tag = if d.recommendation.is_stale() { " (cached)".yellow() } else { "".normal() };
            println!(
                "  {}: {}{}  via {}",
                "Crop".green().bold(),
                r.crop_name,
                tag,
                r.predicted_farm_type.cyan()
            );
            println!("  {}", r.reason);
        }
        Outcome::Rejected { message, .. } | Outcome::Failed(message) => {
            println!("  {}: {}", "Crop".red().bold(), message);
        }
    }
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
}

fn print_climate(c: &ClimateView) {
    let tag = if c.defaulted { " (default)".yellow() } else { "".normal() };
    println!(
        "  {}: {:.1}°C  {:.0}%{}  {}",
        "Climate".bold(),
        c.base.temperature,
        c.base.humidity,
        tag,
        c.description
    );
}

pub fn print_metrics(tick: u64, m: &LiveMetrics) {
    println!(
        "[{:>4}] {}: {:.1}°C   {}: {:.0}%   {}: {:.1} klx",
        tick,
        "Temp".red().bold(),
        m.temperature,
        "Humidity".blue().bold(),
        m.humidity,
        "Light".yellow().bold(),
        m.light_klx
    );
}

pub fn print_alerts(alerts: &[&Alert], stale: bool) {
    let header = if stale { "Alerts (cached)" } else { "Alerts" };
    println!("\n{}", format!("=== {} ===", header).bold());
    if alerts.is_empty() {
        println!("(no alerts)");
        return;
    }
    for a in alerts {
        let sev = match a.severity {
            Severity::Critical => "[CRITICAL]".red().bold(),
            Severity::Warning => "[WARNING]".yellow().bold(),
            Severity::Info => "[INFO]".cyan().bold(),
        };
        let status = match a.status {
            AlertStatus::Active => "active".normal(),
            AlertStatus::Resolved => "resolved".dimmed(),
        };
        println!(
            "{} {}  {} - {} ({}, {:?}, {})",
            sev, a.id.bold(), a.component, a.message, a.timestamp, a.kind, status
        );
        println!("      ↳ {}", a.suggestion);
    }
}
