mod menu;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use clap::Parser;
use menu::Mode;
use silicic::config::{MonitorConfig, DEFAULT_API_URL, DEFAULT_DASHBOARD_URL};
use silicic::driver::{Monitor, Schedule};
use silicic::{persist, report};
use silicic::summary::{Banner, EmergencyLine, RunOverview};
use tokio::signal;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut monitor = Monitor::new(cli.config()).context("invalid monitor configuration")?;
    println!(
        "{}",
        Banner {
            config: monitor.config(),
            now: Local::now(),
        }
    );

    let token = CancellationToken::new();
    start_interrupt_listener(token.clone());

    if let Err(e) = interact(&mut monitor, cli.mode, &token).await {
        println!("\n❌ Error: {e:#}");
        emergency_check(&monitor).await;
    }
    Ok(())
}

async fn interact(
    monitor: &mut Monitor,
    preset: Option<Mode>,
    token: &CancellationToken,
) -> anyhow::Result<()> {
    let mode = match preset {
        Some(mode) => mode,
        None => match prompt(token).await? {
            Some(choice) => {
                let (mode, notice) = Mode::resolve(&choice);
                if let Some(notice) = notice {
                    println!("\n{notice}");
                }
                mode
            }
            None => {
                println!("\n\n👋 Program interrupted");
                return Ok(());
            }
        },
    };

    match mode {
        Mode::Single => {
            println!("\n{}", "=".repeat(55));
            tokio::select! {
                _ = token.cancelled() => {
                    println!("\n\n👋 Program interrupted");
                    return Ok(());
                }
                _ = monitor.check_once() => {}
            }
            println!("\n🌐 EXTRA CONNECTIVITY CHECK:");
            for endpoint in &monitor.config().endpoints {
                println!("   {}: {}", endpoint.name, endpoint.url);
            }
        }
        Mode::Continuous => {
            monitor.run(Schedule::continuous(), token.clone()).await;
        }
        Mode::QuickTest => {
            monitor.run(Schedule::quick_test(), token.clone()).await;
        }
        Mode::ShowLast => {
            let dir = &monitor.config().report_dir;
            match persist::load_latest(dir) {
                Some(saved) => println!(
                    "{}",
                    RunOverview {
                        history: &saved.history,
                        summary: &saved.summary,
                    }
                ),
                None => println!("No monitoring data"),
            }
        }
    }
    Ok(())
}

/// Shows the menu and waits for a line. `None` means the user interrupted.
async fn prompt(token: &CancellationToken) -> anyhow::Result<Option<String>> {
    println!("\nSelect an operating mode:");
    for mode in Mode::ALL {
        println!("{mode}");
    }
    print!("\nOption (1-4): ");
    std::io::stdout().flush()?;

    // Blocking read on a detached thread so an interrupt doesn't wait on stdin.
    let (send, recv) = oneshot::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let read = std::io::stdin().read_line(&mut line).map(|n| (n, line));
        let _ = send.send(read);
    });

    tokio::select! {
        _ = token.cancelled() => Ok(None),
        read = recv => {
            let (n, line) = read
                .context("input reader stopped")?
                .context("failed to read option")?;
            if n == 0 {
                bail!("standard input closed");
            }
            Ok(Some(line))
        }
    }
}

async fn emergency_check(monitor: &Monitor) {
    println!("\n🆘 EMERGENCY CHECK:");
    for (name, status) in report::emergency(monitor.checker(), monitor.config()).await {
        println!("{}", EmergencyLine { name: &name, status });
    }
}

/// Cancels `token` on the first Ctrl-C and exits on the second.
fn start_interrupt_listener(token: CancellationToken) {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_err() {
            return;
        }
        info!("interrupt received, stopping");
        token.cancel();

        if signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    Mode::from_choice(value).ok_or_else(|| format!("unknown mode {value}, expected 1-4"))
}

#[derive(Parser)]
#[command(version, about = "Console uptime monitor for the Silicic Earth services")]
struct Cli {
    /// Operating mode (1-4); prompts when omitted
    #[arg(short, long, value_parser = parse_mode)]
    mode: Option<Mode>,
    /// URL of the API service
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
    /// URL of the dashboard service
    #[arg(long, default_value = DEFAULT_DASHBOARD_URL)]
    dashboard_url: String,
    /// Directory where run reports are written and read back
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,
}

impl Cli {
    fn config(&self) -> MonitorConfig {
        let mut config = MonitorConfig::default()
            .with_url("api", self.api_url.clone())
            .with_url("dashboard", self.dashboard_url.clone());
        config.report_dir = self.report_dir.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_fixed_endpoints() {
        let cli = Cli::parse_from(["monitor"]);
        assert_eq!(cli.mode, None);
        let config = cli.config();
        assert_eq!(config.endpoint("api").unwrap().url, DEFAULT_API_URL);
        assert_eq!(config.endpoint("dashboard").unwrap().url, DEFAULT_DASHBOARD_URL);
        assert_eq!(config.report_dir, PathBuf::from("."));
    }

    #[test]
    fn flags_override_endpoints_and_mode() {
        let cli = Cli::parse_from([
            "monitor",
            "--mode",
            "3",
            "--api-url",
            "http://localhost:8080",
            "--report-dir",
            "/tmp/reports",
        ]);
        assert_eq!(cli.mode, Some(Mode::QuickTest));
        let config = cli.config();
        assert_eq!(config.endpoint("api").unwrap().url, "http://localhost:8080");
        assert_eq!(config.report_dir, PathBuf::from("/tmp/reports"));
    }

    #[test]
    fn bad_mode_is_a_parse_error() {
        assert!(Cli::try_parse_from(["monitor", "--mode", "9"]).is_err());
    }
}
