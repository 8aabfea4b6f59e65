use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use reqwest::Client;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::checker::Checker;
use crate::config::MonitorConfig;
use crate::error::ConfigError;
use crate::summary::{self, CheckLine, ReportSummary};
use crate::{persist, report, HistoryEntry, Report, Summary};

const SECONDS_PER_TICK: u64 = 1;
const COUNTDOWN_EVERY: u64 = 30;

/// How often and how many times a continuous run polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    /// `None` runs until cancelled.
    pub max_cycles: Option<u32>,
}

impl Schedule {
    pub fn continuous() -> Self {
        Self {
            interval: Duration::from_secs(5 * 60),
            max_cycles: None,
        }
    }

    pub fn quick_test() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_cycles: Some(3),
        }
    }

    fn exhausted(&self, cycles: u32) -> bool {
        self.max_cycles.is_some_and(|max| cycles >= max)
    }

    /// Time slept between cycles. An unbounded schedule sleeps at least one
    /// tick so it cannot poll back to back.
    pub fn pause_length(&self) -> Duration {
        match self.max_cycles {
            Some(_) => self.interval,
            None => self.interval.max(Duration::from_secs(SECONDS_PER_TICK)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Polling,
    Sleeping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason: StopReason,
    pub cycles: u32,
    pub report_path: Option<PathBuf>,
}

/// Owns the configuration and the append-only history of a monitoring session.
pub struct Monitor {
    config: MonitorConfig,
    checker: Checker,
    history: Vec<HistoryEntry>,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().build()?;
        Self::with_client(config, client)
    }

    pub fn with_client(config: MonitorConfig, client: Client) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            checker: Checker::new(client),
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// One cycle: check every endpoint, print progress and the summary.
    pub async fn check_once(&self) -> (Report, Summary) {
        println!("\n🔍 CHECKING SILICIC SYSTEM STATUS...");
        println!("{}", "=".repeat(55));
        let report = report::generate(&self.checker, &self.config, |endpoint, result, statistics| {
            println!(
                "{}",
                CheckLine {
                    endpoint,
                    result,
                    statistics,
                }
            );
        })
        .await;
        let summary = summary::summarize(&report);
        println!(
            "{}",
            ReportSummary {
                report: &report,
                summary: &summary,
            }
        );
        (report, summary)
    }

    /// Polls on `schedule` until the cycle budget runs out or `token` is
    /// cancelled, then prints and saves the run's availability.
    ///
    /// Cancellation is checked between cycles and after every sleep tick. A
    /// cycle interrupted while its requests are in flight is not recorded.
    pub async fn run(&mut self, schedule: Schedule, token: CancellationToken) -> RunOutcome {
        println!("\n🔄 STARTING CONTINUOUS MONITORING");
        println!("   Interval: {} seconds", schedule.interval.as_secs());
        println!("   Press Ctrl+C to stop");
        println!("{}", "-".repeat(55));

        let mut state = State::Idle;
        let mut cycles = 0;
        let mut reason = StopReason::Completed;

        loop {
            debug!(?state, cycles, "driver state");
            state = match state {
                State::Idle if token.is_cancelled() => {
                    reason = StopReason::Cancelled;
                    State::Stopped
                }
                State::Idle if schedule.exhausted(cycles) => State::Stopped,
                State::Idle => State::Polling,
                State::Polling => {
                    cycles += 1;
                    println!("\n🕒 CYCLE {cycles} - {}", Local::now().format("%H:%M:%S"));
                    let polled = tokio::select! {
                        biased;
                        _ = token.cancelled() => None,
                        polled = self.check_once() => Some(polled),
                    };
                    match polled {
                        None => {
                            cycles -= 1;
                            reason = StopReason::Cancelled;
                            State::Stopped
                        }
                        Some((report, summary)) => {
                            self.history.push(HistoryEntry {
                                cycle: cycles,
                                timestamp: report.timestamp,
                                summary,
                                details: report.results,
                            });
                            if schedule.exhausted(cycles) {
                                State::Stopped
                            } else {
                                State::Sleeping
                            }
                        }
                    }
                }
                State::Sleeping => {
                    if pause(schedule.pause_length(), &token).await {
                        State::Polling
                    } else {
                        reason = StopReason::Cancelled;
                        State::Stopped
                    }
                }
                State::Stopped => break,
            };
        }

        if reason == StopReason::Cancelled {
            println!("\n\n🛑 Monitoring stopped by user");
        }
        info!(?reason, cycles, "monitoring finished");

        let report_path = persist::finish(&self.history, &self.config);
        RunOutcome {
            reason,
            cycles,
            report_path,
        }
    }
}

/// Sleeps for `interval` in one-second ticks, redrawing a countdown.
/// Returns `false` if cancelled.
async fn pause(interval: Duration, token: &CancellationToken) -> bool {
    let total = interval.as_secs();
    if total == 0 {
        return !token.is_cancelled();
    }

    println!("\n⏳ Waiting {}:{:02} minutes...", total / 60, total % 60);
    let mut remaining = total;
    while remaining > 0 {
        if remaining % COUNTDOWN_EVERY == 0 {
            print!("\r   Next check in {}:{:02}...", remaining / 60, remaining % 60);
            let _ = std::io::stdout().flush();
        }
        time::sleep(Duration::from_secs(SECONDS_PER_TICK)).await;
        if token.is_cancelled() {
            return false;
        }
        remaining -= SECONDS_PER_TICK.min(remaining);
    }
    print!("\r{:50}\r", "");
    let _ = std::io::stdout().flush();
    true
}
