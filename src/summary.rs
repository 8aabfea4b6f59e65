use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Local, Utc};

use crate::config::MonitorConfig;
use crate::{
    AvailabilityTier, CheckResult, Endpoint, EndpointKind, HistoryEntry, OverallStatus, Report,
    RunSummary, Statistics, Summary,
};

const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "=======================================================";

/// Reduces a report to its overall status. Does not touch the report.
pub fn summarize(report: &Report) -> Summary {
    let online = report.online_count();
    let total = report.results.len();
    Summary {
        status: OverallStatus::from_counts(online, total),
        online,
        total,
        timestamp: report.timestamp,
    }
}

fn clock(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn status_label(status: OverallStatus) -> (&'static str, &'static str, &'static str) {
    match status {
        OverallStatus::Optimal => ("🎉", GREEN, "✅ OPTIMAL"),
        OverallStatus::Partial => ("🔄", YELLOW, "⚠️  PARTIAL"),
        OverallStatus::Critical => ("🚨", RED, "❌ CRITICAL"),
    }
}

/// Start-up banner listing what is being watched.
pub struct Banner<'a> {
    pub config: &'a MonitorConfig,
    pub now: DateTime<Local>,
}

impl Display for Banner<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "        ╔═══════════════════════════════════════╗")?;
        writeln!(f, "        ║     🌍 SILICIC EARTH MONITOR 1.0     ║")?;
        writeln!(f, "        ║   Living planetary nervous system    ║")?;
        writeln!(f, "        ║       Status: WATCHING SERVICES      ║")?;
        writeln!(f, "        ╚═══════════════════════════════════════╝")?;
        writeln!(f, "🕐 System time: {}", self.now.format("%Y-%m-%d %H:%M:%S"))?;
        for endpoint in &self.config.endpoints {
            let icon = match endpoint.kind {
                EndpointKind::Api => "🌐",
                EndpointKind::Dashboard => "📊",
            };
            writeln!(f, "{icon} {}: {}", endpoint.name.to_uppercase(), endpoint.url)?;
        }
        write!(f, "{RULE}")
    }
}

/// Progress lines for one endpoint, printed while a cycle runs.
pub struct CheckLine<'a> {
    pub endpoint: &'a Endpoint,
    pub result: &'a CheckResult,
    pub statistics: Option<&'a Statistics>,
}

impl Display for CheckLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let result = self.result;
        writeln!(f, "\n📡 Probing {}:", self.endpoint.name.to_uppercase())?;
        write!(f, "   URL: {}", self.endpoint.url)?;

        if !result.online {
            write!(f, "\n   ❌ OFFLINE")?;
            if let Some(error) = &result.error {
                write!(f, "\n   🐛 Error: {error}")?;
            }
            return Ok(());
        }

        match result.status_code {
            Some(code) => write!(f, "\n   ✅ ONLINE - {code}")?,
            None => write!(f, "\n   ✅ ONLINE - N/A")?,
        }
        if let Some(elapsed) = result.response_time {
            write!(f, "\n   ⏱️  Time: {elapsed:.2}s")?;
        }
        match self.endpoint.kind {
            EndpointKind::Api => {
                if let Some(stats) = self.statistics {
                    match stats.total_evaluations {
                        Some(total) => write!(f, "\n   📊 Evaluations: {total}")?,
                        None => write!(f, "\n   📊 Evaluations: N/A")?,
                    }
                }
            }
            EndpointKind::Dashboard => {
                if result.is_streamlit == Some(true) {
                    write!(f, "\n   🎯 Confirmed: Streamlit app")?;
                } else {
                    write!(f, "\n   ℹ️  Page is up (may not be Streamlit)")?;
                }
            }
        }
        Ok(())
    }
}

/// End-of-cycle rendering of a report and its summary.
pub struct ReportSummary<'a> {
    pub report: &'a Report,
    pub summary: &'a Summary,
}

impl Display for ReportSummary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let (report, summary) = (self.report, self.summary);
        let (emoji, color, label) = status_label(summary.status);

        writeln!(f, "\n{RULE}")?;
        writeln!(f, "📊 SILICIC EARTH SYSTEM SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "\n{emoji} OVERALL STATUS: {color}{label}{RESET}")?;
        writeln!(f, "   Services online: {}/{}", summary.online, summary.total)?;
        writeln!(f, "   Time: {}", clock(&summary.timestamp))?;

        write!(f, "\n🔧 DETAIL PER SERVICE:")?;
        for (name, result) in &report.results {
            let name = name.to_uppercase();
            if result.online {
                let code = result
                    .status_code
                    .map_or("N/A".to_string(), |code| code.to_string());
                write!(
                    f,
                    "\n   ✅ {name:10} - {:.2}s - HTTP {code}",
                    result.response_time.unwrap_or_default()
                )?;
            } else {
                let error = result
                    .error
                    .as_ref()
                    .map_or("Unknown".to_string(), ToString::to_string);
                write!(f, "\n   ❌ {name:10} - {error}")?;
            }
        }

        if let Some(stats) = &report.statistics {
            write!(f, "\n\n📈 SILICIC STATISTICS:")?;
            write!(f, "\n   📊 Evaluations: {}", stats.total_evaluations.unwrap_or(0))?;
            write!(f, "\n   ⭐ Score: {:.2}", stats.average_score.unwrap_or(0.0))?;
        }

        if !report.recommendations.is_empty() {
            write!(f, "\n\n💡 RECOMMENDATIONS:")?;
            for (i, recommendation) in report.recommendations.iter().enumerate() {
                write!(f, "\n   {}. {recommendation}", i + 1)?;
            }
        }

        if summary.online < summary.total {
            write!(f, "\n\n💤 FREE TIER NOTE:")?;
            write!(f, "\n   Services sleep after 15min without traffic.")?;
            write!(f, "\n   The first request takes ~50s to wake them up.")?;
            write!(f, "\n   This is NORMAL and expected.")?;
        }
        Ok(())
    }
}

/// One line of the emergency check.
pub struct EmergencyLine<'a> {
    pub name: &'a str,
    pub status: Option<u16>,
}

impl Display for EmergencyLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = self.name.to_uppercase();
        match self.status {
            Some(200) => write!(f, "   {name}: ✅ (200)"),
            Some(code) => write!(f, "   {name}: ❌ ({code})"),
            None => write!(f, "   {name}: ❌ not responding"),
        }
    }
}

/// Availability overview printed when a run stops or a saved report is shown.
pub struct RunOverview<'a> {
    pub history: &'a [HistoryEntry],
    pub summary: &'a RunSummary,
}

impl Display for RunOverview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "\n{RULE}")?;
        writeln!(f, "📋 FINAL MONITORING SUMMARY")?;
        writeln!(f, "{RULE}")?;
        write!(f, "\n📊 Total cycles: {}", self.summary.total_cycles)?;

        write!(f, "\n\n📈 AVAILABILITY PER SERVICE:")?;
        for (name, percentage) in &self.summary.availability_by_endpoint {
            let emoji = match AvailabilityTier::from_percentage(*percentage) {
                AvailabilityTier::Good => "✅",
                AvailabilityTier::Fair => "⚠️",
                AvailabilityTier::Poor => "❌",
            };
            write!(f, "\n   {emoji} {:10}: {percentage:.1}%", name.to_uppercase())?;
        }

        if let Some(last) = self.history.last() {
            write!(f, "\n\n⏰ Last check: {}", clock(&last.timestamp))?;
            write!(f, "\n🎯 Final status: {}", last.summary.status.to_string().to_uppercase())?;
        }
        Ok(())
    }
}
