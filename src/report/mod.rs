//! Report writers.
//!
//! Each writer is a [`Renderer`] that receives dashboard snapshots from the
//! controller and presents them somewhere: a file, stdout, or the console.

pub mod generator;

pub use generator::{generate_geojson, generate_json_report, generate_markdown_report};

use crate::dashboard::Renderer;
use crate::models::{BucketCount, DashboardSnapshot, HierarchyView};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Full snapshot as JSON (default)
    #[default]
    Json,
    /// Human-readable Markdown dashboard
    Markdown,
    /// Map features only, as a GeoJSON FeatureCollection
    Geojson,
}

/// Where a report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Stdout,
    /// A file, replaced on every render.
    File(PathBuf),
}

impl Destination {
    /// `-` means stdout, anything else is a file path.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => Destination::File(path),
            _ => Destination::Stdout,
        }
    }
}

/// Render a snapshot in the given format.
pub fn render_to_string(
    snapshot: &DashboardSnapshot,
    format: ReportFormat,
    pretty: bool,
) -> Result<String> {
    match format {
        ReportFormat::Json => generate_json_report(snapshot, pretty),
        ReportFormat::Markdown => Ok(generate_markdown_report(snapshot)),
        ReportFormat::Geojson => generate_geojson(snapshot, pretty),
    }
}

/// Writes each snapshot as a report to a file or stdout.
pub struct ReportWriter {
    format: ReportFormat,
    destination: Destination,
    pretty: bool,
}

impl ReportWriter {
    /// Create a writer.
    pub fn new(format: ReportFormat, destination: Destination, pretty: bool) -> Self {
        Self {
            format,
            destination,
            pretty,
        }
    }
}

impl Renderer for ReportWriter {
    fn name(&self) -> &str {
        "report"
    }

    fn render(&mut self, snapshot: &DashboardSnapshot) -> Result<()> {
        let content = render_to_string(snapshot, self.format, self.pretty)?;

        match &self.destination {
            Destination::Stdout => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", content).context("Failed to write report to stdout")?;
            }
            Destination::File(path) => {
                std::fs::write(path, &content)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
        }

        Ok(())
    }
}

/// Prints a short summary of each snapshot to the console.
#[derive(Debug, Default)]
pub struct ConsoleSummary;

impl ConsoleSummary {
    /// Format the summary lines for a snapshot.
    pub fn summary_text(snapshot: &DashboardSnapshot) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "📊 Dashboard Summary ({})",
            snapshot.metadata.filter
        ));
        lines.push(format!("   ATMs: {}", snapshot.kpis.total));
        lines.push(format!("   Banks: {}", snapshot.kpis.banks));
        lines.push(format!(
            "   Service hours: {}",
            format_buckets(&snapshot.service_hours)
        ));
        lines.push(format!(
            "   Accessibility: {}",
            format_buckets(&snapshot.accessibility)
        ));
        lines.push(format!(
            "   Install type: {}",
            format_buckets(&snapshot.install_type)
        ));

        let view = &snapshot.location_categories;
        let locations = match view.categories() {
            Some(nodes) => nodes
                .iter()
                .map(|node| format!("{} {}", node.label, node.count))
                .collect::<Vec<_>>()
                .join(" | "),
            None if *view == HierarchyView::Hidden => "hidden (no bank selected)".to_string(),
            None => "no data".to_string(),
        };
        lines.push(format!("   Locations: {}", locations));

        lines.join("\n")
    }
}

impl Renderer for ConsoleSummary {
    fn name(&self) -> &str {
        "console"
    }

    fn render(&mut self, snapshot: &DashboardSnapshot) -> Result<()> {
        println!("\n{}", Self::summary_text(snapshot));
        Ok(())
    }
}

fn format_buckets(buckets: &[BucketCount]) -> String {
    if buckets.is_empty() {
        return "-".to_string();
    }

    buckets
        .iter()
        .map(|bucket| format!("{} {}", bucket.label, bucket.count))
        .collect::<Vec<_>>()
        .join(" | ")
}
