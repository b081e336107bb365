//! Dashboard report generation.
//!
//! This module turns a [`DashboardSnapshot`] into JSON, Markdown or
//! GeoJSON text.

use crate::models::{
    BucketCount, CategoryNode, DashboardSnapshot, HierarchyView, Kpis, SnapshotMetadata,
};
use anyhow::{Context, Result};

/// Generate a complete Markdown report.
pub fn generate_markdown_report(snapshot: &DashboardSnapshot) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# ATM Dashboard Report\n\n");

    output.push_str(&generate_metadata_section(&snapshot.metadata));
    output.push_str(&generate_summary_section(&snapshot.kpis));

    output.push_str(&generate_bucket_section("Service Hours", &snapshot.service_hours));
    output.push_str(&generate_bucket_section("Accessibility", &snapshot.accessibility));
    output.push_str(&generate_bucket_section("Install Type", &snapshot.install_type));

    output.push_str(&generate_location_section(&snapshot.location_categories));

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &SnapshotMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **City:** {}\n", metadata.filter.city));
    section.push_str(&format!("- **Bank:** {}\n", metadata.filter.bank));
    section.push_str(&format!(
        "- **Records Loaded:** {}\n",
        metadata.records_loaded
    ));
    if metadata.records_skipped > 0 {
        section.push_str(&format!(
            "- **Records Skipped:** {} (missing or malformed coordinates)\n",
            metadata.records_skipped
        ));
    }
    section.push('\n');

    section
}

/// Generate the KPI table.
fn generate_summary_section(kpis: &Kpis) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| ATMs | Banks |\n");
    section.push_str("|:---:|:---:|\n");
    section.push_str(&format!("| {} | {} |\n\n", kpis.total, kpis.banks));

    section
}

/// Generate a table for one chart's buckets.
fn generate_bucket_section(title: &str, buckets: &[BucketCount]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));

    if buckets.is_empty() {
        section.push_str("*No ATMs in any tracked category.*\n\n");
        return section;
    }

    let total: usize = buckets.iter().map(|b| b.count).sum();

    section.push_str(&format!("| {} | ATMs | Share |\n", title));
    section.push_str("|:---|:---:|:---:|\n");
    for bucket in buckets {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            bucket.label,
            bucket.count,
            share(bucket.count, total)
        ));
    }
    section.push('\n');

    section
}

/// Generate the location category section.
fn generate_location_section(view: &HierarchyView) -> String {
    let mut section = String::new();

    section.push_str("## Install Location Categories\n\n");

    match view {
        HierarchyView::Hidden => {
            section.push_str("*Select a single bank to see the location breakdown.*\n\n");
        }
        HierarchyView::Empty => {
            section.push_str("*No categorized locations for this selection.*\n\n");
        }
        HierarchyView::Visible(nodes) => {
            for node in nodes {
                section.push_str(&generate_category_block(node));
            }
            section.push('\n');
        }
    }

    section
}

/// Generate a nested list entry for one category.
fn generate_category_block(node: &CategoryNode) -> String {
    let mut block = format!("- **{}**: {}\n", node.label, node.count);
    if node.is_leaf() {
        return block;
    }

    for child in node.children.iter().flatten() {
        block.push_str(&format!("  - {}: {}\n", child.label, child.count));
    }

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by atmdash*\n");

    footer
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

/// Generate a JSON report of the whole snapshot.
pub fn generate_json_report(snapshot: &DashboardSnapshot, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(snapshot)
    } else {
        serde_json::to_string(snapshot)
    };
    json.context("Failed to serialize dashboard snapshot")
}

/// Generate a GeoJSON document holding the map features only.
pub fn generate_geojson(snapshot: &DashboardSnapshot, pretty: bool) -> Result<String> {
    let features = snapshot
        .features
        .as_ref()
        .context("Snapshot was computed without map features")?;

    let json = if pretty {
        serde_json::to_string_pretty(features)
    } else {
        serde_json::to_string(features)
    };
    json.context("Failed to serialize map features")
}
