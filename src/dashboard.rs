//! Dashboard controller.
//!
//! The [`Dashboard`] owns the loaded dataset and the active filter. Each
//! filter change recomputes every aggregate from scratch and hands the
//! resulting snapshot to all registered renderers, in registration order.

use crate::analysis::{
    self, count_by_scheme, filter_records, location_hierarchy, Accessibility, InstallType,
    ServiceHours,
};
use crate::loader::Dataset;
use crate::models::{DashboardSnapshot, FilterState, Selection, SnapshotMetadata};
use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// A consumer of dashboard snapshots (report writer, console summary, ...).
pub trait Renderer {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Present one snapshot.
    fn render(&mut self, snapshot: &DashboardSnapshot) -> Result<()>;
}

/// Compute every dashboard value for `filter`.
pub fn build_snapshot(
    dataset: &Dataset,
    filter: &FilterState,
    include_features: bool,
) -> DashboardSnapshot {
    let filtered = filter_records(&dataset.records, filter);

    DashboardSnapshot {
        metadata: SnapshotMetadata {
            source: dataset.source.clone(),
            generated_at: Utc::now(),
            filter: filter.clone(),
            records_loaded: dataset.records.len(),
            records_skipped: dataset.skipped,
        },
        kpis: analysis::kpis(&filtered),
        service_hours: count_by_scheme(&filtered, &ServiceHours),
        accessibility: count_by_scheme(&filtered, &Accessibility),
        install_type: count_by_scheme(&filtered, &InstallType),
        location_categories: location_hierarchy(&filtered, filter),
        features: include_features.then(|| analysis::to_feature_collection(&filtered)),
    }
}

/// Owner of the dataset, the filter state and the renderers.
pub struct Dashboard {
    dataset: Dataset,
    filter: FilterState,
    include_features: bool,
    renderers: Vec<Box<dyn Renderer>>,
}

impl Dashboard {
    /// Create a dashboard over a loaded dataset, with no filter applied.
    pub fn new(dataset: Dataset) -> Self {
        info!(
            "Dashboard ready: {} records ({} skipped at load)",
            dataset.records.len(),
            dataset.skipped
        );

        Self {
            dataset,
            filter: FilterState::default(),
            include_features: true,
            renderers: Vec::new(),
        }
    }

    /// Whether snapshots carry the map feature collection.
    pub fn with_features(mut self, include_features: bool) -> Self {
        self.include_features = include_features;
        self
    }

    /// Start from a city selection. Nothing is computed or rendered until
    /// the next selection.
    pub fn with_city(mut self, city: Selection) -> Self {
        self.filter = FilterState {
            city,
            bank: Selection::All,
        };
        self
    }

    /// Register a renderer. Renderers run in registration order.
    pub fn add_renderer(&mut self, renderer: Box<dyn Renderer>) {
        debug!("Registered renderer: {}", renderer.name());
        self.renderers.push(renderer);
    }

    /// The active filter.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Cities available for selection.
    pub fn city_options(&self) -> Vec<String> {
        analysis::city_options(&self.dataset.records)
    }

    /// Banks available for selection within the selected city.
    pub fn bank_options(&self) -> Vec<String> {
        analysis::bank_options(&self.dataset.records, &self.filter.city)
    }

    /// Select a city. The bank list is rebuilt for the new city, so the
    /// bank selection goes back to all.
    pub fn select_city(&mut self, city: Selection) -> Result<DashboardSnapshot> {
        self.apply(FilterState {
            city,
            bank: Selection::All,
        })
    }

    /// Select a bank within the current city.
    pub fn select_bank(&mut self, bank: Selection) -> Result<DashboardSnapshot> {
        if let Some(name) = bank.value() {
            if !self.bank_options().iter().any(|option| option == name) {
                warn!(
                    "Bank '{}' has no ATMs in city '{}'",
                    name, self.filter.city
                );
            }
        }

        self.apply(FilterState {
            city: self.filter.city.clone(),
            bank,
        })
    }

    /// Replace the filter, recompute, and dispatch to every renderer.
    pub fn apply(&mut self, filter: FilterState) -> Result<DashboardSnapshot> {
        debug!("Filter changed: {} -> {}", self.filter, filter);
        self.filter = filter;

        let snapshot = self.snapshot();
        debug!(
            "Snapshot: {} records, {} banks",
            snapshot.kpis.total, snapshot.kpis.banks
        );

        for renderer in &mut self.renderers {
            renderer
                .render(&snapshot)
                .with_context(|| format!("Renderer '{}' failed", renderer.name()))?;
        }

        Ok(snapshot)
    }

    /// Compute the snapshot for the active filter without dispatching it.
    pub fn snapshot(&self) -> DashboardSnapshot {
        build_snapshot(&self.dataset, &self.filter, self.include_features)
    }
}
