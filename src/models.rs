//! Data models for the ATM dashboard.
//!
//! This module contains the records loaded from the dataset, the filter
//! state chosen by the user, and the aggregated values handed to renderers.

use chrono::{DateTime, Utc};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyword that selects every value of a filter dimension.
pub const ALL: &str = "all";

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl Coordinates {
    /// Parse a longitude/latitude pair from raw dataset strings.
    ///
    /// Returns `None` when either side is blank or not a finite number.
    pub fn parse(longitude: &str, latitude: &str) -> Option<Self> {
        let longitude: f64 = longitude.trim().parse().ok()?;
        let latitude: f64 = latitude.trim().parse().ok()?;

        if !longitude.is_finite() || !latitude.is_finite() {
            return None;
        }

        Some(Self {
            longitude,
            latitude,
        })
    }
}

/// One ATM from the dataset.
///
/// Every field except the position is kept as the raw string from the
/// source; classification happens in the analysis layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// County or city the ATM belongs to.
    pub city: String,
    /// Short name of the operating bank.
    pub bank: String,
    /// Service-hours code (`9`, `E`, `N`, ...).
    pub service_code: String,
    /// Wheelchair accessibility flag (`V` when set).
    pub wheelchair_flag: String,
    /// Voice guidance for the visually impaired flag (`V` when set).
    pub blind_flag: String,
    /// Install type code (`1` inside a branch, `2` outside).
    pub install_type: String,
    /// Install location category code such as `A1` or `L1`.
    pub location_category: String,
    /// Name of the installation site.
    pub place: String,
    /// Street address.
    pub address: String,
    /// Town or district.
    pub town: String,
    /// Contact phone number.
    pub phone: String,
    /// Position of the ATM.
    pub coordinates: Coordinates,
}

/// One side of the filter: everything, or a single exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    /// No constraint.
    #[default]
    All,
    /// Exact match on the given value.
    Only(String),
}

impl Selection {
    /// Returns true when `value` passes this selection.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    /// Returns true for the unconstrained selection.
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Returns the selected value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(value) => Some(value),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "{}", ALL),
            Selection::Only(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        Selection::from(s.as_str())
    }
}

impl From<Selection> for String {
    fn from(selection: Selection) -> Self {
        selection.to_string()
    }
}

/// The active city/bank constraint pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected city.
    pub city: Selection,
    /// Selected bank.
    pub bank: Selection,
}

impl FilterState {
    /// Creates a filter from a city and a bank selection.
    pub fn new(city: impl Into<Selection>, bank: impl Into<Selection>) -> Self {
        Self {
            city: city.into(),
            bank: bank.into(),
        }
    }

    /// Returns true when `record` satisfies both selections.
    pub fn accepts(&self, record: &Record) -> bool {
        self.city.matches(&record.city) && self.bank.matches(&record.bank)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city={} bank={}", self.city, self.bank)
    }
}

/// A single chart bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    /// Human-readable category label.
    pub label: String,
    /// Number of records in the category.
    pub count: usize,
}

impl BucketCount {
    /// Creates a bucket.
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Top level of the install-location hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    /// Category label.
    pub label: String,
    /// Sum of all sub-category counts.
    pub count: usize,
    /// Sub-categories, absent when the category collapses to a leaf.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BucketCount>>,
}

impl CategoryNode {
    /// Returns true when the category has no second level.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// What the location-category chart should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "categories", rename_all = "snake_case")]
pub enum HierarchyView {
    /// No bank is selected; the aggregation did not run.
    Hidden,
    /// A bank is selected but no record carries a known category.
    Empty,
    /// Categories to draw, largest first.
    Visible(Vec<CategoryNode>),
}

impl HierarchyView {
    /// Returns the categories when the chart should be drawn.
    pub fn categories(&self) -> Option<&[CategoryNode]> {
        match self {
            HierarchyView::Visible(nodes) => Some(nodes),
            HierarchyView::Hidden | HierarchyView::Empty => None,
        }
    }
}

/// Scalar counts shown in the header widgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    /// Number of records passing the filter.
    pub total: usize,
    /// Number of distinct banks among them.
    pub banks: usize,
}

/// Metadata about a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMetadata {
    /// Where the dataset was loaded from.
    pub source: String,
    /// Time the snapshot was computed.
    pub generated_at: DateTime<Utc>,
    /// Filter the snapshot was computed for.
    pub filter: FilterState,
    /// Usable records in the dataset.
    pub records_loaded: usize,
    /// Rows dropped at load time because of missing or malformed coordinates.
    pub records_skipped: usize,
}

/// Everything the renderers need for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Metadata about the snapshot.
    pub metadata: SnapshotMetadata,
    /// Header counts.
    pub kpis: Kpis,
    /// Bar chart: ATMs per service-hours bucket.
    pub service_hours: Vec<BucketCount>,
    /// Pie chart: ATMs per accessibility combination.
    pub accessibility: Vec<BucketCount>,
    /// Treemap: ATMs inside and outside bank branches.
    pub install_type: Vec<BucketCount>,
    /// Sunburst: install location categories.
    pub location_categories: HierarchyView,
    /// Map layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureCollection>,
}


#[cfg(test)]
mod tests {
    use super::testing::record;
    use super::*;

    #[test]
    fn test_coordinates_parse() {
        let coords = Coordinates::parse(" 121.5654 ", "25.0330").unwrap();
        assert_eq!(coords.longitude, 121.5654);
        assert_eq!(coords.latitude, 25.0330);

        assert!(Coordinates::parse("", "25.0").is_none());
        assert!(Coordinates::parse("121.5", "north").is_none());
        assert!(Coordinates::parse("NaN", "25.0").is_none());
        assert!(Coordinates::parse("121.5", "inf").is_none());
    }

    #[test]
    fn test_selection_from_str() {
        assert_eq!(Selection::from("all"), Selection::All);
        assert_eq!(Selection::from("ALL"), Selection::All);
        assert_eq!(Selection::from("  "), Selection::All);
        assert_eq!(
            Selection::from(" 台北市 "),
            Selection::Only("台北市".to_string())
        );
    }

    #[test]
    fn test_selection_serde_uses_plain_strings() {
        let filter = FilterState::new("台北市", "all");
        let json = serde_json::to_string(&filter).unwrap();
        assert_eq!(json, r#"{"city":"台北市","bank":"all"}"#);

        let parsed: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_filter_accepts() {
        let filter = FilterState::new("台北市", "A銀行");
        assert!(filter.accepts(&record("台北市", "A銀行")));
        assert!(!filter.accepts(&record("台北市", "B銀行")));
        assert!(!filter.accepts(&record("新北市", "A銀行")));

        let open = FilterState::default();
        assert!(open.accepts(&record("新北市", "B銀行")));
    }

    #[test]
    fn test_hierarchy_view_serialization() {
        let hidden = serde_json::to_value(HierarchyView::Hidden).unwrap();
        assert_eq!(hidden["status"], "hidden");

        let visible = HierarchyView::Visible(vec![CategoryNode {
            label: "便利商店".to_string(),
            count: 3,
            children: None,
        }]);
        let value = serde_json::to_value(&visible).unwrap();
        assert_eq!(value["status"], "visible");
        assert_eq!(value["categories"][0]["count"], 3);
        assert!(value["categories"][0].get("children").is_none());
    }
}
