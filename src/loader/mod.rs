//! Dataset loader for ATM location CSV files.
//!
//! This module turns the published CSV into [`Record`]s. Rows without a
//! usable position are dropped here so that nothing downstream has to deal
//! with them.

use crate::models::{Coordinates, Record};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Header of the longitude column.
pub const LONGITUDE_COLUMN: &str = "座標經度";
/// Header of the latitude column.
pub const LATITUDE_COLUMN: &str = "座標緯度";

/// Errors that can occur while loading a dataset.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// The dataset file could not be opened.
    #[error("Failed to open dataset {}: {source}", path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV reader rejected the input.
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    /// A column every row depends on is absent from the header.
    #[error("Required column '{0}' not found in dataset header")]
    MissingColumn(&'static str),
}

/// Configuration for dataset loading.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl From<&crate::config::DataConfig> for LoadConfig {
    fn from(config: &crate::config::DataConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
        }
    }
}

/// Position of every known column in the header, resolved once per file.
///
/// Absent columns, and cells past the end of a short row, read as empty.
struct ColumnIndex {
    city: Option<usize>,
    bank: Option<usize>,
    service_code: Option<usize>,
    wheelchair_flag: Option<usize>,
    blind_flag: Option<usize>,
    install_type: Option<usize>,
    location_category: Option<usize>,
    place: Option<usize>,
    address: Option<usize>,
    town: Option<usize>,
    phone: Option<usize>,
    longitude: usize,
    latitude: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let required =
            |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(Self {
            longitude: required(LONGITUDE_COLUMN)?,
            latitude: required(LATITUDE_COLUMN)?,
            city: find("所屬縣市"),
            bank: find("所屬銀行簡稱"),
            service_code: find("服務型態"),
            wheelchair_flag: find("符合輪椅使用且環境亦符合"),
            blind_flag: find("視障語音且環境亦符合"),
            install_type: find("裝設型態"),
            location_category: find("裝設地點類別"),
            place: find("裝設地點"),
            address: find("地址"),
            town: find("鄉鎮縣市別"),
            phone: find("聯絡電話"),
        })
    }

    /// Convert one row into a record, or `None` when the position is unusable.
    fn record(&self, row: &StringRecord) -> Option<Record> {
        let cell = |index: Option<usize>| -> String {
            index.and_then(|i| row.get(i)).unwrap_or("").to_string()
        };

        let coordinates = Coordinates::parse(
            row.get(self.longitude).unwrap_or(""),
            row.get(self.latitude).unwrap_or(""),
        )?;

        Some(Record {
            city: cell(self.city),
            bank: cell(self.bank),
            service_code: cell(self.service_code),
            wheelchair_flag: cell(self.wheelchair_flag),
            blind_flag: cell(self.blind_flag),
            install_type: cell(self.install_type),
            location_category: cell(self.location_category),
            place: cell(self.place),
            address: cell(self.address),
            town: cell(self.town),
            phone: cell(self.phone),
            coordinates,
        })
    }
}

/// The usable part of a loaded dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Where the rows came from (file path or a caller-chosen label).
    pub source: String,
    /// Rows with a valid position, in file order.
    pub records: Vec<Record>,
    /// Rows dropped because their position was missing or malformed.
    pub skipped: usize,
}

/// Loader for ATM CSV files.
pub struct DatasetLoader {
    config: LoadConfig,
}

impl DatasetLoader {
    /// Create a new loader.
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Load a dataset from a file on disk.
    pub fn load(&self, path: &Path) -> Result<Dataset, LoadError> {
        info!("Loading dataset: {}", path.display());

        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.load_from_reader(file, &path.display().to_string())
    }

    /// Load a dataset from any reader. `source` is only used for reporting.
    pub fn load_from_reader<R: Read>(&self, reader: R, source: &str) -> Result<Dataset, LoadError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns = ColumnIndex::resolve(rdr.headers()?)?;

        let mut records = Vec::new();
        let mut skipped = 0;

        for (index, result) in rdr.records().enumerate() {
            let row = result?;
            match columns.record(&row) {
                Some(record) => records.push(record),
                None => {
                    // Header is line 1, so data row `index` sits on line index + 2.
                    debug!("Skipping row on line {}: unusable coordinates", index + 2);
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(
                "Dropped {} rows with missing or malformed coordinates",
                skipped
            );
        }
        info!("Loaded {} records from {}", records.len(), source);

        Ok(Dataset {
            source: source.to_string(),
            records,
            skipped,
        })
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(LoadConfig::default())
    }
}
