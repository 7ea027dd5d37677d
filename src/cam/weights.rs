use crate::condition::Condition;
use crate::error::{XRayError, XrResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Final-layer weights: one channel-weight vector per condition.
///
/// Loaded once at startup and shared read-only (`Arc<WeightTable>`) by every
/// analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    channels: usize,
    rows: Vec<Vec<f32>>,
}

impl WeightTable {
    pub fn new(rows: Vec<Vec<f32>>) -> XrResult<Self> {
        let channels = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.is_empty() || channels == 0 {
            return Err(XRayError::ResourceLoad(
                "weight table must contain at least one non-empty row".to_string(),
            ));
        }
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != channels) {
            return Err(XRayError::ResourceLoad(format!(
                "weight row {} has {} columns, expected {}",
                i,
                r.len(),
                channels
            )));
        }
        Ok(Self { channels, rows })
    }

    /// Parses the packaged CSV weight resource.
    ///
    /// One line per condition, `channels` comma-separated floats per line, no
    /// header. Blank lines are ignored.
    pub fn load<R: Read>(reader: R, conditions: usize, channels: usize) -> XrResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::with_capacity(conditions);
        for (row_idx, result) in rdr.records().enumerate() {
            let rec = result.map_err(|e| {
                XRayError::ResourceLoad(format!("weight row {}: {}", row_idx, e))
            })?;

            // A line holding only separators/whitespace counts as blank.
            if rec.iter().all(|f| f.is_empty()) {
                continue;
            }

            if rec.len() != channels {
                return Err(XRayError::ResourceLoad(format!(
                    "weight row {} has {} columns, expected {}",
                    row_idx,
                    rec.len(),
                    channels
                )));
            }

            let mut row = Vec::with_capacity(channels);
            for (col_idx, field) in rec.iter().enumerate() {
                let w: f32 = field.parse().map_err(|_| {
                    XRayError::ResourceLoad(format!(
                        "weight row {}, column {}: '{}' is not a number",
                        row_idx, col_idx, field
                    ))
                })?;
                row.push(w);
            }
            rows.push(row);
        }

        if rows.len() != conditions {
            return Err(XRayError::ResourceLoad(format!(
                "weight file has {} rows, expected one per condition ({})",
                rows.len(),
                conditions
            )));
        }

        debug!("Parsed {} weight rows x {} channels", rows.len(), channels);
        Self::new(rows)
    }

    pub fn load_from_file<P: AsRef<Path>>(
        path: P,
        conditions: usize,
        channels: usize,
    ) -> XrResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            XRayError::ResourceLoad(format!(
                "could not open weight file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::load(file, conditions, channels)?;
        info!("⚖️  Loaded final-layer weights from {}", path.display());
        Ok(table)
    }

    /// Loads a table sized for the built-in condition set.
    pub fn load_for_conditions<P: AsRef<Path>>(path: P, channels: usize) -> XrResult<Self> {
        Self::load_from_file(path, Condition::count(), channels)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of condition rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> &[f32] {
        &self.rows[idx]
    }

    pub fn weights_for(&self, condition: Condition) -> Option<&[f32]> {
        self.rows.get(condition.index()).map(|r| r.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}
