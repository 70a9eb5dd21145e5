//! KPI time-series sources.

use rusqlite::{Connection, OpenFlags, params};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::DataConfig;
use crate::error::Result;

/// One raw observation for a `(kpi, geo)` pair
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KpiPoint {
    pub date: String,
    pub value: f64,
}

/// Backing store for KPI rows. An unconfigured source yields no rows, not an error.
pub trait KpiSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn load(&self, kpi: &str, geo: &str) -> Result<Vec<KpiPoint>>;
}

/// Pick the first configured store that exists: SQLite, then CSV, then nothing.
pub fn from_config(data: &DataConfig) -> Box<dyn KpiSource> {
    if data.sqlite_path.exists() {
        tracing::info!("KPI source: sqlite {}", data.sqlite_path.display());
        Box::new(SqliteSource::new(&data.sqlite_path))
    } else if data.csv_path.exists() {
        tracing::info!("KPI source: csv {}", data.csv_path.display());
        Box::new(CsvSource::new(&data.csv_path))
    } else {
        tracing::warn!(
            "Neither {} nor {} exists; KPI queries will return no data",
            data.sqlite_path.display(),
            data.csv_path.display()
        );
        Box::new(EmptySource)
    }
}

/// `kpi_data(date, kpi, geo, value)` table in a SQLite file
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl KpiSource for SqliteSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self, kpi: &str, geo: &str) -> Result<Vec<KpiPoint>> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let mut stmt = conn
            .prepare("SELECT date, value FROM kpi_data WHERE kpi = ?1 AND geo = ?2 ORDER BY date")?;
        let rows = stmt.query_map(params![kpi, geo], |row| {
            Ok(KpiPoint {
                date: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        let points = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        tracing::debug!(kpi, geo, rows = points.len(), "sqlite rows loaded");
        Ok(points)
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    kpi: String,
    geo: String,
    value: f64,
}

/// Flat file with `date,kpi,geo,value` headers
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl KpiSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn load(&self, kpi: &str, geo: &str) -> Result<Vec<KpiPoint>> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let mut points = Vec::new();
        for result in rdr.deserialize() {
            let row: CsvRow = result?;
            if row.kpi == kpi && row.geo == geo {
                points.push(KpiPoint {
                    date: row.date,
                    value: row.value,
                });
            }
        }
        tracing::debug!(kpi, geo, rows = points.len(), "csv rows loaded");
        Ok(points)
    }
}

pub struct EmptySource;

impl KpiSource for EmptySource {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn load(&self, _kpi: &str, _geo: &str) -> Result<Vec<KpiPoint>> {
        Ok(Vec::new())
    }
}
