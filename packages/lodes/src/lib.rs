#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! LEHD LODES workplace area characteristics (WAC) client.
//!
//! LODES publishes per-state gzipped CSV flat files. The client downloads
//! the state file once, caches the gzipped bytes on disk, and sums the
//! job-count columns on each read. The decode + sum path is a pure
//! function over any reader so it can be exercised without the network.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use gridstats_geography_models::fips;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LODES version 8 base URL.
pub const LODES_BASE_URL: &str = "https://lehd.ces.census.gov/data/lodes/LODES8";

/// Latest LODES year used when the caller does not pin one.
pub const DEFAULT_LODES_YEAR: u16 = 2022;

/// Earnings band columns summed from the WAC file.
const EARNINGS_COLUMNS: [&str; 3] = ["CE01", "CE02", "CE03"];

/// NAICS sector columns summed from the WAC file.
const SECTOR_COLUMNS: [(&str, &str); 2] = [("CNS01", "NAICS11"), ("CNS02", "NAICS21")];

/// Errors from the LODES flat-file client.
#[derive(Debug, Error)]
pub enum LodesError {
    /// HTTP download failed.
    #[error("HTTP error: {0}")]
    Http(#[from] gridstats_fetch::FetchError),

    /// Cache file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The state FIPS code has no LODES coverage.
    #[error("no LODES coverage for state FIPS {fips}")]
    UnknownState {
        /// The unrecognized state FIPS code.
        fips: String,
    },
}

/// Workplace job statistics summed over a state's WAC file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkplaceStats {
    /// Total jobs (`C000`).
    pub total_jobs: u64,
    /// Jobs by monthly earnings band (`CE01`..`CE03`).
    pub earnings_bands: BTreeMap<String, u64>,
    /// Jobs by NAICS sector (`CNS01`/`CNS02`).
    pub by_sector: BTreeMap<String, u64>,
}

impl WorkplaceStats {
    /// An all-zero stats record with every band and sector key present.
    #[must_use]
    pub fn zero() -> Self {
        let mut earnings_bands = BTreeMap::new();
        for (i, _) in EARNINGS_COLUMNS.iter().enumerate() {
            earnings_bands.insert(format!("E{}", i + 1), 0);
        }
        let mut by_sector = BTreeMap::new();
        for (_, sector) in SECTOR_COLUMNS {
            by_sector.insert(sector.to_string(), 0);
        }
        Self {
            total_jobs: 0,
            earnings_bands,
            by_sector,
        }
    }
}

/// Client for LODES WAC downloads with a local disk cache.
///
/// Constructed at startup with an explicit cache directory and injected
/// into the request pipeline.
#[derive(Debug, Clone)]
pub struct LodesClient {
    http: reqwest::Client,
    cache_dir: PathBuf,
}

impl LodesClient {
    /// Creates a client caching downloads under `cache_dir`.
    #[must_use]
    pub fn new(http: reqwest::Client, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            cache_dir: cache_dir.into(),
        }
    }

    /// Sums workplace statistics for one state and year.
    ///
    /// Downloads the state's WAC file unless a cached copy exists, then
    /// decodes and sums the job-count columns.
    ///
    /// # Errors
    ///
    /// Returns [`LodesError`] if the state has no LODES coverage, the
    /// download fails, or the cached file cannot be read or decoded.
    #[allow(clippy::future_not_send)]
    pub async fn workplace_stats(
        &self,
        state_fips: &str,
        year: Option<u16>,
    ) -> Result<WorkplaceStats, LodesError> {
        let abbr = fips::state_abbr(state_fips).ok_or_else(|| LodesError::UnknownState {
            fips: state_fips.to_string(),
        })?;
        let year = year.unwrap_or(DEFAULT_LODES_YEAR);

        let cache_path = self.cache_path(abbr, year);
        if !cache_path.exists() {
            self.download(abbr, year, &cache_path).await?;
        } else {
            log::info!("using cached LODES data for {abbr} {year}");
        }

        let file = std::fs::File::open(&cache_path)?;
        parse_wac_csv(GzDecoder::new(file))
    }

    fn cache_path(&self, abbr: &str, year: u16) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{year}_wac.csv.gz", abbr.to_lowercase()))
    }

    #[allow(clippy::future_not_send)]
    async fn download(&self, abbr: &str, year: u16, cache_path: &Path) -> Result<(), LodesError> {
        let st = abbr.to_lowercase();
        let url = format!("{LODES_BASE_URL}/{st}/wac/{st}_wac_S000_JT00_{year}.csv.gz");

        log::info!("downloading LODES data for {abbr} {year}");
        // State WAC files run tens of MB; allow more than the client's
        // default per-request timeout.
        let bytes = gridstats_fetch::send_bytes(|| {
            self.http
                .get(&url)
                .timeout(std::time::Duration::from_secs(180))
        })
        .await?;

        std::fs::create_dir_all(self.cache_dir.as_path())?;
        std::fs::write(cache_path, bytes)?;
        Ok(())
    }
}

/// Decodes a WAC CSV stream and sums the job-count columns.
///
/// Cells that fail to parse as numbers count as 0 — one bad row never
/// fails the file.
///
/// # Errors
///
/// Returns [`LodesError::Csv`] if the stream is not readable CSV.
pub fn parse_wac_csv<R: Read>(reader: R) -> Result<WorkplaceStats, LodesError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let total_idx = column("C000");
    let earnings_idx: Vec<Option<usize>> = EARNINGS_COLUMNS.iter().map(|c| column(c)).collect();
    let sector_idx: Vec<Option<usize>> = SECTOR_COLUMNS.iter().map(|(c, _)| column(c)).collect();

    let mut stats = WorkplaceStats::zero();

    for record in csv_reader.records() {
        let record = record?;
        let cell = |idx: Option<usize>| -> u64 {
            idx.and_then(|i| record.get(i))
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };

        stats.total_jobs += cell(total_idx);
        for (i, idx) in earnings_idx.iter().enumerate() {
            *stats.earnings_bands.entry(format!("E{}", i + 1)).or_insert(0) += cell(*idx);
        }
        for (i, idx) in sector_idx.iter().enumerate() {
            *stats
                .by_sector
                .entry(SECTOR_COLUMNS[i].1.to_string())
                .or_insert(0) += cell(*idx);
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write as _};

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    const WAC_CSV: &str = "\
w_geocode,C000,CE01,CE02,CE03,CNS01,CNS02,createdate
110010058002000,120,30,50,40,5,0,20240101
110010058002001,80,20,30,30,0,3,20240101
";

    #[test]
    fn sums_job_columns() {
        let stats = parse_wac_csv(Cursor::new(WAC_CSV)).unwrap();
        assert_eq!(stats.total_jobs, 200);
        assert_eq!(stats.earnings_bands["E1"], 50);
        assert_eq!(stats.earnings_bands["E2"], 80);
        assert_eq!(stats.earnings_bands["E3"], 70);
        assert_eq!(stats.by_sector["NAICS11"], 5);
        assert_eq!(stats.by_sector["NAICS21"], 3);
    }

    #[test]
    fn decodes_gzipped_stream() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(WAC_CSV.as_bytes()).unwrap();
        let gz = encoder.finish().unwrap();

        let stats = parse_wac_csv(GzDecoder::new(Cursor::new(gz))).unwrap();
        assert_eq!(stats.total_jobs, 200);
    }

    #[test]
    fn bad_cells_count_as_zero() {
        let csv = "\
w_geocode,C000,CE01,CE02,CE03,CNS01,CNS02
110010058002000,oops,30,,40,5,0
";
        let stats = parse_wac_csv(Cursor::new(csv)).unwrap();
        assert_eq!(stats.total_jobs, 0);
        assert_eq!(stats.earnings_bands["E1"], 30);
        assert_eq!(stats.earnings_bands["E2"], 0);
    }

    #[test]
    fn empty_file_yields_zero_stats() {
        let stats = parse_wac_csv(Cursor::new("w_geocode,C000\n")).unwrap();
        assert_eq!(stats, WorkplaceStats::zero());
    }

    #[test]
    fn zero_stats_carry_all_keys() {
        let zero = WorkplaceStats::zero();
        assert_eq!(zero.earnings_bands.len(), 3);
        assert_eq!(zero.by_sector.len(), 2);
        assert_eq!(zero.total_jobs, 0);
    }

    #[test]
    fn unknown_state_is_rejected() {
        assert!(fips::state_abbr("72").is_none());
    }
}
