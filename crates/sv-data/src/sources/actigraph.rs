//! Actigraphy source
//!
//! Parses one user's `Actigraph.csv` (one row per sample, with a time of
//! day, a step count, and an optional heart rate) into a 24×60 minute-of-day
//! grid. The grid backs the activity heatmap and yields the two step-derived
//! metrics of the user record.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::DataError;

const HOURS: usize = 24;
const MINUTES: usize = 60;

/// Aggregated activity for one minute-of-day bucket.
#[derive(Debug, Clone, Copy, Default)]
struct Cell {
    steps: f64,
    hr_sum: f64,
    hr_count: u32,
}

/// Minute-of-day aggregation of one user's actigraphy.
#[derive(Debug, Clone)]
pub struct ActivityGrid {
    cells: Vec<Cell>,
}

impl Default for ActivityGrid {
    fn default() -> Self {
        Self {
            cells: vec![Cell::default(); HOURS * MINUTES],
        }
    }
}

impl ActivityGrid {
    fn cell_mut(&mut self, hour: usize, minute: usize) -> Option<&mut Cell> {
        if hour < HOURS && minute < MINUTES {
            Some(&mut self.cells[hour * MINUTES + minute])
        } else {
            None
        }
    }

    fn cell(&self, hour: usize, minute: usize) -> Option<&Cell> {
        if hour < HOURS && minute < MINUTES {
            Some(&self.cells[hour * MINUTES + minute])
        } else {
            None
        }
    }

    /// Record one sample into its minute bucket. Out-of-range times are
    /// dropped.
    pub fn add_sample(&mut self, hour: usize, minute: usize, steps: f64, hr: Option<f64>) {
        if let Some(cell) = self.cell_mut(hour, minute) {
            cell.steps += steps;
            if let Some(hr) = hr.filter(|v| v.is_finite() && *v > 0.0) {
                cell.hr_sum += hr;
                cell.hr_count += 1;
            }
        }
    }

    /// Summed steps in one minute bucket.
    pub fn steps_at(&self, hour: usize, minute: usize) -> f64 {
        self.cell(hour, minute).map_or(0.0, |c| c.steps)
    }

    /// Mean heart rate in one minute bucket, if any sample carried one.
    pub fn hr_at(&self, hour: usize, minute: usize) -> Option<f64> {
        self.cell(hour, minute).and_then(|c| {
            if c.hr_count > 0 {
                Some(c.hr_sum / c.hr_count as f64)
            } else {
                None
            }
        })
    }

    /// Total step count over the observation window.
    pub fn total_steps(&self) -> f64 {
        self.cells.iter().map(|c| c.steps).sum()
    }

    /// Count of distinct minute-of-day buckets with nonzero step activity.
    pub fn active_minutes(&self) -> f64 {
        self.cells.iter().filter(|c| c.steps > 0.0).count() as f64
    }

    /// Largest per-bucket step total, for intensity scaling.
    pub fn max_steps(&self) -> f64 {
        self.cells.iter().map(|c| c.steps).fold(0.0, f64::max)
    }
}

/// Parse `HH:MM` or `HH:MM:SS` into an (hour, minute) bucket.
fn parse_time(value: &str) -> Option<(usize, usize)> {
    let mut parts = value.split(':');
    let hour = parts.next()?.trim().parse::<usize>().ok()?;
    let minute = parts.next()?.trim().parse::<usize>().ok()?;
    if hour < HOURS && minute < MINUTES {
        Some((hour, minute))
    } else {
        None
    }
}

/// Parse one actigraphy CSV from any reader. Rows with unusable timestamps
/// are skipped; a missing heart rate leaves the cell's HR mean undefined.
pub fn read_actigraph<R: Read>(reader: R) -> Result<ActivityGrid, DataError> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let time_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("time"))
        .ok_or_else(|| DataError::MissingColumn("time".to_string()))?;
    let steps_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("steps"))
        .ok_or_else(|| DataError::MissingColumn("Steps".to_string()))?;
    let hr_idx = headers.iter().position(|h| h.eq_ignore_ascii_case("hr"));

    let mut grid = ActivityGrid::default();
    for result in csv_reader.records() {
        let record = result?;

        let (hour, minute) = match record.get(time_idx).and_then(parse_time) {
            Some(bucket) => bucket,
            None => continue,
        };
        let steps = record
            .get(steps_idx)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        let hr = hr_idx
            .and_then(|i| record.get(i))
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok());

        grid.add_sample(hour, minute, steps, hr);
    }

    Ok(grid)
}

/// Load and parse one user's actigraphy from disk off the UI thread.
pub async fn load_actigraph(path: &Path) -> Result<ActivityGrid, DataError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        read_actigraph(std::io::BufReader::new(file))
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
time,Steps,HR
08:30:00,12,80
08:30:30,8,90
08:31:00,0,85
23:59:59,5,
bad-time,7,70
";

    #[test]
    fn test_samples_accumulate_into_minute_buckets() {
        let grid = read_actigraph(SAMPLE.as_bytes()).unwrap();

        assert_eq!(grid.steps_at(8, 30), 20.0);
        assert_eq!(grid.hr_at(8, 30), Some(85.0));
        assert_eq!(grid.steps_at(8, 31), 0.0);
        assert_eq!(grid.hr_at(8, 31), Some(85.0));
        // Missing HR cell leaves the mean undefined.
        assert_eq!(grid.hr_at(23, 59), None);
    }

    #[test]
    fn test_active_minutes_counts_nonzero_buckets_only() {
        let grid = read_actigraph(SAMPLE.as_bytes()).unwrap();

        // 08:30 and 23:59 have steps; 08:31 does not; the bad-time row is
        // dropped entirely.
        assert_eq!(grid.active_minutes(), 2.0);
        assert_eq!(grid.total_steps(), 25.0);
        assert_eq!(grid.max_steps(), 20.0);
    }

    #[test]
    fn test_time_parsing_bounds() {
        assert_eq!(parse_time("00:00"), Some((0, 0)));
        assert_eq!(parse_time("23:59:59"), Some((23, 59)));
        assert_eq!(parse_time("24:00"), None);
        assert_eq!(parse_time("12:60"), None);
        assert_eq!(parse_time(""), None);
    }
}
