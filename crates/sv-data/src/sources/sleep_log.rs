//! Sleep log source
//!
//! Parses `user_sleep_data.csv` (one row per recorded night, with the
//! participant's demographics and normalized hormone assays repeated on each
//! row) and reduces it to per-user summaries.

use std::io::Read;
use std::path::Path;

use ahash::AHashMap;
use csv::ReaderBuilder;

use crate::DataError;

/// One parsed night of the sleep log. Any numeric field can be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SleepNight {
    pub user_id: u32,
    pub latency: Option<f64>,
    pub efficiency: Option<f64>,
    pub total_sleep_time: Option<f64>,
    pub waso: Option<f64>,
    pub awakenings: Option<f64>,
    pub fragmentation_index: Option<f64>,
    pub gender: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<f64>,
    pub cortisol: Option<f64>,
    pub melatonin: Option<f64>,
}

/// Per-user means over all recorded nights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SleepSummary {
    pub avg_efficiency: Option<f64>,
    pub avg_tst: Option<f64>,
    pub avg_waso: Option<f64>,
    pub avg_awakenings: Option<f64>,
    pub avg_latency: Option<f64>,
    pub avg_fragmentation: Option<f64>,
    pub bmi: Option<f64>,
    pub age: Option<f64>,
    pub gender: Option<String>,
    pub cortisol: Option<f64>,
    pub melatonin: Option<f64>,
}

/// Per-user hormone levels joined with average efficiency, for the paired
/// bar chart. Only users with all three values defined appear.
#[derive(Debug, Clone, PartialEq)]
pub struct HormoneSample {
    pub user_id: u32,
    pub avg_efficiency: f64,
    pub cortisol: f64,
    pub melatonin: f64,
}

/// Column names as they appear in the cleaned CSV.
const COL_USER_ID: &str = "user_id";
const COL_LATENCY: &str = "Latency";
const COL_EFFICIENCY: &str = "Efficiency";
const COL_TST: &str = "Total Sleep Time (TST)";
const COL_WASO: &str = "Wake After Sleep Onset (WASO)";
const COL_AWAKENINGS: &str = "Number of Awakenings";
const COL_FRAGMENTATION: &str = "Sleep Fragmentation Index";
const COL_GENDER: &str = "Gender";
const COL_WEIGHT: &str = "Weight";
const COL_HEIGHT: &str = "Height";
const COL_AGE: &str = "Age";
const COL_CORTISOL: &str = "Cortisol_NORM";
const COL_MELATONIN: &str = "Melatonin_NORM";

/// Parse the sleep log from any reader. Rows without a usable user id are
/// skipped; empty or unparseable numeric cells become `None`.
pub fn read_sleep_log<R: Read>(reader: R) -> Result<Vec<SleepNight>, DataError> {
    let mut csv_reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let col = |name: &str| -> Option<usize> { headers.iter().position(|h| h == name) };

    let user_id_idx = col(COL_USER_ID)
        .ok_or_else(|| DataError::MissingColumn(COL_USER_ID.to_string()))?;
    let latency_idx = col(COL_LATENCY);
    let efficiency_idx = col(COL_EFFICIENCY);
    let tst_idx = col(COL_TST);
    let waso_idx = col(COL_WASO);
    let awakenings_idx = col(COL_AWAKENINGS);
    let fragmentation_idx = col(COL_FRAGMENTATION);
    let gender_idx = col(COL_GENDER);
    let weight_idx = col(COL_WEIGHT);
    let height_idx = col(COL_HEIGHT);
    let age_idx = col(COL_AGE);
    let cortisol_idx = col(COL_CORTISOL);
    let melatonin_idx = col(COL_MELATONIN);

    let mut nights = Vec::new();
    for result in csv_reader.records() {
        let record = result?;

        let user_id = match record.get(user_id_idx).and_then(|v| v.parse::<u32>().ok()) {
            Some(id) => id,
            None => continue,
        };

        let number = |idx: Option<usize>| -> Option<f64> {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };

        let gender = gender_idx
            .and_then(|i| record.get(i))
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string());

        nights.push(SleepNight {
            user_id,
            latency: number(latency_idx),
            efficiency: number(efficiency_idx),
            total_sleep_time: number(tst_idx),
            waso: number(waso_idx),
            awakenings: number(awakenings_idx),
            fragmentation_index: number(fragmentation_idx),
            gender,
            weight: number(weight_idx),
            height: number(height_idx),
            age: number(age_idx),
            cortisol: number(cortisol_idx),
            melatonin: number(melatonin_idx),
        });
    }

    Ok(nights)
}

/// Load and parse the sleep log from disk off the UI thread.
pub async fn load_sleep_log(path: &Path) -> Result<Vec<SleepNight>, DataError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&path)?;
        read_sleep_log(std::io::BufReader::new(file))
    })
    .await?
}

/// Reduce parsed nights to one summary per user. Metric means ignore nights
/// where that metric is absent; a user with no defined values on a metric
/// gets `None` for it.
pub fn summarize(nights: &[SleepNight]) -> AHashMap<u32, SleepSummary> {
    let mut by_user: AHashMap<u32, Vec<&SleepNight>> = AHashMap::new();
    for night in nights {
        by_user.entry(night.user_id).or_default().push(night);
    }

    by_user
        .into_iter()
        .map(|(user_id, user_nights)| {
            let mean = |accessor: fn(&SleepNight) -> Option<f64>| -> Option<f64> {
                let values: Vec<f64> =
                    user_nights.iter().filter_map(|n| accessor(n)).collect();
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            };

            let weight = mean(|n| n.weight);
            let height = mean(|n| n.height);

            let summary = SleepSummary {
                avg_efficiency: mean(|n| n.efficiency),
                avg_tst: mean(|n| n.total_sleep_time),
                avg_waso: mean(|n| n.waso),
                avg_awakenings: mean(|n| n.awakenings),
                avg_latency: mean(|n| n.latency),
                avg_fragmentation: mean(|n| n.fragmentation_index),
                bmi: bmi_from(weight, height),
                age: mean(|n| n.age),
                gender: user_nights.iter().find_map(|n| n.gender.clone()),
                cortisol: mean(|n| n.cortisol),
                melatonin: mean(|n| n.melatonin),
            };
            (user_id, summary)
        })
        .collect()
}

/// BMI from weight in kilograms and height in centimeters.
fn bmi_from(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    match (weight_kg, height_cm) {
        (Some(w), Some(h)) if h > 0.0 => {
            let meters = h / 100.0;
            Some(w / (meters * meters))
        }
        _ => None,
    }
}

/// Hormone samples for users with efficiency and both assays defined,
/// sorted by average efficiency ascending (the chart's x order).
pub fn hormone_samples(summaries: &AHashMap<u32, SleepSummary>) -> Vec<HormoneSample> {
    let mut samples: Vec<HormoneSample> = summaries
        .iter()
        .filter_map(|(&user_id, s)| {
            match (s.avg_efficiency, s.cortisol, s.melatonin) {
                (Some(avg_efficiency), Some(cortisol), Some(melatonin))
                    if avg_efficiency > 0.0 =>
                {
                    Some(HormoneSample {
                        user_id,
                        avg_efficiency,
                        cortisol,
                        melatonin,
                    })
                }
                _ => None,
            }
        })
        .collect();
    samples.sort_by(|a, b| a.avg_efficiency.total_cmp(&b.avg_efficiency));
    samples
}
