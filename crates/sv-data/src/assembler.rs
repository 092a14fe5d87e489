//! Data assembler
//!
//! Fans out one actigraphy load per candidate participant, joins on their
//! aggregate completion, and merges the results with the sleep log summaries
//! into the explorer's flat record set. Loads run once per session; a failed
//! per-user load excludes that user with a logged warning, never an error.

use std::path::{Path, PathBuf};

use ahash::AHashMap;
use tracing::{info, warn};

use sv_core::UserRecord;

use crate::sources::actigraph::{load_actigraph, ActivityGrid};
use crate::sources::sleep_log::{
    hormone_samples, load_sleep_log, summarize, HormoneSample, SleepSummary,
};
use crate::DataError;

/// Everything the page renders, resolved before first draw.
#[derive(Debug, Default)]
pub struct StudyData {
    /// One flat record per participant with step data.
    pub records: Vec<UserRecord>,
    /// Minute-of-day activity grids, keyed by user, for the heatmap.
    pub grids: AHashMap<u32, ActivityGrid>,
    /// Hormone levels sorted by average efficiency, for the bar chart.
    pub hormones: Vec<HormoneSample>,
    /// Per-user sleep summaries, for tooltips on the companion charts.
    pub summaries: AHashMap<u32, SleepSummary>,
}

fn sleep_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join("clean_data").join("user_sleep_data.csv")
}

fn actigraph_path(data_dir: &Path, user_id: u32) -> PathBuf {
    data_dir
        .join("user_data")
        .join(format!("user_{user_id}"))
        .join("Actigraph.csv")
}

/// Merge per-user activity grids with sleep summaries. A user is included
/// only if step data exists; sleep metrics are filled in where a summary
/// exists and left `None` otherwise.
pub fn merge_users(
    grids: &AHashMap<u32, ActivityGrid>,
    summaries: &AHashMap<u32, SleepSummary>,
) -> Vec<UserRecord> {
    let mut records: Vec<UserRecord> = grids
        .iter()
        .map(|(&user_id, grid)| {
            let mut record =
                UserRecord::steps_only(user_id, grid.total_steps(), grid.active_minutes());
            if let Some(summary) = summaries.get(&user_id) {
                record.bmi = summary.bmi;
                record.age = summary.age;
                record.avg_efficiency = summary.avg_efficiency;
                record.avg_tst = summary.avg_tst;
                record.avg_waso = summary.avg_waso;
                record.avg_awakenings = summary.avg_awakenings;
                record.avg_latency = summary.avg_latency;
            }
            record
        })
        .collect();
    records.sort_by_key(|r| r.user_id);
    records
}

/// Load every input concurrently and join before first render.
///
/// The sleep log parses once; actigraphy loads fan out as one task per
/// candidate user id and are awaited together, with no sequential
/// dependency between users.
pub async fn assemble(data_dir: &Path, user_ids: &[u32]) -> Result<StudyData, DataError> {
    let sleep_task = {
        let path = sleep_log_path(data_dir);
        tokio::spawn(async move { load_sleep_log(&path).await })
    };

    let activity_tasks: Vec<(u32, tokio::task::JoinHandle<Result<ActivityGrid, DataError>>)> =
        user_ids
            .iter()
            .map(|&user_id| {
                let path = actigraph_path(data_dir, user_id);
                (
                    user_id,
                    tokio::spawn(async move { load_actigraph(&path).await }),
                )
            })
            .collect();

    let nights = sleep_task.await??;
    let summaries = summarize(&nights);

    let mut grids = AHashMap::new();
    for (user_id, task) in activity_tasks {
        match task.await? {
            Ok(grid) => {
                grids.insert(user_id, grid);
            }
            Err(e) => {
                warn!("skipping user {user_id}: actigraphy load failed: {e}");
            }
        }
    }

    let records = merge_users(&grids, &summaries);
    let hormones = hormone_samples(&summaries);
    info!(
        "assembled {} user records ({} sleep summaries, {} hormone samples)",
        records.len(),
        summaries.len(),
        hormones.len()
    );

    Ok(StudyData {
        records,
        grids,
        hormones,
        summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_steps(samples: &[(usize, usize, f64)]) -> ActivityGrid {
        let mut grid = ActivityGrid::default();
        for &(hour, minute, steps) in samples {
            grid.add_sample(hour, minute, steps, None);
        }
        grid
    }

    #[test]
    fn test_merge_keeps_only_users_with_step_data() {
        let mut grids = AHashMap::new();
        grids.insert(3, grid_with_steps(&[(9, 0, 4_000.0), (18, 30, 7_000.0)]));

        let mut summaries = AHashMap::new();
        summaries.insert(
            3,
            SleepSummary {
                avg_efficiency: Some(88.0),
                bmi: Some(22.5),
                ..SleepSummary::default()
            },
        );
        // Sleep data for a user with no actigraphy must not produce a record.
        summaries.insert(7, SleepSummary::default());

        let records = merge_users(&grids, &summaries);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, 3);
        assert_eq!(records[0].total_daily_steps, 11_000.0);
        assert_eq!(records[0].active_minutes, 2.0);
        assert_eq!(records[0].avg_efficiency, Some(88.0));
        assert_eq!(records[0].bmi, Some(22.5));
    }

    #[test]
    fn test_merge_without_summary_leaves_sleep_metrics_none() {
        let mut grids = AHashMap::new();
        grids.insert(5, grid_with_steps(&[(12, 0, 500.0)]));

        let records = merge_users(&grids, &AHashMap::new());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].avg_efficiency, None);
        assert_eq!(records[0].bmi, None);
        assert_eq!(records[0].age, None);
    }

    #[test]
    fn test_merge_output_sorted_by_user_id() {
        let mut grids = AHashMap::new();
        for id in [9, 2, 14] {
            grids.insert(id, grid_with_steps(&[(8, 0, 100.0)]));
        }

        let ids: Vec<u32> = merge_users(&grids, &AHashMap::new())
            .iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(ids, vec![2, 9, 14]);
    }
}
