//! Render/update cycle for the explorer's polylines
//!
//! Polylines are reconciled by `user_id`, never cleared and rebuilt: a data
//! change removes the polylines of departed users, keeps retained users'
//! entries (so identity-preserving transitions are possible), and enters new
//! users with a left-to-right reveal animation driven by cumulative path
//! length.

use ahash::AHashMap;
use egui::Pos2;

use sv_core::{ActivityTier, UserRecord};

/// Cached per-user drawing state.
#[derive(Debug, Clone)]
pub struct Polyline {
    pub user_id: u32,
    pub tier: ActivityTier,
    /// Fraction of the path length currently revealed, 0..=1.
    pub reveal: f32,
    /// Stamp of the sync that created this entry. Survives data changes for
    /// retained users; a removed-then-readded user gets a fresh stamp.
    pub generation: u64,
}

/// Keyed polyline cache.
#[derive(Debug, Default)]
pub struct PolylineCache {
    lines: AHashMap<u32, Polyline>,
    generation: u64,
}

impl PolylineCache {
    /// Reconcile the cache against a new data array.
    ///
    /// Tier classification is recomputed for every record (step data may
    /// have changed); reveal progress and generation stamps are preserved
    /// for retained users.
    pub fn sync(&mut self, data: &[UserRecord]) {
        self.generation += 1;
        let generation = self.generation;

        self.lines
            .retain(|user_id, _| data.iter().any(|r| r.user_id == *user_id));

        for record in data {
            let tier = ActivityTier::from_steps(record.total_daily_steps);
            self.lines
                .entry(record.user_id)
                .and_modify(|line| line.tier = tier)
                .or_insert(Polyline {
                    user_id: record.user_id,
                    tier,
                    reveal: 0.0,
                    generation,
                });
        }
    }

    /// Restart the entry animation for every line (scripted full redraw).
    pub fn restart_reveal(&mut self) {
        for line in self.lines.values_mut() {
            line.reveal = 0.0;
        }
    }

    /// Advance reveal animations by one frame. Returns true while any line
    /// is still animating. A new sync mid-animation simply re-targets the
    /// same entries; later writes win.
    pub fn advance(&mut self, dt: f32, reveal_secs: f32) -> bool {
        let step = if reveal_secs > 0.0 {
            dt / reveal_secs
        } else {
            1.0
        };
        let mut animating = false;
        for line in self.lines.values_mut() {
            if line.reveal < 1.0 {
                line.reveal = (line.reveal + step).min(1.0);
                animating = line.reveal < 1.0 || animating;
            }
        }
        animating
    }

    pub fn get(&self, user_id: u32) -> Option<&Polyline> {
        self.lines.get(&user_id)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The drawable segments of a partially revealed polyline.
///
/// `points` carries one entry per active dimension in axis order; a `None`
/// breaks line continuity at that vertex instead of plotting a false zero.
/// Zero-length paths skip the reveal arithmetic entirely and draw whole.
pub fn segments_for_reveal(points: &[Option<Pos2>], reveal: f32) -> Vec<[Pos2; 2]> {
    let mut segments: Vec<[Pos2; 2]> = Vec::new();
    for window in points.windows(2) {
        if let (Some(a), Some(b)) = (window[0], window[1]) {
            segments.push([a, b]);
        }
    }

    let total: f32 = segments.iter().map(|[a, b]| (*b - *a).length()).sum();
    if total <= 0.0 || reveal >= 1.0 {
        return segments;
    }

    let mut budget = total * reveal.max(0.0);
    let mut visible = Vec::new();
    for [a, b] in segments {
        let len = (b - a).length();
        if len <= budget {
            visible.push([a, b]);
            budget -= len;
        } else {
            if budget > 0.0 {
                let t = budget / len;
                visible.push([a, a + (b - a) * t]);
            }
            break;
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_record(user_id: u32, steps: f64) -> UserRecord {
        UserRecord::steps_only(user_id, steps, 100.0)
    }

    #[test]
    fn test_sync_preserves_identity_of_retained_users() {
        let mut cache = PolylineCache::default();
        let full = vec![
            steps_record(1, 11_000.0),
            steps_record(2, 6_000.0),
            steps_record(3, 2_000.0),
        ];
        cache.sync(&full);
        let gen_user2 = cache.get(2).unwrap().generation;

        // Filter down to a subset: retained users keep their entry.
        let subset = vec![steps_record(2, 6_000.0)];
        cache.sync(&subset);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(2).unwrap().generation, gen_user2);
        assert!(cache.get(1).is_none());

        // A removed-then-readded user is a new entry.
        cache.sync(&full);
        assert_ne!(cache.get(1).unwrap().generation, gen_user2);
        assert_eq!(cache.get(2).unwrap().generation, gen_user2);
    }

    #[test]
    fn test_sync_recomputes_tiers_in_place() {
        let mut cache = PolylineCache::default();
        cache.sync(&[steps_record(1, 11_000.0)]);
        assert_eq!(cache.get(1).unwrap().tier, ActivityTier::High);

        cache.sync(&[steps_record(1, 4_000.0)]);
        assert_eq!(cache.get(1).unwrap().tier, ActivityTier::Lower);
    }

    #[test]
    fn test_new_lines_animate_and_finish() {
        let mut cache = PolylineCache::default();
        cache.sync(&[steps_record(1, 5_000.0)]);
        assert_eq!(cache.get(1).unwrap().reveal, 0.0);

        assert!(cache.advance(0.5, 1.0));
        assert!((cache.get(1).unwrap().reveal - 0.5).abs() < 1e-6);

        // Finishing frame reports no further animation.
        assert!(!cache.advance(0.6, 1.0));
        assert_eq!(cache.get(1).unwrap().reveal, 1.0);
        assert!(!cache.advance(0.1, 1.0));
    }

    #[test]
    fn test_retained_users_do_not_replay_the_entry_animation() {
        let mut cache = PolylineCache::default();
        cache.sync(&[steps_record(1, 5_000.0), steps_record(2, 8_000.0)]);
        while cache.advance(0.25, 1.0) {}

        cache.sync(&[steps_record(1, 5_000.0)]);
        assert_eq!(cache.get(1).unwrap().reveal, 1.0);
    }

    #[test]
    fn test_missing_vertex_breaks_continuity() {
        let points = vec![
            Some(Pos2::new(0.0, 0.0)),
            None,
            Some(Pos2::new(10.0, 0.0)),
            Some(Pos2::new(20.0, 0.0)),
        ];
        let segments = segments_for_reveal(&points, 1.0);
        // Only the pair on the far side of the gap connects.
        assert_eq!(segments, vec![[Pos2::new(10.0, 0.0), Pos2::new(20.0, 0.0)]]);
    }

    #[test]
    fn test_partial_reveal_cuts_the_last_segment() {
        let points = vec![
            Some(Pos2::new(0.0, 0.0)),
            Some(Pos2::new(10.0, 0.0)),
            Some(Pos2::new(10.0, 10.0)),
        ];
        let segments = segments_for_reveal(&points, 0.75);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)]);
        // Second segment cut at half its length: 20 * 0.75 - 10 = 5.
        assert!((segments[1][1].y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_path_skips_the_reveal_trick() {
        // Two coincident points: zero path length, drawn whole at any reveal.
        let points = vec![Some(Pos2::new(5.0, 5.0)), Some(Pos2::new(5.0, 5.0))];
        let segments = segments_for_reveal(&points, 0.0);
        assert_eq!(segments.len(), 1);

        // A single vertex has no segments at all.
        assert!(segments_for_reveal(&[Some(Pos2::new(1.0, 1.0))], 0.5).is_empty());
    }
}
