//! Role-weighted averages and the historical timeline.
//!
//! Everything here is a pure function over a snapshot of member histories.
//! Members without any score are excluded from both numerator and
//! denominator; an average over nobody is `None`, never zero.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Member, Score, ScoreId};

/// A member together with its full score history, oldest first.
#[derive(Debug, Clone)]
pub struct MemberHistory {
    pub member: Member,
    pub scores: Vec<Score>,
}

impl MemberHistory {
    /// Build a history, sorting the scores into their total order.
    pub fn new(member: Member, mut scores: Vec<Score>) -> Self {
        scores.sort_by_key(Score::order_key);
        Self { member, scores }
    }

    pub fn weight(&self) -> u32 {
        self.member.role.weight()
    }

    /// The score with the greatest (timestamp, id).
    pub fn latest(&self) -> Option<&Score> {
        self.scores.last()
    }
}

/// Running weighted sum.
///
/// `replace` swaps one member's contribution without rescanning the others,
/// which is what keeps the timeline merge linear in the number of scores.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    numerator: f64,
    denominator: u64,
}

impl WeightedMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contributor that was not counted before.
    pub fn add(&mut self, value: f64, weight: u32) {
        self.numerator += value * f64::from(weight);
        self.denominator += u64::from(weight);
    }

    /// Replace a contributor's previous value with a new one.
    pub fn replace(&mut self, previous: f64, value: f64, weight: u32) {
        self.numerator += (value - previous) * f64::from(weight);
    }

    /// The weighted mean, or `None` if nothing has been added.
    pub fn value(&self) -> Option<f64> {
        (self.denominator > 0).then(|| self.numerator / self.denominator as f64)
    }
}

/// Weighted average over `(value, weight)` pairs. `None` when empty.
pub fn weighted_average<I>(contributions: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, u32)>,
{
    let mut mean = WeightedMean::new();
    for (value, weight) in contributions {
        mean.add(value, weight);
    }
    mean.value()
}

/// Weighted average of every member's latest score.
pub fn current_weighted_average(histories: &[MemberHistory]) -> Option<f64> {
    weighted_average(
        histories
            .iter()
            .filter_map(|h| h.latest().map(|s| (s.value.get(), h.weight()))),
    )
}

/// Most recent score timestamp across all members.
pub fn last_updated(histories: &[MemberHistory]) -> Option<DateTime<Utc>> {
    histories
        .iter()
        .filter_map(|h| h.latest().map(|s| s.created_at))
        .max()
}

/// One point of the project trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Calendar date (UTC) on which at least one score was submitted.
    pub date: NaiveDate,
    /// Weighted average of each member's latest score as of the end of `date`.
    pub weighted_average: f64,
}

/// Build the per-date trend with a k-way merge over the member histories.
///
/// A heap yields scores across all members in (timestamp, id) order. Each
/// score replaces its member's previous contribution in a running weighted
/// sum; when the date cursor moves past a day, that day's point is emitted.
/// The final point always equals [`current_weighted_average`] bit for bit.
pub fn build_timeline(histories: &[MemberHistory]) -> Vec<TimelinePoint> {
    let mut heap: BinaryHeap<Reverse<(DateTime<Utc>, ScoreId, usize)>> = histories
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| h.scores.first().map(|s| Reverse((s.created_at, s.id, idx))))
        .collect();

    let mut cursors = vec![0usize; histories.len()];
    let mut current: Vec<Option<f64>> = vec![None; histories.len()];
    let mut mean = WeightedMean::new();
    let mut timeline = Vec::new();
    let mut open_date: Option<NaiveDate> = None;

    while let Some(Reverse((at, _, idx))) = heap.pop() {
        let date = at.date_naive();
        if let Some(day) = open_date.filter(|d| *d != date) {
            push_point(&mut timeline, day, &mean);
        }
        open_date = Some(date);

        let history = &histories[idx];
        let score = &history.scores[cursors[idx]];
        let weight = history.weight();
        let value = score.value.get();
        match current[idx].replace(value) {
            Some(previous) => mean.replace(previous, value, weight),
            None => mean.add(value, weight),
        }

        cursors[idx] += 1;
        if let Some(next) = history.scores.get(cursors[idx]) {
            heap.push(Reverse((next.created_at, next.id, idx)));
        }
    }

    // Running sums drift by ~1e-12; the last point is summed afresh.
    if let Some(date) = open_date {
        let latest = current
            .iter()
            .zip(histories)
            .filter_map(|(value, h)| value.map(|v| (v, h.weight())));
        if let Some(weighted_average) = weighted_average(latest) {
            timeline.push(TimelinePoint {
                date,
                weighted_average,
            });
        }
    }

    timeline
}

fn push_point(timeline: &mut Vec<TimelinePoint>, date: NaiveDate, mean: &WeightedMean) {
    // The mean is non-empty once any score has been merged.
    if let Some(weighted_average) = mean.value() {
        timeline.push(TimelinePoint {
            date,
            weighted_average,
        });
    }
}
