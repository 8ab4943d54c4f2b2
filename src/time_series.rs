use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Most points kept per document; the oldest is evicted first
pub const HISTORY_CAPACITY: usize = 50;
/// Minimum spacing between two recorded points
pub const HISTORY_MIN_GAP_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
}

impl HistoryPoint {
    pub fn new(timestamp: DateTime<Utc>, word_count: usize) -> Self {
        Self {
            timestamp,
            word_count,
        }
    }
}

impl From<(DateTime<Utc>, usize)> for HistoryPoint {
    fn from(v: (DateTime<Utc>, usize)) -> Self {
        HistoryPoint::new(v.0, v.1)
    }
}

impl From<HistoryPoint> for (DateTime<Utc>, usize) {
    fn from(p: HistoryPoint) -> Self {
        (p.timestamp, p.word_count)
    }
}

/// Word-count trend line of one document, bounded and throttled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    points: VecDeque<HistoryPoint>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point unless the previous one is less than a minute old.
    /// Returns whether the point was kept.
    pub fn record(&mut self, timestamp: DateTime<Utc>, word_count: usize) -> bool {
        if let Some(last) = self.points.back() {
            if timestamp - last.timestamp < Duration::seconds(HISTORY_MIN_GAP_SECS) {
                return false;
            }
        }

        self.points.push_back(HistoryPoint::new(timestamp, word_count));
        while self.points.len() > HISTORY_CAPACITY {
            self.points.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&HistoryPoint> {
        self.points.front()
    }

    pub fn last(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    /// Net words per minute between the oldest and newest points
    pub fn words_per_minute(&self) -> Option<f64> {
        let (first, last) = (self.first()?, self.last()?);
        let minutes = (last.timestamp - first.timestamp).num_seconds() as f64 / 60.0;
        if minutes <= 0.0 {
            return None;
        }
        Some((last.word_count as f64 - first.word_count as f64) / minutes)
    }

    /// Minutes until `target` words at the recorded trend, if the trend is rising
    pub fn estimated_minutes_to(&self, target: usize) -> Option<u64> {
        let last = self.last()?;
        if last.word_count >= target {
            return Some(0);
        }
        let rate = self.words_per_minute().filter(|rate| *rate > 0.0)?;
        Some(((target - last.word_count) as f64 / rate).ceil() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_first_point_always_recorded() {
        let mut history = History::new();
        assert!(history.record(at(0), 10));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_points_inside_gap_are_dropped() {
        let mut history = History::new();
        assert!(history.record(at(0), 10));
        assert!(!history.record(at(30), 20));
        assert!(!history.record(at(59), 30));
        assert!(history.record(at(60), 40));
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().word_count, 40);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new();
        for i in 0..=HISTORY_CAPACITY as i64 {
            assert!(history.record(at(i * 60), i as usize));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.first().unwrap().word_count, 1);
        assert_eq!(history.last().unwrap().word_count, HISTORY_CAPACITY);
    }

    #[test]
    fn test_words_per_minute() {
        let mut history = History::new();
        assert_eq!(history.words_per_minute(), None);
        history.record(at(0), 100);
        assert_eq!(history.words_per_minute(), None);
        history.record(at(120), 160);
        assert_eq!(history.words_per_minute(), Some(30.0));
    }

    #[test]
    fn test_estimated_minutes_to_target() {
        let mut history = History::new();
        history.record(at(0), 100);
        history.record(at(60), 120);
        assert_eq!(history.estimated_minutes_to(200), Some(4));
        assert_eq!(history.estimated_minutes_to(50), Some(0));
    }

    #[test]
    fn test_no_estimate_for_falling_trend() {
        let mut history = History::new();
        history.record(at(0), 100);
        history.record(at(60), 80);
        assert_eq!(history.estimated_minutes_to(200), None);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut history = History::new();
        history.record(at(0), 3);
        let json = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        let back: History = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn test_point_tuple_conversions() {
        let point = HistoryPoint::from((at(5), 7));
        let (timestamp, words): (DateTime<Utc>, usize) = point.into();
        assert_eq!(timestamp, at(5));
        assert_eq!(words, 7);
    }
}
