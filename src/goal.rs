use crate::error::EngineError;
use crate::metrics::TextMetrics;
use crate::util::{ceil_div, rounded_percent};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Target used whenever a configured target is not positive
pub const DEFAULT_GOAL_TARGET: i64 = 500;

/// Writing pace, in goal units per minute, used for time-to-goal estimates.
/// Deliberately far below the reading speeds: it models how fast people write.
pub const DEFAULT_WRITING_PACE: u32 = 20;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GoalUnit {
    #[default]
    Words,
    Chars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalConfig {
    pub target_value: i64,
    pub unit: GoalUnit,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            target_value: DEFAULT_GOAL_TARGET,
            unit: GoalUnit::Words,
        }
    }
}

impl GoalConfig {
    pub fn new(target_value: i64, unit: GoalUnit) -> Self {
        Self { target_value, unit }
    }

    pub fn validated_target(&self) -> Result<u64, EngineError> {
        u64::try_from(self.target_value)
            .ok()
            .filter(|target| *target > 0)
            .ok_or(EngineError::InvalidGoalConfig(self.target_value))
    }

    /// The configured target, or the default when it is not positive
    pub fn effective_target(&self) -> u64 {
        self.validated_target().unwrap_or_else(|err| {
            log::debug!("{err}; using {DEFAULT_GOAL_TARGET}");
            DEFAULT_GOAL_TARGET as u64
        })
    }

    /// Lenient parse of a typed target: takes the leading integer of the input,
    /// and anything unusable becomes the default target.
    pub fn parse_target(input: &str) -> i64 {
        let trimmed = input.trim_start();
        let (sign, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());

        match digits[..end].parse::<i64>() {
            Ok(value) if value != 0 => sign * value,
            _ => DEFAULT_GOAL_TARGET,
        }
    }
}

/// Where the writer stands relative to the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub percentage: u8,
    pub remaining: u64,
    pub estimated_minutes_remaining: u64,
    pub is_complete: bool,
}

pub fn compute_progress(metrics: &TextMetrics, goal: &GoalConfig) -> ProgressSnapshot {
    compute_progress_with_pace(metrics, goal, DEFAULT_WRITING_PACE)
}

/// Same as [`compute_progress`] with an explicit writing pace (units per minute).
/// A zero pace falls back to [`DEFAULT_WRITING_PACE`].
pub fn compute_progress_with_pace(
    metrics: &TextMetrics,
    goal: &GoalConfig,
    pace: u32,
) -> ProgressSnapshot {
    let target = goal.effective_target();
    let current = metrics.count_for(goal.unit) as u64;
    let pace = match pace {
        0 => DEFAULT_WRITING_PACE,
        p => p,
    };

    let percentage = rounded_percent(current, target).min(100) as u8;
    let remaining = target.saturating_sub(current);
    let is_complete = percentage >= 100;
    let estimated_minutes_remaining = if is_complete {
        0
    } else {
        ceil_div(remaining, u64::from(pace))
    };

    ProgressSnapshot {
        percentage,
        remaining,
        estimated_minutes_remaining,
        is_complete,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalPhase {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

impl From<&ProgressSnapshot> for GoalPhase {
    fn from(snapshot: &ProgressSnapshot) -> Self {
        if snapshot.is_complete {
            GoalPhase::Complete
        } else if snapshot.percentage == 0 {
            GoalPhase::NotStarted
        } else {
            GoalPhase::InProgress
        }
    }
}

/// Edge reported when the goal is crossed in either direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalEvent {
    Reached,
    Regressed,
}

/// Follows successive progress snapshots so a completed goal is reported once
#[derive(Debug, Clone, Default)]
pub struct GoalTracker {
    phase: GoalPhase,
}

impl GoalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already known snapshot without reporting an edge
    pub fn primed(snapshot: &ProgressSnapshot) -> Self {
        Self {
            phase: GoalPhase::from(snapshot),
        }
    }

    pub fn phase(&self) -> GoalPhase {
        self.phase
    }

    pub fn observe(&mut self, snapshot: &ProgressSnapshot) -> Option<GoalEvent> {
        let next = GoalPhase::from(snapshot);
        let event = match (self.phase, next) {
            (GoalPhase::Complete, GoalPhase::Complete) => None,
            (_, GoalPhase::Complete) => Some(GoalEvent::Reached),
            (GoalPhase::Complete, _) => Some(GoalEvent::Regressed),
            _ => None,
        };
        self.phase = next;
        event
    }
}
