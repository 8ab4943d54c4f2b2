use crate::util::format_hms;
use chrono::{DateTime, Utc};

/// Idle time after which the writing clock stops on its own
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Seconds of active writing in the current document session.
///
/// Driven by a once-per-second `tick`; it never looks at the text itself.
#[derive(Debug, Clone)]
pub struct WritingTimer {
    pub accumulated_seconds: u64,
    pub is_running: bool,
    /// Value `accumulated_seconds` had when the session started
    pub base_seconds: u64,
    pub session_started_at: DateTime<Utc>,
    pub idle_seconds: u64,
    pub idle_timeout_secs: Option<u64>,
}

impl Default for WritingTimer {
    fn default() -> Self {
        Self {
            accumulated_seconds: 0,
            is_running: false,
            base_seconds: 0,
            session_started_at: Utc::now(),
            idle_seconds: 0,
            idle_timeout_secs: Some(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

impl WritingTimer {
    pub fn new(idle_timeout_secs: Option<u64>) -> Self {
        Self {
            idle_timeout_secs,
            ..Self::default()
        }
    }

    /// One real second elapsed
    pub fn tick(&mut self) {
        if !self.is_running {
            return;
        }

        self.accumulated_seconds += 1;
        self.idle_seconds += 1;
        if let Some(limit) = self.idle_timeout_secs {
            if self.idle_seconds >= limit {
                log::debug!("Writing clock idle for {limit}s, pausing");
                self.is_running = false;
            }
        }
    }

    /// Writing activity happened: start the clock if needed and clear idle time
    pub fn touch(&mut self) {
        self.idle_seconds = 0;
        self.is_running = true;
    }

    pub fn start(&mut self) {
        self.touch();
    }

    pub fn pause(&mut self) {
        self.is_running = false;
    }

    pub fn toggle(&mut self) {
        if self.is_running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Begin a new session from a document's persisted seconds
    pub fn reset_to(&mut self, seconds: u64, now: DateTime<Utc>) {
        self.accumulated_seconds = seconds;
        self.base_seconds = seconds;
        self.session_started_at = now;
        self.idle_seconds = 0;
        self.is_running = false;
    }

    /// Take over a total saved from elsewhere. The session keeps running and
    /// keeps the seconds it has already added.
    pub fn adopt(&mut self, seconds: u64) {
        let session = self.session_seconds();
        self.accumulated_seconds = seconds;
        self.base_seconds = seconds.saturating_sub(session);
    }

    /// Seconds added since the last reset
    pub fn session_seconds(&self) -> u64 {
        self.accumulated_seconds.saturating_sub(self.base_seconds)
    }

    pub fn display(&self) -> String {
        format_hms(self.accumulated_seconds)
    }
}
