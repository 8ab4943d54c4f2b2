use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::goal::GoalConfig;
use crate::language::LanguageTag;
use crate::session::{DocumentSession, SessionUpdate};
use crate::store::KeyValueStore;

/// Unified event type consumed by the runner
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    TextChanged(String),
    TitleChanged(String),
    GoalChanged(GoalConfig),
    LanguageChanged(LanguageTag),
    Tick,
}

/// Source of editor events
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError>;
}

/// Event source fed through a channel, by a reader thread or a test
pub struct ChannelEventSource {
    rx: Receiver<SessionEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SessionEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One tick per second, the writing clock's resolution
    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// What one call to [`Runner::pump`] did
#[derive(Clone, Debug, PartialEq)]
pub enum Pumped {
    Updated(SessionUpdate),
    TitleChanged,
    Ticked { flushed: bool },
    Disconnected,
}

/// Runner that advances a session one event/tick at a time.
///
/// Ticks are due on a fixed schedule, so a steady stream of edits cannot
/// starve the writing clock. Every `autosave_every` ticks the session is
/// flushed if dirty.
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    autosave_every: u64,
    ticks_since_flush: u64,
    next_tick: Instant,
    disconnected: bool,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T, autosave_every: u64) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            autosave_every: autosave_every.max(1),
            ticks_since_flush: 0,
            next_tick,
            disconnected: false,
        }
    }

    /// True once the event source has hung up
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Blocks until the next event, or returns Tick when one is due
    pub fn step(&mut self) -> SessionEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            self.next_tick = now + self.ticker.interval();
            return SessionEvent::Tick;
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => {
                self.next_tick = Instant::now() + self.ticker.interval();
                SessionEvent::Tick
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.disconnected = true;
                self.next_tick = Instant::now() + self.ticker.interval();
                SessionEvent::Tick
            }
        }
    }

    /// Take the next event and apply it to `session`
    pub fn pump<S: KeyValueStore>(&mut self, session: &mut DocumentSession<S>) -> Pumped {
        let event = self.step();
        let pumped = self.apply(session, event);
        if self.disconnected {
            session.flush_if_dirty();
            return Pumped::Disconnected;
        }
        pumped
    }

    pub fn apply<S: KeyValueStore>(
        &mut self,
        session: &mut DocumentSession<S>,
        event: SessionEvent,
    ) -> Pumped {
        match event {
            SessionEvent::TextChanged(text) => Pumped::Updated(session.on_text_changed(&text)),
            SessionEvent::TitleChanged(title) => {
                session.on_title_changed(&title);
                Pumped::TitleChanged
            }
            SessionEvent::GoalChanged(goal) => Pumped::Updated(session.on_goal_changed(goal)),
            SessionEvent::LanguageChanged(tag) => {
                Pumped::Updated(session.on_language_changed(tag))
            }
            SessionEvent::Tick => {
                session.tick();
                self.ticks_since_flush += 1;
                let flushed = if self.ticks_since_flush >= self.autosave_every {
                    self.ticks_since_flush = 0;
                    session.flush_if_dirty()
                } else {
                    false
                };
                Pumped::Ticked { flushed }
            }
        }
    }
}
