use crate::config::Config;
use crate::document::{DocumentRecord, DocumentSummary};
use crate::error::{EngineError, StoreError};
use crate::goal::{
    compute_progress_with_pace, GoalConfig, GoalEvent, GoalTracker, GoalUnit, ProgressSnapshot,
};
use crate::language::{untitled_placeholder, LanguageTag};
use crate::metrics::{compute_metrics, TextMetrics};
use crate::store::KeyValueStore;
use crate::timer::WritingTimer;
use chrono::{DateTime, Utc};
use clap::ValueEnum;

pub const DOCUMENTS_KEY: &str = "wc-documents";
pub const CURRENT_DOCUMENT_KEY: &str = "wc-current-document";
pub const GOAL_VALUE_KEY: &str = "wc-goal-value";
pub const GOAL_TYPE_KEY: &str = "wc-goal-type";
pub const LANGUAGE_KEY: &str = "wc-language";

/// What the presentation layer gets back after an edit or setting change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUpdate {
    pub metrics: TextMetrics,
    pub progress: ProgressSnapshot,
    pub goal_event: Option<GoalEvent>,
}

/// The one mutable object of the engine: the document collection, the
/// document being edited, and the settings that shape its metrics.
///
/// Every store failure is logged and absorbed; the collection is never empty.
#[derive(Debug)]
pub struct DocumentSession<S: KeyValueStore> {
    store: S,
    documents: Vec<DocumentRecord>,
    current_id: String,
    title: String,
    content: String,
    language: LanguageTag,
    goal: GoalConfig,
    writing_pace: u32,
    metrics: TextMetrics,
    progress: ProgressSnapshot,
    tracker: GoalTracker,
    timer: WritingTimer,
    dirty: bool,
}

impl<S: KeyValueStore> DocumentSession<S> {
    pub fn open(store: S, config: &Config) -> Self {
        Self::open_at(store, config, Utc::now())
    }

    pub fn open_at(store: S, config: &Config, now: DateTime<Utc>) -> Self {
        let language = read_language(&store).unwrap_or(config.language);
        let goal = read_goal(&store, config.default_goal());
        let documents = read_documents(&store).unwrap_or_else(|err| {
            log::warn!("{err}; starting with an empty collection");
            Vec::new()
        });
        let pointer = read_key(&store, CURRENT_DOCUMENT_KEY);

        let metrics = TextMetrics::empty();
        let progress = compute_progress_with_pace(&metrics, &goal, config.writing_pace);
        let mut session = Self {
            store,
            documents,
            current_id: String::new(),
            title: String::new(),
            content: String::new(),
            language,
            goal,
            writing_pace: config.writing_pace,
            metrics,
            progress,
            tracker: GoalTracker::primed(&progress),
            timer: WritingTimer::new(config.idle_timeout_secs),
            dirty: false,
        };

        if session.documents.is_empty() {
            session.create_document_at(now);
        } else {
            let idx = pointer
                .and_then(|id| session.position(&id).ok())
                .unwrap_or(0);
            session.activate(idx, now);
        }
        log::debug!(
            "Session opened with {} document(s), current {}",
            session.documents.len(),
            session.current_id
        );
        session
    }

    // Document lifecycle

    pub fn create_document(&mut self) -> &DocumentRecord {
        self.create_document_at(Utc::now())
    }

    /// New empty document at the front of the collection, made current
    pub fn create_document_at(&mut self, now: DateTime<Utc>) -> &DocumentRecord {
        self.flush_if_dirty_at(now);
        self.documents.insert(0, DocumentRecord::new(now));
        self.activate(0, now);
        self.persist_documents();
        log::debug!("Created document {}", self.current_id);
        &self.documents[0]
    }

    pub fn load_document(&mut self, id: &str) -> bool {
        self.load_document_at(id, Utc::now())
    }

    /// Switch to `id`. Unknown ids leave everything untouched.
    pub fn load_document_at(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let idx = match self.position(id) {
            Ok(idx) => idx,
            Err(err) => {
                log::debug!("Load ignored: {err}");
                return false;
            }
        };

        // saving in place keeps positions stable
        self.flush_if_dirty_at(now);
        self.activate(idx, now);
        true
    }

    pub fn save_document(
        &mut self,
        id: &str,
        title: &str,
        content: &str,
        writing_seconds: u64,
    ) -> Option<&DocumentRecord> {
        self.save_document_at(id, title, content, writing_seconds, Utc::now())
    }

    /// Store `content` under `id` with metrics computed from it right now.
    /// The history gains a point only when the last one is at least a minute old.
    pub fn save_document_at(
        &mut self,
        id: &str,
        title: &str,
        content: &str,
        writing_seconds: u64,
        now: DateTime<Utc>,
    ) -> Option<&DocumentRecord> {
        let idx = match self.position(id) {
            Ok(idx) => idx,
            Err(err) => {
                log::warn!("Save skipped: {err}");
                return None;
            }
        };

        let metrics = compute_metrics(content, self.language);
        let title = match title.trim() {
            "" => untitled_placeholder(self.language),
            trimmed => trimmed.to_string(),
        };
        let is_current = id == self.current_id;

        let record = &mut self.documents[idx];
        record.title = title;
        record.content = content.to_string();
        record.metrics = metrics;
        record.writing_time_seconds = writing_seconds;
        record.updated_at = now;
        if record.history.record(now, metrics.word_count) {
            log::debug!("History point for {id}: {} words", metrics.word_count);
        }

        if is_current {
            self.title = record.title.clone();
            self.content = record.content.clone();
            self.timer.adopt(writing_seconds);
            self.dirty = false;
            self.refresh();
        }

        self.persist_documents();
        self.documents.get(idx)
    }

    pub fn delete_document(&mut self, id: &str) -> bool {
        self.delete_document_at(id, Utc::now())
    }

    /// Remove `id`. Deleting the current document moves to the first remaining
    /// one; deleting the last document replaces it with a fresh one.
    pub fn delete_document_at(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let idx = match self.position(id) {
            Ok(idx) => idx,
            Err(err) => {
                log::debug!("Delete ignored: {err}");
                return false;
            }
        };

        let removed = self.documents.remove(idx);
        log::debug!("Deleted document {}", removed.id);

        if self.documents.is_empty() {
            self.documents.push(DocumentRecord::new(now));
            self.activate(0, now);
        } else if removed.id == self.current_id {
            self.activate(0, now);
        }
        self.persist_documents();
        true
    }

    // Editor commands

    /// The editor text changed: recompute everything and mark the document dirty
    pub fn on_text_changed(&mut self, text: &str) -> SessionUpdate {
        self.content = text.to_string();
        self.dirty = true;
        self.timer.touch();
        self.refresh()
    }

    pub fn on_title_changed(&mut self, title: &str) {
        self.title = title.to_string();
        self.dirty = true;
    }

    pub fn on_goal_changed(&mut self, goal: GoalConfig) -> SessionUpdate {
        if let Err(err) = goal.validated_target() {
            log::warn!("{err}; progress uses the default target");
        }
        self.goal = goal;
        self.write_key(GOAL_VALUE_KEY, &goal.target_value.to_string());
        self.write_key(GOAL_TYPE_KEY, &goal.unit.to_string());
        self.refresh()
    }

    pub fn on_language_changed(&mut self, language: LanguageTag) -> SessionUpdate {
        self.language = language;
        self.write_key(LANGUAGE_KEY, &language.to_string());
        self.refresh()
    }

    // Scheduled entry points

    /// One second of wall time passed
    pub fn tick(&mut self) {
        self.timer.tick();
    }

    pub fn flush_if_dirty(&mut self) -> bool {
        self.flush_if_dirty_at(Utc::now())
    }

    /// Save the editor buffer into the current document if it changed
    pub fn flush_if_dirty_at(&mut self, now: DateTime<Utc>) -> bool {
        if !self.dirty {
            return false;
        }

        let id = self.current_id.clone();
        let title = self.title.clone();
        let content = self.content.clone();
        let seconds = self.timer.accumulated_seconds;
        self.save_document_at(&id, &title, &content, seconds, now)
            .is_some()
    }

    // Queries

    pub fn metrics(&self) -> TextMetrics {
        self.metrics
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress
    }

    pub fn goal(&self) -> GoalConfig {
        self.goal
    }

    pub fn language(&self) -> LanguageTag {
        self.language
    }

    pub fn timer(&self) -> &WritingTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut WritingTimer {
        &mut self.timer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    pub fn current(&self) -> Option<&DocumentRecord> {
        self.documents.iter().find(|doc| doc.id == self.current_id)
    }

    pub fn document(&self, id: &str) -> Option<&DocumentRecord> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    /// Word counts follow the active language, not the snapshot taken at save time
    pub fn summaries(&self) -> Vec<DocumentSummary> {
        self.documents
            .iter()
            .map(|doc| doc.summary_in(self.language))
            .collect()
    }

    /// Words per minute along the current document's history
    pub fn trend(&self) -> Option<f64> {
        self.current()?.history.words_per_minute()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // Internals

    fn position(&self, id: &str) -> Result<usize, EngineError> {
        self.documents
            .iter()
            .position(|doc| doc.id == id)
            .ok_or_else(|| EngineError::DocumentNotFound(id.to_string()))
    }

    fn activate(&mut self, idx: usize, now: DateTime<Utc>) {
        let record = &self.documents[idx];
        self.current_id = record.id.clone();
        self.title = record.title.clone();
        self.content = record.content.clone();
        self.timer.reset_to(record.writing_time_seconds, now);
        self.dirty = false;
        self.refresh();
        self.tracker = GoalTracker::primed(&self.progress);
        let id = self.current_id.clone();
        self.write_key(CURRENT_DOCUMENT_KEY, &id);
    }

    fn refresh(&mut self) -> SessionUpdate {
        self.metrics = compute_metrics(&self.content, self.language);
        self.progress = compute_progress_with_pace(&self.metrics, &self.goal, self.writing_pace);
        SessionUpdate {
            metrics: self.metrics,
            progress: self.progress,
            goal_event: self.tracker.observe(&self.progress),
        }
    }

    fn persist_documents(&mut self) {
        match self.encode_documents() {
            Ok(json) => self.write_key(DOCUMENTS_KEY, &json),
            Err(err) => log::warn!("Unable to persist '{DOCUMENTS_KEY}': {err}"),
        }
    }

    fn encode_documents(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(&self.documents)?)
    }

    fn write_key(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            log::warn!("Unable to persist '{key}': {err}");
        }
    }
}

fn read_key<S: KeyValueStore>(store: &S, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|err| {
        log::warn!("Unable to read '{key}': {err}");
        None
    })
}

fn read_documents<S: KeyValueStore>(store: &S) -> Result<Vec<DocumentRecord>, EngineError> {
    let Some(raw) = store.get(DOCUMENTS_KEY)? else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&raw).map_err(|source| EngineError::MalformedPersistedState {
        key: DOCUMENTS_KEY.to_string(),
        source,
    })
}

fn read_language<S: KeyValueStore>(store: &S) -> Option<LanguageTag> {
    let raw = read_key(store, LANGUAGE_KEY)?;
    raw.parse()
        .map_err(|err| log::warn!("Stored language ignored: {err}"))
        .ok()
}

fn read_goal<S: KeyValueStore>(store: &S, fallback: GoalConfig) -> GoalConfig {
    let target_value = read_key(store, GOAL_VALUE_KEY)
        .map(|raw| GoalConfig::parse_target(&raw))
        .unwrap_or(fallback.target_value);
    let unit = read_key(store, GOAL_TYPE_KEY)
        .and_then(|raw| GoalUnit::from_str(&raw, true).ok())
        .unwrap_or(fallback.unit);
    GoalConfig::new(target_value, unit)
}
