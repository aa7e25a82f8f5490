//! Event records flowing through the pipeline.

use uuid::Uuid;

use crate::{
    classifier::EventCategory,
    date::Timestamp,
    policy::{resolve, AlarmSpec, PolicyConfig},
};

static UID_DOMAIN: &str = "calendar-priority-service";

/// One `VEVENT` as read from the upstream feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub uid: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub categories: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub created: Option<Timestamp>,
    pub last_modified: Option<Timestamp>,
}

/// Accumulates the fields of an event block until `END:VEVENT`.
#[derive(Debug, Default)]
pub struct RawEventBuilder {
    uid: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    categories: Option<String>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    created: Option<Timestamp>,
    last_modified: Option<Timestamp>,
}

impl RawEventBuilder {
    pub fn uid(&mut self, uid: String) -> &mut Self {
        self.uid = Some(uid);
        self
    }

    pub fn summary(&mut self, summary: String) -> &mut Self {
        self.summary = Some(summary);
        self
    }

    pub fn description(&mut self, description: String) -> &mut Self {
        self.description = Some(description);
        self
    }

    pub fn location(&mut self, location: String) -> &mut Self {
        self.location = Some(location);
        self
    }

    pub fn categories(&mut self, categories: String) -> &mut Self {
        self.categories = Some(categories);
        self
    }

    pub fn start(&mut self, start: Timestamp) -> &mut Self {
        self.start = Some(start);
        self
    }

    pub fn end(&mut self, end: Timestamp) -> &mut Self {
        self.end = Some(end);
        self
    }

    pub fn created(&mut self, created: Timestamp) -> &mut Self {
        self.created = Some(created);
        self
    }

    pub fn last_modified(&mut self, last_modified: Timestamp) -> &mut Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Finalize the event, an absent UID is generated.
    pub fn build(self) -> RawEvent {
        RawEvent {
            uid: self.uid.unwrap_or_else(generate_uid),
            summary: self.summary,
            description: self.description,
            location: self.location,
            categories: self.categories,
            start: self.start,
            end: self.end,
            created: self.created,
            last_modified: self.last_modified,
        }
    }
}

/// Generate a UID for an event which has none.
///
/// The result is random, only its format is stable.
pub fn generate_uid() -> String {
    format!("{}@{UID_DOMAIN}", Uuid::new_v4())
}

/// An event with its resolved priority and reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub event: RawEvent,
    pub category: EventCategory,
    pub priority: i32,
    pub alarm: Option<AlarmSpec>,
}

impl OutputEvent {
    pub fn new(event: RawEvent, category: EventCategory, config: &PolicyConfig) -> Self {
        let resolution = resolve(category, config);
        OutputEvent {
            event,
            category,
            priority: resolution.priority,
            alarm: resolution.alarm,
        }
    }
}
