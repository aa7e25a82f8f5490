//! Sort events into Zoom meetings and everything else.

use crate::event::RawEvent;

/// Descriptions of primary meetings link to this Zoom domain.
pub static MEETING_MARKER: &str = "https://futurense.zoom.us/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    PrimaryMeeting,
    Other,
}

/// Classify an event by its description, the match is case-sensitive.
pub fn classify(event: &RawEvent) -> EventCategory {
    match &event.description {
        Some(description) if description.contains(MEETING_MARKER) => EventCategory::PrimaryMeeting,
        _ => EventCategory::Other,
    }
}
