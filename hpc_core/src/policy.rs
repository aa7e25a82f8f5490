//! Per-category priority and reminder policy.

use crate::classifier::EventCategory;

static LABEL_MEETING: &str = "Reminder: Zoom meeting starting soon";
static LABEL_OTHER: &str = "Reminder: Event starting soon";

/// The caller's choice of priority and reminder for both categories.
///
/// Priorities follow the iCalendar convention (1 is the most urgent) but are not validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    pub zoom_priority: i32,
    pub zoom_reminder: bool,
    pub zoom_reminder_minutes: u32,
    pub other_priority: i32,
    pub other_reminder: bool,
    pub other_reminder_minutes: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            zoom_priority: 1,
            zoom_reminder: true,
            zoom_reminder_minutes: 15,
            other_priority: 5,
            other_reminder: false,
            other_reminder_minutes: 10,
        }
    }
}

impl PolicyConfig {
    /// The query string understood by the calendar endpoint.
    pub fn query_string(&self) -> String {
        format!(
            "zoom_priority={}&zoom_reminder={}&zoom_reminder_minutes={}\
             &other_priority={}&other_reminder={}&other_reminder_minutes={}",
            self.zoom_priority,
            self.zoom_reminder,
            self.zoom_reminder_minutes,
            self.other_priority,
            self.other_reminder,
            self.other_reminder_minutes,
        )
    }

    /// The URL to subscribe to for this policy on a server at `base_url`.
    pub fn subscription_url(&self, base_url: &str) -> String {
        format!(
            "{}/calendar.ics?{}",
            base_url.trim_end_matches('/'),
            self.query_string()
        )
    }
}

/// A display reminder before the event starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmSpec {
    pub lead_seconds: i64,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub priority: i32,
    pub alarm: Option<AlarmSpec>,
}

/// Look up the settings of a category.
pub fn resolve(category: EventCategory, config: &PolicyConfig) -> Resolution {
    let (priority, reminder, minutes, label) = match category {
        EventCategory::PrimaryMeeting => (
            config.zoom_priority,
            config.zoom_reminder,
            config.zoom_reminder_minutes,
            LABEL_MEETING,
        ),
        EventCategory::Other => (
            config.other_priority,
            config.other_reminder,
            config.other_reminder_minutes,
            LABEL_OTHER,
        ),
    };
    Resolution {
        priority,
        alarm: reminder.then(|| AlarmSpec {
            lead_seconds: i64::from(minutes) * 60,
            label,
        }),
    }
}
