//! Build the prioritized calendar.

use chrono::Utc;
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, Property},
    ical_property,
    parser::ical::component::IcalAlarm,
};

use crate::{
    date::{encode, Timestamp},
    event::OutputEvent,
    policy::AlarmSpec,
};

/// Calendar level properties of the generated feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    pub name: String,
    pub description: String,
    pub timezone: String,
    pub product_id: String,
}

impl Default for FeedMetadata {
    fn default() -> Self {
        FeedMetadata {
            name: String::from("High Priority Calendar"),
            description: String::from("Processed calendar with smart prioritization"),
            timezone: String::from("Asia/Kolkata"),
            product_id: String::from("-//futurense//calendar-priority-service//EN"),
        }
    }
}

/// Content lines are folded after this many octets.
const LINE_LIMIT: usize = 75;

/// Render the events as iCalendar text.
pub fn serialize(events: &[OutputEvent], metadata: &FeedMetadata) -> String {
    generate(&build(events, metadata))
}

/// Build the calendar holding one `VEVENT` per output event.
pub fn build(events: &[OutputEvent], metadata: &FeedMetadata) -> IcalCalendar {
    let changed = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(metadata.product_id.as_str())
        .build();
    calendar
        .properties
        .push(ical_property!("X-WR-CALNAME", escape(&metadata.name)));
    calendar
        .properties
        .push(ical_property!("X-WR-CALDESC", escape(&metadata.description)));
    calendar
        .properties
        .push(ical_property!("X-WR-TIMEZONE", metadata.timezone.as_str()));
    for output_event in events {
        calendar.events.push(get_event(output_event, &changed));
    }
    calendar
}

/// Build a single event, absent fields are left out.
fn get_event(output_event: &OutputEvent, changed: &str) -> IcalEvent {
    let event = &output_event.event;
    let mut ical_event = IcalEvent::new();
    let properties = &mut ical_event.properties;
    properties.push(ical_property!("UID", event.uid.as_str()));
    properties.push(ical_property!("DTSTAMP", changed));
    for (name, timestamp) in [
        ("DTSTART", &event.start),
        ("DTEND", &event.end),
        ("CREATED", &event.created),
        ("LAST-MODIFIED", &event.last_modified),
    ] {
        if let Some(timestamp) = timestamp {
            properties.push(timestamp_property(name, timestamp));
        }
    }
    for (name, text) in [
        ("SUMMARY", &event.summary),
        ("DESCRIPTION", &event.description),
        ("LOCATION", &event.location),
    ] {
        if let Some(text) = text {
            properties.push(Property {
                name: name.to_string(),
                params: None,
                value: Some(escape(text)),
            });
        }
    }
    if let Some(categories) = &event.categories {
        properties.push(ical_property!("CATEGORIES", categories.as_str()));
    }
    properties.push(ical_property!(
        "PRIORITY",
        output_event.priority.to_string()
    ));
    if let Some(alarm) = &output_event.alarm {
        ical_event.alarms.push(get_alarm(alarm));
    }
    ical_event
}

fn get_alarm(alarm: &AlarmSpec) -> IcalAlarm {
    let mut ical_alarm = IcalAlarm::new();
    ical_alarm.properties.push(ical_property!("ACTION", "DISPLAY"));
    ical_alarm
        .properties
        .push(ical_property!("TRIGGER", trigger(alarm.lead_seconds)));
    ical_alarm
        .properties
        .push(ical_property!("DESCRIPTION", escape(alarm.label)));
    ical_alarm
}

fn timestamp_property(name: &str, timestamp: &Timestamp) -> Property {
    let params = timestamp
        .is_date()
        .then(|| vec![(String::from("VALUE"), vec![String::from("DATE")])]);
    Property {
        name: name.to_string(),
        params,
        value: Some(encode(timestamp)),
    }
}

/// Write the calendar with CRLF line endings.
fn generate(calendar: &IcalCalendar) -> String {
    let mut text = String::new();
    write_line(&mut text, "BEGIN:VCALENDAR");
    write_properties(&mut text, &calendar.properties);
    for event in &calendar.events {
        write_line(&mut text, "BEGIN:VEVENT");
        write_properties(&mut text, &event.properties);
        for alarm in &event.alarms {
            write_line(&mut text, "BEGIN:VALARM");
            write_properties(&mut text, &alarm.properties);
            write_line(&mut text, "END:VALARM");
        }
        write_line(&mut text, "END:VEVENT");
    }
    write_line(&mut text, "END:VCALENDAR");
    text
}

fn write_properties(text: &mut String, properties: &[Property]) {
    for property in properties {
        let mut line = property.name.clone();
        for (name, values) in property.params.iter().flatten() {
            line.push(';');
            line.push_str(name);
            line.push('=');
            line.push_str(&values.join(","));
        }
        line.push(':');
        line.push_str(property.value.as_deref().unwrap_or_default());
        write_line(text, &line);
    }
}

/// Append a content line folded into chunks of at most [`LINE_LIMIT`] octets.
///
/// A fold never splits a multi-byte character.
fn write_line(text: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = LINE_LIMIT;
    while rest.len() > limit {
        let mut end = limit;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        text.push_str(&rest[..end]);
        text.push_str("\r\n ");
        rest = &rest[end..];
        // the folding space counts towards the limit
        limit = LINE_LIMIT - 1;
    }
    text.push_str(rest);
    text.push_str("\r\n");
}

/// Express a lead time as a duration relative to the event start.
fn trigger(lead_seconds: i64) -> String {
    let sign = if lead_seconds > 0 { "-" } else { "" };
    match lead_seconds.unsigned_abs() {
        0 => String::from("PT0S"),
        seconds if seconds % 3600 == 0 => format!("{sign}PT{}H", seconds / 3600),
        seconds if seconds % 60 == 0 => format!("{sign}PT{}M", seconds / 60),
        seconds => format!("{sign}PT{seconds}S"),
    }
}

/// Escape an iCalendar TEXT value.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(character),
        }
    }
    escaped
}
