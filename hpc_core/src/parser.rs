//! A tolerant reader for the events of an iCalendar feed.
//!
//! Only the fields of [`RawEvent`] are extracted, everything else is skipped. Unreadable
//! timestamps leave the field empty instead of failing the feed.

use tracing::{debug, warn};

use crate::{
    date::{decode, Timestamp},
    event::{RawEvent, RawEventBuilder},
};

/// Parse all complete `VEVENT` blocks of a feed.
///
/// A block which is still open at the end of the input is dropped.
pub fn parse(text: &str) -> Vec<RawEvent> {
    let mut events = vec![];
    let mut current: Option<RawEventBuilder> = None;
    // depth of components nested in the current event, e.g. VALARM
    let mut nested = 0usize;
    for line in unfold(text) {
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.trim_end() == "BEGIN:VEVENT" {
            if current.is_some() {
                warn!("event block opened inside another one, discarding the outer block");
            }
            current = Some(RawEventBuilder::default());
            nested = 0;
        } else if line.trim_end() == "END:VEVENT" {
            if let Some(builder) = current.take() {
                events.push(builder.build());
            }
        } else if let Some(builder) = current.as_mut() {
            if line.starts_with("BEGIN:") {
                nested += 1;
            } else if line.starts_with("END:") && nested > 0 {
                nested -= 1;
            } else if nested == 0 {
                read_property(builder, line);
            }
        }
    }
    if current.is_some() {
        warn!("feed ended inside an event block, the block is dropped");
    }
    debug!(events = events.len(), "parsed feed");
    events
}

/// Split the text into logical lines.
///
/// A line starting with a space or a tab continues the previous one, the folding character
/// itself is removed.
fn unfold(text: &str) -> Vec<String> {
    let mut lines = text.lines().peekable();
    let mut logical_lines = vec![];
    while let Some(line) = lines.next() {
        let mut logical_line = line.to_string();
        while let Some(continuation) = lines
            .peek()
            .copied()
            .and_then(|next| next.strip_prefix([' ', '\t']))
        {
            logical_line.push_str(continuation);
            lines.next();
        }
        logical_lines.push(logical_line);
    }
    logical_lines
}

/// Store a content line in the builder if it is one of the extracted properties.
fn read_property(builder: &mut RawEventBuilder, line: &str) {
    let Some((name, value)) = line.split_once(':') else {
        return;
    };
    let name = name.split_once(';').map_or(name, |(name, _params)| name);
    match name.to_ascii_uppercase().as_str() {
        "UID" => {
            builder.uid(value.to_string());
        }
        "SUMMARY" => {
            builder.summary(unescape(value));
        }
        "DESCRIPTION" => {
            builder.description(unescape(value));
        }
        "LOCATION" => {
            builder.location(unescape(value));
        }
        "CATEGORIES" => {
            // a comma separated list, kept verbatim
            builder.categories(value.to_string());
        }
        "DTSTART" => {
            if let Some(start) = decode_property(name, value) {
                builder.start(start);
            }
        }
        "DTEND" => {
            if let Some(end) = decode_property(name, value) {
                builder.end(end);
            }
        }
        "CREATED" => {
            if let Some(created) = decode_property(name, value) {
                builder.created(created);
            }
        }
        "LAST-MODIFIED" => {
            if let Some(last_modified) = decode_property(name, value) {
                builder.last_modified(last_modified);
            }
        }
        _ => {}
    }
}

fn decode_property(name: &str, value: &str) -> Option<Timestamp> {
    match decode(value) {
        Ok(timestamp) => Some(timestamp),
        Err(err) => {
            warn!(property = name, token = value, error = %err, "keeping event without unreadable timestamp");
            None
        }
    }
}

/// Undo the escaping of iCalendar TEXT values.
pub(crate) fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(character) = chars.next() {
        if character != '\\' {
            unescaped.push(character);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => unescaped.push('\n'),
            Some(escaped @ (',' | ';' | '\\')) => unescaped.push(escaped),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}
