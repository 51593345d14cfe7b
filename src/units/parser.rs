//! Parser for `systemctl --type=service --no-legend` output
//!
//! Each line carries: unit name, LOAD, ACTIVE, SUB, description.
//! LOAD and ACTIVE are ignored; SUB becomes the entry status.

use super::{normalize_name, ActiveState, ServiceEntry};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("Not a service unit: {0}")]
    NotAService(String),

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Unrecognized status: {0}")]
    UnknownStatus(String),
}

/// Split off the next whitespace-delimited field
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(pos) => Some((&s[..pos], &s[pos..])),
        None => Some((s, "")),
    }
}

/// Parse one line of list output into an entry
pub fn parse_line(line: &str) -> Result<ServiceEntry, ParseError> {
    // Failed units are prefixed with a bullet
    let line = line.trim_start().trim_start_matches(|c| c == '●' || c == '*');

    let (name, rest) = next_field(line).ok_or(ParseError::MissingField("name"))?;
    if !name.ends_with(".service") || name.len() == ".service".len() {
        return Err(ParseError::NotAService(name.to_string()));
    }
    let (_load, rest) = next_field(rest).ok_or(ParseError::MissingField("load"))?;
    let (_active, rest) = next_field(rest).ok_or(ParseError::MissingField("active"))?;
    let (sub, rest) = next_field(rest).ok_or(ParseError::MissingField("sub"))?;

    let description = rest.trim();
    if description.is_empty() {
        return Err(ParseError::MissingField("description"));
    }

    let active = ActiveState::from_token(sub).ok_or_else(|| ParseError::UnknownStatus(sub.to_string()))?;

    Ok(ServiceEntry::new(name, active, description))
}

/// Parse full list output, skipping lines that don't describe a service
///
/// A repeated name replaces the earlier entry in its original position.
pub fn parse_service_list(output: &str) -> Vec<ServiceEntry> {
    let mut entries: Vec<ServiceEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(entry) => {
                let key = normalize_name(entry.name());
                match index.get(&key) {
                    Some(&pos) => entries[pos] = entry,
                    None => {
                        index.insert(key, entries.len());
                        entries.push(entry);
                    }
                }
            }
            Err(e) => {
                log::debug!("Skipping list line {:?}: {}", line, e);
            }
        }
    }

    entries
}
