// Text and JSON rendering of command results

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::ValueEnum;
use composio_sdk::{
    AuthConfig, Block, Comment, ConnectedAccount, ConnectionRequest, Database, DatabaseRow,
    Deleted, Meeting, MeetingSummary, ObjectType, Page, Participant, Recording, Registrant,
    SearchResult, Toolkit, ToolkitTool, User,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Prints one command result in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn print<T, F>(&self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Text => text(value),
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }

    /// Lists print a placeholder line instead of nothing.
    pub fn print_list<T, F>(&self, items: &[T], empty: &str, text: F) -> Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> String,
    {
        self.print(items, |items| {
            if items.is_empty() {
                return empty.to_string();
            }
            items.iter().map(&text).collect::<Vec<_>>().join("\n")
        })
    }
}

fn or_untitled(title: &Option<String>) -> &str {
    title.as_deref().filter(|t| !t.is_empty()).unwrap_or("Untitled")
}

fn timestamp(time: &Option<DateTime<Utc>>) -> Option<String> {
    time.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
}

/// `2026-02-15T10:00:00Z` or a local `2026-02-15T10:00:00` as
/// `Sun, Feb 15 2026 at 10:00 AM`. Unparseable values are returned as is.
pub fn format_start_time(raw: &str) -> String {
    const DISPLAY: &str = "%a, %b %d %Y at %I:%M %p";
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return time.format(DISPLAY).to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        Ok(time) => time.format(DISPLAY).to_string(),
        Err(_) => raw.to_string(),
    }
}

// Notion

pub fn user(user: &User) -> String {
    let mut out = format!(
        "{} ({})",
        user.name.as_deref().unwrap_or("Unknown"),
        user.id
    );
    if let Some(ref kind) = user.user_type {
        let _ = write!(out, "\n  Type: {}", kind);
    }
    if let Some(ref email) = user.email {
        let _ = write!(out, "\n  Email: {}", email);
    }
    out
}

pub fn user_line(user: &User) -> String {
    let email = user
        .email
        .as_deref()
        .map(|e| format!(" ({})", e))
        .unwrap_or_default();
    format!(
        "  {}{} [{}] - {}",
        user.name.as_deref().unwrap_or("Unknown"),
        email,
        user.user_type.as_deref().unwrap_or("?"),
        user.id
    )
}

pub fn search_result(result: &SearchResult) -> String {
    let marker = match result.object_type {
        ObjectType::Page => "p",
        ObjectType::Database => "db",
    };
    let mut out = format!("  [{}] {}\n       ID: {}", marker, or_untitled(&result.title), result.id);
    if let Some(ref url) = result.url {
        let _ = write!(out, "\n       URL: {}", url);
    }
    out
}

pub fn page(page: &Page) -> String {
    let mut out = format!("Page: {}\n  ID: {}", or_untitled(&page.title), page.id);
    if let Some(ref url) = page.url {
        let _ = write!(out, "\n  URL: {}", url);
    }
    let _ = write!(out, "\n  Archived: {}", page.archived);
    if let Some(created) = timestamp(&page.created_time) {
        let _ = write!(out, "\n  Created: {}", created);
    }
    if let Some(edited) = timestamp(&page.last_edited_time) {
        let _ = write!(out, "\n  Edited: {}", edited);
    }
    out
}

pub fn page_line(page: &Page) -> String {
    format!("  - {} ({})", or_untitled(&page.title), page.id)
}

pub fn block_line(block: &Block) -> String {
    let children = if block.has_children { " +" } else { "" };
    format!("  [{}] {}{}", block.block_type, block.id, children)
}

pub fn database(db: &Database) -> String {
    let mut out = format!("Database: {}\n  ID: {}", or_untitled(&db.title), db.id);
    if let Some(ref url) = db.url {
        let _ = write!(out, "\n  URL: {}", url);
    }
    out.push_str("\n  Properties:");
    for (name, property) in &db.properties {
        let kind = property.get("type").and_then(Value::as_str).unwrap_or("?");
        let _ = write!(out, "\n    - {} ({})", name, kind);
    }
    out
}

pub fn rows(rows: &[DatabaseRow]) -> String {
    if rows.is_empty() {
        return "No rows found.".to_string();
    }
    let mut out = format!("Found {} rows:", rows.len());
    for row in rows {
        let _ = write!(out, "\n  - {} ({})", or_untitled(&row.title()), row.id);
    }
    out
}

pub fn comment_line(comment: &Comment) -> String {
    let when = timestamp(&comment.created_time).unwrap_or_default();
    format!(
        "  {} {}\n    {}",
        comment.id,
        when,
        comment.text().unwrap_or_default()
    )
}

// Zoom

pub fn meeting(meeting: &Meeting) -> String {
    let mut out = format!("  Topic:      {}", meeting.topic.as_deref().unwrap_or(""));
    if let Some(ref start) = meeting.start_time {
        let _ = write!(
            out,
            "\n  Date/Time:  {} {}",
            format_start_time(start),
            meeting.timezone.as_deref().unwrap_or("")
        );
    }
    if let Some(duration) = meeting.duration {
        let _ = write!(out, "\n  Duration:   {} min", duration);
    }
    let _ = write!(out, "\n  Meeting ID: {}", meeting.id);
    if let Some(ref password) = meeting.password {
        let _ = write!(out, "\n  Password:   {}", password);
    }
    if let Some(ref url) = meeting.join_url {
        let _ = write!(out, "\n  Join URL:   {}", url);
    }
    out.push('\n');
    out
}

pub fn registrant(registrant: &Registrant) -> String {
    let mut out = format!(
        "Registered {} {} <{}>",
        registrant.first_name, registrant.last_name, registrant.email
    );
    if let Some(ref id) = registrant.registrant_id {
        let _ = write!(out, "\n  Registrant ID: {}", id);
    }
    if let Some(ref url) = registrant.join_url {
        let _ = write!(out, "\n  Join URL: {}", url);
    }
    out
}

pub fn recording(recording: &Recording) -> String {
    let mut out = format!(
        "  {} ({})\n    {} - {} min",
        recording.topic,
        recording.meeting_id,
        format_start_time(&recording.start_time),
        recording.duration
    );
    if let Some(ref url) = recording.share_url {
        let _ = write!(out, "\n    Share: {}", url);
    }
    for file in &recording.files {
        let _ = write!(out, "\n    - {} ({} bytes)", file.file_type, file.file_size);
        if let Some(ref url) = file.download_url {
            let _ = write!(out, " {}", url);
        }
    }
    out
}

pub fn participant_line(participant: &Participant) -> String {
    let email = participant
        .email
        .as_deref()
        .map(|e| format!(" <{}>", e))
        .unwrap_or_default();
    let duration = participant
        .duration
        .map(|seconds| format!(" - {} min", seconds / 60))
        .unwrap_or_default();
    format!(
        "  {}{}{}",
        participant.name.as_deref().unwrap_or("Unknown"),
        email,
        duration
    )
}

pub fn summary(summary: &MeetingSummary) -> String {
    let mut out = format!("Summary of meeting {}:", summary.meeting_id);
    match summary.summary.as_deref() {
        Some(text) => {
            let _ = write!(out, "\n{}", text);
        }
        None => out.push_str("\n  (no summary available)"),
    }
    for (heading, items) in [("Topics", &summary.topics), ("Next steps", &summary.next_steps)] {
        if let Some(items) = items.as_ref().filter(|items| !items.is_empty()) {
            let _ = write!(out, "\n{}:", heading);
            for item in items {
                let _ = write!(out, "\n  - {}", item);
            }
        }
    }
    out
}

// Management

pub fn toolkit_line(toolkit: &Toolkit) -> String {
    match toolkit.description.as_deref() {
        Some(description) => format!("  {} - {}: {}", toolkit.slug, toolkit.name, description),
        None => format!("  {} - {}", toolkit.slug, toolkit.name),
    }
}

pub fn tool_line(tool: &ToolkitTool) -> String {
    match tool.description.as_deref() {
        Some(description) => format!("  {}\n    {}", tool.action, description),
        None => format!("  {}", tool.action),
    }
}

pub fn auth_config(config: &AuthConfig) -> String {
    format!(
        "  {} [{}] {}{}",
        config.id,
        config.auth_scheme.as_deref().unwrap_or("?"),
        config.toolkit_slug.as_deref().unwrap_or("?"),
        config
            .name
            .as_deref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default()
    )
}

pub fn connection(account: &ConnectedAccount) -> String {
    let mut out = format!(
        "  {} [{}] {}",
        account.id,
        account.status,
        account.toolkit_slug.as_deref().unwrap_or("?")
    );
    if let Some(ref user) = account.user_id {
        let _ = write!(out, "\n    User: {}", user);
    }
    if let Some(ref uuid) = account.deprecated_uuid {
        let _ = write!(out, "\n    Legacy UUID: {}", uuid);
    }
    out
}

pub fn connection_request(request: &ConnectionRequest) -> String {
    let mut out = format!("Connection {} [{}]", request.id, request.status);
    if let Some(ref url) = request.redirect_url {
        let _ = write!(out, "\nOpen this URL to finish authentication:\n  {}", url);
    }
    out
}

pub fn deleted(deleted: &Deleted) -> String {
    format!("Deleted {}", deleted.id)
}

pub fn json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_start_time() {
        assert_eq!(
            format_start_time("2026-02-15T10:00:00Z"),
            "Sun, Feb 15 2026 at 10:00 AM"
        );
        assert_eq!(
            format_start_time("2026-02-15T14:30:00"),
            "Sun, Feb 15 2026 at 02:30 PM"
        );
        assert_eq!(format_start_time("next tuesday"), "next tuesday");
    }

    #[test]
    fn test_meeting_text() {
        let demo = Meeting {
            id: 123,
            topic: Some("Demo".to_string()),
            start_time: Some("2026-02-15T10:00:00Z".to_string()),
            duration: Some(30),
            timezone: Some("UTC".to_string()),
            join_url: Some("https://zoom.us/j/123".to_string()),
            ..Default::default()
        };

        let text = meeting(&demo);
        assert!(text.contains("Topic:      Demo"));
        assert!(text.contains("Duration:   30 min"));
        assert!(text.contains("Join URL:   https://zoom.us/j/123"));
        assert!(!text.contains("Password"));
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(rows(&[]), "No rows found.");
    }
}
