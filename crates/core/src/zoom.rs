// Zoom records and request payloads

use crate::decode::{Decode, DecodeError, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Zoom meeting.
///
/// Only `id` is guaranteed; the create and update actions echo back a
/// partial record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: u64,
    pub topic: Option<String>,
    /// As sent by Zoom, e.g. `2026-02-15T15:00:00Z`.
    pub start_time: Option<String>,
    /// Minutes.
    pub duration: Option<u64>,
    pub timezone: Option<String>,
    pub join_url: Option<String>,
    pub start_url: Option<String>,
    pub password: Option<String>,
    pub agenda: Option<String>,
    pub status: Option<String>,
    pub host_email: Option<String>,
}

impl Decode for Meeting {
    const ENTITY: &'static str = "Meeting";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            id: fields.required_u64("id")?,
            topic: fields.optional_str("topic")?,
            start_time: fields.optional_str("start_time")?,
            duration: fields.optional_u64("duration")?,
            timezone: fields.optional_str("timezone")?,
            join_url: fields.optional_str("join_url")?,
            start_url: fields.optional_str("start_url")?,
            password: fields.optional_str("password")?,
            agenda: fields.optional_str("agenda")?,
            status: fields.optional_str("status")?,
            host_email: fields.optional_str("host_email")?,
        })
    }
}

/// Which meetings `list_meetings` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingListType {
    #[default]
    Upcoming,
    Scheduled,
    Live,
    Pending,
}

impl MeetingListType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for MeetingListType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeetingListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "scheduled" => Ok(Self::Scheduled),
            "live" => Ok(Self::Live),
            "pending" => Ok(Self::Pending),
            other => Err(format!(
                "unknown meeting type '{}', expected upcoming, scheduled, live or pending",
                other
            )),
        }
    }
}

/// Cloud recording mode for a new meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoRecording {
    #[default]
    Cloud,
    Local,
    None,
}

impl FromStr for AutoRecording {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cloud" => Ok(Self::Cloud),
            "local" => Ok(Self::Local),
            "none" => Ok(Self::None),
            other => Err(format!(
                "unknown auto_recording '{}', expected cloud, local or none",
                other
            )),
        }
    }
}

/// Input for creating a scheduled meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingCreate {
    pub topic: String,
    /// ISO 8601 local time, interpreted in `timezone`.
    pub start_time: String,
    #[serde(default = "default_duration")]
    pub duration: u64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default = "default_waiting_room")]
    pub waiting_room: bool,
    #[serde(default)]
    pub auto_recording: AutoRecording,
}

impl MeetingCreate {
    pub fn new(topic: impl Into<String>, start_time: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            start_time: start_time.into(),
            duration: default_duration(),
            timezone: default_timezone(),
            agenda: None,
            waiting_room: default_waiting_room(),
            auto_recording: AutoRecording::default(),
        }
    }
}

/// Fields to change on a meeting; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,
}

impl MeetingUpdate {
    pub fn is_empty(&self) -> bool {
        self.topic.is_none()
            && self.start_time.is_none()
            && self.duration.is_none()
            && self.agenda.is_none()
    }
}

/// Meeting registrant as confirmed by Zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registrant {
    pub registrant_id: Option<String>,
    pub email: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub join_url: Option<String>,
}

impl Registrant {
    /// Combine the registration response with the submitted identity, which
    /// Zoom does not echo back.
    pub fn from_response(
        value: &Value,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self, DecodeError> {
        let fields = Fields::of("Registrant", value)?;

        Ok(Self {
            registrant_id: fields.optional_str("registrant_id")?,
            email: email.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            join_url: fields.optional_str("join_url")?,
        })
    }
}

/// One file of a cloud recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingFile {
    pub id: String,
    pub file_type: String,
    /// Bytes.
    #[serde(default)]
    pub file_size: u64,
    pub download_url: Option<String>,
    pub play_url: Option<String>,
    pub status: Option<String>,
}

impl Decode for RecordingFile {
    const ENTITY: &'static str = "RecordingFile";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            id: fields.required_str("id")?,
            file_type: fields.required_str("file_type")?,
            file_size: fields.optional_u64("file_size")?.unwrap_or(0),
            download_url: fields.optional_str("download_url")?,
            play_url: fields.optional_str("play_url")?,
            status: fields.optional_str("status")?,
        })
    }
}

/// Cloud recording of one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub meeting_id: u64,
    pub topic: String,
    pub start_time: String,
    /// Minutes.
    #[serde(default)]
    pub duration: u64,
    pub share_url: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub files: Vec<RecordingFile>,
}

impl Decode for Recording {
    const ENTITY: &'static str = "Recording";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;
        let files = match fields.get("recording_files") {
            None => Vec::new(),
            Some(Value::Array(items)) => RecordingFile::decode_all(items.iter().filter(|f| f.is_object()))?,
            Some(_) => {
                return Err(DecodeError::new(
                    Self::ENTITY,
                    "recording_files",
                    "expected an array",
                ))
            }
        };

        Ok(Self {
            meeting_id: fields.required_u64("id")?,
            topic: fields.required_str("topic")?,
            start_time: fields.required_str("start_time")?,
            duration: fields.optional_u64("duration")?.unwrap_or(0),
            share_url: fields.optional_str("share_url")?,
            password: fields.optional_str("password")?,
            files,
        })
    }
}

/// Attendee of a past meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub name: Option<String>,
    pub email: Option<String>,
    pub join_time: Option<String>,
    pub leave_time: Option<String>,
    /// Seconds.
    pub duration: Option<u64>,
}

impl Decode for Participant {
    const ENTITY: &'static str = "Participant";

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of(Self::ENTITY, value)?;

        Ok(Self {
            name: fields.optional_str("name")?,
            email: fields.optional_str("user_email")?,
            join_time: fields.optional_str("join_time")?,
            leave_time: fields.optional_str("leave_time")?,
            duration: fields.optional_u64("duration")?,
        })
    }
}

/// AI-generated summary of a meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub meeting_id: u64,
    pub summary: Option<String>,
    pub next_steps: Option<Vec<String>>,
    pub topics: Option<Vec<String>>,
}

impl MeetingSummary {
    pub fn from_response(meeting_id: u64, value: &Value) -> Result<Self, DecodeError> {
        let fields = Fields::of("MeetingSummary", value)?;

        Ok(Self {
            meeting_id,
            summary: fields.optional_str("summary")?,
            next_steps: fields.typed("next_steps")?,
            topics: fields.typed("topics")?,
        })
    }
}

fn default_duration() -> u64 {
    45
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_waiting_room() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_partial_meeting() {
        let meeting = Meeting::decode(&json!({"id": 123, "join_url": "https://zoom/j/123"})).unwrap();

        assert_eq!(
            meeting,
            Meeting {
                id: 123,
                join_url: Some("https://zoom/j/123".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_decode_meeting_missing_id() {
        let err = Meeting::decode(&json!({"topic": "Demo"})).unwrap_err();
        assert_eq!(err.entity, "Meeting");
        assert_eq!(err.field, "id");
    }

    #[test]
    fn test_meeting_create_defaults() {
        let request = MeetingCreate::new("Demo", "2026-02-15T10:00:00");

        assert_eq!(request.duration, 45);
        assert_eq!(request.timezone, "America/New_York");
        assert!(request.waiting_room);
        assert_eq!(request.auto_recording, AutoRecording::Cloud);
    }

    #[test]
    fn test_meeting_create_from_partial_json() {
        let request: MeetingCreate = serde_json::from_value(json!({
            "topic": "Demo",
            "start_time": "2026-02-15T10:00:00",
            "auto_recording": "none"
        }))
        .unwrap();

        assert_eq!(request.duration, 45);
        assert_eq!(request.auto_recording, AutoRecording::None);
    }

    #[test]
    fn test_list_type_parsing() {
        assert_eq!("LIVE".parse::<MeetingListType>().unwrap(), MeetingListType::Live);
        assert!("past".parse::<MeetingListType>().is_err());
        assert_eq!(MeetingListType::default().to_string(), "upcoming");
    }

    #[test]
    fn test_decode_recording_with_files() {
        let recording = Recording::decode(&json!({
            "id": 555,
            "topic": "Retro",
            "start_time": "2026-01-10T16:00:00Z",
            "duration": 42,
            "share_url": "https://zoom/rec/share/abc",
            "recording_files": [
                {"id": "f1", "file_type": "MP4", "file_size": 10485760, "download_url": "https://zoom/dl/f1"},
                {"id": "f2", "file_type": "TRANSCRIPT"}
            ]
        }))
        .unwrap();

        assert_eq!(recording.meeting_id, 555);
        assert_eq!(recording.files.len(), 2);
        assert_eq!(recording.files[0].file_size, 10_485_760);
        assert_eq!(recording.files[1].file_size, 0);
    }

    #[test]
    fn test_decode_recording_file_missing_type() {
        let err = Recording::decode(&json!({
            "id": 1,
            "topic": "t",
            "start_time": "2026-01-10T16:00:00Z",
            "recording_files": [{"id": "f1"}]
        }))
        .unwrap_err();

        assert_eq!(err.entity, "RecordingFile");
        assert_eq!(err.field, "file_type");
    }

    #[test]
    fn test_decode_participant_renames_email() {
        let participant = Participant::decode(&json!({
            "name": "Bob",
            "user_email": "bob@example.com",
            "duration": 1800
        }))
        .unwrap();

        assert_eq!(participant.email.as_deref(), Some("bob@example.com"));
        assert_eq!(participant.duration, Some(1800));
    }

    #[test]
    fn test_summary_carries_meeting_id() {
        let summary = MeetingSummary::from_response(
            77,
            &json!({"summary": "Agreed on scope", "next_steps": ["Draft plan"]}),
        )
        .unwrap();

        assert_eq!(summary.meeting_id, 77);
        assert_eq!(summary.next_steps, Some(vec!["Draft plan".to_string()]));
        assert_eq!(summary.topics, None);
    }

    #[test]
    fn test_registrant_keeps_submitted_identity() {
        let registrant = Registrant::from_response(
            &json!({"registrant_id": "r_1", "join_url": "https://zoom/w/1"}),
            "carol@example.com",
            "Carol",
            "",
        )
        .unwrap();

        assert_eq!(registrant.registrant_id.as_deref(), Some("r_1"));
        assert_eq!(registrant.first_name, "Carol");
    }
}
