// Zoom tools

use super::args::{self, parse};
use super::registry::{
    json_schema_boolean, json_schema_enum, json_schema_integer, json_schema_object,
    json_schema_string, Tool, ToolTier,
};
use super::respond;
use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::{bail, Result};
use composio_sdk::{MeetingCreate, MeetingListType, MeetingUpdate, ZoomClient};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomOp {
    ListMeetings,
    CreateMeeting,
    GetMeeting,
    UpdateMeeting,
    DeleteMeeting,
    AddRegistrant,
    ListRecordings,
    GetRecording,
    GetParticipants,
    GetMeetingSummary,
}

impl ZoomOp {
    pub const ALL: [ZoomOp; 10] = [
        Self::ListMeetings,
        Self::CreateMeeting,
        Self::GetMeeting,
        Self::UpdateMeeting,
        Self::DeleteMeeting,
        Self::AddRegistrant,
        Self::ListRecordings,
        Self::GetRecording,
        Self::GetParticipants,
        Self::GetMeetingSummary,
    ];

    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::ListMeetings => "zoom_list_meetings",
            Self::CreateMeeting => "zoom_create_meeting",
            Self::GetMeeting => "zoom_get_meeting",
            Self::UpdateMeeting => "zoom_update_meeting",
            Self::DeleteMeeting => "zoom_delete_meeting",
            Self::AddRegistrant => "zoom_add_registrant",
            Self::ListRecordings => "zoom_list_recordings",
            Self::GetRecording => "zoom_get_recording",
            Self::GetParticipants => "zoom_get_participants",
            Self::GetMeetingSummary => "zoom_get_meeting_summary",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::ListMeetings => "List the user's meetings of one type.",
            Self::CreateMeeting => "Schedule a Zoom meeting.",
            Self::GetMeeting => "Get a meeting's details.",
            Self::UpdateMeeting => "Change a meeting's topic, start time, duration or agenda.",
            Self::DeleteMeeting => "Delete a meeting.",
            Self::AddRegistrant => "Register a participant for a meeting.",
            Self::ListRecordings => "List cloud recordings in a date range (YYYY-MM-DD).",
            Self::GetRecording => "Get the cloud recording files of a meeting.",
            Self::GetParticipants => "List the participants of a past meeting.",
            Self::GetMeetingSummary => "Get the AI summary of a past meeting.",
        }
    }

    fn input_schema(&self) -> Value {
        let meeting_id = || json_schema_integer("Meeting id");
        match self {
            Self::ListMeetings => json_schema_object(
                json!({
                    "type": json_schema_enum(
                        &["upcoming", "scheduled", "live", "pending"],
                        "Which meetings to list (default upcoming)",
                    ),
                }),
                vec![],
            ),
            Self::CreateMeeting => json_schema_object(
                json!({
                    "topic": json_schema_string("Meeting topic"),
                    "start_time": json_schema_string("Local start time, e.g. 2026-02-15T10:00:00"),
                    "duration": json_schema_integer("Length in minutes (default 45)"),
                    "timezone": json_schema_string("IANA timezone (default America/New_York)"),
                    "agenda": json_schema_string("Agenda text"),
                    "waiting_room": json_schema_boolean("Enable the waiting room (default true)"),
                    "auto_recording": json_schema_enum(&["cloud", "local", "none"], "Recording mode (default cloud)"),
                }),
                vec!["topic", "start_time"],
            ),
            Self::UpdateMeeting => json_schema_object(
                json!({
                    "meeting_id": meeting_id(),
                    "topic": json_schema_string("New topic"),
                    "start_time": json_schema_string("New local start time"),
                    "duration": json_schema_integer("New length in minutes"),
                    "agenda": json_schema_string("New agenda"),
                }),
                vec!["meeting_id"],
            ),
            Self::AddRegistrant => json_schema_object(
                json!({
                    "meeting_id": meeting_id(),
                    "email": json_schema_string("Registrant email"),
                    "first_name": json_schema_string("First name"),
                    "last_name": json_schema_string("Last name"),
                }),
                vec!["meeting_id", "email", "first_name"],
            ),
            Self::ListRecordings => json_schema_object(
                json!({
                    "from": json_schema_string("Start date, YYYY-MM-DD"),
                    "to": json_schema_string("End date, YYYY-MM-DD"),
                }),
                vec!["from"],
            ),
            Self::GetMeeting
            | Self::DeleteMeeting
            | Self::GetRecording
            | Self::GetParticipants
            | Self::GetMeetingSummary => {
                json_schema_object(json!({"meeting_id": meeting_id()}), vec!["meeting_id"])
            }
        }
    }

    fn tier(&self) -> ToolTier {
        match self {
            Self::CreateMeeting | Self::UpdateMeeting | Self::AddRegistrant => ToolTier::Write,
            Self::DeleteMeeting => ToolTier::Destructive,
            _ => ToolTier::Read,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListMeetingsArgs {
    #[serde(default, rename = "type", deserialize_with = "args::opt_parsed")]
    list_type: Option<MeetingListType>,
}

#[derive(Debug, Deserialize)]
struct MeetingArgs {
    #[serde(deserialize_with = "args::number")]
    meeting_id: u64,
}

#[derive(Debug, Deserialize)]
struct UpdateMeetingArgs {
    #[serde(deserialize_with = "args::number")]
    meeting_id: u64,
    #[serde(flatten)]
    update: MeetingUpdate,
}

#[derive(Debug, Deserialize)]
struct AddRegistrantArgs {
    #[serde(deserialize_with = "args::number")]
    meeting_id: u64,
    email: String,
    first_name: String,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListRecordingsArgs {
    from: String,
    to: Option<String>,
}

/// A single Zoom operation bound to a client.
pub struct ZoomTool {
    client: ZoomClient,
    op: ZoomOp,
}

impl ZoomTool {
    pub fn new(client: ZoomClient, op: ZoomOp) -> Self {
        Self { client, op }
    }

    pub fn all(client: &ZoomClient) -> Vec<Arc<dyn Tool>> {
        ZoomOp::ALL
            .iter()
            .map(|op| Arc::new(Self::new(client.clone(), *op)) as Arc<dyn Tool>)
            .collect()
    }

    async fn run(&self, arguments: Value) -> Result<CallToolResult> {
        let tool = self.op.tool_name();
        let client = &self.client;
        let result = match self.op {
            ZoomOp::ListMeetings => {
                let args: ListMeetingsArgs = parse(tool, arguments)?;
                respond(client.list_meetings(args.list_type.unwrap_or_default()).await)
            }
            ZoomOp::CreateMeeting => {
                let meeting: MeetingCreate = parse(tool, arguments)?;
                respond(client.create_meeting(&meeting).await)
            }
            ZoomOp::GetMeeting => {
                let args: MeetingArgs = parse(tool, arguments)?;
                respond(client.get_meeting(args.meeting_id).await)
            }
            ZoomOp::UpdateMeeting => {
                let args: UpdateMeetingArgs = parse(tool, arguments)?;
                if args.update.is_empty() {
                    bail!("{}: nothing to update", tool);
                }
                let meeting_id = args.meeting_id;
                respond(
                    client
                        .update_meeting(meeting_id, &args.update)
                        .await
                        .map(|()| json!({"meeting_id": meeting_id, "updated": true})),
                )
            }
            ZoomOp::DeleteMeeting => {
                let meeting_id = parse::<MeetingArgs>(tool, arguments)?.meeting_id;
                respond(
                    client
                        .delete_meeting(meeting_id)
                        .await
                        .map(|()| json!({"meeting_id": meeting_id, "deleted": true})),
                )
            }
            ZoomOp::AddRegistrant => {
                let args: AddRegistrantArgs = parse(tool, arguments)?;
                respond(
                    client
                        .add_registrant(
                            args.meeting_id,
                            &args.email,
                            &args.first_name,
                            args.last_name.as_deref().unwrap_or(""),
                        )
                        .await,
                )
            }
            ZoomOp::ListRecordings => {
                let args: ListRecordingsArgs = parse(tool, arguments)?;
                respond(client.list_recordings(&args.from, args.to.as_deref()).await)
            }
            ZoomOp::GetRecording => {
                let args: MeetingArgs = parse(tool, arguments)?;
                respond(client.get_recording(args.meeting_id).await)
            }
            ZoomOp::GetParticipants => {
                let args: MeetingArgs = parse(tool, arguments)?;
                respond(client.get_participants(args.meeting_id).await)
            }
            ZoomOp::GetMeetingSummary => {
                let args: MeetingArgs = parse(tool, arguments)?;
                respond(client.get_meeting_summary(args.meeting_id).await)
            }
        };
        Ok(result)
    }
}

#[async_trait::async_trait]
impl Tool for ZoomTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.op.tool_name().to_string(),
            description: self.op.description().to_string(),
            input_schema: self.op.input_schema(),
            annotations: None,
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        self.run(arguments).await
    }

    fn tier(&self) -> ToolTier {
        self.op.tier()
    }
}
