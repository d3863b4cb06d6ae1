use crate::output::{self, Printer};
use anyhow::{bail, Result};
use clap::Subcommand;
use composio_sdk::{AutoRecording, MeetingCreate, MeetingListType, MeetingUpdate, ZoomClient};
use serde_json::json;

#[derive(Subcommand, Debug)]
pub enum ZoomCommand {
    /// List meetings
    List {
        /// upcoming, scheduled, live or pending
        #[arg(long = "type", default_value = "upcoming")]
        list_type: MeetingListType,
    },
    /// Schedule a meeting
    Create {
        #[arg(long)]
        topic: String,
        /// Local start time, e.g. 2026-02-15T10:00:00
        #[arg(long)]
        datetime: String,
        /// Length in minutes
        #[arg(long, default_value_t = 60)]
        duration: u64,
        #[arg(long, default_value = "UTC")]
        timezone: String,
        #[arg(long)]
        agenda: Option<String>,
        /// Disable the waiting room
        #[arg(long)]
        no_waiting_room: bool,
        /// cloud, local or none
        #[arg(long, default_value = "cloud")]
        recording: AutoRecording,
    },
    /// Show a meeting
    Get { meeting_id: u64 },
    /// Change a meeting
    Update {
        meeting_id: u64,
        #[arg(long)]
        topic: Option<String>,
        #[arg(long)]
        datetime: Option<String>,
        #[arg(long)]
        duration: Option<u64>,
        #[arg(long)]
        agenda: Option<String>,
    },
    /// Delete a meeting
    Delete { meeting_id: u64 },
    /// Register a participant
    Register {
        meeting_id: u64,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// List cloud recordings in a date range
    Recordings {
        /// YYYY-MM-DD
        #[arg(long)]
        from: String,
        /// YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },
    /// Show the recording files of a meeting
    Recording { meeting_id: u64 },
    /// List participants of a past meeting
    Participants { meeting_id: u64 },
    /// Show the AI summary of a past meeting
    Summary { meeting_id: u64 },
}

pub async fn run(client: &ZoomClient, command: ZoomCommand, out: Printer) -> Result<()> {
    match command {
        ZoomCommand::List { list_type } => out.print_list(
            &client.list_meetings(list_type).await?,
            "No meetings found.",
            output::meeting,
        ),
        ZoomCommand::Create {
            topic,
            datetime,
            duration,
            timezone,
            agenda,
            no_waiting_room,
            recording,
        } => {
            let mut meeting = MeetingCreate::new(topic, datetime);
            meeting.duration = duration;
            meeting.timezone = timezone;
            meeting.agenda = agenda;
            meeting.waiting_room = !no_waiting_room;
            meeting.auto_recording = recording;
            out.print(&client.create_meeting(&meeting).await?, |m| {
                format!("Meeting created:\n\n{}", output::meeting(m))
            })
        }
        ZoomCommand::Get { meeting_id } => {
            out.print(&client.get_meeting(meeting_id).await?, output::meeting)
        }
        ZoomCommand::Update {
            meeting_id,
            topic,
            datetime,
            duration,
            agenda,
        } => {
            let update = MeetingUpdate {
                topic,
                start_time: datetime,
                duration,
                agenda,
            };
            if update.is_empty() {
                bail!("nothing to update; pass --topic, --datetime, --duration or --agenda");
            }
            client.update_meeting(meeting_id, &update).await?;
            out.print(&json!({"meeting_id": meeting_id, "updated": true}), |_| {
                format!("Meeting {} updated.", meeting_id)
            })
        }
        ZoomCommand::Delete { meeting_id } => {
            client.delete_meeting(meeting_id).await?;
            out.print(&json!({"meeting_id": meeting_id, "deleted": true}), |_| {
                format!("Meeting {} deleted.", meeting_id)
            })
        }
        ZoomCommand::Register {
            meeting_id,
            email,
            first_name,
            last_name,
        } => out.print(
            &client
                .add_registrant(meeting_id, &email, &first_name, &last_name)
                .await?,
            output::registrant,
        ),
        ZoomCommand::Recordings { from, to } => out.print_list(
            &client.list_recordings(&from, to.as_deref()).await?,
            "No recordings found.",
            output::recording,
        ),
        ZoomCommand::Recording { meeting_id } => {
            out.print(&client.get_recording(meeting_id).await?, output::recording)
        }
        ZoomCommand::Participants { meeting_id } => out.print_list(
            &client.get_participants(meeting_id).await?,
            "No participants found.",
            output::participant_line,
        ),
        ZoomCommand::Summary { meeting_id } => out.print(
            &client.get_meeting_summary(meeting_id).await?,
            output::summary,
        ),
    }
}
