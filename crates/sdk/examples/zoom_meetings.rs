//! List upcoming Zoom meetings, then schedule and remove a test meeting.
//!
//! Requires `COMPOSIO_API_KEY` and `ZOOM_CONNECTED_ACCOUNT_ID`.
//!
//! Run with: cargo run --example zoom_meetings

use composio_sdk::{ComposioClient, ComposioResult, MeetingCreate, MeetingListType};

#[tokio::main]
async fn main() -> ComposioResult<()> {
    tracing_subscriber::fmt::init();

    let client = ComposioClient::from_env().await?;
    let zoom = client.zoom()?;

    println!("Upcoming meetings:");
    for meeting in zoom.list_meetings(MeetingListType::Upcoming).await? {
        println!(
            "  {}  {}  {}",
            meeting.id,
            meeting.start_time.as_deref().unwrap_or("-"),
            meeting.topic.as_deref().unwrap_or("(no topic)")
        );
    }

    let mut request = MeetingCreate::new("SDK smoke test", "2030-01-15T10:00:00");
    request.duration = 15;
    request.agenda = Some("Created by the zoom_meetings example".to_string());

    let meeting = zoom.create_meeting(&request).await?;
    println!("\nCreated meeting {}: {:?}", meeting.id, meeting.join_url);

    // Deletion depends on the action being enabled for the account.
    match zoom.delete_meeting(meeting.id).await {
        Ok(()) => println!("Deleted meeting {}", meeting.id),
        Err(e) => println!("Could not delete meeting {}: {}", meeting.id, e),
    }

    Ok(())
}
