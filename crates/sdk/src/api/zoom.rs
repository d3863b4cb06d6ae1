//! Zoom actions.

use super::{decode_list, decode_one, merge_fields, params};
use crate::error::ComposioResult;
use crate::transport::ActionExecutor;
use composio_core::zoom::{
    Meeting, MeetingCreate, MeetingListType, MeetingSummary, MeetingUpdate, Participant,
    Recording, Registrant,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Broker action ids used by [`ZoomClient`].
pub mod actions {
    pub const LIST_MEETINGS: &str = "ZOOM_LIST_MEETINGS";
    pub const CREATE_MEETING: &str = "ZOOM_CREATE_A_MEETING";
    pub const GET_MEETING: &str = "ZOOM_GET_A_MEETING";
    pub const UPDATE_MEETING: &str = "ZOOM_UPDATE_A_MEETING";
    pub const DELETE_MEETING: &str = "ZOOM_DELETE_A_MEETING";
    pub const ADD_REGISTRANT: &str = "ZOOM_ADD_A_MEETING_REGISTRANT";
    pub const LIST_RECORDINGS: &str = "ZOOM_LIST_ALL_RECORDINGS";
    pub const GET_RECORDING: &str = "ZOOM_GET_MEETING_RECORDINGS";
    pub const GET_PARTICIPANTS: &str = "ZOOM_GET_PAST_MEETING_PARTICIPANTS";
    pub const GET_SUMMARY: &str = "ZOOM_GET_A_MEETING_SUMMARY";
}

/// Zoom meeting type for scheduled meetings.
const SCHEDULED_MEETING: u64 = 2;

/// Zoom client bound to one connected account.
#[derive(Clone)]
pub struct ZoomClient {
    executor: Arc<dyn ActionExecutor>,
    connected_account_id: String,
}

impl ZoomClient {
    pub fn new(executor: Arc<dyn ActionExecutor>, connected_account_id: impl Into<String>) -> Self {
        Self {
            executor,
            connected_account_id: connected_account_id.into(),
        }
    }

    pub fn connected_account_id(&self) -> &str {
        &self.connected_account_id
    }

    async fn execute(&self, action: &str, params: Map<String, Value>) -> ComposioResult<Value> {
        self.executor
            .execute_action(action, &self.connected_account_id, Value::Object(params))
            .await
    }

    // Meetings

    pub async fn list_meetings(&self, list_type: MeetingListType) -> ComposioResult<Vec<Meeting>> {
        let mut p = params("userId", "me");
        p.insert("type".to_string(), list_type.as_str().into());
        let data = self.execute(actions::LIST_MEETINGS, p).await?;
        decode_list(&data, &["meetings"], false)
    }

    /// Schedule a meeting for the authenticated user.
    pub async fn create_meeting(&self, meeting: &MeetingCreate) -> ComposioResult<Meeting> {
        let mut p = params("userId", "me");
        p.insert("topic".to_string(), meeting.topic.clone().into());
        p.insert("type".to_string(), SCHEDULED_MEETING.into());
        p.insert("start_time".to_string(), meeting.start_time.clone().into());
        p.insert("duration".to_string(), meeting.duration.into());
        p.insert("timezone".to_string(), meeting.timezone.clone().into());
        p.insert(
            "settings".to_string(),
            json!({
                "host_video": true,
                "participant_video": true,
                "waiting_room": meeting.waiting_room,
                "auto_recording": meeting.auto_recording,
                "mute_upon_entry": true,
            }),
        );
        if let Some(agenda) = meeting.agenda.as_deref().filter(|a| !a.is_empty()) {
            p.insert("agenda".to_string(), agenda.into());
        }

        let data = self.execute(actions::CREATE_MEETING, p).await?;
        decode_one(&data)
    }

    pub async fn get_meeting(&self, meeting_id: u64) -> ComposioResult<Meeting> {
        let data = self
            .execute(actions::GET_MEETING, params("meetingId", meeting_id))
            .await?;
        decode_one(&data)
    }

    /// Change the fields present in `update`. Zoom answers with no body.
    pub async fn update_meeting(
        &self,
        meeting_id: u64,
        update: &MeetingUpdate,
    ) -> ComposioResult<()> {
        let mut p = params("meetingId", meeting_id);
        p.insert("type".to_string(), SCHEDULED_MEETING.into());
        merge_fields(actions::UPDATE_MEETING, &mut p, update)?;
        self.execute(actions::UPDATE_MEETING, p).await?;
        Ok(())
    }

    /// Delete a meeting. Any broker failure, including an unavailable
    /// action, is returned as an error.
    pub async fn delete_meeting(&self, meeting_id: u64) -> ComposioResult<()> {
        self.execute(actions::DELETE_MEETING, params("meetingId", meeting_id))
            .await?;
        Ok(())
    }

    pub async fn add_registrant(
        &self,
        meeting_id: u64,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> ComposioResult<Registrant> {
        let mut p = params("meetingId", meeting_id);
        p.insert("email".to_string(), email.into());
        p.insert("first_name".to_string(), first_name.into());
        p.insert("last_name".to_string(), last_name.into());

        let data = self.execute(actions::ADD_REGISTRANT, p).await?;
        Ok(Registrant::from_response(&data, email, first_name, last_name)?)
    }

    // Recordings

    /// Cloud recordings between `from` and `to` (`YYYY-MM-DD`).
    pub async fn list_recordings(
        &self,
        from: &str,
        to: Option<&str>,
    ) -> ComposioResult<Vec<Recording>> {
        let mut p = params("userId", "me");
        p.insert("from".to_string(), from.into());
        if let Some(to) = to.filter(|t| !t.is_empty()) {
            p.insert("to".to_string(), to.into());
        }
        let data = self.execute(actions::LIST_RECORDINGS, p).await?;
        decode_list(&data, &["meetings"], false)
    }

    pub async fn get_recording(&self, meeting_id: u64) -> ComposioResult<Recording> {
        let data = self
            .execute(actions::GET_RECORDING, params("meetingId", meeting_id))
            .await?;
        decode_one(&data)
    }

    // Post-meeting

    pub async fn get_participants(&self, meeting_id: u64) -> ComposioResult<Vec<Participant>> {
        let data = self
            .execute(actions::GET_PARTICIPANTS, params("meetingId", meeting_id))
            .await?;
        decode_list(&data, &["participants"], false)
    }

    pub async fn get_meeting_summary(&self, meeting_id: u64) -> ComposioResult<MeetingSummary> {
        let data = self
            .execute(actions::GET_SUMMARY, params("meetingId", meeting_id))
            .await?;
        Ok(MeetingSummary::from_response(meeting_id, &data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{action_path, executor_for, stub_action, stub_failure};
    use crate::error::ErrorKind;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ZoomClient {
        ZoomClient::new(executor_for(server), "ca-zoom")
    }

    #[tokio::test]
    async fn test_create_meeting() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(action_path(actions::CREATE_MEETING)))
            .and(body_json(json!({
                "connectedAccountId": "ca-zoom",
                "input": {
                    "userId": "me",
                    "topic": "Demo",
                    "type": 2,
                    "start_time": "2026-02-15T10:00:00",
                    "duration": 45,
                    "timezone": "America/New_York",
                    "settings": {
                        "host_video": true,
                        "participant_video": true,
                        "waiting_room": true,
                        "auto_recording": "cloud",
                        "mute_upon_entry": true
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {"id": 123, "join_url": "https://zoom.us/j/123"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let meeting = client_for(&server)
            .create_meeting(&MeetingCreate::new("Demo", "2026-02-15T10:00:00"))
            .await
            .unwrap();

        assert_eq!(
            meeting,
            Meeting {
                id: 123,
                join_url: Some("https://zoom.us/j/123".to_string()),
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_list_meetings_sends_type() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(action_path(actions::LIST_MEETINGS)))
            .and(body_partial_json(json!({"input": {"userId": "me", "type": "live"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {
                    "page_size": 30,
                    "meetings": [
                        {"id": 1, "topic": "Standup", "start_time": "2026-02-15T15:00:00Z", "duration": 15},
                        {"id": 2, "topic": "Retro"}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let meetings = client_for(&server)
            .list_meetings(MeetingListType::Live)
            .await
            .unwrap();

        assert_eq!(meetings.len(), 2);
        assert_eq!(meetings[0].duration, Some(15));
        assert_eq!(meetings[1].topic.as_deref(), Some("Retro"));
    }

    #[tokio::test]
    async fn test_update_meeting_sends_present_fields() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(action_path(actions::UPDATE_MEETING)))
            .and(body_json(json!({
                "connectedAccountId": "ca-zoom",
                "input": {"meetingId": 42, "type": 2, "duration": 30}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let update = MeetingUpdate {
            duration: Some(30),
            ..Default::default()
        };
        client_for(&server)
            .update_meeting(42, &update)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_meeting_surfaces_broker_error() {
        let server = MockServer::start().await;
        stub_failure(&server, actions::DELETE_MEETING, "Action not enabled").await;

        let err = client_for(&server).delete_meeting(42).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Action);
        assert!(err.to_string().contains("Action not enabled"));
        assert_eq!(err.action(), Some(actions::DELETE_MEETING));
    }

    #[tokio::test]
    async fn test_add_registrant_keeps_submitted_identity() {
        let server = MockServer::start().await;
        stub_action(
            &server,
            actions::ADD_REGISTRANT,
            json!({"registrant_id": "r-9", "join_url": "https://zoom.us/w/9"}),
        )
        .await;

        let registrant = client_for(&server)
            .add_registrant(42, "ada@example.com", "Ada", "")
            .await
            .unwrap();

        assert_eq!(registrant.registrant_id.as_deref(), Some("r-9"));
        assert_eq!(registrant.email, "ada@example.com");
        assert_eq!(registrant.last_name, "");
    }

    #[tokio::test]
    async fn test_list_recordings_omits_missing_to() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(action_path(actions::LIST_RECORDINGS)))
            .and(body_json(json!({
                "connectedAccountId": "ca-zoom",
                "input": {"userId": "me", "from": "2026-01-01"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "successful": true,
                "data": {"meetings": [
                    {"id": 7, "topic": "Planning", "start_time": "2026-01-05T09:00:00Z"}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let recordings = client_for(&server)
            .list_recordings("2026-01-01", None)
            .await
            .unwrap();

        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings[0].meeting_id, 7);
        assert!(recordings[0].files.is_empty());
    }

    #[tokio::test]
    async fn test_get_recording_missing_topic_is_decode_error() {
        let server = MockServer::start().await;
        stub_action(
            &server,
            actions::GET_RECORDING,
            json!({"id": 7, "start_time": "2026-01-05T09:00:00Z"}),
        )
        .await;

        let err = client_for(&server).get_recording(7).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("Recording"));
        assert!(err.to_string().contains("topic"));
    }

    #[tokio::test]
    async fn test_participants_and_summary() {
        let server = MockServer::start().await;
        stub_action(
            &server,
            actions::GET_PARTICIPANTS,
            json!({"participants": [
                {"name": "Ada", "user_email": "ada@example.com", "duration": 1800}
            ]}),
        )
        .await;
        stub_action(
            &server,
            actions::GET_SUMMARY,
            json!({"summary": "Shipped v2", "next_steps": ["Write changelog"]}),
        )
        .await;

        let client = client_for(&server);
        let participants = client.get_participants(42).await.unwrap();
        let summary = client.get_meeting_summary(42).await.unwrap();

        assert_eq!(participants[0].email.as_deref(), Some("ada@example.com"));
        assert_eq!(participants[0].duration, Some(1800));
        assert_eq!(summary.meeting_id, 42);
        assert_eq!(summary.summary.as_deref(), Some("Shipped v2"));
        assert_eq!(summary.next_steps, Some(vec!["Write changelog".to_string()]));
        assert!(summary.topics.is_none());
    }

    /// A Zoom operation and the action input it must send.
    struct Case {
        op: &'static str,
        action: &'static str,
        input: Value,
    }

    fn cases() -> Vec<Case> {
        let case = |op: &'static str, action: &'static str, input: Value| Case {
            op,
            action,
            input,
        };
        vec![
            case(
                "list_meetings",
                actions::LIST_MEETINGS,
                json!({"userId": "me", "type": "upcoming"}),
            ),
            case(
                "create_meeting",
                actions::CREATE_MEETING,
                json!({
                    "userId": "me",
                    "topic": "Demo",
                    "type": 2,
                    "start_time": "2026-02-15T10:00:00",
                    "duration": 45,
                    "timezone": "America/New_York",
                    "settings": {
                        "host_video": true,
                        "participant_video": true,
                        "waiting_room": true,
                        "auto_recording": "cloud",
                        "mute_upon_entry": true
                    }
                }),
            ),
            case("get_meeting", actions::GET_MEETING, json!({"meetingId": 42})),
            case(
                "update_meeting",
                actions::UPDATE_MEETING,
                json!({"meetingId": 42, "type": 2, "topic": "Renamed"}),
            ),
            case("delete_meeting", actions::DELETE_MEETING, json!({"meetingId": 42})),
            case(
                "add_registrant",
                actions::ADD_REGISTRANT,
                json!({
                    "meetingId": 42,
                    "email": "ada@example.com",
                    "first_name": "Ada",
                    "last_name": "Lovelace"
                }),
            ),
            case(
                "list_recordings",
                actions::LIST_RECORDINGS,
                json!({"userId": "me", "from": "2026-01-01", "to": "2026-01-31"}),
            ),
            case("get_recording", actions::GET_RECORDING, json!({"meetingId": 42})),
            case("get_participants", actions::GET_PARTICIPANTS, json!({"meetingId": 42})),
            case("get_meeting_summary", actions::GET_SUMMARY, json!({"meetingId": 42})),
        ]
    }

    async fn invoke(client: &ZoomClient, op: &str) -> ComposioResult<()> {
        match op {
            "list_meetings" => client
                .list_meetings(MeetingListType::Upcoming)
                .await
                .map(drop),
            "create_meeting" => client
                .create_meeting(&MeetingCreate::new("Demo", "2026-02-15T10:00:00"))
                .await
                .map(drop),
            "get_meeting" => client.get_meeting(42).await.map(drop),
            "update_meeting" => {
                let update = MeetingUpdate {
                    topic: Some("Renamed".to_string()),
                    ..Default::default()
                };
                client.update_meeting(42, &update).await
            }
            "delete_meeting" => client.delete_meeting(42).await,
            "add_registrant" => client
                .add_registrant(42, "ada@example.com", "Ada", "Lovelace")
                .await
                .map(drop),
            "list_recordings" => client
                .list_recordings("2026-01-01", Some("2026-01-31"))
                .await
                .map(drop),
            "get_recording" => client.get_recording(42).await.map(drop),
            "get_participants" => client.get_participants(42).await.map(drop),
            "get_meeting_summary" => client.get_meeting_summary(42).await.map(drop),
            other => panic!("no call for {other}"),
        }
    }

    #[tokio::test]
    async fn test_every_operation_sends_its_action_and_input() {
        let meeting = json!({"id": 42, "topic": "Demo", "start_time": "2026-02-15T15:00:00Z"});
        let data = json!({
            "id": 42,
            "topic": "Demo",
            "start_time": "2026-02-15T15:00:00Z",
            "meetings": [meeting],
            "participants": [{"name": "Ada"}]
        });

        for case in cases() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(action_path(case.action)))
                .and(body_json(json!({
                    "connectedAccountId": "ca-zoom",
                    "input": case.input
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "successful": true,
                    "data": data
                })))
                .expect(1)
                .mount(&server)
                .await;

            let result = invoke(&client_for(&server), case.op).await;
            assert!(result.is_ok(), "{}: {:?}", case.op, result);
        }
    }

    #[tokio::test]
    async fn test_every_operation_reports_action_failure() {
        let server = MockServer::start().await;
        let cases = cases();
        for case in &cases {
            stub_failure(&server, case.action, "X").await;
        }

        let client = client_for(&server);
        for case in &cases {
            let err = invoke(&client, case.op).await.unwrap_err();

            assert_eq!(err.kind(), ErrorKind::Action, "{}", case.op);
            assert_eq!(err.action(), Some(case.action), "{}", case.op);
            assert!(err.to_string().contains('X'), "{}", case.op);
        }
    }
}
