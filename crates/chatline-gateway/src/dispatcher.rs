use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use chatline_directory::Directory;
use chatline_types::events::{ClientEvent, ServerEvent};
use chatline_types::models::{ChannelDetail, ChannelSummary, UserId};

use crate::error::GatewayError;
use crate::fanout::Fanout;
use crate::registry::{ConnId, ConnectionRegistry};
use crate::store::{ChannelStore, LeaveOutcome};

/// Owns all live channel and connection state and processes gateway events.
///
/// Every inbound event runs to completion under a single lock, so events are
/// applied strictly in arrival order. Delivery only pushes onto unbounded
/// per-connection queues and never blocks the mutation that triggered it.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    directory: Arc<Directory>,
    core: Mutex<Core>,
}

#[derive(Default)]
struct Core {
    store: ChannelStore,
    registry: ConnectionRegistry,
}

impl Dispatcher {
    pub fn new(directory: Arc<Directory>) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                directory,
                core: Mutex::new(Core::default()),
            }),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.inner.directory
    }

    /// Open a connection. The receiver yields every event addressed to it,
    /// starting with `ready`.
    pub async fn connect(&self) -> (ConnId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut core = self.inner.core.lock().await;
        let conn_id = core.registry.register(tx);
        core.registry.send(
            conn_id,
            ServerEvent::Ready {
                connection_id: conn_id.to_string(),
            },
        );
        info!("Connection {} opened ({} open)", conn_id, core.registry.len());
        (conn_id, rx)
    }

    /// Tear down a connection. If it was its user's current binding, the user
    /// leaves every channel they were in.
    pub async fn disconnect(&self, conn_id: ConnId) {
        let mut core = self.inner.core.lock().await;
        let directory = &self.inner.directory;

        let Some(user_id) = core.registry.unregister(conn_id) else {
            info!("Connection {} closed", conn_id);
            return;
        };

        let channel_ids = core.store.channels_of(user_id);
        for channel_id in &channel_ids {
            core.leave(directory, user_id, channel_id);
        }
        if !channel_ids.is_empty() {
            core.fanout(directory).channels_updated();
        }
        info!(
            "Connection {} of user {} closed, left {} channels",
            conn_id,
            user_id,
            channel_ids.len()
        );
    }

    /// Parse and apply a raw text frame.
    pub async fn handle_text(&self, conn_id: ConnId, text: &str) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.handle(conn_id, event).await,
            Err(e) => {
                warn!(
                    "Connection {} sent a malformed event: {} -- raw: {}",
                    conn_id,
                    e,
                    text.chars().take(200).collect::<String>()
                );
                let core = self.inner.core.lock().await;
                core.registry
                    .send(conn_id, ServerEvent::Error("Malformed event".into()));
            }
        }
    }

    /// Apply one event. Failures are reported to the originating connection
    /// only, with no state change and no broadcast.
    pub async fn handle(&self, conn_id: ConnId, event: ClientEvent) {
        let mut core = self.inner.core.lock().await;
        let directory = &self.inner.directory;

        if !core.registry.is_open(conn_id) {
            debug!("Dropping event for closed connection {}", conn_id);
            return;
        }

        if let Err(e) = core.apply(directory, conn_id, event) {
            warn!("Connection {} event refused: {}", conn_id, e);
            core.registry.send(conn_id, ServerEvent::Error(e.to_string()));
        }
    }

    // -- Snapshots for the query interface --

    pub async fn channel_summaries(&self, filter_user_id: Option<UserId>) -> Vec<ChannelSummary> {
        let core = self.inner.core.lock().await;
        core.fanout(&self.inner.directory).summaries(filter_user_id)
    }

    pub async fn channel_detail(&self, channel_id: &str) -> Option<ChannelDetail> {
        let core = self.inner.core.lock().await;
        let channel = core.store.get_channel(channel_id).ok()?;
        Some(core.fanout(&self.inner.directory).detail(channel))
    }

    /// Transport rooms a connection currently belongs to.
    pub async fn rooms_of(&self, conn_id: ConnId) -> Vec<String> {
        self.inner.core.lock().await.registry.rooms_of(conn_id)
    }

    pub async fn connection_of(&self, user_id: UserId) -> Option<ConnId> {
        self.inner.core.lock().await.registry.connection_of(user_id)
    }
}

impl Core {
    fn fanout<'a>(&'a self, directory: &'a Directory) -> Fanout<'a> {
        Fanout::new(&self.store, &self.registry, directory)
    }

    /// The acting user: the bound identity once identified, otherwise
    /// whatever the payload claims.
    fn actor(&self, conn_id: ConnId, claimed: UserId) -> Result<UserId, GatewayError> {
        match self.registry.user_of(conn_id) {
            Some(bound) if bound != claimed => Err(GatewayError::Forbidden("Identity mismatch")),
            Some(bound) => Ok(bound),
            None => Ok(claimed),
        }
    }

    fn apply(&mut self, directory: &Directory, conn_id: ConnId, event: ClientEvent) -> Result<(), GatewayError> {
        match event {
            ClientEvent::Identify(user_id) => {
                if !directory.contains(user_id) {
                    return Err(GatewayError::NotFound("User not found"));
                }
                if let Some(old) = self.registry.bind(conn_id, user_id) {
                    info!("User {} moved from connection {} to {}", user_id, old, conn_id);
                } else {
                    info!("Connection {} identified as user {}", conn_id, user_id);
                }
                self.registry.send(conn_id, ServerEvent::Identified { user_id });
            }

            ClientEvent::CreateChannel { name, creator_id } => {
                let creator_id = self.actor(conn_id, creator_id)?;
                let channel_id = self.store.create_channel(&name, creator_id)?.id.clone();
                self.registry.join_room(conn_id, &channel_id);
                self.fanout(directory).channels_updated();
            }

            ClientEvent::JoinChannel { channel_id, user_id } => {
                let user_id = self.actor(conn_id, user_id)?;
                let membership = self.store.join_channel(&channel_id, user_id)?;
                self.registry.join_room(conn_id, &channel_id);

                let fanout = self.fanout(directory);
                if membership.changed {
                    debug!("User {} joined {}", user_id, channel_id);
                    fanout.participants_updated(&channel_id, &membership.participants);
                    fanout.channels_updated();
                }
                let messages = self.store.get_channel(&channel_id)?.messages.clone();
                fanout.to_connection(conn_id, ServerEvent::ChannelHistory { channel_id, messages });
            }

            ClientEvent::LeaveChannel { channel_id, user_id } => {
                let user_id = self.actor(conn_id, user_id)?;
                self.registry.leave_room(conn_id, &channel_id);
                if self.leave(directory, user_id, &channel_id) {
                    self.fanout(directory).channels_updated();
                }
            }

            ClientEvent::DeleteChannel { channel_id, user_id } => {
                let requester_id = self.actor(conn_id, user_id)?;
                let removed = self.store.delete_channel(&channel_id, requester_id)?;
                self.fanout(directory).to_users(
                    removed.participants.iter().copied(),
                    ServerEvent::ChannelDeleted {
                        channel_id: channel_id.clone(),
                    },
                );
                let cleared = self.registry.clear_room(&channel_id);
                debug!("Channel {} room cleared ({} connections)", channel_id, cleared);
                self.fanout(directory).channels_updated();
            }

            ClientEvent::Message { channel_id, message } => {
                let sender_id = self.actor(conn_id, message.sender_id)?;
                let stored = self.store.post_message(&channel_id, sender_id, &message.text)?;
                debug!("User {} posted {} to {}", sender_id, stored.id, channel_id);
                self.fanout(directory)
                    .to_channel(&channel_id, ServerEvent::Message(stored));
            }

            ClientEvent::KickUser {
                channel_id,
                target_id,
                requester_id,
            } => {
                let requester_id = self.actor(conn_id, requester_id)?;
                let membership = self.store.kick(&channel_id, target_id, requester_id)?;
                if !membership.changed {
                    return Ok(());
                }
                if let Some(target_conn) = self.registry.connection_of(target_id) {
                    self.registry.leave_room(target_conn, &channel_id);
                }

                let fanout = self.fanout(directory);
                fanout.participants_updated(&channel_id, &membership.participants);
                if !fanout.to_user(target_id, ServerEvent::Kicked { channel_id }) {
                    debug!("Kicked user {} has no live connection", target_id);
                }
                fanout.channels_updated();
            }
        }
        Ok(())
    }

    /// Remove a user from one channel and notify its remaining members.
    /// Returns whether anything changed. Does not refresh the directory.
    fn leave(&mut self, directory: &Directory, user_id: UserId, channel_id: &str) -> bool {
        match self.store.leave_channel(channel_id, user_id) {
            LeaveOutcome::Unchanged => false,
            LeaveOutcome::Left {
                participants,
                new_creator,
            } => {
                if let Some(conn) = self.registry.connection_of(user_id) {
                    self.registry.leave_room(conn, channel_id);
                }
                let fanout = self.fanout(directory);
                if let Some(creator_id) = new_creator {
                    fanout.to_channel(
                        channel_id,
                        ServerEvent::CreatorChanged {
                            channel_id: channel_id.to_string(),
                            creator_id,
                        },
                    );
                }
                fanout.participants_updated(channel_id, &participants);
                true
            }
            LeaveOutcome::Dissolved(channel) => {
                // The departing creator is no longer a participant but still hears about it
                let recipients = channel.participants.iter().copied().chain([user_id]);
                self.fanout(directory).to_users(
                    recipients,
                    ServerEvent::ChannelDeleted {
                        channel_id: channel.id.clone(),
                    },
                );
                let cleared = self.registry.clear_room(&channel.id);
                debug!("Channel {} room cleared ({} connections)", channel.id, cleared);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chatline_types::events::MessageDraft;

    use super::*;

    const ROSTER: &str = r#"[
        {"id": 1, "name": "Ann", "username": "ann", "avatar": ""},
        {"id": 2, "name": "Bob", "username": "bob", "avatar": ""},
        {"id": 3, "name": "Cid", "username": "cid", "avatar": ""}
    ]"#;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(Directory::from_json(ROSTER).unwrap()))
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    async fn identified(d: &Dispatcher, user_id: UserId) -> (ConnId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (conn, mut rx) = d.connect().await;
        d.handle(conn, ClientEvent::Identify(user_id)).await;
        drain(&mut rx);
        (conn, rx)
    }

    async fn create(d: &Dispatcher, conn: ConnId, name: &str, creator_id: UserId) -> String {
        d.handle(conn, ClientEvent::CreateChannel { name: name.into(), creator_id })
            .await;
        d.channel_summaries(None).await.last().unwrap().id.clone()
    }

    fn errors(events: &[ServerEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                ServerEvent::Error(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn connect_sends_ready_and_identify_acknowledges() {
        let d = dispatcher();
        let (conn, mut rx) = d.connect().await;
        d.handle(conn, ClientEvent::Identify(2)).await;

        let events = drain(&mut rx);
        assert!(matches!(&events[0], ServerEvent::Ready { connection_id } if *connection_id == conn.to_string()));
        assert_eq!(events[1], ServerEvent::Identified { user_id: 2 });
        assert_eq!(d.connection_of(2).await, Some(conn));
    }

    #[tokio::test]
    async fn identify_unknown_user_is_refused() {
        let d = dispatcher();
        let (conn, mut rx) = d.connect().await;
        drain(&mut rx);
        d.handle(conn, ClientEvent::Identify(99)).await;
        assert_eq!(errors(&drain(&mut rx)), vec!["User not found"]);
        assert_eq!(d.connection_of(99).await, None);
    }

    #[tokio::test]
    async fn malformed_frames_get_an_error_reply() {
        let d = dispatcher();
        let (conn, mut rx) = d.connect().await;
        drain(&mut rx);
        d.handle_text(conn, "not json").await;
        d.handle_text(conn, r#"{"event":"join-channel","data":{"channelId":"x"}}"#)
            .await;
        d.handle_text(conn, r#"{"event":"teleport","data":{}}"#).await;
        assert_eq!(errors(&drain(&mut rx)), vec!["Malformed event"; 3]);
    }

    #[tokio::test]
    async fn blank_name_is_refused_without_broadcast() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (_b, mut rb) = identified(&d, 2).await;

        d.handle(a, ClientEvent::CreateChannel { name: "  ".into(), creator_id: 1 })
            .await;
        assert_eq!(errors(&drain(&mut ra)), vec!["Channel name must not be empty"]);
        assert!(drain(&mut rb).is_empty());
        assert!(d.channel_summaries(None).await.is_empty());
    }

    #[tokio::test]
    async fn create_joins_room_and_refreshes_everyone() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (_anon, mut rn) = d.connect().await;
        drain(&mut rn);

        let id = create(&d, a, "Team", 1).await;
        assert_eq!(d.rooms_of(a).await, vec![id.clone()]);

        for events in [drain(&mut ra), drain(&mut rn)] {
            match &events[..] {
                [ServerEvent::ChannelsUpdated(list)] => {
                    assert_eq!(list[0].name, "Team");
                    assert_eq!(list[0].creator_id, 1);
                }
                other => panic!("unexpected events {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn join_sends_history_to_joiner_only() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let id = create(&d, a, "Team", 1).await;
        d.handle(
            a,
            ClientEvent::Message {
                channel_id: id.clone(),
                message: MessageDraft { sender_id: 1, text: "first".into() },
            },
        )
        .await;
        drain(&mut ra);
        drain(&mut rb);

        d.handle(b, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
            .await;

        let a_events = drain(&mut ra);
        assert!(a_events.iter().all(|e| !matches!(e, ServerEvent::ChannelHistory { .. })));
        let b_events = drain(&mut rb);
        match b_events.last() {
            Some(ServerEvent::ChannelHistory { channel_id, messages }) => {
                assert_eq!(channel_id, &id);
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].text, "first");
            }
            other => panic!("expected history, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn repeated_join_emits_no_participant_update() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let id = create(&d, a, "Team", 1).await;
        d.handle(b, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        drain(&mut ra);
        drain(&mut rb);

        d.handle(b, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        assert!(drain(&mut ra).is_empty());
        assert!(matches!(&drain(&mut rb)[..], [ServerEvent::ChannelHistory { .. }]));
    }

    #[tokio::test]
    async fn join_missing_channel_errors_to_sender_only() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (_b, mut rb) = identified(&d, 2).await;
        d.handle(a, ClientEvent::JoinChannel { channel_id: "chan_nope".into(), user_id: 1 })
            .await;
        assert_eq!(errors(&drain(&mut ra)), vec!["Channel not found"]);
        assert!(drain(&mut rb).is_empty());
        assert!(d.rooms_of(a).await.is_empty());
    }

    #[tokio::test]
    async fn payload_identity_must_match_binding() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let id = create(&d, a, "Team", 1).await;
        drain(&mut ra);
        drain(&mut rb);

        // Connection of user 2 claiming to be the creator
        d.handle(b, ClientEvent::DeleteChannel { channel_id: id.clone(), user_id: 1 })
            .await;
        assert_eq!(errors(&drain(&mut rb)), vec!["Identity mismatch"]);
        assert!(drain(&mut ra).is_empty());
        assert!(d.channel_detail(&id).await.is_some());
    }

    #[tokio::test]
    async fn unidentified_connection_acts_as_claimed_user() {
        let d = dispatcher();
        let (anon, mut rn) = d.connect().await;
        drain(&mut rn);
        let id = create(&d, anon, "Lobby", 3).await;
        assert_eq!(d.channel_detail(&id).await.unwrap().creator_id, 3);
    }

    #[tokio::test]
    async fn server_assigns_message_fields() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let id = create(&d, a, "Team", 1).await;
        drain(&mut ra);

        let before = chrono::Utc::now().timestamp_millis();
        d.handle_text(
            a,
            &format!(
                r#"{{"event":"message","data":{{"channelId":"{}","message":
                   {{"id":"client-id","senderId":1,"text":"hi","timestamp":5}}}}}}"#,
                id
            ),
        )
        .await;

        match &drain(&mut ra)[..] {
            [ServerEvent::Message(msg)] => {
                assert_ne!(msg.id, "client-id");
                assert!(msg.timestamp >= before);
                assert_eq!(msg.sender_id, 1);
                assert_eq!(msg.channel_id, id);
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn messages_reach_only_current_members() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let (c, mut rc) = identified(&d, 3).await;
        let id = create(&d, a, "Team", 1).await;
        d.handle(b, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        d.handle(b, ClientEvent::LeaveChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        drain(&mut ra);
        drain(&mut rb);

        let post = |text: &str| ClientEvent::Message {
            channel_id: id.clone(),
            message: MessageDraft { sender_id: 1, text: text.into() },
        };
        d.handle(a, post("after leave")).await;
        assert!(matches!(&drain(&mut ra)[..], [ServerEvent::Message(_)]));
        assert!(drain(&mut rb).is_empty());

        d.handle(c, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 3 })
            .await;
        let late: Vec<_> = drain(&mut rc)
            .into_iter()
            .filter(|e| matches!(e, ServerEvent::Message(_)))
            .collect();
        assert!(late.is_empty());
    }

    #[tokio::test]
    async fn message_to_missing_channel_errors() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        d.handle(
            a,
            ClientEvent::Message {
                channel_id: "chan_gone".into(),
                message: MessageDraft { sender_id: 1, text: "hello".into() },
            },
        )
        .await;
        assert_eq!(errors(&drain(&mut ra)), vec!["Channel not found"]);
    }

    #[tokio::test]
    async fn creator_leave_transfers_and_announces() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let id = create(&d, a, "Team", 1).await;
        d.handle(b, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        drain(&mut ra);
        drain(&mut rb);

        d.handle(a, ClientEvent::LeaveChannel { channel_id: id.clone(), user_id: 1 })
            .await;
        assert!(d.rooms_of(a).await.is_empty());

        let events = drain(&mut rb);
        assert_eq!(
            events[0],
            ServerEvent::CreatorChanged { channel_id: id.clone(), creator_id: 2 }
        );
        assert!(matches!(&events[1], ServerEvent::ParticipantsUpdated { participants, .. }
            if participants.iter().map(|u| u.id).collect::<Vec<_>>() == vec![2]));
        assert!(matches!(&events[2], ServerEvent::ChannelsUpdated(_)));
        assert_eq!(d.channel_detail(&id).await.unwrap().creator_id, 2);
    }

    #[tokio::test]
    async fn last_member_leaving_dissolves_channel() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let id = create(&d, a, "Solo", 1).await;
        drain(&mut ra);

        d.handle(a, ClientEvent::LeaveChannel { channel_id: id.clone(), user_id: 1 })
            .await;
        assert!(d.channel_detail(&id).await.is_none());
        assert!(d.rooms_of(a).await.is_empty());

        let events = drain(&mut ra);
        assert_eq!(events[0], ServerEvent::ChannelDeleted { channel_id: id.clone() });
        assert!(matches!(&events[1], ServerEvent::ChannelsUpdated(list) if list.is_empty()));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn absent_leave_and_kick_broadcast_nothing() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let id = create(&d, a, "Team", 1).await;
        drain(&mut ra);
        drain(&mut rb);
        let before = d.channel_detail(&id).await.unwrap();

        // User 2 never joined
        d.handle(b, ClientEvent::LeaveChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        d.handle(
            a,
            ClientEvent::KickUser { channel_id: id.clone(), target_id: 3, requester_id: 1 },
        )
        .await;

        assert!(drain(&mut ra).is_empty());
        assert!(drain(&mut rb).is_empty());
        assert_eq!(d.channel_detail(&id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn disconnect_leaves_every_channel_once() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (b, mut rb) = identified(&d, 2).await;
        let first = create(&d, a, "one", 1).await;
        let second = create(&d, a, "two", 1).await;
        let _third = create(&d, a, "three", 1).await;
        for id in [&first, &second] {
            d.handle(b, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
                .await;
        }
        drain(&mut ra);
        drain(&mut rb);

        d.disconnect(b).await;

        let events = drain(&mut ra);
        let updated: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ServerEvent::ParticipantsUpdated { channel_id, participants } => {
                    Some((channel_id.clone(), participants.len()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(updated, vec![(first, 1), (second, 1)]);
        assert!(d.channel_summaries(Some(2)).await.is_empty());
        assert_eq!(d.connection_of(2).await, None);
    }

    #[tokio::test]
    async fn superseded_connection_disconnect_keeps_memberships() {
        let d = dispatcher();
        let (a, mut ra) = identified(&d, 1).await;
        let (old, _ro) = identified(&d, 2).await;
        let id = create(&d, a, "Team", 1).await;
        d.handle(old, ClientEvent::JoinChannel { channel_id: id.clone(), user_id: 2 })
            .await;
        let (new, _rn) = identified(&d, 2).await;
        drain(&mut ra);

        d.disconnect(old).await;
        assert_eq!(d.connection_of(2).await, Some(new));
        let participants: Vec<_> = d
            .channel_detail(&id)
            .await
            .unwrap()
            .participants
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(participants, vec![1, 2]);
        assert!(drain(&mut ra).is_empty());
    }

    #[tokio::test]
    async fn events_after_disconnect_are_dropped() {
        let d = dispatcher();
        let (a, _ra) = identified(&d, 1).await;
        d.disconnect(a).await;
        d.handle(a, ClientEvent::CreateChannel { name: "ghost".into(), creator_id: 1 })
            .await;
        assert!(d.channel_summaries(None).await.is_empty());
    }
}
