//! The chat reducer.
//!
//! `reduce` is pure: it mutates the state it is given and reports which lists
//! changed so the caller can mirror them to storage.

use hexchat_shared::wire::{channel_id_of, normalize_channel, normalize_message, removed_channel_id};
use hexchat_shared::{
    default_channels, is_duplicate_message, remove_optimistic_for_channel,
    remove_optimistic_messages, unique_messages, Channel, Message, RequestStatus,
};

use super::actions::{AsyncPhase, ChatAction, FetchedChatData};
use super::state::ChatState;

/// Which snapshots a reduction touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Persist {
    pub channels: bool,
    pub messages: bool,
}

impl Persist {
    pub const NONE: Persist = Persist {
        channels: false,
        messages: false,
    };
    pub const CHANNELS: Persist = Persist {
        channels: true,
        messages: false,
    };
    pub const MESSAGES: Persist = Persist {
        channels: false,
        messages: true,
    };
    pub const BOTH: Persist = Persist {
        channels: true,
        messages: true,
    };

    pub fn any(&self) -> bool {
        self.channels || self.messages
    }
}

pub fn reduce(state: &mut ChatState, action: &ChatAction) -> Persist {
    match action {
        ChatAction::MessageReceived(payload) => match normalize_message(payload) {
            Some(message) => message_received(state, message),
            None => {
                crate::log_debug!("messageReceived: ignoring payload without channel: {}", payload);
                Persist::NONE
            }
        },

        ChatAction::SetCurrentChannelId(id) => {
            if state.has_channel(*id) {
                state.current_channel_id = Some(*id);
            } else {
                crate::log_warn!("setCurrentChannelId: no channel with id {}", id);
            }
            Persist::NONE
        }

        ChatAction::ChannelReceived(payload) => match normalize_channel(payload) {
            Some(channel) => {
                if state.has_channel(channel.id) {
                    Persist::NONE
                } else {
                    state.channels.push(channel);
                    Persist::CHANNELS
                }
            }
            None => Persist::NONE,
        },

        ChatAction::ChannelRenamed(payload) => match normalize_channel(payload) {
            Some(channel) => rename(state, channel.id, &channel.name),
            None => Persist::NONE,
        },

        ChatAction::ChannelRemoved(payload) => match removed_channel_id(payload) {
            Some(id) => {
                state.remove_channel_cascade(id);
                Persist::BOTH
            }
            None => Persist::NONE,
        },

        ChatAction::FetchChatData(phase) => match phase {
            AsyncPhase::Pending => {
                state.status = RequestStatus::Loading;
                Persist::NONE
            }
            AsyncPhase::Fulfilled(data) => fetch_fulfilled(state, data),
            AsyncPhase::Rejected(failure) => {
                state.status = RequestStatus::Failed;
                state.error = Some(failure.clone());
                state.channels = default_channels();
                state.current_channel_id = state
                    .current_channel_id
                    .filter(|id| state.has_channel(*id))
                    .or_else(|| state.first_channel_id());
                Persist::NONE
            }
        },

        ChatAction::SendMessage { arg, phase } => match phase {
            AsyncPhase::Pending => {
                state.sending = RequestStatus::Loading;
                if arg.body.is_empty() || arg.channel_id == 0 {
                    return Persist::NONE;
                }
                state
                    .messages
                    .push(Message::optimistic(&arg.body, arg.channel_id, &arg.username));
                Persist::MESSAGES
            }
            AsyncPhase::Fulfilled(_) => {
                state.sending = RequestStatus::Succeeded;
                remove_optimistic_for_channel(&mut state.messages, arg.channel_id);
                Persist::MESSAGES
            }
            AsyncPhase::Rejected(failure) => {
                state.sending = RequestStatus::Failed;
                state.error = Some(failure.clone());
                remove_optimistic_for_channel(&mut state.messages, arg.channel_id);
                Persist::MESSAGES
            }
        },

        ChatAction::CreateChannel { arg, phase } => match phase {
            AsyncPhase::Pending => Persist::NONE,
            AsyncPhase::Fulfilled(payload) => {
                let channel = normalize_channel(payload).or_else(|| {
                    channel_id_of(payload).map(|id| Channel::new(id, arg.name.clone(), true))
                });
                let Some(channel) = channel else {
                    crate::log_warn!("createChannel: response carries no channel id: {}", payload);
                    return Persist::NONE;
                };

                let id = channel.id;
                if !state.has_channel(id) {
                    state.channels.push(channel);
                }
                state.current_channel_id = Some(id);
                Persist::CHANNELS
            }
            AsyncPhase::Rejected(failure) => {
                state.error = Some(failure.clone());
                Persist::NONE
            }
        },

        ChatAction::RenameChannel { arg, phase } => match phase {
            AsyncPhase::Pending => Persist::NONE,
            AsyncPhase::Fulfilled(payload) => {
                let normalized = normalize_channel(payload);
                let id = normalized.as_ref().map_or(arg.id, |c| c.id);
                let name = normalized.as_ref().map_or(arg.name.as_str(), |c| c.name.as_str());
                if name.is_empty() {
                    return Persist::NONE;
                }
                rename(state, id, name)
            }
            AsyncPhase::Rejected(failure) => {
                state.error = Some(failure.clone());
                Persist::NONE
            }
        },

        ChatAction::RemoveChannel { arg, phase } => match phase {
            AsyncPhase::Pending => Persist::NONE,
            AsyncPhase::Fulfilled(_) => {
                state.remove_channel_cascade(arg.id);
                Persist::BOTH
            }
            AsyncPhase::Rejected(failure) => {
                state.error = Some(failure.clone());
                Persist::NONE
            }
        },
    }
}

fn message_received(state: &mut ChatState, message: Message) -> Persist {
    let before = state.messages.len();
    remove_optimistic_messages(
        &mut state.messages,
        message.channel_id,
        &message.body,
        &message.username,
    );
    let replaced = state.messages.len() != before;

    if is_duplicate_message(&state.messages, &message) {
        return if replaced { Persist::MESSAGES } else { Persist::NONE };
    }

    state.messages.push(message);
    Persist::MESSAGES
}

fn rename(state: &mut ChatState, id: i64, name: &str) -> Persist {
    match state.channels.iter_mut().find(|c| c.id == id) {
        Some(channel) => {
            channel.name = name.to_string();
            Persist::CHANNELS
        }
        None => Persist::NONE,
    }
}

fn fetch_fulfilled(state: &mut ChatState, data: &FetchedChatData) -> Persist {
    state.status = RequestStatus::Succeeded;

    let channels: Vec<Channel> = data.channels.iter().filter_map(normalize_channel).collect();
    state.channels = if channels.is_empty() {
        default_channels()
    } else {
        channels
    };

    // Messages must point at a channel of the installed list.
    let messages: Vec<Message> = data
        .messages
        .iter()
        .filter_map(normalize_message)
        .filter(|m| state.has_channel(m.channel_id))
        .collect();
    state.messages = unique_messages(messages);

    state.current_channel_id = data
        .current_channel_id
        .filter(|id| state.has_channel(*id))
        .or_else(|| state.first_channel_id());

    Persist::BOTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::actions::{CreateChannelArg, RemoveChannelArg, RenameChannelArg, SendMessageArg};
    use hexchat_shared::{ApiError, ErrorKind, MessageId, RequestFailure};
    use serde_json::{json, Value};

    fn send_arg(body: &str, channel_id: i64) -> SendMessageArg {
        SendMessageArg {
            body: body.into(),
            channel_id,
            username: "ann".into(),
        }
    }

    fn offline() -> RequestFailure {
        RequestFailure::from(&ApiError::Network("connection refused".into()))
    }

    fn fetched(channels: Value, messages: Value, current: Option<i64>) -> ChatAction {
        ChatAction::FetchChatData(AsyncPhase::Fulfilled(FetchedChatData {
            channels: serde_json::from_value(channels).unwrap(),
            messages: serde_json::from_value(messages).unwrap(),
            current_channel_id: current,
        }))
    }

    #[test]
    fn fetch_installs_server_lists() {
        let mut state = ChatState::default();
        reduce(&mut state, &ChatAction::FetchChatData(AsyncPhase::Pending));
        assert_eq!(state.status, RequestStatus::Loading);

        let persist = reduce(&mut state, &fetched(json!([{ "id": 5, "name": "dev" }]), json!([]), Some(5)));

        assert_eq!(persist, Persist::BOTH);
        assert_eq!(state.channels, vec![Channel::new(5, "dev", true)]);
        assert_eq!(state.current_channel_id, Some(5));
        assert_eq!(state.status, RequestStatus::Succeeded);
    }

    #[test]
    fn fetch_with_empty_channels_falls_back_to_defaults() {
        let mut state = ChatState::default();
        reduce(&mut state, &fetched(json!([]), json!([]), None));

        assert_eq!(state.channels, default_channels());
        assert_eq!(state.current_channel_id, Some(1));
    }

    #[test]
    fn fetch_ignores_unknown_current_channel() {
        let mut state = ChatState::default();
        reduce(&mut state, &fetched(json!([{ "id": 5, "name": "dev" }]), json!([]), Some(9)));
        assert_eq!(state.current_channel_id, Some(5));
    }

    #[test]
    fn fetch_dedups_messages_by_id() {
        let mut state = ChatState::default();
        let messages = json!([
            { "id": 1, "body": "first", "channelId": 1 },
            { "id": 1, "body": "again", "channelId": 1 },
            { "body": "no id", "channelId": 1 },
            { "body": "no id", "channelId": 1 },
            { "id": 2, "body": "dropped, no channel" },
        ]);
        reduce(&mut state, &fetched(json!([]), messages, None));

        let bodies: Vec<_> = state.messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["first", "no id", "no id"]);
    }

    #[test]
    fn fetch_drops_messages_of_unknown_channels() {
        let mut state = ChatState::default();
        let messages = json!([
            { "id": 1, "body": "kept", "channelId": 5 },
            { "id": 2, "body": "orphan", "channelId": 9 },
            { "id": 3, "body": "gone", "channelId": 1 },
        ]);
        reduce(&mut state, &fetched(json!([{ "id": 5, "name": "dev" }]), messages, Some(5)));

        let bodies: Vec<_> = state.messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["kept"]);
    }

    #[test]
    fn fetch_rejection_restores_defaults() {
        let mut state = ChatState::default();
        reduce(&mut state, &fetched(json!([{ "id": 5, "name": "dev" }]), json!([]), Some(5)));

        let persist = reduce(&mut state, &ChatAction::FetchChatData(AsyncPhase::Rejected(offline())));

        assert_eq!(persist, Persist::NONE);
        assert_eq!(state.status, RequestStatus::Failed);
        assert_eq!(state.channels, default_channels());
        assert_eq!(state.current_channel_id, Some(1));
        assert_eq!(state.error.as_ref().map(|e| e.kind), Some(ErrorKind::Network));
    }

    #[test]
    fn fetch_rejection_keeps_valid_selection() {
        let mut state = ChatState::default();
        reduce(&mut state, &ChatAction::SetCurrentChannelId(2));
        reduce(&mut state, &ChatAction::FetchChatData(AsyncPhase::Rejected(offline())));
        assert_eq!(state.current_channel_id, Some(2));
    }

    #[test]
    fn send_then_confirm_leaves_exactly_one_message() {
        let mut state = ChatState::default();
        let arg = send_arg("hi", 1);

        reduce(&mut state, &ChatAction::SendMessage { arg: arg.clone(), phase: AsyncPhase::Pending });
        assert_eq!(state.sending, RequestStatus::Loading);
        assert_eq!(state.optimistic_count(1), 1);
        assert_eq!(state.messages.len(), 1);

        reduce(
            &mut state,
            &ChatAction::SendMessage { arg, phase: AsyncPhase::Fulfilled(json!({ "id": 40 })) },
        );
        assert_eq!(state.sending, RequestStatus::Succeeded);
        assert_eq!(state.optimistic_count(1), 0);

        let push = json!({ "id": 40, "body": "hi", "channelId": 1, "username": "ann" });
        reduce(&mut state, &ChatAction::MessageReceived(push.clone()));
        reduce(&mut state, &ChatAction::MessageReceived(push));

        let hits: Vec<_> = state.messages.iter().filter(|m| m.body == "hi").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, Some(MessageId::Server(40)));
    }

    #[test]
    fn push_before_fulfilment_replaces_placeholder() {
        let mut state = ChatState::default();
        reduce(&mut state, &ChatAction::SendMessage { arg: send_arg("hi", 1), phase: AsyncPhase::Pending });

        let persist = reduce(
            &mut state,
            &ChatAction::MessageReceived(json!({ "id": 8, "body": "hi", "channelId": 1, "username": "ann" })),
        );

        assert_eq!(persist, Persist::MESSAGES);
        assert_eq!(state.messages.len(), 1);
        assert!(!state.messages[0].is_optimistic);
    }

    #[test]
    fn rejected_send_purges_placeholders() {
        let mut state = ChatState::default();
        let arg = send_arg("hi", 5);
        reduce(&mut state, &ChatAction::SendMessage { arg: arg.clone(), phase: AsyncPhase::Pending });
        reduce(&mut state, &ChatAction::SendMessage { arg, phase: AsyncPhase::Rejected(offline()) });

        assert_eq!(state.sending, RequestStatus::Failed);
        assert!(state.messages.iter().all(|m| m.body != "hi"));
        assert!(state.error.is_some());
    }

    #[test]
    fn empty_send_adds_no_placeholder() {
        let mut state = ChatState::default();
        let persist = reduce(&mut state, &ChatAction::SendMessage { arg: send_arg("", 1), phase: AsyncPhase::Pending });
        assert_eq!(persist, Persist::NONE);
        assert!(state.messages.is_empty());
        assert_eq!(state.sending, RequestStatus::Loading);
    }

    #[test]
    fn removing_current_channel_cascades_and_reselects() {
        let mut state = ChatState::default();
        reduce(&mut state, &ChatAction::ChannelReceived(json!({ "id": 3, "name": "dev" })));
        reduce(&mut state, &ChatAction::SetCurrentChannelId(3));
        reduce(&mut state, &ChatAction::MessageReceived(json!({ "id": 1, "body": "a", "channelId": 3 })));
        reduce(&mut state, &ChatAction::MessageReceived(json!({ "id": 2, "body": "b", "channelId": 1 })));

        let persist = reduce(&mut state, &ChatAction::ChannelRemoved(json!({ "id": 3 })));

        assert_eq!(persist, Persist::BOTH);
        assert!(!state.has_channel(3));
        assert!(state.messages.iter().all(|m| m.channel_id != 3));
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.current_channel_id, Some(1));
    }

    #[test]
    fn removing_last_channel_clears_selection() {
        let mut state = ChatState::default();
        reduce(&mut state, &fetched(json!([{ "id": 5, "name": "dev" }]), json!([]), Some(5)));
        reduce(
            &mut state,
            &ChatAction::RemoveChannel {
                arg: RemoveChannelArg { id: 5 },
                phase: AsyncPhase::Fulfilled(Value::Null),
            },
        );
        assert!(state.channels.is_empty());
        assert_eq!(state.current_channel_id, None);
    }

    #[test]
    fn channel_received_is_idempotent() {
        let mut state = ChatState::default();
        let payload = json!({ "data": { "id": 3, "attributes": { "name": "dev" } } });
        assert_eq!(reduce(&mut state, &ChatAction::ChannelReceived(payload.clone())), Persist::CHANNELS);
        assert_eq!(reduce(&mut state, &ChatAction::ChannelReceived(payload)), Persist::NONE);
        assert_eq!(state.channels.len(), 3);
    }

    #[test]
    fn rename_patches_name_only() {
        let mut state = ChatState::default();
        reduce(&mut state, &ChatAction::ChannelReceived(json!({ "id": 3, "name": "dev", "removable": true })));
        reduce(&mut state, &ChatAction::ChannelRenamed(json!({ "id": 3, "name": "ops", "removable": false })));
        assert_eq!(state.channel(3), Some(&Channel::new(3, "ops", true)));
    }

    #[test]
    fn rename_fulfilment_falls_back_to_request() {
        let mut state = ChatState::default();
        reduce(
            &mut state,
            &ChatAction::RenameChannel {
                arg: RenameChannelArg { id: 2, name: "offtopic".into() },
                phase: AsyncPhase::Fulfilled(Value::Null),
            },
        );
        assert_eq!(state.channel(2).map(|c| c.name.as_str()), Some("offtopic"));
    }

    #[test]
    fn create_selects_new_channel_and_falls_back_to_requested_name() {
        let mut state = ChatState::default();
        let persist = reduce(
            &mut state,
            &ChatAction::CreateChannel {
                arg: CreateChannelArg { name: "dev".into() },
                phase: AsyncPhase::Fulfilled(json!({ "data": { "id": 7 } })),
            },
        );

        assert_eq!(persist, Persist::CHANNELS);
        assert_eq!(state.channel(7), Some(&Channel::new(7, "dev", true)));
        assert_eq!(state.current_channel_id, Some(7));
    }

    #[test]
    fn create_with_existing_id_only_selects() {
        let mut state = ChatState::default();
        reduce(
            &mut state,
            &ChatAction::CreateChannel {
                arg: CreateChannelArg { name: "other".into() },
                phase: AsyncPhase::Fulfilled(json!({ "id": 2, "name": "renamed" })),
            },
        );
        assert_eq!(state.channels, default_channels());
        assert_eq!(state.current_channel_id, Some(2));
    }

    #[test]
    fn unknown_selection_is_ignored() {
        let mut state = ChatState::default();
        reduce(&mut state, &ChatAction::SetCurrentChannelId(42));
        assert_eq!(state.current_channel_id, None);
    }
}
