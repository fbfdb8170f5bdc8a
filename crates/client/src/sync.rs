//! Remote chat operations.
//!
//! Each operation dispatches `Pending` before its request and `Fulfilled` or
//! `Rejected` once the request settles, so the store reflects in-flight work
//! (placeholders, loading flags) immediately. Nothing is retried.

use std::sync::Arc;

use futures_util::future::try_join;
use hexchat_shared::wire::{extract_collection, extract_current_channel_id};
use hexchat_shared::{ApiError, PassThrough, ProfanityFilter, RequestFailure};
use serde_json::Value;

use crate::api_client::ApiClient;
use crate::session::stored_username;
use crate::stores::{
    AsyncPhase, ChatAction, ChatStore, CreateChannelArg, FetchedChatData, RemoveChannelArg,
    RenameChannelArg, SendMessageArg,
};

/// Drives REST calls and feeds their outcomes into a [`ChatStore`].
#[derive(Clone)]
pub struct ChatSync {
    api: ApiClient,
    store: ChatStore,
    filter: Arc<dyn ProfanityFilter>,
}

impl ChatSync {
    /// `api` should already carry the session token.
    pub fn new(api: ApiClient, store: ChatStore) -> Self {
        Self {
            api,
            store,
            filter: Arc::new(PassThrough),
        }
    }

    pub fn with_filter(mut self, filter: Arc<dyn ProfanityFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Load channels and messages together.
    pub async fn fetch_chat_data(&self) -> Result<FetchedChatData, RequestFailure> {
        self.store.dispatch(ChatAction::FetchChatData(AsyncPhase::Pending));

        match try_join(self.api.fetch_channels(), self.api.fetch_messages()).await {
            Ok((channels_body, messages_body)) => {
                let data = FetchedChatData {
                    channels: extract_collection(&channels_body, "channels"),
                    messages: extract_collection(&messages_body, "messages"),
                    current_channel_id: extract_current_channel_id(&channels_body),
                };
                crate::log_info!(
                    "fetched {} channels and {} messages",
                    data.channels.len(),
                    data.messages.len()
                );
                self.store
                    .dispatch(ChatAction::FetchChatData(AsyncPhase::Fulfilled(data.clone())));
                Ok(data)
            }
            Err(e) => {
                let failure = failed("fetchChatData", &e);
                self.store
                    .dispatch(ChatAction::FetchChatData(AsyncPhase::Rejected(failure.clone())));
                Err(failure)
            }
        }
    }

    /// Post a message, showing it as an optimistic placeholder until it settles.
    ///
    /// The body passes through the profanity filter first; the author is the
    /// stored username.
    pub async fn send_message(&self, body: &str, channel_id: i64) -> Result<Value, RequestFailure> {
        let arg = SendMessageArg {
            body: self.filter.clean(body),
            channel_id,
            username: stored_username(self.store.storage().as_ref()),
        };
        self.store.dispatch(ChatAction::SendMessage {
            arg: arg.clone(),
            phase: AsyncPhase::Pending,
        });

        let result = self
            .api
            .post_message(&arg.body, arg.channel_id, Some(arg.username.clone()))
            .await;
        match result {
            Ok(resp) => {
                self.store.dispatch(ChatAction::SendMessage {
                    arg,
                    phase: AsyncPhase::Fulfilled(resp.clone()),
                });
                Ok(resp)
            }
            Err(e) => {
                let failure = failed("sendMessage", &e);
                self.store.dispatch(ChatAction::SendMessage {
                    arg,
                    phase: AsyncPhase::Rejected(failure.clone()),
                });
                Err(failure)
            }
        }
    }

    pub async fn create_channel(&self, name: &str) -> Result<Value, RequestFailure> {
        let arg = CreateChannelArg {
            name: self.filter.clean(name),
        };
        self.store.dispatch(ChatAction::CreateChannel {
            arg: arg.clone(),
            phase: AsyncPhase::Pending,
        });

        match self.api.create_channel(&arg.name).await {
            Ok(resp) => {
                self.store.dispatch(ChatAction::CreateChannel {
                    arg,
                    phase: AsyncPhase::Fulfilled(resp.clone()),
                });
                Ok(resp)
            }
            Err(e) => {
                let failure = failed("createChannel", &e);
                self.store.dispatch(ChatAction::CreateChannel {
                    arg,
                    phase: AsyncPhase::Rejected(failure.clone()),
                });
                Err(failure)
            }
        }
    }

    pub async fn rename_channel(&self, id: i64, name: &str) -> Result<Value, RequestFailure> {
        let arg = RenameChannelArg {
            id,
            name: self.filter.clean(name),
        };
        self.store.dispatch(ChatAction::RenameChannel {
            arg: arg.clone(),
            phase: AsyncPhase::Pending,
        });

        match self.api.rename_channel(arg.id, &arg.name).await {
            Ok(resp) => {
                self.store.dispatch(ChatAction::RenameChannel {
                    arg,
                    phase: AsyncPhase::Fulfilled(resp.clone()),
                });
                Ok(resp)
            }
            Err(e) => {
                let failure = failed("renameChannel", &e);
                self.store.dispatch(ChatAction::RenameChannel {
                    arg,
                    phase: AsyncPhase::Rejected(failure.clone()),
                });
                Err(failure)
            }
        }
    }

    pub async fn remove_channel(&self, id: i64) -> Result<Value, RequestFailure> {
        let arg = RemoveChannelArg { id };
        self.store.dispatch(ChatAction::RemoveChannel {
            arg: arg.clone(),
            phase: AsyncPhase::Pending,
        });

        match self.api.remove_channel(id).await {
            Ok(resp) => {
                self.store.dispatch(ChatAction::RemoveChannel {
                    arg,
                    phase: AsyncPhase::Fulfilled(resp.clone()),
                });
                Ok(resp)
            }
            Err(e) => {
                let failure = failed("removeChannel", &e);
                self.store.dispatch(ChatAction::RemoveChannel {
                    arg,
                    phase: AsyncPhase::Rejected(failure.clone()),
                });
                Err(failure)
            }
        }
    }

    /// Select a channel. Unknown ids are ignored by the store.
    pub fn select_channel(&self, id: i64) {
        self.store.dispatch(ChatAction::SetCurrentChannelId(id));
    }
}

fn failed(operation: &str, err: &ApiError) -> RequestFailure {
    crate::log_error!("{} failed: {}", operation, err);
    RequestFailure::from(err)
}
