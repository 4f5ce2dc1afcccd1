//! Discord REST APIクライアント
//!
//! メッセージ送信・削除とチャンネル取得のみを実装する。

use super::{Channel, ChatPlatform, MessageContent, MessageHandle};
use async_trait::async_trait;
use downdetector_common::error::{BotError, BotResult, ChatError};
use downdetector_common::types::{ChannelId, MessageId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Discord APIリクエストのタイムアウト（秒）
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// ログイン中のBotユーザー
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    /// ユーザーID
    pub id: String,
    /// ユーザー名
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: MessageId,
    channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Discordクライアント
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    api_base: String,
    token: String,
}

impl DiscordClient {
    /// 新しいクライアントを作成
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> BotResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BotError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// トークンを検証してBotユーザーを取得する
    ///
    /// 成功した時点でチャンネル操作が可能になる。
    pub async fn login(&self) -> Result<CurrentUser, ChatError> {
        let response = self
            .authorized(self.client.get(self.url("/users/@me")))
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let user: CurrentUser = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        info!(user_id = %user.id, username = %user.username, "Logged in to Discord");
        Ok(user)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("Authorization", format!("Bot {}", self.token))
    }
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn send(
        &self,
        channel_id: ChannelId,
        content: &MessageContent,
    ) -> Result<MessageHandle, ChatError> {
        let url = self.url(&format!("/channels/{}/messages", channel_id));
        let response = self
            .authorized(self.client.post(&url))
            .json(&content.to_payload())
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let created: CreatedMessage = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;
        debug!(
            channel_id = %created.channel_id,
            message_id = %created.id,
            "Discord message created"
        );

        Ok(MessageHandle {
            channel_id: created.channel_id,
            message_id: created.id,
        })
    }

    async fn delete(&self, handle: &MessageHandle) -> Result<(), ChatError> {
        let url = self.url(&format!(
            "/channels/{}/messages/{}",
            handle.channel_id, handle.message_id
        ));
        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(http_error)?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ChatError::MessageNotFound),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn get_channel(&self, channel_id: ChannelId) -> Result<Option<Channel>, ChatError> {
        let url = self.url(&format!("/channels/{}", channel_id));
        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(http_error)?;

        match response.status() {
            status if status.is_success() => {
                let channel: Channel = response
                    .json()
                    .await
                    .map_err(|e| ChatError::Decode(e.to_string()))?;
                Ok(Some(channel))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(error_from_response(response).await),
        }
    }
}

fn http_error(err: reqwest::Error) -> ChatError {
    ChatError::Http(err.to_string())
}

async fn error_from_response(response: Response) -> ChatError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    if status == StatusCode::UNAUTHORIZED {
        ChatError::Unauthorized(message)
    } else {
        ChatError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "test-token";

    async fn client_for(server: &MockServer) -> DiscordClient {
        DiscordClient::new(server.uri(), TOKEN).unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_current_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .and(header("authorization", "Bot test-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "1", "username": "aur-bot"})),
            )
            .mount(&server)
            .await;

        let user = client_for(&server).await.login().await.unwrap();
        assert_eq!(user.username, "aur-bot");
    }

    #[tokio::test]
    async fn test_login_with_bad_token_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "401: Unauthorized", "code": 0})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).await.login().await.unwrap_err();
        assert!(matches!(err, ChatError::Unauthorized(m) if m == "401: Unauthorized"));
    }

    #[tokio::test]
    async fn test_send_posts_payload_and_returns_handle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/100/messages"))
            .and(body_json(json!({"content": "hello"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "555", "channel_id": "100"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let handle = client_for(&server)
            .await
            .send(ChannelId(100), &MessageContent::Text("hello".to_string()))
            .await
            .unwrap();

        assert_eq!(
            handle,
            MessageHandle {
                channel_id: ChannelId(100),
                message_id: MessageId(555),
            }
        );
    }

    #[tokio::test]
    async fn test_send_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels/100/messages"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "Missing Permissions", "code": 50013})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .send(ChannelId(100), &MessageContent::Text("x".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ChatError::Api { status: 403, ref message } if message == "Missing Permissions"
        ));
    }

    #[tokio::test]
    async fn test_delete_classifies_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/channels/100/messages/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/channels/100/messages/2"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Unknown Message", "code": 10008})),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/channels/100/messages/3"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let handle = |id| MessageHandle {
            channel_id: ChannelId(100),
            message_id: MessageId(id),
        };

        assert!(client.delete(&handle(1)).await.is_ok());
        assert!(matches!(
            client.delete(&handle(2)).await,
            Err(ChatError::MessageNotFound)
        ));
        assert!(matches!(
            client.delete(&handle(3)).await,
            Err(ChatError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_channel_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/channels/100"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "100", "name": "aur-status", "type": 0})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/channels/200"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let channel = client.get_channel(ChannelId(100)).await.unwrap().unwrap();
        assert_eq!(channel.name.as_deref(), Some("aur-status"));
        assert!(client.get_channel(ChannelId(200)).await.unwrap().is_none());
    }
}
