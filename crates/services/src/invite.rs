use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use replog_core::model::{EmailAddress, FriendRequestId};
use reqwest::Client;
use serde::Serialize;

use crate::error::InviteError;

const DEFAULT_APP_URL: &str = "https://replogs.app";

/// Where invites go and which link they carry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InviteConfig {
    /// HTTP endpoint accepting invite payloads. Invites are only logged when unset.
    pub endpoint: Option<String>,
    /// Base URL of the web app, used for join links.
    pub app_url: String,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            app_url: DEFAULT_APP_URL.to_owned(),
        }
    }
}

impl InviteConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let endpoint = env::var("REPLOG_INVITE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let app_url = env::var("REPLOG_APP_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_URL.to_owned());
        Self { endpoint, app_url }
    }
}

/// Invitation for someone who does not have an account yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InviteEmail {
    pub to_email: EmailAddress,
    pub from_user: String,
    pub request_id: FriendRequestId,
}

impl InviteEmail {
    #[must_use]
    pub fn subject(&self) -> String {
        format!("{} invited you to join Rep Logs!", self.from_user)
    }

    #[must_use]
    pub fn join_link(&self, app_url: &str) -> String {
        format!(
            "{}/auth?invite={}",
            app_url.trim_end_matches('/'),
            self.request_id
        )
    }

    #[must_use]
    pub fn body(&self, app_url: &str) -> String {
        format!(
            "Hi there!\n\n\
             {from} has invited you to join Rep Logs, the workout tracker for serious lifters.\n\n\
             Join Rep Logs to:\n\
             - Track your workouts with lightning speed\n\
             - Share progress with workout buddies\n\
             - Stay motivated together\n\n\
             Click here to join: {link}\n\n\
             - The Rep Logs Team\n",
            from = self.from_user,
            link = self.join_link(app_url),
        )
    }
}

/// Delivers invite emails.
#[async_trait]
pub trait InviteSender: Send + Sync {
    /// # Errors
    ///
    /// Returns `InviteError` if delivery fails.
    async fn send_invite(&self, invite: &InviteEmail) -> Result<(), InviteError>;
}

/// Writes invites to the log instead of sending them.
#[derive(Clone, Debug)]
pub struct LogInviteSender {
    app_url: String,
}

impl LogInviteSender {
    #[must_use]
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
        }
    }
}

#[async_trait]
impl InviteSender for LogInviteSender {
    async fn send_invite(&self, invite: &InviteEmail) -> Result<(), InviteError> {
        tracing::info!(
            to = %invite.to_email,
            subject = %invite.subject(),
            body = %invite.body(&self.app_url),
            "invite email (not sent)"
        );
        Ok(())
    }
}

/// Posts invite payloads as JSON to an external endpoint.
#[derive(Clone)]
pub struct HttpInviteSender {
    client: Client,
    endpoint: String,
}

impl HttpInviteSender {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl InviteSender for HttpInviteSender {
    async fn send_invite(&self, invite: &InviteEmail) -> Result<(), InviteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(invite)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(InviteError::HttpStatus(response.status()));
        }
        tracing::debug!(request_id = %invite.request_id, "invite delivered");
        Ok(())
    }
}

/// HTTP delivery when an endpoint is configured, logging otherwise.
#[must_use]
pub fn sender_from_config(config: &InviteConfig) -> Arc<dyn InviteSender> {
    match &config.endpoint {
        Some(endpoint) => Arc::new(HttpInviteSender::new(endpoint.clone())),
        None => Arc::new(LogInviteSender::new(config.app_url.clone())),
    }
}
