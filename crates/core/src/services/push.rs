//! Web Push subscriptions and delivery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finboard_common::{AppError, AppResult, IdGenerator, config::PushConfig};
use finboard_db::{entities::push_subscription, repositories::PushSubscriptionRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushMessageBuilder,
};

/// Seconds a push service may hold an undelivered message.
const PUSH_TTL_SECS: u32 = 60 * 60 * 24;

/// Payload delivered to the browser's service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub url: String,
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// The push service no longer knows the endpoint.
    Expired,
    Failed(String),
}

/// Delivers a message to one subscription.
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &push_subscription::Model,
        message: &PushMessage,
    ) -> PushOutcome;
}

/// VAPID-signed sender backed by the `web-push` crate.
pub struct WebPushSender {
    client: IsahcWebPushClient,
    private_key: String,
    subject: String,
}

impl WebPushSender {
    /// Build a sender from the VAPID configuration.
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let client = IsahcWebPushClient::new()
            .map_err(|e| AppError::ExternalService(format!("push client: {e}")))?;

        Ok(Self {
            client,
            private_key: config.vapid_private_key.clone(),
            subject: config.subject.clone(),
        })
    }

    async fn try_send(
        &self,
        subscription: &push_subscription::Model,
        payload: &[u8],
    ) -> Result<(), web_push::WebPushError> {
        let info = SubscriptionInfo::new(
            &subscription.endpoint,
            &subscription.p256dh,
            &subscription.auth,
        );

        let mut signature = VapidSignatureBuilder::from_base64(&self.private_key, web_push::URL_SAFE_NO_PAD, &info)?;
        signature.add_claim("sub", self.subject.as_str());
        let signature = signature.build()?;

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_ttl(PUSH_TTL_SECS);
        builder.set_vapid_signature(signature);

        self.client.send(builder.build()?).await
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(
        &self,
        subscription: &push_subscription::Model,
        message: &PushMessage,
    ) -> PushOutcome {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(e) => return PushOutcome::Failed(e.to_string()),
        };

        match self.try_send(subscription, &payload).await {
            Ok(()) => PushOutcome::Delivered,
            Err(e) if is_gone(&e) => PushOutcome::Expired,
            Err(e) => PushOutcome::Failed(e.to_string()),
        }
    }
}

/// 404 and 410 from the push service surface as these two variants.
fn is_gone(err: &web_push::WebPushError) -> bool {
    matches!(
        err.short_description(),
        "endpoint_not_valid" | "endpoint_not_found"
    )
}

/// Browser subscription as posted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterSubscriptionInput {
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
}

/// Push subscription service.
#[derive(Clone)]
pub struct PushSubscriptionService {
    repo: PushSubscriptionRepository,
    id_gen: IdGenerator,
}

impl PushSubscriptionService {
    /// Create a new push subscription service.
    #[must_use]
    pub const fn new(repo: PushSubscriptionRepository) -> Self {
        Self {
            repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a subscription, refreshing the keys if the endpoint is already ours.
    pub async fn register(
        &self,
        user_id: &str,
        input: RegisterSubscriptionInput,
        now: DateTime<Utc>,
    ) -> AppResult<push_subscription::Model> {
        if input.endpoint.trim().is_empty() {
            return Err(AppError::validation("endpoint is required"));
        }

        if let Some(existing) = self.repo.find_by_endpoint(&input.endpoint).await? {
            if existing.user_id != user_id {
                return Err(AppError::Conflict(
                    "push endpoint is registered to another user".to_string(),
                ));
            }

            let mut active: push_subscription::ActiveModel = existing.into();
            active.p256dh = Set(input.p256dh);
            active.auth = Set(input.auth);
            debug!(user_id = %user_id, "Refreshed push subscription keys");
            return self.repo.update(active).await;
        }

        let created = self
            .repo
            .create(push_subscription::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                endpoint: Set(input.endpoint),
                p256dh: Set(input.p256dh),
                auth: Set(input.auth),
                created_at: Set(now.into()),
            })
            .await?;

        info!(user_id = %user_id, subscription_id = %created.id, "Push subscription registered");
        Ok(created)
    }

    /// The caller's subscriptions.
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<push_subscription::Model>> {
        self.repo.find_by_user_id(user_id).await
    }

    /// Remove one of the caller's subscriptions.
    pub async fn unregister(&self, user_id: &str, subscription_id: &str) -> AppResult<()> {
        let subscription = self.repo.get_by_id(subscription_id).await?;
        if subscription.user_id != user_id {
            return Err(AppError::permission_denied("not your subscription"));
        }
        self.repo.delete(subscription_id).await
    }
}
