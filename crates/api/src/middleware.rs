//! API middleware and shared state.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
};
use chrono::Duration;
use finboard_common::{AppError, AppResult, Config};
use finboard_core::{
    AssetService, AuthService, BoardService, InquiryService, LifecycleService, ModerationService,
    PushSender, PushSubscriptionService, SessionClaims, SessionIssuer, SweeperService,
};
use finboard_db::repositories::{
    AssetRepository, InquiryRepository, PostRepository, PushSubscriptionRepository,
    ReportRepository, UserRepository, VerificationTokenRepository,
};
use sea_orm::DatabaseConnection;
use tracing::debug;

use crate::suspension_cache::{SuspensionCache, SuspensionStatus};

/// Where the suspension gate reads the `suspended` flag from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateMode {
    /// The session token's snapshot. Stale until the session is refreshed.
    Snapshot,
    /// The user row, through the suspension cache.
    Live,
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionIssuer,
    pub auth_service: AuthService,
    pub lifecycle_service: LifecycleService,
    pub moderation_service: ModerationService,
    pub inquiry_service: InquiryService,
    pub board_service: BoardService,
    pub asset_service: AssetService,
    pub push_service: PushSubscriptionService,
    pub sweeper_service: SweeperService,
    pub user_repo: UserRepository,
    pub gate_mode: GateMode,
    pub suspension_cache: SuspensionCache,
    pub cron_secret: Arc<str>,
}

impl AppState {
    /// Wire every service onto one database connection.
    #[must_use]
    pub fn new(
        db: &Arc<DatabaseConnection>,
        config: &Config,
        push_sender: Option<Arc<dyn PushSender>>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(db));
        let token_repo = VerificationTokenRepository::new(Arc::clone(db));
        let post_repo = PostRepository::new(Arc::clone(db));
        let asset_repo = AssetRepository::new(Arc::clone(db));
        let subscription_repo = PushSubscriptionRepository::new(Arc::clone(db));

        let sessions = SessionIssuer::from_config(&config.auth);
        let lifecycle_service = LifecycleService::new(user_repo.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            token_repo.clone(),
            lifecycle_service.clone(),
            sessions.clone(),
            Duration::hours(config.auth.verification_ttl_hours),
        );
        let moderation_service = ModerationService::new(
            ReportRepository::new(Arc::clone(db)),
            post_repo.clone(),
            user_repo.clone(),
            lifecycle_service.clone(),
        );
        let inquiry_service = InquiryService::new(
            InquiryRepository::new(Arc::clone(db)),
            user_repo.clone(),
            lifecycle_service.clone(),
        );
        let sweeper_service = SweeperService::new(
            user_repo.clone(),
            token_repo,
            subscription_repo.clone(),
            asset_repo.clone(),
            lifecycle_service.clone(),
            push_sender,
        );

        Self {
            sessions,
            auth_service,
            moderation_service,
            inquiry_service,
            board_service: BoardService::new(post_repo, user_repo.clone()),
            asset_service: AssetService::new(asset_repo),
            push_service: PushSubscriptionService::new(subscription_repo),
            sweeper_service,
            lifecycle_service,
            user_repo,
            gate_mode: if config.auth.live_suspension_check {
                GateMode::Live
            } else {
                GateMode::Snapshot
            },
            suspension_cache: SuspensionCache::new(StdDuration::from_secs(
                config.auth.suspension_cache_ttl_secs,
            )),
            cron_secret: Arc::from(config.cron.secret.as_str()),
        }
    }
}

/// Bearer token from the `Authorization` header.
pub(crate) fn bearer_token(req_headers: &axum::http::HeaderMap) -> Option<&str> {
    req_headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Authentication middleware.
///
/// A valid session token puts its [`SessionClaims`] into the request
/// extensions. Anything else leaves the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(req.headers()) {
        match state.sessions.decode(token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
            }
            Err(e) => debug!(error = %e, "Ignoring invalid session token"),
        }
    }

    next.run(req).await
}

/// Block suspended callers from member routes.
///
/// Anonymous requests pass through; the handler's extractor rejects them.
pub async fn suspension_gate(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(claims) = req.extensions().get::<SessionClaims>().cloned() else {
        return next.run(req).await;
    };

    match current_suspension(&state, &claims).await {
        Ok(status) if status.suspended => {
            let reason = status.reason.unwrap_or_default();
            AppError::permission_denied(format!("account suspended: {reason}")).into_response()
        }
        Ok(_) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

async fn current_suspension(state: &AppState, claims: &SessionClaims) -> AppResult<SuspensionStatus> {
    if state.gate_mode == GateMode::Snapshot {
        return Ok(SuspensionStatus {
            suspended: claims.suspended,
            reason: claims.suspended_reason.clone(),
        });
    }

    if let Some(status) = state.suspension_cache.get(&claims.sub).await {
        return Ok(status);
    }

    let user = state
        .user_repo
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("session user no longer exists".to_string()))?;
    let status = SuspensionStatus {
        suspended: user.suspended,
        reason: user.suspended_reason,
    };
    state.suspension_cache.insert(&claims.sub, status.clone()).await;
    Ok(status)
}

/// Put `router`'s routes behind the suspension gate.
pub fn gated(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), suspension_gate))
}
