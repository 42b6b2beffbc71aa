//! Business logic services.

pub mod asset;
pub mod auth;
pub mod board;
pub mod inquiry;
pub mod lifecycle;
pub mod moderation;
pub mod push;
pub mod session;
pub mod sweeper;

pub use asset::{AssetService, CreateAssetInput, CreateCashFlowInput};
pub use auth::{AuthService, RegisterInput, Registration, SignedIn, hash_password};
pub use board::{BoardService, PostDetail};
pub use inquiry::{InquiryDetail, InquiryService, InquiryStats};
pub use lifecycle::{
    AccountState, AccountView, AppealEntry, GRACE_PERIOD_HOURS, LifecycleService, grace_period,
    is_grace_expired,
};
pub use moderation::{FileReportInput, ModerationService, ReportView, UserRef};
pub use push::{
    PushMessage, PushOutcome, PushSender, PushSubscriptionService, RegisterSubscriptionInput,
    WebPushSender,
};
pub use session::{SessionClaims, SessionIssuer};
pub use sweeper::{
    DueEvent, DueWhen, NotificationReport, SweepReport, SweeperService, due_cash_flow_events,
};
