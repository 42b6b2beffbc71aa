//! Database repositories.

mod asset;
mod inquiry;
mod post;
mod push_subscription;
mod report;
mod user;
mod verification_token;

pub use asset::AssetRepository;
pub use inquiry::InquiryRepository;
pub use post::PostRepository;
pub use push_subscription::PushSubscriptionRepository;
pub use report::ReportRepository;
pub use user::UserRepository;
pub use verification_token::VerificationTokenRepository;
