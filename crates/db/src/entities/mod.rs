//! Database entities.

pub mod asset;
pub mod cash_flow;
pub mod comment;
pub mod inquiry;
pub mod inquiry_answer;
pub mod post;
pub mod push_subscription;
pub mod report;
pub mod user;
pub mod verification_token;

pub use asset::Entity as Asset;
pub use cash_flow::Entity as CashFlow;
pub use comment::Entity as Comment;
pub use inquiry::Entity as Inquiry;
pub use inquiry_answer::Entity as InquiryAnswer;
pub use post::Entity as Post;
pub use push_subscription::Entity as PushSubscription;
pub use report::Entity as Report;
pub use user::Entity as User;
pub use verification_token::Entity as VerificationToken;
