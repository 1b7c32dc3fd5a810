pub mod subscription;
pub mod user;
pub mod white_label;

pub use subscription::SubscriptionRepository;
pub use user::UserRepository;
pub use white_label::WhiteLabelRepository;
