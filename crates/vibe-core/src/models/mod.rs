pub mod asset;
pub mod project;
pub mod subscription;
pub mod upload;
pub mod user;
pub mod white_label;

pub use asset::*;
pub use project::*;
pub use subscription::*;
pub use upload::*;
pub use user::*;
pub use white_label::*;
