pub mod assets;
pub mod auth;
pub mod editor;
pub mod index;
pub mod projects;
pub mod storage;
pub mod subscriptions;
pub mod upload;
pub mod white_label;
