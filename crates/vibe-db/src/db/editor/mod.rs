pub mod asset;
pub mod project;
pub mod upload;

pub use asset::AssetRepository;
pub use project::ProjectRepository;
pub use upload::UploadRepository;
