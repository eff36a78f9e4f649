//! Business logic for the portfolio mutation pipeline.
//!
//! # Services
//!
//! - `session` - Role resolution and login/demo/logout transitions
//! - `uploads` - Cover-first asset upload to object storage
//! - `projects` - Permission-gated project create/delete
//! - `messages` - Contact messages
//! - `cache` - Listing cache and its invalidation

pub mod cache;
pub mod error;
pub mod messages;
pub mod projects;
pub mod session;
pub mod uploads;

pub use cache::{ListingCache, ReadPath};
pub use error::MutationError;
pub use messages::MessageRepository;
pub use projects::ProjectRepository;
pub use session::{AuthError, SessionResolver};
pub use uploads::{AssetUploadOrchestrator, UploadError, UploadedFile};
