pub mod application_status;
pub mod document_type;
pub mod post_status;
pub mod slug;
pub mod storage;

pub use application_status::ApplicationStatus;
pub use document_type::DocumentType;
pub use post_status::PostStatus;
