pub mod error;
pub mod folder_service;
pub mod note_service;
pub mod project_service;
pub mod time_record_service;
pub mod user_service;

pub use error::ServiceError;
pub use folder_service::FolderService;
pub use note_service::NoteService;
pub use project_service::ProjectService;
pub use time_record_service::TimeRecordService;
pub use user_service::UserService;
