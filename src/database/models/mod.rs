pub mod folder;
pub mod note;
pub mod project;
pub mod time_record;
pub mod user;

pub use folder::{Folder, FolderInput};
pub use note::{Note, NoteInput};
pub use project::{Project, ProjectInput};
pub use time_record::{TimeRecord, TimeRecordInput, TimeRecordKind};
pub use user::{RegisterOutcome, User};
