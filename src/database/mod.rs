pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use manager::{Backend, DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{FolderStore, HealthCheck, NoteStore, ProjectStore, Store, TimeRecordStore, UserStore};
