// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here runs behind `require_identity` and receives the caller's
// `Identity`; its `subject_id` is the owner id for every service call.

pub mod auth;
pub mod folders;
pub mod notes;
pub mod projects;
pub mod time_records;
pub mod utils;
