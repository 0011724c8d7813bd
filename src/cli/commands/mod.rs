pub mod database;
pub mod serve;
pub mod token;
