pub mod api;
pub mod conf;
pub mod errors;
pub mod queue;
pub mod secrets;
pub mod store;
pub mod submission;
pub mod worker;
