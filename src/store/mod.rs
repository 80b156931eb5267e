pub mod activity;
pub mod config;
pub mod layout;
pub mod lock;
pub mod task_repo;

pub use layout::*;
