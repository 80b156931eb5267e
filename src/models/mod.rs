pub mod dependency;
pub mod fields;
pub mod task;

pub use dependency::*;
pub use fields::*;
pub use task::*;
