pub mod cycle;
pub mod validate;

pub use validate::validate_graph;
