pub mod adapters;
pub mod application;
pub mod domain;
pub mod infra;


// Re-exports for shorter use statements.
pub use application::*;
pub use domain::*;
