pub mod dashboard;
pub mod errors;
pub mod session;
pub mod task;

// Re-export all types
pub use dashboard::*;
pub use errors::*;
pub use session::*;
pub use task::*;
