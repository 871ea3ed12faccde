pub mod board;
pub mod credentials;
pub mod feeds;
pub mod lifecycle;

// Re-export main components
pub use board::*;
pub use credentials::*;
pub use feeds::*;
pub use lifecycle::*;
