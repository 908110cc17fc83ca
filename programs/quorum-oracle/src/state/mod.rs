pub mod creator;
pub mod feed;
pub mod feed_types;
pub mod protocol_config;
pub mod request;

// Re-export all state structs
pub use creator::*;
pub use feed::*;
pub use feed_types::*;
pub use protocol_config::*;
pub use request::*;
