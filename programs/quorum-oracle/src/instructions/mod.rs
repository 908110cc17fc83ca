// Protocol administration
pub mod initialize_protocol;
pub mod update_protocol_config;

// Feed lifecycle
pub mod create_feed;
pub mod edit_feed;
pub mod manage_feed;

// Request correlation and resolution
pub mod commit_response;
pub mod expire_request;
pub mod submit_request;
pub mod submit_response;

// Read-only views
pub mod queries;

pub use commit_response::*;
pub use create_feed::*;
pub use edit_feed::*;
pub use expire_request::*;
pub use initialize_protocol::*;
pub use manage_feed::*;
pub use queries::*;
pub use submit_request::*;
pub use submit_response::*;
pub use update_protocol_config::*;
