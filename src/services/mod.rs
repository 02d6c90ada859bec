//! Service implementations for Graph API endpoints.
//!
//! Each service module provides methods for interacting with a specific
//! category of Graph API endpoints. All of them share one
//! [`ServiceContext`], so every call runs through the same executor.

mod context;

pub mod channels;
pub mod messages;
pub mod search;
pub mod teams;

pub use channels::{ChannelsService, ChannelsServiceTrait};
pub use context::ServiceContext;
pub use messages::{MessagesService, MessagesServiceTrait};
pub use search::{SearchService, SearchServiceTrait};
pub use teams::{TeamsService, TeamsServiceTrait};
