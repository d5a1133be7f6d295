//! # feed-client
//!
//! Sync client for the lost/found pet report feed.
//!
//! Applications talk to [`FeedSyncCoordinator`]; it tries the remote reports
//! service first and falls back to a durable local store whenever the remote
//! is unreachable or rejects a request.
//!
//! ## Features
//!
//! - **Remote-first reads**: failures fall back silently to the local store
//! - **Soft-fail writes**: [`SyncOutcome::SavedLocally`] when only the local copy took the write
//! - **Gateway Abstraction**: Pluggable remote gateway (reqwest, mock)
//! - **Storage Abstraction**: Pluggable durable storage (file, memory)
//! - **Offline Photos**: Downsized JPEG data URLs for locally saved reports
//! - **Pure Core**: Normalization, reactions and comment merging come from feed-core
//!
//! ## Example
//!
//! ```ignore
//! use petfeed_client::{ClientConfig, FeedSyncCoordinator};
//!
//! let config = ClientConfig::from_file("petfeed.toml".as_ref())?;
//! let feed = FeedSyncCoordinator::from_config(&config)?;
//!
//! let page = feed.feed_page(1).await?;
//! let outcome = feed.toggle_reaction(&page.items[0], "heart").await?;
//! if !outcome.is_synced() {
//!     // show "saved on this device"
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod photo;
pub mod storage;
pub mod store;

pub use config::{ApiConfig, ClientConfig, ConfigError, FeedConfig, PhotoConfig, StorageConfig};
pub use coordinator::{CommentsPage, FeedSyncCoordinator, SyncOutcome};
pub use error::{FeedError, GatewayError, StorageError};
pub use gateway::{GatewayRequest, HttpGateway, MockGateway, ReportsGateway};
pub use photo::{embed_data_url, PhotoError};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::LocalReportStore;

// Re-export the data model and feed session so applications need a single dependency
pub use feed_core::{FeedState, PageMode, RequestTicket};
pub use feed_types::{
    Comment, FeedPage, FeedSource, Flag, NewComment, NewFlag, PetStatus, PhotoUpload,
    ReactionCounts, ReactionKind, Report, ReportDraft, ReportId,
};
