pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;
pub mod hub;
pub mod logging;
pub mod models;
pub mod session;

pub use alerts::{Alert, AlertBus, AlertKind};
pub use config::Config;
pub use error::{AppError, Result};
pub use feed::{NotificationCenter, NotificationFeed};
pub use http::ApiClient;
pub use hub::{HubConnection, HubState};
pub use models::Notification;
pub use session::{
    FileSessionStore, MemorySessionStore, SessionEvent, SessionEvents, SessionStore,
};
