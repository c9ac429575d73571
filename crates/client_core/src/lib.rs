pub mod config;
pub mod error;
pub mod gateway;
pub mod notices;
pub mod notifier;
pub mod views;

pub use config::{load_settings, ClientSettings};
pub use error::{ConfigError, GatewayError};
pub use gateway::{DocumentGateway, HttpDocumentGateway};
pub use notices::{AssumeYes, ConfirmPrompt, Notice, NoticeSink};
pub use notifier::{Subscription, UpdateNotifier};
pub use views::{DeleteOutcome, DocumentListView, LandingPage, UploadOutcome, UploadView};
