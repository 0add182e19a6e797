//! Vitae: serves a résumé document through a directory of Handlebars
//! templates, plus PDF versions of the HTML pages via an external
//! headless browser.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod pdf;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServiceError};
pub use normalize::{Detail, normalize};
pub use server::{Server, router};
pub use state::AppState;

pub use vitae_resource::FilesystemResourceProvider;
pub use vitae_source::{DocumentFormat, DocumentSource, FileSource, SourceError, StaticSource};
pub use vitae_traits::{InMemoryResourceProvider, ResourceError, ResourceProvider};
