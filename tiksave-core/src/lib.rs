pub mod core;
pub mod fs_paths;
pub mod models;
pub mod platforms;

pub use crate::core::downloader::Downloader;
pub use crate::core::error::{DownloadError, Error, ExtractError, HttpError, PageError};
pub use crate::core::http_client::{HttpClient, ReqwestHttpClient};
pub use crate::core::session::PageSession;
pub use crate::core::url_parser::{classify, parse_url, ContentVariant, ParsedUrl};
pub use crate::models::media::{ExtractionResult, MediaRequest};
pub use crate::models::settings::{AppSettings, RollbackPolicy};
