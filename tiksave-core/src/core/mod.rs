pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod filename;
pub mod http_client;
pub mod session;
pub mod url_parser;
