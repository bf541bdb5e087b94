//! Language service clients.

pub mod http;

pub use http::HttpLanguageService;
