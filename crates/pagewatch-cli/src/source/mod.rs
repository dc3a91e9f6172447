//! Document sources backed by real transports.

pub mod http;

pub use http::HttpDocumentSource;
