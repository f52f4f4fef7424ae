//! Scrape endpoint: `GET|HEAD /metrics` over plain HTTP/1.1, one request per
//! connection.

pub mod http;
pub mod listener;

pub use listener::{ExpositionServer, Renderer, ServerOptions, MAX_REQUEST_BYTES};
