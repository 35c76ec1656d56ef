pub mod streamable_http;

pub use streamable_http::StreamableHttpTransport;
