/// Request routing and the `tiny_http` accept loop.
pub mod http;
/// Concurrent render and log for one request.
pub mod issuer;
