/// Middleware module
///
/// Request logging and the front-end hit counter.

mod hit_counter;
mod request_logger;

pub use hit_counter::{ApiMetrics, HitCounter};
pub use request_logger::RequestLogger;
