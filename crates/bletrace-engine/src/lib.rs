// Engine module - Core session aggregation logic (throttling, accumulation, eviction)
// This layer sits between sighting sources (runtime) and record persistence (store)

pub mod anonymize;
pub mod session;
pub mod throttle;
pub mod tracker;

pub use anonymize::Anonymizer;
pub use session::OpenSession;
pub use throttle::WriteThrottle;
pub use tracker::SessionTracker;
