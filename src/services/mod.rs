pub mod calendar;
pub mod discovery;
pub mod keywords;
pub mod providers;

pub use discovery::{
    AvailabilityCheck, DiscoveryEngine, DiscoverySettings, NeverRelax, RelaxationPolicy,
    RetryWithoutKeywords,
};
pub use keywords::KeywordResolver;
pub use providers::MovieSource;
