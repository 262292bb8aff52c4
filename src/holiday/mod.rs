pub mod cache;
pub mod provider;
pub mod resolver;
pub mod types;

pub use cache::HolidayCache;
pub use provider::HolidayApiClient;
