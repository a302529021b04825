pub mod regions;
pub mod search;

// Re-export command functions for convenience
pub use regions::{regions, RegionsParams};
pub use search::{search, SearchParams};
