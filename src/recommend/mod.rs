pub mod compare;
pub mod ranker;
pub mod types;

pub use compare::{CompareSelection, MAX_COMPARE};
pub use ranker::{rank, RankedListing, SortKey};
pub use types::CandidateListing;
