mod story;
mod summary;

pub use story::{Category, Story, StoredStory};
pub use summary::{DigestEntry, StorySummary, SUMMARY_UNAVAILABLE};
