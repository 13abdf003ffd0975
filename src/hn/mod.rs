mod fetcher;

pub use fetcher::{HnClient, StorySource};
