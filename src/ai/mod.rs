mod backend;
mod splitter;
mod summarizer;

pub use backend::{OllamaClient, TextGenerator};
pub use splitter::TextSplitter;
pub use summarizer::PageSummarizer;
