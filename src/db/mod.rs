mod generation;
mod repository;
mod schema;

pub use generation::Generation;
pub use repository::Repository;
