mod pipeline;
mod query;

pub use pipeline::{Projection, Searchable, matches_query, project};
pub use query::{StatusFilter, ViewQuery};
