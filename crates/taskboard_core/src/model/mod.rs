mod post;
mod task;

pub use post::Post;
pub use task::{Task, TaskCounts};
