use crate::error::AppError;
use crate::model::{Post, Task};
use crate::view::pipeline::{Projection, Searchable, project};
use std::num::NonZeroUsize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(AppError::invalid_input(format!(
                "unknown filter '{other}' (expected all, active or completed)"
            ))),
        }
    }
}

/// UI-local view state: search term, status filter and page position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewQuery {
    search_term: String,
    page: usize,
    page_size: NonZeroUsize,
    filter: StatusFilter,
}

impl ViewQuery {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            search_term: String::new(),
            page: 1,
            page_size,
            filter: StatusFilter::All,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Any change of term sends the view back to the first page.
    pub fn set_search(&mut self, term: &str) {
        if self.search_term != term {
            self.search_term = term.to_string();
            self.page = 1;
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.page = 1;
        }
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        if self.page_size != page_size {
            self.page_size = page_size;
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn project_tasks<'a>(&self, tasks: &'a [Task]) -> Projection<'a, Task> {
        project(
            tasks,
            |task| self.filter.matches(task) && task.matches(&self.search_term),
            self.page,
            self.page_size,
        )
    }

    pub fn project_posts<'a>(&self, posts: &'a [Post]) -> Projection<'a, Post> {
        project(
            posts,
            |post| post.matches(&self.search_term),
            self.page,
            self.page_size,
        )
    }
}
