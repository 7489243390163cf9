use crate::cli::{Command, ThemeCommand};
use crate::render;
use std::num::NonZeroUsize;
use taskboard_core::config::Settings;
use taskboard_core::error::AppError;
use taskboard_core::feed::{FeedState, HttpPostSource, PostFeed};
use taskboard_core::storage::FileMedium;
use taskboard_core::task_api::{TaskList, parse_task_id};
use taskboard_core::theme::{Theme, ThemeSetting, palette_for_theme};
use taskboard_core::view::ViewQuery;

pub const TASK_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(20).unwrap();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Tasks,
    Posts,
}

/// State shared by the commands of one run or one interactive session.
///
/// View queries survive between interactive commands, so paging and search
/// behave like the list on screen.
pub struct Session {
    tasks: TaskList<FileMedium>,
    theme: ThemeSetting<FileMedium>,
    posts_url: String,
    feed: Option<PostFeed<HttpPostSource>>,
    task_query: ViewQuery,
    post_query: ViewQuery,
    last_surface: Option<Surface>,
}

impl Session {
    pub fn open(settings: &Settings) -> Self {
        let medium = FileMedium::new(&settings.store_dir);
        Self {
            tasks: TaskList::open(medium.clone()),
            theme: ThemeSetting::open(medium),
            posts_url: settings.posts_url.clone(),
            feed: None,
            task_query: ViewQuery::new(TASK_PAGE_SIZE),
            post_query: ViewQuery::new(settings.page_size),
            last_surface: None,
        }
    }

    pub fn run(&mut self, command: Command, json: bool) -> Result<(), AppError> {
        match command {
            Command::Add { text } => {
                let text = text.unwrap_or_default();
                let task = self
                    .tasks
                    .add(&text)?
                    .ok_or_else(|| AppError::invalid_input("text is required"))?;
                if json {
                    render::print_task_json(&task);
                } else {
                    println!("Added task: {} ({})", task.text, task.id);
                }
            }
            Command::Toggle { id } => {
                let task = self.tasks.toggle(parse_task_id(&id)?)?;
                if json {
                    render::print_task_json(&task);
                } else if task.completed {
                    println!("Completed task: {} ({})", task.text, task.id);
                } else {
                    println!("Reopened task: {} ({})", task.text, task.id);
                }
            }
            Command::Delete { id } => {
                let task = self.tasks.delete(parse_task_id(&id)?)?;
                if json {
                    render::print_task_json(&task);
                } else {
                    println!("Deleted task: {} ({})", task.text, task.id);
                }
            }
            Command::List {
                filter,
                search,
                page,
                page_size,
            } => {
                if let Some(filter) = filter {
                    self.task_query.set_filter(filter);
                }
                if let Some(search) = search {
                    self.task_query.set_search(&search);
                }
                if let Some(page_size) = page_size {
                    self.task_query.set_page_size(page_size);
                }
                if let Some(page) = page {
                    self.task_query.set_page(page);
                }
                self.show_tasks(json);
            }
            Command::Posts {
                search,
                page,
                page_size,
            } => {
                if let Some(search) = search {
                    self.post_query.set_search(&search);
                }
                if let Some(page_size) = page_size {
                    self.post_query.set_page_size(page_size);
                }
                if let Some(page) = page {
                    self.post_query.set_page(page);
                }
                self.feed()?.ensure_loaded();
                self.show_posts(json)?;
            }
            Command::Theme { action } => {
                let action = action.unwrap_or(ThemeCommand::Show);
                let theme = match action {
                    ThemeCommand::Show => self.theme.theme(),
                    ThemeCommand::Toggle => self.theme.toggle(),
                    ThemeCommand::Light => self.theme.set(Theme::Light),
                    ThemeCommand::Dark => self.theme.set(Theme::Dark),
                };
                render::print_theme(theme, json, action != ThemeCommand::Show);
            }
            Command::Next => match self.last_surface {
                Some(Surface::Tasks) => {
                    let total_pages = self.tasks.view(&self.task_query).total_pages;
                    self.task_query.next_page(total_pages);
                    self.show_tasks(json);
                }
                Some(Surface::Posts) => {
                    let total_pages = self.post_total_pages();
                    self.post_query.next_page(total_pages);
                    self.show_posts(json)?;
                }
                None => return Err(AppError::invalid_input("nothing to page through yet")),
            },
            Command::Prev => match self.last_surface {
                Some(Surface::Tasks) => {
                    self.task_query.prev_page();
                    self.show_tasks(json);
                }
                Some(Surface::Posts) => {
                    self.post_query.prev_page();
                    self.show_posts(json)?;
                }
                None => return Err(AppError::invalid_input("nothing to page through yet")),
            },
            Command::Retry => {
                self.feed()?.retry();
                self.show_posts(json)?;
            }
        }

        Ok(())
    }

    /// True once a post fetch has failed and not yet been retried successfully.
    pub fn feed_failed(&self) -> bool {
        self.feed
            .as_ref()
            .is_some_and(|feed| matches!(feed.state(), FeedState::Failed(_)))
    }

    fn feed(&mut self) -> Result<&mut PostFeed<HttpPostSource>, AppError> {
        if self.feed.is_none() {
            let source = HttpPostSource::new(self.posts_url.clone())?;
            self.feed = Some(PostFeed::new(source));
        }
        self.feed
            .as_mut()
            .ok_or_else(|| AppError::network("post feed unavailable"))
    }

    fn post_total_pages(&self) -> usize {
        self.feed
            .as_ref()
            .and_then(PostFeed::posts)
            .map(|posts| self.post_query.project_posts(posts).total_pages)
            .unwrap_or(1)
    }

    fn show_tasks(&mut self, json: bool) {
        let palette = palette_for_theme(self.theme.theme());
        let counts = self.tasks.counts();
        let projection = self.tasks.view(&self.task_query);
        let page = projection.page;

        if json {
            render::print_tasks_json(&projection, counts);
        } else {
            render::print_tasks_plain(&projection, counts, &palette);
        }

        self.task_query.set_page(page);
        self.last_surface = Some(Surface::Tasks);
    }

    fn show_posts(&mut self, json: bool) -> Result<(), AppError> {
        let palette = palette_for_theme(self.theme.theme());
        let Some(feed) = self.feed.as_ref() else {
            return Err(AppError::network("posts have not been fetched"));
        };

        let page = match feed.state() {
            FeedState::Ready(posts) => {
                let projection = self.post_query.project_posts(posts);
                if json {
                    render::print_posts_json(&projection);
                } else {
                    render::print_posts_plain(&projection, &palette);
                }
                projection.page
            }
            FeedState::Failed(err) => return Err(err.clone()),
            FeedState::Loading => return Err(AppError::network("posts are still loading")),
        };

        self.post_query.set_page(page);
        self.last_surface = Some(Surface::Posts);
        Ok(())
    }
}
