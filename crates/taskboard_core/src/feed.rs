use crate::error::AppError;
use crate::model::Post;
use std::time::Duration;

pub const DEFAULT_POSTS_URL: &str = "https://jsonplaceholder.typicode.com/posts";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub trait PostSource {
    fn fetch_posts(&self) -> Result<Vec<Post>, AppError>;
}

/// A single unauthenticated GET against a JSON endpoint.
#[derive(Debug, Clone)]
pub struct HttpPostSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpPostSource {
    pub fn new<U: Into<String>>(url: U) -> Result<Self, AppError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|err| AppError::network(err.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PostSource for HttpPostSource {
    fn fetch_posts(&self) -> Result<Vec<Post>, AppError> {
        tracing::debug!(url = %self.url, "fetching posts");
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| AppError::network(format!("failed to fetch posts: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::network(format!(
                "failed to fetch posts: HTTP {status}"
            )));
        }

        let posts: Vec<Post> = response
            .json()
            .map_err(|err| AppError::invalid_data(format!("invalid posts payload: {err}")))?;
        tracing::info!(count = posts.len(), "posts fetched");
        Ok(posts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedState {
    Loading,
    Failed(AppError),
    Ready(Vec<Post>),
}

/// Load state of the posts surface. Failures stay here until [`PostFeed::retry`].
pub struct PostFeed<S> {
    source: S,
    state: FeedState,
}

impl<S: PostSource> PostFeed<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: FeedState::Loading,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn posts(&self) -> Option<&[Post]> {
        match &self.state {
            FeedState::Ready(posts) => Some(posts),
            _ => None,
        }
    }

    pub fn load(&mut self) -> &FeedState {
        self.state = match self.source.fetch_posts() {
            Ok(posts) => FeedState::Ready(posts),
            Err(err) => {
                tracing::warn!(error = %err, "posts unavailable");
                FeedState::Failed(err)
            }
        };
        &self.state
    }

    /// Loads only when nothing has been fetched yet.
    pub fn ensure_loaded(&mut self) -> &FeedState {
        if matches!(self.state, FeedState::Loading) {
            self.load();
        }
        &self.state
    }

    pub fn retry(&mut self) -> &FeedState {
        self.load()
    }
}
