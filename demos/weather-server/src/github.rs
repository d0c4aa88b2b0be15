use garnish::logging::{LogSink, Stdout};
use garnish::prelude::*;

/// Toy API client whose calls are wrapped with `#[logged]`.
pub struct GithubClient {
    sink: Arc<dyn LogSink + Send + Sync>,
}

impl Default for GithubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GithubClient {
    pub fn new() -> Self {
        Self::with_sink(Stdout)
    }

    pub fn with_sink(sink: impl LogSink + Send + Sync + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    #[logged(sink = self.sink)]
    pub fn get_repos(&self) -> Vec<String> {
        tracing::info!("Getting Github repos...");
        vec!["garnish".to_string(), "weather-server".to_string()]
    }

    #[logged(sink = self.sink)]
    pub fn get_repo(&self, name: &str) -> std::result::Result<String, String> {
        if name.is_empty() {
            return Err("repository name is empty".to_string());
        }
        Ok(format!("octocat/{name}"))
    }

    #[logged(sink = self.sink)]
    pub async fn count_stars(&self, repo: &str) -> usize {
        tokio::task::yield_now().await;
        repo.len()
    }
}
