pub mod app_module;
pub mod cities;
pub mod github;
pub mod weather;

pub use app_module::AppModule;
pub use github::GithubClient;

#[cfg(test)]
mod tests;
