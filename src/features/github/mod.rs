pub mod client;
pub mod models;

pub use client::GithubClient;
pub use models::{OrgRef, RepoRef};
