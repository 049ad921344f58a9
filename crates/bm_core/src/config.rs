use std::net::SocketAddr;
use std::path::PathBuf;

/// The blog index this service mirrors.
pub const DEFAULT_BLOG_URL: &str = "https://beyondchats.com/blogs/";

/// Runtime configuration, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub blog_url: String,
    pub db_path: PathBuf,
    pub listen: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blog_url: DEFAULT_BLOG_URL.to_string(),
            db_path: PathBuf::from("articles.db"),
            listen: ([0, 0, 0, 0], 5001).into(),
        }
    }
}
