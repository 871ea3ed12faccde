use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub state_dir: PathBuf,
    pub refresh_interval_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_base_url: env::var("STRIVE_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string()),
            state_dir: env::var("STRIVE_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_state_dir()),
            refresh_interval_secs: env::var("STRIVE_REFRESH_SECS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .expect("Invalid STRIVE_REFRESH_SECS"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".strive")
}
