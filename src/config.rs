//! Settings read from the `detect-chain` section of the git configuration.

pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_REFLOG_DEPTH: usize = 50;

const REMOTE_KEY: &str = "detect-chain.remote";
const REFLOG_DEPTH_KEY: &str = "detect-chain.reflogDepth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Remote whose tracking refs are consulted when a branch was rewritten locally
    pub remote: String,
    /// How many reflog entries of a branch are searched for an old tip
    pub reflog_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            reflog_depth: DEFAULT_REFLOG_DEPTH,
        }
    }
}

impl Config {
    /// Load the settings, falling back to the defaults for missing or invalid keys
    pub fn from_git(config: &git2::Config) -> Self {
        let mut settings = Self::default();

        if let Ok(remote) = config.get_string(REMOTE_KEY) {
            let remote = remote.trim();
            if remote.is_empty() {
                log::warn!("Ignoring empty {}", REMOTE_KEY);
            } else {
                settings.remote = remote.to_string();
            }
        }

        if let Ok(depth) = config.get_i64(REFLOG_DEPTH_KEY) {
            match usize::try_from(depth) {
                Ok(depth) => settings.reflog_depth = depth,
                Err(_) => log::warn!("Ignoring negative {}: {}", REFLOG_DEPTH_KEY, depth),
            }
        }

        settings
    }

    /// Apply command line overrides on top of the configured values
    pub fn with_overrides(mut self, remote: Option<&str>, reflog_depth: Option<usize>) -> Self {
        if let Some(remote) = remote {
            self.remote = remote.to_string();
        }
        if let Some(depth) = reflog_depth {
            self.reflog_depth = depth;
        }
        self
    }
}
