pub(super) const DEFAULT_CONFIG_PATH: &str = "config/canvass.toml";

pub(super) const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

pub(super) const DEFAULT_MAX_CONCURRENT_CAMPAIGNS: usize = 1;

pub(super) const DEFAULT_RECENT_ARTIFACTS_IN_PROMPT: usize = 5;
