//! Harvester configuration pointed at a mock API

use regs_harvest::Config;
use regs_harvest::config::RetryConfig;
use std::path::Path;
use std::time::Duration;
use wiremock::MockServer;

/// Config for `server` with no waits, writing CSV files to `output_dir`
pub fn mock_config(server: &MockServer, keys: &[&str], output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.api_keys = keys.iter().map(|k| k.to_string()).collect();
    config.retry = RetryConfig {
        max_retries_per_key: 2,
        ..RetryConfig::immediate()
    };
    config.pagination.page_delay = Duration::ZERO;
    config.harvest.output_dir = output_dir.to_path_buf();
    config
}
