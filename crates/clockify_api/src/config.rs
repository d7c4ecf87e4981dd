use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.clockify.me/api/v1";
pub const DEFAULT_REPORTS_BASE: &str = "https://reports.api.clockify.me/v1";
pub const DEFAULT_USER_AGENT: &str = "clockify-invoicer";
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_COOLDOWN_MS: u64 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ClockifyConfig {
    pub api_base_url: String,
    pub reports_base_url: String,
    pub api_key: String,
    pub workspace_id: String,
    pub user_id: String,
    pub page_size: u32,
    pub user_agent: String,
    pub cooldown: Duration,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClockifyConfig {
    pub fn new(
        api_key: impl Into<String>,
        workspace_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            reports_base_url: DEFAULT_REPORTS_BASE.to_string(),
            api_key: api_key.into(),
            workspace_id: workspace_id.into(),
            user_id: user_id.into(),
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cooldown: Duration::from_millis(DEFAULT_COOLDOWN_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    pub fn with_reports_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.reports_base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn with_cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn reports_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.reports_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_joins_without_duplicate_slashes() {
        let config = ClockifyConfig::new("key", "ws", "user")
            .with_api_base_url("https://example.test/api/v1/");
        assert_eq!(
            config.api_url("/workspaces"),
            "https://example.test/api/v1/workspaces"
        );
    }

    #[test]
    fn page_size_is_clamped_to_supported_range() {
        let config = ClockifyConfig::new("key", "ws", "user").with_page_size(0);
        assert_eq!(config.page_size, 1);

        let config = ClockifyConfig::new("key", "ws", "user").with_page_size(10_000);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
    }
}
