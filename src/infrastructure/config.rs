use crate::domain::graph_source::GraphSource;
use crate::domain::theme::ThemeConfig;
use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub widgets: Vec<WidgetConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub listen_addr: String,
    /// Upper bound for one upstream graph fetch
    pub fetch_timeout_ms: u64,
}

impl ServerSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            fetch_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RelaySettings {
    pub enabled: bool,
    pub listen_addr: String,
    pub route: String,
    pub upstream_url: String,
    pub token: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "0.0.0.0:3000".to_string(),
            route: "/v2/geodata/waveforecast/fairway".to_string(),
            upstream_url: "https://www.barentswatch.no/bwapi/v2/geodata/waveforecast/fairway"
                .to_string(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WidgetConfig {
    pub id: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Prefix the percent-encoded source URL is appended to
    #[serde(default)]
    pub cors_relay: Option<String>,
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh_enabled: bool,
    #[serde(default)]
    pub refresh_interval_ms: u64,
    /// Inline fallback SVG; overwritten with every successfully fetched graph
    #[serde(default)]
    pub svg_code: String,
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_auto_refresh() -> bool {
    true
}

impl WidgetConfig {
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_url: String::new(),
            api_token: None,
            cors_relay: None,
            auto_refresh_enabled: true,
            refresh_interval_ms: 0,
            svg_code: String::new(),
            theme: ThemeConfig::default(),
        }
    }

    pub fn source(&self) -> GraphSource {
        GraphSource::resolve(
            &self.source_url,
            self.api_token.as_deref(),
            self.cors_relay.as_deref(),
            &self.svg_code,
        )
    }

    /// Timer period, or `None` when auto refresh cannot run
    pub fn refresh_period(&self) -> Option<Duration> {
        if !self.auto_refresh_enabled
            || self.refresh_interval_ms == 0
            || self.source_url.trim().is_empty()
        {
            return None;
        }
        Some(Duration::from_millis(self.refresh_interval_ms))
    }

    /// Whether switching to `other` requires a new fetch and a new timer
    pub fn fetch_settings_differ(&self, other: &WidgetConfig) -> bool {
        self.source_url != other.source_url
            || self.api_token != other.api_token
            || self.cors_relay != other.cors_relay
            || self.auto_refresh_enabled != other.auto_refresh_enabled
            || self.refresh_interval_ms != other.refresh_interval_ms
    }
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/widgets"))
        .add_source(config::Environment::with_prefix("FORECAST").separator("__"))
        .set_override_option("relay.token", std::env::var("BARENTSWATCH_TOKEN").ok())?;

    build_app_config(builder)
}

/// Parse a TOML document the same way the configuration file is read
#[cfg(test)]
pub fn parse_app_config(toml: &str) -> anyhow::Result<AppConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml));

    build_app_config(builder)
}

fn build_app_config(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<AppConfig> {
    let settings = builder.build().context("Failed to read widget configuration")?;
    let app_config: AppConfig = settings
        .try_deserialize()
        .context("Invalid widget configuration")?;

    validate_widget_ids(&app_config.widgets)?;
    Ok(app_config)
}

fn validate_widget_ids(widgets: &[WidgetConfig]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for widget in widgets {
        if widget.id.trim().is_empty() {
            anyhow::bail!("Widget id must not be empty");
        }
        if !seen.insert(widget.id.as_str()) {
            anyhow::bail!("Duplicate widget id: {}", widget.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_widgets_with_defaults() {
        let config = parse_app_config(
            r##"
            [server]
            listen_addr = "127.0.0.1:9000"

            [[widgets]]
            id = "oslo"
            source_url = "https://www.yr.no/en/content/1-72837/meteogram.svg"
            refresh_interval_ms = 600000

            [widgets.theme]
            overall_background = "#1e1e1e"

            [[widgets]]
            id = "fairway"
            svg_code = "<!-- paste svg -->"
            "##,
        )
        .unwrap();

        assert_eq!(config.server.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.server.fetch_timeout(), Duration::from_secs(30));
        assert!(!config.relay.enabled);
        assert_eq!(config.widgets.len(), 2);

        let oslo = &config.widgets[0];
        assert!(oslo.auto_refresh_enabled);
        assert_eq!(oslo.refresh_period(), Some(Duration::from_millis(600_000)));
        assert_eq!(oslo.theme.overall_background, "#1e1e1e");
        assert_eq!(oslo.theme.main_text_color, ThemeConfig::default().main_text_color);

        let fairway = &config.widgets[1];
        assert_eq!(fairway.source(), GraphSource::Unconfigured);
        assert_eq!(fairway.refresh_period(), None);
    }

    #[test]
    fn test_duplicate_widget_ids_are_rejected() {
        let result = parse_app_config(
            r#"
            [[widgets]]
            id = "a"
            [[widgets]]
            id = "a"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_period_requires_url_and_enabled_flag() {
        let mut config = WidgetConfig::new("w");
        config.refresh_interval_ms = 1000;
        assert_eq!(config.refresh_period(), None);

        config.source_url = "https://example.test/graph".to_string();
        assert_eq!(config.refresh_period(), Some(Duration::from_secs(1)));

        config.auto_refresh_enabled = false;
        assert_eq!(config.refresh_period(), None);
    }

    #[test]
    fn test_theme_change_is_not_a_fetch_change() {
        let base = WidgetConfig::new("w");
        let mut themed = base.clone();
        themed.theme.wind_line_color = "#000000".to_string();
        assert!(!base.fetch_settings_differ(&themed));

        let mut retimed = base.clone();
        retimed.refresh_interval_ms = 5;
        assert!(base.fetch_settings_differ(&retimed));
    }
}
