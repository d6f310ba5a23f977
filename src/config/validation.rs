use crate::config::types::{
    ArcConfig, BookConfig, Config, CrawlerConfig, SourceConfig, UserAgentConfig,
};
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_book_config(&config.book)?;
    validate_arc_config(&config.arcs)?;
    Ok(())
}

/// Validates the source site description
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("start-url", &config.start_url)?;
    validate_http_url("index-url", &config.index_url)?;

    for selector in [
        &config.title_selector,
        &config.content_selector,
        &config.next_selector,
        &config.noise_selector,
    ] {
        parse_selector(selector)?;
    }

    compile_pattern(&config.navigation_link_pattern)?;
    compile_pattern(&config.chapter_number_pattern)?;

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates the output book settings
fn validate_book_config(config: &BookConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("title", &config.title),
        ("author", &config.author),
        ("language", &config.language),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "book {} cannot be empty",
                name
            )));
        }
    }

    if config.output_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates arc classification rules
fn validate_arc_config(config: &ArcConfig) -> Result<(), ConfigError> {
    if config.interlude_label.is_empty() {
        return Err(ConfigError::Validation(
            "interlude_label cannot be empty".to_string(),
        ));
    }

    if config.leading_interlude_arc.is_empty() {
        return Err(ConfigError::Validation(
            "leading_interlude_arc cannot be empty".to_string(),
        ));
    }

    if let Some((title, _)) = config.overrides.iter().find(|(_, label)| label.is_empty()) {
        return Err(ConfigError::Validation(format!(
            "override for '{}' maps to an empty arc label",
            title
        )));
    }

    Ok(())
}

/// Parses a URL and requires an HTTP(S) scheme
fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            name, value
        )));
    }

    Ok(())
}

/// Compiles a CSS selector, mapping failures to a config error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

/// Compiles a regular expression, mapping failures to a config error
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}
