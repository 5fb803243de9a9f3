use super::schema::Config;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref base_url) = config.service.base_url {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            errors.push("service.base_url: must not be empty".to_string());
        } else if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            errors.push(format!(
                "service.base_url: '{}' must start with http:// or https://",
                base_url
            ));
        }
    }

    match humantime::parse_duration(&config.service.timeout) {
        Ok(d) if d.is_zero() => {
            errors.push("service.timeout: must be greater than zero".to_string());
        }
        Ok(_) => {}
        Err(e) => errors.push(format!(
            "service.timeout: invalid duration '{}' - {}",
            config.service.timeout, e
        )),
    }

    if config.service.retries > 10 {
        errors.push(format!(
            "service.retries: {} is too many (max 10)",
            config.service.retries
        ));
    }

    if config.history.key.trim().is_empty() {
        errors.push("history.key: must not be empty".to_string());
    }

    if let Some(year) = config.pricing.current_year {
        if !(1990..=2100).contains(&year) {
            errors.push(format!(
                "pricing.current_year: {} is outside 1990-2100",
                year
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
