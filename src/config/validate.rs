use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let errors = collect_errors(cfg, cfg!(debug_assertions));

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

fn collect_errors(cfg: &AppConfig, allow_dev_secrets: bool) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    let auth = &cfg.auth;
    for (name, secret) in [
        ("auth.access_secret", &auth.access_secret),
        ("auth.refresh_secret", &auth.refresh_secret),
        ("auth.email_secret", &auth.email_secret),
    ] {
        if secret.trim().is_empty() {
            errors.push(format!("{name} must not be empty"));
        }
    }

    if auth.access_secret == auth.refresh_secret
        || auth.access_secret == auth.email_secret
        || auth.refresh_secret == auth.email_secret
    {
        errors.push(
            "auth.access_secret, auth.refresh_secret and auth.email_secret must all differ"
                .to_string(),
        );
    }

    if !allow_dev_secrets && auth.uses_dev_secrets() {
        errors.push("built-in development secrets are not allowed in release builds".to_string());
    }

    for (name, ttl) in [
        ("auth.access_ttl_secs", auth.access_ttl_secs),
        ("auth.refresh_ttl_secs", auth.refresh_ttl_secs),
        ("auth.verify_ttl_secs", auth.verify_ttl_secs),
        ("auth.reset_ttl_secs", auth.reset_ttl_secs),
        ("auth.mfa_code_ttl_secs", auth.mfa_code_ttl_secs),
    ] {
        if ttl <= 0 {
            errors.push(format!("{name} must be > 0"));
        }
    }

    if auth.refresh_ttl_secs <= auth.access_ttl_secs {
        errors.push("auth.refresh_ttl_secs must be greater than auth.access_ttl_secs".to_string());
    }

    if auth.mfa_max_attempts == 0 {
        errors.push("auth.mfa_max_attempts must be > 0".to_string());
    }

    if auth.purge_interval_secs == 0 {
        errors.push("auth.purge_interval_secs must be > 0".to_string());
    }

    if let Some(secret) = auth.federation_secret.as_ref()
        && secret.trim().is_empty()
    {
        errors.push("auth.federation_secret must not be empty when set".to_string());
    }

    for (name, url) in [
        ("clients.client_a_url", &cfg.clients.client_a_url),
        ("clients.client_b_url", &cfg.clients.client_b_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{name} must be an http(s) URL"));
        }
    }

    let notifier = &cfg.notifier;
    if notifier.workers == 0 {
        errors.push("notifier.workers must be > 0".to_string());
    }

    if notifier.queue_size == 0 {
        errors.push("notifier.queue_size must be > 0".to_string());
    }

    if notifier.max_attempts == 0 {
        errors.push("notifier.max_attempts must be > 0".to_string());
    }

    if let Some(url) = notifier.webhook_url.as_ref()
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push("notifier.webhook_url must be an http(s) URL".to_string());
    }

    let push = &cfg.push;
    if push.max_connections_per_user == 0 {
        errors.push("push.max_connections_per_user must be > 0".to_string());
    }

    if push.max_message_bytes == 0 {
        errors.push("push.max_message_bytes must be > 0".to_string());
    }

    if push.heartbeat_interval_secs == 0 {
        errors.push("push.heartbeat_interval_secs must be > 0".to_string());
    }

    if push.idle_timeout_secs <= push.heartbeat_interval_secs {
        errors.push(
            "push.idle_timeout_secs must be greater than push.heartbeat_interval_secs".to_string(),
        );
    }

    if push.outbound_queue_size == 0 {
        errors.push("push.outbound_queue_size must be > 0".to_string());
    }

    errors
}
