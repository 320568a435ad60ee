//! API server configuration.

use std::time::Duration;

use regdesk_core::auth::jwt::DEFAULT_TOKEN_TTL;
use regdesk_core::clients::DEFAULT_MAX_LIMIT;
use thiserror::Error;
use url::Url;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:5000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Session token lifetime.
    pub jwt_expires_in: Duration,
    /// S3 bucket for uploaded files.
    pub s3_bucket: String,
    /// AWS region of the bucket.
    pub aws_region: String,
    /// Custom S3-compatible endpoint (MinIO etc.).
    pub aws_endpoint: Option<String>,
    /// Overrides the public URL base derived from bucket and region.
    pub public_file_base_url: Option<String>,
    /// Allowed CORS origin.
    pub frontend_url: String,
    /// Upper bound on the `limit` query parameter.
    pub max_page_limit: u32,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable               | Default                              |
    /// |------------------------|--------------------------------------|
    /// | `BIND_ADDR`            | `0.0.0.0:5000`                       |
    /// | `DATABASE_URL`         | `postgres://localhost:5432/regdesk`  |
    /// | `JWT_SECRET`           | required                             |
    /// | `JWT_EXPIRES_IN`       | `7d`                                 |
    /// | `AWS_S3_BUCKET_NAME`   | required                             |
    /// | `AWS_REGION`           | `us-east-1`                          |
    /// | `AWS_ENDPOINT`         | unset                                |
    /// | `PUBLIC_FILE_BASE_URL` | unset                                |
    /// | `FRONTEND_URL`         | `http://localhost:3000`              |
    /// | `MAX_PAGE_LIMIT`       | `100`                                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_expires_in = match var("JWT_EXPIRES_IN") {
            Some(raw) => parse_duration(&raw).map_err(|reason| ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                reason,
            })?,
            None => DEFAULT_TOKEN_TTL,
        };
        let max_page_limit = match var("MAX_PAGE_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: "MAX_PAGE_LIMIT",
                    reason: format!("expected a positive integer, got '{raw}'"),
                })?,
            None => DEFAULT_MAX_LIMIT,
        };

        let frontend_url = var("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".into());
        validate_url("FRONTEND_URL", &frontend_url)?;
        let aws_endpoint = var("AWS_ENDPOINT");
        if let Some(endpoint) = &aws_endpoint {
            validate_url("AWS_ENDPOINT", endpoint)?;
        }
        let public_file_base_url = var("PUBLIC_FILE_BASE_URL");
        if let Some(base) = &public_file_base_url {
            validate_url("PUBLIC_FILE_BASE_URL", base)?;
        }

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:5000".into()),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/regdesk".into()),
            jwt_secret,
            jwt_expires_in,
            s3_bucket: var("AWS_S3_BUCKET_NAME").ok_or(ConfigError::Missing("AWS_S3_BUCKET_NAME"))?,
            aws_region: var("AWS_REGION").unwrap_or_else(|| "us-east-1".into()),
            aws_endpoint,
            public_file_base_url,
            frontend_url,
            max_page_limit,
        })
    }

    /// Public URL base for stored uploads.
    pub fn public_file_base(&self) -> String {
        match &self.public_file_base_url {
            Some(base) => base.clone(),
            None => regdesk_core::uploads::s3_public_base(&self.s3_bucket, &self.aws_region),
        }
    }
}

fn validate_url(name: &'static str, raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("{e}: '{raw}'"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(())
}

/// Parse a token lifetime: a bare number of seconds, or humantime syntax
/// such as `7d`, `12h`, `30m`.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let duration = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => humantime::parse_duration(raw).map_err(|e| e.to_string())?,
    };
    if duration.is_zero() {
        return Err("duration must be greater than zero".into());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = ApiConfig::from_lookup(lookup(&[("AWS_S3_BUCKET_NAME", "b")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "  "), ("AWS_S3_BUCKET_NAME", "b")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn defaults_are_applied() {
        let cfg =
            ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("AWS_S3_BUCKET_NAME", "b")]))
                .unwrap();
        assert_eq!(cfg.jwt_expires_in, DEFAULT_TOKEN_TTL);
        assert_eq!(cfg.aws_region, "us-east-1");
        assert_eq!(cfg.max_page_limit, 100);
        assert_eq!(cfg.frontend_url, "http://localhost:3000");
        assert_eq!(cfg.public_file_base(), "https://b.s3.us-east-1.amazonaws.com");
    }

    #[test]
    fn overrides_are_read() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("AWS_S3_BUCKET_NAME", "b"),
            ("JWT_EXPIRES_IN", "12h"),
            ("MAX_PAGE_LIMIT", "25"),
            ("PUBLIC_FILE_BASE_URL", "http://localhost:9000/b"),
        ]))
        .unwrap();
        assert_eq!(cfg.jwt_expires_in, Duration::from_secs(12 * 3600));
        assert_eq!(cfg.max_page_limit, 25);
        assert_eq!(cfg.public_file_base(), "http://localhost:9000/b");
    }

    #[test]
    fn malformed_urls_are_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("AWS_S3_BUCKET_NAME", "b"),
            ("FRONTEND_URL", "localhost:3000"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "FRONTEND_URL", .. }));

        let err = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("AWS_S3_BUCKET_NAME", "b"),
            ("AWS_ENDPOINT", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AWS_ENDPOINT", .. }));
    }

    #[test]
    fn parse_duration_accepts_seconds_and_humantime() {
        assert_eq!(parse_duration("3600").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(7 * 86400));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("soon").is_err());
    }
}
