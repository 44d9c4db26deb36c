//! Provider configuration

use crate::error::{Error, Result};
use crate::state::{get_optional_string_attr, DynamicValue};

pub const DEFAULT_API_URL: &str = "https://api.runscope.com";
pub const ACCESS_TOKEN_ENV: &str = "RUNSCOPE_ACCESS_TOKEN";
pub const API_URL_ENV: &str = "RUNSCOPE_API_URL";

/// Settings from the provider block
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Bearer token for the Runscope API
    pub access_token: String,

    /// API base URL, no trailing slash
    pub api_url: String,
}

impl ProviderConfig {
    /// Build from the provider block, falling back to the process environment.
    pub fn from_value(value: &DynamicValue) -> Result<Self> {
        Self::from_value_with_env(value, |key| std::env::var(key).ok())
    }

    pub fn from_value_with_env<F>(value: &DynamicValue, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = get_optional_string_attr(value, "access_token")
            .or_else(|| env(ACCESS_TOKEN_ENV).filter(|s| !s.is_empty()))
            .ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "access_token must be set in the provider block or via {}",
                    ACCESS_TOKEN_ENV
                ))
            })?;

        let api_url = get_optional_string_attr(value, "api_url")
            .or_else(|| env(API_URL_ENV).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_url = api_url.trim_end_matches('/').to_string();
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "api_url must be an http(s) URL, got {:?}",
                api_url
            )));
        }

        Ok(Self {
            access_token,
            api_url,
        })
    }
}
