use crate::error::{FilterError, Result};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// Key selecting the language of built-in response texts.
pub const LOCALE_KEY: &str = "EXCEPTION_FILTER_LOCALE";

/// Key overriding the detail text of conflict responses.
pub const CONFLICT_DETAIL_KEY: &str = "EXCEPTION_FILTER_CONFLICT_DETAIL";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a service seeded from the process environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// Language used for the localized texts of a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    pub fn conflict_detail(self) -> &'static str {
        match self {
            Locale::En => "The resource already exists.",
            Locale::Fr => "La ressource existe déjà.",
        }
    }
}

/// Options for [`ApiExceptionFilter`](crate::exception::http::ApiExceptionFilter)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub locale: Locale,
    pub conflict_detail: Option<String>,
}

impl FilterOptions {
    /// Read options from a [`ConfigService`]
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns [`FilterError::InvalidConfig`] when the locale is not recognised.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let locale = match config.get(LOCALE_KEY) {
            Some(raw) => Locale::from_str(raw.trim())
                .map_err(|_| FilterError::invalid_config(LOCALE_KEY, raw))?,
            None => Locale::default(),
        };

        let conflict_detail = config
            .get(CONFLICT_DETAIL_KEY)
            .filter(|detail| !detail.trim().is_empty());

        Ok(Self {
            locale,
            conflict_detail,
        })
    }

    /// Detail text attached to conflict responses
    pub fn conflict_detail(&self) -> &str {
        self.conflict_detail
            .as_deref()
            .unwrap_or_else(|| self.locale.conflict_detail())
    }
}
