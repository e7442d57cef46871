//! HTTP request handlers organized by resource

pub mod handle_health;
pub mod handle_movies;
pub mod handle_search;
pub mod handle_series;
pub mod handle_stream;

use serde::Deserialize;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Default, Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

impl LanguageQuery {
    pub fn language(&self) -> &str {
        resolve_language(self.language.as_deref())
    }
}

pub(crate) fn resolve_language(language: Option<&str>) -> &str {
    language
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE)
}
