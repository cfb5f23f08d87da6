//! Compiled extraction hint tables
//!
//! The `[extraction]` config section lists `{element, class}` hints for the
//! publish date and the article body. They are compiled once into selector
//! groups; scraper yields matches in document order, so the first element
//! matching any hint wins.

use crate::config::{ElementHint, ExtractionConfig};
use crate::ConfigError;
use scraper::Selector;

/// Selectors used by the page parser
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    date: Option<Selector>,
    content: Option<Selector>,
}

impl ExtractionRules {
    /// Compiles the hint tables from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionRules)` - All hints compiled
    /// * `Err(ConfigError::InvalidHint)` - A hint is empty or not a valid name
    pub fn compile(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            date: compile_hints(&config.date_hints)?,
            content: compile_hints(&config.content_hints)?,
        })
    }

    /// Selector group for publish date elements, if any hints are configured
    pub fn date_selector(&self) -> Option<&Selector> {
        self.date.as_ref()
    }

    /// Selector group for the main content element, if any hints are configured
    pub fn content_selector(&self) -> Option<&Selector> {
        self.content.as_ref()
    }
}

fn compile_hints(hints: &[ElementHint]) -> Result<Option<Selector>, ConfigError> {
    if hints.is_empty() {
        return Ok(None);
    }

    let group = hints
        .iter()
        .map(hint_to_css)
        .collect::<Result<Vec<_>, _>>()?
        .join(", ");

    Selector::parse(&group)
        .map(Some)
        .map_err(|e| ConfigError::InvalidHint(format!("{}: {:?}", group, e)))
}

/// Renders one hint as a compound CSS selector, e.g. `div.post-content`
fn hint_to_css(hint: &ElementHint) -> Result<String, ConfigError> {
    let element = hint.element.as_deref().map(str::trim);
    let class = hint.class.as_deref().map(str::trim);

    let mut css = String::new();
    match element {
        Some(name) if is_css_ident(name) => css.push_str(&name.to_ascii_lowercase()),
        Some(name) => {
            return Err(ConfigError::InvalidHint(format!(
                "invalid element name '{}'",
                name
            )))
        }
        None => {}
    }

    match class {
        Some(name) if is_css_ident(name) => {
            css.push('.');
            css.push_str(name);
        }
        Some(name) => {
            return Err(ConfigError::InvalidHint(format!(
                "invalid class name '{}'",
                name
            )))
        }
        None => {}
    }

    if css.is_empty() {
        return Err(ConfigError::InvalidHint(
            "a hint needs an element, a class, or both".to_string(),
        ));
    }

    Ok(css)
}

fn is_css_ident(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
