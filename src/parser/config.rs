//! Per-request parse configuration

use serde::{Deserialize, Serialize};

use super::error::ParseError;

pub const DEFAULT_MAX_PROCESSORS: usize = 2;
pub const DEFAULT_FOOTER_MARGIN: u32 = 10;
pub const DEFAULT_HEADER_MARGIN: u32 = 10;
pub const DEFAULT_TOLERANCE: u32 = 20;

/// Extraction settings for one request
///
/// Immutable once built; every work unit receives its own clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Upper bound on work units per request
    pub max_processors: usize,
    /// Band at the bottom of each page excluded from text (points)
    pub footer_margin: u32,
    /// Band at the top of each page excluded from text (points)
    pub header_margin: u32,
    /// Drop text blocks lying over raster images
    pub no_image_text: bool,
    /// Largest edge gap (points) at which table regions are merged
    pub tolerance: u32,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_processors: DEFAULT_MAX_PROCESSORS,
            footer_margin: DEFAULT_FOOTER_MARGIN,
            header_margin: DEFAULT_HEADER_MARGIN,
            no_image_text: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ParseConfig {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.max_processors == 0 {
            return Err(ParseError::InvalidConfig(
                "Number of processors must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Apply request overrides; any field present in `overrides` wins
    pub fn merged_with(&self, overrides: &ParseOverrides) -> ParseConfig {
        ParseConfig {
            max_processors: overrides.max_processors.unwrap_or(self.max_processors),
            footer_margin: overrides.footer_margin.unwrap_or(self.footer_margin),
            header_margin: overrides.header_margin.unwrap_or(self.header_margin),
            no_image_text: overrides.no_image_text.unwrap_or(self.no_image_text),
            tolerance: overrides.tolerance.unwrap_or(self.tolerance),
        }
    }
}

/// Optional request-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOverrides {
    pub max_processors: Option<usize>,
    pub footer_margin: Option<u32>,
    pub header_margin: Option<u32>,
    pub no_image_text: Option<bool>,
    pub tolerance: Option<u32>,
}

impl ParseOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParseConfig::default();
        assert_eq!(config.max_processors, 2);
        assert_eq!(config.footer_margin, 10);
        assert_eq!(config.header_margin, 10);
        assert!(!config.no_image_text);
        assert_eq!(config.tolerance, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_override_wins_field_by_field() {
        let defaults = ParseConfig::default();
        let overrides = ParseOverrides {
            tolerance: Some(5),
            no_image_text: Some(true),
            ..Default::default()
        };

        let merged = defaults.merged_with(&overrides);
        assert_eq!(merged.tolerance, 5);
        assert!(merged.no_image_text);
        assert_eq!(merged.footer_margin, defaults.footer_margin);
        assert_eq!(merged.header_margin, defaults.header_margin);
        assert_eq!(merged.max_processors, defaults.max_processors);
    }

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let overrides = ParseOverrides::default();
        assert!(overrides.is_empty());
        assert_eq!(ParseConfig::default().merged_with(&overrides), ParseConfig::default());
    }

    #[test]
    fn test_zero_processors_rejected() {
        let config = ParseConfig {
            max_processors: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ParseError::InvalidConfig(_))));
    }
}
