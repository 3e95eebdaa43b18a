//! Inline style values.
//!
//! Only the properties the layout model understands are represented: the
//! block height and the height transition.

use std::fmt;
use std::str::FromStr;

/// A CSS-like length for the `height` property.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Length {
    /// Size to content.
    #[default]
    Auto,
    /// A fixed number of pixels.
    Px(f32),
}

impl Length {
    /// Get the pixel value, if this is a fixed length.
    pub fn px(self) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Px(value) => Some(value),
        }
    }

    /// Check if this length sizes to content.
    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Px(value) => write!(f, "{value}px"),
        }
    }
}

/// Error returned when a length string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid length '{0}'")]
pub struct ParseLengthError(String);

impl FromStr for Length {
    type Err = ParseLengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
        number
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Self::Px)
            .ok_or_else(|| ParseLengthError(s.to_string()))
    }
}

/// The inline style of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    /// Explicit block height.
    pub height: Length,
    /// Height transition; `None` defers to the stylesheet.
    pub transition: Option<String>,
}

impl InlineStyle {
    /// The transition value that disables animation.
    pub const TRANSITION_NONE: &'static str = "none";

    /// Check if the inline transition explicitly disables animation.
    pub fn transition_disabled(&self) -> bool {
        self.transition.as_deref() == Some(Self::TRANSITION_NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths() {
        assert_eq!("auto".parse::<Length>(), Ok(Length::Auto));
        assert_eq!("0".parse::<Length>(), Ok(Length::Px(0.0)));
        assert_eq!("12.5px".parse::<Length>(), Ok(Length::Px(12.5)));
        assert_eq!(" 40 px".parse::<Length>(), Ok(Length::Px(40.0)));
        assert!("tall".parse::<Length>().is_err());
        assert!("NaNpx".parse::<Length>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Length::Auto.to_string(), "auto");
        assert_eq!(Length::Px(64.0).to_string(), "64px");
    }

    #[test]
    fn test_transition_disabled() {
        let mut style = InlineStyle::default();
        assert!(!style.transition_disabled());
        style.transition = Some("none".to_string());
        assert!(style.transition_disabled());
    }
}
