//! Highlight colour palette.
//!
//! Annotations carry `Option<HighlightColor>`: `None` means "no highlight"
//! (note-only, or cleared). Every styling decision matches exhaustively on the
//! enum so adding a colour forces a decision at each call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The fixed set of highlight colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightColor {
    Yellow,
    Green,
    Blue,
    Pink,
}

impl HighlightColor {
    /// Every colour, in palette order.
    pub const ALL: [HighlightColor; 4] = [
        HighlightColor::Yellow,
        HighlightColor::Green,
        HighlightColor::Blue,
        HighlightColor::Pink,
    ];

    /// Stable lowercase name, used for storage and CSS class suffixes.
    pub fn as_str(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "yellow",
            HighlightColor::Green => "green",
            HighlightColor::Blue => "blue",
            HighlightColor::Pink => "pink",
        }
    }

    /// Background used for the solid block (pure highlight) mode.
    pub fn block_background(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "#fef08a",
            HighlightColor::Green => "#bbf7d0",
            HighlightColor::Blue => "#bfdbfe",
            HighlightColor::Pink => "#fbcfe8",
        }
    }

    /// Stronger background applied when the annotation is active.
    pub fn active_background(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "#fde047",
            HighlightColor::Green => "#86efac",
            HighlightColor::Blue => "#93c5fd",
            HighlightColor::Pink => "#f9a8d4",
        }
    }

    /// Underline colour used when the annotation carries a note.
    pub fn underline(self) -> &'static str {
        match self {
            HighlightColor::Yellow => "#eab308",
            HighlightColor::Green => "#22c55e",
            HighlightColor::Blue => "#3b82f6",
            HighlightColor::Pink => "#ec4899",
        }
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for colour names outside the palette.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown highlight colour: {0:?}")]
pub struct UnknownColor(pub String);

impl FromStr for HighlightColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yellow" => Ok(HighlightColor::Yellow),
            "green" => Ok(HighlightColor::Green),
            "blue" => Ok(HighlightColor::Blue),
            "pink" => Ok(HighlightColor::Pink),
            _ => Err(UnknownColor(s.to_owned())),
        }
    }
}

impl Serialize for HighlightColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HighlightColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<HighlightColor>` where the stored form uses an
/// empty string (or null) for "no colour".
pub mod optional {
    use super::HighlightColor;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        color: &Option<HighlightColor>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(color.map(HighlightColor::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<HighlightColor>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Yellow".parse::<HighlightColor>(), Ok(HighlightColor::Yellow));
        assert_eq!(" pink ".parse::<HighlightColor>(), Ok(HighlightColor::Pink));
        assert!("purple".parse::<HighlightColor>().is_err());
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for color in HighlightColor::ALL {
            assert_eq!(color.as_str().parse::<HighlightColor>(), Ok(color));
        }
    }
}
