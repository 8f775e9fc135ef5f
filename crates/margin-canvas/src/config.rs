//! Canvas configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tool::{Tool, ToolStyle};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Quiet period before a stroke change is written.
    #[serde(rename = "autosaveDebounceMs", with = "millis")]
    pub autosave_debounce: Duration,
    pub pen: ToolStyle,
    pub highlighter: ToolStyle,
    pub eraser: ToolStyle,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: Duration::from_millis(1000),
            pen: ToolStyle::pen(),
            highlighter: ToolStyle::highlighter(),
            eraser: ToolStyle::eraser(),
        }
    }
}

impl CanvasConfig {
    pub fn style_for(&self, tool: Tool) -> &ToolStyle {
        match tool {
            Tool::Pen => &self.pen,
            Tool::Highlighter => &self.highlighter,
            Tool::Eraser => &self.eraser,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.autosave_debounce, Duration::from_secs(1));
        assert_eq!(config.style_for(Tool::Pen).stroke_width, 2.0);
        assert_eq!(config.style_for(Tool::Highlighter).opacity, 0.4);
        assert_eq!(config.style_for(Tool::Eraser).stroke_width, 24.0);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{"autosaveDebounceMs": 250}"#).unwrap();
        assert_eq!(config.autosave_debounce, Duration::from_millis(250));
        assert_eq!(config.pen, ToolStyle::pen());
    }
}
