use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known style keys read by the view.
pub mod keys {
    pub const SHAPE: &str = "shape";
    pub const PERIMETER: &str = "perimeter";
    pub const PERIMETER_SPACING: &str = "perimeterSpacing";
    pub const SOURCE_PERIMETER_SPACING: &str = "sourcePerimeterSpacing";
    pub const TARGET_PERIMETER_SPACING: &str = "targetPerimeterSpacing";
    pub const EDGE: &str = "edgeStyle";
    pub const LOOP: &str = "loopStyle";
    pub const NO_EDGE_STYLE: &str = "noEdgeStyle";
    pub const ORTHOGONAL: &str = "orthogonal";
    pub const SOURCE_PORT: &str = "sourcePort";
    pub const TARGET_PORT: &str = "targetPort";
    pub const EXIT_X: &str = "exitX";
    pub const EXIT_Y: &str = "exitY";
    pub const EXIT_PERIMETER: &str = "exitPerimeter";
    pub const ENTRY_X: &str = "entryX";
    pub const ENTRY_Y: &str = "entryY";
    pub const ENTRY_PERIMETER: &str = "entryPerimeter";
    pub const DIRECTION: &str = "direction";
    pub const STROKE_WIDTH: &str = "strokeWidth";
    pub const START_ARROW: &str = "startArrow";
    pub const END_ARROW: &str = "endArrow";
    pub const START_SIZE: &str = "startSize";
    pub const END_SIZE: &str = "endSize";
    pub const SHADOW: &str = "shadow";
    pub const ROTATION: &str = "rotation";
    pub const LABEL_POSITION: &str = "labelPosition";
    pub const VERTICAL_LABEL_POSITION: &str = "verticalLabelPosition";
    pub const OVERFLOW: &str = "overflow";
    pub const FONT_SIZE: &str = "fontSize";
    pub const NO_LABEL: &str = "noLabel";
    pub const SEGMENT: &str = "segment";
}

/// Ordered string attributes of a cell, written as `key=value;key=value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(IndexMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key=value` pairs separated by `;`. Tokens without `=` are ignored.
    pub fn parse(text: &str) -> Self {
        let mut out = Self::new();
        for token in text.split(';') {
            let Some((k, v)) = token.split_once('=') else {
                continue;
            };
            let k = k.trim();
            if k.is_empty() {
                continue;
            }
            out.0.insert(k.to_string(), v.trim().to_string());
        }
        out
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.get_f64(key).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `self` with every entry of `overrides` applied on top. An override of `none` removes the key.
    pub fn merged(&self, overrides: &Style) -> Style {
        let mut out = self.clone();
        for (k, v) in overrides.iter() {
            if v == "none" {
                out.0.shift_remove(k);
            } else {
                out.0.insert(k.to_string(), v.to_string());
            }
        }
        out
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl From<&str> for Style {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
