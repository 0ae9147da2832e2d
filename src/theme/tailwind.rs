//! Base color tables.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{BaseColor, Shade};
use crate::error::ThemeError;

/// Tailwind v3 default palette, shades 50 through 950.
const TAILWIND_COLORS: [(BaseColor, [&str; 11]); 8] = [
    (
        BaseColor::Gray,
        [
            "#f9fafb", "#f3f4f6", "#e5e7eb", "#d1d5db", "#9ca3af", "#6b7280", "#4b5563",
            "#374151", "#1f2937", "#111827", "#030712",
        ],
    ),
    (
        BaseColor::Red,
        [
            "#fef2f2", "#fee2e2", "#fecaca", "#fca5a5", "#f87171", "#ef4444", "#dc2626",
            "#b91c1c", "#991b1b", "#7f1d1d", "#450a0a",
        ],
    ),
    (
        BaseColor::Yellow,
        [
            "#fefce8", "#fef9c3", "#fef08a", "#fde047", "#facc15", "#eab308", "#ca8a04",
            "#a16207", "#854d0e", "#713f12", "#422006",
        ],
    ),
    (
        BaseColor::Green,
        [
            "#f0fdf4", "#dcfce7", "#bbf7d0", "#86efac", "#4ade80", "#22c55e", "#16a34a",
            "#15803d", "#166534", "#14532d", "#052e16",
        ],
    ),
    (
        BaseColor::Blue,
        [
            "#eff6ff", "#dbeafe", "#bfdbfe", "#93c5fd", "#60a5fa", "#3b82f6", "#2563eb",
            "#1d4ed8", "#1e40af", "#1e3a8a", "#172554",
        ],
    ),
    (
        BaseColor::Indigo,
        [
            "#eef2ff", "#e0e7ff", "#c7d2fe", "#a5b4fc", "#818cf8", "#6366f1", "#4f46e5",
            "#4338ca", "#3730a3", "#312e81", "#1e1b4b",
        ],
    ),
    (
        BaseColor::Purple,
        [
            "#faf5ff", "#f3e8ff", "#e9d5ff", "#d8b4fe", "#c084fc", "#a855f7", "#9333ea",
            "#7e22ce", "#6b21a8", "#581c87", "#3b0764",
        ],
    ),
    (
        BaseColor::Pink,
        [
            "#fdf2f8", "#fce7f3", "#fbcfe8", "#f9a8d4", "#f472b6", "#ec4899", "#db2777",
            "#be185d", "#9d174d", "#831843", "#500724",
        ],
    ),
];

/// color -> shade -> CSS color value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    entries: BTreeMap<BaseColor, BTreeMap<Shade, String>>,
}

impl ColorTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in Tailwind palette for every [`BaseColor`].
    pub fn tailwind() -> Self {
        let mut table = Self::empty();
        for (color, values) in TAILWIND_COLORS {
            for (shade, value) in Shade::ALL.into_iter().zip(values) {
                table.insert(color, shade, value);
            }
        }
        table
    }

    /// Parse a `{ "<color>": { "<shade>": "<value>" } }` document, such as
    /// an exported framework color module.
    ///
    /// Colors and shades outside the known sets are ignored, as are
    /// non-object color entries (`"white": "#fff"`).
    pub fn from_json(text: &str) -> Result<Self, ThemeError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| ThemeError::InvalidTable(e.to_string()))?;
        let Value::Object(colors) = root else {
            return Err(ThemeError::InvalidTable(
                "top-level value must be an object".to_string(),
            ));
        };
        let mut table = Self::empty();
        for (name, shades) in &colors {
            let (Some(color), Value::Object(shades)) = (BaseColor::from_name(name), shades) else {
                continue;
            };
            for (key, value) in shades {
                let Some(shade) = Shade::from_key(key) else {
                    continue;
                };
                let Value::String(value) = value else {
                    return Err(ThemeError::InvalidTable(format!(
                        "{name}.{key} must be a string"
                    )));
                };
                table.insert(color, shade, value);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, color: BaseColor, shade: Shade, value: &str) {
        self.entries
            .entry(color)
            .or_default()
            .insert(shade, value.to_string());
    }

    pub fn get(&self, color: BaseColor, shade: Shade) -> Option<&str> {
        self.entries
            .get(&color)
            .and_then(|shades| shades.get(&shade))
            .map(String::as_str)
    }
}
