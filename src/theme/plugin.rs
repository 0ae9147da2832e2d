//! Theme registration and output rendering.
//!
//! Each registered theme becomes one class-scoped block of custom properties
//! (`.dark { --twc-blue-50: 226 57% 21%; }`). The framework side refers to
//! those properties through the color map from [`ThemePlugin::render_tailwind_colors`],
//! so switching the class on the document root switches every color.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{standard_themes, ColorTable, NamedTheme, ShadeMapping, Token};
use crate::config::ThemeConfig;
use crate::error::ThemeError;

/// Output produced by `stockroom theme`.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeFormat {
    /// Custom-property stylesheet.
    #[default]
    Css,
    /// Framework color map pointing at the custom properties.
    Tailwind,
    /// Raw theme values keyed by theme name.
    Json,
}

impl ThemeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Tailwind => "tailwind",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for ThemeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "tailwind" => Ok(Self::Tailwind),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown theme format `{other}` (expected css, tailwind, or json)"
            )),
        }
    }
}

/// Registry of named themes plus rendering settings.
#[derive(Debug, Clone)]
pub struct ThemePlugin {
    prefix: String,
    default_theme: Option<String>,
    themes: Vec<NamedTheme>,
}

impl ThemePlugin {
    /// Empty registry. `prefix` names the custom properties (`--<prefix>-…`).
    pub fn new(prefix: &str) -> Self {
        let prefix = prefix.trim().trim_start_matches('-');
        Self {
            prefix: if prefix.is_empty() {
                "twc".to_string()
            } else {
                prefix.to_string()
            },
            default_theme: None,
            themes: Vec::new(),
        }
    }

    /// Standard light/dark themes over `table`, with the `[theme]` settings
    /// and overrides applied.
    pub fn from_config(config: &ThemeConfig, table: &ColorTable) -> Result<Self, ThemeError> {
        let mut plugin = Self::new(&config.prefix).with_default_theme(&config.default_theme);
        for theme in standard_themes(table, &ShadeMapping::standard()) {
            plugin.register(theme);
        }
        plugin.apply_overrides(&config.overrides)?;
        Ok(plugin)
    }

    /// Theme whose block also applies at `:root`.
    pub fn with_default_theme(mut self, name: &str) -> Self {
        let name = normalize_theme_name(name);
        self.default_theme = (!name.is_empty()).then_some(name);
        self
    }

    /// Register a theme, replacing one with the same name.
    pub fn register(&mut self, theme: NamedTheme) {
        if let Some(existing) = self.themes.iter_mut().find(|t| t.name == theme.name) {
            *existing = theme;
        } else {
            self.themes.push(theme);
        }
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&NamedTheme> {
        let name = normalize_theme_name(name);
        self.themes.iter().find(|t| t.name == name)
    }

    /// Apply `[theme.overrides.<name>]` tables.
    ///
    /// Unknown theme names start from a copy of the `light` theme.
    pub fn apply_overrides(
        &mut self,
        overrides: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<(), ThemeError> {
        for (name, values) in overrides {
            let name = normalize_theme_name(name);
            if name.is_empty() {
                continue;
            }
            let mut theme = match self.get(&name).or_else(|| self.get("light")) {
                Some(base) => base.clone(),
                None => continue,
            };
            theme.name = name;
            for (key, value) in values {
                let token =
                    Token::from_key(key).ok_or_else(|| ThemeError::UnknownToken(key.clone()))?;
                parse_hex(value)?;
                theme.set(&token, value.trim().to_ascii_lowercase());
            }
            self.register(theme);
        }
        Ok(())
    }

    pub fn render(&self, format: ThemeFormat) -> Result<String, ThemeError> {
        match format {
            ThemeFormat::Css => self.render_css(),
            ThemeFormat::Tailwind => Ok(pretty(&self.render_tailwind_colors())),
            ThemeFormat::Json => Ok(pretty(&self.render_json())),
        }
    }

    /// One rule per theme with `color-scheme` and HSL channel properties.
    pub fn render_css(&self) -> Result<String, ThemeError> {
        let mut css = String::new();
        for theme in &self.themes {
            let _ = writeln!(css, "{} {{", self.selector(theme));
            let _ = writeln!(css, "  color-scheme: {};", theme.scheme.as_str());
            for (token, value) in theme.tokens() {
                let value = value.ok_or_else(|| ThemeError::MissingToken {
                    theme: theme.name.clone(),
                    token: token.key(),
                })?;
                let (r, g, b) = parse_hex(value)?;
                let _ = writeln!(
                    css,
                    "  {}: {};",
                    self.property(&token),
                    hsl_channels(r, g, b)
                );
            }
            css.push_str("}\n");
        }
        Ok(css)
    }

    /// Color map for the framework config: every token resolves through
    /// its custom property so opacity modifiers keep working.
    pub fn render_tailwind_colors(&self) -> Value {
        let mut colors = Map::new();
        let tokens = self
            .themes
            .first()
            .map(|theme| theme.tokens())
            .unwrap_or_default();
        for (token, _) in tokens {
            let reference = format!("hsl(var({}) / <alpha-value>)", self.property(&token));
            match token {
                Token::Slot(color, shade) => {
                    let entry = colors
                        .entry(color.name().to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(shades) = entry {
                        shades.insert(shade.key().to_string(), Value::String(reference));
                    }
                }
                Token::White | Token::Black => {
                    colors.insert(token.key(), Value::String(reference));
                }
            }
        }
        Value::Object(colors)
    }

    /// Raw values per theme. Undefined slots render as `null`.
    pub fn render_json(&self) -> Value {
        let mut root = Map::new();
        for theme in &self.themes {
            let mut colors = Map::new();
            for (token, value) in theme.tokens() {
                let value = value.map_or(Value::Null, |v| json!(v));
                match token {
                    Token::Slot(color, shade) => {
                        let entry = colors
                            .entry(color.name().to_string())
                            .or_insert_with(|| Value::Object(Map::new()));
                        if let Value::Object(shades) = entry {
                            shades.insert(shade.key().to_string(), value);
                        }
                    }
                    Token::White | Token::Black => {
                        colors.insert(token.key(), value);
                    }
                }
            }
            root.insert(theme.name.clone(), Value::Object(colors));
        }
        Value::Object(root)
    }

    fn selector(&self, theme: &NamedTheme) -> String {
        let scoped = format!(".{0}, [data-theme=\"{0}\"]", theme.name);
        if self.default_theme.as_deref() == Some(theme.name.as_str()) {
            format!(":root, {scoped}")
        } else {
            scoped
        }
    }

    fn property(&self, token: &Token) -> String {
        format!("--{}-{}", self.prefix, token.key())
    }
}

fn pretty(value: &Value) -> String {
    // A Value built from maps and strings always serializes.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn normalize_theme_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Parse `#rrggbb` or `#rgb` into channels.
pub fn parse_hex(input: &str) -> Result<(u8, u8, u8), ThemeError> {
    let invalid = || ThemeError::InvalidColor(input.to_string());
    let hex = input.trim().strip_prefix('#').ok_or_else(invalid)?;
    let digits = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(invalid)?;
    match digits.as_slice() {
        &[r, g, b] => Ok((r * 17, g * 17, b * 17)),
        &[r1, r2, g1, g2, b1, b2] => Ok((r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
        _ => Err(invalid()),
    }
}

/// Space-separated `h s% l%` channels, one decimal at most.
fn hsl_channels(r: u8, g: u8, b: u8) -> String {
    let (r, g, b) = (
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let delta = max - min;

    let (hue, saturation) = if delta == 0.0 {
        (0.0, 0.0)
    } else {
        let saturation = if lightness > 0.5 {
            delta / (2.0 - max - min)
        } else {
            delta / (max + min)
        };
        let sector = if max == r {
            (g - b) / delta + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / delta + 2.0
        } else {
            (r - g) / delta + 4.0
        };
        (sector * 60.0, saturation)
    };

    format!(
        "{} {}% {}%",
        one_decimal(hue),
        one_decimal(saturation * 100.0),
        one_decimal(lightness * 100.0)
    )
}

fn one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{standard_themes, BaseColor, ColorScheme, ColorTable, Shade, ShadeMapping};

    fn standard_plugin() -> ThemePlugin {
        ThemePlugin::from_config(&ThemeConfig::default(), &ColorTable::tailwind()).unwrap()
    }

    #[test]
    fn hsl_matches_known_values() {
        assert_eq!(hsl_channels(0xff, 0xff, 0xff), "0 0% 100%");
        assert_eq!(hsl_channels(0, 0, 0), "0 0% 0%");
        assert_eq!(hsl_channels(0xff, 0, 0), "0 100% 50%");
        assert_eq!(hsl_channels(0x3b, 0x82, 0xf6), "217.2 91.2% 59.8%");
    }

    #[test]
    fn parse_hex_accepts_long_and_short_forms_only() {
        assert_eq!(parse_hex("#010203").unwrap(), (1, 2, 3));
        assert_eq!(parse_hex("#FFF").unwrap(), (255, 255, 255));
        assert_eq!(parse_hex("#0a8").unwrap(), (0, 170, 136));
        assert!(parse_hex("#ffff").is_err());
        assert!(parse_hex("yellow").is_err());
        assert!(parse_hex("#gg0000").is_err());
        assert!(parse_hex("rgb(1, 2, 3)").is_err());
    }

    #[test]
    fn multibyte_values_are_rejected_not_sliced() {
        assert!(matches!(
            parse_hex("#a\u{e9}aaa"),
            Err(ThemeError::InvalidColor(v)) if v == "#a\u{e9}aaa"
        ));
        let mut plugin = standard_plugin();
        let overrides = BTreeMap::from([(
            "dark".to_string(),
            BTreeMap::from([("blue-50".to_string(), "#a\u{e9}aaa".to_string())]),
        )]);
        assert!(matches!(
            plugin.apply_overrides(&overrides),
            Err(ThemeError::InvalidColor(_))
        ));
    }

    #[test]
    fn css_scopes_each_theme_by_class() {
        let css = standard_plugin().render_css().unwrap();
        assert!(css.contains(":root, .light, [data-theme=\"light\"] {"));
        assert!(css.contains(".dark, [data-theme=\"dark\"] {"));
        assert!(css.contains("color-scheme: dark;"));
        // light blue-500 is the table value; dark blue-500 reads blue-400.
        assert!(css.contains("--twc-blue-500: 217.2 91.2% 59.8%;"));
        assert!(css.contains("--twc-white: 0 0% 100%;"));
    }

    #[test]
    fn css_accepts_short_hex_from_a_custom_table() {
        let mut table = ColorTable::tailwind();
        table.insert(BaseColor::Blue, Shade::S50, "#fff");
        let plugin = ThemePlugin::from_config(&ThemeConfig::default(), &table).unwrap();
        let css = plugin.render_css().unwrap();
        assert!(css.contains("--twc-blue-50: 0 0% 100%;"));

        table.insert(BaseColor::Blue, Shade::S50, "rgb(255, 255, 255)");
        let plugin = ThemePlugin::from_config(&ThemeConfig::default(), &table).unwrap();
        assert!(matches!(
            plugin.render_css(),
            Err(ThemeError::InvalidColor(v)) if v.starts_with("rgb(")
        ));
    }

    #[test]
    fn css_fails_on_undefined_token() {
        let mut plugin = ThemePlugin::new("twc");
        let mut table = ColorTable::empty();
        table.insert(BaseColor::Gray, Shade::S50, "#f9fafb");
        for theme in standard_themes(&table, &ShadeMapping::standard()) {
            plugin.register(theme);
        }
        let err = plugin.render_css().unwrap_err();
        assert!(matches!(err, ThemeError::MissingToken { .. }), "got: {err}");
    }

    #[test]
    fn tailwind_colors_reference_custom_properties() {
        let colors = standard_plugin().render_tailwind_colors();
        assert_eq!(
            colors["indigo"]["300"],
            "hsl(var(--twc-indigo-300) / <alpha-value>)"
        );
        assert_eq!(colors["black"], "hsl(var(--twc-black) / <alpha-value>)");
    }

    #[test]
    fn json_lists_raw_values_per_theme() {
        let value = standard_plugin().render_json();
        assert_eq!(value["light"]["gray"]["50"], "#f9fafb");
        assert_eq!(value["dark"]["gray"]["50"], "#111827");
        assert_eq!(value["dark"]["white"], "#030712");
    }

    #[test]
    fn overrides_patch_existing_and_create_new_themes() {
        let mut plugin = standard_plugin();
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "Dark".to_string(),
            BTreeMap::from([("blue-50".to_string(), "#AABBCC".to_string())]),
        );
        overrides.insert(
            "sepia".to_string(),
            BTreeMap::from([("white".to_string(), "#f4ecd8".to_string())]),
        );
        plugin.apply_overrides(&overrides).unwrap();

        let dark = plugin.get("dark").unwrap();
        assert_eq!(dark.palette.get(BaseColor::Blue, Shade::S50), Some("#aabbcc"));
        let sepia = plugin.get("sepia").unwrap();
        assert_eq!(sepia.white.as_deref(), Some("#f4ecd8"));
        assert_eq!(sepia.scheme, ColorScheme::Light);
        assert_eq!(plugin.names(), vec!["light", "dark", "sepia"]);
    }

    #[test]
    fn overrides_reject_unknown_tokens_and_bad_colors() {
        let mut plugin = standard_plugin();
        let bad_token = BTreeMap::from([(
            "light".to_string(),
            BTreeMap::from([("teal-50".to_string(), "#000000".to_string())]),
        )]);
        assert_eq!(
            plugin.apply_overrides(&bad_token).unwrap_err(),
            ThemeError::UnknownToken("teal-50".into())
        );
        let bad_color = BTreeMap::from([(
            "light".to_string(),
            BTreeMap::from([("red-50".to_string(), "red".to_string())]),
        )]);
        assert!(plugin.apply_overrides(&bad_color).is_err());
    }

    #[test]
    fn config_prefix_and_default_theme_shape_the_css() {
        let config = ThemeConfig {
            prefix: "--brand".to_string(),
            default_theme: "Dark".to_string(),
            ..ThemeConfig::default()
        };
        let css = ThemePlugin::from_config(&config, &ColorTable::tailwind())
            .unwrap()
            .render_css()
            .unwrap();
        assert!(css.contains(":root, .dark, [data-theme=\"dark\"] {"));
        assert!(css.contains(".light, [data-theme=\"light\"] {"));
        assert!(!css.contains(":root, .light"));
        assert!(css.contains("--brand-gray-50:"));
    }

    #[test]
    fn theme_format_parses() {
        assert_eq!("CSS".parse::<ThemeFormat>().unwrap(), ThemeFormat::Css);
        assert!("yaml".parse::<ThemeFormat>().is_err());
    }
}
