//! Light/dark palette generation.
//!
//! Palettes are derived from a base color table by reading every
//! (color, shade) slot either at its own shade (light) or at the mirrored
//! shade from [`ShadeMapping`] (dark). The results are registered with a
//! [`ThemePlugin`] that renders class-scoped custom properties.

mod plugin;
mod tailwind;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

pub use plugin::{parse_hex, ThemeFormat, ThemePlugin};
pub use tailwind::ColorTable;

/// Base colors the palettes cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseColor {
    Gray,
    Red,
    Yellow,
    Green,
    Blue,
    Indigo,
    Purple,
    Pink,
}

impl BaseColor {
    pub const ALL: [BaseColor; 8] = [
        Self::Gray,
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Indigo,
        Self::Purple,
        Self::Pink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Purple => "purple",
            Self::Pink => "pink",
        }
    }

    pub fn from_name(name: &str) -> Option<BaseColor> {
        let normalized = name.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|c| c.name() == normalized)
    }
}

impl fmt::Display for BaseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lightness level of a color, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shade {
    S50,
    S100,
    S200,
    S300,
    S400,
    S500,
    S600,
    S700,
    S800,
    S900,
    /// Only present in color tables; not a palette slot.
    S950,
}

impl Shade {
    /// Shades every palette defines.
    pub const NOMINAL: [Shade; 10] = [
        Self::S50,
        Self::S100,
        Self::S200,
        Self::S300,
        Self::S400,
        Self::S500,
        Self::S600,
        Self::S700,
        Self::S800,
        Self::S900,
    ];

    pub const ALL: [Shade; 11] = [
        Self::S50,
        Self::S100,
        Self::S200,
        Self::S300,
        Self::S400,
        Self::S500,
        Self::S600,
        Self::S700,
        Self::S800,
        Self::S900,
        Self::S950,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::S50 => "50",
            Self::S100 => "100",
            Self::S200 => "200",
            Self::S300 => "300",
            Self::S400 => "400",
            Self::S500 => "500",
            Self::S600 => "600",
            Self::S700 => "700",
            Self::S800 => "800",
            Self::S900 => "900",
            Self::S950 => "950",
        }
    }

    pub fn from_key(key: &str) -> Option<Shade> {
        let key = key.trim();
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }
}

impl fmt::Display for Shade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Shade {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Nominal shade -> substituted shade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadeMapping {
    pairs: BTreeMap<Shade, Shade>,
}

impl ShadeMapping {
    /// Mirror table: 50<->900, 100<->800, ..., 400<->500.
    pub fn standard() -> Self {
        let pairs = Shade::NOMINAL
            .iter()
            .zip(Shade::NOMINAL.iter().rev())
            .map(|(&from, &to)| (from, to))
            .collect();
        Self { pairs }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Shade, Shade)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, shade: Shade) -> Option<Shade> {
        self.pairs.get(&shade).copied()
    }

    /// Nominal keys, lightest first.
    pub fn keys(&self) -> impl Iterator<Item = Shade> + '_ {
        self.pairs.keys().copied()
    }

    /// True when applying the mapping twice returns every key unchanged.
    pub fn is_involution(&self) -> bool {
        self.pairs
            .iter()
            .all(|(from, to)| self.get(*to) == Some(*from))
    }
}

impl Default for ShadeMapping {
    fn default() -> Self {
        Self::standard()
    }
}

/// color -> shade -> value. `None` marks a slot the table could not fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Palette {
    colors: BTreeMap<BaseColor, BTreeMap<Shade, Option<String>>>,
}

impl Palette {
    pub fn get(&self, color: BaseColor, shade: Shade) -> Option<&str> {
        self.colors
            .get(&color)
            .and_then(|shades| shades.get(&shade))
            .and_then(|value| value.as_deref())
    }

    /// True when `(color, shade)` is a slot, filled or not.
    pub fn has_slot(&self, color: BaseColor, shade: Shade) -> bool {
        self.colors
            .get(&color)
            .is_some_and(|shades| shades.contains_key(&shade))
    }

    fn set(&mut self, color: BaseColor, shade: Shade, value: Option<String>) {
        self.colors.entry(color).or_default().insert(shade, value);
    }

    /// Every slot in color then shade order.
    pub fn slots(&self) -> impl Iterator<Item = (BaseColor, Shade, Option<&str>)> + '_ {
        self.colors.iter().flat_map(|(&color, shades)| {
            shades
                .iter()
                .map(move |(&shade, value)| (color, shade, value.as_deref()))
        })
    }
}

/// Read every base color at each mapping key. With `invert`, read at the
/// mapped shade instead of the key itself.
pub fn build_palette(table: &ColorTable, mapping: &ShadeMapping, invert: bool) -> Palette {
    let mut palette = Palette::default();
    for color in BaseColor::ALL {
        for key in mapping.keys() {
            let source = if invert { mapping.get(key) } else { Some(key) };
            let value = source.and_then(|shade| table.get(color, shade).map(str::to_string));
            palette.set(color, key, value);
        }
    }
    palette
}

/// Light and dark palettes derived from one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePair {
    pub light: Palette,
    pub dark: Palette,
}

/// Derive both palettes. Pure: same inputs, same output.
pub fn build_theme(table: &ColorTable, mapping: &ShadeMapping) -> ThemePair {
    ThemePair {
        light: build_palette(table, mapping, false),
        dark: build_palette(table, mapping, true),
    }
}

/// Whether a theme targets a light or dark UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Addressable theme value: one palette slot or a named extra.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Token {
    Slot(BaseColor, Shade),
    White,
    Black,
}

impl Token {
    /// Config/CSS key: `blue-50`, `white`, `black`.
    pub fn key(&self) -> String {
        match self {
            Self::Slot(color, shade) => format!("{color}-{shade}"),
            Self::White => "white".to_string(),
            Self::Black => "black".to_string(),
        }
    }

    pub fn from_key(key: &str) -> Option<Token> {
        let normalized = key.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "white" => return Some(Self::White),
            "black" => return Some(Self::Black),
            _ => {}
        }
        let (color, shade) = normalized.rsplit_once('-')?;
        let color = BaseColor::from_name(color)?;
        let shade = Shade::from_key(shade)?;
        Shade::NOMINAL
            .contains(&shade)
            .then_some(Self::Slot(color, shade))
    }
}

/// A palette plus its `white`/`black` overrides, under a theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTheme {
    pub name: String,
    pub scheme: ColorScheme,
    pub palette: Palette,
    pub white: Option<String>,
    pub black: Option<String>,
}

impl NamedTheme {
    pub fn get(&self, token: &Token) -> Option<&str> {
        match token {
            Token::Slot(color, shade) => self.palette.get(*color, *shade),
            Token::White => self.white.as_deref(),
            Token::Black => self.black.as_deref(),
        }
    }

    /// Every token in render order: palette slots, then white, then black.
    pub fn tokens(&self) -> Vec<(Token, Option<&str>)> {
        let mut tokens: Vec<(Token, Option<&str>)> = self
            .palette
            .slots()
            .map(|(color, shade, value)| (Token::Slot(color, shade), value))
            .collect();
        tokens.push((Token::White, self.white.as_deref()));
        tokens.push((Token::Black, self.black.as_deref()));
        tokens
    }

    fn set(&mut self, token: &Token, value: String) {
        match token {
            Token::Slot(color, shade) => self.palette.set(*color, *shade, Some(value)),
            Token::White => self.white = Some(value),
            Token::Black => self.black = Some(value),
        }
    }
}

/// The standard light and dark themes with their fixed overrides.
///
/// Light keeps pure white/black. Dark swaps them for the table's
/// near-black (`gray-950`) and near-white (`gray-50`).
pub fn standard_themes(table: &ColorTable, mapping: &ShadeMapping) -> [NamedTheme; 2] {
    let pair = build_theme(table, mapping);
    [
        NamedTheme {
            name: "light".to_string(),
            scheme: ColorScheme::Light,
            palette: pair.light,
            white: Some("#ffffff".to_string()),
            black: Some("#000000".to_string()),
        },
        NamedTheme {
            name: "dark".to_string(),
            scheme: ColorScheme::Dark,
            palette: pair.dark,
            white: table.get(BaseColor::Gray, Shade::S950).map(str::to_string),
            black: table.get(BaseColor::Gray, Shade::S50).map(str::to_string),
        },
    ]
}
