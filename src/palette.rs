// 🎨 Family Palette - Colors as Data
// Each family owns a base hue and a list of graduated shades, darkest first.
// Sub-products take shades by their rank inside the family.

use crate::classifier::Family;
use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::fmt;

/// Neutral grey for families without a palette entry
pub const DEFAULT_COLOR: Rgb = Rgb::new(0xA0, 0xA0, 0xA0);

/// Overflow shades are interpolated from the lightest listed shade up to here
const OVERFLOW_LIGHTNESS: f64 = 0.90;

/// Smallest lightness gap between neighbouring overflow shades of one band
const MIN_LIGHTNESS_STEP: f64 = 2.0 / 255.0;

/// Hue shift between successive overflow bands, in degrees
const BAND_HUE_SHIFT: f64 = 23.0;

/// Bands after the first are at least this saturated, so greys take the hue
const BAND_MIN_SATURATION: f64 = 0.30;

// ============================================================================
// RGB / HSL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow!("Invalid hex color: {}", hex));
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// (hue degrees, saturation 0-1, lightness 0-1)
    pub fn to_hsl(&self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let delta = max - min;

        if delta == 0.0 {
            return (0.0, 0.0, l);
        }

        let s = delta / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * (((g - b) / delta).rem_euclid(6.0))
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };

        (h, s, l)
    }

    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h_prime = h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());

        let (r1, g1, b1) = match h_prime as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let m = l - c / 2.0;
        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(to_u8(r1), to_u8(g1), to_u8(b1))
    }

    /// Same hue and saturation, different lightness
    pub fn with_lightness(&self, lightness: f64) -> Self {
        let (h, s, _) = self.to_hsl();
        Rgb::from_hsl(h, s, lightness)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ============================================================================
// PALETTES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyPalette {
    pub family: Family,

    /// Darkest (seed / raw stage) to lightest (refined stage); never empty
    pub shades: Vec<Rgb>,
}

impl FamilyPalette {
    pub fn new(family: Family, hexes: &[&str]) -> Result<Self> {
        let shades = hexes
            .iter()
            .map(|h| Rgb::from_hex(h))
            .collect::<Result<Vec<_>>>()?;
        if shades.is_empty() {
            return Err(anyhow!("Palette for {} has no shades", family));
        }
        Ok(FamilyPalette { family, shades })
    }

    pub fn base(&self) -> Rgb {
        self.shades[0]
    }

    /// One distinct shade per sub-product of a family of `family_size`,
    /// indexed by intra-family rank (0 = highest value)
    ///
    /// Listed shades come first. Past them, lightness is spaced evenly between
    /// the last listed shade and `OVERFLOW_LIGHTNESS`, never closer than
    /// `MIN_LIGHTNESS_STEP`. When that range is used up the next band repeats
    /// the lightness ramp at a shifted hue. A shade that still collides after
    /// rounding to 8-bit channels is moved to the next free RGB value.
    pub fn shades_for(&self, family_size: usize) -> Vec<Rgb> {
        let listed = self.shades.len();
        let mut shades: Vec<Rgb> = self.shades.iter().take(family_size).copied().collect();
        let mut taken: HashSet<Rgb> = shades.iter().copied().collect();

        let last = self.shades[listed - 1];
        for candidate in overflow_shades(last, family_size.saturating_sub(listed)) {
            let shade = first_free(candidate, &taken);
            taken.insert(shade);
            shades.push(shade);
        }
        shades
    }
}

/// `count` shades beyond `last`, lighter within a band, hue-shifted per band
fn overflow_shades(last: Rgb, count: usize) -> Vec<Rgb> {
    let (h, s, l_last) = last.to_hsl();
    let target = if l_last < OVERFLOW_LIGHTNESS { OVERFLOW_LIGHTNESS } else { 1.0 };
    let span = target - l_last;

    let per_band = ((span / MIN_LIGHTNESS_STEP).floor() as usize).max(1);
    let band_len = count.min(per_band).max(1);
    let step = span / (band_len as f64 + 1.0);

    (0..count)
        .map(|i| {
            let band = i / band_len;
            let lightness = l_last + step * ((i % band_len) as f64 + 1.0);
            if band == 0 {
                last.with_lightness(lightness)
            } else {
                let hue = h + BAND_HUE_SHIFT * band as f64;
                Rgb::from_hsl(hue, s.max(BAND_MIN_SATURATION), lightness)
            }
        })
        .collect()
}

/// `color`, or the next packed 24-bit value not yet in `taken`
fn first_free(mut color: Rgb, taken: &HashSet<Rgb>) -> Rgb {
    while taken.contains(&color) {
        let packed = (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b);
        let next = (packed + 1) & 0x00FF_FFFF;
        color = Rgb::new((next >> 16) as u8, (next >> 8) as u8, next as u8);
    }
    color
}

/// Immutable palette configuration handed to the ranker
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    families: Vec<FamilyPalette>,
    fallback: Rgb,
}

impl ColorPalette {
    /// Cognitive palette: warm for oilseed, blue for wheat, green for barley,
    /// earth for pulses, purple for potash
    pub fn standard() -> Self {
        let entries: [(Family, &[&str]); 8] = [
            (Family::CanolaComplex, &["#C62828", "#EF6C00", "#FFB300", "#FFD600"]),
            (Family::WheatComplex, &["#0D47A1", "#1565C0", "#1E88E5", "#42A5F5"]),
            (Family::BarleyFamily, &["#1B5E20", "#2E7D32", "#43A047", "#81C784"]),
            (Family::PulsesComplex, &["#795548", "#F9A825", "#CDDC39", "#E6EE9C"]),
            (Family::Potash, &["#4A148C", "#7B1FA2", "#9C27B0", "#BA68C8"]),
            (Family::WoodPulp, &["#3E2723", "#5D4037", "#8D6E63"]),
            (Family::SoyaBeans, &["#006064", "#00838F", "#00BCD4", "#80DEEA"]),
            (Family::Others, &["#616161", "#757575", "#A0A0A0", "#BDBDBD"]),
        ];

        let families = entries
            .iter()
            .filter_map(|(family, hexes)| FamilyPalette::new(*family, hexes).ok())
            .collect();

        ColorPalette {
            families,
            fallback: DEFAULT_COLOR,
        }
    }

    pub fn from_families(families: Vec<FamilyPalette>) -> Self {
        ColorPalette {
            families,
            fallback: DEFAULT_COLOR,
        }
    }

    pub fn family(&self, family: Family) -> Option<&FamilyPalette> {
        self.families.iter().find(|p| p.family == family)
    }

    pub fn base_color(&self, family: Family) -> Rgb {
        self.family(family).map(|p| p.base()).unwrap_or(self.fallback)
    }

    /// Shades for every sub-product of `family`, by intra-family rank.
    /// A family without a palette ramps up from the fallback grey.
    pub fn shades_for(&self, family: Family, family_size: usize) -> Vec<Rgb> {
        match self.family(family) {
            Some(palette) => palette.shades_for(family_size),
            None => FamilyPalette {
                family,
                shades: vec![self.fallback],
            }
            .shades_for(family_size),
        }
    }

    /// Color for the sub-product ranked `index` (0-based) inside `family`
    pub fn color_for(&self, family: Family, index: usize, family_size: usize) -> Rgb {
        self.shades_for(family, family_size.max(index + 1))[index]
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// TESTS
// ============================================================================
