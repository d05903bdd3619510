//! Flag icons for the chart labels.
//!
//! Icons live in a local directory as `<iso2>.png`. When downloads are enabled,
//! missing icons are fetched once from a PNG flag CDN. A country without an
//! icon is labelled with its upper-cased ISO code instead.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use log::{debug, info, warn};
use reqwest::blocking::Client;

use crate::data::http::{build_client, get_bytes};
use crate::error::AppError;

/// Country name (as written in the merged table) to ISO 3166 alpha-2 code.
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("Australia", "au"),
    ("Austria", "at"),
    ("Bahrain", "bh"),
    ("Bangladesh", "bd"),
    ("Belgium", "be"),
    ("Bolivia", "bo"),
    ("Bosnia and Herzegovina", "ba"),
    ("Botswana", "bw"),
    ("Brazil", "br"),
    ("Bulgaria", "bg"),
    ("Canada", "ca"),
    ("Chile", "cl"),
    ("China", "cn"),
    ("Colombia", "co"),
    ("Croatia", "hr"),
    ("Cyprus", "cy"),
    ("Czech Republic", "cz"),
    ("Denmark", "dk"),
    ("Egypt", "eg"),
    ("Finland", "fi"),
    ("France", "fr"),
    ("Germany", "de"),
    ("Greece", "gr"),
    ("Hong Kong", "hk"),
    ("Hungary", "hu"),
    ("Iceland", "is"),
    ("India", "in"),
    ("Indonesia", "id"),
    ("Ireland", "ie"),
    ("Israel", "il"),
    ("Italy", "it"),
    ("Japan", "jp"),
    ("Jordan", "jo"),
    ("Kazakhstan", "kz"),
    ("Kenya", "ke"),
    ("Lithuania", "lt"),
    ("Malaysia", "my"),
    ("Malta", "mt"),
    ("Mauritius", "mu"),
    ("Mexico", "mx"),
    ("Morocco", "ma"),
    ("Namibia", "na"),
    ("Netherlands", "nl"),
    ("New Zealand", "nz"),
    ("Nigeria", "ng"),
    ("Norway", "no"),
    ("Pakistan", "pk"),
    ("Peru", "pe"),
    ("Philippines", "ph"),
    ("Poland", "pl"),
    ("Portugal", "pt"),
    ("Qatar", "qa"),
    ("Romania", "ro"),
    ("Russia", "ru"),
    ("Serbia", "rs"),
    ("Singapore", "sg"),
    ("Slovakia", "sk"),
    ("Slovenia", "si"),
    ("South Africa", "za"),
    ("South Korea", "kr"),
    ("Spain", "es"),
    ("Sri Lanka", "lk"),
    ("Sweden", "se"),
    ("Switzerland", "ch"),
    ("Taiwan", "tw"),
    ("Turkey", "tr"),
    ("Uganda", "ug"),
    ("Ukraine", "ua"),
    ("United Kingdom", "gb"),
    ("United States", "us"),
    ("Vietnam", "vn"),
    ("Zambia", "zm"),
];

/// ISO code for `country`; unknown names fall back to their first two letters.
pub fn country_code(country: &str) -> String {
    let name = country.trim();
    if let Some(&(_, code)) = COUNTRY_CODES.iter().find(|(c, _)| c.eq_ignore_ascii_case(name)) {
        return code.to_string();
    }
    name.chars()
        .filter(|c| c.is_alphabetic())
        .take(2)
        .collect::<String>()
        .to_lowercase()
}

/// An icon scaled to the label height, as a packed RGB buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagIcon {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Decode a PNG and scale it to `height` pixels, keeping the aspect ratio.
/// Transparent pixels are composited over white.
pub fn decode_icon(bytes: &[u8], height: u32) -> Result<FlagIcon, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    if img.height() == 0 || img.width() == 0 {
        return Err("empty image".to_string());
    }
    let height = height.max(1);
    let width = ((img.width() as f64 * height as f64 / img.height() as f64).round() as u32).max(1);
    let rgba = img.resize_exact(width, height, FilterType::Triangle).to_rgba8();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for px in rgba.pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as f32 / 255.0;
        for c in [r, g, b] {
            rgb.push((c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
        }
    }
    Ok(FlagIcon { width, height, rgb })
}

pub struct FlagCache {
    dir: PathBuf,
    cdn: String,
    height: u32,
    client: Option<Client>,
    icons: HashMap<String, Option<FlagIcon>>,
}

impl FlagCache {
    /// `cdn` is a URL template containing `{code}`. With `download` false the
    /// cache only reads what is already in `dir`.
    pub fn new(dir: &Path, cdn: &str, download: bool, height: u32) -> Result<Self, AppError> {
        let client = if download { Some(build_client()?) } else { None };
        Ok(Self {
            dir: dir.to_path_buf(),
            cdn: cdn.to_string(),
            height,
            client,
            icons: HashMap::new(),
        })
    }

    pub fn icon_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{code}.png"))
    }

    /// Download every missing icon for `codes`; returns how many were fetched.
    pub fn prefetch<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> usize {
        let Some(client) = &self.client else {
            return 0;
        };
        let mut missing: Vec<&str> = codes
            .into_iter()
            .filter(|code| !self.icon_path(code).exists())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if missing.is_empty() {
            debug!("All flag icons already present in {}", self.dir.display());
            return 0;
        }

        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!("Cannot create flag directory {}: {e}", self.dir.display());
            return 0;
        }
        info!("Downloading {} missing flag icon(s)", missing.len());

        let mut fetched = 0;
        for code in &missing {
            let url = self.cdn.replace("{code}", code);
            let saved = get_bytes(client, &url).and_then(|bytes| {
                fs::write(self.icon_path(code), bytes)
                    .map_err(|e| AppError::input(format!("Failed to save flag '{code}': {e}")))
            });
            match saved {
                Ok(()) => fetched += 1,
                Err(e) => warn!("No flag for '{code}': {e}"),
            }
        }
        info!("Downloaded {fetched} of {} missing flag icons", missing.len());
        fetched
    }

    /// Icon for `code`, decoded once and memoized. `None` means "draw the code".
    pub fn icon(&mut self, code: &str) -> Option<&FlagIcon> {
        if !self.icons.contains_key(code) {
            let icon = self.load(code);
            self.icons.insert(code.to_string(), icon);
        }
        self.icons.get(code).and_then(Option::as_ref)
    }

    fn load(&self, code: &str) -> Option<FlagIcon> {
        let path = self.icon_path(code);
        let bytes = fs::read(&path).ok()?;
        match decode_icon(&bytes, self.height) {
            Ok(icon) => Some(icon),
            Err(e) => {
                warn!("Unreadable flag icon {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(px));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn known_and_fallback_codes() {
        assert_eq!(country_code("Germany"), "de");
        assert_eq!(country_code("united kingdom"), "gb");
        assert_eq!(country_code("Ukraine"), "ua");
        assert_eq!(country_code("Atlantis"), "at");
    }

    #[test]
    fn icon_is_scaled_to_height() {
        let icon = decode_icon(&png(40, 20, [255, 0, 0, 255]), 10).unwrap();
        assert_eq!((icon.width, icon.height), (20, 10));
        assert_eq!(icon.rgb.len(), 20 * 10 * 3);
        assert_eq!(&icon.rgb[..3], &[255, 0, 0]);
    }

    #[test]
    fn transparency_becomes_white() {
        let icon = decode_icon(&png(4, 4, [0, 0, 0, 0]), 4).unwrap();
        assert!(icon.rgb.iter().all(|&c| c == 255));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_icon(b"not a png", 24).is_err());
    }

    #[test]
    fn missing_icons_without_download_fall_back() {
        let mut cache = FlagCache::new(Path::new("/nonexistent-flag-dir"), "", false, 24).unwrap();
        assert_eq!(cache.prefetch(["de"]), 0);
        assert!(cache.icon("de").is_none());
    }
}
