//! Remote endpoints, overridable through the environment (or a `.env` file).
//!
//! | variable              | default                                                  |
//! |-----------------------|----------------------------------------------------------|
//! | `SOV_SPREADS_URL`     | worldgovernmentbonds.com spread table                    |
//! | `SOV_RATINGS_URL`     | worldgovernmentbonds.com credit ratings table            |
//! | `SOV_FLAG_CDN`        | `https://flagcdn.com/h40/{code}.png`                     |
//! | `SOV_WORLDBANK_API`   | `https://api.worldbank.org/v2`                           |

pub const DEFAULT_SPREADS_URL: &str = "https://www.worldgovernmentbonds.com/spread-historical-data/";
pub const DEFAULT_RATINGS_URL: &str = "https://www.worldgovernmentbonds.com/world-credit-ratings/";
/// `{code}` is replaced by the lower-case ISO 3166 alpha-2 code.
pub const DEFAULT_FLAG_CDN: &str = "https://flagcdn.com/h40/{code}.png";
pub const DEFAULT_WORLDBANK_API: &str = "https://api.worldbank.org/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub spreads_url: String,
    pub ratings_url: String,
    pub flag_cdn: String,
    pub worldbank_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            spreads_url: DEFAULT_SPREADS_URL.to_string(),
            ratings_url: DEFAULT_RATINGS_URL.to_string(),
            flag_cdn: DEFAULT_FLAG_CDN.to_string(),
            worldbank_api: DEFAULT_WORLDBANK_API.to_string(),
        }
    }
}

impl Endpoints {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };
        Self {
            spreads_url: pick("SOV_SPREADS_URL", defaults.spreads_url),
            ratings_url: pick("SOV_RATINGS_URL", defaults.ratings_url),
            flag_cdn: pick("SOV_FLAG_CDN", defaults.flag_cdn),
            worldbank_api: pick("SOV_WORLDBANK_API", defaults.worldbank_api),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_defaults_and_blanks_are_ignored() {
        let endpoints = Endpoints::from_lookup(|key| match key {
            "SOV_RATINGS_URL" => Some("http://localhost:8080/ratings".to_string()),
            "SOV_FLAG_CDN" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(endpoints.ratings_url, "http://localhost:8080/ratings");
        assert_eq!(endpoints.spreads_url, DEFAULT_SPREADS_URL);
        assert_eq!(endpoints.flag_cdn, DEFAULT_FLAG_CDN);
    }
}
