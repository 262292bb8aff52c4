use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct Config {
    pub holiday_api_key: String,
    pub holiday_base_url: String,
    pub holiday_path: String,
    pub holiday_country: String,
    pub holiday_year: i32,
    pub giphy_api_key: String,
    pub giphy_base_url: String,
    pub giphy_search_path: String,
    pub gif_country_token: String,
    pub cache_path: PathBuf,
    pub index_path: PathBuf,
    pub bind_addr: String,
    pub upstream_timeout_secs: u64,
}

/// Fallback credentials file, keyed the way the deployed `auth/credentials.json` is.
#[derive(Debug, Default, Deserialize)]
struct Credentials {
    holiday_apikey: Option<String>,
    giphy_apikey: Option<String>,
}

impl Credentials {
    fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid credentials file {}: {}", path.display(), e))
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let credentials_path = env::var("CREDENTIALS_PATH")
            .unwrap_or_else(|_| "./auth/credentials.json".to_string());
        let credentials = Credentials::load(Path::new(&credentials_path))?;

        Ok(Config {
            holiday_api_key: env::var("HOLIDAY_API_KEY")
                .ok()
                .or(credentials.holiday_apikey)
                .ok_or_else(|| anyhow::anyhow!("HOLIDAY_API_KEY not set"))?,
            holiday_base_url: env::var("HOLIDAY_BASE_URL")
                .unwrap_or_else(|_| "https://holidayapi.com".to_string()),
            holiday_path: env::var("HOLIDAY_PATH").unwrap_or_else(|_| "/v1/holidays".to_string()),
            holiday_country: env::var("HOLIDAY_COUNTRY").unwrap_or_else(|_| "BD".to_string()),
            holiday_year: match env::var("HOLIDAY_YEAR") {
                Ok(year) => year
                    .parse()
                    .map_err(|_| anyhow::anyhow!("HOLIDAY_YEAR is not a year: {}", year))?,
                Err(_) => 2021,
            },
            giphy_api_key: env::var("GIPHY_API_KEY")
                .ok()
                .or(credentials.giphy_apikey)
                .ok_or_else(|| anyhow::anyhow!("GIPHY_API_KEY not set"))?,
            giphy_base_url: env::var("GIPHY_BASE_URL")
                .unwrap_or_else(|_| "https://api.giphy.com".to_string()),
            giphy_search_path: env::var("GIPHY_SEARCH_PATH")
                .unwrap_or_else(|_| "/v1/gifs/search".to_string()),
            gif_country_token: env::var("GIF_COUNTRY_TOKEN")
                .unwrap_or_else(|_| "Bangladesh".to_string()),
            cache_path: env::var("CACHE_PATH")
                .unwrap_or_else(|_| "./cache/BD_holiday_data.json".to_string())
                .into(),
            index_path: env::var("INDEX_PATH")
                .unwrap_or_else(|_| "./html/index.html".to_string())
                .into(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            upstream_timeout_secs: match env::var("UPSTREAM_TIMEOUT_SECS") {
                Ok(secs) => secs.parse().map_err(|_| {
                    anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS is not a number: {}", secs)
                })?,
                Err(_) => 30,
            },
        })
    }

    pub fn holiday_url(&self) -> String {
        format!("{}{}", self.holiday_base_url, self.holiday_path)
    }

    pub fn giphy_search_url(&self) -> String {
        format!("{}{}", self.giphy_base_url, self.giphy_search_path)
    }
}

#[cfg(test)]
pub(crate) fn test_config(upstream_base: &str, cache_path: PathBuf) -> Config {
    Config {
        holiday_api_key: "holiday-key".to_string(),
        holiday_base_url: upstream_base.to_string(),
        holiday_path: "/v1/holidays".to_string(),
        holiday_country: "BD".to_string(),
        holiday_year: 2021,
        giphy_api_key: "giphy-key".to_string(),
        giphy_base_url: upstream_base.to_string(),
        giphy_search_path: "/v1/gifs/search".to_string(),
        gif_country_token: "Bangladesh".to_string(),
        cache_path,
        index_path: PathBuf::from("./html/index.html"),
        bind_addr: "127.0.0.1:0".to_string(),
        upstream_timeout_secs: 5,
    }
}
