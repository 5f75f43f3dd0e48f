mod fetcher;

pub use fetcher::{FetchEvent, Fetcher};

use crate::stats::{CountryStat, RawRecord, RawTimeline, Summary, Timeline};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://disease.sh/v3/covid-19";

/// Blocking client for the disease.sh statistics API
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("covid-map/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Worldwide totals
    pub fn fetch_all(&self) -> Result<Summary> {
        let raw: RawRecord = self.get_json("/all")?;
        Ok(Summary::from(&raw))
    }

    /// Every country, in API order
    pub fn fetch_countries(&self) -> Result<Vec<CountryStat>> {
        let raw: Vec<RawRecord> = self.get_json("/countries")?;
        Ok(raw.into_iter().map(CountryStat::from).collect())
    }

    /// A single country by ISO code or name
    pub fn fetch_country(&self, key: &str) -> Result<CountryStat> {
        let raw: RawRecord = self.get_json(&country_path(key))?;
        Ok(CountryStat::from(raw))
    }

    /// Worldwide cumulative timeline for the last `days` days
    pub fn fetch_history(&self, days: u32) -> Result<Timeline> {
        let raw: RawTimeline = self.get_json(&format!("/historical/all?lastdays={days}"))?;
        Ok(Timeline::from(raw))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;

        let mut body = response
            .bytes()
            .with_context(|| format!("failed to read body from {url}"))?
            .to_vec();
        debug!(%url, bytes = body.len(), "response");

        simd_json::serde::from_slice(&mut body).with_context(|| format!("invalid JSON from {url}"))
    }
}

/// Path of a single country; names with spaces need escaping
fn country_path(key: &str) -> String {
    format!("/countries/{}", urlencoding::encode(key))
}

/// Parse a `/countries` body, exposed for tests and benches
pub fn parse_countries(body: &mut [u8]) -> Result<Vec<CountryStat>> {
    let raw: Vec<RawRecord> = simd_json::serde::from_slice(body)?;
    Ok(raw.into_iter().map(CountryStat::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTRIES: &str = r#"[
        {"updated": 1, "country": "Afghanistan",
         "countryInfo": {"_id": 4, "iso2": "AF", "iso3": "AFG", "lat": 33, "long": 65,
                         "flag": "https://disease.sh/assets/img/flags/af.png"},
         "cases": 230000, "todayCases": 12, "deaths": 7900, "todayDeaths": 0,
         "recovered": 211000, "todayRecovered": null, "casesPerOneMillion": 5600.5},
        {"country": "MS Zaandam",
         "countryInfo": {"_id": null, "iso2": null, "lat": 0, "long": 0,
                         "flag": "https://disease.sh/assets/img/flags/unknown.png"},
         "cases": 9, "deaths": 2}
    ]"#;

    #[test]
    fn test_parse_countries() {
        let mut body = COUNTRIES.as_bytes().to_vec();
        let countries = parse_countries(&mut body).unwrap();

        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].key(), "AF");
        assert_eq!(countries[0].lat, 33.0);
        assert_eq!(countries[0].counts.recovered, 211_000);
        assert_eq!(countries[0].counts.today_recovered, 0);
        assert_eq!(countries[1].key(), "MS Zaandam");
        assert_eq!(countries[1].counts.recovered, 0);
    }

    #[test]
    fn test_country_path_escaped() {
        assert_eq!(country_path("US"), "/countries/US");
        assert_eq!(country_path("MS Zaandam"), "/countries/MS%20Zaandam");
        assert_eq!(country_path("Côte"), "/countries/C%C3%B4te");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = Client::new("http://localhost:1/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:1");
    }
}
