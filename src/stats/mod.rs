mod history;

pub use history::{daily_new, DailyPoint, DateKey, RawTimeline, Timeline};

use serde::Deserialize;

/// Case, recovery and death counters, both cumulative and for today.
/// Used for the worldwide summary and embedded in every country record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub cases: u64,
    pub today_cases: u64,
    pub recovered: u64,
    pub today_recovered: u64,
    pub deaths: u64,
    pub today_deaths: u64,
}

/// One country's statistics, normalized from the API record
#[derive(Debug, Clone, PartialEq)]
pub struct CountryStat {
    pub country_name: String,
    /// ISO 3166 alpha-2 code, missing for ships and some territories
    pub iso_code: Option<String>,
    pub lat: f64,
    pub long: f64,
    pub flag_url: String,
    pub counts: Summary,
}

impl CountryStat {
    /// Key used to select this country and to query it from the API.
    /// The API accepts the country name where no ISO code exists.
    pub fn key(&self) -> &str {
        self.iso_code.as_deref().unwrap_or(&self.country_name)
    }
}

/// Wire shape shared by `/all`, `/countries` and `/countries/{key}`.
/// Every field is optional; upstream data is partial for some territories.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub country: Option<String>,
    pub country_info: Option<RawCountryInfo>,
    pub cases: Option<f64>,
    pub today_cases: Option<f64>,
    pub recovered: Option<f64>,
    pub today_recovered: Option<f64>,
    pub deaths: Option<f64>,
    pub today_deaths: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCountryInfo {
    pub iso2: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub flag: Option<String>,
}

/// Missing, negative and non-finite counts all become zero
fn count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v as u64,
        _ => 0,
    }
}

impl From<&RawRecord> for Summary {
    fn from(raw: &RawRecord) -> Self {
        Self {
            cases: count(raw.cases),
            today_cases: count(raw.today_cases),
            recovered: count(raw.recovered),
            today_recovered: count(raw.today_recovered),
            deaths: count(raw.deaths),
            today_deaths: count(raw.today_deaths),
        }
    }
}

impl From<RawRecord> for CountryStat {
    fn from(raw: RawRecord) -> Self {
        let counts = Summary::from(&raw);
        let info = raw.country_info.unwrap_or_default();
        Self {
            country_name: raw.country.unwrap_or_else(|| "Unknown".to_string()),
            iso_code: info.iso2.filter(|code| !code.is_empty()),
            lat: info.lat.filter(|v| v.is_finite()).unwrap_or(0.0),
            long: info.long.filter(|v| v.is_finite()).unwrap_or(0.0),
            flag_url: info.flag.unwrap_or_default(),
            counts,
        }
    }
}

/// Order countries by total cases, highest first, leaving the input as is.
/// Equal counts are ordered by country name so the table never flickers.
pub fn rank(records: &[CountryStat]) -> Vec<CountryStat> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        b.counts
            .cases
            .cmp(&a.counts.cases)
            .then_with(|| a.country_name.cmp(&b.country_name))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(name: &str, cases: u64) -> CountryStat {
        CountryStat {
            country_name: name.to_string(),
            iso_code: Some(name[..2].to_uppercase()),
            lat: 0.0,
            long: 0.0,
            flag_url: String::new(),
            counts: Summary {
                cases,
                ..Summary::default()
            },
        }
    }

    /// splitmix64, enough to shuffle test fixtures deterministically
    fn next_rand(state: &mut u64) -> u64 {
        *state = state.wrapping_add(0x9e3779b97f4a7c15);
        let mut x = *state;
        x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
        x ^ (x >> 31)
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_rank_descending_and_non_destructive() {
        let input = vec![country("France", 10), country("India", 300), country("Chile", 42)];
        let ranked = rank(&input);

        let names: Vec<_> = ranked.iter().map(|c| c.country_name.as_str()).collect();
        assert_eq!(names, ["India", "Chile", "France"]);
        assert_eq!(input[0].country_name, "France");
    }

    #[test]
    fn test_rank_ties_by_name() {
        let input = vec![country("Peru", 5), country("Chad", 5), country("Mali", 9)];
        let names: Vec<_> = rank(&input).into_iter().map(|c| c.country_name).collect();
        assert_eq!(names, ["Mali", "Chad", "Peru"]);
    }

    #[test]
    fn test_rank_preserves_multiset() {
        let mut state = 7;
        let input: Vec<_> = (0..200)
            .map(|i| country(&format!("Country {i}"), next_rand(&mut state) % 50))
            .collect();
        let ranked = rank(&input);

        assert_eq!(ranked.len(), input.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].counts.cases >= pair[1].counts.cases);
        }

        let mut a: Vec<_> = input.iter().map(|c| c.country_name.clone()).collect();
        let mut b: Vec<_> = ranked.iter().map(|c| c.country_name.clone()).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_partial_record() {
        let raw = RawRecord {
            country: Some("Diamond Princess".to_string()),
            country_info: Some(RawCountryInfo {
                iso2: None,
                lat: Some(35.4437),
                long: Some(139.638),
                flag: None,
            }),
            cases: Some(712.0),
            today_cases: None,
            recovered: Some(-3.0),
            deaths: Some(f64::INFINITY),
            ..RawRecord::default()
        };
        let stat = CountryStat::from(raw);

        assert_eq!(stat.key(), "Diamond Princess");
        assert_eq!(stat.counts.cases, 712);
        assert_eq!(stat.counts.today_cases, 0);
        assert_eq!(stat.counts.recovered, 0);
        assert_eq!(stat.counts.deaths, 0);
        assert_eq!(stat.lat, 35.4437);
    }

    #[test]
    fn test_key_prefers_iso() {
        let stat = country("Germany", 1);
        assert_eq!(stat.key(), "GE");
    }
}
