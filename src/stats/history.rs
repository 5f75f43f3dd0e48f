use crate::metric::MetricKind;
use serde::Deserialize;
use std::collections::HashMap;

/// Calendar date parsed from the API's `M/D/YY` keys, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl DateKey {
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('/');
        let month: u8 = parts.next()?.trim().parse().ok()?;
        let day: u8 = parts.next()?.trim().parse().ok()?;
        let year: u16 = parts.next()?.trim().parse().ok()?;
        if parts.next().is_some() || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        let year = if year < 100 { 2000 + year } else { year };
        Some(Self { year, month, day })
    }

    /// Short axis label, e.g. `3/14`
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.day)
    }
}

/// Wire shape of `/historical/all`
#[derive(Debug, Default, Deserialize)]
pub struct RawTimeline {
    #[serde(default)]
    pub cases: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub recovered: HashMap<String, Option<f64>>,
    #[serde(default)]
    pub deaths: HashMap<String, Option<f64>>,
}

/// Worldwide cumulative counts per day, sorted by date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub cases: Vec<(DateKey, u64)>,
    pub recovered: Vec<(DateKey, u64)>,
    pub deaths: Vec<(DateKey, u64)>,
}

fn sorted_series(raw: HashMap<String, Option<f64>>) -> Vec<(DateKey, u64)> {
    let mut series: Vec<_> = raw
        .into_iter()
        .filter_map(|(date, value)| {
            let key = DateKey::parse(&date)?;
            let value = match value {
                Some(v) if v.is_finite() && v > 0.0 => v as u64,
                _ => 0,
            };
            Some((key, value))
        })
        .collect();
    series.sort_unstable_by_key(|&(key, _)| key);
    series
}

impl From<RawTimeline> for Timeline {
    fn from(raw: RawTimeline) -> Self {
        Self {
            cases: sorted_series(raw.cases),
            recovered: sorted_series(raw.recovered),
            deaths: sorted_series(raw.deaths),
        }
    }
}

impl Timeline {
    pub fn series(&self, metric: MetricKind) -> &[(DateKey, u64)] {
        match metric {
            MetricKind::Cases => &self.cases,
            MetricKind::Recovered => &self.recovered,
            MetricKind::Deaths => &self.deaths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty() && self.recovered.is_empty() && self.deaths.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    pub date: DateKey,
    pub value: f64,
}

/// New values per day: each cumulative count minus the previous day's.
/// The first day has no predecessor and is dropped; downward revisions
/// in the upstream data clamp to zero.
pub fn daily_new(timeline: &Timeline, metric: MetricKind) -> Vec<DailyPoint> {
    timeline
        .series(metric)
        .windows(2)
        .map(|pair| DailyPoint {
            date: pair[1].0,
            value: pair[1].1.saturating_sub(pair[0].1) as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, f64)]) -> HashMap<String, Option<f64>> {
        entries.iter().map(|&(d, v)| (d.to_string(), Some(v))).collect()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            DateKey::parse("1/22/20"),
            Some(DateKey { year: 2020, month: 1, day: 22 })
        );
        assert_eq!(DateKey::parse("13/1/20"), None);
        assert_eq!(DateKey::parse("garbage"), None);
        assert_eq!(DateKey::parse("1/2/3/4"), None);
    }

    #[test]
    fn test_series_sorted_across_years() {
        let timeline = Timeline::from(RawTimeline {
            cases: raw(&[("1/1/21", 30.0), ("12/31/20", 20.0), ("12/30/20", 5.0)]),
            ..RawTimeline::default()
        });
        let dates: Vec<_> = timeline.cases.iter().map(|(d, _)| d.label()).collect();
        assert_eq!(dates, ["12/30", "12/31", "1/1"]);
    }

    #[test]
    fn test_daily_new() {
        let timeline = Timeline::from(RawTimeline {
            deaths: raw(&[("3/1/20", 10.0), ("3/2/20", 15.0), ("3/3/20", 14.0), ("3/4/20", 20.0)]),
            ..RawTimeline::default()
        });
        let values: Vec<_> = daily_new(&timeline, MetricKind::Deaths)
            .iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, [5.0, 0.0, 6.0]);
        assert!(daily_new(&timeline, MetricKind::Cases).is_empty());
    }

    #[test]
    fn test_single_point_has_no_deltas() {
        let timeline = Timeline::from(RawTimeline {
            cases: raw(&[("3/1/20", 10.0)]),
            ..RawTimeline::default()
        });
        assert!(daily_new(&timeline, MetricKind::Cases).is_empty());
    }
}
