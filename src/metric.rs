use crate::stats::{CountryStat, Summary};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("unknown metric `{0}` (expected cases, recovered or deaths)")]
    UnknownMetric(String),
}

/// The statistic driving the info cards, marker size and chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricKind {
    #[default]
    Cases,
    Recovered,
    Deaths,
}

/// Display color and marker scale for one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStyle {
    pub color: &'static str,
    pub scale_factor: f64,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Cases, MetricKind::Recovered, MetricKind::Deaths];

    pub fn style(self) -> MetricStyle {
        match self {
            MetricKind::Cases => MetricStyle {
                color: "#CC1034",
                scale_factor: 800.0,
            },
            MetricKind::Recovered => MetricStyle {
                color: "#7dd71d",
                scale_factor: 1200.0,
            },
            MetricKind::Deaths => MetricStyle {
                color: "#fb4443",
                scale_factor: 2000.0,
            },
        }
    }

    /// Marker radius in meters: sqrt of the count times the metric's scale.
    /// Negative and NaN values count as zero.
    pub fn marker_radius(self, value: f64) -> f64 {
        value.max(0.0).sqrt() * self.style().scale_factor
    }

    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Cases => "cases",
            MetricKind::Recovered => "recovered",
            MetricKind::Deaths => "deaths",
        }
    }

    /// Title of the info card for this metric
    pub fn title(self) -> &'static str {
        match self {
            MetricKind::Cases => "Coronavirus Cases",
            MetricKind::Recovered => "Recovered",
            MetricKind::Deaths => "Deaths",
        }
    }

    /// Cases and deaths get the red card accent
    pub fn is_red(self) -> bool {
        !matches!(self, MetricKind::Recovered)
    }

    pub fn next(self) -> Self {
        match self {
            MetricKind::Cases => MetricKind::Recovered,
            MetricKind::Recovered => MetricKind::Deaths,
            MetricKind::Deaths => MetricKind::Cases,
        }
    }

    /// Cumulative count of this metric for a country
    pub fn total(self, country: &CountryStat) -> u64 {
        self.total_of(&country.counts)
    }

    pub fn total_of(self, summary: &Summary) -> u64 {
        match self {
            MetricKind::Cases => summary.cases,
            MetricKind::Recovered => summary.recovered,
            MetricKind::Deaths => summary.deaths,
        }
    }

    /// Today's delta of this metric
    pub fn today_of(self, summary: &Summary) -> u64 {
        match self {
            MetricKind::Cases => summary.today_cases,
            MetricKind::Recovered => summary.today_recovered,
            MetricKind::Deaths => summary.today_deaths,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cases" => Ok(MetricKind::Cases),
            "recovered" => Ok(MetricKind::Recovered),
            "deaths" => Ok(MetricKind::Deaths),
            _ => Err(MetricError::UnknownMetric(s.to_string())),
        }
    }
}

pub fn style_for(metric: MetricKind) -> MetricStyle {
    metric.style()
}

/// Look up a style by metric name, rejecting anything outside the fixed set
pub fn style_for_name(name: &str) -> Result<MetricStyle, MetricError> {
    name.parse::<MetricKind>().map(MetricKind::style)
}

pub fn marker_radius(metric: MetricKind, value: f64) -> f64 {
    metric.marker_radius(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles() {
        assert_eq!(
            style_for(MetricKind::Cases),
            MetricStyle { color: "#CC1034", scale_factor: 800.0 }
        );
        assert_eq!(
            style_for(MetricKind::Recovered),
            MetricStyle { color: "#7dd71d", scale_factor: 1200.0 }
        );
        assert_eq!(
            style_for(MetricKind::Deaths),
            MetricStyle { color: "#fb4443", scale_factor: 2000.0 }
        );
    }

    #[test]
    fn test_marker_radius() {
        assert_eq!(marker_radius(MetricKind::Cases, 0.0), 0.0);
        assert_eq!(marker_radius(MetricKind::Cases, 2500.0), 40000.0);
        assert_eq!(marker_radius(MetricKind::Deaths, 100.0), 20000.0);
        assert_eq!(marker_radius(MetricKind::Recovered, -50.0), 0.0);
        assert_eq!(marker_radius(MetricKind::Cases, f64::NAN), 0.0);
    }

    #[test]
    fn test_unknown_metric() {
        assert_eq!(
            style_for_name("unknown"),
            Err(MetricError::UnknownMetric("unknown".to_string()))
        );
        assert!("".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Deaths".parse::<MetricKind>(), Ok(MetricKind::Deaths));
        assert_eq!(" recovered ".parse::<MetricKind>(), Ok(MetricKind::Recovered));
        for metric in MetricKind::ALL {
            assert_eq!(metric.name().parse::<MetricKind>(), Ok(metric));
        }
    }

    #[test]
    fn test_cycle_visits_all() {
        let mut metric = MetricKind::Cases;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(metric);
            metric = metric.next();
        }
        assert_eq!(seen, MetricKind::ALL);
        assert_eq!(metric, MetricKind::Cases);
    }
}
