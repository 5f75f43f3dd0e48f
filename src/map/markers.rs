use crate::map::Viewport;
use crate::metric::MetricKind;
use crate::stats::CountryStat;

/// Proportional circle for one country
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub key: String,
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    /// Ground radius in meters
    pub radius_m: f64,
}

impl Marker {
    /// Radius in braille pixels, capped so huge circles stay cheap to draw
    pub fn pixel_radius(&self, viewport: &Viewport) -> i32 {
        let cap = (viewport.width + viewport.height) as f64;
        viewport
            .meters_to_pixels(self.radius_m, self.lat)
            .clamp(0.0, cap)
            .round() as i32
    }
}

/// One marker per country, sized by the chosen metric
pub fn build_markers(countries: &[CountryStat], metric: MetricKind) -> Vec<Marker> {
    countries
        .iter()
        .map(|country| Marker {
            key: country.key().to_string(),
            name: country.country_name.clone(),
            lon: country.long,
            lat: country.lat,
            radius_m: metric.marker_radius(metric.total(country) as f64),
        })
        .collect()
}

/// Marker whose circle contains the pixel, preferring the closest center
pub fn marker_at<'a>(markers: &'a [Marker], viewport: &Viewport, px: i32, py: i32) -> Option<&'a Marker> {
    markers
        .iter()
        .filter_map(|marker| {
            let (mx, my) = viewport.project(marker.lon, marker.lat);
            let radius = marker.pixel_radius(viewport).max(2) as i64;
            let (dx, dy) = ((px - mx) as i64, (py - my) as i64);
            let dist2 = dx * dx + dy * dy;
            (dist2 <= radius * radius).then_some((dist2, marker))
        })
        .min_by_key(|&(dist2, _)| dist2)
        .map(|(_, marker)| marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Summary;

    fn country(name: &str, iso: &str, lon: f64, lat: f64, cases: u64, deaths: u64) -> CountryStat {
        CountryStat {
            country_name: name.to_string(),
            iso_code: Some(iso.to_string()),
            lat,
            long: lon,
            flag_url: String::new(),
            counts: Summary {
                cases,
                deaths,
                ..Summary::default()
            },
        }
    }

    #[test]
    fn test_build_markers_uses_metric() {
        let countries = [country("Norway", "NO", 8.0, 62.0, 2500, 100)];

        let cases = build_markers(&countries, MetricKind::Cases);
        assert_eq!(cases[0].radius_m, 40_000.0);
        assert_eq!(cases[0].key, "NO");

        let deaths = build_markers(&countries, MetricKind::Deaths);
        assert_eq!(deaths[0].radius_m, 20_000.0);
    }

    #[test]
    fn test_marker_at_prefers_closest() {
        let countries = [
            country("A", "AA", 0.0, 0.0, 1_000_000, 0),
            country("B", "BB", 5.0, 0.0, 1_000_000, 0),
        ];
        let markers = build_markers(&countries, MetricKind::Cases);
        let vp = Viewport::new(0.0, 0.0, 4.0, 400, 200);

        let (bx, by) = vp.project(5.0, 0.0);
        assert_eq!(marker_at(&markers, &vp, bx, by).map(|m| m.name.as_str()), Some("B"));
        assert!(marker_at(&markers, &vp, 0, 0).is_none());
    }

    #[test]
    fn test_pixel_radius_capped() {
        let marker = Marker {
            key: "X".into(),
            name: "X".into(),
            lon: 0.0,
            lat: 0.0,
            radius_m: 1e12,
        };
        let vp = Viewport::new(0.0, 0.0, 1.0, 100, 50);
        assert_eq!(marker.pixel_radius(&vp), 150);
    }
}
