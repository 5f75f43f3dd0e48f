use crate::api::FetchEvent;
use crate::map::{build_markers, marker_at, Lod, MapRenderer, Marker, Viewport};
use crate::metric::MetricKind;
use crate::stats::{rank, CountryStat, Summary, Timeline};
use ratatui::layout::Rect;
use tracing::{debug, info};

/// Initial map center over the Atlantic, showing the Americas and Europe
pub const DEFAULT_CENTER: (f64, f64) = (-40.4796, 34.80746);
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Selecting a country zooms in one step (2x) around it
pub const COUNTRY_ZOOM: f64 = DEFAULT_ZOOM * 2.0;

/// Which record the info cards show
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Worldwide,
    /// ISO code, or the country name when it has none
    Country(String),
}

/// Dashboard state, owned by the event loop and borrowed by the renderer
pub struct App {
    pub viewport: Viewport,
    pub map_renderer: MapRenderer,
    pub should_quit: bool,
    /// Inner area of the map block in terminal cells
    pub map_area: Rect,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    dragged: bool,

    /// Countries in API order (picker and map)
    pub countries: Vec<CountryStat>,
    /// Countries ranked by cases (table)
    pub table: Vec<CountryStat>,
    pub table_offset: usize,
    pub markers: Vec<Marker>,
    pub metric: MetricKind,
    pub selection: Selection,
    pub summary: Summary,
    pub selected_country: Option<CountryStat>,
    pub history: Timeline,

    /// Highlighted picker row while the picker is open
    pub picker: Option<usize>,
    /// Key of the country whose popup is shown
    pub popup: Option<String>,
    pub status: Option<String>,
}

impl App {
    pub fn new(metric: MetricKind) -> Self {
        let (lon, lat) = DEFAULT_CENTER;
        Self {
            viewport: Viewport::new(lon, lat, DEFAULT_ZOOM, 0, 0),
            map_renderer: MapRenderer::new(),
            should_quit: false,
            map_area: Rect::default(),
            last_mouse: None,
            dragged: false,
            countries: Vec::new(),
            table: Vec::new(),
            table_offset: 0,
            markers: Vec::new(),
            metric,
            selection: Selection::Worldwide,
            summary: Summary::default(),
            selected_country: None,
            history: Timeline::default(),
            picker: None,
            popup: None,
            status: None,
        }
    }

    /// Track the map's on-screen area; braille gives 2x4 pixels per cell
    pub fn set_map_area(&mut self, area: Rect) {
        self.map_area = area;
        self.viewport.width = area.width as usize * 2;
        self.viewport.height = area.height as usize * 4;
    }

    /// Install the result of a background request
    pub fn apply(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Countries(countries) => {
                info!(count = countries.len(), "countries loaded");
                self.table = rank(&countries);
                self.markers = build_markers(&countries, self.metric);
                self.countries = countries;
                self.table_offset = self.table_offset.min(self.table.len().saturating_sub(1));
                if let Some(idx) = self.picker {
                    self.picker = Some(idx.min(self.countries.len()));
                }
                self.status = None;
            }
            FetchEvent::Summary {
                selection,
                summary,
                country,
            } => {
                if selection != self.selection {
                    debug!(?selection, current = ?self.selection, "dropping stale summary");
                    return;
                }
                self.summary = summary;
                if let Some(country) = &country {
                    self.viewport.center_on(country.long, country.lat, COUNTRY_ZOOM);
                }
                self.selected_country = country;
            }
            FetchEvent::SummaryFailed { selection, error } => {
                if selection != self.selection {
                    debug!(?selection, current = ?self.selection, "dropping stale summary failure");
                    return;
                }
                self.summary = Summary::default();
                self.status = Some(format!("failed to load summary: {error}"));
            }
            FetchEvent::History(timeline) => {
                self.history = timeline;
            }
            FetchEvent::Failed { what, error } => {
                self.status = Some(format!("failed to load {what}: {error}"));
            }
        }
    }

    pub fn select_metric(&mut self, metric: MetricKind) {
        if self.metric != metric {
            self.metric = metric;
            self.markers = build_markers(&self.countries, metric);
        }
    }

    pub fn cycle_metric(&mut self) {
        self.select_metric(self.metric.next());
    }

    /// Change the selection; returns it so the caller can fetch its summary
    /// Cards show zeros until the new selection's summary arrives.
    pub fn select(&mut self, selection: Selection) -> Selection {
        if self.selection != selection {
            self.summary = Summary::default();
            self.selected_country = None;
        }
        self.selection = selection.clone();
        selection
    }

    /// Display name of the current selection
    pub fn selection_name(&self) -> &str {
        match &self.selection {
            Selection::Worldwide => "Worldwide",
            Selection::Country(key) => self
                .selected_country
                .as_ref()
                .filter(|c| c.key() == key)
                .or_else(|| self.countries.iter().find(|c| c.key() == key))
                .map(|c| c.country_name.as_str())
                .unwrap_or(key),
        }
    }

    /// Picker rows: "Worldwide" followed by every country
    pub fn picker_len(&self) -> usize {
        self.countries.len() + 1
    }

    pub fn open_picker(&mut self) {
        let current = match &self.selection {
            Selection::Worldwide => 0,
            Selection::Country(key) => self
                .countries
                .iter()
                .position(|c| c.key() == key)
                .map_or(0, |i| i + 1),
        };
        self.picker = Some(current);
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Move the picker highlight, clamped to the list
    pub fn move_picker(&mut self, delta: isize) {
        if let Some(idx) = self.picker {
            let last = self.picker_len() as isize - 1;
            self.picker = Some((idx as isize + delta).clamp(0, last) as usize);
        }
    }

    pub fn confirm_picker(&mut self) -> Option<Selection> {
        let idx = self.picker.take()?;
        let selection = match idx {
            0 => Selection::Worldwide,
            i => Selection::Country(self.countries.get(i - 1)?.key().to_string()),
        };
        Some(self.select(selection))
    }

    pub fn scroll_table(&mut self, delta: isize) {
        let last = self.table.len().saturating_sub(1) as isize;
        self.table_offset = (self.table_offset as isize + delta).clamp(0, last.max(0)) as usize;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        let (lon, lat) = DEFAULT_CENTER;
        self.viewport.center_on(lon, lat, DEFAULT_ZOOM);
    }

    /// Terminal cell to braille pixel inside the map, if the cell is on it
    fn to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let area = self.map_area;
        let inside = col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height;
        inside.then(|| (((col - area.x) as i32) * 2, ((row - area.y) as i32) * 4))
    }

    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            self.viewport.zoom_in_at(px, py);
        }
    }

    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            self.viewport.zoom_out_at(px, py);
        }
    }

    pub fn start_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = self.to_pixel(col, row).map(|_| (col, row));
        self.dragged = false;
    }

    /// Pan by the mouse movement since the last event
    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - col as i32;
            let dy = last_y as i32 - row as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
                self.pan(dx * 2, dy * 4);
            }
            self.last_mouse = Some((col, row));
        }
    }

    /// Mouse released: a press without movement is a click on the map
    pub fn end_drag(&mut self, col: u16, row: u16) {
        if self.last_mouse.is_some() && !self.dragged {
            self.click_at(col, row);
        }
        self.last_mouse = None;
        self.dragged = false;
    }

    /// Open the popup of the marker under the cursor, or close it
    pub fn click_at(&mut self, col: u16, row: u16) {
        self.popup = self
            .to_pixel(col, row)
            .and_then(|(px, py)| marker_at(&self.markers, &self.viewport, px, py))
            .map(|marker| marker.key.clone());
    }

    pub fn popup_country(&self) -> Option<&CountryStat> {
        let key = self.popup.as_deref()?;
        self.countries.iter().find(|c| c.key() == key)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.viewport.zoom).label()
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(name: &str, iso: &str, cases: u64) -> CountryStat {
        CountryStat {
            country_name: name.to_string(),
            iso_code: Some(iso.to_string()),
            lat: 10.0,
            long: 20.0,
            flag_url: format!("https://flags.example/{iso}.png"),
            counts: Summary {
                cases,
                deaths: cases / 10,
                ..Summary::default()
            },
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(MetricKind::Cases);
        app.set_map_area(Rect::new(1, 1, 60, 20));
        app.apply(FetchEvent::Countries(vec![
            country("Brazil", "BR", 500),
            country("Chile", "CL", 900),
            country("Peru", "PE", 100),
        ]));
        app
    }

    #[test]
    fn test_countries_ranked_for_table() {
        let app = loaded_app();
        let table: Vec<_> = app.table.iter().map(|c| c.key()).collect();
        assert_eq!(table, ["CL", "BR", "PE"]);
        // map and picker keep API order
        assert_eq!(app.countries[0].key(), "BR");
        assert_eq!(app.markers.len(), 3);
    }

    #[test]
    fn test_picker_selects_country() {
        let mut app = loaded_app();
        app.open_picker();
        assert_eq!(app.picker, Some(0));

        app.move_picker(2);
        assert_eq!(app.confirm_picker(), Some(Selection::Country("CL".into())));
        assert_eq!(app.picker, None);
        assert_eq!(app.selection_name(), "Chile");

        app.open_picker();
        assert_eq!(app.picker, Some(2));
        app.move_picker(-10);
        assert_eq!(app.confirm_picker(), Some(Selection::Worldwide));
    }

    #[test]
    fn test_summary_recenters_map() {
        let mut app = loaded_app();
        let selection = app.select(Selection::Country("PE".into()));
        let peru = country("Peru", "PE", 100);
        app.apply(FetchEvent::Summary {
            selection,
            summary: peru.counts,
            country: Some(peru),
        });

        assert_eq!(app.summary.cases, 100);
        assert_eq!(app.viewport.center_lon, 20.0);
        assert_eq!(app.viewport.zoom, COUNTRY_ZOOM);
    }

    #[test]
    fn test_stale_summary_ignored() {
        let mut app = loaded_app();
        app.select(Selection::Country("BR".into()));
        app.select(Selection::Worldwide);

        let brazil = country("Brazil", "BR", 500);
        app.apply(FetchEvent::Summary {
            selection: Selection::Country("BR".into()),
            summary: brazil.counts,
            country: Some(brazil),
        });

        assert_eq!(app.summary, Summary::default());
        assert_eq!(app.viewport.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_failed_country_summary_shows_zeros() {
        let mut app = loaded_app();
        app.apply(FetchEvent::Summary {
            selection: Selection::Worldwide,
            summary: Summary {
                cases: 700_000_000,
                ..Summary::default()
            },
            country: None,
        });
        assert_eq!(app.summary.cases, 700_000_000);

        let selection = app.select(Selection::Country("CL".into()));
        app.apply(FetchEvent::SummaryFailed {
            selection,
            error: "404 Not Found".into(),
        });

        assert_eq!(app.selection_name(), "Chile");
        assert_eq!(app.summary, Summary::default());
        assert_eq!(app.status.as_deref(), Some("failed to load summary: 404 Not Found"));
    }

    #[test]
    fn test_stale_summary_failure_ignored() {
        let mut app = loaded_app();
        app.select(Selection::Country("BR".into()));
        app.select(Selection::Worldwide);
        app.apply(FetchEvent::Summary {
            selection: Selection::Worldwide,
            summary: Summary {
                cases: 42,
                ..Summary::default()
            },
            country: None,
        });

        app.apply(FetchEvent::SummaryFailed {
            selection: Selection::Country("BR".into()),
            error: "timed out".into(),
        });
        assert_eq!(app.summary.cases, 42);
        assert_eq!(app.status, None);
    }

    #[test]
    fn test_reselecting_keeps_summary() {
        let mut app = loaded_app();
        app.apply(FetchEvent::Summary {
            selection: Selection::Worldwide,
            summary: Summary {
                cases: 42,
                ..Summary::default()
            },
            country: None,
        });
        app.select(Selection::Worldwide);
        assert_eq!(app.summary.cases, 42);
    }

    #[test]
    fn test_metric_rebuilds_markers() {
        let mut app = loaded_app();
        let before = app.markers[0].radius_m;
        app.select_metric(MetricKind::Deaths);
        assert_ne!(app.markers[0].radius_m, before);
        assert_eq!(app.markers[0].radius_m, MetricKind::Deaths.marker_radius(50.0));
    }

    #[test]
    fn test_failure_sets_status_and_keeps_data() {
        let mut app = loaded_app();
        app.apply(FetchEvent::Failed {
            what: "history",
            error: "timed out".into(),
        });
        assert_eq!(app.status.as_deref(), Some("failed to load history: timed out"));
        assert_eq!(app.countries.len(), 3);
    }

    #[test]
    fn test_click_opens_popup() {
        let mut app = loaded_app();
        app.viewport.center_on(20.0, 10.0, 4.0);
        // map center cell: pixel (60, 40) inside a 60x20 area at (1, 1)
        app.start_drag(31, 11);
        app.end_drag(31, 11);
        assert!(app.popup_country().is_some());

        // clicks outside the map close it
        app.click_at(0, 0);
        assert_eq!(app.popup, None);
    }

    #[test]
    fn test_drag_pans_without_click() {
        let mut app = loaded_app();
        let lon = app.viewport.center_lon;
        app.start_drag(10, 10);
        app.handle_drag(5, 10);
        app.end_drag(5, 10);
        assert!(app.viewport.center_lon > lon);
        assert_eq!(app.popup, None);
    }

    #[test]
    fn test_table_scroll_clamped() {
        let mut app = loaded_app();
        app.scroll_table(10);
        assert_eq!(app.table_offset, 2);
        app.scroll_table(-10);
        assert_eq!(app.table_offset, 0);
    }
}
