use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_disc, draw_line, draw_ring};
use crate::map::markers::Marker;
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Largest markers get a name label, the rest would clutter the map
const MAX_LABELS: usize = 12;
/// Minimum ring radius in pixels before a marker is labeled
const LABEL_MIN_RADIUS: i32 = 8;

/// Level of detail for coastline data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Layer toggles
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_borders: bool,
    pub show_labels: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_borders: true,
            show_labels: true,
        }
    }
}

/// Rendered map, one canvas per color
pub struct MapLayers {
    pub coastlines: BrailleCanvas,
    pub borders: BrailleCanvas,
    pub markers: BrailleCanvas,
    /// Marker of the selected country, drawn on top
    pub highlight: BrailleCanvas,
    /// (column, row, text) in character cells
    pub labels: Vec<(u16, u16, String)>,
}

#[derive(Default)]
pub struct MapRenderer {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
    coastlines_high: Vec<LineString>,
    borders: Vec<LineString>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coastlines for a LOD, falling back to coarser data
    fn coastlines(&self, lod: Lod) -> &[LineString] {
        let candidates: [&Vec<LineString>; 3] = match lod {
            Lod::High => [&self.coastlines_high, &self.coastlines_medium, &self.coastlines_low],
            Lod::Medium => [&self.coastlines_medium, &self.coastlines_low, &self.coastlines_low],
            Lod::Low => [&self.coastlines_low, &self.coastlines_medium, &self.coastlines_high],
        };
        candidates
            .into_iter()
            .find(|lines| !lines.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Render base map and markers for a canvas of `width` x `height` cells
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        markers: &[Marker],
        highlighted: Option<&str>,
    ) -> MapLayers {
        let mut layers = MapLayers {
            coastlines: BrailleCanvas::new(width, height),
            borders: BrailleCanvas::new(width, height),
            markers: BrailleCanvas::new(width, height),
            highlight: BrailleCanvas::new(width, height),
            labels: Vec::new(),
        };

        for line in self.coastlines(Lod::from_zoom(viewport.zoom)) {
            draw_linestring(&mut layers.coastlines, line, viewport);
        }

        if self.settings.show_borders {
            for line in &self.borders {
                draw_linestring(&mut layers.borders, line, viewport);
            }
        }

        let mut labeled: Vec<(i32, i32, i32, &str)> = Vec::new();
        for marker in markers {
            let (px, py) = viewport.project(marker.lon, marker.lat);
            let radius = marker.pixel_radius(viewport);
            if !viewport.line_might_be_visible((px - radius, py - radius), (px + radius, py + radius)) {
                continue;
            }

            let canvas = if highlighted == Some(marker.key.as_str()) {
                &mut layers.highlight
            } else {
                &mut layers.markers
            };
            draw_ring(canvas, px, py, radius);
            draw_disc(canvas, px, py, 1);

            if radius >= LABEL_MIN_RADIUS && viewport.is_visible(px, py) {
                labeled.push((radius, px, py, marker.name.as_str()));
            }
        }

        if self.settings.show_labels {
            labeled.sort_by(|a, b| b.0.cmp(&a.0));
            for (_, px, py, name) in labeled.into_iter().take(MAX_LABELS) {
                if px >= 0 && py >= 0 {
                    let char_x = (px / 2) as u16;
                    let char_y = (py / 4) as u16;
                    if let Some(label_x) = char_x.checked_add(1) {
                        layers.labels.push((label_x, char_y, name.to_string()));
                    }
                }
            }
        }

        layers
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    pub fn add_border(&mut self, line: LineString) {
        self.borders.push(line);
    }

    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    pub fn toggle_borders(&mut self) {
        self.settings.show_borders = !self.settings.show_borders;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }
}

/// Draw a linestring, skipping off-screen and wrap-around segments
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}
