use crate::map::{LineString, Lod, MapRenderer};
use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Copy)]
enum Layer {
    Coastline(Lod),
    Border,
}

/// Natural Earth files the renderer knows about
const FILES: [(&str, Layer); 4] = [
    ("ne_110m_coastline.json", Layer::Coastline(Lod::Low)),
    ("ne_50m_coastline.json", Layer::Coastline(Lod::Medium)),
    ("ne_10m_coastline.json", Layer::Coastline(Lod::High)),
    ("ne_50m_borders.json", Layer::Border),
];

/// Load every Natural Earth file present in `data_dir`, parsing them in
/// parallel. Missing files are skipped, broken ones logged.
pub fn load_all_geojson(renderer: &mut MapRenderer, data_dir: &Path) {
    let parsed: Vec<(Layer, Vec<LineString>)> = FILES
        .par_iter()
        .filter_map(|&(filename, layer)| {
            let path = data_dir.join(filename);
            if !path.exists() {
                return None;
            }
            match load_lines(&path) {
                Ok(lines) => {
                    info!(file = filename, lines = lines.len(), "loaded map data");
                    Some((layer, lines))
                }
                Err(e) => {
                    warn!(file = filename, error = %format!("{e:#}"), "failed to load map data");
                    None
                }
            }
        })
        .collect();

    for (layer, lines) in parsed {
        for line in lines {
            match layer {
                Layer::Coastline(lod) => renderer.add_coastline(line, lod),
                Layer::Border => renderer.add_border(line),
            }
        }
    }
}

fn load_lines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(geojson_lines(&geojson))
}

/// Flatten every line and polygon ring of a GeoJSON document
pub fn geojson_lines(geojson: &GeoJson) -> Vec<LineString> {
    let mut lines = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                geometry_lines(geometry, &mut lines);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                geometry_lines(geometry, &mut lines);
            }
        }
        GeoJson::Geometry(geometry) => geometry_lines(geometry, &mut lines),
    }
    lines
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn geometry_lines(geometry: &Geometry, lines: &mut Vec<LineString>) {
    match &geometry.value {
        Value::LineString(coords) => lines.push(to_line(coords)),
        Value::MultiLineString(parts) => lines.extend(parts.iter().map(|c| to_line(c))),
        Value::Polygon(rings) => lines.extend(rings.first().map(|c| to_line(c))),
        Value::MultiPolygon(polygons) => {
            lines.extend(polygons.iter().filter_map(|rings| rings.first()).map(|c| to_line(c)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                geometry_lines(g, lines);
            }
        }
        _ => {}
    }
}

/// Coarse continent outlines for when no data directory is available
pub fn generate_simple_world(renderer: &mut MapRenderer) {
    let continents: [&[(f64, f64)]; 7] = [
        // North America
        &[
            (-166.0, 68.0), (-164.0, 60.0), (-150.0, 59.0), (-135.0, 57.0),
            (-124.0, 48.0), (-124.0, 40.0), (-117.0, 32.5), (-109.0, 23.0),
            (-97.0, 19.0), (-88.0, 15.0), (-83.0, 9.0), (-77.0, 8.0),
            (-83.0, 15.0), (-87.0, 21.0), (-90.0, 21.0), (-97.0, 27.0),
            (-90.0, 29.5), (-82.0, 25.0), (-80.0, 27.0), (-81.0, 31.0),
            (-76.0, 35.0), (-74.0, 40.5), (-70.0, 42.0), (-66.0, 45.0),
            (-60.0, 46.0), (-53.0, 47.0), (-57.0, 52.0), (-61.0, 56.0),
            (-65.0, 60.0), (-78.0, 62.0), (-82.0, 58.0), (-92.0, 57.0),
            (-95.0, 62.0), (-108.0, 68.0), (-128.0, 70.0), (-141.0, 69.5),
            (-156.0, 71.0), (-166.0, 68.0),
        ],
        // South America
        &[
            (-77.0, 8.0), (-72.0, 12.0), (-62.0, 10.5), (-52.0, 5.0),
            (-50.0, 0.0), (-44.0, -2.5), (-35.0, -5.5), (-39.0, -13.0),
            (-41.0, -22.0), (-48.5, -26.0), (-53.0, -33.5), (-57.5, -38.0),
            (-65.0, -41.0), (-66.0, -47.0), (-69.0, -52.0), (-74.0, -52.0),
            (-73.5, -43.0), (-71.5, -30.0), (-70.0, -18.0), (-76.0, -14.0),
            (-81.0, -5.0), (-80.0, 1.0), (-77.0, 8.0),
        ],
        // Europe
        &[
            (-9.5, 37.0), (-6.0, 36.0), (-0.5, 38.5), (3.0, 42.0),
            (7.0, 43.5), (12.0, 44.0), (16.0, 41.0), (18.5, 40.0),
            (19.5, 42.0), (23.0, 37.0), (26.0, 40.5), (29.0, 41.0),
            (28.0, 45.0), (34.0, 46.5), (38.0, 47.0), (40.0, 55.0),
            (32.0, 60.0), (30.0, 66.0), (28.0, 71.0), (16.0, 69.0),
            (5.0, 61.0), (8.0, 57.5), (8.5, 54.0), (4.0, 52.0),
            (-1.5, 49.5), (-4.5, 48.5), (-1.5, 46.0), (-1.5, 43.5),
            (-9.0, 43.0), (-9.5, 37.0),
        ],
        // Africa
        &[
            (-17.0, 21.0), (-16.5, 14.5), (-13.0, 9.0), (-8.0, 4.5),
            (-2.0, 5.0), (4.5, 6.0), (9.5, 4.0), (9.0, -1.0),
            (12.0, -5.0), (13.5, -11.5), (11.5, -17.0), (15.0, -27.0),
            (18.5, -34.0), (25.5, -34.0), (32.5, -28.5), (35.5, -24.0),
            (40.5, -15.0), (39.5, -5.0), (42.0, -1.0), (51.0, 11.5),
            (43.5, 12.0), (39.0, 17.0), (35.0, 24.0), (32.5, 31.0),
            (25.0, 31.5), (20.0, 31.0), (15.0, 32.0), (10.0, 37.0),
            (0.0, 36.0), (-6.0, 35.5), (-10.0, 30.0), (-13.0, 27.5),
            (-17.0, 21.0),
        ],
        // Asia
        &[
            (40.0, 55.0), (50.0, 46.0), (53.0, 41.0), (57.0, 25.5),
            (61.5, 25.0), (67.0, 24.5), (72.5, 21.0), (76.5, 8.5),
            (80.0, 12.5), (80.5, 15.5), (87.0, 21.5), (91.5, 22.5),
            (94.5, 17.0), (98.0, 16.0), (98.5, 8.0), (103.5, 1.5),
            (104.5, 10.5), (109.0, 12.0), (106.5, 20.5), (110.5, 21.0),
            (117.5, 24.0), (122.0, 30.5), (119.5, 35.0), (121.5, 40.5),
            (126.5, 37.5), (129.5, 35.0), (130.0, 42.5), (135.5, 43.5),
            (141.0, 52.0), (137.5, 54.0), (143.0, 59.5), (156.0, 61.5),
            (163.0, 60.0), (163.5, 56.0), (156.5, 51.0), (170.0, 60.0),
            (180.0, 66.0), (180.0, 69.0), (160.0, 70.0), (140.0, 72.0),
            (113.0, 74.0), (104.0, 77.5), (87.0, 75.0), (70.0, 73.0),
            (68.0, 69.0), (60.0, 69.0), (43.0, 66.5), (40.0, 55.0),
        ],
        // Australia
        &[
            (114.0, -22.0), (122.0, -18.0), (129.5, -15.0), (136.5, -12.0),
            (142.0, -10.5), (145.5, -15.0), (153.0, -25.5), (150.5, -35.5),
            (146.0, -39.0), (140.0, -38.0), (138.0, -35.0), (131.0, -31.5),
            (124.0, -33.5), (115.0, -34.0), (113.5, -26.0), (114.0, -22.0),
        ],
        // Greenland
        &[
            (-73.0, 78.0), (-56.0, 82.0), (-30.0, 83.5), (-20.0, 80.0),
            (-20.0, 70.0), (-32.0, 68.0), (-42.0, 60.0), (-50.0, 64.0),
            (-54.0, 70.0), (-66.0, 76.0), (-73.0, 78.0),
        ],
    ];

    for outline in continents {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}
