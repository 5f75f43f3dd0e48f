use crate::app::{App, Selection};
use crate::braille::BrailleCanvas;
use crate::format::{format_count, format_delta};
use crate::map::MapLayers;
use crate::metric::MetricKind;
use crate::stats::{daily_new, CountryStat};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, Widget,
    },
    Frame,
};

const POPUP_WIDTH: u16 = 34;

struct Areas {
    header: Rect,
    cards: [Rect; 3],
    map: Rect,
    table: Rect,
    chart: Rect,
    status: Rect,
}

fn split(area: Rect) -> Areas {
    let [main, status] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .areas(area);
    let [left, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .areas(main);
    let [header, cards, map] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(4), Constraint::Min(5)])
        .areas(left);
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .areas(cards);
    let [table, chart] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .areas(right);

    Areas {
        header,
        cards,
        map,
        table,
        chart,
        status,
    }
}

fn map_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Where the braille map lands for a given terminal size
pub fn map_inner_area(area: Rect) -> Rect {
    map_block().inner(split(area).map)
}

fn metric_color(metric: MetricKind) -> Color {
    metric.style().color.parse().unwrap_or(Color::Red)
}

/// Render the dashboard
pub fn render(frame: &mut Frame, app: &App) {
    let areas = split(frame.area());

    render_header(frame, app, areas.header);
    for (metric, area) in MetricKind::ALL.into_iter().zip(areas.cards) {
        render_card(frame, app, metric, area);
    }
    render_map(frame, app, areas.map);
    render_table(frame, app, areas.table);
    render_chart(frame, app, areas.chart);
    render_status_bar(frame, app, areas.status);

    if let Some(selected) = app.picker {
        render_picker(frame, app, selected);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            " COVID-19 Tracker ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if app.selection == Selection::Worldwide { "🌐 " } else { "⚑ " },
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(app.selection_name().to_string(), Style::default().fg(Color::Cyan)),
        Span::styled(" [/] change", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_card(frame: &mut Frame, app: &App, metric: MetricKind, area: Rect) {
    let active = app.metric == metric;
    let accent = if metric.is_red() { Color::Red } else { Color::Green };

    let border = if active {
        Style::default().fg(metric_color(metric)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(format!(" {} ", metric.title()), Style::default().fg(Color::Gray)));

    let today = metric.today_of(&app.summary);
    let total = metric.total_of(&app.summary);
    let lines = vec![
        Line::from(Span::styled(
            format_delta(today),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format_delta(total), Style::default().fg(Color::Gray)),
            Span::styled(" Total", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = map_block().title(Span::styled(
        format!(" World Map · {} ", app.metric),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let highlighted = match &app.selection {
        Selection::Country(key) => Some(key.as_str()),
        Selection::Worldwide => None,
    };
    let layers = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &viewport,
        &app.markers,
        highlighted,
    );

    frame.render_widget(
        MapWidget {
            layers,
            marker_color: metric_color(app.metric),
        },
        inner,
    );

    if let Some(country) = app.popup_country() {
        render_popup(frame, country, inner);
    }
}

/// Braille map layers with text labels overlaid
struct MapWidget {
    layers: MapLayers,
    marker_color: Color,
}

fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    let rows = canvas.height().min(area.height as usize);
    let cols = canvas.width().min(area.width as usize);
    for row in 0..rows {
        for col in 0..cols {
            if let Some(ch) = canvas.glyph(col, row) {
                buf[(area.x + col as u16, area.y + row as u16)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // back to front
        render_layer(&self.layers.coastlines, Color::Cyan, area, buf);
        render_layer(&self.layers.borders, Color::DarkGray, area, buf);
        render_layer(&self.layers.markers, self.marker_color, area, buf);
        render_layer(&self.layers.highlight, Color::White, area, buf);

        let label_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }
            let max_len = (area.width - *lx) as usize;
            for (i, ch) in text.chars().take(max_len.min(20)).enumerate() {
                buf[(area.x + *lx + i as u16, area.y + *ly)].set_char(ch).set_style(label_style);
            }
        }
    }
}

/// Marker popup, pinned to the top right corner of the map
fn render_popup(frame: &mut Frame, country: &CountryStat, map: Rect) {
    let width = POPUP_WIDTH.min(map.width);
    let height = 7.min(map.height);
    let area = Rect::new(map.x + map.width - width, map.y, width, height);

    let value = |label: &'static str, n: u64, color: Color| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::styled(format_count(n), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };
    let lines = vec![
        Line::from(Span::styled(country.flag_url.clone(), Style::default().fg(Color::DarkGray))),
        value("Cases: ", country.counts.cases, Color::Red),
        value("Recovered: ", country.counts.recovered, Color::Green),
        value("Deaths: ", country.counts.deaths, Color::Red),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(Span::styled(
            format!(" {} ", country.country_name),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Live Cases by Country ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    if app.table.is_empty() {
        let text = app.status.as_deref().unwrap_or("Loading…");
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let rows = app.table.iter().enumerate().skip(app.table_offset).map(|(i, country)| {
        let style = if app.selection == Selection::Country(country.key().to_string()) {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
            Cell::from(country.country_name.clone()),
            Cell::from(format_count(country.counts.cases)),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [Constraint::Length(4), Constraint::Min(10), Constraint::Length(13)],
    )
    .header(Row::new(vec!["#", "Country", "Cases"]).style(Style::default().fg(Color::Gray)))
    .block(block);
    frame.render_widget(table, area);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let color = metric_color(app.metric);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" Worldwide new {} ", app.metric),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let daily = daily_new(&app.history, app.metric);
    if daily.is_empty() {
        frame.render_widget(Paragraph::new("No data").block(block), area);
        return;
    }

    let points: Vec<(f64, f64)> = daily.iter().enumerate().map(|(i, p)| (i as f64, p.value)).collect();
    let max = daily.iter().map(|p| p.value).fold(0.0, f64::max).max(1.0);
    let first = daily.first().map(|p| p.date.label()).unwrap_or_default();
    let last = daily.last().map(|p| p.date.label()).unwrap_or_default();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, (points.len() - 1).max(1) as f64])
                .labels([first, last]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, max])
                .labels(["0".to_string(), format_delta(max as u64)]),
        );
    frame.render_widget(chart, area);
}

fn render_picker(frame: &mut Frame, app: &App, selected: usize) {
    let area = frame.area();
    let width = (area.width / 3).max(30).min(area.width);
    let height = (area.height * 7 / 10).max(5).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let items: Vec<ListItem> = std::iter::once(ListItem::new("🌐 Worldwide"))
        .chain(app.countries.iter().map(|c| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<4}", c.iso_code.as_deref().unwrap_or("--")),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(c.country_name.clone()),
            ]))
        }))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Select country (Enter/Esc) "),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(selected));

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    // The label names the key that toggles it; color carries the state
    let toggle = |on: bool, text: &'static str| {
        Span::styled(
            text,
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", Style::default().fg(Color::DarkGray)),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", Style::default().fg(Color::DarkGray)),
        toggle(settings.show_borders, "[B]order "),
        toggle(settings.show_labels, "[L]abels "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ];
    match &app.status {
        Some(status) => spans.push(Span::styled(format!(" | {status}"), Style::default().fg(Color::Red))),
        None => spans.push(Span::styled(
            " | 1/2/3:metric /:country w:world hjkl:pan +/-:zoom q:quit",
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
