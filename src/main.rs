use anyhow::Result;
use clap::Parser;
use covid_map::api::{Client, Fetcher};
use covid_map::app::{App, Selection};
use covid_map::config::{init_logging, Args};
use covid_map::metric::MetricKind;
use covid_map::{data, ui};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use std::time::Duration;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_file.as_ref())?;
    info!(api = %args.api_url, "starting");

    let fetcher = Fetcher::new(Client::new(&args.api_url, args.timeout())?, args.history_days);
    let mut app = App::new(args.metric);

    data::load_all_geojson(&mut app.map_renderer, &args.data_dir);
    if !app.map_renderer.has_data() {
        data::generate_simple_world(&mut app.map_renderer);
    }

    fetcher.request_summary(Selection::Worldwide);
    fetcher.request_countries();
    fetcher.request_history();

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &mut app, &fetcher);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    info!("exiting");

    result
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.start_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(mouse.column, mouse.row),
        _ => {}
    }
}

/// Keys while the country picker is open
fn handle_picker_key(app: &mut App, fetcher: &Fetcher, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_picker(),
        KeyCode::Up | KeyCode::Char('k') => app.move_picker(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_picker(1),
        KeyCode::PageUp => app.move_picker(-10),
        KeyCode::PageDown => app.move_picker(10),
        KeyCode::Home => app.move_picker(-(app.picker_len() as isize)),
        KeyCode::End => app.move_picker(app.picker_len() as isize),
        KeyCode::Enter => {
            if let Some(selection) = app.confirm_picker() {
                info!(?selection, "country changed");
                fetcher.request_summary(selection);
            }
        }
        _ => {}
    }
}

fn handle_key(app: &mut App, fetcher: &Fetcher, key: KeyEvent) {
    if app.picker.is_some() {
        handle_picker_key(app, fetcher, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => {
            if app.popup.take().is_none() {
                app.quit();
            }
        }

        // Metric
        KeyCode::Char('1') | KeyCode::Char('c') => app.select_metric(MetricKind::Cases),
        KeyCode::Char('2') | KeyCode::Char('r') => app.select_metric(MetricKind::Recovered),
        KeyCode::Char('3') | KeyCode::Char('d') => app.select_metric(MetricKind::Deaths),
        KeyCode::Tab => app.cycle_metric(),

        // Country
        KeyCode::Char('/') | KeyCode::Enter => app.open_picker(),
        KeyCode::Char('w') | KeyCode::Char('W') => {
            let selection = app.select(Selection::Worldwide);
            fetcher.request_summary(selection);
        }

        // Map
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
        KeyCode::Char('0') => app.reset_view(),
        KeyCode::Char('b') | KeyCode::Char('B') => app.map_renderer.toggle_borders(),
        KeyCode::Char('L') => app.map_renderer.toggle_labels(),

        // Table
        KeyCode::PageUp => app.scroll_table(-10),
        KeyCode::PageDown => app.scroll_table(10),

        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App, fetcher: &Fetcher) -> Result<()> {
    loop {
        for event in fetcher.poll() {
            app.apply(event);
        }

        let size = terminal.size()?;
        app.set_map_area(ui::map_inner_area(Rect::new(0, 0, size.width, size.height)));
        terminal.draw(|frame| ui::render(frame, app))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, fetcher, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
