use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use laptop_scout::{
    aggregate, filter, recommend, FilterCriteria, ListingRecord, RecordStore, Selection,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Listings,
    Platforms,
    Recommendations,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Listings => Page::Platforms,
            Page::Platforms => Page::Recommendations,
            Page::Recommendations => Page::Listings,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Listings => Page::Recommendations,
            Page::Platforms => Page::Listings,
            Page::Recommendations => Page::Platforms,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Listings => "Listings",
            Page::Platforms => "Platforms",
            Page::Recommendations => "Recommendations",
        }
    }
}

/// Price range presets for the '1'..'5' keys.
const PRICE_PRESETS: [(f64, f64, &str); 5] = [
    (0.0, f64::MAX, "any price"),
    (0.0, 40_000.0, "under ₹40k"),
    (40_000.0, 60_000.0, "₹40k-60k"),
    (60_000.0, 80_000.0, "₹60k-80k"),
    (80_000.0, f64::MAX, "above ₹80k"),
];

pub struct App {
    store: RecordStore,
    pub criteria: FilterCriteria,
    pub filtered: Vec<ListingRecord>,
    pub state: TableState,
    pub platform_state: TableState,
    pub current_page: Page,
    price_preset: usize,
    // Cycle positions for the city/platform/brand controls; 0 = All.
    city_idx: usize,
    platform_idx: usize,
    brand_idx: usize,
}

impl App {
    pub fn new(store: RecordStore) -> Self {
        let cities = store.cities();
        // Start on the original dashboard's default city: Bhopal if present.
        let city_idx = cities
            .iter()
            .position(|c| c == "Bhopal")
            .map(|i| i + 1)
            .unwrap_or(0);

        let mut app = App {
            store,
            criteria: FilterCriteria::unrestricted(),
            filtered: Vec::new(),
            state: TableState::default(),
            platform_state: TableState::default(),
            current_page: Page::Listings,
            price_preset: 0,
            city_idx,
            platform_idx: 0,
            brand_idx: 0,
        };
        app.platform_state.select(Some(0));
        app.rebuild_criteria();
        app
    }

    /// Recompute criteria from the cycle positions, then re-run the
    /// whole pipeline. One synchronous pass per interaction.
    fn rebuild_criteria(&mut self) {
        let pick = |options: &[String], idx: usize| -> Selection {
            if idx == 0 {
                Selection::All
            } else {
                Selection::only([options[idx - 1].clone()])
            }
        };

        let (min_price, max_price, _) = PRICE_PRESETS[self.price_preset];
        self.criteria = FilterCriteria {
            brands: pick(&self.store.brands(), self.brand_idx),
            platforms: pick(&self.store.platforms(), self.platform_idx),
            cities: pick(&self.store.cities(), self.city_idx),
            min_price,
            max_price,
        };
        self.refresh();
    }

    fn refresh(&mut self) {
        // Presets always form a valid range, so the criteria cannot be invalid.
        self.filtered = filter(&self.store, &self.criteria).unwrap_or_default();
        // Display sorted by price, as the original data table.
        self.filtered.sort_by(|a, b| a.price.total_cmp(&b.price));

        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn cycle_city(&mut self) {
        self.city_idx = (self.city_idx + 1) % (self.store.cities().len() + 1);
        self.rebuild_criteria();
    }

    pub fn cycle_platform(&mut self) {
        self.platform_idx = (self.platform_idx + 1) % (self.store.platforms().len() + 1);
        self.rebuild_criteria();
    }

    pub fn cycle_brand(&mut self) {
        self.brand_idx = (self.brand_idx + 1) % (self.store.brands().len() + 1);
        self.rebuild_criteria();
    }

    pub fn set_price_preset(&mut self, preset: usize) {
        if preset < PRICE_PRESETS.len() {
            self.price_preset = preset;
            self.rebuild_criteria();
        }
    }

    pub fn clear_filters(&mut self) {
        self.city_idx = 0;
        self.platform_idx = 0;
        self.brand_idx = 0;
        self.price_preset = 0;
        self.rebuild_criteria();
    }

    pub fn filter_label(&self) -> String {
        let sel = |options: &[String], idx: usize| -> String {
            if idx == 0 {
                "All".to_string()
            } else {
                options[idx - 1].clone()
            }
        };

        format!(
            "City: {} | Platform: {} | Brand: {} | Price: {}",
            sel(&self.store.cities(), self.city_idx),
            sel(&self.store.platforms(), self.platform_idx),
            sel(&self.store.brands(), self.brand_idx),
            PRICE_PRESETS[self.price_preset].2,
        )
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 20).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(20),
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Char('c') => app.clear_filters(),
                KeyCode::Char('y') => app.cycle_city(),
                KeyCode::Char('p') => app.cycle_platform(),
                KeyCode::Char('b') => app.cycle_brand(),
                KeyCode::Char('1') => app.set_price_preset(0),
                KeyCode::Char('2') => app.set_price_preset(1),
                KeyCode::Char('3') => app.set_price_preset(2),
                KeyCode::Char('4') => app.set_price_preset(3),
                KeyCode::Char('5') => app.set_price_preset(4),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    if !app.filtered.is_empty() {
                        app.state.select(Some(app.filtered.len() - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation + metrics
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Listings => render_listings(f, chunks[1], app),
        Page::Platforms => render_platforms(f, chunks[1], app),
        Page::Recommendations => render_recommendations(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Listings, Page::Platforms, Page::Recommendations];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    match aggregate::overview(&app.filtered) {
        Some(o) => {
            tab_spans.push(Span::styled(
                format!("{} listings", o.count),
                Style::default().fg(Color::White),
            ));
            tab_spans.push(Span::raw("  "));
            tab_spans.push(Span::styled(
                format!("avg ₹{:.0}", o.mean_price),
                Style::default().fg(Color::Green),
            ));
            tab_spans.push(Span::raw("  "));
            tab_spans.push(Span::styled(
                format!("min ₹{:.0}", o.min_price),
                Style::default().fg(Color::Cyan),
            ));
            tab_spans.push(Span::raw("  "));
            tab_spans.push(Span::styled(
                format!("max ₹{:.0}", o.max_price),
                Style::default().fg(Color::Red),
            ));
        }
        None => {
            tab_spans.push(Span::styled(
                "no data for the selected filters",
                Style::default().fg(Color::Red),
            ));
        }
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Laptop Scout "),
    );

    f.render_widget(header, area);
}

fn render_listings(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Date", "Platform", "Brand", "Model", "City", "Price", "Rating"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered.iter().map(|r| {
        let rating_color = if r.rating >= 4.0 {
            Color::Green
        } else if r.rating >= 3.0 {
            Color::Yellow
        } else {
            Color::Red
        };

        let cells = vec![
            Cell::from(r.date.to_string()),
            Cell::from(r.platform.clone()),
            Cell::from(r.brand.clone()),
            Cell::from(truncate(&r.model, 28)),
            Cell::from(r.city.clone()),
            Cell::from(format!("₹{:.0}", r.price)).style(Style::default().fg(Color::Cyan)),
            Cell::from(format!("{:.1}", r.rating)).style(Style::default().fg(rating_color)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(30),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Listings (sorted by price) "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_platforms(f: &mut Frame, area: Rect, app: &mut App) {
    let mut summaries = aggregate::by_platform(&app.filtered);
    summaries.sort_by(|a, b| a.mean_price.total_cmp(&b.mean_price));
    let total: usize = summaries.iter().map(|s| s.count).sum();

    let header_cells = ["Platform", "Listings", "Share", "Avg Price", "Min Price"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = summaries.iter().map(|s| {
        let share = s.count as f64 / total as f64 * 100.0;

        let cells = vec![
            Cell::from(s.key.clone()),
            Cell::from(format!("{}", s.count)),
            Cell::from(format!("{:.1}%", share)),
            Cell::from(format!("₹{:.0}", s.mean_price)).style(Style::default().fg(Color::Green)),
            Cell::from(format!("₹{:.0}", s.min_price)).style(Style::default().fg(Color::Cyan)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Platforms - Summary by Platform "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.platform_state);
}

fn render_recommendations(f: &mut Frame, area: Rect, app: &App) {
    let picks = recommend(&aggregate::by_platform(&app.filtered));

    let mut content = vec![Line::from("")];

    if picks.is_empty() {
        content.push(Line::from(Span::styled(
            "  No data for the selected filters. Adjust the filter criteria.",
            Style::default().fg(Color::Red),
        )));
    } else {
        content.push(Line::from(Span::styled(
            "  Recommended Platforms (Cheapest Options)",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        content.push(Line::from(""));

        for (i, pick) in picks.iter().enumerate() {
            content.push(Line::from(Span::styled(
                format!("  #{} {}", i + 1, pick.platform),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            content.push(Line::from(format!(
                "     Average Price: ₹{:.0}",
                pick.mean_price
            )));
            content.push(Line::from(format!(
                "     Lowest Price:  ₹{:.0}",
                pick.min_price
            )));
            content.push(Line::from(format!("     Listings:      {}", pick.count)));
            content.push(Line::from(""));
        }
    }

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Recommendations "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status_spans = vec![
        Span::styled(
            format!(" {} ", app.filter_label()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("| "),
        Span::styled("y/p/b", Style::default().fg(Color::Yellow)),
        Span::raw(" City/Platform/Brand | "),
        Span::styled("1-5", Style::default().fg(Color::Yellow)),
        Span::raw(" Price | "),
        Span::styled("c", Style::default().fg(Color::Yellow)),
        Span::raw(" Clear | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
