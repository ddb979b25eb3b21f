use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
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
use udhiyath::report::kg;
use udhiyath::{AnimalRecord, AppConfig, Category, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Animals,
    Distribution,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Animals => Page::Distribution,
            Page::Distribution => Page::Animals,
        }
    }

    pub fn previous(&self) -> Self {
        // Two pages: previous and next coincide
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Animals => "Animals",
            Page::Distribution => "Public Distribution",
        }
    }
}

pub struct App {
    pub session: Session,
    pub app_config: AppConfig,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
}

impl App {
    pub fn new(session: Session, app_config: AppConfig) -> Self {
        let mut state = TableState::default();
        if !session.animals().is_empty() {
            state.select(Some(0));
        }

        Self {
            session,
            app_config,
            state,
            current_page: Page::Animals,
            show_detail: false,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_animal(&self) -> Option<&AnimalRecord> {
        self.state.selected().and_then(|i| self.session.animals().get(i))
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.session.animals().len();
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
        let len = self.session.animals().len();
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

    pub fn last(&mut self) {
        let len = self.session.animals().len();
        if len > 0 {
            self.state.select(Some(len - 1));
        }
    }

    /// Nudge the household count; it never goes below zero here
    pub fn adjust_households(&mut self, delta: i64) {
        let current = self.session.config().household_count;
        self.session.set_household_count(current.saturating_add(delta).max(0));
    }

    /// Drop the highlighted animal and keep the selection in range
    pub fn remove_selected(&mut self) -> Option<AnimalRecord> {
        let id = self.selected_animal()?.id().to_string();
        let removed = self.session.remove(&id);

        let len = self.session.animals().len();
        let selection = match self.state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            other => other,
        };
        self.state.select(selection);

        removed
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

    session_outcome(res)
}

/// Loop errors surface only after the terminal is restored
fn session_outcome(res: io::Result<()>) -> Result<()> {
    res.context("Terminal UI failed")
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_households(1),
                KeyCode::Char('-') => app.adjust_households(-1),
                KeyCode::Char('d') if app.current_page == Page::Animals => {
                    app.remove_selected();
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => {
                    if !app.session.animals().is_empty() {
                        app.state.select(Some(0));
                    }
                }
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Animals {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Animal list
                Constraint::Percentage(40), // Detail panel
            ])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Animals => render_table(f, chunks[1], app),
            Page::Distribution => render_distribution(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Animals, Page::Distribution];

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

    let config = app.session.config();
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Animals: {}", app.session.animals().len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Households: {}", config.household_count),
        Style::default().fg(Color::Green),
    ));
    if config.household_count <= 0 {
        tab_spans.push(Span::styled(
            format!(" (using {})", config.effective_households()),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", app.app_config.event_name)),
    );

    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Animal", "Meat", "Bone", "Liver", "Total", "Owner", "Public"]
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

    let rows = app.session.animals().iter().map(|animal| {
        let totals = animal.totals();
        let shares = animal.shares();

        let cells = vec![
            Cell::from(animal.id().to_string()),
            Cell::from(kg(totals.meat)),
            Cell::from(kg(totals.bone)),
            Cell::from(kg(totals.liver)),
            Cell::from(kg(totals.all)).style(Style::default().add_modifier(Modifier::BOLD)),
            Cell::from(kg(shares.owner.total)).style(Style::default().fg(Color::Cyan)),
            Cell::from(kg(shares.public.total)).style(Style::default().fg(Color::Green)),
        ];

        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Animal Summaries "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Animal Details ");

    let animal = match app.selected_animal() {
        Some(a) => a,
        None => {
            f.render_widget(Paragraph::new("No animal selected").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let shares = animal.shares();
    let totals = animal.totals();
    let co_owners = app.app_config.co_owners;
    let sub_share = animal.co_owner_share(co_owners);

    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled("  Animal: ", label), Span::raw(animal.id())]),
        Line::from(""),
        Line::from(Span::styled("  OWNER / PUBLIC / TOTAL", heading)),
        Line::from(""),
    ];

    for category in Category::ALL {
        content.push(Line::from(vec![
            Span::styled(format!("  {:<7}", category.as_str()), label),
            Span::styled(format!("{:>11}", kg(shares.owner.get(category))), Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:>11}", kg(shares.public.get(category))), Style::default().fg(Color::Green)),
            Span::raw(format!("{:>11}", kg(totals.get(category)))),
        ]));
    }
    content.push(Line::from(vec![
        Span::styled(format!("  {:<7}", "TOTAL"), label),
        Span::styled(format!("{:>11}", kg(shares.owner.total)), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:>11}", kg(shares.public.total)), Style::default().fg(Color::Green)),
        Span::styled(format!("{:>11}", kg(totals.all)), Style::default().add_modifier(Modifier::BOLD)),
    ]));

    content.push(Line::from(""));
    content.push(Line::from("  ─────────────────────────────────────"));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        format!("  OWNER'S SHARE (1 OF {})", co_owners),
        heading,
    )));
    content.push(Line::from(""));

    for category in Category::ALL {
        content.push(Line::from(vec![
            Span::styled(format!("  {:<7}", category.as_str()), label),
            Span::raw(format!("{:>11}", kg(sub_share.get(category)))),
        ]));
    }
    content.push(Line::from(vec![
        Span::styled(format!("  {:<7}", "Total"), label),
        Span::raw(format!("{:>11}", kg(sub_share.total))),
    ]));

    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("  Entries: ", label),
        Span::raw(format!(
            "{} meat, {} bone, {} liver",
            animal.weights(Category::Meat).len(),
            animal.weights(Category::Bone).len(),
            animal.weights(Category::Liver).len()
        )),
    ]));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_distribution(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.session.summary();

    let header_cells = ["Category", "Public Pool", "Deducted", "Net Pool", "Per Household"]
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

    let rows = Category::ALL.iter().map(|category| {
        let net_color = if summary.net.get(*category) < 0.0 {
            Color::Red
        } else {
            Color::Green
        };

        Row::new(vec![
            Cell::from(category.as_str()),
            Cell::from(kg(summary.pooled.get(*category))),
            Cell::from(kg(summary.deductions.get(*category))),
            Cell::from(kg(summary.display_net.get(*category))).style(Style::default().fg(net_color)),
            Cell::from(kg(summary.per_household.get(*category)))
                .style(Style::default().add_modifier(Modifier::BOLD)),
        ])
        .height(1)
    });

    let title = if summary.has_shortfall() {
        format!(
            " Public Distribution - {} households - deductions exceed the pool ",
            summary.effective_households
        )
    } else {
        format!(" Public Distribution - {} households ", summary.effective_households)
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
    let total = app.session.animals().len();

    let status_spans = vec![
        Span::styled(format!(" Row: {}/{} ", selected, total), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("+/-", Style::default().fg(Color::Yellow)),
        Span::raw(" Households | "),
        Span::styled("d", Style::default().fg(Color::Yellow)),
        Span::raw(" Delete | "),
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

#[cfg(test)]
mod tests {
    use super::*;
    use udhiyath::{parse_household_count, AnimalSubmission, DistributionConfig};

    fn app_with(ids: &[&str]) -> App {
        let mut session = Session::new(DistributionConfig::new(2));
        for id in ids {
            session
                .submit(&AnimalSubmission::new(*id).with_weights(Category::Meat, vec![3.0]))
                .unwrap();
        }
        App::new(session, AppConfig::default())
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app_with(&["B1", "B2", "B3"]);
        assert_eq!(app.state.selected(), Some(0));

        app.previous();
        assert_eq!(app.selected_animal().unwrap().id(), "B3");

        app.next();
        assert_eq!(app.selected_animal().unwrap().id(), "B1");
    }

    #[test]
    fn test_empty_app_has_no_selection() {
        let mut app = app_with(&[]);
        app.next();
        app.last();
        assert!(app.selected_animal().is_none());
        assert!(app.remove_selected().is_none());
    }

    #[test]
    fn test_adjust_households_stops_at_zero() {
        let mut app = app_with(&["B1"]);
        app.adjust_households(1);
        assert_eq!(app.session.config().household_count, 3);

        for _ in 0..5 {
            app.adjust_households(-1);
        }
        assert_eq!(app.session.config().household_count, 0);
        assert_eq!(app.session.summary().effective_households, 1);
    }

    #[test]
    fn test_adjust_households_saturates_at_max() {
        let session = Session::new(DistributionConfig::new(parse_household_count("99999999999999999999")));
        let mut app = App::new(session, AppConfig::default());
        assert_eq!(app.session.config().household_count, i64::MAX);

        app.adjust_households(1);
        assert_eq!(app.session.config().household_count, i64::MAX);

        app.adjust_households(-1);
        assert_eq!(app.session.config().household_count, i64::MAX - 1);
    }

    #[test]
    fn test_remove_last_row_moves_selection_up() {
        let mut app = app_with(&["B1", "B2"]);
        app.last();

        let removed = app.remove_selected().unwrap();
        assert_eq!(removed.id(), "B2");
        assert_eq!(app.state.selected(), Some(0));

        app.remove_selected();
        assert_eq!(app.state.selected(), None);
    }

    #[test]
    fn test_terminal_failure_is_reported() {
        assert!(session_outcome(Ok(())).is_ok());

        let err = session_outcome(Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty gone"))).unwrap_err();
        assert_eq!(err.to_string(), "Terminal UI failed");
        assert!(format!("{:#}", err).contains("tty gone"));
    }

    #[test]
    fn test_page_cycle() {
        let mut app = app_with(&[]);
        app.next_page();
        assert_eq!(app.current_page, Page::Distribution);
        app.previous_page();
        assert_eq!(app.current_page, Page::Animals);
    }
}
