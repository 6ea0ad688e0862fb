use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use image::DynamicImage;
use ratatui::{prelude::*, widgets::*};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, StatefulImage};
use std::{collections::HashMap, io, time::Duration};
use tokio::sync::mpsc;

mod api;
mod favorites;
mod markup;
mod refs;
mod sanitize;
mod tree;

use api::{Board, Post};
use favorites::{Favorite, Favorites};
use markup::{MarkupSpan, RefStyle, SpanKind};
use tree::ThreadTree;

fn load_config_theme() -> Color {
    let default_theme = Color::Yellow;
    let home = match dirs::home_dir() {
        Some(path) => path,
        None => return default_theme,
    };

    let config_path = home.join(".config/rchan/rchan.conf");

    if let Ok(content) = std::fs::read_to_string(config_path) {
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with("theme_color") {
                if let Some((_, val)) = line.split_once('=') {
                    let val = val.trim().trim_matches('"').trim_matches('\'');
                    if val.starts_with('#') && val.len() == 7 {
                        let r = u8::from_str_radix(&val[1..3], 16);
                        let g = u8::from_str_radix(&val[3..5], 16);
                        let b = u8::from_str_radix(&val[5..7], 16);

                        if let (Ok(r), Ok(g), Ok(b)) = (r, g, b) {
                            return Color::Rgb(r, g, b);
                        }
                    }
                }
            }
        }
    }
    default_theme
}

#[derive(Clone, Debug)]
enum AppState {
    Home,
    BoardList,
    Catalog,
    Thread,
    Favorites,
    GoTo,
    Loading,
    Error(String),
}

enum Action {
    FetchBoards,
    FetchCatalog(String),
    FetchThread(String, u64),
    DownloadThumb(String),
}

enum NetworkEvent {
    BoardsLoaded(Vec<Board>),
    CatalogLoaded(String, Vec<Post>),
    ThreadLoaded {
        board: String,
        tree: ThreadTree,
        thumbs: Vec<String>,
    },
    ThumbDownloaded(String, DynamicImage),
    ThemeUpdate(Color),
    Error(String),
}

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T> {
    Ok(client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<T>()
        .await?)
}

async fn run_network_loop(
    mut action_rx: mpsc::UnboundedReceiver<Action>,
    event_tx: mpsc::UnboundedSender<NetworkEvent>,
) {
    let client = reqwest::Client::builder()
        .user_agent("rchan/0.1.0")
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    while let Some(action) = action_rx.recv().await {
        let client = client.clone();
        let event_tx = event_tx.clone();

        tokio::spawn(async move {
            match action {
                Action::FetchBoards => {
                    match fetch_json::<api::BoardList>(&client, &api::boards_url()).await {
                        Ok(list) => {
                            let _ = event_tx.send(NetworkEvent::BoardsLoaded(list.boards));
                        }
                        Err(e) => {
                            let _ = event_tx.send(NetworkEvent::Error(e.to_string()));
                        }
                    }
                }
                Action::FetchCatalog(board) => {
                    match fetch_json::<Vec<api::CatalogPage>>(&client, &api::catalog_url(&board))
                        .await
                    {
                        Ok(pages) => {
                            let posts: Vec<Post> =
                                pages.into_iter().flat_map(|p| p.threads).collect();
                            let _ = event_tx.send(NetworkEvent::CatalogLoaded(board, posts));
                        }
                        Err(e) => {
                            let _ = event_tx.send(NetworkEvent::Error(e.to_string()));
                        }
                    }
                }
                Action::FetchThread(board, no) => {
                    match fetch_json::<api::ThreadResponse>(&client, &api::thread_url(&board, no))
                        .await
                    {
                        Ok(resp) => match tree::build_tree(&resp.posts) {
                            Ok(tree) => {
                                let thumbs: Vec<String> = resp
                                    .posts
                                    .iter()
                                    .filter_map(|p| p.thumb_url(&board))
                                    .collect();
                                let _ = event_tx.send(NetworkEvent::ThreadLoaded {
                                    board,
                                    tree,
                                    thumbs,
                                });
                            }
                            Err(e) => {
                                let _ = event_tx.send(NetworkEvent::Error(e.to_string()));
                            }
                        },
                        Err(e) => {
                            let _ = event_tx.send(NetworkEvent::Error(e.to_string()));
                        }
                    }
                }
                Action::DownloadThumb(url) => {
                    if let Ok(resp) = client.get(&url).send().await {
                        if let Ok(bytes) = resp.bytes().await {
                            if let Ok(img) = image::load_from_memory(&bytes) {
                                let _ = event_tx.send(NetworkEvent::ThumbDownloaded(url, img));
                            }
                        }
                    }
                }
            }
        });
    }
}

async fn run_config_watcher(event_tx: mpsc::UnboundedSender<NetworkEvent>) {
    let mut last_color = load_config_theme();
    let mut interval = tokio::time::interval(Duration::from_secs(1));

    loop {
        interval.tick().await;
        let new_color = load_config_theme();
        if new_color != last_color {
            last_color = new_color;
            let _ = event_tx.send(NetworkEvent::ThemeUpdate(new_color));
        }
    }
}

struct App {
    state: AppState,
    input: String,
    theme: Color,

    boards: Vec<Board>,
    board_index: usize,

    catalog_board: String,
    catalog: Vec<Post>,
    catalog_index: usize,

    thread_board: String,
    thread: Option<ThreadTree>,
    /// Display order of the current tree: (arena index, depth).
    thread_rows: Vec<(usize, usize)>,
    thread_sel: usize,
    scroll_offset: u16,

    favorites: Favorites,
    fav_index: usize,

    image_picker: Picker,
    image_protocols: HashMap<String, StatefulProtocol>,

    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    fn new(action_tx: mpsc::UnboundedSender<Action>, favorites: Favorites) -> Self {
        let image_picker =
            Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 12)));
        Self {
            state: AppState::Home,
            input: String::new(),
            theme: load_config_theme(),
            boards: vec![],
            board_index: 0,
            catalog_board: String::new(),
            catalog: vec![],
            catalog_index: 0,
            thread_board: String::new(),
            thread: None,
            thread_rows: vec![],
            thread_sel: 0,
            scroll_offset: 0,
            favorites,
            fav_index: 0,
            image_picker,
            image_protocols: HashMap::new(),
            action_tx,
        }
    }

    fn on_tick(&mut self, event: Option<NetworkEvent>) {
        if let Some(network_event) = event {
            match network_event {
                NetworkEvent::BoardsLoaded(boards) => {
                    self.boards = boards;
                    self.board_index = 0;
                    self.state = AppState::BoardList;
                }
                NetworkEvent::CatalogLoaded(board, posts) => {
                    self.catalog_board = board;
                    self.catalog = posts;
                    self.catalog_index = 0;
                    self.state = AppState::Catalog;
                }
                NetworkEvent::ThreadLoaded { board, tree, thumbs } => {
                    self.thread_board = board;
                    self.thread_rows = tree.walk();
                    self.thread = Some(tree);
                    self.thread_sel = 0;
                    self.scroll_offset = 0;
                    self.image_protocols.clear();
                    self.state = AppState::Thread;

                    for url in thumbs {
                        let _ = self.action_tx.send(Action::DownloadThumb(url));
                    }
                }
                NetworkEvent::ThumbDownloaded(url, img) => {
                    let protocol = self.image_picker.new_resize_protocol(img);
                    self.image_protocols.insert(url, protocol);
                }
                NetworkEvent::ThemeUpdate(new_color) => {
                    self.theme = new_color;
                }
                NetworkEvent::Error(msg) => {
                    self.state = AppState::Error(msg);
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Thread => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => {
                    self.state = if self.catalog.is_empty() {
                        AppState::Home
                    } else {
                        AppState::Catalog
                    }
                }
                KeyCode::Char('j') | KeyCode::Down => self.scroll_offset += 1,
                KeyCode::Char('k') | KeyCode::Up => {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1)
                }
                KeyCode::Char('n') => self.select_post(1),
                KeyCode::Char('p') => self.select_post(-1),
                KeyCode::Char('f') => self.toggle_thread_favorite(),
                KeyCode::Char('r') => {
                    if let Some(tree) = &self.thread {
                        let board = self.thread_board.clone();
                        let no = tree.root_id();
                        self.state = AppState::Loading;
                        let _ = self.action_tx.send(Action::FetchThread(board, no));
                    }
                }
                _ => {}
            },
            AppState::BoardList => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => self.state = AppState::Home,
                KeyCode::Char('j') | KeyCode::Down => {
                    if !self.boards.is_empty() && self.board_index < self.boards.len() - 1 {
                        self.board_index += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    if self.board_index > 0 {
                        self.board_index -= 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(board) = self.boards.get(self.board_index) {
                        self.state = AppState::Loading;
                        let _ = self
                            .action_tx
                            .send(Action::FetchCatalog(board.board.clone()));
                    }
                }
                KeyCode::Char('g') => {
                    self.input.clear();
                    self.state = AppState::GoTo;
                }
                _ => {}
            },
            AppState::Catalog => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => {
                    self.state = if self.boards.is_empty() {
                        AppState::Home
                    } else {
                        AppState::BoardList
                    }
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    if !self.catalog.is_empty() && self.catalog_index < self.catalog.len() - 1 {
                        self.catalog_index += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    if self.catalog_index > 0 {
                        self.catalog_index -= 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(post) = self.catalog.get(self.catalog_index) {
                        self.state = AppState::Loading;
                        let _ = self
                            .action_tx
                            .send(Action::FetchThread(self.catalog_board.clone(), post.no));
                    }
                }
                KeyCode::Char('f') => {
                    if let Some(post) = self.catalog.get(self.catalog_index) {
                        self.favorites.toggle(Favorite {
                            board: self.catalog_board.clone(),
                            no: post.no,
                            subject: post.headline(60),
                        });
                    }
                }
                KeyCode::Char('r') => {
                    self.state = AppState::Loading;
                    let _ = self
                        .action_tx
                        .send(Action::FetchCatalog(self.catalog_board.clone()));
                }
                KeyCode::Char('g') => {
                    self.input.clear();
                    self.state = AppState::GoTo;
                }
                _ => {}
            },
            AppState::Favorites => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => self.state = AppState::Home,
                KeyCode::Char('j') | KeyCode::Down => {
                    let len = self.favorites.entries().len();
                    if len > 0 && self.fav_index < len - 1 {
                        self.fav_index += 1;
                    }
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    if self.fav_index > 0 {
                        self.fav_index -= 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(f) = self.favorites.entries().get(self.fav_index) {
                        self.state = AppState::Loading;
                        let _ = self
                            .action_tx
                            .send(Action::FetchThread(f.board.clone(), f.no));
                    }
                }
                KeyCode::Char('d') => {
                    self.favorites.remove_at(self.fav_index);
                    let len = self.favorites.entries().len();
                    if self.fav_index >= len && len > 0 {
                        self.fav_index = len - 1;
                    }
                }
                _ => {}
            },
            AppState::GoTo => match key {
                KeyCode::Esc => {
                    self.state = AppState::Home;
                    self.input.clear();
                }
                KeyCode::Enter => {
                    if !self.input.is_empty() {
                        let board = self.input.trim_matches('/').to_string();
                        self.state = AppState::Loading;
                        let _ = self.action_tx.send(Action::FetchCatalog(board));
                        self.input.clear();
                    }
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
            _ => match key {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => self.state = AppState::Home,
                KeyCode::Char('b') | KeyCode::Enter => {
                    self.state = AppState::Loading;
                    let _ = self.action_tx.send(Action::FetchBoards);
                }
                KeyCode::Char('g') => {
                    self.input.clear();
                    self.state = AppState::GoTo;
                }
                KeyCode::Char('F') => {
                    self.fav_index = 0;
                    self.state = AppState::Favorites;
                }
                _ => {}
            },
        }
        false
    }

    fn select_post(&mut self, delta: i64) {
        if self.thread_rows.is_empty() {
            return;
        }
        let len = self.thread_rows.len() as i64;
        let next = (self.thread_sel as i64 + delta).clamp(0, len - 1);
        self.thread_sel = next as usize;
        self.scroll_offset = self.row_start_line(self.thread_sel);
    }

    /// Unwrapped line index where the selected post's header sits; used
    /// to snap scrolling when jumping between posts.
    fn row_start_line(&self, row: usize) -> u16 {
        let Some(tree) = &self.thread else { return 0 };
        let mut line = 0u16;
        for (i, &(idx, _)) in self.thread_rows.iter().enumerate() {
            if i == row {
                break;
            }
            let body_lines = tree.node(idx).text.split('\n').count() as u16;
            // header + body + trailing blank
            line = line.saturating_add(1 + body_lines + 1);
        }
        line
    }

    fn toggle_thread_favorite(&mut self) {
        if let Some(tree) = &self.thread {
            let root = tree.node(tree.root());
            self.favorites.toggle(Favorite {
                board: self.thread_board.clone(),
                no: root.post.no,
                subject: root.post.headline(60),
            });
        }
    }
}

fn span_style(kind: &SpanKind, theme: Color) -> Style {
    match kind {
        SpanKind::Plain => Style::default(),
        SpanKind::Quote => Style::default().fg(Color::Green),
        SpanKind::Link(_) => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        SpanKind::Reference { style, .. } => match style {
            RefStyle::Normal | RefStyle::Op => Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
            RefStyle::Active => Style::default()
                .fg(theme)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        },
        SpanKind::OpTag => Style::default().fg(Color::DarkGray),
    }
}

fn markup_lines(spans: &[MarkupSpan], indent: &str, theme: Color) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = vec![Span::raw(indent.to_string())];
    for s in spans {
        if s.text == "\n" && s.kind == SpanKind::Plain {
            lines.push(Line::from(std::mem::replace(
                &mut current,
                vec![Span::raw(indent.to_string())],
            )));
        } else {
            current.push(Span::styled(s.text.clone(), span_style(&s.kind, theme)));
        }
    }
    lines.push(Line::from(current));
    lines
}

fn ui(f: &mut Frame, app: &mut App) {
    let (main_area, bottom_area) = if matches!(app.state, AppState::Home | AppState::Thread) {
        let c = Layout::vertical([Constraint::Min(0)]).split(f.area());
        (c[0], Rect::default())
    } else {
        let c = Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).split(f.area());
        (c[0], c[1])
    };

    let theme = app.theme;
    let border = move |t: &str| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme))
            .title(Span::styled(format!(" {} ", t), Style::default().fg(theme)))
    };

    match &app.state {
        AppState::Home => {
            let t = vec![
                Line::from(vec![Span::styled(
                    "Welcome to rchan",
                    Style::default().fg(app.theme).add_modifier(Modifier::BOLD),
                )]),
                Line::from(""),
                Line::from("Controls"),
                Line::from("────────"),
                Line::from("  b      : Board List"),
                Line::from("  g      : Go To Board"),
                Line::from("  F      : Favorites"),
                Line::from("  j / k  : Scroll / Move"),
                Line::from("  n / p  : Next / Prev Post"),
                Line::from("  f      : Toggle Favorite"),
                Line::from("  r      : Refresh"),
                Line::from("  q      : Quit"),
            ];
            f.render_widget(
                Paragraph::new(t)
                    .alignment(Alignment::Center)
                    .block(border("Home")),
                main_area,
            );
        }
        AppState::GoTo => {
            f.render_widget(
                Paragraph::new(format!("/{}", app.input))
                    .style(Style::default().fg(app.theme))
                    .block(border("Go To Board")),
                bottom_area,
            );
            f.render_widget(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::DarkGray)),
                main_area,
            );
        }
        AppState::Loading => {
            f.render_widget(
                Paragraph::new("Fetching...")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(app.theme).add_modifier(Modifier::RAPID_BLINK)),
                main_area,
            );
        }
        AppState::BoardList => {
            let items: Vec<ListItem> = app
                .boards
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    let style = if i == app.board_index {
                        Style::default().fg(Color::Black).bg(app.theme)
                    } else {
                        Style::default()
                    };
                    ListItem::new(format!(" /{}/ — {} ", b.board, b.title)).style(style)
                })
                .collect();
            f.render_widget(List::new(items).block(border("Boards")), main_area);
        }
        AppState::Catalog => {
            let items: Vec<ListItem> = app
                .catalog
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let style = if i == app.catalog_index {
                        Style::default().fg(Color::Black).bg(app.theme)
                    } else {
                        Style::default()
                    };
                    let marker = if app.favorites.contains(&app.catalog_board, p.no) {
                        "★"
                    } else {
                        " "
                    };
                    ListItem::new(format!(
                        " {} [{:>3}/{:<2}] {} ",
                        marker,
                        p.replies.unwrap_or(0),
                        p.images.unwrap_or(0),
                        p.headline(70)
                    ))
                    .style(style)
                })
                .collect();
            let title = format!("/{}/ Catalog", app.catalog_board);
            f.render_widget(List::new(items).block(border(&title)), main_area);
        }
        AppState::Favorites => {
            let items: Vec<ListItem> = app
                .favorites
                .entries()
                .iter()
                .enumerate()
                .map(|(i, fav)| {
                    let style = if i == app.fav_index {
                        Style::default().fg(Color::Black).bg(app.theme)
                    } else {
                        Style::default()
                    };
                    ListItem::new(format!(" /{}/ No.{} — {} ", fav.board, fav.no, fav.subject))
                        .style(style)
                })
                .collect();
            f.render_widget(List::new(items).block(border("Favorites")), main_area);
        }
        AppState::Thread => {
            render_thread_view(f, app, main_area, border);
        }
        AppState::Error(msg) => {
            f.render_widget(
                Paragraph::new(format!("Error: {}", msg))
                    .style(Style::default().fg(Color::Red))
                    .block(Block::default().borders(Borders::ALL)),
                main_area,
            );
        }
    }

    if matches!(
        app.state,
        AppState::BoardList
            | AppState::Catalog
            | AppState::Favorites
            | AppState::Loading
            | AppState::Error(_)
    ) {
        f.render_widget(
            Paragraph::new(" [ Enter: Open ] [ f: Favorite ] [ g: Go To ] [ Esc: Back ] [ q: Quit ] ")
                .style(Style::default().bg(app.theme).fg(Color::Black)),
            bottom_area,
        );
    }
}

fn render_thread_view<F>(f: &mut Frame, app: &mut App, area: Rect, border: F)
where
    F: Fn(&str) -> Block<'static>,
{
    let Some(tree) = &app.thread else {
        f.render_widget(border("Thread"), area);
        return;
    };

    let c = Layout::horizontal([Constraint::Min(40), Constraint::Length(32)]).split(area);
    let (content_area, side_area) = (c[0], c[1]);

    let root_id = tree.root_id();
    let title = format!("/{}/ No.{}", app.thread_board, root_id);
    let block = border(&title);
    let inner = block.inner(content_area);
    f.render_widget(block, content_area);

    let mut lines: Vec<Line> = Vec::new();
    for (row, &(idx, depth)) in app.thread_rows.iter().enumerate() {
        let node = tree.node(idx);
        let indent = "  ".repeat(depth);

        let name = node.post.name.as_deref().unwrap_or("Anonymous");
        let header_style = if row == app.thread_sel {
            Style::default().fg(Color::Black).bg(app.theme)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut header = format!("{}{} No.{}", indent, name, node.post.no);
        if app.favorites.contains(&app.thread_board, node.post.no) {
            header.push_str(" ★");
        }
        lines.push(Line::from(Span::styled(header, header_style)));

        // The post framing this node's replies is its tree parent.
        let active = node.parent.map(|p| tree.node(p).post.no);
        let spans = markup::render_spans(&node.text, root_id, active);
        lines.extend(markup_lines(&spans, &indent, app.theme));
        lines.push(Line::from(""));
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.scroll_offset, 0)),
        inner,
    );

    let s_chunks =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).split(side_area);

    let img_block = border("Image");
    let img_inner = img_block.inner(s_chunks[0]);
    f.render_widget(img_block, s_chunks[0]);

    let sel_node = app
        .thread_rows
        .get(app.thread_sel)
        .map(|&(idx, _)| tree.node(idx));
    let thumb = sel_node.and_then(|n| n.post.thumb_url(&app.thread_board));
    if let Some(url) = thumb {
        if let Some(protocol) = app.image_protocols.get_mut(&url) {
            f.render_stateful_widget(StatefulImage::default(), img_inner, protocol);
        } else {
            f.render_widget(
                Paragraph::new("[Loading Image...]")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray)),
                img_inner,
            );
        }
    }

    let info_block = border("Post");
    let info_inner = info_block.inner(s_chunks[1]);
    f.render_widget(info_block, s_chunks[1]);

    if let Some(node) = sel_node {
        let mut info = vec![Line::from(format!("No.{}", node.post.no))];
        if let Some(file) = &node.post.filename {
            let ext = node.post.ext.as_deref().unwrap_or("");
            info.push(Line::from(format!("{}{}", file, ext)));
        }
        if !node.quoted.is_empty() {
            let quoted: Vec<String> = node
                .quoted
                .iter()
                .map(|&q| format!(">>{}", tree.node(q).post.no))
                .collect();
            info.push(Line::from(format!("Quotes: {}", quoted.join(" "))));
        }
        info.push(Line::from(format!("Replies: {}", node.children.len())));
        f.render_widget(Paragraph::new(info).wrap(Wrap { trim: true }), info_inner);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let mut app = App::new(action_tx, Favorites::load());
    tokio::spawn(run_network_loop(action_rx, event_tx.clone()));
    tokio::spawn(run_config_watcher(event_tx));

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| ui(f, &mut app))?;
        if crossterm::event::poll(
            tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::from_secs(0)),
        )? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                    break;
                }
            }
        }
        while let Ok(e) = event_rx.try_recv() {
            app.on_tick(Some(e));
        }
        if last_tick.elapsed() >= tick_rate {
            app.on_tick(None);
            last_tick = std::time::Instant::now();
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
