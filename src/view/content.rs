//! Main content area rendering (search results, artist page)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    ArtistDetail, SearchAlbum, SearchArtist, SearchPlaylist, SearchResultSection, SearchResults,
    Track, UiState,
};
use crate::search::SearchState;
use super::utils::{
    border_style, calculate_num_width, format_duration, header_style, render_scrollable_list,
    row_style, track_column_widths, truncate_string,
};

fn placeholder(frame: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
    let widget = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

pub fn render_search(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    search: Option<&SearchState>,
    current_uri: Option<&str>,
) {
    let Some(search) = search else {
        placeholder(frame, area, "Results", "Connecting...", Color::Yellow);
        return;
    };

    match &search.results {
        None if search.is_initial_load() => {
            placeholder(frame, area, "Results", "Searching...", Color::Yellow);
        }
        None => {
            placeholder(frame, area, "Results", "Type to search the catalog", Color::DarkGray);
        }
        Some(results) => render_search_results(
            frame,
            area,
            results,
            ui_state,
            search.is_refetching(),
            current_uri,
        ),
    }
}

fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    results: &SearchResults,
    ui_state: &UiState,
    is_refetching: bool,
    current_uri: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category tabs
            Constraint::Min(0),    // Results list
        ])
        .split(area);

    let visible: Vec<SearchResultSection> = ui_state.filters().iter().map(|f| f.section()).collect();
    let tabs_content: Vec<Span> = visible
        .iter()
        .flat_map(|&section| {
            let style = if section == ui_state.section {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![
                Span::styled(format!(" {} ({}) ", section.title(), results.len_of(section)), style),
                Span::raw("  "),
            ]
        })
        .collect();

    let title = if is_refetching {
        format!(" Results for \"{}\" (updating...) ", results.query)
    } else {
        format!(" Results for \"{}\" ", results.query)
    };
    let tabs = Paragraph::new(Line::from(tabs_content)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style(true)),
    );
    frame.render_widget(tabs, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let selected = ui_state.selected;

    let list_items: Vec<ListItem> = match ui_state.section {
        SearchResultSection::Tracks => {
            track_items(&results.tracks, selected, true, current_uri, content_width)
        }
        SearchResultSection::Artists => artist_items(&results.artists, selected, content_width),
        SearchResultSection::Albums => album_items(&results.albums, selected, content_width),
        SearchResultSection::Playlists => playlist_items(&results.playlists, selected, content_width),
    };

    if results.len_of(ui_state.section) == 0 {
        let empty = Paragraph::new(format!("  No {} found", ui_state.section.title().to_lowercase()))
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1)),
            );
        frame.render_widget(empty, chunks[1]);
    } else {
        let list_block = Block::default()
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .border_style(border_style(true));

        // +1 for the header row
        render_scrollable_list(frame, chunks[1], list_items, selected.saturating_add(1), list_block);
    }
}

pub fn track_items(
    tracks: &[Track],
    selected: usize,
    is_focused: bool,
    current_uri: Option<&str>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let (num_width, title_width, artist_width, _) = track_column_widths(content_width, tracks.len());

    let mut items = vec![ListItem::new(format!(
        " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {}",
        "#", "Title", "Artist", "Duration",
    ))
    .style(header_style())];

    items.extend(tracks.iter().enumerate().map(|(i, track)| {
        let is_playing = current_uri.is_some_and(|uri| uri == track.uri);
        let style = if is_playing && i != selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            row_style(i == selected, is_focused)
        };

        let playing_indicator = if is_playing { "▶" } else { " " };
        ListItem::new(format!(
            "{}{:<num_width$}   {}   {}   {}",
            playing_indicator,
            i + 1,
            truncate_string(&track.name, title_width),
            truncate_string(&track.artist_line(), artist_width),
            format_duration(track.duration_ms),
        ))
        .style(style)
    }));
    items
}

fn artist_items(artists: &[SearchArtist], selected: usize, content_width: usize) -> Vec<ListItem<'static>> {
    let num_w = calculate_num_width(artists.len());
    let remaining = content_width.saturating_sub(1 + num_w + 3 + 3);
    let name_w = (remaining * 35) / 100;
    let genres_w = remaining.saturating_sub(name_w);

    let mut items = vec![ListItem::new(format!(
        " {:<num_w$}   {:<name_w$}   {:<genres_w$}",
        "#", "Artist", "Genres",
    ))
    .style(header_style())];

    items.extend(artists.iter().enumerate().map(|(i, artist)| {
        let genres = if artist.genres.is_empty() {
            "-".to_string()
        } else {
            artist.genres.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        };
        ListItem::new(format!(
            " {:<num_w$}   {}   {}",
            i + 1,
            truncate_string(&artist.name, name_w),
            truncate_string(&genres, genres_w),
        ))
        .style(row_style(i == selected, true))
    }));
    items
}

fn album_items(albums: &[SearchAlbum], selected: usize, content_width: usize) -> Vec<ListItem<'static>> {
    let num_w = calculate_num_width(albums.len());
    let year_w = 4;
    let remaining = content_width.saturating_sub(1 + num_w + 3 + 3 + 3 + year_w);
    let album_w = (remaining * 50) / 100;
    let artist_w = remaining.saturating_sub(album_w);

    let mut items = vec![ListItem::new(format!(
        " {:<num_w$}   {:<album_w$}   {:<artist_w$}   {:>year_w$}",
        "#", "Album", "Artist", "Year",
    ))
    .style(header_style())];

    items.extend(albums.iter().enumerate().map(|(i, album)| {
        ListItem::new(format!(
            " {:<num_w$}   {}   {}   {:>year_w$}",
            i + 1,
            truncate_string(&album.name, album_w),
            truncate_string(&album.artist, artist_w),
            album.year,
        ))
        .style(row_style(i == selected, true))
    }));
    items
}

fn playlist_items(playlists: &[SearchPlaylist], selected: usize, content_width: usize) -> Vec<ListItem<'static>> {
    let num_w = calculate_num_width(playlists.len());
    let count_w = 6;
    let remaining = content_width.saturating_sub(1 + num_w + 3 + 3 + 3 + count_w);
    let name_w = (remaining * 60) / 100;
    let owner_w = remaining.saturating_sub(name_w);

    let mut items = vec![ListItem::new(format!(
        " {:<num_w$}   {:<name_w$}   {:<owner_w$}   {:>count_w$}",
        "#", "Playlist", "Owner", "Tracks",
    ))
    .style(header_style())];

    items.extend(playlists.iter().enumerate().map(|(i, playlist)| {
        ListItem::new(format!(
            " {:<num_w$}   {}   {}   {:>count_w$}",
            i + 1,
            truncate_string(&playlist.name, name_w),
            truncate_string(&playlist.owner, owner_w),
            playlist.total_tracks,
        ))
        .style(row_style(i == selected, true))
    }));
    items
}

pub fn render_artist(frame: &mut Frame, area: Rect, ui_state: &UiState, current_uri: Option<&str>) {
    match &ui_state.artist {
        Some(detail) => render_artist_detail(frame, area, detail, ui_state.artist_selected, current_uri),
        None if ui_state.artist_loading => {
            placeholder(frame, area, "Artist", "Loading...", Color::Yellow);
        }
        None => {
            placeholder(frame, area, "Artist", "Nothing to show (Esc to go back)", Color::DarkGray);
        }
    }
}

fn render_artist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &ArtistDetail,
    track_index: usize,
    current_uri: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Top tracks + albums
        ])
        .split(area);

    let artist = &detail.artist;
    let genres = if artist.genres.is_empty() {
        String::new()
    } else {
        format!(" | {}", artist.genres.join(", "))
    };
    let header_text = format!(
        " {}{} | {} followers | Enter to queue, Esc to go back",
        artist.name, genres, artist.followers
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).border_style(border_style(true)));
    frame.render_widget(header, chunks[0]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let track_width = content_chunks[0].width.saturating_sub(4) as usize;
    let tracks = track_items(&detail.top_tracks, track_index, true, current_uri, track_width);
    let tracks_block = Block::default()
        .borders(Borders::ALL)
        .title(" Top Tracks ")
        .padding(Padding::horizontal(1))
        .border_style(border_style(true));
    render_scrollable_list(frame, content_chunks[0], tracks, track_index.saturating_add(1), tracks_block);

    let albums: Vec<ListItem> = detail
        .albums
        .iter()
        .map(|album| ListItem::new(format!("{} ({})", album.name, album.year)))
        .collect();
    let albums_block = Block::default()
        .borders(Borders::ALL)
        .title(" Albums ")
        .padding(Padding::horizontal(1));
    render_scrollable_list(frame, content_chunks[1], albums, 0, albums_block);
}
