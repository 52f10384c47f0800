//! Text rendering of store slices.

use timetrack_http::{Named, Recap, Track, TrackQuery};
use timetrack_store::{RecapSlice, Slice, Store, TracksSlice};

pub const LOADING: &str = "Loading...";

/// Status lines shown above a slice's content.
fn status<T, Q>(slice: &Slice<T, Q>, has_data: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &slice.error {
        lines.push(format!("Error: {}", error));
    }
    if slice.is_loading && !has_data {
        lines.push(LOADING.to_string());
    }
    lines
}

/// A titled list of named entities.
pub fn entity_list<E: Named, Q>(title: &str, slice: &Slice<Vec<E>, Q>) -> Vec<String> {
    let mut lines = vec![title.to_string()];
    lines.extend(status(slice, !slice.data.is_empty()));
    if slice.data.is_empty() && !slice.is_loading {
        lines.push(format!("  No {} yet", title.to_lowercase()));
    }
    lines.extend(
        slice
            .data
            .iter()
            .map(|e| format!("  #{} {}", e.id(), e.name())),
    );
    lines
}

pub fn format_minutes(minutes: f64) -> String {
    let total = minutes.round() as i64;
    match (total / 60, total % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {}m", h, m),
    }
}

fn track_window(query: Option<&TrackQuery>) -> String {
    match query {
        Some(TrackQuery { date: Some(date), .. }) => format!("Tracks on {}", date),
        Some(TrackQuery {
            start: Some(start),
            end: Some(end),
            ..
        }) => format!("Tracks from {} to {}", start, end),
        _ => "Tracks".to_string(),
    }
}

fn track_line(store: &Store, track: &Track) -> String {
    let (user, activity) = store.track_names(track);
    let mut line = format!(
        "  {}-{}  {}  {}  ({})",
        track.start_time.format("%H:%M"),
        track.end_time.format("%H:%M"),
        user,
        activity,
        format_minutes(track.duration_minutes()),
    );
    if let Some(comment) = track.comment.as_deref().filter(|c| !c.is_empty()) {
        line.push_str("  ");
        line.push_str(comment);
    }
    line
}

pub fn tracks(store: &Store, slice: &TracksSlice) -> Vec<String> {
    let page = &slice.data;
    let mut lines = vec![track_window(slice.query.as_ref())];
    lines.extend(status(slice, !page.is_empty()));
    if page.is_empty() && !slice.is_loading {
        lines.push("  No tracks".to_string());
    }
    lines.extend(page.results.iter().map(|t| track_line(store, t)));
    if page.next.is_some() {
        lines.push(format!("  ({} of {} shown)", page.len(), page.count));
    }
    lines
}

fn recap_body(recap: &Recap) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({} to {})", recap.display_label(), recap.start, recap.end),
        format!("Total: {}", format_minutes(recap.total_minutes)),
    ];
    let width = recap
        .entries
        .iter()
        .map(|e| e.activity.len())
        .max()
        .unwrap_or(0);
    for entry in &recap.entries {
        let mut line = format!(
            "  {:<width$}  {}",
            entry.activity,
            format_minutes(entry.minutes),
            width = width
        );
        if let Some(percentage) = entry.percentage {
            line.push_str(&format!("  {:.0}%", percentage));
        }
        lines.push(line);
    }
    if let Some(count) = recap.tracks_count {
        lines.push(format!("{} tracks", count));
    }
    lines
}

pub fn recap(slice: &RecapSlice) -> Vec<String> {
    let mut lines = vec!["Recap".to_string()];
    lines.extend(status(slice, slice.data.is_some()));
    match &slice.data {
        Some(recap) => lines.extend(recap_body(recap)),
        None if !slice.is_loading => lines.push("  Nothing recorded".to_string()),
        None => {}
    }
    lines
}

/// Summary counts for the dashboard.
pub fn dashboard(store: &Store) -> Vec<String> {
    let users = store.users();
    let activities = store.activities();
    let tracks = store.tracks();
    let minutes: f64 = tracks.data.results.iter().map(Track::duration_minutes).sum();

    let count = |loading: bool, n: usize| {
        if loading && n == 0 {
            "...".to_string()
        } else {
            n.to_string()
        }
    };
    let mut lines = vec![
        "Time tracker".to_string(),
        format!("  Users: {}", count(users.is_loading, users.data.len())),
        format!(
            "  Activities: {}",
            count(activities.is_loading, activities.data.len())
        ),
        format!(
            "  {}: {} ({})",
            track_window(tracks.query.as_ref()),
            count(tracks.is_loading, tracks.data.len()),
            format_minutes(minutes)
        ),
    ];
    for error in [&users.error, &activities.error, &tracks.error]
        .into_iter()
        .flatten()
    {
        lines.push(format!("Error: {}", error));
    }
    lines
}
