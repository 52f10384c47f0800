//! In-place merges that keep each slice in its display order.

use std::cmp::Ordering;

use timetrack_http::{EntityId, Named, Page, Track};

/// Case-insensitive name order, ties broken by the exact string.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Insert or replace `entity`, keeping `items` sorted by name.
pub(crate) fn upsert_by_name<T: Named>(items: &mut Vec<T>, entity: T) {
    items.retain(|e| e.id() != entity.id());
    let pos = items.partition_point(|e| collate(e.name(), entity.name()) != Ordering::Greater);
    items.insert(pos, entity);
}

pub(crate) fn remove_by_id<T: Named>(items: &mut Vec<T>, id: EntityId) -> bool {
    let before = items.len();
    items.retain(|e| e.id() != id);
    items.len() != before
}

/// Insert or replace `track`, keeping the page newest-first.
pub(crate) fn upsert_track(page: &mut Page<Track>, track: Track) {
    let before = page.results.len();
    page.results.retain(|t| t.id != track.id);
    let replaced = page.results.len() != before;

    let pos = page
        .results
        .partition_point(|t| t.start_time >= track.start_time);
    page.results.insert(pos, track);

    if !replaced {
        page.count += 1;
    }
}

/// Drop every track matching `pred`; returns how many went.
pub(crate) fn remove_tracks(page: &mut Page<Track>, pred: impl Fn(&Track) -> bool) -> usize {
    let before = page.results.len();
    page.results.retain(|t| !pred(t));
    let removed = before - page.results.len();
    page.count = page.count.saturating_sub(removed as u64);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use timetrack_http::User;

    fn user(id: EntityId, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn track(id: EntityId, start: &str) -> Track {
        serde_json::from_value(json!({
            "id": id,
            "user": 1,
            "activity": 1,
            "start_time": start,
            "end_time": start,
        }))
        .unwrap()
    }

    fn names(items: &[User]) -> Vec<&str> {
        items.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn upsert_by_name_collates_case_insensitively() {
        let mut users = vec![user(1, "ada"), user(2, "Carl")];
        upsert_by_name(&mut users, user(3, "Bea"));
        upsert_by_name(&mut users, user(4, "zed"));
        upsert_by_name(&mut users, user(5, "Aaron"));

        assert_eq!(names(&users), vec!["Aaron", "ada", "Bea", "Carl", "zed"]);
    }

    #[test]
    fn upsert_by_name_replaces_same_id() {
        let mut users = vec![user(1, "Ada"), user(2, "Carl")];
        upsert_by_name(&mut users, user(1, "Dora"));

        assert_eq!(names(&users), vec!["Carl", "Dora"]);
    }

    #[test]
    fn remove_by_id_reports_change() {
        let mut users = vec![user(1, "Ada")];
        assert!(!remove_by_id(&mut users, 2));
        assert!(remove_by_id(&mut users, 1));
        assert!(users.is_empty());
    }

    #[test]
    fn upsert_track_keeps_newest_first() {
        let mut page = Page {
            count: 2,
            next: None,
            previous: None,
            results: vec![
                track(1, "2024-05-01T15:00:00Z"),
                track(2, "2024-05-01T09:00:00Z"),
            ],
        };

        upsert_track(&mut page, track(3, "2024-05-01T12:00:00Z"));

        let ids: Vec<EntityId> = page.results.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(page.count, 3);
    }

    #[test]
    fn upsert_track_compares_instants_across_offsets() {
        let mut page = Page {
            count: 1,
            next: None,
            previous: None,
            results: vec![track(1, "2024-05-01T12:00:00+00:00")],
        };

        // 13:00+02:00 is 11:00 UTC, earlier than the existing entry
        upsert_track(&mut page, track(2, "2024-05-01T13:00:00+02:00"));

        assert_eq!(page.results[1].id, 2);
    }

    #[test]
    fn remove_tracks_updates_count() {
        let mut page = Page {
            count: 10,
            next: None,
            previous: None,
            results: vec![
                track(1, "2024-05-01T15:00:00Z"),
                track(2, "2024-05-01T09:00:00Z"),
            ],
        };

        assert_eq!(remove_tracks(&mut page, |t| t.id == 2), 1);
        assert_eq!(page.count, 9);
    }
}
