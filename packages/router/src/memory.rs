//! In-memory hosts for tests and headless rendering.
//!
//! [`MemoryDocument`] keeps a history stack and a set of navigation links;
//! [`MemoryOutlet`] collects rendered lines. Neither needs a browser.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::host::{Document, LinkClick, NavEvent, Outlet};

/// Document with an in-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    /// Visited paths; `index` points at the current one.
    history: Vec<String>,
    index: usize,
    /// Navigation links by href, with their active flag.
    links: BTreeMap<String, bool>,
    listening: bool,
    /// Number of `push_state` calls.
    pushes: usize,
}

impl MemoryDocument {
    /// Create a document whose location is `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            history: vec![path.into()],
            index: 0,
            links: BTreeMap::new(),
            listening: false,
            pushes: 0,
        }
    }

    /// Add navigation links, all inactive.
    pub fn with_links(mut self, hrefs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for href in hrefs {
            self.links.insert(href.into(), false);
        }
        self
    }

    /// Step back in history. Returns the event the host would fire, or
    /// `None` at the start of history.
    pub fn back(&mut self) -> Option<NavEvent> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(NavEvent::PopState)
    }

    pub fn forward(&mut self) -> Option<NavEvent> {
        if self.index + 1 >= self.history.len() {
            return None;
        }
        self.index += 1;
        Some(NavEvent::PopState)
    }

    /// Build the click event for the link with `href`.
    pub fn click(&self, href: &str) -> NavEvent {
        NavEvent::Click(LinkClick::new(href))
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn push_count(&self) -> usize {
        self.pushes
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn is_link_active(&self, href: &str) -> bool {
        self.links.get(href).copied().unwrap_or(false)
    }

    /// Hrefs of the links currently marked active.
    pub fn active_links(&self) -> Vec<&str> {
        self.links
            .iter()
            .filter(|(_, active)| **active)
            .map(|(href, _)| href.as_str())
            .collect()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Document for MemoryDocument {
    fn location_path(&self) -> String {
        self.history[self.index].clone()
    }

    fn push_state(&mut self, path: &str) {
        self.history.truncate(self.index + 1);
        self.history.push(path.to_string());
        self.index = self.history.len() - 1;
        self.pushes += 1;
    }

    fn nav_link_targets(&self) -> Vec<String> {
        self.links.keys().cloned().collect()
    }

    fn set_link_active(&mut self, href: &str, active: bool) {
        if let Some(flag) = self.links.get_mut(href) {
            *flag = active;
        }
    }

    fn add_navigation_listeners(&mut self) {
        self.listening = true;
    }

    fn remove_navigation_listeners(&mut self) {
        self.listening = false;
    }
}

#[derive(Debug, Default)]
struct OutletState {
    lines: Vec<String>,
    /// Number of writes and clears.
    mutations: usize,
}

/// Outlet that collects lines of text.
///
/// Clones share the same buffer, like DOM node handles.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutlet {
    state: Rc<RefCell<OutletState>>,
}

impl MemoryOutlet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, line: impl Into<String>) {
        let mut state = self.state.borrow_mut();
        state.lines.push(line.into());
        state.mutations += 1;
    }

    /// Replace the whole content.
    pub fn set_lines(&self, lines: impl IntoIterator<Item = impl Into<String>>) {
        let mut state = self.state.borrow_mut();
        state.lines = lines.into_iter().map(Into::into).collect();
        state.mutations += 1;
    }

    pub fn lines(&self) -> Vec<String> {
        self.state.borrow().lines.clone()
    }

    /// Content joined with newlines.
    pub fn text(&self) -> String {
        self.state.borrow().lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().lines.is_empty()
    }

    pub fn mutation_count(&self) -> usize {
        self.state.borrow().mutations
    }

    /// True if both handles refer to the same outlet.
    pub fn same_outlet(&self, other: &MemoryOutlet) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Outlet for MemoryOutlet {
    fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.lines.clear();
        state.mutations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_state_truncates_forward_history() {
        let mut doc = MemoryDocument::new("/");
        doc.push_state("/users");
        doc.push_state("/tracks");
        assert_eq!(doc.back(), Some(NavEvent::PopState));
        assert_eq!(doc.location_path(), "/users");

        doc.push_state("/recap");
        assert_eq!(doc.history(), ["/", "/users", "/recap"]);
        assert_eq!(doc.forward(), None);
        assert_eq!(doc.push_count(), 3);
    }

    #[test]
    fn back_stops_at_first_entry() {
        let mut doc = MemoryDocument::new("/");
        assert_eq!(doc.back(), None);
        assert_eq!(doc.location_path(), "/");
    }

    #[test]
    fn only_known_links_can_be_activated() {
        let mut doc = MemoryDocument::new("/").with_links(["/", "/users"]);
        doc.set_link_active("/users", true);
        doc.set_link_active("/nope", true);

        assert_eq!(doc.active_links(), vec!["/users"]);
        assert_eq!(doc.nav_link_targets(), vec!["/", "/users"]);
    }

    #[test]
    fn outlet_clones_share_content() {
        let outlet = MemoryOutlet::new();
        let handle = outlet.clone();
        handle.push_line("Users");
        handle.push_line("Ada");

        assert_eq!(outlet.text(), "Users\nAda");
        assert!(outlet.same_outlet(&handle));

        outlet.clear();
        assert!(handle.is_empty());
        assert_eq!(handle.mutation_count(), 3);
    }
}
