//! Host abstraction for the router.
//!
//! The router core interacts with its environment only through these traits,
//! so a browser binding, a terminal shell or a test can each provide their
//! own implementation.

/// Location, history and navigation links of the hosting document.
pub trait Document {
    /// Path of the current location, as the user sees it.
    fn location_path(&self) -> String;

    /// Push a new history entry for `path` without reloading.
    fn push_state(&mut self, path: &str);

    /// `href` of every navigation link that should reflect the active route.
    fn nav_link_targets(&self) -> Vec<String>;

    /// Mark the link with `href` as active or inactive.
    fn set_link_active(&mut self, href: &str, active: bool);

    /// Start forwarding back/forward and link click events to the router.
    ///
    /// Installs one delegated click listener and one history listener.
    fn add_navigation_listeners(&mut self);

    /// Stop forwarding events. Undoes [`Document::add_navigation_listeners`].
    fn remove_navigation_listeners(&mut self);
}

/// The container views render into.
///
/// Outlets are handles: cloning one yields another reference to the same
/// container, which is how views keep writing to it after mounting.
pub trait Outlet {
    /// Remove everything a previous view rendered.
    fn clear(&self);
}

/// A click on (or inside) an element, as seen by the delegated listener.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkClick {
    /// `href` of the closest enclosing anchor, if any.
    pub href: Option<String>,
    /// The anchor's `target` attribute.
    pub target: Option<String>,
    /// Whether the anchor has a `download` attribute.
    pub download: bool,
    /// Whether ctrl, meta, shift or alt was held.
    pub modifier: bool,
}

impl LinkClick {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::default()
        }
    }

    /// A click that did not land on an anchor.
    pub fn outside_link() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    pub fn with_modifier(mut self) -> Self {
        self.modifier = true;
        self
    }

    /// The href the router should navigate to, or `None` if the click must
    /// be left to the browser.
    pub fn intercepted_href(&self) -> Option<&str> {
        let href = self.href.as_deref()?;
        if !href.starts_with('/') || href.starts_with("//") {
            return None;
        }
        if self.target.as_deref() == Some("_blank") || self.download || self.modifier {
            return None;
        }
        Some(href)
    }
}

/// A navigation event forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Click(LinkClick),
    /// The user moved through history; the location already changed.
    PopState,
}

/// What the router did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The router acted on the event; for clicks the host must prevent the
    /// default action.
    Handled,
    Ignored,
}
