//! Theme Module
//!
//! Light/dark display mode for a page session. [`ThemeBus`] owns the current
//! theme and an ordered list of subscribers. A [`ThemeSurface`] mirrors the
//! theme into the presentation layer and a [`PreferenceStore`] keeps the
//! choice under the `theme` key.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut bus = ThemeBus::restore(RootClasses::default(), store);
//! bus.subscribe(|theme| println!("now {theme}"));
//! let toggled = bus.toggle();
//! ```

mod store;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

pub use store::{FileStore, MemoryStore, PreferenceStore};

/// Storage key of the persisted theme.
pub const THEME_KEY: &str = "theme";

/// Root class that marks dark mode.
pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn from_dark_flag(dark: bool) -> Self {
        if dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn flipped(&self) -> Self {
        Theme::from_dark_flag(!self.is_dark())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation side of the theme: a single dark flag.
pub trait ThemeSurface {
    fn is_dark(&self) -> bool;
    fn apply(&mut self, theme: Theme);
}

/// Class list of the document root. Dark mode is the presence of the
/// `dark` class.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RootClasses {
    classes: BTreeSet<String>,
}

impl RootClasses {
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

impl ThemeSurface for RootClasses {
    fn is_dark(&self) -> bool {
        self.contains(DARK_CLASS)
    }

    fn apply(&mut self, theme: Theme) {
        if theme.is_dark() {
            self.classes.insert(DARK_CLASS.to_string());
        } else {
            self.classes.remove(DARK_CLASS);
        }
    }
}

pub type Subscriber = Box<dyn FnMut(Theme) + Send>;

/// Result of a toggle. The theme has flipped even when `persisted` is an
/// error.
#[derive(Debug)]
pub struct Toggled {
    pub theme: Theme,
    pub persisted: Result<(), StorageError>,
}

pub struct ThemeBus<S, P> {
    current: Theme,
    surface: S,
    store: P,
    subscribers: Vec<Subscriber>,
}

impl<S: ThemeSurface, P: PreferenceStore> ThemeBus<S, P> {
    /// Starts a session on `initial` and mirrors it onto the surface.
    pub fn new(initial: Theme, mut surface: S, store: P) -> Self {
        surface.apply(initial);
        Self {
            current: initial,
            surface,
            store,
            subscribers: Vec::new(),
        }
    }

    /// Starts a session on whatever the surface currently shows.
    pub fn observe(surface: S, store: P) -> Self {
        let initial = Theme::from_dark_flag(surface.is_dark());
        Self::new(initial, surface, store)
    }

    /// Page bootstrap: the stored preference wins over the surface, and the
    /// surface is brought in line with it.
    pub fn restore(surface: S, store: P) -> Self {
        let stored = store.get(THEME_KEY).and_then(|v| Theme::from_str(&v));
        let initial = stored.unwrap_or_else(|| Theme::from_dark_flag(surface.is_dark()));
        tracing::info!(theme = %initial, from_store = stored.is_some(), "theme restored");
        Self::new(initial, surface, store)
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Appends a subscriber. Registering the same callback twice means it is
    /// called twice per toggle.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(Theme) + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    pub fn toggle(&mut self) -> Toggled {
        let theme = Theme::from_dark_flag(!self.current.is_dark());
        self.current = theme;
        self.surface.apply(theme);

        let persisted = self.store.set(THEME_KEY, theme.as_str());
        if let Err(e) = &persisted {
            tracing::warn!(error = %e, theme = %theme, "failed to persist theme preference");
        }

        for subscriber in self.subscribers.iter_mut() {
            subscriber(theme);
        }

        Toggled { theme, persisted }
    }
}

impl<S, P> fmt::Debug for ThemeBus<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeBus")
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct BrokenStore;

    impl PreferenceStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("dark"), Some(Theme::Dark));
        assert_eq!(Theme::from_str(" Light "), Some(Theme::Light));
        assert_eq!(Theme::from_str("sepia"), None);
        assert_eq!(Theme::Dark.flipped(), Theme::Light);
        assert_eq!(Theme::Light.to_string(), "light");
    }

    #[test]
    fn test_toggle_alternates_from_observed_state() {
        for dark in [true, false] {
            let surface = if dark {
                RootClasses::with_classes(["antialiased", "dark"])
            } else {
                RootClasses::with_classes(["antialiased"])
            };
            let mut bus = ThemeBus::observe(surface, MemoryStore::new());
            let start = Theme::from_dark_flag(dark);
            assert_eq!(bus.current(), start);

            let mut expected = start;
            for _ in 0..5 {
                expected = expected.flipped();
                let toggled = bus.toggle();
                assert_eq!(toggled.theme, expected);
                assert!(toggled.persisted.is_ok());
                assert_eq!(bus.current(), expected);
                assert_eq!(bus.surface().is_dark(), expected.is_dark());
                assert!(bus.surface().contains("antialiased"));
                assert_eq!(bus.store().get(THEME_KEY).as_deref(), Some(expected.as_str()));
            }
        }
    }

    #[test]
    fn test_subscribers_called_once_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut bus = ThemeBus::new(Theme::Light, RootClasses::default(), MemoryStore::new());

        for id in 0..3 {
            let calls = calls.clone();
            bus.subscribe(move |theme| calls.lock().unwrap().push((id, theme)));
        }

        bus.toggle();
        assert_eq!(
            *calls.lock().unwrap(),
            vec![(0, Theme::Dark), (1, Theme::Dark), (2, Theme::Dark)]
        );

        bus.toggle();
        assert_eq!(calls.lock().unwrap().len(), 6);
        assert_eq!(calls.lock().unwrap()[3..], [(0, Theme::Light), (1, Theme::Light), (2, Theme::Light)]);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_toggles() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = ThemeBus::new(Theme::Dark, RootClasses::default(), MemoryStore::new());
        bus.toggle();

        let counter = count.clone();
        bus.subscribe(move |_| *counter.lock().unwrap() += 1);
        bus.toggle();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_subscription_is_called_twice() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = ThemeBus::new(Theme::Dark, RootClasses::default(), MemoryStore::new());

        for _ in 0..2 {
            let counter = count.clone();
            bus.subscribe(move |_| *counter.lock().unwrap() += 1);
        }
        bus.toggle();

        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_storage_failure_still_flips() {
        let seen = Arc::new(Mutex::new(None));
        let mut bus = ThemeBus::new(Theme::Light, RootClasses::default(), BrokenStore);
        let sink = seen.clone();
        bus.subscribe(move |theme| *sink.lock().unwrap() = Some(theme));

        let toggled = bus.toggle();

        assert_eq!(toggled.theme, Theme::Dark);
        assert!(matches!(toggled.persisted, Err(StorageError::Unavailable(_))));
        assert_eq!(bus.current(), Theme::Dark);
        assert!(bus.surface().is_dark());
        assert_eq!(*seen.lock().unwrap(), Some(Theme::Dark));
    }

    #[test]
    fn test_restore_prefers_stored_value() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "dark").unwrap();

        let bus = ThemeBus::restore(RootClasses::default(), store);
        assert_eq!(bus.current(), Theme::Dark);
        assert!(bus.surface().is_dark());

        let bus = ThemeBus::restore(RootClasses::with_classes(["dark"]), MemoryStore::new());
        assert_eq!(bus.current(), Theme::Dark);

        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "light").unwrap();
        let bus = ThemeBus::restore(RootClasses::with_classes(["dark"]), store);
        assert_eq!(bus.current(), Theme::Light);
        assert!(!bus.surface().is_dark());
    }
}
