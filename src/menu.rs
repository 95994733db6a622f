//! Slide-out menu state and the feed list it contains.

use crate::registry::{FeedId, FeedRegistry};
use std::collections::BTreeSet;

/// Body class present while the menu is hidden.
pub const MENU_HIDDEN_CLASS: &str = "menu-hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    pub hidden: bool,
}

impl Default for MenuState {
    fn default() -> Self {
        Self { hidden: true }
    }
}

/// Owns the menu state and keeps the body class list in step with it.
#[derive(Debug)]
pub struct MenuController {
    state: MenuState,
    body_classes: BTreeSet<String>,
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuController {
    /// Starts hidden.
    pub fn new() -> Self {
        let mut controller = Self {
            state: MenuState::default(),
            body_classes: BTreeSet::new(),
        };
        controller.reflect();
        controller
    }

    /// Flips visibility and returns the new `hidden` value.
    pub fn toggle(&mut self) -> bool {
        self.state.hidden = !self.state.hidden;
        self.reflect();
        tracing::debug!(hidden = self.state.hidden, "Menu toggled");
        self.state.hidden
    }

    pub fn is_hidden(&self) -> bool {
        self.state.hidden
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    pub fn body_classes(&self) -> impl Iterator<Item = &str> {
        self.body_classes.iter().map(String::as_str)
    }

    fn reflect(&mut self) {
        if self.state.hidden {
            self.body_classes.insert(MENU_HIDDEN_CLASS.to_string());
        } else {
            self.body_classes.remove(MENU_HIDDEN_CLASS);
        }
    }
}

/// Opaque handle on a rendered menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub handle: ItemHandle,
    pub feed_id: FeedId,
    pub name: String,
}

/// The feed list shown inside the menu, one item per registered feed.
#[derive(Debug, Clone)]
pub struct FeedMenu {
    items: Vec<MenuItem>,
}

impl FeedMenu {
    pub fn from_registry(registry: &FeedRegistry) -> Self {
        let items = registry
            .iter()
            .enumerate()
            .map(|(i, feed)| MenuItem {
                handle: ItemHandle(i),
                feed_id: feed.id,
                name: feed.name.clone(),
            })
            .collect();
        Self { items }
    }

    /// Feed selected by clicking the item behind `handle`.
    pub fn feed_id_of(&self, handle: ItemHandle) -> Option<FeedId> {
        self.get(handle).map(|item| item.feed_id)
    }

    pub fn get(&self, handle: ItemHandle) -> Option<&MenuItem> {
        self.items.get(handle.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FeedSource;

    #[test]
    fn test_hidden_by_default() {
        let menu = MenuController::new();
        assert!(menu.is_hidden());
        assert!(menu.body_has_class(MENU_HIDDEN_CLASS));
        assert_eq!(menu.state(), MenuState { hidden: true });
    }

    #[test]
    fn test_toggle_pair_restores_hidden() {
        let mut menu = MenuController::default();

        assert!(!menu.toggle());
        assert!(!menu.is_hidden());
        assert!(!menu.body_has_class(MENU_HIDDEN_CLASS));
        assert_eq!(menu.body_classes().count(), 0);

        assert!(menu.toggle());
        assert!(menu.is_hidden());
        assert!(menu.body_has_class(MENU_HIDDEN_CLASS));
    }

    #[test]
    fn test_feed_menu_items_map_to_valid_feeds() {
        let registry = FeedRegistry::default();
        let menu = FeedMenu::from_registry(&registry);

        assert_eq!(menu.len(), registry.count());
        for item in menu.iter() {
            let feed_id = menu.feed_id_of(item.handle).unwrap();
            assert!(feed_id < registry.count());
            assert_eq!(registry.get(feed_id).unwrap().name, item.name);
        }
    }

    #[test]
    fn test_feed_menu_preserves_order() {
        let registry = FeedRegistry::from_sources(vec![
            FeedSource::new("Zeta", "https://z.example.com"),
            FeedSource::new("Alpha", "https://a.example.com"),
        ])
        .unwrap();
        let names: Vec<_> = FeedMenu::from_registry(&registry)
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }
}
