//! Menu buttons
//!
//! A menu either ships its options up front (`Static`) or fetches them each
//! time it is opened (`Dynamic`), and selects either one value (`Radio`) or
//! any number of values (`Checkbox`).

use serde::Serialize;

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            sub_label: None,
        }
    }

    pub fn with_sub_label(mut self, sub_label: impl Into<String>) -> Self {
        self.sub_label = Some(sub_label.into());
        self
    }
}

/// Where options come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSource {
    Static,
    Dynamic,
}

/// How many values can be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    Radio,
    Checkbox,
}

/// What a click on an option did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    /// Radio selection moved to a new value
    Selected(MenuOption),
    /// Checkbox flipped; `true` when now checked
    Toggled(MenuOption, bool),
    /// Click had no effect (re-selecting the current radio value, unknown value)
    Unchanged,
}

/// Menu button state
#[derive(Debug, Clone, Serialize)]
pub struct MenuState {
    source: OptionSource,
    mode: SelectionMode,
    options: Vec<MenuOption>,
    selected: Vec<String>,
    loading: bool,
}

impl MenuState {
    pub fn new_static(mode: SelectionMode, options: Vec<MenuOption>) -> Self {
        Self {
            source: OptionSource::Static,
            mode,
            options,
            selected: Vec::new(),
            loading: false,
        }
    }

    pub fn new_dynamic(mode: SelectionMode) -> Self {
        Self {
            source: OptionSource::Dynamic,
            mode,
            options: Vec::new(),
            selected: Vec::new(),
            loading: false,
        }
    }

    pub fn source(&self) -> OptionSource {
        self.source
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn options(&self) -> &[MenuOption] {
        &self.options
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Opening a dynamic menu starts a fetch; returns whether one is owed
    pub fn open(&mut self) -> bool {
        match self.source {
            OptionSource::Static => false,
            OptionSource::Dynamic => {
                self.loading = true;
                true
            }
        }
    }

    /// Fetched options replace the current list. Selections that vanished are dropped.
    pub fn options_fetched(&mut self, options: Vec<MenuOption>) {
        self.loading = false;
        self.selected
            .retain(|value| options.iter().any(|o| &o.value == value));
        self.options = options;
    }

    /// Failed fetches leave an empty menu
    pub fn fetch_failed(&mut self) {
        self.loading = false;
        self.options.clear();
        self.selected.clear();
    }

    /// Mark a value selected without emitting an event (initial state)
    pub fn preselect(&mut self, value: impl Into<String>) {
        let value = value.into();
        match self.mode {
            SelectionMode::Radio => self.selected = vec![value],
            SelectionMode::Checkbox => {
                if !self.selected.contains(&value) {
                    self.selected.push(value);
                }
            }
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|v| v == value)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Handle a click on `value`
    pub fn click(&mut self, value: &str) -> MenuEvent {
        let Some(option) = self.options.iter().find(|o| o.value == value).cloned() else {
            return MenuEvent::Unchanged;
        };

        match self.mode {
            SelectionMode::Radio => {
                if self.is_selected(value) {
                    MenuEvent::Unchanged
                } else {
                    self.selected = vec![option.value.clone()];
                    MenuEvent::Selected(option)
                }
            }
            SelectionMode::Checkbox => {
                let checked = if self.is_selected(value) {
                    self.selected.retain(|v| v != value);
                    false
                } else {
                    self.selected.push(option.value.clone());
                    true
                };
                MenuEvent::Toggled(option, checked)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> Vec<MenuOption> {
        vec![
            MenuOption::new("A", "a"),
            MenuOption::new("B", "b"),
            MenuOption::new("C", "c").with_sub_label("third"),
        ]
    }

    #[test]
    fn test_radio_selects_one() {
        let mut menu = MenuState::new_static(SelectionMode::Radio, abc());
        menu.preselect("a");
        assert_eq!(menu.click("a"), MenuEvent::Unchanged);
        assert!(matches!(menu.click("b"), MenuEvent::Selected(ref o) if o.value == "b"));
        assert_eq!(menu.selected(), ["b".to_string()]);
        assert_eq!(menu.click("zzz"), MenuEvent::Unchanged);
    }

    #[test]
    fn test_checkbox_toggles() {
        let mut menu = MenuState::new_static(SelectionMode::Checkbox, abc());
        assert!(matches!(menu.click("a"), MenuEvent::Toggled(_, true)));
        assert!(matches!(menu.click("c"), MenuEvent::Toggled(_, true)));
        assert!(matches!(menu.click("a"), MenuEvent::Toggled(_, false)));
        assert_eq!(menu.selected(), ["c".to_string()]);
    }

    #[test]
    fn test_dynamic_fetch_cycle() {
        let mut menu = MenuState::new_dynamic(SelectionMode::Radio);
        assert!(menu.open());
        assert!(menu.is_loading());

        menu.options_fetched(abc());
        menu.preselect("c");
        assert!(!menu.is_loading());

        // "c" disappears on the next fetch
        assert!(menu.open());
        menu.options_fetched(abc()[..2].to_vec());
        assert!(menu.selected().is_empty());

        menu.open();
        menu.fetch_failed();
        assert!(menu.options().is_empty());
    }

    #[test]
    fn test_static_never_fetches() {
        let mut menu = MenuState::new_static(SelectionMode::Radio, abc());
        assert!(!menu.open());
        assert!(!menu.is_loading());
    }
}
