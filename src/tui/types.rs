//! TUI type definitions

/// Which input of the add-meal form has focus
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum FormField {
    #[default]
    Name,
    Time,
    List,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Time,
            FormField::Time => FormField::List,
            FormField::List => FormField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Name => FormField::List,
            FormField::Time => FormField::Name,
            FormField::List => FormField::Time,
        }
    }
}

/// Entries of the Tools menu
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuItem {
    FoodWastePreventer,
    Quit,
}

pub const MENU_ITEMS: &[MenuItem] = &[MenuItem::FoodWastePreventer, MenuItem::Quit];

impl MenuItem {
    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::FoodWastePreventer => "Food Waste Preventer",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MenuItem::FoodWastePreventer => "Daily reminders to eat what you cooked",
            MenuItem::Quit => "Leave leftovers",
        }
    }
}
