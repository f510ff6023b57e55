//! Named actions for executing predefined viewer operations

use crate::objects::{PdfDictionary, PdfName};

/// Named actions every conforming reader supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardNamedAction {
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
}

impl StandardNamedAction {
    pub fn to_name(&self) -> &'static str {
        match self {
            StandardNamedAction::NextPage => "NextPage",
            StandardNamedAction::PrevPage => "PrevPage",
            StandardNamedAction::FirstPage => "FirstPage",
            StandardNamedAction::LastPage => "LastPage",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NextPage" => Some(StandardNamedAction::NextPage),
            "PrevPage" => Some(StandardNamedAction::PrevPage),
            "FirstPage" => Some(StandardNamedAction::FirstPage),
            "LastPage" => Some(StandardNamedAction::LastPage),
            _ => None,
        }
    }
}

/// Named action - execute a predefined action
#[derive(Debug, Clone, PartialEq)]
pub enum NamedAction {
    Standard(StandardNamedAction),
    /// Viewer-specific name, e.g. `Print`
    Custom(String),
}

impl NamedAction {
    /// Standard names map to [`NamedAction::Standard`], anything else is custom.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        match StandardNamedAction::from_name(&name) {
            Some(standard) => NamedAction::Standard(standard),
            None => NamedAction::Custom(name),
        }
    }

    pub fn next_page() -> Self {
        NamedAction::Standard(StandardNamedAction::NextPage)
    }

    pub fn prev_page() -> Self {
        NamedAction::Standard(StandardNamedAction::PrevPage)
    }

    pub fn first_page() -> Self {
        NamedAction::Standard(StandardNamedAction::FirstPage)
    }

    pub fn last_page() -> Self {
        NamedAction::Standard(StandardNamedAction::LastPage)
    }

    pub fn name(&self) -> &str {
        match self {
            NamedAction::Standard(standard) => standard.to_name(),
            NamedAction::Custom(name) => name,
        }
    }

    pub fn to_dict(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::with_type("Action");
        dict.set("S", PdfName::new("Named"));
        dict.set("N", PdfName::new(self.name()));
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names() {
        assert_eq!(NamedAction::new("LastPage"), NamedAction::last_page());
        assert_eq!(NamedAction::first_page().name(), "FirstPage");
        assert_eq!(StandardNamedAction::from_name("Print"), None);
    }

    #[test]
    fn test_named_action_dict() {
        let dict = NamedAction::next_page().to_dict();
        assert_eq!(dict.get_name("S").map(PdfName::as_str), Some("Named"));
        assert_eq!(dict.get_name("N").map(PdfName::as_str), Some("NextPage"));
    }

    #[test]
    fn test_custom_named_action() {
        let action = NamedAction::new("Print");
        assert_eq!(action, NamedAction::Custom("Print".to_string()));
        assert_eq!(action.to_dict().get_name("N").map(PdfName::as_str), Some("Print"));
    }
}
