//! Action kinds and `/Next` chaining

use super::{GoToAction, LaunchAction, NamedAction, RemoteGoToAction, UriAction};
use crate::document::PdfDocument;
use crate::objects::{IndirectRef, PdfArray, PdfDictionary, PdfObject};

/// PDF action types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    GoTo,
    GoToR,
    Launch,
    Named,
    URI,
}

impl ActionType {
    pub fn to_name(&self) -> &'static str {
        match self {
            ActionType::GoTo => "GoTo",
            ActionType::GoToR => "GoToR",
            ActionType::Launch => "Launch",
            ActionType::Named => "Named",
            ActionType::URI => "URI",
        }
    }
}

/// PDF action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    GoTo(GoToAction),
    GoToR(RemoteGoToAction),
    URI(UriAction),
    Named(NamedAction),
    Launch(LaunchAction),
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::GoTo(_) => ActionType::GoTo,
            Action::GoToR(_) => ActionType::GoToR,
            Action::URI(_) => ActionType::URI,
            Action::Named(_) => ActionType::Named,
            Action::Launch(_) => ActionType::Launch,
        }
    }

    pub fn to_dict(&self) -> PdfDictionary {
        match self {
            Action::GoTo(action) => action.to_dict(),
            Action::GoToR(action) => action.to_dict(),
            Action::URI(action) => action.to_dict(),
            Action::Named(action) => action.to_dict(),
            Action::Launch(action) => action.to_dict(),
        }
    }
}

impl From<GoToAction> for Action {
    fn from(action: GoToAction) -> Self {
        Action::GoTo(action)
    }
}

impl From<RemoteGoToAction> for Action {
    fn from(action: RemoteGoToAction) -> Self {
        Action::GoToR(action)
    }
}

impl From<UriAction> for Action {
    fn from(action: UriAction) -> Self {
        Action::URI(action)
    }
}

impl From<NamedAction> for Action {
    fn from(action: NamedAction) -> Self {
        Action::Named(action)
    }
}

impl From<LaunchAction> for Action {
    fn from(action: LaunchAction) -> Self {
        Action::Launch(action)
    }
}

/// An action plus the actions performed after it (`/Next`).
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDictionary {
    pub action: Action,
    pub next: Vec<ActionDictionary>,
}

impl ActionDictionary {
    pub fn new(action: impl Into<Action>) -> Self {
        Self {
            action: action.into(),
            next: Vec::new(),
        }
    }

    /// Queue `next` after this action and its already queued successors.
    pub fn then(mut self, next: impl Into<ActionDictionary>) -> Self {
        self.next.push(next.into());
        self
    }

    /// `/Next` holds a single dictionary or an array of them.
    pub fn to_dict(&self) -> PdfDictionary {
        let mut dict = self.action.to_dict();
        match self.next.as_slice() {
            [] => {}
            [single] => dict.set("Next", single.to_dict()),
            many => {
                let array: PdfArray = many.iter().map(|n| PdfObject::from(n.to_dict())).collect();
                dict.set("Next", array);
            }
        }
        dict
    }

    /// Adds the action to `doc` as an indirect object.
    pub fn make_indirect(&self, doc: &mut PdfDocument) -> IndirectRef {
        doc.add_object(self.to_dict())
    }
}

macro_rules! impl_from_action {
    ($($kind:ty),*) => {
        $(
            impl From<$kind> for ActionDictionary {
                fn from(action: $kind) -> Self {
                    Self::new(action)
                }
            }
        )*
    };
}

impl_from_action!(Action, GoToAction, RemoteGoToAction, UriAction, NamedAction, LaunchAction);
