//! PDF actions according to ISO 32000-1 Chapter 12.6
//!
//! Thin builders over [`PdfDictionary`](crate::objects::PdfDictionary) that
//! produce action and destination objects ready to be added to a document.

mod action;
mod destination;
mod goto_action;
mod launch_action;
mod named_action;
mod uri_action;

pub use action::{Action, ActionDictionary, ActionType};
pub use destination::{
    Destination, DestinationType, PageTarget, StructureDestination, StructureElement,
};
pub use goto_action::{GoToAction, RemoteDestination, RemoteGoToAction};
pub use launch_action::{LaunchAction, LaunchParameters, WindowsLaunchParams};
pub use named_action::{NamedAction, StandardNamedAction};
pub use uri_action::UriAction;
