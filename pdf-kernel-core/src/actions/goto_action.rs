//! GoTo actions for navigating within and between documents

use super::destination::{Destination, PageTarget, StructureDestination, StructureElement};
use crate::objects::{PdfDictionary, PdfName, PdfObject, PdfString};
use tracing::{info, warn};

/// GoTo action - navigate to a destination in the current document
#[derive(Debug, Clone, PartialEq)]
pub struct GoToAction {
    pub destination: Destination,
    /// Optional structure destination, preferred by PDF 2.0 readers
    pub structure_destination: Option<StructureDestination>,
}

impl GoToAction {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            structure_destination: None,
        }
    }

    /// Create action to go to specific page
    pub fn to_page(page_number: u32) -> Self {
        Self::new(Destination::fit(PageTarget::Number(page_number)))
    }

    pub fn to_page_xyz(page_number: u32, x: f64, y: f64, zoom: Option<f64>) -> Self {
        Self::new(Destination::xyz(
            PageTarget::Number(page_number),
            Some(x),
            Some(y),
            zoom,
        ))
    }

    pub fn with_structure_destination(mut self, destination: StructureDestination) -> Self {
        self.structure_destination = Some(destination);
        self
    }

    pub fn to_dict(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::with_type("Action");
        dict.set("S", PdfName::new("GoTo"));
        dict.set("D", self.destination.to_array());
        if let Some(sd) = &self.structure_destination {
            dict.set("SD", sd.to_array());
        }
        dict
    }
}

/// Where in the remote document to go
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteDestination {
    /// Page number (0-based)
    PageNumber(u32),
    /// Named destination
    Named(String),
    /// Explicit destination
    Explicit(Destination),
}

/// Remote GoTo action - navigate to a destination in another PDF document
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteGoToAction {
    /// File specification (path to the PDF)
    pub file: String,
    pub destination: Option<RemoteDestination>,
    pub structure_destination: Option<StructureDestination>,
    pub new_window: Option<bool>,
}

impl RemoteGoToAction {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            destination: None,
            structure_destination: None,
            new_window: None,
        }
    }

    pub fn to_page(mut self, page: u32) -> Self {
        self.destination = Some(RemoteDestination::PageNumber(page));
        self
    }

    pub fn to_named(mut self, name: impl Into<String>) -> Self {
        self.destination = Some(RemoteDestination::Named(name.into()));
        self
    }

    /// Explicit destination. The page should be given by number; a page
    /// reference cannot be resolved in another file but is written as given.
    pub fn to_destination(mut self, destination: Destination) -> Self {
        if destination.is_page_reference() {
            warn!(
                file = %self.file,
                "remote go-to destination should address the page by number, keeping page reference"
            );
        }
        self.destination = Some(RemoteDestination::Explicit(destination));
        self
    }

    pub fn to_structure_destination(mut self, destination: StructureDestination) -> Self {
        if matches!(destination.element, StructureElement::Reference(_)) {
            warn!(
                file = %self.file,
                "remote structure destination should address the element by ID, keeping reference"
            );
        }
        self.structure_destination = Some(destination);
        self
    }

    /// Structure destination for `element`, a structure element dictionary
    /// of the remote document. Elements carrying `/ID` are addressed by it.
    pub fn to_structure_element(
        self,
        element: &PdfDictionary,
        fallback: StructureDestination,
    ) -> Self {
        let id = element.get("ID").and_then(PdfObject::as_string).cloned();
        match id {
            Some(id) => {
                info!(
                    id = %String::from_utf8_lossy(id.as_bytes()),
                    "replacing structure element with its ID"
                );
                let destination = StructureDestination::new(
                    StructureElement::Id(id),
                    fallback.dest_type,
                );
                self.to_structure_destination(destination)
            }
            None => self.to_structure_destination(fallback),
        }
    }

    pub fn in_new_window(mut self, new_window: bool) -> Self {
        self.new_window = Some(new_window);
        self
    }

    pub fn to_dict(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::with_type("Action");
        dict.set("S", PdfName::new("GoToR"));
        dict.set("F", PdfString::new(self.file.as_str()));

        match &self.destination {
            Some(RemoteDestination::PageNumber(page)) => {
                let dest = Destination::fit(PageTarget::Number(*page));
                dict.set("D", dest.to_array());
            }
            Some(RemoteDestination::Named(name)) => dict.set("D", PdfString::new(name.as_str())),
            Some(RemoteDestination::Explicit(destination)) => {
                dict.set("D", destination.to_array())
            }
            None => {}
        }
        if let Some(sd) = &self.structure_destination {
            dict.set("SD", sd.to_array());
        }
        if let Some(new_window) = self.new_window {
            dict.set("NewWindow", new_window);
        }
        dict
    }
}
