//! Explicit destinations (ISO 32000-1 Section 12.3.2)

use crate::objects::{IndirectRef, PdfArray, PdfName, PdfObject, PdfString};

/// How the target is fitted into the window
#[derive(Debug, Clone, PartialEq)]
pub enum DestinationType {
    /// Position (left, top) at the upper-left corner, with zoom
    XYZ {
        left: Option<f64>,
        top: Option<f64>,
        zoom: Option<f64>,
    },
    /// Fit entire page in window
    Fit,
    /// Fit width of page in window
    FitH { top: Option<f64> },
    /// Fit height of page in window
    FitV { left: Option<f64> },
    /// Fit rectangle in window
    FitR {
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    },
    /// Fit page bounding box in window
    FitB,
    /// Fit width of bounding box
    FitBH { top: Option<f64> },
    /// Fit height of bounding box
    FitBV { left: Option<f64> },
}

impl DestinationType {
    fn push_to(&self, array: &mut PdfArray) {
        let optional = |value: &Option<f64>| value.map(PdfObject::from).unwrap_or_default();
        match self {
            DestinationType::XYZ { left, top, zoom } => {
                array.push(PdfName::new("XYZ"));
                array.push(optional(left));
                array.push(optional(top));
                array.push(optional(zoom));
            }
            DestinationType::Fit => array.push(PdfName::new("Fit")),
            DestinationType::FitH { top } => {
                array.push(PdfName::new("FitH"));
                array.push(optional(top));
            }
            DestinationType::FitV { left } => {
                array.push(PdfName::new("FitV"));
                array.push(optional(left));
            }
            DestinationType::FitR {
                left,
                bottom,
                right,
                top,
            } => {
                array.push(PdfName::new("FitR"));
                for value in [left, bottom, right, top] {
                    array.push(*value);
                }
            }
            DestinationType::FitB => array.push(PdfName::new("FitB")),
            DestinationType::FitBH { top } => {
                array.push(PdfName::new("FitBH"));
                array.push(optional(top));
            }
            DestinationType::FitBV { left } => {
                array.push(PdfName::new("FitBV"));
                array.push(optional(left));
            }
        }
    }
}

/// Page a destination points at
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageTarget {
    /// Page number (0-based), the only form valid for other documents
    Number(u32),
    /// Page object of the current document
    Reference(IndirectRef),
}

/// Explicit page destination
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub page: PageTarget,
    pub dest_type: DestinationType,
}

impl Destination {
    pub fn new(page: PageTarget, dest_type: DestinationType) -> Self {
        Self { page, dest_type }
    }

    pub fn xyz(page: PageTarget, left: Option<f64>, top: Option<f64>, zoom: Option<f64>) -> Self {
        Self::new(page, DestinationType::XYZ { left, top, zoom })
    }

    pub fn fit(page: PageTarget) -> Self {
        Self::new(page, DestinationType::Fit)
    }

    pub fn fit_h(page: PageTarget, top: Option<f64>) -> Self {
        Self::new(page, DestinationType::FitH { top })
    }

    pub fn fit_v(page: PageTarget, left: Option<f64>) -> Self {
        Self::new(page, DestinationType::FitV { left })
    }

    pub fn fit_r(page: PageTarget, left: f64, bottom: f64, right: f64, top: f64) -> Self {
        Self::new(
            page,
            DestinationType::FitR {
                left,
                bottom,
                right,
                top,
            },
        )
    }

    pub fn fit_b(page: PageTarget) -> Self {
        Self::new(page, DestinationType::FitB)
    }

    /// Whether the page is addressed by object reference
    pub fn is_page_reference(&self) -> bool {
        matches!(self.page, PageTarget::Reference(_))
    }

    /// Convert to PDF array
    pub fn to_array(&self) -> PdfArray {
        let mut array = PdfArray::new();
        match self.page {
            PageTarget::Number(number) => array.push(number),
            PageTarget::Reference(reference) => array.push(reference),
        }
        self.dest_type.push_to(&mut array);
        array
    }
}

/// Structure element a structure destination points at
#[derive(Debug, Clone, PartialEq)]
pub enum StructureElement {
    /// Element of the current document
    Reference(IndirectRef),
    /// Element identified by its `/ID`, usable across documents
    Id(PdfString),
}

/// Destination addressing a structure element instead of a page
/// (PDF 2.0 `SD` entry)
#[derive(Debug, Clone, PartialEq)]
pub struct StructureDestination {
    pub element: StructureElement,
    pub dest_type: DestinationType,
}

impl StructureDestination {
    pub fn new(element: StructureElement, dest_type: DestinationType) -> Self {
        Self { element, dest_type }
    }

    pub fn to_element(reference: IndirectRef, dest_type: DestinationType) -> Self {
        Self::new(StructureElement::Reference(reference), dest_type)
    }

    pub fn to_id(id: impl Into<PdfString>, dest_type: DestinationType) -> Self {
        Self::new(StructureElement::Id(id.into()), dest_type)
    }

    pub fn to_array(&self) -> PdfArray {
        let mut array = PdfArray::new();
        match &self.element {
            StructureElement::Reference(reference) => array.push(*reference),
            StructureElement::Id(id) => array.push(id.clone()),
        }
        self.dest_type.push_to(&mut array);
        array
    }
}
