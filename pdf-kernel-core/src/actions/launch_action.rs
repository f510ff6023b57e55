//! Launch actions for opening applications and documents

use crate::objects::{PdfDictionary, PdfName, PdfString};

/// Windows-specific launch parameters (`/Win` dictionary)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowsLaunchParams {
    pub file_name: String,
    pub default_directory: Option<String>,
    /// `open` or `print`
    pub operation: Option<String>,
    pub parameters: Option<String>,
}

impl WindowsLaunchParams {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    fn to_dict(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::new();
        dict.set("F", PdfString::new(self.file_name.as_str()));
        if let Some(dir) = &self.default_directory {
            dict.set("D", PdfString::new(dir.as_str()));
        }
        if let Some(op) = &self.operation {
            dict.set("O", PdfString::new(op.as_str()));
        }
        if let Some(params) = &self.parameters {
            dict.set("P", PdfString::new(params.as_str()));
        }
        dict
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LaunchParameters {
    /// Plain parameter string
    Simple(String),
    Windows(WindowsLaunchParams),
}

/// Launch action - launch an application
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchAction {
    pub file: String,
    pub parameters: Option<LaunchParameters>,
    pub new_window: Option<bool>,
}

impl LaunchAction {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            parameters: None,
            new_window: None,
        }
    }

    pub fn with_params(mut self, params: impl Into<String>) -> Self {
        self.parameters = Some(LaunchParameters::Simple(params.into()));
        self
    }

    pub fn with_windows_params(mut self, params: WindowsLaunchParams) -> Self {
        self.parameters = Some(LaunchParameters::Windows(params));
        self
    }

    pub fn in_new_window(mut self, new_window: bool) -> Self {
        self.new_window = Some(new_window);
        self
    }

    pub fn to_dict(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::with_type("Action");
        dict.set("S", PdfName::new("Launch"));
        dict.set("F", PdfString::new(self.file.as_str()));

        match &self.parameters {
            Some(LaunchParameters::Simple(params)) => {
                dict.set("P", PdfString::new(params.as_str()))
            }
            Some(LaunchParameters::Windows(params)) => dict.set("Win", params.to_dict()),
            None => {}
        }
        if let Some(new_window) = self.new_window {
            dict.set("NewWindow", new_window);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::PdfObject;

    #[test]
    fn test_launch_with_params() {
        let dict = LaunchAction::new("notepad.exe")
            .with_params("readme.txt")
            .in_new_window(false)
            .to_dict();
        assert_eq!(dict.get_name("S").map(PdfName::as_str), Some("Launch"));
        let params = dict.get("P").and_then(PdfObject::as_string).unwrap();
        assert_eq!(params.as_bytes(), b"readme.txt");
        assert_eq!(dict.get("NewWindow").and_then(PdfObject::as_bool), Some(false));
    }

    #[test]
    fn test_launch_with_windows_params() {
        let params = WindowsLaunchParams {
            operation: Some("print".to_string()),
            ..WindowsLaunchParams::new("report.doc")
        };
        let dict = LaunchAction::new("report.doc").with_windows_params(params).to_dict();
        let win = dict.get_dict("Win").unwrap();
        let op = win.get("O").and_then(PdfObject::as_string).unwrap();
        assert_eq!(op.as_bytes(), b"print");
        assert!(!win.contains_key("D"));
        assert!(!dict.contains_key("P"));
    }
}
