use serde::{Deserialize, Serialize};

/// Entry types the remote content tree can report.
///
/// Labels are matched exactly as the remote session renders them;
/// anything else collapses to `Unknown` rather than failing the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "Active Report")]
    ActiveReport,
    Agent,
    #[serde(rename = "CSV")]
    Csv,
    Dashboard,
    #[serde(rename = "Data module")]
    DataModule,
    #[serde(rename = "Empty Folder")]
    EmptyFolder,
    Folder,
    Package,
    Page,
    Query,
    Report,
    #[serde(rename = "Report View")]
    ReportView,
    Shortcut,
    Story,
    #[serde(rename = "Uploaded file")]
    UploadedFile,
    #[serde(rename = "XLSX")]
    Xlsx,
    Unknown,
}

impl NodeKind {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Active Report" => Self::ActiveReport,
            "Agent" => Self::Agent,
            "CSV" => Self::Csv,
            "Dashboard" => Self::Dashboard,
            "Data module" => Self::DataModule,
            "Empty Folder" => Self::EmptyFolder,
            "Folder" => Self::Folder,
            "Package" => Self::Package,
            "Page" => Self::Page,
            "Query" => Self::Query,
            "Report" => Self::Report,
            "Report View" => Self::ReportView,
            "Shortcut" => Self::Shortcut,
            "Story" => Self::Story,
            "Uploaded file" => Self::UploadedFile,
            "XLSX" => Self::Xlsx,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ActiveReport => "Active Report",
            Self::Agent => "Agent",
            Self::Csv => "CSV",
            Self::Dashboard => "Dashboard",
            Self::DataModule => "Data module",
            Self::EmptyFolder => "Empty Folder",
            Self::Folder => "Folder",
            Self::Package => "Package",
            Self::Page => "Page",
            Self::Query => "Query",
            Self::Report => "Report",
            Self::ReportView => "Report View",
            Self::Shortcut => "Shortcut",
            Self::Story => "Story",
            Self::UploadedFile => "Uploaded file",
            Self::Xlsx => "XLSX",
            Self::Unknown => "Unknown",
        }
    }

    /// Folders are descended into; every other kind is emitted as-is.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_folder()
    }
}

/// One entry of the remote content tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub kind: NodeKind,
    pub name: String,
    /// Folder names from the tree root down to this entry's parent.
    /// Empty for entries sitting directly under the root.
    pub path: Vec<String>,
    /// Deep link into the remote session, when the entry is addressable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            path,
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Placeholder leaf standing in for a folder that listed no entries,
    /// so the folder still shows up in the export.
    pub fn empty_folder_marker(name: impl Into<String>, path: Vec<String>) -> Self {
        Self::new(NodeKind::EmptyFolder, name, path)
    }
}
