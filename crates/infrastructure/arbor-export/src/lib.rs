//! Export sink writing the crawl's leaf stream as a JSON document.

use std::fs::File;
use std::io::BufWriter;

use arbor_core::path_utils::TreePath;
use arbor_core::Node;
use arbor_engine::ExportSink;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One exported row: the leaf's location rendered the way the legacy
/// spreadsheet did (`/A/B/`), its name, type label and deep link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub path: String,
    pub name: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<&Node> for ExportRow {
    fn from(node: &Node) -> Self {
        Self {
            path: TreePath::render(&node.path),
            name: node.name.clone(),
            kind: node.kind.label().to_string(),
            link: node.link.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub created_at: String,
    pub entries: Vec<ExportRow>,
}

/// Collects rows during the run and serializes the document in one go at
/// run end, so a slow disk never stalls the traversal.
pub struct JsonExportSink {
    out_path: Utf8PathBuf,
    rows: Vec<ExportRow>,
}

impl JsonExportSink {
    pub fn new(out_path: Utf8PathBuf) -> Self {
        Self {
            out_path,
            rows: Vec::new(),
        }
    }
}

impl ExportSink for JsonExportSink {
    fn accept(&mut self, node: Node) -> anyhow::Result<()> {
        self.rows.push(ExportRow::from(&node));
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        let document = ExportDocument {
            created_at: chrono::Utc::now().to_rfc3339(),
            entries: std::mem::take(&mut self.rows),
        };
        let file = File::create(&self.out_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &document)?;
        info!(path = %self.out_path, entries = document.entries.len(), "export written");
        Ok(())
    }
}
