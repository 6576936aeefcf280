use arbor_core::path_utils::TreePath;
use arbor_core::{Node, NodeKind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::control::RunControl;
use crate::error::{ClientError, CrawlError};
use crate::events::CrawlEvent;
use crate::ports::{ExportSink, RemoteTreeClient};
use crate::progress::ProgressChannel;

/// Depth-first walk over the remote tree: leaves of a listing are emitted
/// immediately in listing order, sibling folders are collected and then
/// descended in that same order, each with a matching leave call.
///
/// The walker's `path` mirrors the client's live position; the two are
/// only ever moved together.
pub(crate) struct Walker<'a> {
    client: &'a mut dyn RemoteTreeClient,
    sink: &'a mut dyn ExportSink,
    control: &'a RunControl,
    progress: ProgressChannel<'a>,
    events: &'a UnboundedSender<CrawlEvent>,
    path: Vec<String>,
}

/// One listing, split into what is emitted now and what is descended into
/// next. Both halves preserve the remote's ordering.
struct Listing {
    leaves: Vec<Node>,
    folders: Vec<Node>,
}

impl Listing {
    fn classify(entries: Vec<Node>) -> Self {
        let (folders, leaves) = entries.into_iter().partition(|e| e.kind.is_folder());
        Self { leaves, folders }
    }
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        client: &'a mut dyn RemoteTreeClient,
        sink: &'a mut dyn ExportSink,
        control: &'a RunControl,
        progress: ProgressChannel<'a>,
        events: &'a UnboundedSender<CrawlEvent>,
        start_path: Vec<String>,
    ) -> Self {
        Self {
            client,
            sink,
            control,
            progress,
            events,
            path: start_path,
        }
    }

    pub(crate) fn run(&mut self) -> Result<(), CrawlError> {
        self.control.checkpoint()?;
        self.walk_current()
    }

    fn walk_current(&mut self) -> Result<(), CrawlError> {
        let entries = self.client.list_current_folder()?;

        if entries.is_empty() {
            warn!(path = %TreePath::render(&self.path), "folder is empty");
            let marker = self.empty_marker();
            self.sink.accept(marker).map_err(CrawlError::Export)?;
            self.progress.complete();
            return Ok(());
        }

        let listing = Listing::classify(entries);
        self.progress.enqueue(listing.leaves.len() as u64);

        for leaf in listing.leaves {
            if leaf.kind == NodeKind::Unknown {
                warn!(name = %leaf.name, "unrecognized entry type, exporting as-is");
            }
            debug!(kind = leaf.kind.label(), name = %leaf.name, "leaf");
            self.progress.take();
            self.sink.accept(leaf).map_err(CrawlError::Export)?;
            self.progress.complete();
        }

        for folder in listing.folders {
            // A separator inside a folder name would desynchronize the
            // mirrored position; treat it like any other remote fault.
            if !TreePath::is_valid_name(&folder.name) {
                return Err(
                    ClientError::Session(format!("unusable folder name {:?}", folder.name)).into(),
                );
            }
            self.control.checkpoint()?;
            self.client.enter_folder(&folder.name)?;
            self.path.push(folder.name);
            let _ = self.events.send(CrawlEvent::EnteredFolder {
                path: self.path.clone(),
            });

            self.walk_current()?;

            self.control.checkpoint()?;
            self.client.leave_folder()?;
            self.path.pop();
            let _ = self.events.send(CrawlEvent::LeftFolder {
                path: self.path.clone(),
            });
        }

        Ok(())
    }

    /// A folder with nothing in it is represented by a single leaf bearing
    /// the folder's own name, so it is not silently dropped from the
    /// export. It was never queued, so only `read` moves.
    fn empty_marker(&self) -> Node {
        match self.path.split_last() {
            Some((name, parents)) => Node::empty_folder_marker(name.clone(), parents.to_vec()),
            None => Node::empty_folder_marker("/", Vec::new()),
        }
    }
}
