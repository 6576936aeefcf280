use std::collections::BTreeMap;

use anyhow::Context;
use arbor_core::path_utils::TreePath;
use arbor_engine::{CrawlEvent, CrawlRequest, RunOutcome};
use arbor_export::JsonExportSink;
use arbor_replay::{SnapshotEntry, SnapshotTreeClient, TreeSnapshot};
use camino::Utf8PathBuf;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Traverse a snapshot and export every leaf, with live progress and
/// Ctrl-C mapped to cooperative cancellation.
pub async fn cmd_crawl(
    snapshot: Utf8PathBuf,
    output: Utf8PathBuf,
    start: Option<String>,
) -> anyhow::Result<()> {
    let client = SnapshotTreeClient::from_file(&snapshot)
        .with_context(|| format!("Failed to load snapshot {snapshot}"))?;
    let sink = JsonExportSink::new(output.clone());
    let request = CrawlRequest {
        start_path: start.as_deref().map(TreePath::parse).unwrap_or_default(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = arbor_engine::spawn(client, sink, request, tx)?;
    debug!(run_id = %handle.run_id(), %snapshot, "crawl worker started");

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{pos}/{len} leaves {msg}")
            .expect("static progress template"),
    );

    loop {
        tokio::select! {
            maybe = rx.recv() => {
                match maybe {
                    Some(ev) => {
                        let terminal = ev.is_terminal();
                        render_event(&bar, &ev);
                        if terminal {
                            break;
                        }
                    }
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                bar.set_message("cancelling...");
                // Blocks until the worker has unwound and the session is
                // torn down; may wait out one in-flight remote call.
                tokio::task::block_in_place(|| handle.cancel());
            }
        }
    }
    bar.finish_and_clear();

    match tokio::task::block_in_place(|| handle.join()) {
        RunOutcome::Completed { read } => {
            println!("Exported {read} leaves to {output}");
            Ok(())
        }
        RunOutcome::Cancelled => {
            println!("Cancelled; partial export kept at {output}");
            Ok(())
        }
        RunOutcome::Failed { message } => anyhow::bail!("Crawl failed: {message}"),
    }
}

fn render_event(bar: &ProgressBar, ev: &CrawlEvent) {
    match ev {
        CrawlEvent::Started { run_id } => bar.set_message(format!("run {run_id}")),
        CrawlEvent::Progress { queued, read } => {
            bar.set_length(queued + read);
            bar.set_position(*read);
        }
        CrawlEvent::EnteredFolder { path } => bar.set_message(TreePath::render(path)),
        CrawlEvent::LeftFolder { path } => bar.set_message(TreePath::render(path)),
        CrawlEvent::Paused => bar.set_message("paused"),
        CrawlEvent::Resumed => bar.set_message("resumed"),
        CrawlEvent::Completed { .. } | CrawlEvent::Cancelled => {}
        CrawlEvent::Failed { message } => warn!(%message, "run failed"),
    }
}

/// Summarize a snapshot without crawling it: entry counts per type label.
pub fn cmd_inspect(snapshot: Utf8PathBuf) -> anyhow::Result<()> {
    let tree = TreeSnapshot::from_file(&snapshot)
        .with_context(|| format!("Failed to load snapshot {snapshot}"))?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    fn tally(entries: &[SnapshotEntry], counts: &mut BTreeMap<String, usize>) {
        for entry in entries {
            match entry {
                SnapshotEntry::Leaf { kind, .. } => {
                    *counts.entry(kind.clone()).or_default() += 1;
                }
                SnapshotEntry::Folder { entries, .. } => {
                    *counts.entry("Folder".to_string()).or_default() += 1;
                    tally(entries, counts);
                }
            }
        }
    }
    tally(&tree.entries, &mut counts);

    println!("{} entries", tree.entry_count());
    for (kind, count) in &counts {
        println!("  {kind:<16} {count}");
    }
    Ok(())
}
