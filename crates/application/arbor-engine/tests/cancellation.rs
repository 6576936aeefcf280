use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use arbor_core::{Node, NodeKind};
use arbor_engine::{
    spawn, ClientError, CrawlEvent, CrawlRequest, ExportSink, RemoteTreeClient, RunOutcome,
    RunPhase,
};
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    List(Vec<String>),
    Enter(String),
    Leave,
    Shutdown,
}

#[derive(Clone)]
enum Entry {
    Leaf(&'static str, NodeKind),
    Folder(&'static str, Vec<Entry>),
}

/// Tree client that parks inside one designated listing call until the
/// test releases it, so cancellation can be requested while the worker is
/// provably mid-recursion.
struct GatedClient {
    root: Vec<Entry>,
    path: Vec<String>,
    calls: Arc<Mutex<Vec<Call>>>,
    gate_at: Vec<String>,
    reached: std_mpsc::Sender<()>,
    release: std_mpsc::Receiver<()>,
}

impl GatedClient {
    fn current(&self) -> Result<&Vec<Entry>, ClientError> {
        let mut cur = &self.root;
        for seg in &self.path {
            cur = cur
                .iter()
                .find_map(|e| match e {
                    Entry::Folder(name, entries) if *name == seg.as_str() => Some(entries),
                    _ => None,
                })
                .ok_or_else(|| ClientError::Session(format!("desynchronized at {seg}")))?;
        }
        Ok(cur)
    }
}

impl RemoteTreeClient for GatedClient {
    fn list_current_folder(&mut self) -> Result<Vec<Node>, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::List(self.path.clone()));
        if self.path == self.gate_at {
            self.reached.send(()).expect("test dropped the gate");
            self.release.recv().expect("test dropped the gate");
        }
        let entries = self.current()?;
        Ok(entries
            .iter()
            .map(|e| match e {
                Entry::Leaf(name, kind) => Node::new(*kind, *name, self.path.clone()),
                Entry::Folder(name, _) => Node::new(NodeKind::Folder, *name, self.path.clone()),
            })
            .collect())
    }

    fn enter_folder(&mut self, name: &str) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Enter(name.to_string()));
        self.path.push(name.to_string());
        Ok(())
    }

    fn leave_folder(&mut self) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Leave);
        self.path.pop();
        Ok(())
    }

    fn shutdown(&mut self) {
        self.calls.lock().unwrap().push(Call::Shutdown);
    }
}

struct MemorySink {
    rows: Arc<Mutex<Vec<Node>>>,
    finished: Arc<AtomicBool>,
}

impl ExportSink for MemorySink {
    fn accept(&mut self, node: Node) -> anyhow::Result<()> {
        self.rows.lock().unwrap().push(node);
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.finished.store(true, Ordering::Relaxed);
        Ok(())
    }
}

#[test]
fn cancel_three_levels_deep_unwinds_without_further_remote_calls() {
    // Tree: /r0 plus /A/B/C/D/deep. The gate sits on C's listing; C holds only
    // folders, so the first safe point after the gate observes the
    // cancellation before anything else happens.
    let root = vec![
        Entry::Leaf("r0", NodeKind::Report),
        Entry::Folder(
            "A",
            vec![Entry::Folder(
                "B",
                vec![Entry::Folder(
                    "C",
                    vec![Entry::Folder(
                        "D",
                        vec![Entry::Leaf("deep", NodeKind::Report)],
                    )],
                )],
            )],
        ),
    ];

    let (reached_tx, reached_rx) = std_mpsc::channel();
    let (release_tx, release_rx) = std_mpsc::channel();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let client = GatedClient {
        root,
        path: Vec::new(),
        calls: calls.clone(),
        gate_at: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        reached: reached_tx,
        release: release_rx,
    };

    let rows = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::new(AtomicBool::new(false));
    let sink = MemorySink {
        rows: rows.clone(),
        finished: finished.clone(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = spawn(client, sink, CrawlRequest::default(), tx).unwrap();

    // The worker is now parked inside C's listing call.
    reached_rx.recv().unwrap();

    thread::scope(|s| {
        let canceller = s.spawn(|| handle.cancel());

        // cancel() registers the request synchronously, then blocks until
        // the worker unwinds; it cannot finish while the gate is closed.
        while handle.phase() != RunPhase::Cancelling {
            thread::yield_now();
        }
        assert!(handle.is_cancel_requested());
        assert!(!canceller.is_finished());

        release_tx.send(()).unwrap();
        canceller.join().unwrap();
    });

    // Acknowledged: the request flag has been lowered by the worker.
    assert!(!handle.is_cancel_requested());
    assert_eq!(handle.phase(), RunPhase::Finished);

    // The gated listing is the last remote call besides teardown.
    let calls = calls.lock().unwrap();
    let gate_pos = calls
        .iter()
        .position(|c| {
            *c == Call::List(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        })
        .expect("gated listing happened");
    assert_eq!(&calls[gate_pos + 1..], &[Call::Shutdown]);

    // Only the pre-descent leaf was emitted, and the partial export was
    // still flushed.
    let emitted: Vec<String> = rows.lock().unwrap().iter().map(|n| n.name.clone()).collect();
    assert_eq!(emitted, vec!["r0".to_string()]);
    assert!(finished.load(Ordering::Relaxed));

    assert_eq!(handle.join(), RunOutcome::Cancelled);

    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    assert!(matches!(events.last(), Some(CrawlEvent::Cancelled)));
}
