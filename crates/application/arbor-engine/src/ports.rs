use arbor_core::Node;

use crate::error::ClientError;

/// Boundary to the remote session automation layer.
///
/// The implementation owns the live navigation state; the engine mirrors
/// it segment by segment and the two must never diverge. All calls block
/// the worker thread until the remote session has settled.
pub trait RemoteTreeClient: Send {
    /// List every entry of the folder the session is currently inside,
    /// in the order the remote presents them.
    fn list_current_folder(&mut self) -> Result<Vec<Node>, ClientError>;

    /// Navigate into a direct child folder of the current one.
    fn enter_folder(&mut self, name: &str) -> Result<(), ClientError>;

    /// Navigate back to the parent of the current folder.
    fn leave_folder(&mut self) -> Result<(), ClientError>;

    /// Tear the remote session down. Called exactly once per run, on
    /// every exit path, after which no other call is made.
    fn shutdown(&mut self);
}

/// Receiver for the flat leaf stream a traversal produces.
pub trait ExportSink: Send {
    /// Take ownership of one emitted leaf. Called in emission order.
    fn accept(&mut self, node: Node) -> anyhow::Result<()>;

    /// Flush whatever was collected. Called once when a run completes or
    /// is cancelled (a cancelled run still keeps its partial export);
    /// not called after a remote failure.
    fn finish(&mut self) -> anyhow::Result<()>;
}
