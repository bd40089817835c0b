//! The single serialization point for network edits.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::graph::{GraphEditor, SharedGraph};

use super::error::UpdaterError;

/// A unit of network mutation.
///
/// `run` edits a private copy of the current snapshot. The copy is
/// published only if `run` succeeds; on error the network is unchanged.
pub trait GraphWriterTask: Send + 'static {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn run(&self, editor: &mut GraphEditor) -> Result<(), UpdaterError>;
}

type Completion = oneshot::Sender<Result<u64, UpdaterError>>;

enum Message {
    Run {
        task: Box<dyn GraphWriterTask>,
        done: Option<Completion>,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Handle for submitting tasks to the graph writer.
///
/// One background task applies submitted tasks one at a time, in
/// submission order. Handles are cheap to clone.
#[derive(Clone)]
pub struct GraphWriter {
    sender: mpsc::Sender<Message>,
}

impl GraphWriter {
    /// Start the writer for `graph`. `queue_depth` bounds pending tasks.
    pub fn spawn(graph: SharedGraph, queue_depth: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let handle = tokio::spawn(run_writer(graph, receiver));
        (Self { sender }, handle)
    }

    /// Submit a task and wait for it to be applied.
    ///
    /// Returns the generation it published, or the task's error.
    pub async fn execute<T: GraphWriterTask>(&self, task: T) -> Result<u64, UpdaterError> {
        let (done, result) = oneshot::channel();
        self.sender
            .send(Message::Run {
                task: Box::new(task),
                done: Some(done),
            })
            .await
            .map_err(|_| UpdaterError::WriterClosed)?;
        result.await.map_err(|_| UpdaterError::WriterClosed)?
    }

    /// Submit a task without waiting for it to run.
    ///
    /// Waits only if the queue is full. Failures are logged by the writer.
    pub async fn submit<T: GraphWriterTask>(&self, task: T) -> Result<(), UpdaterError> {
        self.sender
            .send(Message::Run {
                task: Box::new(task),
                done: None,
            })
            .await
            .map_err(|_| UpdaterError::WriterClosed)
    }

    /// Returns true once the writer has stopped accepting tasks.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Stop the writer once every task submitted before this call has run.
    pub async fn shutdown(&self) -> Result<(), UpdaterError> {
        let (done, stopped) = oneshot::channel();
        self.sender
            .send(Message::Shutdown(done))
            .await
            .map_err(|_| UpdaterError::WriterClosed)?;
        stopped.await.map_err(|_| UpdaterError::WriterClosed)
    }
}

async fn run_writer(graph: SharedGraph, mut receiver: mpsc::Receiver<Message>) {
    info!(generation = graph.generation(), "graph writer started");
    while let Some(message) = receiver.recv().await {
        let (task, done) = match message {
            Message::Run { task, done } => (task, done),
            Message::Shutdown(stopped) => {
                receiver.close();
                let _ = stopped.send(());
                break;
            }
        };

        let name = task.name().to_string();
        let shared = graph.clone();
        // Edits copy arenas, so keep them off the async workers.
        let outcome = tokio::task::spawn_blocking(move || shared.apply(|editor| task.run(editor)))
            .await
            .unwrap_or_else(|e| Err(UpdaterError::Task(e.to_string())));

        match &outcome {
            Ok(generation) => debug!(task = %name, generation, "graph writer task applied"),
            Err(err) => warn!(task = %name, %err, "graph writer task failed"),
        }
        if let Some(done) = done {
            let _ = done.send(outcome);
        }
    }
    info!("graph writer stopped");
}
