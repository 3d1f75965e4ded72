//! Pager module
//!
//! Runs a [`Controller`] inside its own Tokio task and hands out cheap,
//! cloneable [`Pager`] handles.
//!
//! # Overview
//!
//! All controller state lives in the pager task. Handles never touch it:
//! `load_more`, `reset`, `retry`, and `attach` send a command over a channel,
//! so they can be called from any thread or task. Observers read the latest
//! [`Snapshot`] from a `watch` channel.
//!
//! ```text
//!  Pager handles ──commands──▶ ┌────────────┐ ──spawn──▶ fetch_page task
//!                              │ pager task │                 │
//!  Pager handles ◀─snapshots── └────────────┘ ◀─completion────┘
//! ```
//!
//! The task exits once every handle has been dropped.

mod types;

pub use types::Snapshot;

use crate::config::PagerConfig;
use crate::controller::{fetch_page, Controller, FetchRequest, PaginationState};
use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::source::DataSource;
use crate::triggers::{LoadTarget, Trigger};
use futures::Stream;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use types::{Command, Completion};

/// Handle to a running pager
pub struct Pager<T> {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Snapshot<T>>,
}

impl<T> Clone for Pager<T> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            snapshot: self.snapshot.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.borrow();
        f.debug_struct("Pager")
            .field("items", &snapshot.items.len())
            .field("offset", &snapshot.offset)
            .field("state", &snapshot.state.name())
            .finish()
    }
}

impl<T> Pager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a pager over a data source
    ///
    /// Must be called from within a Tokio runtime. Nothing is fetched until
    /// `attach` or `load_more` is called.
    pub fn spawn<S>(source: S, config: &PagerConfig) -> Result<Self>
    where
        S: DataSource<T> + 'static,
    {
        Self::spawn_with_logger(source, config, config.log.into())
    }

    /// Start a pager that reports to the given logger
    pub fn spawn_with_logger<S>(source: S, config: &PagerConfig, logger: Logger) -> Result<Self>
    where
        S: DataSource<T> + 'static,
    {
        Self::from_shared(Arc::new(source), config, logger)
    }

    /// Start a pager over a shared data source
    pub fn from_shared(
        source: Arc<dyn DataSource<T>>,
        config: &PagerConfig,
        logger: Logger,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::config(format!("Pager needs a Tokio runtime: {e}")))?;

        let controller = Controller::new(config.page_size, config.descriptor(), logger);
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

        let task = PagerTask {
            controller,
            source,
            commands: commands_rx,
            completions_tx,
            completions: completions_rx,
            snapshot: snapshot_tx,
        };
        runtime.spawn(task.run());

        Ok(Self {
            commands: commands_tx,
            snapshot: snapshot_rx,
        })
    }
}

impl<T> Pager<T> {
    fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).map_err(|_| Error::PagerClosed)
    }

    /// Ask for the next page
    pub fn load_more(&self) -> Result<()> {
        self.send(Command::LoadMore)
    }

    /// Drop everything loaded and fetch the first page again
    pub fn reset(&self) -> Result<()> {
        self.send(Command::Reset)
    }

    /// Leave the error state and fetch from the same offset
    pub fn retry(&self) -> Result<()> {
        self.send(Command::Retry)
    }

    /// Binding-site activation hook; loads the first page if nothing was loaded
    pub fn attach(&self) -> Result<()> {
        self.send(Command::Attach)
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    /// Loaded items
    pub fn items(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.snapshot.borrow().items)
    }

    /// Current state
    pub fn state(&self) -> PaginationState {
        self.snapshot.borrow().state.clone()
    }

    /// Check if a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        self.snapshot.borrow().is_fetching()
    }

    /// Check if the end of the data was reached
    pub fn is_all_loaded(&self) -> bool {
        self.snapshot.borrow().is_all_loaded()
    }

    /// Failure cause of the last fetch, if it failed
    pub fn error(&self) -> Option<Arc<Error>> {
        self.snapshot.borrow().error()
    }

    /// Wait for the next published change
    pub async fn changed(&self) -> Result<Snapshot<T>> {
        let mut rx = self.snapshot.clone();
        rx.borrow_and_update();
        rx.changed().await.map_err(|_| Error::PagerClosed)?;
        let snapshot = rx.borrow().clone();
        Ok(snapshot)
    }

    /// Stream of every snapshot published after this call
    ///
    /// Snapshots published in quick succession may be coalesced; the stream
    /// always yields the latest one. It ends when the pager task stops.
    pub fn updates(&self) -> impl Stream<Item = Snapshot<T>> + Send + 'static
    where
        T: Send + Sync + 'static,
    {
        let mut rx = self.snapshot.clone();
        rx.borrow_and_update();
        futures::stream::unfold(rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = rx.borrow_and_update().clone();
            Some((snapshot, rx))
        })
    }

    /// Wait until every command sent so far was handled by the pager task
    pub async fn flush(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.send(Command::Flush(reply))?;
        done.await.map_err(|_| Error::PagerClosed)
    }

    /// Wait until the published snapshot satisfies the predicate
    pub async fn wait_until(
        &self,
        mut predicate: impl FnMut(&Snapshot<T>) -> bool,
    ) -> Result<Snapshot<T>> {
        let mut rx = self.snapshot.clone();
        let snapshot = rx
            .wait_for(|s| predicate(s))
            .await
            .map_err(|_| Error::PagerClosed)?
            .clone();
        Ok(snapshot)
    }

    /// Wait until every command sent so far was handled and no fetch is in flight
    pub async fn settled(&self) -> Result<Snapshot<T>> {
        self.flush().await?;
        self.wait_until(|s| !s.is_fetching()).await
    }
}

impl<T: PartialEq> Pager<T> {
    /// Item-appeared hook: run a trigger for one rendered item
    ///
    /// Returns whether the trigger asked for more data.
    pub fn on_appear(&self, item: &T, trigger: &Trigger<T>) -> Result<bool> {
        let items = self.items();
        trigger.fire(item, items.as_slice(), self)
    }
}

impl<T> LoadTarget for Pager<T> {
    fn is_loadable(&self) -> bool {
        self.snapshot.borrow().is_loadable()
    }

    fn request_more(&self) -> Result<()> {
        self.load_more()
    }
}

/// Owner of the controller; the only place its state changes
struct PagerTask<T> {
    controller: Controller<T>,
    source: Arc<dyn DataSource<T>>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion<T>>,
    completions: mpsc::UnboundedReceiver<Completion<T>>,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T> PagerTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn run(mut self) {
        tracing::debug!(
            page_size = self.controller.page_size(),
            "Pager task started"
        );

        loop {
            tokio::select! {
                biased;
                Some((request, outcome)) = self.completions.recv() => {
                    self.controller.complete(&request, outcome);
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
            self.publish();
        }

        tracing::debug!(
            items = self.controller.items().len(),
            state = self.controller.state().name(),
            "Pager task stopped"
        );
    }

    fn handle(&mut self, command: Command) {
        let request = match command {
            Command::LoadMore => self.controller.load_more(),
            Command::Reset => self.controller.reset(),
            Command::Retry => self.controller.retry(),
            Command::Attach => self.controller.attach(),
            Command::Flush(reply) => {
                self.publish();
                let _ = reply.send(());
                None
            }
        };

        if let Some(request) = request {
            self.dispatch(request);
        }
    }

    fn dispatch(&self, request: FetchRequest) {
        let source = Arc::clone(&self.source);
        let descriptor = Arc::clone(self.controller.descriptor());
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let outcome = fetch_page(source.as_ref(), &descriptor, &request).await;
            // Fails only when the pager task has already stopped
            let _ = completions.send((request, outcome));
        });
    }

    fn publish(&self) {
        let controller = &self.controller;
        self.snapshot.send_if_modified(|current| {
            if current.version == controller.version() {
                return false;
            }
            *current = Snapshot {
                items: Arc::clone(controller.items()),
                offset: controller.offset(),
                state: controller.state().clone(),
                total: controller.total(),
                stats: controller.stats().clone(),
                version: controller.version(),
            };
            true
        });
    }
}
