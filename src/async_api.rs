use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use log::debug;
use tokio::sync::oneshot;

use crate::{Error, PostBuilder, RenderRequest, RenderedPost, Result};

enum Command {
    Render(RenderRequest, oneshot::Sender<Result<RenderedPost>>),
    RenderWith(RenderRequest, Vec<u8>, oneshot::Sender<Result<RenderedPost>>),
}

/// An async-friendly front for a `PostBuilder`, backed by worker threads.
///
/// Renders are CPU-bound, so they run on dedicated threads that share one
/// read-only builder; async callers await a oneshot reply. Workers exit once
/// every clone of the service has been dropped.
#[derive(Clone)]
pub struct RenderService {
    cmd_tx: Sender<Command>,
    workers: usize,
}

impl RenderService {
    /// Spawn `workers` render threads (defaults to the number of CPUs).
    pub fn new(builder: PostBuilder, workers: Option<usize>) -> Result<Self> {
        let workers = workers.unwrap_or_else(num_cpus::get).max(1);
        let builder = Arc::new(builder);
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let cmd_rx = Arc::new(Mutex::new(cmd_rx));

        for i in 0..workers {
            let rx = Arc::clone(&cmd_rx);
            let builder = Arc::clone(&builder);
            thread::Builder::new()
                .name(format!("factpost-render-{}", i))
                .spawn(move || worker_loop(rx, builder))?;
        }
        debug!("Started render service with {} worker(s)", workers);

        Ok(Self { cmd_tx, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render with the request's own background or the builder's template store.
    pub async fn render(&self, request: RenderRequest) -> Result<RenderedPost> {
        let (tx, rx) = oneshot::channel();
        self.submit(Command::Render(request, tx))?;
        rx.await.map_err(|_| Error::Service("worker dropped the request".into()))?
    }

    /// Render over the given background bytes.
    pub async fn render_with_background(&self, request: RenderRequest, background: Vec<u8>) -> Result<RenderedPost> {
        let (tx, rx) = oneshot::channel();
        self.submit(Command::RenderWith(request, background, tx))?;
        rx.await.map_err(|_| Error::Service("worker dropped the request".into()))?
    }

    fn submit(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| Error::Service("render workers have exited".into()))
    }
}

fn worker_loop(rx: Arc<Mutex<Receiver<Command>>>, builder: Arc<PostBuilder>) {
    loop {
        // Hold the lock only while waiting for the next command.
        let cmd = rx.lock().unwrap_or_else(PoisonError::into_inner).recv();
        match cmd {
            Ok(Command::Render(request, resp)) => {
                let _ = resp.send(builder.build(&request));
            }
            Ok(Command::RenderWith(request, background, resp)) => {
                let _ = resp.send(builder.build_with_background(&request, &background));
            }
            Err(_) => break,
        }
    }
}
