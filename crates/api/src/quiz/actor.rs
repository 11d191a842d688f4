//! Task that owns one quiz session.
//!
//! Handlers never touch the controller directly. They send a
//! [`SessionCommand`] and await the reply, so every mutation (including
//! timer wakes) is applied in arrival order on a single task.

use std::sync::Arc;

use quizline_core::catalog::{CatalogSource, QuizCatalog};
use quizline_core::error::CoreError;
use quizline_core::results::ResultsWriter;
use quizline_core::session::{ActionOutcome, Pacing, QuizController, SessionNotice, SessionView};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::scheduler::{TokioScheduler, WakeReceiver};

/// Pending commands per session before senders wait.
const COMMAND_BUFFER: usize = 32;

/// Result of an action together with the session after it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandReply {
    pub outcome: ActionOutcome,
    pub session: SessionView,
}

pub enum SessionCommand {
    Start {
        email: String,
        reply: oneshot::Sender<Result<CommandReply, CoreError>>,
    },
    Answer {
        choice: Option<usize>,
        reply: oneshot::Sender<CommandReply>,
    },
    SendText {
        text: String,
        reply: oneshot::Sender<CommandReply>,
    },
    Restart {
        reply: oneshot::Sender<CommandReply>,
    },
    View {
        reply: oneshot::Sender<SessionView>,
    },
}

/// Cloneable handle to a running session task.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    id: Uuid,
    commands: mpsc::Sender<SessionCommand>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Spawn the task for a new session.
    ///
    /// `catalog` is the content the welcome state is prepared with; the task
    /// reloads it from `source` on every start and restart.
    pub fn spawn(
        id: Uuid,
        catalog: QuizCatalog,
        source: Arc<dyn CatalogSource>,
        results: Arc<dyn ResultsWriter>,
        pacing: Pacing,
    ) -> Self {
        let (scheduler, wakes) = TokioScheduler::new();
        let controller =
            QuizController::new(catalog, scheduler, Box::new(StdRng::from_os_rng()), pacing);

        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let cancel = CancellationToken::new();
        let session = SessionTask {
            id,
            controller,
            commands: rx,
            wakes,
            source,
            results,
        };
        tokio::spawn(session.run(cancel.clone()));

        Self {
            id,
            commands: tx,
            cancel,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Stop the task. Pending timers are dropped with the controller.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub async fn start(&self, email: String) -> Result<CommandReply, CoreError> {
        self.request(|reply| SessionCommand::Start { email, reply })
            .await?
    }

    pub async fn answer(&self, choice: Option<usize>) -> Result<CommandReply, CoreError> {
        self.request(|reply| SessionCommand::Answer { choice, reply })
            .await
    }

    pub async fn send_text(&self, text: String) -> Result<CommandReply, CoreError> {
        self.request(|reply| SessionCommand::SendText { text, reply })
            .await
    }

    pub async fn restart(&self) -> Result<CommandReply, CoreError> {
        self.request(|reply| SessionCommand::Restart { reply }).await
    }

    pub async fn view(&self) -> Result<SessionView, CoreError> {
        self.request(|reply| SessionCommand::View { reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| self.gone())?;
        rx.await.map_err(|_| self.gone())
    }

    fn gone(&self) -> CoreError {
        CoreError::NotFound {
            entity: "QuizSession",
            id: self.id.to_string(),
        }
    }
}

struct SessionTask {
    id: Uuid,
    controller: QuizController<TokioScheduler>,
    commands: mpsc::Receiver<SessionCommand>,
    wakes: WakeReceiver,
    source: Arc<dyn CatalogSource>,
    results: Arc<dyn ResultsWriter>,
}

impl SessionTask {
    async fn run(mut self, cancel: CancellationToken) {
        tracing::debug!(session_id = %self.id, "Quiz session task started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(wake) = self.wakes.recv() => {
                    self.controller.handle_wake(wake);
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command).await,
                    None => break,
                },
            }
            self.flush_notices().await;
        }

        tracing::debug!(session_id = %self.id, "Quiz session task stopped");
    }

    async fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Start { email, reply } => {
                let catalog = self.source.load_catalog().await;
                self.controller.refresh_catalog(catalog);
                let result = self
                    .controller
                    .start_session(&email)
                    .map(|outcome| self.reply(outcome));
                let _ = reply.send(result);
            }
            SessionCommand::Answer { choice, reply } => {
                let outcome = self.controller.submit_answer(choice);
                let _ = reply.send(self.reply(outcome));
            }
            SessionCommand::SendText { text, reply } => {
                let outcome = self.controller.send_text(&text);
                let _ = reply.send(self.reply(outcome));
            }
            SessionCommand::Restart { reply } => {
                let catalog = self.source.load_catalog().await;
                let outcome = self.controller.restart_session(Some(catalog));
                let _ = reply.send(self.reply(outcome));
            }
            SessionCommand::View { reply } => {
                let _ = reply.send(self.controller.view());
            }
        }
    }

    fn reply(&self, outcome: ActionOutcome) -> CommandReply {
        CommandReply {
            outcome,
            session: self.controller.view(),
        }
    }

    async fn flush_notices(&mut self) {
        for notice in self.controller.drain_notices() {
            match notice {
                SessionNotice::Completed(result) => match self.results.record(&result).await {
                    Ok(()) => tracing::info!(
                        session_id = %self.id,
                        score = result.score,
                        total = result.total_questions,
                        "Quiz result recorded"
                    ),
                    Err(e) => tracing::warn!(
                        session_id = %self.id,
                        error = %e,
                        "Failed to record quiz result"
                    ),
                },
                SessionNotice::StateChanged(state) => {
                    tracing::debug!(session_id = %self.id, ?state, "Quiz session state changed");
                }
                SessionNotice::QuestionPresented { .. } | SessionNotice::AnswerRecorded { .. } => {}
            }
        }
    }
}
