use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::conversation::Conversation;
use crate::error::{AskbotError, Result};
use crate::input::{InputAction, InputBuffer};
use crate::message::Message;
use crate::submission_fsm::{Submission, SubmissionEvent, SubmissionState};
use crate::surface::ChatSurface;
use crate::transport::{AskResponse, AskTransport};

pub const PROCESSING_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your question. Please try again.";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Sorry, there was a connection error. Please make sure the server is running.";

pub type SubmissionId = u64;

/// Result of one backend round trip, tagged with the submission it answers.
#[derive(Debug)]
pub struct Completion {
    pub id: SubmissionId,
    pub outcome: Result<AskResponse>,
}

/// Owns the conversation and the surface. Network calls run on spawned
/// tasks and report back through a channel; only the controller touches
/// the view.
pub struct ChatController<S: ChatSurface> {
    transport: Arc<dyn AskTransport>,
    surface: S,
    conversation: Conversation,
    submissions: HashMap<SubmissionId, Submission>,
    next_id: SubmissionId,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<S: ChatSurface> ChatController<S> {
    pub fn new(transport: Arc<dyn AskTransport>, surface: S) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            transport,
            surface,
            conversation: Conversation::new(),
            submissions: HashMap::new(),
            next_id: 1,
            completions_tx,
            completions_rx,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn in_flight(&self) -> usize {
        self.submissions.len()
    }

    pub fn state_of(&self, id: SubmissionId) -> Option<SubmissionState> {
        self.submissions.get(&id).map(Submission::state)
    }

    pub fn into_parts(self) -> (Conversation, S) {
        (self.conversation, self.surface)
    }

    /// Sends a question to the backend. Blank input is ignored and returns
    /// `None`. Must be called from inside a tokio runtime.
    ///
    /// The request is in flight before anything is drawn, so a surface error
    /// returned from here still leaves a reply on its way.
    pub fn submit(&mut self, raw: &str) -> Result<Option<SubmissionId>> {
        let question = raw.trim();
        if question.is_empty() {
            debug!("ignoring blank submission");
            return Ok(None);
        }

        let mut submission = Submission::new();
        if submission.apply(SubmissionEvent::Dispatch).is_none() {
            return Err(AskbotError::Runtime(
                "new submission refused dispatch".to_string(),
            ));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.submissions.insert(id, submission);
        debug!(
            submission = id,
            chars = question.chars().count(),
            in_flight = self.submissions.len(),
            "question submitted"
        );

        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();
        let owned = question.to_string();
        tokio::spawn(async move {
            let outcome = transport.ask(&owned).await;
            // The receiver only goes away with the controller.
            let _ = completions.send(Completion { id, outcome });
        });

        let appended = self.append(Message::user(question));
        let cleared = self.surface.clear_input();
        let shown = self.surface.show_typing();
        appended.and(cleared).and(shown)?;
        Ok(Some(id))
    }

    pub fn on_response(&mut self, id: SubmissionId, response: AskResponse) -> Result<()> {
        match (response.success, response.response) {
            (true, Some(text)) => {
                info!(submission = id, "answer received");
                self.finish(id, SubmissionEvent::Reply, text)
            }
            (success, _) => {
                warn!(
                    submission = id,
                    success,
                    error = response.error.as_deref().unwrap_or(""),
                    "backend could not answer"
                );
                self.finish(
                    id,
                    SubmissionEvent::Fail,
                    PROCESSING_ERROR_MESSAGE.to_string(),
                )
            }
        }
    }

    pub fn on_transport_failure(&mut self, id: SubmissionId, error: &AskbotError) -> Result<()> {
        warn!(submission = id, error = %error, "request to backend failed");
        self.finish(
            id,
            SubmissionEvent::Fail,
            CONNECTION_ERROR_MESSAGE.to_string(),
        )
    }

    pub fn apply_completion(&mut self, completion: Completion) -> Result<()> {
        match completion.outcome {
            Ok(response) => self.on_response(completion.id, response),
            Err(err) => self.on_transport_failure(completion.id, &err),
        }
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.submissions.is_empty() {
            return None;
        }
        self.completions_rx.recv().await
    }

    /// Waits until every in-flight submission has rendered its reply. A
    /// surface error does not stop the drain; the first one is returned.
    pub async fn settle(&mut self) -> Result<()> {
        let mut failure = None;
        while let Some(completion) = self.next_completion().await {
            let applied = self.apply_completion(completion);
            keep_first_error(&mut failure, applied);
        }
        failure.map_or(Ok(()), Err)
    }

    pub async fn ask_once(&mut self, question: &str) -> Result<()> {
        let submitted = self.submit(question).map(|_| ());
        let settled = self.settle().await;
        submitted.and(settled)
    }

    /// Reads lines until EOF, a quit command or an error, then waits for
    /// pending replies. Bytes that are not UTF-8 are replaced, not fatal.
    /// After an input or surface error no more lines are read, but every
    /// question already asked still gets its reply before the error returns.
    pub async fn run<R>(&mut self, mut reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut input = InputBuffer::new();
        // Reused across iterations: `read_until` resumes a partial line.
        let mut line = Vec::new();
        let mut failure = None;
        let prompted = self.surface.prompt();
        let mut input_open = keep_first_error(&mut failure, prompted);

        while input_open || !self.submissions.is_empty() {
            tokio::select! {
                read = reader.read_until(b'\n', &mut line), if input_open => {
                    let step = match read {
                        Ok(0) => {
                            input_open = false;
                            match input.take_pending() {
                                Some(text) => self.submit(&text).map(|_| ()),
                                None => Ok(()),
                            }
                        }
                        Ok(_) => {
                            let text = decode_line(&line);
                            line.clear();
                            match input.push_line(&text) {
                                InputAction::Continue => Ok(()),
                                InputAction::Submit(text) => self
                                    .submit(&text)
                                    .and_then(|_| self.surface.prompt()),
                                InputAction::Quit => {
                                    debug!("quit requested");
                                    input_open = false;
                                    Ok(())
                                }
                            }
                        }
                        Err(err) => Err(AskbotError::Runtime(err.to_string())),
                    };
                    if !keep_first_error(&mut failure, step) {
                        input_open = false;
                    }
                }
                Some(completion) = self.completions_rx.recv(), if !self.submissions.is_empty() => {
                    let mut step = self.apply_completion(completion);
                    if step.is_ok() && input_open {
                        step = self.surface.prompt();
                    }
                    if !keep_first_error(&mut failure, step) {
                        input_open = false;
                    }
                }
                else => break,
            }
        }

        failure.map_or(Ok(()), Err)
    }

    /// Records the ai message before touching the surface, so a failed draw
    /// never loses the reply.
    fn finish(&mut self, id: SubmissionId, event: SubmissionEvent, text: String) -> Result<()> {
        let Some(mut submission) = self.submissions.remove(&id) else {
            warn!(submission = id, "dropping outcome for unknown submission");
            return Ok(());
        };
        let text = match submission.apply(event) {
            Some(_) => text,
            None => {
                warn!(submission = id, ?event, "outcome rejected by submission state");
                CONNECTION_ERROR_MESSAGE.to_string()
            }
        };

        let hidden = if self.submissions.is_empty() {
            self.surface.hide_typing()
        } else {
            Ok(())
        };
        let appended = self.append(Message::ai(text));
        submission.apply(SubmissionEvent::Settle);
        hidden.and(appended)
    }

    fn append(&mut self, message: Message) -> Result<()> {
        let message = self.conversation.push(message);
        self.surface.append(message)
    }
}

/// Keeps the first error seen. Returns `true` when `result` was `Ok`.
fn keep_first_error(failure: &mut Option<AskbotError>, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "chat session error");
            failure.get_or_insert(err);
            false
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            warn!("input line was not valid UTF-8; invalid bytes replaced");
            text
        }
    }
}
