use std::error::Error;
use std::fmt::{self, Display};
use std::mem;
use std::pin::Pin;

use folio_chat_core::api::{ChatRequest, ChatResponse};
use folio_chat_core::conversation::Message;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

use crate::transport::{Transport, TransportError};

/// The notification shown when a message could not be answered.
pub const FAILURE_NOTIFICATION: &str =
    "Failed to send message. Please try again.";

type SendResult = Result<ChatResponse, TransportError>;
type BoxedSendFuture = Pin<Box<dyn Future<Output = SendResult> + Send>>;
type SendFn = Box<dyn Fn(ChatRequest) -> BoxedSendFuture + Send + Sync>;
type OnReplyFn = Box<dyn Fn(&Message, &[String]) + Send + Sync>;
type OnNotificationFn = Box<dyn Fn(&str) + Send + Sync>;
type OnIdleFn = Box<dyn Fn() + Send + Sync>;

/// A copy of the client state at some point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientSnapshot {
    /// The transcript, oldest first.
    pub messages: Vec<Message>,
    /// The current draft.
    pub input: String,
    /// Whether a request is in flight.
    pub is_loading: bool,
    /// Follow-up questions from the last successful reply.
    pub suggestions: Vec<String>,
}

/// A client builder.
///
/// See [`ConversationClient`].
pub struct ConversationClientBuilder {
    send_fn: SendFn,
    on_reply: Option<OnReplyFn>,
    on_notification: Option<OnNotificationFn>,
    on_idle: Option<OnIdleFn>,
}

impl ConversationClientBuilder {
    /// Creates a client builder that talks to the server through
    /// `transport`.
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        let send_fn: SendFn =
            Box::new(move |req| Box::pin(transport.send(req)));
        Self {
            send_fn,
            on_reply: None,
            on_notification: None,
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked when a reply is appended, along
    /// with the new suggestions.
    #[inline]
    pub fn on_reply(
        mut self,
        on_reply: impl Fn(&Message, &[String]) + Send + Sync + 'static,
    ) -> Self {
        self.on_reply = Some(Box::new(on_reply));
        self
    }

    /// Attaches a callback to be invoked with a transient notification.
    #[inline]
    pub fn on_notification(
        mut self,
        on_notification: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_notification = Some(Box::new(on_notification));
        self
    }

    /// Attaches a callback to be invoked when a request settles, whether
    /// it succeeded or not.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the client and starts its task.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> ConversationClient {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let state = ClientState {
            snapshot: ClientSnapshot::default(),
            send_fn: self.send_fn,
            on_reply: self.on_reply,
            on_notification: self.on_notification,
            on_idle: self.on_idle,
            cmd_tx: cmd_tx.downgrade(),
        };
        tokio::spawn(
            state
                .run(cmd_rx)
                .instrument(trace_span!("conversation client")),
        );
        ConversationClient { cmd_tx }
    }
}

/// A conversation with the chat server, like the chat widget with its
/// message list and input box.
///
/// All the state lives in a task owned by the client. The methods only
/// enqueue commands, which the task processes in order, so the effects
/// of two calls are never interleaved. The task stops once every handle
/// is dropped and the request in flight, if any, has settled.
#[derive(Clone)]
pub struct ConversationClient {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl ConversationClient {
    /// Submits a message.
    ///
    /// Blank messages are ignored, so are messages submitted while a
    /// request is in flight.
    #[inline]
    pub fn submit(&self, text: &str) {
        self.send(Command::Submit(text.to_owned()));
    }

    /// Replaces the draft.
    #[inline]
    pub fn set_input(&self, text: &str) {
        self.send(Command::SetInput(text.to_owned()));
    }

    /// Submits the draft and clears it.
    ///
    /// The draft is kept when the submission is ignored.
    #[inline]
    pub fn submit_input(&self) {
        self.send(Command::SubmitInput);
    }

    /// Returns a copy of the current state.
    ///
    /// Every command enqueued before this call is reflected in the result.
    pub async fn snapshot(&self) -> Result<ClientSnapshot, ClientClosedError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Snapshot(tx))
            .map_err(|_| ClientClosedError)?;
        rx.await.map_err(|_| ClientClosedError)
    }

    fn send(&self, cmd: Command) {
        if self.cmd_tx.send(cmd).is_err() {
            warn!("client task has terminated, discard the command");
        }
    }
}

/// The client task is no longer running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientClosedError;

impl Display for ClientClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("client task has terminated")
    }
}

impl Error for ClientClosedError {}

#[derive(Debug)]
enum Command {
    Submit(String),
    SetInput(String),
    SubmitInput,
    Settled(SendResult),
    Snapshot(oneshot::Sender<ClientSnapshot>),
}

struct ClientState {
    snapshot: ClientSnapshot,
    send_fn: SendFn,
    on_reply: Option<OnReplyFn>,
    on_notification: Option<OnNotificationFn>,
    on_idle: Option<OnIdleFn>,
    cmd_tx: mpsc::WeakUnboundedSender<Command>,
}

impl ClientState {
    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        debug!("started");
        while let Some(cmd) = cmd_rx.recv().await {
            trace!("received command: {cmd:?}");
            self.handle(cmd);
        }
        debug!("will terminate");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Submit(text) => self.submit(text),
            Command::SetInput(text) => self.snapshot.input = text,
            Command::SubmitInput => {
                if self.accepts(&self.snapshot.input) {
                    let text = mem::take(&mut self.snapshot.input);
                    self.submit(text);
                }
            }
            Command::Settled(result) => self.settle(result),
            Command::Snapshot(tx) => {
                tx.send(self.snapshot.clone()).ok();
            }
        }
    }

    #[inline]
    fn accepts(&self, text: &str) -> bool {
        !self.snapshot.is_loading && !text.trim().is_empty()
    }

    fn submit(&mut self, text: String) {
        if !self.accepts(&text) {
            debug!("ignored a submission (loading: {})", self.snapshot.is_loading);
            return;
        }
        let Some(cmd_tx) = self.cmd_tx.upgrade() else {
            warn!("no handle left, discard the submission");
            return;
        };

        self.snapshot.messages.push(Message::user(text));
        self.snapshot.is_loading = true;

        // The request is created here rather than in the spawned task, so
        // it is observable as soon as the command is processed.
        let request = ChatRequest::from_transcript(&self.snapshot.messages);
        let fut = (self.send_fn)(request);
        tokio::spawn(
            async move {
                let result = fut.await;
                cmd_tx.send(Command::Settled(result)).ok();
            }
            .instrument(trace_span!("send transcript")),
        );
    }

    fn settle(&mut self, result: SendResult) {
        self.snapshot.is_loading = false;
        match result {
            Ok(resp) => {
                self.snapshot.messages.push(Message::assistant(resp.response));
                self.snapshot.suggestions = resp.suggestions;
                if let (Some(on_reply), Some(reply)) =
                    (&self.on_reply, self.snapshot.messages.last())
                {
                    on_reply(reply, &self.snapshot.suggestions);
                }
            }
            Err(err) => {
                warn!("failed to send message: {err}");
                if let Some(on_notification) = &self.on_notification {
                    on_notification(FAILURE_NOTIFICATION);
                }
            }
        }
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use folio_chat_core::conversation::Role;

    use super::*;

    type Pending = (ChatRequest, oneshot::Sender<SendResult>);

    /// A transport that holds every request until the test answers it.
    #[derive(Clone, Default)]
    struct ManualTransport {
        pending: Arc<Mutex<Vec<Pending>>>,
    }

    impl ManualTransport {
        fn requests(&self) -> Vec<ChatRequest> {
            let pending = self.pending.lock().unwrap();
            pending.iter().map(|(req, _)| req.clone()).collect()
        }

        fn answer(&self, result: SendResult) {
            let (_, tx) = self.pending.lock().unwrap().remove(0);
            tx.send(result).unwrap();
        }
    }

    impl Transport for ManualTransport {
        fn send(
            &self,
            request: ChatRequest,
        ) -> impl Future<Output = SendResult> + Send + 'static {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push((request, tx));
            async move {
                rx.await
                    .unwrap_or_else(|_| Err(TransportError::new("dropped")))
            }
        }
    }

    struct Harness {
        client: ConversationClient,
        transport: ManualTransport,
        idle_rx: mpsc::UnboundedReceiver<()>,
        notification_rx: mpsc::UnboundedReceiver<String>,
        reply_rx: mpsc::UnboundedReceiver<(Message, Vec<String>)>,
    }

    fn make_harness() -> Harness {
        let transport = ManualTransport::default();
        let (idle_tx, idle_rx) = mpsc::unbounded_channel();
        let (notification_tx, notification_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let client = ConversationClientBuilder::with_transport(transport.clone())
            .on_idle(move || {
                idle_tx.send(()).ok();
            })
            .on_notification(move |text| {
                notification_tx.send(text.to_owned()).ok();
            })
            .on_reply(move |reply, suggestions| {
                reply_tx.send((reply.clone(), suggestions.to_vec())).ok();
            })
            .build();
        Harness {
            client,
            transport,
            idle_rx,
            notification_rx,
            reply_rx,
        }
    }

    fn reply(text: &str, suggestions: &[&str]) -> SendResult {
        Ok(ChatResponse {
            response: text.to_owned(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_optimistic_append() {
        let mut h = make_harness();
        h.client.submit("Hi");

        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.messages, [Message::user("Hi")]);
        assert!(snapshot.is_loading);
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].clone().into_transcript(), [Message::user("Hi")]);

        h.transport.answer(reply("Hello!", &["q1", "q2", "q3"]));
        h.idle_rx.recv().await.unwrap();

        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(
            snapshot.messages,
            [Message::user("Hi"), Message::assistant("Hello!")]
        );
        assert_eq!(snapshot.suggestions, ["q1", "q2", "q3"]);
        assert!(!snapshot.is_loading);

        let (message, suggestions) = h.reply_rx.recv().await.unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "Hello!");
        assert_eq!(suggestions.len(), 3);
    }

    #[tokio::test]
    async fn test_at_most_one_in_flight() {
        let mut h = make_harness();
        h.client.submit("First");
        h.client.submit("Second");

        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.messages, [Message::user("First")]);
        assert_eq!(h.transport.requests().len(), 1);

        h.transport.answer(reply("Answer", &[]));
        h.idle_rx.recv().await.unwrap();

        // The dropped submission was not queued.
        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.messages.len(), 2);
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failure() {
        let mut h = make_harness();
        h.client.submit("Hi");
        h.client.snapshot().await.unwrap();
        h.transport.answer(reply("Hello!", &["q1"]));
        h.idle_rx.recv().await.unwrap();

        h.client.submit("Tell me more");
        h.client.snapshot().await.unwrap();
        h.transport
            .answer(Err(TransportError::with_status(500, "Failed")));
        h.idle_rx.recv().await.unwrap();

        assert_eq!(h.notification_rx.recv().await.unwrap(), FAILURE_NOTIFICATION);
        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(
            snapshot.messages,
            [
                Message::user("Hi"),
                Message::assistant("Hello!"),
                Message::user("Tell me more"),
            ]
        );
        assert_eq!(snapshot.suggestions, ["q1"]);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn test_resubmit_after_failure() {
        let mut h = make_harness();
        h.client.submit("Hi");
        h.client.snapshot().await.unwrap();
        h.transport.answer(Err(TransportError::new("connection refused")));
        h.idle_rx.recv().await.unwrap();

        h.client.submit("Hi");
        h.client.snapshot().await.unwrap();
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].clone().into_transcript(),
            [Message::user("Hi"), Message::user("Hi")]
        );

        h.transport.answer(reply("Hello!", &[]));
        h.idle_rx.recv().await.unwrap();
        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.messages.len(), 3);
        assert!(h.notification_rx.try_recv().is_ok());
        assert!(h.notification_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_suggestions_replaced() {
        let mut h = make_harness();
        for (question, suggestions) in
            [("Hi", vec!["a", "b", "c"]), ("More", vec!["d"])]
        {
            h.client.submit(question);
            h.client.snapshot().await.unwrap();
            h.transport.answer(reply("Sure.", &suggestions));
            h.idle_rx.recv().await.unwrap();
            let snapshot = h.client.snapshot().await.unwrap();
            assert_eq!(snapshot.suggestions, suggestions);
        }
    }

    #[tokio::test]
    async fn test_blank_submission() {
        let h = make_harness();
        h.client.submit("   ");
        h.client.submit("");

        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot, ClientSnapshot::default());
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_submit_input() {
        let mut h = make_harness();
        h.client.set_input("What do you build?");
        h.client.submit_input();

        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.input, "");
        assert_eq!(snapshot.messages, [Message::user("What do you build?")]);

        // The draft survives a submission that is ignored.
        h.client.set_input("Next question");
        h.client.submit_input();
        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.input, "Next question");
        assert_eq!(snapshot.messages.len(), 1);

        h.transport.answer(reply("Web apps.", &[]));
        h.idle_rx.recv().await.unwrap();
        h.client.submit_input();
        let snapshot = h.client.snapshot().await.unwrap();
        assert_eq!(snapshot.input, "");
        assert_eq!(snapshot.messages.len(), 3);
    }
}
