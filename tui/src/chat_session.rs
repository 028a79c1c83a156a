//! One conversation: transcript, the reveal driving the latest reply, and the collaborators that
//! produce and copy replies.
//!
//! The session is the callee of a composer submission. It records which kind of content change
//! each operation caused so the transcript view can feed its follow controller.

use parley_protocol::Message;
use parley_protocol::MessageId;
use parley_protocol::SubmissionPayload;
use rand::rngs::StdRng;
use strum_macros::Display;

use crate::clipboard::Clipboard;
use crate::conversation_store::ConversationStore;
use crate::response_source::ResponseSource;
use crate::scroll_follow::ContentChange;
use crate::streaming::reveal::RevealConfig;
use crate::streaming::reveal::RevealEffect;
use crate::streaming::reveal::StreamingReveal;
use crate::streaming::scheduler::RevealScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AssistantStatus {
    Ready,
    Typing,
    Error,
}

impl AssistantStatus {
    pub fn label(self) -> &'static str {
        match self {
            AssistantStatus::Ready => "Assistant is ready",
            AssistantStatus::Typing => "Assistant is typing...",
            AssistantStatus::Error => "Connection error",
        }
    }
}

pub struct ChatSessionParams<S> {
    pub reveal_config: RevealConfig,
    pub scheduler: S,
    pub response_source: Box<dyn ResponseSource>,
    pub clipboard: Box<dyn Clipboard>,
    pub rng: StdRng,
}

pub struct ChatSession<S: RevealScheduler> {
    store: ConversationStore,
    reveal: StreamingReveal,
    scheduler: S,
    response_source: Box<dyn ResponseSource>,
    clipboard: Box<dyn Clipboard>,
    rng: StdRng,
    pending_changes: Vec<ContentChange>,
    last_error: Option<String>,
    copied: Option<(MessageId, u64)>,
    next_notice_id: u64,
}

impl<S: RevealScheduler> ChatSession<S> {
    pub fn new(params: ChatSessionParams<S>) -> Self {
        let ChatSessionParams {
            reveal_config,
            scheduler,
            response_source,
            clipboard,
            rng,
        } = params;
        Self {
            store: ConversationStore::new(),
            reveal: StreamingReveal::new(reveal_config),
            scheduler,
            response_source,
            clipboard,
            rng,
            pending_changes: Vec::new(),
            last_error: None,
            copied: None,
            next_notice_id: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Appends the user message and a placeholder, then starts revealing the reply.
    ///
    /// A reveal still in progress is cancelled first and its message keeps the partial content.
    /// Returns the id of the new assistant message.
    pub fn submit(&mut self, payload: SubmissionPayload) -> MessageId {
        self.interrupt_reveal();

        self.store.append_user(user_message_text(&payload));
        let assistant_id = self.store.append_assistant_placeholder().id;
        self.pending_changes.push(ContentChange::Appended);
        tracing::debug!(
            %assistant_id,
            mode = %payload.options.mode.mode(),
            model = %payload.options.model,
            mentions = payload.mentions.len(),
            attachments = payload.attachments.len(),
            "submitted message"
        );

        match self.response_source.generate_response(&payload) {
            Ok(text) => {
                self.last_error = None;
                let effects = self.reveal.start(&text, assistant_id, &mut self.rng);
                self.apply_effects(effects);
            }
            Err(err) => {
                tracing::warn!("failed to generate response: {err:#}");
                self.store.mark_done(assistant_id);
                self.last_error = Some(err.to_string());
            }
        }
        assistant_id
    }

    /// Advances the reveal. Returns whether anything changed; stale ticks change nothing.
    pub fn on_reveal_tick(&mut self, generation: u64) -> bool {
        let effects = self.reveal.on_tick(generation, &mut self.rng);
        if effects.is_empty() {
            tracing::trace!(generation, "ignored stale reveal tick");
            return false;
        }
        self.apply_effects(effects);
        true
    }

    /// Drops the transcript and stops any reveal in progress.
    pub fn new_chat(&mut self) {
        self.interrupt_reveal();
        self.store.clear();
        self.pending_changes.clear();
        self.last_error = None;
        self.copied = None;
        tracing::debug!("started new chat");
    }

    /// Best-effort copy of a message's content.
    ///
    /// Returns a notice id for the transient "Copied" confirmation, which is shown whether or not
    /// the clipboard accepted the text. `None` when the message does not exist.
    pub fn copy_message(&mut self, id: MessageId) -> Option<u64> {
        let content = self.store.get(id)?.content.clone();
        if let Err(err) = self.clipboard.set_text(&content) {
            tracing::warn!("failed to copy message to clipboard: {err}");
        }
        self.next_notice_id += 1;
        self.copied = Some((id, self.next_notice_id));
        Some(self.next_notice_id)
    }

    pub fn copy_last_assistant(&mut self) -> Option<u64> {
        let id = self.store.last_assistant()?.id;
        self.copy_message(id)
    }

    /// Message currently showing the "Copied" confirmation.
    pub fn copied_message(&self) -> Option<MessageId> {
        self.copied.map(|(id, _)| id)
    }

    /// Hides the confirmation if `notice_id` is still the latest one.
    pub fn expire_copied(&mut self, notice_id: u64) -> bool {
        if self.copied.is_some_and(|(_, current)| current == notice_id) {
            self.copied = None;
            return true;
        }
        false
    }

    pub fn assistant_status(&self) -> AssistantStatus {
        if self.reveal.is_active() {
            AssistantStatus::Typing
        } else if self.last_error.is_some() {
            AssistantStatus::Error
        } else {
            AssistantStatus::Ready
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Content changes since the last call, oldest first.
    pub fn take_content_changes(&mut self) -> Vec<ContentChange> {
        std::mem::take(&mut self.pending_changes)
    }

    fn interrupt_reveal(&mut self) {
        self.scheduler.cancel_all();
        if let Some(interrupted) = self.reveal.cancel() {
            tracing::debug!(message_id = %interrupted, "cancelled reveal in progress");
            self.store.mark_done(interrupted);
        }
    }

    fn apply_effects(&mut self, effects: Vec<RevealEffect>) {
        for effect in effects {
            match effect {
                RevealEffect::UpdateContent {
                    message_id,
                    content,
                } => {
                    if self.store.update_content(message_id, content) {
                        self.pending_changes.push(ContentChange::Grew);
                    }
                }
                RevealEffect::Schedule { generation, delay } => {
                    self.scheduler.schedule(generation, delay);
                }
                RevealEffect::MarkDone { message_id } => {
                    self.store.mark_done(message_id);
                    tracing::debug!(%message_id, "reveal finished");
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

/// The transcript text of a user message: the prompt plus a line naming any attachments.
fn user_message_text(payload: &SubmissionPayload) -> String {
    if payload.attachments.is_empty() {
        return payload.text.clone();
    }
    let names = payload
        .attachments
        .iter()
        .map(|attachment| attachment.file.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if payload.text.is_empty() {
        format!("[attached: {names}]")
    } else {
        format!("{}\n[attached: {names}]", payload.text)
    }
}
