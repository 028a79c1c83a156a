//! Files staged on the current draft.
//!
//! Ids come from a counter owned by the staging area, so re-adding the same file yields a new
//! attachment. Nothing is ever rejected by type or size.

use parley_protocol::Attachment;
use parley_protocol::AttachmentId;
use parley_protocol::FileRef;

#[derive(Debug, Default)]
pub struct AttachmentStaging {
    items: Vec<Attachment>,
    next_id: u64,
}

impl AttachmentStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `files` in order and returns the created attachments.
    pub fn add(&mut self, files: Vec<FileRef>) -> Vec<Attachment> {
        let added: Vec<Attachment> = files
            .into_iter()
            .map(|file| {
                self.next_id += 1;
                Attachment::new(AttachmentId(self.next_id), file)
            })
            .collect();
        tracing::debug!(count = added.len(), "staged attachments");
        self.items.extend(added.iter().cloned());
        added
    }

    /// Removes the attachment with `id`. Returns `None` when it was already gone.
    pub fn remove(&mut self, id: AttachmentId) -> Option<Attachment> {
        let idx = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Drains all staged attachments, leaving the id counter untouched.
    pub fn take_all(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.items)
    }

    pub fn items(&self) -> &[Attachment] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
