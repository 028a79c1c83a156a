//! Data types shared between the composer engine, the terminal front end and the binary.

pub mod attachment;
pub mod mention;
pub mod message;
pub mod settings;
pub mod submission;

pub use attachment::Attachment;
pub use attachment::AttachmentId;
pub use attachment::AttachmentKind;
pub use attachment::FileRef;
pub use attachment::FileRefError;
pub use attachment::format_file_size;
pub use mention::Mention;
pub use mention::MentionId;
pub use mention::MentionKind;
pub use message::Message;
pub use message::MessageId;
pub use message::Role;
pub use settings::BACKGROUND_SETTINGS_KEY;
pub use settings::BackgroundPattern;
pub use settings::BackgroundSettings;
pub use submission::ComposerMode;
pub use submission::ModeOptions;
pub use submission::ResearchTool;
pub use submission::SubmissionPayload;
pub use submission::SubmitOptions;
