// Forbid accidental stdout/stderr writes in the library portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod exit;

mod app;
mod app_event;
mod app_event_sender;
mod bottom_pane;
mod chat_session;
mod clipboard;
mod clipboard_paste;
mod conversation_store;
mod history_cell;
mod mention_index;
mod render;
mod response_source;
mod scroll_follow;
mod streaming;
mod transcript_view;
mod tui;
mod ui_colors;

pub use app::AppConfig;
pub use app::COPY_NOTICE_DURATION;
pub use app::ResponseStyle;
pub use app::run_app;
pub use exit::AppExitInfo;
pub use exit::ExitReason;
pub use streaming::reveal::DEFAULT_MAX_DELAY;
pub use streaming::reveal::DEFAULT_MIN_DELAY;
pub use streaming::reveal::RevealConfig;
pub use transcript_view::DEFAULT_NEAR_BOTTOM_ROWS;
