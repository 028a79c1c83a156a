//! The interactive app: one chat session, its transcript view and the bottom pane, driven by
//! terminal input and timer events.

use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use parley_protocol::BackgroundSettings;
use parley_protocol::ComposerMode;
use parley_protocol::FileRef;
use parley_protocol::ResearchTool;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::text::Line;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;

use crate::AppExitInfo;
use crate::ExitReason;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::bottom_pane::BottomPane;
use crate::bottom_pane::BottomPaneParams;
use crate::bottom_pane::ChatComposerParams;
use crate::bottom_pane::InputResult;
use crate::chat_session::ChatSession;
use crate::chat_session::ChatSessionParams;
use crate::clipboard::Clipboard;
use crate::clipboard::SystemClipboard;
use crate::history_cell::EmptyStateCell;
use crate::history_cell::HistoryCell;
use crate::history_cell::MessageCell;
use crate::mention_index::MentionIndex;
use crate::render::Insets;
use crate::render::PlainTextRenderer;
use crate::render::RectExt as _;
use crate::render::renderable::Renderable;
use crate::response_source::CannedResponses;
use crate::response_source::EchoResponse;
use crate::response_source::ResponseSource;
use crate::streaming::reveal::RevealConfig;
use crate::streaming::scheduler::TokioRevealScheduler;
use crate::transcript_view::TranscriptView;
use crate::transcript_view::WHEEL_SCROLL_ROWS;
use crate::tui;
use crate::tui::ParleyTerminal;
use crate::tui::TuiEvent;
use crate::ui_colors::Theme;

/// How long the "Copied" confirmation stays visible.
pub const COPY_NOTICE_DURATION: Duration = Duration::from_secs(2);
const COPY_NOTICE: &str = "Copied to clipboard";
/// The transcript keeps at least this many rows when the bottom pane grows.
const MIN_TRANSCRIPT_ROWS: u16 = 3;
/// Models offered by the in-session switch, in cycling order.
const MODEL_CHOICES: [&str; 3] = ["claude-3.5-sonnet", "claude-3-opus", "claude-3-haiku"];

/// The model after `current` in [`MODEL_CHOICES`]. A model outside the list moves to the first
/// choice.
fn next_model(current: &str) -> &'static str {
    MODEL_CHOICES
        .iter()
        .position(|model| *model == current)
        .map_or(MODEL_CHOICES[0], |idx| {
            MODEL_CHOICES[(idx + 1) % MODEL_CHOICES.len()]
        })
}

/// Which canned assistant answers the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseStyle {
    /// A random reply from a fixed sample set.
    #[default]
    Canned,
    /// Quotes the prompt back.
    Echo,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub placeholder: String,
    pub max_length: Option<usize>,
    pub reveal: RevealConfig,
    pub near_bottom_rows: u16,
    pub background: BackgroundSettings,
    pub initial_attachments: Vec<FileRef>,
    pub response_style: ResponseStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "claude-3.5-sonnet".to_string(),
            placeholder: "Ask anything...".to_string(),
            max_length: None,
            reveal: RevealConfig::default(),
            near_bottom_rows: crate::transcript_view::DEFAULT_NEAR_BOTTOM_ROWS,
            background: BackgroundSettings::default(),
            initial_attachments: Vec::new(),
            response_style: ResponseStyle::default(),
        }
    }
}

/// Runs the interactive app until the user quits. The terminal is restored on every exit path.
pub async fn run_app(config: AppConfig) -> anyhow::Result<AppExitInfo> {
    let mut terminal = tui::init()?;
    let result = run_with_terminal(&mut terminal, config).await;
    if let Err(err) = tui::restore() {
        tracing::warn!("failed to restore terminal: {err}");
    }
    result
}

async fn run_with_terminal(
    terminal: &mut ParleyTerminal,
    config: AppConfig,
) -> anyhow::Result<AppExitInfo> {
    let (app_event_tx, mut app_event_rx) = unbounded_channel();
    let app_event_tx = AppEventSender::new(app_event_tx);
    let mut app = App::new(config, Box::new(SystemClipboard::new()), app_event_tx);
    let mut tui_events = tui::event_stream();

    terminal.draw(|frame| app.render(frame))?;
    loop {
        tokio::select! {
            maybe_event = tui_events.next() => {
                let Some(event) = maybe_event else {
                    app.exit(ExitReason::InputClosed);
                    break;
                };
                app.handle_tui_event(event);
            }
            maybe_app_event = app_event_rx.recv() => {
                let Some(app_event) = maybe_app_event else {
                    break;
                };
                app.handle_app_event(app_event);
            }
        }
        if app.exit_reason.is_some() {
            break;
        }
        terminal.draw(|frame| app.render(frame))?;
    }

    Ok(app.exit_info())
}

pub(crate) struct App {
    session: ChatSession<TokioRevealScheduler>,
    bottom_pane: BottomPane,
    transcript: TranscriptView,
    theme: Theme,
    renderer: PlainTextRenderer,
    app_event_tx: AppEventSender,
    exit_reason: Option<ExitReason>,
}

impl App {
    pub(crate) fn new(
        config: AppConfig,
        clipboard: Box<dyn Clipboard>,
        app_event_tx: AppEventSender,
    ) -> Self {
        let AppConfig {
            model,
            placeholder,
            max_length,
            reveal,
            near_bottom_rows,
            background,
            initial_attachments,
            response_style,
        } = config;

        let theme = Theme::from_background(&background);
        let response_source: Box<dyn ResponseSource> = match response_style {
            ResponseStyle::Canned => Box::new(CannedResponses::sample()),
            ResponseStyle::Echo => Box::new(EchoResponse),
        };
        let session = ChatSession::new(ChatSessionParams {
            reveal_config: reveal,
            scheduler: TokioRevealScheduler::new(app_event_tx.clone()),
            response_source,
            clipboard,
            rng: StdRng::from_os_rng(),
        });

        let mut bottom_pane = BottomPane::new(BottomPaneParams {
            composer: ChatComposerParams {
                mention_index: MentionIndex::sample(),
                placeholder_text: placeholder,
                max_length,
                model,
            },
            theme,
        });
        if !initial_attachments.is_empty() {
            bottom_pane.composer_mut().attach(initial_attachments);
        }

        Self {
            session,
            bottom_pane,
            transcript: TranscriptView::new(near_bottom_rows),
            theme,
            renderer: PlainTextRenderer,
            app_event_tx,
            exit_reason: None,
        }
    }

    fn exit(&mut self, reason: ExitReason) {
        tracing::info!(?reason, "exiting");
        self.exit_reason = Some(reason);
    }

    fn exit_info(&self) -> AppExitInfo {
        AppExitInfo {
            message_count: self.session.messages().len(),
            exit_reason: self
                .exit_reason
                .clone()
                .unwrap_or(ExitReason::InputClosed),
        }
    }

    pub(crate) fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) => self.handle_key_event(key_event),
            TuiEvent::Paste(pasted) => {
                self.bottom_pane.handle_paste(pasted);
            }
            TuiEvent::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            TuiEvent::Resize => {}
        }
    }

    pub(crate) fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::RevealTick { generation } => {
                self.session.on_reveal_tick(generation);
            }
            AppEvent::ExpireNotice { id } => {
                self.session.expire_copied(id);
            }
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key_event.modifiers.contains(KeyModifiers::ALT);
        let popup_open = self.bottom_pane.composer().is_mention_popup_open();

        match key_event.code {
            KeyCode::Char('c') if ctrl => {
                if self.bottom_pane.composer().is_empty() {
                    self.exit(ExitReason::UserRequested);
                } else {
                    self.bottom_pane.composer_mut().clear_draft();
                }
            }
            KeyCode::Char('y') if ctrl => self.copy_last_reply(),
            KeyCode::Char('n') if ctrl && !popup_open => self.new_chat(),
            KeyCode::Char('o') if ctrl => {
                let model = next_model(self.bottom_pane.composer().model());
                self.bottom_pane.composer_mut().set_model(model);
                tracing::debug!(model, "switched model");
            }
            KeyCode::F(n @ 2..=5) => {
                let mode = ComposerMode::ALL[usize::from(n - 1)];
                let mode = self.bottom_pane.composer_mut().set_mode(mode);
                tracing::debug!(%mode, "switched composer mode");
            }
            KeyCode::F(n @ 6..=9) => {
                let quick = self
                    .bottom_pane
                    .composer()
                    .mention_index()
                    .quick_mentions()
                    .get(usize::from(n - 6))
                    .cloned();
                if let Some(mention) = quick {
                    self.bottom_pane.composer_mut().insert_quick_mention(mention);
                }
            }
            KeyCode::Char(c @ '1'..='4') if alt => {
                let tool = ResearchTool::ALL[(c as usize) - ('1' as usize)];
                self.bottom_pane.composer_mut().toggle_tool(tool);
            }
            KeyCode::Backspace if alt => {
                let last = self.bottom_pane.composer().attachments().last();
                if let Some(id) = last.map(|attachment| attachment.id) {
                    self.bottom_pane.composer_mut().remove_attachment(id);
                }
            }
            KeyCode::PageUp => self.transcript.page_up(),
            KeyCode::PageDown => self.transcript.page_down(),
            KeyCode::End if ctrl => self.transcript.jump_to_latest(),
            _ => {
                let (result, _) = self.bottom_pane.handle_key_event(key_event);
                if let InputResult::Submitted(payload) = result {
                    self.session.submit(payload);
                }
            }
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::ScrollUp => self.transcript.scroll_by(-WHEEL_SCROLL_ROWS),
            MouseEventKind::ScrollDown => self.transcript.scroll_by(WHEEL_SCROLL_ROWS),
            _ => {}
        }
    }

    fn copy_last_reply(&mut self) {
        let Some(notice_id) = self.session.copy_last_assistant() else {
            return;
        };
        let app_event_tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(COPY_NOTICE_DURATION).await;
            app_event_tx.send(AppEvent::ExpireNotice { id: notice_id });
        });
    }

    fn new_chat(&mut self) {
        self.session.new_chat();
        self.transcript.reset();
    }

    fn transcript_lines(&self, width: u16, height: u16) -> Vec<Line<'static>> {
        let messages = self.session.messages();
        if messages.is_empty() {
            let cell = EmptyStateCell;
            let padding = height.saturating_sub(cell.desired_height(width)) / 2;
            let mut lines = vec![Line::default(); usize::from(padding)];
            lines.extend(cell.display_lines(width));
            return lines;
        }

        let copied = self.session.copied_message();
        messages
            .iter()
            .flat_map(|message| {
                MessageCell::new(
                    message,
                    copied == Some(message.id),
                    self.theme,
                    &self.renderer,
                )
                .display_lines(width)
            })
            .collect()
    }

    pub(crate) fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.bottom_pane.set_status(
            self.session.assistant_status(),
            self.session.last_error().map(str::to_string),
        );
        self.bottom_pane.set_notice(
            self.session
                .copied_message()
                .map(|_| COPY_NOTICE.to_string()),
        );

        let pane_height = self
            .bottom_pane
            .desired_height(area.width)
            .min(area.height.saturating_sub(MIN_TRANSCRIPT_ROWS));
        let [transcript_area, pane_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(pane_height)]).areas(area);
        let transcript_area = transcript_area.inset(Insets::tlbr(0, 1, 0, 1));

        let lines = self.transcript_lines(transcript_area.width, transcript_area.height);
        let changes = self.session.take_content_changes();
        self.transcript
            .sync(lines.len(), transcript_area.height, &changes);
        self.transcript
            .render(lines, transcript_area, frame.buffer_mut());

        self.bottom_pane.render(pane_area, frame.buffer_mut());
        if let Some(position) = self.bottom_pane.cursor_pos(pane_area) {
            frame.set_cursor_position(position);
        }
    }
}
