//! Terminal setup and teardown plus the input event stream.

use std::io;
use std::io::Stdout;
use std::io::stdout;

use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyEvent;
use crossterm::event::MouseEvent;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio_stream::Stream;
use tokio_stream::StreamExt;

pub type ParleyTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Input the app reacts to. Focus changes and other terminal noise are filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    Key(KeyEvent),
    Paste(String),
    Mouse(MouseEvent),
    Resize,
}

/// Enters raw mode and the alternate screen, and installs a panic hook that restores the
/// terminal before the panic message is printed.
pub fn init() -> io::Result<ParleyTerminal> {
    enable_raw_mode()?;
    execute!(
        stdout(),
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    set_panic_hook();
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore() -> io::Result<()> {
    execute!(
        stdout(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    disable_raw_mode()
}

fn set_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        hook(panic_info);
    }));
}

pub fn event_stream() -> impl Stream<Item = TuiEvent> + Unpin {
    EventStream::new().filter_map(|event| match event {
        Ok(event) => map_event(event),
        Err(err) => {
            tracing::warn!("failed to read terminal event: {err}");
            None
        }
    })
}

fn map_event(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => Some(TuiEvent::Key(key_event)),
        // Many terminals convert newlines to \r when pasting (e.g., iTerm2).
        Event::Paste(pasted) => {
            let pasted = pasted.replace("\r\n", "\n").replace('\r', "\n");
            Some(TuiEvent::Paste(pasted))
        }
        Event::Mouse(mouse_event) => Some(TuiEvent::Mouse(mouse_event)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        Event::FocusGained | Event::FocusLost => None,
    }
}
