//! Terminal transcript: reveals reply text as the animator releases it.

use crate::progress::RequestSpinner;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use streamchat_application::TranscriptView;
use streamchat_domain::{ComposerView, SendControl, SessionOutcome, SessionState};

type Sink = Mutex<Box<dyn Write + Send>>;

/// Enable or disable ANSI colors for everything this crate prints.
pub fn set_color(enabled: bool) {
    if !enabled {
        colored::control::set_override(false);
    }
}

/// Key hint for the composer's send/stop control.
pub fn control_hint(composer: ComposerView) -> &'static str {
    match composer.control {
        SendControl::Send => "Enter to send",
        SendControl::Stop => "Ctrl-C to stop",
    }
}

/// [`TranscriptView`] writing to the terminal.
///
/// Reply text goes to stdout unstyled; spinner, status and errors go to
/// stderr so piped output contains only the reply.
pub struct ConsoleTranscript {
    out: Sink,
    err: Sink,
    show_progress: bool,
    spinner: Mutex<Option<RequestSpinner>>,
    line_open: AtomicBool,
}

impl ConsoleTranscript {
    pub fn new() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
            err: Mutex::new(err),
            show_progress: true,
            spinner: Mutex::new(None),
            line_open: AtomicBool::new(false),
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn stop_spinner(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(spinner) = spinner.take()
        {
            spinner.finish();
        }
    }

    fn write_out(&self, text: &str) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
        }
    }

    fn write_err_line(&self, line: &str) {
        if let Ok(mut err) = self.err.lock() {
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }

    /// Terminate a partially written reply line.
    fn close_line(&self) {
        if self.line_open.swap(false, Ordering::SeqCst) {
            self.write_out("\n");
        }
    }
}

impl Default for ConsoleTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptView for ConsoleTranscript {
    fn on_state_change(&self, state: &SessionState, composer: ComposerView) {
        match state {
            SessionState::Requesting => {
                if self.show_progress
                    && let Ok(mut spinner) = self.spinner.lock()
                {
                    *spinner = Some(RequestSpinner::start(format!(
                        "Waiting for the model ({})",
                        control_hint(composer)
                    )));
                }
            }
            SessionState::Terminated(SessionOutcome::Cancelled) => {
                self.stop_spinner();
                self.close_line();
                self.write_err_line(&"[stopped]".dimmed().to_string());
            }
            SessionState::Idle => {}
            _ => self.stop_spinner(),
        }
    }

    fn reveal(&self, unit: char) {
        self.stop_spinner();
        self.line_open.store(true, Ordering::SeqCst);
        let mut buf = [0u8; 4];
        self.write_out(unit.encode_utf8(&mut buf));
    }

    fn reveal_text(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.stop_spinner();
        self.line_open.store(true, Ordering::SeqCst);
        self.write_out(text);
    }

    fn finalize(&self, _full_text: &str) {
        self.stop_spinner();
        self.close_line();
    }

    fn show_error(&self, message: &str) {
        self.stop_spinner();
        self.close_line();
        self.write_err_line(&format!("{} {}", "⚠️".red(), message.red()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn transcript() -> (ConsoleTranscript, Buffer, Buffer) {
        let out = Buffer::default();
        let err = Buffer::default();
        let view = ConsoleTranscript::with_writers(Box::new(out.clone()), Box::new(err.clone()))
            .with_progress(false);
        (view, out, err)
    }

    #[test]
    fn test_reveal_writes_units_in_order() {
        let (view, out, _err) = transcript();
        for unit in "Héllo".chars() {
            view.reveal(unit);
        }
        view.finalize("Héllo");
        assert_eq!(out.contents(), "Héllo\n");
    }

    #[test]
    fn test_error_goes_to_stderr_after_partial_line() {
        let (view, out, err) = transcript();
        view.reveal_text("Partial");
        view.show_error("Connection to the server was lost");

        assert_eq!(out.contents(), "Partial\n");
        assert!(err.contents().contains("Connection to the server was lost"));
    }

    #[test]
    fn test_cancelled_session_prints_stopped_marker() {
        let (view, out, err) = transcript();
        view.reveal_text("Hel");
        view.finalize("Hel");
        let state = SessionState::Terminated(SessionOutcome::Cancelled);
        view.on_state_change(&state, ComposerView::for_state(&state));

        assert_eq!(out.contents(), "Hel\n");
        assert!(err.contents().contains("[stopped]"));
    }

    #[test]
    fn test_control_hint_follows_composer() {
        assert_eq!(control_hint(ComposerView::ready()), "Enter to send");
        assert_eq!(control_hint(ComposerView::busy()), "Ctrl-C to stop");
    }
}
