use super::alias::AddressResolver;
use super::buffer::{BufferId, Cursor};
use super::buffer_manager::BufferManager;
use super::completion::{
    self, cursor_boundary, CompleteRequest, CompleteResponse, Completion, FindStart,
};
use super::settings::Settings;

/// Actions returned to the host that it must carry out itself.
/// This keeps editor API calls out of the core.
#[derive(Debug, PartialEq, Eq)]
pub enum EngineAction {
    None,
    /// Layer markdown highlighting over the mail syntax from `body_start`
    /// (zero-based line) to the end of the buffer.
    EnableMarkdown { buffer: BufferId, body_start: usize },
    /// Display an error to the user (engine already set self.message)
    Error,
}

/// Severity of the current [`Engine::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Info,
    Warning,
}

/// Plugin state for one editor session.
///
/// Every host callback goes through here. Failures never escape: they end up
/// in `message` with `MessageKind::Warning` and an empty result.
#[derive(Debug, Default)]
pub struct Engine {
    pub settings: Settings,
    pub buffer_manager: BufferManager,
    /// Notice for the host to show after the last call. Empty when there is
    /// nothing to say.
    pub message: String,
    pub message_kind: MessageKind,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Resolver for the currently configured alias file.
    pub fn resolver(&self) -> AddressResolver {
        AddressResolver::new(self.settings.alias_path())
    }

    fn clear_message(&mut self) {
        self.message.clear();
        self.message_kind = MessageKind::Info;
    }

    // Notices reach the user through `message`; the log only records them.
    fn info(&mut self, message: String) {
        tracing::debug!(notice = %message, "info");
        self.message = message;
        self.message_kind = MessageKind::Info;
    }

    fn warn(&mut self, message: String) {
        tracing::debug!(notice = %message, "warning");
        self.message = message;
        self.message_kind = MessageKind::Warning;
    }

    // =======================================================================
    // Address completion
    // =======================================================================

    /// First completion phase for a raw line.
    pub fn find_start(&mut self, line: &str, col: usize) -> FindStart {
        self.clear_message();
        completion::find_start(line, col)
    }

    /// First completion phase, reading the cursor line from an attached buffer.
    /// Unknown buffers and lines are treated as not applicable.
    pub fn find_start_in_buffer(&mut self, id: BufferId, cursor: Cursor) -> FindStart {
        let line = self
            .buffer_manager
            .get(id)
            .and_then(|state| state.buffer.line_text(cursor.line));
        match line {
            Some(line) => self.find_start(&line, cursor.col),
            None => {
                self.clear_message();
                FindStart::NotApplicable
            }
        }
    }

    /// Second completion phase. Reads the alias file from scratch; any
    /// failure leaves one warning naming the path and returns no candidates.
    pub fn complete_matches(&mut self, base: &str) -> Vec<String> {
        self.clear_message();
        match self.resolver().candidates(base) {
            Ok(candidates) => {
                tracing::debug!(base, count = candidates.len(), "address candidates");
                candidates
            }
            Err(e) => {
                self.warn(e.to_string());
                Vec::new()
            }
        }
    }

    /// The host's two-phase completion entry point.
    pub fn complete_func(&mut self, request: CompleteRequest<'_>) -> CompleteResponse {
        match request {
            CompleteRequest::FindStart { line, col } => self.find_start(line, col).into(),
            CompleteRequest::Matches { base } => {
                CompleteResponse::Matches(self.complete_matches(base))
            }
        }
    }

    /// Both phases in one call: where the address under the cursor starts and
    /// what could replace it. `None` when the line is not an address field.
    pub fn complete_at(&mut self, line: &str, col: usize) -> Option<Completion> {
        let start = match self.find_start(line, col) {
            FindStart::Start(start) => start,
            FindStart::NotApplicable => return None,
        };
        let end = cursor_boundary(line, col);
        let candidates = self.complete_matches(&line[start..end]);
        Some(Completion { start, candidates })
    }

    // =======================================================================
    // Markdown toggle
    // =======================================================================

    /// Enable markdown highlighting for a buffer's body, once. Repeat calls
    /// only leave a notice.
    pub fn toggle_markdown(&mut self, id: BufferId) -> EngineAction {
        self.clear_message();
        let Some(state) = self.buffer_manager.get_mut(id) else {
            self.warn(format!("Buffer {} is not a mail buffer", id.0));
            return EngineAction::Error;
        };
        if state.markdown_enabled {
            let name = state.display_name();
            self.info(format!("Markdown highlighting already enabled for {}", name));
            return EngineAction::None;
        }
        state.markdown_enabled = true;
        let body_start = state.buffer.body_start();
        let name = state.display_name();
        self.info(format!("Markdown highlighting enabled for {}", name));
        EngineAction::EnableMarkdown {
            buffer: id,
            body_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    const ALIASES: &str = "alias johnno John Citizen <john@isp.com> # personal email\n\
                           alias bob Bob Builder <bob@x.com>\n\
                           alias broken Broken Entry\n\
                           alias alice Alice Liddell <alice@x.com>\n";

    fn engine_with_aliases(test_name: &str, contents: &str) -> (Engine, PathBuf) {
        let dir = std::env::temp_dir().join(format!("mailcompose_engine_{}", test_name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("aliases");
        fs::write(&path, contents).unwrap();
        let mut settings = Settings::default();
        settings.set_alias_file(&path).unwrap();
        (Engine::with_settings(settings), path)
    }

    #[test]
    fn test_two_phase_protocol() {
        let (mut engine, _) = engine_with_aliases("two_phase", ALIASES);
        let line = "To: Alice <alice@x.com>, jo";

        let start = engine.complete_func(CompleteRequest::FindStart {
            line,
            col: line.len(),
        });
        assert_eq!(start, CompleteResponse::Start(25));

        let matches = engine.complete_func(CompleteRequest::Matches { base: &line[25..] });
        assert_eq!(
            matches,
            CompleteResponse::Matches(vec!["John Citizen <john@isp.com>".to_string()])
        );
        assert!(engine.message.is_empty());
    }

    #[test]
    fn test_find_start_not_applicable() {
        let mut engine = Engine::new();
        assert_eq!(
            engine.complete_func(CompleteRequest::FindStart {
                line: "Subject: jo",
                col: 11
            }),
            CompleteResponse::NotApplicable
        );
        assert!(engine.message.is_empty());
    }

    #[test]
    fn test_complete_at_single_call() {
        let (mut engine, _) = engine_with_aliases("single_call", ALIASES);
        let completion = engine.complete_at("Cc: bob@x.com,AL", 16).unwrap();
        assert_eq!(completion.start, 14);
        assert_eq!(completion.candidates, vec!["Alice Liddell <alice@x.com>"]);

        assert!(engine.complete_at("Subject: al", 11).is_none());
    }

    #[test]
    fn test_empty_base_keeps_file_order() {
        let (mut engine, _) = engine_with_aliases("file_order", ALIASES);
        assert_eq!(
            engine.complete_matches(""),
            vec![
                "John Citizen <john@isp.com>",
                "Bob Builder <bob@x.com>",
                "Alice Liddell <alice@x.com>",
            ]
        );
    }

    #[test]
    fn test_missing_alias_file_warns_once() {
        let mut settings = Settings::default();
        let path = std::env::temp_dir().join("mailcompose_engine_missing/aliases");
        let _ = fs::remove_file(&path);
        settings.set_alias_file(&path).unwrap();
        let mut engine = Engine::with_settings(settings);

        assert!(engine.complete_matches("jo").is_empty());
        assert_eq!(engine.message_kind, MessageKind::Warning);
        assert_eq!(
            engine.message,
            format!("Alias file not found: {}", path.display())
        );
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_warning_only_surfaces_through_message() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let mut settings = Settings::default();
        let path = std::env::temp_dir().join("mailcompose_engine_log_once/aliases");
        settings.set_alias_file(&path).unwrap();
        let mut engine = Engine::with_settings(settings);

        tracing::subscriber::with_default(subscriber, || {
            assert!(engine.complete_matches("jo").is_empty());
        });

        assert_eq!(engine.message_kind, MessageKind::Warning);
        assert!(engine.message.contains(&path.display().to_string()));
        let logged = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(logged.is_empty(), "warning was also logged: {}", logged);
    }

    #[test]
    fn test_no_addresses_warns() {
        let (mut engine, path) =
            engine_with_aliases("no_addresses", "alias johnno John Citizen john@isp.com\n");
        assert!(engine.complete_matches("").is_empty());
        assert_eq!(engine.message_kind, MessageKind::Warning);
        assert_eq!(
            engine.message,
            format!("No addresses found in {}", path.display())
        );
    }

    #[test]
    fn test_message_cleared_on_next_call() {
        let mut settings = Settings::default();
        settings
            .set_alias_file(std::env::temp_dir().join("mailcompose_engine_gone/aliases"))
            .unwrap();
        let mut engine = Engine::with_settings(settings);
        engine.complete_matches("x");
        assert!(!engine.message.is_empty());
        engine.find_start("To: x", 5);
        assert!(engine.message.is_empty());
        assert_eq!(engine.message_kind, MessageKind::Info);
    }

    #[test]
    fn test_find_start_in_buffer() {
        let mut engine = Engine::new();
        engine
            .buffer_manager
            .attach(BufferId(1), "From: me@x.com\nTo: Alice <alice@x.com>, Bo\n\nHi\n");
        assert_eq!(
            engine.find_start_in_buffer(BufferId(1), Cursor::new(1, 26)),
            FindStart::Start(25)
        );
        assert_eq!(
            engine.find_start_in_buffer(BufferId(1), Cursor::new(3, 2)),
            FindStart::NotApplicable
        );
        assert_eq!(
            engine.find_start_in_buffer(BufferId(1), Cursor::new(40, 0)),
            FindStart::NotApplicable
        );
        assert_eq!(
            engine.find_start_in_buffer(BufferId(7), Cursor::new(0, 0)),
            FindStart::NotApplicable
        );
    }

    #[test]
    fn test_toggle_markdown_once() {
        let mut engine = Engine::new();
        engine
            .buffer_manager
            .attach(BufferId(4), "To: bob@x.com\nSubject: notes\n\n# Heading\n");

        let first = engine.toggle_markdown(BufferId(4));
        assert_eq!(
            first,
            EngineAction::EnableMarkdown {
                buffer: BufferId(4),
                body_start: 3
            }
        );
        assert_eq!(engine.message_kind, MessageKind::Info);
        let first_message = engine.message.clone();
        assert!(engine.buffer_manager.get(BufferId(4)).unwrap().markdown_enabled);

        let second = engine.toggle_markdown(BufferId(4));
        assert_eq!(second, EngineAction::None);
        assert_eq!(engine.message_kind, MessageKind::Info);
        assert!(engine.message.contains("already enabled"));
        assert_ne!(engine.message, first_message);
        assert!(engine.buffer_manager.get(BufferId(4)).unwrap().markdown_enabled);
    }

    #[test]
    fn test_toggle_markdown_per_buffer() {
        let mut engine = Engine::new();
        engine.buffer_manager.attach(BufferId(1), "");
        engine.buffer_manager.attach(BufferId(2), "");
        assert!(matches!(
            engine.toggle_markdown(BufferId(1)),
            EngineAction::EnableMarkdown { .. }
        ));
        assert!(matches!(
            engine.toggle_markdown(BufferId(2)),
            EngineAction::EnableMarkdown { .. }
        ));
    }

    #[test]
    fn test_toggle_markdown_unknown_buffer() {
        let mut engine = Engine::new();
        assert_eq!(engine.toggle_markdown(BufferId(99)), EngineAction::Error);
        assert_eq!(engine.message_kind, MessageKind::Warning);
    }
}
