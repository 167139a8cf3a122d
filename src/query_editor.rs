// Query Editor Module for mscli
//
// The interactive prompt: a reedline editor with file-backed history,
// suggestions from history, keyword completion and highlighting, and an
// optional multi-line mode that reads until the statement ends with `;`.

use crate::config::UiConfig;
use crate::core::{MscliError, Result};
use crate::repl::COMMAND_PREFIX;
use crate::session::{Input, LineSource};
use crate::sql_completer::{SqlCompleter, SqlHighlighter};
use reedline::{
    default_emacs_keybindings, ColumnarMenu, DefaultHinter, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, Reedline,
    ReedlineEvent, ReedlineMenu, Signal, ValidationResult, Validator,
};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

const COMPLETION_MENU: &str = "completion_menu";

/// The `> ` prompt.
#[derive(Debug, Default, Clone)]
pub struct SqlPrompt;

impl Prompt for SqlPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("> ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Owned(format!("(search: {}) ", history_search.term))
    }
}

/// Whether a buffer is ready to submit in multi-line mode.
pub fn is_complete_statement(buffer: &str) -> bool {
    let trimmed = buffer.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMAND_PREFIX) || trimmed.ends_with(';')
}

/// Keeps reading lines until the statement is terminated.
#[derive(Debug, Default, Clone)]
pub struct StatementValidator;

impl Validator for StatementValidator {
    fn validate(&self, line: &str) -> ValidationResult {
        if is_complete_statement(line) {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}

/// The line editor the session reads from.
pub struct QueryEditor {
    editor: Reedline,
    prompt: SqlPrompt,
}

impl QueryEditor {
    /// Builds the editor, loading (or creating) the history file.
    pub fn new(ui: &UiConfig, history_path: &Path) -> Result<Self> {
        debug!(?history_path, "loading history");
        let history = FileBackedHistory::with_file(ui.history_size, history_path.to_path_buf())
            .map_err(|e| MscliError::Input(format!("Failed to open history: {}", e)))?;

        let mut keybindings = default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );
        let completion_menu = Box::new(ColumnarMenu::default().with_name(COMPLETION_MENU));

        let mut editor = Reedline::create()
            .with_history(Box::new(history))
            .with_hinter(Box::new(DefaultHinter::default()))
            .with_completer(Box::new(SqlCompleter::new()))
            .with_highlighter(Box::new(SqlHighlighter::new()))
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));
        if ui.multiline {
            editor = editor.with_validator(Box::new(StatementValidator));
        }

        Ok(QueryEditor {
            editor,
            prompt: SqlPrompt,
        })
    }
}

impl LineSource for QueryEditor {
    fn read_input(&mut self) -> Result<Input> {
        match self.editor.read_line(&self.prompt) {
            Ok(Signal::Success(buffer)) => Ok(Input::Line(buffer)),
            Ok(Signal::CtrlC) => Ok(Input::Interrupted),
            Ok(Signal::CtrlD) => Ok(Input::EndOfInput),
            Err(e) => Err(MscliError::Input(e.to_string())),
        }
    }
}
