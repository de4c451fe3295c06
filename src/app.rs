// SPDX-License-Identifier: MIT
//
// Editor — the App driven by mkmd-term's event loop.
//
// Key and mouse events are translated into Session intents. Questions for
// the user ("Save as", "Save changes?", search terms, line numbers) are a
// modal prompt on the bottom row: while one is open every key goes to it,
// and Enter hands the typed text to whatever opened the prompt.
//
//   stdin → parser → on_event → prompt or key dispatch → Session
//   paint → render::render → framebuffer → diff renderer → terminal

use std::path::{Path, PathBuf};

use mkmd_editor::cursor::Motion;
use mkmd_editor::render::{self, Overlay};
use mkmd_editor::search::IncrementalSearch;
use mkmd_editor::session::WheelDirection;
use mkmd_editor::{Error, Session};
use mkmd_term::buffer::FrameBuffer;
use mkmd_term::event_loop::{Action, App};
use mkmd_term::input::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use mkmd_term::terminal::Size;

// ─── Prompts ────────────────────────────────────────────────────────────────

/// What happens once the user answers "Save changes?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterSave {
    Quit,
    NextChunk,
    PrevChunk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    SaveAs { then_quit: bool },
    ConfirmOverwrite { path: PathBuf, then_quit: bool },
    SaveChanges(AfterSave),
    Search,
    GoToLine,
}

impl PromptKind {
    fn label(&self) -> String {
        match self {
            Self::SaveAs { .. } => "Save as: ".to_owned(),
            Self::ConfirmOverwrite { path, .. } => {
                let name = path
                    .file_name()
                    .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
                format!("File '{name}' exists. Overwrite? (y/n): ")
            }
            Self::SaveChanges(_) => "Save changes? (y/n): ".to_owned(),
            Self::Search => "Search: ".to_owned(),
            Self::GoToLine => "Go to line: ".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Prompt {
    Line { kind: PromptKind, input: String },
    Incremental(IncrementalSearch),
}

fn is_yes(answer: &str) -> bool {
    matches!(answer, "y" | "Y")
}

// ─── Editor ─────────────────────────────────────────────────────────────────

pub struct Editor {
    session: Session,
    prompt: Option<Prompt>,
    /// Shown on the bottom row until the next key.
    message: Option<String>,
    cursor_screen: Option<(u16, u16)>,
}

impl Editor {
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            prompt: None,
            message: None,
            cursor_screen: None,
        }
    }

    #[cfg(test)]
    const fn session(&self) -> &Session {
        &self.session
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.prompt = Some(Prompt::Line {
            kind,
            input: String::new(),
        });
    }

    fn report(&mut self, err: &Error) {
        self.message = Some(format!("Error: {err}"));
    }

    // -- Saving -------------------------------------------------------------

    /// Save, asking for a name first when the session has none.
    fn save_with_prompt(&mut self, then_quit: bool) -> Action {
        if self.session.path().is_none() {
            self.open_prompt(PromptKind::SaveAs { then_quit });
            return Action::Continue;
        }
        let result = self.session.save();
        self.finish_save(result, then_quit)
    }

    fn save_to(&mut self, path: PathBuf, then_quit: bool) -> Action {
        let result = self.session.save_as(path);
        self.finish_save(result, then_quit)
    }

    fn finish_save(&mut self, result: mkmd_editor::Result<()>, then_quit: bool) -> Action {
        match result {
            Ok(()) if then_quit => Action::Quit,
            Ok(()) => Action::Continue,
            Err(e) => {
                self.report(&e);
                Action::Continue
            }
        }
    }

    // -- Chunks -------------------------------------------------------------

    fn request_chunk(&mut self, next: bool) {
        let chunks = self.session.chunks();
        let possible = if next { chunks.truncated() } else { chunks.current() > 0 };
        if !possible {
            return;
        }
        if self.session.is_modified() {
            let after = if next { AfterSave::NextChunk } else { AfterSave::PrevChunk };
            self.open_prompt(PromptKind::SaveChanges(after));
        } else {
            self.switch_chunk(next, false);
        }
    }

    fn switch_chunk(&mut self, next: bool, save_first: bool) {
        let result = if next {
            self.session.load_next_chunk(save_first)
        } else {
            self.session.load_prev_chunk(save_first)
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "chunk switch failed");
            self.report(&e);
        }
    }

    // -- Prompt input -------------------------------------------------------

    fn handle_prompt(&mut self, key: KeyEvent, prompt: Prompt) -> Action {
        match prompt {
            Prompt::Incremental(inc) => {
                self.handle_incremental(key, inc);
                Action::Continue
            }
            Prompt::Line { kind, mut input } => match key.code {
                KeyCode::Enter => self.submit(kind, &input),
                KeyCode::Escape => Action::Continue,
                KeyCode::Backspace => {
                    input.pop();
                    self.prompt = Some(Prompt::Line { kind, input });
                    Action::Continue
                }
                KeyCode::Char(ch) if !key.ctrl() => {
                    input.push(ch);
                    self.prompt = Some(Prompt::Line { kind, input });
                    Action::Continue
                }
                _ => {
                    self.prompt = Some(Prompt::Line { kind, input });
                    Action::Continue
                }
            },
        }
    }

    fn submit(&mut self, kind: PromptKind, input: &str) -> Action {
        match kind {
            PromptKind::SaveAs { then_quit } => {
                if input.is_empty() {
                    return Action::Continue;
                }
                let path = PathBuf::from(input);
                if Path::new(input).exists() {
                    self.open_prompt(PromptKind::ConfirmOverwrite { path, then_quit });
                    return Action::Continue;
                }
                self.save_to(path, then_quit)
            }
            PromptKind::ConfirmOverwrite { path, then_quit } => {
                if is_yes(input) {
                    self.save_to(path, then_quit)
                } else {
                    Action::Continue
                }
            }
            PromptKind::SaveChanges(after) => {
                let save = is_yes(input);
                match after {
                    AfterSave::Quit if save => self.save_with_prompt(true),
                    AfterSave::Quit => Action::Quit,
                    AfterSave::NextChunk => {
                        self.switch_chunk(true, save);
                        Action::Continue
                    }
                    AfterSave::PrevChunk => {
                        self.switch_chunk(false, save);
                        Action::Continue
                    }
                }
            }
            PromptKind::Search => {
                self.session.set_search(input);
                Action::Continue
            }
            PromptKind::GoToLine => {
                self.session.go_to_line(input);
                Action::Continue
            }
        }
    }

    fn handle_incremental(&mut self, key: KeyEvent, mut inc: IncrementalSearch) {
        match key.code {
            KeyCode::Escape => {
                self.session.clear_search();
                return;
            }
            KeyCode::Enter => return,
            KeyCode::Tab if key.shift() => {
                self.session.find_prev();
            }
            KeyCode::Tab | KeyCode::F(3) => {
                self.session.find_next();
            }
            KeyCode::Backspace => {
                if inc.pop() {
                    self.session.search_refresh(inc.term());
                }
            }
            KeyCode::Char(ch) if !key.ctrl() => {
                if inc.push(ch) {
                    self.session.search_refresh(inc.term());
                }
            }
            _ => {}
        }
        self.prompt = Some(Prompt::Incremental(inc));
    }

    fn start_incremental(&mut self) {
        let inc = IncrementalSearch::begin(self.session.search_term().unwrap_or(""));
        self.session.search_refresh(inc.term());
        self.prompt = Some(Prompt::Incremental(inc));
    }

    // -- Editing keys -------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.ctrl() {
            if let KeyCode::Char(ch) = key.code {
                return self.handle_ctrl(ch);
            }
        }

        let s = &mut self.session;
        let extend = key.shift();
        match key.code {
            KeyCode::Left if key.ctrl() => s.move_cursor(Motion::WordLeft, extend),
            KeyCode::Right if key.ctrl() => s.move_cursor(Motion::WordRight, extend),
            KeyCode::Home if key.ctrl() => s.move_cursor(Motion::DocStart, extend),
            KeyCode::End if key.ctrl() => s.move_cursor(Motion::DocEnd, extend),
            KeyCode::Left => s.move_cursor(Motion::Left, extend),
            KeyCode::Right => s.move_cursor(Motion::Right, extend),
            KeyCode::Up => s.move_cursor(Motion::Up, extend),
            KeyCode::Down => s.move_cursor(Motion::Down, extend),
            KeyCode::Home => s.move_cursor(Motion::LineStart, extend),
            KeyCode::End => s.move_cursor(Motion::LineEnd, extend),
            KeyCode::PageUp => s.page_up(),
            KeyCode::PageDown => s.page_down(),
            KeyCode::Enter => s.insert_newline(),
            KeyCode::Backspace => {
                s.backspace();
            }
            KeyCode::Delete => {
                s.delete_forward();
            }
            KeyCode::Tab if !extend => s.insert_tab(),
            KeyCode::F(3) => {
                s.find_next();
            }
            KeyCode::F(4) => self.start_incremental(),
            KeyCode::Char(ch) => {
                s.insert_char(ch);
            }
            _ => {}
        }
        Action::Continue
    }

    fn handle_ctrl(&mut self, ch: char) -> Action {
        let s = &mut self.session;
        match ch.to_ascii_lowercase() {
            's' => return self.save_with_prompt(false),
            'd' => return self.save_with_prompt(true),
            'q' => {
                if !s.is_modified() {
                    return Action::Quit;
                }
                self.open_prompt(PromptKind::SaveChanges(AfterSave::Quit));
            }
            'z' => {
                s.undo();
            }
            'y' => {
                s.redo();
            }
            'a' => s.select_all(),
            'x' => {
                s.cut();
            }
            'c' => {
                s.copy();
            }
            'v' => {
                s.paste();
            }
            'f' => self.open_prompt(PromptKind::Search),
            'g' => self.open_prompt(PromptKind::GoToLine),
            't' => self.request_chunk(true),
            'b' => self.request_chunk(false),
            _ => {}
        }
        Action::Continue
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let s = &mut self.session;
        match mouse.kind {
            MouseEventKind::Press(MouseButton::Left) => {
                s.click(usize::from(mouse.x), usize::from(mouse.y));
            }
            MouseEventKind::ScrollUp => s.scroll_wheel(WheelDirection::Up),
            MouseEventKind::ScrollDown => s.scroll_wheel(WheelDirection::Down),
            MouseEventKind::ScrollLeft => s.scroll_wheel(WheelDirection::Left),
            MouseEventKind::ScrollRight => s.scroll_wheel(WheelDirection::Right),
            _ => {}
        }
    }
}

impl App for Editor {
    fn on_event(&mut self, event: &Event) -> Action {
        match event {
            Event::Key(key) => {
                self.message = None;
                match self.prompt.take() {
                    Some(prompt) => self.handle_prompt(*key, prompt),
                    None => self.handle_key(*key),
                }
            }
            Event::Mouse(mouse) => {
                if self.prompt.is_none() {
                    self.handle_mouse(*mouse);
                }
                Action::Continue
            }
            Event::Paste(text) => {
                match &mut self.prompt {
                    Some(Prompt::Line { input, .. }) => {
                        input.extend(text.chars().filter(|c| !c.is_control()));
                    }
                    Some(Prompt::Incremental(_)) => {}
                    None => {
                        self.session.paste_text(text);
                    }
                }
                Action::Continue
            }
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.session
            .resize(usize::from(size.cols), usize::from(size.rows));
    }

    fn on_tick(&mut self) -> bool {
        self.session.tick()
    }

    fn paint(&mut self, frame: &mut FrameBuffer) {
        let prompt_text = match &self.prompt {
            Some(Prompt::Line { kind, input }) => Some(format!("{}{input}", kind.label())),
            Some(Prompt::Incremental(inc)) => Some(format!("Search (inc): {}", inc.term())),
            None => None,
        };
        let overlay = match (&prompt_text, &self.message) {
            (Some(text), _) => Some(Overlay::Prompt(text)),
            (None, Some(msg)) => Some(Overlay::Message(msg)),
            (None, None) => None,
        };
        self.cursor_screen = render::render(&self.session, frame, overlay);
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor_screen
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mkmd_editor::EditorConfig;
    use mkmd_term::input::Modifiers;
    use pretty_assertions::assert_eq;

    // ── Helpers ───────────────────────────────────────────────────────────

    fn press(ch: char) -> Event {
        Event::Key(KeyEvent::plain(KeyCode::Char(ch)))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn ctrl(ch: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(ch), Modifiers::CTRL))
    }

    fn typed(text: &str) -> Vec<Event> {
        text.chars().map(press).collect()
    }

    fn feed(editor: &mut Editor, events: &[Event]) -> Action {
        let mut last = Action::Continue;
        for event in events {
            last = editor.on_event(event);
        }
        last
    }

    fn editor_with(text: &str) -> Editor {
        let mut session = Session::new(EditorConfig::default());
        session.paste_text(text);
        session.move_cursor(Motion::DocStart, false);
        let mut e = Editor::new(session);
        e.on_resize(Size { cols: 80, rows: 24 });
        e
    }

    fn lines(e: &Editor) -> Vec<String> {
        e.session().document().lines().to_vec()
    }

    fn cursor(e: &Editor) -> (usize, usize) {
        let c = e.session().cursor();
        (c.line(), c.col())
    }

    // ── Editing ───────────────────────────────────────────────────────────

    #[test]
    fn typing_and_undo() {
        let mut e = editor_with("");
        feed(&mut e, &typed("hi"));
        feed(&mut e, &[key(KeyCode::Enter)]);
        feed(&mut e, &typed("yo"));
        assert_eq!(lines(&e), vec!["hi", "yo"]);
        feed(&mut e, &[ctrl('z')]);
        assert_ne!(lines(&e), vec!["hi", "yo"]);
        feed(&mut e, &[ctrl('y')]);
        assert_eq!(lines(&e), vec!["hi", "yo"]);
    }

    #[test]
    fn shift_arrows_select_and_ctrl_x_cuts() {
        let mut e = editor_with("hello world");
        let shift_right = Event::Key(KeyEvent::new(KeyCode::Right, Modifiers::SHIFT));
        feed(&mut e, &[shift_right.clone(), shift_right.clone(), shift_right]);
        feed(&mut e, &[ctrl('x')]);
        assert_eq!(lines(&e), vec!["lo world"]);
        feed(&mut e, &[key(KeyCode::End), ctrl('v')]);
        assert_eq!(lines(&e), vec!["lo worldhel"]);
    }

    #[test]
    fn ctrl_arrows_move_by_word() {
        let mut e = editor_with("one two three");
        let word_right = Event::Key(KeyEvent::new(KeyCode::Right, Modifiers::CTRL));
        feed(&mut e, &[word_right.clone(), word_right]);
        assert_eq!(cursor(&e), (0, 8));
    }

    #[test]
    fn bracketed_paste_inserts_text() {
        let mut e = editor_with("");
        e.on_event(&Event::Paste("a\nb".to_owned()));
        assert_eq!(lines(&e), vec!["a", "b"]);
    }

    // ── Prompts ───────────────────────────────────────────────────────────

    #[test]
    fn go_to_line_prompt() {
        let mut e = editor_with("a\nb\nc\nd");
        feed(&mut e, &[ctrl('g')]);
        feed(&mut e, &typed("3"));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert_eq!(cursor(&e), (2, 0));
        assert!(e.prompt.is_none());
    }

    #[test]
    fn escape_cancels_prompt() {
        let mut e = editor_with("a\nb");
        feed(&mut e, &[ctrl('g')]);
        feed(&mut e, &typed("2"));
        feed(&mut e, &[key(KeyCode::Escape)]);
        assert_eq!(cursor(&e), (0, 0));
        assert!(e.prompt.is_none());
    }

    #[test]
    fn search_prompt_then_f3() {
        let mut e = editor_with("x foo\nfoo y");
        feed(&mut e, &[ctrl('f')]);
        feed(&mut e, &typed("FOO"));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert_eq!(cursor(&e), (0, 2));
        feed(&mut e, &[key(KeyCode::F(3))]);
        assert_eq!(cursor(&e), (1, 0));
    }

    #[test]
    fn incremental_search_tracks_typing() {
        let mut e = editor_with("cat\ncar\ncart");
        feed(&mut e, &[key(KeyCode::F(4))]);
        feed(&mut e, &typed("car"));
        assert_eq!(cursor(&e), (1, 0));
        feed(&mut e, &[key(KeyCode::Tab)]);
        assert_eq!(cursor(&e), (2, 0));
        let shift_tab = Event::Key(KeyEvent::new(KeyCode::Tab, Modifiers::SHIFT));
        feed(&mut e, &[shift_tab]);
        assert_eq!(cursor(&e), (1, 0));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert!(e.prompt.is_none());
        assert_eq!(e.session().search_term(), Some("car"));

        feed(&mut e, &[key(KeyCode::F(4)), key(KeyCode::Escape)]);
        assert_eq!(e.session().search_term(), None);
    }

    #[test]
    fn quit_unmodified_is_immediate() {
        let mut e = Editor::new(Session::default());
        assert_eq!(feed(&mut e, &[ctrl('q')]), Action::Quit);
    }

    #[test]
    fn quit_modified_asks_first() {
        let mut e = editor_with("");
        feed(&mut e, &typed("x"));
        assert_eq!(feed(&mut e, &[ctrl('q')]), Action::Continue);
        assert!(e.prompt.is_some());
        assert_eq!(feed(&mut e, &[press('n'), key(KeyCode::Enter)]), Action::Quit);
    }

    #[test]
    fn save_as_prompt_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/notes.md");
        let mut e = editor_with("");
        feed(&mut e, &typed("body"));
        feed(&mut e, &[ctrl('s')]);
        feed(&mut e, &typed(&path.to_string_lossy()));
        assert_eq!(feed(&mut e, &[key(KeyCode::Enter)]), Action::Continue);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "body");
        assert!(!e.session().is_modified());
    }

    #[test]
    fn save_as_existing_file_confirms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.md");
        std::fs::write(&path, "old").unwrap();
        let mut e = editor_with("");
        feed(&mut e, &typed("new"));
        feed(&mut e, &[ctrl('s')]);
        feed(&mut e, &typed(&path.to_string_lossy()));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert!(matches!(
            e.prompt,
            Some(Prompt::Line { kind: PromptKind::ConfirmOverwrite { .. }, .. })
        ));
        feed(&mut e, &[press('n'), key(KeyCode::Enter)]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");

        feed(&mut e, &[ctrl('s')]);
        feed(&mut e, &typed(&path.to_string_lossy()));
        feed(&mut e, &[key(KeyCode::Enter), press('y'), key(KeyCode::Enter)]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn failed_save_shows_error_until_next_key() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let mut e = editor_with("");
        feed(&mut e, &typed("x"));
        feed(&mut e, &[ctrl('s')]);
        feed(&mut e, &typed(&blocker.join("a.md").to_string_lossy()));
        feed(&mut e, &[key(KeyCode::Enter)]);
        assert!(e.message.as_deref().is_some_and(|m| m.starts_with("Error: ")));
        assert!(e.session().is_modified());

        let mut frame = FrameBuffer::new(80, 24);
        e.paint(&mut frame);
        assert_eq!(frame.get(0, 23).unwrap().character(), Some('E'));

        feed(&mut e, &[key(KeyCode::Left)]);
        assert!(e.message.is_none());
    }

    #[test]
    fn chunk_switch_asks_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let text: String = (1..=15).map(|i| format!("{i}\n")).collect();
        std::fs::write(&path, text).unwrap();
        let session = Session::open(&path, EditorConfig::new().with_chunk_lines(10)).unwrap();
        let mut e = Editor::new(session);
        e.on_resize(Size { cols: 80, rows: 24 });

        feed(&mut e, &[press('#'), ctrl('t')]);
        assert!(e.prompt.is_some());
        feed(&mut e, &[press('y'), key(KeyCode::Enter)]);
        assert_eq!(e.session().chunks().current(), 1);
        assert_eq!(e.session().document().line(0), "11");

        feed(&mut e, &[ctrl('b')]);
        assert_eq!(e.session().document().line(0), "#1");
    }

    // ── Mouse and paint ───────────────────────────────────────────────────

    #[test]
    fn click_and_wheel() {
        let text: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let mut e = editor_with(&text.join("\n"));
        e.on_event(&Event::Mouse(MouseEvent {
            kind: MouseEventKind::Press(MouseButton::Left),
            x: 3,
            y: 2,
            modifiers: Modifiers::empty(),
        }));
        assert_eq!(cursor(&e), (2, 3));

        e.on_event(&Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            x: 0,
            y: 0,
            modifiers: Modifiers::empty(),
        }));
        assert!(e.on_tick());
        assert!(e.session().viewport().offset_y() > 0);
    }

    #[test]
    fn paint_shows_prompt_and_moves_cursor_there() {
        let mut e = editor_with("abc");
        feed(&mut e, &[ctrl('f'), press('b')]);
        let mut frame = FrameBuffer::new(40, 5);
        e.on_resize(Size { cols: 40, rows: 5 });
        e.paint(&mut frame);
        assert_eq!(e.cursor(), Some((9, 4)));
    }
}
