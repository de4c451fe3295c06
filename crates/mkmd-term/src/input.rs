// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into keys, mouse actions, and pasted text. It
// understands the protocols `terminal.rs` enables:
//
// - Legacy CSI sequences (arrows, editing keys, F-keys, modifiers)
// - SS3 sequences (F1-F4 and arrows from some terminals)
// - SGR mouse (press / release / drag / wheel in four directions)
// - Bracketed paste
// - Alt+key (ESC followed by a printable byte)
// - UTF-8 multi-byte characters
//
// Escape sequences may be split across reads, so the parser keeps a small
// byte buffer. A lone ESC stays pending until `flush` is called after a
// quiet period, which resolves it into the Escape key.

use bitflags::bitflags;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A decoded input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text delivered between bracketed-paste delimiters.
    Paste(String),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    #[inline]
    #[must_use]
    pub const fn ctrl(self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[inline]
    #[must_use]
    pub const fn shift(self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Key identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A printable character, or the letter of a Ctrl chord.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Modifier keys, in xterm's `1 + bitmask` parameter order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
    }
}

/// A mouse event at a 0-indexed cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: u16,
    pub y: u16,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    Drag(MouseButton),
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

/// Incremental byte-to-event decoder.
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
    in_paste: bool,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every event that is complete.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            let rest = &self.buf[pos..];

            if self.in_paste {
                let Some(end) = find_subsequence(rest, PASTE_END) else {
                    break;
                };
                let text = String::from_utf8_lossy(&rest[..end]).into_owned();
                events.push(Event::Paste(text));
                pos += end + PASTE_END.len();
                self.in_paste = false;
                continue;
            }

            if rest.starts_with(PASTE_START) {
                self.in_paste = true;
                pos += PASTE_START.len();
                continue;
            }
            // A prefix of the paste marker: wait for the rest.
            if rest.len() < PASTE_START.len() && rest.len() > 2 && PASTE_START.starts_with(rest)
            {
                break;
            }

            match parse_one(rest) {
                Parsed::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Parsed::Skip(used) => pos += used,
                Parsed::Incomplete => break,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty() && !self.in_paste
    }

    /// Resolve pending bytes as literal keys. A lone ESC becomes Escape.
    pub fn flush(&mut self) -> Vec<Event> {
        if self.in_paste {
            return Vec::new();
        }
        let events = self
            .buf
            .iter()
            .filter_map(|&b| match b {
                0x1B => Some(key(KeyCode::Escape, Modifiers::empty())),
                0x20..=0x7E => Some(key(KeyCode::Char(char::from(b)), Modifiers::empty())),
                _ => None,
            })
            .collect();
        self.buf.clear();
        events
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    Event(Event, usize),
    Skip(usize),
    Incomplete,
}

const fn key(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

fn parse_one(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(key(KeyCode::Char(' '), Modifiers::CTRL), 1),
        0x09 => Parsed::Event(key(KeyCode::Tab, Modifiers::empty()), 1),
        0x0A | 0x0D => Parsed::Event(key(KeyCode::Enter, Modifiers::empty()), 1),
        0x08 | 0x7F => Parsed::Event(key(KeyCode::Backspace, Modifiers::empty()), 1),
        b @ 0x01..=0x1A => Parsed::Event(
            key(KeyCode::Char(char::from(b - 1 + b'a')), Modifiers::CTRL),
            1,
        ),
        b @ 0x20..=0x7E => Parsed::Event(key(KeyCode::Char(char::from(b)), Modifiers::empty()), 1),
        0xC0..=0xF7 => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&next) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match next {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        b @ 0x20..=0x7E => Parsed::Event(key(KeyCode::Char(char::from(b)), Modifiers::ALT), 2),
        _ => Parsed::Event(key(KeyCode::Escape, Modifiers::empty()), 1),
    }
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(key(code, Modifiers::empty()), 3)
}

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.get(2) == Some(&b'<') {
        return parse_sgr_mouse(buf);
    }

    // Parameter bytes are 0x20..=0x3F; the final byte is 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let params = parse_params(&buf[2..end]);
    let used = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => return Parsed::Event(key(KeyCode::Tab, Modifiers::SHIFT), used),
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            11 => KeyCode::F(1),
            12 => KeyCode::F(2),
            13 => KeyCode::F(3),
            14 => KeyCode::F(4),
            15 => KeyCode::F(5),
            17 => KeyCode::F(6),
            18 => KeyCode::F(7),
            19 => KeyCode::F(8),
            20 => KeyCode::F(9),
            21 => KeyCode::F(10),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return Parsed::Skip(used),
        },
        _ => return Parsed::Skip(used),
    };
    Parsed::Event(key(code, modifiers), used)
}

/// `ESC [ < Cb ; Cx ; Cy (M|m)` — SGR mouse.
fn parse_sgr_mouse(buf: &[u8]) -> Parsed {
    let mut end = 3;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if b == b'M' || b == b'm' {
            break;
        }
        if !b.is_ascii_digit() && b != b';' {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let params = parse_params(&buf[3..end]);
    let [cb, cx, cy] = [0, 1, 2].map(|i| params.get(i).copied().unwrap_or(0));
    let release = buf[end] == b'm';

    let mut modifiers = Modifiers::empty();
    if cb & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if cb & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if cb & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let button = match cb & 3 {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        _ => MouseButton::Right,
    };
    let kind = if cb & 64 != 0 {
        match cb & 3 {
            0 => MouseEventKind::ScrollUp,
            1 => MouseEventKind::ScrollDown,
            2 => MouseEventKind::ScrollLeft,
            _ => MouseEventKind::ScrollRight,
        }
    } else if cb & 32 != 0 {
        // Motion with no button held is not enabled; treat as drag.
        MouseEventKind::Drag(button)
    } else if release {
        MouseEventKind::Release(button)
    } else {
        MouseEventKind::Press(button)
    };

    Parsed::Event(
        Event::Mouse(MouseEvent {
            kind,
            x: cx.saturating_sub(1),
            y: cy.saturating_sub(1),
            modifiers,
        }),
        end + 1,
    )
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Event(key(KeyCode::Char(ch), Modifiers::empty()), len)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated decimal parameters. Sub-parameters after `:` are
/// ignored; empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm modifier parameter: `1 + bitmask`.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1) as u8)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
