//! Streaming SGR decoder for child-process output.
//!
//! Understands the minimal color subset a line-oriented transcript needs:
//! reset (`0` or an empty parameter list), foreground `30`-`37` and default
//! foreground `39`. Every other well-formed CSI sequence is stripped, as are
//! OSC strings (window titles) and two-byte escapes. Malformed sequences
//! never fail: the escape byte is dropped and the rest is kept as literal
//! text.
//!
//! Output arrives in arbitrary chunks, so a sequence cut off at the end of a
//! chunk is held back and completed by the next call to
//! [`AnsiDecoder::feed`].

// Scanner has one arm per escape family
#![allow(clippy::match_same_arms)]

use crate::color::Rgba;

const ESC: char = '\x1b';
const BEL: u8 = 0x07;

/// Longest incomplete sequence held back between chunks. Anything longer is
/// treated as malformed.
const MAX_PENDING: usize = 64;

/// A run of text sharing one foreground color.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub text: String,
    /// `None` means the transcript's default output color.
    pub fg: Option<Rgba>,
}

/// Result of scanning one escape sequence at the start of the input.
enum Scan {
    /// Sequence complete: bytes consumed and the SGR parameters, if it was
    /// an SGR sequence.
    Complete(usize, Option<Vec<u16>>),
    /// Input ends inside the sequence.
    Incomplete,
    /// Not a valid sequence; drop the ESC byte and continue.
    Malformed,
}

/// Stateful decoder; the current color persists across chunks.
#[derive(Clone, Debug, Default)]
pub struct AnsiDecoder {
    fg: Option<Rgba>,
    pending: String,
}

impl AnsiDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current foreground, `None` after a reset.
    #[must_use]
    pub const fn current_fg(&self) -> Option<Rgba> {
        self.fg
    }

    /// Forget the current color and any held-back partial sequence.
    pub fn reset(&mut self) {
        self.fg = None;
        self.pending.clear();
    }

    /// Decode a chunk of text. Carriage returns are dropped.
    pub fn feed(&mut self, chunk: &str) -> Vec<Segment> {
        let mut input = std::mem::take(&mut self.pending);
        input.push_str(chunk);

        let mut out = SegmentBuilder::default();
        let mut rest = input.as_str();
        while let Some(esc) = rest.find(ESC) {
            out.push_text(&rest[..esc], self.fg);
            let seq = &rest[esc..];
            match scan(seq) {
                Scan::Complete(len, params) => {
                    if let Some(params) = params {
                        self.apply_sgr(&params);
                    }
                    rest = &seq[len..];
                }
                Scan::Incomplete if seq.len() <= MAX_PENDING => {
                    self.pending.push_str(seq);
                    rest = "";
                }
                Scan::Incomplete | Scan::Malformed => {
                    rest = &seq[ESC.len_utf8()..];
                }
            }
        }
        out.push_text(rest, self.fg);
        out.finish()
    }

    /// Emit any held-back partial sequence as literal text (without its
    /// escape byte). Call when the stream ends.
    pub fn flush(&mut self) -> Vec<Segment> {
        let pending = std::mem::take(&mut self.pending);
        let mut out = SegmentBuilder::default();
        out.push_text(pending.trim_start_matches(ESC), self.fg);
        out.finish()
    }

    fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            self.fg = None;
        }
        for &code in params {
            match code {
                0 | 39 => self.fg = None,
                30..=37 => self.fg = Some(Rgba::from_ansi_index((code - 30) as u8)),
                _ => {}
            }
        }
    }
}

/// Scan an escape sequence; `seq` starts with ESC.
fn scan(seq: &str) -> Scan {
    let bytes = seq.as_bytes();
    let Some(&kind) = bytes.get(1) else {
        return Scan::Incomplete;
    };

    match kind {
        b'[' => scan_csi(bytes),
        b']' => scan_osc(bytes),
        // ESC <intermediate> <final>, e.g. charset selection `ESC ( B`
        0x20..=0x2f => match bytes.get(2) {
            None => Scan::Incomplete,
            Some(0x30..=0x7e) => Scan::Complete(3, None),
            Some(_) => Scan::Malformed,
        },
        // Two-byte escapes (`ESC =`, `ESC M`, ...)
        0x30..=0x7e => Scan::Complete(2, None),
        _ => Scan::Malformed,
    }
}

/// CSI: ESC [ params (0x30-0x3f) intermediates (0x20-0x2f) final (0x40-0x7e).
fn scan_csi(bytes: &[u8]) -> Scan {
    let mut end = 2;
    while end < bytes.len() && (0x30..=0x3f).contains(&bytes[end]) {
        end += 1;
    }
    let params_end = end;
    while end < bytes.len() && (0x20..=0x2f).contains(&bytes[end]) {
        end += 1;
    }
    let Some(&final_byte) = bytes.get(end) else {
        return Scan::Incomplete;
    };
    if !(0x40..=0x7e).contains(&final_byte) {
        return Scan::Malformed;
    }

    let len = end + 1;
    if final_byte != b'm' || params_end != end {
        return Scan::Complete(len, None);
    }
    match parse_params(&bytes[2..params_end]) {
        Some(params) => Scan::Complete(len, Some(params)),
        // Private or sub-parameter forms (`ESC [ ? ... m`) are stripped.
        None => Scan::Complete(len, None),
    }
}

/// OSC: ESC ] ... terminated by BEL or ESC \.
fn scan_osc(bytes: &[u8]) -> Scan {
    let mut idx = 2;
    while idx < bytes.len() {
        match bytes[idx] {
            BEL => return Scan::Complete(idx + 1, None),
            0x1b => {
                return match bytes.get(idx + 1) {
                    None => Scan::Incomplete,
                    Some(b'\\') => Scan::Complete(idx + 2, None),
                    Some(_) => Scan::Malformed,
                };
            }
            _ => idx += 1,
        }
    }
    Scan::Incomplete
}

fn parse_params(raw: &[u8]) -> Option<Vec<u16>> {
    if raw.is_empty() {
        return Some(Vec::new());
    }
    std::str::from_utf8(raw)
        .ok()?
        .split(';')
        .map(|part| {
            if part.is_empty() {
                Some(0)
            } else {
                part.parse().ok()
            }
        })
        .collect()
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn push_text(&mut self, text: &str, fg: Option<Rgba>) {
        let text = text.replace('\r', "");
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.fg == fg => last.text.push_str(&text),
            _ => self.segments.push(Segment { text, fg }),
        }
    }

    fn finish(self) -> Vec<Segment> {
        self.segments
    }
}
