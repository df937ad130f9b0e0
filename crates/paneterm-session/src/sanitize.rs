//! Escape-sequence sanitization for the display surface.
//!
//! Interactive CLI tools probe for terminal capabilities the surface does
//! not implement. The sequences below corrupt its parser or, worse, start
//! feedback loops (focus reporting echoes every host layout change back
//! into the child), so they are stripped before delivery:
//!
//! - kitty keyboard protocol (CSI `>`/`<`/`=`/`?` ... `u`)
//! - synchronized output toggles (CSI `?2026h` / `?2026l`)
//! - focus reporting toggles (CSI `?1004h` / `?1004l`)
//! - bracketed paste toggles (CSI `?2004h` / `?2004l`)
//! - OSC `9;4` progress reports
//!
//! Everything else, including other escape sequences, passes through in
//! original order. Sanitization is stateless per chunk: a sequence split
//! across two delivered chunks is not reassembled (the host delivers whole
//! sequences in practice), and an unterminated trailing sequence passes
//! through untouched.

use std::borrow::Cow;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// DEC private modes whose set/reset toggles the surface cannot handle.
const STRIPPED_PRIVATE_MODES: &[&[u8]] = &[b"2026", b"1004", b"2004"];

/// Remove unsupported control sequences from one output chunk.
///
/// Returns `Cow::Borrowed` when the chunk needed no changes. Applying the
/// sanitizer to its own output yields the same bytes again.
pub fn sanitize_chunk(input: &[u8]) -> Cow<'_, [u8]> {
    let mut out: Option<Vec<u8>> = None;
    let mut i = 0;

    while i < input.len() {
        if input[i] == ESC {
            if let Some(seq) = classify(&input[i..]) {
                if seq.strip {
                    // First removal: materialize the clean prefix.
                    if out.is_none() {
                        out = Some(input[..i].to_vec());
                    }
                } else if let Some(buf) = out.as_mut() {
                    buf.extend_from_slice(&input[i..i + seq.len]);
                }
                i += seq.len;
                continue;
            }
        }

        if let Some(buf) = out.as_mut() {
            buf.push(input[i]);
        }
        i += 1;
    }

    match out {
        Some(buf) => Cow::Owned(buf),
        None => Cow::Borrowed(input),
    }
}

struct Classified {
    /// Total scanned length, starting at the ESC byte.
    len: usize,
    strip: bool,
}

/// Classify a complete escape sequence at the start of `bytes`.
///
/// Returns `None` for anything that is not a complete CSI or OSC `9;4`
/// sequence; those bytes fall through the scanner unchanged.
fn classify(bytes: &[u8]) -> Option<Classified> {
    match bytes.get(1)? {
        b'[' => classify_csi(bytes),
        b']' => classify_progress_osc(bytes),
        _ => None,
    }
}

/// Scan `ESC [ <marker?> <params> <final>`.
fn classify_csi(bytes: &[u8]) -> Option<Classified> {
    let mut i = 2;

    let marker = match bytes.get(i)? {
        m @ (b'<' | b'>' | b'=' | b'?') => {
            i += 1;
            Some(*m)
        }
        _ => None,
    };

    let params_start = i;
    while matches!(bytes.get(i)?, b'0'..=b'9' | b';' | b':') {
        i += 1;
    }
    let params = &bytes[params_start..i];

    let final_byte = *bytes.get(i)?;
    if !(0x40..=0x7e).contains(&final_byte) {
        return None;
    }

    let strip = match (marker, final_byte) {
        // Keyboard-protocol negotiation: push/pop/set/query all end in `u`.
        (Some(_), b'u') => true,
        // DEC private mode toggles for the modes the surface lacks. Only an
        // exact single-parameter match: a combined set like `?25;2004h`
        // also carries modes that must survive, so it passes through.
        (Some(b'?'), b'h' | b'l') => STRIPPED_PRIVATE_MODES.contains(&params),
        _ => false,
    };

    Some(Classified { len: i + 1, strip })
}

/// Scan an OSC `9;4` progress report, terminated by BEL or ST (`ESC \`).
fn classify_progress_osc(bytes: &[u8]) -> Option<Classified> {
    let payload = &bytes[2..];
    if !payload.starts_with(b"9;4") {
        return None;
    }

    let mut i = 2;
    while i < bytes.len() {
        match bytes[i] {
            BEL => {
                return Some(Classified {
                    len: i + 1,
                    strip: true,
                })
            }
            ESC if bytes.get(i + 1) == Some(&b'\\') => {
                return Some(Classified {
                    len: i + 2,
                    strip: true,
                })
            }
            _ => i += 1,
        }
    }

    // Unterminated within this chunk.
    None
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitized(input: &[u8]) -> Vec<u8> {
        sanitize_chunk(input).into_owned()
    }

    #[test]
    fn strips_keyboard_protocol_sequences() {
        assert_eq!(sanitized(b"a\x1b[>1ub"), b"ab");
        assert_eq!(sanitized(b"a\x1b[<ub"), b"ab");
        assert_eq!(sanitized(b"a\x1b[?ub"), b"ab");
        assert_eq!(sanitized(b"a\x1b[=5;1ub"), b"ab");
        // Same marker, different final byte: not keyboard-protocol, kept.
        assert_eq!(sanitized(b"a\x1b[>4;2mb"), b"a\x1b[>4;2mb");
    }

    #[test]
    fn strips_synchronized_output_toggles() {
        assert_eq!(sanitized(b"pre\x1b[?2026hmid\x1b[?2026lpost"), b"premidpost");
    }

    #[test]
    fn strips_focus_reporting_toggles() {
        assert_eq!(sanitized(b"\x1b[?1004h"), b"");
        assert_eq!(sanitized(b"\x1b[?1004l"), b"");
    }

    #[test]
    fn strips_bracketed_paste_toggles() {
        assert_eq!(sanitized(b"x\x1b[?2004hy\x1b[?2004lz"), b"xyz");
    }

    #[test]
    fn strips_progress_reports_with_both_terminators() {
        assert_eq!(sanitized(b"a\x1b]9;4;1;50\x07b"), b"ab");
        assert_eq!(sanitized(b"a\x1b]9;4;0;0\x1b\\b"), b"ab");
    }

    #[test]
    fn preserves_ordinary_escape_sequences() {
        let input: &[u8] = b"\x1b[31mred\x1b[0m \x1b[2J\x1b[H\x1b[?25l";
        assert_eq!(sanitize_chunk(input), Cow::Borrowed(input));
    }

    #[test]
    fn preserves_osc_title_sequences() {
        let input: &[u8] = b"\x1b]0;my title\x07rest";
        assert_eq!(sanitize_chunk(input), Cow::Borrowed(input));
    }

    #[test]
    fn preserves_combined_private_mode_sets() {
        // `?25` (cursor visibility) must survive, so the combined form is
        // left alone even though it mentions a stripped mode.
        let input: &[u8] = b"\x1b[?25;2004h";
        assert_eq!(sanitize_chunk(input), Cow::Borrowed(input));
    }

    #[test]
    fn clean_chunks_borrow_instead_of_copying() {
        let input: &[u8] = b"plain text with unicode \xc3\xa9 and\r\nnewlines";
        assert!(matches!(sanitize_chunk(input), Cow::Borrowed(_)));
    }

    #[test]
    fn surrounding_bytes_survive_in_order() {
        let input = b"start\x1b[?2004h\x1b[1;32mgreen\x1b[0m\x1b[?1004lend";
        assert_eq!(sanitized(input), b"start\x1b[1;32mgreen\x1b[0mend");
    }

    #[test]
    fn unterminated_trailing_sequence_passes_through() {
        let input: &[u8] = b"text\x1b[?20";
        assert_eq!(sanitize_chunk(input), Cow::Borrowed(input));

        let input: &[u8] = b"text\x1b]9;4;1;50";
        assert_eq!(sanitize_chunk(input), Cow::Borrowed(input));
    }

    #[test]
    fn lone_escape_passes_through() {
        let input: &[u8] = b"x\x1b";
        assert_eq!(sanitize_chunk(input), Cow::Borrowed(input));
    }

    #[test]
    fn whole_chunk_can_sanitize_to_empty() {
        assert_eq!(sanitized(b"\x1b[?2004h\x1b[?1004h\x1b[>1u"), b"");
    }

    #[test]
    fn sanitizing_twice_equals_sanitizing_once() {
        let inputs: &[&[u8]] = &[
            b"plain",
            b"a\x1b[>1ub\x1b[?2026hc",
            b"\x1b]9;4;1;50\x07\x1b[31mred\x1b[0m",
            b"text\x1b[?20",
            b"\x1b[?2004h\x1b[?2004l",
        ];
        for input in inputs {
            let once = sanitized(input);
            let twice = sanitized(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}
