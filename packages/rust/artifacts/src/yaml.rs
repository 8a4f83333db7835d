//! Block-style YAML writer for string trees.
//!
//! Output is meant for YAML 1.1 loaders as well as 1.2 ones. A string is
//! written plain only when no YAML 1.1 implicit resolver (bool, int, float,
//! null, timestamp, merge, value) would read it as something else; otherwise
//! it is single-quoted, or double-quoted when it holds characters that need
//! escapes. Indentation is two spaces, sequences under a mapping key are not
//! indented, and plain or quoted scalars fold at 80 columns.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

const BEST_INDENT: usize = 2;
const BEST_WIDTH: usize = 80;
/// Keys this long (in chars) or longer are written as explicit `? key` entries.
const MAX_SIMPLE_KEY_CHARS: usize = 128;

// ---------------------------------------------------------------------------
// YAML 1.1 implicit resolvers
// ---------------------------------------------------------------------------

static BOOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$")
        .expect("valid regex")
});

static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[-+]?[0-9][0-9_]*\.[0-9_]*(?:[eE][-+][0-9]+)?",
        r"|\.[0-9][0-9_]*(?:[eE][-+][0-9]+)?",
        r"|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*",
        r"|[-+]?\.(?:inf|Inf|INF)",
        r"|\.(?:nan|NaN|NAN))$",
    ))
    .expect("valid regex")
});

static INT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[-+]?0b[0-1_]+",
        r"|[-+]?0[0-7_]+",
        r"|[-+]?(?:0|[1-9][0-9_]*)",
        r"|[-+]?0x[0-9a-fA-F_]+",
        r"|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
    ))
    .expect("valid regex")
});

static NULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:~|null|Null|NULL|)$").expect("valid regex"));

static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}",
        r"|[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
        r"(?:[Tt]|[ \t]+)[0-9]{1,2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]*)?",
        r"(?:[ \t]*(?:Z|[-+][0-9]{1,2}(?::[0-9]{2})?))?)$",
    ))
    .expect("valid regex")
});

/// Whether a YAML 1.1 loader reads `text`, written plain, as a string.
pub(crate) fn resolves_as_string(text: &str) -> bool {
    if text == "<<" || text == "=" {
        return false;
    }
    ![&*BOOL_RE, &*FLOAT_RE, &*INT_RE, &*NULL_RE, &*TIMESTAMP_RE]
        .iter()
        .any(|re| re.is_match(text))
}

// ---------------------------------------------------------------------------
// Scalar analysis
// ---------------------------------------------------------------------------

fn is_break(ch: char) -> bool {
    matches!(ch, '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn is_blank_or_break(ch: char) -> bool {
    matches!(ch, '\0' | ' ' | '\t' | '\r') || is_break(ch)
}

/// Printable without escapes when Unicode output is allowed.
fn is_printable(ch: char) -> bool {
    matches!(ch, '\n' | ' '..='~' | '\u{85}' | '\u{A0}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
        || ('\u{10000}'..'\u{10FFFF}').contains(&ch)
}

#[derive(Debug, Clone, Copy)]
struct ScalarAnalysis {
    empty: bool,
    multiline: bool,
    allow_block_plain: bool,
    allow_single_quoted: bool,
}

impl ScalarAnalysis {
    fn of(chars: &[char]) -> Self {
        if chars.is_empty() {
            return Self {
                empty: true,
                multiline: false,
                allow_block_plain: true,
                allow_single_quoted: true,
            };
        }

        let mut block_indicators =
            chars.starts_with(&['-', '-', '-']) || chars.starts_with(&['.', '.', '.']);
        let mut line_breaks = false;
        let mut special_characters = false;

        let mut leading_space = false;
        let mut leading_break = false;
        let mut trailing_space = false;
        let mut trailing_break = false;
        let mut break_space = false;
        let mut space_break = false;

        let mut preceded_by_whitespace = true;
        let mut previous_space = false;
        let mut previous_break = false;
        let last = chars.len() - 1;

        for (index, &ch) in chars.iter().enumerate() {
            let followed_by_whitespace = chars.get(index + 1).is_none_or(|&c| is_blank_or_break(c));

            if index == 0 {
                if "#,[]{}&*!|>'\"%@`".contains(ch) {
                    block_indicators = true;
                }
                if (ch == '?' || ch == ':' || ch == '-') && followed_by_whitespace {
                    block_indicators = true;
                }
            } else {
                if ch == ':' && followed_by_whitespace {
                    block_indicators = true;
                }
                if ch == '#' && preceded_by_whitespace {
                    block_indicators = true;
                }
            }

            if is_break(ch) {
                line_breaks = true;
            }
            if !is_printable(ch) || ch == '\u{FEFF}' {
                special_characters = true;
            }

            if ch == ' ' {
                leading_space |= index == 0;
                trailing_space |= index == last;
                break_space |= previous_break;
                previous_space = true;
                previous_break = false;
            } else if is_break(ch) {
                leading_break |= index == 0;
                trailing_break |= index == last;
                space_break |= previous_space;
                previous_space = false;
                previous_break = true;
            } else {
                previous_space = false;
                previous_break = false;
            }

            preceded_by_whitespace = is_blank_or_break(ch);
        }

        let edge_whitespace = leading_space || leading_break || trailing_space || trailing_break;
        let allow_single_quoted = !(break_space || space_break || special_characters);

        Self {
            empty: false,
            multiline: line_breaks,
            allow_block_plain: allow_single_quoted && !edge_whitespace && !line_breaks && !block_indicators,
            allow_single_quoted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

fn choose_style(text: &str, analysis: &ScalarAnalysis, simple_key: bool) -> Style {
    if resolves_as_string(text)
        && !(simple_key && (analysis.empty || analysis.multiline))
        && analysis.allow_block_plain
    {
        Style::Plain
    } else if analysis.allow_single_quoted && !(simple_key && analysis.multiline) {
        Style::SingleQuoted
    } else {
        Style::DoubleQuoted
    }
}

fn escape(ch: char) -> String {
    let short = match ch {
        '\0' => '0',
        '\u{07}' => 'a',
        '\u{08}' => 'b',
        '\t' => 't',
        '\n' => 'n',
        '\u{0B}' => 'v',
        '\u{0C}' => 'f',
        '\r' => 'r',
        '\u{1B}' => 'e',
        '"' => '"',
        '\\' => '\\',
        '\u{85}' => 'N',
        '\u{A0}' => '_',
        '\u{2028}' => 'L',
        '\u{2029}' => 'P',
        _ => {
            let code = u32::from(ch);
            return match code {
                0..=0xFF => format!("\\x{code:02X}"),
                0x100..=0xFFFF => format!("\\u{code:04X}"),
                _ => format!("\\U{code:08X}"),
            };
        }
    };
    format!("\\{short}")
}

fn needs_escape(ch: char) -> bool {
    matches!(ch, '"' | '\\' | '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{FEFF}')
        || !matches!(ch, ' '..='~' | '\u{A0}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Where a node sits, as far as layout is concerned.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Context {
    /// Value of a block mapping entry.
    mapping: bool,
    /// Written as an implicit `key:`.
    simple_key: bool,
}

/// A value the writer can lay out.
pub(crate) trait Node {
    fn emit(&self, emitter: &mut Emitter, ctx: Context);
}

impl Node for String {
    fn emit(&self, emitter: &mut Emitter, ctx: Context) {
        emitter.scalar(self, ctx);
    }
}

impl<T: Node> Node for Vec<T> {
    fn emit(&self, emitter: &mut Emitter, ctx: Context) {
        emitter.sequence(self, ctx);
    }
}

impl<V: Node> Node for BTreeMap<String, V> {
    fn emit(&self, emitter: &mut Emitter, _ctx: Context) {
        emitter.mapping(self);
    }
}

/// Render one YAML document with `root` as its top node.
pub(crate) fn to_string<N: Node>(root: &N) -> String {
    let mut emitter = Emitter::default();
    root.emit(&mut emitter, Context::default());
    // Document end.
    emitter.write_indent();
    emitter.out
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

pub(crate) struct Emitter {
    out: String,
    indent: Option<usize>,
    indents: Vec<Option<usize>>,
    /// Current column, in chars.
    column: usize,
    /// Last written char was whitespace.
    whitespace: bool,
    /// Only indentation and indicators written on this line so far.
    indention: bool,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            out: String::new(),
            indent: None,
            indents: Vec::new(),
            column: 0,
            whitespace: true,
            indention: true,
        }
    }
}

impl Emitter {
    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        self.indent = match self.indent {
            None if flow => Some(BEST_INDENT),
            None => Some(0),
            Some(indent) if indentless => Some(indent),
            Some(indent) => Some(indent + BEST_INDENT),
        };
    }

    fn pop_indent(&mut self) {
        self.indent = self.indents.pop().flatten();
    }

    fn mapping<V: Node>(&mut self, map: &BTreeMap<String, V>) {
        if map.is_empty() {
            self.write_indicator("{", true, true, false);
            self.write_indicator("}", false, false, false);
            return;
        }

        self.increase_indent(false, false);
        let value_ctx = Context {
            mapping: true,
            simple_key: false,
        };
        for (key, value) in map {
            self.write_indent();
            if is_simple_key(key) {
                self.scalar(
                    key,
                    Context {
                        mapping: true,
                        simple_key: true,
                    },
                );
                self.write_indicator(":", false, false, false);
            } else {
                self.write_indicator("?", true, false, true);
                self.scalar(key, value_ctx);
                self.write_indent();
                self.write_indicator(":", true, false, true);
            }
            value.emit(self, value_ctx);
        }
        self.pop_indent();
    }

    fn sequence<T: Node>(&mut self, items: &[T], ctx: Context) {
        if items.is_empty() {
            self.write_indicator("[", true, true, false);
            self.write_indicator("]", false, false, false);
            return;
        }

        let indentless = ctx.mapping && !self.indention;
        self.increase_indent(false, indentless);
        for item in items {
            self.write_indent();
            self.write_indicator("-", true, false, true);
            item.emit(self, Context::default());
        }
        self.pop_indent();
    }

    fn scalar(&mut self, text: &str, ctx: Context) {
        self.increase_indent(true, false);
        let chars: Vec<char> = text.chars().collect();
        let analysis = ScalarAnalysis::of(&chars);
        let split = !ctx.simple_key;
        match choose_style(text, &analysis, ctx.simple_key) {
            Style::Plain => self.write_plain(&chars, split),
            Style::SingleQuoted => self.write_single_quoted(&chars, split),
            Style::DoubleQuoted => self.write_double_quoted(&chars, split),
        }
        self.pop_indent();
    }

    // --- Low-level writes ---

    fn write_raw(&mut self, data: &str) {
        self.column += data.chars().count();
        self.out.push_str(data);
    }

    fn write_chars(&mut self, chars: &[char]) {
        self.column += chars.len();
        self.out.extend(chars);
    }

    fn write_indicator(&mut self, indicator: &str, need_whitespace: bool, whitespace: bool, indention: bool) {
        if !self.whitespace && need_whitespace {
            self.write_raw(" ");
        }
        self.write_raw(indicator);
        self.whitespace = whitespace;
        self.indention = self.indention && indention;
    }

    fn write_indent(&mut self) {
        let indent = self.indent.unwrap_or(0);
        if !self.indention || self.column > indent || (self.column == indent && !self.whitespace) {
            self.write_line_break('\n');
        }
        if self.column < indent {
            self.whitespace = true;
            let pad = indent - self.column;
            self.out.extend(std::iter::repeat_n(' ', pad));
            self.column = indent;
        }
    }

    fn write_line_break(&mut self, br: char) {
        self.out.push(br);
        self.whitespace = true;
        self.indention = true;
        self.column = 0;
    }

    fn write_breaks(&mut self, breaks: &[char]) {
        if breaks.first() == Some(&'\n') {
            self.write_line_break('\n');
        }
        for &br in breaks {
            self.write_line_break(br);
        }
        self.write_indent();
    }

    // --- Scalar styles ---

    fn write_plain(&mut self, chars: &[char], split: bool) {
        if chars.is_empty() {
            return;
        }
        if !self.whitespace {
            self.write_raw(" ");
        }
        self.whitespace = false;
        self.indention = false;

        let (mut spaces, mut breaks) = (false, false);
        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if spaces {
                if ch != Some(' ') {
                    if start + 1 == end && self.column > BEST_WIDTH && split {
                        self.write_indent();
                        self.whitespace = false;
                        self.indention = false;
                    } else {
                        self.write_chars(&chars[start..end]);
                    }
                    start = end;
                }
            } else if breaks {
                if !ch.is_some_and(is_break) {
                    self.write_breaks(&chars[start..end]);
                    self.whitespace = false;
                    self.indention = false;
                    start = end;
                }
            } else if ch.is_none_or(|c| c == ' ' || is_break(c)) {
                self.write_chars(&chars[start..end]);
                start = end;
            }
            if let Some(c) = ch {
                spaces = c == ' ';
                breaks = is_break(c);
            }
        }
    }

    fn write_single_quoted(&mut self, chars: &[char], split: bool) {
        self.write_indicator("'", true, false, false);

        let (mut spaces, mut breaks) = (false, false);
        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if spaces {
                if ch != Some(' ') {
                    if start + 1 == end
                        && self.column > BEST_WIDTH
                        && split
                        && start != 0
                        && end != chars.len()
                    {
                        self.write_indent();
                    } else {
                        self.write_chars(&chars[start..end]);
                    }
                    start = end;
                }
            } else if breaks {
                if !ch.is_some_and(is_break) {
                    self.write_breaks(&chars[start..end]);
                    start = end;
                }
            } else if ch.is_none_or(|c| c == ' ' || c == '\'' || is_break(c)) && start < end {
                self.write_chars(&chars[start..end]);
                start = end;
            }
            if ch == Some('\'') {
                self.write_raw("''");
                start = end + 1;
            }
            if let Some(c) = ch {
                spaces = c == ' ';
                breaks = is_break(c);
            }
        }

        self.write_indicator("'", false, false, false);
    }

    fn write_double_quoted(&mut self, chars: &[char], split: bool) {
        self.write_indicator("\"", true, false, false);

        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if ch.is_none_or(needs_escape) {
                if start < end {
                    self.write_chars(&chars[start..end]);
                    start = end;
                }
                if let Some(c) = ch {
                    self.write_raw(&escape(c));
                    start = end + 1;
                }
            }
            // `start` may sit one past `end` right after an escape.
            if 0 < end
                && end + 1 < chars.len()
                && (ch == Some(' ') || start >= end)
                && self.column + end > BEST_WIDTH + start
                && split
            {
                if start < end {
                    self.write_chars(&chars[start..end]);
                    start = end;
                }
                self.write_raw("\\");
                self.write_indent();
                self.whitespace = false;
                self.indention = false;
                if chars[start] == ' ' {
                    self.write_raw("\\");
                }
            }
        }

        self.write_indicator("\"", false, false, false);
    }
}

fn is_simple_key(key: &str) -> bool {
    let chars: Vec<char> = key.chars().collect();
    let analysis = ScalarAnalysis::of(&chars);
    chars.len() < MAX_SIMPLE_KEY_CHARS && !analysis.empty && !analysis.multiline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn yaml11_scalars_do_not_resolve_as_strings() {
        for text in [
            "yes", "No", "on", "OFF", "null", "~", "", "2024-01-01", "2001-12-14t21:59:43.10-05:00",
            "1:30", "0x1F", "1_000", "0b101", "017", ".5", "1.", "-.inf", ".NaN", "190:20:30.15", "<<", "=",
        ] {
            assert!(!resolves_as_string(text), "{text:?}");
        }
        for text in ["y", "n", "Plain", "nul", "1a", "2024-1-1", "x: y", "0x", "C#", "1.2.3", "--"] {
            assert!(resolves_as_string(text), "{text:?}");
        }
    }

    #[test]
    fn styles_follow_content() {
        let style = |text: &str| {
            let chars: Vec<char> = text.chars().collect();
            choose_style(text, &ScalarAnalysis::of(&chars), false)
        };
        assert_eq!(style("Linear Regression"), Style::Plain);
        assert_eq!(style("café"), Style::Plain);
        assert_eq!(style("-x"), Style::Plain);
        assert_eq!(style("- x"), Style::SingleQuoted);
        assert_eq!(style("a #b"), Style::SingleQuoted);
        assert_eq!(style("a#b"), Style::Plain);
        assert_eq!(style("--- x"), Style::SingleQuoted);
        assert_eq!(style("line one\nline two"), Style::SingleQuoted);
        assert_eq!(style("line one \nline two"), Style::DoubleQuoted);
        assert_eq!(style("a\tb"), Style::DoubleQuoted);
        assert_eq!(style("\u{FEFF}x"), Style::DoubleQuoted);
    }

    #[test]
    fn empty_collections_are_flow_style() {
        let mut tree: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        tree.entry("A".into()).or_default().insert("B".into(), Vec::new());
        tree.insert("D".into(), BTreeMap::new());
        assert_eq!(to_string(&tree), "A:\n  B: []\nD: {}\n");

        let empty: BTreeMap<String, Vec<String>> = BTreeMap::new();
        assert_eq!(to_string(&empty), "{}\n");
    }

    #[test]
    fn top_level_sequence_is_indented_by_dash() {
        assert_eq!(to_string(&seq(&["a", "yes"])), "- a\n- 'yes'\n");
    }

    #[test]
    fn non_bmp_chars_are_escaped_only_inside_double_quotes() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), seq(&["emoji 😀", "tab\t😀"]));
        assert_eq!(to_string(&map), "k:\n- emoji 😀\n- \"tab\\t\\U0001F600\"\n");
    }
}
