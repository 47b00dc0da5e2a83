//! The streaming ESP to JavaScript state machine.

use std::io;

use crate::lookahead::Lookahead;
use crate::queue::OutputQueue;
use crate::source::CharRead;

/// The statement bound to `out` before the first write, unless overridden
/// with [`EspReader::set_out_init`].
pub const DEFAULT_OUT_INIT: &str = "out=response.writer;";

/// Region of the template the state machine is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Literal text, escaped into `out.write("...")` wrappers per line.
    Template,
    /// `<% ... %>`, copied through verbatim.
    Code,
    /// `<%= ... %>`, wrapped as `out.write( ... );`.
    Expr,
    /// `<%-- ... --%>`, discarded including the delimiters.
    Comment,
    /// `${ ... }` inside a quoted literal, spliced into the surrounding
    /// write.
    CompactExpr,
}

/// Source-level quoting context inside template text.
///
/// `${` opens a compact expression only while the surrounding source text
/// sits inside a single- or double-quoted stretch; a bare `{` never does.
/// The context closes only on the same character that opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteContext {
    None,
    Single,
    Double,
}

/// A pull-based translator from ESP template text to JavaScript source.
///
/// Reading from an `EspReader` yields the translated program one character
/// at a time: literal template text comes back as `out.write("...")` calls,
/// `<% %>` code verbatim, `<%= %>` expressions wrapped in `out.write( );`,
/// and `<%-- --%>` comments not at all. The reader holds only a four
/// character lookahead window and a small queue of pending output, so
/// arbitrarily large templates stream through in constant space.
///
/// The reader is single-use: it is created around a source, driven until it
/// reports end of input, and dropped. Dropping it releases the source;
/// [`into_inner`](EspReader::into_inner) hands the source back instead.
pub struct EspReader<R> {
    input: Lookahead<R>,
    queue: OutputQueue,
    state: State,
    quote: QuoteContext,
    /// An `out.write("` for the current template line is open and unclosed.
    line_open: bool,
    out_init: String,
    out_init_done: bool,
}

impl<R: CharRead> EspReader<R> {
    /// Creates a translator around `source`.
    pub fn new(source: R) -> Self {
        Self {
            input: Lookahead::new(source),
            queue: OutputQueue::new(),
            state: State::Template,
            quote: QuoteContext::None,
            line_open: false,
            out_init: DEFAULT_OUT_INIT.to_string(),
            out_init_done: false,
        }
    }

    /// Overrides the statement that binds `out` before the first write.
    ///
    /// Must be called before reading begins; once the prologue has been
    /// emitted the override is ignored.
    pub fn set_out_init(&mut self, statement: impl Into<String>) {
        if !self.out_init_done {
            self.out_init = statement.into();
        }
    }

    /// Hands back the underlying source.
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// Runs one state-machine step: consumes input and/or enqueues output.
    ///
    /// Returns `false` once the input is exhausted and nothing more will be
    /// produced.
    fn step(&mut self) -> io::Result<bool> {
        match self.state {
            State::Template => self.step_template(),
            State::Code => self.step_code(),
            State::Expr => self.step_expr(),
            State::Comment => self.step_comment(),
            State::CompactExpr => self.step_compact_expr(),
        }
    }

    fn step_template(&mut self) -> io::Result<bool> {
        if self.input.looking_at("<%")? {
            if self.input.looking_at("<%--")? {
                self.input.bump_n(4)?;
                self.close_line_write();
                self.state = State::Comment;
            } else if self.input.peek(2)? == Some('=') {
                self.input.bump_n(3)?;
                self.close_line_write();
                self.start_write("out.write(");
                self.state = State::Expr;
            } else {
                // Anything else after `<%`, including a lone `-`, starts a
                // code block; no wrapper and no prologue.
                self.input.bump_n(2)?;
                self.close_line_write();
                self.state = State::Code;
            }
            return Ok(true);
        }

        if self.quote != QuoteContext::None && self.input.looking_at("${")? {
            self.input.bump_n(2)?;
            // Splice into the surrounding literal: close it, write the
            // expression, and reopen on `}`. The quoting context stays
            // suspended so the literal resumes where it left off.
            self.open_line_write();
            self.queue.push_str("\");out.write(");
            self.state = State::CompactExpr;
            return Ok(true);
        }

        let Some(c) = self.input.bump()? else {
            if self.line_open {
                self.queue.push_str("\");");
                self.line_open = false;
                return Ok(true);
            }
            return Ok(false);
        };

        if c == '\n' {
            // A newline is template text too: it lands in the string as a
            // two-character `\n`, closes the line's write, and is followed
            // by a real newline so the next statement starts on a fresh
            // line.
            self.open_line_write();
            self.queue.push_str("\\n\");");
            self.queue.push('\n');
            self.line_open = false;
        } else {
            self.track_quote(c);
            self.open_line_write();
            self.push_escaped(c);
        }
        Ok(true)
    }

    fn step_code(&mut self) -> io::Result<bool> {
        if self.input.looking_at("%>")? {
            self.input.bump_n(2)?;
            self.state = State::Template;
            return Ok(true);
        }
        match self.input.bump()? {
            Some(c) => {
                self.queue.push(c);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn step_expr(&mut self) -> io::Result<bool> {
        if self.input.looking_at("%>")? {
            self.input.bump_n(2)?;
            self.queue.push_str(");");
            self.state = State::Template;
            return Ok(true);
        }
        match self.input.bump()? {
            Some(c) => {
                self.queue.push(c);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn step_comment(&mut self) -> io::Result<bool> {
        if self.input.looking_at("--%>")? {
            self.input.bump_n(4)?;
            self.state = State::Template;
            return Ok(true);
        }
        Ok(self.input.bump()?.is_some())
    }

    fn step_compact_expr(&mut self) -> io::Result<bool> {
        match self.input.bump()? {
            Some('}') => {
                self.queue.push_str(");out.write(\"");
                // The line-write reopens; the suspended quoting context is
                // still in force for the resumed literal.
                self.state = State::Template;
                Ok(true)
            }
            Some(c) => {
                self.queue.push(c);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enqueues the prologue on the first write, then the wrapper opener.
    fn start_write(&mut self, opener: &str) {
        if !self.out_init_done {
            self.queue.push_str(&self.out_init);
            self.out_init_done = true;
        }
        self.queue.push_str(opener);
    }

    fn open_line_write(&mut self) {
        if !self.line_open {
            self.start_write("out.write(\"");
            self.line_open = true;
        }
    }

    /// Closes an open line-write on entry into `<%`, `<%=` or `<%--`.
    fn close_line_write(&mut self) {
        if self.line_open {
            self.queue.push_str("\");");
            self.line_open = false;
        }
    }

    fn track_quote(&mut self, c: char) {
        self.quote = match (self.quote, c) {
            (QuoteContext::None, '\'') => QuoteContext::Single,
            (QuoteContext::None, '"') => QuoteContext::Double,
            (QuoteContext::Single, '\'') => QuoteContext::None,
            (QuoteContext::Double, '"') => QuoteContext::None,
            (quote, _) => quote,
        };
    }

    /// Enqueues `c` in JavaScript double-quoted-string form.
    fn push_escaped(&mut self, c: char) {
        match c {
            '"' => self.queue.push_str("\\\""),
            '\\' => self.queue.push_str("\\\\"),
            '\n' => self.queue.push_str("\\n"),
            _ => self.queue.push(c),
        }
    }
}

impl<R: CharRead> CharRead for EspReader<R> {
    /// Returns the next translated character, or `None` once the template
    /// is exhausted and all pending output has been drained.
    fn read_char(&mut self) -> io::Result<Option<char>> {
        loop {
            if let Some(c) = self.queue.pop() {
                return Ok(Some(c));
            }
            if !self.step()? {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StringReader;

    fn drain(reader: &mut EspReader<StringReader<'_>>) -> String {
        let mut out = String::new();
        while let Some(c) = reader.read_char().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_escapes_in_template_text() {
        let mut r = EspReader::new(StringReader::new(r#"a"b\c"#));
        assert_eq!(drain(&mut r), r#"out=response.writer;out.write("a\"b\\c");"#);
    }

    #[test]
    fn test_prologue_emitted_once() {
        let mut r = EspReader::new(StringReader::new("a<% x %>b"));
        let out = drain(&mut r);
        assert_eq!(out.matches("out=response.writer;").count(), 1);
    }

    #[test]
    fn test_code_before_text_precedes_prologue() {
        // A leading code block is copied through before any write exists,
        // so the prologue lands in front of the first write, not the code.
        let mut r = EspReader::new(StringReader::new("<%x%>t"));
        assert_eq!(drain(&mut r), "xout=response.writer;out.write(\"t\");");
    }

    #[test]
    fn test_set_out_init_ignored_after_reading() {
        let mut r = EspReader::new(StringReader::new("ab"));
        assert_eq!(r.read_char().unwrap(), Some('o'));
        r.set_out_init("out=ignored();");
        let mut out = String::from("o");
        while let Some(c) = r.read_char().unwrap() {
            out.push(c);
        }
        assert_eq!(out, "out=response.writer;out.write(\"ab\");");
    }

    #[test]
    fn test_double_equals_is_expression() {
        let mut r = EspReader::new(StringReader::new("<%== x %>"));
        assert_eq!(drain(&mut r), "out=response.writer;out.write(= x );");
    }

    #[test]
    fn test_lone_dash_is_code() {
        let mut r = EspReader::new(StringReader::new("<%- x %>"));
        assert_eq!(drain(&mut r), "- x ");
    }

    #[test]
    fn test_unterminated_code_drains_verbatim() {
        let mut r = EspReader::new(StringReader::new("<% x = 1;"));
        assert_eq!(drain(&mut r), " x = 1;");
    }

    #[test]
    fn test_into_inner_returns_source() {
        let r = EspReader::new(StringReader::new("leftover"));
        let mut source = r.into_inner();
        assert_eq!(source.read_char().unwrap(), Some('l'));
    }
}
