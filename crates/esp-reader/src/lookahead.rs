//! Bounded lookahead over a character source.

use std::collections::VecDeque;
use std::io;

use crate::source::CharRead;

/// The longest delimiters (`<%--` and `--%>`) are four characters, so tag
/// recognition never needs to see further ahead than this.
pub(crate) const MAX_LOOKAHEAD: usize = 4;

/// A peek window over a `CharRead`.
///
/// Characters read from the source while peeking are held until consumed, so
/// peeking never loses input. Once the source reports end of input it is not
/// polled again.
pub(crate) struct Lookahead<R> {
    source: R,
    buf: VecDeque<char>,
    eof: bool,
}

impl<R: CharRead> Lookahead<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buf: VecDeque::with_capacity(MAX_LOOKAHEAD),
            eof: false,
        }
    }

    /// Returns the character `n` positions ahead without consuming anything.
    pub fn peek(&mut self, n: usize) -> io::Result<Option<char>> {
        debug_assert!(n < MAX_LOOKAHEAD);
        while self.buf.len() <= n && !self.eof {
            match self.source.read_char()? {
                Some(c) => self.buf.push_back(c),
                None => self.eof = true,
            }
        }
        Ok(self.buf.get(n).copied())
    }

    /// Returns true if the upcoming input starts with `literal`.
    pub fn looking_at(&mut self, literal: &str) -> io::Result<bool> {
        for (n, expected) in literal.chars().enumerate() {
            if self.peek(n)? != Some(expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Consumes and returns the next character.
    pub fn bump(&mut self) -> io::Result<Option<char>> {
        if let Some(c) = self.buf.pop_front() {
            return Ok(Some(c));
        }
        if self.eof {
            return Ok(None);
        }
        match self.source.read_char()? {
            Some(c) => Ok(Some(c)),
            None => {
                self.eof = true;
                Ok(None)
            }
        }
    }

    /// Consumes `n` characters.
    pub fn bump_n(&mut self, n: usize) -> io::Result<()> {
        for _ in 0..n {
            self.bump()?;
        }
        Ok(())
    }

    /// Hands back the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}
