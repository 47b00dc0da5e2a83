//! Streaming ESP (ECMA Server Page) to JavaScript translation.
//!
//! An ESP template interleaves literal text with JavaScript fragments:
//! `<% code %>` blocks, `<%= expression %>` inserts, `<%-- comment --%>`
//! comments, and `${expression}` compact inserts inside quoted text. This
//! crate translates such a template into a plain JavaScript program that
//! writes the literal text through `out.write(...)` and runs the embedded
//! fragments in document order.
//!
//! The translator is a single-pass, pull-based character state machine:
//! [`EspReader`] wraps any [`CharRead`] source and is itself one, producing
//! the translated program one character at a time with four characters of
//! lookahead and no whole-template buffering.
//!
//! # Example
//!
//! ```
//! use esp_reader::{translate, StringReader};
//!
//! let js = translate(StringReader::new("<em><%= title %></em>")).unwrap();
//! assert_eq!(
//!     js,
//!     "out=response.writer;out.write(\"<em>\");out.write( title );out.write(\"</em>\");"
//! );
//! ```

mod lookahead;
mod queue;
mod reader;
mod source;

pub use reader::{EspReader, DEFAULT_OUT_INIT};
pub use source::{CharRead, StringReader};

use std::io;

/// Options for translating a template.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Overrides the statement that binds `out` before the first write.
    ///
    /// Defaults to [`DEFAULT_OUT_INIT`].
    pub out_init: Option<String>,
}

/// Translates a whole ESP template into JavaScript source.
///
/// Convenience wrapper that drives an [`EspReader`] to end of input and
/// collects the output. Errors are the underlying source's I/O errors,
/// propagated unchanged.
pub fn translate<R: CharRead>(source: R) -> io::Result<String> {
    translate_with_options(source, TranslateOptions::default())
}

/// Translates a whole ESP template with custom options.
pub fn translate_with_options<R: CharRead>(
    source: R,
    options: TranslateOptions,
) -> io::Result<String> {
    let mut reader = EspReader::new(source);
    if let Some(out_init) = options.out_init {
        reader.set_out_init(out_init);
    }
    let mut output = String::new();
    while let Some(c) = reader.read_char()? {
        output.push(c);
    }
    Ok(output)
}
