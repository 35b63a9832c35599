//! A low-level, write-only PDF generator.
//!
//! Documents are assembled imperatively from typed PDF values (arrays,
//! dictionaries, strings and content streams) and serialized in one pass
//! to any byte sink, either with a classic cross-reference table or, for
//! version 1.5 and later, with object-stream compaction behind a
//! cross-reference stream.
//!
//! ```
//! use wopdf::{dictionary, Document, Object, SaveOptions, Stream};
//!
//! let mut document = Document::new();
//!
//! let mut draw = Stream::new(dictionary! {}, Vec::new());
//! draw.rectangle(2.0, 2.0, 5.0, 6.0);
//! draw.fill(false);
//! let draw_id = document.add_object(draw);
//!
//! document.add_page(dictionary! {
//!     "Type" => "/Page",
//!     "Parent" => Object::Reference(document.pages_id()),
//!     "Contents" => Object::Reference(draw_id),
//!     "MediaBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
//! });
//!
//! let mut output = Vec::new();
//! document.save_to(&mut output, SaveOptions::default()).unwrap();
//! assert!(output.starts_with(b"%PDF-1.7\n"));
//! ```

#[macro_use]
mod object;
pub use crate::object::{Dictionary, Object, ObjectId, Stream};

mod document;
pub use crate::document::{Document, IndirectObject};

mod content;
mod error;
pub use crate::error::{Error, Result};

mod filters;

mod save_options;
pub use crate::save_options::{Identifier, SaveOptions, SaveOptionsBuilder};

mod writer;
