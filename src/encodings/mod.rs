// encodings/mod.rs - Built-in encodings: ASCII and UTF-8.

pub mod ascii;
pub mod utf8;

pub use ascii::ONIG_ENCODING_ASCII;
pub use utf8::ONIG_ENCODING_UTF8;
