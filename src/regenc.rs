// regenc.rs - Encoding trait and shared encoding helpers.
// The engine only ever sees text through this trait: character length,
// decoding, ctype tests and simple case folding.

use crate::oniguruma::*;

pub type OnigEncoding = &'static dyn Encoding;

pub const ASCII_LIMIT: OnigCodePoint = 127;
pub const NEWLINE_CODE: OnigCodePoint = 0x0a;

// === Encoding Trait ===
pub trait Encoding: Send + Sync {
    /// Encoding name (e.g. "US-ASCII", "UTF-8")
    fn name(&self) -> &str;

    /// Maximum encoded character length in bytes
    fn max_enc_len(&self) -> usize;

    /// Byte length of the character starting at `p[0]`.
    ///
    /// `p` is never empty. Malformed or truncated sequences report 1 so the
    /// caller always makes progress and never reads past `p`.
    fn mbc_enc_len(&self, p: &[u8]) -> usize;

    /// Decode the character starting at `p[0]`.
    fn mbc_to_code(&self, p: &[u8]) -> OnigCodePoint;

    /// Encode `code` into `buf`, returning the byte count.
    fn code_to_mbc(&self, code: OnigCodePoint, buf: &mut [u8; 4]) -> Result<usize, i32>;

    fn is_mbc_newline(&self, p: &[u8]) -> bool {
        p.first() == Some(&b'\n')
    }

    fn is_code_ctype(&self, code: OnigCodePoint, ctype: OnigCtype) -> bool;

    /// Simple (one-to-one) case fold.
    fn case_fold(&self, code: OnigCodePoint) -> OnigCodePoint;

    /// Simple (one-to-one) upper-case mapping, used when matching classes
    /// case-insensitively.
    fn case_upper(&self, code: OnigCodePoint) -> OnigCodePoint;

    /// Head of the character containing byte `s`.
    fn left_adjust_char_head(&self, data: &[u8], s: usize) -> usize;

    fn is_valid_mbc_string(&self, s: &[u8]) -> bool;

    fn property_name_to_ctype(&self, name: &[u8]) -> Option<OnigCtype> {
        onigenc_minimum_property_name_to_ctype(name)
    }
}

// === ASCII ctype helpers ===

pub fn onigenc_is_ascii_code_ctype(code: OnigCodePoint, ctype: OnigCtype) -> bool {
    if code > ASCII_LIMIT {
        return false;
    }
    let c = code as u8;
    match ctype {
        ONIGENC_CTYPE_NEWLINE => c == b'\n',
        ONIGENC_CTYPE_ALPHA => c.is_ascii_alphabetic(),
        ONIGENC_CTYPE_BLANK => c == b' ' || c == b'\t',
        ONIGENC_CTYPE_CNTRL => c.is_ascii_control(),
        ONIGENC_CTYPE_DIGIT => c.is_ascii_digit(),
        ONIGENC_CTYPE_GRAPH => c.is_ascii_graphic(),
        ONIGENC_CTYPE_LOWER => c.is_ascii_lowercase(),
        ONIGENC_CTYPE_PRINT => c.is_ascii_graphic() || c == b' ',
        ONIGENC_CTYPE_PUNCT => c.is_ascii_punctuation(),
        // \t \n \v \f \r and space
        ONIGENC_CTYPE_SPACE => matches!(c, b'\t'..=b'\r' | b' '),
        ONIGENC_CTYPE_UPPER => c.is_ascii_uppercase(),
        ONIGENC_CTYPE_XDIGIT => c.is_ascii_hexdigit(),
        ONIGENC_CTYPE_WORD => c.is_ascii_alphanumeric() || c == b'_',
        ONIGENC_CTYPE_ALNUM => c.is_ascii_alphanumeric(),
        ONIGENC_CTYPE_ASCII => true,
        _ => false,
    }
}

#[inline]
pub fn onigenc_ascii_code_to_lower_case(code: OnigCodePoint) -> OnigCodePoint {
    if (b'A' as u32..=b'Z' as u32).contains(&code) {
        code + 0x20
    } else {
        code
    }
}

#[inline]
pub fn onigenc_ascii_code_to_upper_case(code: OnigCodePoint) -> OnigCodePoint {
    if (b'a' as u32..=b'z' as u32).contains(&code) {
        code - 0x20
    } else {
        code
    }
}

/// POSIX bracket and `\p{...}` names shared by every encoding.
/// Lookup ignores ASCII case.
pub fn onigenc_minimum_property_name_to_ctype(name: &[u8]) -> Option<OnigCtype> {
    const NAMES: &[(&[u8], OnigCtype)] = &[
        (b"alnum", ONIGENC_CTYPE_ALNUM),
        (b"alpha", ONIGENC_CTYPE_ALPHA),
        (b"blank", ONIGENC_CTYPE_BLANK),
        (b"cntrl", ONIGENC_CTYPE_CNTRL),
        (b"digit", ONIGENC_CTYPE_DIGIT),
        (b"graph", ONIGENC_CTYPE_GRAPH),
        (b"lower", ONIGENC_CTYPE_LOWER),
        (b"print", ONIGENC_CTYPE_PRINT),
        (b"punct", ONIGENC_CTYPE_PUNCT),
        (b"space", ONIGENC_CTYPE_SPACE),
        (b"upper", ONIGENC_CTYPE_UPPER),
        (b"xdigit", ONIGENC_CTYPE_XDIGIT),
        (b"word", ONIGENC_CTYPE_WORD),
        (b"ascii", ONIGENC_CTYPE_ASCII),
        (b"newline", ONIGENC_CTYPE_NEWLINE),
    ];
    NAMES
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, ctype)| ctype)
}

// === Encoding Utility Functions ===

/// Length of the character at `s`, or 0 at the end of `data`.
#[inline]
pub fn enclen(enc: OnigEncoding, data: &[u8], s: usize) -> usize {
    if s >= data.len() {
        0
    } else {
        enc.mbc_enc_len(&data[s..])
    }
}

/// Step back n characters from s, not going below `start`.
pub fn onigenc_step_back(
    enc: OnigEncoding,
    start: usize,
    s: usize,
    data: &[u8],
    n: usize,
) -> Option<usize> {
    let mut s = s;
    for _ in 0..n {
        if s <= start {
            return None;
        }
        s = enc.left_adjust_char_head(data, s - 1);
    }
    Some(s)
}

/// Count characters in data[p..end).
pub fn onigenc_strlen(enc: OnigEncoding, data: &[u8], p: usize, end: usize) -> usize {
    let mut n = 0;
    let mut q = p;
    while q < end {
        q += enc.mbc_enc_len(&data[q..end]);
        n += 1;
    }
    n
}

pub fn onigenc_get_prev_char_head(enc: OnigEncoding, data: &[u8], s: usize) -> Option<usize> {
    if s == 0 {
        None
    } else {
        Some(enc.left_adjust_char_head(data, s - 1))
    }
}

/// Smallest character head at or after `s`.
pub fn onigenc_get_right_adjust_char_head(enc: OnigEncoding, data: &[u8], s: usize) -> usize {
    if s >= data.len() {
        return data.len();
    }
    let p = enc.left_adjust_char_head(data, s);
    if p < s {
        p + enc.mbc_enc_len(&data[p..])
    } else {
        p
    }
}

/// Append the encoding of `code` to `out`.
pub fn onigenc_code_to_mbc_vec(
    enc: OnigEncoding,
    code: OnigCodePoint,
    out: &mut Vec<u8>,
) -> Result<(), i32> {
    let mut buf = [0u8; 4];
    let n = enc.code_to_mbc(code, &mut buf)?;
    out.extend_from_slice(&buf[..n]);
    Ok(())
}

/// Word-character test at `s`, honouring the ASCII restriction.
pub fn onigenc_is_mbc_word(enc: OnigEncoding, data: &[u8], s: usize, ascii: bool) -> bool {
    if s >= data.len() {
        return false;
    }
    let code = enc.mbc_to_code(&data[s..]);
    if ascii {
        onigenc_is_ascii_code_ctype(code, ONIGENC_CTYPE_WORD)
    } else {
        enc.is_code_ctype(code, ONIGENC_CTYPE_WORD)
    }
}
