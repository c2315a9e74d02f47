// encodings/utf8.rs - UTF-8 encoding (RFC 3629 range: U+0000 - U+10FFFF).
// Character classes for non-ASCII code points come from `char`'s
// classification methods, digits from the Nd table in `unicode`.

use crate::oniguruma::*;
use crate::regenc::*;
use crate::unicode::{onig_is_in_code_range, CR_DECIMAL_DIGIT};

// === UTF-8 Helpers ===

#[inline]
fn utf8_islead(c: u8) -> bool {
    (c & 0xc0) != 0x80
}

#[inline]
fn utf8_istail(c: u8) -> bool {
    (c & 0xc0) == 0x80
}

// Maps first byte to sequence length (RFC 3629: max 4 bytes).
#[inline]
fn utf8_seq_len(b: u8) -> usize {
    match b {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 1,
    }
}

// Zs plus TAB.
fn is_unicode_blank(code: OnigCodePoint) -> bool {
    matches!(
        code,
        0x09 | 0x20 | 0xa0 | 0x1680 | 0x2000..=0x200a | 0x202f | 0x205f | 0x3000
    )
}

// Pc (connector punctuation), part of \w.
fn is_connector_punct(code: OnigCodePoint) -> bool {
    matches!(
        code,
        0x5f | 0x203f | 0x2040 | 0x2054 | 0xfe33 | 0xfe34 | 0xfe4d..=0xfe4f | 0xff3f
    )
}

fn unicode_is_code_ctype(code: OnigCodePoint, ctype: OnigCtype) -> bool {
    if code <= ASCII_LIMIT {
        return onigenc_is_ascii_code_ctype(code, ctype);
    }
    let Some(c) = char::from_u32(code) else {
        return false;
    };
    match ctype {
        ONIGENC_CTYPE_NEWLINE => false,
        ONIGENC_CTYPE_ALPHA => c.is_alphabetic(),
        ONIGENC_CTYPE_BLANK => is_unicode_blank(code),
        ONIGENC_CTYPE_CNTRL => c.is_control(),
        ONIGENC_CTYPE_DIGIT => onig_is_in_code_range(CR_DECIMAL_DIGIT, code),
        ONIGENC_CTYPE_GRAPH => !c.is_whitespace() && !c.is_control(),
        ONIGENC_CTYPE_LOWER => c.is_lowercase(),
        ONIGENC_CTYPE_PRINT => !c.is_control() && (!c.is_whitespace() || is_unicode_blank(code)),
        ONIGENC_CTYPE_PUNCT => {
            is_connector_punct(code)
                || (!c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
        }
        ONIGENC_CTYPE_SPACE => c.is_whitespace(),
        ONIGENC_CTYPE_UPPER => c.is_uppercase(),
        ONIGENC_CTYPE_XDIGIT => false,
        ONIGENC_CTYPE_WORD => c.is_alphanumeric() || is_connector_punct(code),
        ONIGENC_CTYPE_ALNUM => c.is_alphanumeric(),
        ONIGENC_CTYPE_ASCII => false,
        _ => false,
    }
}

fn single_char(mut it: impl Iterator<Item = char>, orig: char) -> char {
    match (it.next(), it.next()) {
        (Some(c), None) => c,
        _ => orig,
    }
}

// === UTF-8 Encoding Struct ===

pub struct Utf8Encoding;

pub static ONIG_ENCODING_UTF8: Utf8Encoding = Utf8Encoding;

impl Encoding for Utf8Encoding {
    fn name(&self) -> &str {
        "UTF-8"
    }

    fn max_enc_len(&self) -> usize {
        4
    }

    fn mbc_enc_len(&self, p: &[u8]) -> usize {
        let len = utf8_seq_len(p[0]);
        if len > p.len() || !p[1..len].iter().all(|&b| utf8_istail(b)) {
            1
        } else {
            len
        }
    }

    fn mbc_to_code(&self, p: &[u8]) -> OnigCodePoint {
        let len = self.mbc_enc_len(p);
        let c = p[0] as u32;
        if len == 1 {
            return c;
        }
        let mut n = c & ((1u32 << (7 - len)) - 1);
        for &b in &p[1..len] {
            n = (n << 6) | (b as u32 & 0x3f);
        }
        n
    }

    fn code_to_mbc(&self, code: OnigCodePoint, buf: &mut [u8; 4]) -> Result<usize, i32> {
        if (0xd800..=0xdfff).contains(&code) {
            return Err(ONIGERR_INVALID_CODE_POINT_VALUE);
        }
        if code < 0x80 {
            buf[0] = code as u8;
            Ok(1)
        } else if code < 0x800 {
            buf[0] = ((code >> 6) & 0x1f) as u8 | 0xc0;
            buf[1] = (code & 0x3f) as u8 | 0x80;
            Ok(2)
        } else if code < 0x10000 {
            buf[0] = ((code >> 12) & 0x0f) as u8 | 0xe0;
            buf[1] = ((code >> 6) & 0x3f) as u8 | 0x80;
            buf[2] = (code & 0x3f) as u8 | 0x80;
            Ok(3)
        } else if code <= 0x10ffff {
            buf[0] = ((code >> 18) & 0x07) as u8 | 0xf0;
            buf[1] = ((code >> 12) & 0x3f) as u8 | 0x80;
            buf[2] = ((code >> 6) & 0x3f) as u8 | 0x80;
            buf[3] = (code & 0x3f) as u8 | 0x80;
            Ok(4)
        } else {
            Err(ONIGERR_TOO_BIG_WIDE_CHAR_VALUE)
        }
    }

    fn is_code_ctype(&self, code: OnigCodePoint, ctype: OnigCtype) -> bool {
        unicode_is_code_ctype(code, ctype)
    }

    fn case_fold(&self, code: OnigCodePoint) -> OnigCodePoint {
        if code <= ASCII_LIMIT {
            return onigenc_ascii_code_to_lower_case(code);
        }
        match char::from_u32(code) {
            Some(c) => single_char(c.to_lowercase(), c) as OnigCodePoint,
            None => code,
        }
    }

    fn case_upper(&self, code: OnigCodePoint) -> OnigCodePoint {
        if code <= ASCII_LIMIT {
            return onigenc_ascii_code_to_upper_case(code);
        }
        match char::from_u32(code) {
            Some(c) => single_char(c.to_uppercase(), c) as OnigCodePoint,
            None => code,
        }
    }

    fn left_adjust_char_head(&self, data: &[u8], s: usize) -> usize {
        if s >= data.len() {
            return data.len();
        }
        let mut p = s;
        // at most three tail bytes belong to one character
        while p > 0 && s - p < 3 && !utf8_islead(data[p]) {
            p -= 1;
        }
        if utf8_islead(data[p]) && p + self.mbc_enc_len(&data[p..]) > s {
            p
        } else {
            s
        }
    }

    fn is_valid_mbc_string(&self, s: &[u8]) -> bool {
        std::str::from_utf8(s).is_ok()
    }
}
