// encodings/ascii.rs - US-ASCII encoding.
// Every byte is one character; bytes >= 0x80 carry no character type.

use crate::oniguruma::*;
use crate::regenc::*;

pub struct AsciiEncoding;

pub static ONIG_ENCODING_ASCII: AsciiEncoding = AsciiEncoding;

impl Encoding for AsciiEncoding {
    fn name(&self) -> &str {
        "US-ASCII"
    }

    fn max_enc_len(&self) -> usize {
        1
    }

    fn mbc_enc_len(&self, _p: &[u8]) -> usize {
        1
    }

    fn mbc_to_code(&self, p: &[u8]) -> OnigCodePoint {
        p[0] as OnigCodePoint
    }

    fn code_to_mbc(&self, code: OnigCodePoint, buf: &mut [u8; 4]) -> Result<usize, i32> {
        if code > 0xff {
            return Err(ONIGERR_TOO_BIG_WIDE_CHAR_VALUE);
        }
        buf[0] = code as u8;
        Ok(1)
    }

    fn is_code_ctype(&self, code: OnigCodePoint, ctype: OnigCtype) -> bool {
        onigenc_is_ascii_code_ctype(code, ctype)
    }

    fn case_fold(&self, code: OnigCodePoint) -> OnigCodePoint {
        onigenc_ascii_code_to_lower_case(code)
    }

    fn case_upper(&self, code: OnigCodePoint) -> OnigCodePoint {
        onigenc_ascii_code_to_upper_case(code)
    }

    fn left_adjust_char_head(&self, data: &[u8], s: usize) -> usize {
        s.min(data.len())
    }

    fn is_valid_mbc_string(&self, s: &[u8]) -> bool {
        s.is_ascii()
    }
}
