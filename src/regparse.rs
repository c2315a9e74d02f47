// regparse.rs - Pattern parser.
// Tokenizer (fetch_token / fetch_cc_item) and recursive-descent tree
// builder (prs_alts -> prs_branch -> prs_exp -> prs_bag / prs_cc).
// Which characters are operators is decided entirely by the syntax.

use std::sync::atomic::{AtomicU32, Ordering};

use smallvec::SmallVec;

use crate::oniguruma::*;
use crate::regenc::*;
use crate::regparse_types::*;

static PARSE_DEPTH_LIMIT: AtomicU32 = AtomicU32::new(DEFAULT_PARSE_DEPTH_LIMIT);

pub fn onig_get_parse_depth_limit() -> u32 {
    PARSE_DEPTH_LIMIT.load(Ordering::Relaxed)
}

/// Set the nesting limit for subsequent compiles. 0 restores the default.
pub fn onig_set_parse_depth_limit(depth: u32) -> i32 {
    let depth = if depth == 0 {
        DEFAULT_PARSE_DEPTH_LIMIT
    } else {
        depth
    };
    PARSE_DEPTH_LIMIT.store(depth, Ordering::Relaxed);
    ONIG_NORMAL
}

// === Tokens ===

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RepeatToken {
    lower: u32,
    upper: Option<u32>,
    greedy: bool,
    possessive: bool,
    /// Operator character, used when the syntax treats a target-less
    /// operator as a literal.
    op_char: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Eot,
    Char(OnigCodePoint),
    RawByte(u8),
    AnyChar,
    CharType(CtypeNode),
    Anchor(AnchorNode),
    BackRef(BackRefNode),
    Repeat(RepeatToken),
    Alt,
    SubexpOpen,
    SubexpClose,
    CcOpen,
}

/// A code produced by an escape sequence.
enum Esc {
    Code(OnigCodePoint),
    Raw(u8),
}

enum CcItem {
    Char(OnigCodePoint),
    CType(CtypeNode),
    Class(CClassNode),
    And,
    Close,
}

enum Exp {
    Node(Node),
    IsolatedOption,
}

enum Bag {
    Node(Node),
    IsolatedOption,
}

#[inline]
fn is_ascii_code(c: OnigCodePoint, b: u8) -> bool {
    c == b as OnigCodePoint
}

struct Parser<'a> {
    pat: &'a [u8],
    p: usize,
    env: &'a mut ParseEnv,
    in_quote: bool,
    group_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(pat: &'a [u8], env: &'a mut ParseEnv) -> Self {
        Parser {
            pat,
            p: 0,
            env,
            in_quote: false,
            group_depth: 0,
        }
    }

    // === Cursor helpers ===

    #[inline]
    fn at_end(&self) -> bool {
        self.p >= self.pat.len()
    }

    #[inline]
    fn peek_byte(&self) -> Option<u8> {
        self.pat.get(self.p).copied()
    }

    #[inline]
    fn peek_byte_at(&self, off: usize) -> Option<u8> {
        self.pat.get(self.p + off).copied()
    }

    #[inline]
    fn peek_is(&self, b: u8) -> bool {
        self.peek_byte() == Some(b)
    }

    fn fetch_code(&mut self) -> Option<OnigCodePoint> {
        if self.at_end() {
            return None;
        }
        let rest = &self.pat[self.p..];
        let code = self.env.enc.mbc_to_code(rest);
        self.p += self.env.enc.mbc_enc_len(rest);
        Some(code)
    }

    fn syn(&self) -> &'static OnigSyntaxType {
        self.env.syntax
    }

    fn has_op(&self, op: SynOp) -> bool {
        self.env.syntax.has_op(op)
    }

    fn has_op2(&self, op2: SynOp2) -> bool {
        self.env.syntax.has_op2(op2)
    }

    fn has_bv(&self, bv: SynBehavior) -> bool {
        self.env.syntax.has_behavior(bv)
    }

    fn opt(&self, o: OnigOptionType) -> bool {
        self.env.options.contains(o)
    }

    fn enter_depth(&mut self) -> Result<(), i32> {
        self.env.parse_depth += 1;
        if self.env.parse_depth > self.env.parse_depth_limit {
            return Err(ONIGERR_PARSE_DEPTH_LIMIT_OVER);
        }
        Ok(())
    }

    fn leave_depth(&mut self) {
        self.env.parse_depth -= 1;
    }

    // === Number scanning ===

    /// Scan up to `max_digits` digits of `radix`. `None` when no digit is
    /// present.
    fn scan_number(&mut self, radix: u32, max_digits: usize) -> Result<Option<u32>, i32> {
        let mut n: u64 = 0;
        let mut count = 0;
        while count < max_digits {
            let Some(d) = self.peek_byte().and_then(|b| (b as char).to_digit(radix)) else {
                break;
            };
            n = n * radix as u64 + d as u64;
            if n > u32::MAX as u64 {
                return Err(if radix == 10 {
                    ONIGERR_TOO_BIG_NUMBER
                } else {
                    ONIGERR_TOO_BIG_WIDE_CHAR_VALUE
                });
            }
            self.p += 1;
            count += 1;
        }
        Ok(if count == 0 { None } else { Some(n as u32) })
    }

    fn code_or_raw(&self, code: OnigCodePoint) -> Esc {
        if (0x80..=0xff).contains(&code) && self.env.enc.max_enc_len() > 1 {
            Esc::Raw(code as u8)
        } else {
            Esc::Code(code)
        }
    }

    /// Escapes that denote one code point. `c` is the character after the
    /// backslash; the cursor is just past it. Returns `None` when `c` is
    /// not a code escape in this syntax.
    fn scan_code_escape(&mut self, c: OnigCodePoint, in_cc: bool) -> Result<Option<Esc>, i32> {
        let Ok(b) = u8::try_from(c) else {
            return Ok(None);
        };
        let r = match b {
            b'x' if self.has_op(SynOp::ESC_X_BRACE_HEX8) && self.peek_is(b'{') => {
                self.p += 1;
                let code = self.scan_number(16, 8)?;
                if self.peek_is(b'}') && code.is_some() {
                    self.p += 1;
                    Esc::Code(code.unwrap_or(0))
                } else {
                    return Err(ONIGERR_INVALID_CODE_POINT_VALUE);
                }
            }
            b'x' if self.has_op(SynOp::ESC_X_HEX2) => match self.scan_number(16, 2)? {
                Some(code) => self.code_or_raw(code),
                None => Esc::Code(0),
            },
            b'u' if self.has_op2(SynOp2::ESC_U_HEX4) => {
                let start = self.p;
                let code = self.scan_number(16, 4)?;
                if self.p - start < 4 {
                    return Err(ONIGERR_INVALID_CODE_POINT_VALUE);
                }
                Esc::Code(code.unwrap_or(0))
            }
            b'o' if self.has_op(SynOp::ESC_O_BRACE_OCTAL) && self.peek_is(b'{') => {
                self.p += 1;
                let code = self.scan_number(8, 11)?;
                if self.peek_is(b'}') && code.is_some() {
                    self.p += 1;
                    Esc::Code(code.unwrap_or(0))
                } else {
                    return Err(ONIGERR_INVALID_CODE_POINT_VALUE);
                }
            }
            b'0' if self.has_op(SynOp::ESC_OCTAL3) => {
                let code = self.scan_number(8, 2)?.unwrap_or(0);
                self.code_or_raw(code)
            }
            b'1'..=b'7' if in_cc && self.has_op(SynOp::ESC_OCTAL3) => {
                self.p -= 1;
                let code = self.scan_number(8, 3)?.unwrap_or(0);
                self.code_or_raw(code)
            }
            b'c' if self.has_op(SynOp::ESC_C_CONTROL) => {
                let Some(c2) = self.fetch_code() else {
                    return Err(ONIGERR_END_PATTERN_AT_CONTROL);
                };
                if is_ascii_code(c2, b'?') {
                    Esc::Code(0x7f)
                } else if c2 > ASCII_LIMIT {
                    return Err(ONIGERR_CONTROL_CODE_SYNTAX);
                } else {
                    Esc::Code(c2 & 0x9f)
                }
            }
            _ if self.has_op(SynOp::ESC_CONTROL_CHARS) => match b {
                b'n' => Esc::Code(0x0a),
                b't' => Esc::Code(0x09),
                b'r' => Esc::Code(0x0d),
                b'f' => Esc::Code(0x0c),
                b'a' => Esc::Code(0x07),
                b'e' => Esc::Code(0x1b),
                b'v' if self.has_op2(SynOp2::ESC_V_VTAB) => Esc::Code(0x0b),
                b'b' if in_cc => Esc::Code(0x08),
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(r))
    }

    fn ctype_for_escape(&self, c: u8) -> Option<CtypeNode> {
        let (ctype, op, ascii_opt) = match c.to_ascii_lowercase() {
            b'w' => (ONIGENC_CTYPE_WORD, SynOp::ESC_W_WORD, ONIG_OPTION_WORD_IS_ASCII),
            b'd' => (ONIGENC_CTYPE_DIGIT, SynOp::ESC_D_DIGIT, ONIG_OPTION_DIGIT_IS_ASCII),
            b's' => (ONIGENC_CTYPE_SPACE, SynOp::ESC_S_WHITE_SPACE, ONIG_OPTION_SPACE_IS_ASCII),
            b'h' => {
                if !self.has_op2(SynOp2::ESC_H_XDIGIT) {
                    return None;
                }
                return Some(CtypeNode {
                    ctype: ONIGENC_CTYPE_XDIGIT,
                    not: c == b'H',
                    ascii: true,
                });
            }
            _ => return None,
        };
        if !self.has_op(op) {
            return None;
        }
        Some(CtypeNode {
            ctype,
            not: c.is_ascii_uppercase(),
            ascii: self.opt(ascii_opt),
        })
    }

    /// `\p{Name}` / `\P{Name}` / `\p{^Name}`, cursor after the p.
    fn prs_char_property(&mut self, upper: bool) -> Result<CtypeNode, i32> {
        // skip '{'
        self.p += 1;
        let mut not = upper;
        if self.peek_is(b'^') && self.has_op2(SynOp2::ESC_P_BRACE_CIRCUMFLEX_NOT) {
            self.p += 1;
            not = !not;
        }
        let start = self.p;
        while let Some(b) = self.peek_byte() {
            if b == b'}' {
                break;
            }
            self.p += 1;
        }
        let name = &self.pat[start..self.p];
        if self.at_end() {
            self.env.error_par = name.to_vec();
            return Err(ONIGERR_INVALID_CHAR_PROPERTY_NAME);
        }
        self.p += 1;
        match self.env.enc.property_name_to_ctype(name) {
            Some(ctype) => Ok(CtypeNode {
                ctype,
                not,
                ascii: false,
            }),
            None => {
                self.env.error_par = name.to_vec();
                Err(ONIGERR_INVALID_CHAR_PROPERTY_NAME)
            }
        }
    }

    // === Group names ===

    /// Read a group name up to `term`. Definitions require a word
    /// character first; references may be a (signed) number.
    fn fetch_name(&mut self, term: u8, is_ref: bool) -> Result<Vec<u8>, i32> {
        let start = self.p;
        let enc = self.env.enc;
        while let Some(b) = self.peek_byte() {
            if b == term || b == b')' {
                break;
            }
            self.p += enc.mbc_enc_len(&self.pat[self.p..]);
        }
        let name = self.pat[start..self.p].to_vec();
        if !self.peek_is(term) {
            self.env.error_par = name;
            return Err(ONIGERR_INVALID_GROUP_NAME);
        }
        self.p += 1;
        if name.is_empty() {
            return Err(ONIGERR_EMPTY_GROUP_NAME);
        }

        let numeric = {
            let digits = name
                .strip_prefix(b"-")
                .or_else(|| name.strip_prefix(b"+"))
                .unwrap_or(&name);
            !digits.is_empty() && digits.iter().all(|b| b.is_ascii_digit())
        };
        if numeric {
            if is_ref {
                return Ok(name);
            }
            self.env.error_par = name;
            return Err(ONIGERR_INVALID_GROUP_NAME);
        }

        let mut q = 0;
        let mut first = true;
        while q < name.len() {
            let code = enc.mbc_to_code(&name[q..]);
            let ok = enc.is_code_ctype(code, ONIGENC_CTYPE_WORD);
            if !ok || (first && code < 0x80 && (code as u8).is_ascii_digit()) {
                let e = if first && ok {
                    ONIGERR_INVALID_GROUP_NAME
                } else {
                    ONIGERR_INVALID_CHAR_IN_GROUP_NAME
                };
                self.env.error_par = name;
                return Err(e);
            }
            first = false;
            q += enc.mbc_enc_len(&name[q..]);
        }
        Ok(name)
    }

    /// Resolve a name or number inside `\k<...>`.
    fn backref_by_name(&mut self, name: Vec<u8>) -> Result<BackRefNode, i32> {
        let ignorecase = self.env.ignorecase();
        let text = String::from_utf8_lossy(&name);
        if let Ok(n) = text.parse::<i64>() {
            let abs = if name[0] == b'-' {
                self.env.num_mem as i64 + 1 + n
            } else {
                n
            };
            if abs <= 0 {
                return Err(ONIGERR_INVALID_BACKREF);
            }
            if abs as usize > ONIG_MAX_BACKREF_NUM {
                return Err(ONIGERR_TOO_BIG_BACKREF_NUMBER);
            }
            let abs = abs as usize;
            self.env.has_numbered_backref = true;
            self.env.backref_max = self.env.backref_max.max(abs);
            let mut groups = SmallVec::new();
            groups.push(abs);
            return Ok(BackRefNode {
                groups,
                by_name: false,
                ignorecase,
            });
        }
        match self.env.name_table.find(&name) {
            Some(g) => Ok(BackRefNode {
                groups: g.back_refs.clone(),
                by_name: true,
                ignorecase,
            }),
            None => {
                self.env.error_par = name;
                Err(ONIGERR_UNDEFINED_NAME_REFERENCE)
            }
        }
    }

    // === Intervals ===

    /// Parse `{n,m}` after the opening brace. `Ok(None)` means the brace
    /// is an ordinary character and the cursor is restored.
    fn fetch_interval(&mut self, escaped_close: bool) -> Result<Option<RepeatToken>, i32> {
        let save = self.p;
        let allow_invalid = self.has_bv(SynBehavior::ALLOW_INVALID_INTERVAL);
        let invalid = |this: &mut Self| -> Result<Option<RepeatToken>, i32> {
            if allow_invalid {
                this.p = save;
                Ok(None)
            } else {
                Err(ONIGERR_INVALID_REPEAT_RANGE_PATTERN)
            }
        };

        if self.at_end() {
            if allow_invalid {
                return Ok(None);
            }
            return Err(ONIGERR_END_PATTERN_AT_LEFT_BRACE);
        }

        let low = self
            .scan_number(10, usize::MAX)
            .map_err(|_| ONIGERR_TOO_BIG_NUMBER_FOR_REPEAT_RANGE)?;
        let mut upper;
        let lower;
        match low {
            Some(n) => {
                lower = n;
                upper = Some(n);
            }
            None => {
                if self.peek_is(b',') && self.has_bv(SynBehavior::ALLOW_INTERVAL_LOW_ABBREV) {
                    lower = 0;
                    upper = None;
                } else {
                    return invalid(self);
                }
            }
        }
        let mut fixed = true;
        if self.peek_is(b',') {
            self.p += 1;
            fixed = false;
            upper = self
                .scan_number(10, usize::MAX)
                .map_err(|_| ONIGERR_TOO_BIG_NUMBER_FOR_REPEAT_RANGE)?;
            if low.is_none() && upper.is_none() {
                return invalid(self);
            }
        }
        if escaped_close {
            if !self.peek_is(b'\\') {
                return invalid(self);
            }
            self.p += 1;
        }
        if !self.peek_is(b'}') {
            return invalid(self);
        }
        self.p += 1;

        if lower > ONIG_MAX_REPEAT_NUM || upper.is_some_and(|u| u > ONIG_MAX_REPEAT_NUM) {
            return Err(ONIGERR_TOO_BIG_NUMBER_FOR_REPEAT_RANGE);
        }
        if let Some(u) = upper {
            if u < lower {
                return Err(ONIGERR_UPPER_SMALLER_THAN_LOWER_IN_REPEAT_RANGE);
            }
        }
        let mut r = RepeatToken {
            lower,
            upper,
            greedy: true,
            possessive: false,
            op_char: b'{',
        };
        self.greedy_check(&mut r, true, fixed);
        Ok(Some(r))
    }

    fn greedy_check(&mut self, r: &mut RepeatToken, interval: bool, fixed: bool) {
        let greedy_only = interval && fixed && self.has_bv(SynBehavior::FIXED_INTERVAL_IS_GREEDY_ONLY);
        if self.peek_is(b'?') && self.has_op(SynOp::QMARK_NON_GREEDY) && !greedy_only {
            self.p += 1;
            r.greedy = false;
        } else if self.peek_is(b'+') {
            let allowed = if interval {
                self.has_op2(SynOp2::PLUS_POSSESSIVE_INTERVAL)
            } else {
                self.has_op2(SynOp2::PLUS_POSSESSIVE_REPEAT)
            };
            if allowed {
                self.p += 1;
                r.possessive = true;
            }
        }
    }

    fn repeat(&mut self, lower: u32, upper: Option<u32>, op_char: u8) -> Token {
        let mut r = RepeatToken {
            lower,
            upper,
            greedy: true,
            possessive: false,
            op_char,
        };
        self.greedy_check(&mut r, false, false);
        Token::Repeat(r)
    }

    // === Anchor context (syntaxes without CONTEXT_INDEP_ANCHORS) ===

    fn preceded_by_branch_start(&self, at: usize) -> bool {
        let before = &self.pat[..at];
        before.is_empty()
            || (self.has_op(SynOp::LPAREN_SUBEXP) && before.ends_with(b"("))
            || (self.has_op(SynOp::ESC_LPAREN_SUBEXP) && before.ends_with(b"\\("))
            || (self.has_op(SynOp::VBAR_ALT) && before.ends_with(b"|"))
            || (self.has_op(SynOp::ESC_VBAR_ALT) && before.ends_with(b"\\|"))
    }

    fn followed_by_branch_end(&self) -> bool {
        let after = &self.pat[self.p..];
        after.is_empty()
            || (self.has_op(SynOp::LPAREN_SUBEXP) && after.starts_with(b")"))
            || (self.has_op(SynOp::ESC_LPAREN_SUBEXP) && after.starts_with(b"\\)"))
            || (self.has_op(SynOp::VBAR_ALT) && after.starts_with(b"|"))
            || (self.has_op(SynOp::ESC_VBAR_ALT) && after.starts_with(b"\\|"))
    }

    fn word_anchor(&self, kind: AnchorType) -> Token {
        Token::Anchor(AnchorNode {
            kind,
            ascii: self.opt(ONIG_OPTION_WORD_IS_ASCII),
        })
    }

    // === Tokenizer ===

    fn fetch_token(&mut self) -> Result<Token, i32> {
        loop {
            let start = self.p;
            let Some(c) = self.fetch_code() else {
                return Ok(Token::Eot);
            };

            if self.in_quote {
                if is_ascii_code(c, b'\\') && self.peek_is(b'E') {
                    self.p += 1;
                    self.in_quote = false;
                    continue;
                }
                return Ok(Token::Char(c));
            }

            if is_ascii_code(c, b'\\') && !self.has_op2(SynOp2::INEFFECTIVE_ESCAPE) {
                return self.fetch_escaped_token();
            }

            if self.opt(ONIG_OPTION_EXTEND) {
                if matches!(c, 0x09..=0x0d | 0x20) {
                    continue;
                }
                if is_ascii_code(c, b'#') {
                    while let Some(b) = self.peek_byte() {
                        self.p += 1;
                        if b == b'\n' {
                            break;
                        }
                    }
                    continue;
                }
            }

            let Ok(b) = u8::try_from(c) else {
                return Ok(Token::Char(c));
            };
            let tok = match b {
                b'.' if self.has_op(SynOp::DOT_ANYCHAR) => Token::AnyChar,
                b'*' if self.has_op(SynOp::ASTERISK_ZERO_INF) => self.repeat(0, None, b'*'),
                b'+' if self.has_op(SynOp::PLUS_ONE_INF) => self.repeat(1, None, b'+'),
                b'?' if self.has_op(SynOp::QMARK_ZERO_ONE) => self.repeat(0, Some(1), b'?'),
                b'{' if self.has_op(SynOp::BRACE_INTERVAL) => match self.fetch_interval(false)? {
                    Some(r) => Token::Repeat(r),
                    None => Token::Char(c),
                },
                b'|' if self.has_op(SynOp::VBAR_ALT) => Token::Alt,
                b'(' if self.has_op(SynOp::LPAREN_SUBEXP) => {
                    if self.peek_is(b'?')
                        && self.peek_byte_at(1) == Some(b'#')
                        && self.has_op2(SynOp2::QMARK_GROUP_EFFECT)
                    {
                        self.skip_comment()?;
                        continue;
                    }
                    Token::SubexpOpen
                }
                b')' if self.has_op(SynOp::LPAREN_SUBEXP) => self.close_token(c),
                b'^' if self.has_op(SynOp::LINE_ANCHOR) => {
                    if !self.has_bv(SynBehavior::CONTEXT_INDEP_ANCHORS)
                        && !self.preceded_by_branch_start(start)
                    {
                        Token::Char(c)
                    } else if self.opt(ONIG_OPTION_SINGLELINE) {
                        Token::Anchor(AnchorNode {
                            kind: AnchorType::BeginBuf,
                            ascii: false,
                        })
                    } else {
                        Token::Anchor(AnchorNode {
                            kind: AnchorType::BeginLine,
                            ascii: false,
                        })
                    }
                }
                b'$' if self.has_op(SynOp::LINE_ANCHOR) => {
                    if !self.has_bv(SynBehavior::CONTEXT_INDEP_ANCHORS)
                        && !self.followed_by_branch_end()
                    {
                        Token::Char(c)
                    } else if self.opt(ONIG_OPTION_SINGLELINE) {
                        Token::Anchor(AnchorNode {
                            kind: AnchorType::SemiEndBuf,
                            ascii: false,
                        })
                    } else {
                        Token::Anchor(AnchorNode {
                            kind: AnchorType::EndLine,
                            ascii: false,
                        })
                    }
                }
                b'[' if self.has_op(SynOp::BRACKET_CC) => Token::CcOpen,
                _ => Token::Char(c),
            };
            return Ok(tok);
        }
    }

    fn close_token(&self, c: OnigCodePoint) -> Token {
        if self.group_depth == 0 && self.has_bv(SynBehavior::ALLOW_UNMATCHED_CLOSE_SUBEXP) {
            Token::Char(c)
        } else {
            Token::SubexpClose
        }
    }

    fn skip_comment(&mut self) -> Result<(), i32> {
        // cursor is at "?#"
        self.p += 2;
        loop {
            match self.peek_byte() {
                None => return Err(ONIGERR_END_PATTERN_IN_GROUP),
                Some(b')') => {
                    self.p += 1;
                    return Ok(());
                }
                Some(b'\\') => self.p += 2,
                Some(_) => self.p += 1,
            }
        }
    }

    fn fetch_escaped_token(&mut self) -> Result<Token, i32> {
        let Some(c) = self.fetch_code() else {
            return Err(ONIGERR_END_PATTERN_AT_ESCAPE);
        };
        let Ok(b) = u8::try_from(c) else {
            return Ok(Token::Char(c));
        };

        let anchor = |kind| {
            Token::Anchor(AnchorNode { kind, ascii: false })
        };
        let tok = match b {
            b'*' if self.has_op(SynOp::ESC_ASTERISK_ZERO_INF) => self.repeat(0, None, b'*'),
            b'+' if self.has_op(SynOp::ESC_PLUS_ONE_INF) => self.repeat(1, None, b'+'),
            b'?' if self.has_op(SynOp::ESC_QMARK_ZERO_ONE) => self.repeat(0, Some(1), b'?'),
            b'{' if self.has_op(SynOp::ESC_BRACE_INTERVAL) => match self.fetch_interval(true)? {
                Some(r) => Token::Repeat(r),
                None => Token::Char(c),
            },
            b'|' if self.has_op(SynOp::ESC_VBAR_ALT) => Token::Alt,
            b'(' if self.has_op(SynOp::ESC_LPAREN_SUBEXP) => Token::SubexpOpen,
            b')' if self.has_op(SynOp::ESC_LPAREN_SUBEXP) => self.close_token(c),
            b'w' | b'W' | b'd' | b'D' | b's' | b'S' | b'h' | b'H' => {
                match self.ctype_for_escape(b) {
                    Some(ct) => Token::CharType(ct),
                    None => Token::Char(c),
                }
            }
            b'b' if self.has_op(SynOp::ESC_B_WORD_BOUND) => {
                self.word_anchor(AnchorType::WordBoundary)
            }
            b'B' if self.has_op(SynOp::ESC_B_WORD_BOUND) => {
                self.word_anchor(AnchorType::NoWordBoundary)
            }
            b'<' if self.has_op(SynOp::ESC_LTGT_WORD_BEGIN_END) => {
                self.word_anchor(AnchorType::WordBegin)
            }
            b'>' if self.has_op(SynOp::ESC_LTGT_WORD_BEGIN_END) => {
                self.word_anchor(AnchorType::WordEnd)
            }
            b'A' if self.has_op(SynOp::ESC_AZ_BUF_ANCHOR) => anchor(AnchorType::BeginBuf),
            b'Z' if self.has_op(SynOp::ESC_AZ_BUF_ANCHOR) => anchor(AnchorType::SemiEndBuf),
            b'z' if self.has_op(SynOp::ESC_AZ_BUF_ANCHOR) => anchor(AnchorType::EndBuf),
            b'G' if self.has_op(SynOp::ESC_CAPITAL_G_BEGIN_ANCHOR) => {
                anchor(AnchorType::BeginPosition)
            }
            b'`' if self.has_op2(SynOp2::ESC_GNU_BUF_ANCHOR) => anchor(AnchorType::BeginBuf),
            b'\'' if self.has_op2(SynOp2::ESC_GNU_BUF_ANCHOR) => anchor(AnchorType::EndBuf),
            b'Q' if self.has_op2(SynOp2::ESC_CAPITAL_Q_QUOTE) => {
                self.in_quote = true;
                return self.fetch_token();
            }
            b'k' if self.has_op2(SynOp2::ESC_K_NAMED_BACKREF)
                && (self.peek_is(b'<') || self.peek_is(b'\'')) =>
            {
                let term = if self.peek_is(b'<') { b'>' } else { b'\'' };
                self.p += 1;
                let name = self.fetch_name(term, true)?;
                Token::BackRef(self.backref_by_name(name)?)
            }
            b'g' if self.has_op2(SynOp2::ESC_G_SUBEXP_CALL)
                && (self.peek_is(b'<') || self.peek_is(b'\'')) =>
            {
                return Err(ONIG_NO_SUPPORT_CONFIG);
            }
            b'p' | b'P'
                if self.has_op2(SynOp2::ESC_P_BRACE_CHAR_PROPERTY) && self.peek_is(b'{') =>
            {
                Token::CharType(self.prs_char_property(b == b'P')?)
            }
            b'1'..=b'9' => self.fetch_numbered_escape(c)?,
            _ => match self.scan_code_escape(c, false)? {
                Some(Esc::Code(code)) => Token::Char(code),
                Some(Esc::Raw(byte)) => Token::RawByte(byte),
                None => Token::Char(c),
            },
        };
        Ok(tok)
    }

    /// `\1`..`\9...`: back reference, octal escape or literal digit.
    fn fetch_numbered_escape(&mut self, c: OnigCodePoint) -> Result<Token, i32> {
        let digit_start = self.p - 1;
        self.p = digit_start;
        let num = self.scan_number(10, usize::MAX).map_err(|_| ONIGERR_TOO_BIG_BACKREF_NUMBER)?;
        let num = num.unwrap_or(0) as usize;

        if self.has_op(SynOp::DECIMAL_BACKREF) && (num <= self.env.num_mem || num <= 9) {
            if num > ONIG_MAX_BACKREF_NUM {
                return Err(ONIGERR_TOO_BIG_BACKREF_NUMBER);
            }
            self.env.has_numbered_backref = true;
            self.env.backref_max = self.env.backref_max.max(num);
            let mut groups = SmallVec::new();
            groups.push(num);
            return Ok(Token::BackRef(BackRefNode {
                groups,
                by_name: false,
                ignorecase: self.env.ignorecase(),
            }));
        }

        self.p = digit_start + 1;
        if is_ascii_code(c, b'8') || is_ascii_code(c, b'9') {
            return Ok(Token::Char(c));
        }
        if self.has_op(SynOp::ESC_OCTAL3) {
            self.p = digit_start;
            let code = self.scan_number(8, 3)?.unwrap_or(0);
            return Ok(match self.code_or_raw(code) {
                Esc::Code(code) => Token::Char(code),
                Esc::Raw(byte) => Token::RawByte(byte),
            });
        }
        Ok(Token::Char(c))
    }

    // === Character classes ===

    fn class_contains_close_later(&self) -> bool {
        self.pat[self.p + 1..].contains(&b']')
    }

    /// `[:name:]` at the cursor (which sits on the '['). `Ok(None)` when
    /// this is not a POSIX bracket.
    fn prs_posix_bracket(&mut self) -> Result<Option<CtypeNode>, i32> {
        let rest = &self.pat[self.p..];
        if rest.len() < 2 || rest[1] != b':' {
            return Ok(None);
        }
        let Some(close) = rest[2..].windows(2).position(|w| w == b":]").map(|i| i + 2) else {
            return Ok(None);
        };
        let mut name = &rest[2..close];
        let mut not = false;
        if let Some(n) = name.strip_prefix(b"^") {
            not = true;
            name = n;
        }
        if name.len() > 20 || !name.iter().all(|b| b.is_ascii_alphabetic()) {
            return Ok(None);
        }
        let Some(ctype) = onigenc_minimum_property_name_to_ctype(name)
            .filter(|&t| t != ONIGENC_CTYPE_NEWLINE)
        else {
            return Err(ONIGERR_INVALID_POSIX_BRACKET_TYPE);
        };
        self.p += close + 2;
        Ok(Some(CtypeNode {
            ctype,
            not,
            ascii: self.opt(ONIG_OPTION_POSIX_IS_ASCII),
        }))
    }

    fn fetch_cc_item(&mut self) -> Result<CcItem, i32> {
        let Some(b) = self.peek_byte() else {
            return Err(ONIGERR_PREMATURE_END_OF_CHAR_CLASS);
        };
        match b {
            b']' => {
                self.p += 1;
                return Ok(CcItem::Close);
            }
            b'[' => {
                if self.has_op(SynOp::POSIX_BRACKET) {
                    if let Some(ct) = self.prs_posix_bracket()? {
                        return Ok(CcItem::CType(ct));
                    }
                }
                if self.has_op2(SynOp2::CCLASS_SET_OP) {
                    self.p += 1;
                    return Ok(CcItem::Class(self.prs_cc()?));
                }
            }
            b'&' if self.has_op2(SynOp2::CCLASS_SET_OP) && self.peek_byte_at(1) == Some(b'&') => {
                self.p += 2;
                return Ok(CcItem::And);
            }
            b'\\' if self.has_bv(SynBehavior::BACKSLASH_ESCAPE_IN_CC) => {
                self.p += 1;
                let Some(c) = self.fetch_code() else {
                    return Err(ONIGERR_PREMATURE_END_OF_CHAR_CLASS);
                };
                if let Ok(e) = u8::try_from(c) {
                    if let Some(ct) = self.ctype_for_escape(e) {
                        return Ok(CcItem::CType(ct));
                    }
                    if (e == b'p' || e == b'P')
                        && self.has_op2(SynOp2::ESC_P_BRACE_CHAR_PROPERTY)
                        && self.peek_is(b'{')
                    {
                        return Ok(CcItem::CType(self.prs_char_property(e == b'P')?));
                    }
                }
                return match self.scan_code_escape(c, true)? {
                    Some(Esc::Code(code)) => Ok(CcItem::Char(code)),
                    Some(Esc::Raw(byte)) => self.merge_raw_bytes(byte).map(CcItem::Char),
                    None => Ok(CcItem::Char(c)),
                };
            }
            _ => {}
        }
        match self.fetch_code() {
            Some(c) => Ok(CcItem::Char(c)),
            None => Err(ONIGERR_PREMATURE_END_OF_CHAR_CLASS),
        }
    }

    /// Join `\xHH` escapes that spell one multibyte character.
    fn merge_raw_bytes(&mut self, first: u8) -> Result<OnigCodePoint, i32> {
        let enc = self.env.enc;
        let after_first = self.p;
        let mut buf = vec![first];
        while buf.len() < enc.max_enc_len() {
            if !self.peek_is(b'\\') {
                break;
            }
            self.p += 1;
            let Some(c) = self.fetch_code() else {
                break;
            };
            match self.scan_code_escape(c, true)? {
                Some(Esc::Raw(byte)) => buf.push(byte),
                _ => break,
            }
            if enc.mbc_enc_len(&buf) == buf.len() {
                return Ok(enc.mbc_to_code(&buf));
            }
        }
        self.p = after_first;
        Ok(first as OnigCodePoint)
    }

    /// Parse a bracket class. The cursor is just past the '['.
    fn prs_cc(&mut self) -> Result<CClassNode, i32> {
        self.enter_depth()?;
        let mut cc = CClassNode::new();
        cc.ignorecase = self.env.ignorecase();
        if self.peek_is(b'^') {
            self.p += 1;
            cc.not = true;
        }

        let mut terms: Vec<CClassSet> = Vec::new();
        let mut set = CClassSet::default();

        if self.peek_is(b']') {
            if self.class_contains_close_later() {
                self.p += 1;
                set.add_code(b']' as OnigCodePoint);
            } else {
                return Err(ONIGERR_EMPTY_CHAR_CLASS);
            }
        }

        loop {
            match self.fetch_cc_item()? {
                CcItem::Close => break,
                CcItem::Char(from) => {
                    let is_range = self.peek_is(b'-')
                        && self.peek_byte_at(1).is_some_and(|b| b != b']');
                    if !is_range {
                        set.add_code(from);
                        continue;
                    }
                    self.p += 1;
                    let to = match self.fetch_cc_item()? {
                        CcItem::Char(to) => to,
                        CcItem::CType(_) | CcItem::Class(_) | CcItem::And => {
                            return Err(ONIGERR_CHAR_CLASS_VALUE_AT_END_OF_RANGE);
                        }
                        CcItem::Close => return Err(ONIGERR_PREMATURE_END_OF_CHAR_CLASS),
                    };
                    if from > to {
                        if !self.has_bv(SynBehavior::ALLOW_EMPTY_RANGE_IN_CC) {
                            return Err(ONIGERR_EMPTY_RANGE_IN_CHAR_CLASS);
                        }
                    } else {
                        set.add_range(from, to);
                    }
                    if self.peek_is(b'-')
                        && self.peek_byte_at(1).is_some_and(|b| b != b']')
                        && !self.has_bv(SynBehavior::ALLOW_DOUBLE_RANGE_OP_IN_CC)
                    {
                        return Err(ONIGERR_UNMATCHED_RANGE_SPECIFIER_IN_CHAR_CLASS);
                    }
                }
                CcItem::CType(ct) => set.ctypes.push(ct),
                CcItem::Class(sub) => set.subs.push(sub),
                CcItem::And => {
                    let done = std::mem::take(&mut set);
                    if !done.is_empty() {
                        terms.push(done);
                    }
                }
            }
        }
        if !set.is_empty() || terms.is_empty() {
            terms.push(set);
        }

        if cc.not && self.has_bv(SynBehavior::NOT_NEWLINE_IN_NEGATIVE_CC) {
            for t in &mut terms {
                t.add_code(NEWLINE_CODE);
            }
        }
        cc.terms = terms;
        self.leave_depth();
        Ok(cc)
    }

    // === Groups ===

    fn prs_options(&mut self) -> Result<Bag, i32> {
        let syn = self.syn();
        let mut options = self.env.options;
        let mut neg = false;
        loop {
            let Some(c) = self.fetch_code() else {
                return Err(ONIGERR_END_PATTERN_IN_GROUP);
            };
            let Ok(b) = u8::try_from(c) else {
                return Err(ONIGERR_UNDEFINED_GROUP_OPTION);
            };
            let perl = syn.has_op2(SynOp2::OPTION_PERL);
            let ruby = syn.has_op2(SynOp2::OPTION_RUBY) || syn.has_op2(SynOp2::OPTION_ONIGURUMA);
            let onig = syn.has_op2(SynOp2::OPTION_ONIGURUMA);
            match b {
                b'-' => neg = true,
                b'i' => options.set(ONIG_OPTION_IGNORECASE, !neg),
                b'x' => options.set(ONIG_OPTION_EXTEND, !neg),
                b's' if perl => options.set(ONIG_OPTION_MULTILINE, !neg),
                b'm' if perl => options.set(ONIG_OPTION_SINGLELINE, neg),
                b'm' if ruby => options.set(ONIG_OPTION_MULTILINE, !neg),
                b'a' if onig => {
                    let ascii = ONIG_OPTION_WORD_IS_ASCII
                        | ONIG_OPTION_DIGIT_IS_ASCII
                        | ONIG_OPTION_SPACE_IS_ASCII
                        | ONIG_OPTION_POSIX_IS_ASCII;
                    options.set(ascii, !neg);
                }
                b'W' if onig => options.set(ONIG_OPTION_WORD_IS_ASCII, !neg),
                b'D' if onig => options.set(ONIG_OPTION_DIGIT_IS_ASCII, !neg),
                b'S' if onig => options.set(ONIG_OPTION_SPACE_IS_ASCII, !neg),
                b'P' if onig => options.set(ONIG_OPTION_POSIX_IS_ASCII, !neg),
                b')' => {
                    self.env.options = options;
                    return Ok(Bag::IsolatedOption);
                }
                b':' => {
                    let saved = self.env.options;
                    self.env.options = options;
                    let body = self.prs_group_body();
                    self.env.options = saved;
                    return body.map(Bag::Node);
                }
                _ => return Err(ONIGERR_UNDEFINED_GROUP_OPTION),
            }
        }
    }

    /// Parse up to and including the closing parenthesis.
    fn prs_group_body(&mut self) -> Result<Node, i32> {
        let saved = self.env.options;
        self.group_depth += 1;
        let mut tok = self.fetch_token()?;
        let body = self.prs_alts(&mut tok, true);
        self.group_depth -= 1;
        self.env.options = saved;
        body
    }

    fn prs_named_group(&mut self, term: u8) -> Result<Node, i32> {
        let name = self.fetch_name(term, false)?;
        let regnum = self.env.add_mem_entry(true)?;
        let allow = self.has_bv(SynBehavior::ALLOW_MULTIPLEX_DEFINITION_NAME);
        if let Err(e) = self.env.name_table.add(&name, regnum, allow) {
            self.env.error_par = name;
            return Err(e);
        }
        let body = self.prs_group_body()?;
        Ok(Node::memory(regnum, true, body))
    }

    /// Parse a group; the cursor is just past the '('.
    fn prs_bag(&mut self) -> Result<Bag, i32> {
        if !(self.peek_is(b'?') && self.has_op2(SynOp2::QMARK_GROUP_EFFECT)) {
            if self.opt(ONIG_OPTION_DONT_CAPTURE_GROUP) {
                return self.prs_group_body().map(Bag::Node);
            }
            let regnum = self.env.add_mem_entry(false)?;
            let body = self.prs_group_body()?;
            return Ok(Bag::Node(Node::memory(regnum, false, body)));
        }

        self.p += 1;
        let Some(c) = self.fetch_code() else {
            return Err(ONIGERR_END_PATTERN_IN_GROUP);
        };
        let Ok(b) = u8::try_from(c) else {
            return Err(ONIGERR_UNDEFINED_GROUP_OPTION);
        };
        let node = match b {
            b':' => self.prs_group_body()?,
            b'=' => Node::look(false, false, self.prs_group_body()?),
            b'!' => Node::look(false, true, self.prs_group_body()?),
            b'>' => Node::atomic(self.prs_group_body()?),
            b'<' => match self.peek_byte() {
                Some(b'=') => {
                    self.p += 1;
                    Node::look(true, false, self.prs_group_body()?)
                }
                Some(b'!') => {
                    self.p += 1;
                    Node::look(true, true, self.prs_group_body()?)
                }
                _ if self.has_op2(SynOp2::QMARK_LT_NAMED_GROUP) => self.prs_named_group(b'>')?,
                None => return Err(ONIGERR_END_PATTERN_WITH_UNMATCHED_PARENTHESIS),
                _ => return Err(ONIGERR_UNDEFINED_GROUP_OPTION),
            },
            b'\'' if self.has_op2(SynOp2::QMARK_LT_NAMED_GROUP) => self.prs_named_group(b'\'')?,
            b'P' if self.has_op2(SynOp2::QMARK_CAPITAL_P_NAME) => match self.peek_byte() {
                Some(b'<') => {
                    self.p += 1;
                    self.prs_named_group(b'>')?
                }
                Some(b'=') => {
                    self.p += 1;
                    let name = self.fetch_name(b')', true)?;
                    Node::BackRef(self.backref_by_name(name)?)
                }
                Some(b'>') => return Err(ONIG_NO_SUPPORT_CONFIG),
                _ => return Err(ONIGERR_UNDEFINED_GROUP_OPTION),
            },
            b'(' if self.has_op2(SynOp2::QMARK_LPAREN_IF_ELSE) => {
                return Err(ONIG_NO_SUPPORT_CONFIG);
            }
            b'~' if self.has_op2(SynOp2::QMARK_TILDE_ABSENT_GROUP) => {
                return Err(ONIG_NO_SUPPORT_CONFIG);
            }
            b'-' | b'i' | b'm' | b's' | b'x' | b'a' | b'W' | b'D' | b'S' | b'P'
                if self.has_op2(SynOp2::OPTION_PERL)
                    || self.has_op2(SynOp2::OPTION_RUBY)
                    || self.has_op2(SynOp2::OPTION_ONIGURUMA) =>
            {
                self.p -= 1;
                return self.prs_options();
            }
            _ => return Err(ONIGERR_UNDEFINED_GROUP_OPTION),
        };
        Ok(Bag::Node(node))
    }

    // === Expressions ===

    fn char_node(&self, code: OnigCodePoint) -> Result<Node, i32> {
        let mut bytes = Vec::with_capacity(4);
        onigenc_code_to_mbc_vec(self.env.enc, code, &mut bytes)?;
        Ok(Node::str(bytes, self.env.ignorecase()))
    }

    fn prs_exp(&mut self, tok: &mut Token) -> Result<Exp, i32> {
        let current = std::mem::replace(tok, Token::Eot);
        let mut node = match current {
            Token::Char(c) => self.char_node(c)?,
            Token::RawByte(b) => {
                let mut bytes = vec![b];
                loop {
                    match self.fetch_token()? {
                        Token::RawByte(b) => bytes.push(b),
                        next => {
                            *tok = next;
                            break;
                        }
                    }
                }
                return self.prs_quantifiers(Node::str(bytes, self.env.ignorecase()), tok);
            }
            Token::AnyChar => Node::AnyChar {
                multiline: self.opt(ONIG_OPTION_MULTILINE),
            },
            Token::CharType(ct) => Node::CType(ct),
            Token::Anchor(a) => {
                *tok = self.fetch_token()?;
                if let Token::Repeat(r) = *tok {
                    if !self.has_bv(SynBehavior::CONTEXT_INDEP_REPEAT_OPS) {
                        *tok = Token::Char(r.op_char as OnigCodePoint);
                    } else {
                        return Err(ONIGERR_TARGET_OF_REPEAT_OPERATOR_INVALID);
                    }
                }
                return Ok(Exp::Node(Node::Anchor(a)));
            }
            Token::BackRef(br) => Node::BackRef(br),
            Token::CcOpen => Node::CClass(Box::new(self.prs_cc()?)),
            Token::SubexpOpen => match self.prs_bag()? {
                Bag::Node(n) => n,
                Bag::IsolatedOption => {
                    *tok = self.fetch_token()?;
                    return Ok(Exp::IsolatedOption);
                }
            },
            Token::Repeat(r) => {
                if !self.has_bv(SynBehavior::CONTEXT_INDEP_REPEAT_OPS) {
                    self.char_node(r.op_char as OnigCodePoint)?
                } else if self.has_bv(SynBehavior::CONTEXT_INVALID_REPEAT_OPS) {
                    return Err(ONIGERR_TARGET_OF_REPEAT_OPERATOR_NOT_SPECIFIED);
                } else {
                    Node::Empty
                }
            }
            Token::Alt | Token::SubexpClose | Token::Eot => return Err(ONIGERR_PARSER_BUG),
        };
        if let Node::Look(_) = node {
            *tok = self.fetch_token()?;
            if let Token::Repeat(_) = tok {
                return Err(ONIGERR_TARGET_OF_REPEAT_OPERATOR_INVALID);
            }
            return Ok(Exp::Node(node));
        }
        *tok = self.fetch_token()?;
        node = match self.prs_quantifiers(node, tok)? {
            Exp::Node(n) => n,
            Exp::IsolatedOption => return Err(ONIGERR_PARSER_BUG),
        };
        Ok(Exp::Node(node))
    }

    fn prs_quantifiers(&mut self, mut node: Node, tok: &mut Token) -> Result<Exp, i32> {
        while let Token::Repeat(r) = *tok {
            let q = Node::quant(node, r.lower, r.upper, r.greedy);
            node = if r.possessive { Node::atomic(q) } else { q };
            *tok = self.fetch_token()?;
        }
        Ok(Exp::Node(node))
    }

    fn prs_branch(&mut self, tok: &mut Token, in_group: bool) -> Result<Node, i32> {
        let mut nodes: Vec<Node> = Vec::new();
        loop {
            match tok {
                Token::Eot | Token::Alt | Token::SubexpClose => break,
                _ => {}
            }
            match self.prs_exp(tok)? {
                Exp::Node(n) => push_merge(&mut nodes, n),
                Exp::IsolatedOption => {
                    if self.has_bv(SynBehavior::ISOLATED_OPTION_CONTINUE_BRANCH) {
                        continue;
                    }
                    // the rest of the enclosing group, alternatives included
                    let rest = self.prs_alts(tok, in_group)?;
                    nodes.push(rest);
                    break;
                }
            }
        }
        Ok(Node::list(nodes))
    }

    fn prs_alts(&mut self, tok: &mut Token, in_group: bool) -> Result<Node, i32> {
        self.enter_depth()?;
        let mut branches = vec![self.prs_branch(tok, in_group)?];
        loop {
            match tok {
                Token::Alt => {
                    *tok = self.fetch_token()?;
                    branches.push(self.prs_branch(tok, in_group)?);
                }
                Token::SubexpClose => {
                    if in_group {
                        break;
                    }
                    return Err(ONIGERR_UNMATCHED_CLOSE_PARENTHESIS);
                }
                Token::Eot => {
                    if in_group {
                        return Err(ONIGERR_END_PATTERN_WITH_UNMATCHED_PARENTHESIS);
                    }
                    break;
                }
                _ => return Err(ONIGERR_PARSER_BUG),
            }
        }
        self.leave_depth();
        Ok(Node::alt(branches))
    }
}

fn push_merge(nodes: &mut Vec<Node>, n: Node) {
    if let (Some(Node::Str(last)), Node::Str(s)) = (nodes.last_mut(), &n) {
        if last.ignorecase == s.ignorecase {
            last.bytes.extend_from_slice(&s.bytes);
            return;
        }
    }
    match n {
        Node::Empty => {}
        n => nodes.push(n),
    }
}

// === Capture renumbering ===

/// Drop capture from unnamed groups and renumber named ones 1..N in
/// order of appearance.
fn disable_noname_group_capture(node: Node, map: &[usize]) -> Node {
    match node {
        Node::Bag(bag) => {
            let BagNode { kind, body } = *bag;
            let body = disable_noname_group_capture(body, map);
            match kind {
                BagType::Memory { regnum, named: true } => Node::memory(map[regnum], true, body),
                BagType::Memory { named: false, .. } => body,
                BagType::StopBacktrack => Node::atomic(body),
            }
        }
        Node::BackRef(mut br) => {
            for g in br.groups.iter_mut() {
                *g = map[*g];
            }
            Node::BackRef(br)
        }
        Node::Quant(mut q) => {
            q.body = disable_noname_group_capture(std::mem::replace(&mut q.body, Node::Empty), map);
            Node::Quant(q)
        }
        Node::Look(mut l) => {
            l.body = disable_noname_group_capture(std::mem::replace(&mut l.body, Node::Empty), map);
            Node::Look(l)
        }
        Node::List(v) => Node::List(
            v.into_iter()
                .map(|n| disable_noname_group_capture(n, map))
                .collect(),
        ),
        Node::Alt(v) => Node::Alt(
            v.into_iter()
                .map(|n| disable_noname_group_capture(n, map))
                .collect(),
        ),
        other => other,
    }
}

fn numbered_ref_checks(root: Node, env: &mut ParseEnv) -> Result<Node, i32> {
    if env.backref_max > env.num_mem {
        return Err(ONIGERR_INVALID_BACKREF);
    }

    let num_named = env.num_named();
    let capture_only_named = env
        .syntax
        .has_behavior(SynBehavior::CAPTURE_ONLY_NAMED_GROUP)
        && !env.options.contains(ONIG_OPTION_CAPTURE_GROUP);
    if num_named == 0 || !capture_only_named {
        return Ok(root);
    }
    if env.has_numbered_backref {
        return Err(ONIGERR_NUMBERED_BACKREF_OR_CALL_NOT_ALLOWED);
    }
    if num_named == env.num_mem {
        return Ok(root);
    }

    let mut map = vec![0usize; env.num_mem + 1];
    let mut next = 0;
    for (old, &named) in env.mem_named.iter().enumerate().skip(1) {
        if named {
            next += 1;
            map[old] = next;
        }
    }
    let root = disable_noname_group_capture(root, &map);
    env.name_table.renumber(&map);
    env.num_mem = num_named;
    env.mem_named = vec![true; num_named + 1];
    env.mem_named[0] = false;
    Ok(root)
}

/// Parse `pattern` into a tree. On failure `env.error_offset` holds the
/// byte offset where parsing stopped.
pub fn onig_parse_tree(pattern: &[u8], env: &mut ParseEnv) -> Result<Node, i32> {
    let mut parser = Parser::new(pattern, env);
    let r = parser
        .fetch_token()
        .and_then(|mut tok| parser.prs_alts(&mut tok, false));
    let offset = parser.p;
    match r {
        Ok(root) => numbered_ref_checks(root, env),
        Err(e) => {
            env.error_offset = offset;
            Err(e)
        }
    }
}
