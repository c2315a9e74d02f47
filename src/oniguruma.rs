// oniguruma.rs - Public types and constants.
// Option flags, error codes, syntax flags, capture region, error info.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::error::RegexError;

// === Basic types ===
pub type OnigCodePoint = u32;
pub type OnigUChar = u8;
pub type OnigCtype = u32;

// === Character Types ===
pub const ONIGENC_CTYPE_NEWLINE: OnigCtype = 0;
pub const ONIGENC_CTYPE_ALPHA: OnigCtype = 1;
pub const ONIGENC_CTYPE_BLANK: OnigCtype = 2;
pub const ONIGENC_CTYPE_CNTRL: OnigCtype = 3;
pub const ONIGENC_CTYPE_DIGIT: OnigCtype = 4;
pub const ONIGENC_CTYPE_GRAPH: OnigCtype = 5;
pub const ONIGENC_CTYPE_LOWER: OnigCtype = 6;
pub const ONIGENC_CTYPE_PRINT: OnigCtype = 7;
pub const ONIGENC_CTYPE_PUNCT: OnigCtype = 8;
pub const ONIGENC_CTYPE_SPACE: OnigCtype = 9;
pub const ONIGENC_CTYPE_UPPER: OnigCtype = 10;
pub const ONIGENC_CTYPE_XDIGIT: OnigCtype = 11;
pub const ONIGENC_CTYPE_WORD: OnigCtype = 12;
pub const ONIGENC_CTYPE_ALNUM: OnigCtype = 13;
pub const ONIGENC_CTYPE_ASCII: OnigCtype = 14;
pub const ONIGENC_MAX_STD_CTYPE: OnigCtype = ONIGENC_CTYPE_ASCII;

// === Config Parameters ===
pub const ONIG_NREGION: usize = 10;
pub const ONIG_MAX_CAPTURE_NUM: usize = 32767;
pub const ONIG_MAX_BACKREF_NUM: usize = 1000;
pub const ONIG_MAX_REPEAT_NUM: u32 = 100000;
pub const ONIG_MAX_ERROR_MESSAGE_LEN: usize = 90;

// === Option Flags ===
bitflags! {
    /// Compile-time and search-time option bits.
    ///
    /// The bit layout follows Oniguruma's `ONIG_OPTION_*` values so raw
    /// option words can be passed through unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OnigOptionType: u32 {
        // compile time
        const IGNORECASE = 1;
        const EXTEND = 1 << 1;
        const MULTILINE = 1 << 2;
        const SINGLELINE = 1 << 3;
        const FIND_LONGEST = 1 << 4;
        const FIND_NOT_EMPTY = 1 << 5;
        const NEGATE_SINGLELINE = 1 << 6;
        const DONT_CAPTURE_GROUP = 1 << 7;
        const CAPTURE_GROUP = 1 << 8;
        // search time
        const NOTBOL = 1 << 9;
        const NOTEOL = 1 << 10;
        const CHECK_VALIDITY_OF_STRING = 1 << 12;
        // compile time (continued)
        const IGNORECASE_IS_ASCII = 1 << 15;
        const WORD_IS_ASCII = 1 << 16;
        const DIGIT_IS_ASCII = 1 << 17;
        const SPACE_IS_ASCII = 1 << 18;
        const POSIX_IS_ASCII = 1 << 19;
        // search time (continued)
        const NOT_BEGIN_STRING = 1 << 22;
        const NOT_END_STRING = 1 << 23;
        const NOT_BEGIN_POSITION = 1 << 24;
        const MATCH_WHOLE_STRING = 1 << 26;
    }
}

pub const ONIG_OPTION_NONE: OnigOptionType = OnigOptionType::empty();
pub const ONIG_OPTION_DEFAULT: OnigOptionType = ONIG_OPTION_NONE;
pub const ONIG_OPTION_IGNORECASE: OnigOptionType = OnigOptionType::IGNORECASE;
pub const ONIG_OPTION_EXTEND: OnigOptionType = OnigOptionType::EXTEND;
pub const ONIG_OPTION_MULTILINE: OnigOptionType = OnigOptionType::MULTILINE;
pub const ONIG_OPTION_SINGLELINE: OnigOptionType = OnigOptionType::SINGLELINE;
pub const ONIG_OPTION_FIND_LONGEST: OnigOptionType = OnigOptionType::FIND_LONGEST;
pub const ONIG_OPTION_FIND_NOT_EMPTY: OnigOptionType = OnigOptionType::FIND_NOT_EMPTY;
pub const ONIG_OPTION_NEGATE_SINGLELINE: OnigOptionType = OnigOptionType::NEGATE_SINGLELINE;
pub const ONIG_OPTION_DONT_CAPTURE_GROUP: OnigOptionType = OnigOptionType::DONT_CAPTURE_GROUP;
pub const ONIG_OPTION_CAPTURE_GROUP: OnigOptionType = OnigOptionType::CAPTURE_GROUP;
pub const ONIG_OPTION_NOTBOL: OnigOptionType = OnigOptionType::NOTBOL;
pub const ONIG_OPTION_NOTEOL: OnigOptionType = OnigOptionType::NOTEOL;
pub const ONIG_OPTION_CHECK_VALIDITY_OF_STRING: OnigOptionType =
    OnigOptionType::CHECK_VALIDITY_OF_STRING;
pub const ONIG_OPTION_IGNORECASE_IS_ASCII: OnigOptionType = OnigOptionType::IGNORECASE_IS_ASCII;
pub const ONIG_OPTION_WORD_IS_ASCII: OnigOptionType = OnigOptionType::WORD_IS_ASCII;
pub const ONIG_OPTION_DIGIT_IS_ASCII: OnigOptionType = OnigOptionType::DIGIT_IS_ASCII;
pub const ONIG_OPTION_SPACE_IS_ASCII: OnigOptionType = OnigOptionType::SPACE_IS_ASCII;
pub const ONIG_OPTION_POSIX_IS_ASCII: OnigOptionType = OnigOptionType::POSIX_IS_ASCII;
pub const ONIG_OPTION_NOT_BEGIN_STRING: OnigOptionType = OnigOptionType::NOT_BEGIN_STRING;
pub const ONIG_OPTION_NOT_END_STRING: OnigOptionType = OnigOptionType::NOT_END_STRING;
pub const ONIG_OPTION_NOT_BEGIN_POSITION: OnigOptionType = OnigOptionType::NOT_BEGIN_POSITION;
pub const ONIG_OPTION_MATCH_WHOLE_STRING: OnigOptionType = OnigOptionType::MATCH_WHOLE_STRING;

// === Syntax Type ===

bitflags! {
    /// Operators recognised by a syntax (first operator word).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SynOp: u32 {
        const DOT_ANYCHAR = 1 << 1;
        const ASTERISK_ZERO_INF = 1 << 2;
        const ESC_ASTERISK_ZERO_INF = 1 << 3;
        const PLUS_ONE_INF = 1 << 4;
        const ESC_PLUS_ONE_INF = 1 << 5;
        const QMARK_ZERO_ONE = 1 << 6;
        const ESC_QMARK_ZERO_ONE = 1 << 7;
        const BRACE_INTERVAL = 1 << 8;
        const ESC_BRACE_INTERVAL = 1 << 9;
        const VBAR_ALT = 1 << 10;
        const ESC_VBAR_ALT = 1 << 11;
        const LPAREN_SUBEXP = 1 << 12;
        const ESC_LPAREN_SUBEXP = 1 << 13;
        const ESC_AZ_BUF_ANCHOR = 1 << 14;
        const ESC_CAPITAL_G_BEGIN_ANCHOR = 1 << 15;
        const DECIMAL_BACKREF = 1 << 16;
        const BRACKET_CC = 1 << 17;
        const ESC_W_WORD = 1 << 18;
        const ESC_LTGT_WORD_BEGIN_END = 1 << 19;
        const ESC_B_WORD_BOUND = 1 << 20;
        const ESC_S_WHITE_SPACE = 1 << 21;
        const ESC_D_DIGIT = 1 << 22;
        const LINE_ANCHOR = 1 << 23;
        const POSIX_BRACKET = 1 << 24;
        const QMARK_NON_GREEDY = 1 << 25;
        const ESC_CONTROL_CHARS = 1 << 26;
        const ESC_C_CONTROL = 1 << 27;
        const ESC_OCTAL3 = 1 << 28;
        const ESC_X_HEX2 = 1 << 29;
        const ESC_X_BRACE_HEX8 = 1 << 30;
        const ESC_O_BRACE_OCTAL = 1 << 31;
    }
}

bitflags! {
    /// Operators recognised by a syntax (second operator word).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SynOp2: u32 {
        const ESC_CAPITAL_Q_QUOTE = 1 << 0;
        const QMARK_GROUP_EFFECT = 1 << 1;
        const OPTION_PERL = 1 << 2;
        const OPTION_RUBY = 1 << 3;
        const PLUS_POSSESSIVE_REPEAT = 1 << 4;
        const PLUS_POSSESSIVE_INTERVAL = 1 << 5;
        const CCLASS_SET_OP = 1 << 6;
        const QMARK_LT_NAMED_GROUP = 1 << 7;
        const ESC_K_NAMED_BACKREF = 1 << 8;
        const ESC_G_SUBEXP_CALL = 1 << 9;
        const ESC_V_VTAB = 1 << 13;
        const ESC_U_HEX4 = 1 << 14;
        const ESC_GNU_BUF_ANCHOR = 1 << 15;
        const ESC_P_BRACE_CHAR_PROPERTY = 1 << 16;
        const ESC_P_BRACE_CIRCUMFLEX_NOT = 1 << 17;
        const ESC_H_XDIGIT = 1 << 19;
        const INEFFECTIVE_ESCAPE = 1 << 20;
        const QMARK_LPAREN_IF_ELSE = 1 << 21;
        const QMARK_TILDE_ABSENT_GROUP = 1 << 25;
        const OPTION_ONIGURUMA = 1 << 30;
        const QMARK_CAPITAL_P_NAME = 1 << 31;
    }
}

bitflags! {
    /// Syntax behaviour switches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SynBehavior: u32 {
        const CONTEXT_INDEP_REPEAT_OPS = 1 << 0;
        const CONTEXT_INVALID_REPEAT_OPS = 1 << 1;
        const ALLOW_UNMATCHED_CLOSE_SUBEXP = 1 << 2;
        const ALLOW_INVALID_INTERVAL = 1 << 3;
        const ALLOW_INTERVAL_LOW_ABBREV = 1 << 4;
        const STRICT_CHECK_BACKREF = 1 << 5;
        const DIFFERENT_LEN_ALT_LOOK_BEHIND = 1 << 6;
        const CAPTURE_ONLY_NAMED_GROUP = 1 << 7;
        const ALLOW_MULTIPLEX_DEFINITION_NAME = 1 << 8;
        const FIXED_INTERVAL_IS_GREEDY_ONLY = 1 << 9;
        const ISOLATED_OPTION_CONTINUE_BRANCH = 1 << 10;
        // in char class [...]
        const NOT_NEWLINE_IN_NEGATIVE_CC = 1 << 20;
        const BACKSLASH_ESCAPE_IN_CC = 1 << 21;
        const ALLOW_EMPTY_RANGE_IN_CC = 1 << 22;
        const ALLOW_DOUBLE_RANGE_OP_IN_CC = 1 << 23;
        const CONTEXT_INDEP_ANCHORS = 1 << 31;
    }
}

/// A regex dialect: which operators exist and how edge cases behave.
#[derive(Clone, Debug)]
pub struct OnigSyntaxType {
    pub name: &'static str,
    pub op: SynOp,
    pub op2: SynOp2,
    pub behavior: SynBehavior,
    pub options: OnigOptionType,
}

impl OnigSyntaxType {
    #[inline]
    pub fn has_op(&self, op: SynOp) -> bool {
        self.op.contains(op)
    }

    #[inline]
    pub fn has_op2(&self, op2: SynOp2) -> bool {
        self.op2.contains(op2)
    }

    #[inline]
    pub fn has_behavior(&self, bv: SynBehavior) -> bool {
        self.behavior.contains(bv)
    }
}

// === Error Codes ===
// normal return
pub const ONIG_NORMAL: i32 = 0;
pub const ONIG_MISMATCH: i32 = -1;
pub const ONIG_NO_SUPPORT_CONFIG: i32 = -2;

// internal error
pub const ONIGERR_MEMORY: i32 = -5;
pub const ONIGERR_TYPE_BUG: i32 = -6;
pub const ONIGERR_PARSER_BUG: i32 = -11;
pub const ONIGERR_STACK_BUG: i32 = -12;
pub const ONIGERR_UNDEFINED_BYTECODE: i32 = -13;
pub const ONIGERR_UNEXPECTED_BYTECODE: i32 = -14;
pub const ONIGERR_MATCH_STACK_LIMIT_OVER: i32 = -15;
pub const ONIGERR_PARSE_DEPTH_LIMIT_OVER: i32 = -16;
pub const ONIGERR_RETRY_LIMIT_IN_MATCH_OVER: i32 = -17;
pub const ONIGERR_RETRY_LIMIT_IN_SEARCH_OVER: i32 = -18;
pub const ONIGERR_DEFAULT_ENCODING_IS_NOT_SET: i32 = -21;
pub const ONIGERR_SPECIFIED_ENCODING_CANT_CONVERT_TO_WIDE_CHAR: i32 = -22;

// general error
pub const ONIGERR_INVALID_ARGUMENT: i32 = -30;

// syntax error
pub const ONIGERR_END_PATTERN_AT_LEFT_BRACE: i32 = -100;
pub const ONIGERR_END_PATTERN_AT_LEFT_BRACKET: i32 = -101;
pub const ONIGERR_EMPTY_CHAR_CLASS: i32 = -102;
pub const ONIGERR_PREMATURE_END_OF_CHAR_CLASS: i32 = -103;
pub const ONIGERR_END_PATTERN_AT_ESCAPE: i32 = -104;
pub const ONIGERR_END_PATTERN_AT_META: i32 = -105;
pub const ONIGERR_END_PATTERN_AT_CONTROL: i32 = -106;
pub const ONIGERR_META_CODE_SYNTAX: i32 = -108;
pub const ONIGERR_CONTROL_CODE_SYNTAX: i32 = -109;
pub const ONIGERR_CHAR_CLASS_VALUE_AT_END_OF_RANGE: i32 = -110;
pub const ONIGERR_CHAR_CLASS_VALUE_AT_START_OF_RANGE: i32 = -111;
pub const ONIGERR_UNMATCHED_RANGE_SPECIFIER_IN_CHAR_CLASS: i32 = -112;
pub const ONIGERR_TARGET_OF_REPEAT_OPERATOR_NOT_SPECIFIED: i32 = -113;
pub const ONIGERR_TARGET_OF_REPEAT_OPERATOR_INVALID: i32 = -114;
pub const ONIGERR_NESTED_REPEAT_OPERATOR: i32 = -115;
pub const ONIGERR_UNMATCHED_CLOSE_PARENTHESIS: i32 = -116;
pub const ONIGERR_END_PATTERN_WITH_UNMATCHED_PARENTHESIS: i32 = -117;
pub const ONIGERR_END_PATTERN_IN_GROUP: i32 = -118;
pub const ONIGERR_UNDEFINED_GROUP_OPTION: i32 = -119;
pub const ONIGERR_INVALID_GROUP_OPTION: i32 = -120;
pub const ONIGERR_INVALID_POSIX_BRACKET_TYPE: i32 = -121;
pub const ONIGERR_INVALID_LOOK_BEHIND_PATTERN: i32 = -122;
pub const ONIGERR_INVALID_REPEAT_RANGE_PATTERN: i32 = -123;

// values error (syntax error)
pub const ONIGERR_TOO_BIG_NUMBER: i32 = -200;
pub const ONIGERR_TOO_BIG_NUMBER_FOR_REPEAT_RANGE: i32 = -201;
pub const ONIGERR_UPPER_SMALLER_THAN_LOWER_IN_REPEAT_RANGE: i32 = -202;
pub const ONIGERR_EMPTY_RANGE_IN_CHAR_CLASS: i32 = -203;
pub const ONIGERR_TOO_BIG_BACKREF_NUMBER: i32 = -207;
pub const ONIGERR_INVALID_BACKREF: i32 = -208;
pub const ONIGERR_NUMBERED_BACKREF_OR_CALL_NOT_ALLOWED: i32 = -209;
pub const ONIGERR_TOO_MANY_CAPTURES: i32 = -210;
pub const ONIGERR_TOO_LONG_WIDE_CHAR_VALUE: i32 = -212;
pub const ONIGERR_EMPTY_GROUP_NAME: i32 = -214;
pub const ONIGERR_INVALID_GROUP_NAME: i32 = -215;
pub const ONIGERR_INVALID_CHAR_IN_GROUP_NAME: i32 = -216;
pub const ONIGERR_UNDEFINED_NAME_REFERENCE: i32 = -217;
pub const ONIGERR_UNDEFINED_GROUP_REFERENCE: i32 = -218;
pub const ONIGERR_MULTIPLEX_DEFINED_NAME: i32 = -219;
pub const ONIGERR_INVALID_CHAR_PROPERTY_NAME: i32 = -223;
pub const ONIGERR_INVALID_CODE_POINT_VALUE: i32 = -400;
pub const ONIGERR_INVALID_WIDE_CHAR_VALUE: i32 = -400;
pub const ONIGERR_TOO_BIG_WIDE_CHAR_VALUE: i32 = -401;
pub const ONIGERR_NOT_SUPPORTED_ENCODING_COMBINATION: i32 = -402;
pub const ONIGERR_INVALID_COMBINATION_OF_OPTIONS: i32 = -403;

#[inline]
pub fn onig_is_pattern_error(ecode: i32) -> bool {
    ecode <= -100 && ecode > -1000
}

// === Error Info ===

/// Diagnostic context attached to a compile failure.
///
/// `par` holds the offending name or property text for the error codes
/// whose message embeds it; `offset` is the pattern byte offset where the
/// parser stopped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OnigErrorInfo {
    pub par: Vec<u8>,
    pub offset: Option<usize>,
}

impl OnigErrorInfo {
    pub fn new() -> Self {
        Self::default()
    }
}

// === Search direction ===

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchDirection {
    /// Leftmost match: candidate starts scanned from 0 upward.
    Forward,
    /// Rightmost match: candidate starts scanned from the end downward.
    Backward,
}

// === Name table entry ===

/// One (name, group index) association of a compiled pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NameEntry {
    pub name: Vec<u8>,
    pub group: usize,
}

// === OnigRegion (match result) ===

pub const ONIG_REGION_NOTPOS: i32 = -1;

type RegionVec = SmallVec<[i32; ONIG_NREGION]>;

/// Start/end byte offsets of the whole match (index 0) and each capture
/// group (1..N). Unset pairs hold [`ONIG_REGION_NOTPOS`] in both slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnigRegion {
    beg: RegionVec,
    end: RegionVec,
}

impl OnigRegion {
    /// A region holding one unset pair for the whole match.
    pub fn new() -> Self {
        let mut beg = RegionVec::new();
        let mut end = RegionVec::new();
        beg.push(ONIG_REGION_NOTPOS);
        end.push(ONIG_REGION_NOTPOS);
        OnigRegion { beg, end }
    }

    /// Number of pairs, including the whole-match slot.
    pub fn num_regs(&self) -> usize {
        self.beg.len()
    }

    /// Pairs the region can hold without reallocating.
    pub fn allocated(&self) -> usize {
        self.beg.capacity().min(self.end.capacity())
    }

    /// Resize to exactly `n` pairs.
    ///
    /// New pairs are unset. On allocation failure the region is left
    /// exactly as it was and [`RegexError::Memory`] is returned.
    pub fn resize(&mut self, n: usize) -> Result<(), RegexError> {
        if n == 0 {
            return Err(RegexError::InvalidArgument);
        }
        if n == self.num_regs() {
            return Ok(());
        }
        if n < self.num_regs() {
            self.beg.truncate(n);
            self.end.truncate(n);
            return Ok(());
        }

        let mut beg = RegionVec::new();
        let mut end = RegionVec::new();
        beg.try_reserve_exact(n).map_err(|_| RegexError::Memory)?;
        end.try_reserve_exact(n).map_err(|_| RegexError::Memory)?;
        beg.extend_from_slice(&self.beg);
        end.extend_from_slice(&self.end);
        beg.resize(n, ONIG_REGION_NOTPOS);
        end.resize(n, ONIG_REGION_NOTPOS);
        self.beg = beg;
        self.end = end;
        Ok(())
    }

    /// Mark every pair as unset.
    pub fn clear(&mut self) {
        self.beg.iter_mut().for_each(|b| *b = ONIG_REGION_NOTPOS);
        self.end.iter_mut().for_each(|e| *e = ONIG_REGION_NOTPOS);
    }

    /// Store a pair, growing the region when `at` is past the end.
    pub fn set(&mut self, at: usize, beg: i32, end: i32) -> Result<(), RegexError> {
        if at >= self.num_regs() {
            self.resize(at + 1)?;
        }
        self.beg[at] = beg;
        self.end[at] = end;
        Ok(())
    }

    /// Overwrite this region with the contents of `from`.
    pub fn copy_from(&mut self, from: &OnigRegion) -> Result<(), RegexError> {
        self.resize(from.num_regs())?;
        self.beg.copy_from_slice(&from.beg);
        self.end.copy_from_slice(&from.end);
        Ok(())
    }

    #[inline]
    pub fn beg(&self, i: usize) -> i32 {
        self.beg.get(i).copied().unwrap_or(ONIG_REGION_NOTPOS)
    }

    #[inline]
    pub fn end(&self, i: usize) -> i32 {
        self.end.get(i).copied().unwrap_or(ONIG_REGION_NOTPOS)
    }

    #[inline]
    pub fn is_set(&self, i: usize) -> bool {
        self.beg(i) != ONIG_REGION_NOTPOS
    }

    /// The `(beg, end)` pair at `i` as offsets, or `None` when unset.
    pub fn span(&self, i: usize) -> Option<(usize, usize)> {
        if self.is_set(i) {
            Some((self.beg(i) as usize, self.end(i) as usize))
        } else {
            None
        }
    }

    /// Raw pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.beg.iter().copied().zip(self.end.iter().copied())
    }
}

impl Default for OnigRegion {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocate a fresh region (one unset pair).
pub fn onig_region_new() -> OnigRegion {
    OnigRegion::new()
}

/// Release a region. The region is consumed and cannot be used afterwards.
pub fn onig_region_free(region: OnigRegion) {
    drop(region);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_region_has_one_unset_pair() {
        let r = OnigRegion::new();
        assert_eq!(r.num_regs(), 1);
        assert_eq!(r.beg(0), ONIG_REGION_NOTPOS);
        assert_eq!(r.end(0), ONIG_REGION_NOTPOS);
        assert!(r.allocated() >= ONIG_NREGION);
    }

    #[test]
    fn resize_grows_with_unset_pairs() {
        let mut r = OnigRegion::new();
        r.set(0, 1, 4).unwrap();
        r.resize(3).unwrap();
        assert_eq!(r.num_regs(), 3);
        assert_eq!(r.span(0), Some((1, 4)));
        assert_eq!(r.span(1), None);
        assert_eq!(r.span(2), None);
    }

    #[test]
    fn resize_beyond_inline_capacity_keeps_content() {
        let mut r = OnigRegion::new();
        r.resize(4).unwrap();
        r.set(3, 7, 9).unwrap();
        r.resize(ONIG_NREGION * 4).unwrap();
        assert_eq!(r.num_regs(), ONIG_NREGION * 4);
        assert_eq!(r.span(3), Some((7, 9)));
        assert!(!r.is_set(ONIG_NREGION * 4 - 1));
    }

    #[test]
    fn resize_shrinks() {
        let mut r = OnigRegion::new();
        r.resize(5).unwrap();
        r.resize(2).unwrap();
        assert_eq!(r.num_regs(), 2);
    }

    #[test]
    fn resize_to_zero_is_rejected() {
        let mut r = OnigRegion::new();
        r.set(0, 0, 2).unwrap();
        assert_eq!(r.resize(0), Err(RegexError::InvalidArgument));
        assert_eq!(r.num_regs(), 1);
        assert_eq!(r.span(0), Some((0, 2)));
    }

    #[test]
    fn clear_unsets_everything() {
        let mut r = OnigRegion::new();
        r.set(2, 3, 5).unwrap();
        r.clear();
        assert_eq!(r.num_regs(), 3);
        assert!(r.iter().all(|(b, e)| b == ONIG_REGION_NOTPOS && e == ONIG_REGION_NOTPOS));
    }

    #[test]
    fn copy_from_matches_source() {
        let mut a = OnigRegion::new();
        a.set(1, 2, 3).unwrap();
        let mut b = OnigRegion::new();
        b.resize(6).unwrap();
        b.copy_from(&a).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn free_then_new_is_fresh() {
        let mut r = onig_region_new();
        r.set(4, 1, 2).unwrap();
        onig_region_free(r);
        let r = onig_region_new();
        assert_eq!(r, OnigRegion::new());
    }

    #[test]
    fn out_of_range_reads_are_unset() {
        let r = OnigRegion::new();
        assert_eq!(r.beg(7), ONIG_REGION_NOTPOS);
        assert_eq!(r.span(7), None);
    }

    #[test]
    fn option_bits_match_oniguruma_layout() {
        assert_eq!(ONIG_OPTION_IGNORECASE.bits(), 1);
        assert_eq!(ONIG_OPTION_CAPTURE_GROUP.bits(), 256);
        assert_eq!(ONIG_OPTION_NOTBOL.bits(), 512);
        assert!(onig_is_pattern_error(ONIGERR_EMPTY_CHAR_CLASS));
        assert!(!onig_is_pattern_error(ONIGERR_MEMORY));
    }
}
