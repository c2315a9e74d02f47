// regint.rs - Compiled program representation.
// The parser builds a Node tree, regcomp lowers it into a flat
// Vec<Operation>, and regexec interprets the ops with a backtrack stack.

use smallvec::SmallVec;

use crate::oniguruma::*;
use crate::regenc::*;
pub use crate::regparse_types::{CClassNode, CtypeNode, NameGroup, NameTable};

pub type AbsAddrType = usize;
pub type MemNumType = usize;

// === BitSet ===
// Membership of code points 0..=127; larger codes go through the class.
pub type BitSet = [u64; 2];

#[inline]
pub fn bitset_at(bs: &BitSet, pos: usize) -> bool {
    bs[pos >> 6] & (1u64 << (pos & 63)) != 0
}

#[inline]
pub fn bitset_set_bit(bs: &mut BitSet, pos: usize) {
    bs[pos >> 6] |= 1u64 << (pos & 63);
}

// === Operation ===
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    End,
    /// Exact bytes.
    Str { s: Vec<u8> },
    /// Case-folded code points, compared against the folded subject.
    StrIc { s: Vec<OnigCodePoint> },
    CClass { cc: Box<CClassNode>, ascii: BitSet },
    CType(CtypeNode),
    AnyChar,
    AnyCharMl,

    BeginBuf,
    EndBuf,
    SemiEndBuf,
    BeginLine,
    EndLine,
    BeginPosition,
    WordBoundary { ascii: bool },
    NoWordBoundary { ascii: bool },
    WordBegin { ascii: bool },
    WordEnd { ascii: bool },

    /// Groups are tried from the last one; the first set group decides.
    BackRef { mems: SmallVec<[MemNumType; 2]>, ignorecase: bool },
    MemStart { num: MemNumType },
    MemEnd { num: MemNumType },

    Fail,
    Jump { addr: AbsAddrType },
    Push { addr: AbsAddrType },

    RepeatInit { id: usize },
    /// Decide whether to run the body again; `exit` leaves the loop.
    RepeatBranch {
        id: usize,
        lower: u32,
        upper: Option<u32>,
        greedy: bool,
        exit: AbsAddrType,
    },
    RepeatInc { id: usize, addr: AbsAddrType },

    EmptyCheckStart { id: usize },
    EmptyCheckEnd { id: usize, exit: AbsAddrType },

    Mark { id: usize },
    /// Drop backtrack points pushed since `Mark { id }`.
    CutToMark { id: usize, restore_pos: bool },
    /// Move back `n` characters, failing at the start of the text.
    StepBack { n: usize },
}

// === Optimization info ===

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnchorOpt {
    /// Every match starts at \A.
    pub begin_buf: bool,
    /// Every match starts at \G.
    pub begin_position: bool,
}

// === regex_t ===
pub struct RegexType {
    // program
    pub ops: Vec<Operation>,
    pub num_repeat: usize,
    pub num_empty_check: usize,
    pub num_mark: usize,

    // capture info
    pub num_mem: usize,
    pub name_table: NameTable,

    // metadata
    pub enc: OnigEncoding,
    pub options: OnigOptionType,
    pub syntax: &'static OnigSyntaxType,

    // optimization
    pub anchor: AnchorOpt,
    /// Literal every match starts with.
    pub exact: Vec<u8>,
    /// Possible first bytes of a non-empty match.
    pub map: Option<Box<[bool; 256]>>,
    /// Minimum match length in bytes.
    pub min_len: usize,
}

impl std::fmt::Debug for RegexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegexType")
            .field("ops", &self.ops.len())
            .field("num_mem", &self.num_mem)
            .field("encoding", &self.enc.name())
            .field("syntax", &self.syntax.name)
            .field("options", &self.options)
            .finish()
    }
}

impl RegexType {
    /// Bytes that can start a match, when the set is small enough for
    /// `memchr`.
    pub fn map_needles(&self) -> Option<SmallVec<[u8; 3]>> {
        let map = self.map.as_ref()?;
        let mut out = SmallVec::new();
        for (b, &on) in map.iter().enumerate() {
            if on {
                if out.len() == 3 || (b >= 0x80 && self.enc.max_enc_len() > 1) {
                    return None;
                }
                out.push(b as u8);
            }
        }
        Some(out)
    }
}

// === Option checks ===

#[inline]
pub fn opton_find_longest(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_FIND_LONGEST)
}

#[inline]
pub fn opton_find_not_empty(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_FIND_NOT_EMPTY)
}

#[inline]
pub fn opton_notbol(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_NOTBOL)
}

#[inline]
pub fn opton_noteol(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_NOTEOL)
}

#[inline]
pub fn opton_check_validity_of_string(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_CHECK_VALIDITY_OF_STRING)
}

#[inline]
pub fn opton_not_begin_string(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_NOT_BEGIN_STRING)
}

#[inline]
pub fn opton_not_end_string(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_NOT_END_STRING)
}

#[inline]
pub fn opton_not_begin_position(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_NOT_BEGIN_POSITION)
}

#[inline]
pub fn opton_match_whole_string(option: OnigOptionType) -> bool {
    option.contains(ONIG_OPTION_MATCH_WHOLE_STRING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitset_bits() {
        let mut bs: BitSet = [0; 2];
        bitset_set_bit(&mut bs, 3);
        bitset_set_bit(&mut bs, 100);
        assert!(bitset_at(&bs, 3));
        assert!(bitset_at(&bs, 100));
        assert!(!bitset_at(&bs, 64));
    }

    #[test]
    fn option_checks() {
        let o = ONIG_OPTION_NOTBOL | ONIG_OPTION_FIND_LONGEST;
        assert!(opton_notbol(o));
        assert!(opton_find_longest(o));
        assert!(!opton_noteol(o));
    }
}
