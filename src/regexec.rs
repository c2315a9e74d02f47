// regexec.rs - VM executor: match_at, onig_match, onig_search and the
// name-table queries.
//
// The program is run by an explicit backtrack stack: Alt entries are
// choice points, the other entries undo capture, counter and empty-check
// state when popped.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use memchr::memmem;

use crate::error::RegexError;
use crate::oniguruma::*;
use crate::regenc::*;
use crate::regint::*;

// ============================================================================
// Global Limits
// ============================================================================

pub const DEFAULT_RETRY_LIMIT_IN_MATCH: u64 = 10_000_000;
pub const DEFAULT_RETRY_LIMIT_IN_SEARCH: u64 = 0;
pub const DEFAULT_MATCH_STACK_LIMIT_SIZE: u32 = 0;

static RETRY_LIMIT_IN_MATCH: AtomicU64 = AtomicU64::new(DEFAULT_RETRY_LIMIT_IN_MATCH);
static RETRY_LIMIT_IN_SEARCH: AtomicU64 = AtomicU64::new(DEFAULT_RETRY_LIMIT_IN_SEARCH);
static MATCH_STACK_LIMIT: AtomicU32 = AtomicU32::new(DEFAULT_MATCH_STACK_LIMIT_SIZE);

/// 0 means unlimited.
pub fn onig_set_retry_limit_in_match(n: u64) { RETRY_LIMIT_IN_MATCH.store(n, Ordering::Relaxed); }
pub fn onig_get_retry_limit_in_match() -> u64 { RETRY_LIMIT_IN_MATCH.load(Ordering::Relaxed) }
/// 0 means unlimited.
pub fn onig_set_retry_limit_in_search(n: u64) { RETRY_LIMIT_IN_SEARCH.store(n, Ordering::Relaxed); }
pub fn onig_get_retry_limit_in_search() -> u64 { RETRY_LIMIT_IN_SEARCH.load(Ordering::Relaxed) }
/// Maximum backtrack stack entries; 0 means unlimited.
pub fn onig_set_match_stack_limit_size(n: u32) { MATCH_STACK_LIMIT.store(n, Ordering::Relaxed); }
pub fn onig_get_match_stack_limit_size() -> u32 { MATCH_STACK_LIMIT.load(Ordering::Relaxed) }

/// Per-call limits. `Default` takes the current global values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnigMatchParam {
    pub match_stack_limit: u32,
    pub retry_limit_in_match: u64,
    pub retry_limit_in_search: u64,
}

impl OnigMatchParam {
    pub fn new() -> Self {
        OnigMatchParam {
            match_stack_limit: onig_get_match_stack_limit_size(),
            retry_limit_in_match: onig_get_retry_limit_in_match(),
            retry_limit_in_search: onig_get_retry_limit_in_search(),
        }
    }
}

impl Default for OnigMatchParam {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Stack
// ============================================================================

#[derive(Clone, Copy, Debug)]
enum StackEntry {
    /// Choice point.
    Alt { pcode: usize, pstr: usize },
    MemStart { zid: usize, prev: Option<usize> },
    MemEnd { zid: usize, prev: Option<usize> },
    RepeatInc { zid: usize, count: u32 },
    EmptyCheckStart { zid: usize, prev: Option<usize> },
    Mark { zid: usize, pos: usize },
}

impl StackEntry {
    /// Entries that restore state when popped.
    #[inline]
    fn is_undo(&self) -> bool {
        !matches!(self, StackEntry::Alt { .. } | StackEntry::Mark { .. })
    }
}

// ============================================================================
// MatchArg - runtime match state
// ============================================================================

struct MatchArg {
    options: OnigOptionType,
    /// Search start position, for \G.
    start: usize,
    best_len: Option<usize>,
    best_s: usize,
    retry_limit_in_match: u64,
    retry_limit_in_search: u64,
    retry_in_search_counter: u64,
    match_stack_limit: u32,

    stack: Vec<StackEntry>,
    mem_start: Vec<Option<usize>>,
    mem_end: Vec<Option<usize>>,
    repeat_count: Vec<u32>,
    empty_check: Vec<Option<usize>>,
}

impl MatchArg {
    fn new(reg: &RegexType, option: OnigOptionType, start: usize, mp: &OnigMatchParam) -> Self {
        MatchArg {
            options: option | reg.options,
            start,
            best_len: None,
            best_s: 0,
            retry_limit_in_match: mp.retry_limit_in_match,
            retry_limit_in_search: mp.retry_limit_in_search,
            retry_in_search_counter: 0,
            match_stack_limit: mp.match_stack_limit,
            stack: Vec::new(),
            mem_start: vec![None; reg.num_mem + 1],
            mem_end: vec![None; reg.num_mem + 1],
            repeat_count: vec![0; reg.num_repeat],
            empty_check: vec![None; reg.num_empty_check],
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.mem_start.iter_mut().for_each(|m| *m = None);
        self.mem_end.iter_mut().for_each(|m| *m = None);
        self.repeat_count.iter_mut().for_each(|c| *c = 0);
        self.empty_check.iter_mut().for_each(|e| *e = None);
    }

    #[inline]
    fn push(&mut self, e: StackEntry) -> Result<(), i32> {
        check_stack_limit(self.stack.len(), self.match_stack_limit)?;
        self.stack.push(e);
        Ok(())
    }

    /// Pop to the most recent choice point, undoing state on the way.
    fn stack_pop(&mut self) -> Option<(usize, usize)> {
        while let Some(e) = self.stack.pop() {
            match e {
                StackEntry::Alt { pcode, pstr } => return Some((pcode, pstr)),
                StackEntry::MemStart { zid, prev } => self.mem_start[zid] = prev,
                StackEntry::MemEnd { zid, prev } => self.mem_end[zid] = prev,
                StackEntry::RepeatInc { zid, count } => self.repeat_count[zid] = count,
                StackEntry::EmptyCheckStart { zid, prev } => self.empty_check[zid] = prev,
                StackEntry::Mark { .. } => {}
            }
        }
        None
    }

    /// Remove the choice points pushed since `Mark { id }` and the mark
    /// itself. Returns the position saved by the mark.
    fn stack_cut_to_mark(&mut self, id: usize) -> Result<usize, i32> {
        let Some(i) = self
            .stack
            .iter()
            .rposition(|e| matches!(e, StackEntry::Mark { zid, .. } if *zid == id))
        else {
            return Err(ONIGERR_STACK_BUG);
        };
        let StackEntry::Mark { pos, .. } = self.stack[i] else {
            return Err(ONIGERR_STACK_BUG);
        };
        let mut w = i;
        for r in i + 1..self.stack.len() {
            if self.stack[r].is_undo() {
                self.stack.swap(w, r);
                w += 1;
            }
        }
        self.stack.truncate(w);
        Ok(pos)
    }
}

#[inline]
fn check_stack_limit(stack_len: usize, limit: u32) -> Result<(), i32> {
    if limit != 0 && stack_len >= limit as usize {
        return Err(ONIGERR_MATCH_STACK_LIMIT_OVER);
    }
    Ok(())
}

// ============================================================================
// Character helpers
// ============================================================================

fn is_word_boundary(enc: OnigEncoding, text: &[u8], s: usize, ascii: bool) -> bool {
    word_before(enc, text, s, ascii) != onigenc_is_mbc_word(enc, text, s, ascii)
}

fn word_before(enc: OnigEncoding, text: &[u8], s: usize, ascii: bool) -> bool {
    match onigenc_get_prev_char_head(enc, text, s) {
        Some(p) => onigenc_is_mbc_word(enc, text, p, ascii),
        None => false,
    }
}

/// Case-insensitive comparison of text[a..b] against the text at `s`.
/// Returns the position after the matched part.
fn string_cmp_ic(enc: OnigEncoding, text: &[u8], a: usize, b: usize, s: usize) -> Option<usize> {
    let mut p = a;
    let mut q = s;
    while p < b {
        if q >= text.len() {
            return None;
        }
        let c1 = enc.case_fold(enc.mbc_to_code(&text[p..b]));
        let c2 = enc.case_fold(enc.mbc_to_code(&text[q..]));
        if c1 != c2 {
            return None;
        }
        p += enclen(enc, &text[..b], p);
        q += enclen(enc, text, q);
    }
    Some(q)
}

fn fill_region(msa: &MatchArg, region: &mut OnigRegion, sstart: usize, s: usize) -> Result<(), i32> {
    region.clear();
    region.set(0, sstart as i32, s as i32).map_err(|e| e.code())?;
    for i in 1..msa.mem_start.len() {
        if let (Some(a), Some(b)) = (msa.mem_start[i], msa.mem_end[i]) {
            if a <= b {
                region.set(i, a as i32, b as i32).map_err(|e| e.code())?;
            }
        }
    }
    Ok(())
}

// ============================================================================
// match_at - run the program at one start position
// ============================================================================

fn match_at(
    reg: &RegexType,
    text: &[u8],
    sstart: usize,
    msa: &mut MatchArg,
    region: &mut OnigRegion,
) -> Result<Option<usize>, i32> {
    let enc = reg.enc;
    let end = text.len();
    let options = msa.options;
    let mut retry_in_match: u64 = 0;

    msa.reset();
    let mut pc: usize = 0;
    let mut s: usize = sstart;

    loop {
        let ok = match &reg.ops[pc] {
            Operation::End => {
                let rejected = (opton_find_not_empty(options) && s == sstart)
                    || (opton_match_whole_string(options) && s != end);
                if rejected {
                    false
                } else {
                    let len = s - sstart;
                    if !opton_find_longest(options) {
                        fill_region(msa, region, sstart, s)?;
                        return Ok(Some(len));
                    }
                    if msa.best_len.map_or(true, |best| len > best) {
                        msa.best_len = Some(len);
                        msa.best_s = sstart;
                        fill_region(msa, region, sstart, s)?;
                    }
                    false
                }
            }

            Operation::Str { s: bytes } => {
                if text[s..].starts_with(bytes) {
                    s += bytes.len();
                    pc += 1;
                    true
                } else {
                    false
                }
            }

            Operation::StrIc { s: codes } => {
                let mut p = s;
                let mut ok = true;
                for &c in codes {
                    if p >= end || enc.case_fold(enc.mbc_to_code(&text[p..])) != c {
                        ok = false;
                        break;
                    }
                    p += enclen(enc, text, p);
                }
                if ok {
                    s = p;
                    pc += 1;
                }
                ok
            }

            Operation::CClass { cc, ascii } => {
                if s >= end {
                    false
                } else {
                    let code = enc.mbc_to_code(&text[s..]);
                    let hit = if code <= ASCII_LIMIT {
                        bitset_at(ascii, code as usize)
                    } else {
                        cc.is_code_in_cc(enc, code)
                    };
                    if hit {
                        s += enclen(enc, text, s);
                        pc += 1;
                    }
                    hit
                }
            }

            Operation::CType(ct) => {
                if s < end && ct.matches(enc, enc.mbc_to_code(&text[s..])) {
                    s += enclen(enc, text, s);
                    pc += 1;
                    true
                } else {
                    false
                }
            }

            Operation::AnyChar => {
                if s < end && !enc.is_mbc_newline(&text[s..]) {
                    s += enclen(enc, text, s);
                    pc += 1;
                    true
                } else {
                    false
                }
            }

            Operation::AnyCharMl => {
                if s < end {
                    s += enclen(enc, text, s);
                    pc += 1;
                    true
                } else {
                    false
                }
            }

            Operation::BeginBuf => s == 0 && !opton_not_begin_string(options) && advance(&mut pc),
            Operation::EndBuf => s == end && !opton_not_end_string(options) && advance(&mut pc),
            Operation::SemiEndBuf => {
                let at_end = s == end && !opton_not_end_string(options);
                let before_last_newline =
                    s < end && enc.is_mbc_newline(&text[s..]) && s + enclen(enc, text, s) == end;
                (at_end || before_last_newline) && !opton_noteol(options) && advance(&mut pc)
            }
            Operation::BeginLine => {
                let ok = if s == 0 {
                    !opton_notbol(options)
                } else {
                    s < end
                        && onigenc_get_prev_char_head(enc, text, s)
                            .is_some_and(|p| enc.is_mbc_newline(&text[p..]))
                };
                ok && advance(&mut pc)
            }
            Operation::EndLine => {
                let ok = if s == end {
                    !opton_noteol(options)
                } else {
                    enc.is_mbc_newline(&text[s..])
                };
                ok && advance(&mut pc)
            }
            Operation::BeginPosition => {
                s == msa.start && !opton_not_begin_position(options) && advance(&mut pc)
            }
            Operation::WordBoundary { ascii } => {
                is_word_boundary(enc, text, s, *ascii) && advance(&mut pc)
            }
            Operation::NoWordBoundary { ascii } => {
                !is_word_boundary(enc, text, s, *ascii) && advance(&mut pc)
            }
            Operation::WordBegin { ascii } => {
                !word_before(enc, text, s, *ascii)
                    && onigenc_is_mbc_word(enc, text, s, *ascii)
                    && advance(&mut pc)
            }
            Operation::WordEnd { ascii } => {
                word_before(enc, text, s, *ascii)
                    && !onigenc_is_mbc_word(enc, text, s, *ascii)
                    && advance(&mut pc)
            }

            Operation::BackRef { mems, ignorecase } => {
                let mut next = None;
                for &m in mems.iter().rev() {
                    let (Some(a), Some(b)) = (msa.mem_start[m], msa.mem_end[m]) else {
                        continue;
                    };
                    if a > b {
                        continue;
                    }
                    next = if *ignorecase {
                        string_cmp_ic(enc, text, a, b, s)
                    } else if text[s..].starts_with(&text[a..b]) {
                        Some(s + (b - a))
                    } else {
                        None
                    };
                    if next.is_some() {
                        break;
                    }
                }
                match next {
                    Some(n) => {
                        s = n;
                        pc += 1;
                        true
                    }
                    None => false,
                }
            }

            Operation::MemStart { num } => {
                let num = *num;
                msa.push(StackEntry::MemStart {
                    zid: num,
                    prev: msa.mem_start[num],
                })?;
                msa.mem_start[num] = Some(s);
                advance(&mut pc)
            }
            Operation::MemEnd { num } => {
                let num = *num;
                msa.push(StackEntry::MemEnd {
                    zid: num,
                    prev: msa.mem_end[num],
                })?;
                msa.mem_end[num] = Some(s);
                advance(&mut pc)
            }

            Operation::Fail => false,
            Operation::Jump { addr } => {
                pc = *addr;
                true
            }
            Operation::Push { addr } => {
                msa.push(StackEntry::Alt {
                    pcode: *addr,
                    pstr: s,
                })?;
                advance(&mut pc)
            }

            Operation::RepeatInit { id } => {
                let id = *id;
                msa.push(StackEntry::RepeatInc {
                    zid: id,
                    count: msa.repeat_count[id],
                })?;
                msa.repeat_count[id] = 0;
                advance(&mut pc)
            }
            Operation::RepeatBranch {
                id,
                lower,
                upper,
                greedy,
                exit,
            } => {
                let count = msa.repeat_count[*id];
                if count < *lower {
                    pc += 1;
                } else if *upper == Some(count) {
                    pc = *exit;
                } else if *greedy {
                    msa.push(StackEntry::Alt {
                        pcode: *exit,
                        pstr: s,
                    })?;
                    pc += 1;
                } else {
                    msa.push(StackEntry::Alt {
                        pcode: pc + 1,
                        pstr: s,
                    })?;
                    pc = *exit;
                }
                true
            }
            Operation::RepeatInc { id, addr } => {
                let id = *id;
                msa.push(StackEntry::RepeatInc {
                    zid: id,
                    count: msa.repeat_count[id],
                })?;
                msa.repeat_count[id] += 1;
                pc = *addr;
                true
            }

            Operation::EmptyCheckStart { id } => {
                let id = *id;
                msa.push(StackEntry::EmptyCheckStart {
                    zid: id,
                    prev: msa.empty_check[id],
                })?;
                msa.empty_check[id] = Some(s);
                advance(&mut pc)
            }
            Operation::EmptyCheckEnd { id, exit } => {
                if msa.empty_check[*id] == Some(s) {
                    pc = *exit;
                } else {
                    pc += 1;
                }
                true
            }

            Operation::Mark { id } => {
                msa.push(StackEntry::Mark { zid: *id, pos: s })?;
                advance(&mut pc)
            }
            Operation::CutToMark { id, restore_pos } => {
                let pos = msa.stack_cut_to_mark(*id)?;
                if *restore_pos {
                    s = pos;
                }
                advance(&mut pc)
            }
            Operation::StepBack { n } => match onigenc_step_back(enc, 0, s, text, *n) {
                Some(p) => {
                    s = p;
                    pc += 1;
                    true
                }
                None => false,
            },
        };

        if ok {
            continue;
        }

        // backtrack
        match msa.stack_pop() {
            Some((pcode, pstr)) => {
                retry_in_match += 1;
                if msa.retry_limit_in_match != 0 && retry_in_match > msa.retry_limit_in_match {
                    return Err(ONIGERR_RETRY_LIMIT_IN_MATCH_OVER);
                }
                msa.retry_in_search_counter += 1;
                if msa.retry_limit_in_search != 0
                    && msa.retry_in_search_counter > msa.retry_limit_in_search
                {
                    return Err(ONIGERR_RETRY_LIMIT_IN_SEARCH_OVER);
                }
                pc = pcode;
                s = pstr;
            }
            None => return Ok(None),
        }
    }
}

#[inline]
fn advance(pc: &mut usize) -> bool {
    *pc += 1;
    true
}

// ============================================================================
// Argument checks
// ============================================================================

fn check_text(reg: &RegexType, text: &[u8], options: OnigOptionType) -> Result<(), RegexError> {
    if text.len() > i32::MAX as usize {
        return Err(RegexError::InvalidArgument);
    }
    if opton_check_validity_of_string(options) && !reg.enc.is_valid_mbc_string(text) {
        return Err(RegexError::from(ONIGERR_INVALID_WIDE_CHAR_VALUE));
    }
    Ok(())
}

fn is_char_head(reg: &RegexType, text: &[u8], at: usize) -> bool {
    at == text.len() || reg.enc.left_adjust_char_head(text, at) == at
}

// ============================================================================
// onig_match - anchored match
// ============================================================================

/// Match at exactly `at`. Returns the match length, `None` when the
/// pattern does not match there.
pub fn onig_match(
    reg: &RegexType,
    text: &[u8],
    at: usize,
    region: &mut OnigRegion,
    option: OnigOptionType,
) -> Result<Option<usize>, RegexError> {
    onig_match_with_param(reg, text, at, region, option, &OnigMatchParam::default())
}

pub fn onig_match_with_param(
    reg: &RegexType,
    text: &[u8],
    at: usize,
    region: &mut OnigRegion,
    option: OnigOptionType,
    mp: &OnigMatchParam,
) -> Result<Option<usize>, RegexError> {
    check_text(reg, text, option)?;
    if at > text.len() || !is_char_head(reg, text, at) {
        return Err(RegexError::InvalidArgument);
    }
    region.resize(reg.num_mem + 1)?;
    region.clear();

    let mut msa = MatchArg::new(reg, option, at, mp);
    let mut r = match_at(reg, text, at, &mut msa, region).map_err(RegexError::from)?;
    if opton_find_longest(msa.options) {
        r = msa.best_len;
    }
    if r.is_none() {
        region.clear();
    }
    Ok(r)
}

// ============================================================================
// onig_search - scanning search
// ============================================================================

/// Search the whole buffer. Forward returns the leftmost match start,
/// backward the rightmost.
pub fn onig_search(
    reg: &RegexType,
    text: &[u8],
    direction: SearchDirection,
    region: &mut OnigRegion,
    option: OnigOptionType,
) -> Result<Option<usize>, RegexError> {
    let (start, range) = match direction {
        SearchDirection::Forward => (0, text.len()),
        SearchDirection::Backward => (text.len(), 0),
    };
    onig_search_range(reg, text, start, range, region, option)
}

/// Try match starts from `start` towards `range` (both inclusive);
/// `start > range` searches backward.
pub fn onig_search_range(
    reg: &RegexType,
    text: &[u8],
    start: usize,
    range: usize,
    region: &mut OnigRegion,
    option: OnigOptionType,
) -> Result<Option<usize>, RegexError> {
    onig_search_with_param(reg, text, start, range, region, option, &OnigMatchParam::default())
}

pub fn onig_search_with_param(
    reg: &RegexType,
    text: &[u8],
    start: usize,
    range: usize,
    region: &mut OnigRegion,
    option: OnigOptionType,
    mp: &OnigMatchParam,
) -> Result<Option<usize>, RegexError> {
    check_text(reg, text, option)?;
    if start > text.len() || range > text.len() || !is_char_head(reg, text, start) {
        return Err(RegexError::InvalidArgument);
    }
    region.resize(reg.num_mem + 1)?;
    region.clear();

    let mut msa = MatchArg::new(reg, option, start, mp);
    let r = if start <= range {
        forward_search(reg, text, start, range, &mut msa, region)
    } else {
        backward_search(reg, text, start, range, &mut msa, region)
    }
    .map_err(RegexError::from)?;

    let r = if opton_find_longest(msa.options) {
        msa.best_len.map(|_| msa.best_s)
    } else {
        r
    };
    if r.is_none() {
        region.clear();
    }
    Ok(r)
}

/// Run one candidate. `Some(start)` ends the search.
#[inline]
fn try_at(
    reg: &RegexType,
    text: &[u8],
    s: usize,
    msa: &mut MatchArg,
    region: &mut OnigRegion,
) -> Result<Option<usize>, i32> {
    let r = match_at(reg, text, s, msa, region)?;
    if r.is_some() && !opton_find_longest(msa.options) {
        return Ok(Some(s));
    }
    Ok(None)
}

/// Next position at or after `s` whose byte is in the first-byte map.
fn map_search_forward(reg: &RegexType, map: &[bool; 256], text: &[u8], mut s: usize) -> Option<usize> {
    if let Some(needles) = reg.map_needles() {
        let hay = &text[s..];
        let found = match needles.as_slice() {
            [a] => memchr::memchr(*a, hay),
            [a, b] => memchr::memchr2(*a, *b, hay),
            [a, b, c] => memchr::memchr3(*a, *b, *c, hay),
            _ => None,
        };
        return found.map(|i| s + i);
    }
    while s < text.len() {
        if map[text[s] as usize] {
            return Some(s);
        }
        s += enclen(reg.enc, text, s);
    }
    None
}

fn forward_search(
    reg: &RegexType,
    text: &[u8],
    start: usize,
    range: usize,
    msa: &mut MatchArg,
    region: &mut OnigRegion,
) -> Result<Option<usize>, i32> {
    let end = text.len();
    if reg.min_len > end {
        return Ok(None);
    }
    let mut last = range.min(end - reg.min_len);
    if reg.anchor.begin_buf {
        if start != 0 {
            return Ok(None);
        }
        last = 0;
    }
    if reg.anchor.begin_position {
        last = start;
    }

    let finder = (!reg.exact.is_empty()).then(|| memmem::Finder::new(&reg.exact));
    let mut s = start;
    while s <= last {
        if let Some(f) = &finder {
            match f.find(&text[s..]) {
                Some(i) => s += i,
                None => break,
            }
        } else if let Some(map) = &reg.map {
            match map_search_forward(reg, map, text, s) {
                Some(p) => s = p,
                None => break,
            }
        }
        if s > last {
            break;
        }
        if let Some(found) = try_at(reg, text, s, msa, region)? {
            return Ok(Some(found));
        }
        if s >= end {
            break;
        }
        s += enclen(reg.enc, text, s);
    }
    Ok(None)
}

fn backward_search(
    reg: &RegexType,
    text: &[u8],
    start: usize,
    range: usize,
    msa: &mut MatchArg,
    region: &mut OnigRegion,
) -> Result<Option<usize>, i32> {
    let enc = reg.enc;
    let end = text.len();
    if reg.min_len > end {
        return Ok(None);
    }
    let mut s = start.min(end - reg.min_len);
    if s < end {
        s = enc.left_adjust_char_head(text, s);
    }
    let mut first = range;
    if reg.anchor.begin_buf {
        if range != 0 {
            return Ok(None);
        }
        s = 0;
    }
    if reg.anchor.begin_position {
        if s != start {
            return Ok(None);
        }
        first = start;
    }

    let finder = (!reg.exact.is_empty()).then(|| memmem::FinderRev::new(&reg.exact));
    while s >= first {
        if let Some(f) = &finder {
            let hay_end = (s + reg.exact.len()).min(end);
            match f.rfind(&text[first..hay_end]) {
                Some(i) => s = first + i,
                None => break,
            }
        } else if let Some(map) = &reg.map {
            while s < end && !map[text[s] as usize] {
                match onigenc_get_prev_char_head(enc, text, s) {
                    Some(p) if p >= first => s = p,
                    _ => return Ok(None),
                }
            }
            if s >= end {
                // a non-empty match cannot start at the end
                match onigenc_get_prev_char_head(enc, text, s) {
                    Some(p) if p >= first => {
                        s = p;
                        continue;
                    }
                    _ => break,
                }
            }
        }
        if let Some(found) = try_at(reg, text, s, msa, region)? {
            return Ok(Some(found));
        }
        match onigenc_get_prev_char_head(enc, text, s) {
            Some(p) if p >= first => s = p,
            _ => break,
        }
    }
    Ok(None)
}

// ============================================================================
// Name table queries
// ============================================================================

/// Call `f` once per group name, in first-declaration order, with all the
/// group numbers carrying it. Stops early when `f` breaks.
pub fn onig_foreach_name<F>(reg: &RegexType, mut f: F) -> ControlFlow<()>
where
    F: FnMut(&[u8], &[usize]) -> ControlFlow<()>,
{
    for g in reg.name_table.iter() {
        f(&g.name, &g.back_refs)?;
    }
    ControlFlow::Continue(())
}

/// Every (name, group) association, in declaration order.
pub fn onig_name_table(reg: &RegexType) -> Vec<NameEntry> {
    reg.name_table.flatten()
}

pub fn onig_number_of_names(reg: &RegexType) -> usize {
    reg.name_table.len()
}

pub fn onig_name_to_group_numbers<'a>(reg: &'a RegexType, name: &[u8]) -> Option<&'a [usize]> {
    reg.name_table.find(name).map(|g| g.back_refs.as_slice())
}

/// Group a back-reference to `name` refers to: the last group with that
/// name that took part in the match, or the last one declared.
pub fn onig_name_to_backref_number(
    reg: &RegexType,
    name: &[u8],
    region: Option<&OnigRegion>,
) -> Option<usize> {
    let groups = onig_name_to_group_numbers(reg, name)?;
    if let Some(region) = region {
        if let Some(&g) = groups.iter().rev().find(|&&g| region.is_set(g)) {
            return Some(g);
        }
    }
    groups.last().copied()
}

/// Number of capture groups, not counting the whole match.
pub fn onig_number_of_captures(reg: &RegexType) -> usize {
    reg.num_mem
}
