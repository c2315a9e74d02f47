// regparse_types.rs - AST node types, parse environment, and name table.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::oniguruma::*;
use crate::regenc::*;

pub const DEFAULT_PARSE_DEPTH_LIMIT: u32 = 4096;

// === Anchor Type ===
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorType {
    BeginBuf,
    EndBuf,
    SemiEndBuf,
    BeginLine,
    EndLine,
    BeginPosition,
    WordBoundary,
    NoWordBoundary,
    WordBegin,
    WordEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorNode {
    pub kind: AnchorType,
    /// Word anchors only: classify with the ASCII table.
    pub ascii: bool,
}

// === Leaf nodes ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrNode {
    /// Encoded text. Case-insensitive strings are compared after folding.
    pub bytes: Vec<u8>,
    pub ignorecase: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CtypeNode {
    pub ctype: OnigCtype,
    pub not: bool,
    pub ascii: bool,
}

impl CtypeNode {
    pub fn matches(&self, enc: OnigEncoding, code: OnigCodePoint) -> bool {
        let r = if self.ascii {
            onigenc_is_ascii_code_ctype(code, self.ctype)
        } else {
            enc.is_code_ctype(code, self.ctype)
        };
        r != self.not
    }
}

/// One operand of a class: the union of its ranges, ctypes and nested
/// classes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CClassSet {
    pub ranges: Vec<(OnigCodePoint, OnigCodePoint)>,
    pub ctypes: Vec<CtypeNode>,
    pub subs: Vec<CClassNode>,
}

impl CClassSet {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.ctypes.is_empty() && self.subs.is_empty()
    }

    pub fn add_range(&mut self, from: OnigCodePoint, to: OnigCodePoint) {
        self.ranges.push((from, to));
    }

    pub fn add_code(&mut self, code: OnigCodePoint) {
        self.ranges.push((code, code));
    }

    fn contains(&self, enc: OnigEncoding, code: OnigCodePoint) -> bool {
        self.ranges.iter().any(|&(f, t)| f <= code && code <= t)
            || self.ctypes.iter().any(|c| c.matches(enc, code))
            || self.subs.iter().any(|s| s.is_code_in_cc(enc, code))
    }

    fn has_non_ascii(&self) -> bool {
        self.ranges.iter().any(|&(_, t)| t > ASCII_LIMIT)
            || self.ctypes.iter().any(|c| c.not || !c.ascii)
            || self.subs.iter().any(|s| s.may_match_non_ascii())
    }
}

/// Bracket class. Membership is the intersection of all `terms`
/// (a plain class has one term), negated when `not` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CClassNode {
    pub not: bool,
    pub terms: Vec<CClassSet>,
    pub ignorecase: bool,
}

impl CClassNode {
    pub fn new() -> Self {
        CClassNode {
            not: false,
            terms: vec![CClassSet::default()],
            ignorecase: false,
        }
    }

    fn raw_contains(&self, enc: OnigEncoding, code: OnigCodePoint) -> bool {
        self.terms.iter().all(|t| t.contains(enc, code))
    }

    pub fn is_code_in_cc(&self, enc: OnigEncoding, code: OnigCodePoint) -> bool {
        let mut found = self.raw_contains(enc, code);
        if !found && self.ignorecase {
            let folded = enc.case_fold(code);
            let upper = enc.case_upper(code);
            found = (folded != code && self.raw_contains(enc, folded))
                || (upper != code && self.raw_contains(enc, upper));
        }
        found != self.not
    }

    /// Conservative: false only when no code point above 0x7f can match.
    pub fn may_match_non_ascii(&self) -> bool {
        self.not || self.ignorecase || self.terms.iter().any(|t| t.has_non_ascii())
    }
}

impl Default for CClassNode {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackRefNode {
    /// Group numbers to try, most recently defined last.
    pub groups: SmallVec<[usize; 2]>,
    pub by_name: bool,
    pub ignorecase: bool,
}

// === Composite nodes ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantNode {
    pub body: Node,
    pub lower: u32,
    /// `None` is unbounded.
    pub upper: Option<u32>,
    pub greedy: bool,
    pub possessive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BagType {
    Memory { regnum: usize, named: bool },
    StopBacktrack,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BagNode {
    pub kind: BagType,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookNode {
    pub behind: bool,
    pub not: bool,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Empty,
    Str(StrNode),
    CClass(Box<CClassNode>),
    CType(CtypeNode),
    AnyChar { multiline: bool },
    Anchor(AnchorNode),
    BackRef(BackRefNode),
    Quant(Box<QuantNode>),
    Bag(Box<BagNode>),
    Look(Box<LookNode>),
    List(Vec<Node>),
    Alt(Vec<Node>),
}

impl Node {
    pub fn str(bytes: Vec<u8>, ignorecase: bool) -> Node {
        Node::Str(StrNode { bytes, ignorecase })
    }

    pub fn anchor(kind: AnchorType) -> Node {
        Node::Anchor(AnchorNode { kind, ascii: false })
    }

    pub fn quant(body: Node, lower: u32, upper: Option<u32>, greedy: bool) -> Node {
        Node::Quant(Box::new(QuantNode {
            body,
            lower,
            upper,
            greedy,
            possessive: false,
        }))
    }

    pub fn memory(regnum: usize, named: bool, body: Node) -> Node {
        Node::Bag(Box::new(BagNode {
            kind: BagType::Memory { regnum, named },
            body,
        }))
    }

    pub fn atomic(body: Node) -> Node {
        Node::Bag(Box::new(BagNode {
            kind: BagType::StopBacktrack,
            body,
        }))
    }

    pub fn look(behind: bool, not: bool, body: Node) -> Node {
        Node::Look(Box::new(LookNode { behind, not, body }))
    }

    /// Collapse a sequence: no wrapper for zero or one element.
    pub fn list(mut nodes: Vec<Node>) -> Node {
        match nodes.len() {
            0 => Node::Empty,
            1 => nodes.pop().unwrap_or(Node::Empty),
            _ => Node::List(nodes),
        }
    }

    pub fn alt(mut nodes: Vec<Node>) -> Node {
        match nodes.len() {
            0 => Node::Empty,
            1 => nodes.pop().unwrap_or(Node::Empty),
            _ => Node::Alt(nodes),
        }
    }

    /// True for nodes that never consume input.
    pub fn is_zero_width(&self) -> bool {
        match self {
            Node::Empty | Node::Anchor(_) | Node::Look(_) => true,
            Node::List(v) => v.iter().all(|n| n.is_zero_width()),
            Node::Bag(b) => b.body.is_zero_width(),
            _ => false,
        }
    }

    /// Lower bound of bytes consumed.
    pub fn min_byte_len(&self) -> usize {
        match self {
            Node::Empty | Node::Anchor(_) | Node::Look(_) | Node::BackRef(_) => 0,
            // a folded character may encode shorter than the pattern's
            Node::Str(s) if s.ignorecase => {
                s.bytes.iter().filter(|&&b| b & 0xc0 != 0x80).count()
            }
            Node::Str(s) => s.bytes.len(),
            Node::CClass(_) | Node::CType(_) | Node::AnyChar { .. } => 1,
            Node::Quant(q) => q.body.min_byte_len().saturating_mul(q.lower as usize),
            Node::Bag(b) => b.body.min_byte_len(),
            Node::List(v) => v.iter().map(|n| n.min_byte_len()).sum(),
            Node::Alt(v) => v.iter().map(|n| n.min_byte_len()).min().unwrap_or(0),
        }
    }
}

// === Name table ===

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameGroup {
    pub name: Vec<u8>,
    pub back_refs: SmallVec<[usize; 2]>,
}

/// Group names in definition order.
#[derive(Clone, Debug, Default)]
pub struct NameTable {
    entries: Vec<NameGroup>,
    index: HashMap<Vec<u8>, usize>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `group` under `name`.
    pub fn add(&mut self, name: &[u8], group: usize, allow_multiplex: bool) -> Result<(), i32> {
        if name.is_empty() {
            return Err(ONIGERR_EMPTY_GROUP_NAME);
        }
        match self.index.get(name) {
            Some(&i) => {
                if !allow_multiplex {
                    return Err(ONIGERR_MULTIPLEX_DEFINED_NAME);
                }
                self.entries[i].back_refs.push(group);
            }
            None => {
                self.index.insert(name.to_vec(), self.entries.len());
                let mut back_refs = SmallVec::new();
                back_refs.push(group);
                self.entries.push(NameGroup {
                    name: name.to_vec(),
                    back_refs,
                });
            }
        }
        Ok(())
    }

    pub fn find(&self, name: &[u8]) -> Option<&NameGroup> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &NameGroup> {
        self.entries.iter()
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite group numbers through `map` (old number -> new number).
    pub fn renumber(&mut self, map: &[usize]) {
        for e in &mut self.entries {
            for g in e.back_refs.iter_mut() {
                *g = map[*g];
            }
        }
    }

    /// One entry per (name, group) pair, in definition order.
    pub fn flatten(&self) -> Vec<NameEntry> {
        self.entries
            .iter()
            .flat_map(|e| {
                e.back_refs.iter().map(move |&g| NameEntry {
                    name: e.name.clone(),
                    group: g,
                })
            })
            .collect()
    }
}

// === Parse Environment ===

pub struct ParseEnv {
    pub options: OnigOptionType,
    pub enc: OnigEncoding,
    pub syntax: &'static OnigSyntaxType,
    /// Capturing groups seen so far.
    pub num_mem: usize,
    /// `mem_named[n]` for group n (index 0 unused).
    pub mem_named: Vec<bool>,
    pub name_table: NameTable,
    pub has_numbered_backref: bool,
    pub backref_max: usize,
    pub parse_depth: u32,
    pub parse_depth_limit: u32,
    pub id_counter: usize,
    /// Offending name or property text for the error message.
    pub error_par: Vec<u8>,
    pub error_offset: usize,
}

impl std::fmt::Debug for ParseEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseEnv")
            .field("options", &self.options)
            .field("encoding", &self.enc.name())
            .field("syntax", &self.syntax.name)
            .field("num_mem", &self.num_mem)
            .field("mem_named", &self.mem_named)
            .field("name_table", &self.name_table)
            .field("has_numbered_backref", &self.has_numbered_backref)
            .field("backref_max", &self.backref_max)
            .field("parse_depth", &self.parse_depth)
            .field("parse_depth_limit", &self.parse_depth_limit)
            .field("id_counter", &self.id_counter)
            .field("error_par", &self.error_par)
            .field("error_offset", &self.error_offset)
            .finish()
    }
}

impl ParseEnv {
    pub fn new(
        options: OnigOptionType,
        enc: OnigEncoding,
        syntax: &'static OnigSyntaxType,
        parse_depth_limit: u32,
    ) -> Self {
        ParseEnv {
            options,
            enc,
            syntax,
            num_mem: 0,
            mem_named: vec![false],
            name_table: NameTable::new(),
            has_numbered_backref: false,
            backref_max: 0,
            parse_depth: 0,
            parse_depth_limit,
            id_counter: 0,
            error_par: Vec::new(),
            error_offset: 0,
        }
    }

    pub fn add_mem_entry(&mut self, named: bool) -> Result<usize, i32> {
        if self.num_mem >= ONIG_MAX_CAPTURE_NUM {
            return Err(ONIGERR_TOO_MANY_CAPTURES);
        }
        self.num_mem += 1;
        self.mem_named.push(named);
        Ok(self.num_mem)
    }

    pub fn num_named(&self) -> usize {
        self.mem_named.iter().filter(|&&n| n).count()
    }

    pub fn ignorecase(&self) -> bool {
        self.options.contains(ONIG_OPTION_IGNORECASE)
    }
}
