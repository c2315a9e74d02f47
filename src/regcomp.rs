// regcomp.rs - Compiler: lowers the parse tree into a flat op program and
// derives the search optimization info (anchors, literal prefix, first-byte
// map, minimum length).

use smallvec::SmallVec;

use crate::error::RegexError;
use crate::oniguruma::*;
use crate::regenc::*;
use crate::regint::*;
use crate::regparse::{onig_get_parse_depth_limit, onig_parse_tree};
use crate::regparse_types::*;

// ============================================================================
// Operation management
// ============================================================================

#[inline]
fn add_op(reg: &mut RegexType, op: Operation) -> usize {
    reg.ops.push(op);
    reg.ops.len() - 1
}

#[inline]
fn ops_curr_offset(reg: &RegexType) -> usize {
    reg.ops.len()
}

/// Point the jump target of the op at `at` to `addr`.
fn patch_addr(reg: &mut RegexType, at: usize, addr: AbsAddrType) {
    match &mut reg.ops[at] {
        Operation::Jump { addr: a }
        | Operation::Push { addr: a }
        | Operation::RepeatInc { addr: a, .. } => *a = addr,
        Operation::RepeatBranch { exit, .. } | Operation::EmptyCheckEnd { exit, .. } => {
            *exit = addr
        }
        _ => {}
    }
}

fn new_mark_id(reg: &mut RegexType) -> usize {
    reg.num_mark += 1;
    reg.num_mark - 1
}

// ============================================================================
// Leaf nodes
// ============================================================================

fn compile_string_node(sn: &StrNode, reg: &mut RegexType) {
    if sn.bytes.is_empty() {
        return;
    }
    if !sn.ignorecase {
        add_op(reg, Operation::Str { s: sn.bytes.clone() });
        return;
    }
    let enc = reg.enc;
    let mut s = Vec::with_capacity(sn.bytes.len());
    let mut p = 0;
    while p < sn.bytes.len() {
        let code = enc.mbc_to_code(&sn.bytes[p..]);
        s.push(enc.case_fold(code));
        p += enc.mbc_enc_len(&sn.bytes[p..]);
    }
    add_op(reg, Operation::StrIc { s });
}

fn compile_cclass_node(cc: &CClassNode, reg: &mut RegexType) {
    let mut ascii: BitSet = [0; 2];
    for c in 0..=ASCII_LIMIT {
        if cc.is_code_in_cc(reg.enc, c) {
            bitset_set_bit(&mut ascii, c as usize);
        }
    }
    add_op(
        reg,
        Operation::CClass {
            cc: Box::new(cc.clone()),
            ascii,
        },
    );
}

fn compile_anchor_node(an: &AnchorNode, reg: &mut RegexType) {
    let ascii = an.ascii;
    let op = match an.kind {
        AnchorType::BeginBuf => Operation::BeginBuf,
        AnchorType::EndBuf => Operation::EndBuf,
        AnchorType::SemiEndBuf => Operation::SemiEndBuf,
        AnchorType::BeginLine => Operation::BeginLine,
        AnchorType::EndLine => Operation::EndLine,
        AnchorType::BeginPosition => Operation::BeginPosition,
        AnchorType::WordBoundary => Operation::WordBoundary { ascii },
        AnchorType::NoWordBoundary => Operation::NoWordBoundary { ascii },
        AnchorType::WordBegin => Operation::WordBegin { ascii },
        AnchorType::WordEnd => Operation::WordEnd { ascii },
    };
    add_op(reg, op);
}

// ============================================================================
// Quantifiers
// ============================================================================

/// Compile the loop body, wrapped in an empty-match check when the body
/// may consume nothing. Returns the EmptyCheckEnd op index to patch.
fn compile_quant_body_with_empty_check(
    body: &Node,
    reg: &mut RegexType,
) -> Result<Option<usize>, i32> {
    if body.min_byte_len() > 0 {
        compile_tree(body, reg)?;
        return Ok(None);
    }
    let id = reg.num_empty_check;
    reg.num_empty_check += 1;
    add_op(reg, Operation::EmptyCheckStart { id });
    compile_tree(body, reg)?;
    Ok(Some(add_op(reg, Operation::EmptyCheckEnd { id, exit: 0 })))
}

fn compile_quantifier_node(qn: &QuantNode, reg: &mut RegexType) -> Result<(), i32> {
    let body = &qn.body;
    match (qn.lower, qn.upper) {
        (_, Some(0)) => Ok(()),
        (1, Some(1)) => compile_tree(body, reg),
        (0, Some(1)) => {
            if qn.greedy {
                let push = add_op(reg, Operation::Push { addr: 0 });
                compile_tree(body, reg)?;
                let end = ops_curr_offset(reg);
                patch_addr(reg, push, end);
            } else {
                let push = add_op(reg, Operation::Push { addr: 0 });
                let jump = add_op(reg, Operation::Jump { addr: 0 });
                let body_at = ops_curr_offset(reg);
                patch_addr(reg, push, body_at);
                compile_tree(body, reg)?;
                let end = ops_curr_offset(reg);
                patch_addr(reg, jump, end);
            }
            Ok(())
        }
        (lower @ (0 | 1), None) => {
            if lower == 1 {
                compile_tree(body, reg)?;
            }
            compile_star(body, qn.greedy, reg)
        }
        (lower, upper) => compile_counted_repeat(body, lower, upper, qn.greedy, reg),
    }
}

fn compile_star(body: &Node, greedy: bool, reg: &mut RegexType) -> Result<(), i32> {
    let top = ops_curr_offset(reg);
    let push = add_op(reg, Operation::Push { addr: 0 });
    let mut exits: SmallVec<[usize; 2]> = SmallVec::new();
    if greedy {
        exits.push(push);
    } else {
        exits.push(add_op(reg, Operation::Jump { addr: 0 }));
        let body_at = ops_curr_offset(reg);
        patch_addr(reg, push, body_at);
    }
    if let Some(ece) = compile_quant_body_with_empty_check(body, reg)? {
        exits.push(ece);
    }
    add_op(reg, Operation::Jump { addr: top });
    let end = ops_curr_offset(reg);
    for at in exits {
        patch_addr(reg, at, end);
    }
    Ok(())
}

fn compile_counted_repeat(
    body: &Node,
    lower: u32,
    upper: Option<u32>,
    greedy: bool,
    reg: &mut RegexType,
) -> Result<(), i32> {
    let id = reg.num_repeat;
    reg.num_repeat += 1;
    add_op(reg, Operation::RepeatInit { id });
    let top = add_op(
        reg,
        Operation::RepeatBranch {
            id,
            lower,
            upper,
            greedy,
            exit: 0,
        },
    );
    let ece = compile_quant_body_with_empty_check(body, reg)?;
    add_op(reg, Operation::RepeatInc { id, addr: top });
    let end = ops_curr_offset(reg);
    patch_addr(reg, top, end);
    if let Some(ece) = ece {
        patch_addr(reg, ece, end);
    }
    Ok(())
}

// ============================================================================
// Bags and look-arounds
// ============================================================================

fn compile_bag_node(bag: &BagNode, reg: &mut RegexType) -> Result<(), i32> {
    match bag.kind {
        BagType::Memory { regnum, .. } => {
            add_op(reg, Operation::MemStart { num: regnum });
            compile_tree(&bag.body, reg)?;
            add_op(reg, Operation::MemEnd { num: regnum });
        }
        BagType::StopBacktrack => {
            let id = new_mark_id(reg);
            add_op(reg, Operation::Mark { id });
            compile_tree(&bag.body, reg)?;
            add_op(
                reg,
                Operation::CutToMark {
                    id,
                    restore_pos: false,
                },
            );
        }
    }
    Ok(())
}

/// Character length of a look-behind body; the body must be fixed-length.
fn get_char_len_node(node: &Node, enc: OnigEncoding) -> Result<usize, i32> {
    let invalid = Err(ONIGERR_INVALID_LOOK_BEHIND_PATTERN);
    match node {
        Node::Empty | Node::Anchor(_) | Node::Look(_) => Ok(0),
        Node::Str(s) => Ok(onigenc_strlen(enc, &s.bytes, 0, s.bytes.len())),
        Node::CClass(_) | Node::CType(_) | Node::AnyChar { .. } => Ok(1),
        Node::BackRef(_) => invalid,
        Node::Quant(q) => match q.upper {
            Some(u) if u == q.lower => Ok(get_char_len_node(&q.body, enc)? * u as usize),
            _ => invalid,
        },
        Node::Bag(b) => get_char_len_node(&b.body, enc),
        Node::List(v) => v.iter().try_fold(0, |acc, n| Ok(acc + get_char_len_node(n, enc)?)),
        Node::Alt(v) => {
            let mut len = None;
            for n in v {
                let l = get_char_len_node(n, enc)?;
                match len {
                    None => len = Some(l),
                    Some(prev) if prev != l => return invalid,
                    Some(_) => {}
                }
            }
            Ok(len.unwrap_or(0))
        }
    }
}

fn compile_look_node(ln: &LookNode, reg: &mut RegexType) -> Result<(), i32> {
    let mut step_back = None;
    if ln.behind {
        match get_char_len_node(&ln.body, reg.enc) {
            Ok(n) => step_back = Some(n),
            Err(e) => {
                let Node::Alt(branches) = &ln.body else {
                    return Err(e);
                };
                if !reg.syntax.has_behavior(SynBehavior::DIFFERENT_LEN_ALT_LOOK_BEHIND) {
                    return Err(e);
                }
                // (?<=a|bc) => (?<=a)|(?<=bc); (?<!a|bc) => (?<!a)(?<!bc)
                let parts: Vec<Node> = branches
                    .iter()
                    .map(|b| Node::look(true, ln.not, b.clone()))
                    .collect();
                let divided = if ln.not {
                    Node::List(parts)
                } else {
                    Node::Alt(parts)
                };
                return compile_tree(&divided, reg);
            }
        }
    }

    let id = new_mark_id(reg);
    add_op(reg, Operation::Mark { id });
    if ln.not {
        let push = add_op(reg, Operation::Push { addr: 0 });
        if let Some(n) = step_back.filter(|&n| n > 0) {
            add_op(reg, Operation::StepBack { n });
        }
        compile_tree(&ln.body, reg)?;
        add_op(
            reg,
            Operation::CutToMark {
                id,
                restore_pos: false,
            },
        );
        add_op(reg, Operation::Fail);
        let ok = ops_curr_offset(reg);
        patch_addr(reg, push, ok);
        add_op(
            reg,
            Operation::CutToMark {
                id,
                restore_pos: false,
            },
        );
    } else {
        if let Some(n) = step_back.filter(|&n| n > 0) {
            add_op(reg, Operation::StepBack { n });
        }
        compile_tree(&ln.body, reg)?;
        add_op(
            reg,
            Operation::CutToMark {
                id,
                restore_pos: true,
            },
        );
    }
    Ok(())
}

// ============================================================================
// Tree compilation
// ============================================================================

fn compile_alt_node(branches: &[Node], reg: &mut RegexType) -> Result<(), i32> {
    let mut jumps: SmallVec<[usize; 4]> = SmallVec::new();
    let last = branches.len().saturating_sub(1);
    for (i, branch) in branches.iter().enumerate() {
        if i == last {
            compile_tree(branch, reg)?;
        } else {
            let push = add_op(reg, Operation::Push { addr: 0 });
            compile_tree(branch, reg)?;
            jumps.push(add_op(reg, Operation::Jump { addr: 0 }));
            let next = ops_curr_offset(reg);
            patch_addr(reg, push, next);
        }
    }
    let end = ops_curr_offset(reg);
    for at in jumps {
        patch_addr(reg, at, end);
    }
    Ok(())
}

pub fn compile_tree(node: &Node, reg: &mut RegexType) -> Result<(), i32> {
    match node {
        Node::Empty => {}
        Node::Str(sn) => compile_string_node(sn, reg),
        Node::CClass(cc) => compile_cclass_node(cc, reg),
        Node::CType(ct) => {
            add_op(reg, Operation::CType(*ct));
        }
        Node::AnyChar { multiline } => {
            add_op(
                reg,
                if *multiline {
                    Operation::AnyCharMl
                } else {
                    Operation::AnyChar
                },
            );
        }
        Node::Anchor(an) => compile_anchor_node(an, reg),
        Node::BackRef(br) => {
            add_op(
                reg,
                Operation::BackRef {
                    mems: br.groups.clone(),
                    ignorecase: br.ignorecase,
                },
            );
        }
        Node::Quant(qn) => compile_quantifier_node(qn, reg)?,
        Node::Bag(bag) => compile_bag_node(bag, reg)?,
        Node::Look(ln) => compile_look_node(ln, reg)?,
        Node::List(v) => {
            for n in v {
                compile_tree(n, reg)?;
            }
        }
        Node::Alt(v) => compile_alt_node(v, reg)?,
    }
    Ok(())
}

// ============================================================================
// Optimization info
// ============================================================================

fn first_consuming(node: &Node) -> Option<&Node> {
    match node {
        Node::List(v) => v.iter().find(|n| !n.is_zero_width()),
        n if n.is_zero_width() => None,
        n => Some(n),
    }
}

fn leading_anchor(node: &Node) -> AnchorOpt {
    let first = match node {
        Node::List(v) => v.first(),
        n => Some(n),
    };
    let mut opt = AnchorOpt::default();
    match first {
        Some(Node::Anchor(a)) => match a.kind {
            AnchorType::BeginBuf => opt.begin_buf = true,
            AnchorType::BeginPosition => opt.begin_position = true,
            _ => {}
        },
        Some(Node::Bag(b)) => return leading_anchor(&b.body),
        _ => {}
    }
    opt
}

fn leading_exact(node: &Node) -> Option<&[u8]> {
    match first_consuming(node)? {
        Node::Str(s) if !s.ignorecase && !s.bytes.is_empty() => Some(&s.bytes),
        Node::Bag(b) => leading_exact(&b.body),
        Node::Quant(q) if q.lower >= 1 => leading_exact(&q.body),
        _ => None,
    }
}

fn set_map_non_ascii(map: &mut [bool; 256]) {
    for b in map.iter_mut().skip(0x80) {
        *b = true;
    }
}

/// Add every byte that can start a match of `node` to `map`. False when
/// the node can start with any byte or may match empty.
fn collect_first_bytes(node: &Node, enc: OnigEncoding, map: &mut [bool; 256]) -> bool {
    let single_byte = enc.max_enc_len() == 1;
    match node {
        Node::Str(s) => {
            let Some(&b) = s.bytes.first() else {
                return false;
            };
            if !s.ignorecase {
                map[b as usize] = true;
                return true;
            }
            if b > 0x7f {
                return false;
            }
            map[b.to_ascii_lowercase() as usize] = true;
            map[b.to_ascii_uppercase() as usize] = true;
            if !single_byte {
                // folding may reach non-ASCII characters (e.g. KELVIN SIGN)
                set_map_non_ascii(map);
            }
            true
        }
        Node::CClass(cc) => {
            let limit = if single_byte { 0xff } else { ASCII_LIMIT };
            for c in 0..=limit {
                if cc.is_code_in_cc(enc, c) {
                    map[c as usize] = true;
                }
            }
            if !single_byte && cc.may_match_non_ascii() {
                set_map_non_ascii(map);
            }
            true
        }
        Node::CType(ct) => {
            let limit = if single_byte { 0xff } else { ASCII_LIMIT };
            for c in 0..=limit {
                if ct.matches(enc, c) {
                    map[c as usize] = true;
                }
            }
            if !single_byte {
                set_map_non_ascii(map);
            }
            true
        }
        Node::Quant(q) => q.upper != Some(0) && collect_first_bytes(&q.body, enc, map),
        Node::Bag(b) => collect_first_bytes(&b.body, enc, map),
        Node::List(v) => {
            for n in v {
                if n.is_zero_width() {
                    continue;
                }
                if !collect_first_bytes(n, enc, map) {
                    return false;
                }
                if n.min_byte_len() > 0 {
                    return true;
                }
            }
            false
        }
        Node::Alt(v) => v
            .iter()
            .all(|n| n.min_byte_len() > 0 && collect_first_bytes(n, enc, map)),
        Node::Empty
        | Node::AnyChar { .. }
        | Node::Anchor(_)
        | Node::Look(_)
        | Node::BackRef(_) => false,
    }
}

fn set_optimize_info_from_tree(root: &Node, reg: &mut RegexType) {
    reg.min_len = root.min_byte_len();
    reg.anchor = leading_anchor(root);
    if let Some(exact) = leading_exact(root) {
        reg.exact = exact.to_vec();
        return;
    }
    if reg.min_len > 0 {
        let mut map = Box::new([false; 256]);
        if collect_first_bytes(root, reg.enc, &mut map) {
            reg.map = Some(map);
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub fn compile_from_tree(root: &Node, reg: &mut RegexType) -> Result<(), i32> {
    compile_tree(root, reg)?;
    add_op(reg, Operation::End);
    set_optimize_info_from_tree(root, reg);
    Ok(())
}

/// Options in effect for a pattern: the caller's plus the syntax defaults.
pub fn effective_options(
    option: OnigOptionType,
    syntax: &OnigSyntaxType,
) -> Result<OnigOptionType, i32> {
    if option.contains(ONIG_OPTION_DONT_CAPTURE_GROUP | ONIG_OPTION_CAPTURE_GROUP) {
        return Err(ONIGERR_INVALID_COMBINATION_OF_OPTIONS);
    }
    let mut effective = option | syntax.options;
    if option.contains(ONIG_OPTION_NEGATE_SINGLELINE) {
        effective.remove(ONIG_OPTION_SINGLELINE);
    }
    Ok(effective)
}

/// Compile `pattern`. On failure `einfo` carries the offending name and
/// the pattern offset for the error message.
pub fn onig_new_with_info(
    pattern: &[u8],
    option: OnigOptionType,
    enc: OnigEncoding,
    syntax: &'static OnigSyntaxType,
    einfo: &mut OnigErrorInfo,
) -> Result<RegexType, i32> {
    let options = effective_options(option, syntax)?;
    if !enc.is_valid_mbc_string(pattern) {
        return Err(ONIGERR_INVALID_CODE_POINT_VALUE);
    }

    let mut env = ParseEnv::new(options, enc, syntax, onig_get_parse_depth_limit());
    let root = match onig_parse_tree(pattern, &mut env) {
        Ok(root) => root,
        Err(code) => {
            einfo.par = std::mem::take(&mut env.error_par);
            einfo.offset = Some(env.error_offset);
            return Err(code);
        }
    };

    let mut reg = RegexType {
        ops: Vec::new(),
        num_repeat: 0,
        num_empty_check: 0,
        num_mark: 0,
        num_mem: env.num_mem,
        name_table: std::mem::take(&mut env.name_table),
        enc,
        options,
        syntax,
        anchor: AnchorOpt::default(),
        exact: Vec::new(),
        map: None,
        min_len: 0,
    };
    compile_from_tree(&root, &mut reg)?;
    Ok(reg)
}

pub fn onig_new(
    pattern: &[u8],
    option: OnigOptionType,
    enc: OnigEncoding,
    syntax: &'static OnigSyntaxType,
) -> Result<RegexType, RegexError> {
    let mut einfo = OnigErrorInfo::new();
    onig_new_with_info(pattern, option, enc, syntax, &mut einfo)
        .map_err(|code| RegexError::from_code_with_info(code, &einfo))
}

/// Release a compiled pattern.
pub fn onig_free(reg: RegexType) {
    drop(reg);
}
