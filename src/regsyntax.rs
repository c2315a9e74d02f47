// regsyntax.rs - Built-in syntax definitions.
// Each static describes which operators a dialect recognises, how
// edge cases behave, and which options it turns on by default.

#![allow(non_upper_case_globals)]

use crate::oniguruma::*;

const SYN_POSIX_COMMON_OP: SynOp = SynOp::DOT_ANYCHAR
    .union(SynOp::POSIX_BRACKET)
    .union(SynOp::DECIMAL_BACKREF)
    .union(SynOp::BRACKET_CC)
    .union(SynOp::ASTERISK_ZERO_INF)
    .union(SynOp::LINE_ANCHOR)
    .union(SynOp::ESC_CONTROL_CHARS);

const SYN_GNU_REGEX_OP: SynOp = SynOp::DOT_ANYCHAR
    .union(SynOp::BRACKET_CC)
    .union(SynOp::POSIX_BRACKET)
    .union(SynOp::DECIMAL_BACKREF)
    .union(SynOp::BRACE_INTERVAL)
    .union(SynOp::LPAREN_SUBEXP)
    .union(SynOp::VBAR_ALT)
    .union(SynOp::ASTERISK_ZERO_INF)
    .union(SynOp::PLUS_ONE_INF)
    .union(SynOp::QMARK_ZERO_ONE)
    .union(SynOp::ESC_AZ_BUF_ANCHOR)
    .union(SynOp::ESC_CAPITAL_G_BEGIN_ANCHOR)
    .union(SynOp::ESC_W_WORD)
    .union(SynOp::ESC_B_WORD_BOUND)
    .union(SynOp::ESC_LTGT_WORD_BEGIN_END)
    .union(SynOp::ESC_S_WHITE_SPACE)
    .union(SynOp::ESC_D_DIGIT)
    .union(SynOp::LINE_ANCHOR);

const SYN_GNU_REGEX_BV: SynBehavior = SynBehavior::CONTEXT_INDEP_ANCHORS
    .union(SynBehavior::CONTEXT_INDEP_REPEAT_OPS)
    .union(SynBehavior::CONTEXT_INVALID_REPEAT_OPS)
    .union(SynBehavior::ALLOW_INVALID_INTERVAL)
    .union(SynBehavior::BACKSLASH_ESCAPE_IN_CC)
    .union(SynBehavior::ALLOW_DOUBLE_RANGE_OP_IN_CC);

// Perl-family escapes on top of the GNU set, minus \< and \>.
const SYN_PERL_OP: SynOp = SYN_GNU_REGEX_OP
    .union(SynOp::QMARK_NON_GREEDY)
    .union(SynOp::ESC_OCTAL3)
    .union(SynOp::ESC_X_HEX2)
    .union(SynOp::ESC_X_BRACE_HEX8)
    .union(SynOp::ESC_O_BRACE_OCTAL)
    .union(SynOp::ESC_CONTROL_CHARS)
    .union(SynOp::ESC_C_CONTROL)
    .difference(SynOp::ESC_LTGT_WORD_BEGIN_END);

const SYN_PERL_OP2: SynOp2 = SynOp2::ESC_CAPITAL_Q_QUOTE
    .union(SynOp2::QMARK_GROUP_EFFECT)
    .union(SynOp2::OPTION_PERL)
    .union(SynOp2::ESC_P_BRACE_CHAR_PROPERTY)
    .union(SynOp2::ESC_P_BRACE_CIRCUMFLEX_NOT)
    .union(SynOp2::PLUS_POSSESSIVE_REPEAT)
    .union(SynOp2::PLUS_POSSESSIVE_INTERVAL);

const SYN_RUBY_OP2: SynOp2 = SynOp2::QMARK_GROUP_EFFECT
    .union(SynOp2::OPTION_RUBY)
    .union(SynOp2::QMARK_LT_NAMED_GROUP)
    .union(SynOp2::ESC_K_NAMED_BACKREF)
    .union(SynOp2::QMARK_LPAREN_IF_ELSE)
    .union(SynOp2::QMARK_TILDE_ABSENT_GROUP)
    .union(SynOp2::ESC_G_SUBEXP_CALL)
    .union(SynOp2::ESC_P_BRACE_CHAR_PROPERTY)
    .union(SynOp2::ESC_P_BRACE_CIRCUMFLEX_NOT)
    .union(SynOp2::PLUS_POSSESSIVE_REPEAT)
    .union(SynOp2::CCLASS_SET_OP)
    .union(SynOp2::ESC_V_VTAB)
    .union(SynOp2::ESC_H_XDIGIT);

const SYN_RUBY_BV: SynBehavior = SYN_GNU_REGEX_BV
    .union(SynBehavior::ALLOW_INTERVAL_LOW_ABBREV)
    .union(SynBehavior::DIFFERENT_LEN_ALT_LOOK_BEHIND)
    .union(SynBehavior::CAPTURE_ONLY_NAMED_GROUP)
    .union(SynBehavior::ALLOW_MULTIPLEX_DEFINITION_NAME)
    .union(SynBehavior::FIXED_INTERVAL_IS_GREEDY_ONLY);

/// Every character is literal.
pub static OnigSyntaxASIS: OnigSyntaxType = OnigSyntaxType {
    name: "ASIS",
    op: SynOp::empty(),
    op2: SynOp2::INEFFECTIVE_ESCAPE,
    behavior: SynBehavior::empty(),
    options: ONIG_OPTION_NONE,
};

pub static OnigSyntaxPosixBasic: OnigSyntaxType = OnigSyntaxType {
    name: "POSIX Basic",
    op: SYN_POSIX_COMMON_OP
        .union(SynOp::ESC_LPAREN_SUBEXP)
        .union(SynOp::ESC_BRACE_INTERVAL),
    op2: SynOp2::empty(),
    behavior: SynBehavior::empty(),
    options: ONIG_OPTION_SINGLELINE,
};

pub static OnigSyntaxPosixExtended: OnigSyntaxType = OnigSyntaxType {
    name: "POSIX Extended",
    op: SYN_POSIX_COMMON_OP
        .union(SynOp::LPAREN_SUBEXP)
        .union(SynOp::BRACE_INTERVAL)
        .union(SynOp::PLUS_ONE_INF)
        .union(SynOp::QMARK_ZERO_ONE)
        .union(SynOp::VBAR_ALT),
    op2: SynOp2::empty(),
    behavior: SynBehavior::CONTEXT_INDEP_ANCHORS
        .union(SynBehavior::CONTEXT_INDEP_REPEAT_OPS)
        .union(SynBehavior::CONTEXT_INVALID_REPEAT_OPS)
        .union(SynBehavior::ALLOW_UNMATCHED_CLOSE_SUBEXP)
        .union(SynBehavior::ALLOW_DOUBLE_RANGE_OP_IN_CC),
    options: ONIG_OPTION_SINGLELINE,
};

pub static OnigSyntaxEmacs: OnigSyntaxType = OnigSyntaxType {
    name: "Emacs",
    op: SynOp::DOT_ANYCHAR
        .union(SynOp::BRACKET_CC)
        .union(SynOp::ESC_BRACE_INTERVAL)
        .union(SynOp::ESC_LPAREN_SUBEXP)
        .union(SynOp::ESC_VBAR_ALT)
        .union(SynOp::ASTERISK_ZERO_INF)
        .union(SynOp::PLUS_ONE_INF)
        .union(SynOp::QMARK_ZERO_ONE)
        .union(SynOp::DECIMAL_BACKREF)
        .union(SynOp::LINE_ANCHOR)
        .union(SynOp::ESC_CONTROL_CHARS),
    op2: SynOp2::ESC_GNU_BUF_ANCHOR,
    behavior: SynBehavior::ALLOW_EMPTY_RANGE_IN_CC,
    options: ONIG_OPTION_NONE,
};

pub static OnigSyntaxGrep: OnigSyntaxType = OnigSyntaxType {
    name: "Grep",
    op: SynOp::DOT_ANYCHAR
        .union(SynOp::BRACKET_CC)
        .union(SynOp::POSIX_BRACKET)
        .union(SynOp::ESC_BRACE_INTERVAL)
        .union(SynOp::ESC_LPAREN_SUBEXP)
        .union(SynOp::ESC_VBAR_ALT)
        .union(SynOp::ASTERISK_ZERO_INF)
        .union(SynOp::ESC_PLUS_ONE_INF)
        .union(SynOp::ESC_QMARK_ZERO_ONE)
        .union(SynOp::LINE_ANCHOR)
        .union(SynOp::ESC_W_WORD)
        .union(SynOp::ESC_B_WORD_BOUND)
        .union(SynOp::ESC_LTGT_WORD_BEGIN_END)
        .union(SynOp::DECIMAL_BACKREF),
    op2: SynOp2::empty(),
    behavior: SynBehavior::ALLOW_EMPTY_RANGE_IN_CC
        .union(SynBehavior::NOT_NEWLINE_IN_NEGATIVE_CC),
    options: ONIG_OPTION_NONE,
};

pub static OnigSyntaxGnuRegex: OnigSyntaxType = OnigSyntaxType {
    name: "GNU Regex",
    op: SYN_GNU_REGEX_OP,
    op2: SynOp2::empty(),
    behavior: SYN_GNU_REGEX_BV,
    options: ONIG_OPTION_NONE,
};

pub static OnigSyntaxJava: OnigSyntaxType = OnigSyntaxType {
    name: "Java",
    op: SYN_GNU_REGEX_OP
        .union(SynOp::QMARK_NON_GREEDY)
        .union(SynOp::ESC_CONTROL_CHARS)
        .union(SynOp::ESC_C_CONTROL)
        .union(SynOp::ESC_OCTAL3)
        .union(SynOp::ESC_X_HEX2)
        .difference(SynOp::ESC_LTGT_WORD_BEGIN_END),
    op2: SynOp2::ESC_CAPITAL_Q_QUOTE
        .union(SynOp2::QMARK_GROUP_EFFECT)
        .union(SynOp2::OPTION_PERL)
        .union(SynOp2::PLUS_POSSESSIVE_REPEAT)
        .union(SynOp2::PLUS_POSSESSIVE_INTERVAL)
        .union(SynOp2::CCLASS_SET_OP)
        .union(SynOp2::ESC_V_VTAB)
        .union(SynOp2::ESC_U_HEX4)
        .union(SynOp2::ESC_P_BRACE_CHAR_PROPERTY),
    behavior: SYN_GNU_REGEX_BV
        .union(SynBehavior::DIFFERENT_LEN_ALT_LOOK_BEHIND)
        .union(SynBehavior::ISOLATED_OPTION_CONTINUE_BRANCH),
    options: ONIG_OPTION_SINGLELINE,
};

pub static OnigSyntaxPerl: OnigSyntaxType = OnigSyntaxType {
    name: "Perl",
    op: SYN_PERL_OP,
    op2: SYN_PERL_OP2,
    behavior: SYN_GNU_REGEX_BV.union(SynBehavior::ISOLATED_OPTION_CONTINUE_BRANCH),
    options: ONIG_OPTION_SINGLELINE,
};

/// Perl with named groups.
pub static OnigSyntaxPerl_NG: OnigSyntaxType = OnigSyntaxType {
    name: "Perl_NG",
    op: SYN_PERL_OP,
    op2: SYN_PERL_OP2
        .union(SynOp2::QMARK_LT_NAMED_GROUP)
        .union(SynOp2::ESC_K_NAMED_BACKREF)
        .union(SynOp2::ESC_G_SUBEXP_CALL),
    behavior: SYN_GNU_REGEX_BV
        .union(SynBehavior::CAPTURE_ONLY_NAMED_GROUP)
        .union(SynBehavior::ALLOW_MULTIPLEX_DEFINITION_NAME)
        .union(SynBehavior::ISOLATED_OPTION_CONTINUE_BRANCH),
    options: ONIG_OPTION_SINGLELINE,
};

pub static OnigSyntaxPython: OnigSyntaxType = OnigSyntaxType {
    name: "Python",
    op: SYN_PERL_OP,
    op2: SYN_PERL_OP2
        .union(SynOp2::QMARK_LT_NAMED_GROUP)
        .union(SynOp2::QMARK_CAPITAL_P_NAME)
        .union(SynOp2::ESC_U_HEX4)
        .difference(SynOp2::PLUS_POSSESSIVE_INTERVAL),
    behavior: SYN_GNU_REGEX_BV
        .union(SynBehavior::ALLOW_INTERVAL_LOW_ABBREV)
        .union(SynBehavior::DIFFERENT_LEN_ALT_LOOK_BEHIND)
        .union(SynBehavior::ISOLATED_OPTION_CONTINUE_BRANCH),
    options: ONIG_OPTION_SINGLELINE,
};

pub static OnigSyntaxRuby: OnigSyntaxType = OnigSyntaxType {
    name: "Ruby",
    op: SYN_PERL_OP,
    op2: SYN_RUBY_OP2,
    behavior: SYN_RUBY_BV,
    options: ONIG_OPTION_NONE,
};

pub static OnigSyntaxOniguruma: OnigSyntaxType = OnigSyntaxType {
    name: "Oniguruma",
    op: SYN_PERL_OP,
    op2: SYN_RUBY_OP2
        .union(SynOp2::ESC_CAPITAL_Q_QUOTE)
        .union(SynOp2::OPTION_ONIGURUMA)
        .union(SynOp2::PLUS_POSSESSIVE_INTERVAL)
        .union(SynOp2::QMARK_CAPITAL_P_NAME)
        .union(SynOp2::ESC_U_HEX4),
    behavior: SYN_RUBY_BV,
    options: ONIG_OPTION_NONE,
};

/// Syntax used when none is given.
pub static OnigDefaultSyntax: &OnigSyntaxType = &OnigSyntaxRuby;

/// Every built-in syntax, for lookups by name.
pub static ONIG_SYNTAXES: [&OnigSyntaxType; 12] = [
    &OnigSyntaxASIS,
    &OnigSyntaxPosixBasic,
    &OnigSyntaxPosixExtended,
    &OnigSyntaxEmacs,
    &OnigSyntaxGrep,
    &OnigSyntaxGnuRegex,
    &OnigSyntaxJava,
    &OnigSyntaxPerl,
    &OnigSyntaxPerl_NG,
    &OnigSyntaxPython,
    &OnigSyntaxRuby,
    &OnigSyntaxOniguruma,
];

/// Look up a built-in syntax by name, ignoring ASCII case.
pub fn onig_syntax_by_name(name: &str) -> Option<&'static OnigSyntaxType> {
    ONIG_SYNTAXES
        .iter()
        .copied()
        .find(|s| s.name.eq_ignore_ascii_case(name))
}
