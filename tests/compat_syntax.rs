// compat_syntax.rs - Integration tests across syntax definitions.
//
// Each helper takes the syntax as its first parameter; the shared test
// functions run the same table against several dialects. Uses forward
// search with ONIG_ENCODING_UTF8.

use ferrule::oniguruma::*;
use ferrule::regcomp::onig_new;
use ferrule::regexec::onig_search;
use ferrule::regint::RegexType;
use ferrule::regsyntax::*;

fn show(b: &[u8]) -> &str {
    std::str::from_utf8(b).unwrap_or("<invalid>")
}

fn compile(syntax: &'static OnigSyntaxType, pattern: &[u8]) -> RegexType {
    onig_new(pattern, ONIG_OPTION_NONE, &ferrule::encodings::ONIG_ENCODING_UTF8, syntax)
        .unwrap_or_else(|e| panic!("compile failed for {:?}: {}", show(pattern), e))
}

fn search(reg: &RegexType, input: &[u8]) -> (Option<usize>, OnigRegion) {
    let mut region = OnigRegion::new();
    let r = onig_search(reg, input, SearchDirection::Forward, &mut region, ONIG_OPTION_NONE)
        .unwrap_or_else(|e| panic!("search failed against {:?}: {}", show(input), e));
    (r, region)
}

fn x3_syn(
    syntax: &'static OnigSyntaxType,
    pattern: &[u8],
    input: &[u8],
    from: usize,
    to: usize,
    mem: usize,
) {
    let reg = compile(syntax, pattern);
    let (result, region) = search(&reg, input);
    assert!(
        result.is_some(),
        "x3: expected match for {:?} against {:?}",
        show(pattern),
        show(input)
    );
    assert_eq!(
        region.span(mem),
        Some((from, to)),
        "x3: wrong span for group {} of {:?} against {:?}",
        mem,
        show(pattern),
        show(input)
    );
}

fn x2_syn(syntax: &'static OnigSyntaxType, pattern: &[u8], input: &[u8], from: usize, to: usize) {
    x3_syn(syntax, pattern, input, from, to, 0);
}

fn n_syn(syntax: &'static OnigSyntaxType, pattern: &[u8], input: &[u8]) {
    let reg = compile(syntax, pattern);
    let (result, region) = search(&reg, input);
    assert_eq!(
        result,
        None,
        "n: expected no match for {:?} against {:?}, got {:?}",
        show(pattern),
        show(input),
        region.span(0)
    );
}

fn e_syn(syntax: &'static OnigSyntaxType, pattern: &[u8], expected_error: i32) {
    let result = onig_new(
        pattern,
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        syntax,
    );
    match result {
        Err(e) => assert_eq!(
            e.code(),
            expected_error,
            "e: expected error {} for {:?}, got {}",
            expected_error,
            show(pattern),
            e
        ),
        Ok(_) => panic!(
            "e: expected error {} for {:?}, but it compiled",
            expected_error,
            show(pattern)
        ),
    }
}

// ============================================================================
// Shared test functions
// ============================================================================

fn test_reluctant_interval(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"a{1,3}?", b"aaa", 0, 1);
    x2_syn(syn, b"a{3}", b"aaa", 0, 3);
    x2_syn(syn, b"a{3,3}?", b"aaa", 0, 3);
    n_syn(syn, b"a{3,3}?", b"aa");
}

fn test_possessive_interval(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"a{1,3}+", b"aaaaaa", 0, 3);
    x2_syn(syn, b"a{3,3}+", b"aaaaaa", 0, 3);
}

fn test_perl_options(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"", b"", 0, 0);
    x2_syn(syn, b"^", b"", 0, 0);
    n_syn(syn, b"^a", b"\na");
    n_syn(syn, b".", b"\n");
    x2_syn(syn, b"(?s:.)", b"\n", 0, 1);
    x2_syn(syn, b"(?s).", b"\n", 0, 1);
    x2_syn(syn, b"(?s)a|.", b"\n", 0, 1);
    n_syn(syn, b"(?s:a)|.", b"\n");
    n_syn(syn, b"((?s)a)|.", b"\n");
    n_syn(syn, b".(?s)", b"\n");
    x2_syn(syn, b"(?m)^a", b"\na", 1, 2);
    x2_syn(syn, b"(?i)ab", b"xAB", 1, 3);
    x2_syn(syn, b"a(?i:b)c", b"aBc", 0, 3);
    n_syn(syn, b"a(?i:b)c", b"aBC");
}

fn test_prec_read(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"(?=a).b", b"ab", 0, 2);
    x2_syn(syn, b"(?=ab|(.))\\1", b"ab", 1, 2);
    n_syn(syn, b"(?!(.)z)a\\1", b"aa");
}

fn test_look_behind(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"(?<=a)b", b"ab", 1, 2);
    n_syn(syn, b"(?<!RMA)X", b"123RMAX");
    x2_syn(syn, b"(?<=RMA)X", b"123RMAX", 6, 7);
    n_syn(syn, b"(?<!RMA)$", b"123RMA");
    x2_syn(syn, b"(?<=RMA)$", b"123RMA", 6, 6);
    n_syn(syn, b"(?<!RMA)\\z", b"123RMA");
    x2_syn(syn, b"(?<=RMA)\\z", b"123RMA", 6, 6);
    n_syn(syn, b"(?<!c|c)a", b"ca");
}

fn test_char_class(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"[\\w\\-%]", b"a", 0, 1);
    x2_syn(syn, b"[\\w\\-%]", b"%", 0, 1);
    x2_syn(syn, b"[\\w\\-%]", b"-", 0, 1);
    x2_syn(syn, b"[\\w-%]", b"-", 0, 1);
    x2_syn(syn, b"[^a-c]", b"abcd", 3, 4);
    x2_syn(syn, b"[[:digit:]x]+", b"ab1x2", 2, 5);
}

fn test_bre_anchors(syn: &'static OnigSyntaxType) {
    x2_syn(syn, b"a\\^b", b"a^b", 0, 3);
    x2_syn(syn, b"a^b", b"a^b", 0, 3);
    x2_syn(syn, b"a\\$b", b"a$b", 0, 3);
    x2_syn(syn, b"a$b", b"a$b", 0, 3);
    x2_syn(syn, b"^ab", b"ab", 0, 2);
    x2_syn(syn, b"(^ab)", b"(^ab)", 0, 5);
    x2_syn(syn, b"\\(^ab\\)", b"ab", 0, 2);
    x2_syn(syn, b"ab$", b"ab", 0, 2);
    x2_syn(syn, b"\\(ab$\\)", b"ab", 0, 2);
}

// ============================================================================
// Perl syntax
// ============================================================================

#[test]
fn perl_reluctant_interval() {
    test_reluctant_interval(&OnigSyntaxPerl);
}

#[test]
fn perl_possessive_interval() {
    test_possessive_interval(&OnigSyntaxPerl);
}

#[test]
fn perl_options() {
    test_perl_options(&OnigSyntaxPerl);
}

#[test]
fn perl_prec_read() {
    test_prec_read(&OnigSyntaxPerl);
}

#[test]
fn perl_look_behind() {
    test_look_behind(&OnigSyntaxPerl);
}

#[test]
fn perl_char_class() {
    test_char_class(&OnigSyntaxPerl);
}

#[test]
fn perl_var_lookbehind_error() {
    e_syn(&OnigSyntaxPerl, b"(?<=ab|c)x", ONIGERR_INVALID_LOOK_BEHIND_PATTERN);
}

#[test]
fn perl_empty_group() {
    x3_syn(&OnigSyntaxPerl, b"()", b"abc", 0, 0, 1);
}

#[test]
fn perl_unmatched_paren() {
    e_syn(&OnigSyntaxPerl, b"(", ONIGERR_END_PATTERN_WITH_UNMATCHED_PARENTHESIS);
}

#[test]
fn perl_ng_named_groups_only() {
    let reg = compile(&OnigSyntaxPerl_NG, b"(a)(?<n>b)");
    assert_eq!(reg.num_mem, 1);
    x3_syn(&OnigSyntaxPerl, b"(a)(b)", b"ab", 1, 2, 2);
}

// ============================================================================
// Java syntax
// ============================================================================

#[test]
fn java_reluctant_interval() {
    test_reluctant_interval(&OnigSyntaxJava);
}

#[test]
fn java_possessive_interval() {
    test_possessive_interval(&OnigSyntaxJava);
}

#[test]
fn java_options() {
    test_perl_options(&OnigSyntaxJava);
}

#[test]
fn java_prec_read() {
    test_prec_read(&OnigSyntaxJava);
}

#[test]
fn java_look_behind() {
    test_look_behind(&OnigSyntaxJava);
}

#[test]
fn java_var_lookbehind_match() {
    x2_syn(&OnigSyntaxJava, b"(?<=ab|c)x", b"abx", 2, 3);
    x2_syn(&OnigSyntaxJava, b"(?<=ab|c)x", b"cx", 1, 2);
    n_syn(&OnigSyntaxJava, b"(?<!ab|c)x", b"abx cx");
}

// ============================================================================
// Python syntax
// ============================================================================

#[test]
fn python_reluctant_interval() {
    test_reluctant_interval(&OnigSyntaxPython);
}

#[test]
fn python_named_group() {
    x3_syn(&OnigSyntaxPython, b"(?P<x>b+)", b"abbc", 1, 3, 1);
    x2_syn(&OnigSyntaxPython, b"(?P<x>.)(?P=x)", b"abccd", 2, 4);
}

#[test]
fn python_multiplex_name_error() {
    e_syn(&OnigSyntaxPython, b"(?P<x>a)(?P<x>b)", ONIGERR_MULTIPLEX_DEFINED_NAME);
}

#[test]
fn python_single_multi() {
    let syn = &OnigSyntaxPython;
    n_syn(syn, b".", b"\n");
    x2_syn(syn, b"(?s).", b"\n", 0, 1);
    n_syn(syn, b"^abc", b"\nabc");
    x2_syn(syn, b"(?m)^abc", b"\nabc", 1, 4);
    n_syn(syn, b"abc$", b"abc\ndef");
    x2_syn(syn, b"abc$", b"abc\n", 0, 3);
    x2_syn(syn, b"(?m)abc$", b"abc\ndef", 0, 3);
}

// ============================================================================
// Ruby and Oniguruma syntax
// ============================================================================

#[test]
fn ruby_multiline_is_dotall() {
    x2_syn(&OnigSyntaxRuby, b"(?m).", b"\n", 0, 1);
    n_syn(&OnigSyntaxRuby, b".", b"\n");
    x2_syn(&OnigSyntaxRuby, b"^b", b"a\nb", 2, 3);
    x2_syn(&OnigSyntaxRuby, b"a$", b"a\nb", 0, 1);
}

#[test]
fn ruby_named_groups_only() {
    let reg = compile(&OnigSyntaxRuby, b"he(?<els>(l)*)o");
    assert_eq!(reg.num_mem, 1);
    x3_syn(&OnigSyntaxRuby, b"he(?<els>(l)*)o", b"hello", 2, 4, 1);
    e_syn(&OnigSyntaxRuby, b"(?<a>x)\\1", ONIGERR_NUMBERED_BACKREF_OR_CALL_NOT_ALLOWED);
}

#[test]
fn ruby_named_backrefs() {
    x2_syn(&OnigSyntaxRuby, b"(?<q>['\"]).*?\\k<q>", b"say 'hi'", 4, 8);
    x2_syn(&OnigSyntaxRuby, b"(?'q'a)\\k'q'", b"aa", 0, 2);
    x2_syn(&OnigSyntaxRuby, b"(a)(b)\\k<-1>", b"abb", 0, 3);
    e_syn(&OnigSyntaxRuby, b"\\k<nope>", ONIGERR_UNDEFINED_NAME_REFERENCE);
}

#[test]
fn oniguruma_quote_and_possessive() {
    x2_syn(&OnigSyntaxOniguruma, b"\\Qa.b\\E", b"xa.b", 1, 4);
    n_syn(&OnigSyntaxOniguruma, b"\\Qa.b\\E", b"axb");
    n_syn(&OnigSyntaxOniguruma, b"a*+a", b"aaa");
    x2_syn(&OnigSyntaxOniguruma, b"(?>a|ab)c", b"xac", 1, 3);
    n_syn(&OnigSyntaxOniguruma, b"(?>a|ab)c", b"abc");
}

#[test]
fn ruby_unsupported_constructs() {
    e_syn(&OnigSyntaxRuby, b"\\g<1>(a)", ONIG_NO_SUPPORT_CONFIG);
}

// ============================================================================
// POSIX / GNU syntaxes
// ============================================================================

#[test]
fn posix_basic_anchors() {
    test_bre_anchors(&OnigSyntaxPosixBasic);
}

#[test]
fn posix_basic_escaped_operators() {
    let syn = &OnigSyntaxPosixBasic;
    x3_syn(syn, b"\\(a*\\)b", b"aab", 0, 2, 1);
    x2_syn(syn, b"a\\{2\\}", b"aaa", 0, 2);
    x2_syn(syn, b"a+", b"a+", 0, 2);
    x2_syn(syn, b"a|b", b"a|b", 0, 3);
}

#[test]
fn posix_extended_operators() {
    let syn = &OnigSyntaxPosixExtended;
    x2_syn(syn, b"(a|b)+c", b"xabac", 1, 5);
    x2_syn(syn, b"a{2,}", b"aaaa", 0, 4);
    x2_syn(syn, b"[[:upper:]]+", b"abCDe", 2, 4);
}

#[test]
fn grep_word_anchors() {
    let syn = &OnigSyntaxGrep;
    x2_syn(syn, b"\\<foo\\>", b"a foo b", 2, 5);
    n_syn(syn, b"\\<foo\\>", b"afoob");
    x2_syn(syn, b"a\\|b", b"b", 0, 1);
}

#[test]
fn emacs_groups() {
    let syn = &OnigSyntaxEmacs;
    x3_syn(syn, b"\\(ab\\)+", b"xabab", 3, 5, 1);
    x2_syn(syn, b"a\\|b", b"b", 0, 1);
}

#[test]
fn emacs_buffer_anchors() {
    let syn = &OnigSyntaxEmacs;
    x2_syn(syn, b"\\`a", b"ab", 0, 1);
    n_syn(syn, b"\\`b", b"ab");
    x2_syn(syn, b"b\\'", b"ab", 1, 2);
    n_syn(syn, b"a\\'", b"ab");
}

#[test]
fn gnu_regex_operators() {
    let syn = &OnigSyntaxGnuRegex;
    x2_syn(syn, b"(a|b)+", b"xabbc", 1, 4);
    x2_syn(syn, b"\\w+", b"  ab_9 ", 2, 6);
}

#[test]
fn asis_is_literal() {
    let syn = &OnigSyntaxASIS;
    x2_syn(syn, b"a.*(b)", b"xa.*(b)", 1, 7);
    n_syn(syn, b"a.c", b"abc");
}

#[test]
fn syntax_lookup_by_name() {
    assert_eq!(onig_syntax_by_name("perl_ng").map(|s| s.name), Some("Perl_NG"));
    assert!(onig_syntax_by_name("cobol").is_none());
    assert_eq!(OnigDefaultSyntax.name, "Ruby");
}
