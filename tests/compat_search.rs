// compat_search.rs - Match/search semantics, regions, name tables and
// error messages through the engine-level calls.

use std::ops::ControlFlow;

use ferrule::api::Regex;
use ferrule::error::{ErrorClass, RegexError};
use ferrule::oniguruma::*;
use ferrule::regcomp::{onig_free, onig_new};
use ferrule::regerror::onig_error_code_to_str;
use ferrule::regexec::*;
use ferrule::regint::RegexType;
use ferrule::regsyntax::{OnigSyntaxPython, OnigSyntaxRuby};

fn compile(pattern: &str) -> RegexType {
    onig_new(
        pattern.as_bytes(),
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxRuby,
    )
    .unwrap_or_else(|e| panic!("compile failed for {:?}: {}", pattern, e))
}

fn fwd(reg: &RegexType, text: &str) -> (Option<usize>, OnigRegion) {
    let mut region = OnigRegion::new();
    let r = onig_search(reg, text.as_bytes(), SearchDirection::Forward, &mut region, ONIG_OPTION_NONE)
        .unwrap();
    (r, region)
}

fn bwd(reg: &RegexType, text: &str) -> (Option<usize>, OnigRegion) {
    let mut region = OnigRegion::new();
    let r = onig_search(reg, text.as_bytes(), SearchDirection::Backward, &mut region, ONIG_OPTION_NONE)
        .unwrap();
    (r, region)
}

// ============================================================================
// Forward / backward search
// ============================================================================

#[test]
fn forward_is_leftmost() {
    let reg = compile("a+");
    let (r, region) = fwd(&reg, "baaab");
    assert_eq!(r, Some(1));
    assert_eq!(region.span(0), Some((1, 4)));
}

#[test]
fn backward_is_rightmost_start() {
    let reg = compile("a");
    let (r, region) = bwd(&reg, "baaab");
    assert_eq!(r, Some(3));
    assert_eq!(region.span(0), Some((3, 4)));
}

#[test]
fn backward_matches_forward_from_candidate() {
    // each candidate start is matched forward with normal greediness
    let reg = compile("a+b");
    let (r, region) = bwd(&reg, "aab aab");
    assert_eq!(r, Some(5));
    assert_eq!(region.span(0), Some((5, 7)));

    let reg = compile("a+");
    let (r, region) = bwd(&reg, "baaab");
    assert_eq!(r, Some(3));
    assert_eq!(region.span(0), Some((3, 4)));
}

#[test]
fn backward_sees_whole_buffer() {
    let reg = compile(r"a(?=b)");
    let (r, _) = bwd(&reg, "xab");
    assert_eq!(r, Some(1));

    let reg = compile(r"(?<=x)a");
    let (r, _) = bwd(&reg, "xaya");
    assert_eq!(r, Some(1));
}

#[test]
fn forward_and_backward_agree_on_existence() {
    for (pattern, text) in [
        ("a", "baaab"),
        ("z", "baaab"),
        ("^", ""),
        ("$", "abc"),
        (r"\bfoo\b", "a foo b"),
        (r"\bfoo\b", "afoob"),
        ("(a|b)*c", "ababab"),
        ("x*", "yyy"),
    ] {
        let reg = compile(pattern);
        let (f, _) = fwd(&reg, text);
        let (b, _) = bwd(&reg, text);
        assert_eq!(f.is_some(), b.is_some(), "{:?} on {:?}", pattern, text);
        if let (Some(f), Some(b)) = (f, b) {
            assert!(f <= b, "{:?} on {:?}", pattern, text);
        }
    }
}

#[test]
fn empty_pattern_matches_at_edges() {
    let reg = compile("");
    assert_eq!(fwd(&reg, "abc").0, Some(0));
    assert_eq!(bwd(&reg, "abc").0, Some(3));
    assert_eq!(fwd(&reg, "").0, Some(0));
}

#[test]
fn search_range_forward_window() {
    let reg = compile("a");
    let mut region = OnigRegion::new();
    let text = b"aaaaa";
    assert_eq!(onig_search_range(&reg, text, 2, 4, &mut region, ONIG_OPTION_NONE), Ok(Some(2)));
    // range bounds the start, not the end
    let reg = compile("a+");
    assert_eq!(onig_search_range(&reg, text, 2, 2, &mut region, ONIG_OPTION_NONE), Ok(Some(2)));
    assert_eq!(region.span(0), Some((2, 5)));
}

#[test]
fn search_range_backward_window() {
    let reg = compile("a");
    let mut region = OnigRegion::new();
    let text = b"aabaa";
    assert_eq!(onig_search_range(&reg, text, 2, 0, &mut region, ONIG_OPTION_NONE), Ok(Some(1)));
    assert_eq!(onig_search_range(&reg, text, 2, 2, &mut region, ONIG_OPTION_NONE), Ok(None));
    assert!(!region.is_set(0));
}

#[test]
fn search_rejects_bad_offsets() {
    let reg = compile("a");
    let mut region = OnigRegion::new();
    let text = "éa".as_bytes();
    assert!(onig_search_range(&reg, text, 1, 3, &mut region, ONIG_OPTION_NONE).is_err());
    assert!(onig_search_range(&reg, text, 0, 9, &mut region, ONIG_OPTION_NONE).is_err());
    assert_eq!(onig_search_range(&reg, text, 2, 3, &mut region, ONIG_OPTION_NONE), Ok(Some(2)));
}

#[test]
fn anchored_patterns_try_one_start() {
    let reg = compile(r"\Aab");
    assert_eq!(fwd(&reg, "xab").0, None);
    assert_eq!(fwd(&reg, "abab").0, Some(0));
    assert_eq!(bwd(&reg, "abab").0, Some(0));
}

#[test]
fn literal_prefilters_keep_results() {
    let reg = compile("needle");
    assert_eq!(fwd(&reg, "haystack with a needle and another needle").0, Some(16));
    assert_eq!(bwd(&reg, "haystack with a needle and another needle").0, Some(35));

    let reg = compile("[xyz]q");
    assert_eq!(fwd(&reg, "xa yq zq").0, Some(3));
    assert_eq!(bwd(&reg, "xa yq zq").0, Some(6));

    let reg = compile("(?i)needle");
    assert_eq!(fwd(&reg, "a NEEDLE").0, Some(2));
}

// ============================================================================
// Anchored match
// ============================================================================

#[test]
fn match_only_reports_anchor() {
    let reg = compile("b+");
    let mut region = OnigRegion::new();
    assert_eq!(onig_match(&reg, b"abb", 0, &mut region, ONIG_OPTION_NONE), Ok(None));
    assert_eq!(onig_match(&reg, b"abb", 1, &mut region, ONIG_OPTION_NONE), Ok(Some(2)));
    assert_eq!(region.span(0), Some((1, 3)));
    assert_eq!(onig_match(&reg, b"abb", 3, &mut region, ONIG_OPTION_NONE), Ok(None));
}

#[test]
fn match_at_end_of_text() {
    let reg = compile("$");
    let mut region = OnigRegion::new();
    assert_eq!(onig_match(&reg, b"ab", 2, &mut region, ONIG_OPTION_NONE), Ok(Some(0)));
    assert_eq!(region.span(0), Some((2, 2)));
}

#[test]
fn match_rejects_bad_anchor() {
    let reg = compile("a");
    let mut region = OnigRegion::new();
    assert!(onig_match(&reg, b"a", 2, &mut region, ONIG_OPTION_NONE).is_err());
    assert!(onig_match(&reg, "éa".as_bytes(), 1, &mut region, ONIG_OPTION_NONE).is_err());
}

#[test]
fn match_sees_text_before_anchor() {
    let reg = compile(r"(?<=a)b");
    let mut region = OnigRegion::new();
    assert_eq!(onig_match(&reg, b"ab", 1, &mut region, ONIG_OPTION_NONE), Ok(Some(1)));
    let reg = compile(r"\bb");
    assert_eq!(onig_match(&reg, b"ab", 1, &mut region, ONIG_OPTION_NONE), Ok(None));
}

// ============================================================================
// Regions
// ============================================================================

#[test]
fn region_fresh_has_one_unset_pair() {
    let region = onig_region_new();
    assert_eq!(region.num_regs(), 1);
    assert!(!region.is_set(0));
    assert_eq!(region.beg(0), ONIG_REGION_NOTPOS);
    assert_eq!(region, OnigRegion::default());
}

#[test]
fn region_grows_for_captures() {
    let reg = compile("(a)(b)(c)");
    let mut region = OnigRegion::new();
    region.resize(1).unwrap();
    let r = onig_search(&reg, b"xabc", SearchDirection::Forward, &mut region, ONIG_OPTION_NONE);
    assert_eq!(r, Ok(Some(1)));
    assert_eq!(region.num_regs(), 4);
    assert_eq!(region.span(3), Some((3, 4)));
}

#[test]
fn region_resize_semantics() {
    let mut region = OnigRegion::new();
    region.set(0, 1, 2).unwrap();
    region.resize(ONIG_NREGION + 5).unwrap();
    assert_eq!(region.num_regs(), ONIG_NREGION + 5);
    assert!(region.allocated() >= ONIG_NREGION + 5);
    assert_eq!(region.span(0), Some((1, 2)));
    assert!(!region.is_set(ONIG_NREGION + 4));

    region.resize(2).unwrap();
    assert_eq!(region.num_regs(), 2);
    assert_eq!(region.span(0), Some((1, 2)));

    let before = region.clone();
    assert!(region.resize(0).is_err());
    assert_eq!(region, before);
}

#[test]
fn region_set_grows() {
    let mut region = OnigRegion::new();
    region.set(3, 4, 6).unwrap();
    assert_eq!(region.num_regs(), 4);
    assert_eq!(region.span(3), Some((4, 6)));
    let pairs: Vec<_> = region.iter().collect();
    assert_eq!(pairs[3], (4, 6));
    assert_eq!(pairs[1], (ONIG_REGION_NOTPOS, ONIG_REGION_NOTPOS));
}

#[test]
fn region_copy() {
    let mut a = OnigRegion::new();
    a.set(2, 0, 1).unwrap();
    let mut b = OnigRegion::new();
    b.copy_from(&a).unwrap();
    assert_eq!(a, b);
}

#[test]
fn region_cleared_on_mismatch() {
    let reg = compile("(a)");
    let mut region = OnigRegion::new();
    region.set(1, 5, 6).unwrap();
    let r = onig_search(&reg, b"xyz", SearchDirection::Forward, &mut region, ONIG_OPTION_NONE);
    assert_eq!(r, Ok(None));
    assert!(region.iter().all(|(b, e)| b == ONIG_REGION_NOTPOS && e == ONIG_REGION_NOTPOS));
}

#[test]
fn region_unset_groups_after_match() {
    let reg = compile("(a)|(b)");
    let (_, region) = fwd(&reg, "b");
    assert_eq!(region.span(1), None);
    assert_eq!(region.span(2), Some((0, 1)));
}

#[test]
fn region_free_then_new_is_fresh() {
    let reg = compile("(a)(b)");
    let (_, region) = fwd(&reg, "ab");
    assert_eq!(region.num_regs(), 3);
    onig_region_free(region);
    let region = onig_region_new();
    assert_eq!(region, OnigRegion::new());
}

#[test]
fn region_reused_across_searches() {
    let reg = compile("(a)(b)?");
    let mut region = OnigRegion::new();
    onig_search(&reg, b"ab", SearchDirection::Forward, &mut region, ONIG_OPTION_NONE).unwrap();
    assert_eq!(region.span(2), Some((1, 2)));
    onig_search(&reg, b"a", SearchDirection::Forward, &mut region, ONIG_OPTION_NONE).unwrap();
    assert_eq!(region.span(2), None);
}

// ============================================================================
// Names and capture counts
// ============================================================================

#[test]
fn names_and_count() {
    let reg = compile("(?<a>x)(?<b>y)");
    assert_eq!(onig_number_of_captures(&reg), 2);
    assert_eq!(onig_number_of_names(&reg), 2);
    assert_eq!(
        onig_name_table(&reg),
        vec![
            NameEntry { name: b"a".to_vec(), group: 1 },
            NameEntry { name: b"b".to_vec(), group: 2 },
        ]
    );
}

#[test]
fn named_groups_disable_plain_captures() {
    let reg = compile("he(?<els>(l)*)o");
    assert_eq!(onig_number_of_captures(&reg), 1);
    assert_eq!(onig_name_to_group_numbers(&reg, b"els"), Some(&[1][..]));
}

#[test]
fn nested_multiplex_name() {
    let reg = compile("he(?<foo>(?<foo>l)*)o");
    assert_eq!(onig_number_of_captures(&reg), 2);
    assert_eq!(onig_name_to_group_numbers(&reg, b"foo"), Some(&[1, 2][..]));
    assert_eq!(onig_number_of_names(&reg), 1);
    let table = onig_name_table(&reg);
    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|e| e.name == b"foo"));
}

#[test]
fn plain_groups_without_names() {
    let reg = compile("(a)(?:b)(c)");
    assert_eq!(onig_number_of_captures(&reg), 2);
    assert_eq!(onig_number_of_names(&reg), 0);
    assert!(onig_name_table(&reg).is_empty());
}

#[test]
fn backref_number_prefers_participating_group() {
    let reg = compile("(?<x>a)|(?<x>b)");
    let (_, region) = fwd(&reg, "a");
    assert_eq!(onig_name_to_backref_number(&reg, b"x", Some(&region)), Some(1));
    let (_, region) = fwd(&reg, "b");
    assert_eq!(onig_name_to_backref_number(&reg, b"x", Some(&region)), Some(2));
    assert_eq!(onig_name_to_backref_number(&reg, b"x", None), Some(2));
    assert_eq!(onig_name_to_backref_number(&reg, b"y", None), None);
}

#[test]
fn foreach_name_walks_in_order() {
    let reg = compile("(?<b>x)(?<a>y)(?<b>z)");
    let mut seen = Vec::new();
    let flow = onig_foreach_name(&reg, |name, groups| {
        seen.push((name.to_vec(), groups.to_vec()));
        ControlFlow::Continue(())
    });
    assert_eq!(flow, ControlFlow::Continue(()));
    assert_eq!(
        seen,
        vec![(b"b".to_vec(), vec![1, 3]), (b"a".to_vec(), vec![2])]
    );
}

#[test]
fn foreach_name_stops_early() {
    let reg = compile("(?<a>x)(?<b>y)(?<c>z)");
    let mut calls = 0;
    let flow = onig_foreach_name(&reg, |_, _| {
        calls += 1;
        if calls == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(flow, ControlFlow::Break(()));
    assert_eq!(calls, 2);
}

#[test]
fn python_rejects_multiplex_names() {
    let err = onig_new(
        b"(?P<a>x)(?P<a>y)",
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxPython,
    )
    .unwrap_err();
    assert_eq!(err.code(), ONIGERR_MULTIPLEX_DEFINED_NAME);
    assert_eq!(err.description(), "multiplex defined name <a>");
}

#[test]
fn python_numbers_all_groups() {
    let reg = onig_new(
        b"(a)(?P<n>b)",
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxPython,
    )
    .unwrap();
    assert_eq!(onig_number_of_captures(&reg), 2);
    assert_eq!(onig_name_to_group_numbers(&reg, b"n"), Some(&[2][..]));
}

// ============================================================================
// Compile errors and messages
// ============================================================================

#[test]
fn unbalanced_paren_has_no_handle() {
    let r = onig_new(
        b"(",
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxRuby,
    );
    let err = r.unwrap_err();
    assert_ne!(err.code(), 0);
    assert!(!onig_error_code_to_str(err.code(), None).is_empty());
}

#[test]
fn empty_char_class_message() {
    assert_eq!(onig_error_code_to_str(ONIGERR_EMPTY_CHAR_CLASS, None), "empty char-class");
    let err = onig_new(
        b"[]",
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxRuby,
    )
    .unwrap_err();
    assert_eq!(err.description(), "empty char-class");
}

#[test]
fn invalid_pattern_bytes_are_compile_errors() {
    let err = onig_new(
        b"a\xff",
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxRuby,
    )
    .unwrap_err();
    assert!(matches!(err, RegexError::PatternEncoding { .. }));
    assert_eq!(err.class(), ErrorClass::Compile);

    let reg = compile("a");
    let mut region = OnigRegion::new();
    let err = onig_search(
        &reg,
        b"\xffa",
        SearchDirection::Forward,
        &mut region,
        ONIG_OPTION_CHECK_VALIDITY_OF_STRING,
    )
    .unwrap_err();
    assert!(matches!(err, RegexError::Encoding { .. }));
    assert_eq!(err.class(), ErrorClass::Match);
}

#[test]
fn messages_are_bounded() {
    let info = OnigErrorInfo {
        par: vec![b'n'; 200],
        offset: None,
    };
    let msg = onig_error_code_to_str(ONIGERR_UNDEFINED_NAME_REFERENCE, Some(&info));
    assert!(msg.len() <= ONIG_MAX_ERROR_MESSAGE_LEN);
    assert!(msg.starts_with("undefined name <nnn"));
}

#[test]
fn unknown_code_message() {
    assert_eq!(onig_error_code_to_str(-4242, None), "undefined error code");
}

#[test]
fn compiled_pattern_can_be_freed() {
    let reg = compile("abc");
    assert_eq!(fwd(&reg, "xabc").0, Some(1));
    onig_free(reg);
}

// ============================================================================
// Through the high-level API
// ============================================================================

#[test]
fn search_around_hello() {
    let re = Regex::new("hello").unwrap();
    assert_eq!(re.search_around("why hello, world"), ("why ", "hello", ", world"));
}
