// proptest_search.rs - Search results checked against brute-force anchored
// matching over random texts.

use ferrule::api::Regex;
use ferrule::oniguruma::*;
use ferrule::regcomp::onig_new;
use ferrule::regexec::{onig_match, onig_search};
use ferrule::regint::RegexType;
use ferrule::regsyntax::OnigSyntaxRuby;
use proptest::prelude::*;

const PATTERNS: &[&str] = &[
    "a",
    "ab",
    "a+",
    "a*b",
    "b?a",
    "(a|b)b",
    "a{2,3}",
    "[ab]c",
    r"\bab",
    "a$",
    "^b",
    "(?<=a)b",
    "a(?!b)",
    "(a)\\1",
    "(?>a+)b",
    "",
    "(?i)a+",
    "(?i)\u{212A}",
    "(?i)k",
    "(?i)\u{212B}b",
    "(?i)\u{2126}|c",
    "é+",
    "(?i)É",
    "[é-ï]k",
    r"\w+",
    ".b",
];

fn compile(pattern: &str) -> RegexType {
    onig_new(
        pattern.as_bytes(),
        ONIG_OPTION_NONE,
        &ferrule::encodings::ONIG_ENCODING_UTF8,
        &OnigSyntaxRuby,
    )
    .unwrap()
}

/// Every char boundary at which an anchored match succeeds, with its end.
fn brute_force(reg: &RegexType, text: &str) -> Vec<(usize, usize)> {
    let mut region = OnigRegion::new();
    (0..=text.len())
        .filter(|&at| text.is_char_boundary(at))
        .filter_map(|at| {
            onig_match(reg, text.as_bytes(), at, &mut region, ONIG_OPTION_NONE)
                .unwrap()
                .map(|len| (at, at + len))
        })
        .collect()
}

fn search(reg: &RegexType, text: &[u8], direction: SearchDirection) -> Option<(usize, usize)> {
    let mut region = OnigRegion::new();
    let start = onig_search(reg, text, direction, &mut region, ONIG_OPTION_NONE).unwrap()?;
    let span = region.span(0)?;
    assert_eq!(span.0, start);
    Some(span)
}

fn text_strategy() -> impl Strategy<Value = String> {
    let alphabet = prop_oneof![
        Just('a'),
        Just('b'),
        Just('c'),
        Just('\n'),
        Just('k'),
        Just('K'),
        Just('\u{212A}'),
        Just('é'),
        Just('É'),
        Just('å'),
        Just('Å'),
        Just('ω'),
    ];
    proptest::collection::vec(alphabet, 0..24)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn forward_is_leftmost(idx in 0..PATTERNS.len(), text in text_strategy()) {
        let reg = compile(PATTERNS[idx]);
        let expected = brute_force(&reg, &text).first().copied();
        prop_assert_eq!(search(&reg, text.as_bytes(), SearchDirection::Forward), expected);
    }

    #[test]
    fn backward_is_rightmost(idx in 0..PATTERNS.len(), text in text_strategy()) {
        let reg = compile(PATTERNS[idx]);
        let expected = brute_force(&reg, &text).last().copied();
        prop_assert_eq!(search(&reg, text.as_bytes(), SearchDirection::Backward), expected);
    }

    #[test]
    fn directions_agree_on_existence(idx in 0..PATTERNS.len(), text in text_strategy()) {
        let reg = compile(PATTERNS[idx]);
        let f = search(&reg, text.as_bytes(), SearchDirection::Forward);
        let b = search(&reg, text.as_bytes(), SearchDirection::Backward);
        prop_assert_eq!(f.is_some(), b.is_some());
    }

    #[test]
    fn literal_search_matches_str_find(needle in "[abc]{1,4}", text in text_strategy()) {
        let re = Regex::new(&needle).unwrap();
        prop_assert_eq!(re.find(&text).map(|m| m.start()), text.find(needle.as_str()));
        prop_assert_eq!(re.rfind(&text).map(|m| m.start()), text.rfind(needle.as_str()));
    }

    #[test]
    fn find_iter_is_ordered_and_disjoint(idx in 0..PATTERNS.len(), text in text_strategy()) {
        let re = Regex::new(PATTERNS[idx]).unwrap();
        let mut last_end = 0;
        for m in re.find_iter(&text) {
            prop_assert!(m.start() >= last_end);
            prop_assert!(m.end() >= m.start());
            last_end = m.end();
        }
    }
}
