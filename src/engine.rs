// engine.rs - The narrow contract the high-level API drives.
//
// `Regex` only needs compile, anchored match, ranged search and the
// capture metadata. Anything that provides those with Oniguruma's region
// and numbering rules can stand in for the shipped VM.

use crate::error::RegexError;
use crate::oniguruma::*;
use crate::regcomp::onig_new;
use crate::regenc::OnigEncoding;
use crate::regexec::{
    onig_match, onig_name_table, onig_number_of_captures, onig_search_range,
};
use crate::regint::RegexType;

/// A regex engine the idiomatic API can be built on.
///
/// Offsets are byte offsets into `text`. `match_at` and the search
/// functions overwrite `region` on success and clear it on no match.
pub trait RegexEngine {
    /// Compiled pattern. Shared by reference between concurrent searches.
    type Pattern: Send + Sync;

    fn compile(
        pattern: &[u8],
        options: OnigOptionType,
        enc: OnigEncoding,
        syntax: &'static OnigSyntaxType,
    ) -> Result<Self::Pattern, RegexError>;

    /// Capture groups, not counting the whole match.
    fn capture_count(pattern: &Self::Pattern) -> usize;

    /// Every (name, group) association in declaration order.
    fn names(pattern: &Self::Pattern) -> Vec<NameEntry>;

    /// Encoding the pattern was compiled for.
    fn encoding(pattern: &Self::Pattern) -> OnigEncoding;

    /// Anchored match at `at`; returns the match length.
    fn match_at(
        pattern: &Self::Pattern,
        text: &[u8],
        at: usize,
        region: &mut OnigRegion,
        options: OnigOptionType,
    ) -> Result<Option<usize>, RegexError>;

    /// Candidate starts from `start` to `range` inclusive, backward when
    /// `start > range`. Returns the match start.
    fn search_range(
        pattern: &Self::Pattern,
        text: &[u8],
        start: usize,
        range: usize,
        region: &mut OnigRegion,
        options: OnigOptionType,
    ) -> Result<Option<usize>, RegexError>;

    fn search(
        pattern: &Self::Pattern,
        text: &[u8],
        direction: SearchDirection,
        region: &mut OnigRegion,
        options: OnigOptionType,
    ) -> Result<Option<usize>, RegexError> {
        let (start, range) = match direction {
            SearchDirection::Forward => (0, text.len()),
            SearchDirection::Backward => (text.len(), 0),
        };
        Self::search_range(pattern, text, start, range, region, options)
    }
}

/// The built-in backtracking engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Oniguruma;

impl RegexEngine for Oniguruma {
    type Pattern = RegexType;

    fn compile(
        pattern: &[u8],
        options: OnigOptionType,
        enc: OnigEncoding,
        syntax: &'static OnigSyntaxType,
    ) -> Result<RegexType, RegexError> {
        onig_new(pattern, options, enc, syntax)
    }

    fn capture_count(pattern: &RegexType) -> usize {
        onig_number_of_captures(pattern)
    }

    fn names(pattern: &RegexType) -> Vec<NameEntry> {
        onig_name_table(pattern)
    }

    fn encoding(pattern: &RegexType) -> OnigEncoding {
        pattern.enc
    }

    fn match_at(
        pattern: &RegexType,
        text: &[u8],
        at: usize,
        region: &mut OnigRegion,
        options: OnigOptionType,
    ) -> Result<Option<usize>, RegexError> {
        onig_match(pattern, text, at, region, options)
    }

    fn search_range(
        pattern: &RegexType,
        text: &[u8],
        start: usize,
        range: usize,
        region: &mut OnigRegion,
        options: OnigOptionType,
    ) -> Result<Option<usize>, RegexError> {
        onig_search_range(pattern, text, start, range, region, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encodings::ONIG_ENCODING_UTF8;
    use crate::regsyntax::OnigSyntaxRuby;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn pattern_is_shareable() {
        assert_send_sync::<<Oniguruma as RegexEngine>::Pattern>();
    }

    #[test]
    fn provided_search_maps_direction() {
        let p = Oniguruma::compile(b"ab", ONIG_OPTION_NONE, &ONIG_ENCODING_UTF8, &OnigSyntaxRuby)
            .unwrap();
        let mut region = OnigRegion::new();
        let text = b"ab ab ab";
        let fwd = Oniguruma::search(&p, text, SearchDirection::Forward, &mut region, ONIG_OPTION_NONE);
        assert_eq!(fwd, Ok(Some(0)));
        let bwd = Oniguruma::search(&p, text, SearchDirection::Backward, &mut region, ONIG_OPTION_NONE);
        assert_eq!(bwd, Ok(Some(6)));
        assert_eq!(region.span(0), Some((6, 8)));
    }

    #[test]
    fn metadata() {
        let p = Oniguruma::compile(
            b"(?<a>x)(?<b>y)",
            ONIG_OPTION_NONE,
            &ONIG_ENCODING_UTF8,
            &OnigSyntaxRuby,
        )
        .unwrap();
        assert_eq!(Oniguruma::capture_count(&p), 2);
        let names: Vec<_> = Oniguruma::names(&p)
            .into_iter()
            .map(|e| (e.name, e.group))
            .collect();
        assert_eq!(names, vec![(b"a".to_vec(), 1), (b"b".to_vec(), 2)]);
    }
}
