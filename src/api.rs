// api.rs - Idiomatic Rust API for ferrule.
//
// Wraps the engine-level calls (onig_new, onig_search, onig_match, ...)
// with Rust-native types: Regex, RegexBuilder, Span, Match, Captures,
// FindIter.

use std::collections::HashMap;
use std::ops::Range;

use crate::encodings::ONIG_ENCODING_UTF8;
use crate::engine::{Oniguruma, RegexEngine};
use crate::error::RegexError;
use crate::oniguruma::*;
use crate::regenc::{enclen, OnigEncoding};
use crate::regint::RegexType;
use crate::regsyntax::*;

// === Syntax ===

/// Built-in regex dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    Asis,
    PosixBasic,
    PosixExtended,
    Emacs,
    Grep,
    GnuRegex,
    Java,
    Perl,
    PerlNg,
    Python,
    #[default]
    Ruby,
    Oniguruma,
}

impl Syntax {
    /// The operator and behaviour tables for this dialect.
    pub fn definition(self) -> &'static OnigSyntaxType {
        match self {
            Syntax::Asis => &OnigSyntaxASIS,
            Syntax::PosixBasic => &OnigSyntaxPosixBasic,
            Syntax::PosixExtended => &OnigSyntaxPosixExtended,
            Syntax::Emacs => &OnigSyntaxEmacs,
            Syntax::Grep => &OnigSyntaxGrep,
            Syntax::GnuRegex => &OnigSyntaxGnuRegex,
            Syntax::Java => &OnigSyntaxJava,
            Syntax::Perl => &OnigSyntaxPerl,
            Syntax::PerlNg => &OnigSyntaxPerl_NG,
            Syntax::Python => &OnigSyntaxPython,
            Syntax::Ruby => &OnigSyntaxRuby,
            Syntax::Oniguruma => &OnigSyntaxOniguruma,
        }
    }
}

// === Span ===

/// Byte bounds of a match or capture. `start` is inclusive, `end`
/// exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `b[start..end]`, or `None` when out of bounds.
    pub fn slice<'b>(&self, b: &'b [u8]) -> Option<&'b [u8]> {
        b.get(self.range())
    }

    /// `s[start..end]`, or `None` when out of bounds or not on a char
    /// boundary.
    pub fn substr<'s>(&self, s: &'s str) -> Option<&'s str> {
        s.get(self.range())
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Span::new(r.start, r.end)
    }
}

/// A compiled regular expression.
///
/// Patterns use Ruby syntax and UTF-8 unless the builder says otherwise.
///
/// # Examples
///
/// ```
/// use ferrule::api::Regex;
///
/// let re = Regex::new(r"\d+").unwrap();
/// assert!(re.is_match("hello 42"));
///
/// let m = re.find("hello 42").unwrap();
/// assert_eq!(m.as_str(), Some("42"));
/// assert_eq!(m.start(), 6);
/// assert_eq!(m.end(), 8);
/// ```
///
/// Convenience methods such as [`Regex::find`] read a match-time failure
/// (retry or stack limit) as "no match"; the `*_at` methods report it.
pub struct Regex<E: RegexEngine = Oniguruma> {
    inner: E::Pattern,
    names: Vec<NameEntry>,
    captures_len: usize,
}

impl Regex {
    /// Compile a pattern with default options (Ruby syntax, UTF-8).
    pub fn new(pattern: &str) -> Result<Regex, RegexError> {
        Self::new_bytes(pattern.as_bytes())
    }

    /// Compile a pattern given as raw bytes.
    pub fn new_bytes(pattern: &[u8]) -> Result<Regex, RegexError> {
        RegexBuilder::new_bytes(pattern).build()
    }

    /// Create a [`RegexBuilder`] for fine-grained control over compilation.
    pub fn builder(pattern: &str) -> RegexBuilder {
        RegexBuilder::new(pattern)
    }

    /// Access the compiled program for engine-level calls.
    pub fn as_raw(&self) -> &RegexType {
        &self.inner
    }
}

impl<E: RegexEngine> Regex<E> {
    fn from_pattern(inner: E::Pattern) -> Self {
        let names = E::names(&inner);
        let captures_len = E::capture_count(&inner);
        Regex {
            inner,
            names,
            captures_len,
        }
    }

    fn search_region(
        &self,
        text: &[u8],
        direction: SearchDirection,
    ) -> Option<(usize, OnigRegion)> {
        let mut region = OnigRegion::new();
        match E::search(&self.inner, text, direction, &mut region, ONIG_OPTION_NONE) {
            Ok(Some(start)) => Some((start, region)),
            _ => None,
        }
    }

    fn whole<'t>(&self, text: &'t [u8], region: &OnigRegion) -> Option<Match<'t>> {
        let (start, end) = region.span(0)?;
        Some(Match { text, start, end })
    }

    fn captures_from<'t>(&'t self, text: &'t [u8], region: OnigRegion) -> Captures<'t> {
        Captures {
            text,
            region,
            names: &self.names,
        }
    }

    /// Does the pattern match anywhere in `text`?
    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_bytes(text.as_bytes())
    }

    pub fn is_match_bytes(&self, text: &[u8]) -> bool {
        self.search_region(text, SearchDirection::Forward).is_some()
    }

    /// Does the pattern match a prefix of `text`?
    pub fn matches_prefix(&self, text: &str) -> bool {
        let mut region = OnigRegion::new();
        matches!(
            E::match_at(&self.inner, text.as_bytes(), 0, &mut region, ONIG_OPTION_NONE),
            Ok(Some(_))
        )
    }

    /// Anchored match at byte offset `at`.
    pub fn match_at<'t>(
        &self,
        text: &'t [u8],
        at: usize,
        options: OnigOptionType,
    ) -> Result<Option<Match<'t>>, RegexError> {
        let mut region = OnigRegion::new();
        match E::match_at(&self.inner, text, at, &mut region, options)? {
            Some(len) => Ok(Some(Match {
                text,
                start: at,
                end: at + len,
            })),
            None => Ok(None),
        }
    }

    /// Anchored match at byte offset `at` with all capture groups.
    pub fn captures_match_at<'t>(
        &'t self,
        text: &'t [u8],
        at: usize,
        options: OnigOptionType,
    ) -> Result<Option<Captures<'t>>, RegexError> {
        let mut region = OnigRegion::new();
        let r = E::match_at(&self.inner, text, at, &mut region, options)?;
        Ok(r.map(|_| self.captures_from(text, region)))
    }

    /// Match anchored at the start of `text`, with all capture groups.
    pub fn prefix_captures<'t>(&'t self, text: &'t str) -> Option<Captures<'t>> {
        self.captures_match_at(text.as_bytes(), 0, ONIG_OPTION_NONE)
            .ok()
            .flatten()
    }

    /// Leftmost match.
    pub fn find<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        self.find_bytes(text.as_bytes())
    }

    pub fn find_bytes<'t>(&self, text: &'t [u8]) -> Option<Match<'t>> {
        let (_, region) = self.search_region(text, SearchDirection::Forward)?;
        self.whole(text, &region)
    }

    /// Match with the rightmost start.
    pub fn rfind<'t>(&self, text: &'t str) -> Option<Match<'t>> {
        let text = text.as_bytes();
        let (_, region) = self.search_region(text, SearchDirection::Backward)?;
        self.whole(text, &region)
    }

    /// Leftmost match with all capture groups.
    pub fn captures<'t>(&'t self, text: &'t str) -> Option<Captures<'t>> {
        self.captures_bytes(text.as_bytes())
    }

    pub fn captures_bytes<'t>(&'t self, text: &'t [u8]) -> Option<Captures<'t>> {
        let (_, region) = self.search_region(text, SearchDirection::Forward)?;
        Some(self.captures_from(text, region))
    }

    /// Rightmost match with all capture groups.
    pub fn rcaptures<'t>(&'t self, text: &'t str) -> Option<Captures<'t>> {
        let text = text.as_bytes();
        let (_, region) = self.search_region(text, SearchDirection::Backward)?;
        Some(self.captures_from(text, region))
    }

    /// Leftmost match starting at or after `start`. Look-behind and `\b`
    /// still see the text before `start`; `\G` matches at `start`.
    pub fn captures_at<'t>(
        &'t self,
        text: &'t [u8],
        start: usize,
        options: OnigOptionType,
    ) -> Result<Option<Captures<'t>>, RegexError> {
        let mut region = OnigRegion::new();
        let r = E::search_range(&self.inner, text, start, text.len(), &mut region, options)?;
        Ok(r.map(|_| self.captures_from(text, region)))
    }

    /// Split `text` around the leftmost match: (before, match, after).
    /// Without a match the whole text is "after".
    pub fn search_around<'t>(&self, text: &'t str) -> (&'t str, &'t str, &'t str) {
        let parts = self.find(text).and_then(|m| {
            Some((
                text.get(..m.start)?,
                text.get(m.start..m.end)?,
                text.get(m.end..)?,
            ))
        });
        parts.unwrap_or(("", "", text))
    }

    /// Non-overlapping matches from left to right.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> FindIter<'r, 't, E> {
        self.find_iter_bytes(text.as_bytes())
    }

    pub fn find_iter_bytes<'r, 't>(&'r self, text: &'t [u8]) -> FindIter<'r, 't, E> {
        FindIter {
            regex: self,
            text,
            last_end: 0,
            last_match: None,
        }
    }

    /// Capture groups, not counting the whole match.
    pub fn captures_len(&self) -> usize {
        self.captures_len
    }

    /// Distinct group names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut seen: Vec<&[u8]> = Vec::new();
        self.names.iter().filter_map(move |e| {
            let name = e.name.as_slice();
            if seen.contains(&name) {
                return None;
            }
            seen.push(name);
            Some(name)
        })
    }

    /// Name to group numbers. Names that are not valid UTF-8 are converted
    /// lossily.
    pub fn named_captures(&self) -> HashMap<String, Vec<usize>> {
        let mut out: HashMap<String, Vec<usize>> = HashMap::new();
        for e in &self.names {
            out.entry(String::from_utf8_lossy(&e.name).into_owned())
                .or_default()
                .push(e.group);
        }
        out
    }

    /// Every (name, group) association in declaration order.
    pub fn name_table(&self) -> &[NameEntry] {
        &self.names
    }

    pub fn raw(&self) -> &E::Pattern {
        &self.inner
    }
}

impl std::fmt::Debug for RegexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegexBuilder")
            .field("pattern", &String::from_utf8_lossy(&self.pattern))
            .field("options", &self.options)
            .field("syntax", &self.syntax)
            .field("encoding", &self.enc.name())
            .finish()
    }
}

impl<E: RegexEngine> std::fmt::Debug for Regex<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Regex")
            .field("captures_len", &self.captures_len)
            .finish_non_exhaustive()
    }
}

// === RegexBuilder ===

/// Builder for compiling a [`Regex`] with custom options.
///
/// # Examples
///
/// ```
/// use ferrule::api::{Regex, Syntax};
///
/// let re = Regex::builder(r"hello world")
///     .case_insensitive(true)
///     .syntax(Syntax::Perl)
///     .build()
///     .unwrap();
/// assert!(re.is_match("Hello World"));
/// ```
#[derive(Clone)]
pub struct RegexBuilder {
    pattern: Vec<u8>,
    options: OnigOptionType,
    syntax: Syntax,
    enc: OnigEncoding,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> Self {
        Self::new_bytes(pattern.as_bytes())
    }

    pub fn new_bytes(pattern: &[u8]) -> Self {
        RegexBuilder {
            pattern: pattern.to_vec(),
            options: ONIG_OPTION_NONE,
            syntax: Syntax::default(),
            enc: &ONIG_ENCODING_UTF8,
        }
    }

    fn flag(mut self, flag: OnigOptionType, yes: bool) -> Self {
        self.options.set(flag, yes);
        self
    }

    pub fn case_insensitive(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_IGNORECASE, yes)
    }

    /// `.` matches newline.
    pub fn multi_line(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_MULTILINE, yes)
    }

    /// `^` and `$` match only at the buffer edges.
    pub fn single_line(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_SINGLELINE, yes)
    }

    /// Whitespace and `#` comments in the pattern are ignored.
    pub fn extended(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_EXTEND, yes)
    }

    pub fn find_longest(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_FIND_LONGEST, yes)
    }

    pub fn find_not_empty(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_FIND_NOT_EMPTY, yes)
    }

    /// Plain groups capture even when the pattern has named groups.
    pub fn capture_group(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_CAPTURE_GROUP, yes)
    }

    /// Plain groups never capture.
    pub fn dont_capture_group(self, yes: bool) -> Self {
        self.flag(ONIG_OPTION_DONT_CAPTURE_GROUP, yes)
    }

    /// Set a raw option flag. See the `ONIG_OPTION_*` constants.
    pub fn option(mut self, flag: OnigOptionType) -> Self {
        self.options |= flag;
        self
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn encoding(mut self, enc: OnigEncoding) -> Self {
        self.enc = enc;
        self
    }

    pub fn build(&self) -> Result<Regex, RegexError> {
        self.build_with::<Oniguruma>()
    }

    /// Compile with another engine.
    pub fn build_with<E: RegexEngine>(&self) -> Result<Regex<E>, RegexError> {
        let inner = E::compile(&self.pattern, self.options, self.enc, self.syntax.definition())?;
        Ok(Regex::from_pattern(inner))
    }
}

// === Match ===

/// A single match referencing the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'t> {
    text: &'t [u8],
    start: usize,
    end: usize,
}

impl<'t> Match<'t> {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn as_bytes(&self) -> &'t [u8] {
        &self.text[self.start..self.end]
    }

    /// The matched text, or `None` when it is not valid UTF-8.
    pub fn as_str(&self) -> Option<&'t str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// === Captures ===

/// Spans of one match: group 0 is the whole match, 1..N the groups in
/// declaration order.
#[derive(Clone)]
pub struct Captures<'t> {
    text: &'t [u8],
    region: OnigRegion,
    names: &'t [NameEntry],
}

impl<'t> Captures<'t> {
    /// Group `i`, or `None` if it did not take part in the match.
    pub fn get(&self, i: usize) -> Option<Match<'t>> {
        let (start, end) = self.region.span(i)?;
        Some(Match {
            text: self.text,
            start,
            end,
        })
    }

    pub fn span(&self, i: usize) -> Option<Span> {
        self.region.span(i).map(|(s, e)| Span::new(s, e))
    }

    /// Group with the given name. For a name declared more than once, the
    /// last such group that took part in the match.
    pub fn name(&self, name: &str) -> Option<Match<'t>> {
        self.names
            .iter()
            .rev()
            .filter(|e| e.name == name.as_bytes())
            .find_map(|e| self.get(e.group))
    }

    /// Number of slots, including the whole match.
    pub fn len(&self) -> usize {
        self.region.num_regs()
    }

    pub fn is_empty(&self) -> bool {
        self.region.num_regs() == 0
    }

    pub fn iter(&self) -> CapturesIter<'_, 't> {
        CapturesIter {
            captures: self,
            index: 0,
        }
    }

    /// A copy of the underlying region.
    pub fn to_region(&self) -> OnigRegion {
        self.region.clone()
    }
}

impl PartialEq for Captures<'_> {
    /// Same spans in every slot; the texts are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.region == other.region
    }
}

impl Eq for Captures<'_> {}

impl std::fmt::Debug for Captures<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for i in 0..self.len() {
            list.entry(&self.span(i));
        }
        list.finish()
    }
}

// === CapturesIter ===

pub struct CapturesIter<'c, 't> {
    captures: &'c Captures<'t>,
    index: usize,
}

impl<'c, 't> Iterator for CapturesIter<'c, 't> {
    type Item = Option<Match<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.captures.len() {
            return None;
        }
        let m = self.captures.get(self.index);
        self.index += 1;
        Some(m)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.captures.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CapturesIter<'_, '_> {}

// === FindIter ===

/// Iterator over non-overlapping matches.
///
/// An empty match right after the previous match is skipped.
pub struct FindIter<'r, 't, E: RegexEngine = Oniguruma> {
    regex: &'r Regex<E>,
    text: &'t [u8],
    last_end: usize,
    last_match: Option<usize>,
}

impl<'r, 't, E: RegexEngine> Iterator for FindIter<'r, 't, E> {
    type Item = Match<'t>;

    fn next(&mut self) -> Option<Match<'t>> {
        loop {
            if self.last_end > self.text.len() {
                return None;
            }
            let mut region = OnigRegion::new();
            E::search_range(
                &self.regex.inner,
                self.text,
                self.last_end,
                self.text.len(),
                &mut region,
                ONIG_OPTION_NONE,
            )
            .ok()??;
            let (start, end) = region.span(0)?;

            if start == end && self.last_match == Some(end) {
                // empty match glued to the previous one: step one char
                if self.last_end >= self.text.len() {
                    return None;
                }
                let enc = E::encoding(&self.regex.inner);
                self.last_end += enclen(enc, self.text, self.last_end);
                continue;
            }

            self.last_end = end;
            self.last_match = Some(end);
            return Some(Match {
                text: self.text,
                start,
                end,
            });
        }
    }
}
