// parse_depth.rs - The global nesting limit for pattern compilation.
//
// Kept in its own test binary: the limit is process-wide.

use ferrule::api::Regex;
use ferrule::error::{ErrorClass, RegexError};
use ferrule::regparse::{onig_get_parse_depth_limit, onig_set_parse_depth_limit};
use ferrule::regparse_types::DEFAULT_PARSE_DEPTH_LIMIT;

#[test]
fn parse_depth_limit() {
    assert_eq!(onig_get_parse_depth_limit(), DEFAULT_PARSE_DEPTH_LIMIT);
    let deep = format!("{}a{}", "(".repeat(8), ")".repeat(8));
    assert!(Regex::new(&deep).is_ok());

    onig_set_parse_depth_limit(4);
    let shallow = Regex::new("(a)");
    let err = Regex::new(&deep).unwrap_err();
    let class_err = Regex::new("[[[[[a]]]]]").unwrap_err();
    onig_set_parse_depth_limit(0);

    assert!(shallow.is_ok());
    assert_eq!(err, RegexError::ParseDepthLimitOver);
    assert_eq!(err.class(), ErrorClass::Compile);
    assert_eq!(class_err, RegexError::ParseDepthLimitOver);
    assert_eq!(onig_get_parse_depth_limit(), DEFAULT_PARSE_DEPTH_LIMIT);
}
