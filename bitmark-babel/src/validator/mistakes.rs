//! Sequences that usually mean a malformed card divider, remark or comment

const CONTAINS: &[&str] = &[
    "====", "----", "\n==\n", "\n---\n", "\n--\n", // card dividers
    ":::", "::::", // remarks
    "|||", "||||", // comments
];

const STARTS_WITH: &[&str] = &["==\n", "---\n", "--\n"];

const ENDS_WITH: &[&str] = &["\n==", "\n---", "\n--"];

/// Every suspicious sequence found in `body`, in check order
pub fn find_common_mistakes(body: &str) -> Vec<&'static str> {
    let contained = CONTAINS.iter().filter(|m| body.contains(**m));
    let leading = STARTS_WITH.iter().filter(|m| body.starts_with(**m));
    let trailing = ENDS_WITH.iter().filter(|m| body.ends_with(**m));
    contained.chain(leading).chain(trailing).copied().collect()
}
