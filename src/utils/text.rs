//! Symbol classification and output grouping.
//!
//! The reserved symbols are the ones the configuration and cycle notation
//! syntax use as delimiters, so they can never be alphabet members.

/// Number of symbols per output group.
pub const GROUP_SIZE: usize = 5;

/// Returns true if `c` is reserved by the configuration syntax.
///
/// Whitespace, `*`, `(` and `)` are reserved.
pub fn is_reserved(c: char) -> bool {
    c.is_whitespace() || c == '*' || c == '(' || c == ')'
}

/// Formats `msg` in groups of [`GROUP_SIZE`] symbols.
///
/// Every complete group is followed by a single space; the last group
/// may be shorter and then carries no trailing space.
///
/// # Examples
///
/// ```
/// use enigma::utils::text::group_by_five;
///
/// assert_eq!(group_by_five("HELLOWORLD"), "HELLO WORLD ");
/// assert_eq!(group_by_five("QVPQSOK"), "QVPQS OK");
/// ```
pub fn group_by_five(msg: &str) -> String {
    let mut out = String::with_capacity(msg.len() + msg.len() / GROUP_SIZE);
    for (i, c) in msg.chars().enumerate() {
        out.push(c);
        if i % GROUP_SIZE == GROUP_SIZE - 1 {
            out.push(' ');
        }
    }
    out
}
