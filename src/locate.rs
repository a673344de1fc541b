/// Find the first contiguous occurrence of `needle` inside `haystack`.
///
/// Returns the smallest index `i >= start` such that
/// `haystack[i..i + needle.len()] == needle` element-wise, comparing strings
/// exactly — no normalization, no case folding.
///
/// Returns `None` if `needle` is empty, if `haystack` is shorter than
/// `needle`, or if no such index exists.
///
/// A plain left-to-right scan, O(n·m). Inputs are bounded table sizes
/// (thousands of rows), so nothing faster is needed.
///
/// # Example
/// ```
/// use locstitch::find_subsequence;
/// let haystack: Vec<String> = ["foo", "hello", "world"].iter().map(|s| s.to_string()).collect();
/// let needle: Vec<String> = ["hello", "world"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(find_subsequence(&haystack, &needle, 0), Some(1));
/// ```
pub fn find_subsequence(haystack: &[String], needle: &[String], start: usize) -> Option<usize> {
    let m = needle.len();
    if m == 0 || haystack.len() < m {
        return None;
    }

    haystack
        .get(start..)?
        .windows(m)
        .position(|window| window == needle)
        .map(|pos| start + pos)
}
