//! Fractional ranks for sibling ordering.
//!
//! Ranks are short strings over `a..z`; sibling display order is their
//! lexicographic order. Inserting between two neighbours picks a new
//! string strictly between them, so reordering never renumbers existing
//! ranks. Generated ranks never end in `a` (the zero digit), which keeps
//! a gap below every rank.

/// Virtual digit below 'a'
const LO: u8 = b'a' - 1;
/// Virtual digit above 'z'
const HI: u8 = b'z' + 1;

/// The rank used when an outline gets its first item
pub const MIDPOINT: &str = "h";

/// Produce a rank strictly between `left` and `right`.
///
/// A missing `left` means "before everything", a missing `right` means
/// "after everything". With both missing the fixed midpoint `"h"` is
/// returned. Bounds must be ranks previously produced by this function
/// (in particular, `right` never ends in `a`).
pub fn rank_between(left: Option<&str>, right: Option<&str>) -> String {
    let prev = left.unwrap_or("");
    let next = right.unwrap_or("");
    if prev.is_empty() && next.is_empty() {
        return MIDPOINT.to_string();
    }
    debug_assert!(next.is_empty() || prev < next, "rank bounds out of order");

    let p_bytes = prev.as_bytes();
    let n_bytes = next.as_bytes();

    // Walk past the shared prefix to the first differing digit
    let mut pos = 0;
    let (mut p, mut n);
    loop {
        p = p_bytes.get(pos).copied().unwrap_or(LO);
        n = n_bytes.get(pos).copied().unwrap_or(HI);
        pos += 1;
        if p != n {
            break;
        }
    }

    let mut out = prev[..pos - 1].to_string();
    if p == LO {
        // Left bound exhausted: skip right's run of minimal digits
        while n == b'a' {
            n = n_bytes.get(pos).copied().unwrap_or(HI);
            pos += 1;
            out.push('a');
        }
        if n == b'b' {
            // No digit fits between 'a' and 'b'; descend a level
            out.push('a');
            n = HI;
        }
    } else if p + 1 == n {
        // Adjacent digits: keep the left digit and consume its 'z' run
        out.push(p as char);
        n = HI;
        loop {
            p = p_bytes.get(pos).copied().unwrap_or(LO);
            pos += 1;
            if p != b'z' {
                break;
            }
            out.push('z');
        }
    }

    // Now p + 1 < n, so a digit fits strictly between. With an open
    // right bound take the smallest step rather than the midpoint, so
    // repeated end-appends use up ~25 values per digit level instead
    // of ~4. The floor of 'b' keeps ranks from ending in 'a'.
    let mid = if n == HI {
        (p + 1).max(b'b')
    } else {
        ((p as u16 + n as u16).div_ceil(2)) as u8
    };
    out.push(mid as char);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn between(l: Option<&str>, r: Option<&str>) -> String {
        let m = rank_between(l, r);
        if let Some(l) = l {
            assert!(l < m.as_str(), "{l} !< {m}");
        }
        if let Some(r) = r {
            assert!(m.as_str() < r, "{m} !< {r}");
        }
        m
    }

    #[test]
    fn no_bounds_yields_fixed_midpoint() {
        assert_eq!(rank_between(None, None), "h");
    }

    #[test]
    fn simple_midpoints() {
        // Open right bound steps minimally; closed bounds bisect
        assert_eq!(between(Some("h"), None), "i");
        assert_eq!(between(None, Some("h")), "d");
        assert_eq!(between(Some("d"), Some("h")), "f");
    }

    #[test]
    fn adjacent_digits_descend() {
        let m = between(Some("h"), Some("i"));
        assert!(m.starts_with('h'));
    }

    #[test]
    fn tight_gaps_stay_ordered() {
        between(Some("hzz"), Some("i"));
        between(None, Some("ab"));
        between(Some("az"), Some("b"));
    }

    #[test]
    fn repeated_append_grows_slowly() {
        let mut r = rank_between(None, None);
        for _ in 0..1000 {
            r = between(Some(&r), None);
        }
        // One digit level per ~25 appends
        assert!(r.len() <= 60, "append ranks grew to {}", r.len());
    }

    #[test]
    fn thousand_splits_in_one_gap_terminate() {
        // Repeatedly insert just below a fixed right bound
        let right = rank_between(None, None);
        let mut left: Option<String> = None;
        let mut prev_rank: Option<String> = None;
        for _ in 0..1000 {
            let m = between(left.as_deref(), Some(&right));
            if let Some(p) = &prev_rank {
                assert!(m.as_str() > p.as_str());
            }
            prev_rank = Some(m.clone());
            left = Some(m);
        }
        // Linear worst-case growth: one digit per split plus slack
        assert!(left.unwrap().len() <= 1002);
    }

    #[test]
    fn descending_inserts_never_reach_left() {
        let left = "d";
        let mut r = "t".to_string();
        for _ in 0..500 {
            r = between(Some(left), Some(&r));
            assert!(r.as_str() > left);
        }
    }
}
