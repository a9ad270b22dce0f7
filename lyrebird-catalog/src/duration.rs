//! Duration label parsing.
//!
//! Catalog listings label track length as `M:S` or `H:M:S`. Anything
//! else maps to zero: a missing or garbled duration is a policy
//! decision ("unknown length"), not an error.

/// Parse a catalog duration label into whole seconds.
///
/// `"3:45"` → 225, `"1:02:03"` → 3723, anything else → 0. Field values
/// are not range-checked; the catalog occasionally emits minute counts
/// of 60 or more and those are summed as-is. A label whose total does
/// not fit in `u64` maps to zero like any other garbled input.
pub fn parse_duration(label: &str) -> u64 {
    let parts: Result<Vec<u64>, _> = label.split(':').map(|p| p.trim().parse::<u64>()).collect();
    let total = match parts.as_deref() {
        Ok([m, s]) => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
        Ok([h, m, s]) => h
            .checked_mul(3600)
            .and_then(|h| h.checked_add(m.checked_mul(60)?))
            .and_then(|hm| hm.checked_add(*s)),
        _ => None,
    };
    total.unwrap_or(0)
}
