use std::f64;

/// Value of the asymmetry factor for a perfectly symmetric pair.
pub const SYMMETRIC_FACTOR: f64 = 1.0;

/// Asymmetry factor of a node pair: the larger directed cost over the smaller one.
///
/// The factor is `>= 1.0` and equals [`SYMMETRIC_FACTOR`] exactly when both directions
/// cost the same (this includes `0/0` and `inf/inf`). A free direction paired with a
/// priced one, or a finite direction paired with an infinite one, yields `+inf`.
pub fn asymmetry_ratio(forward: f64, backward: f64) -> f64 {
    let (lo, hi) = if forward <= backward {
        (forward, backward)
    } else {
        (backward, forward)
    };

    if lo == hi {
        return SYMMETRIC_FACTOR;
    }
    if lo <= 0.0 || hi.is_infinite() {
        return f64::INFINITY;
    }

    hi / lo
}

/// Relative/absolute tolerant comparison used when costs are summed in different orders.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= eps * scale
}
