//! B-spline basis functions (Cox–de Boor recursion).

/// Finds the knot span index `i` such that `knots[i] <= u < knots[i + 1]`.
///
/// `n` is the index of the last control point. Values at or past the end of
/// the domain map to the last non-empty span.
#[must_use]
pub fn find_span(n: usize, degree: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n + 1] {
        // Walk back over repeated end knots so the span is non-empty.
        let mut span = n;
        while span > degree && knots[span] >= knots[n + 1] {
            span -= 1;
        }
        return span;
    }
    if u <= knots[degree] {
        let mut span = degree;
        while span < n && knots[span + 1] <= u {
            span += 1;
        }
        return span;
    }

    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

/// Computes the `degree + 1` non-vanishing basis functions at `u` for `span`.
#[must_use]
pub fn basis_functions(span: usize, u: f64, degree: usize, knots: &[f64]) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom.abs() < f64::EPSILON {
                0.0
            } else {
                values[r] / denom
            };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    values
}

/// Computes the non-vanishing basis functions and their derivatives up to
/// order `n_ders` at `u`.
///
/// `result[k][j]` is the `k`-th derivative of basis function `span - degree + j`.
#[must_use]
#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::needless_range_loop
)]
pub fn basis_derivatives(
    span: usize,
    u: f64,
    degree: usize,
    n_ders: usize,
    knots: &[f64],
) -> Vec<Vec<f64>> {
    let p = degree;
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];
    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            // Lower triangle holds knot differences.
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = if ndu[j][r].abs() < f64::EPSILON {
                0.0
            } else {
                ndu[r][j - 1] / ndu[j][r]
            };
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let n_ders = n_ders.min(p);
    let mut ders = vec![vec![0.0; p + 1]; n_ders + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let mut a = vec![vec![0.0; p + 1]; 2];
    for r in 0..=p {
        let (mut s1, mut s2) = (0usize, 1usize);
        a[0][0] = 1.0;
        for k in 1..=n_ders {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;
            if r >= k {
                let denom = ndu[pk + 1][r - k];
                a[s2][0] = if denom.abs() < f64::EPSILON {
                    0.0
                } else {
                    a[s1][0] / denom
                };
                d = a[s2][0] * ndu[r - k][pk];
            }
            let j1: usize = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2: usize = if r <= pk + 1 { k - 1 } else { p - r };
            for j in j1..=j2 {
                let idx = (rk + j as isize) as usize;
                let denom = ndu[pk + 1][idx];
                a[s2][j] = if denom.abs() < f64::EPSILON {
                    0.0
                } else {
                    (a[s1][j] - a[s1][j - 1]) / denom
                };
                d += a[s2][j] * ndu[idx][pk];
            }
            if r <= pk {
                let denom = ndu[pk + 1][r];
                a[s2][k] = if denom.abs() < f64::EPSILON {
                    0.0
                } else {
                    -a[s1][k - 1] / denom
                };
                d += a[s2][k] * ndu[r][pk];
            }
            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    let mut factor = p as f64;
    for k in 1..=n_ders {
        for value in &mut ders[k] {
            *value *= factor;
        }
        factor *= (p - k) as f64;
    }
    ders
}
