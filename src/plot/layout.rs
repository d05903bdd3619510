//! Vertical nudging of country labels so neighbouring flags do not overlap.
//!
//! Labels are placed in order; each one is compared against the labels
//! already placed within `x_window` (data units, bp) and moved when it sits
//! closer than `min_distance` (notches).

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy {
    /// Step past every conflicting label in turn.
    Cascade,
    /// On the first conflict, try `±d` and `±1.5d` around it and keep the
    /// candidate with the fewest overlaps inside `bounds`.
    BestCandidate { bounds: (f64, f64) },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRule {
    pub min_distance: f64,
    pub x_window: f64,
    pub strategy: Strategy,
}

impl LabelRule {
    pub fn full_plot() -> Self {
        Self {
            min_distance: 0.8,
            x_window: 50.0,
            strategy: Strategy::Cascade,
        }
    }

    pub fn investment_plot(y_bounds: (f64, f64)) -> Self {
        Self {
            min_distance: 0.6,
            x_window: 40.0,
            strategy: Strategy::BestCandidate { bounds: y_bounds },
        }
    }
}

/// Final `(x, y)` label positions for `anchors`, in the same order.
pub fn place_labels(anchors: &[(f64, f64)], rule: LabelRule) -> Vec<(f64, f64)> {
    let d = rule.min_distance;
    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(anchors.len());

    for &(x, y) in anchors {
        let mut ly = y;
        match rule.strategy {
            Strategy::Cascade => {
                for &(ux, uy) in &placed {
                    if (x - ux).abs() < rule.x_window && (ly - uy).abs() < d {
                        ly = if ly >= uy { uy + d } else { uy - d };
                    }
                }
            }
            Strategy::BestCandidate { bounds: (lo, hi) } => {
                let conflict = placed
                    .iter()
                    .find(|&&(ux, uy)| (x - ux).abs() < rule.x_window && (ly - uy).abs() < d);
                if let Some(&(_, uy)) = conflict {
                    let overlaps = |cy: f64| {
                        placed
                            .iter()
                            .filter(|&&(ux, py)| (x - ux).abs() < rule.x_window && (cy - py).abs() < d)
                            .count()
                    };
                    let mut best: Option<(usize, f64)> = None;
                    for cy in [uy + d, uy - d, uy + 1.5 * d, uy - 1.5 * d] {
                        if cy < lo || cy > hi {
                            continue;
                        }
                        let n = overlaps(cy);
                        if best.is_none_or(|(bn, _)| n < bn) {
                            best = Some((n, cy));
                        }
                    }
                    if let Some((_, cy)) = best {
                        ly = cy;
                    }
                }
            }
        }
        placed.push((x, ly));
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distant_labels_stay_put() {
        let anchors = [(0.0, 10.0), (100.0, 10.0), (0.0, 12.0)];
        assert_eq!(place_labels(&anchors, LabelRule::full_plot()), anchors);
    }

    #[test]
    fn cascade_steps_over_each_neighbour() {
        let anchors = [(0.0, 10.0), (10.0, 10.0), (20.0, 10.0)];
        let placed = place_labels(&anchors, LabelRule::full_plot());
        assert!((placed[1].1 - 10.8).abs() < 1e-12);
        // Pushed past the first label, then past the second.
        assert!((placed[2].1 - 11.6).abs() < 1e-12);
    }

    #[test]
    fn best_candidate_respects_bounds() {
        let rule = LabelRule::investment_plot((12.8, 22.5));
        let anchors = [(0.0, 22.0), (5.0, 22.0), (10.0, 22.0)];
        let placed = place_labels(&anchors, rule);
        // 22.6 is out of bounds, so the label goes below.
        assert!((placed[1].1 - 21.4).abs() < 1e-12);
        // Both in-bounds candidates overlap one label; the first one is kept.
        assert!((placed[2].1 - 21.4).abs() < 1e-12);
    }

    #[test]
    fn best_candidate_keeps_position_when_nothing_fits() {
        let rule = LabelRule::investment_plot((21.9, 22.1));
        let placed = place_labels(&[(0.0, 22.0), (1.0, 22.0)], rule);
        assert_eq!(placed[1], (1.0, 22.0));
    }
}
