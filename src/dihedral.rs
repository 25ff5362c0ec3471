//! The eight symmetries of the board: quarter-turn rotations, optionally
//! preceded by an up-down flip.
//!
//! `forward` flips first and then rotates counter-clockwise; `inverse` undoes
//! the rotations and then the flip. Odd rotation counts swap the row and
//! column counts, so non-square boards only use the shape-preserving elements.

use crate::encoder::Planes;
use crate::types::Point;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Dihedral {
    /// Counter-clockwise quarter turns, 0..4.
    pub rotations: u8,
    pub flip: bool,
}

/// One counter-clockwise quarter turn of a 0-indexed `(r, c)` on an `h x w` grid.
/// Returns the new position and the new grid shape.
#[inline]
fn rotate_ccw((r, c): (usize, usize), (h, w): (usize, usize)) -> ((usize, usize), (usize, usize)) {
    ((w - 1 - c, r), (w, h))
}

/// One clockwise quarter turn; undoes [`rotate_ccw`].
#[inline]
fn rotate_cw((r, c): (usize, usize), (h, w): (usize, usize)) -> ((usize, usize), (usize, usize)) {
    ((c, h - 1 - r), (w, h))
}

impl Dihedral {
    pub const IDENTITY: Dihedral = Dihedral {
        rotations: 0,
        flip: false,
    };

    pub fn new(rotations: u8, flip: bool) -> Self {
        debug_assert!(rotations < 4);
        Dihedral {
            rotations: rotations % 4,
            flip,
        }
    }

    /// All eight elements: rotations 0..4 without flip, then with flip.
    pub fn all() -> [Dihedral; 8] {
        let mut out = [Dihedral::IDENTITY; 8];
        for (i, d) in out.iter_mut().enumerate() {
            *d = Dihedral::new((i % 4) as u8, i >= 4);
        }
        out
    }

    /// Does this element keep an `rows x cols` board the same shape?
    #[inline]
    pub fn preserves_shape(&self, rows: usize, cols: usize) -> bool {
        rows == cols || self.rotations % 2 == 0
    }

    /// A uniformly random element valid for an `rows x cols` board.
    pub fn random(rng: &mut fastrand::Rng, rows: usize, cols: usize) -> Self {
        if rows == cols {
            let i = rng.u8(0..8);
            Dihedral::new(i % 4, i >= 4)
        } else {
            let i = rng.u8(0..4);
            Dihedral::new((i % 2) * 2, i >= 2)
        }
    }

    /// Shape of an `rows x cols` board after the transform.
    #[inline]
    pub fn output_shape(&self, rows: usize, cols: usize) -> (usize, usize) {
        if self.rotations % 2 == 0 {
            (rows, cols)
        } else {
            (cols, rows)
        }
    }

    /// Where `point` of an `rows x cols` board lands.
    pub fn forward_point(&self, point: Point, rows: usize, cols: usize) -> Point {
        let mut pos = (point.row - 1, point.col - 1);
        let mut shape = (rows, cols);
        if self.flip {
            pos.0 = rows - 1 - pos.0;
        }
        for _ in 0..self.rotations {
            (pos, shape) = rotate_ccw(pos, shape);
        }
        Point::new(pos.0 + 1, pos.1 + 1)
    }

    /// Where `point` of the transformed board came from. `rows` and `cols`
    /// describe the board before the transform.
    pub fn inverse_point(&self, point: Point, rows: usize, cols: usize) -> Point {
        let mut pos = (point.row - 1, point.col - 1);
        let mut shape = self.output_shape(rows, cols);
        for _ in 0..self.rotations {
            (pos, shape) = rotate_cw(pos, shape);
        }
        if self.flip {
            pos.0 = rows - 1 - pos.0;
        }
        Point::new(pos.0 + 1, pos.1 + 1)
    }

    /// Transform every plane of `input`.
    pub fn forward_planes(&self, input: &Planes) -> Planes {
        if *self == Dihedral::IDENTITY {
            return input.clone();
        }
        let (rows, cols) = self.output_shape(input.rows, input.cols);
        let mut output = Planes::zeros(input.num_planes, rows, cols);
        for plane in 0..input.num_planes {
            for row in 1..=input.rows {
                for col in 1..=input.cols {
                    let p = Point::new(row, col);
                    let q = self.forward_point(p, input.rows, input.cols);
                    output.set(plane, q, input.get(plane, p));
                }
            }
        }
        output
    }

    /// Map priors computed on the transformed board back to the original
    /// `rows x cols` board. A trailing pass entry is copied as is.
    pub fn inverse_priors(&self, priors: &[f32], rows: usize, cols: usize) -> Vec<f32> {
        if *self == Dihedral::IDENTITY {
            return priors.to_vec();
        }
        let (out_rows, out_cols) = self.output_shape(rows, cols);
        let area = rows * cols;
        let mut result = priors.to_vec();
        for (index, &prior) in priors.iter().enumerate().take(area) {
            let q = Point::new(index / out_cols + 1, index % out_cols + 1);
            debug_assert!(q.row <= out_rows);
            let p = self.inverse_point(q, rows, cols);
            result[(p.row - 1) * cols + p.col - 1] = prior;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_turn_is_counter_clockwise() {
        let d = Dihedral::new(1, false);
        // Top-left goes to bottom-left, top-right to top-left.
        assert_eq!(d.forward_point(Point::new(1, 1), 3, 3), Point::new(3, 1));
        assert_eq!(d.forward_point(Point::new(1, 3), 3, 3), Point::new(1, 1));
    }

    #[test]
    fn test_flip_is_up_down() {
        let d = Dihedral::new(0, true);
        assert_eq!(d.forward_point(Point::new(1, 2), 4, 4), Point::new(4, 2));
    }

    #[test]
    fn test_inverse_undoes_forward() {
        for d in Dihedral::all() {
            for row in 1..=5 {
                for col in 1..=5 {
                    let p = Point::new(row, col);
                    let q = d.forward_point(p, 5, 5);
                    assert_eq!(d.inverse_point(q, 5, 5), p, "{d:?}");
                }
            }
        }
    }

    #[test]
    fn test_all_elements_are_distinct() {
        let images: std::collections::HashSet<Point> = Dihedral::all()
            .iter()
            .map(|d| d.forward_point(Point::new(1, 2), 5, 5))
            .collect();
        assert_eq!(images.len(), 8);
    }

    #[test]
    fn test_random_preserves_shape_on_rectangles() {
        let mut rng = fastrand::Rng::with_seed(9);
        for _ in 0..100 {
            let d = Dihedral::random(&mut rng, 3, 5);
            assert!(d.preserves_shape(3, 5));
            for row in 1..=3 {
                for col in 1..=5 {
                    let p = Point::new(row, col);
                    assert_eq!(d.inverse_point(d.forward_point(p, 3, 5), 3, 5), p);
                }
            }
        }
    }

    #[test]
    fn test_planes_and_priors_agree() {
        let mut planes = Planes::zeros(1, 4, 4);
        planes.set(0, Point::new(1, 2), 1.0);
        let mut priors = vec![0.0; 17];
        priors[16] = 0.5;
        for d in Dihedral::all() {
            let out = d.forward_planes(&planes);
            let q = d.forward_point(Point::new(1, 2), 4, 4);
            assert_eq!(out.get(0, q), 1.0);
            assert_eq!(out.data.iter().sum::<f32>(), 1.0);

            // A prior placed on the transformed point maps back to (1,2).
            let mut transformed = priors.clone();
            transformed[(q.row - 1) * 4 + q.col - 1] = 1.0;
            let back = d.inverse_priors(&transformed, 4, 4);
            assert_eq!(back[1], 1.0);
            assert_eq!(back[16], 0.5);
            assert_eq!(back.iter().sum::<f32>(), 1.5);
        }
    }
}
