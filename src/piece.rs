use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Catalog
// ============================================================================

/// A `(row, col)` offset from the piece pivot.
pub type Offset = (i16, i16);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Shape {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

const I_STATES: [[Offset; 4]; 2] = [
    [(0, -2), (0, -1), (0, 0), (0, 1)],
    [(-2, 0), (-1, 0), (0, 0), (1, 0)],
];

const O_STATES: [[Offset; 4]; 1] = [[(0, 0), (0, 1), (1, 0), (1, 1)]];

const T_STATES: [[Offset; 4]; 4] = [
    [(0, -1), (0, 0), (0, 1), (1, 0)],
    [(-1, 0), (0, 0), (1, 0), (0, 1)],
    [(0, -1), (0, 0), (0, 1), (-1, 0)],
    [(-1, 0), (0, 0), (1, 0), (0, -1)],
];

const S_STATES: [[Offset; 4]; 2] = [
    [(0, 0), (0, 1), (1, -1), (1, 0)],
    [(-1, 0), (0, 0), (0, 1), (1, 1)],
];

const Z_STATES: [[Offset; 4]; 2] = [
    [(0, -1), (0, 0), (1, 0), (1, 1)],
    [(-1, 1), (0, 1), (0, 0), (1, 0)],
];

const J_STATES: [[Offset; 4]; 4] = [
    [(0, -1), (0, 0), (0, 1), (1, -1)],
    [(-1, 0), (0, 0), (1, 0), (-1, -1)],
    [(-1, 1), (0, -1), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (1, 1)],
];

const L_STATES: [[Offset; 4]; 4] = [
    [(0, -1), (0, 0), (0, 1), (1, 1)],
    [(-1, 0), (0, 0), (1, 0), (-1, 1)],
    [(-1, -1), (0, -1), (0, 0), (0, 1)],
    [(-1, 0), (0, 0), (1, 0), (1, -1)],
];

/// Rotation states indexed by `Shape as usize`.
const CATALOG: [&[[Offset; 4]]; 7] = [
    &I_STATES, &O_STATES, &T_STATES, &S_STATES, &Z_STATES, &J_STATES, &L_STATES,
];

const fn catalog_is_valid() -> bool {
    let mut i = 0;
    while i < CATALOG.len() {
        let states = CATALOG[i].len();
        if !(states == 1 || states == 2 || states == 4) {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(catalog_is_valid(), "every shape needs 1, 2 or 4 rotation states");

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::I,
        Shape::O,
        Shape::T,
        Shape::S,
        Shape::Z,
        Shape::J,
        Shape::L,
    ];

    /// All rotation states of this shape, in clockwise order.
    pub fn rotations(self) -> &'static [[Offset; 4]] {
        CATALOG[self as usize]
    }

    pub fn state_count(self) -> usize {
        self.rotations().len()
    }

    /// Offsets for `rotation`, wrapped to the shape's state count.
    pub fn offsets(self, rotation: usize) -> &'static [Offset; 4] {
        let states = self.rotations();
        &states[rotation % states.len()]
    }

    /// Uniform draw over the seven shapes.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Shape::ALL[rng.gen_range(0..Shape::ALL.len())]
    }
}

// ============================================================================
// Piece Providers
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> Shape;
}

/// Independent uniform draws, no bag.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    /// Seeded providers yield the same sequence on every run.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> Shape {
        Shape::random(&mut self.rng)
    }
}

/// Cycles through a fixed list of shapes.
pub struct SequencePieceProvider {
    pieces: Vec<Shape>,
    index: usize,
}

impl SequencePieceProvider {
    /// # Panics
    ///
    /// Panics if `pieces` is empty.
    pub fn new(pieces: Vec<Shape>) -> Self {
        assert!(!pieces.is_empty(), "sequence provider needs at least one shape");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> Shape {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn state_counts_match_shape_symmetry() {
        assert_eq!(Shape::O.state_count(), 1);
        for shape in [Shape::I, Shape::S, Shape::Z] {
            assert_eq!(shape.state_count(), 2, "{shape:?}");
        }
        for shape in [Shape::T, Shape::J, Shape::L] {
            assert_eq!(shape.state_count(), 4, "{shape:?}");
        }
    }

    #[test]
    fn every_state_has_four_distinct_cells() {
        for shape in Shape::ALL {
            for state in shape.rotations() {
                let unique: HashSet<_> = state.iter().collect();
                assert_eq!(unique.len(), 4, "{shape:?} {state:?}");
            }
        }
    }

    #[test]
    fn every_state_occupies_the_pivot() {
        for shape in Shape::ALL {
            for state in shape.rotations() {
                assert!(state.contains(&(0, 0)), "{shape:?} {state:?}");
            }
        }
    }

    #[test]
    fn offsets_wrap_rotation_index() {
        assert_eq!(Shape::T.offsets(4), Shape::T.offsets(0));
        assert_eq!(Shape::I.offsets(3), Shape::I.offsets(1));
        assert_eq!(Shape::O.offsets(7), Shape::O.offsets(0));
    }

    #[test]
    fn seeded_random_provider_is_reproducible() {
        let mut a = RandomPieceProvider::new(Some(42));
        let mut b = RandomPieceProvider::new(Some(42));
        let first: Vec<Shape> = (0..32).map(|_| a.next_piece()).collect();
        let second: Vec<Shape> = (0..32).map(|_| b.next_piece()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn random_draws_cover_all_shapes() {
        let mut provider = RandomPieceProvider::new(Some(7));
        let seen: HashSet<Shape> = (0..500).map(|_| provider.next_piece()).collect();
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn sequence_provider_cycles() {
        let mut provider = SequencePieceProvider::new(vec![Shape::I, Shape::O]);
        assert_eq!(provider.next_piece(), Shape::I);
        assert_eq!(provider.next_piece(), Shape::O);
        assert_eq!(provider.next_piece(), Shape::I);
    }

    #[test]
    #[should_panic]
    fn sequence_provider_rejects_empty_list() {
        SequencePieceProvider::new(Vec::new());
    }
}
