//! Coordinate fragment libraries and best-fragment classification.

use serde::{Deserialize, Serialize};

use crate::structure::superpose::rmsd;
use crate::structure::Coords;

use super::StructureLibrary;

/// One structural fragment: a fixed-length run of alpha-carbon coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordFragment {
    /// The fragment's coordinates, one per residue.
    pub coords: Vec<Coords>,
}

/// A library of coordinate fragments.
///
/// Classification returns the fragment with the lowest superposition RMSD
/// against a window; ties resolve to the lowest bin index so repeated runs
/// classify identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordLibrary {
    name: String,
    fragment_size: usize,
    fragments: Vec<CoordFragment>,
}

impl CoordLibrary {
    /// Creates a library from fragments, deriving the fragment size from the
    /// first one.
    ///
    /// # Errors
    /// Returns a description of the problem when the fragment list is empty
    /// or the fragments disagree on length.
    pub fn new(
        name: impl Into<String>,
        fragments: Vec<CoordFragment>,
    ) -> std::result::Result<Self, String> {
        let lib = Self {
            name: name.into(),
            fragment_size: fragments.first().map_or(0, |f| f.coords.len()),
            fragments,
        };
        lib.validate()?;
        Ok(lib)
    }

    /// The library's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fragments, indexed by bin.
    #[must_use]
    pub fn fragments(&self) -> &[CoordFragment] {
        &self.fragments
    }

    /// Checks the shape invariants, for use after deserialization.
    ///
    /// # Errors
    /// Returns a description of the problem when the library is empty or a
    /// fragment has the wrong length.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.fragments.is_empty() {
            return Err("library has no fragments".to_string());
        }
        if self.fragment_size == 0 {
            return Err("fragment size is zero".to_string());
        }
        for (bin, fragment) in self.fragments.iter().enumerate() {
            if fragment.coords.len() != self.fragment_size {
                return Err(format!(
                    "fragment {bin} has {} coordinates, expected {}",
                    fragment.coords.len(),
                    self.fragment_size
                ));
            }
        }
        Ok(())
    }
}

impl StructureLibrary for CoordLibrary {
    fn size(&self) -> usize {
        self.fragments.len()
    }

    fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    fn classify(&self, window: &[Coords]) -> usize {
        let mut best = 0;
        let mut best_rmsd = f64::INFINITY;
        for (bin, fragment) in self.fragments.iter().enumerate() {
            let dist = rmsd(window, &fragment.coords);
            if dist < best_rmsd {
                best = bin;
                best_rmsd = dist;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(points: &[[f64; 3]]) -> CoordFragment {
        CoordFragment { coords: points.to_vec() }
    }

    fn straight_and_bent() -> CoordLibrary {
        CoordLibrary::new(
            "two-shapes",
            vec![
                fragment(&[[0.0, 0.0, 0.0], [3.8, 0.0, 0.0], [7.6, 0.0, 0.0]]),
                fragment(&[[0.0, 0.0, 0.0], [3.8, 0.0, 0.0], [3.8, 3.8, 0.0]]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_derives_fragment_size() {
        let lib = straight_and_bent();
        assert_eq!(lib.size(), 2);
        assert_eq!(lib.fragment_size(), 3);
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(CoordLibrary::new("empty", Vec::new()).is_err());
    }

    #[test]
    fn test_new_rejects_ragged_fragments() {
        let err = CoordLibrary::new(
            "ragged",
            vec![
                fragment(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]),
                fragment(&[[0.0, 0.0, 0.0]]),
            ],
        )
        .unwrap_err();
        assert!(err.contains("fragment 1"));
    }

    #[test]
    fn test_classify_self_match() {
        let lib = straight_and_bent();
        for (bin, frag) in lib.fragments().iter().enumerate() {
            assert_eq!(lib.classify(&frag.coords), bin);
        }
    }

    #[test]
    fn test_classify_translated_copy() {
        let lib = straight_and_bent();
        let shifted: Vec<Coords> =
            lib.fragments()[1].coords.iter().map(|p| [p[0] + 20.0, p[1], p[2] - 3.0]).collect();
        assert_eq!(lib.classify(&shifted), 1);
    }

    #[test]
    fn test_classify_always_in_range() {
        let lib = straight_and_bent();
        let window = [[1.0, 2.0, 3.0], [4.0, 6.0, 5.0], [9.0, 8.0, 7.0]];
        assert!(lib.classify(&window) < lib.size());
    }
}
