//! Fixed-dimension real vectors used for particle displacements.

use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Spatial dimension used by the simulation.
pub const NDIM: usize = 3;

/// Displacement vector in the simulation dimension.
pub type Vec3 = Vector<NDIM>;

/// Fixed-dimension tuple of `f64` components.
///
/// Vectors are plain values: they are `Copy`, carry no identity and can be
/// freely duplicated. Components are read and written through indexing.
#[derive(Clone, Copy, PartialEq)]
pub struct Vector<const N: usize>([f64; N]);

impl<const N: usize> Vector<N> {
    /// Creates a vector from its components.
    pub const fn new(components: [f64; N]) -> Self {
        Self(components)
    }

    /// Vector with every component equal to zero.
    pub const fn zeros() -> Self {
        Self([0.0; N])
    }

    /// Vector with every component equal to `value`.
    pub const fn splat(value: f64) -> Self {
        Self([value; N])
    }

    /// Assigns `value` to every component.
    pub fn fill(&mut self, value: f64) {
        self.0 = [value; N];
    }

    /// Number of components.
    pub const fn dim(&self) -> usize {
        N
    }

    /// Borrow the components as an array.
    pub fn as_array(&self) -> &[f64; N] {
        &self.0
    }

    /// Euclidean inner product.
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        let mut acc = 0.0;
        for i in 0..N {
            acc += self.0[i] * other.0[i];
        }
        acc
    }

    /// Squared Euclidean length.
    #[inline]
    pub fn norm2(&self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm2().sqrt()
    }
}

impl<const N: usize> Default for Vector<N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const N: usize> From<[f64; N]> for Vector<N> {
    fn from(components: [f64; N]) -> Self {
        Self(components)
    }
}

impl<const N: usize> fmt::Debug for Vector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Vector").field(&self.0.as_slice()).finish()
    }
}

impl<const N: usize> Index<usize> for Vector<N> {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl<const N: usize> IndexMut<usize> for Vector<N> {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl<const N: usize> Add for Vector<N> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        for i in 0..N {
            self.0[i] += rhs.0[i];
        }
        self
    }
}

impl<const N: usize> Sub for Vector<N> {
    type Output = Self;

    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        for i in 0..N {
            self.0[i] -= rhs.0[i];
        }
        self
    }
}

impl<const N: usize> Neg for Vector<N> {
    type Output = Self;

    #[inline]
    fn neg(mut self) -> Self {
        for c in self.0.iter_mut() {
            *c = -*c;
        }
        self
    }
}

impl<const N: usize> Mul<f64> for Vector<N> {
    type Output = Self;

    #[inline]
    fn mul(mut self, rhs: f64) -> Self {
        for c in self.0.iter_mut() {
            *c *= rhs;
        }
        self
    }
}

impl<const N: usize> Serialize for Vector<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de, const N: usize> Deserialize<'de> for Vector<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let components = Vec::<f64>::deserialize(deserializer)?;
        let len = components.len();
        let array: [f64; N] = components
            .try_into()
            .map_err(|_| D::Error::invalid_length(len, &format!("{N} components").as_str()))?;
        Ok(Self(array))
    }
}
