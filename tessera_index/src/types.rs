// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box and scalar primitives shared by every backend.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// Edges are inclusive: a box whose `max_x` equals another's `min_x` touches
/// it, and a point on an edge is contained.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Left edge.
    pub min_x: T,
    /// Top edge.
    pub min_y: T,
    /// Right edge.
    pub max_x: T,
    /// Bottom edge.
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a box from its min and max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether the point lies inside the box or on its edge.
    #[inline]
    pub fn contains_point(&self, x: T, y: T) -> bool {
        self.min_x <= x && x <= self.max_x && self.min_y <= y && y <= self.max_y
    }

    /// Whether `other` lies entirely inside this box.
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Whether the two boxes share at least one point.
    ///
    /// Shared edges count as overlap, which is what point hit-testing with a
    /// zero-area query box relies on.
    ///
    /// ```
    /// use tessera_index::Aabb2D;
    ///
    /// let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
    /// assert!(a.overlaps(&Aabb2D::new(10.0, 0.0, 20.0, 10.0)));
    /// assert!(a.overlaps(&Aabb2D::new(3.0, 3.0, 3.0, 3.0)));
    /// assert!(!a.overlaps(&Aabb2D::new(10.5, 0.0, 20.0, 10.0)));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// The overlapping region of two boxes. Inverted when they are disjoint.
    #[inline]
    pub fn intersect(&self, other: &Self) -> Self {
        Self::new(
            max_t(self.min_x, other.min_x),
            max_t(self.min_y, other.min_y),
            min_t(self.max_x, other.max_x),
            min_t(self.max_y, other.max_y),
        )
    }

    /// The smallest box enclosing both boxes.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            min_t(self.min_x, other.min_x),
            min_t(self.min_y, other.min_y),
            max_t(self.max_x, other.max_x),
            max_t(self.max_y, other.max_y),
        )
    }

    /// True when the box has no area. Assumes no NaN.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create a box from an origin and a size.
    #[inline]
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self::new(x, y, T::add(x, w), T::add(y, h))
    }

    /// Area in the scalar's widened accumulator. Inverted boxes have zero area.
    #[inline]
    pub fn area(&self) -> T::Acc {
        let w = T::max(T::sub(self.max_x, self.min_x), T::zero());
        let h = T::max(T::sub(self.max_y, self.min_y), T::zero());
        T::widen(w) * T::widen(h)
    }

    /// How much this box's area grows when extended to cover `other`.
    #[inline]
    pub fn enlargement(&self, other: &Self) -> T::Acc {
        self.union(other).area() - self.area()
    }
}

/// Numeric coordinate type accepted by the index.
///
/// The R-tree compares areas while choosing subtrees and splitting nodes;
/// those comparisons run in the widened [`Scalar::Acc`] type (`f32` → `f64`,
/// `i64` → `i128`) so that products of large coordinates do not overflow or
/// lose ordering.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator used for areas.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// `a + b`.
    fn add(a: Self, b: Self) -> Self;
    /// `a - b`.
    fn sub(a: Self, b: Self) -> Self;
    /// Additive identity.
    fn zero() -> Self;
    /// Larger of the two values.
    fn max(a: Self, b: Self) -> Self;
    /// Smaller of the two values.
    fn min(a: Self, b: Self) -> Self;
    /// Convert into the accumulator type.
    fn widen(v: Self) -> Self::Acc;
}

macro_rules! float_scalar {
    ($t:ty, $acc:ty) => {
        impl Scalar for $t {
            type Acc = $acc;

            #[inline]
            fn add(a: Self, b: Self) -> Self {
                a + b
            }

            #[inline]
            fn sub(a: Self, b: Self) -> Self {
                a - b
            }

            #[inline(always)]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn max(a: Self, b: Self) -> Self {
                <$t>::max(a, b)
            }

            #[inline]
            fn min(a: Self, b: Self) -> Self {
                <$t>::min(a, b)
            }

            #[inline]
            fn widen(v: Self) -> Self::Acc {
                <$acc>::from(v)
            }
        }
    };
}

float_scalar!(f32, f64);
float_scalar!(f64, f64);

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        core::cmp::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        core::cmp::min(a, b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        i128::from(v)
    }
}

/// The accumulator type associated with a scalar `T`.
pub type ScalarAcc<T> = <T as Scalar>::Acc;

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2D;

    #[test]
    fn area_of_inverted_box_is_zero() {
        let mut aabb = Aabb2D::<f64>::new(5., 7., 10., 9.);
        assert_eq!(aabb.area(), 10.0);
        assert!(!aabb.is_empty());

        aabb.max_x = -aabb.max_x;
        assert_eq!(aabb.area(), 0.0);
        assert!(aabb.is_empty());
    }

    #[test]
    fn point_on_edge_is_contained() {
        let aabb = Aabb2D::new(0_i64, 0, 10, 10);
        assert!(aabb.contains_point(10, 10));
        assert!(aabb.contains_point(0, 5));
        assert!(!aabb.contains_point(11, 5));
    }

    #[test]
    fn enlargement_is_zero_for_contained_boxes() {
        let outer = Aabb2D::new(0.0_f32, 0.0, 10.0, 10.0);
        let inner = Aabb2D::new(2.0, 2.0, 4.0, 4.0);
        assert!(outer.contains(&inner));
        assert_eq!(outer.enlargement(&inner), 0.0);
        assert_eq!(inner.enlargement(&outer), 96.0);
    }

    #[test]
    fn i64_area_widens() {
        let big = Aabb2D::new(0_i64, 0, i64::from(i32::MAX), i64::from(i32::MAX));
        let expected = i128::from(i32::MAX) * i128::from(i32::MAX);
        assert_eq!(big.area(), expected);
    }
}
