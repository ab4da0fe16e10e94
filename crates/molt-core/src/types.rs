//! Core types shared across the MOLT solver.
//!
//! A mesh is a flat `Vec<f64>` whose layout is described by an [`AxisOrder`]:
//! the first axis of the order varies fastest. Extents are always kept in
//! logical `[x, y, z]` order ([`Dims`]) regardless of the layout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Inclusive point counts along `[x, y, z]`.
pub type Dims = [usize; 3];

/// One of the three spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in a logical `[x, y, z]` triple.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The next axis in the cycle x → y → z → x.
    #[inline]
    pub const fn next(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A permutation of the three axes describing a flat buffer layout.
///
/// `AxisOrder::YZX` means y varies fastest, then z, then x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisOrder([Axis; 3]);

impl AxisOrder {
    pub const XYZ: AxisOrder = AxisOrder([Axis::X, Axis::Y, Axis::Z]);
    pub const XZY: AxisOrder = AxisOrder([Axis::X, Axis::Z, Axis::Y]);
    pub const YXZ: AxisOrder = AxisOrder([Axis::Y, Axis::X, Axis::Z]);
    pub const YZX: AxisOrder = AxisOrder([Axis::Y, Axis::Z, Axis::X]);
    pub const ZXY: AxisOrder = AxisOrder([Axis::Z, Axis::X, Axis::Y]);
    pub const ZYX: AxisOrder = AxisOrder([Axis::Z, Axis::Y, Axis::X]);

    pub const ALL: [AxisOrder; 6] = [
        AxisOrder::XYZ,
        AxisOrder::XZY,
        AxisOrder::YXZ,
        AxisOrder::YZX,
        AxisOrder::ZXY,
        AxisOrder::ZYX,
    ];

    /// Build an order from three axes, or `None` if an axis repeats.
    pub fn new(axes: [Axis; 3]) -> Option<Self> {
        let [a, b, c] = axes;
        (a != b && b != c && a != c).then_some(AxisOrder(axes))
    }

    /// The cyclic order that starts at `axis` (x → XYZ, y → YZX, z → ZXY).
    pub const fn cyclic_from(axis: Axis) -> Self {
        AxisOrder([axis, axis.next(), axis.next().next()])
    }

    #[inline]
    pub const fn axes(self) -> [Axis; 3] {
        self.0
    }

    /// The contiguous axis of this layout.
    #[inline]
    pub const fn fastest(self) -> Axis {
        self.0[0]
    }
}

impl Default for AxisOrder {
    fn default() -> Self {
        AxisOrder::XYZ
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in self.0 {
            write!(f, "{axis}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_cycle() {
        assert_eq!(Axis::X.next(), Axis::Y);
        assert_eq!(Axis::Z.next(), Axis::X);
        assert_eq!(Axis::Y.next().next().next(), Axis::Y);
    }

    #[test]
    fn test_order_rejects_repeats() {
        assert!(AxisOrder::new([Axis::X, Axis::X, Axis::Z]).is_none());
        assert_eq!(AxisOrder::new([Axis::Z, Axis::Y, Axis::X]), Some(AxisOrder::ZYX));
    }

    #[test]
    fn test_cyclic_orders() {
        assert_eq!(AxisOrder::cyclic_from(Axis::X), AxisOrder::XYZ);
        assert_eq!(AxisOrder::cyclic_from(Axis::Y), AxisOrder::YZX);
        assert_eq!(AxisOrder::cyclic_from(Axis::Z), AxisOrder::ZXY);
        assert_eq!(AxisOrder::ZXY.to_string(), "zxy");
    }
}
