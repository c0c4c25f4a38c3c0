//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and as
//! deterministic tie-breakers.  Junction, road and edge ids are dense and
//! assigned in input order by the graph builder, so `id.index()` addresses
//! the network's `Vec`s directly.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// A travelling agent, as known to the travel store.
    pub struct AgentId(u32);
}

typed_id! {
    /// A graph vertex: one per distinct road end-point coordinate.
    pub struct JunctionId(u32);
}

typed_id! {
    /// A road polyline, numbered in input order.
    pub struct RoadId(u32);
}

typed_id! {
    /// An undirected network edge (road-backed or transit-backed).
    pub struct EdgeId(u32);
}

typed_id! {
    /// A building or community the awareness layer is told about.
    pub struct FeatureId(u32);
}

typed_id! {
    /// A named bus/train line, numbered in input order.
    pub struct TransitRouteId(u32);
}
