//! Identifier newtypes for datastore rows and scopes

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Get the raw id value
            #[inline]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                $name(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifies a civil-engineering project
    ProjectId
);
id_type!(
    /// Identifies one source drawing within a project
    DrawingId
);
id_type!(
    /// Identifies a domain object row within its table
    ObjectId
);
id_type!(
    /// Identifies a per-project layer record
    LayerId
);
id_type!(
    /// Identifies a logical utility network
    NetworkId
);

/// A coordinate reference system identifier
///
/// Every geometry write carries an explicit SRID; the datastore default is
/// never relied on, because CAD imports may use arbitrary local or
/// projected systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Srid(pub u32);

impl Srid {
    /// WGS 84 geographic coordinates
    pub const WGS84: Srid = Srid(4326);

    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Srid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
