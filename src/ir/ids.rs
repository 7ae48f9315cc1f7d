//! Newtype ids for images, annotations and categories.
//!
//! Image and annotation ids are sequential within one output document and
//! carry no meaning across runs; category ids come from the label map.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifies an image within one output document.
    ImageId
);

define_id!(
    /// Identifies an annotation within one output document.
    AnnotationId
);

define_id!(
    /// A category id. 0 is reserved for "background".
    CategoryId
);

impl CategoryId {
    pub const BACKGROUND: CategoryId = CategoryId(0);

    #[inline]
    pub fn is_background(&self) -> bool {
        *self == Self::BACKGROUND
    }
}

/// Hands out 1, 2, 3, ... for one id kind.
///
/// The collector keeps one counter per id kind per document, so two runs
/// over the same sorted inputs assign the same ids.
#[derive(Debug)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the current id and advances the counter.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}
