//! Arena index types.
//!
//! Every AST node is referred to by a small `u32` index into the arena that
//! owns it rather than by `Box`/`Rc`, so the whole tree for a `Program` is
//! contiguous and drops in one shot with the arena. A `*Range` is a
//! `(start, len)` pair into a flattened side list (used for argument lists,
//! tuple elements, generic arguments, ...), avoiding a separate heap
//! allocation per list.

use std::fmt;

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

macro_rules! arena_range {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
        pub struct $name {
            pub start: u32,
            pub len: u32,
        }

        impl $name {
            pub const EMPTY: $name = $name { start: 0, len: 0 };

            pub fn new(start: usize, len: usize) -> Self {
                $name {
                    start: start as u32,
                    len: len as u32,
                }
            }

            pub fn range(self) -> std::ops::Range<usize> {
                self.start as usize..(self.start + self.len) as usize
            }

            pub fn is_empty(self) -> bool {
                self.len == 0
            }

            pub fn len(self) -> usize {
                self.len as usize
            }
        }
    };
}

arena_id!(ExprId);
arena_id!(StmtId);
arena_id!(PatternId);
arena_id!(TypeAstId);
arena_id!(DeclId);

arena_range!(ExprRange);
arena_range!(StmtRange);
arena_range!(PatternRange);
arena_range!(TypeAstRange);
arena_range!(DeclRange);
