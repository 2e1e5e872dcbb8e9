#![deny(missing_docs, missing_debug_implementations)]
#![doc(html_root_url = "https://docs.rs/keyed-slotmap/0.1.0")]
#![crate_name = "keyed_slotmap"]

//! # keyed-slotmap
//!
//! This library provides [`SlotMap`], an associative container that pairs
//! O(1) lookup by a caller-chosen key with iteration over a contiguous,
//! gap-free array of entries. Insertion, access, update and deletion all take
//! O(1) time.
//!
//! The difference between a [`HashMap`] and a slot map is where the values
//! live. A slot map stores its entries densely in a [`Vec`] and keeps a
//! [`HashMap`] from key to position. Iterating touches only live entries in
//! contiguous memory, never walking empty or tombstoned buckets.
//!
//! # Examples
//!
//! ```
//! # use keyed_slotmap::*;
//! let mut sm = SlotMap::new();
//! sm.insert("foo", 1);
//! sm.insert("bar", 2);
//! assert_eq!(sm["foo"], 1);
//! assert_eq!(sm.insert("bar", 3), Insertion::AlreadyExisted(2));
//!
//! sm.remove("foo");
//! assert_eq!(sm.get("foo"), None);
//! assert_eq!(sm.values().collect::<Vec<_>>(), vec![&3]);
//! ```
//!
//! # Removal and shrinking
//!
//! Removing an entry moves the last entry into its slot, so the live entries
//! always form the prefix `[0, len)` of the storage. The order of the
//! remaining entries is therefore not preserved. The slot at the end that
//! was vacated stays allocated as an empty garbage slot and is reused by the
//! next insertion.
//!
//! After heavy churn the garbage can dominate the storage. After every
//! removal the map consults its [`ShrinkPolicy`]: when the number of garbage
//! slots exceeds a count threshold (default 1000) **and** their share of the
//! storage exceeds a ratio threshold (default 10%), the storage is truncated
//! to the live entries. Large maps with a little garbage and small maps with
//! a little churn are left alone.
//!
//! ```
//! # use keyed_slotmap::*;
//! let mut sm = SlotMap::new();
//! for i in 0..2000 {
//!     sm.insert(i, i);
//! }
//! for i in 0..1001 {
//!     sm.remove(&i);
//! }
//! assert_eq!(sm.dense_len(), sm.len());
//! ```
//!
//! # Serialization through [`serde`]
//!
//! With the `serde` feature a [`SlotMap`] (de)serializes as a map of its live
//! entries. Slot positions are not preserved.
//!
//! # Logging
//!
//! With the `log` feature every shrink of the storage is reported as a
//! `trace` record under the `keyed_slotmap` target.
//!
//! [`Vec`]: https://doc.rust-lang.org/std/vec/struct.Vec.html
//! [`HashMap`]: https://doc.rust-lang.org/std/collections/struct.HashMap.html
//! [`SlotMap`]: dense/struct.SlotMap.html
//! [`ShrinkPolicy`]: policy/struct.ShrinkPolicy.html
//! [`serde`]: https://github.com/serde-rs/serde

#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
mod util;

pub mod outcome;
pub use outcome::{Insertion, Update};

pub mod policy;
pub use policy::{ShrinkPolicy, DEFAULT_GARBAGE_COUNT, DEFAULT_GARBAGE_RATIO};

pub mod dense;
pub use dense::SlotMap;
