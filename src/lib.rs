//! This crate is an implementation of ordered associative containers: sorted maps and sets, each
//! available with either unique or duplicate keys.
//!
//! # Purpose
//! The standard library offers [`BTreeMap`](std::collections::BTreeMap) and
//! [`BTreeSet`](std::collections::BTreeSet), but neither accepts a comparator other than [`Ord`],
//! allows duplicate keys, or lets a caller hold on to the location of an entry while the
//! collection changes around it. The collections here do all three, behind one structure: a
//! self-balancing binary tree whose nodes live in an arena.
//!
//! # Method
//! Every collection in [`collections::tree`] is a thin view over the same tree. Duplicate handling
//! is a type parameter rather than a separate implementation, and sets are maps with `()` values.
//! Entries are addressed by [`Position`](collections::tree::Position)s, which are checked handles
//! into the arena. Used with the collection that produced it, a position which has outlived its
//! entry is detected rather than aliased to whatever was stored in the slot afterwards. Positions
//! carry no identity of their collection, so using one with another collection is a logic error.
//!
//! # Error Handling
//! Absence is never an error: a missing key gives an end position, [`None`], `false` or a count of
//! zero. The only failure is misuse of a position (dereferencing the end, or a stale position).
//! Methods which can fail this way come in pairs: one which panics and a `try_` variant which
//! returns a strongly typed [`Result`].
//!
//! When this crate employs errors via [`Result`]s, it does so in a method that is strongly typed,
//! using enums for static dispatch rather than dynamic, which implement
//! [`Error`](std::error::Error).
//!
//! # Dependencies
//! This crate uses `std`. It depends on `derive_more` for error and variant boilerplate and on
//! `tracing` for diagnostics of whole-collection operations. No subscriber is installed; that's
//! left to the application.
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod collections;

pub(crate) mod util;
