//! An Apple device tree (ADT) and flattened device tree (FDT) parser for
//! embedded, low memory, and hosted environments.
//!
//! Both binary encodings decode into one owned logical tree model
//! ([`adt::AdtNode`]), which the rest of the crate operates on:
//!
//! * [Low-level flattened-format parsing utilities](base)
//! * [The logical tree model and the vendor-form codec](adt)
//! * [Flattened-to-logical conversion](convert)
//! * [Device tree source and dump renderings](text)
//! * [Path lookup, search, diff and register translation](query)
//!
//! ## Features
//!
//! This crate can be used without the standard library (`#![no_std]`) by
//! disabling the default `std` feature; an allocator is always required. To
//! use `no-std` place the following in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies.adt-rs]
//! version = "x"
//! default-features = false
//! ```
#![deny(clippy::all, clippy::cargo)]
#![allow(clippy::as_conversions)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate core;
extern crate endian_type_rs as endian_type;
#[macro_use]
extern crate log;
#[macro_use]
extern crate memoffset;
#[macro_use]
extern crate static_assertions;

pub mod error;

pub mod adt;
pub mod base;
pub mod convert;
pub mod prelude;
pub mod query;
pub mod spec;
pub mod text;

pub(crate) mod priv_util;

pub use crate::adt::{AdtNode, AdtProp, AdtValue};
pub use crate::base::DevTree;
pub use crate::error::DevTreeError;

/// Parse a device tree buffer of either supported format.
///
/// The buffer is first decoded as a flattened device tree; on any structural
/// failure (bad magic, inconsistent layout, broken token stream) it is
/// retried as the vendor form. An error from that second attempt is the one
/// surfaced to the caller.
pub fn from_bytes(buf: &[u8]) -> Result<AdtNode, DevTreeError> {
    match DevTree::new(buf).and_then(|fdt| convert::to_adt(&fdt)) {
        Ok(root) => Ok(root),
        Err(e) => {
            debug!("flattened decode failed ({:?}), retrying as vendor form", e);
            adt::codec::decode(buf)
        }
    }
}
