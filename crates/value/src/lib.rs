//! Persistent JSON document values.
//!
//! [`Doc`] is a JSON-like value whose strings, arrays and objects live behind
//! [`Arc`](std::sync::Arc). Cloning a document is O(1), and editing a clone
//! through [`Doc::make_array_mut`] / [`Doc::make_object_mut`] copies only the
//! containers on the edited path. Every other subtree stays shared with the
//! original, which is what lets stream consumers keep old snapshots around
//! and compare them by identity.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use v0_stream_value::Doc;
//!
//! let original = Doc::from(json!([[0, ["hello", "world"]]]));
//! let mut edited = original.clone();
//! assert!(edited.ptr_eq(&original));
//!
//! edited.make_array_mut().unwrap().push(Doc::from("tail"));
//! assert!(!edited.ptr_eq(&original));
//! // The untouched first node is still the same allocation.
//! assert!(edited.get_index(0).unwrap().ptr_eq(original.get_index(0).unwrap()));
//! ```

pub mod convert;
pub mod doc;
pub mod path;

pub use doc::{Doc, Map};
pub use path::PathStep;
