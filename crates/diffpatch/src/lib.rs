//! Structural diff application.
//!
//! Applies deltas in the jsondiffpatch format to a [`Doc`](v0_stream_value::Doc):
//!
//! | delta | meaning |
//! |---|---|
//! | `[new]` | value added (or replaced) |
//! | `[old, new]` | value modified |
//! | `[old, 0, 0]` | value deleted |
//! | `[unidiff, 0, 2]` | string patched with a unified text diff |
//! | `["", dest, 3]` | array item moved to `dest` (array deltas only) |
//! | `{key: delta, ..}` | object members patched |
//! | `{"_t": "a", "N": delta, "_N": delta, ..}` | array items patched |
//!
//! [`patch`] never touches its input: it edits a copy-on-write clone and
//! throws the clone away if any part of the delta fails to apply.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use v0_stream_value::Doc;
//! use v0_stream_diffpatch::patch;
//!
//! let doc = Doc::from(json!([[0, ["hello"]]]));
//! let delta = json!({"_t": "a", "0": {"_t": "a", "1": {"_t": "a", "1": ["world"]}}});
//! let patched = patch(&doc, &delta).unwrap();
//! assert_eq!(patched, Doc::from(json!([[0, ["hello", "world"]]])));
//! assert_eq!(doc, Doc::from(json!([[0, ["hello"]]])));
//! ```

pub mod apply;
pub mod text;
pub mod types;

pub use apply::{patch, patch_in_place};
pub use types::{DeltaKind, PatchError};
