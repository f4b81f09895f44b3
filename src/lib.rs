//! xml-cloak: reversible masking of XML constructs
//!
//! When an XML document is parsed, several irreversible changes are applied:
//! referenced entities are replaced with their values, included content
//! (XIncludes) is merged, and default DTD attribute values are injected. If
//! an XSLT transformation only needs to alter structure, update attributes or
//! insert comments, the rest of the content should stay untouched.
//!
//! ## How it works
//!
//! 1. **Cloak**: mask the DOCTYPE, entity references, XIncludes and CDATA
//!    ampersands with inert placeholder tokens, and append a marker
//! 2. **Transform**: run the XML tool over the cloaked surrogate
//! 3. **Uncloak**: replay the placeholder substitutions in fixed order
//!
//! No parsing takes place in either direction; the engine is a pure
//! text-to-text substitution keyed to a fixed marker and token table.

pub mod cloaker;
mod tokens;

pub use cloaker::{cloak, cloak_file, is_cloaked, uncloak};
