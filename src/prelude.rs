//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use ans_name::prelude::*;
//!
//! let name = AnsName::parse("a2a://model1.ml-inference.acme.v1").unwrap();
//! assert_eq!(name.protocol(), DEFAULT_PROTOCOL);
//! ```

pub use crate::{
    // Core type
    AnsName,
    // Errors
    ParseError, ParseErrorKind,
    // Constants
    DEFAULT_CAPABILITY, DEFAULT_PROTOCOL, SCHEME_SEPARATOR, SEGMENT_SEPARATOR,
    VERSION_PREFIX,
};
