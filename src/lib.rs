//! Parser and generator for structured agent names.
//!
//! This crate implements parsing, validation, and generation of the names
//! under which agents register in an Agent Name Service.
//!
//! # Overview
//!
//! An agent name states who the agent is, what it is named after and who
//! operates it. Names have the structure:
//!
//! ```text
//! protocol://agentId.capability.provider.vVersion[.extension]
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ans_name::AnsName;
//!
//! // Parse an agent name
//! let name = AnsName::parse("a2a://model1.ml-inference.acme.v1.prod").unwrap();
//!
//! // Access components
//! assert_eq!(name.agent_id(), "model1");
//! assert_eq!(name.capability(), "ml-inference");
//! assert_eq!(name.extension(), Some("prod"));
//!
//! // Build a name from components
//! let built = AnsName::new("a2a", "model1", "ml-inference", "acme", "1", Some("prod")).unwrap();
//! assert_eq!(built, name);
//! ```
//!
//! # Grammar
//!
//! | Component | Rule |
//! |-----------|------|
//! | Protocol | everything before the first `:`, non-empty, followed by `://` |
//! | Agent ID | first dotted segment, non-empty |
//! | Capability | second dotted segment, non-empty |
//! | Provider | third dotted segment, non-empty |
//! | Version | fourth segment, `v` followed by a non-empty value |
//! | Extension | everything after the fourth dot, optional, no line terminators |
//!
//! Parsing and generation are exact inverses: for every parsed name,
//! `generate()` reproduces the input byte for byte.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod constants;
mod error;
mod name;
pub mod prelude;

pub use constants::{
    DEFAULT_CAPABILITY, DEFAULT_PROTOCOL, SCHEME_SEPARATOR, SEGMENT_SEPARATOR,
    VERSION_PREFIX,
};
pub use error::{ParseError, ParseErrorKind};
pub use name::AnsName;
