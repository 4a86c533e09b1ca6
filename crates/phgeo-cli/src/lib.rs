//! phgeo-cli
//! =========
//!
//! Command-line interface for the `phgeo-core` Philippine geography store.
//!
//! This crate primarily provides a binary (`phgeo`). The library target only
//! exists so docs.rs renders this overview.
//!
//! Basic usage:
//!
//! ```text
//! phgeo load
//! phgeo stats
//! phgeo lookup 137404000
//! phgeo search "dona imelda"
//! phgeo --dir ./fixtures migrations
//! ```
//!
//! For programmatic access use the `phgeo-core` crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]
