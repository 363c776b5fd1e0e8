//! A word-level structural Verilog netlist parser.
//!
//! Reads the structural subset of Verilog (port and wire declarations,
//! `assign` over elementary operators, positional or named module
//! instantiations) into an index-based, hierarchy-preserving design.
//! Behavioral modules are not rejected wholesale: a module whose body
//! fails to parse is kept as a port-only blackbox stub, and modules
//! named after known primitive families are elided.
//!
//! # Usage
//!
//! Just pass a `&str` to [WVerilog::parse_str]. Example:
//! ```
//! use wverilogparse::WVerilog;
//!
//! let parsed = WVerilog::parse_str(r#"
//! module simple (a, b, y);
//! input a, b;
//! output y;
//! assign y = a & b;
//! endmodule
//! "#).expect("parse error");
//! assert_eq!(parsed.modules.len(), 1);
//! ```

use itertools::Itertools;

pub use nameintern::{Interner, NameId};

pub mod tables;
pub use tables::{find_primitive, Keyword, Prim, KEYWORDS, PRIM_PREFIXES};

pub mod ir;
pub use ir::{BoxDef, BoxKind, Netlist, SigRef, SigTag, Slice, WireClass};

mod reader;

/// All content parsed from one source, in source order.
#[derive(Debug, Clone)]
pub struct WVerilog {
    /// The string table every [`NameId`] in the design resolves in.
    pub strs: Interner,
    /// Parsed modules in source order, blackbox stubs included.
    /// Elided primitive-named modules are not materialized.
    pub modules: Vec<Netlist>,
    /// Names of the modules that parsed successfully.
    pub succeeded: Vec<NameId>,
    /// Names of primitive-named modules whose bodies were elided.
    pub known: Vec<NameId>,
    /// Names of the modules demoted to blackbox stubs.
    pub failed: Vec<NameId>,
}

impl WVerilog {
    /// Parses a string of structural verilog code, and returns a
    /// [Result], indicating a parsed design or an error string.
    #[inline]
    pub fn parse_str(s: &str) -> Result<WVerilog, String> {
        WVerilog::parse_u8slice(s.as_bytes())
    }

    /// Parses a u8 slice of structural verilog code, and returns a
    /// [Result], indicating a parsed design or an error string.
    pub fn parse_u8slice(s: &[u8]) -> Result<WVerilog, String> {
        let mut strs = Interner::new();
        tables::preload_keywords(&mut strs);
        let mut parser = reader::Parser::new(s, strs);
        match parser.read_design() {
            Ok(()) => Ok(parser.into_design()),
            Err(e) => Err(e.into()),
        }
    }

    /// Parses the structural verilog code at the specific path.
    pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<WVerilog, String> {
        let s = match std::fs::read(&path) {
            Ok(s) => s,
            Err(e) => return Err(format!("{}", e)),
        };
        WVerilog::parse_u8slice(&s)
    }

    /// The text behind an interned id.
    #[inline]
    pub fn str(&self, id: NameId) -> &str {
        self.strs.str(id)
    }

    /// Find a module by name.
    pub fn module(&self, name: &str) -> Option<&Netlist> {
        let id = self.strs.get(name);
        if id.is_none() {
            return None;
        }
        self.modules.iter().find(|m| m.name == id)
    }

    /// Log how the parse went.
    pub fn log_summary(&self) {
        clilog::info!(
            WVP_SUMMARY,
            "parsed {} modules: {} ok, {} known, {} failed",
            self.modules.len() + self.known.len(),
            self.succeeded.len(), self.known.len(), self.failed.len()
        );
        if !self.known.is_empty() {
            clilog::info!(WVP_SUMMARY, "known modules elided: {}",
                          self.known.iter().map(|&id| self.str(id)).format(", "));
        }
        if !self.failed.is_empty() {
            clilog::info!(WVP_SUMMARY, "blackbox stubs: {}",
                          self.failed.iter().map(|&id| self.str(id)).format(", "));
        }
    }
}

mod fmt;
