//! Re-emission of a parsed design as Verilog text.
//!
//! The output reads back in: formatting a design and parsing the
//! result reproduces the same module list, buckets and boxes (module
//! classification aside, since blackbox stubs re-parse cleanly).

use std::fmt;
use std::fmt::Write;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use nameintern::Interner;
use crate::ir::{BoxDef, BoxKind, Netlist, SigRef, SigTag, WireClass};
use crate::tables::Prim;
use crate::WVerilog;

lazy_static! {
    static ref RE_SAFE_IDENT: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_\$]*$").unwrap();
}

/// Prints an identifier, falling back to the escaped form
/// (`\name` + space) when it is not a simple identifier.
struct IdentFmt<'i>(&'i str);

impl fmt::Display for IdentFmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if RE_SAFE_IDENT.is_match(self.0) {
            write!(f, "{}", self.0)
        } else {
            write!(f, "\\{} ", self.0)
        }
    }
}

/// Prints one signal reference of `ntk`.
struct SigFmt<'i> {
    strs: &'i Interner,
    ntk: &'i Netlist,
    sig: SigRef,
}

impl fmt::Display for SigFmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.sig.tag() {
            SigTag::Name => {
                write!(f, "{}", IdentFmt(self.strs.str(self.sig.payload_name())))
            }
            SigTag::Const => write!(f, "{}", self.strs.str(self.sig.payload_name())),
            SigTag::Slice => {
                let slice = &self.ntk.slices[self.sig.payload() as usize];
                write!(f, "{}{}",
                       IdentFmt(self.strs.str(slice.base)),
                       self.strs.str(slice.range))
            }
            SigTag::Concat => {
                let parts = &self.ntk.concats[self.sig.payload() as usize];
                write!(f, "{{{}}}", parts.iter().map(|&sig| SigFmt {
                    strs: self.strs, ntk: self.ntk, sig
                }).format(", "))
            }
        }
    }
}

fn write_box<W: Write>(
    f: &mut W, strs: &Interner, ntk: &Netlist, b: &BoxDef
) -> fmt::Result {
    let sig = |sig| SigFmt { strs, ntk, sig };
    let prim = match b.kind {
        BoxKind::User(func) => {
            // named-pin instantiation of a user module
            write!(f, "{}", IdentFmt(strs.str(func)))?;
            if b.inst.is_some() {
                write!(f, " {}", IdentFmt(strs.str(b.inst)))?;
            }
            return writeln!(f, "({});", b.pins.iter().map(
                |&(formal, actual)| format!(
                    ".{}({})", IdentFmt(strs.str(formal)), sig(actual))
            ).format(", "));
        }
        BoxKind::Prim(prim) => prim,
    };
    // Only boxes recorded from assign statements print back as
    // assigns: their pins run inputs first, output last. Anonymous
    // gate instances share that shape but keep the written pin order
    // (output first), so they take the positional path below.
    if b.from_assign {
        let pins: Vec<SigRef> = b.pins.iter().map(|&(_, actual)| actual).collect();
        match (prim, pins.len()) {
            (Prim::Buf, 2) => {
                return writeln!(f, "assign {} = {};", sig(pins[1]), sig(pins[0]))
            }
            (Prim::Inv, 2) => {
                return writeln!(f, "assign {} = ~{};", sig(pins[1]), sig(pins[0]))
            }
            (Prim::And, 3) => {
                return writeln!(f, "assign {} = {} & {};",
                                sig(pins[2]), sig(pins[0]), sig(pins[1]))
            }
            (Prim::Or, 3) => {
                return writeln!(f, "assign {} = {} | {};",
                                sig(pins[2]), sig(pins[0]), sig(pins[1]))
            }
            (Prim::Xor, 3) => {
                return writeln!(f, "assign {} = {} ^ {};",
                                sig(pins[2]), sig(pins[0]), sig(pins[1]))
            }
            (Prim::Xnor, 3) => {
                return writeln!(f, "assign {} = ~{} ^ {};",
                                sig(pins[2]), sig(pins[0]), sig(pins[1]))
            }
            (Prim::Mux, 4) => {
                return writeln!(f, "assign {} = {} ? {} : {};",
                                sig(pins[3]), sig(pins[0]), sig(pins[1]), sig(pins[2]))
            }
            _ => {}
        }
    }
    // positional gate instantiation under the primitive's table name
    write!(f, "{}", prim.token())?;
    if b.inst.is_some() {
        write!(f, " {}", IdentFmt(strs.str(b.inst)))?;
    }
    writeln!(f, "({});", b.pins.iter().map(
        |&(_, actual)| format!("{}", sig(actual))
    ).format(", "))
}

fn write_module(
    f: &mut fmt::Formatter, strs: &Interner, ntk: &Netlist
) -> fmt::Result {
    writeln!(f, "module {}({});",
             IdentFmt(strs.str(ntk.name)),
             ntk.ports.iter().map(
                 |&port| format!("{}", IdentFmt(strs.str(port)))
             ).format(", "))?;
    let mut ind = indenter::indented(f)
        .with_format(indenter::Format::Uniform { indentation: "  " });
    for (class, keyword) in [
        (WireClass::Inout, "inout"),
        (WireClass::Input, "input"),
        (WireClass::Output, "output"),
        (WireClass::Wire, "wire"),
    ] {
        let (names, ranges) = ntk.bucket(class);
        for (&name, &range) in names.iter().zip(ranges.iter()) {
            if range.is_none() {
                writeln!(ind, "{} {};", keyword, IdentFmt(strs.str(name)))?;
            } else {
                writeln!(ind, "{} {} {};", keyword,
                         strs.str(range), IdentFmt(strs.str(name)))?;
            }
        }
    }
    if !ntk.boxes.is_empty() {
        writeln!(ind)?;
        for b in &ntk.boxes {
            write_box(&mut ind, strs, ntk, b)?;
        }
    }
    writeln!(f, "endmodule")
}

impl fmt::Display for WVerilog {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for ntk in &self.modules {
            write_module(f, &self.strs, ntk)?;
        }
        Ok(())
    }
}
