//! The per-module intermediate representation.
//!
//! Everything is index-based: strings are [`NameId`]s, signals are
//! tagged [`SigRef`]s whose payloads index the per-module slice and
//! concat tables. There are no pointers between modules, which keeps
//! the design trivially movable and serializable.

use std::fmt;
use nameintern::NameId;
use crate::tables::Prim;

/// The four signal reference kinds, stored in the low two bits of a
/// [`SigRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigTag {
    /// Payload is the [`NameId`] of a plain signal name.
    Name = 0,
    /// Payload indexes [`Netlist::slices`].
    Slice = 1,
    /// Payload is the [`NameId`] of the raw literal text (e.g. `4'hF`).
    Const = 2,
    /// Payload indexes [`Netlist::concats`].
    Concat = 3,
}

/// A packed signal reference: `(payload << 2) | tag`.
///
/// Consumers decode the tag first, then interpret the payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigRef(u32);

impl SigRef {
    /// The all-zero value: a NAME reference to the absent id. Used as
    /// an "invalid" placeholder, never produced by a successful parse.
    pub const NONE: SigRef = SigRef(0);

    #[inline]
    pub fn pack(payload: u32, tag: SigTag) -> SigRef {
        SigRef((payload << 2) | tag as u32)
    }

    #[inline]
    pub fn name(id: NameId) -> SigRef {
        SigRef::pack(id.0, SigTag::Name)
    }

    #[inline]
    pub fn constant(text: NameId) -> SigRef {
        SigRef::pack(text.0, SigTag::Const)
    }

    #[inline]
    pub fn slice(index: u32) -> SigRef {
        SigRef::pack(index, SigTag::Slice)
    }

    #[inline]
    pub fn concat(index: u32) -> SigRef {
        SigRef::pack(index, SigTag::Concat)
    }

    #[inline]
    pub fn tag(self) -> SigTag {
        match self.0 & 3 {
            0 => SigTag::Name,
            1 => SigTag::Slice,
            2 => SigTag::Const,
            _ => SigTag::Concat,
        }
    }

    #[inline]
    pub fn payload(self) -> u32 {
        self.0 >> 2
    }

    /// The interned name behind a NAME or CONST reference.
    #[inline]
    pub fn payload_name(self) -> NameId {
        NameId(self.payload())
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for SigRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SigRef({:?}, {})", self.tag(), self.payload())
    }
}

/// A vector slice `base[range]`. The range keeps its literal bracketed
/// text (`"[7:0]"`) as an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub base: NameId,
    pub range: NameId,
}

/// Wire declaration classes, in the keyword order of the source
/// language (`inout`, `input`, `output`, `wire`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireClass {
    Inout,
    Input,
    Output,
    Wire,
}

/// What a box computes: a resolved primitive, or an instantiated user
/// module referenced by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Prim(Prim),
    User(NameId),
}

/// One instantiated box. Pins are `(formal, actual)` pairs in source
/// order; a formal of [`NameId::NONE`] means positional binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxDef {
    pub kind: BoxKind,
    /// Instance name, or [`NameId::NONE`] when the source omitted it.
    pub inst: NameId,
    pub pins: Vec<(NameId, SigRef)>,
    /// Whether the box was recorded from an assign statement, whose
    /// pins run inputs first and output last. Gate instantiations keep
    /// the written pin order instead (output first by convention).
    pub from_assign: bool,
}

/// The parsed representation of one module.
///
/// Ordering guarantees: `ports` reflects header order, each direction
/// bucket reflects declaration order, and `boxes` reflects statement
/// order. Each `*_r` vector runs parallel to its bucket and holds the
/// interned range text of the declaration ([`NameId::NONE`] = scalar).
#[derive(Debug, Clone)]
pub struct Netlist {
    pub name: NameId,
    pub ports: Vec<NameId>,
    pub inouts: Vec<NameId>,
    pub inouts_r: Vec<NameId>,
    pub inputs: Vec<NameId>,
    pub inputs_r: Vec<NameId>,
    pub outputs: Vec<NameId>,
    pub outputs_r: Vec<NameId>,
    pub wires: Vec<NameId>,
    pub wires_r: Vec<NameId>,
    pub slices: Vec<Slice>,
    pub concats: Vec<Vec<SigRef>>,
    pub boxes: Vec<BoxDef>,
}

impl Netlist {
    pub(crate) fn new(name: NameId) -> Netlist {
        Netlist {
            name,
            ports: Vec::new(),
            inouts: Vec::new(),
            inouts_r: Vec::new(),
            inputs: Vec::new(),
            inputs_r: Vec::new(),
            outputs: Vec::new(),
            outputs_r: Vec::new(),
            wires: Vec::new(),
            wires_r: Vec::new(),
            slices: Vec::new(),
            concats: Vec::new(),
            boxes: Vec::new(),
        }
    }

    /// Append a declared name into the bucket selected by `class`,
    /// with its range text (or [`NameId::NONE`] for a scalar).
    pub(crate) fn add_decl(&mut self, class: WireClass, name: NameId, range: NameId) {
        let (names, ranges) = match class {
            WireClass::Inout => (&mut self.inouts, &mut self.inouts_r),
            WireClass::Input => (&mut self.inputs, &mut self.inputs_r),
            WireClass::Output => (&mut self.outputs, &mut self.outputs_r),
            WireClass::Wire => (&mut self.wires, &mut self.wires_r),
        };
        names.push(name);
        ranges.push(range);
    }

    /// The `(names, ranges)` pair of one bucket.
    #[inline]
    pub fn bucket(&self, class: WireClass) -> (&[NameId], &[NameId]) {
        match class {
            WireClass::Inout => (&self.inouts, &self.inouts_r),
            WireClass::Input => (&self.inputs, &self.inputs_r),
            WireClass::Output => (&self.outputs, &self.outputs_r),
            WireClass::Wire => (&self.wires, &self.wires_r),
        }
    }

    pub(crate) fn add_slice(&mut self, base: NameId, range: NameId) -> u32 {
        self.slices.push(Slice { base, range });
        (self.slices.len() - 1) as u32
    }

    pub(crate) fn add_concat(&mut self, sigs: &[SigRef]) -> u32 {
        self.concats.push(sigs.to_vec());
        (self.concats.len() - 1) as u32
    }

    pub(crate) fn add_box(
        &mut self, kind: BoxKind, inst: NameId,
        pins: &[(NameId, SigRef)], from_assign: bool,
    ) {
        self.boxes.push(BoxDef {
            kind,
            inst,
            pins: pins.to_vec(),
            from_assign,
        });
    }

    /// Drop everything but the interface. Turns a half-parsed module
    /// into the port-only stub kept for a failed parse.
    pub(crate) fn truncate_body(&mut self) {
        self.wires.clear();
        self.wires_r.clear();
        self.slices.clear();
        self.concats.clear();
        self.boxes.clear();
    }

    /// Whether this module carries no logic (a blackbox stub).
    #[inline]
    pub fn is_stub(&self) -> bool {
        self.boxes.is_empty() && self.wires.is_empty()
    }
}

#[test]
fn test_sigref_packing() {
    let r = SigRef::pack(37, SigTag::Slice);
    assert_eq!(r.tag(), SigTag::Slice);
    assert_eq!(r.payload(), 37);
    assert_eq!(r.raw(), (37 << 2) | 1);
    let n = SigRef::name(NameId(5));
    assert_eq!(n.tag(), SigTag::Name);
    assert_eq!(n.payload_name(), NameId(5));
    assert_eq!(SigRef::NONE.tag(), SigTag::Name);
    assert_eq!(SigRef::NONE.payload(), 0);
}

#[test]
fn test_truncate_body() {
    let mut ntk = Netlist::new(NameId(20));
    ntk.ports.push(NameId(21));
    ntk.add_decl(WireClass::Input, NameId(21), NameId::NONE);
    ntk.add_decl(WireClass::Wire, NameId(22), NameId(23));
    let s = ntk.add_slice(NameId(22), NameId(23));
    ntk.add_box(
        BoxKind::Prim(Prim::Buf),
        NameId::NONE,
        &[(NameId::NONE, SigRef::slice(s)), (NameId::NONE, SigRef::name(NameId(21)))],
        true,
    );
    assert!(!ntk.is_stub());
    ntk.truncate_body();
    assert!(ntk.is_stub());
    // the interface survives demotion
    assert_eq!(ntk.ports, vec![NameId(21)]);
    assert_eq!(ntk.inputs, vec![NameId(21)]);
    assert!(ntk.slices.is_empty() && ntk.concats.is_empty());
}
