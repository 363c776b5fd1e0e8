//! Keyword and primitive-name tables.
//!
//! The keyword table is preloaded into the interner before any user
//! identifier, so keywords occupy the fixed ids 1..=12 and a plain name
//! read doubles as keyword recognition. The primitive table is an
//! *ordered* list of name prefixes; resolution scans it top to bottom
//! and the first prefix hit wins, so reordering it changes meaning.

use nameintern::{Interner, NameId};
use crate::ir::WireClass;

/// Verilog keywords in preload order. `KEYWORDS[i]` interns to id `i + 1`.
pub const KEYWORDS: [&str; 12] = [
    "module", "inout", "input", "output", "wire", "assign",
    "reg", "always", "defparam", "begin", "end", "endmodule",
];

/// A recognized keyword. The discriminants equal the interner ids
/// assigned by [`preload_keywords`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Keyword {
    Module = 1,
    Inout,
    Input,
    Output,
    Wire,
    Assign,
    Reg,
    Always,
    Defparam,
    Begin,
    End,
    Endmodule,
}

impl Keyword {
    /// The keyword a freshly read name id refers to, if any.
    #[inline]
    pub fn of(id: NameId) -> Option<Keyword> {
        use Keyword::*;
        Some(match id.0 {
            1 => Module,
            2 => Inout,
            3 => Input,
            4 => Output,
            5 => Wire,
            6 => Assign,
            7 => Reg,
            8 => Always,
            9 => Defparam,
            10 => Begin,
            11 => End,
            12 => Endmodule,
            _ => return None,
        })
    }

    /// The declaration bucket this keyword selects, for the four
    /// declaration keywords.
    #[inline]
    pub fn wire_class(self) -> Option<WireClass> {
        use Keyword::*;
        Some(match self {
            Inout => WireClass::Inout,
            Input => WireClass::Input,
            Output => WireClass::Output,
            Wire => WireClass::Wire,
            _ => return None,
        })
    }
}

/// Intern the keywords at their reserved ids. Must run on a fresh
/// interner, before anything else touches it.
pub fn preload_keywords(strs: &mut Interner) {
    for (i, kw) in KEYWORDS.iter().enumerate() {
        let id = strs.intern(kw);
        debug_assert_eq!(id.0 as usize, i + 1);
    }
}

/// Primitive box functions known to the parser.
///
/// The scalar gates up to [`Prim::Maj`] come from assign operators and
/// plain gate instantiations; the rest are word-level operator families
/// recognized by name prefix on instantiated module types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prim {
    Const0,
    Const1,
    ConstX,
    ConstZ,
    Buf,
    Inv,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    Sharp,
    Mux,
    Maj,
    Verific,
    Add,
    Mult,
    Div,
    Mod,
    Rem,
    ShiftLeft,
    ShiftRight,
    RotateLeft,
    RotateRight,
    ReduceAnd,
    ReduceOr,
    ReduceXor,
    ReduceNand,
    ReduceNor,
    ReduceXnor,
    LessThan,
    MuxWord,
    Select,
    Decoder,
    EnabledDecoder,
    PrioSelect,
    DualPortRam,
    ReadPort,
    WritePort,
    ClockedWritePort,
    Lut,
    AndBus,
    OrBus,
    XorBus,
    NandBus,
    NorBus,
    XnorBus,
    BufBus,
    InvBus,
    Tri,
    Sub,
    UnaryMinus,
    Equal,
    NotEqual,
    MuxBus,
    WideMux,
    WideSelect,
    WideDff,
    WideDlatch,
    WideDffrs,
    WideDlatchrs,
    WidePrioSelect,
    Pow,
    PrioEncoder,
    Abs,
}

/// Primitive name prefixes in match order. Do not reorder: several
/// later entries are shadowed on purpose by shorter earlier ones
/// (e.g. `and_16` resolves to `and`, never `and_`).
pub const PRIM_PREFIXES: [(&str, Prim); 66] = [
    ("const0", Prim::Const0),
    ("const1", Prim::Const1),
    ("constX", Prim::ConstX),
    ("constZ", Prim::ConstZ),
    ("buf", Prim::Buf),
    ("not", Prim::Inv),
    ("and", Prim::And),
    ("nand", Prim::Nand),
    ("or", Prim::Or),
    ("nor", Prim::Nor),
    ("xor", Prim::Xor),
    ("xnor", Prim::Xnor),
    ("sharp", Prim::Sharp),
    ("mux", Prim::Mux),
    ("maj", Prim::Maj),
    ("VERIFIC_", Prim::Verific),
    ("add_", Prim::Add),
    ("mult_", Prim::Mult),
    ("div_", Prim::Div),
    ("mod_", Prim::Mod),
    ("rem_", Prim::Rem),
    ("shift_left_", Prim::ShiftLeft),
    ("shift_right_", Prim::ShiftRight),
    ("rotate_left_", Prim::RotateLeft),
    ("rotate_right_", Prim::RotateRight),
    ("reduce_and_", Prim::ReduceAnd),
    ("reduce_or_", Prim::ReduceOr),
    ("reduce_xor_", Prim::ReduceXor),
    ("reduce_nand_", Prim::ReduceNand),
    ("reduce_nor_", Prim::ReduceNor),
    ("reduce_xnor_", Prim::ReduceXnor),
    ("LessThan_", Prim::LessThan),
    ("Mux_", Prim::MuxWord),
    ("Select_", Prim::Select),
    ("Decoder_", Prim::Decoder),
    ("EnabledDecoder_", Prim::EnabledDecoder),
    ("PrioSelect_", Prim::PrioSelect),
    ("DualPortRam_", Prim::DualPortRam),
    ("ReadPort_", Prim::ReadPort),
    ("WritePort_", Prim::WritePort),
    ("ClockedWritePort_", Prim::ClockedWritePort),
    ("lut", Prim::Lut),
    ("and_", Prim::AndBus),
    ("or_", Prim::OrBus),
    ("xor_", Prim::XorBus),
    ("nand_", Prim::NandBus),
    ("nor_", Prim::NorBus),
    ("xnor_", Prim::XnorBus),
    ("buf_", Prim::BufBus),
    ("inv_", Prim::InvBus),
    ("tri_", Prim::Tri),
    ("sub_", Prim::Sub),
    ("unary_minus_", Prim::UnaryMinus),
    ("equal_", Prim::Equal),
    ("not_equal_", Prim::NotEqual),
    ("mux_", Prim::MuxBus),
    ("wide_mux_", Prim::WideMux),
    ("wide_select_", Prim::WideSelect),
    ("wide_dff_", Prim::WideDff),
    ("wide_dlatch_", Prim::WideDlatch),
    ("wide_dffrs_", Prim::WideDffrs),
    ("wide_dlatchrs_", Prim::WideDlatchrs),
    ("wide_prio_select_", Prim::WidePrioSelect),
    ("pow_", Prim::Pow),
    ("PrioEncoder_", Prim::PrioEncoder),
    ("abs", Prim::Abs),
];

/// Resolve a module or gate name against the prefix table.
/// First prefix hit wins; `None` means the name is a user module.
#[inline]
pub fn find_primitive(name: &str) -> Option<Prim> {
    if name.is_empty() {
        return None;
    }
    PRIM_PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|&(_, prim)| prim)
}

impl Prim {
    /// The table text for this primitive, used when re-emitting boxes.
    pub fn token(self) -> &'static str {
        // the table maps every variant exactly once
        PRIM_PREFIXES
            .iter()
            .find(|&&(_, prim)| prim == self)
            .map(|&(prefix, _)| prefix)
            .unwrap_or("")
    }
}

#[test]
fn test_keyword_ids() {
    let mut strs = Interner::new();
    preload_keywords(&mut strs);
    assert_eq!(strs.get("module"), NameId(1));
    assert_eq!(strs.get("wire"), NameId(5));
    assert_eq!(strs.get("endmodule"), NameId(12));
    assert_eq!(Keyword::of(NameId(12)), Some(Keyword::Endmodule));
    assert_eq!(Keyword::of(NameId(13)), None);
    assert_eq!(Keyword::Wire.wire_class(), Some(WireClass::Wire));
    assert_eq!(Keyword::Assign.wire_class(), None);
}

#[test]
fn test_prefix_order() {
    assert_eq!(find_primitive("and"), Some(Prim::And));
    // shadowed by the bare gate names in front of them
    assert_eq!(find_primitive("and_16"), Some(Prim::And));
    assert_eq!(find_primitive("xnor_8_8"), Some(Prim::Xnor));
    assert_eq!(find_primitive("buffer"), Some(Prim::Buf));
    assert_eq!(find_primitive("add_8_8_9"), Some(Prim::Add));
    assert_eq!(find_primitive("wide_mux_32"), Some(Prim::WideMux));
    assert_eq!(find_primitive("VERIFIC_FADD"), Some(Prim::Verific));
    assert_eq!(find_primitive("Mux_4"), Some(Prim::MuxWord));
    assert_eq!(find_primitive("abs16"), Some(Prim::Abs));
    assert_eq!(find_primitive("my_adder"), None);
    assert_eq!(find_primitive(""), None);
    assert_eq!(Prim::WideMux.token(), "wide_mux_");
    assert_eq!(Prim::Inv.token(), "not");
}
