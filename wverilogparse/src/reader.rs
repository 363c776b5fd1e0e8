//! The streaming reader: a single cursor walking the source bytes.
//!
//! Errors never unwind across reader frames. Every reader either
//! returns its value or records a message in the single pending-error
//! slot and returns `None` (readers that probe optionally, like
//! [`Parser::read_name`], return the absent id without recording
//! anything). The module reader decides whether a failure demotes the
//! current module to a blackbox stub or aborts the whole design.

use nameintern::{Interner, NameId};
use crate::ir::{BoxKind, Netlist, SigRef, WireClass};
use crate::tables::{find_primitive, Keyword};
use crate::WVerilog;

// character classes of the accepted dialect
#[inline]
fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

#[inline]
fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

#[inline]
fn is_digit_bin(c: u8) -> bool {
    matches!(c, b'0' | b'1' | b'x' | b'z')
}

#[inline]
fn is_digit_hex(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

// x/z digits also come uppercase out of some netlist writers
#[inline]
fn is_digit_xz(c: u8) -> bool {
    matches!(c, b'x' | b'z' | b'X' | b'Z')
}

#[inline]
fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

#[inline]
fn is_ident_start(c: u8) -> bool {
    is_letter(c) || c == b'_'
}

#[inline]
fn is_ident_cont(c: u8) -> bool {
    is_ident_start(c) || is_digit(c) || c == b'$'
}

/// A parse error: a fixed message plus at most 50 bytes of the input
/// following the position where the parse stopped.
#[derive(Debug, Clone)]
pub(crate) struct ParseError {
    pub msg: &'static str,
    pub near: String,
}

impl From<ParseError> for String {
    fn from(e: ParseError) -> String {
        format!("{}", e)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at: {})", self.msg, self.near)
    }
}

/// Outcome of reading one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModuleCode {
    /// Clean end of input before a `module` keyword.
    Eof,
    /// Parsed successfully.
    Parsed,
    /// Name matched a primitive prefix; body elided.
    Primitive,
    /// Body failed to parse; kept as a port-only stub.
    Recovered,
    /// Unrecoverable; the pending error describes why.
    Fatal,
}

pub(crate) struct Parser<'a> {
    buf: &'a [u8],
    pos: usize,
    strs: Interner,
    /// The module being read, `None` between modules.
    ntk: Option<Netlist>,
    modules: Vec<Netlist>,
    succeeded: Vec<NameId>,
    known: Vec<NameId>,
    failed: Vec<NameId>,
    // scratch, cleared at the start of each use
    temp_names: Vec<NameId>,
    temp_pins: Vec<(NameId, SigRef)>,
    temp_sigs: Vec<SigRef>,
    range_text: String,
    /// Guards `temp_sigs`: concatenations do not nest.
    in_concat: bool,
    error: Option<ParseError>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(buf: &'a [u8], strs: Interner) -> Parser<'a> {
        Parser {
            buf,
            pos: 0,
            strs,
            ntk: None,
            modules: Vec::new(),
            succeeded: Vec::new(),
            known: Vec::new(),
            failed: Vec::new(),
            temp_names: Vec::new(),
            temp_pins: Vec::new(),
            temp_sigs: Vec::new(),
            range_text: String::new(),
            in_concat: false,
            error: None,
        }
    }

    pub(crate) fn into_design(self) -> WVerilog {
        WVerilog {
            strs: self.strs,
            modules: self.modules,
            succeeded: self.succeeded,
            known: self.known,
            failed: self.failed,
        }
    }

    // -- cursor ------------------------------------------------------

    #[inline]
    fn cur(&self) -> u8 {
        self.buf.get(self.pos).copied().unwrap_or(0)
    }

    #[inline]
    fn cur1(&self) -> u8 {
        self.buf.get(self.pos + 1).copied().unwrap_or(0)
    }

    #[inline]
    fn at(&self, c: u8) -> bool {
        self.cur() == c
    }

    #[inline]
    fn eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    // -- errors ------------------------------------------------------

    /// Record the first error; later ones lose until the slot is
    /// cleared at a module recovery boundary.
    fn set_error(&mut self, msg: &'static str) {
        if self.error.is_none() {
            let rest = &self.buf[self.pos.min(self.buf.len())..];
            let near = String::from_utf8_lossy(&rest[..rest.len().min(50)]).into_owned();
            self.error = Some(ParseError { msg, near });
        }
    }

    fn fail<T>(&mut self, msg: &'static str) -> Option<T> {
        self.set_error(msg);
        None
    }

    fn take_error(&mut self) -> ParseError {
        self.error.take().unwrap_or(ParseError {
            msg: "Unexpectedly reached end-of-file.",
            near: String::new(),
        })
    }

    // -- lexical utilities -------------------------------------------

    /// Skip one `//` or `/* */` comment if the cursor is at one.
    fn skip_comment(&mut self) -> bool {
        if !self.at(b'/') {
            return false;
        }
        if self.cur1() == b'/' {
            self.pos += 2;
            while self.pos < self.buf.len() {
                if self.at(b'\n') {
                    self.bump();
                    return true;
                }
                self.bump();
            }
            false
        } else if self.cur1() == b'*' {
            self.pos += 2;
            while self.pos < self.buf.len() {
                if self.at(b'*') && self.cur1() == b'/' {
                    self.pos += 2;
                    return true;
                }
                self.bump();
            }
            // unterminated block comment: the caller runs into EOF
            false
        } else {
            false
        }
    }

    /// Skip a `\escaped name ` including the terminating space.
    fn skip_escaped_name(&mut self) -> bool {
        if !self.at(b'\\') {
            return false;
        }
        self.bump();
        while self.pos < self.buf.len() {
            if self.at(b' ') {
                self.bump();
                return true;
            }
            self.bump();
        }
        false
    }

    /// Alternate whitespace runs and comments until a real byte is
    /// seen. Running out of input here is always an error.
    fn skip_spaces(&mut self) -> Option<()> {
        while self.pos < self.buf.len() {
            while is_space(self.cur()) {
                self.bump();
            }
            if self.eof() || self.cur() == 0 {
                return self.fail("Unexpectedly reached end-of-file.");
            }
            if !self.skip_comment() {
                return Some(());
            }
        }
        self.fail("Unexpectedly reached end-of-file.")
    }

    /// Consume everything, honoring comments and escaped names, until
    /// the cursor rests on `c`. False at end of input.
    fn skip_until(&mut self, c: u8) -> bool {
        while self.pos < self.buf.len() {
            if self.at(c) {
                return true;
            }
            if self.skip_comment() {
                continue;
            }
            if self.skip_escaped_name() {
                continue;
            }
            self.bump();
        }
        false
    }

    /// Raw substring search; on a hit the cursor lands just past the
    /// word. Only used for error recovery.
    fn skip_until_word(&mut self, word: &str) -> bool {
        let w = word.as_bytes();
        let hay = &self.buf[self.pos..];
        if hay.len() < w.len() {
            return false;
        }
        match hay.windows(w.len()).position(|win| win == w) {
            Some(i) => {
                self.pos += i + w.len();
                true
            }
            None => false,
        }
    }

    // -- token readers -----------------------------------------------

    /// Read a simple or escaped identifier and intern it. Returns the
    /// absent id, recording nothing, when no identifier starts here.
    fn read_name(&mut self) -> NameId {
        let start;
        let end;
        if self.at(b'\\') {
            // the terminating space stays outside the name
            self.bump();
            start = self.pos;
            while !self.eof() && !self.at(b' ') {
                self.bump();
            }
            end = self.pos;
        } else if is_ident_start(self.cur()) {
            start = self.pos;
            self.bump();
            while is_ident_cont(self.cur()) {
                self.bump();
            }
            end = self.pos;
        } else {
            return NameId::NONE;
        }
        self.strs.intern_bytes(&self.buf[start..end])
    }

    /// Read a sized literal like `4'hF` and intern its full text.
    /// Precondition: the cursor is at a digit.
    fn read_constant(&mut self) -> Option<NameId> {
        let start = self.pos;
        debug_assert!(is_digit(self.cur()));
        while is_digit(self.cur()) {
            self.bump();
        }
        if !self.at(b'\'') {
            return self.fail("Cannot read constant.");
        }
        self.bump();
        match self.cur() {
            b'b' => {
                self.bump();
                while is_digit_bin(self.cur()) || is_digit_xz(self.cur()) {
                    self.bump();
                }
            }
            b'h' => {
                self.bump();
                while is_digit_hex(self.cur()) || is_digit_xz(self.cur()) {
                    self.bump();
                }
            }
            b'd' => {
                self.bump();
                while is_digit(self.cur()) {
                    self.bump();
                }
            }
            _ => return self.fail("Cannot read radix of constant."),
        }
        Some(self.strs.intern_bytes(&self.buf[start..self.pos]))
    }

    /// Read `[hi]` or `[hi:lo]`, rebuild the text without inner
    /// whitespace, and intern it. Precondition: cursor at `[`.
    fn read_range(&mut self) -> Option<NameId> {
        debug_assert!(self.at(b'['));
        self.range_text.clear();
        self.range_text.push('[');
        self.bump();
        self.skip_spaces()?;
        if !is_digit(self.cur()) {
            return self.fail("Cannot read digit in range specification.");
        }
        while is_digit(self.cur()) {
            self.range_text.push(self.cur() as char);
            self.bump();
        }
        self.skip_spaces()?;
        if self.at(b':') {
            self.range_text.push(':');
            self.bump();
            self.skip_spaces()?;
            if !is_digit(self.cur()) {
                return self.fail("Cannot read digit in range specification.");
            }
            while is_digit(self.cur()) {
                self.range_text.push(self.cur() as char);
                self.bump();
            }
            self.skip_spaces()?;
        }
        if !self.at(b']') {
            return self.fail("Cannot read closing brace in range specification.");
        }
        self.range_text.push(']');
        self.bump();
        Some(self.strs.intern(&self.range_text))
    }

    /// Read `{ s1, s2, ... }`. A one-element concatenation collapses
    /// to the element itself. Precondition: cursor at `{`.
    fn read_concat(&mut self) -> Option<SigRef> {
        debug_assert!(self.at(b'{'));
        self.bump();
        self.read_concat_list()?;
        debug_assert!(self.at(b'}'));
        self.bump();
        debug_assert!(!self.temp_sigs.is_empty());
        if self.temp_sigs.len() == 1 {
            return Some(self.temp_sigs[0]);
        }
        let ntk = self.ntk.as_mut().unwrap();
        let index = ntk.add_concat(&self.temp_sigs);
        Some(SigRef::concat(index))
    }

    /// Read one signal: a sized constant, a concatenation, or a name
    /// with an optional slice. Trailing whitespace is consumed.
    fn read_signal(&mut self) -> Option<SigRef> {
        self.skip_spaces()?;
        if is_digit(self.cur()) {
            let item = self.read_constant()?;
            self.skip_spaces()?;
            return Some(SigRef::constant(item));
        }
        if self.at(b'{') {
            if self.in_concat {
                return self.fail("Cannot read nested concatenations.");
            }
            self.in_concat = true;
            let item = self.read_concat();
            self.in_concat = false;
            let item = item?;
            self.skip_spaces()?;
            Some(item)
        } else {
            let item = self.read_name();
            if item.is_none() {
                return None;
            }
            self.skip_spaces()?;
            if self.at(b'[') {
                let range = self.read_range()?;
                self.skip_spaces()?;
                let index = self.ntk.as_mut().unwrap().add_slice(item, range);
                return Some(SigRef::slice(index));
            }
            Some(SigRef::name(item))
        }
    }

    /// Comma-separated names into `temp_names`, stopping at `term`
    /// (left unconsumed).
    fn read_name_list(&mut self, term: u8) -> Option<()> {
        self.temp_names.clear();
        loop {
            let item = self.read_name();
            if item.is_none() {
                return self.fail("Cannot read name in the list.");
            }
            self.temp_names.push(item);
            self.skip_spaces()?;
            if self.at(term) {
                break;
            }
            if !self.at(b',') {
                return self.fail("Expecting comma in the list.");
            }
            self.bump();
            self.skip_spaces()?;
        }
        Some(())
    }

    /// Comma-separated signals into `temp_sigs`, stopping at `}`.
    fn read_concat_list(&mut self) -> Option<()> {
        self.temp_sigs.clear();
        loop {
            let item = match self.read_signal() {
                Some(item) => item,
                None => return self.fail("Cannot read signal in the list."),
            };
            self.temp_sigs.push(item);
            if self.at(b'}') {
                break;
            }
            if !self.at(b',') {
                return self.fail("Expecting comma in the list.");
            }
            self.bump();
        }
        Some(())
    }

    /// Comma-separated signals into `temp_pins` as positional pins,
    /// stopping at `)`.
    fn read_pin_list(&mut self) -> Option<()> {
        self.temp_pins.clear();
        loop {
            let item = match self.read_signal() {
                Some(item) => item,
                None => return self.fail("Cannot read signal in the list."),
            };
            self.temp_pins.push((NameId::NONE, item));
            if self.at(b')') {
                break;
            }
            if !self.at(b',') {
                return self.fail("Expecting comma in the list.");
            }
            self.bump();
        }
        Some(())
    }

    /// `.formal(actual)` pairs into `temp_pins`, stopping at the `)`
    /// that closes the whole pin list. Precondition: cursor at `.`.
    fn read_named_pins(&mut self) -> Option<()> {
        self.temp_pins.clear();
        debug_assert!(self.at(b'.'));
        while self.at(b'.') {
            self.bump();
            let formal = self.read_name();
            if formal.is_none() {
                return self.fail("Cannot read formal name of the instance.");
            }
            self.skip_spaces()?;
            if !self.at(b'(') {
                return self.fail("Cannot read \"(\" in the instance.");
            }
            self.bump();
            self.skip_spaces()?;
            let actual = match self.read_signal() {
                Some(actual) => actual,
                None => return self.fail("Cannot read actual name of the instance."),
            };
            if !self.at(b')') {
                return self.fail("Cannot read \")\" in the instance.");
            }
            self.bump();
            self.temp_pins.push((formal, actual));
            self.skip_spaces()?;
            if self.at(b')') {
                break;
            }
            if !self.at(b',') {
                return self.fail("Expecting comma in the instance.");
            }
            self.bump();
            self.skip_spaces()?;
        }
        debug_assert!(!self.temp_pins.is_empty());
        Some(())
    }

    // -- statement parsers -------------------------------------------

    /// Body of a declaration, entered after its keyword: an optional
    /// range, then names up to `;`.
    fn read_declaration(&mut self, class: WireClass) -> Option<()> {
        let mut range = NameId::NONE;
        self.skip_spaces()?;
        if self.at(b'[') {
            range = self.read_range()?;
            self.skip_spaces()?;
        }
        self.read_name_list(b';')?;
        let ntk = self.ntk.as_mut().unwrap();
        for &name in &self.temp_names {
            ntk.add_decl(class, name, range);
        }
        Some(())
    }

    /// `lhs = [~] rhs1 [op rhs2 [: rhs3]]`, stopping at the `;`.
    /// Emits one primitive box with positional pins, inputs first.
    fn read_assign(&mut self) -> Option<()> {
        use crate::tables::Prim;
        let out_item = match self.read_signal() {
            Some(item) => item,
            None => return self.fail("Cannot read output name in the assign-statement."),
        };
        if !self.at(b'=') {
            return self.fail("Expecting \"=\" in assign-statement.");
        }
        self.bump();
        self.skip_spaces()?;
        let mut compl = false;
        if self.at(b'~') {
            compl = true;
            self.bump();
        }
        let in1 = match self.read_signal() {
            Some(item) => item,
            None => return self.fail("Cannot read first input name in the assign-statement."),
        };
        self.temp_pins.clear();
        self.temp_pins.push((NameId::NONE, in1));
        if self.at(b';') {
            self.temp_pins.push((NameId::NONE, out_item));
            let kind = if compl { Prim::Inv } else { Prim::Buf };
            let ntk = self.ntk.as_mut().unwrap();
            ntk.add_box(BoxKind::Prim(kind), NameId::NONE, &self.temp_pins, true);
            return Some(());
        }
        let oper = match self.cur() {
            b'&' => Prim::And,
            b'|' => Prim::Or,
            b'^' => {
                if compl {
                    Prim::Xnor
                } else {
                    Prim::Xor
                }
            }
            // a complemented select makes no box we know
            b'?' if compl => {
                return self.fail("Unrecognized operator in the assign-statement.")
            }
            b'?' => Prim::Mux,
            _ => return self.fail("Unrecognized operator in the assign-statement."),
        };
        self.bump();
        let in2 = match self.read_signal() {
            Some(item) => item,
            None => return self.fail("Cannot read second input name in the assign-statement."),
        };
        self.temp_pins.push((NameId::NONE, in2));
        if oper == Prim::Mux {
            if !self.at(b':') {
                return self.fail("Expected colon in the MUX assignment.");
            }
            self.bump();
            let in3 = match self.read_signal() {
                Some(item) => item,
                None => {
                    return self.fail("Cannot read third input name in the assign-statement.")
                }
            };
            self.temp_pins.push((NameId::NONE, in3));
            if !self.at(b';') {
                return self.fail("Expected semicolon at the end of the assign-statement.");
            }
        }
        self.temp_pins.push((NameId::NONE, out_item));
        let ntk = self.ntk.as_mut().unwrap();
        ntk.add_box(BoxKind::Prim(oper), NameId::NONE, &self.temp_pins, true);
        Some(())
    }

    /// Instantiation body, entered after the type name `func`:
    /// optional instance name, then `(` pins `)`, stopping at the `;`.
    fn read_instance(&mut self, func: NameId) -> Option<()> {
        self.skip_spaces()?;
        let inst = self.read_name();
        if inst.is_some() {
            self.skip_spaces()?;
        }
        if !self.at(b'(') {
            return self.fail("Expecting \"(\" in module instantiation.");
        }
        self.bump();
        self.skip_spaces()?;
        let kind;
        if self.at(b'.') {
            self.read_named_pins()?;
            kind = BoxKind::User(func);
        } else {
            // positional pins bind to an elementary gate only
            let prim = match find_primitive(self.strs.str(func)) {
                Some(prim) => prim,
                None => return self.fail("Cannot find elementary gate."),
            };
            kind = BoxKind::Prim(prim);
            self.read_pin_list()?;
        }
        debug_assert!(self.at(b')'));
        self.bump();
        self.skip_spaces()?;
        if !self.at(b';') {
            return self.fail("Expecting semicolon in the instance.");
        }
        let ntk = self.ntk.as_mut().unwrap();
        ntk.add_box(kind, inst, &self.temp_pins, false);
        Some(())
    }

    /// Header port list, cursor at `(`. Accepts plain 1995 names and
    /// 2001 inline directions; a direction sticks to subsequent items
    /// until the next one, a fresh direction resets the range.
    fn read_arguments(&mut self) -> Option<()> {
        debug_assert!(self.at(b'('));
        self.bump();
        self.skip_spaces()?;
        if self.at(b')') {
            return Some(());
        }
        let mut dir: Option<WireClass> = None;
        let mut range = NameId::NONE;
        loop {
            let mut name = self.read_name();
            if name.is_none() {
                return self.fail("Cannot read name in the list.");
            }
            self.skip_spaces()?;
            let inline_dir = match Keyword::of(name) {
                Some(Keyword::Inout) => Some(WireClass::Inout),
                Some(Keyword::Input) => Some(WireClass::Input),
                Some(Keyword::Output) => Some(WireClass::Output),
                _ => None,
            };
            if let Some(class) = inline_dir {
                dir = Some(class);
                range = NameId::NONE;
                if self.at(b'[') {
                    range = self.read_range()?;
                    self.skip_spaces()?;
                }
                name = self.read_name();
                if name.is_none() {
                    return self.fail("Cannot read name in the list.");
                }
                self.skip_spaces()?;
            }
            let ntk = self.ntk.as_mut().unwrap();
            if let Some(class) = dir {
                ntk.add_decl(class, name, range);
            }
            ntk.ports.push(name);
            if self.at(b')') {
                break;
            }
            if !self.at(b',') {
                return self.fail("Expecting comma in the instance.");
            }
            self.bump();
            self.skip_spaces()?;
        }
        Some(())
    }

    // -- module and design -------------------------------------------

    /// Demote the current module to a port-only stub and resume past
    /// the next `endmodule`.
    fn recover_module(&mut self) -> ModuleCode {
        if !self.skip_until_word("endmodule") {
            self.set_error("Cannot find \"endmodule\" keyword.");
            return ModuleCode::Fatal;
        }
        let mut ntk = self.ntk.take().unwrap();
        let reason = self.error.as_ref().map(|e| e.msg).unwrap_or("parse error");
        clilog::warn!(
            WVP_BLACKBOX,
            "failed to parse module \"{}\" ({}); keeping it as a blackbox",
            self.strs.str(ntk.name),
            reason
        );
        self.failed.push(ntk.name);
        ntk.truncate_body();
        self.in_concat = false;
        self.modules.push(ntk);
        self.error = None;
        ModuleCode::Recovered
    }

    fn read_module(&mut self) -> ModuleCode {
        if self.ntk.is_some() {
            self.set_error("Parsing previous module is unfinished.");
            return ModuleCode::Fatal;
        }
        if self.skip_spaces().is_none() {
            // plain end of input between modules
            self.error = None;
            return ModuleCode::Eof;
        }
        let token = self.read_name();
        if Keyword::of(token) != Some(Keyword::Module) {
            self.set_error("Cannot read \"module\" keyword.");
            return ModuleCode::Fatal;
        }
        if self.skip_spaces().is_none() {
            return ModuleCode::Fatal;
        }
        let name = self.read_name();
        if name.is_none() {
            self.set_error("Cannot read module name.");
            return ModuleCode::Fatal;
        }
        if find_primitive(self.strs.str(name)).is_some() {
            if !self.skip_until_word("endmodule") {
                self.set_error("Cannot find \"endmodule\" keyword.");
                return ModuleCode::Fatal;
            }
            clilog::info!(
                WVP_KNOWN,
                "skipped the body of known module \"{}\"",
                self.strs.str(name)
            );
            self.known.push(name);
            return ModuleCode::Primitive;
        }
        self.ntk = Some(Netlist::new(name));
        if self.skip_spaces().is_none() {
            return ModuleCode::Fatal;
        }
        if !self.at(b'(') {
            self.set_error("Cannot find \"(\" in the argument declaration.");
            return ModuleCode::Fatal;
        }
        if self.read_arguments().is_none() {
            return ModuleCode::Fatal;
        }
        debug_assert!(self.at(b')'));
        self.bump();
        if self.skip_spaces().is_none() {
            return ModuleCode::Fatal;
        }
        // body statements, each introduced by the ';' of its predecessor
        loop {
            if !self.at(b';') {
                self.set_error("Cannot find \";\" in the module definition.");
                return ModuleCode::Fatal;
            }
            self.bump();
            if self.skip_spaces().is_none() {
                return ModuleCode::Fatal;
            }
            let token = self.read_name();
            let kw = Keyword::of(token);
            if kw == Some(Keyword::Endmodule) {
                let ntk = self.ntk.take().unwrap();
                self.succeeded.push(ntk.name);
                self.modules.push(ntk);
                return ModuleCode::Parsed;
            }
            let status = if let Some(class) = kw.and_then(Keyword::wire_class) {
                self.read_declaration(class)
            } else if matches!(kw, Some(Keyword::Reg) | Some(Keyword::Defparam)) {
                // unsupported statements are dropped to their ';'
                match self.skip_until(b';') {
                    true => Some(()),
                    false => None,
                }
            } else if kw == Some(Keyword::Assign) {
                self.read_assign()
            } else {
                self.read_instance(token)
            };
            if status.is_none() {
                return self.recover_module();
            }
            if self.skip_spaces().is_none() {
                return ModuleCode::Fatal;
            }
        }
    }

    pub(crate) fn read_design(&mut self) -> Result<(), ParseError> {
        loop {
            match self.read_module() {
                ModuleCode::Eof => return Ok(()),
                ModuleCode::Parsed | ModuleCode::Primitive | ModuleCode::Recovered => continue,
                ModuleCode::Fatal => return Err(self.take_error()),
            }
        }
    }
}
