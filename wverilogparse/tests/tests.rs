//! unit tests for wverilogparse

use wverilogparse::*;

const VERILOG_SIMPLE: &str = include_str!("simple.v");
const VERILOG_VECTOR: &str = include_str!("vector.v");
const VERILOG_MUX: &str = include_str!("mux.v");
const VERILOG_GATES: &str = include_str!("gates.v");
const VERILOG_BLACKBOX: &str = include_str!("blackbox.v");
const VERILOG_KNOWN: &str = include_str!("known.v");
const VERILOG_TRICKY: &str = include_str!("tricky.v");
const VERILOG_HEADER2001: &str = include_str!("header2001.v");

fn names<'i>(d: &'i WVerilog, ids: &[NameId]) -> Vec<&'i str> {
  ids.iter().map(|&id| d.str(id)).collect()
}

/// positional actuals of a box that are all plain names
fn pin_names<'i>(d: &'i WVerilog, b: &BoxDef) -> Vec<&'i str> {
  b.pins.iter().map(|&(formal, actual)| {
    assert!(formal.is_none());
    assert_eq!(actual.tag(), SigTag::Name);
    d.str(actual.payload_name())
  }).collect()
}

#[test]
fn test_simple_and() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_SIMPLE).expect("parse error");
  assert_eq!(names(&d, &d.succeeded), ["m"]);
  assert!(d.known.is_empty() && d.failed.is_empty());
  let m = d.module("m").unwrap();
  assert_eq!(names(&d, &m.ports), ["a", "b", "y"]);
  assert_eq!(names(&d, &m.inputs), ["a", "b"]);
  assert_eq!(names(&d, &m.outputs), ["y"]);
  assert!(m.inouts.is_empty() && m.wires.is_empty());
  assert_eq!(m.boxes.len(), 1);
  let b = &m.boxes[0];
  assert_eq!(b.kind, BoxKind::Prim(Prim::And));
  assert!(b.inst.is_none());
  assert!(b.from_assign);
  assert_eq!(pin_names(&d, b), ["a", "b", "y"]);
}

#[test]
fn test_simple_format() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_SIMPLE).expect("parse error");
  println!("Restructure: \n{d}");
  assert_eq!(format!("{d}"), "\
module m(a, b, y);
  input a;
  input b;
  output y;

  assign y = a & b;
endmodule
");
}

#[test]
fn test_vector_inv() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_VECTOR).expect("parse error");
  let m = d.module("m").unwrap();
  assert_eq!(names(&d, &m.inputs), ["a", "b"]);
  for &r in m.inputs_r.iter().chain(m.outputs_r.iter()) {
    assert_eq!(d.str(r), "[3:0]");
  }
  assert_eq!(m.boxes.len(), 1);
  let b = &m.boxes[0];
  assert_eq!(b.kind, BoxKind::Prim(Prim::Inv));
  assert_eq!(pin_names(&d, b), ["a", "y"]);
}

#[test]
fn test_mux_assign() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_MUX).expect("parse error");
  let m = d.module("m").unwrap();
  assert_eq!(m.boxes.len(), 1);
  let b = &m.boxes[0];
  assert_eq!(b.kind, BoxKind::Prim(Prim::Mux));
  assert_eq!(pin_names(&d, b), ["s", "a", "b", "y"]);
}

#[test]
fn test_gate_instances() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_GATES).expect("parse error");
  let m = d.module("m").unwrap();
  assert_eq!(names(&d, &m.wires), ["w", "v"]);
  assert_eq!(m.boxes.len(), 3);
  assert_eq!(m.boxes[0].kind, BoxKind::Prim(Prim::And));
  assert_eq!(d.str(m.boxes[0].inst), "g1");
  assert_eq!(pin_names(&d, &m.boxes[0]), ["w", "a", "b"]);
  assert_eq!(m.boxes[1].kind, BoxKind::Prim(Prim::Buf));
  assert_eq!(d.str(m.boxes[1].inst), "g2");
  assert_eq!(pin_names(&d, &m.boxes[1]), ["y", "w"]);
  // anonymous gate instance: the written pin order survives, with
  // the output staying in front
  assert_eq!(m.boxes[2].kind, BoxKind::Prim(Prim::And));
  assert!(m.boxes[2].inst.is_none());
  assert!(!m.boxes[2].from_assign);
  assert_eq!(pin_names(&d, &m.boxes[2]), ["v", "w", "b"]);
}

#[test]
fn test_gate_instances_format() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_GATES).expect("parse error");
  // the anonymous instance must not be rewritten into an assign,
  // which would transpose its output pin to the back
  assert_eq!(format!("{d}"), "\
module m(a, b, y);
  input a;
  input b;
  output y;
  wire w;
  wire v;

  and g1(w, a, b);
  buf g2(y, w);
  and(v, w, b);
endmodule
");
}

#[test]
fn test_always_demotes_to_blackbox() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_BLACKBOX).expect("parse error");
  assert!(d.succeeded.is_empty());
  assert_eq!(names(&d, &d.failed), ["m"]);
  assert_eq!(d.modules.len(), 1);
  let m = d.module("m").unwrap();
  // the interface survives, the body does not
  assert_eq!(names(&d, &m.ports), ["a", "y"]);
  assert_eq!(names(&d, &m.inputs), ["a"]);
  assert_eq!(names(&d, &m.outputs), ["y"]);
  assert!(m.boxes.is_empty());
  assert!(m.is_stub());
}

#[test]
fn test_known_module_elided() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_KNOWN).expect("parse error");
  assert_eq!(names(&d, &d.known), ["VERIFIC_add"]);
  assert_eq!(names(&d, &d.succeeded), ["m"]);
  assert_eq!(d.modules.len(), 1);
  let m = d.module("m").unwrap();
  assert_eq!(m.boxes.len(), 1);
  let b = &m.boxes[0];
  match b.kind {
    BoxKind::User(id) => assert_eq!(d.str(id), "VERIFIC_add"),
    _ => panic!("expected a user box"),
  }
  assert_eq!(d.str(b.inst), "u0");
  let formals: Vec<&str> = b.pins.iter().map(|&(f, _)| d.str(f)).collect();
  assert_eq!(formals, ["a", "b", "y"]);
}

#[test]
fn test_tricky_corners() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_TRICKY).expect("parse error");
  assert_eq!(names(&d, &d.succeeded), ["top"]);
  let m = d.module("top").unwrap();
  assert_eq!(names(&d, &m.ports), ["a.b[0]", "y", "z"]);
  assert_eq!(names(&d, &m.inputs), ["a.b[0]"]);
  // reg and defparam statements are dropped entirely
  assert_eq!(names(&d, &m.wires), ["w"]);
  assert_eq!(d.str(m.wires_r[0]), "[3:0]");

  assert_eq!(m.boxes.len(), 4);

  // assign z = \a.b[0] ;
  let b = &m.boxes[0];
  assert_eq!(b.kind, BoxKind::Prim(Prim::Buf));
  assert_eq!(pin_names(&d, b), ["a.b[0]", "z"]);

  // assign y[0] = 1'bx;
  let b = &m.boxes[1];
  assert_eq!(b.kind, BoxKind::Prim(Prim::Buf));
  let (_, rhs) = b.pins[0];
  assert_eq!(rhs.tag(), SigTag::Const);
  assert_eq!(d.str(rhs.payload_name()), "1'bx");
  let (_, lhs) = b.pins[1];
  assert_eq!(lhs.tag(), SigTag::Slice);
  let s = m.slices[lhs.payload() as usize];
  assert_eq!(d.str(s.base), "y");
  assert_eq!(d.str(s.range), "[0]");

  // assign w = {2'b01, \a.b[0] , w[3:1]};
  let b = &m.boxes[2];
  let (_, rhs) = b.pins[0];
  assert_eq!(rhs.tag(), SigTag::Concat);
  let parts = &m.concats[rhs.payload() as usize];
  assert_eq!(parts.len(), 3);
  assert_eq!(parts[0].tag(), SigTag::Const);
  assert_eq!(d.str(parts[0].payload_name()), "2'b01");
  assert_eq!(parts[1].tag(), SigTag::Name);
  assert_eq!(d.str(parts[1].payload_name()), "a.b[0]");
  assert_eq!(parts[2].tag(), SigTag::Slice);
  let s = m.slices[parts[2].payload() as usize];
  assert_eq!(d.str(s.base), "w");
  assert_eq!(d.str(s.range), "[3:1]");

  // sub_4 s0(w, y); resolves by prefix
  let b = &m.boxes[3];
  assert_eq!(b.kind, BoxKind::Prim(Prim::Sub));
  assert_eq!(d.str(b.inst), "s0");
  assert_eq!(pin_names(&d, b), ["w", "y"]);
}

#[test]
fn test_header_2001_sticky_directions() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(VERILOG_HEADER2001).expect("parse error");
  let m = d.module("m").unwrap();
  assert_eq!(names(&d, &m.ports), ["a", "b", "y", "io"]);
  // every port lands in exactly one direction bucket
  assert_eq!(m.ports.len(),
             m.inputs.len() + m.outputs.len() + m.inouts.len());
  assert_eq!(names(&d, &m.inputs), ["a", "b"]);
  assert_eq!(d.str(m.inputs_r[0]), "[3:0]");
  assert_eq!(d.str(m.inputs_r[1]), "[3:0]");
  // a fresh direction without a range declares scalars
  assert_eq!(names(&d, &m.outputs), ["y"]);
  assert!(m.outputs_r[0].is_none());
  assert_eq!(names(&d, &m.inouts), ["io"]);
  assert!(m.inouts_r[0].is_none());
}

#[test]
fn test_empty_port_list() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str("module m();\nendmodule\n").expect("parse error");
  assert_eq!(names(&d, &d.succeeded), ["m"]);
  assert!(d.module("m").unwrap().ports.is_empty());
}

#[test]
fn test_singleton_concat_collapses() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(
    "module m(a, y); input a; output y; assign y = {a}; endmodule"
  ).expect("parse error");
  let m = d.module("m").unwrap();
  assert!(m.concats.is_empty());
  let (_, rhs) = m.boxes[0].pins[0];
  assert_eq!(rhs.tag(), SigTag::Name);
  assert_eq!(d.str(rhs.payload_name()), "a");
}

#[test]
fn test_nested_concat_demotes() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str("\
module bad(a, b, y); input a, b; output y; assign y = {a, {b, a}}; endmodule
module good(a, y); input a; output y; assign y = a; endmodule
").expect("parse error");
  assert_eq!(names(&d, &d.failed), ["bad"]);
  assert_eq!(names(&d, &d.succeeded), ["good"]);
  assert_eq!(d.modules.len(), 2);
  let bad = d.module("bad").unwrap();
  assert!(bad.is_stub());
  assert_eq!(names(&d, &bad.ports), ["a", "b", "y"]);
}

#[test]
fn test_constants_with_xz() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(
    "module m(y, z, q); output y, z, q; \
     assign y = 4'hZ; assign z = 1'bx; assign q = 8'd255; endmodule"
  ).expect("parse error");
  let m = d.module("m").unwrap();
  let consts: Vec<&str> = m.boxes.iter().map(|b| {
    let (_, rhs) = b.pins[0];
    assert_eq!(rhs.tag(), SigTag::Const);
    d.str(rhs.payload_name())
  }).collect();
  assert_eq!(consts, ["4'hZ", "1'bx", "8'd255"]);
}

#[test]
fn test_assign_trailing_whitespace() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(
    "module m(a, y); input a; output y; assign y = a   /* pad */ ; endmodule"
  ).expect("parse error");
  assert_eq!(names(&d, &d.succeeded), ["m"]);
  assert_eq!(d.module("m").unwrap().boxes.len(), 1);
}

#[test]
fn test_xnor_assign() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(
    "module m(a, b, y); input a, b; output y; assign y = ~a ^ b; endmodule"
  ).expect("parse error");
  let b = &d.module("m").unwrap().boxes[0];
  assert_eq!(b.kind, BoxKind::Prim(Prim::Xnor));
  assert_eq!(pin_names(&d, b), ["a", "b", "y"]);
}

#[test]
fn test_fatal_errors() {
  clilog::init_stdout_simple_trace();
  let e = WVerilog::parse_str("wire w;").unwrap_err();
  assert!(e.contains("Cannot read \"module\" keyword."), "{e}");

  let e = WVerilog::parse_str("module m (a, b").unwrap_err();
  assert!(e.contains("Unexpectedly reached end-of-file."), "{e}");

  let e = WVerilog::parse_str("module ;").unwrap_err();
  assert!(e.contains("Cannot read module name."), "{e}");

  let e = WVerilog::parse_str("module m(a) input a; endmodule").unwrap_err();
  assert!(e.contains("Cannot find \";\" in the module definition."), "{e}");
}

#[test]
fn test_unrecognized_operator_demotes() {
  clilog::init_stdout_simple_trace();
  let d = WVerilog::parse_str(
    "module m(a, b, y); input a, b; output y; assign y = a + b; endmodule"
  ).expect("parse error");
  assert_eq!(names(&d, &d.failed), ["m"]);
  assert!(d.module("m").unwrap().is_stub());
}

#[test]
fn test_roundtrip() {
  clilog::init_stdout_simple_trace();
  for src in [
    VERILOG_SIMPLE, VERILOG_VECTOR, VERILOG_MUX, VERILOG_GATES,
    VERILOG_BLACKBOX, VERILOG_KNOWN, VERILOG_TRICKY, VERILOG_HEADER2001,
  ] {
    let d1 = WVerilog::parse_str(src).expect("parse error");
    let out1 = format!("{d1}");
    let d2 = WVerilog::parse_str(&out1).expect("reparse error");
    let out2 = format!("{d2}");
    // the emitted text is a fixpoint of parse + write
    assert_eq!(out1, out2);
    assert_eq!(d1.modules.len(), d2.modules.len());
    for (m1, m2) in d1.modules.iter().zip(d2.modules.iter()) {
      assert_eq!(d1.str(m1.name), d2.str(m2.name));
      assert_eq!(names(&d1, &m1.ports), names(&d2, &m2.ports));
      assert_eq!(names(&d1, &m1.inputs), names(&d2, &m2.inputs));
      assert_eq!(names(&d1, &m1.outputs), names(&d2, &m2.outputs));
      assert_eq!(names(&d1, &m1.inouts), names(&d2, &m2.inouts));
      assert_eq!(m1.boxes.len(), m2.boxes.len());
      for (b1, b2) in m1.boxes.iter().zip(m2.boxes.iter()) {
        match (b1.kind, b2.kind) {
          (BoxKind::Prim(p1), BoxKind::Prim(p2)) => assert_eq!(p1, p2),
          (BoxKind::User(u1), BoxKind::User(u2)) =>
            assert_eq!(d1.str(u1), d2.str(u2)),
          _ => panic!("box kind changed across the round trip"),
        }
        assert_eq!(b1.from_assign, b2.from_assign);
        assert_eq!(b1.pins.len(), b2.pins.len());
      }
    }
  }
}
