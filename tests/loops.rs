use pytgen_rs_core::ast::{Condition, Expr, FlowKind, LoopMode, Program, Script, Statement};
use pytgen_rs_core::codegen::{self, Codegen, EmitOptions};

fn program(body: Vec<Statement>) -> Program {
    Program {
        scripts: vec![Script { name: None, body }],
    }
}

fn plain(body: Vec<Statement>) -> String {
    codegen::generate(&program(body), EmitOptions { trace: false })
}

fn traced(body: Vec<Statement>) -> String {
    codegen::generate(&program(body), EmitOptions { trace: true })
}

fn num(value: f64) -> Expr {
    Expr::Number(value)
}

fn ident(name: &str) -> Expr {
    Expr::Ident(name.to_string())
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call {
        name: name.to_string(),
        args,
    }
}

fn binary(op: &str, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op: op.to_string(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn assign(target: &str, value: Expr) -> Statement {
    Statement::Assign {
        target: target.to_string(),
        value,
    }
}

fn bump(var: &str) -> Statement {
    assign(var, binary("+", ident(var), num(1.0)))
}

fn condition(id: &str, expr: Expr) -> Option<Condition> {
    Some(Condition {
        block_id: id.to_string(),
        expr,
    })
}

fn numeric_for(from: f64, to: f64, by: f64) -> Statement {
    Statement::For {
        id: "f1".to_string(),
        var: "i".to_string(),
        from: Some(num(from)),
        to: Some(num(to)),
        by: Some(num(by)),
        body: vec![bump("x")],
    }
}

#[test]
fn numeric_for_ascending_literals() {
    let code = plain(vec![numeric_for(1.0, 5.0, 1.0)]);
    assert_eq!(code, "for (var i = 1; i <= 5; i++) {\n  x = x + 1;\n}\n");
}

#[test]
fn numeric_for_descending_literals() {
    let code = plain(vec![numeric_for(10.0, 1.0, 1.0)]);
    assert_eq!(code, "for (var i = 10; i >= 1; i--) {\n  x = x + 1;\n}\n");
}

#[test]
fn numeric_for_literal_step_magnitude() {
    let code = plain(vec![numeric_for(0.0, 10.0, 2.0)]);
    assert!(code.starts_with("for (var i = 0; i <= 10; i += 2) {\n"));

    // Step sign is ignored; direction comes from the bounds.
    let code = plain(vec![numeric_for(10.0, 0.0, -2.0)]);
    assert!(code.starts_with("for (var i = 10; i >= 0; i -= 2) {\n"));
}

#[test]
fn numeric_for_dynamic_bounds_use_sign_flag() {
    let code = plain(vec![Statement::For {
        id: "f1".to_string(),
        var: "i".to_string(),
        from: Some(call("getStart", vec![])),
        to: Some(ident("n")),
        by: Some(num(1.0)),
        body: vec![bump("x")],
    }]);
    assert_eq!(
        code,
        "var i_start = getStart();\n\
         var i_inc = 1;\n\
         if (i_start > n) {\n  i_inc = -i_inc;\n}\n\
         for (var i = i_start; i_inc >= 0 ? i <= n : i >= n; i += i_inc) {\n\
         \x20\x20x = x + 1;\n}\n"
    );
    // The non-literal bound is evaluated exactly once.
    assert_eq!(code.matches("getStart()").count(), 1);
}

#[test]
fn numeric_for_bound_named_like_a_number_stays_dynamic() {
    // "inf" is a legal variable name, not a literal; direction must be
    // decided at run time through the sign flag.
    let code = plain(vec![Statement::For {
        id: "f1".to_string(),
        var: "i".to_string(),
        from: Some(ident("inf")),
        to: Some(num(5.0)),
        by: Some(num(1.0)),
        body: vec![],
    }]);
    assert_eq!(
        code,
        "var i_inc = 1;\n\
         if (inf > 5) {\n  i_inc = -i_inc;\n}\n\
         for (var i = inf; i_inc >= 0 ? i <= 5 : i >= 5; i += i_inc) {\n}\n"
    );
}

#[test]
fn numeric_for_symbolic_step_uses_abs() {
    let code = plain(vec![Statement::For {
        id: "f1".to_string(),
        var: "i".to_string(),
        from: Some(ident("a")),
        to: Some(ident("b")),
        by: Some(ident("step")),
        body: vec![],
    }]);
    assert!(code.contains("var i_inc = Math.abs(step);\n"));
    assert!(code.contains("if (a > b) {\n  i_inc = -i_inc;\n}\n"));
}

#[test]
fn repeat_counts_from_zero() {
    let code = plain(vec![Statement::Repeat {
        id: "r1".to_string(),
        times: Some(num(3.0)),
        body: vec![assign("y", num(1.0))],
    }]);
    assert_eq!(code, "for (var count = 0; count < 3; count++) {\n  y = 1;\n}\n");
}

#[test]
fn repeat_traced_reports_each_iteration() {
    let code = traced(vec![Statement::Repeat {
        id: "r1".to_string(),
        times: Some(num(3.0)),
        body: vec![assign("y", num(1.0))],
    }]);
    assert_eq!(
        code,
        "for (var count = 0; count < 3; count++) {\n\
         \x20\x20pyt.generate_trace(\"r1\");\n\
         \x20\x20y = 1;\n}\n"
    );
}

#[test]
fn repeat_ext_hoists_compound_count() {
    let code = plain(vec![Statement::RepeatExt {
        id: "r1".to_string(),
        times: Some(call("getN", vec![])),
        body: vec![assign("y", num(1.0))],
    }]);
    assert_eq!(
        code,
        "var repeat_end = getN();\n\
         for (var count = 0; count < repeat_end; count++) {\n  y = 1;\n}\n"
    );
    assert_eq!(code.matches("getN()").count(), 1);
}

#[test]
fn repeat_ext_leaves_simple_counts_alone() {
    let code = plain(vec![Statement::RepeatExt {
        id: "r1".to_string(),
        times: Some(ident("n")),
        body: vec![],
    }]);
    assert_eq!(code, "for (var count = 0; count < n; count++) {\n}\n");

    let code = plain(vec![Statement::RepeatExt {
        id: "r1".to_string(),
        times: Some(num(7.0)),
        body: vec![],
    }]);
    assert_eq!(code, "for (var count = 0; count < 7; count++) {\n}\n");
}

#[test]
fn while_loop_plain() {
    let code = plain(vec![Statement::WhileUntil {
        id: "w1".to_string(),
        mode: LoopMode::While,
        condition: condition("c1", binary("<", ident("x"), num(10.0))),
        body: vec![bump("x")],
    }]);
    assert_eq!(code, "while (x < 10) {\n  x = x + 1;\n}\n");
}

#[test]
fn until_mode_negates_the_condition() {
    let code = plain(vec![Statement::WhileUntil {
        id: "w1".to_string(),
        mode: LoopMode::Until,
        condition: condition("c1", binary("<", ident("x"), num(10.0))),
        body: vec![bump("x")],
    }]);
    assert_eq!(code, "while (!(x < 10)) {\n  x = x + 1;\n}\n");
}

#[test]
fn while_traced_wraps_each_condition_check() {
    let code = traced(vec![Statement::WhileUntil {
        id: "w1".to_string(),
        mode: LoopMode::While,
        condition: condition("c1", binary("<", ident("x"), num(10.0))),
        body: vec![bump("x")],
    }]);
    assert_eq!(
        code,
        "pyt.generate_trace(\"w1\");\n\
         while ((function(){pyt.generate_trace(\"c1\"); return x < 10;})()) {\n\
         \x20\x20x = x + 1;\n}\n"
    );
}

#[test]
fn do_while_runs_body_first() {
    let code = plain(vec![Statement::DoWhile {
        id: "d1".to_string(),
        mode: LoopMode::While,
        condition: condition("c2", binary(">", ident("x"), num(0.0))),
        body: vec![assign("x", binary("-", ident("x"), num(1.0)))],
    }]);
    assert_eq!(code, "do {\n  x = x - 1;\n} while (x > 0);\n");
}

#[test]
fn do_while_until_negates_the_post_test() {
    let code = plain(vec![Statement::DoWhile {
        id: "d1".to_string(),
        mode: LoopMode::Until,
        condition: condition("c2", binary("==", ident("x"), num(0.0))),
        body: vec![bump("x")],
    }]);
    assert_eq!(code, "do {\n  x = x + 1;\n} while (!(x == 0));\n");
}

#[test]
fn do_while_traced() {
    let code = traced(vec![Statement::DoWhile {
        id: "d1".to_string(),
        mode: LoopMode::While,
        condition: condition("c2", binary(">", ident("x"), num(0.0))),
        body: vec![assign("x", binary("-", ident("x"), num(1.0)))],
    }]);
    assert_eq!(
        code,
        "do {\n\
         \x20\x20pyt.generate_trace(\"d1\");\n\
         \x20\x20x = x - 1;\n\
         } while ((function(){pyt.generate_trace(\"c2\"); return x > 0;})());\n"
    );
}

#[test]
fn for_each_assigns_element_first() {
    let code = plain(vec![Statement::ForEach {
        id: "e1".to_string(),
        var: "item".to_string(),
        list: Some(ident("items")),
        body: vec![Statement::ExprStmt {
            expr: call("doThing", vec![ident("item")]),
        }],
    }]);
    assert_eq!(
        code,
        "for (var item_index in items) {\n\
         \x20\x20item = items[item_index];\n\
         \x20\x20doThing(item);\n}\n"
    );
}

#[test]
fn for_each_parenthesizes_compound_collections() {
    let code = plain(vec![Statement::ForEach {
        id: "e1".to_string(),
        var: "item".to_string(),
        list: Some(binary("+", ident("a"), ident("b"))),
        body: vec![],
    }]);
    assert_eq!(
        code,
        "for (var item_index in (a + b)) {\n\
         \x20\x20item = (a + b)[item_index];\n}\n"
    );
}

#[test]
fn for_each_traced_reports_after_element_assignment() {
    let code = traced(vec![Statement::ForEach {
        id: "e1".to_string(),
        var: "item".to_string(),
        list: Some(ident("items")),
        body: vec![],
    }]);
    assert_eq!(
        code,
        "for (var item_index in items) {\n\
         \x20\x20item = items[item_index];\n\
         \x20\x20pyt.generate_trace(\"e1\");\n}\n"
    );
}

#[test]
fn flow_statements_emit_bare_keywords() {
    let brk = plain(vec![Statement::Flow {
        id: "b1".to_string(),
        kind: FlowKind::Break,
    }]);
    assert_eq!(brk, "break;\n");

    let cont = plain(vec![Statement::Flow {
        id: "b2".to_string(),
        kind: FlowKind::Continue,
    }]);
    assert_eq!(cont, "continue;\n");
}

#[test]
fn flow_statements_traced() {
    let brk = traced(vec![Statement::Flow {
        id: "b1".to_string(),
        kind: FlowKind::Break,
    }]);
    assert_eq!(brk, "pyt.generate_trace(\"b1\");break;\n");
}

#[test]
fn unconnected_slots_fall_back_to_defaults() {
    let repeat = plain(vec![Statement::Repeat {
        id: "r1".to_string(),
        times: None,
        body: vec![],
    }]);
    assert_eq!(repeat, "for (var count = 0; count < 0; count++) {\n}\n");

    let while_loop = plain(vec![Statement::WhileUntil {
        id: "w1".to_string(),
        mode: LoopMode::While,
        condition: None,
        body: vec![],
    }]);
    assert_eq!(while_loop, "while (false) {\n}\n");

    let until_loop = plain(vec![Statement::WhileUntil {
        id: "w1".to_string(),
        mode: LoopMode::Until,
        condition: None,
        body: vec![],
    }]);
    assert_eq!(until_loop, "while (!false) {\n}\n");

    let for_each = plain(vec![Statement::ForEach {
        id: "e1".to_string(),
        var: "item".to_string(),
        list: None,
        body: vec![],
    }]);
    assert_eq!(
        for_each,
        "for (var item_index in []) {\n  item = [][item_index];\n}\n"
    );
}

#[test]
fn synthesized_counters_never_shadow_user_names() {
    let code = plain(vec![
        Statement::Declare {
            name: "count".to_string(),
            init: Some(num(0.0)),
        },
        Statement::Repeat {
            id: "r1".to_string(),
            times: Some(num(2.0)),
            body: vec![Statement::Repeat {
                id: "r2".to_string(),
                times: Some(num(2.0)),
                body: vec![],
            }],
        },
    ]);
    assert_eq!(
        code,
        "var count = 0;\n\
         for (var count2 = 0; count2 < 2; count2++) {\n\
         \x20\x20for (var count3 = 0; count3 < 2; count3++) {\n\
         \x20\x20}\n}\n"
    );
}

#[test]
fn nested_bodies_indent_per_level() {
    let code = plain(vec![Statement::Repeat {
        id: "r1".to_string(),
        times: Some(num(2.0)),
        body: vec![Statement::Repeat {
            id: "r2".to_string(),
            times: Some(num(2.0)),
            body: vec![bump("x")],
        }],
    }]);
    assert!(code.contains("\n    x = x + 1;\n"));
}

#[test]
fn generation_passes_are_independent() {
    let prog = program(vec![Statement::Repeat {
        id: "r1".to_string(),
        times: Some(num(2.0)),
        body: vec![],
    }]);
    let mut cg = Codegen::new(EmitOptions { trace: false });
    let first = cg.generate(&prog);
    let second = cg.generate(&prog);
    assert_eq!(first, second);
    assert!(first.contains("var count = 0"));
}

#[test]
fn named_scripts_get_header_comments() {
    let prog = Program {
        scripts: vec![
            Script {
                name: Some("main".to_string()),
                body: vec![assign("x", num(1.0))],
            },
            Script {
                name: Some("helper".to_string()),
                body: vec![assign("y", num(2.0))],
            },
        ],
    };
    let code = codegen::generate(&prog, EmitOptions { trace: false });
    assert_eq!(code, "// main\nx = 1;\n\n// helper\ny = 2;\n");
}
