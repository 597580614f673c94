use crate::ast::{Condition, Expr, FlowKind, LoopMode, Program, Statement};
use crate::names::NamePool;
use regex::Regex;

pub const INDENT: &str = "  ";

/// Defaults substituted when a required input slot is left unconnected.
pub const DEFAULT_NUMBER: &str = "0";
pub const DEFAULT_CONDITION: &str = "false";
pub const DEFAULT_LIST: &str = "[]";
pub const DEFAULT_STEP: &str = "1";

#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    /// When set, emitted source carries `pyt.generate_trace("<id>");` calls at
    /// loop entry and at each condition re-check. Pre- and post-test loops use
    /// the wrapped-condition style: the condition is re-evaluated inside an
    /// immediately-invoked function that reports the check before returning it.
    pub trace: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { trace: true }
    }
}

/// Precedence contexts for expression translation, tightest binding first.
/// A fragment is parenthesized when the surrounding context binds at least as
/// tightly as the fragment's own operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Order {
    Atomic,
    FunctionCall,
    Member,
    UnaryPrefix,
    Multiplicative,
    Additive,
    Relational,
    Equality,
    LogicalAnd,
    LogicalOr,
    Assignment,
    None,
}

pub fn generate(program: &Program, options: EmitOptions) -> String {
    let mut codegen = Codegen::new(options);
    codegen.generate(program)
}

pub struct Codegen {
    options: EmitOptions,
    names: NamePool,
    bare_ident_re: Regex,
}

impl Codegen {
    pub fn new(options: EmitOptions) -> Self {
        Self {
            options,
            names: NamePool::new(),
            bare_ident_re: Regex::new(r"^\w+$").expect("identifier pattern is valid"),
        }
    }

    /// One generation pass over the whole program. The name pool is reset and
    /// reseeded with every user-declared name before any temporary is issued.
    pub fn generate(&mut self, program: &Program) -> String {
        self.names.reset();
        let mut user_names = Vec::new();
        for script in &program.scripts {
            collect_user_names(&script.body, &mut user_names);
        }
        for name in &user_names {
            self.names.reserve(name);
        }

        let mut out = String::new();
        for (index, script) in program.scripts.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            if let Some(name) = &script.name {
                out.push_str(&format!("// {}\n", name));
            }
            out.push_str(&self.emit_statements(&script.body));
        }
        out
    }

    pub fn emit_statements(&mut self, statements: &[Statement]) -> String {
        let mut code = String::new();
        for statement in statements {
            code.push_str(&self.emit_statement(statement));
        }
        code
    }

    fn emit_statement(&mut self, statement: &Statement) -> String {
        match statement {
            Statement::Declare { name, init } => match init {
                Some(value) => format!(
                    "var {} = {};\n",
                    name,
                    self.value_to_code(value, Order::Assignment)
                ),
                None => format!("var {};\n", name),
            },
            Statement::Assign { target, value } => format!(
                "{} = {};\n",
                target,
                self.value_to_code(value, Order::Assignment)
            ),
            Statement::ExprStmt { expr } => {
                format!("{};\n", self.value_to_code(expr, Order::None))
            }
            Statement::Repeat { id, times, body } => self.emit_repeat(id, times.as_ref(), body),
            Statement::RepeatExt { id, times, body } => {
                self.emit_repeat_ext(id, times.as_ref(), body)
            }
            Statement::WhileUntil {
                id,
                mode,
                condition,
                body,
            } => self.emit_while_until(id, *mode, condition.as_ref(), body),
            Statement::DoWhile {
                id,
                mode,
                condition,
                body,
            } => self.emit_do_while(id, *mode, condition.as_ref(), body),
            Statement::For {
                id,
                var,
                from,
                to,
                by,
                body,
            } => self.emit_for(id, var, from.as_ref(), to.as_ref(), by.as_ref(), body),
            Statement::ForEach { id, var, list, body } => {
                self.emit_for_each(id, var, list.as_ref(), body)
            }
            Statement::Flow { id, kind } => self.emit_flow(id, *kind),
        }
    }

    // Repeat n times, counter internal to the block. The count expression is
    // evaluated once in the loop header, so no hoisting is needed.
    fn emit_repeat(&mut self, id: &str, times: Option<&Expr>, body: &[Statement]) -> String {
        let repeats = self.value_or_default(times, Order::Assignment, DEFAULT_NUMBER);
        let loop_var = self.names.distinct_name("count");
        let branch = self.loop_body(id, body);
        format!(
            "for (var {lv} = 0; {lv} < {repeats}; {lv}++) {{\n{branch}}}\n",
            lv = loop_var,
            repeats = repeats,
            branch = branch
        )
    }

    // Repeat n times with an arbitrary external count expression. Anything
    // that is not a bare identifier or numeric literal is hoisted into a
    // temporary so it is evaluated exactly once, never per iteration test.
    fn emit_repeat_ext(&mut self, id: &str, times: Option<&Expr>, body: &[Statement]) -> String {
        let repeats = self.value_or_default(times, Order::Assignment, DEFAULT_NUMBER);
        let loop_var = self.names.distinct_name("count");
        let branch = self.loop_body(id, body);
        let mut code = String::new();
        let end_var = if self.is_simple(&repeats) {
            repeats
        } else {
            let name = self.names.distinct_name("repeat_end");
            code.push_str(&format!("var {} = {};\n", name, repeats));
            name
        };
        code.push_str(&format!(
            "for (var {lv} = 0; {lv} < {end}; {lv}++) {{\n{branch}}}\n",
            lv = loop_var,
            end = end_var,
            branch = branch
        ));
        code
    }

    fn emit_while_until(
        &mut self,
        id: &str,
        mode: LoopMode,
        condition: Option<&Condition>,
        body: &[Statement],
    ) -> String {
        let (cond_text, cond_id) = self.condition_text(id, mode, condition);
        let branch = prefix_lines(&self.emit_statements(body), INDENT);
        if self.options.trace {
            format!(
                "{entry}\nwhile ({check}) {{\n{branch}}}\n",
                entry = trace_call(id),
                check = traced_condition(&cond_id, &cond_text),
                branch = branch
            )
        } else {
            format!("while ({}) {{\n{}}}\n", cond_text, branch)
        }
    }

    fn emit_do_while(
        &mut self,
        id: &str,
        mode: LoopMode,
        condition: Option<&Condition>,
        body: &[Statement],
    ) -> String {
        let (cond_text, cond_id) = self.condition_text(id, mode, condition);
        if self.options.trace {
            let branch = prefix_lines(
                &format!("{}\n{}", trace_call(id), self.emit_statements(body)),
                INDENT,
            );
            format!(
                "do {{\n{branch}}} while ({check});\n",
                branch = branch,
                check = traced_condition(&cond_id, &cond_text)
            )
        } else {
            let branch = prefix_lines(&self.emit_statements(body), INDENT);
            format!("do {{\n{}}} while ({});\n", branch, cond_text)
        }
    }

    // Bounded counting loop. Direction is fixed at emission time when all
    // three bounds are numeric literals; otherwise start/end are hoisted once
    // and a sign flag computed before the loop decides the test direction.
    fn emit_for(
        &mut self,
        id: &str,
        var: &str,
        from: Option<&Expr>,
        to: Option<&Expr>,
        by: Option<&Expr>,
        body: &[Statement],
    ) -> String {
        let from_text = self.value_or_default(from, Order::Assignment, DEFAULT_NUMBER);
        let to_text = self.value_or_default(to, Order::Assignment, DEFAULT_NUMBER);
        let by_text = self.value_or_default(by, Order::Assignment, DEFAULT_STEP);
        let branch = self.loop_body(id, body);

        if let (Some(from_n), Some(to_n), Some(by_n)) = (
            parse_number(&from_text),
            parse_number(&to_text),
            parse_number(&by_text),
        ) {
            let up = from_n <= to_n;
            let step = by_n.abs();
            let mut code = format!(
                "for (var {v} = {from}; {v} {cmp} {to}; {v}",
                v = var,
                from = from_text,
                cmp = if up { "<=" } else { ">=" },
                to = to_text
            );
            if step == 1.0 {
                code.push_str(if up { "++" } else { "--" });
            } else {
                code.push_str(&format!(
                    " {} {}",
                    if up { "+=" } else { "-=" },
                    number_text(step)
                ));
            }
            code.push_str(&format!(") {{\n{}}}\n", branch));
            return code;
        }

        let mut code = String::new();
        let start_var = if self.is_simple(&from_text) {
            from_text
        } else {
            let name = self.names.distinct_name(&format!("{}_start", var));
            code.push_str(&format!("var {} = {};\n", name, from_text));
            name
        };
        let end_var = if self.is_simple(&to_text) {
            to_text
        } else {
            let name = self.names.distinct_name(&format!("{}_end", var));
            code.push_str(&format!("var {} = {};\n", name, to_text));
            name
        };
        let inc_var = self.names.distinct_name(&format!("{}_inc", var));
        match parse_number(&by_text) {
            Some(by_n) => {
                code.push_str(&format!("var {} = {};\n", inc_var, number_text(by_n.abs())));
            }
            None => {
                code.push_str(&format!("var {} = Math.abs({});\n", inc_var, by_text));
            }
        }
        code.push_str(&format!(
            "if ({start} > {end}) {{\n{indent}{inc} = -{inc};\n}}\n",
            start = start_var,
            end = end_var,
            indent = INDENT,
            inc = inc_var
        ));
        code.push_str(&format!(
            "for (var {v} = {start}; {inc} >= 0 ? {v} <= {end} : {v} >= {end}; {v} += {inc}) {{\n{branch}}}\n",
            v = var,
            start = start_var,
            end = end_var,
            inc = inc_var,
            branch = branch
        ));
        code
    }

    // Index-based iteration. The current element lands in the loop variable
    // as the first statement of the body, ahead of the user's statements.
    fn emit_for_each(
        &mut self,
        id: &str,
        var: &str,
        list: Option<&Expr>,
        body: &[Statement],
    ) -> String {
        // The collection text is reused as the target of an index access, so
        // it is translated in member-access context.
        let list_text = self.value_or_default(list, Order::Member, DEFAULT_LIST);
        let index_var = self.names.distinct_name(&format!("{}_index", var));
        let mut inner = format!("{} = {}[{}];\n", var, list_text, index_var);
        if self.options.trace {
            inner.push_str(&format!("{}\n", trace_call(id)));
        }
        inner.push_str(&self.emit_statements(body));
        format!(
            "for (var {idx} in {list}) {{\n{branch}}}\n",
            idx = index_var,
            list = list_text,
            branch = prefix_lines(&inner, INDENT)
        )
    }

    fn emit_flow(&mut self, id: &str, kind: FlowKind) -> String {
        let keyword = match kind {
            FlowKind::Break => "break",
            FlowKind::Continue => "continue",
        };
        if self.options.trace {
            format!("{}{};\n", trace_call(id), keyword)
        } else {
            format!("{};\n", keyword)
        }
    }

    /// Loop body with the loop-entry trace line, indented one level.
    fn loop_body(&mut self, id: &str, body: &[Statement]) -> String {
        let mut inner = String::new();
        if self.options.trace {
            inner.push_str(&format!("{}\n", trace_call(id)));
        }
        inner.push_str(&self.emit_statements(body));
        prefix_lines(&inner, INDENT)
    }

    /// Condition text (negated for `until` mode) and the id reported on each
    /// re-check. An unconnected condition falls back to `false` and to the
    /// loop's own id.
    fn condition_text(
        &self,
        loop_id: &str,
        mode: LoopMode,
        condition: Option<&Condition>,
    ) -> (String, String) {
        let until = mode == LoopMode::Until;
        let context = if until {
            Order::UnaryPrefix
        } else {
            Order::None
        };
        let (text, cond_id) = match condition {
            Some(condition) => (
                self.value_to_code(&condition.expr, context),
                condition.block_id.clone(),
            ),
            None => (DEFAULT_CONDITION.to_string(), loop_id.to_string()),
        };
        if until {
            (format!("!{}", text), cond_id)
        } else {
            (text, cond_id)
        }
    }

    fn value_or_default(&self, expr: Option<&Expr>, order: Order, default: &str) -> String {
        match expr {
            Some(expr) => self.value_to_code(expr, order),
            None => default.to_string(),
        }
    }

    /// Translates an operand expression in the given precedence context,
    /// parenthesizing when the context binds at least as tightly as the
    /// fragment's own operator.
    pub fn value_to_code(&self, expr: &Expr, outer: Order) -> String {
        let (code, inner) = self.expr_parts(expr);
        if inner != Order::Atomic && outer <= inner {
            format!("({})", code)
        } else {
            code
        }
    }

    fn expr_parts(&self, expr: &Expr) -> (String, Order) {
        match expr {
            Expr::Number(value) => {
                let order = if *value < 0.0 {
                    Order::UnaryPrefix
                } else {
                    Order::Atomic
                };
                (number_text(*value), order)
            }
            Expr::Str(value) => (quote_string(value), Order::Atomic),
            Expr::Bool(value) => (value.to_string(), Order::Atomic),
            Expr::Ident(name) => (name.clone(), Order::Atomic),
            Expr::List(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| self.value_to_code(item, Order::None))
                    .collect();
                (format!("[{}]", parts.join(", ")), Order::Atomic)
            }
            Expr::Call { name, args } => {
                let parts: Vec<String> = args
                    .iter()
                    .map(|arg| self.value_to_code(arg, Order::None))
                    .collect();
                (
                    format!("{}({})", name, parts.join(", ")),
                    Order::FunctionCall,
                )
            }
            Expr::Unary { op, operand } => (
                format!("{}{}", op, self.value_to_code(operand, Order::UnaryPrefix)),
                Order::UnaryPrefix,
            ),
            Expr::Binary { op, left, right } => {
                let order = binary_order(op);
                (
                    format!(
                        "{} {} {}",
                        self.value_to_code(left, order),
                        op,
                        self.value_to_code(right, order)
                    ),
                    order,
                )
            }
        }
    }

    fn is_simple(&self, text: &str) -> bool {
        self.bare_ident_re.is_match(text) || parse_number(text).is_some()
    }
}

fn binary_order(op: &str) -> Order {
    match op {
        "*" | "/" | "%" => Order::Multiplicative,
        "+" | "-" => Order::Additive,
        "<" | "<=" | ">" | ">=" => Order::Relational,
        "==" | "!=" | "===" | "!==" => Order::Equality,
        "&&" => Order::LogicalAnd,
        "||" => Order::LogicalOr,
        _ => Order::None,
    }
}

fn trace_call(block_id: &str) -> String {
    format!("pyt.generate_trace({});", quote_string(block_id))
}

fn traced_condition(cond_id: &str, cond_text: &str) -> String {
    format!(
        "(function(){{{} return {};}})()",
        trace_call(cond_id),
        cond_text
    )
}

// f64 parsing accepts spellings like "inf" and "NaN" that are also valid
// identifiers; a numeric literal must start with a digit after an optional
// sign, and non-finite values are never literals.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    match unsigned.chars().next() {
        Some(c) if c.is_ascii_digit() => {}
        _ => return None,
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_text(value: f64) -> String {
    format!("{}", value)
}

fn quote_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        out.push_str(prefix);
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn collect_user_names(statements: &[Statement], names: &mut Vec<String>) {
    for statement in statements {
        match statement {
            Statement::Declare { name, .. } => names.push(name.clone()),
            Statement::Assign { target, .. } => names.push(target.clone()),
            Statement::For { var, .. } | Statement::ForEach { var, .. } => {
                names.push(var.clone())
            }
            _ => {}
        }
        if let Some(body) = statement.body() {
            collect_user_names(body, names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn codegen() -> Codegen {
        Codegen::new(EmitOptions { trace: false })
    }

    fn binary(op: &str, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[test]
    fn tighter_context_parenthesizes() {
        let sum = binary("+", Expr::Ident("a".into()), Expr::Ident("b".into()));
        let product = binary("*", sum, Expr::Ident("c".into()));
        assert_eq!(
            codegen().value_to_code(&product, Order::None),
            "(a + b) * c"
        );
    }

    #[test]
    fn looser_context_does_not() {
        let product = binary("*", Expr::Ident("b".into()), Expr::Ident("c".into()));
        let sum = binary("+", Expr::Ident("a".into()), product);
        assert_eq!(codegen().value_to_code(&sum, Order::None), "a + b * c");
    }

    #[test]
    fn negation_wraps_comparisons() {
        let cmp = binary("<", Expr::Ident("x".into()), Expr::Number(10.0));
        assert_eq!(
            codegen().value_to_code(&cmp, Order::UnaryPrefix),
            "(x < 10)"
        );
    }

    #[test]
    fn whole_numbers_print_without_decimals() {
        assert_eq!(number_text(5.0), "5");
        assert_eq!(number_text(2.5), "2.5");
        assert_eq!(number_text(-3.0), "-3");
    }

    #[test]
    fn strings_are_json_quoted() {
        assert_eq!(quote_string("a\"b"), r#""a\"b""#);
    }

    #[test]
    fn non_finite_spellings_are_not_numeric_literals() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("infinity"), None);
        assert_eq!(parse_number("-inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("10"), Some(10.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
    }

    #[test]
    fn indexing_a_call_result_needs_no_parens() {
        let call = Expr::Call {
            name: "getList".to_string(),
            args: Vec::new(),
        };
        assert_eq!(codegen().value_to_code(&call, Order::Member), "getList()");
    }
}
