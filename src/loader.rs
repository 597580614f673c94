use crate::ast::{Condition, Expr, FlowKind, LoopMode, Program, Script, Statement};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{Map, Value};

const UNARY_OPS: &[&str] = &["!", "-"];
const BINARY_OPS: &[&str] = &[
    "*", "/", "%", "+", "-", "<", "<=", ">", ">=", "==", "!=", "===", "!==", "&&", "||",
];

/// Builds the block model from a JSON block-program description. Unrecognized
/// statement types, flow kinds, loop modes, and operators are fatal here, so
/// the emitter never sees a construct it cannot handle. Unconnected inputs
/// simply stay `None`; the emitter substitutes its default literals.
pub fn load_program(source: &str) -> Result<Program> {
    let root: Value =
        serde_json::from_str(source).context("Input is not valid block-program JSON.")?;
    let scripts_value = root
        .get("scripts")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Block program is missing a 'scripts' array."))?;
    let mut scripts = Vec::new();
    for value in scripts_value {
        scripts.push(parse_script(value)?);
    }
    Ok(Program { scripts })
}

fn parse_script(value: &Value) -> Result<Script> {
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("Script entries must be objects."))?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let body = parse_statements(obj.get("body"))?;
    Ok(Script { name, body })
}

fn parse_statements(value: Option<&Value>) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    let Some(array) = value.and_then(Value::as_array) else {
        return Ok(statements);
    };
    for item in array {
        statements.push(parse_statement(item)?);
    }
    Ok(statements)
}

fn parse_statement(value: &Value) -> Result<Statement> {
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("Statements must be objects."))?;
    let typ = req_str(obj, "type", "statement")?;
    match typ.as_str() {
        "declare" => Ok(Statement::Declare {
            name: req_str(obj, "name", "declare statement")?,
            init: opt_expr(obj, "init")?,
        }),
        "set" => Ok(Statement::Assign {
            target: req_str(obj, "target", "set statement")?,
            value: req_expr(obj, "value", "set statement")?,
        }),
        "expr" => Ok(Statement::ExprStmt {
            expr: req_expr(obj, "value", "expr statement")?,
        }),
        "repeat" => {
            let id = req_str(obj, "id", "repeat block")?;
            Ok(Statement::Repeat {
                times: opt_expr(obj, "times")?,
                body: parse_statements(obj.get("do"))?,
                id,
            })
        }
        "repeat_ext" => {
            let id = req_str(obj, "id", "repeat_ext block")?;
            Ok(Statement::RepeatExt {
                times: opt_expr(obj, "times")?,
                body: parse_statements(obj.get("do"))?,
                id,
            })
        }
        "while_until" => {
            let id = req_str(obj, "id", "while_until block")?;
            Ok(Statement::WhileUntil {
                mode: parse_mode(obj)?,
                condition: opt_condition(obj, &id)?,
                body: parse_statements(obj.get("do"))?,
                id,
            })
        }
        "do_while" => {
            let id = req_str(obj, "id", "do_while block")?;
            Ok(Statement::DoWhile {
                mode: parse_mode(obj)?,
                condition: opt_condition(obj, &id)?,
                body: parse_statements(obj.get("do"))?,
                id,
            })
        }
        "for" => {
            let id = req_str(obj, "id", "for block")?;
            Ok(Statement::For {
                var: req_str(obj, "var", "for block")?,
                from: opt_expr(obj, "from")?,
                to: opt_expr(obj, "to")?,
                by: opt_expr(obj, "by")?,
                body: parse_statements(obj.get("do"))?,
                id,
            })
        }
        "for_each" => {
            let id = req_str(obj, "id", "for_each block")?;
            Ok(Statement::ForEach {
                var: req_str(obj, "var", "for_each block")?,
                list: opt_expr(obj, "list")?,
                body: parse_statements(obj.get("do"))?,
                id,
            })
        }
        "flow" => {
            let id = req_str(obj, "id", "flow block")?;
            let raw = req_str(obj, "flow", "flow block")?;
            let kind = FlowKind::parse(&raw)
                .ok_or_else(|| anyhow!("Unknown flow statement kind '{}'.", raw))?;
            Ok(Statement::Flow { id, kind })
        }
        other => bail!("Unknown statement type '{}'.", other),
    }
}

fn parse_mode(obj: &Map<String, Value>) -> Result<LoopMode> {
    let raw = req_str(obj, "mode", "loop block")?;
    LoopMode::parse(&raw).ok_or_else(|| anyhow!("Unknown loop mode '{}'.", raw))
}

fn opt_condition(obj: &Map<String, Value>, loop_id: &str) -> Result<Option<Condition>> {
    let Some(value) = obj.get("condition") else {
        return Ok(None);
    };
    let block_id = value
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(loop_id)
        .to_string();
    Ok(Some(Condition {
        block_id,
        expr: parse_expr(value)?,
    }))
}

fn parse_expr(value: &Value) -> Result<Expr> {
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("Expressions must be objects."))?;
    let typ = req_str(obj, "type", "expression")?;
    match typ.as_str() {
        "number" => {
            let number = obj
                .get("value")
                .and_then(Value::as_f64)
                .ok_or_else(|| anyhow!("Number expression is missing a numeric 'value'."))?;
            Ok(Expr::Number(number))
        }
        "string" => Ok(Expr::Str(req_str(obj, "value", "string expression")?)),
        "boolean" => {
            let flag = obj
                .get("value")
                .and_then(Value::as_bool)
                .ok_or_else(|| anyhow!("Boolean expression is missing a boolean 'value'."))?;
            Ok(Expr::Bool(flag))
        }
        "ident" => Ok(Expr::Ident(req_str(obj, "name", "ident expression")?)),
        "list" => {
            let mut items = Vec::new();
            if let Some(array) = obj.get("items").and_then(Value::as_array) {
                for item in array {
                    items.push(parse_expr(item)?);
                }
            }
            Ok(Expr::List(items))
        }
        "call" => {
            let name = req_str(obj, "name", "call expression")?;
            let mut args = Vec::new();
            if let Some(array) = obj.get("args").and_then(Value::as_array) {
                for arg in array {
                    args.push(parse_expr(arg)?);
                }
            }
            Ok(Expr::Call { name, args })
        }
        "unary" => {
            let op = req_str(obj, "op", "unary expression")?;
            if !UNARY_OPS.contains(&op.as_str()) {
                bail!("Unknown unary operator '{}'.", op);
            }
            Ok(Expr::Unary {
                op,
                operand: Box::new(req_expr(obj, "value", "unary expression")?),
            })
        }
        "binary" => {
            let op = req_str(obj, "op", "binary expression")?;
            if !BINARY_OPS.contains(&op.as_str()) {
                bail!("Unknown binary operator '{}'.", op);
            }
            Ok(Expr::Binary {
                op,
                left: Box::new(req_expr(obj, "left", "binary expression")?),
                right: Box::new(req_expr(obj, "right", "binary expression")?),
            })
        }
        other => bail!("Unknown expression type '{}'.", other),
    }
}

fn req_expr(obj: &Map<String, Value>, key: &str, what: &str) -> Result<Expr> {
    let value = obj
        .get(key)
        .ok_or_else(|| anyhow!("Missing '{}' input in {}.", key, what))?;
    parse_expr(value)
}

fn opt_expr(obj: &Map<String, Value>, key: &str) -> Result<Option<Expr>> {
    match obj.get(key) {
        Some(value) => Ok(Some(parse_expr(value)?)),
        None => Ok(None),
    }
}

fn req_str(obj: &Map<String, Value>, key: &str, what: &str) -> Result<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("Missing string field '{}' in {}.", key, what))
}
