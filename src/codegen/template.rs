// src/codegen/template.rs

//! Typed source fragments for the generated interpreter program.
//!
//! Identifiers reaching these fragments have already been validated by
//! [`super::command_ref`]; free-form strings (file paths) are emitted as
//! escaped string literals.

use std::fmt::Write;
use std::path::Path;

use crate::codec::RESULT_FIELDS;

/// Local name bound to the constructed task object.
const TASK_VAR: &str = "task";

/// Render `s` as a double-quoted string literal.
///
/// A JSON string literal is also a valid literal for the interpreter, so the
/// JSON encoder does the escaping.
pub fn string_literal(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Program header: load the input document and bind `config`, `params` and
/// `state` before the body runs.
#[derive(Debug, Clone, Copy)]
pub struct Preamble<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
}

impl Preamble<'_> {
    pub fn render(&self, out: &mut String) {
        let input = string_literal(&self.input.to_string_lossy());
        let output = string_literal(&self.output.to_string_lossy());

        out.push_str("import json\n");
        let _ = writeln!(out, "in_file = {input}");
        let _ = writeln!(out, "out_file = {output}");
        out.push_str("with open(in_file) as f:\n");
        out.push_str("    in_data = json.load(f)\n");
        out.push_str("    config = in_data['config']\n");
        out.push_str("    params = in_data['params']\n");
        out.push_str("    state = in_data['state']\n");
        out.push('\n');
    }
}

/// One piece of a body synthesized from a class reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// `from <module> import <symbol>`
    Import { module: String, symbol: String },
    /// `task = <symbol>(config, state, params)`
    Construct { symbol: String },
    /// `task.<method>()`
    Invoke { method: String },
    /// Pick up each optional result attribute the task object exposes.
    CollectResult,
    /// Dump the collected result to `out_file`.
    WriteResult,
}

impl Fragment {
    pub fn render(&self, out: &mut String) {
        match self {
            Fragment::Import { module, symbol } => {
                let _ = writeln!(out, "from {module} import {symbol}");
            }
            Fragment::Construct { symbol } => {
                let _ = writeln!(out, "{TASK_VAR} = {symbol}(config, state, params)");
            }
            Fragment::Invoke { method } => {
                let _ = writeln!(out, "{TASK_VAR}.{method}()");
                out.push('\n');
            }
            Fragment::CollectResult => {
                out.push_str("out = dict()\n");
                for field in RESULT_FIELDS {
                    let _ = writeln!(out, "if hasattr({TASK_VAR}, '{field}'):");
                    let _ = writeln!(out, "    out['{field}'] = {TASK_VAR}.{field}");
                }
            }
            Fragment::WriteResult => {
                out.push_str("with open(out_file, 'w') as f:\n");
                out.push_str("    json.dump(out, f)\n");
            }
        }
    }
}

pub fn render_fragments(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        fragment.render(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn string_literal_escapes_quotes_and_backslashes() {
        assert_eq!(string_literal("/tmp/a"), "\"/tmp/a\"");
        assert_eq!(string_literal("C:\\x\"y"), "\"C:\\\\x\\\"y\"");
        assert_eq!(string_literal("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn preamble_binds_paths_and_documents() {
        let input = PathBuf::from("/tmp/in.tmp");
        let output = PathBuf::from("/tmp/out.tmp");
        let mut out = String::new();
        Preamble {
            input: &input,
            output: &output,
        }
        .render(&mut out);

        assert!(out.starts_with("import json\n"));
        assert!(out.contains("in_file = \"/tmp/in.tmp\"\n"));
        assert!(out.contains("out_file = \"/tmp/out.tmp\"\n"));
        assert!(out.contains("    config = in_data['config']\n"));
        assert!(out.contains("    params = in_data['params']\n"));
        assert!(out.contains("    state = in_data['state']\n"));
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn collect_result_covers_every_result_field() {
        let out = render_fragments(&[Fragment::CollectResult]);
        for field in RESULT_FIELDS {
            assert!(out.contains(&format!("if hasattr(task, '{field}'):\n")));
            assert!(out.contains(&format!("    out['{field}'] = task.{field}\n")));
        }
    }
}
