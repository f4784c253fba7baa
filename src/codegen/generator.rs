// src/codegen/generator.rs

use serde_json::Value;
use tracing::debug;

use crate::codegen::command_ref::{CommandRef, LifecycleMethod};
use crate::codegen::template::{render_fragments, Fragment, Preamble};
use crate::errors::{BridgeError, Result};
use crate::exchange::ExchangePaths;
use crate::types::Document;

/// Source text for one invocation. Never reused across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    body: String,
    text: String,
}

impl GeneratedSource {
    /// Task logic without the preamble: the literal `script`, or the body
    /// synthesized from `command`.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Full program fed to the interpreter.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Work out the task body from `config`.
///
/// A `command` reference takes precedence over `script`. Fails with
/// [`BridgeError::MissingExecutableSpecification`] when neither is present.
pub fn resolve_body(config: &Document, method: &LifecycleMethod) -> Result<String> {
    if let Some(command) = config.get("command") {
        let reference = command.as_str().ok_or_else(|| {
            BridgeError::Config(format!("`command` must be a string (got {})", command))
        })?;
        let command = CommandRef::parse(reference)?;
        debug!(command = %reference, method = %method, "synthesizing body from command");
        return Ok(render_fragments(&command_fragments(&command, method)));
    }

    match config.get("script") {
        Some(Value::String(script)) => Ok(script.clone()),
        Some(other) => Err(BridgeError::Config(format!(
            "`script` must be a string (got {})",
            other
        ))),
        None => Err(BridgeError::MissingExecutableSpecification),
    }
}

/// Fragments for `command = "pkg.sub.Class"`; no import for a bare symbol.
pub fn command_fragments(command: &CommandRef, method: &LifecycleMethod) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(5);
    if let Some(module) = command.module() {
        fragments.push(Fragment::Import {
            module,
            symbol: command.symbol().to_string(),
        });
    }
    fragments.push(Fragment::Construct {
        symbol: command.symbol().to_string(),
    });
    fragments.push(Fragment::Invoke {
        method: method.as_str().to_string(),
    });
    fragments.push(Fragment::CollectResult);
    fragments.push(Fragment::WriteResult);
    fragments
}

/// Wrap `body` with the preamble that binds the exchange paths.
pub fn render_source(body: String, paths: ExchangePaths<'_>) -> GeneratedSource {
    let mut text = String::with_capacity(body.len() + 256);
    Preamble {
        input: paths.input,
        output: paths.output,
    }
    .render(&mut text);
    text.push_str(&body);

    GeneratedSource { body, text }
}

/// Resolve the body and render the full program in one step.
pub fn generate(
    config: &Document,
    method: &LifecycleMethod,
    paths: ExchangePaths<'_>,
) -> Result<GeneratedSource> {
    let body = resolve_body(config, method)?;
    Ok(render_source(body, paths))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;

    use super::*;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn paths() -> ExchangePaths<'static> {
        ExchangePaths {
            input: Path::new("/tmp/tb-in.tmp"),
            output: Path::new("/tmp/tb-out.tmp"),
        }
    }

    #[test]
    fn script_is_appended_verbatim_after_preamble() {
        let script = "x = 1\nif x:\n    print('it''s \"quoted\" \\\\ ok')\n";
        let config = doc(json!({ "script": script }));

        let source = generate(&config, &LifecycleMethod::run(), paths()).unwrap();

        assert_eq!(source.body(), script);
        assert!(source.text().ends_with(script));
        let preamble_len = source.text().len() - script.len();
        assert!(source.text()[..preamble_len].contains("state = in_data['state']"));
    }

    #[test]
    fn scenario_mymod_task() {
        let config = doc(json!({ "command": "mymod.Task" }));
        let source = generate(&config, &LifecycleMethod::run(), paths()).unwrap();
        let text = source.text();

        assert!(text.contains("from mymod import Task\n"));
        assert!(text.contains("task = Task(config, state, params)\n"));
        assert!(text.contains("task.run()\n"));
        for field in ["sub", "carry_params", "inputs", "outputs"] {
            assert!(text.contains(&format!("if hasattr(task, '{field}'):")));
        }
        assert!(text.contains("json.dump(out, f)"));
    }

    #[test]
    fn nested_module_path_is_dot_joined() {
        let config = doc(json!({ "command": "a.b.C" }));
        let source = generate(&config, &LifecycleMethod::parse("setup").unwrap(), paths()).unwrap();

        assert!(source.text().contains("from a.b import C\n"));
        assert!(source.text().contains("task = C(config, state, params)\n"));
        assert!(source.text().contains("task.setup()\n"));
    }

    #[test]
    fn bare_symbol_generates_no_import() {
        let config = doc(json!({ "command": "C" }));
        let source = generate(&config, &LifecycleMethod::run(), paths()).unwrap();

        assert!(!source.body().contains("import"));
        assert!(source.body().starts_with("task = C(config, state, params)\n"));
    }

    #[test]
    fn command_wins_over_script() {
        let config = doc(json!({ "command": "m.K", "script": "print('ignored')" }));
        let body = resolve_body(&config, &LifecycleMethod::run()).unwrap();
        assert!(body.contains("from m import K"));
        assert!(!body.contains("ignored"));
    }

    #[test]
    fn missing_command_and_script_is_reported() {
        let config = doc(json!({ "other": 1 }));
        assert!(matches!(
            resolve_body(&config, &LifecycleMethod::run()),
            Err(BridgeError::MissingExecutableSpecification)
        ));
    }

    #[test]
    fn non_string_fields_are_config_errors() {
        let config = doc(json!({ "command": ["a", "B"] }));
        assert!(matches!(
            resolve_body(&config, &LifecycleMethod::run()),
            Err(BridgeError::Config(_))
        ));
        let config = doc(json!({ "script": 42 }));
        assert!(matches!(
            resolve_body(&config, &LifecycleMethod::run()),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn each_call_renders_fresh_source() {
        let config = doc(json!({ "script": "pass\n" }));
        let other = ExchangePaths {
            input: Path::new("/tmp/other-in.tmp"),
            output: Path::new("/tmp/other-out.tmp"),
        };
        let a = generate(&config, &LifecycleMethod::run(), paths()).unwrap();
        let b = generate(&config, &LifecycleMethod::run(), other).unwrap();
        assert_ne!(a.text(), b.text());
        assert_eq!(a.body(), b.body());
    }
}
