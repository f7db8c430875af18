//! How the REPL shows the value of an expression statement.

use crate::value::Value;

use super::Interpreter;

impl Interpreter {
    /// Like OUTPUT, but quoted and tagged with the type for non-primitives.
    pub fn echo(&self, value: &Value) -> String {
        match value {
            Value::Char(c) => format!("'{c}'"),
            Value::String(s) => format!("\"{s}\""),
            Value::Enum(e) => format!("{}: {}", e.def.name, e.name()),
            Value::Pointer(p) => {
                let target = match &p.target {
                    None => "null".to_string(),
                    Some(place) => {
                        let reachable = self.scopes.is_live(place.scope)
                            && self.scopes.is_ancestor(place.scope, self.root);
                        match self.scopes.variable(place) {
                            Some(var) if reachable => var.name.clone(),
                            _ => "{DELETED}".to_string(),
                        }
                    }
                };
                format!("{}: {target}", p.type_name)
            }
            Value::Composite(r) => format!("{} object", r.type_name),
            other => other.to_string(),
        }
    }
}
