use rustc_hash::{FxHashMap, FxHashSet};

use crate::backend::interpreter::{EvalError, EvalResult};
use crate::backend::transpiler::c_identifier;

/// Variable store shared by every fragment of a session.
///
/// Besides the current values it remembers the order in which names were
/// first defined, so the generated declaration line is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: FxHashMap<String, f64>,
    declared: FxHashSet<String>,
    order: Vec<String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any previous value, and returns it.
    pub fn define(&mut self, name: &str, value: f64) -> f64 {
        self.declare(name);
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
        value
    }

    /// Records `name` for the declaration line without giving it a value.
    /// Used when code is generated for a fragment that is never evaluated.
    pub fn declare(&mut self, name: &str) {
        if self.declared.insert(name.to_string()) {
            self.order.push(name.to_string());
        }
    }

    pub fn lookup(&self, pos: usize, name: &str) -> EvalResult<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UndefinedVariable {
                pos,
                name: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Every name ever defined or declared, in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// A single C declaration covering every known variable, e.g.
    /// `double v_x, v_y;\n`. Empty when nothing has been defined.
    pub fn declarations(&self) -> String {
        if self.order.is_empty() {
            return String::new();
        }
        let names: Vec<String> = self.names().map(c_identifier).collect();
        format!("double {};\n", names.join(", "))
    }
}
