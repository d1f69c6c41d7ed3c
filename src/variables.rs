//! The scoped variable table threaded through a compilation.
//!
//! Scopes form an explicit stack: scope `n`'s parent is scope `n - 1`, so "walk the parent
//! chain" is a reverse iteration and no scope holds a reference to another. Local writes touch
//! only the innermost scope; global writes touch every scope on the stack, which is how ids
//! declared deep inside an include tree become visible to the whole project.

use std::collections::HashMap;

use crate::{codec::diagnostic::ParseDiagnostic, paths::DocPath};

/// Source path of the document currently being compiled.
pub const SOURCE_KEY: &str = " source";
/// Destination path of the document currently being compiled.
pub const DESTINATION_KEY: &str = " destination";
/// Accumulated [ParseDiagnostic]s.
pub const WARNINGS_KEY: &str = " warnings";
/// Authors collected from `(author ...)` forms.
pub const AUTHORS_KEY: &str = " authors";

/// Where a project-wide id points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdTarget {
    pub destination: DocPath,
    /// `#`-prefixed anchor within the destination, if the id names a section.
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Text(String),
    TextList(Vec<String>),
    Path(DocPath),
    Id(IdTarget),
    Diagnostics(Vec<ParseDiagnostic>),
}

type Scope = HashMap<String, Variable>;

#[derive(Debug, Clone)]
pub struct VariableTable {
    scopes: Vec<Scope>,
}

impl Default for VariableTable {
    fn default() -> Self {
        VariableTable::new()
    }
}

impl VariableTable {
    /// A root table with a fresh warnings list.
    pub fn new() -> Self {
        let mut root = Scope::new();
        root.insert(WARNINGS_KEY.to_string(), Variable::Diagnostics(Vec::new()));
        VariableTable { scopes: vec![root] }
    }

    /// Number of scopes on the stack; the root is depth 1.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a child scope whose parent is the current scope.
    pub fn create_child(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Discard the innermost scope. The root scope is never removed.
    pub fn drop_child(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Run `f` inside a child scope, discarding the scope on every exit path of `f`.
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut VariableTable) -> T) -> T {
        self.create_child();
        let depth = self.scopes.len();
        let res = f(self);
        self.scopes.truncate(depth - 1);
        res
    }

    pub fn get(&self, key: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(key))
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Write into the current scope only.
    pub fn add_value(&mut self, key: &str, value: Variable) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(key.to_string(), value);
        }
    }

    /// Write into the current scope and every ancestor.
    pub fn add_global_value(&mut self, key: &str, value: Variable) {
        for scope in self.scopes.iter_mut() {
            scope.insert(key.to_string(), value.clone());
        }
    }

    /// Append `item` to the current scope's list unless the visible list already has it.
    pub fn add_value_to_string_list(&mut self, key: &str, item: &str) {
        let mut list = self.get_string_list(key);
        if list.iter().any(|existing| existing == item) {
            return;
        }
        list.push(item.to_string());
        self.add_value(key, Variable::TextList(list));
    }

    /// Append `item` to the list held by every scope unless that scope's list already has it.
    pub fn add_global_value_to_string_list(&mut self, key: &str, item: &str) {
        for scope in self.scopes.iter_mut() {
            match scope.get_mut(key) {
                Some(Variable::TextList(list)) => {
                    if !list.iter().any(|existing| existing == item) {
                        list.push(item.to_string());
                    }
                }
                _ => {
                    scope.insert(key.to_string(), Variable::TextList(vec![item.to_string()]));
                }
            }
        }
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(Variable::TextList(list)) => list.clone(),
            Some(Variable::Text(text)) => vec![text.clone()],
            _ => Vec::new(),
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Variable::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn get_path(&self, key: &str) -> Option<&DocPath> {
        match self.get(key) {
            Some(Variable::Path(path)) => Some(path),
            _ => None,
        }
    }

    pub fn get_id(&self, id: &str) -> Option<&IdTarget> {
        match self.get(id) {
            Some(Variable::Id(target)) => Some(target),
            _ => None,
        }
    }

    /// Register a project-wide id. Re-registering the same target is a no-op; a conflicting
    /// registration is refused and the existing target returned.
    pub fn register_id(&mut self, id: &str, target: IdTarget) -> Result<(), IdTarget> {
        match self.get_id(id) {
            Some(existing) if *existing == target => Ok(()),
            Some(existing) => Err(existing.clone()),
            None => {
                tracing::debug!("Registering id '{}' -> {}", id, target.destination);
                self.add_global_value(id, Variable::Id(target));
                Ok(())
            }
        }
    }

    /// Push a diagnostic onto the nearest warnings list.
    pub fn add_warning(&mut self, diagnostic: ParseDiagnostic) {
        tracing::warn!("{}", diagnostic);
        for scope in self.scopes.iter_mut().rev() {
            if let Some(Variable::Diagnostics(list)) = scope.get_mut(WARNINGS_KEY) {
                list.push(diagnostic);
                return;
            }
        }
    }

    pub fn warnings(&self) -> Vec<ParseDiagnostic> {
        match self.get(WARNINGS_KEY) {
            Some(Variable::Diagnostics(list)) => list.clone(),
            _ => Vec::new(),
        }
    }

    pub fn source(&self) -> Option<&DocPath> {
        self.get_path(SOURCE_KEY)
    }

    pub fn destination(&self) -> Option<&DocPath> {
        self.get_path(DESTINATION_KEY)
    }
}
