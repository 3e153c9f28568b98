use std::{
    cell::{RefCell, RefMut},
    collections::HashMap,
    fmt,
    rc::Rc,
};

use log::trace;

use super::{error::Error, value::Value};
use crate::token::Token;

#[derive(Debug)]
struct Scope {
    variables: HashMap<String, Value>,
    parent: Option<usize>,
}

impl Scope {
    fn new(parent: Option<usize>) -> Self {
        Self {
            variables: HashMap::new(),
            parent,
        }
    }
}

const ROOT_SCOPE: usize = 0;

/// Chain of scopes kept in an arena. Each scope links to its enclosing one by
/// index and `current` points at the innermost. Scopes are strictly nested,
/// so the arena always holds exactly the chain from the root to `current`.
pub struct Environment {
    scopes: Vec<Scope>,
    current: usize,

    print_writer: Rc<RefCell<dyn std::io::Write>>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("scopes", &self.scopes)
            .field("current", &self.current)
            // .field("print_writer", &self.print_writer)
            .finish()
    }
}

impl Environment {
    pub fn new(print_writer: Rc<RefCell<dyn std::io::Write>>) -> Self {
        Self {
            scopes: vec![Scope::new(None)],
            current: ROOT_SCOPE,
            print_writer,
        }
    }

    pub fn with_stdout() -> Self {
        Self::new(Rc::new(RefCell::new(std::io::stdout())))
    }

    pub(super) fn get_print_writer(&'_ self) -> RefMut<'_, dyn std::io::Write> {
        self.print_writer.borrow_mut()
    }

    /// Enters a child of the current scope and returns the index to hand back
    /// to `restore_scope` on exit.
    pub fn push_scope(&mut self) -> usize {
        let previous = self.current;
        self.scopes.push(Scope::new(Some(previous)));
        self.current = self.scopes.len() - 1;
        trace!("push scope {} (parent {})", self.current, previous);
        previous
    }

    pub fn restore_scope(&mut self, previous: usize) {
        trace!("restore scope {} from {}", previous, self.current);
        self.scopes.truncate(previous + 1);
        self.current = previous;
    }

    /// Number of scopes between the innermost one and the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut index = Some(self.current);
        while let Some(i) = index {
            depth += 1;
            index = self.scopes[i].parent;
        }
        depth
    }

    /// Binds `name` in the innermost scope, replacing any local binding.
    pub fn define(&mut self, name: &str, value: Value) {
        self.scopes[self.current]
            .variables
            .insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, Error> {
        self.resolve(&name.lexeme)
            .and_then(|i| self.scopes[i].variables.get(&name.lexeme))
            .cloned()
            .ok_or_else(|| undefined_variable(name))
    }

    /// Overwrites the nearest existing binding. Never creates one.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), Error> {
        let Some(index) = self.resolve(&name.lexeme) else {
            return Err(undefined_variable(name));
        };
        self.scopes[index]
            .variables
            .insert(name.lexeme.clone(), value);
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        let mut index = Some(self.current);
        while let Some(i) = index {
            let scope = &self.scopes[i];
            if scope.variables.contains_key(name) {
                return Some(i);
            }
            index = scope.parent;
        }
        None
    }
}

fn undefined_variable(name: &Token) -> Error {
    Error::UndefinedVariable {
        name: name.lexeme.clone(),
        line: name.line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn name(lexeme: &str) -> Token {
        Token::new(TokenKind::Identifier, lexeme, None, 1)
    }

    fn environment() -> Environment {
        Environment::new(Rc::new(RefCell::new(Vec::<u8>::new())))
    }

    #[test]
    fn define_then_get() {
        let mut env = environment();
        env.define("a", Value::Number(1.0));
        assert_eq!(env.get(&name("a")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn redefine_rebinds_locally() {
        let mut env = environment();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::Str("x".to_string()));
        assert_eq!(env.get(&name("a")).unwrap(), Value::Str("x".to_string()));
    }

    #[test]
    fn get_walks_outward_and_shadowing_ends_with_scope() {
        let mut env = environment();
        env.define("a", Value::Number(1.0));
        env.define("b", Value::Bool(true));

        let previous = env.push_scope();
        env.define("a", Value::Number(2.0));
        assert_eq!(env.get(&name("a")).unwrap(), Value::Number(2.0));
        assert_eq!(env.get(&name("b")).unwrap(), Value::Bool(true));
        env.restore_scope(previous);

        assert_eq!(env.get(&name("a")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let mut env = environment();
        env.define("a", Value::Number(1.0));

        let previous = env.push_scope();
        env.assign(&name("a"), Value::Number(2.0)).unwrap();
        env.restore_scope(previous);

        assert_eq!(env.get(&name("a")).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn assign_to_undefined_fails_without_binding() {
        let mut env = environment();
        let err = env.assign(&name("b"), Value::Nil).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { ref name, line: 1 } if name == "b"));
        assert!(env.get(&name("b")).is_err());
    }

    #[test]
    fn nested_scopes_restore_in_order() {
        let mut env = environment();
        assert_eq!(env.depth(), 1);
        let outer = env.push_scope();
        let inner = env.push_scope();
        env.define("deep", Value::Nil);
        assert_eq!(env.depth(), 3);
        env.restore_scope(inner);
        assert_eq!(env.depth(), 2);
        assert!(env.get(&name("deep")).is_err());
        env.restore_scope(outer);
        assert_eq!(env.depth(), 1);
    }
}
