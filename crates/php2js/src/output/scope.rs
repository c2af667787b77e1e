//! Lexical scope and conditional nesting.
//!
//! Together they decide export eligibility: a declaration is exported only
//! when it sits at module scope outside every conditional branch.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    None,
    Namespace,
    Function,
    ClassMethod,
}

/// Saved state restored when a function or method body ends.
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct Saved {
    scope: Scope,
    conditional_depth: usize,
}

#[derive(Debug, Default)]
pub struct ScopeState {
    scope: Scope,
    conditional_depth: usize,
}

impl ScopeState {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn conditional_depth(&self) -> usize {
        self.conditional_depth
    }

    pub fn can_export(&self) -> bool {
        self.scope == Scope::None && self.conditional_depth == 0
    }

    /// Enter a function-like body: new scope, conditional depth reset.
    pub fn enter_body(&mut self, scope: Scope) -> Saved {
        let saved = Saved {
            scope: self.scope,
            conditional_depth: self.conditional_depth,
        };
        self.scope = scope;
        self.conditional_depth = 0;
        saved
    }

    /// Enter a namespace body; conditional depth is kept.
    pub fn enter_namespace(&mut self) -> Saved {
        let saved = Saved {
            scope: self.scope,
            conditional_depth: self.conditional_depth,
        };
        self.scope = Scope::Namespace;
        saved
    }

    pub fn restore(&mut self, saved: Saved) {
        self.scope = saved.scope;
        self.conditional_depth = saved.conditional_depth;
    }

    pub fn enter_conditional(&mut self) {
        self.conditional_depth += 1;
    }

    pub fn exit_conditional(&mut self) {
        self.conditional_depth = self.conditional_depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_eligibility() {
        let mut state = ScopeState::default();
        assert!(state.can_export());

        state.enter_conditional();
        assert!(!state.can_export());

        let saved = state.enter_body(Scope::Function);
        assert_eq!(state.conditional_depth(), 0);
        assert!(!state.can_export());
        state.restore(saved);

        assert_eq!(state.conditional_depth(), 1);
        state.exit_conditional();
        assert!(state.can_export());
    }

    #[test]
    fn test_conditional_depth_never_negative() {
        let mut state = ScopeState::default();
        state.exit_conditional();
        assert_eq!(state.conditional_depth(), 0);
    }
}
