//! Macro definitions and the macro table (spec §4.5).

use cppp_lex::Token;
use cppp_util::{SourceMap, Span, Symbol};
use indexmap::IndexMap;

use crate::error::MacroError;

/// One token of a macro's replacement list, with whitespace collapsed into
/// a single "was there a space before me" flag rather than kept as
/// separate `Whitespace`/`Newline` tokens. Stringize and paste both need
/// exactly this bit, nothing more.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpacedToken {
    pub token: Token,
    pub space_before: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MacroKind {
    ObjectLike,
    FunctionLike {
        params: Vec<Symbol>,
        variadic: bool,
    },
}

#[derive(Clone, Debug)]
pub struct Macro {
    pub name: Symbol,
    pub kind: MacroKind,
    pub body: Vec<SpacedToken>,
    pub def_span: Span,
}

impl Macro {
    /// Spec §4.5 "benign redefinition": identical in parameter list (for
    /// function-like macros) and token-for-token identical replacement
    /// list, including matching whitespace separation.
    fn is_identical_to(&self, other: &Macro, sources: &SourceMap) -> bool {
        match (&self.kind, &other.kind) {
            (MacroKind::ObjectLike, MacroKind::ObjectLike) => {}
            (
                MacroKind::FunctionLike {
                    params: p1,
                    variadic: v1,
                },
                MacroKind::FunctionLike {
                    params: p2,
                    variadic: v2,
                },
            ) => {
                if p1 != p2 || v1 != v2 {
                    return false;
                }
            }
            _ => return false,
        }

        if self.body.len() != other.body.len() {
            return false;
        }
        self.body
            .iter()
            .zip(other.body.iter())
            .enumerate()
            .all(|(i, (a, b))| {
                let same_spacing = i == 0 || a.space_before == b.space_before;
                same_spacing
                    && a.token.kind == b.token.kind
                    && sources.span_text(a.token.span) == sources.span_text(b.token.span)
            })
    }
}

/// The live set of macro definitions for one session.
#[derive(Default)]
pub struct MacroTable {
    macros: IndexMap<Symbol, Macro>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self {
            macros: IndexMap::new(),
        }
    }

    /// Define `new`, applying the benign-redefinition rule. Returns an
    /// error (without blocking the new definition from replacing the old
    /// one — the rest of the line already committed to this name) when an
    /// incompatible redefinition is detected.
    pub fn define(&mut self, new: Macro, sources: &SourceMap) -> Result<(), MacroError> {
        if let Some(existing) = self.macros.get(&new.name) {
            if !existing.is_identical_to(&new, sources) {
                self.macros.insert(new.name, new);
                return Err(MacroError::IncompatibleRedefinition);
            }
        }
        self.macros.insert(new.name, new);
        Ok(())
    }

    pub fn undef(&mut self, name: Symbol) {
        self.macros.shift_remove(&name);
    }

    pub fn is_defined(&self, name: Symbol) -> bool {
        self.macros.contains_key(&name)
    }

    pub fn get(&self, name: Symbol) -> Option<&Macro> {
        self.macros.get(&name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}
