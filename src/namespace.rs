//! Declaring vars and resolving them by name
//!
//! A namespace owns a symbol table and the cells declared in it. The
//! storage strategy of each var is fixed by how it is declared:
//! `defdynamic` gives a thread-bindable `DynamicCell`, `def` a shared
//! `RootCell`.

use crate::binding::{CellKind, DynamicCell, RootCell, SymbolCell, Var};
use crate::error::{BindingError, BindingResult};
use crate::rebind::RebindSet;
use crate::symbol::{SymbolId, SymbolTable};
use crate::value::Value;
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Clone)]
enum Declared {
    Dynamic(Arc<DynamicCell>),
    Root(Arc<RootCell>),
}

impl Declared {
    fn cell(&self) -> &dyn SymbolCell {
        match self {
            Declared::Dynamic(cell) => &**cell,
            Declared::Root(cell) => &**cell,
        }
    }

    fn var(&self) -> Var {
        match self {
            Declared::Dynamic(cell) => Arc::clone(cell) as Var,
            Declared::Root(cell) => Arc::clone(cell) as Var,
        }
    }

    fn kind(&self) -> CellKind {
        match self {
            Declared::Dynamic(_) => CellKind::Dynamic,
            Declared::Root(_) => CellKind::Root,
        }
    }
}

pub struct Namespace {
    symbols: SymbolTable,
    vars: FxHashMap<SymbolId, Declared>,
    /// Declaration order, for deterministic listing
    order: Vec<SymbolId>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Namespace {
            symbols: SymbolTable::with_namespace(name),
            vars: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.symbols.namespace().unwrap_or_default()
    }

    /// Declare a thread-bindable var
    ///
    /// Redeclaring an existing dynamic var sets its root and returns the
    /// same cell, so handles taken earlier stay valid.
    pub fn defdynamic(
        &mut self,
        name: &str,
        init: impl Into<Value>,
    ) -> BindingResult<Arc<DynamicCell>> {
        let init = init.into();
        let symbol = self.symbols.symbol(name);
        match self.vars.get(&symbol.id()) {
            Some(Declared::Dynamic(cell)) => {
                cell.set_root(init);
                Ok(Arc::clone(cell))
            }
            Some(other) => Err(BindingError::strategy_conflict(
                &symbol,
                other.kind(),
                CellKind::Dynamic,
            )),
            None => {
                let cell = Arc::new(DynamicCell::new(symbol.clone(), init));
                self.insert(symbol.id(), Declared::Dynamic(Arc::clone(&cell)));
                tracing::debug!(target: "rebind::namespace", symbol = %symbol, "defdynamic");
                Ok(cell)
            }
        }
    }

    /// Declare a shared-root var
    ///
    /// Redeclaring an existing root var replaces its root and returns the
    /// same cell.
    pub fn def(&mut self, name: &str, init: impl Into<Value>) -> BindingResult<Arc<RootCell>> {
        let init = init.into();
        let symbol = self.symbols.symbol(name);
        match self.vars.get(&symbol.id()) {
            Some(Declared::Root(cell)) => {
                cell.write(init);
                Ok(Arc::clone(cell))
            }
            Some(other) => Err(BindingError::strategy_conflict(
                &symbol,
                other.kind(),
                CellKind::Root,
            )),
            None => {
                let cell = Arc::new(RootCell::new(symbol.clone(), init));
                self.insert(symbol.id(), Declared::Root(Arc::clone(&cell)));
                tracing::debug!(target: "rebind::namespace", symbol = %symbol, "def");
                Ok(cell)
            }
        }
    }

    fn insert(&mut self, id: SymbolId, declared: Declared) {
        self.vars.insert(id, declared);
        self.order.push(id);
    }

    fn lookup(&self, name: &str) -> Option<&Declared> {
        self.symbols.get(name).and_then(|id| self.vars.get(&id))
    }

    pub fn resolve(&self, name: &str) -> Option<Var> {
        self.lookup(name).map(Declared::var)
    }

    pub fn resolve_dynamic(&self, name: &str) -> Option<Arc<DynamicCell>> {
        match self.lookup(name)? {
            Declared::Dynamic(cell) => Some(Arc::clone(cell)),
            Declared::Root(_) => None,
        }
    }

    pub fn resolve_root(&self, name: &str) -> Option<Arc<RootCell>> {
        match self.lookup(name)? {
            Declared::Root(cell) => Some(Arc::clone(cell)),
            Declared::Dynamic(_) => None,
        }
    }

    /// Current value of `name` as seen by the calling thread
    pub fn read(&self, name: &str) -> BindingResult<Value> {
        self.lookup(name)
            .map(|declared| declared.cell().read())
            .ok_or_else(|| BindingError::undefined_variable(self.qualify(name)))
    }

    /// Write `value` to `name` through its cell's `write`
    pub fn write(&self, name: &str, value: impl Into<Value>) -> BindingResult<()> {
        let declared = self
            .lookup(name)
            .ok_or_else(|| BindingError::undefined_variable(self.qualify(name)))?;
        declared.cell().write(value.into());
        Ok(())
    }

    /// Build a rebind set from names, accepting vars of either strategy
    pub fn rebind_set<'a, 'n, V>(
        &'a self,
        pairs: impl IntoIterator<Item = (&'n str, V)>,
    ) -> BindingResult<RebindSet<'a>>
    where
        V: Into<Value>,
    {
        let mut set = RebindSet::new();
        for (name, value) in pairs {
            let declared = self
                .lookup(name)
                .ok_or_else(|| BindingError::undefined_variable(self.qualify(name)))?;
            set.push(declared.cell(), value);
        }
        Ok(set)
    }

    /// Build a rebind set that only accepts dynamic vars
    ///
    /// Rebinding a root var this way fails with `NotDynamic`, since its
    /// override would leak to every thread.
    pub fn binding_set<'a, 'n, V>(
        &'a self,
        pairs: impl IntoIterator<Item = (&'n str, V)>,
    ) -> BindingResult<RebindSet<'a>>
    where
        V: Into<Value>,
    {
        let mut set = RebindSet::new();
        for (name, value) in pairs {
            match self.lookup(name) {
                Some(Declared::Dynamic(cell)) => set.push(&**cell, value),
                Some(Declared::Root(cell)) => {
                    return Err(BindingError::not_dynamic(cell.symbol()));
                }
                None => return Err(BindingError::undefined_variable(self.qualify(name))),
            }
        }
        Ok(set)
    }

    /// All vars in declaration order
    pub fn vars(&self) -> Vec<Var> {
        self.order
            .iter()
            .filter_map(|id| self.vars.get(id))
            .map(Declared::var)
            .collect()
    }

    /// All dynamic vars in declaration order, e.g. for `BindingSnapshot::capture`
    pub fn dynamic_vars(&self) -> Vec<Arc<DynamicCell>> {
        self.order
            .iter()
            .filter_map(|id| match self.vars.get(id) {
                Some(Declared::Dynamic(cell)) => Some(Arc::clone(cell)),
                _ => None,
            })
            .collect()
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}/{}", self.name(), name)
    }
}
