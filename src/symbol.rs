use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Interned symbol identifier, unique within one symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// A resolved symbol: its ID plus the names needed for diagnostics
///
/// Symbols are immutable. Two symbols are equal when they come from the
/// same namespace and carry the same ID.
#[derive(Clone)]
pub struct Symbol {
    id: SymbolId,
    name: Arc<str>,
    namespace: Option<Arc<str>>,
}

impl Symbol {
    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.namespace == other.namespace
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self, self.id.0)
    }
}

/// Symbol interning table for fast symbol comparison
///
/// Uses `Arc<str>` for symbol names so one allocation is shared between the
/// map, the names vector and every `Symbol` handed out.
#[derive(Debug, Default)]
pub struct SymbolTable {
    namespace: Option<Arc<str>>,
    map: FxHashMap<Arc<str>, SymbolId>,
    names: Vec<Arc<str>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            namespace: None,
            map: FxHashMap::default(),
            names: Vec::new(),
        }
    }

    /// Create a table whose symbols are qualified by `namespace`
    pub fn with_namespace(namespace: &str) -> Self {
        SymbolTable {
            namespace: Some(Arc::from(namespace)),
            ..SymbolTable::new()
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Intern a symbol, returning its ID
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.map.get(name) {
            return id;
        }

        let id = SymbolId(self.names.len() as u32);
        let shared_name: Arc<str> = Arc::from(name);
        self.names.push(shared_name.clone());
        self.map.insert(shared_name, id);
        id
    }

    /// Intern a symbol and return the full `Symbol`
    pub fn symbol(&mut self, name: &str) -> Symbol {
        let id = self.intern(name);
        Symbol {
            id,
            name: self.names[id.0 as usize].clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Build the `Symbol` for an already interned ID
    pub fn resolve(&self, id: SymbolId) -> Option<Symbol> {
        self.names.get(id.0 as usize).map(|name| Symbol {
            id,
            name: name.clone(),
            namespace: self.namespace.clone(),
        })
    }

    /// Get the name of a symbol by ID
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.0 as usize).map(|s| s.as_ref())
    }

    /// Check if a symbol exists
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
