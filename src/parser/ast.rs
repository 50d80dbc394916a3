#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleData {
    /// Dependency specifiers, in declaration order.
    pub dependencies: Vec<String>,
    pub items: Vec<ModuleItemType>,
    pub meta: Meta,
}

impl ModuleData {
    /// Import bindings declared for the dependency at `index`.
    pub fn bindings_for(&self, index: usize) -> Vec<String> {
        let specifier = &self.dependencies[index];
        self.items
            .iter()
            .filter_map(|item| match item {
                ModuleItemType::Import {
                    specifier: s,
                    binding,
                } if s == specifier => Some(binding.clone()),
                _ => None,
            })
            .collect()
    }

    /// Is `binding` re-exported with `export * from`?
    pub fn is_reexported(&self, binding: &str) -> bool {
        self.items.iter().any(|item| match item {
            ModuleItemType::ReExport { binding: b } => b == binding,
            _ => false,
        })
    }

    /// Exports evaluated while the module registers.
    pub fn hoisted_exports(&self) -> Vec<(&str, &ExpressionType)> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ModuleItemType::Export { name, value } => Some((name.as_str(), value)),
                _ => None,
            })
            .collect()
    }

    /// Statements of every execute block, in source order.
    pub fn execute_statements(&self) -> Vec<StatementType> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ModuleItemType::Execute(statements) => Some(statements.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn has_execute(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, ModuleItemType::Execute(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleItemType {
    /// `import "./dep.js" as dep;`
    Import { specifier: String, binding: String },
    /// `export * from dep;`
    ReExport { binding: String },
    /// `export name = value;`
    Export { name: String, value: ExpressionType },
    /// `execute { ... }`
    Execute(Vec<StatementType>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementType {
    Export {
        name: String,
        value: ExpressionType,
    },
    Log(ExpressionType),
    DynamicImport {
        specifier: String,
        binding: Option<String>,
    },
    Throw(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    Literal(LiteralType),
    Identifier(String),
    MemberExpression { object: String, property: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}
