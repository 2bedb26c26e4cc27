//! Name resolution: binds every identifier and tag occurrence to a
//! declaration, enforcing scope discipline.
//!
//! Identifiers keep their source names; the scope-stamped symbol table is
//! what disambiguates nested declarations. Leaving a scope purges both the
//! symbol table and the type table. Struct and union layouts are built
//! here, at the scope level where the tag is declared.

use indexmap::IndexSet;

use super::SemanticError;
use super::symbol_table::SymbolTable;
use super::type_table::TypeTable;
use super::types::{compute_layout, is_complete};
use crate::parser::ast::{
    BlockItem, Declaration, Designator, EmptyDecl, Expr, ExprKind, ExternalDecl, ForInit,
    Initializer, InitializerKind, Literal, StaticAssert, Stmt, StorageClass, Type, VarDecl,
};

/// Resolve one external declaration against the current tables.
pub fn resolve(
    decl: &ExternalDecl,
    symbols: &mut SymbolTable,
    types: &mut TypeTable,
) -> Result<(), SemanticError> {
    let mut resolver = Resolver {
        symbols,
        types,
        scope_level: 0,
        defining_tag: None,
    };
    resolver.resolve_external(decl)
}

/// Walker with the scope-level counter.
pub struct Resolver<'a> {
    symbols: &'a mut SymbolTable,
    types: &'a mut TypeTable,
    scope_level: u32,
    /// Tag of the struct whose members are currently being resolved;
    /// pointers back to it are legal before the layout is complete.
    defining_tag: Option<String>,
}

impl Resolver<'_> {
    fn resolve_external(&mut self, decl: &ExternalDecl) -> Result<(), SemanticError> {
        match decl {
            ExternalDecl::Function(fd) => self.resolve_function_declaration(fd),
            ExternalDecl::Declaration(Declaration::Var(var)) => {
                for declarator in &var.declarators {
                    self.resolve_type(&declarator.ty)?;
                    if let Some(init) = &declarator.init {
                        self.resolve_initializer(init)?;
                    }
                }
                Ok(())
            }
            ExternalDecl::Declaration(Declaration::Empty(empty)) => self.resolve_struct_decl(empty),
            ExternalDecl::Declaration(Declaration::StaticAssert(assert)) => {
                self.resolve_static_assert(assert)
            }
        }
    }

    fn scope_increment(&mut self) {
        self.scope_level += 1;
    }

    /// Leave a scope, purging everything declared inside it.
    fn scope_decrement(&mut self) {
        self.scope_level -= 1;
        self.symbols.purge(self.scope_level);
        self.types.purge(self.scope_level);
    }

    fn resolve_type(&mut self, ty: &Type) -> Result<(), SemanticError> {
        match ty {
            Type::Struct { tag, .. } | Type::Union { tag, .. } => {
                if self.defining_tag.as_deref() == Some(tag.as_str()) {
                    return Ok(());
                }
                if !self.types.exists(tag) {
                    return Err(SemanticError::UndeclaredStructure(tag.clone()));
                }
                Ok(())
            }
            Type::Pointer { target, .. } => self.resolve_type(target),
            Type::Array { element, size, .. } => {
                self.resolve_type(element)?;
                if let Some(size) = size {
                    self.resolve_expr(size)?;
                }
                Ok(())
            }
            Type::Function { return_type, params, .. } => {
                self.resolve_type(return_type)?;
                for param in params {
                    self.resolve_type(&param.ty)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<(), SemanticError> {
        match &expr.kind {
            ExprKind::Literal(_) => Ok(()),
            ExprKind::Var(name) => {
                if self.symbols.get_opt(name).is_none() {
                    return Err(SemanticError::UndeclaredVariable(name.clone()));
                }
                Ok(())
            }
            ExprKind::Unary { expr, .. } => self.resolve_expr(expr),
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }
            ExprKind::Assign { target, value, .. } => {
                self.resolve_expr(target)?;
                self.resolve_expr(value)
            }
            ExprKind::Conditional { condition, then_expr, else_expr } => {
                self.resolve_expr(condition)?;
                self.resolve_expr(then_expr)?;
                self.resolve_expr(else_expr)
            }
            ExprKind::Cast { target, expr } => {
                self.resolve_type(target)?;
                self.resolve_expr(expr)
            }
            ExprKind::Call { func, args } => {
                let ExprKind::Var(name) = &func.kind else {
                    return Err(SemanticError::CallNotVariable);
                };
                if self.symbols.get_opt(name).is_none() {
                    return Err(SemanticError::UndeclaredFunction(name.clone()));
                }
                for arg in args {
                    self.resolve_expr(arg)?;
                }
                Ok(())
            }
            ExprKind::CompoundLiteral { ty, init } => {
                self.resolve_type(ty)?;
                for item in init {
                    self.resolve_init_item_designators(&item.designators)?;
                    self.resolve_initializer(&item.init)?;
                }
                Ok(())
            }
            ExprKind::Subscript { left, right } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }
            ExprKind::FieldAccess { expr, .. } => self.resolve_expr(expr),
            ExprKind::PtrAccess { expr, .. } => self.resolve_expr(expr),
            ExprKind::PostIncrement(expr) | ExprKind::PostDecrement(expr) => {
                self.resolve_expr(expr)
            }
            ExprKind::SizeOfExpr(expr) => self.resolve_expr(expr),
            ExprKind::SizeOfType(ty) | ExprKind::AlignOf(ty) => self.resolve_type(ty),
            ExprKind::Generic { control, associations } => {
                self.resolve_expr(control)?;
                for assoc in associations {
                    match assoc {
                        crate::parser::ast::GenericAssoc::Type { ty, expr } => {
                            self.resolve_type(ty)?;
                            self.resolve_expr(expr)?;
                        }
                        crate::parser::ast::GenericAssoc::Default(expr) => {
                            self.resolve_expr(expr)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }

    fn resolve_init_item_designators(
        &mut self,
        designators: &[Designator],
    ) -> Result<(), SemanticError> {
        for designator in designators {
            if let Designator::Index(expr) = designator {
                self.resolve_expr(expr)?;
            }
        }
        Ok(())
    }

    fn resolve_initializer(&mut self, init: &Initializer) -> Result<(), SemanticError> {
        match &init.kind {
            InitializerKind::Single(expr) => self.resolve_expr(expr),
            InitializerKind::Compound(items) => {
                for item in items {
                    self.resolve_initializer(&item.init)?;
                    self.resolve_init_item_designators(&item.designators)?;
                }
                Ok(())
            }
        }
    }

    fn resolve_statement(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Expr(expr) => self.resolve_expr(expr),
            Stmt::Empty => Ok(()),
            Stmt::Compound(items) => self.resolve_block(items),
            Stmt::If { condition, then_stmt, else_stmt } => {
                self.resolve_expr(condition)?;
                self.resolve_statement(then_stmt)?;
                if let Some(else_stmt) = else_stmt {
                    self.resolve_statement(else_stmt)?;
                }
                Ok(())
            }
            Stmt::Switch { condition, body, .. } => {
                self.resolve_expr(condition)?;
                self.resolve_statement(body)
            }
            Stmt::While { condition, body, .. } => {
                self.resolve_expr(condition)?;
                self.resolve_statement(body)
            }
            Stmt::DoWhile { body, condition, .. } => {
                self.resolve_statement(body)?;
                self.resolve_expr(condition)
            }
            Stmt::For { init, condition, update, body, .. } => {
                self.scope_increment();
                match init {
                    ForInit::Decl(Declaration::Var(var)) => {
                        self.resolve_local_var_declaration(var)?;
                    }
                    ForInit::Decl(_) => {}
                    ForInit::Expr(Some(expr)) => self.resolve_expr(expr)?,
                    ForInit::Expr(None) => {}
                }
                if let Some(condition) = condition {
                    self.resolve_expr(condition)?;
                }
                if let Some(update) = update {
                    self.resolve_expr(update)?;
                }
                self.resolve_statement(body)?;
                self.scope_decrement();
                Ok(())
            }
            Stmt::Goto(_) => Ok(()),
            Stmt::Continue { .. } | Stmt::Break { .. } => Ok(()),
            Stmt::Return(expr) => {
                if let Some(expr) = expr {
                    self.resolve_expr(expr)?;
                }
                Ok(())
            }
            Stmt::Labeled { stmt, .. } => self.resolve_statement(stmt),
            Stmt::Case { expr, stmt, .. } => {
                self.resolve_expr(expr)?;
                self.resolve_statement(stmt)
            }
            Stmt::Default { stmt, .. } => self.resolve_statement(stmt),
        }
    }

    fn resolve_block(&mut self, items: &[BlockItem]) -> Result<(), SemanticError> {
        self.scope_increment();
        for item in items {
            match item {
                BlockItem::Stmt(stmt) => self.resolve_statement(stmt)?,
                BlockItem::Decl(Declaration::Var(var)) => {
                    self.resolve_local_var_declaration(var)?;
                }
                BlockItem::Decl(Declaration::Empty(empty)) => {
                    self.resolve_struct_decl(empty)?;
                }
                BlockItem::Decl(Declaration::StaticAssert(assert)) => {
                    self.resolve_static_assert(assert)?;
                }
            }
        }
        self.scope_decrement();
        Ok(())
    }

    /// Declare block-scope variables.
    ///
    /// Shadowing is not allowed: any live no-linkage binding for the name
    /// is a duplicate, whatever scope introduced it.
    fn resolve_local_var_declaration(&mut self, decl: &VarDecl) -> Result<(), SemanticError> {
        for declarator in &decl.declarators {
            if let Some(entry) = self.symbols.get_opt(&declarator.name)
                && !entry.has_linkage()
            {
                return Err(SemanticError::DuplicateVariable(declarator.name.clone()));
            }
            let has_linkage = decl.storage == StorageClass::Extern;
            self.symbols.add_automatic_var_with_linkage(
                &declarator.name,
                has_linkage,
                self.scope_level,
            );

            self.resolve_type(&declarator.ty)?;
            if let Some(init) = &declarator.init {
                self.resolve_initializer(init)?;
            }
        }
        Ok(())
    }

    fn resolve_function_declaration(
        &mut self,
        fd: &crate::parser::ast::FunctionDecl,
    ) -> Result<(), SemanticError> {
        if let Some(entry) = self.symbols.get_opt(&fd.name)
            && !entry.has_linkage()
        {
            return Err(SemanticError::DuplicateDeclaration(fd.name.clone()));
        }
        self.resolve_type(&fd.ty)?;
        // Make the name resolvable (recursion needs it before the body);
        // the type checker owns the defined/global bookkeeping, so an
        // entry it already merged is left untouched.
        if self.symbols.get_opt(&fd.name).is_none() {
            self.symbols.add_function(&fd.name, fd.ty.clone(), true, false);
        }

        if let Some(body) = &fd.body {
            let Type::Function { params, .. } = &fd.ty else {
                return Err(SemanticError::NonFunctionType);
            };
            self.scope_increment();
            for param in params {
                self.resolve_type(&param.ty)?;
                if let Some(name) = &param.name {
                    // Parameters obey the same no-shadowing rule as locals.
                    if let Some(entry) = self.symbols.get_opt(name)
                        && !entry.has_linkage()
                    {
                        return Err(SemanticError::DuplicateVariable(name.clone()));
                    }
                    self.symbols
                        .add_automatic_var(name, param.ty.clone(), self.scope_level);
                }
            }
            self.resolve_block(body)?;
            self.scope_decrement();
        }
        Ok(())
    }

    /// Build the layout of a struct or union definition.
    fn resolve_struct_decl(&mut self, decl: &EmptyDecl) -> Result<(), SemanticError> {
        let (tag, members, is_union) = match &decl.ty {
            Type::Struct { tag, fields: Some(fields) } => (tag, fields, false),
            Type::Union { tag, fields: Some(fields) } => (tag, fields, true),
            // Forward declarations and enum tags introduce nothing here.
            _ => return Ok(()),
        };

        if self.types.exists(tag) {
            return Err(SemanticError::RedeclaredStructure(tag.clone()));
        }

        let mut seen = IndexSet::new();
        self.defining_tag = Some(tag.clone());
        let checked = members.iter().try_for_each(|member| {
            if matches!(member.ty, Type::Function { .. }) {
                return Err(SemanticError::MemberFunctionType);
            }
            self.resolve_type(&member.ty)?;
            if !is_complete(&member.ty, self.types) {
                return Err(SemanticError::MemberIncomplete);
            }
            if !seen.insert(member.name.clone()) {
                return Err(SemanticError::DuplicateMember {
                    tag: tag.clone(),
                    member: member.name.clone(),
                });
            }
            Ok(())
        });
        self.defining_tag = None;
        checked?;

        let (alignment, size, fields) = compute_layout(members, is_union, self.types)?;
        self.types
            .add_struct(tag, alignment, size, fields, self.scope_level);
        Ok(())
    }

    fn resolve_static_assert(&mut self, assert: &StaticAssert) -> Result<(), SemanticError> {
        self.resolve_expr(&assert.condition)?;
        if let ExprKind::Literal(lit) = &assert.condition.kind {
            let failed = matches!(
                lit,
                Literal::Int(0) | Literal::Long(0) | Literal::UInt(0) | Literal::ULong(0)
                    | Literal::Char(0)
            );
            if failed {
                return Err(SemanticError::StaticAssertFailed);
            }
        }
        Ok(())
    }
}
