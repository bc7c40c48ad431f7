//! Syntax tree of woven declarations.
//!
//! The same tree is used for the input (source members plus layer overrides)
//! and for the linked output, which is why blocks carry the `flattenable`
//! tag and aspect-reference nodes carry binder annotations.

use weave_core::symbols::{AccessorKind, TypeRef};
use weave_core::{ReferenceAnnotation, ReferenceOrder, Span, TransformationLayer};

/// A complete compilation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Declared layer order, first applied first.
    pub layers: Vec<LayerDecl>,
    pub classes: Vec<ClassDecl>,
}

/// A layer name as written in `layers { ... }` or `[override ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDecl {
    pub aspect: String,
    pub part: Option<String>,
    pub span: Span,
}

impl LayerDecl {
    #[must_use]
    pub fn to_layer(&self) -> TransformationLayer {
        TransformationLayer::new(self.aspect.clone(), self.part.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
    Event(EventDecl),
}

impl Member {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(f) => &f.name,
            Self::Method(m) => &m.name,
            Self::Property(p) => &p.name,
            Self::Event(e) => &e.name,
        }
    }

    /// The layer contributing this member, `None` for source declarations.
    #[must_use]
    pub fn layer(&self) -> Option<&LayerDecl> {
        match self {
            Self::Field(_) => None,
            Self::Method(m) => m.layer.as_ref(),
            Self::Property(p) => p.layer.as_ref(),
            Self::Event(e) => e.layer.as_ref(),
        }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Field(f) => f.span,
            Self::Method(m) => m.span,
            Self::Property(p) => p.span,
            Self::Event(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub layer: Option<LayerDecl>,
    pub name: String,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub body: Block,
    pub span: Span,
}

/// A property, or an indexer when `is_indexer` is set (named `Item`).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub layer: Option<LayerDecl>,
    pub name: String,
    pub ty: TypeRef,
    pub parameters: Vec<Parameter>,
    pub is_indexer: bool,
    pub accessors: Vec<AccessorDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDecl {
    pub layer: Option<LayerDecl>,
    pub name: String,
    pub ty: TypeRef,
    pub accessors: Vec<AccessorDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessorDecl {
    pub kind: AccessorKind,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub span: Span,
}

/// A block of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    /// Set on blocks produced by inlining; a cleanup pass may merge them
    /// into the enclosing block.
    pub flattenable: bool,
    pub span: Span,
}

impl Block {
    #[must_use]
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        Self {
            statements,
            flattenable: false,
            span,
        }
    }

    /// Creates a block tagged as safe to flatten into its parent.
    #[must_use]
    pub fn flattenable(statements: Vec<Statement>, span: Span) -> Self {
        Self {
            statements,
            flattenable: true,
            span,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub initializer: Option<Expression>,
    pub span: Span,
}

/// Statements.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `{ ... }`
    Block(Block),

    /// `T a = x, b;`
    LocalDeclaration {
        ty: TypeRef,
        declarators: Vec<Declarator>,
        span: Span,
    },

    /// `expr;`
    Expression { expression: Expression, span: Span },

    /// `return [expr];`
    Return {
        value: Option<Expression>,
        span: Span,
    },

    /// `if (cond) stmt [else stmt]`
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
        span: Span,
    },

    /// `while (cond) stmt`
    While {
        condition: Expression,
        body: Box<Statement>,
        span: Span,
    },

    /// `goto label;`
    Goto { label: String, span: Span },

    /// `label: stmt`
    Labeled {
        label: String,
        statement: Box<Statement>,
        span: Span,
    },

    /// `;`
    Empty { span: Span },
}

impl Statement {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Block(block) => block.span,
            Self::LocalDeclaration { span, .. }
            | Self::Expression { span, .. }
            | Self::Return { span, .. }
            | Self::If { span, .. }
            | Self::While { span, .. }
            | Self::Goto { span, .. }
            | Self::Labeled { span, .. }
            | Self::Empty { span } => *span,
        }
    }

    /// Creates an expression statement.
    #[must_use]
    pub fn expression(expression: Expression) -> Self {
        let span = expression.span();
        Self::Expression { expression, span }
    }

    /// Creates `label: ;`
    #[must_use]
    pub fn label(label: impl Into<String>, span: Span) -> Self {
        Self::Labeled {
            label: label.into(),
            statement: Box::new(Self::Empty { span }),
            span,
        }
    }

    /// Returns true for `return` and `goto`, which never fall through.
    #[must_use]
    pub const fn is_jump(&self) -> bool {
        matches!(self, Self::Return { .. } | Self::Goto { .. })
    }

    /// Returns true if executing the statement has no effect.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match self {
            Self::Empty { .. } => true,
            Self::Labeled { statement, .. } => statement.is_noop(),
            Self::Block(block) => block.statements.iter().all(Self::is_noop),
            _ => false,
        }
    }

    /// Calls `f` for every expression directly owned by this statement
    /// (nested statements are not visited).
    pub fn for_each_own_expression<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        match self {
            Self::LocalDeclaration { declarators, .. } => declarators
                .iter()
                .filter_map(|d| d.initializer.as_ref())
                .for_each(f),
            Self::Expression { expression, .. } => f(expression),
            Self::Return { value: Some(v), .. } => f(v),
            Self::If { condition, .. } | Self::While { condition, .. } => f(condition),
            Self::Return { value: None, .. }
            | Self::Block(_)
            | Self::Goto { .. }
            | Self::Labeled { .. }
            | Self::Empty { .. } => {}
        }
    }

    /// Mutable counterpart of [`Statement::for_each_own_expression`].
    pub fn for_each_own_expression_mut(&mut self, f: &mut impl FnMut(&mut Expression)) {
        match self {
            Self::LocalDeclaration { declarators, .. } => declarators
                .iter_mut()
                .filter_map(|d| d.initializer.as_mut())
                .for_each(f),
            Self::Expression { expression, .. } => f(expression),
            Self::Return { value: Some(v), .. } => f(v),
            Self::If { condition, .. } | Self::While { condition, .. } => f(condition),
            Self::Return { value: None, .. }
            | Self::Block(_)
            | Self::Goto { .. }
            | Self::Labeled { .. }
            | Self::Empty { .. } => {}
        }
    }

    /// Mutable counterpart of [`Statement::for_each_child`].
    pub fn for_each_child_mut(&mut self, f: &mut impl FnMut(&mut Statement)) {
        match self {
            Self::Block(block) => block.statements.iter_mut().for_each(f),
            Self::If {
                then_branch,
                else_branch,
                ..
            } => {
                f(then_branch.as_mut());
                if let Some(else_branch) = else_branch {
                    f(else_branch.as_mut());
                }
            }
            Self::While { body, .. } => f(body.as_mut()),
            Self::Labeled { statement, .. } => f(statement.as_mut()),
            Self::LocalDeclaration { .. }
            | Self::Expression { .. }
            | Self::Return { .. }
            | Self::Goto { .. }
            | Self::Empty { .. } => {}
        }
    }

    /// Calls `f` for every statement nested directly inside this one.
    pub fn for_each_child<'a>(&'a self, f: &mut impl FnMut(&'a Statement)) {
        match self {
            Self::Block(block) => block.statements.iter().for_each(f),
            Self::If {
                then_branch,
                else_branch,
                ..
            } => {
                f(then_branch.as_ref());
                if let Some(else_branch) = else_branch {
                    f(else_branch.as_ref());
                }
            }
            Self::While { body, .. } => f(body.as_ref()),
            Self::Labeled { statement, .. } => f(statement.as_ref()),
            Self::LocalDeclaration { .. }
            | Self::Expression { .. }
            | Self::Return { .. }
            | Self::Goto { .. }
            | Self::Empty { .. } => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOperator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 2,
            Self::And => 3,
            Self::Equal | Self::NotEqual => 4,
            Self::Less | Self::LessEqual | Self::Greater | Self::GreaterEqual => 5,
            Self::Add | Self::Subtract => 6,
            Self::Multiply | Self::Divide | Self::Modulo => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubtractAssign,
}

impl AssignmentOperator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
        }
    }
}

/// Expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer {
        value: i64,
        span: Span,
    },
    String {
        value: String,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Null {
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    /// `_` on the left of an assignment.
    Discard {
        span: Span,
    },
    This {
        span: Span,
    },
    /// A `base`/`previous`/`current`/`final` receiver.
    Reference {
        order: ReferenceOrder,
        span: Span,
    },
    /// `receiver.name`; annotated when the receiver is an aspect reference.
    MemberAccess {
        receiver: Box<Expression>,
        name: String,
        annotation: Option<ReferenceAnnotation>,
        span: Span,
    },
    /// `receiver[args]`; annotated when the receiver is an aspect reference.
    ElementAccess {
        receiver: Box<Expression>,
        arguments: Vec<Expression>,
        annotation: Option<ReferenceAnnotation>,
        span: Span,
    },
    Invocation {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        span: Span,
    },
    Assignment {
        operator: AssignmentOperator,
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },
    Binary {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
        span: Span,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        span: Span,
    },
    /// `(T)operand`
    Cast {
        ty: TypeRef,
        operand: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Integer { span, .. }
            | Self::String { span, .. }
            | Self::Boolean { span, .. }
            | Self::Null { span }
            | Self::Identifier { span, .. }
            | Self::Discard { span }
            | Self::This { span }
            | Self::Reference { span, .. }
            | Self::MemberAccess { span, .. }
            | Self::ElementAccess { span, .. }
            | Self::Invocation { span, .. }
            | Self::Assignment { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::Cast { span, .. } => *span,
        }
    }

    #[must_use]
    pub fn identifier(name: impl Into<String>, span: Span) -> Self {
        Self::Identifier {
            name: name.into(),
            span,
        }
    }

    /// Creates `target = value`.
    #[must_use]
    pub fn assign(target: Expression, value: Expression) -> Self {
        let span = target.span().merge(value.span());
        Self::Assignment {
            operator: AssignmentOperator::Assign,
            target: Box::new(target),
            value: Box::new(value),
            span,
        }
    }

    /// Returns the identifier name if this is a plain identifier.
    #[must_use]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Self::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the binder annotation of an aspect-reference node.
    #[must_use]
    pub const fn annotation(&self) -> Option<&ReferenceAnnotation> {
        match self {
            Self::MemberAccess { annotation, .. } | Self::ElementAccess { annotation, .. } => {
                annotation.as_ref()
            }
            _ => None,
        }
    }

    /// Returns true if evaluating the expression can neither fault nor have
    /// observable effects.
    ///
    /// Operators and casts are never pure: division faults on a zero divisor
    /// and a cast may fail. Member and element reads may run accessor code.
    #[must_use]
    pub const fn is_trivially_pure(&self) -> bool {
        matches!(
            self,
            Self::Integer { .. }
                | Self::String { .. }
                | Self::Boolean { .. }
                | Self::Null { .. }
                | Self::Identifier { .. }
                | Self::Discard { .. }
                | Self::This { .. }
        )
    }

    /// Calls `f` for every direct sub-expression.
    pub fn for_each_child<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        match self {
            Self::MemberAccess { receiver, .. } => f(receiver.as_ref()),
            Self::ElementAccess {
                receiver,
                arguments,
                ..
            } => {
                f(receiver.as_ref());
                arguments.iter().for_each(f);
            }
            Self::Invocation {
                callee, arguments, ..
            } => {
                f(callee.as_ref());
                arguments.iter().for_each(f);
            }
            Self::Assignment { target, value, .. } => {
                f(target.as_ref());
                f(value.as_ref());
            }
            Self::Binary { left, right, .. } => {
                f(left.as_ref());
                f(right.as_ref());
            }
            Self::Unary { operand, .. } | Self::Cast { operand, .. } => f(operand.as_ref()),
            Self::Integer { .. }
            | Self::String { .. }
            | Self::Boolean { .. }
            | Self::Null { .. }
            | Self::Identifier { .. }
            | Self::Discard { .. }
            | Self::This { .. }
            | Self::Reference { .. } => {}
        }
    }

    /// Mutable counterpart of [`Expression::for_each_child`].
    pub fn for_each_child_mut(&mut self, f: &mut impl FnMut(&mut Expression)) {
        match self {
            Self::MemberAccess { receiver, .. } => f(receiver.as_mut()),
            Self::ElementAccess {
                receiver,
                arguments,
                ..
            } => {
                f(receiver.as_mut());
                arguments.iter_mut().for_each(f);
            }
            Self::Invocation {
                callee, arguments, ..
            } => {
                f(callee.as_mut());
                arguments.iter_mut().for_each(f);
            }
            Self::Assignment { target, value, .. } => {
                f(target.as_mut());
                f(value.as_mut());
            }
            Self::Binary { left, right, .. } => {
                f(left.as_mut());
                f(right.as_mut());
            }
            Self::Unary { operand, .. } | Self::Cast { operand, .. } => f(operand.as_mut()),
            Self::Integer { .. }
            | Self::String { .. }
            | Self::Boolean { .. }
            | Self::Null { .. }
            | Self::Identifier { .. }
            | Self::Discard { .. }
            | Self::This { .. }
            | Self::Reference { .. } => {}
        }
    }
}
