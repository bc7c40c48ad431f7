//! Common test utilities: linking helpers and a small evaluator for linked
//! programs.
//!
//! The evaluator runs one instance of a linked class. Locals are scoped to
//! the whole member body, `goto` searches the enclosing blocks for its label
//! and `log(...)` appends its rendered arguments to a trace.

#![allow(dead_code)]

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashMap;
use weave_core::symbols::{AccessorKind, TypeRef};
use weave_linker::link_source;
use weave_parser::{
    AccessorDecl, AssignmentOperator, BinaryOperator, Block, ClassDecl, Expression, Member,
    MethodDecl, Program, Statement, UnaryOperator,
};
use weave_utils::LinkerOptions;

const STEP_LIMIT: usize = 100_000;

/// Links source code, panicking on failure.
pub fn linked(source: &str, options: &LinkerOptions) -> Program {
    match link_source(source, options) {
        Ok(program) => program,
        Err(err) => panic!("linking failed: {err}"),
    }
}

/// Links with default options and prints the first class.
pub fn linked_class(source: &str) -> String {
    linked(source, &LinkerOptions::default()).classes[0].to_string()
}

/// Names of the members emitted for the first class.
pub fn member_names(program: &Program) -> Vec<String> {
    program.classes[0]
        .members
        .iter()
        .map(|member| member.name().to_string())
        .collect()
}

/// Body of the method `name` in the first class.
pub fn method_body<'p>(program: &'p Program, name: &str) -> &'p Block {
    program.classes[0]
        .members
        .iter()
        .find_map(|member| match member {
            Member::Method(method) if method.name == name => Some(&method.body),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no method '{name}'"))
}

/// Counts `this.name(...)` style invocations of emitted members.
pub fn explicit_calls(block: &Block) -> usize {
    fn in_expression(expression: &Expression) -> usize {
        let own = usize::from(matches!(
            expression,
            Expression::MemberAccess { receiver, .. } | Expression::ElementAccess { receiver, .. }
                if matches!(receiver.as_ref(), Expression::This { .. })
        ));
        let mut nested = 0;
        expression.for_each_child(&mut |child| nested += in_expression(child));
        own + nested
    }

    fn in_statement(statement: &Statement) -> usize {
        let mut count = 0;
        statement.for_each_own_expression(&mut |e| count += in_expression(e));
        statement.for_each_child(&mut |s| count += in_statement(s));
        count
    }

    block.statements.iter().map(in_statement).sum()
}

/// Runtime values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    Null,
    Unit,
}

impl Value {
    fn default_of(ty: &TypeRef) -> Self {
        match ty.name() {
            "int" => Self::Int(0),
            "bool" => Self::Bool(false),
            "string" => Self::Str(String::new()),
            _ => Self::Null,
        }
    }

    fn int(&self) -> i64 {
        match self {
            Self::Int(value) => *value,
            other => panic!("expected an int, found {other:?}"),
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            other => panic!("expected a bool, found {other:?}"),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Str(value) => value.clone(),
            Self::Bool(value) => value.to_string(),
            Self::Null => "null".to_string(),
            Self::Unit => "()".to_string(),
        }
    }
}

enum Flow {
    Normal,
    Return(Value),
    Goto(String),
}

type Frame = FxHashMap<String, Value>;

/// One instance of a linked class.
pub struct Machine<'p> {
    class: &'p ClassDecl,
    fields: FxHashMap<String, Value>,
    pub trace: Vec<String>,
    steps: usize,
}

impl<'p> Machine<'p> {
    pub fn new(class: &'p ClassDecl) -> Self {
        let mut machine = Self {
            class,
            fields: FxHashMap::default(),
            trace: Vec::new(),
            steps: 0,
        };

        for member in &class.members {
            if let Member::Field(field) = member {
                let value = match &field.initializer {
                    Some(initializer) => machine.eval(initializer, &mut Frame::default()),
                    None => Value::default_of(&field.ty),
                };
                machine.fields.insert(field.name.clone(), value);
            }
        }
        machine
    }

    pub fn field(&self, name: &str) -> Value {
        self.fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("no field '{name}'"))
    }

    /// Invokes the method `name`.
    pub fn call(&mut self, name: &str, arguments: Vec<Value>) -> Value {
        match self.member(name) {
            Some(Member::Method(method)) => self.invoke(method, arguments),
            _ => panic!("no method '{name}'"),
        }
    }

    /// Reads the property `name`.
    pub fn get(&mut self, name: &str) -> Value {
        self.read_member(name)
    }

    /// Writes the property `name`.
    pub fn set(&mut self, name: &str, value: Value) {
        self.write_member(name, AssignmentOperator::Assign, value);
    }

    /// Reads `this[index]`.
    pub fn index(&mut self, index: Vec<Value>) -> Value {
        self.run_accessor("Item", AccessorKind::Get, index)
    }

    /// Writes `this[index] = value`.
    pub fn set_index(&mut self, mut index: Vec<Value>, value: Value) {
        index.push(value);
        self.run_accessor("Item", AccessorKind::Set, index);
    }

    /// Runs `this.name += value` on an event.
    pub fn subscribe(&mut self, name: &str, value: Value) {
        self.write_member(name, AssignmentOperator::AddAssign, value);
    }

    /// Runs `this.name -= value` on an event.
    pub fn unsubscribe(&mut self, name: &str, value: Value) {
        self.write_member(name, AssignmentOperator::SubtractAssign, value);
    }

    fn member(&self, name: &str) -> Option<&'p Member> {
        self.class.members.iter().find(|member| member.name() == name)
    }

    fn invoke(&mut self, method: &'p MethodDecl, arguments: Vec<Value>) -> Value {
        assert_eq!(
            method.parameters.len(),
            arguments.len(),
            "wrong argument count for '{}'",
            method.name
        );
        let mut frame: Frame = method
            .parameters
            .iter()
            .map(|parameter| parameter.name.clone())
            .zip(arguments)
            .collect();
        self.run_body(&method.body, &mut frame, &method.name)
    }

    /// Runs an accessor; the last argument binds `value` when the accessor
    /// takes one.
    fn run_accessor(&mut self, owner: &str, kind: AccessorKind, mut arguments: Vec<Value>) -> Value {
        let (accessors, index): (&'p [AccessorDecl], Vec<String>) = match self.member(owner) {
            Some(Member::Property(property)) => (
                property.accessors.as_slice(),
                property.parameters.iter().map(|p| p.name.clone()).collect(),
            ),
            Some(Member::Event(event)) => (event.accessors.as_slice(), Vec::new()),
            _ => panic!("no property or event '{owner}'"),
        };
        let Some(accessor) = accessors.iter().find(|accessor| accessor.kind == kind) else {
            panic!("'{owner}' has no {kind} accessor");
        };

        let mut frame = Frame::default();
        if kind.has_value_parameter() {
            let value = arguments.pop().unwrap_or_else(|| panic!("missing value for {kind}"));
            frame.insert("value".to_string(), value);
        }
        assert_eq!(index.len(), arguments.len(), "wrong index count for '{owner}'");
        frame.extend(index.into_iter().zip(arguments));

        self.run_body(&accessor.body, &mut frame, owner)
    }

    fn run_body(&mut self, body: &'p Block, frame: &mut Frame, name: &str) -> Value {
        match self.exec_statements(&body.statements, frame) {
            Flow::Normal => Value::Unit,
            Flow::Return(value) => value,
            Flow::Goto(label) => panic!("'{name}' jumps to unknown label '{label}'"),
        }
    }

    fn exec_statements(&mut self, statements: &'p [Statement], frame: &mut Frame) -> Flow {
        let mut i = 0;
        while i < statements.len() {
            match self.exec(&statements[i], frame) {
                Flow::Normal => i += 1,
                Flow::Goto(label) => match find_label(statements, &label) {
                    Some(target) => i = target,
                    None => return Flow::Goto(label),
                },
                flow @ Flow::Return(_) => return flow,
            }
        }
        Flow::Normal
    }

    fn exec(&mut self, statement: &'p Statement, frame: &mut Frame) -> Flow {
        self.steps += 1;
        assert!(self.steps < STEP_LIMIT, "step limit exceeded");

        match statement {
            Statement::Block(block) => self.exec_statements(&block.statements, frame),
            Statement::LocalDeclaration {
                ty, declarators, ..
            } => {
                for declarator in declarators {
                    let value = match &declarator.initializer {
                        Some(initializer) => self.eval(initializer, frame),
                        None => Value::default_of(ty),
                    };
                    frame.insert(declarator.name.clone(), value);
                }
                Flow::Normal
            }
            Statement::Expression { expression, .. } => {
                self.eval(expression, frame);
                Flow::Normal
            }
            Statement::Return { value, .. } => {
                let value = value.as_ref().map_or(Value::Unit, |v| self.eval(v, frame));
                Flow::Return(value)
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval(condition, frame).truthy() {
                    self.exec(then_branch, frame)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch, frame)
                } else {
                    Flow::Normal
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                while self.eval(condition, frame).truthy() {
                    match self.exec(body, frame) {
                        Flow::Normal => {}
                        flow => return flow,
                    }
                }
                Flow::Normal
            }
            Statement::Goto { label, .. } => Flow::Goto(label.clone()),
            Statement::Labeled { statement, .. } => self.exec(statement, frame),
            Statement::Empty { .. } => Flow::Normal,
        }
    }

    fn eval(&mut self, expression: &'p Expression, frame: &mut Frame) -> Value {
        match expression {
            Expression::Integer { value, .. } => Value::Int(*value),
            Expression::String { value, .. } => Value::Str(value.clone()),
            Expression::Boolean { value, .. } => Value::Bool(*value),
            Expression::Null { .. } => Value::Null,
            Expression::Identifier { name, .. } => match frame.get(name) {
                Some(value) => value.clone(),
                None => self.read_member(name),
            },
            Expression::MemberAccess { receiver, name, .. } => {
                expect_this(receiver);
                self.read_member(name)
            }
            Expression::ElementAccess {
                receiver,
                arguments,
                ..
            } => {
                expect_this(receiver);
                let index = self.eval_all(arguments, frame);
                self.index(index)
            }
            Expression::Invocation {
                callee, arguments, ..
            } => {
                let arguments = self.eval_all(arguments, frame);
                match callee.as_ref() {
                    Expression::Identifier { name, .. } if name == "log" => {
                        let line: Vec<String> = arguments.iter().map(Value::render).collect();
                        self.trace.push(line.join(", "));
                        Value::Unit
                    }
                    Expression::Identifier { name, .. } => self.call(name, arguments),
                    Expression::MemberAccess { receiver, name, .. } => {
                        expect_this(receiver);
                        self.call(name, arguments)
                    }
                    other => panic!("cannot invoke {other}"),
                }
            }
            Expression::Assignment {
                operator,
                target,
                value,
                ..
            } => self.assign(*operator, target, value, frame),
            Expression::Binary {
                left,
                operator,
                right,
                ..
            } => match operator {
                BinaryOperator::And => {
                    Value::Bool(self.eval(left, frame).truthy() && self.eval(right, frame).truthy())
                }
                BinaryOperator::Or => {
                    Value::Bool(self.eval(left, frame).truthy() || self.eval(right, frame).truthy())
                }
                _ => {
                    let left = self.eval(left, frame);
                    let right = self.eval(right, frame);
                    binary(*operator, &left, &right)
                }
            },
            Expression::Unary {
                operator, operand, ..
            } => {
                let operand = self.eval(operand, frame);
                match operator {
                    UnaryOperator::Negate => Value::Int(-operand.int()),
                    UnaryOperator::Not => Value::Bool(!operand.truthy()),
                }
            }
            Expression::Cast { operand, .. } => self.eval(operand, frame),
            Expression::Discard { .. } | Expression::This { .. } | Expression::Reference { .. } => {
                panic!("'{expression}' cannot be evaluated in a linked program")
            }
        }
    }

    fn eval_all(&mut self, expressions: &'p [Expression], frame: &mut Frame) -> Vec<Value> {
        expressions.iter().map(|e| self.eval(e, frame)).collect()
    }

    fn assign(
        &mut self,
        operator: AssignmentOperator,
        target: &'p Expression,
        value: &'p Expression,
        frame: &mut Frame,
    ) -> Value {
        match target {
            Expression::Discard { .. } => self.eval(value, frame),
            Expression::Identifier { name, .. } if frame.contains_key(name) => {
                let value = self.eval(value, frame);
                let result = combine(operator, frame.get(name), value);
                frame.insert(name.clone(), result.clone());
                result
            }
            Expression::Identifier { name, .. } => {
                let value = self.eval(value, frame);
                self.write_member(name, operator, value)
            }
            Expression::MemberAccess { receiver, name, .. } => {
                expect_this(receiver);
                let value = self.eval(value, frame);
                self.write_member(name, operator, value)
            }
            Expression::ElementAccess {
                receiver,
                arguments,
                ..
            } => {
                expect_this(receiver);
                assert_eq!(operator, AssignmentOperator::Assign, "compound indexer assignment");
                let index = self.eval_all(arguments, frame);
                let value = self.eval(value, frame);
                self.set_index(index, value.clone());
                value
            }
            other => panic!("cannot assign to {other}"),
        }
    }

    fn read_member(&mut self, name: &str) -> Value {
        if let Some(value) = self.fields.get(name) {
            return value.clone();
        }
        self.run_accessor(name, AccessorKind::Get, Vec::new())
    }

    fn write_member(&mut self, name: &str, operator: AssignmentOperator, value: Value) -> Value {
        if let Some(old) = self.fields.get(name) {
            let result = combine(operator, Some(old), value);
            self.fields.insert(name.to_string(), result.clone());
            return result;
        }

        match (self.member(name), operator) {
            (Some(Member::Event(_)), AssignmentOperator::AddAssign) => {
                self.run_accessor(name, AccessorKind::Add, vec![value]);
                Value::Unit
            }
            (Some(Member::Event(_)), AssignmentOperator::SubtractAssign) => {
                self.run_accessor(name, AccessorKind::Remove, vec![value]);
                Value::Unit
            }
            (Some(Member::Property(_)), AssignmentOperator::Assign) => {
                self.run_accessor(name, AccessorKind::Set, vec![value.clone()]);
                value
            }
            (Some(Member::Property(_)), _) => {
                let old = self.run_accessor(name, AccessorKind::Get, Vec::new());
                let result = combine(operator, Some(&old), value);
                self.run_accessor(name, AccessorKind::Set, vec![result.clone()]);
                result
            }
            _ => panic!("cannot assign to member '{name}'"),
        }
    }
}

fn expect_this(receiver: &Expression) {
    assert!(
        matches!(receiver, Expression::This { .. }),
        "only members of this instance can be accessed, found {receiver}"
    );
}

fn find_label(statements: &[Statement], label: &str) -> Option<usize> {
    statements
        .iter()
        .position(|s| matches!(s, Statement::Labeled { label: l, .. } if l == label))
}

fn combine(operator: AssignmentOperator, old: Option<&Value>, value: Value) -> Value {
    match operator {
        AssignmentOperator::Assign => value,
        AssignmentOperator::AddAssign => binary(
            BinaryOperator::Add,
            old.unwrap_or(&Value::Int(0)),
            &value,
        ),
        AssignmentOperator::SubtractAssign => binary(
            BinaryOperator::Subtract,
            old.unwrap_or(&Value::Int(0)),
            &value,
        ),
    }
}

fn binary(operator: BinaryOperator, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOperator::Add => match (left, right) {
            (Value::Int(l), Value::Int(r)) => Value::Int(l + r),
            (l, r) => Value::Str(format!("{}{}", l.render(), r.render())),
        },
        BinaryOperator::Subtract => Value::Int(left.int() - right.int()),
        BinaryOperator::Multiply => Value::Int(left.int() * right.int()),
        BinaryOperator::Divide => match left.int().checked_div(right.int()) {
            Some(quotient) => Value::Int(quotient),
            None => panic!("division by zero"),
        },
        BinaryOperator::Modulo => match left.int().checked_rem(right.int()) {
            Some(remainder) => Value::Int(remainder),
            None => panic!("division by zero"),
        },
        BinaryOperator::Equal => Value::Bool(left == right),
        BinaryOperator::NotEqual => Value::Bool(left != right),
        BinaryOperator::Less => Value::Bool(left.int() < right.int()),
        BinaryOperator::LessEqual => Value::Bool(left.int() <= right.int()),
        BinaryOperator::Greater => Value::Bool(left.int() > right.int()),
        BinaryOperator::GreaterEqual => Value::Bool(left.int() >= right.int()),
        BinaryOperator::And => Value::Bool(left.truthy() && right.truthy()),
        BinaryOperator::Or => Value::Bool(left.truthy() || right.truthy()),
    }
}

/// Result of running a scenario: its value, or the message of the fault
/// that aborted it.
pub type Outcome<R> = Result<R, String>;

/// Runs `scenario` on a fresh instance of `class`, catching faults such as a
/// zero divisor. Returns the outcome and the trace logged up to that point.
pub fn run_scenario<R>(
    class: &ClassDecl,
    scenario: &impl Fn(&mut Machine<'_>) -> R,
) -> (Outcome<R>, Vec<String>) {
    let mut machine = Machine::new(class);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| scenario(&mut machine)))
        .map_err(|payload| fault_message(payload.as_ref()));
    (outcome, machine.trace)
}

fn fault_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}

/// Links `source` with and without inlining, runs `scenario` on both and
/// asserts that traces and outcomes agree, faults included.
pub fn assert_equivalent<R>(source: &str, scenario: impl Fn(&mut Machine<'_>) -> R)
where
    R: PartialEq + std::fmt::Debug,
{
    let inlined = linked(source, &LinkerOptions::default());
    let explicit = linked(source, &LinkerOptions::without_inlining());

    let (result_a, trace_a) = run_scenario(&inlined.classes[0], &scenario);
    let (result_b, trace_b) = run_scenario(&explicit.classes[0], &scenario);

    assert_eq!(result_a, result_b, "results differ\ninlined:\n{inlined}\nexplicit:\n{explicit}");
    assert_eq!(trace_a, trace_b, "traces differ\ninlined:\n{inlined}\nexplicit:\n{explicit}");
}
