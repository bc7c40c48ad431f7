//! Display implementations for programs, classes and members.

use std::fmt;

use super::statement::write_block;
use super::write_indent;
use crate::ast::{AccessorDecl, ClassDecl, LayerDecl, Member, Parameter, Program};

impl fmt::Display for LayerDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.part {
            Some(part) => write!(f, "{}.{part}", self.aspect),
            None => write!(f, "{}", self.aspect),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.layers.is_empty() {
            write!(f, "layers {{ ")?;
            for (i, layer) in self.layers.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{layer}")?;
            }
            writeln!(f, " }}")?;
        }
        for class in &self.classes {
            writeln!(f)?;
            write!(f, "{class}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "class {} {{", self.name)?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write_member(f, member, 1)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_member(f, self, 0)
    }
}

fn write_parameters(f: &mut fmt::Formatter<'_>, parameters: &[Parameter]) -> fmt::Result {
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{} {}", parameter.ty, parameter.name)?;
    }
    Ok(())
}

fn write_accessors(
    f: &mut fmt::Formatter<'_>,
    accessors: &[AccessorDecl],
    level: usize,
) -> fmt::Result {
    writeln!(f, " {{")?;
    for accessor in accessors {
        write_indent(f, level + 1)?;
        write!(f, "{} ", accessor.kind)?;
        write_block(f, &accessor.body, level + 1)?;
        writeln!(f)?;
    }
    write_indent(f, level)?;
    writeln!(f, "}}")
}

fn write_member(f: &mut fmt::Formatter<'_>, member: &Member, level: usize) -> fmt::Result {
    if let Some(layer) = member.layer() {
        write_indent(f, level)?;
        writeln!(f, "[override {layer}]")?;
    }
    write_indent(f, level)?;

    match member {
        Member::Field(field) => {
            write!(f, "{} {}", field.ty, field.name)?;
            if let Some(initializer) = &field.initializer {
                write!(f, " = {initializer}")?;
            }
            writeln!(f, ";")
        }
        Member::Method(method) => {
            write!(f, "{} {}(", method.return_type, method.name)?;
            write_parameters(f, &method.parameters)?;
            write!(f, ") ")?;
            write_block(f, &method.body, level)?;
            writeln!(f)
        }
        Member::Property(property) if property.is_indexer => {
            write!(f, "{} this[", property.ty)?;
            write_parameters(f, &property.parameters)?;
            write!(f, "]")?;
            write_accessors(f, &property.accessors, level)
        }
        Member::Property(property) => {
            write!(f, "{} {}", property.ty, property.name)?;
            write_accessors(f, &property.accessors, level)
        }
        Member::Event(event) => {
            write!(f, "event {} {}", event.ty, event.name)?;
            write_accessors(f, &event.accessors, level)
        }
    }
}
