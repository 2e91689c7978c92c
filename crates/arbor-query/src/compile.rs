//! Name resolution: turns parsed patterns into executable steps.
//!
//! Every problem is collected, and the earliest one of the highest ranked
//! kind is reported (node type, field, capture, predicate, syntax).

use arbor_syntax::{FieldId, LanguageTable, Symbol};
use indexmap::IndexSet;
use regex_automata::meta::Regex;

use crate::ast::{self, Argument, Item, ItemKind, Quantifier};
use crate::predicate::{Operand, QueryPredicate, QueryPredicateArg, QueryProperty, TextPredicate};
use crate::{QueryError, QueryErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindTest {
    Symbol(Symbol),
    /// `(_)`
    Named,
    /// `_`
    Any,
}

#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub(crate) test: Test,
    pub(crate) field: Option<FieldId>,
    pub(crate) quantifier: Quantifier,
    pub(crate) captures: Box<[u32]>,
}

#[derive(Debug, Clone)]
pub(crate) enum Test {
    Node { kind: KindTest, negated: Box<[FieldId]>, children: Box<[Step]> },
    Group(Box<[Step]>),
    Alternation(Box<[Step]>),
    Anchor,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    pub(crate) root: Step,
    pub(crate) start_byte: usize,
    pub(crate) text_predicates: Box<[TextPredicate]>,
    pub(crate) properties: Box<[QueryProperty]>,
    pub(crate) general_predicates: Box<[QueryPredicate]>,
}

pub(crate) struct Compiler<'a> {
    language: &'a LanguageTable,
    source: &'a str,
    captures: IndexSet<Box<str>>,
    /// Earliest error per rank.
    errors: [Option<(usize, QueryErrorKind)>; 5],
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(language: &'a LanguageTable, source: &'a str) -> Self {
        Self { language, source, captures: IndexSet::default(), errors: Default::default() }
    }

    fn report(&mut self, offset: usize, kind: QueryErrorKind) {
        let slot = &mut self.errors[usize::from(kind.rank())];
        if slot.as_ref().is_none_or(|(earliest, _)| offset < *earliest) {
            *slot = Some((offset, kind));
        }
    }

    pub(crate) fn syntax_error(&mut self, offset: usize) {
        self.report(offset, QueryErrorKind::Syntax(offset));
    }

    /// Returns the capture table, or the most important error.
    pub(crate) fn finish(self) -> Result<IndexSet<Box<str>>, QueryError> {
        let source = self.source;
        match self.errors.into_iter().flatten().next() {
            Some((offset, kind)) => Err(QueryError::new(source, offset, kind)),
            None => Ok(self.captures),
        }
    }

    pub(crate) fn pattern(&mut self, pattern: &ast::Pattern) -> CompiledPattern {
        let mut declared = Vec::new();
        let root = self.step(&pattern.item, &mut declared);

        let mut text_predicates = Vec::new();
        let mut properties = Vec::new();
        let mut general_predicates = Vec::new();
        for predicate in &pattern.predicates {
            for arg in &predicate.args {
                if let Argument::Capture(name) = arg
                    && !declared.contains(&name.text)
                {
                    self.report(name.offset, QueryErrorKind::Capture(name.text.clone()));
                }
            }
            match self.predicate(predicate) {
                Ok(Resolved::Text(predicate)) => text_predicates.push(predicate),
                Ok(Resolved::Property(property)) => properties.push(property),
                Ok(Resolved::General(predicate)) => general_predicates.push(predicate),
                Err(detail) => {
                    self.report(predicate.operator.offset, QueryErrorKind::Predicate(detail));
                }
            }
        }

        CompiledPattern {
            root,
            start_byte: pattern.item.offset,
            text_predicates: text_predicates.into(),
            properties: properties.into(),
            general_predicates: general_predicates.into(),
        }
    }

    fn step(&mut self, item: &Item, declared: &mut Vec<String>) -> Step {
        let field = item.field.as_ref().and_then(|name| {
            let field = self.language.field_id_for_name(&name.text);
            if field.is_none() {
                self.report(name.offset, QueryErrorKind::Field(name.text.clone()));
            }
            field
        });

        let test = match &item.kind {
            ItemKind::Node { kind, negated, children } => {
                let kind = match kind {
                    Some(name) => self.symbol(name, true),
                    None => KindTest::Named,
                };
                let negated = negated
                    .iter()
                    .filter_map(|name| {
                        let field = self.language.field_id_for_name(&name.text);
                        if field.is_none() {
                            self.report(name.offset, QueryErrorKind::Field(name.text.clone()));
                        }
                        field
                    })
                    .collect();
                let children = children.iter().map(|child| self.step(child, declared)).collect();
                Test::Node { kind, negated, children }
            }
            ItemKind::Wildcard => {
                Test::Node { kind: KindTest::Any, negated: Box::new([]), children: Box::new([]) }
            }
            ItemKind::Anonymous(name) => Test::Node {
                kind: self.symbol(name, false),
                negated: Box::new([]),
                children: Box::new([]),
            },
            ItemKind::Group(items) => {
                Test::Group(items.iter().map(|item| self.step(item, declared)).collect())
            }
            ItemKind::Alternation(items) => {
                Test::Alternation(items.iter().map(|item| self.step(item, declared)).collect())
            }
            ItemKind::Anchor => Test::Anchor,
        };

        let captures = item
            .captures
            .iter()
            .map(|name| {
                if !declared.contains(&name.text) {
                    declared.push(name.text.clone());
                }
                let (index, _) = self.captures.insert_full(name.text.as_str().into());
                index as u32
            })
            .collect();

        Step { test, field, quantifier: item.quantifier, captures }
    }

    fn symbol(&mut self, name: &ast::Name, named: bool) -> KindTest {
        match self.language.symbol_for_name(&name.text, named) {
            Some(symbol) => KindTest::Symbol(symbol),
            None => {
                self.report(name.offset, QueryErrorKind::NodeType(name.text.clone()));
                KindTest::Any
            }
        }
    }

    fn capture_id(&self, name: &ast::Name) -> u32 {
        self.captures.get_index_of(name.text.as_str()).map_or(u32::MAX, |index| index as u32)
    }

    fn predicate(&self, predicate: &ast::Predicate) -> Result<Resolved, String> {
        let operator = predicate.operator.text.as_str();
        let args = &predicate.args;
        match operator {
            "eq?" | "not-eq?" | "any-eq?" | "any-not-eq?" => {
                let [Argument::Capture(capture), other] = args.as_slice() else {
                    return Err(format!(
                        "#{operator} expects a capture and one more argument, got {} arguments",
                        args.len()
                    ));
                };
                let operand = match other {
                    Argument::Capture(other) => Operand::Capture(self.capture_id(other)),
                    Argument::String(text) => Operand::Text(text.text.as_bytes().into()),
                };
                Ok(Resolved::Text(TextPredicate::Eq {
                    capture: self.capture_id(capture),
                    operand,
                    negated: operator.contains("not-"),
                    any: operator.starts_with("any-"),
                }))
            }
            "match?" | "not-match?" | "any-match?" | "any-not-match?" => {
                let [Argument::Capture(capture), Argument::String(pattern)] = args.as_slice()
                else {
                    return Err(format!("#{operator} expects a capture and a regex string"));
                };
                let regex = Regex::new(&pattern.text)
                    .map_err(|err| format!("#{operator} has an invalid regex: {err}"))?;
                Ok(Resolved::Text(TextPredicate::Match {
                    capture: self.capture_id(capture),
                    regex,
                    negated: operator.contains("not-"),
                    any: operator.starts_with("any-"),
                }))
            }
            "any-of?" | "not-any-of?" => {
                let Some((Argument::Capture(capture), values)) = args.split_first() else {
                    return Err(format!("#{operator} expects a capture first"));
                };
                let values = values
                    .iter()
                    .map(|value| match value {
                        Argument::String(text) => Ok(text.text.as_bytes().into()),
                        Argument::Capture(_) => {
                            Err(format!("#{operator} expects strings after the capture"))
                        }
                    })
                    .collect::<Result<Box<[Box<[u8]>]>, String>>()?;
                if values.is_empty() {
                    return Err(format!("#{operator} expects at least one string"));
                }
                Ok(Resolved::Text(TextPredicate::AnyOf {
                    capture: self.capture_id(capture),
                    values,
                    negated: operator == "not-any-of?",
                }))
            }
            "set!" => {
                let (capture_id, rest) = match args.split_first() {
                    Some((Argument::Capture(capture), rest)) => {
                        (Some(self.capture_id(capture)), rest)
                    }
                    _ => (None, args.as_slice()),
                };
                let strings = rest
                    .iter()
                    .map(|arg| match arg {
                        Argument::String(text) => Some(text.text.as_str()),
                        Argument::Capture(_) => None,
                    })
                    .collect::<Option<Vec<_>>>();
                match strings.as_deref() {
                    Some([key]) => Ok(Resolved::Property(QueryProperty {
                        key: (*key).into(),
                        value: None,
                        capture_id,
                    })),
                    Some([key, value]) => Ok(Resolved::Property(QueryProperty {
                        key: (*key).into(),
                        value: Some((*value).into()),
                        capture_id,
                    })),
                    _ => Err("#set! expects a key and an optional value".to_owned()),
                }
            }
            _ => Ok(Resolved::General(QueryPredicate {
                operator: operator.into(),
                args: args
                    .iter()
                    .map(|arg| match arg {
                        Argument::Capture(name) => QueryPredicateArg::Capture(self.capture_id(name)),
                        Argument::String(text) => QueryPredicateArg::String(text.text.as_str().into()),
                    })
                    .collect(),
            })),
        }
    }
}

enum Resolved {
    Text(TextPredicate),
    Property(QueryProperty),
    General(QueryPredicate),
}
