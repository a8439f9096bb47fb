use crate::error::{ProgramError, TransformError};
use crate::{ExecutionContext, TransformEngine};
use oxrdf::{BlankNode, Graph, NamedNode, Subject, SubjectRef, Term, Triple, TripleRef};
use spargebra::algebra::GraphPattern;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use spargebra::Query;
use std::collections::HashMap;
use tracing::debug;

/// A parsed transformation program: a SPARQL CONSTRUCT query whose WHERE
/// clause is matched against the input graph and whose template emits the
/// output graph.
#[derive(Debug)]
pub struct ConstructProgram {
    template: Vec<TriplePattern>,
    pattern: GraphPattern,
}

impl ConstructProgram {
    /// Parses `text` as a CONSTRUCT query, resolving relative IRIs against
    /// `base`.
    pub fn parse(text: &str, base: &str) -> Result<Self, ProgramError> {
        match Query::parse(text, Some(base))? {
            Query::Construct {
                template,
                dataset,
                pattern,
                ..
            } => {
                if dataset.is_some() {
                    return Err(ProgramError::Dataset);
                }
                Ok(Self { template, pattern })
            }
            Query::Select { .. } => Err(ProgramError::NotConstruct("SELECT")),
            Query::Describe { .. } => Err(ProgramError::NotConstruct("DESCRIBE")),
            Query::Ask { .. } => Err(ProgramError::NotConstruct("ASK")),
        }
    }
}

/// One way of matching the WHERE clause: variable name to term. Blank nodes
/// of the WHERE clause act as unnamed variables and are keyed as `_:label`,
/// which no variable name can collide with.
type Solution = HashMap<String, Term>;

/// The built-in engine: evaluates CONSTRUCT programs by backtracking
/// substitution, without indexes.
///
/// GRAPH blocks are resolved through the execution context. SPARQL features
/// beyond basic graph patterns, GRAPH blocks and joins of those are
/// engine-defined failures.
pub struct ConstructEngine;

impl TransformEngine for ConstructEngine {
    type Program = ConstructProgram;

    fn execute(
        &self,
        program: &ConstructProgram,
        input: &Graph,
        context: &ExecutionContext,
    ) -> Result<Graph, TransformError> {
        let solutions = match_pattern(&program.pattern, input, context)?;
        debug!(solutions = solutions.len(), "matched program pattern");
        let mut output = Graph::new();
        for solution in &solutions {
            instantiate(&program.template, solution, &mut output);
        }
        Ok(output)
    }
}

fn match_pattern(
    pattern: &GraphPattern,
    active: &Graph,
    context: &ExecutionContext,
) -> Result<Vec<Solution>, TransformError> {
    match pattern {
        GraphPattern::Bgp { patterns } => Ok(match_bgp(patterns, active)),
        GraphPattern::Join { left, right } => {
            let left = match_pattern(left, active, context)?;
            let right = match_pattern(right, active, context)?;
            Ok(join(left, right))
        }
        GraphPattern::Graph { name, inner } => {
            let NamedNodePattern::NamedNode(name) = name else {
                return Err(TransformError::Unsupported("GRAPH with a variable name"));
            };
            let graph = context.load_graph(name.as_str())?;
            match_pattern(inner, &graph, context)
        }
        other => Err(TransformError::Unsupported(feature_name(other))),
    }
}

fn match_bgp(patterns: &[TriplePattern], graph: &Graph) -> Vec<Solution> {
    let mut solutions = vec![Solution::new()];
    for pattern in patterns {
        let mut next = Vec::new();
        for solution in &solutions {
            for triple in graph.iter() {
                if let Some(extended) = match_triple(pattern, triple, solution) {
                    next.push(extended);
                }
            }
        }
        solutions = next;
    }
    solutions
}

fn match_triple(
    pattern: &TriplePattern,
    triple: TripleRef<'_>,
    solution: &Solution,
) -> Option<Solution> {
    let mut extended = solution.clone();
    if !unify_term(&pattern.subject, &subject_to_term(triple.subject), &mut extended) {
        return None;
    }
    let predicate = Term::NamedNode(triple.predicate.into_owned());
    if !unify_predicate(&pattern.predicate, &predicate, &mut extended) {
        return None;
    }
    if !unify_term(&pattern.object, &triple.object.into_owned(), &mut extended) {
        return None;
    }
    Some(extended)
}

fn subject_to_term(subject: SubjectRef<'_>) -> Term {
    match subject {
        SubjectRef::NamedNode(node) => Term::NamedNode(node.into_owned()),
        SubjectRef::BlankNode(node) => Term::BlankNode(node.into_owned()),
    }
}

fn unify_term(pattern: &TermPattern, term: &Term, solution: &mut Solution) -> bool {
    match pattern {
        TermPattern::NamedNode(node) => matches!(term, Term::NamedNode(t) if t == node),
        TermPattern::Literal(literal) => matches!(term, Term::Literal(t) if t == literal),
        TermPattern::BlankNode(node) => bind(&format!("_:{}", node.as_str()), term, solution),
        TermPattern::Variable(variable) => bind(variable.as_str(), term, solution),
    }
}

fn unify_predicate(pattern: &NamedNodePattern, term: &Term, solution: &mut Solution) -> bool {
    match pattern {
        NamedNodePattern::NamedNode(node) => matches!(term, Term::NamedNode(t) if t == node),
        NamedNodePattern::Variable(variable) => bind(variable.as_str(), term, solution),
    }
}

fn bind(key: &str, term: &Term, solution: &mut Solution) -> bool {
    match solution.get(key) {
        Some(existing) => existing == term,
        None => {
            solution.insert(key.to_owned(), term.clone());
            true
        }
    }
}

/// Nested-loop join keeping the merge of every compatible pair.
fn join(left: Vec<Solution>, right: Vec<Solution>) -> Vec<Solution> {
    let mut joined = Vec::new();
    for l in &left {
        'candidates: for r in &right {
            let mut merged = l.clone();
            for (key, term) in r {
                match merged.get(key) {
                    Some(existing) if existing != term => continue 'candidates,
                    _ => {
                        merged.insert(key.clone(), term.clone());
                    }
                }
            }
            joined.push(merged);
        }
    }
    joined
}

/// Emits the template once under `solution`.
///
/// Blank nodes of the template are minted fresh for every solution.
/// Instantiations that would put an unbound term, or a term kind RDF forbids
/// at that position, are dropped rather than reported.
fn instantiate(template: &[TriplePattern], solution: &Solution, output: &mut Graph) {
    let mut blanks: HashMap<&str, BlankNode> = HashMap::new();
    for pattern in template {
        let Some(subject) = template_subject(&pattern.subject, solution, &mut blanks) else {
            continue;
        };
        let Some(predicate) = template_predicate(&pattern.predicate, solution) else {
            continue;
        };
        let Some(object) = template_object(&pattern.object, solution, &mut blanks) else {
            continue;
        };
        output.insert(&Triple::new(subject, predicate, object));
    }
}

fn template_subject<'a>(
    pattern: &'a TermPattern,
    solution: &Solution,
    blanks: &mut HashMap<&'a str, BlankNode>,
) -> Option<Subject> {
    match pattern {
        TermPattern::NamedNode(node) => Some(node.clone().into()),
        TermPattern::BlankNode(node) => Some(fresh_blank(node.as_str(), blanks).into()),
        TermPattern::Variable(variable) => match solution.get(variable.as_str())? {
            Term::NamedNode(node) => Some(node.clone().into()),
            Term::BlankNode(node) => Some(node.clone().into()),
            Term::Literal(_) => None,
        },
        TermPattern::Literal(_) => None,
    }
}

fn template_predicate(pattern: &NamedNodePattern, solution: &Solution) -> Option<NamedNode> {
    match pattern {
        NamedNodePattern::NamedNode(node) => Some(node.clone()),
        NamedNodePattern::Variable(variable) => match solution.get(variable.as_str())? {
            Term::NamedNode(node) => Some(node.clone()),
            _ => None,
        },
    }
}

fn template_object<'a>(
    pattern: &'a TermPattern,
    solution: &Solution,
    blanks: &mut HashMap<&'a str, BlankNode>,
) -> Option<Term> {
    match pattern {
        TermPattern::NamedNode(node) => Some(node.clone().into()),
        TermPattern::BlankNode(node) => Some(fresh_blank(node.as_str(), blanks).into()),
        TermPattern::Literal(literal) => Some(literal.clone().into()),
        TermPattern::Variable(variable) => solution.get(variable.as_str()).cloned(),
    }
}

fn fresh_blank<'a>(label: &'a str, blanks: &mut HashMap<&'a str, BlankNode>) -> BlankNode {
    blanks.entry(label).or_default().clone()
}

fn feature_name(pattern: &GraphPattern) -> &'static str {
    match pattern {
        GraphPattern::Path { .. } => "property paths",
        GraphPattern::LeftJoin { .. } => "OPTIONAL",
        GraphPattern::Filter { .. } => "FILTER",
        GraphPattern::Union { .. } => "UNION",
        GraphPattern::Extend { .. } => "BIND",
        GraphPattern::Minus { .. } => "MINUS",
        GraphPattern::Values { .. } => "VALUES",
        GraphPattern::OrderBy { .. } => "ORDER BY",
        GraphPattern::Project { .. } => "a sub-select",
        GraphPattern::Distinct { .. } => "DISTINCT",
        GraphPattern::Reduced { .. } => "REDUCED",
        GraphPattern::Slice { .. } => "LIMIT/OFFSET",
        GraphPattern::Group { .. } => "GROUP BY",
        GraphPattern::Service { .. } => "SERVICE",
        GraphPattern::Bgp { .. } | GraphPattern::Join { .. } | GraphPattern::Graph { .. } => {
            unreachable!("handled by the caller")
        }
    }
}
