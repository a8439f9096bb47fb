use crate::namespace::VariableNamespace;
use oxrdf::{
    Graph, IriParseError, NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef, Triple,
    TripleRef, Variable, VariableNameParseError,
};
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use tracing::debug;

/// Error raised while moving triple patterns into or out of their RDF graph
/// form.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A term kind that cannot stand at this position of an RDF statement.
    /// The SPARQL grammar never produces such a pattern, so hitting this
    /// means the pattern was built by hand.
    #[error("cannot use a {kind} as the {position} of an RDF statement")]
    UnencodableTerm {
        kind: &'static str,
        position: &'static str,
    },
    /// The input pattern already contains an IRI under the namespace drawn
    /// for this run.
    #[error("the pattern already contains <{iri}>, which lies under the variable namespace")]
    PrefixCollision { iri: String },
    /// A variable whose name does not survive being appended to the prefix.
    #[error("variable '{name}' does not form a valid IRI: {source}")]
    VariableIri {
        name: String,
        #[source]
        source: IriParseError,
    },
    /// An IRI suffix that is not a valid variable name.
    #[error("'{name}' cannot be decoded into a variable name: {source}")]
    VariableName {
        name: String,
        #[source]
        source: VariableNameParseError,
    },
}

/// Writes a basic graph pattern out as an RDF graph.
///
/// Concrete terms pass through unchanged; every occurrence of a variable
/// becomes the same IRI under `namespace`, so variables shared between
/// patterns stay shared nodes in the graph. The result is a set: duplicate
/// patterns collapse and iteration order is not the input order.
pub fn encode_bgp(
    patterns: &[TriplePattern],
    namespace: &VariableNamespace,
) -> Result<Graph, CodecError> {
    let mut graph = Graph::new();
    for pattern in patterns {
        let triple = Triple::new(
            encode_subject(&pattern.subject, namespace)?,
            encode_predicate(&pattern.predicate, namespace)?,
            encode_object(&pattern.object, namespace)?,
        );
        graph.insert(&triple);
    }
    debug!(
        patterns = patterns.len(),
        statements = graph.len(),
        "encoded basic graph pattern"
    );
    Ok(graph)
}

fn encode_subject(
    term: &TermPattern,
    namespace: &VariableNamespace,
) -> Result<Subject, CodecError> {
    match term {
        TermPattern::NamedNode(node) => Ok(checked_concrete(node, namespace)?.into()),
        TermPattern::BlankNode(node) => Ok(node.clone().into()),
        TermPattern::Variable(variable) => Ok(variable_iri(variable, namespace)?.into()),
        TermPattern::Literal(_) => Err(CodecError::UnencodableTerm {
            kind: "literal",
            position: "subject",
        }),
    }
}

fn encode_predicate(
    term: &NamedNodePattern,
    namespace: &VariableNamespace,
) -> Result<NamedNode, CodecError> {
    match term {
        NamedNodePattern::NamedNode(node) => checked_concrete(node, namespace),
        NamedNodePattern::Variable(variable) => variable_iri(variable, namespace),
    }
}

fn encode_object(term: &TermPattern, namespace: &VariableNamespace) -> Result<Term, CodecError> {
    match term {
        TermPattern::NamedNode(node) => Ok(checked_concrete(node, namespace)?.into()),
        TermPattern::BlankNode(node) => Ok(node.clone().into()),
        TermPattern::Literal(literal) => Ok(literal.clone().into()),
        TermPattern::Variable(variable) => Ok(variable_iri(variable, namespace)?.into()),
    }
}

/// Passes a concrete IRI through after checking that it does not sit under
/// the freshly drawn namespace, where decoding would mistake it for a
/// variable.
fn checked_concrete(
    node: &NamedNode,
    namespace: &VariableNamespace,
) -> Result<NamedNode, CodecError> {
    if namespace.variable_name(node.as_ref()).is_some() {
        return Err(CodecError::PrefixCollision {
            iri: node.as_str().to_owned(),
        });
    }
    Ok(node.clone())
}

fn variable_iri(
    variable: &Variable,
    namespace: &VariableNamespace,
) -> Result<NamedNode, CodecError> {
    namespace
        .variable_iri(variable.as_str())
        .map_err(|source| CodecError::VariableIri {
            name: variable.as_str().to_owned(),
            source,
        })
}

/// Reads a basic graph pattern back out of an RDF graph.
///
/// Any IRI under `namespace` turns back into a variable, wherever the graph
/// uses it and regardless of whether the encoder put it there; all other
/// terms pass through. The order of the returned patterns is the graph's
/// iteration order.
pub fn decode_graph(
    graph: &Graph,
    namespace: &VariableNamespace,
) -> Result<Vec<TriplePattern>, CodecError> {
    let patterns = graph
        .iter()
        .map(|triple| decode_triple(triple, namespace))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(patterns = patterns.len(), "decoded transformed graph");
    Ok(patterns)
}

fn decode_triple(
    triple: TripleRef<'_>,
    namespace: &VariableNamespace,
) -> Result<TriplePattern, CodecError> {
    Ok(TriplePattern {
        subject: decode_subject(triple.subject, namespace)?,
        predicate: decode_predicate(triple.predicate, namespace)?,
        object: decode_object(triple.object, namespace)?,
    })
}

fn decode_subject(
    subject: SubjectRef<'_>,
    namespace: &VariableNamespace,
) -> Result<TermPattern, CodecError> {
    match subject {
        SubjectRef::NamedNode(node) => decode_named_node(node, namespace),
        SubjectRef::BlankNode(node) => Ok(TermPattern::BlankNode(node.into_owned())),
    }
}

fn decode_predicate(
    predicate: NamedNodeRef<'_>,
    namespace: &VariableNamespace,
) -> Result<NamedNodePattern, CodecError> {
    Ok(match namespace.variable_name(predicate) {
        Some(name) => NamedNodePattern::Variable(decoded_variable(name)?),
        None => NamedNodePattern::NamedNode(predicate.into_owned()),
    })
}

fn decode_object(
    term: TermRef<'_>,
    namespace: &VariableNamespace,
) -> Result<TermPattern, CodecError> {
    match term {
        TermRef::NamedNode(node) => decode_named_node(node, namespace),
        TermRef::BlankNode(node) => Ok(TermPattern::BlankNode(node.into_owned())),
        TermRef::Literal(literal) => Ok(TermPattern::Literal(literal.into_owned())),
    }
}

fn decode_named_node(
    node: NamedNodeRef<'_>,
    namespace: &VariableNamespace,
) -> Result<TermPattern, CodecError> {
    Ok(match namespace.variable_name(node) {
        Some(name) => TermPattern::Variable(decoded_variable(name)?),
        None => TermPattern::NamedNode(node.into_owned()),
    })
}

fn decoded_variable(name: &str) -> Result<Variable, CodecError> {
    Variable::new(name).map_err(|source| CodecError::VariableName {
        name: name.to_owned(),
        source,
    })
}
