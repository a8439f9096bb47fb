use oxiri::Iri;
use spargebra::algebra::{GraphPattern, QueryDataset};
use spargebra::term::TriplePattern;
use spargebra::Query;

/// Error raised when a query cannot be taken apart into a rewritable shape.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// Only SELECT queries carry a pattern this rewriting understands.
    #[error("only SELECT queries can be rewritten, found a {0} query")]
    NotSelect(&'static str),
    /// The WHERE clause contains something besides one flat triple block.
    #[error("the WHERE clause must be a single basic graph pattern, found {0}")]
    UnsupportedElement(&'static str),
}

/// A SELECT query taken apart into the single basic graph pattern of its
/// WHERE clause and everything wrapped around it.
///
/// The surroundings (dataset clause, base IRI, projection and the other
/// solution modifiers) are kept exactly as parsed and written back unchanged
/// by [`into_query`](Self::into_query); only the triple patterns are
/// replaced.
#[derive(Debug)]
pub struct SelectTemplate {
    dataset: Option<QueryDataset>,
    base_iri: Option<Iri<String>>,
    pattern: GraphPattern,
    patterns: Vec<TriplePattern>,
}

impl SelectTemplate {
    /// Validates the shape of `query` and extracts its basic graph pattern.
    pub fn new(query: Query) -> Result<Self, ShapeError> {
        match query {
            Query::Select {
                dataset,
                pattern,
                base_iri,
            } => {
                let patterns = single_bgp(&pattern)?.to_vec();
                Ok(Self {
                    dataset,
                    base_iri,
                    pattern,
                    patterns,
                })
            }
            Query::Construct { .. } => Err(ShapeError::NotSelect("CONSTRUCT")),
            Query::Describe { .. } => Err(ShapeError::NotSelect("DESCRIBE")),
            Query::Ask { .. } => Err(ShapeError::NotSelect("ASK")),
        }
    }

    /// The triple patterns of the WHERE clause, in query order.
    pub fn patterns(&self) -> &[TriplePattern] {
        &self.patterns
    }

    /// Rebuilds the SELECT query around `patterns`.
    ///
    /// The new pattern is not re-validated; callers that need certainty about
    /// the produced query re-parse its serialization.
    pub fn into_query(self, patterns: Vec<TriplePattern>) -> Query {
        Query::Select {
            dataset: self.dataset,
            pattern: replace_bgp(self.pattern, patterns),
            base_iri: self.base_iri,
        }
    }
}

/// Walks the solution-modifier wrappers down to the one basic graph pattern.
///
/// spargebra nests the SELECT clause and the solution modifiers around the
/// WHERE pattern, so those count as surroundings rather than as pattern
/// elements. A second projection can only come from a sub-select.
fn single_bgp(pattern: &GraphPattern) -> Result<&[TriplePattern], ShapeError> {
    let mut seen_projection = false;
    let mut current = pattern;
    loop {
        match current {
            GraphPattern::Bgp { patterns } => return Ok(patterns),
            GraphPattern::Project { inner, .. } => {
                if seen_projection {
                    return Err(ShapeError::UnsupportedElement("a nested sub-select"));
                }
                seen_projection = true;
                current = inner.as_ref();
            }
            GraphPattern::Distinct { inner }
            | GraphPattern::Reduced { inner }
            | GraphPattern::Slice { inner, .. }
            | GraphPattern::OrderBy { inner, .. } => current = inner.as_ref(),
            other => return Err(ShapeError::UnsupportedElement(element_name(other))),
        }
    }
}

fn replace_bgp(pattern: GraphPattern, patterns: Vec<TriplePattern>) -> GraphPattern {
    match pattern {
        GraphPattern::Bgp { .. } => GraphPattern::Bgp { patterns },
        GraphPattern::Project { inner, variables } => GraphPattern::Project {
            inner: Box::new(replace_bgp(*inner, patterns)),
            variables,
        },
        GraphPattern::Distinct { inner } => GraphPattern::Distinct {
            inner: Box::new(replace_bgp(*inner, patterns)),
        },
        GraphPattern::Reduced { inner } => GraphPattern::Reduced {
            inner: Box::new(replace_bgp(*inner, patterns)),
        },
        GraphPattern::Slice {
            inner,
            start,
            length,
        } => GraphPattern::Slice {
            inner: Box::new(replace_bgp(*inner, patterns)),
            start,
            length,
        },
        GraphPattern::OrderBy { inner, expression } => GraphPattern::OrderBy {
            inner: Box::new(replace_bgp(*inner, patterns)),
            expression,
        },
        _ => unreachable!("the query shape was validated on construction"),
    }
}

fn element_name(pattern: &GraphPattern) -> &'static str {
    match pattern {
        GraphPattern::Bgp { .. } => "a basic graph pattern",
        GraphPattern::Path { .. } => "a property path",
        GraphPattern::Join { .. } => "a group of multiple pattern blocks",
        GraphPattern::LeftJoin { .. } => "an OPTIONAL",
        GraphPattern::Filter { .. } => "a FILTER",
        GraphPattern::Union { .. } => "a UNION",
        GraphPattern::Graph { .. } => "a GRAPH block",
        GraphPattern::Extend { .. } => "a BIND",
        GraphPattern::Minus { .. } => "a MINUS",
        GraphPattern::Values { .. } => "a VALUES block",
        GraphPattern::Group { .. } => "a GROUP BY",
        GraphPattern::Service { .. } => "a SERVICE",
        GraphPattern::Project { .. }
        | GraphPattern::Distinct { .. }
        | GraphPattern::Reduced { .. }
        | GraphPattern::Slice { .. }
        | GraphPattern::OrderBy { .. } => "a nested sub-select",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> Query {
        Query::parse(query, None).unwrap()
    }

    #[test]
    fn accepts_a_single_bgp() {
        let query = parse("SELECT ?s ?o WHERE { ?s <http://example.org/p> ?o }");
        let template = SelectTemplate::new(query).unwrap();
        assert_eq!(template.patterns().len(), 1);
    }

    #[test]
    fn accepts_an_empty_bgp() {
        let template = SelectTemplate::new(parse("SELECT * WHERE { }")).unwrap();
        assert!(template.patterns().is_empty());
    }

    #[test]
    fn keeps_modifiers_in_the_rebuilt_query() {
        let query = parse("SELECT DISTINCT ?s WHERE { ?s ?p ?o } ORDER BY ?s LIMIT 10");
        let template = SelectTemplate::new(query.clone()).unwrap();
        let patterns = template.patterns().to_vec();
        assert_eq!(template.into_query(patterns), query);
    }

    #[test]
    fn replaces_the_pattern_but_not_the_projection() {
        let query = parse("SELECT ?s WHERE { ?s <http://example.org/p> ?o }");
        let template = SelectTemplate::new(query).unwrap();
        let rebuilt = template.into_query(Vec::new());
        let Query::Select { pattern, .. } = rebuilt else {
            panic!("rebuilt query is no longer a SELECT");
        };
        let GraphPattern::Project { inner, variables } = pattern else {
            panic!("projection was dropped");
        };
        assert_eq!(variables.len(), 1);
        assert_eq!(*inner, GraphPattern::Bgp { patterns: Vec::new() });
    }

    #[test]
    fn rejects_optional() {
        let err = SelectTemplate::new(parse(
            "SELECT ?s WHERE { ?s ?p ?o OPTIONAL { ?s ?p ?z } }",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("OPTIONAL"));
    }

    #[test]
    fn rejects_union() {
        let err = SelectTemplate::new(parse(
            "SELECT ?s WHERE { { ?s ?p ?o } UNION { ?o ?p ?s } }",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("UNION"));
    }

    #[test]
    fn rejects_sibling_pattern_blocks() {
        let err = SelectTemplate::new(parse(
            "SELECT ?s WHERE { { ?s ?p ?o } { ?s ?q ?v } }",
        ))
        .unwrap_err();
        assert!(matches!(err, ShapeError::UnsupportedElement(_)));
    }

    #[test]
    fn rejects_filter() {
        let err = SelectTemplate::new(parse(
            "SELECT ?s WHERE { ?s ?p ?o FILTER(?o > 3) }",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("FILTER"));
    }

    #[test]
    fn rejects_property_paths() {
        let err = SelectTemplate::new(parse(
            "SELECT ?s WHERE { ?s <http://example.org/p>+ ?o }",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("property path"));
    }

    #[test]
    fn rejects_nested_sub_selects() {
        let err = SelectTemplate::new(parse(
            "SELECT ?s WHERE { { SELECT ?s WHERE { ?s ?p ?o } } }",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("sub-select"));
    }

    #[test]
    fn rejects_non_select_queries() {
        let err = SelectTemplate::new(parse("ASK { ?s ?p ?o }")).unwrap_err();
        assert!(matches!(err, ShapeError::NotSelect("ASK")));
    }
}
