#![allow(clippy::print_stdout)]
use crate::cli::Args;
use anyhow::Context;
use clap::Parser;
use rdf_reshape::engine::{ConstructEngine, ConstructProgram, ExecutionContext, FileLocator};
use rdf_reshape::rewrite::VariableNamespace;
use spargebra::Query;
use std::fs;
use std::path::Path;

mod cli;

/// File names with a fixed meaning inside the working directory.
const SELECT_FILE: &str = "select.rq";
const TRANSFORM_FILE: &str = "transform.rq";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let query = rewrite_directory(&args.directory, &args.base)?;
    println!("{query}");
    Ok(())
}

fn rewrite_directory(directory: &Path, base: &str) -> anyhow::Result<Query> {
    let select = read_file(directory, SELECT_FILE)?;
    let query = Query::parse(&select, Some(base))
        .with_context(|| format!("failed to parse {SELECT_FILE}"))?;

    let transform = read_file(directory, TRANSFORM_FILE)?;
    let program = ConstructProgram::parse(&transform, base)
        .with_context(|| format!("failed to parse {TRANSFORM_FILE}"))?;

    let locator = FileLocator::walk(base, directory)
        .with_context(|| format!("failed to walk {}", directory.display()))?;
    let context = ExecutionContext::new(locator);
    let namespace = VariableNamespace::generate(base);

    Ok(rdf_reshape::rewrite_select(
        query,
        &ConstructEngine,
        &program,
        &context,
        &namespace,
    )?)
}

fn read_file(directory: &Path, name: &str) -> anyhow::Result<String> {
    let path = directory.join(name);
    fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use predicates::prelude::*;
    use rdf_reshape::rewrite::SelectTemplate;
    use spargebra::term::TriplePattern;
    use std::collections::HashSet;

    fn cli_command() -> Command {
        Command::cargo_bin("rdf-reshape").unwrap()
    }

    fn working_dir(select: &str, transform: &str) -> Result<TempDir> {
        let dir = TempDir::new()?;
        dir.child(SELECT_FILE).write_str(select)?;
        dir.child(TRANSFORM_FILE).write_str(transform)?;
        Ok(dir)
    }

    fn patterns(query: &str, base: Option<&str>) -> HashSet<TriplePattern> {
        let query = Query::parse(query, base).unwrap();
        SelectTemplate::new(query)
            .unwrap()
            .patterns()
            .iter()
            .cloned()
            .collect()
    }

    #[test]
    fn cli_usage() {
        cli_command()
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn cli_identity_round_trip() -> Result<()> {
        let select = "PREFIX ex: <http://example.org/> SELECT ?s ?o WHERE { ?s ex:knows ?o }";
        let dir = working_dir(select, "CONSTRUCT WHERE { ?s ?p ?o }")?;
        let assert = cli_command().arg(dir.path()).assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert_eq!(
            patterns(&stdout, None),
            patterns(select, Some("http://example.org/"))
        );
        Ok(())
    }

    #[test]
    fn cli_runs_a_rewriting_transformation() -> Result<()> {
        let dir = working_dir(
            "PREFIX ex: <http://example.org/> SELECT ?a ?b WHERE { ?a ex:knows ?b }",
            "PREFIX ex: <http://example.org/> \
             CONSTRUCT { ?b ex:knownBy ?a } WHERE { ?a ex:knows ?b }",
        )?;
        let assert = cli_command().arg(dir.path()).assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
        assert_eq!(
            patterns(&stdout, None),
            patterns(
                "PREFIX ex: <http://example.org/> SELECT ?a ?b WHERE { ?b ex:knownBy ?a }",
                Some("http://example.org/"),
            )
        );
        Ok(())
    }

    #[test]
    fn cli_rejects_unsupported_shapes() -> Result<()> {
        let dir = working_dir(
            "SELECT ?s WHERE { ?s ?p ?o OPTIONAL { ?s ?p ?z } }",
            "CONSTRUCT WHERE { ?s ?p ?o }",
        )?;
        cli_command()
            .arg(dir.path())
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("OPTIONAL"));
        Ok(())
    }

    #[test]
    fn cli_reports_missing_inputs() -> Result<()> {
        let dir = TempDir::new()?;
        dir.child(SELECT_FILE)
            .write_str("SELECT * WHERE { ?s ?p ?o }")?;
        cli_command()
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("transform.rq"));
        Ok(())
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
