use clap::{Parser, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "rdf-reshape")]
/// Rewrite the SELECT query of a working directory by running its basic
/// graph pattern through the directory's transformation program
pub struct Args {
    /// Directory holding `select.rq`, `transform.rq` and any graph documents
    /// the transformation addresses
    #[arg(value_hint = ValueHint::DirPath)]
    pub directory: PathBuf,
    /// Base IRI under which the directory's files are addressable
    #[arg(long, default_value = "http://example.org/", value_hint = ValueHint::Url)]
    pub base: String,
}
