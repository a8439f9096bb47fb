#![doc = include_str!("../README.md")]

mod error;
mod pipeline;

pub use error::RewriteError;
pub use pipeline::rewrite_select;

pub mod engine {
    pub use rdf_reshape_engine::*;
}

pub mod rewrite {
    pub use rdf_reshape_rewrite::*;
}
