#![warn(rust_2018_idioms)]

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod io;
pub mod observability;

pub use error::{GraphError, Result};
pub use graph::{GraphArtifact, GraphBuilder, LinkMode, MembershipMatrix, build};
