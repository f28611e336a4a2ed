use std::fs;
use std::path::PathBuf;

use strata::graph::{DependencyGraph, GraphOptions};
use strata::source::DependencySource;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

pub fn load_source(name: &str) -> DependencySource {
    DependencySource::load(&fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to parse manifest fixture '{}': {:#}", name, e))
}

pub fn sample_graph(options: GraphOptions) -> DependencyGraph {
    DependencyGraph::build(&load_source("sample.yaml"), options).expect("sample graph builds")
}

pub fn layered_graph() -> DependencyGraph {
    DependencyGraph::from_source(&load_source("layered.yaml")).expect("layered graph builds")
}
