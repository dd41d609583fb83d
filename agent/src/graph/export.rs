use crate::graph::models::{CurrentNode, TRANSITIONS};
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Render the subgraph's state machine in Graphviz DOT.
pub fn render_dot(name: &str) -> String {
    let mut dot = String::new();
    let _ = writeln!(dot, "digraph \"{}_graph\" {{", name);
    let _ = writeln!(dot, "    rankdir=LR;");
    let _ = writeln!(dot, "    __start__ [shape=point];");
    let _ = writeln!(
        dot,
        "    {} [shape=doublecircle];",
        CurrentNode::Terminal.as_str()
    );
    let _ = writeln!(dot, "    __start__ -> {};", CurrentNode::Agent.as_str());
    for (from, via, to) in TRANSITIONS {
        let _ = writeln!(
            dot,
            "    {} -> {} [label=\"{:?}\"];",
            from.as_str(),
            to.as_str(),
            via
        );
    }
    dot.push_str("}\n");
    dot
}

/// Write `<dir>/<name>_graph.dot`, creating `dir` if needed.
pub fn export_graph(dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_graph.dot", name));
    std::fs::write(&path, render_dot(name))?;
    Ok(path)
}
