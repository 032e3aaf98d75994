use crate::storage::FileRecord;
use crate::tree::ArtifactNode;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn record(record: &FileRecord) {
    let analyzed = match record.analysis_exists {
        Some(true) => Icons::CHECK,
        Some(false) => Icons::CROSS,
        None => " ",
    };
    println!(
        "{} {} {} [{}] {}",
        analyzed,
        Icons::FILE,
        record.file_name,
        record.file_type.style(theme().dim.clone()),
        record.object_name.as_deref().unwrap_or("-")
    );
}

/// Render a statement tree one node per line, indented by depth
pub fn render_tree(node: &ArtifactNode) -> Vec<String> {
    let mut lines = Vec::new();
    render_into(node, 0, &mut lines);
    lines
}

fn render_into(node: &ArtifactNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}{} {}-{}",
        "  ".repeat(depth),
        node.kind.style(theme().kind(node.kind)),
        node.start_line,
        node.end_line
    ));
    for child in &node.children {
        render_into(child, depth + 1, lines);
    }
}

pub fn tree(node: &ArtifactNode) {
    println!("{} {} statement(s)", Icons::TREE, node.statement_count());
    for line in render_tree(node) {
        println!("{}", line);
    }
}
