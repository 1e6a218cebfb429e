//! 查询图的 DOT 输出

use std::fmt::Write;

use super::query_graph::{DataSourceKind, QueryGraph};

impl QueryGraph {
    /// 以 Graphviz DOT 格式渲染查询图
    ///
    /// 二元谓词画成边；引用三个及以上关系的谓词画成一个额外的菱形节点
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "graph query_graph {{");
        let _ = writeln!(out, "    overlap=false;");
        let _ = writeln!(out, "    node [shape=box, style=rounded];");

        for source in self.sources() {
            let shape = match source.kind() {
                DataSourceKind::BaseTable { .. } => "",
                DataSourceKind::Query { .. } => ", shape=box3d",
            };
            let _ = writeln!(
                out,
                "    s{} [label=\"{}\\n{} rows\"{}];",
                source.id(),
                escape(source.alias()),
                source.num_rows(),
                shape
            );
        }

        for (idx, join) in self.joins().iter().enumerate() {
            let label = escape(&join.condition().to_string());
            let ids: Vec<usize> = join.sources().iter().collect();
            if ids.len() == 2 {
                let _ = writeln!(out, "    s{} -- s{} [label=\"{}\"];", ids[0], ids[1], label);
            } else {
                let _ = writeln!(out, "    j{} [shape=diamond, label=\"{}\"];", idx, label);
                for id in ids {
                    let _ = writeln!(out, "    j{} -- s{};", idx, id);
                }
            }
        }

        let _ = writeln!(out, "}}");
        out
    }
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
