use crate::Result;
use crate::model::BuildOutput;
use crate::routing::matrix::Matrix;
use crate::routing::shm::{SHM_MASTER_MAX, SHM_MASTER_START, SHM_SLAVE_MAX, SHM_SLAVE_START};

use std::fmt::Write;

pub const MODEL_FILE: &str = "model.h";
pub const MODEL_DEFS_FILE: &str = "model_defs.h";

/// Render `mat` as a C array literal named `varname`.
///
/// Example for a 3x3 matrix:
/// ```text
/// int topo0[TOPO_NUM_CORES][TOPO_NUM_CORES] = {
/// //    0  1  2
///     { 0, 1, 2}, //  0
///     {99, 0, 0}, //  1
///     {99, 0, 0}  //  2
/// };
/// ```
pub fn render_matrix(out: &mut String, mat: &Matrix, varname: &str) -> Result<()> {
    let dim = mat.dim();
    writeln!(out, "int {}[TOPO_NUM_CORES][TOPO_NUM_CORES] = {{", varname)?;

    // x-axis labels
    let labels: Vec<String> = (0..dim).map(|x| format!("{:2}", x)).collect();
    writeln!(out, "//   {}", labels.join(" "))?;

    for (x, row) in mat.rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:2}", v)).collect();
        let sep = if x + 1 != dim { ',' } else { ' ' };
        writeln!(out, "    {{{}}}{} // {:2}", cells.join(","), sep, x)?;
    }
    out.push_str("};\n\n");
    Ok(())
}

/// Render model_defs.h: machine constants shared by every model.
pub fn render_model_defs(build: &BuildOutput) -> Result<String> {
    let mut out = String::new();
    header_guard(&mut out, "MULTICORE_MODEL_DEFS")?;

    writeln!(out, "#define MACHINE \"{}\"", c_escape(&build.machine))?;
    writeln!(out, "#define TOPOLOGY \"{}\"", c_escape(&build.topology))?;
    writeln!(out, "#define TOPO_NUM_CORES {}", build.index.len())?;
    out.push('\n');

    writeln!(out, "#define SHM_SLAVE_START {}", SHM_SLAVE_START)?;
    writeln!(out, "#define SHM_SLAVE_MAX {}", SHM_SLAVE_MAX)?;
    writeln!(out, "#define SHM_MASTER_START {}", SHM_MASTER_START)?;
    writeln!(out, "#define SHM_MASTER_MAX {}", SHM_MASTER_MAX)?;

    writeln!(out, "#define NUM_TOPOS {}", build.models.len())?;
    let last_nodes: Vec<String> = build
        .models
        .iter()
        .map(|m| m.last_node.to_string())
        .collect();
    writeln!(
        out,
        "#define ALL_LAST_NODES ((int[]) {{{}}})",
        last_nodes.join(", ")
    )?;
    writeln!(out, "#define LAST_NODE ALL_LAST_NODES[get_topo_idx()]")?;

    footer(&mut out);
    Ok(out)
}

/// Render model.h: one routing and one next-hop matrix per model plus the
/// combined lookup tables.
pub fn render_model(build: &BuildOutput) -> Result<String> {
    let mut out = String::new();
    header_guard(&mut out, "MULTICORE_MODEL")?;
    writeln!(out, "#include \"{}\"", MODEL_DEFS_FILE)?;
    out.push('\n');
    out.push_str("#include <vector>\n\n");

    for (i, model) in build.models.iter().enumerate() {
        writeln!(out, "// {}", model.name)?;
        render_matrix(&mut out, &model.routing, &format!("topo{}", i))?;
        render_matrix(&mut out, &model.next_hop, &format!("next_hop{}", i))?;
    }

    let n = build.models.len();
    let topo_ptrs: Vec<String> = (0..n).map(|i| format!("(int*) topo{}", i)).collect();
    writeln!(
        out,
        "int *_topo_combined[NUM_TOPOS] = {{{}}};",
        topo_ptrs.join(", ")
    )?;
    out.push_str("int **topo_combined = (int**) _topo_combined;\n");

    let hop_ptrs: Vec<String> = (0..n).map(|i| format!("(int*) next_hop{}", i)).collect();
    writeln!(
        out,
        "int *_next_hop_combined[NUM_TOPOS] = {{{}}};",
        hop_ptrs.join(", ")
    )?;
    out.push_str("int **next_hop_combined = (int**) _next_hop_combined;\n");

    let names: Vec<String> = build
        .models
        .iter()
        .map(|m| format!("\"{}\"", c_escape(&m.name)))
        .collect();
    writeln!(out, "char* _topo_names[NUM_TOPOS] = {{{}}};", names.join(", "))?;
    out.push_str("char **topo_names = (char**) _topo_names;\n");

    for (i, model) in build.models.iter().enumerate() {
        let leaves: Vec<String> = model.leaf_nodes.iter().map(|l| l.to_string()).collect();
        writeln!(out, "std::vector<int> leaf_nodes{} {{{}}};", i, leaves.join(","))?;
    }
    let leaf_refs: Vec<String> = (0..n).map(|i| format!("&leaf_nodes{}", i)).collect();
    writeln!(
        out,
        "std::vector<int> *_all_leaf_nodes[NUM_TOPOS] = {{{}}};",
        leaf_refs.join(",")
    )?;
    out.push_str("std::vector<int> **all_leaf_nodes = _all_leaf_nodes;\n");

    let last_nodes: Vec<String> = build
        .models
        .iter()
        .map(|m| m.last_node.to_string())
        .collect();
    writeln!(
        out,
        "std::vector<coreid_t> last_nodes = {{{}}};",
        last_nodes.join(", ")
    )?;

    footer(&mut out);
    Ok(out)
}

fn header_guard(out: &mut String, name: &str) -> Result<()> {
    writeln!(out, "#ifndef {}", name)?;
    writeln!(out, "#define {} 1", name)?;
    out.push('\n');
    Ok(())
}

fn footer(out: &mut String) {
    out.push_str("#endif\n");
}

/// Escape a string for use inside a C string literal.
fn c_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build_topology;
    use crate::spec::topology::TopologySpec;
    use pretty_assertions::assert_eq;

    const TREE: &str = r#"{
      "machine": "gruyere",
      "topology": "binary",
      "models": [{"name": "t", "root": 0,
        "modules": [{"kind": "mp_tree", "edges": [[0, 1], [0, 2], [1, 3]]}],
        "schedule": [
          {"sender": 0, "order": [[1, 2], [2, 1]]},
          {"sender": 1, "order": [[1, 3]]}
        ]}]
    }"#;

    fn build(json: &str) -> BuildOutput {
        let spec: TopologySpec = serde_json::from_str(json).unwrap();
        build_topology(&spec.validate_and_build().unwrap()).unwrap()
    }

    #[test]
    fn matrix_layout() {
        let b = build(TREE);
        let mut out = String::new();
        render_matrix(&mut out, &b.models[0].routing, "topo0").unwrap();
        assert_eq!(
            out,
            "int topo0[TOPO_NUM_CORES][TOPO_NUM_CORES] = {\n\
             //    0  1  2  3\n    \
             { 0, 2, 1, 0}, //  0\n    \
             {99, 0, 0, 1}, //  1\n    \
             {99, 0, 0, 0}, //  2\n    \
             { 0,99, 0, 0}  //  3\n\
             };\n\n"
        );
    }

    #[test]
    fn next_hop_layout_uses_minus_one() {
        let b = build(TREE);
        let mut out = String::new();
        render_matrix(&mut out, &b.models[0].next_hop, "next_hop0").unwrap();
        assert!(out.contains("    {-1, 1, 2, 1}, //  0\n"));
        assert!(out.contains("    { 1, 1, 1,-1}  //  3\n"));
    }

    #[test]
    fn model_defs_constants() {
        let b = build(TREE);
        assert_eq!(
            render_model_defs(&b).unwrap(),
            "#ifndef MULTICORE_MODEL_DEFS\n\
             #define MULTICORE_MODEL_DEFS 1\n\
             \n\
             #define MACHINE \"gruyere\"\n\
             #define TOPOLOGY \"binary\"\n\
             #define TOPO_NUM_CORES 4\n\
             \n\
             #define SHM_SLAVE_START 50\n\
             #define SHM_SLAVE_MAX 69\n\
             #define SHM_MASTER_START 70\n\
             #define SHM_MASTER_MAX 89\n\
             #define NUM_TOPOS 1\n\
             #define ALL_LAST_NODES ((int[]) {3})\n\
             #define LAST_NODE ALL_LAST_NODES[get_topo_idx()]\n\
             #endif\n"
        );
    }

    #[test]
    fn model_tables() {
        let b = build(TREE);
        let model = render_model(&b).unwrap();
        assert!(model.starts_with(
            "#ifndef MULTICORE_MODEL\n#define MULTICORE_MODEL 1\n\n#include \"model_defs.h\"\n\n#include <vector>\n\n// t\n"
        ));
        assert!(model.contains("int topo0[TOPO_NUM_CORES][TOPO_NUM_CORES] = {\n"));
        assert!(model.contains("int next_hop0[TOPO_NUM_CORES][TOPO_NUM_CORES] = {\n"));
        assert!(model.contains("int *_topo_combined[NUM_TOPOS] = {(int*) topo0};\n"));
        assert!(model.contains("char* _topo_names[NUM_TOPOS] = {\"t\"};\n"));
        assert!(model.contains("std::vector<int> leaf_nodes0 {2,3};\n"));
        assert!(model.contains("std::vector<int> *_all_leaf_nodes[NUM_TOPOS] = {&leaf_nodes0};\n"));
        assert!(model.contains("std::vector<coreid_t> last_nodes = {3};\n"));
        assert!(model.ends_with("#endif\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = build(TREE);
        let b = build(TREE);
        assert_eq!(render_model(&a).unwrap(), render_model(&b).unwrap());
        assert_eq!(render_model_defs(&a).unwrap(), render_model_defs(&b).unwrap());
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(c_escape(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }
}
