//! This module exports a machine's transition table as a Graphviz graph description.

use crate::machine::TuringMachine;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders the machine as a `digraph` in the DOT language.
///
/// States are circles, final states double circles, and an invisible start node points at
/// the initial state. All transitions between the same pair of states share one edge whose
/// label lists them as `read/write,move`, followed by `[read→write]` for the memory register
/// when either value is set (`ε` for the empty value).
pub fn to_dot(machine: &TuringMachine) -> String {
    let mut edges: BTreeMap<(&str, &str), Vec<String>> = BTreeMap::new();
    for (key, transition) in machine.transitions() {
        let mut label = format!(
            "{}/{},{}",
            key.symbol, transition.write, transition.direction
        );
        if !key.cache.is_empty() || !transition.next_cache.is_empty() {
            label.push_str(&format!(
                " [{}→{}]",
                or_epsilon(&key.cache),
                or_epsilon(&transition.next_cache)
            ));
        }

        edges
            .entry((key.state.as_str(), transition.next_state.as_str()))
            .or_default()
            .push(label);
    }

    let mut out = String::new();
    let name = machine.name().unwrap_or("turing_machine");
    // Writing into a String cannot fail.
    let _ = writeln!(out, "digraph \"{}\" {{", escape(name));
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  node [shape = circle];");
    let _ = writeln!(out, "  __start [shape = point, style = invis];");

    for state in machine.states() {
        if machine.is_final(state) {
            let _ = writeln!(out, "  \"{}\" [shape = doublecircle];", escape(state));
        } else {
            let _ = writeln!(out, "  \"{}\";", escape(state));
        }
    }

    let _ = writeln!(out, "  __start -> \"{}\";", escape(machine.initial_state()));

    for ((from, to), labels) in edges {
        let label = labels
            .iter()
            .map(|l| escape(l))
            .collect::<Vec<_>>()
            .join("\\n");
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{}\"];",
            escape(from),
            escape(to),
            label
        );
    }

    out.push_str("}\n");
    out
}

fn or_epsilon(value: &str) -> &str {
    if value.is_empty() {
        "ε"
    } else {
        value
    }
}

/// Escapes a string for use inside a double-quoted DOT identifier.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MACHINE: &str = r#"
name: 'Copy "first"'
q_states:
  q_list: [q0, q1, qf]
  initial: q0
  final: qf
alphabet: [a, b]
tape_alphabet: [a, b, '']
delta:
  - params:
      initial_state: q0
      tape_input: a
    output:
      final_state: q1
      mem_cache_value: a
      tape_displacement: R
  - params:
      initial_state: q0
      tape_input: b
    output:
      final_state: q1
      tape_output: b
      tape_displacement: R
  - params:
      initial_state: q1
      mem_cache_value: a
    output:
      final_state: qf
      tape_output: a
      tape_displacement: S
"#;

    #[test]
    fn test_dot_structure() {
        let machine = TuringMachine::from_yaml(MACHINE).unwrap();
        let dot = to_dot(&machine);

        assert!(dot.starts_with("digraph \"Copy \\\"first\\\"\" {\n"));
        assert!(dot.contains("  rankdir=LR;\n"));
        assert!(dot.contains("  \"qf\" [shape = doublecircle];\n"));
        assert!(dot.contains("  \"q0\";\n"));
        assert!(dot.contains("  __start -> \"q0\";\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_dot_edges_are_grouped() {
        let machine = TuringMachine::from_yaml(MACHINE).unwrap();
        let dot = to_dot(&machine);

        assert!(dot.contains("  \"q0\" -> \"q1\" [label=\"a/␣,R [ε→a]\\nb/b,R\"];\n"));
        assert!(dot.contains("  \"q1\" -> \"qf\" [label=\"␣/a,S [a→ε]\"];\n"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a"b\c"#), r#"a\"b\\c"#);
    }
}
