//! Schema Graph
//!
//! A petgraph view over the frozen registry: one node per schema type, one
//! edge per navigable field. Used for DOT export and for listing reference
//! cycles (which extraction tolerates, but which are worth seeing).

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::descriptor::{FieldName, TypeName};
use super::registry::{SchemaRegistry, SchemaRole};

/// Types of edges in the schema graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Single-valued field pointing at an embeddable
    Embedded,
    /// Single-valued field pointing at an entity
    Reference,
    /// Collection-valued field
    Collection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEdge {
    pub field: FieldName,
    pub kind: EdgeKind,
}

/// Navigation graph between schema types
pub struct SchemaGraph {
    graph: DiGraph<TypeName, SchemaEdge>,
    node_indices: HashMap<TypeName, NodeIndex>,
    roles: HashMap<TypeName, SchemaRole>,
}

impl SchemaGraph {
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let mut graph = DiGraph::with_capacity(registry.type_count(), registry.type_count() * 2);
        let mut node_indices = HashMap::with_capacity(registry.type_count());
        let mut roles = HashMap::with_capacity(registry.type_count());

        for (role, name, _) in registry.all_types() {
            node_indices.insert(name.clone(), graph.add_node(name.clone()));
            roles.insert(name.clone(), role);
        }

        for (_, name, fields) in registry.all_types() {
            let source = node_indices[name];
            for (field_name, field) in fields {
                let Some(&target) = node_indices.get(field.related_type()) else {
                    continue;
                };
                let kind = if field.is_collection() {
                    EdgeKind::Collection
                } else if roles.get(field.related_type()) == Some(&SchemaRole::Embeddable) {
                    EdgeKind::Embedded
                } else {
                    EdgeKind::Reference
                };
                graph.add_edge(
                    source,
                    target,
                    SchemaEdge {
                        field: field_name.clone(),
                        kind,
                    },
                );
            }
        }

        Self {
            graph,
            node_indices,
            roles,
        }
    }

    pub fn type_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Types directly reachable from `type_name`, with the field leading there
    pub fn neighbors(&self, type_name: &str) -> Vec<(&FieldName, &TypeName)> {
        let Some(&idx) = self.node_indices.get(type_name) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .graph
            .edges(idx)
            .map(|e| (&e.weight().field, &self.graph[e.target()]))
            .collect();
        out.sort();
        out
    }

    /// Groups of types that reference each other in a cycle, including
    /// self-references. Each group is sorted by name.
    pub fn cycles(&self) -> Vec<Vec<TypeName>> {
        let mut groups: Vec<Vec<TypeName>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&n| self.graph.contains_edge(n, n))
            })
            .map(|scc| {
                let mut names: Vec<TypeName> = scc.iter().map(|&n| self.graph[n].clone()).collect();
                names.sort();
                names
            })
            .collect();
        groups.sort();
        groups
    }

    /// Export the schema graph to GraphViz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::new();

        output.push_str("digraph SchemaGraph {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  bgcolor=\"#1e1e1e\";\n");
        output.push_str("  node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\", fontsize=10, fontcolor=\"white\", color=\"#404040\"];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8, fontcolor=\"#808080\"];\n");
        output.push('\n');

        for idx in self.graph.node_indices() {
            let name = &self.graph[idx];
            let color = match self.roles.get(name) {
                Some(SchemaRole::Entity) => "#00BCD4",
                Some(SchemaRole::Embeddable) => "#FF9800",
                None => "#9E9E9E",
            };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\"];\n",
                dot_id(name),
                name,
                color
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            let style = match edge.weight().kind {
                EdgeKind::Embedded => "dashed",
                EdgeKind::Reference => "solid",
                EdgeKind::Collection => "bold",
            };
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\", style={}];\n",
                dot_id(&self.graph[edge.source()]),
                dot_id(&self.graph[edge.target()]),
                edge.weight().field,
                style
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn dot_id(name: &str) -> String {
    name.replace(|c: char| matches!(c, '.' | '-' | ':' | '$'), "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Declarations;
    use crate::schema::classify::TypeClassifier;
    use crate::schema::extract::SchemaExtractor;
    use crate::schema::registry::SchemaRegistryBuilder;

    fn graph() -> SchemaGraph {
        let model = Declarations::from_json_str(
            r#"{ "types": [
                { "name": "User", "entity": true, "fields": [
                    { "name": "id", "type": "Long", "id": true },
                    { "name": "address", "type": "Address", "embedded": true },
                    { "name": "orders", "type": "Set<Order>", "relation": { "kind": "one_to_many", "mapped_by": "user" } }
                ] },
                { "name": "Address", "embeddable": true, "fields": [ { "name": "city", "type": "String" } ] },
                { "name": "Order", "entity": true, "fields": [
                    { "name": "id", "type": "Long", "id": true },
                    { "name": "user", "type": "User", "relation": { "kind": "many_to_one" } }
                ] }
            ] }"#,
        )
        .unwrap();
        let classifier = TypeClassifier::new(&model);
        let mut builder = SchemaRegistryBuilder::new();
        SchemaExtractor::new(&model, &classifier, &mut builder)
            .extract("User")
            .unwrap();
        SchemaGraph::from_registry(&builder.freeze())
    }

    #[test]
    fn test_nodes_and_edges() {
        let graph = graph();
        assert_eq!(graph.type_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        let neighbors = graph.neighbors("User");
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].0, "address");
        assert_eq!(neighbors[1].1, "Order");
    }

    #[test]
    fn test_cycles() {
        let graph = graph();
        assert_eq!(graph.cycles(), vec![vec!["Order".to_string(), "User".to_string()]]);
    }

    #[test]
    fn test_to_dot() {
        let dot = graph().to_dot();
        assert!(dot.starts_with("digraph SchemaGraph {"));
        assert!(dot.contains("\"User\" -> \"Order\" [label=\"orders\", style=bold];"));
        assert!(dot.contains("\"User\" -> \"Address\" [label=\"address\", style=dashed];"));
    }
}
