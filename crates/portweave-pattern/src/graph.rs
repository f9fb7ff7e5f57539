//! Directed graph view of a pattern
//!
//! Ports become nodes named by their canonical selector, edges become arcs.
//! Unset attributes are written as [`GraphConfig::unset`] and read back as
//! unset, so export followed by import reproduces the pattern.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use portweave_core::{columns, Assign, AttrValue, PortId, PortSpec, WeaveError, WeaveResult};
use portweave_interface::InterfaceConfig;
use portweave_select::{Addressing, PathSelector};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::{Pattern, PatternConfig};

/// Graph export configuration
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
    /// Stand-in for unset attributes
    pub unset: AttrValue,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            unset: AttrValue::Str(String::new()),
        }
    }
}

impl GraphConfig {
    /// Keep unset attributes as they are (`null` in JSON)
    pub fn keep_unset() -> Self {
        GraphConfig {
            unset: AttrValue::Unset,
        }
    }
}

/// Port node
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortNode {
    /// Canonical selector of the port
    pub id: String,
    pub attrs: BTreeMap<String, AttrValue>,
}

/// Connection arc
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnEdge {
    pub attrs: BTreeMap<String, AttrValue>,
}

pub type PatternGraph = DiGraph<PortNode, ConnEdge>;

impl Pattern {
    /// Export ports and edges as a directed graph.
    ///
    /// Arcs carry every edge attribute except `conn`.
    pub fn to_graph(&self, config: &GraphConfig) -> PatternGraph {
        let interface = self.interface();
        let addressing = interface.addressing();
        let mut graph = PatternGraph::with_capacity(interface.len(), self.len());
        let mut nodes: HashMap<&PortId, NodeIndex> = HashMap::with_capacity(interface.len());

        for row in interface.iter() {
            let attrs = interface
                .columns()
                .iter()
                .zip(row.values())
                .map(|(c, v)| (c.clone(), substitute(v, config)))
                .collect();
            let idx = graph.add_node(PortNode {
                id: addressing.to_identifier(row.id()),
                attrs,
            });
            nodes.insert(row.id(), idx);
        }

        for ((s, d), vals) in self.edges() {
            let src = endpoint(&mut graph, &mut nodes, s, &**addressing);
            let dst = endpoint(&mut graph, &mut nodes, d, &**addressing);
            let attrs = self
                .columns()
                .iter()
                .zip(vals)
                .filter(|(c, _)| c.as_str() != columns::CONN)
                .map(|(c, v)| (c.clone(), substitute(v, config)))
                .collect();
            graph.add_edge(src, dst, ConnEdge { attrs });
        }
        graph
    }

    /// Export in node-link form: `{"directed": true, "nodes": [...], "links": [...]}`
    pub fn to_node_link_json(&self, config: &GraphConfig) -> Value {
        let graph = self.to_graph(config);
        let nodes: Vec<Value> = graph
            .node_weights()
            .map(|node| {
                let mut obj = Map::new();
                obj.insert("id".to_string(), Value::String(node.id.clone()));
                for (k, v) in &node.attrs {
                    obj.insert(k.clone(), json!(v));
                }
                Value::Object(obj)
            })
            .collect();
        let links: Vec<Value> = graph
            .edge_references()
            .map(|e| {
                let mut obj = Map::new();
                obj.insert("source".to_string(), Value::String(graph[e.source()].id.clone()));
                obj.insert("target".to_string(), Value::String(graph[e.target()].id.clone()));
                for (k, v) in &e.weight().attrs {
                    obj.insert(k.clone(), json!(v));
                }
                Value::Object(obj)
            })
            .collect();
        json!({
            "directed": true,
            "multigraph": false,
            "graph": {},
            "nodes": nodes,
            "links": links,
        })
    }

    /// Rebuild a pattern from a graph produced by [`Pattern::to_graph`].
    ///
    /// Node ids must be port identifiers carrying an integer `interface`
    /// attribute; groups must be numbered `0..n`. Every arc becomes an edge
    /// with `conn = 1` plus its attributes. Parallel arcs are rejected.
    pub fn from_graph(graph: &PatternGraph, config: &GraphConfig) -> WeaveResult<Pattern> {
        let selector = PathSelector::new();
        let mut ids = Vec::with_capacity(graph.node_count());
        let mut groups: BTreeMap<i64, Vec<PortId>> = BTreeMap::new();
        let mut extra_columns = BTreeSet::new();
        for node in graph.node_weights() {
            let id = parse_node_id(&selector, &node.id)?;
            let group = node
                .attrs
                .get(columns::INTERFACE)
                .and_then(AttrValue::as_int)
                .ok_or_else(|| {
                    WeaveError::MalformedTable(format!("node `{}` has no integer interface", node.id))
                })?;
            groups.entry(group).or_default().push(id.clone());
            extra_columns.extend(node.attrs.keys().cloned());
            ids.push(id);
        }
        if !groups.keys().copied().eq(0..groups.len() as i64) {
            return Err(WeaveError::MalformedTable(
                "interface groups must be numbered 0..n".to_string(),
            ));
        }

        let mut interface_columns = InterfaceConfig::default().columns;
        for c in extra_columns {
            if !interface_columns.contains(&c) {
                interface_columns.push(c);
            }
        }
        let mut edge_columns = vec![columns::CONN.to_string()];
        let arc_columns: BTreeSet<&String> = graph.edge_weights().flat_map(|e| e.attrs.keys()).collect();
        edge_columns.extend(arc_columns.into_iter().filter(|c| c.as_str() != columns::CONN).cloned());

        let pattern_config = PatternConfig {
            columns: edge_columns,
            interface_columns,
        };
        let specs = groups.into_values().map(PortSpec::Ids).collect();
        let mut pattern = Pattern::with_addressing(specs, pattern_config, Arc::new(selector))?;

        for (node, id) in graph.node_weights().zip(&ids) {
            for (column, value) in &node.attrs {
                if column == columns::INTERFACE {
                    continue;
                }
                pattern
                    .interface_mut()
                    .set(id, &[column.as_str()], restore(value, config))?;
            }
        }

        let mut arcs = HashSet::with_capacity(graph.edge_count());
        for e in graph.edge_references() {
            if !arcs.insert((e.source(), e.target())) {
                return Err(WeaveError::DuplicateIdentifier(format!(
                    "{} -> {}",
                    ids[e.source().index()],
                    ids[e.target().index()]
                )));
            }
            let mut cells = vec![(columns::CONN.to_string(), AttrValue::Int(1))];
            cells.extend(e.weight().attrs.iter().map(|(k, v)| (k.clone(), restore(v, config))));
            pattern.connect(
                &ids[e.source().index()],
                &ids[e.target().index()],
                &[],
                Assign::Mapping(cells),
            )?;
        }

        debug!(
            ports = pattern.interface().len(),
            edges = pattern.len(),
            "rebuilt pattern from graph"
        );
        Ok(pattern)
    }
}

fn substitute(value: &AttrValue, config: &GraphConfig) -> AttrValue {
    if value.is_unset() {
        config.unset.clone()
    } else {
        value.clone()
    }
}

fn restore(value: &AttrValue, config: &GraphConfig) -> AttrValue {
    if *value == config.unset {
        AttrValue::Unset
    } else {
        value.clone()
    }
}

/// Node of `id`, adding a bare one for edges loaded from outside the port table
fn endpoint<'a>(
    graph: &mut PatternGraph,
    nodes: &mut HashMap<&'a PortId, NodeIndex>,
    id: &'a PortId,
    addressing: &dyn Addressing,
) -> NodeIndex {
    *nodes.entry(id).or_insert_with(|| {
        graph.add_node(PortNode {
            id: addressing.to_identifier(id),
            attrs: BTreeMap::new(),
        })
    })
}

fn parse_node_id(selector: &PathSelector, raw: &str) -> WeaveResult<PortId> {
    if !selector.is_identifier(raw) {
        return Err(WeaveError::MalformedTable(format!(
            "node `{}` is not a port identifier",
            raw
        )));
    }
    selector
        .make_index(raw)?
        .into_iter()
        .next()
        .ok_or_else(|| WeaveError::MalformedTable(format!("node `{}` is empty", raw)))
}
