//! Plain-text readers for graphs and flow networks.
//!
//! Both formats are line oriented. Blank lines and `#` comment lines are
//! skipped everywhere; node identifiers are zero-based indices.
//!
//! Graph files:
//!
//! ```text
//! <node count>
//! <source> <target> [weight]      # weight defaults to 1
//! ```
//!
//! Flow network files carry one balance line per node between the node
//! count and the edge list:
//!
//! ```text
//! <node count>
//! <balance of node 0>
//! ...
//! <balance of node n-1>
//! <source> <target> <cost> <capacity>
//! ```
//!
//! Parse errors report the offending one-based line number so a bad row
//! in a large file can be found without bisecting.

use std::fs;
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::data_structures::{FlowError, FlowNetwork, Graph, GraphError, NodeId};

/// Errors raised while reading graph or network files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is empty; expected a node count on the first line")]
    MissingNodeCount,

    #[error("line {line}: expected a number, got {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: expected {expected} fields, got {found}")]
    FieldCount {
        line: usize,
        expected: &'static str,
        found: usize,
    },

    #[error("expected {expected} balance lines, found {found}")]
    MissingBalances { expected: usize, found: usize },

    #[error("line {line}: {source}")]
    Graph {
        line: usize,
        source: GraphError,
    },

    #[error("line {line}: {source}")]
    Flow {
        line: usize,
        source: FlowError,
    },
}

/// Non-blank, non-comment lines paired with their one-based line number.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_usize(line: usize, token: &str) -> Result<usize, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_f64(line: usize, token: &str) -> Result<f64, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

/// Parses a graph from text. `directed` fixes the edge semantics, which
/// the format itself does not encode.
pub fn parse_graph(text: &str, directed: bool) -> Result<Graph, ParseError> {
    let mut lines = content_lines(text);
    let (line, header) = lines.next().ok_or(ParseError::MissingNodeCount)?;
    let node_count = parse_usize(line, header)?;
    let mut graph = Graph::with_nodes(node_count, directed);

    for (line, row) in lines {
        let fields: Vec<&str> = row.split_whitespace().collect();
        let (source, target, weight) = match fields.as_slice() {
            [s, t] => (s, t, 1.0),
            [s, t, w] => (s, t, parse_f64(line, w)?),
            _ => {
                return Err(ParseError::FieldCount {
                    line,
                    expected: "2 or 3",
                    found: fields.len(),
                })
            }
        };
        let source = NodeId(parse_usize(line, source)?);
        let target = NodeId(parse_usize(line, target)?);
        graph
            .add_edge(source, target, weight)
            .map_err(|source| ParseError::Graph { line, source })?;
    }

    debug!(
        "parsed graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Parses a flow network with per-node balances from text.
pub fn parse_flow_network(text: &str) -> Result<FlowNetwork, ParseError> {
    let mut lines = content_lines(text);
    let (line, header) = lines.next().ok_or(ParseError::MissingNodeCount)?;
    let node_count = parse_usize(line, header)?;

    let mut network = FlowNetwork::with_nodes(0);
    let mut balances = 0;
    while balances < node_count {
        let Some((line, row)) = lines.next() else {
            return Err(ParseError::MissingBalances {
                expected: node_count,
                found: balances,
            });
        };
        network.add_node(parse_f64(line, row)?);
        balances += 1;
    }

    for (line, row) in lines {
        let fields: Vec<&str> = row.split_whitespace().collect();
        let [s, t, cost, capacity] = fields.as_slice() else {
            return Err(ParseError::FieldCount {
                line,
                expected: "4",
                found: fields.len(),
            });
        };
        let source = NodeId(parse_usize(line, s)?);
        let target = NodeId(parse_usize(line, t)?);
        let cost = parse_f64(line, cost)?;
        let capacity = parse_f64(line, capacity)?;
        network
            .add_edge(source, target, capacity, cost)
            .map_err(|source| ParseError::Flow { line, source })?;
    }

    debug!(
        "parsed flow network: {} nodes, {} edges",
        network.node_count(),
        network.edge_count()
    );
    Ok(network)
}

/// Reads and parses a graph file from disk.
pub fn read_graph_file<P: AsRef<Path>>(path: P, directed: bool) -> Result<Graph, ParseError> {
    let text = fs::read_to_string(path)?;
    parse_graph(&text, directed)
}

/// Reads and parses a flow network file from disk.
pub fn read_flow_network_file<P: AsRef<Path>>(path: P) -> Result<FlowNetwork, ParseError> {
    let text = fs::read_to_string(path)?;
    parse_flow_network(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_weighted_graph() {
        let text = "\
# three nodes, weighted triangle
3
0 1 2.5
1 2 1.0
2 0 4
";
        let g = parse_graph(text, false).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.edge_weight(NodeId(0), NodeId(1)), Some(2.5));
        assert_eq!(g.edge_weight(NodeId(1), NodeId(0)), Some(2.5));
    }

    #[test]
    fn missing_weight_defaults_to_one() {
        let g = parse_graph("2\n0 1\n", true).unwrap();
        assert_eq!(g.edge_weight(NodeId(0), NodeId(1)), Some(1.0));
        assert_eq!(g.edge_weight(NodeId(1), NodeId(0)), None);
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let g = parse_graph("\n# header\n2\n\n0 1 3.0\n# trailer\n", false).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn parses_flow_network_with_balances() {
        let text = "\
4
4
0
0
-4
0 1 1 2
0 2 2 2
1 3 3 2
2 3 1 2
";
        let net = parse_flow_network(text).unwrap();
        assert_eq!(net.node_count(), 4);
        assert_eq!(net.edge_count(), 4);
        assert_eq!(net.balance(NodeId(0)), 4.0);
        assert_eq!(net.balance(NodeId(3)), -4.0);
        assert!(net.validate_balanced().is_ok());
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_graph("3\n0 1 1.0\n0 x 1.0\n", false).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 3, .. }));

        let err = parse_graph("2\n0 1 1.0 extra field\n", false).unwrap_err();
        assert!(matches!(err, ParseError::FieldCount { line: 2, .. }));
    }

    #[test]
    fn rejects_edge_to_unknown_node() {
        let err = parse_graph("2\n0 7 1.0\n", false).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Graph {
                line: 2,
                source: GraphError::InvalidNode(NodeId(7)),
            }
        ));
    }

    #[test]
    fn rejects_truncated_balance_block() {
        let err = parse_flow_network("3\n1\n-1\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingBalances {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = parse_graph("", false).unwrap_err();
        assert!(matches!(err, ParseError::MissingNodeCount));
        let err = parse_flow_network("# only comments\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingNodeCount));
    }
}
