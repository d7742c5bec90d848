//! Plain-text persistence for trained networks.
//!
//! ```text
//! 2,3,1            layer sizes, input layer first
//! 0.25,2,0.5,3,-1  neuron 0: bias, then (target, weight) pairs
//! ...              one line per neuron, in position order
//! ```
//!
//! Floats are written with Rust's shortest round-trip formatting, so a
//! saved network loads back bit for bit.

use std::io::{BufRead, BufReader, BufWriter, Write};

use log::debug;

use crate::error::{try_vec, DataError, Result, TopologyError};
use crate::network::network::{Layout, ParameterStore};
use crate::network::neuron::{Connection, Neuron};

pub fn write_network<W: Write>(store: &ParameterStore, mut writer: W) -> Result<()> {
    let sizes: Vec<String> = store.layout().sizes().iter().map(|n| n.to_string()).collect();
    writeln!(writer, "{}", sizes.join(","))?;
    for neuron in store.neurons() {
        write!(writer, "{}", neuron.bias)?;
        for c in &neuron.connections {
            write!(writer, ",{},{}", c.target, c.weight)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Rebuilds a store from the text format, with `threads` fresh slots.
///
/// Blank lines are ignored. Every connection must point forward and output
/// neurons may not have any.
pub fn read_network<R: BufRead>(reader: R, threads: usize) -> Result<ParameterStore> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            rows.push((index + 1, line.to_string()));
        }
    }

    let mut rows = rows.into_iter();
    let (header_line, header) = rows.next().ok_or(DataError::Empty)?;
    let sizes = header
        .split(',')
        .map(|cell| {
            let cell = cell.trim();
            cell.parse::<usize>().map_err(|_| DataError::Malformed {
                line: header_line,
                reason: format!("'{cell}' is not a layer size"),
            })
        })
        .collect::<std::result::Result<Vec<usize>, DataError>>()?;
    let layout = Layout::new(sizes)?;

    let mut neurons = try_vec(layout.total(), "loading neurons")?;
    for (line_no, row) in rows {
        let position = neurons.len();
        if position == layout.total() {
            return Err(TopologyError::NeuronCountMismatch {
                expected: layout.total(),
                found: position + 1,
            }
            .into());
        }
        neurons.push(parse_neuron(&layout, position, line_no, &row)?);
    }
    if neurons.len() != layout.total() {
        return Err(TopologyError::NeuronCountMismatch {
            expected: layout.total(),
            found: neurons.len(),
        }
        .into());
    }

    debug!("loaded {} neurons in layers {:?}", neurons.len(), layout.sizes());
    ParameterStore::from_neurons(layout, neurons, threads)
}

fn parse_neuron(layout: &Layout, position: usize, line: usize, row: &str) -> Result<Neuron> {
    let cells: Vec<&str> = row.split(',').map(str::trim).collect();
    if cells.len() % 2 == 0 {
        return Err(DataError::Malformed {
            line,
            reason: "expected a bias followed by (target, weight) pairs".to_string(),
        }
        .into());
    }
    let number = |cell: &str| {
        cell.parse::<f64>()
            .map_err(|_| DataError::InvalidNumber { line, value: cell.to_string() })
    };

    let mut neuron = Neuron::new(position, number(cells[0])?);
    let pairs = cells[1..].chunks_exact(2);
    if pairs.len() > 0 && position >= layout.working() {
        return Err(TopologyError::OutputSource { position }.into());
    }
    neuron.connections = try_vec(pairs.len(), "loading connections")?;
    for pair in pairs {
        let target = pair[0].parse::<usize>().map_err(|_| DataError::Malformed {
            line,
            reason: format!("'{}' is not a neuron position", pair[0]),
        })?;
        if target >= layout.total() {
            return Err(TopologyError::PositionOutOfRange { position: target, len: layout.total() }.into());
        }
        if target <= position {
            return Err(TopologyError::BackwardConnection { from: position, to: target }.into());
        }
        neuron.connections.push(Connection::new(target, number(pair[1])?));
    }
    Ok(neuron)
}

impl ParameterStore {
    /// Writes the network to `path` in the text format.
    pub fn save_text(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        write_network(self, BufWriter::new(file))?;
        debug!("saved network to {path}");
        Ok(())
    }

    pub fn load_text(path: &str, threads: usize) -> Result<ParameterStore> {
        let file = std::fs::File::open(path)?;
        read_network(BufReader::new(file), threads)
    }
}
