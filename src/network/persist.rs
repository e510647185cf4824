//! Plain-text parameter files.
//!
//! For every layer `i` after the input layer the file holds
//!
//! ```text
//! [layer i bias]
//! b_0 b_1 ... b_{n-1}
//! [layer i weight]
//! w_00 w_01 ... w_0{n-1}
//! ...
//! ```
//!
//! with values written as fixed-point decimals carrying 20 fractional digits.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;
use crate::math::scalar::Scalar;
use crate::network::network::Network;

/// Fractional digits written for every parameter.
pub const PARAMETER_PRECISION: usize = 20;

fn bias_header(layer: usize) -> String {
    format!("[layer {layer} bias]")
}

fn weight_header(layer: usize) -> String {
    format!("[layer {layer} weight]")
}

impl<T: Scalar> Network<T> {
    /// Writes the weights and biases of layers `1..` to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !self.is_compiled() {
            return Err(NnError::Architecture("cannot save an uncompiled network".into()));
        }

        let file = File::create(path).map_err(|e| NnError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_parameters(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| NnError::io(path, e))
    }

    fn write_parameters<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (i, layer) in self.layers().iter().enumerate().skip(1) {
            writeln!(writer, "{}", bias_header(i))?;
            writeln!(writer, "{:.*}", PARAMETER_PRECISION, layer.bias())?;
            writeln!(writer, "{}", weight_header(i))?;
            writeln!(writer, "{:.*}", PARAMETER_PRECISION, layer.weight())?;
        }
        Ok(())
    }

    /// Restores parameters written by [`save`](Network::save) into a compiled
    /// network of the same architecture. On failure the network is untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !self.is_compiled() {
            return Err(NnError::Architecture("cannot load into an uncompiled network".into()));
        }

        let file = File::open(path).map_err(|e| NnError::io(path, e))?;
        let mut reader = ParameterReader {
            path,
            lines: BufReader::new(file).lines(),
            line_no: 0,
        };

        let mut parameters = Vec::with_capacity(self.layer_count() - 1);
        for (i, layer) in self.layers().iter().enumerate().skip(1) {
            let (rows, cols) = layer.weight().shape();

            reader.expect_header(&bias_header(i))?;
            let bias: Matrix<T> = reader.read_matrix(1, cols)?;
            reader.expect_header(&weight_header(i))?;
            let weight: Matrix<T> = reader.read_matrix(rows, cols)?;

            parameters.push((weight, bias));
        }
        reader.expect_end()?;

        for (layer, (weight, bias)) in self.layers_mut().iter_mut().skip(1).zip(parameters) {
            layer.set_parameters(weight, bias)?;
        }
        Ok(())
    }
}

struct ParameterReader<'a, R: BufRead> {
    path: &'a Path,
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<'a, R: BufRead> ParameterReader<'a, R> {
    fn next_line(&mut self) -> Result<String> {
        self.line_no += 1;
        match self.lines.next() {
            Some(Ok(line)) => Ok(line),
            Some(Err(e)) => Err(NnError::io(self.path, e)),
            None => Err(self.error("unexpected end of file")),
        }
    }

    fn error(&self, reason: impl std::fmt::Display) -> NnError {
        NnError::io(self.path, format!("line {}: {reason}", self.line_no))
    }

    fn expect_header(&mut self, expected: &str) -> Result<()> {
        let line = self.next_line()?;
        if line.trim() != expected {
            return Err(self.error(format!("expected `{expected}`, found `{}`", line.trim())));
        }
        Ok(())
    }

    /// Only blank lines may follow the last layer.
    fn expect_end(&mut self) -> Result<()> {
        while let Some(line) = self.lines.next() {
            self.line_no += 1;
            let line = line.map_err(|e| NnError::io(self.path, e))?;
            if !line.trim().is_empty() {
                return Err(self.error(format!("unexpected trailing data `{}`", line.trim())));
            }
        }
        Ok(())
    }

    fn read_matrix<T: Scalar>(&mut self, rows: usize, cols: usize) -> Result<Matrix<T>> {
        let mut values = Vec::with_capacity(rows * cols);
        for _ in 0..rows {
            let line = self.next_line()?;
            let before = values.len();
            for token in line.split_whitespace() {
                let value = token
                    .parse::<T>()
                    .map_err(|_| self.error(format!("`{token}` is not a number")))?;
                values.push(value);
            }
            let found = values.len() - before;
            if found != cols {
                return Err(self.error(format!("expected {cols} values, found {found}")));
            }
        }
        Matrix::from_vec(rows, cols, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::Activation;
    use crate::layers::dense::Layer;
    use crate::loss::loss_type::LossFunction;
    use std::fs;

    fn network(seed: u64) -> Network<f64> {
        let mut net = Network::new(0.05, LossFunction::SquareError).with_seed(seed);
        net.add(Layer::new(3, Activation::Sigmoid))
            .add(Layer::new(2, Activation::Sigmoid))
            .add(Layer::new(2, Activation::Sigmoid));
        net.compile().unwrap();
        net
    }

    #[test]
    fn writes_headers_and_fixed_point_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.model");
        let net = network(1);
        net.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // bias + header + 3 weight rows + header, per layer
        assert_eq!(lines.len(), 2 * 2 + 1 + 3 + 1 + 2);
        assert_eq!(lines[0], "[layer 1 bias]");
        assert_eq!(lines[2], "[layer 1 weight]");
        assert_eq!(lines[6], "[layer 2 bias]");
        for token in lines[1].split(' ') {
            let fraction = token.split('.').nth(1).unwrap();
            assert_eq!(fraction.len(), PARAMETER_PRECISION);
        }
    }

    #[test]
    fn round_trip_restores_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.model");
        let source = network(2);
        source.save(&path).unwrap();

        let mut target = network(3);
        target.load(&path).unwrap();
        for (a, b) in source.layers().iter().zip(target.layers()).skip(1) {
            for (x, y) in a.weight().as_slice().iter().zip(b.weight().as_slice()) {
                assert!((x - y).abs() < 1e-15);
            }
            for (x, y) in a.bias().as_slice().iter().zip(b.bias().as_slice()) {
                assert!((x - y).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let mut net = network(4);
        let err = net.load("/definitely/not/here.model").unwrap_err();
        match err {
            NnError::Io { path, .. } => assert!(path.ends_with("here.model")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_header_is_rejected_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.model");
        network(5).save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap().replace("[layer 2 bias]", "[layer 3 bias]");
        fs::write(&path, text).unwrap();

        let mut net = network(6);
        let before = net.clone();
        let err = net.load(&path).unwrap_err();
        assert!(err.to_string().contains("[layer 2 bias]"), "{err}");
        for (a, b) in before.layers().iter().zip(net.layers()) {
            assert_eq!(a.weight(), b.weight());
            assert_eq!(a.bias(), b.bias());
        }
    }

    #[test]
    fn short_rows_and_garbage_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.model");

        fs::write(&path, "[layer 1 bias]\n0.5\n").unwrap();
        let err = network(7).load(&path).unwrap_err();
        assert!(err.to_string().contains("expected 2 values"), "{err}");

        fs::write(&path, "[layer 1 bias]\n0.5 abc\n").unwrap();
        let err = network(7).load(&path).unwrap_err();
        assert!(err.to_string().contains("not a number"), "{err}");

        fs::write(&path, "[layer 1 bias]\n0.5 0.5\n").unwrap();
        let err = network(7).load(&path).unwrap_err();
        assert!(err.to_string().contains("unexpected end of file"), "{err}");
    }

    #[test]
    fn trailing_lines_are_rejected_but_blank_ones_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.model");
        network(8).save(&path).unwrap();
        let saved = fs::read_to_string(&path).unwrap();

        fs::write(&path, format!("{saved}\n  \n")).unwrap();
        network(9).load(&path).unwrap();

        fs::write(&path, format!("{saved}[layer 3 bias]\n0.1 0.2\n")).unwrap();
        let mut net = network(9);
        let before = net.clone();
        let err = net.load(&path).unwrap_err();
        assert!(err.to_string().contains("unexpected trailing data"), "{err}");
        assert!(err.to_string().contains("line 12"), "{err}");
        for (a, b) in before.layers().iter().zip(net.layers()) {
            assert_eq!(a.weight(), b.weight());
        }
    }
}
