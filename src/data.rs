//! Labelled training data and the delimited file format it is loaded from.
//!
//! Every line of a training file holds one sample as `input;target`, where
//! both vectors are comma separated decimals:
//!
//! ```text
//! 1,0;1
//! 0,1;0
//! ```

use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use itertools::Itertools;
use ndarray::{Array1, ArrayView1};

use crate::{Error, Result};

/// An input vector and the output the network should produce for it.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingSample {
    input: Array1<f64>,
    target: Array1<f64>,
}

impl TrainingSample {
    pub fn new<I, T>(input: I, target: T) -> Self
    where
        I: Into<Array1<f64>>,
        T: Into<Array1<f64>>,
    {
        TrainingSample {
            input: input.into(),
            target: target.into(),
        }
    }

    pub fn input(&self) -> ArrayView1<f64> {
        self.input.view()
    }

    pub fn target(&self) -> ArrayView1<f64> {
        self.target.view()
    }

    /// Bit patterns of every component, used to recognise duplicates.
    fn key(&self) -> Vec<u64> {
        self.input
            .iter()
            .chain(self.target.iter())
            .map(|x| x.to_bits())
            .collect()
    }
}

/// A set of samples sharing one input and one target dimension.
///
/// Samples keep their insertion order. Inserting a pair identical to one
/// already present leaves the set unchanged.
#[derive(Clone, Debug)]
pub struct TrainingSet {
    input_len: usize,
    output_len: usize,
    samples: Vec<TrainingSample>,
    seen: HashSet<Vec<u64>>,
}

impl TrainingSet {
    pub fn new(input_len: usize, output_len: usize) -> Self {
        TrainingSet {
            input_len,
            output_len,
            samples: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Builds a set from `(input, target)` pairs, taking the dimensions
    /// from the first pair.
    pub fn from_pairs<I, T, P>(pairs: P) -> Result<Self>
    where
        I: Into<Array1<f64>>,
        T: Into<Array1<f64>>,
        P: IntoIterator<Item = (I, T)>,
    {
        let mut pairs = pairs
            .into_iter()
            .map(|(input, target)| TrainingSample::new(input, target));
        let Some(first) = pairs.next() else {
            return Ok(TrainingSet::new(0, 0));
        };
        let mut set = TrainingSet::new(first.input.len(), first.target.len());
        set.insert(first)?;
        for sample in pairs {
            set.insert(sample)?;
        }
        Ok(set)
    }

    /// Adds `sample`, returning `false` if an identical sample was
    /// already present.
    pub fn insert(&mut self, sample: TrainingSample) -> Result<bool> {
        if sample.input.len() != self.input_len {
            return Err(Error::DimensionMismatch {
                what: "sample input",
                got: sample.input.len(),
                expected: self.input_len,
            });
        }
        if sample.target.len() != self.output_len {
            return Err(Error::DimensionMismatch {
                what: "sample target",
                got: sample.target.len(),
                expected: self.output_len,
            });
        }
        if !self.seen.insert(sample.key()) {
            return Ok(false);
        }
        self.samples.push(sample);
        Ok(true)
    }

    pub fn input_len(&self) -> usize {
        self.input_len
    }

    pub fn output_len(&self) -> usize {
        self.output_len
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrainingSample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrainingSample> {
        self.samples.iter()
    }

    /// Verifies the set fits a network with the given dimensions. An empty
    /// set fits anything.
    pub fn check_dimensions(&self, input_len: usize, output_len: usize) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if self.input_len != input_len {
            return Err(Error::DimensionMismatch {
                what: "training set input",
                got: self.input_len,
                expected: input_len,
            });
        }
        if self.output_len != output_len {
            return Err(Error::DimensionMismatch {
                what: "training set target",
                got: self.output_len,
                expected: output_len,
            });
        }
        Ok(())
    }

    /// Loads a set from the delimited file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parses a set from delimited text. The first sample fixes the
    /// dimensions; any line that disagrees fails the whole load.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut set: Option<TrainingSet> = None;
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = number + 1;
            if line.trim().is_empty() {
                continue;
            }
            let sample = parse_line(&line, line_no)?;
            let set = set.get_or_insert_with(|| {
                TrainingSet::new(sample.input.len(), sample.target.len())
            });
            if sample.input.len() != set.input_len || sample.target.len() != set.output_len {
                return Err(Error::MalformedTrainingFile {
                    line: line_no,
                    reason: format!(
                        "found {} inputs and {} targets, expected {} and {}",
                        sample.input.len(),
                        sample.target.len(),
                        set.input_len,
                        set.output_len
                    ),
                });
            }
            set.insert(sample)?;
        }
        set.ok_or_else(|| Error::MalformedTrainingFile {
            line: 0,
            reason: "no samples found".to_string(),
        })
    }
}

impl<'a> IntoIterator for &'a TrainingSet {
    type Item = &'a TrainingSample;
    type IntoIter = std::slice::Iter<'a, TrainingSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<TrainingSample> {
    let (input, target) = line
        .split(';')
        .collect_tuple()
        .ok_or_else(|| Error::MalformedTrainingFile {
            line: line_no,
            reason: "expected exactly one ';' between input and target".to_string(),
        })?;
    let input = parse_vector(input, line_no)?;
    let target = parse_vector(target, line_no)?;
    Ok(TrainingSample::new(input, target))
}

fn parse_vector(field: &str, line_no: usize) -> Result<Vec<f64>> {
    field
        .split(',')
        .map(|x| {
            let x = x.trim();
            x.parse::<f64>().map_err(|err| Error::MalformedTrainingFile {
                line: line_no,
                reason: format!("cannot parse {x:?}: {err}"),
            })
        })
        .collect()
}
