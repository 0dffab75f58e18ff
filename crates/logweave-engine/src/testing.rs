//! Scripted sources for exercising chunk boundaries and I/O failures.

use std::collections::VecDeque;
use std::io;

use crate::input::{LineSource, LogInput};

#[derive(Clone, Debug)]
pub(crate) enum Step {
    /// Deliver these bytes as one read, whether or not they end a line.
    Chunk(Vec<u8>),
    /// Fail the read.
    Fail,
}

pub(crate) fn chunk(bytes: &str) -> Step {
    Step::Chunk(bytes.as_bytes().to_vec())
}

pub(crate) struct ScriptedSource {
    steps: VecDeque<Step>,
}

impl ScriptedSource {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
        }
    }
}

impl LineSource for ScriptedSource {
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        match self.steps.pop_front() {
            None => Ok(0),
            Some(Step::Chunk(bytes)) => {
                buf.extend_from_slice(&bytes);
                Ok(bytes.len())
            }
            Some(Step::Fail) => Err(io::Error::new(io::ErrorKind::Other, "scripted failure")),
        }
    }
}

/// A [`LogInput`] replaying a fixed script on every open.
#[derive(Clone, Debug)]
pub(crate) struct ScriptedInput {
    pub(crate) name: String,
    pub(crate) steps: Vec<Step>,
    pub(crate) unopenable: bool,
}

impl ScriptedInput {
    pub(crate) fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps,
            unopenable: false,
        }
    }

    pub(crate) fn unopenable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
            unopenable: true,
        }
    }
}

impl LogInput for ScriptedInput {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn size_hint(&self) -> u64 {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Chunk(bytes) => bytes.len() as u64,
                Step::Fail => 0,
            })
            .sum()
    }

    fn open(&self) -> io::Result<Box<dyn LineSource>> {
        if self.unopenable {
            return Err(io::Error::new(io::ErrorKind::NotFound, "scripted open failure"));
        }
        Ok(Box::new(ScriptedSource::new(self.steps.clone())))
    }
}
