use crate::api::map::Mapper;
use crate::api::reduce::Reducer;
use crate::core::engine::{Engine, RunSummary};
use crate::framework::errors::{FerrumStreamError, Result};
use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Map,
    Reduce,
}

impl FromStr for Mode {
    type Err = FerrumStreamError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "map" => Ok(Mode::Map),
            "reduce" => Ok(Mode::Reduce),
            _ => Err(FerrumStreamError::InvalidMode(format!(
                "mode must be 'map' or 'reduce', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Map => write!(f, "map"),
            Mode::Reduce => write!(f, "reduce"),
        }
    }
}

/// A registered job with its concrete mapper or reducer type erased.
pub type JobRunner =
    Box<dyn Fn(&Engine, &mut dyn BufRead, &mut dyn Write, &mut dyn Write) -> Result<RunSummary>>;

/// Maps job names to factories for mapper and reducer jobs.
///
/// Populated once at startup; a name that is not registered for the
/// requested mode is an `UnknownJob` error.
#[derive(Default)]
pub struct JobRegistry {
    mappers: HashMap<String, JobRunner>,
    reducers: HashMap<String, JobRunner>,
}

impl JobRegistry {
    pub fn new() -> Self {
        JobRegistry::default()
    }

    pub fn register_mapper<M, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        M: Mapper + 'static,
        F: Fn() -> M + 'static,
    {
        let runner: JobRunner = Box::new(
            move |engine: &Engine,
                  input: &mut dyn BufRead,
                  output: &mut dyn Write,
                  side_channel: &mut dyn Write| {
                engine.run_mapper_stream(factory(), input, output, side_channel)
            },
        );
        self.mappers.insert(name.to_string(), runner);
        self
    }

    pub fn register_reducer<R, F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        R: Reducer + 'static,
        F: Fn() -> R + 'static,
    {
        let runner: JobRunner = Box::new(
            move |engine: &Engine,
                  input: &mut dyn BufRead,
                  output: &mut dyn Write,
                  side_channel: &mut dyn Write| {
                engine.run_reducer_stream(factory(), input, output, side_channel)
            },
        );
        self.reducers.insert(name.to_string(), runner);
        self
    }

    pub fn lookup(&self, mode: Mode, name: &str) -> Result<&JobRunner> {
        let (jobs, kind) = match mode {
            Mode::Map => (&self.mappers, "Mapper"),
            Mode::Reduce => (&self.reducers, "Reducer"),
        };
        jobs.get(name).ok_or_else(|| {
            FerrumStreamError::UnknownJob(format!(
                "{} type '{}' not found, registered: [{}]",
                kind,
                name,
                self.names(mode).join(", ")
            ))
        })
    }

    /// Registered job names for `mode`, sorted.
    pub fn names(&self, mode: Mode) -> Vec<&str> {
        let jobs = match mode {
            Mode::Map => &self.mappers,
            Mode::Reduce => &self.reducers,
        };
        let mut names: Vec<&str> = jobs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn run(
        &self,
        mode: Mode,
        name: &str,
        engine: &Engine,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
        side_channel: &mut dyn Write,
    ) -> Result<RunSummary> {
        let runner = self.lookup(mode, name)?;
        runner(engine, input, output, side_channel)
    }

    /// Runs a job over the process standard streams.
    pub fn run_stdio(&self, mode: Mode, name: &str, engine: &Engine) -> Result<RunSummary> {
        let runner = self.lookup(mode, name)?;
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        runner(
            engine,
            &mut stdin.lock(),
            &mut stdout.lock(),
            &mut std::io::stderr(),
        )
    }
}
