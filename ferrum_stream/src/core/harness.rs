//! In-memory test harness.
//!
//! Runs mappers and reducers through the same engine, emit and grouping code
//! as a real stream run, but with in-memory sinks instead of the process
//! standard streams. The emitted bytes are parsed back into typed records.

use crate::api::map::Mapper;
use crate::api::record::{Parsable, Record};
use crate::api::reduce::Reducer;
use crate::core::engine::{parse_reducer_line, Engine, ParsedLine, RunSummary};
use crate::framework::errors::Result;
use bytes::{BufMut, BytesMut};

pub type TestOutput<K, V> = Record<K, V>;

/// Everything a harness run produced.
#[derive(Debug, Clone)]
pub struct HarnessRun<K, V> {
    pub outputs: Vec<TestOutput<K, V>>,
    pub summary: RunSummary,
    /// Raw side channel text (`reporter:` lines).
    pub side_channel: String,
}

pub struct StreamTestHarness;

impl StreamTestHarness {
    /// Feeds each (key, value) pair to `mapper` and returns what it emitted.
    pub fn run_mapper<M, I, KIn, VIn>(
        mapper: M,
        input: I,
    ) -> Result<Vec<TestOutput<M::KeyOut, M::ValueOut>>>
    where
        M: Mapper,
        M::KeyOut: Parsable,
        M::ValueOut: Parsable,
        I: IntoIterator<Item = (KIn, VIn)>,
        KIn: Into<String>,
        VIn: Into<String>,
    {
        Ok(Self::run_mapper_with(&Engine::new(), mapper, input)?.outputs)
    }

    /// Feeds each (key, values) group to `reducer` and returns what it
    /// emitted.
    ///
    /// This is not one `reduce` call per supplied group. Groups are
    /// flattened and regrouped by the engine, exactly as stream input is, so
    /// two adjacent groups with equal keys reach the reducer as one group,
    /// and a group with no values is never reduced.
    pub fn run_reducer<R, I>(
        reducer: R,
        input: I,
    ) -> Result<Vec<TestOutput<R::KeyOut, R::ValueOut>>>
    where
        R: Reducer,
        R::KeyIn: Clone,
        R::KeyOut: Parsable,
        R::ValueOut: Parsable,
        I: IntoIterator<Item = (R::KeyIn, Vec<R::ValueIn>)>,
    {
        Ok(Self::run_reducer_with(&Engine::new(), reducer, input)?.outputs)
    }

    /// Like [`StreamTestHarness::run_mapper`], with an explicit engine and
    /// the full run details.
    pub fn run_mapper_with<M, I, KIn, VIn>(
        engine: &Engine,
        mapper: M,
        input: I,
    ) -> Result<HarnessRun<M::KeyOut, M::ValueOut>>
    where
        M: Mapper,
        M::KeyOut: Parsable,
        M::ValueOut: Parsable,
        I: IntoIterator<Item = (KIn, VIn)>,
        KIn: Into<String>,
        VIn: Into<String>,
    {
        let mut output = BytesMut::new().writer();
        let mut side_channel = BytesMut::new().writer();

        let records = input
            .into_iter()
            .map(|(key, value)| -> Result<(String, String)> { Ok((key.into(), value.into())) });
        let summary = engine.map_records(mapper, records, &mut output, &mut side_channel)?;

        Ok(HarnessRun {
            outputs: parse_output(&output.into_inner()),
            summary,
            side_channel: String::from_utf8_lossy(&side_channel.into_inner()).into_owned(),
        })
    }

    /// Like [`StreamTestHarness::run_reducer`], with an explicit engine and
    /// the full run details.
    pub fn run_reducer_with<R, I>(
        engine: &Engine,
        reducer: R,
        input: I,
    ) -> Result<HarnessRun<R::KeyOut, R::ValueOut>>
    where
        R: Reducer,
        R::KeyIn: Clone,
        R::KeyOut: Parsable,
        R::ValueOut: Parsable,
        I: IntoIterator<Item = (R::KeyIn, Vec<R::ValueIn>)>,
    {
        let mut output = BytesMut::new().writer();
        let mut side_channel = BytesMut::new().writer();

        let records = input.into_iter().flat_map(|(key, values)| {
            values
                .into_iter()
                .map(move |value| Ok(ParsedLine::Record(key.clone(), value)))
        });
        let summary = engine.reduce_records(reducer, records, &mut output, &mut side_channel)?;

        Ok(HarnessRun {
            outputs: parse_output(&output.into_inner()),
            summary,
            side_channel: String::from_utf8_lossy(&side_channel.into_inner()).into_owned(),
        })
    }
}

/// Parses emitted `key\tvalue` lines back into records, skipping any line
/// that does not parse.
fn parse_output<K: Parsable, V: Parsable>(bytes: &[u8]) -> Vec<TestOutput<K, V>> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| parse_reducer_line(line).ok())
        .map(|(key, value)| Record::new(key, value))
        .collect()
}
