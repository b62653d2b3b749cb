use crate::api::map::Mapper;
use crate::api::record::Parsable;
use crate::api::reduce::{Reducer, Values};
use crate::config::stream_config::StreamConfig;
use crate::core::context::{Context, Counters};
use crate::core::grouping::Grouper;
use crate::framework::errors::{FerrumStreamError, Result};
use std::io::{BufRead, Write};
use tracing::{debug, info, info_span};
use uuid::Uuid;

/// What a single map or reduce run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub records_read: u64,
    pub records_dropped: u64,
    pub groups: u64,
    pub records_emitted: u64,
    pub counters: Counters,
    pub status: String,
}

/// A reducer input line after parsing: either a typed record or the reason
/// it was dropped.
pub(crate) enum ParsedLine<K, V> {
    Record(K, V),
    Dropped(FerrumStreamError),
}

/// Splits a mapper input line on its first tab. A line without a tab is all
/// key and an empty value.
pub fn split_mapper_line(mut line: String) -> (String, String) {
    match line.find('\t') {
        Some(idx) => {
            let value = line.split_off(idx + 1);
            line.truncate(idx);
            (line, value)
        }
        None => (line, String::new()),
    }
}

/// Parses a reducer input line: text before the first tab is the key, text
/// after it is the value.
pub fn parse_reducer_line<K: Parsable, V: Parsable>(line: &str) -> Result<(K, V)> {
    let (key_text, value_text) = line
        .split_once('\t')
        .ok_or_else(|| FerrumStreamError::InputFormatError(line.to_string()))?;
    let key = K::parse(key_text)
        .map_err(|err| FerrumStreamError::KeyConversionError(err.to_string()))?;
    let value = V::parse(value_text)
        .map_err(|err| FerrumStreamError::ValueConversionError(err.to_string()))?;
    Ok((key, value))
}

/// Reads `\n`-terminated lines, stripping the terminator (and a preceding
/// `\r`). Invalid UTF-8 is replaced rather than failing the run.
fn read_lines<R: BufRead>(input: R) -> impl Iterator<Item = Result<String>> {
    input.split(b'\n').map(|line| -> Result<String> {
        let mut bytes = line?;
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()))
    })
}

/// Drives mappers and reducers over a line stream.
///
/// One engine run owns one [`Context`]; nothing is shared between runs.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: StreamConfig,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    pub fn from_config(config: StreamConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Calls `mapper` once per input line until end of input.
    pub fn run_mapper_stream<M: Mapper>(
        &self,
        mapper: M,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
        side_channel: &mut dyn Write,
    ) -> Result<RunSummary> {
        let records = read_lines(input).map(|line| line.map(split_mapper_line));
        self.map_records(mapper, records, output, side_channel)
    }

    /// Groups adjacent equal keys and calls `reducer` once per group.
    /// Lines that are missing a tab, or whose key or value does not parse,
    /// are dropped.
    pub fn run_reducer_stream<R: Reducer>(
        &self,
        reducer: R,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
        side_channel: &mut dyn Write,
    ) -> Result<RunSummary> {
        let records = read_lines(input).map(|line| {
            line.map(|line| match parse_reducer_line(&line) {
                Ok((key, value)) => ParsedLine::Record(key, value),
                Err(reason) => ParsedLine::Dropped(reason),
            })
        });
        self.reduce_records(reducer, records, output, side_channel)
    }

    pub(crate) fn map_records<M, I>(
        &self,
        mut mapper: M,
        records: I,
        output: &mut dyn Write,
        side_channel: &mut dyn Write,
    ) -> Result<RunSummary>
    where
        M: Mapper,
        I: Iterator<Item = Result<(String, String)>>,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("map", run_id = %run_id);
        let _enter = span.enter();

        let mut ctx = Context::<M::KeyOut, M::ValueOut>::new(output, side_channel);
        let mut records_read = 0u64;

        for record in records {
            let (key, value) = record?;
            records_read += 1;
            mapper.map(&key, &value, &mut ctx);
            ctx.check()?;
        }

        let (counters, status, records_emitted) = ctx.finish()?;
        info!(records_read, records_emitted, "map stream complete");

        Ok(RunSummary {
            run_id,
            records_read,
            records_dropped: 0,
            groups: 0,
            records_emitted,
            counters,
            status,
        })
    }

    pub(crate) fn reduce_records<R, I>(
        &self,
        mut reducer: R,
        records: I,
        output: &mut dyn Write,
        side_channel: &mut dyn Write,
    ) -> Result<RunSummary>
    where
        R: Reducer,
        I: Iterator<Item = Result<ParsedLine<R::KeyIn, R::ValueIn>>>,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("reduce", run_id = %run_id);
        let _enter = span.enter();

        let mut ctx = Context::<R::KeyOut, R::ValueOut>::new(output, side_channel);
        let mut grouper = Grouper::new();
        let mut records_read = 0u64;
        let mut records_dropped = 0u64;
        let mut groups = 0u64;

        for record in records {
            records_read += 1;
            match record? {
                ParsedLine::Record(key, value) => {
                    if let Some((key, values)) = grouper.push(key, value) {
                        groups += 1;
                        reduce_group(&mut reducer, key, values, &mut ctx)?;
                    }
                }
                ParsedLine::Dropped(reason) => {
                    records_dropped += 1;
                    debug!(%reason, "dropping reducer input line");
                    if self.config.dropped_counter_enabled {
                        ctx.increment(
                            &self.config.dropped_counter_group,
                            &self.config.dropped_counter_name,
                        );
                    }
                }
            }
        }

        if let Some((key, values)) = grouper.finish() {
            groups += 1;
            reduce_group(&mut reducer, key, values, &mut ctx)?;
        }

        let (counters, status, records_emitted) = ctx.finish()?;
        info!(
            records_read,
            records_dropped, groups, records_emitted, "reduce stream complete"
        );

        Ok(RunSummary {
            run_id,
            records_read,
            records_dropped,
            groups,
            records_emitted,
            counters,
            status,
        })
    }
}

fn reduce_group<R: Reducer>(
    reducer: &mut R,
    key: R::KeyIn,
    values: Vec<R::ValueIn>,
    ctx: &mut Context<'_, R::KeyOut, R::ValueOut>,
) -> Result<()> {
    debug!(values = values.len(), "closing group");
    reducer.reduce(key, Values::new(values), ctx);
    ctx.check()
}
