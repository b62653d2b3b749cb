use crate::api::record::Renderable;
use crate::framework::errors::{FerrumStreamError, Result};
use std::collections::HashMap;
use std::io::Write;
use std::marker::PhantomData;

/// Counter totals keyed by group, then by counter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counters {
    groups: HashMap<String, HashMap<String, u64>>,
}

impl Counters {
    pub fn new() -> Self {
        Counters::default()
    }

    /// Adds `delta` to the (group, name) entry, creating it at zero first.
    pub fn increment(&mut self, group: &str, name: &str, delta: u64) {
        *self
            .groups
            .entry(group.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert(0) += delta;
    }

    pub fn get(&self, group: &str, name: &str) -> Option<u64> {
        self.groups.get(group)?.get(name).copied()
    }

    pub fn group(&self, group: &str) -> Option<&HashMap<String, u64>> {
        self.groups.get(group)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u64)> {
        self.groups.iter().flat_map(|(group, names)| {
            names
                .iter()
                .map(move |(name, total)| (group.as_str(), name.as_str(), *total))
        })
    }
}

/// Per-invocation sink for emitted records, counters and status.
///
/// Records go to the output sink as `key\tvalue\n`, in call order, with no
/// buffering beyond what the sink itself does. Counter and status updates are
/// reported on the side channel using the streaming `reporter:` markers.
///
/// Neither `emit` nor the reporting calls return an error: the first write
/// failure is latched and surfaced by the engine once the current unit of
/// work returns.
pub struct Context<'a, K, V> {
    output: &'a mut dyn Write,
    side_channel: &'a mut dyn Write,
    counters: Counters,
    status: String,
    records_emitted: u64,
    io_error: Option<std::io::Error>,
    _records: PhantomData<fn(K, V)>,
}

impl<'a, K, V> Context<'a, K, V>
where
    K: Renderable,
    V: Renderable,
{
    pub fn new(output: &'a mut dyn Write, side_channel: &'a mut dyn Write) -> Self {
        Context {
            output,
            side_channel,
            counters: Counters::new(),
            status: String::new(),
            records_emitted: 0,
            io_error: None,
            _records: PhantomData,
        }
    }

    pub fn emit(&mut self, key: K, value: V) {
        let line = format!("{}\t{}\n", key.render(), value.render());
        if self.write_output(line.as_bytes()) {
            self.records_emitted += 1;
        }
    }

    /// Adds `delta` to the counter and reports the delta (not the running
    /// total) on the side channel.
    pub fn increment_counter(&mut self, group: &str, name: &str, delta: u64) {
        self.counters.increment(group, name, delta);
        let line = format!("reporter:counter:{},{},{}\n", group, name, delta);
        self.write_side_channel(line.as_bytes());
    }

    /// Shorthand for `increment_counter(group, name, 1)`.
    pub fn increment(&mut self, group: &str, name: &str) {
        self.increment_counter(group, name, 1);
    }

    pub fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        let line = format!("reporter:status:{}\n", message);
        self.write_side_channel(line.as_bytes());
    }

    /// Snapshot of the counter totals accumulated so far.
    pub fn get_counters(&self) -> Counters {
        self.counters.clone()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn records_emitted(&self) -> u64 {
        self.records_emitted
    }

    /// Returns the latched write failure, if any, leaving the context usable.
    pub fn check(&mut self) -> Result<()> {
        match self.io_error.take() {
            Some(err) => Err(FerrumStreamError::from(err)),
            None => Ok(()),
        }
    }

    /// Flushes both sinks and hands back the counters and final status.
    pub fn finish(mut self) -> Result<(Counters, String, u64)> {
        self.check()?;
        self.output.flush()?;
        self.side_channel.flush()?;
        Ok((self.counters, self.status, self.records_emitted))
    }

    fn write_output(&mut self, bytes: &[u8]) -> bool {
        if self.io_error.is_some() {
            return false;
        }
        match self.output.write_all(bytes) {
            Ok(()) => true,
            Err(err) => {
                self.io_error = Some(err);
                false
            }
        }
    }

    fn write_side_channel(&mut self, bytes: &[u8]) {
        if self.io_error.is_some() {
            return;
        }
        if let Err(err) = self.side_channel.write_all(bytes) {
            self.io_error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_writes_tab_separated_lines_in_call_order() {
        let mut out = Vec::new();
        let mut side = Vec::new();
        let mut ctx: Context<String, u64> = Context::new(&mut out, &mut side);

        ctx.emit("b".to_string(), 2);
        ctx.emit("a".to_string(), 1);
        ctx.emit("b".to_string(), 2);
        assert_eq!(ctx.records_emitted(), 3);
        drop(ctx);

        assert_eq!(String::from_utf8(out).unwrap(), "b\t2\na\t1\nb\t2\n");
        assert!(side.is_empty());
    }

    #[test]
    fn counters_accumulate_and_report_each_delta() {
        let mut out = Vec::new();
        let mut side = Vec::new();
        let mut ctx: Context<String, u64> = Context::new(&mut out, &mut side);

        ctx.increment_counter("g", "n", 3);
        ctx.increment_counter("g", "n", 2);
        ctx.increment("g", "other");
        assert_eq!(ctx.get_counters().get("g", "n"), Some(5));
        assert_eq!(ctx.counters().get("g", "other"), Some(1));
        assert_eq!(ctx.counters().get("g", "missing"), None);
        drop(ctx);

        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(side).unwrap(),
            "reporter:counter:g,n,3\nreporter:counter:g,n,2\nreporter:counter:g,other,1\n"
        );
    }

    #[test]
    fn set_status_overwrites_and_reports() {
        let mut out = Vec::new();
        let mut side = Vec::new();
        let mut ctx: Context<String, String> = Context::new(&mut out, &mut side);

        ctx.set_status("Processing...");
        ctx.set_status("Done");
        assert_eq!(ctx.status(), "Done");
        let (_, status, emitted) = ctx.finish().unwrap();
        assert_eq!(status, "Done");
        assert_eq!(emitted, 0);

        assert_eq!(
            String::from_utf8(side).unwrap(),
            "reporter:status:Processing...\nreporter:status:Done\n"
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_latched() {
        let mut out = BrokenPipe;
        let mut side = Vec::new();
        let mut ctx: Context<String, u64> = Context::new(&mut out, &mut side);

        ctx.emit("a".to_string(), 1);
        assert_eq!(ctx.records_emitted(), 0);
        assert!(matches!(ctx.check(), Err(FerrumStreamError::IOError(_))));
        assert!(ctx.check().is_ok());
    }
}
