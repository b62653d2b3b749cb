#[cfg(test)]
mod stream_tests {
    use crate::api::map::Mapper;
    use crate::api::record::Record;
    use crate::api::reduce::{Reducer, Values};
    use crate::config::stream_config::StreamConfig;
    use crate::core::context::Context;
    use crate::core::engine::Engine;
    use crate::core::harness::StreamTestHarness;
    use crate::core::registry::{JobRegistry, Mode};
    use crate::framework::errors::FerrumStreamError;

    #[derive(Default)]
    struct WordCountMapper;

    impl Mapper for WordCountMapper {
        type KeyOut = String;
        type ValueOut = u64;

        fn map(&mut self, _key: &str, value: &str, ctx: &mut Context<'_, String, u64>) {
            for word in value.to_lowercase().split_whitespace() {
                ctx.emit(word.to_string(), 1);
            }
        }
    }

    #[derive(Default)]
    struct WordCountReducer;

    impl Reducer for WordCountReducer {
        type KeyIn = String;
        type ValueIn = u64;
        type KeyOut = String;
        type ValueOut = u64;

        fn reduce(&mut self, key: String, values: Values<u64>, ctx: &mut Context<'_, String, u64>) {
            ctx.emit(key, values.sum());
        }
    }

    /// Emits `key -> value1|value2|...` so tests can see how values were grouped.
    #[derive(Default)]
    struct JoinReducer;

    impl Reducer for JoinReducer {
        type KeyIn = String;
        type ValueIn = String;
        type KeyOut = String;
        type ValueOut = String;

        fn reduce(
            &mut self,
            key: String,
            values: Values<String>,
            ctx: &mut Context<'_, String, String>,
        ) {
            let joined: Vec<String> = values.collect();
            ctx.emit(key, joined.join("|"));
        }
    }

    /// Echoes its input and reports one counter per record.
    #[derive(Default)]
    struct EchoMapper;

    impl Mapper for EchoMapper {
        type KeyOut = String;
        type ValueOut = String;

        fn map(&mut self, key: &str, value: &str, ctx: &mut Context<'_, String, String>) {
            ctx.emit(key.to_string(), value.to_string());
            ctx.increment("Echo", "records");
        }
    }

    fn pairs(records: Vec<Record<String, u64>>) -> Vec<(String, u64)> {
        records.into_iter().map(Record::into_pair).collect()
    }

    fn run_reduce<R: Reducer>(engine: &Engine, reducer: R, input: &str) -> (String, String) {
        let mut output = Vec::new();
        let mut side_channel = Vec::new();
        engine
            .run_reducer_stream(reducer, &mut input.as_bytes(), &mut output, &mut side_channel)
            .unwrap();
        (
            String::from_utf8(output).unwrap(),
            String::from_utf8(side_channel).unwrap(),
        )
    }

    #[test]
    fn word_count_mapper_emits_in_call_order() {
        let results = StreamTestHarness::run_mapper(
            WordCountMapper,
            vec![
                ("line1", "hello world"),
                ("line2", "hello stream world"),
                ("line3", ""),
            ],
        )
        .unwrap();

        assert_eq!(
            pairs(results),
            vec![
                ("hello".to_string(), 1),
                ("world".to_string(), 1),
                ("hello".to_string(), 1),
                ("stream".to_string(), 1),
                ("world".to_string(), 1),
            ]
        );
    }

    #[test]
    fn word_count_reducer_sums_each_group() {
        let results = StreamTestHarness::run_reducer(
            WordCountReducer,
            vec![
                ("hello".to_string(), vec![1, 1]),
                ("world".to_string(), vec![1, 1]),
                ("stream".to_string(), vec![1]),
            ],
        )
        .unwrap();

        assert_eq!(
            pairs(results),
            vec![
                ("hello".to_string(), 2),
                ("world".to_string(), 2),
                ("stream".to_string(), 1),
            ]
        );
    }

    #[test]
    fn mapper_stream_splits_on_first_tab() {
        let mut output = Vec::new();
        let mut side_channel = Vec::new();
        let input = "k1\tv1\nk2\tv2\twith tab\nbare line\n";

        let summary = Engine::new()
            .run_mapper_stream(EchoMapper, &mut input.as_bytes(), &mut output, &mut side_channel)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "k1\tv1\nk2\tv2\twith tab\nbare line\t\n"
        );
        assert_eq!(
            String::from_utf8(side_channel).unwrap(),
            "reporter:counter:Echo,records,1\n".repeat(3)
        );
        assert_eq!(summary.records_read, 3);
        assert_eq!(summary.records_emitted, 3);
        assert_eq!(summary.counters.get("Echo", "records"), Some(3));
    }

    #[test]
    fn reducer_stream_groups_only_contiguous_keys() {
        let (output, _) = run_reduce(&Engine::new(), JoinReducer, "A\t1\nA\t2\nB\t3\nA\t4\n");
        assert_eq!(output, "A\t1|2\nB\t3\nA\t4\n");
    }

    #[test]
    fn reducer_stream_drops_malformed_lines_silently() {
        let input = "hello\t1\nno_tab_here\nhello\tone\nhello\t2\nworld\t5\n";
        let mut output = Vec::new();
        let mut side_channel = Vec::new();

        let summary = Engine::new()
            .run_reducer_stream(
                WordCountReducer,
                &mut input.as_bytes(),
                &mut output,
                &mut side_channel,
            )
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "hello\t3\nworld\t5\n");
        assert!(side_channel.is_empty());
        assert!(summary.counters.is_empty());
        assert_eq!(summary.records_read, 5);
        assert_eq!(summary.records_dropped, 2);
        assert_eq!(summary.groups, 2);
    }

    #[test]
    fn dropped_counter_is_reported_when_enabled() {
        let engine = Engine::from_config(StreamConfig {
            dropped_counter_enabled: true,
            ..StreamConfig::default()
        });
        let (output, side_channel) =
            run_reduce(&engine, WordCountReducer, "a\t1\nbroken\nb\tx\nb\t2\n");

        assert_eq!(output, "a\t1\nb\t2\n");
        assert_eq!(
            side_channel,
            "reporter:counter:FerrumStream,dropped_records,1\n".repeat(2)
        );
    }

    #[test]
    fn dropped_lines_do_not_split_a_group() {
        let (output, _) = run_reduce(&Engine::new(), JoinReducer, "k\ta\nnot a record\nk\tb\n");
        assert_eq!(output, "k\ta|b\n");
    }

    #[test]
    fn empty_input_never_calls_reduce() {
        let (output, side_channel) = run_reduce(&Engine::new(), JoinReducer, "");
        assert!(output.is_empty());
        assert!(side_channel.is_empty());
    }

    #[test]
    fn harness_reports_counters_and_side_channel() {
        let run = StreamTestHarness::run_mapper_with(
            &Engine::new(),
            EchoMapper,
            vec![("a", "1"), ("b", "2")],
        )
        .unwrap();

        assert_eq!(run.outputs.len(), 2);
        assert_eq!(run.summary.counters.get("Echo", "records"), Some(2));
        assert_eq!(run.side_channel, "reporter:counter:Echo,records,1\n".repeat(2));
    }

    #[test]
    fn harness_regroups_adjacent_equal_keys() {
        let results = StreamTestHarness::run_reducer(
            WordCountReducer,
            vec![
                ("a".to_string(), vec![1]),
                ("a".to_string(), vec![2]),
                ("b".to_string(), vec![]),
                ("c".to_string(), vec![4]),
            ],
        )
        .unwrap();

        assert_eq!(
            pairs(results),
            vec![("a".to_string(), 3), ("c".to_string(), 4)]
        );
    }

    fn registry() -> JobRegistry {
        let mut registry = JobRegistry::new();
        registry
            .register_mapper("WordCountMapper", WordCountMapper::default)
            .register_reducer("WordCountReducer", WordCountReducer::default);
        registry
    }

    #[test]
    fn registry_runs_jobs_by_name() {
        let registry = registry();
        let mut output = Vec::new();
        let mut side_channel = Vec::new();

        let summary = registry
            .run(
                Mode::Map,
                "WordCountMapper",
                &Engine::new(),
                &mut "x\tHello hello\n".as_bytes(),
                &mut output,
                &mut side_channel,
            )
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "hello\t1\nhello\t1\n");
        assert_eq!(summary.records_emitted, 2);
        assert_eq!(registry.names(Mode::Reduce), vec!["WordCountReducer"]);
    }

    #[test]
    fn registry_rejects_unknown_names_per_mode() {
        let registry = registry();
        assert!(matches!(
            registry.lookup(Mode::Reduce, "WordCountMapper"),
            Err(FerrumStreamError::UnknownJob(_))
        ));
        assert!(matches!(
            registry.lookup(Mode::Map, "Nope"),
            Err(FerrumStreamError::UnknownJob(_))
        ));
        assert!(registry.lookup(Mode::Map, "WordCountMapper").is_ok());
    }

    #[test]
    fn mode_parsing_is_case_insensitive() {
        assert_eq!("Map".parse::<Mode>().unwrap(), Mode::Map);
        assert_eq!("reduce".parse::<Mode>().unwrap(), Mode::Reduce);
        assert!(matches!(
            "combine".parse::<Mode>(),
            Err(FerrumStreamError::InvalidMode(_))
        ));
    }
}
