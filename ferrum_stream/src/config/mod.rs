pub mod stream_config;
