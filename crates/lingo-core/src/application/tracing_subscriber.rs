use crate::{extension::TomlTableExt, state::State};
use std::{io, sync::OnceLock};
use tracing::Level;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::writer::MakeWriterExt,
    layer::SubscriberExt,
};

/// Whether the global subscriber has been set.
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Options of the format layer resolved from the env and the `[tracing]` table.
#[derive(Debug, Clone, PartialEq)]
struct TracingOptions<'a> {
    event_format: &'a str,
    level_filter: LevelFilter,
    stdout_max_level: Level,
    env_filter: &'a str,
    ansi_terminal: bool,
    display_target: bool,
    display_filename: bool,
    display_line_number: bool,
    display_span_list: bool,
    flatten_event: bool,
}

impl<'a> TracingOptions<'a> {
    /// Resolves the options for the state.
    fn new(state: &'a State) -> Self {
        let in_dev_mode = state.env().is_dev();
        let mut options = if in_dev_mode {
            Self {
                event_format: "pretty",
                level_filter: LevelFilter::INFO,
                stdout_max_level: Level::DEBUG,
                env_filter: "info,lingo_core=trace,lingo_http=trace",
                ansi_terminal: true,
                display_target: true,
                display_filename: true,
                display_line_number: true,
                display_span_list: false,
                flatten_event: false,
            }
        } else {
            Self {
                event_format: "json",
                level_filter: LevelFilter::WARN,
                stdout_max_level: Level::WARN,
                env_filter: "warn,lingo_core=info,lingo_http=info",
                ansi_terminal: false,
                display_target: true,
                display_filename: false,
                display_line_number: false,
                display_span_list: false,
                flatten_event: false,
            }
        };
        let Some(config) = state.get_config("tracing") else {
            return options;
        };
        if let Some(format) = config.get_str("format") {
            options.event_format = format;
        }
        if let Some(level) = config.get_str("level") {
            match (level.parse::<Level>(), level.parse::<LevelFilter>()) {
                (Ok(level), Ok(filter)) => {
                    options.stdout_max_level = level;
                    options.level_filter = filter;
                }
                _ => tracing::warn!(level, "invalid tracing level"),
            }
        }
        if let Some(filter) = config.get_str("filter") {
            options.env_filter = filter;
        }
        if let Some(ansi) = config.get_bool("ansi") {
            options.ansi_terminal = ansi;
        }
        if let Some(display_target) = config.get_bool("display-target") {
            options.display_target = display_target;
        }
        if let Some(display_filename) = config.get_bool("display-filename") {
            options.display_filename = display_filename;
        }
        if let Some(display_line_number) = config.get_bool("display-line-number") {
            options.display_line_number = display_line_number;
        }
        if let Some(display_span_list) = config.get_bool("display-span-list") {
            options.display_span_list = display_span_list;
        }
        if let Some(flatten_event) = config.get_bool("flatten-event") {
            options.flatten_event = flatten_event;
        }
        options
    }
}

/// Initializes the tracing subscriber for the state.
///
/// Events are written to stdout in the `pretty` format for the `dev` environment
/// and as structured `json` otherwise. The `[tracing]` table can override it:
///
/// ```toml
/// [tracing]
/// format = "json"
/// level = "info"
/// filter = "info,lingo_core=debug"
/// ansi = false
/// display-target = true
/// display-filename = false
/// display-line-number = false
/// display-span-list = false
/// flatten-event = true
/// ```
///
/// Only the first call installs a subscriber; later calls emit a warning.
pub fn init_tracing(state: &State) {
    if TRACING_INITIALIZED.get().is_some() {
        tracing::warn!("tracing subscriber has already been initialized");
        return;
    }

    let options = TracingOptions::new(state);
    let level_filter = options.level_filter;
    let env_filter = options.env_filter;
    let event_format = options.event_format;

    // Format layer
    let stdout = io::stdout.with_max_level(options.stdout_max_level);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(options.ansi_terminal)
        .with_target(options.display_target)
        .with_file(options.display_filename)
        .with_line_number(options.display_line_number)
        .with_writer(stdout);

    let env_filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .parse(env_filter)
        .unwrap_or_else(|err| {
            tracing::warn!("fail to parse the env filter `{env_filter}`: {err}");
            EnvFilter::default().add_directive(level_filter.into())
        });
    let subscriber = tracing_subscriber::registry().with(env_filter_layer);
    let result = match event_format {
        "compact" => {
            tracing::subscriber::set_global_default(subscriber.with(fmt_layer.compact()))
        }
        "json" => {
            let json_fmt_layer = fmt_layer
                .json()
                .flatten_event(options.flatten_event)
                .with_current_span(true)
                .with_span_list(options.display_span_list);
            tracing::subscriber::set_global_default(subscriber.with(json_fmt_layer))
        }
        "pretty" => {
            tracing::subscriber::set_global_default(subscriber.with(fmt_layer.pretty()))
        }
        _ => tracing::subscriber::set_global_default(subscriber.with(fmt_layer)),
    };
    match result {
        Ok(()) => {
            let _ = TRACING_INITIALIZED.set(());
            tracing::info!(
                env = state.env().as_str(),
                "tracing subscriber initialized with the `{event_format}` format"
            );
        }
        Err(err) => {
            tracing::warn!("fail to set the default subscriber: {err}");
        }
    }
}
