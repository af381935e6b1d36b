//! Drives the catalog widget end-to-end from the command line.
//!
//! Resolves the mount in a host page (or in generated default markup), runs
//! the single catalog load, replays any requested pill clicks, and prints
//! what the page would show: a JSON snapshot by default or the bare grid
//! fragment with `--format html`. Widget-level failures (no mount, timeout,
//! unavailable data) are reported in the output, not as a failing exit code.

use anyhow::{Context, Result, bail};
use catalog_widget::{
    CatalogWidget, FileFetcher, FilePage, Fetcher, HttpResponse, LoadOutcome, MinreqFetcher,
    PageSource, StaticPage, SystemClock, WaitPolicy, WidgetConfig, WidgetSnapshot, WidgetVariant,
    default_host_markup, load_catalog, now_millis,
};
use serde::Serialize;
use std::cell::RefCell;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

const LOG_ENV: &str = "CATALOG_WIDGET_LOG";

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let config = args.config()?;

    let fetcher = ReplayFetcher::new(args.fetcher());
    let millis = now_millis();
    let mut source: Box<dyn PageSource> = match &args.page {
        Some(path) => Box::new(FilePage { path: path.clone() }),
        None => {
            // Generated markup needs the category list, so load first; the
            // widget's own load below replays the same response.
            let categories = match load_catalog(&fetcher, &config.data_url, millis) {
                LoadOutcome::Loaded(document) => document.categories(),
                LoadOutcome::Failed(_) => Vec::new(),
            };
            Box::new(StaticPage(default_host_markup(&config.ids, &categories)))
        }
    };

    let mut clock = SystemClock::start();
    let report = match CatalogWidget::mount(source.as_mut(), &config, &mut clock) {
        Ok(mut widget) => {
            let load_error = widget.load(&fetcher, millis).err().map(|err| err.to_string());
            for tag in &args.selections {
                widget.select(tag);
            }
            Report {
                mounted: true,
                error: load_error,
                snapshot: Some(widget.snapshot()),
            }
        }
        Err(err) => Report {
            mounted: false,
            error: Some(err.to_string()),
            snapshot: None,
        },
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Html => {
            if let Some(snapshot) = &report.snapshot {
                println!("{}", snapshot.grid_html);
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Report {
    mounted: bool,
    error: Option<String>,
    snapshot: Option<WidgetSnapshot>,
}

/// Caches the first response so the catalog is requested at most once.
struct ReplayFetcher {
    inner: Box<dyn Fetcher>,
    recorded: RefCell<Option<Result<HttpResponse, String>>>,
}

impl ReplayFetcher {
    fn new(inner: Box<dyn Fetcher>) -> Self {
        Self {
            inner,
            recorded: RefCell::new(None),
        }
    }
}

impl Fetcher for ReplayFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let mut recorded = self.recorded.borrow_mut();
        let response = recorded
            .get_or_insert_with(|| self.inner.get(url).map_err(|err| format!("{err:#}")));
        match response {
            Ok(response) => Ok(response.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Html,
}

enum WaitChoice {
    Variant,
    Always,
    Never,
}

struct CliArgs {
    page: Option<PathBuf>,
    page_url: Option<Url>,
    data_url: Option<String>,
    data_file: Option<PathBuf>,
    variant: Option<WidgetVariant>,
    selections: Vec<String>,
    wait: WaitChoice,
    timeout: Option<Duration>,
    interval: Option<Duration>,
    format: OutputFormat,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut parsed = CliArgs {
            page: None,
            page_url: None,
            data_url: None,
            data_file: None,
            variant: None,
            selections: Vec::new(),
            wait: WaitChoice::Variant,
            timeout: None,
            interval: None,
            format: OutputFormat::Json,
        };

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--page" => parsed.page = Some(PathBuf::from(next_value(&mut args, "--page")?)),
                "--page-url" => {
                    let raw = next_value(&mut args, "--page-url")?;
                    let url = Url::parse(&raw)
                        .with_context(|| format!("invalid URL for --page-url: {raw}"))?;
                    parsed.page_url = Some(url);
                }
                "--data-url" => parsed.data_url = Some(next_value(&mut args, "--data-url")?),
                "--data-file" => {
                    parsed.data_file = Some(PathBuf::from(next_value(&mut args, "--data-file")?))
                }
                "--variant" => {
                    let raw = next_value(&mut args, "--variant")?;
                    parsed.variant = Some(WidgetVariant::parse(&raw)?);
                }
                "--select" => parsed.selections.push(next_value(&mut args, "--select")?),
                "--wait" => parsed.wait = WaitChoice::Always,
                "--no-wait" => parsed.wait = WaitChoice::Never,
                "--timeout-ms" => {
                    parsed.timeout = Some(parse_millis(&next_value(&mut args, "--timeout-ms")?)?)
                }
                "--interval-ms" => {
                    parsed.interval = Some(parse_millis(&next_value(&mut args, "--interval-ms")?)?)
                }
                "--format" => {
                    parsed.format = match next_value(&mut args, "--format")?.as_str() {
                        "json" => OutputFormat::Json,
                        "html" => OutputFormat::Html,
                        other => bail!("unknown format '{other}' (expected json|html)"),
                    }
                }
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}"),
            }
        }

        if parsed.data_url.is_some() && parsed.data_file.is_some() {
            bail!("--data-url and --data-file are mutually exclusive");
        }
        if parsed.interval == Some(Duration::ZERO) {
            bail!("--interval-ms must be greater than zero");
        }
        Ok(parsed)
    }

    fn config(&self) -> Result<WidgetConfig> {
        let mut config = WidgetConfig::from_env()?;
        if let Some(variant) = self.variant {
            let data_url = config.data_url.clone();
            config = WidgetConfig::for_variant(variant);
            config.data_url = data_url;
        }
        if let Some(url) = &self.data_url {
            config.data_url = url.clone();
        }
        config.page_url = self.page_url.clone();

        config.wait = match self.wait {
            WaitChoice::Variant => config.wait,
            WaitChoice::Always => Some(config.wait.unwrap_or_default()),
            WaitChoice::Never => None,
        };
        if let Some(policy) = config.wait.as_mut() {
            apply_wait_overrides(policy, self.timeout, self.interval);
        }
        Ok(config)
    }

    fn fetcher(&self) -> Box<dyn Fetcher> {
        match &self.data_file {
            Some(path) => Box::new(FileFetcher { path: path.clone() }),
            None => Box::new(MinreqFetcher::default()),
        }
    }
}

fn apply_wait_overrides(
    policy: &mut WaitPolicy,
    timeout: Option<Duration>,
    interval: Option<Duration>,
) {
    if let Some(timeout) = timeout {
        policy.timeout = timeout;
    }
    if let Some(interval) = interval {
        policy.interval = interval;
    }
}

fn parse_millis(raw: &str) -> Result<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("expected milliseconds, got '{raw}'"))?;
    Ok(Duration::from_millis(millis))
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: catalog-widget [--page FILE] [--page-url URL] [--data-url URL | --data-file FILE]\n\
                      [--variant basic|rich] [--select CATEGORY]... [--wait | --no-wait]\n\
                      [--timeout-ms N] [--interval-ms N] [--format json|html]\n\
Mounts the service catalog widget into a host page, loads the catalog once, replays the\n\
requested pill clicks and prints the resulting widget state.\n\
Without --page, default markup is generated with one pill per catalog category.\n\
Without --page-url, card links are judged cross-host against the data URL's host.\n\
Environment: CATALOG_WIDGET_DATA_URL, CATALOG_WIDGET_VARIANT, CATALOG_WIDGET_LOG.\n"
}
