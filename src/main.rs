use anyhow::Context;
use careers_e2e::{harness, scenarios, BrowserKind, SuiteConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "careers-e2e", version, about = "Runs the careers end-to-end scenarios")]
struct Cli {
    /// Browser to drive
    #[arg(long, value_enum, ignore_case = true, env = "E2E_BROWSER")]
    browser: Option<BrowserKind>,

    /// JSON suite configuration; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    headless: bool,

    /// geckodriver endpoint for Firefox runs
    #[arg(long)]
    webdriver_url: Option<String>,

    #[arg(long)]
    screenshots_dir: Option<PathBuf>,

    /// Only run scenarios whose id contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Print scenario ids and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn suite_config(&self) -> anyhow::Result<SuiteConfig> {
        let mut config = SuiteConfig::load(self.config.as_deref())
            .with_context(|| format!("loading configuration {:?}", self.config))?;

        if let Some(kind) = self.browser {
            config.browser.kind = kind;
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = url.clone();
        }
        if let Some(dir) = &self.screenshots_dir {
            config.screenshots_dir = dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("careers_e2e=info")),
        )
        .init();

    let cli = Cli::parse();
    let selected = scenarios::matching(cli.filter.as_deref());

    if cli.list {
        for scenario in &selected {
            println!("{}", scenario.id);
        }
        return Ok(());
    }
    if selected.is_empty() {
        anyhow::bail!("no scenario matches {:?}", cli.filter);
    }

    let config = cli.suite_config()?;
    info!(
        browser = %config.browser.kind,
        headless = config.browser.headless,
        scenarios = selected.len(),
        "starting run"
    );

    let mut failed = Vec::new();
    for scenario in selected {
        let report = harness::run_test(&config, scenario.id, scenario.run).await;
        match report.failure() {
            None => info!(test_id = scenario.id, duration_ms = report.duration_ms, "PASSED"),
            Some(reason) => {
                error!(
                    test_id = scenario.id,
                    reason,
                    screenshot = ?report.screenshot,
                    "FAILED"
                );
                failed.push(scenario.id);
            }
        }
        if report.teardown.failed() {
            error!(test_id = scenario.id, "teardown did not complete cleanly");
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} scenario(s) failed: {}", failed.len(), failed.join(", "));
    }
    info!("all scenarios passed");
    Ok(())
}
