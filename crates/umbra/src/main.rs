use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use umbra_e::WebDriverHost;
use umbra_e::webdriver::{DEFAULT_WEBDRIVER_URL, WebDriverClient};
use umbra_engine::ShadowRootSearch;
use umbra_engine::config::{ConfigLoader, UmbraConfig};
use umbra_engine::locator::Locator;
use umbra_engine::protocol::SearchRoot;
use umbra_engine::script::ScriptTemplate;

#[derive(Parser)]
#[command(name = "umbra", version, about = "Find elements across shadow roots")]
struct Args {
    /// Locator descriptor, e.g. "By.cssSelector: .inside"
    descriptor: String,

    /// WebDriver server URL
    #[arg(long, default_value = DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    /// Page to open before searching
    #[arg(long)]
    url: Option<String>,

    /// Descriptor of an element to search under instead of the document
    #[arg(long)]
    root: Option<String>,

    /// Print every match instead of the first
    #[arg(long)]
    all: bool,

    /// Include the shadow reach path with each match
    #[arg(long)]
    with_path: bool,

    /// Config file (defaults to ./umbra.yaml, then ~/.umbra/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Launch the browser in visible mode (not headless)
    #[arg(long)]
    visible: bool,

    /// Debug logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the results.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let prepared = prepare(&args).await?;

    let capabilities = if args.visible {
        None
    } else {
        Some(WebDriverClient::headless_chrome_capabilities())
    };
    let host = WebDriverHost::connect(&args.webdriver_url, capabilities).await?;
    let search = ShadowRootSearch::new(host)
        .with_template(prepared.template)
        .with_options(&prepared.config.search);

    let result = match &args.url {
        Some(url) => match search.host().navigate(url).await {
            Ok(()) => run(&search, &args, &prepared.locator, prepared.root.as_ref()).await,
            Err(e) => Err(e.into()),
        },
        None => run(&search, &args, &prepared.locator, prepared.root.as_ref()).await,
    };

    search.into_host().close().await?;
    result
}

/// Everything that can fail without a browser session.
struct Prepared {
    locator: Locator,
    root: Option<Locator>,
    config: UmbraConfig,
    template: ScriptTemplate,
}

async fn prepare(args: &Args) -> Result<Prepared, Box<dyn std::error::Error>> {
    let locator = Locator::parse(&args.descriptor)?;
    let root = args.root.as_deref().map(Locator::parse).transpose()?;

    let config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    let template = ConfigLoader::load_script(&config).await?;

    Ok(Prepared {
        locator,
        root,
        config,
        template,
    })
}

async fn run(
    search: &ShadowRootSearch<WebDriverHost>,
    args: &Args,
    locator: &Locator,
    root_locator: Option<&Locator>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = match root_locator {
        Some(root_locator) => {
            let root = search.find_element(root_locator).await?;
            info!("Searching under {}", root_locator);
            SearchRoot::from(root.handle)
        }
        None => SearchRoot::Document,
    };

    let lines = match (args.all, args.with_path) {
        (false, false) => vec![serde_json::to_string(
            &search.find_element_in(&root, locator).await?,
        )?],
        (false, true) => vec![serde_json::to_string(
            &search.find_element_with_shadow_path_in(&root, locator).await?,
        )?],
        (true, false) => search
            .find_elements_in(&root, locator)
            .await?
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?,
        (true, true) => search
            .find_elements_with_shadow_path_in(&root, locator)
            .await?
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?,
    };

    info!("{} match(es) for {}", lines.len(), locator);
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args_for(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("umbra").chain(argv.iter().copied())).unwrap()
    }

    fn config_file(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_prepare_parses_descriptors_and_config() {
        let config = config_file("search:\n  annotate: false\n");
        let path = config.path().to_str().unwrap();
        let args = args_for(&[
            "--config",
            path,
            "--root",
            "By.id: shadow-dom-container",
            "By.cssSelector: .inside",
        ]);

        let prepared = prepare(&args).await.unwrap();
        assert_eq!(prepared.locator, Locator::css(".inside"));
        assert_eq!(prepared.root, Some(Locator::id("shadow-dom-container")));
        assert!(!prepared.config.search.annotate);
        assert_eq!(prepared.template.source(), ScriptTemplate::embedded().source());
    }

    #[tokio::test]
    async fn test_prepare_fails_on_missing_script_override() {
        let config = config_file("search:\n  script_path: /nonexistent/umbra/search.js\n");
        let path = config.path().to_str().unwrap();
        let args = args_for(&["--config", path, "By.id: outside-1"]);

        assert!(prepare(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_prepare_rejects_bad_descriptor() {
        let args = args_for(&["--root", "not a descriptor", "By.id: outside-1"]);
        assert!(prepare(&args).await.is_err());
    }
}
