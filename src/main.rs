use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use molar::api;
use molar::assets::AssetLoader;
use molar::models::{AnalysisRequest, AppConfig, EnhanceParams, FocusArea, PatientRecord};
use molar::server;
use molar::services::{credentials, form_collector, image_pipeline, prompt_builder};
use molar::services::{AnalysisClient, GeminiClient};

#[derive(Parser)]
#[command(name = "molar")]
#[command(about = "Molar - dental X-ray enhancement and AI-assisted analysis")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Enhance an X-ray and write the result as a grayscale PNG
    Enhance {
        /// Input image (JPEG or PNG)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Denoising strength (1-20)
        #[arg(long)]
        denoise: Option<u8>,

        /// CLAHE clip limit (1.0-5.0)
        #[arg(long)]
        contrast: Option<f32>,
    },
    /// Print the analysis prompt for a patient record
    Prompt {
        /// Patient record as YAML (form defaults if omitted)
        #[arg(short, long)]
        patient: Option<PathBuf>,

        /// Focus area, e.g. "Cavity Detection" (repeatable)
        #[arg(short, long)]
        focus: Vec<FocusArea>,
    },
    /// Enhance an X-ray and ask the model for an analysis
    Analyze {
        /// Input image (JPEG or PNG)
        #[arg(short, long)]
        input: PathBuf,

        /// Patient record as YAML (form defaults if omitted)
        #[arg(short, long)]
        patient: Option<PathBuf>,

        /// Focus area, e.g. "Bone Density" (repeatable)
        #[arg(short, long)]
        focus: Vec<FocusArea>,

        /// Denoising strength (1-20)
        #[arg(long)]
        denoise: Option<u8>,

        /// CLAHE clip limit (1.0-5.0)
        #[arg(long)]
        contrast: Option<f32>,
    },
    /// Extract embedded assets to filesystem for customization
    Init {
        /// Extract the page templates
        #[arg(long)]
        templates: bool,

        /// Extract config.yaml
        #[arg(long)]
        config: bool,

        /// Extract all assets
        #[arg(long)]
        all: bool,

        /// Overwrite existing files
        #[arg(long, short)]
        force: bool,

        /// List embedded assets without extracting
        #[arg(long)]
        list: bool,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Molar API",
        description = "Dental X-ray enhancement and AI-assisted analysis",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(api::enhance_image, api::build_prompt, api::analyze_image,),
    components(schemas(
        api::EnhanceResponse,
        api::PromptRequest,
        api::PromptResponse,
        api::AnalyzeRequest,
        api::AnalyzeResponse,
    )),
    tags(
        (name = "Imaging", description = "X-ray enhancement"),
        (name = "Analysis", description = "Prompt building and model analysis")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Enhance {
            input,
            output,
            denoise,
            contrast,
        }) => run_enhance_command(&input, &output, denoise, contrast).await,
        Some(Commands::Prompt { patient, focus }) => run_prompt_command(patient.as_deref(), &focus),
        Some(Commands::Analyze {
            input,
            patient,
            focus,
            denoise,
            contrast,
        }) => run_analyze_command(&input, patient.as_deref(), focus, denoise, contrast).await,
        Some(Commands::Init {
            templates,
            config,
            all,
            force,
            list,
        }) => run_init_command(templates, config, all, force, list),
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for CLI commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "molar=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Slider values from flags, with config defaults for missing ones
fn resolve_params(
    config: &AppConfig,
    denoise: Option<u8>,
    contrast: Option<f32>,
) -> anyhow::Result<EnhanceParams> {
    let defaults = config.default_params();
    Ok(EnhanceParams::new(
        denoise.unwrap_or(defaults.denoise_strength),
        contrast.unwrap_or(defaults.contrast_limit),
    )?)
}

fn load_patient(path: Option<&Path>) -> anyhow::Result<PatientRecord> {
    let Some(path) = path else {
        return Ok(PatientRecord::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let record: PatientRecord = serde_yaml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid patient record in {}: {e}", path.display()))?;
    form_collector::validate(&record)?;
    Ok(record)
}

/// Decode, enhance and encode an image file
async fn enhance_file(
    input: &Path,
    params: EnhanceParams,
    max_dimension: u32,
) -> anyhow::Result<molar::models::ImagePanel> {
    let file_name = input.to_string_lossy();
    image_pipeline::check_upload(&file_name, None)?;
    let bytes = std::fs::read(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let original = image_pipeline::load(bytes, max_dimension).await?;
    Ok(image_pipeline::process(original.pixels, params).await?)
}

/// Enhance an image file without a server
async fn run_enhance_command(
    input: &Path,
    output: &Path,
    denoise: Option<u8>,
    contrast: Option<f32>,
) -> anyhow::Result<()> {
    init_cli_logging();

    let config = AppConfig::load_from_assets(&AssetLoader::from_env());
    let params = resolve_params(&config, denoise, contrast)?;
    let enhanced = enhance_file(input, params, config.upload.max_dimension).await?;

    std::fs::write(output, &*enhanced.encoded.png_bytes)?;
    println!(
        "Enhanced {} -> {} ({}x{}, denoise {}, contrast {:.1}, {} bytes)",
        input.display(),
        output.display(),
        enhanced.encoded.width,
        enhanced.encoded.height,
        params.denoise_strength,
        params.contrast_limit,
        enhanced.encoded.png_bytes.len()
    );

    Ok(())
}

/// Print the prompt that would be sent for a patient
fn run_prompt_command(patient: Option<&Path>, focus: &[FocusArea]) -> anyhow::Result<()> {
    init_cli_logging();

    let record = load_patient(patient)?;
    print!("{}", prompt_builder::build(&record, focus));
    Ok(())
}

/// Enhance an image file and print the model's analysis
async fn run_analyze_command(
    input: &Path,
    patient: Option<&Path>,
    focus: Vec<FocusArea>,
    denoise: Option<u8>,
    contrast: Option<f32>,
) -> anyhow::Result<()> {
    init_cli_logging();

    let (api_key, source) = credentials::resolve_from_env()?;
    tracing::info!(%source, "Resolved API key");

    let config = AppConfig::load_from_assets(&AssetLoader::from_env());
    let client = GeminiClient::new(api_key, &config)?;

    let record = load_patient(patient)?;
    let params = resolve_params(&config, denoise, contrast)?;
    let enhanced = enhance_file(input, params, config.upload.max_dimension).await?;

    let request = AnalysisRequest::new(record, focus, Some(enhanced.encoded))?;
    let result = client.analyze(&request).await?;

    println!("### Analysis Results\n\n{}\n", result.as_str());
    println!("### Disclaimer\n\n{}", api::DISCLAIMER);
    Ok(())
}

/// Extract embedded assets to filesystem
fn run_init_command(
    templates: bool,
    config: bool,
    all: bool,
    force: bool,
    list: bool,
) -> anyhow::Result<()> {
    use molar::assets::AssetCategory;

    if list {
        println!("Embedded assets:\n");
        println!("Templates:");
        for f in AssetLoader::list_embedded(AssetCategory::Templates) {
            println!("  {f}");
        }
        println!("\nConfig:");
        for f in AssetLoader::list_embedded(AssetCategory::Config) {
            println!("  {f}");
        }
        return Ok(());
    }

    // Determine which categories to extract
    let mut categories = Vec::new();
    if all || templates {
        categories.push(AssetCategory::Templates);
    }
    if all || config {
        categories.push(AssetCategory::Config);
    }

    if categories.is_empty() {
        eprintln!("No categories specified. Use --all, --templates, or --config");
        eprintln!("\nRun 'molar init --list' to see embedded assets.");
        std::process::exit(1);
    }

    let report = AssetLoader::from_env().init(&categories, force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    if report.written.is_empty() && report.skipped.is_empty() {
        println!("No files to extract.");
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    use molar::assets::AssetCategory;

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let templates_dir = std::env::var("TEMPLATES_DIR").ok();
    let secrets_file = std::env::var("SECRETS_FILE").ok();

    println!("Molar v{VERSION}");
    println!("Dental X-ray enhancement and AI-assisted analysis\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR     = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:8501 (default)")
    );
    println!(
        "  CONFIG_FILE   = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  TEMPLATES_DIR = {}",
        templates_dir.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  SECRETS_FILE  = {}",
        secrets_file
            .as_deref()
            .unwrap_or(credentials::DEFAULT_SECRETS_FILE)
    );

    println!("\nAsset Sources:");
    let config_source = match config_file {
        Some(ref path) if Path::new(path).exists() => path.to_string(),
        Some(_) => "embedded (file not found)".to_string(),
        None => "embedded".to_string(),
    };
    println!("  Config:    {config_source}");

    let embedded = AssetLoader::list_embedded(AssetCategory::Templates).len();
    match templates_dir {
        Some(ref path) if Path::new(path).exists() => {
            println!("  Templates: {path} ({embedded} embedded)")
        }
        _ => println!("  Templates: embedded ({embedded})"),
    }

    let config = AppConfig::load_from_assets(&AssetLoader::from_env());
    println!("\nAnalysis:");
    println!("  Model:      {}", config.model);
    println!("  Endpoint:   {}", config.api_base_url);
    println!("  Send image: {}", config.analysis.send_image);
    let credential = match credentials::resolve_from_env() {
        Ok((_, source)) => format!("found ({source})"),
        Err(e) => format!("missing ({e})"),
    };
    println!("  API key:    {credential}");

    println!("\nCommands:");
    println!("  molar serve     Start the HTTP server");
    println!("  molar enhance   Enhance an X-ray to a PNG file");
    println!("  molar prompt    Print the analysis prompt for a patient");
    println!("  molar analyze   Enhance and analyze an X-ray from the command line");
    println!("  molar init      Extract embedded assets");
    println!("\nRun 'molar --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "molar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let asset_loader = AssetLoader::from_env();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8501".to_string());

    match asset_loader.seed_if_configured() {
        Ok(report) if !report.is_empty() => {
            tracing::info!(
                templates = report.templates_seeded.len(),
                config = report.config_seeded,
                "Seeded empty locations with embedded assets"
            );
        }
        Err(e) => {
            tracing::warn!(%e, "Failed to seed assets");
        }
        _ => {}
    }

    // Without a credential there is nothing to serve
    let (api_key, source) = credentials::resolve_from_env()?;
    tracing::info!(%source, "Resolved API key");

    let config = AppConfig::load_from_assets(&asset_loader);
    let analyst: Arc<dyn AnalysisClient> = Arc::new(GeminiClient::new(api_key, &config)?);
    tracing::info!(model = analyst.model(), "Analysis client ready");

    let state = server::create_app_state(&asset_loader, config, analyst)?;

    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Molar server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
