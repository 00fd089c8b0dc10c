use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "certcraft", version)]
struct Cli {
    /// JSON config file. Environment overrides apply on top of it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a certificate to disk.
    Render(RenderArgs),
    /// Write the preview SVG markup.
    Preview(PreviewArgs),
    /// Append one submission row to the configured store.
    Log(FieldArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct FieldArgs {
    /// Participant name (at most 15 characters).
    #[arg(long)]
    name: String,

    /// Affiliation (at most 20 characters).
    #[arg(long)]
    affiliation: String,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    fields: FieldArgs,

    /// Background image, overriding the config.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Font file (TTF/OTF) for the canvas renderer.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory the artifact is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    fields: FieldArgs,

    #[arg(long)]
    background: Option<PathBuf>,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Bind address, overriding the config.
    #[arg(long)]
    addr: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = certcraft::AppConfig::load(cli.config.as_deref())?;
    if cli.log_json {
        config.logging.json = true;
    }
    certcraft::init_logging(&config.logging);

    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Preview(args) => cmd_preview(config, args),
        Command::Log(args) => cmd_log(&config, args),
        Command::Serve(args) => cmd_serve(config, args),
    }
}

fn request(fields: &FieldArgs) -> anyhow::Result<certcraft::CertificateRequest> {
    Ok(certcraft::CertificateRequest::new(
        fields.name.as_str(),
        fields.affiliation.as_str(),
    )?)
}

fn cmd_render(mut config: certcraft::AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let req = request(&args.fields)?;
    if let Some(bg) = args.background {
        config.assets.background = bg;
    }
    if let Some(font) = args.font {
        config.assets.font = Some(font);
    }

    let compositor = config.build_compositor()?;
    let artifact = compositor.render(&req, &config.background())?;
    let path = artifact.save_in(&args.out_dir)?;

    eprintln!(
        "wrote {} ({}x{}, {} bytes, {:?})",
        path.display(),
        artifact.width(),
        artifact.height(),
        artifact.bytes().len(),
        artifact.strategy(),
    );
    Ok(())
}

fn cmd_preview(mut config: certcraft::AppConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let req = request(&args.fields)?;
    if let Some(bg) = args.background {
        config.assets.background = bg;
    }

    let compositor = config.build_compositor()?;
    let svg = compositor.preview(&req, &config.background())?;
    write_file(&args.out, svg.as_bytes())?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_log(config: &certcraft::AppConfig, args: FieldArgs) -> anyhow::Result<()> {
    let req = certcraft::CertificateRequest::new_required(args.name, args.affiliation)?;
    let logger = config.build_logger();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    let entry = certcraft::LogEntry::now(&req);
    match rt.block_on(logger.append(&entry)) {
        Ok(ack) => eprintln!("logged after {} attempt(s)", ack.attempts),
        // Log failures are reported, not fatal.
        Err(e) => eprintln!("not logged: {e}"),
    }
    Ok(())
}

fn cmd_serve(config: certcraft::AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
    let issuer = certcraft::Issuer::new(
        config.build_compositor()?,
        config.build_logger(),
        config.background(),
    );
    let service = Arc::new(
        certcraft::HttpService::new(issuer)
            .with_submit_wait(Duration::from_millis(config.server.submit_wait_ms)),
    );

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let server = certcraft::service::http::bind(&addr)?;
    certcraft::service::http::serve(server, service, rt.handle());
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
