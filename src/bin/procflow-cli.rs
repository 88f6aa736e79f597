use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Parser, Subcommand, ValueEnum};
use procflow::config::{
    DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_REQUEST_TIMEOUT_SECS, DEFAULT_RENDER_BASE_URL,
    DEFAULT_RENDER_THEME, HttpTimeouts, RenderConfig, normalize_base_url, resolve_webhook_url,
};
use procflow::diagram::{self, DiagramKind};
use procflow::error::ErrorCode;
use procflow::http;
use procflow::render::{DiagramRenderer, InkRenderer, RenderError, raster};
use procflow::routes::diagrams::{GenerateDiagramsBody, GenerateDiagramsResponse};
use procflow::webhook::{WebhookClient, WebhookError, WebhookPayload};
use procflow::wizard::{StepStatus, Wizard, WizardStep};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("response {0} diagram is not a PNG data URI")]
    DataUri(DiagramKind),
    #[error("input is empty: {0}")]
    EmptyInput(String),
}

#[derive(Parser, Debug)]
#[command(name = "procflow-cli", about = "Process diagram generator CLI")]
struct Cli {
    #[arg(long, env = "RENDER_BASE_URL", default_value = DEFAULT_RENDER_BASE_URL)]
    render_base_url: String,

    #[arg(long, env = "RENDER_THEME", default_value = DEFAULT_RENDER_THEME)]
    render_theme: String,

    #[arg(long, help = "Webhook URL [default: WEBHOOK_URL, then POWER_AUTOMATE_WEBHOOK_URL]")]
    webhook_url: Option<String>,

    #[arg(long, env = "HTTP_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(long, env = "HTTP_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    render: RenderConfig,
    timeouts: HttpTimeouts,
    webhook_url: Option<String>,
}

impl CliContext {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            render: RenderConfig {
                base_url: normalize_base_url(&cli.render_base_url),
                theme: cli.render_theme.clone(),
            },
            timeouts: HttpTimeouts { request_secs: cli.timeout_secs, connect_secs: cli.connect_timeout_secs },
            webhook_url: resolve_webhook_url(cli.webhook_url.clone()),
        }
    }

    fn http_client(&self) -> Result<reqwest::Client, CliError> {
        Ok(http::build_client(self.timeouts)?)
    }

    fn renderer(&self) -> Result<InkRenderer, CliError> {
        Ok(InkRenderer::new(&self.render, self.timeouts)?)
    }

    fn webhook(&self) -> Result<WebhookClient, CliError> {
        Ok(WebhookClient::new(self.webhook_url.clone(), self.timeouts)?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the Mermaid source for a step list.
    Build(InputArgs),
    /// Render an SVG preview through the rendering service.
    Preview(RenderArgs),
    /// Render and rasterize a 2x PNG download.
    Download(RenderArgs),
    /// Send both diagrams to the configured webhook.
    Send(PairArgs),
    /// Call a running procflow server's generate-diagrams endpoint.
    Generate(GenerateArgs),
    /// Interactive manual → automation → review flow.
    Wizard(WizardArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Manual,
    Automation,
}

impl From<KindArg> for DiagramKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Manual => Self::Manual,
            KindArg::Automation => Self::Automation,
        }
    }
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    input: String,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long, value_enum)]
    kind: KindArg,

    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PairArgs {
    #[arg(long, help = "Manual steps file, or - for stdin")]
    manual: String,

    #[arg(long, help = "Automation steps file, or - for stdin")]
    automation: String,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    pair: PairArgs,

    #[arg(long, env = "PROCFLOW_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "API_KEY")]
    api_key: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct WizardArgs {
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let ctx = CliContext::from_cli(&cli);

    match cli.command {
        Command::Build(args) => run_build(&args),
        Command::Preview(args) => run_preview(&ctx, args).await,
        Command::Download(args) => run_download(&ctx, args).await,
        Command::Send(args) => run_send(&ctx, &args).await,
        Command::Generate(args) => run_generate(&ctx, args).await,
        Command::Wizard(args) => run_wizard_stdio(&ctx, args).await,
    }
}

// =============================================================================
// ONE-SHOT COMMANDS
// =============================================================================

fn run_build(args: &InputArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    print!("{}", diagram::mermaid(&text));
    Ok(())
}

async fn run_preview(ctx: &CliContext, args: RenderArgs) -> Result<(), CliError> {
    let kind = DiagramKind::from(args.kind);
    let source = diagram::mermaid(&read_input(&args.input)?);
    let svg = ctx.renderer()?.render_svg(&source).await?;
    let path = write_preview(&svg, kind, &args.out_dir)?;
    println!("{}", path.display());
    Ok(())
}

async fn run_download(ctx: &CliContext, args: RenderArgs) -> Result<(), CliError> {
    let kind = DiagramKind::from(args.kind);
    let source = diagram::mermaid(&read_input(&args.input)?);
    let svg = ctx.renderer()?.render_svg(&source).await?;
    let path = raster::write_download(&svg, kind, &args.out_dir)?;
    println!("{}", path.display());
    Ok(())
}

async fn run_send(ctx: &CliContext, args: &PairArgs) -> Result<(), CliError> {
    let webhook = ctx.webhook()?;
    // Fail on missing configuration before reading any input.
    if !webhook.is_configured() {
        return Err(WebhookError::NotConfigured.into());
    }
    let manual = required_input(&args.manual)?;
    let automation = required_input(&args.automation)?;
    let payload = WebhookPayload::new(&diagram::mermaid(&manual), &diagram::mermaid(&automation));
    webhook.send(&payload).await?;
    println!("ok");
    Ok(())
}

async fn run_generate(ctx: &CliContext, args: GenerateArgs) -> Result<(), CliError> {
    let body = GenerateDiagramsBody {
        manual_steps: Some(read_input(&args.pair.manual)?),
        automation_steps: Some(read_input(&args.pair.automation)?),
        api_key: args.api_key,
    };
    let url = format!("{}/generate-diagrams", args.base_url.trim_end_matches('/'));
    let response = ctx.http_client()?.post(url).json(&body).send().await?;

    let status = response.status();
    if !status.is_success() {
        let json: serde_json::Value = response.json().await.unwrap_or_default();
        let message = ["error", "details"]
            .iter()
            .filter_map(|key| json.get(*key).and_then(serde_json::Value::as_str))
            .collect::<Vec<_>>()
            .join(": ");
        return Err(CliError::Server { status: status.as_u16(), message });
    }

    let generated: GenerateDiagramsResponse = response.json().await?;
    for (kind, diagram) in [
        (DiagramKind::Manual, &generated.diagrams.manual),
        (DiagramKind::Automation, &generated.diagrams.automation),
    ] {
        let png = decode_png_data_uri(&diagram.png).ok_or(CliError::DataUri(kind))?;
        let path = args.out_dir.join(kind.download_file_name());
        fs::write(&path, png)?;
        println!("{}", path.display());
    }
    Ok(())
}

fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn required_input(path: &str) -> Result<String, CliError> {
    let text = read_input(path)?;
    if diagram::parse_steps(&text).is_empty() {
        return Err(CliError::EmptyInput(path.to_owned()));
    }
    Ok(text)
}

fn write_preview(svg: &str, kind: DiagramKind, dir: &Path) -> Result<PathBuf, CliError> {
    let path = dir.join(format!("{kind}-process-diagram.svg"));
    fs::write(&path, svg)?;
    Ok(path)
}

fn decode_png_data_uri(uri: &str) -> Option<Vec<u8>> {
    let encoded = uri.strip_prefix("data:image/png;base64,")?;
    STANDARD.decode(encoded).ok()
}

// =============================================================================
// WIZARD
// =============================================================================

const FINISH_MARKER: &str = ".";

enum Block {
    Text(String),
    Back,
    Reset,
    Quit,
}

struct WizardSession<'a> {
    wizard: Wizard,
    renderer: &'a dyn DiagramRenderer,
    webhook: &'a WebhookClient,
    out_dir: PathBuf,
    /// Last successfully rendered SVG per diagram.
    previews: HashMap<DiagramKind, String>,
}

async fn run_wizard_stdio(ctx: &CliContext, args: WizardArgs) -> Result<(), CliError> {
    let renderer = ctx.renderer()?;
    let webhook = ctx.webhook()?;
    let mut session = WizardSession {
        wizard: Wizard::new(),
        renderer: &renderer,
        webhook: &webhook,
        out_dir: args.out_dir,
        previews: HashMap::new(),
    };
    let mut input = BufReader::new(io::stdin());
    let mut output = io::stdout();
    run_wizard(&mut session, &mut input, &mut output).await
}

async fn run_wizard<R: BufRead, W: Write>(
    session: &mut WizardSession<'_>,
    input: &mut R,
    out: &mut W,
) -> Result<(), CliError> {
    let mut shown: Option<WizardStep> = None;

    loop {
        let step = session.wizard.step();
        if shown != Some(step) {
            print_progress(out, &session.wizard)?;
            writeln!(out, "{step}")?;
            shown = Some(step);
        }

        match step {
            WizardStep::CollectingManualSteps | WizardStep::CollectingAutomationSteps => {
                writeln!(out, "Enter one step per line, then '{FINISH_MARKER}'. Commands: :back :reset :quit")?;
                match read_block(input)? {
                    Block::Quit => return Ok(()),
                    Block::Back => {
                        if let Err(e) = session.wizard.back() {
                            writeln!(out, "{e}")?;
                        }
                    }
                    Block::Reset => session.reset(),
                    Block::Text(text) => session.submit(out, step, text)?,
                }
            }
            WizardStep::ReviewingDiagrams => {
                writeln!(out, "Commands: show, preview, download, send, back, reset, quit")?;
                let Some(line) = read_line(input)? else {
                    return Ok(());
                };
                match line.trim() {
                    "show" => session.show(out)?,
                    "preview" => session.preview(out).await?,
                    "download" => session.download(out).await?,
                    "send" => session.send(out).await?,
                    "back" => {
                        session.previews.clear();
                        session.wizard.back().ok();
                    }
                    "reset" => session.reset(),
                    "quit" | "q" => return Ok(()),
                    "" => {}
                    other => writeln!(out, "Unknown command: {other}")?,
                }
            }
        }
    }
}

impl WizardSession<'_> {
    fn reset(&mut self) {
        self.wizard.reset();
        self.previews.clear();
    }

    fn submit<W: Write>(&mut self, out: &mut W, step: WizardStep, text: String) -> Result<(), CliError> {
        let stored = match step {
            WizardStep::CollectingManualSteps => self.wizard.set_manual_steps(text),
            _ => self.wizard.set_automation_steps(text),
        };
        if let Err(e) = stored.and_then(|()| self.wizard.next()) {
            writeln!(out, "Input Required: {e}")?;
        }
        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let Some(diagrams) = self.wizard.diagrams() else {
            return Ok(());
        };
        for kind in DiagramKind::ALL {
            writeln!(out, "== {} ==", kind.title())?;
            write!(out, "{}", diagrams.get(kind))?;
        }
        Ok(())
    }

    async fn preview<W: Write>(&mut self, out: &mut W) -> Result<(), CliError> {
        let Some(diagrams) = self.wizard.diagrams().cloned() else {
            return Ok(());
        };
        for kind in DiagramKind::ALL {
            match self.renderer.render_svg(diagrams.get(kind)).await {
                Ok(svg) => {
                    let path = write_preview(&svg, kind, &self.out_dir)?;
                    self.previews.insert(kind, svg);
                    writeln!(out, "{}: {}", kind.title(), path.display())?;
                }
                Err(e) => {
                    // Keep whatever preview was rendered before.
                    tracing::warn!(%kind, error = %e, code = e.error_code(), "preview render failed");
                    writeln!(out, "{}: preview failed ({e})", kind.title())?;
                }
            }
        }
        Ok(())
    }

    async fn download<W: Write>(&mut self, out: &mut W) -> Result<(), CliError> {
        let Some(diagrams) = self.wizard.diagrams().cloned() else {
            return Ok(());
        };
        for kind in DiagramKind::ALL {
            let svg = match self.previews.get(&kind) {
                Some(svg) => svg.clone(),
                None => match self.renderer.render_svg(diagrams.get(kind)).await {
                    Ok(svg) => {
                        self.previews.insert(kind, svg.clone());
                        svg
                    }
                    Err(e) => {
                        writeln!(out, "{}: download failed ({e})", kind.title())?;
                        continue;
                    }
                },
            };
            match raster::write_download(&svg, kind, &self.out_dir) {
                Ok(path) => writeln!(out, "{}: {}", kind.title(), path.display())?,
                Err(e) => writeln!(out, "{}: download failed ({e})", kind.title())?,
            }
        }
        Ok(())
    }

    async fn send<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        let payload = match self.wizard.webhook_payload() {
            Ok(payload) => payload,
            Err(e) => {
                writeln!(out, "{e}")?;
                return Ok(());
            }
        };
        match self.webhook.send(&payload).await {
            Ok(()) => writeln!(out, "Success: diagrams sent to webhook")?,
            Err(WebhookError::NotConfigured) => {
                writeln!(out, "Configuration Required: set WEBHOOK_URL or pass --webhook-url")?;
            }
            Err(e) => writeln!(out, "Error: failed to send diagrams ({e}). Please try again.")?,
        }
        Ok(())
    }
}

fn print_progress<W: Write>(out: &mut W, wizard: &Wizard) -> io::Result<()> {
    let parts: Vec<String> = wizard
        .progress()
        .iter()
        .map(|(step, status)| {
            let mark = match status {
                StepStatus::Complete => "x".to_owned(),
                StepStatus::Current => format!("{}", step.number()),
                StepStatus::Upcoming => " ".to_owned(),
            };
            format!("[{mark}] {}", step.label())
        })
        .collect();
    writeln!(out, "{}", parts.join(" -- "))
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

fn read_block<R: BufRead>(input: &mut R) -> io::Result<Block> {
    let mut lines: Vec<String> = Vec::new();
    while let Some(line) = read_line(input)? {
        if lines.is_empty() {
            match line.trim() {
                ":back" => return Ok(Block::Back),
                ":reset" => return Ok(Block::Reset),
                ":quit" => return Ok(Block::Quit),
                _ => {}
            }
        }
        if line.trim() == FINISH_MARKER {
            return Ok(Block::Text(lines.join("\n")));
        }
        lines.push(line);
    }
    if lines.is_empty() { Ok(Block::Quit) } else { Ok(Block::Text(lines.join("\n"))) }
}
