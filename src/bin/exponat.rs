// CLI - analyze museum object photos from the command line

use exponat::{Analyzer, AnalyzerConfig, BackendKind, ProgressFn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use termimad::{MadSkin, crossterm::style::Color};

const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

fn print_usage() {
    eprintln!("Usage: exponat [OPTIONS] <image>...");
    eprintln!();
    eprintln!("Describe technical museum objects from photographs (.jpg, .jpeg, .png).");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --backend <local|hosted>   Provider to use (default: from config)");
    eprintln!("  --model <name>             Override the configured model");
    eprintln!("  --prompt <file>            Override the built-in instruction prompt");
    eprintln!("  --help                     Show this help");
    eprintln!();
    eprintln!("Config is read from .exponat.json in the current or home directory.");
    eprintln!("The hosted backend reads its key from OPENAI_API_KEY.");
}

fn create_markdown_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.headers[0].set_fg(Color::Cyan);
    skin.headers[1].set_fg(Color::Blue);
    skin.headers[2].set_fg(Color::Green);
    skin.bold.set_fg(Color::White);
    skin.italic.set_fg(Color::Magenta);
    skin
}

fn accepted_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

struct CliArgs {
    backend: Option<BackendKind>,
    model: Option<String>,
    prompt_file: Option<PathBuf>,
    image_paths: Vec<PathBuf>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = CliArgs {
        backend: None,
        model: None,
        prompt_file: None,
        image_paths: Vec::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Err(String::new()),
            "--backend" => {
                let name = args.next().ok_or("--backend needs a value")?;
                parsed.backend = Some(
                    BackendKind::from_name(&name)
                        .ok_or_else(|| format!("unknown backend '{name}'"))?,
                );
            }
            "--model" => {
                parsed.model = Some(args.next().ok_or("--model needs a value")?);
            }
            "--prompt" => {
                parsed.prompt_file = Some(PathBuf::from(
                    args.next().ok_or("--prompt needs a value")?,
                ));
            }
            flag if flag.starts_with("--") => {
                return Err(format!("unknown option '{flag}'"));
            }
            path => parsed.image_paths.push(PathBuf::from(path)),
        }
    }

    if parsed.image_paths.is_empty() {
        return Err("no image files given".to_string());
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {message}");
                eprintln!();
            }
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let mut config = match AnalyzerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(model) = args.model {
        match config.backend {
            BackendKind::Local => config.ollama.model = model,
            BackendKind::Hosted => config.openai.model = model,
        }
    }
    if args.prompt_file.is_some() {
        config.prompt_file = args.prompt_file;
    }

    let mut images = Vec::new();
    for path in &args.image_paths {
        if !accepted_image(path) {
            eprintln!("⚠️  Skipping {} (not .jpg/.jpeg/.png)", path.display());
            continue;
        }
        match std::fs::read(path) {
            Ok(bytes) => {
                println!("📷 {} ({} bytes)", path.display(), bytes.len());
                images.push(bytes);
            }
            Err(e) => {
                eprintln!("Error: cannot read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
    }

    let analyzer = match Analyzer::new(&config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "🚀 Analyzing {} image(s) via the {} backend…",
        images.len(),
        analyzer.backend_kind().as_str()
    );

    let progress: &ProgressFn = &|fraction, stage| {
        println!("⏳ [{:>3.0}%] {stage}", fraction * 100.0);
    };

    let result = analyzer.analyze(&images, Some(progress)).await;

    if result.succeeded {
        println!();
        create_markdown_skin().print_text(&result.text);
        println!();
        ExitCode::SUCCESS
    } else {
        eprintln!("❌ {}", result.into_display_string());
        ExitCode::FAILURE
    }
}
