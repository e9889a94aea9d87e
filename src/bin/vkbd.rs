// Vkbd CLI
// Loads a layout and replays a script of virtual key interactions

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use vkbd_core::{
    EventRecorder, KeyboardConfig, Layout, Settings, VirtualKeyboard, WidgetEvent,
};

/// Container id the replay keys are registered under
const REPLAY_CONTAINER: &str = "layout";

/// Virtual keyboard event synthesizer
#[derive(Parser, Debug)]
#[command(name = "vkbd")]
#[command(version)]
#[command(about = "Replay virtual keyboard input and print the synthesized key events", long_about = None)]
struct Args {
    /// TOML layout file
    #[arg(short, long, value_name = "LAYOUT")]
    layout: PathBuf,

    /// TOML settings file (defaults to ~/.config/vkbd/settings.toml when present)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Validate the layout and exit
    #[arg(long)]
    check_layout: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Keys to replay: `name` taps, `+name` presses, `-name` releases (put `--` before the first step)
    #[arg(value_name = "STEP")]
    script: Vec<String>,
}

/// One interaction of a replay script
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Tap(String),
    Press(String),
    Release(String),
}

impl Step {
    fn parse(token: &str) -> Result<Self> {
        let step = if let Some(name) = token.strip_prefix('+') {
            Step::Press(name.to_string())
        } else if let Some(name) = token.strip_prefix('-') {
            Step::Release(name.to_string())
        } else {
            Step::Tap(token.to_string())
        };
        if step.name().is_empty() {
            bail!("empty key name in step '{}'", token);
        }
        Ok(step)
    }

    fn name(&self) -> &str {
        match self {
            Step::Tap(name) | Step::Press(name) | Step::Release(name) => name,
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn load_config(args: &Args) -> Result<KeyboardConfig> {
    let settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load_default().context("failed to load default settings")?,
    };
    Ok(settings.into_config())
}

fn check_layout(layout: &Layout) {
    println!("Layout '{}' version {}", layout.name, layout.version);
    println!("{} key(s):", layout.keys.len());
    for entry in &layout.keys {
        let layers: Vec<String> = entry
            .slots
            .iter()
            .map(|(layer, slot)| format!("{}={}", layer, slot.key))
            .collect();
        println!("  {}: {}", entry.name, layers.join(" "));
    }
}

fn replay(keyboard: &mut VirtualKeyboard, steps: &[Step]) -> Result<()> {
    for step in steps {
        match step {
            Step::Tap(name) => {
                keyboard.handle_widget_event(name, WidgetEvent::PointerPress)?;
                keyboard.handle_widget_event(name, WidgetEvent::PointerRelease)?;
            }
            Step::Press(name) => {
                keyboard.handle_widget_event(name, WidgetEvent::PointerPress)?;
            }
            Step::Release(name) => {
                keyboard.handle_widget_event(name, WidgetEvent::PointerRelease)?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let layout = Layout::from_path(&args.layout)
        .with_context(|| format!("failed to load layout {}", args.layout.display()))?;

    if args.check_layout {
        check_layout(&layout);
        return Ok(());
    }

    let steps = args
        .script
        .iter()
        .map(|token| Step::parse(token))
        .collect::<Result<Vec<_>>>()?;

    let mut keyboard = VirtualKeyboard::new(load_config(&args)?);
    keyboard.add_key_container(REPLAY_CONTAINER, layout.instantiate())?;
    keyboard.apply_layout(&layout);
    log::info!(
        "Loaded layout '{}' v{} with {} key(s)",
        keyboard.layout_name(),
        keyboard.layout_version(),
        keyboard.registry().len()
    );

    let recorder = EventRecorder::new();
    keyboard.add_receiver(Box::new(recorder.clone()));

    let result = replay(&mut keyboard, &steps);
    for event in recorder.take() {
        println!("{}", event);
    }
    result
}
