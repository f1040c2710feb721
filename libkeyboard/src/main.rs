use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libkeyboard::{
    demo_word_list, keyboard_engine, layout_from_name, rules_sources, Config, ImeContext, Key,
    KeyResult, KeyboardEngine, LogNotifier, RulesResolver, SessionId, WordList,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "libkeyboard", about = "Keyboard input method with word hints")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language of the session and of --words
    #[arg(long, global = true, default_value = "en")]
    language: String,

    /// Word list, one word per line (built-in English list if omitted)
    #[arg(long, global = true)]
    words: Option<PathBuf>,

    /// XKB rules file overriding the detected rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// XKB data directory
    #[arg(long, global = true, default_value = "/usr/share/X11/xkb")]
    xkb_base: PathBuf,

    /// Show preedit in the panel instead of inline
    #[arg(long, global = true)]
    no_preedit: bool,

    /// Keyboard input method name
    #[arg(long, global = true, default_value = "keyboard-us")]
    im: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read key names from stdin and print what the engine does
    Run,
    /// Print the resolved rules, layout and configuration
    Info,
}

const SESSION: SessionId = SessionId(1);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_level(true)
        .with_target(false);
    if subscriber.try_init().is_ok() {
        tracing::debug!("tracing initialized");
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_toml(path),
        None => Ok(Config::default()),
    }
}

fn load_words(cli: &Cli) -> Result<WordList> {
    let Some(path) = &cli.words else {
        return Ok(demo_word_list());
    };
    let mut words = WordList::new();
    let count = words.load_language(&cli.language, path)?;
    tracing::info!(language = %cli.language, count, "loaded word list");
    Ok(words)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let words = load_words(&cli)?;

    match cli.command {
        Some(Command::Info) => info(&cli, &config, &words),
        Some(Command::Run) | None => run(&cli, config, words),
    }
}

fn info(cli: &Cli, config: &Config, words: &WordList) -> Result<()> {
    let resolver = RulesResolver::new(&cli.xkb_base);
    let detected = std::env::var("XKB_DEFAULT_RULES").ok();
    match resolver.resolve_existing(&rules_sources(cli.rules.clone(), detected)) {
        Some(rules) => println!("rules: {} ({})", rules.name, rules.path.display()),
        None => println!("rules: none found under {}", resolver.base_dir().display()),
    }

    match layout_from_name(&cli.im) {
        Some((layout, "")) => println!("layout: {layout}"),
        Some((layout, variant)) => println!("layout: {layout} variant: {variant}"),
        None => println!("layout: {} is not a keyboard input method", cli.im),
    }

    let mut languages: Vec<_> = words.languages().collect();
    languages.sort_unstable();
    for language in languages {
        println!("words[{language}]: {}", words.word_count(language));
    }

    println!();
    print!("{}", config.to_toml_string().context("serialize configuration")?);
    Ok(())
}

fn run(cli: &Cli, config: Config, words: WordList) -> Result<()> {
    let mut engine = keyboard_engine(config, Arc::new(words)).with_notifier(LogNotifier);
    let context = engine.context_mut(SESSION);
    context.language = cli.language.clone();
    context.supports_preedit = !cli.no_preedit;

    println!("Type key names separated by spaces (e.g. `h e l Alt+1`).");
    println!("Commands: :type TEXT, :select N, :toggle, :reset, :quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }

        let mut committed = String::new();
        if let Err(err) = apply_line(&mut engine, line, &mut committed) {
            println!("  ! {err}");
        }
        if let Some(context) = engine.context(SESSION) {
            print_context(context, &committed);
        }
        io::stdout().flush().ok();
    }
    Ok(())
}

fn apply_line(engine: &mut KeyboardEngine, line: &str, committed: &mut String) -> Result<()> {
    let keys = if let Some(text) = line.strip_prefix(":type ") {
        text.chars().map(Key::from_char).collect()
    } else if line == ":toggle" {
        engine.config().hint_trigger.first().copied().into_iter().collect()
    } else if let Some(index) = line.strip_prefix(":select ") {
        let index: usize = index.trim().parse().context("candidate number")?;
        if index == 0 || !engine.select_candidate(SESSION, index - 1) {
            anyhow::bail!("no candidate {index}");
        }
        committed.push_str(&engine.context_mut(SESSION).take_commit());
        return Ok(());
    } else if line == ":reset" {
        engine.reset_session(SESSION);
        return Ok(());
    } else if line.starts_with(':') {
        anyhow::bail!("unknown command {line}");
    } else {
        Key::parse_list(line)?
    };

    for key in keys {
        let result = engine.handle_key_event(SESSION, key, false);
        committed.push_str(&engine.context_mut(SESSION).take_commit());
        if result == KeyResult::Forwarded {
            println!("  {key} -> forwarded");
        }
    }
    Ok(())
}

fn print_context(context: &ImeContext, committed: &str) {
    if !committed.is_empty() {
        println!("  commit: {committed:?}");
    }
    let preedit = if context.supports_preedit {
        &context.client_preedit
    } else {
        &context.panel_preedit
    };
    if !preedit.is_empty() {
        println!("  preedit: {}", preedit.text);
    }
    for (label, text) in context.candidate_labels.iter().zip(&context.candidates) {
        println!("  [{label}] {text}");
    }
}
