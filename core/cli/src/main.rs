#![warn(clippy::pedantic)]

//! # pi
//!
//! Command line front end for the pi parsing framework.
//!
//! * `pi lex FILE` prints one token per line: position, kind, text.
//! * `pi parse FILE` prints the syntax tree and any recovered parse errors.
//! * `pi symbols PATH` populates symbols and infers their types for a file,
//!   or for every supported file under a directory.
//! * `pi complete FILE --line N [--col N] [--lookup]` prints completion
//!   candidates, or the definition of the term before the cursor.
//!
//! ## Exit codes
//! * 0 – success.
//! * 1 – usage, IO, lex or parse failure.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod args;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, process};

use anyhow::{Context, anyhow, bail};
use args::{Cli, Command, CompleteArgs, Recovery, SymbolsArgs};
use clap::Parser;
use pi::{FileStates, Lang, LangSupport, PiConfig, RecoveryMode, Supported, pipeline};
use pi_lex::Pos;
use pi_syms::{SymbolTable, TypeRegistry};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => PiConfig::load(path)?,
        None => PiConfig::default(),
    };
    let support = pi_langs::global();
    support.configure(&config);
    match &cli.command {
        Command::Lex { path, all } => lex(support, cli, path, *all),
        Command::Parse { path, recovery } => {
            let mut config = config;
            if let Some(r) = recovery {
                config.recovery = match r {
                    Recovery::Abandon => RecoveryMode::Abandon,
                    Recovery::Resync => RecoveryMode::Resync,
                };
            }
            parse(support, cli, path, &config)
        }
        Command::Symbols(args) => symbols(support, cli, args, config),
        Command::Complete(args) => complete(support, cli, args, &config),
    }
}

fn lang_for(support: &LangSupport, cli: &Cli, path: &Path) -> anyhow::Result<(Supported, Arc<dyn Lang>)> {
    let sup = match &cli.lang {
        Some(name) => Supported::by_name(name)?,
        None => Supported::from_filename(&path.to_string_lossy())
            .ok_or_else(|| anyhow!("cannot tell the language of {}", path.display()))?,
    };
    Ok((sup, support.lang(sup)?))
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        bail!("path not found: {}", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn lex(support: &LangSupport, cli: &Cli, path: &Path, all: bool) -> anyhow::Result<()> {
    let src = read_source(path)?;
    let (sup, lang) = lang_for(support, cli, path)?;
    let parser = lang
        .parser()
        .ok_or_else(|| anyhow!("no parser for {sup}"))?;
    let lexed = parser.lex(&src)?;
    let mut out = String::new();
    for tok in &lexed.tokens {
        if !all && tok.kind.is_trivia() {
            continue;
        }
        writeln!(out, "{} {} {:?}", tok.pos, tok.kind, tok.text(&src))?;
    }
    print!("{out}");
    Ok(())
}

fn parse(support: &LangSupport, cli: &Cli, path: &Path, config: &PiConfig) -> anyhow::Result<()> {
    let src = read_source(path)?;
    let (sup, lang) = lang_for(support, cli, path)?;
    let filename = path.to_string_lossy();
    let fss = FileStates::new(&filename, sup, Arc::new(TypeRegistry::new()));
    let mut proc = fss.start_proc(&src);
    let parsed = pipeline::parse(&mut proc, lang.as_ref(), config);
    for diag in &proc.errors {
        eprintln!("{filename}:{}: {}", diag.pos, diag.message);
    }
    parsed?;
    if let Some(root) = proc.ast.root() {
        print!("{}", proc.ast.write_tree(root));
    }
    Ok(())
}

fn write_symbols(syms: &SymbolTable, id: u32, depth: usize, out: &mut String) -> std::fmt::Result {
    if let Some(sym) = syms.get(id) {
        writeln!(out, "{:indent$}{sym}", "", indent = depth * 2)?;
    }
    for &child in syms.children(id) {
        write_symbols(syms, child, depth + 1, out)?;
    }
    Ok(())
}

fn source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| Supported::from_filename(&p.to_string_lossy()).is_some())
        .collect();
    files.sort();
    files
}

fn symbols(support: &LangSupport, cli: &Cli, args: &SymbolsArgs, mut config: PiConfig) -> anyhow::Result<()> {
    if !args.path.exists() {
        bail!("path not found: {}", args.path.display());
    }
    config.fun_internal |= args.fun_internal;
    let types = Arc::new(TypeRegistry::new());
    let processed = if args.path.is_dir() {
        let files = source_files(&args.path);
        pipeline::process_files(support, &files, &types, &config, None)?
    } else {
        let src = read_source(&args.path)?;
        let (sup, lang) = lang_for(support, cli, &args.path)?;
        let states = FileStates::new(&args.path.to_string_lossy(), sup, Arc::clone(&types));
        let report = pipeline::process(&states, lang.as_ref(), &src, &config, None);
        vec![pipeline::Processed { states, report }]
    };

    let mut failed = 0;
    let mut out = String::new();
    let mut json = Vec::new();
    for file in &processed {
        if let Err(e) = &file.report {
            warn!(error = %format!("{e:#}"), "file not fully processed");
            failed += 1;
        }
        let done = file.states.done();
        if args.json {
            let symbols: Vec<_> = done.syms.walk().into_iter().filter_map(|id| done.syms.get(id)).collect();
            json.push(serde_json::json!({
                "file": file.states.filename(),
                "pkg": done.pkg,
                "symbols": symbols,
            }));
            continue;
        }
        writeln!(out, "{}", file.states.filename())?;
        for &root in done.syms.roots() {
            write_symbols(&done.syms, root, 1, &mut out)?;
        }
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{out}");
    }
    if failed > 0 && failed == processed.len() {
        bail!("no file could be processed");
    }
    Ok(())
}

fn complete(support: &LangSupport, cli: &Cli, args: &CompleteArgs, config: &PiConfig) -> anyhow::Result<()> {
    let src = read_source(&args.path)?;
    let (sup, lang) = lang_for(support, cli, &args.path)?;
    let fss = FileStates::new(&args.path.to_string_lossy(), sup, Arc::new(TypeRegistry::new()));
    if let Err(e) = pipeline::process(&fss, lang.as_ref(), &src, config, None) {
        warn!(error = %format!("{e:#}"), "completing from a partial pass");
    }
    let line_idx = args.line.checked_sub(1).context("lines are numbered from 1")?;
    let line = fss.done().line(line_idx).to_string();
    let col = args
        .col
        .map_or(line.chars().count(), |c| c.saturating_sub(1) as usize);
    let cursor = line.char_indices().nth(col).map_or(line.len(), |(i, _)| i);
    let text = &line[..cursor];
    let pos = Pos::new(line_idx, u32::try_from(col)?);

    if args.lookup {
        let found = lang.lookup(&fss, text, pos);
        if found.is_empty() {
            bail!("nothing found for {text:?}");
        }
        println!("{}:{}", found.filename, found.start_line + 1);
        println!("{}", found.text);
        return Ok(());
    }
    let matches = lang.complete_line(&fss, text, pos);
    let mut out = String::new();
    writeln!(out, "seed: {}", matches.seed)?;
    for m in &matches.matches {
        let edit = lang.complete_edit(&fss, &line, cursor, m, &matches.seed);
        writeln!(out, "{}\t{}\t{}\tdelete {}", m.display(), m.icon, m.desc, edit.forward_delete)?;
    }
    print!("{out}");
    Ok(())
}
