mod formatter;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use factum::{Engine, GrammarOptions};
use formatter::Formatter;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "factum")]
#[command(about = "A forward-chaining production-rule engine over a discrimination-tree fact index.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive loop accepting tell/query/goal/rm commands against one engine
    Repl {
        /// Grammar file defining the `fact` production (PEG syntax)
        #[arg(short = 'g', long = "grammar")]
        grammar: PathBuf,
    },
    /// Load a grammar and run a script of tell/query/goal/rm statements
    Run {
        /// Grammar file defining the `fact` production (PEG syntax)
        grammar: PathBuf,
        /// Script file of newline-separated statements (`#` starts a comment)
        script: PathBuf,
    },
    /// Like `run`, but suppresses per-line output and reports activations processed
    Bench {
        /// Grammar file defining the `fact` production (PEG syntax)
        grammar: PathBuf,
        /// Script file of newline-separated statements (`#` starts a comment)
        script: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Repl { grammar } => repl_command(grammar),
        Commands::Run { grammar, script } => run_command(grammar, script),
        Commands::Bench { grammar, script } => bench_command(grammar, script),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_engine(grammar_path: &std::path::Path) -> Result<Engine> {
    let grammar_text = fs::read_to_string(grammar_path)
        .with_context(|| format!("reading grammar file {}", grammar_path.display()))?;
    Engine::new(&grammar_text, GrammarOptions::default())
        .map_err(|e| anyhow!("{e}"))
        .context("compiling grammar")
}

/// One line of script/REPL input, split into a verb and its argument.
enum Statement<'a> {
    Tell(&'a str),
    Query(&'a str),
    Goal(&'a str),
    Rm(&'a str),
}

fn parse_statement(line: &str) -> Result<Statement<'_>> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("tell ") {
        Ok(Statement::Tell(rest.trim()))
    } else if let Some(rest) = line.strip_prefix("query ") {
        Ok(Statement::Query(rest.trim()))
    } else if let Some(rest) = line.strip_prefix("goal ") {
        Ok(Statement::Goal(rest.trim()))
    } else if let Some(rest) = line.strip_prefix("rm ") {
        Ok(Statement::Rm(rest.trim()))
    } else {
        Err(anyhow!(
            "expected a line starting with tell/query/goal/rm, got: {line}"
        ))
    }
}

fn run_statement(engine: &mut Engine, formatter: &Formatter, statement: Statement<'_>) -> Result<()> {
    match statement {
        Statement::Tell(text) => engine.tell(text).map_err(|e| anyhow!("{e}"))?,
        Statement::Rm(text) => engine.tell(&format!("rm {text}")).map_err(|e| anyhow!("{e}"))?,
        Statement::Query(text) => {
            let outcome = engine.query(text).map_err(|e| anyhow!("{e}"))?;
            print!("{}", formatter.format_query(text, &outcome));
        }
        Statement::Goal(text) => {
            let fulfillments = engine.goal(text).map_err(|e| anyhow!("{e}"))?;
            print!("{}", formatter.format_goal(text, &fulfillments));
        }
    }
    Ok(())
}

fn repl_command(grammar: &std::path::Path) -> Result<()> {
    let mut engine = load_engine(grammar)?;
    let formatter = Formatter::default();
    let stdin = io::stdin();

    print!("> ");
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            print!("> ");
            io::stdout().flush()?;
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }
        match parse_statement(trimmed).and_then(|s| run_statement(&mut engine, &formatter, s)) {
            Ok(()) => {}
            Err(e) => eprintln!("Error: {e}"),
        }
        print!("> ");
        io::stdout().flush()?;
    }
    Ok(())
}

fn load_script(script_path: &std::path::Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(script_path)
        .with_context(|| format!("reading script file {}", script_path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn run_command(grammar: &std::path::Path, script: &std::path::Path) -> Result<()> {
    let mut engine = load_engine(grammar)?;
    let formatter = Formatter::default();
    for line in load_script(script)? {
        let statement = parse_statement(&line)?;
        run_statement(&mut engine, &formatter, statement)?;
    }
    Ok(())
}

fn bench_command(grammar: &std::path::Path, script: &std::path::Path) -> Result<()> {
    let mut engine = load_engine(grammar)?;
    let lines = load_script(script)?;

    let start = Instant::now();
    for line in &lines {
        match parse_statement(line)? {
            Statement::Tell(text) => engine.tell(text).map_err(|e| anyhow!("{e}"))?,
            Statement::Rm(text) => engine.tell(&format!("rm {text}")).map_err(|e| anyhow!("{e}"))?,
            Statement::Query(text) => {
                engine.query(text).map_err(|e| anyhow!("{e}"))?;
            }
            Statement::Goal(text) => {
                engine.goal(text).map_err(|e| anyhow!("{e}"))?;
            }
        }
    }
    let elapsed = start.elapsed();

    println!("statements:  {}", lines.len());
    println!("activations: {}", engine.counter());
    println!("elapsed:     {:.3}ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}
