use std::fs;
use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};

use miniscript::error::{FrontendError, Reporter};
use miniscript::parser;

#[derive(Parser)]
#[command(name = "miniscript")]
#[command(about = "Expression front end for the miniscript language", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a source file and print its syntax tree
    Parse {
        /// Source file
        input: String,

        /// Also dump the token stream
        #[arg(long)]
        show_tokens: bool,
    },

    /// Tokenize a source file and print the tokens
    Tokenize {
        /// Source file
        input: String,
    },

    /// Interactive prompt; parses one expression per line
    Repl,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Parse { input, show_tokens } => run_file(&input, show_tokens)?,
        Commands::Tokenize { input } => tokenize_file(&input)?,
        Commands::Repl => repl()?,
    }

    Ok(())
}

fn run_file(path: &str, show_tokens: bool) -> Result<(), FrontendError> {
    let source = fs::read_to_string(path)?;
    let mut reporter = Reporter::new();

    let tokens = parser::lexer::tokenize(&source, &mut reporter);
    if show_tokens {
        for token in &tokens {
            println!("{:?}", token);
        }
    }

    let expr = parser::parser::parse_tokens(tokens, &mut reporter);
    print_diagnostics(&reporter);

    match expr {
        Some(expr) if !reporter.had_error() => {
            println!("{}", expr);
            Ok(())
        }
        _ => Err(FrontendError::Parse {
            count: reporter.diagnostics().len(),
        }),
    }
}

fn tokenize_file(path: &str) -> Result<(), FrontendError> {
    let source = fs::read_to_string(path)?;
    let mut reporter = Reporter::new();

    for token in parser::lexer::tokenize(&source, &mut reporter) {
        println!("{:?}", token);
    }

    print_diagnostics(&reporter);
    if reporter.had_error() {
        return Err(FrontendError::Parse {
            count: reporter.diagnostics().len(),
        });
    }
    Ok(())
}

fn repl() -> Result<(), FrontendError> {
    let stdin = io::stdin();
    let mut reporter = Reporter::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        match parser::parse(line, &mut reporter) {
            Some(expr) if !reporter.had_error() => println!("{}", expr),
            _ => print_diagnostics(&reporter),
        }

        // A bad line must not poison the next one.
        reporter.reset();
    }

    Ok(())
}

fn print_diagnostics(reporter: &Reporter) {
    for diagnostic in reporter.diagnostics() {
        eprintln!("{}", diagnostic);
    }
}
