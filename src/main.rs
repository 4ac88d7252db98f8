use clap::{Parser as ClapParser, Subcommand};
use decimal_expr::RoundingMode;
use decimal_expr::cli::{self, CliError, EvalOptions};
use std::io::{self, BufRead};

#[derive(ClapParser)]
#[command(name = "dexpr")]
#[command(about = "dexpr - Evaluate arithmetic and logical expressions with exact decimals")]
#[command(version)]
struct Cli {
    /// Log scanning, parsing and evaluation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression (or each line of stdin)
    Eval {
        /// The expression to evaluate (reads lines from stdin if not provided)
        expression: Option<String>,

        /// Significant digits kept when rounding (1-100000)
        #[arg(short, long)]
        precision: Option<u64>,

        /// Rounding mode: up, down, ceiling, floor, half-up, half-down, half-even
        #[arg(short, long)]
        rounding: Option<RoundingMode>,

        /// Define a variable as NAME=EXPR (repeatable)
        #[arg(short = 'D', long = "define")]
        define: Vec<String>,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Only validate syntax and print the parsed tree
    Check {
        /// The expression to check
        expression: String,
    },

    /// List default constants and functions
    Functions,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Eval {
            expression,
            precision,
            rounding,
            define,
            json,
        } => run_eval(expression, precision, rounding, define, json),
        Commands::Check { expression } => cli::execute_check(&expression).map(|result| {
            println!("{}", result.tree);
            true
        }),
        Commands::Functions => {
            print!("{}", cli::list_functions());
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every expression evaluated successfully.
fn run_eval(
    expression: Option<String>,
    precision: Option<u64>,
    rounding: Option<RoundingMode>,
    definitions: Vec<String>,
    json: bool,
) -> Result<bool, CliError> {
    let expressions = match expression {
        Some(e) => vec![e],
        None if !atty::is(atty::Stream::Stdin) => {
            let mut lines = Vec::new();
            for line in io::stdin().lock().lines() {
                let line = line?;
                if !line.trim().is_empty() {
                    lines.push(line);
                }
            }
            lines
        }
        None => return Err(CliError::NoInput),
    };

    let options = EvalOptions {
        expressions,
        precision,
        rounding,
        definitions,
    };

    let outputs = cli::execute_eval(&options)?;
    let mut all_ok = true;
    for output in &outputs {
        if json {
            println!("{}", serde_json::to_string(&output.to_json())?);
        } else {
            match &output.result {
                Ok(value) => println!("{}", value),
                Err(message) => eprintln!("{}", message),
            }
        }
        all_ok &= output.is_ok();
    }
    Ok(all_ok)
}
