//! Command-line interface for posigate.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Read;

use crate::gemini::{AnalysisResult, GeminiService, POSITIVE_THRESHOLD};

/// Exit codes.
pub const EXIT_POSITIVE: i32 = 0;
pub const EXIT_NEGATIVE: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Positivity gate for user posts.
///
/// Posigate scores how positive a piece of text reads (0-100) via the
/// Gemini API and suggests a rewrite when the text falls below the
/// positivity threshold.
#[derive(Parser)]
#[command(name = "posigate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score how positive a post reads
    #[command(visible_alias = "score")]
    Analyze(AnalyzeArgs),
    /// Rewrite a post into a more positive form
    Suggest(SuggestArgs),
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Text to analyze, or '-' to read from stdin
    pub text: String,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,
}

/// Arguments for the suggest command.
#[derive(Parser)]
pub struct SuggestArgs {
    /// Text to rewrite, or '-' to read from stdin
    pub text: String,
}

/// Resolve the text argument, reading stdin when it is `-`.
fn read_text(arg: &str) -> anyhow::Result<String> {
    if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer.trim_end().to_string())
    } else {
        Ok(arg.to_string())
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let text = read_text(&args.text)?;

    let service = match GeminiService::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(service.analyze_positivity(&text)) {
        Ok(result) => {
            if args.format == "json" {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                write_pretty(&result);
            }
            Ok(if result.is_positive {
                EXIT_POSITIVE
            } else {
                EXIT_NEGATIVE
            })
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(EXIT_ERROR)
        }
    }
}

/// Run the suggest command.
pub fn run_suggest(args: &SuggestArgs) -> anyhow::Result<i32> {
    let text = read_text(&args.text)?;

    let service = match GeminiService::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    match runtime.block_on(service.generate_suggestion(&text)) {
        Ok(suggestion) => {
            println!("{}", suggestion);
            Ok(EXIT_POSITIVE)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(EXIT_ERROR)
        }
    }
}

fn write_pretty(result: &AnalysisResult) {
    if result.is_positive {
        print!("  {}", "✓ POSITIVE".green());
    } else {
        print!("  {}", "✗ NEGATIVE".red());
    }

    print!("  Score: ");
    write_colored_score(result.score);
    println!();

    println!("  {} {}", "Reason:".bold(), result.reason);

    if let Some(suggestion) = &result.suggestion {
        println!();
        println!("  {}", "Suggestion:".bold());
        println!("  {}", suggestion);
    }
}

fn write_colored_score(score: u8) {
    match score {
        s if s >= POSITIVE_THRESHOLD => print!("{}", s.to_string().green().bold()),
        s if s >= 40 => print!("{}", s.to_string().yellow()),
        s => print!("{}", s.to_string().red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from(["posigate", "analyze", "hello", "--format", "json"])
            .unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.text, "hello");
                assert_eq!(args.format, "json");
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_cli_parses_suggest_alias() {
        let cli = Cli::try_parse_from(["posigate", "score", "hello"]).unwrap();
        assert!(matches!(cli.command, Commands::Analyze(_)));

        let cli = Cli::try_parse_from(["posigate", "suggest", "hello"]).unwrap();
        assert!(matches!(cli.command, Commands::Suggest(_)));
    }

    #[test]
    fn test_read_text_passthrough() {
        assert_eq!(read_text("some post").unwrap(), "some post");
    }
}
