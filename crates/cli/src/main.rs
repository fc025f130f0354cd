use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deskmate_adapters::{AdapterConfig, Adapters};
use deskmate_agents::Assistant;
use deskmate_core::{FaqTable, DEFAULT_FAQ_THRESHOLD};
use deskmate_ml::{LazyModel, DEFAULT_QA_MODEL};
use deskmate_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "deskmate")]
#[command(about = "Deskmate assistant CLI")]
struct Cli {
    /// JSON file of `{question, answer}` entries replacing the built-in FAQ table.
    #[arg(long, env = "DESKMATE_FAQ_PATH")]
    faq_path: Option<PathBuf>,

    #[arg(long, env = "DESKMATE_FAQ_THRESHOLD", default_value_t = DEFAULT_FAQ_THRESHOLD)]
    faq_threshold: f64,

    #[arg(long, env = "DESKMATE_QA_MODEL", default_value = DEFAULT_QA_MODEL)]
    qa_model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Route a single question and print the reply.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Interactive chat loop; `exit` or `quit` leaves.
    Chat,
    /// Print the extracted text of a local document.
    Read { path: PathBuf },
    /// Answer a question from the text of a local document.
    AskDoc {
        path: PathBuf,
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Print the FAQ table as JSON.
    Faq,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("deskmate_cli");
    let cli = Cli::parse();

    match &cli.command {
        Command::Ask { question } => {
            let assistant = build_assistant(&cli)?;
            let reply = assistant.ask(&question.join(" ")).await;
            println!("{}", reply.text());
        }
        Command::Chat => run_chat(build_assistant(&cli)?).await?,
        Command::Read { path } => {
            println!("{}", read_document(path)?);
        }
        Command::AskDoc { path, question } => {
            let assistant = build_assistant(&cli)?;
            let text = read_document(path)?;
            let answer = assistant.ask_document(&question.join(" "), &text);
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Command::Faq => {
            let faqs = load_faqs(&cli)?;
            println!("{}", serde_json::to_string_pretty(faqs.entries())?);
        }
    }

    Ok(())
}

async fn run_chat(assistant: Assistant) -> Result<()> {
    println!("Deskmate chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = assistant.ask(message).await;
        println!("\n{}\n", reply.text());
    }

    Ok(())
}

fn build_assistant(cli: &Cli) -> Result<Assistant> {
    let adapters = Adapters::live(&AdapterConfig::from_env())?;

    Ok(Assistant::new(
        load_faqs(cli)?,
        adapters,
        LazyModel::new(cli.qa_model.clone()),
        AppMetrics::shared(),
    ))
}

fn load_faqs(cli: &Cli) -> Result<FaqTable> {
    let faqs = match cli.faq_path.as_ref() {
        Some(path) => FaqTable::from_json_file(path)?,
        None => FaqTable::builtin(),
    };
    Ok(faqs.with_threshold(cli.faq_threshold))
}

fn read_document(path: &Path) -> Result<String> {
    deskmate_storage::extract_text(path)
        .with_context(|| format!("failed reading document {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn every_subcommand_has_help_text() {
        Cli::command().debug_assert();

        let command = Cli::command();
        for subcommand in command.get_subcommands() {
            assert!(
                subcommand.get_about().is_some(),
                "`{}` has no description",
                subcommand.get_name()
            );
        }
    }
}
