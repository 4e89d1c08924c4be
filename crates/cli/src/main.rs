mod bench;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{AgentArgs, AgentReply, MovieAgent, ReplyAction, render_brief, render_full};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Movie Agent - conversational movie search
#[derive(Parser)]
#[command(name = "movie-agent")]
#[command(about = "Find movies by describing them, refining as you go", long_about = None)]
struct Cli {
    #[command(flatten)]
    agent: AgentArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation
    Chat,

    /// Answer a single prompt and print the reply as JSON
    Ask {
        /// What to look for, e.g. "romantic comedy from 2005"
        #[arg(long)]
        prompt: String,
    },

    /// Run prompts repeatedly and record latency and success
    Benchmark {
        /// JSON file with a list of prompts or `{"prompts": [...]}`
        #[arg(long)]
        prompts_file: Option<PathBuf>,

        /// Runs per prompt
        #[arg(long, default_value = "3")]
        repeats: usize,

        /// Benchmark a running server instead of an in-process agent
        #[arg(long)]
        server_url: Option<String>,

        /// Directory for the JSONL log and summary
        #[arg(long, default_value = "logs")]
        log_dir: PathBuf,

        /// Log filename prefix
        #[arg(long, default_value = "bench_runs")]
        log_prefix: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let (llm_config, agent_config) = cli.agent.resolve()?;
    let base_url = llm_config.base().to_string();

    match cli.command {
        Commands::Chat => {
            let agent = MovieAgent::connect(llm_config, agent_config)?;
            handle_chat(agent, &base_url).await?
        }
        Commands::Ask { prompt } => {
            let agent = MovieAgent::connect(llm_config, agent_config)?;
            handle_ask(agent, &prompt).await?
        }
        Commands::Benchmark {
            prompts_file,
            repeats,
            server_url,
            log_dir,
            log_prefix,
        } => {
            let target = match server_url {
                Some(url) => bench::Target::remote(url)?,
                None => bench::Target::in_process(MovieAgent::connect(llm_config, agent_config)?),
            };
            let options = bench::BenchOptions {
                prompts: bench::load_prompts(prompts_file.as_deref())?,
                repeats,
                log_dir,
                log_prefix,
                llm_base_url: base_url,
            };
            bench::run(target, options).await?
        }
    }

    Ok(())
}

/// Handle the 'chat' command
async fn handle_chat(agent: MovieAgent, base_url: &str) -> Result<()> {
    println!("{}", "Movie Recommendation Agent".bold().blue());
    if !agent.ready().await {
        bail!(
            "could not reach a llamafile server with a loaded model at {base_url}. \
             Start it or set LLAMAFILE_BASE_URL."
        );
    }
    println!("LLM backend: llamafile at {base_url}");
    println!("Tell me what you're in the mood for (e.g., 'lighthearted sci-fi adventure from the 90s').");
    println!("Type 'help' for tips, or 'exit' to quit.");

    let mut session = agent.new_session();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n{} ", ">".green().bold());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            println!("\nGoodbye!");
            break;
        };
        let input = line.trim();
        match input.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" => {
                println!("Goodbye!");
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            _ => {}
        }

        match agent.handle(&mut session, input).await {
            Ok(reply) => print_reply(&reply),
            Err(err) => println!("{}", err.to_string().yellow()),
        }
    }
    Ok(())
}

/// Handle the 'ask' command
async fn handle_ask(agent: MovieAgent, prompt: &str) -> Result<()> {
    let mut session = agent.new_session();
    let reply = agent.handle(&mut session, prompt).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

fn print_help() {
    println!("Commands you can use:");
    println!("- Type what you like: 'funny space comedies', 'thrillers with DiCaprio', 'romance 1999'");
    println!("- details N        Show full details for result number N on screen");
    println!("- more             Show more results");
    println!("- refine ...       Adjust the search, e.g. 'refine no horror from 2015-2020' or 'refine clear year'");
    println!("- restart          Clear filters and start over");
    println!("- help             Show this help");
    println!("- exit             Quit");
}

fn print_divider() {
    println!("{}", "-".repeat(72).dimmed());
}

/// Helper function to format and print one agent reply
fn print_reply(reply: &AgentReply) {
    match reply.action {
        ReplyAction::Return | ReplyAction::More => {
            println!("{}", reply.message.bold());
            print_divider();
            for (i, item) in reply.results.iter().enumerate() {
                println!("{}\n", render_brief(i + 1, item));
            }
            print_divider();
            if reply.has_more {
                println!("Type 'more' for more results, or 'details N' for full info.");
            } else {
                println!("Type 'details N' for full info, or 'refine ...' to adjust.");
            }
        }
        ReplyAction::Details => {
            if let Some(item) = &reply.details {
                print_divider();
                println!("{}", render_full(item));
                print_divider();
            }
        }
        ReplyAction::Clarify | ReplyAction::Narrow => println!("{}", reply.message.cyan()),
        ReplyAction::Restart => println!("{}", reply.message.green()),
        ReplyAction::Unavailable => println!("{}", reply.message.red()),
        ReplyAction::Help => println!("{}", reply.message),
    }
    if reply.action != ReplyAction::Help {
        println!("{} {}", "Current filters:".dimmed(), reply.filters);
    }
}
