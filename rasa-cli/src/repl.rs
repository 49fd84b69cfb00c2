//! Line-oriented session and the scripted demo

use crate::App;
use anyhow::{anyhow, bail, Result};
use rasa_core::tools::{ToolContext, ToolRuntime, SAVE_FINDING, SUMMARIZE_TOPIC_KNOWLEDGE};
use rasa_core::workflow::{study_context, AssistantState, Intent};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
commands:
  save <topic> | <content> [| <source>]   save a finding
  summarize <topic>                       summarize saved findings
  topics                                  list topics
  route <message>                         route a message and load study context
  help                                    show this help
  quit                                    leave";

/// A parsed REPL line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Save {
        topic: String,
        content: String,
        source: Option<String>,
    },
    Summarize(String),
    Topics,
    Route(String),
    Help,
    Quit,
}

fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match verb.to_lowercase().as_str() {
        "save" => {
            let mut parts = rest.splitn(3, '|').map(str::trim);
            let topic = parts.next().unwrap_or_default();
            let content = parts
                .next()
                .ok_or_else(|| anyhow!("usage: save <topic> | <content> [| <source>]"))?;
            let source = parts.next().filter(|s| !s.is_empty());
            Ok(Command::Save {
                topic: topic.to_string(),
                content: content.to_string(),
                source: source.map(str::to_string),
            })
        }
        "summarize" => Ok(Command::Summarize(rest.to_string())),
        "topics" => Ok(Command::Topics),
        "route" => Ok(Command::Route(rest.to_string())),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => bail!("unknown command '{}' (try 'help')", other),
    }
}

async fn call(
    runtime: &ToolRuntime,
    app: &App,
    tool: &str,
    args: Value,
    ctx: &ToolContext,
) -> Result<Value> {
    let tool = app.registry.require(tool)?;
    runtime
        .execute_simple(tool.as_ref(), args, ctx)
        .await
        .map_err(|e| anyhow!("{}", e))
}

/// Run the REPL until `quit` or end of input
pub(crate) async fn run(app: &App, user: &str) -> Result<()> {
    let mut state = AssistantState::new(user);
    let research_ctx = ToolContext::new()
        .with_agent_id(Intent::Research.agent_id())
        .with_trace_id(state.session_id.clone());
    let study_ctx = ToolContext::new()
        .with_agent_id(Intent::Study.agent_id())
        .with_trace_id(state.session_id.clone());

    println!("rasa session {} for {} (type 'help')", state.session_id, user);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse(&line) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {}", e);
                continue;
            }
        };

        let outcome = match command {
            Command::Quit => break,
            Command::Help => {
                println!("{}", HELP);
                Ok(())
            }
            Command::Save {
                topic,
                content,
                source,
            } => {
                let mut args = json!({"topic": topic, "finding": content});
                if let Some(source) = source {
                    args["source"] = Value::String(source);
                }
                call(&app.research, app, SAVE_FINDING, args, &research_ctx)
                    .await
                    .map(|v| {
                        let message = v["message"].as_str().unwrap_or_default();
                        println!("{} ({} stored)", message, v["count"]);
                    })
            }
            Command::Summarize(topic) => {
                let args = json!({"topic": topic});
                call(&app.study, app, SUMMARIZE_TOPIC_KNOWLEDGE, args, &study_ctx)
                    .await
                    .map(|v| println!("{}", v["summary"].as_str().unwrap_or_default()))
            }
            Command::Topics => print_topics(app),
            Command::Route(message) => {
                state.push_user(message);
                route_and_report(app, &mut state)
            }
        };

        if let Err(e) = outcome {
            eprintln!("error: {}", e);
        }
    }

    Ok(())
}

fn print_topics(app: &App) -> Result<()> {
    let topics = app.bank.topics()?;
    if topics.is_empty() {
        println!("(no topics)");
    }
    for topic in topics {
        println!("{} ({})", topic.display_topic, topic.count);
    }
    Ok(())
}

fn route_and_report(app: &App, state: &mut AssistantState) -> Result<()> {
    let decision = app.router.route(state)?;
    println!("intent: {}  topic: {}", decision.intent, decision.topic);

    if decision.intent == Intent::Study {
        let context = study_context(&app.bank, state)?;
        println!("{}", context.summary);
    }
    Ok(())
}

/// Save the two mitosis findings and return the resulting summary
pub(crate) async fn demo(app: &App) -> Result<String> {
    let ctx = ToolContext::new().with_agent_id(Intent::Research.agent_id());

    for (topic, finding) in [
        ("Mitosis", "Mitosis has 5 phases."),
        ("mitosis", "Phases: prophase, metaphase, anaphase, telophase."),
    ] {
        let saved = call(
            &app.research,
            app,
            SAVE_FINDING,
            json!({"topic": topic, "finding": finding}),
            &ctx,
        )
        .await?;
        tracing::debug!(count = %saved["count"], "Demo finding saved");
    }

    let summary = call(
        &app.study,
        app,
        SUMMARIZE_TOPIC_KNOWLEDGE,
        json!({"topic": "Mitosis"}),
        &ToolContext::new().with_agent_id(Intent::Study.agent_id()),
    )
    .await?;

    Ok(summary["summary"]
        .as_str()
        .unwrap_or_default()
        .to_string())
}
