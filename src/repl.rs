//! Interactive terminal session: a line-oriented command parser and the
//! async loop that streams chat replies as they arrive.

use std::io::Write as _;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::Assistant;
use crate::fileops;
use crate::personality;
use crate::types::ChatEvent;
use crate::voice::VoiceOutput;
use crate::web;

/// Everything a REPL line can mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Models,
    SwitchModel(String),
    ShowPersonality,
    SwitchPersonality(String),
    ToggleAuto,
    MemoryStats,
    ClearMemory,
    Identity,
    CallMe(String),
    Search(String),
    Fetch(String),
    CreateFile(String),
    ReadFile(String),
    DeleteFile(String),
    FileInfo(String),
    ListFiles(Option<String>),
    OrganizeFiles(Option<String>),
    CreateProject { name: String, kind: String },
    VoiceOn,
    VoiceOff,
    VoiceStatus,
    Help,
    ClearScreen,
    Quit,
}

/// Parse one input line. Keywords are matched case-insensitively;
/// arguments keep their original case. Anything unrecognized is chat.
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let lower = input.to_lowercase();

    match lower.as_str() {
        "exit" | "quit" => return Command::Quit,
        "help" | "?" => return Command::Help,
        "clear" => return Command::ClearScreen,
        "models" => return Command::Models,
        "personality" => return Command::ShowPersonality,
        "auto" => return Command::ToggleAuto,
        "memory" => return Command::MemoryStats,
        "clear memory" => return Command::ClearMemory,
        "identity" => return Command::Identity,
        "voice on" => return Command::VoiceOn,
        "voice off" => return Command::VoiceOff,
        "voice" | "voice status" => return Command::VoiceStatus,
        "list files" => return Command::ListFiles(None),
        "organize files" => return Command::OrganizeFiles(None),
        _ => {}
    }

    if let Some(rest) = strip_keyword(input, &lower, "model ") {
        return Command::SwitchModel(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "personality ") {
        return Command::SwitchPersonality(rest.to_lowercase());
    }
    if let Some(rest) = strip_keyword(input, &lower, "search ") {
        return Command::Search(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "fetch ") {
        return Command::Fetch(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "create file ") {
        return Command::CreateFile(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "read file ") {
        return Command::ReadFile(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "delete file ") {
        return Command::DeleteFile(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "file info ") {
        return Command::FileInfo(rest);
    }
    if let Some(rest) = strip_keyword(input, &lower, "list files ") {
        return Command::ListFiles(Some(rest));
    }
    if let Some(rest) = strip_keyword(input, &lower, "organize files ") {
        return Command::OrganizeFiles(Some(rest));
    }
    if let Some(rest) = strip_keyword(input, &lower, "create project ") {
        let mut parts = rest.split_whitespace();
        if let Some(name) = parts.next() {
            let kind = parts.next().unwrap_or("python").to_lowercase();
            return Command::CreateProject {
                name: name.to_string(),
                kind,
            };
        }
    }

    interpret_natural(input, &lower).unwrap_or_else(|| Command::Chat(input.to_string()))
}

fn strip_keyword(input: &str, lower: &str, keyword: &str) -> Option<String> {
    if lower.starts_with(keyword) {
        let rest = input[keyword.len()..].trim();
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
    }
    None
}

/// Loose natural-language forms that map onto commands.
fn interpret_natural(input: &str, lower: &str) -> Option<Command> {
    if lower == "bye" || lower == "goodbye" || lower == "see you" {
        return Some(Command::Quit);
    }
    if lower.contains("what can you do") || lower.contains("list your commands") {
        return Some(Command::Help);
    }
    if lower.contains("which model") || lower.contains("what models") {
        return Some(Command::Models);
    }
    if lower.starts_with("call me ") {
        let name = input["call me ".len()..].trim().trim_end_matches('.');
        if !name.is_empty() {
            return Some(Command::CallMe(name.to_string()));
        }
    }
    if lower.contains("organize my files") || lower.contains("clean up this folder") {
        return Some(Command::OrganizeFiles(None));
    }
    if lower.contains("show files") || lower.contains("show my files") {
        return Some(Command::ListFiles(None));
    }
    for prefix in ["make a project ", "create a project "] {
        if lower.starts_with(prefix) {
            let rest = input[prefix.len()..].trim();
            let mut parts = rest.split_whitespace();
            if let Some(name) = parts.next() {
                let kind = parts.next().unwrap_or("python").to_lowercase();
                return Some(Command::CreateProject {
                    name: name.to_string(),
                    kind,
                });
            }
        }
    }
    None
}

const HELP: &str = "\
Commands:
  models                      list available models
  model <name>                switch model
  personality [mode]          show or switch personality
  auto                        toggle automatic personality detection
  memory                      conversation and cache statistics
  clear memory                wipe conversation history
  identity                    show how I address you
  search <query>              search conversation history
  fetch <url>                 fetch a web page as text
  create file <path>          create an empty file
  read file <path>            print a file
  delete file <path>          delete a file
  file info <path>            file metadata
  list files [dir]            list a directory
  organize files [dir]        sort files into category folders
  create project <name> [py|web|rust]
  voice on|off|status         spoken replies
  clear                       clear the screen
  exit / quit                 leave

Anything else is sent to the model.";

/// Run the interactive session until EOF or `quit`.
pub async fn run(mut assistant: Assistant) -> anyhow::Result<()> {
    let mut voice = VoiceOutput::new();

    if let Some(greeting) = assistant.greeting() {
        println!("{greeting}");
    }
    println!(
        "Model: {} | personality: {} | type 'help' for commands.\n",
        assistant.current_model(),
        assistant.current_personality()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Command::Quit => {
                let (_, title) = assistant.identity();
                println!("Goodbye, {title}.");
                break;
            }
            Command::Help => println!("{HELP}"),
            Command::ClearScreen => print!("\x1b[2J\x1b[H"),
            Command::Models => {
                for (provider, names) in assistant.catalog().by_provider() {
                    println!("{provider}:");
                    for name in names {
                        let Some(spec) = assistant.catalog().get(name) else {
                            continue;
                        };
                        let marker = if name == assistant.current_model() {
                            "*"
                        } else {
                            " "
                        };
                        println!(
                            "  {marker} {:<32} {:<24} {}",
                            spec.name,
                            spec.price,
                            spec.specialty.unwrap_or("")
                        );
                    }
                }
            }
            Command::SwitchModel(name) => match assistant.switch_model(&name) {
                Ok(()) => println!("Switched to {name}."),
                Err(e) => println!("{e}"),
            },
            Command::ShowPersonality => {
                println!(
                    "Current personality: {} (auto-detection {})",
                    assistant.current_personality(),
                    if assistant.auto_personality_enabled() { "on" } else { "off" }
                );
                for mode in personality::MODES {
                    println!("  {:<13} {}", mode, personality::describe(mode));
                }
            }
            Command::SwitchPersonality(mode) => match assistant.switch_personality(&mode) {
                Ok(()) => println!("Personality set to {mode}."),
                Err(e) => println!("{e}"),
            },
            Command::ToggleAuto => {
                let on = assistant.toggle_auto_personality();
                println!(
                    "Automatic personality detection is now {}.",
                    if on { "on" } else { "off" }
                );
            }
            Command::MemoryStats => {
                println!("{}", assistant.insights());
                println!("Recent context:\n{}", assistant.recent_context(3));
            }
            Command::ClearMemory => match assistant.history.clear() {
                Ok(()) => println!("Conversation history cleared."),
                Err(e) => println!("Failed to clear history: {e}"),
            },
            Command::Identity => {
                let (name, title) = assistant.identity();
                println!("I address you as {name}, or {title} when being formal.");
            }
            Command::CallMe(name) => {
                assistant.set_identity(Some(name.clone()), None);
                println!("Understood, {name}.");
            }
            Command::Search(query) => println!("{}", assistant.search_history(&query)),
            Command::Fetch(url) => match web::fetch_web_content(&url).await {
                Ok(page) => {
                    if let Some(title) = &page.title {
                        println!("# {title}");
                    }
                    println!("{}", page.text);
                }
                Err(e) => println!("Fetch failed: {e}"),
            },
            Command::CreateFile(path) => {
                report(fileops::create_file(&PathBuf::from(&path), "").map(|_| format!("Created {path}.")));
            }
            Command::ReadFile(path) => match fileops::read_file(&PathBuf::from(&path)) {
                Ok(content) => println!("{content}"),
                Err(e) => println!("{e}"),
            },
            Command::DeleteFile(path) => {
                report(fileops::delete_file(&PathBuf::from(&path)).map(|_| format!("Deleted {path}.")));
            }
            Command::FileInfo(path) => match fileops::file_info(&PathBuf::from(&path)) {
                Ok(info) => println!("{}", info.render()),
                Err(e) => println!("{e}"),
            },
            Command::ListFiles(dir) => {
                let dir = PathBuf::from(dir.unwrap_or_else(|| ".".into()));
                match fileops::list_directory(&dir) {
                    Ok(entries) => println!("{}", fileops::render_listing(&entries, true)),
                    Err(e) => println!("{e}"),
                }
            }
            Command::OrganizeFiles(dir) => {
                let dir = PathBuf::from(dir.unwrap_or_else(|| ".".into()));
                match fileops::organize_files(&dir) {
                    Ok(r) => {
                        println!("Moved {} files, skipped {}.", r.moved, r.skipped);
                        for (category, count) in &r.by_category {
                            println!("  {category}: {count}");
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            Command::CreateProject { name, kind } => {
                match fileops::create_project(&PathBuf::from("."), &name, &kind) {
                    Ok(path) => println!("Scaffolded {kind} project at {}.", path.display()),
                    Err(e) => println!("{e}"),
                }
            }
            Command::VoiceOn => {
                if voice.enable() {
                    println!("Voice output on ({}).", voice.status());
                } else {
                    println!("No speech synthesizer found; voice stays off.");
                }
            }
            Command::VoiceOff => {
                voice.disable();
                println!("Voice output off.");
            }
            Command::VoiceStatus => println!("Voice: {}", voice.status()),
            Command::Chat(message) => {
                let mode_before = assistant.current_personality().to_string();
                match stream_chat(&mut assistant, &message).await {
                    Ok(reply) => {
                        if assistant.current_personality() != mode_before {
                            println!(
                                "[personality switched to {}]",
                                assistant.current_personality()
                            );
                        }
                        voice.speak(&reply).await;
                    }
                    Err(e) => println!("{e}"),
                }
            }
        }
        println!();
    }

    Ok(())
}

fn report(result: anyhow::Result<String>) {
    match result {
        Ok(msg) => println!("{msg}"),
        Err(e) => println!("{e}"),
    }
}

/// Send one chat turn, printing text chunks as they stream in.
async fn stream_chat(assistant: &mut Assistant, message: &str) -> anyhow::Result<String> {
    let (tx, mut rx) = mpsc::channel::<ChatEvent>(32);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ChatEvent::Text(chunk) => {
                    print!("{chunk}");
                    let _ = std::io::stdout().flush();
                }
                ChatEvent::Usage {
                    input_tokens,
                    output_tokens,
                } => debug!(input_tokens, output_tokens, "token usage"),
                ChatEvent::Done => break,
                ChatEvent::Error(_) => {}
            }
        }
    });

    let result = assistant.chat(message, tx).await;
    let _ = printer.await;
    println!();
    Ok(result?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_keywords_parse() {
        assert_eq!(parse_command("models"), Command::Models);
        assert_eq!(parse_command("  EXIT  "), Command::Quit);
        assert_eq!(parse_command("clear memory"), Command::ClearMemory);
    }

    #[test]
    fn arguments_keep_case() {
        assert_eq!(
            parse_command("read file /tmp/Notes.TXT"),
            Command::ReadFile("/tmp/Notes.TXT".into())
        );
        assert_eq!(
            parse_command("Model gpt-4o"),
            Command::SwitchModel("gpt-4o".into())
        );
    }

    #[test]
    fn unmatched_lines_become_chat() {
        assert_eq!(
            parse_command("tell me a joke"),
            Command::Chat("tell me a joke".into())
        );
    }

    #[test]
    fn natural_phrases_map_to_commands() {
        assert_eq!(parse_command("goodbye"), Command::Quit);
        assert_eq!(parse_command("What can you do?"), Command::Help);
        assert_eq!(parse_command("call me Dave"), Command::CallMe("Dave".into()));
    }
}
