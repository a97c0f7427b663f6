use anyhow::Result;
use std::io::{self, Write};

use super::{output, App};
use crate::core::context::ContextKey;
use crate::core::message::UserInput;

pub async fn run(mut app: App) -> Result<()> {
    println!("\x1b[1mbrainbot\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    let context = app.controller.context();
    println!(
        "Context: \x1b[36m{context}\x1b[0m - {}",
        ContextKey::describe_opt(Some(context))
    );
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    output::print_message(&app.controller.startup_welcome());

    loop {
        eprint!("\x1b[32;1mbrainbot>\x1b[0m ");
        io::stderr().flush().ok();

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        }

        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_command(&input, &mut app).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    eprintln!("\x1b[31mCommand error: {e}\x1b[0m");
                    continue;
                }
            }
        }

        submit(&input, &mut app).await?;
    }

    Ok(())
}

async fn submit(text: &str, app: &mut App) -> Result<()> {
    let input = UserInput::Text(text.to_string());
    match app.controller.submit_message(&input) {
        Ok(log) => {
            if let Some(reply) = log.last() {
                output::print_message(reply);
            }
        }
        Err(e) => {
            eprintln!("\x1b[31mGeneration failed: {e}\x1b[0m");
            return Ok(());
        }
    }
    if let Some(index) = app.controller.active_index() {
        app.persist_session_at(index).await?;
    }
    Ok(())
}

async fn handle_command(input: &str, app: &mut App) -> Result<bool> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let rest = input[command.len()..].trim();

    match command {
        "/help" | "/h" => {
            println!("\x1b[1mCommands:\x1b[0m");
            println!("  /help                Show this help");
            println!("  /new                 Start a new chat (archives the current one)");
            println!("  /sessions            List saved chats");
            println!("  /switch <n>          Load chat n");
            println!("  /rename <n> <name>   Rename chat n");
            println!("  /delete <n>          Delete chat n");
            println!("  /context <key>       Switch context (starts a new chat)");
            println!("  /similar <text>      Find archived chats similar to <text>");
            println!("  /exit                Exit");
            Ok(true)
        }
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            Ok(false)
        }
        "/new" => {
            let before = app.controller.store().len();
            let fresh = app.controller.start_new_chat().to_vec();
            if app.controller.store().len() > before {
                app.persist_session_at(before).await?;
            }
            output::print_log(&fresh);
            output::print_session_list(&app.controller.session_names(), None);
            Ok(true)
        }
        "/sessions" | "/s" => {
            output::print_session_list(
                &app.controller.session_names(),
                app.controller.active_index(),
            );
            Ok(true)
        }
        "/switch" => {
            let Some(index) = rest.parse::<usize>().ok() else {
                eprintln!("Usage: /switch <n>");
                return Ok(true);
            };
            let log = app.controller.switch_to(index);
            if log.is_empty() {
                println!("No history available for this session.");
            } else {
                output::print_log(&log);
            }
            Ok(true)
        }
        "/rename" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let index = args.next().and_then(|s| s.parse::<usize>().ok());
            let new_name = args.next().map(str::trim).unwrap_or_default();
            let Some(index) = index else {
                eprintln!("Usage: /rename <n> <name>");
                return Ok(true);
            };
            match app.controller.rename(index, new_name) {
                Ok(()) => {
                    app.persist_session_at(index).await?;
                    output::print_session_list(
                        &app.controller.session_names(),
                        app.controller.active_index(),
                    );
                }
                Err(e) => eprintln!("\x1b[31m{e}\x1b[0m"),
            }
            Ok(true)
        }
        "/delete" => {
            let Some(index) = rest.parse::<usize>().ok() else {
                eprintln!("Usage: /delete <n>");
                return Ok(true);
            };
            match app.controller.delete(index) {
                Some(removed) => {
                    app.persist_delete(&removed).await?;
                    println!("Deleted '{}'.", removed.name);
                }
                None => println!("No session at index {index}."),
            }
            Ok(true)
        }
        "/context" => {
            let Some(context) = ContextKey::parse(rest) else {
                eprintln!(
                    "Unknown context '{rest}'. Available: {}",
                    ContextKey::ALL.map(|c| c.to_string()).join(", ")
                );
                return Ok(true);
            };
            let before = app.controller.store().len();
            let fresh = app.controller.set_context(context).to_vec();
            if app.controller.store().len() > before {
                app.persist_session_at(before).await?;
            }
            output::print_log(&fresh);
            Ok(true)
        }
        "/similar" => {
            if rest.is_empty() {
                eprintln!("Usage: /similar <text>");
                return Ok(true);
            }
            let Some(db) = &app.db else {
                println!("Archive disabled; /similar is unavailable.");
                return Ok(true);
            };
            let hits = db.archive().find_similar(rest, 5).await?;
            if hits.is_empty() {
                println!("No similar chats found.");
            } else {
                for hit in hits {
                    println!("  {} ({} messages)", hit.name, hit.log.len());
                }
            }
            Ok(true)
        }
        _ => {
            eprintln!("Unknown command: {command}. Type /help for available commands.");
            Ok(true)
        }
    }
}
