use crate::core::message::{Message, MessageRole};

pub fn print_message(msg: &Message) {
    match msg.role {
        MessageRole::User => println!("\x1b[32;1myou>\x1b[0m {}", msg.content),
        MessageRole::Assistant => println!("\x1b[36mbot>\x1b[0m {}", msg.content),
    }
}

pub fn print_log(log: &[Message]) {
    if log.is_empty() {
        println!("\x1b[90m(no history)\x1b[0m");
        return;
    }
    for msg in log {
        print_message(msg);
    }
}

/// One entry per name, in list order; the active session gets a marker.
pub fn print_session_list(names: &[&str], active: Option<usize>) {
    if names.is_empty() {
        println!("No saved chats yet.");
        return;
    }
    for (i, name) in names.iter().enumerate() {
        let marker = if active == Some(i) { " *" } else { "" };
        println!("  \x1b[90m[{i}]\x1b[0m {name}{marker}");
    }
}
