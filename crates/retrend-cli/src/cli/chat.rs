use std::collections::HashSet;
use std::io::Write;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use retrend_core::chat::SubmitOutcome;
use retrend_core::models::{ConversationKey, Message};
use retrend_core::NavigationShell;

use super::output::Printer;

/// Follow one conversation until stdin closes.
///
/// New messages are printed as polls deliver them; each stdin line goes
/// through the composer. A lost session ends the loop with an error.
pub async fn run_chat(shell: &NavigationShell, key: ConversationKey, printer: Printer) -> Result<()> {
    let self_email = shell
        .profile()
        .map(|profile| profile.email)
        .context("Please login to chat")?;

    let mut view = shell.conversation_view();
    view.set_peer(Some(key.clone()));
    let feed = view.feed().context("Conversation did not start")?;

    let mut snapshots = feed.subscribe();
    let mut counts = shell.subscribe_counts();
    let mut counts_open = true;
    let session = shell.session();
    let mut auth = session.subscribe();
    let mut composer = shell.composer(key.clone());
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut seen: HashSet<String> = HashSet::new();

    if !printer.json {
        eprintln!("Chatting with {} about {} (Ctrl-D to leave)", key.peer, key.id);
    }

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let messages = snapshots.borrow_and_update().messages.clone();
                for message in unseen(&messages, &mut seen) {
                    if printer.json {
                        println!("{}", printer.to_json(message)?);
                    } else {
                        println!("{}", format_message(message, &self_email));
                    }
                }
                if feed.take_scroll_request() {
                    std::io::stdout().flush().context("Failed to flush stdout")?;
                }
            }
            changed = counts.changed(), if counts_open => {
                if changed.is_err() {
                    counts_open = false;
                    continue;
                }
                let current = *counts.borrow_and_update();
                if !printer.json && current.unread_messages > 0 {
                    eprintln!("({} unread message(s) in other conversations)", current.unread_messages);
                }
            }
            changed = auth.changed() => {
                if changed.is_err() || !auth.borrow_and_update().is_authenticated() {
                    view.close();
                    bail!("Session expired, please login again");
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                composer.set_input(line);
                match composer.submit().await {
                    SubmitOutcome::Sent | SubmitOutcome::Skipped => {}
                    SubmitOutcome::Rejected { notice } => eprintln!("{}", notice),
                    SubmitOutcome::Failed(e) => {
                        debug!(error = %e, "send failed");
                        eprintln!("{}", e.user_notice());
                    }
                }
            }
        }
    }

    view.close();
    Ok(())
}

/// Messages not printed yet, in feed order. Same-length snapshots can still
/// carry new ids when updates coalesce.
fn unseen<'a>(messages: &'a [Message], seen: &mut HashSet<String>) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| seen.insert(m.id.clone()))
        .collect()
}

fn format_message(message: &Message, self_email: &str) -> String {
    let author = if message.is_from(self_email) {
        "you"
    } else {
        message.from.as_str()
    };
    let stamp = message
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("[{}] {}: {}", stamp, author, message.body)
}
