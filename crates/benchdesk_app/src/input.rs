use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use benchdesk_core::Msg;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Msg(Msg),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  y | n               answer the visible prompt
  ok | close          confirm or close the visible dialog
  read <id>           mark a notification read
  delete <id>         delete a notification
  refresh             fetch new notifications
  open <n> | up       enter folder entry n / go to the parent folder
  select              use the current folder or file
  email <text>        add email addresses (paste-style)
  chip <address>      add one typed email address
  emails <json>       seed email chips from a JSON list
  unemail <n>         remove email chip n
  hide                close the YAML viewer
  quit";

/// Parses one line typed by the user.
pub fn parse_command(line: &str) -> Option<Input> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let msg = match (word.to_ascii_lowercase().as_str(), rest) {
        ("y" | "yes", "") => Msg::PromptAnswered { approved: true },
        ("n" | "no", "") => Msg::PromptAnswered { approved: false },
        ("ok", "") => Msg::ModalConfirmed,
        ("close", "") => Msg::ModalClosed,
        ("read", id) if !id.is_empty() => Msg::MarkNotificationRead { id: id.to_string() },
        ("delete", id) if !id.is_empty() => Msg::DeleteNotification { id: id.to_string() },
        ("refresh", "") => Msg::NotificationsRequested,
        ("open", index) => Msg::FolderEntryClicked(index.parse().ok()?),
        ("up", "") => Msg::FolderParentClicked,
        ("select", "") => Msg::FolderSelectionConfirmed,
        ("email", text) if !text.is_empty() => Msg::EmailsPasted(text.to_string()),
        ("chip", text) if !text.is_empty() => Msg::EmailKeyEntered(text.to_string()),
        ("emails", json) if !json.is_empty() => Msg::EmailsSeeded(json.to_string()),
        ("unemail", index) => Msg::EmailChipRemoved(index.parse().ok()?),
        ("hide", "") => Msg::YamlHidden,
        ("help" | "?", "") => return Some(Input::Help),
        ("quit" | "q" | "exit", "") => return Some(Input::Quit),
        _ => return None,
    };
    Some(Input::Msg(msg))
}

/// Reads stdin on a background thread. The sender is dropped at EOF.
pub fn spawn_reader(tx: mpsc::Sender<Option<Input>>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(parse_command(&line)).is_err() {
                return;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_answers() {
        assert_eq!(
            parse_command("Y"),
            Some(Input::Msg(Msg::PromptAnswered { approved: true }))
        );
        assert_eq!(
            parse_command(" no "),
            Some(Input::Msg(Msg::PromptAnswered { approved: false }))
        );
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_command("read 42"),
            Some(Input::Msg(Msg::MarkNotificationRead { id: "42".into() }))
        );
        assert_eq!(
            parse_command("open 2"),
            Some(Input::Msg(Msg::FolderEntryClicked(2)))
        );
        assert_eq!(
            parse_command("email a@b.com, c@d.com"),
            Some(Input::Msg(Msg::EmailsPasted("a@b.com, c@d.com".into())))
        );
    }

    #[test]
    fn email_chip_commands() {
        assert_eq!(
            parse_command("chip ada@lab.org,"),
            Some(Input::Msg(Msg::EmailKeyEntered("ada@lab.org,".into())))
        );
        assert_eq!(
            parse_command(r#"emails ["ada@lab.org", "bo@lab.org"]"#),
            Some(Input::Msg(Msg::EmailsSeeded(
                r#"["ada@lab.org", "bo@lab.org"]"#.into()
            )))
        );
        assert_eq!(parse_command("chip"), None);
    }

    #[test]
    fn unknown_or_incomplete_commands_are_rejected() {
        assert_eq!(parse_command("open two"), None);
        assert_eq!(parse_command("read"), None);
        assert_eq!(parse_command("dance"), None);
        assert_eq!(parse_command("y please"), None);
    }

    #[test]
    fn quit_and_help() {
        assert_eq!(parse_command("q"), Some(Input::Quit));
        assert_eq!(parse_command("?"), Some(Input::Help));
    }
}
