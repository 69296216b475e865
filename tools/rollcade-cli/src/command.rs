//! Command notation inspector

use clap::Args;
use rollcade_core::command::{CommandElement, KeySet};
use rollcade_core::Command;

/// Arguments for the command subcommand
#[derive(Args)]
pub struct CommandArgs {
    /// Move notation, e.g. "~D, DF, F, a"
    pub notation: String,
}

pub fn execute(args: CommandArgs) {
    let command = Command::parse(&args.notation);
    print!("{}", describe(&command));
}

fn keys(set: &KeySet) -> String {
    set.iter()
        .map(|k| k.notation())
        .collect::<Vec<_>>()
        .join("+")
}

fn flags(elem: &CommandElement) -> String {
    let mut flags = Vec::new();
    if elem.slash {
        flags.push("hold");
    }
    if elem.greater {
        flags.push("strict");
    }
    if elem.direction {
        flags.push("direction");
    }
    flags.join(",")
}

fn describe(command: &Command) -> String {
    let mut out = String::new();
    for (i, elem) in command.elements.iter().enumerate() {
        out.push_str(&format!("{:>2}: {}", i, keys(&elem.keys)));
        if elem.charge_time > 1 {
            out.push_str(&format!("  charge={}", elem.charge_time));
        }
        let flags = flags(elem);
        if !flags.is_empty() {
            out.push_str(&format!("  [{}]", flags));
        }
        out.push('\n');
    }
    for hold in &command.hold {
        out.push_str(&format!("hold: {}\n", keys(hold)));
    }
    out
}
