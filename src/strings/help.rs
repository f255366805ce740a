//! # Help Text
//!
//! Command overview displayed via the `help` command.

const COMMANDS: &[(&str, &str)] = &[
    ("help", "Show this message"),
    ("status", "Show the app in progress"),
    ("finish", "Finish and build app"),
    ("cancel", "Cancel app"),
    ("template [template]", "Change app template"),
    ("name [name]", "Change app's name"),
    ("description [description]", "Change app's description"),
    ("color [color]", "Change app's color"),
    ("layout [layout]", "Change app's layout"),
    ("style [style]", "Change app's style"),
    ("code [code]", "Change app's code"),
    ("load [load]", "Change app's load"),
];

pub fn main(prefix: &str, templates: &[String]) -> String {
    let mut text = String::from("**🤖 AppBot Help**\n");
    for (command, description) in COMMANDS {
        text.push_str(&format!("* `{prefix}{command}`: {description}\n"));
    }
    if !templates.is_empty() {
        text.push_str("\n**Templates**\n");
        for template in templates {
            text.push_str(&format!("* {template}\n"));
        }
    }
    text
}
