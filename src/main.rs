//! Purpose: `lodgeit` CLI entry point and command dispatch.
//! Role: Binary crate root; parses args, runs one remote operation, prints results.
//! Invariants: Human-readable output by default, `--json` for machine output.
//! Invariants: Errors go to stderr (text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `api::to_exit_code`.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::aot::Shell;
use serde_json::json;

mod paste_json;
mod rcfile;

use lodgeit::api::{
    Error, ErrorKind, NewPasteOptions, Paste, PastebinClient, SERVICE_URL, to_exit_code,
};
use paste_json::{count_json, format_pub_date, paste_json};

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<(), Error> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Completion { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::aot::generate(*shell, &mut command, "lodgeit", &mut io::stdout());
        return Ok(());
    }

    let client = PastebinClient::with_endpoint(cli.service_url.clone())?;

    match cli.command {
        Command::Paste {
            file,
            language,
            title,
            author,
            tags,
            private,
            json,
        } => cmd_paste(&client, file, language, title, author, tags, private, json),
        Command::Get { uid, json } => cmd_get(&client, &uid, json),
        Command::Recent { count, json } => cmd_recent(&client, count, json),
        Command::Tagged { tag, json } => cmd_tagged(&client, &tag, json),
        Command::Languages { json } => cmd_languages(&client, json),
        Command::Styles { json } => cmd_styles(&client, json),
        Command::Style { name, prefix } => cmd_style(&client, &name, &prefix),
        Command::Tags { json } => cmd_tags(&client, json),
        Command::Count { json } => cmd_count(&client, json),
        Command::Url { uid } => cmd_url(&client, &uid),
        Command::Completion { .. } => unreachable!("handled before client construction"),
    }
}

#[derive(Parser)]
#[command(
    name = "lodgeit",
    version,
    about = "Paste code to a LodgeIt pastebin and query its metadata",
    after_help = r#"EXAMPLES
  $ lodgeit paste hello.py
  $ echo 'print(1)' | lodgeit paste -l python --title demo
  $ lodgeit get a7Gb
  $ lodgeit recent -n 5
  $ lodgeit languages

Defaults for language, author, title, and private can be set in ~/.lodgeitrc
(key=value lines)."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Service endpoint URL", default_value = SERVICE_URL)]
    service_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Create a paste from a file or stdin and print its URL")]
    Paste {
        #[arg(help = "File to paste (stdin when omitted)")]
        file: Option<PathBuf>,
        #[arg(
            short,
            long,
            help = "Highlighting language alias (guessed from the filename when omitted)"
        )]
        language: Option<String>,
        #[arg(long, help = "Paste title")]
        title: Option<String>,
        #[arg(long, help = "Paste author")]
        author: Option<String>,
        #[arg(long = "tag", help = "Repeatable tag for the paste")]
        tags: Vec<String>,
        #[arg(short, long, help = "Create a private paste")]
        private: bool,
        #[arg(long, help = "Emit the created paste record as JSON")]
        json: bool,
    },
    #[command(about = "Download a paste and print its code")]
    Get {
        #[arg(help = "Paste uid")]
        uid: String,
        #[arg(long, help = "Emit the full paste record as JSON")]
        json: bool,
    },
    #[command(about = "List the most recent public pastes")]
    Recent {
        #[arg(short = 'n', long, default_value_t = 10, help = "Number of pastes")]
        count: u32,
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    #[command(about = "List pastes carrying a tag")]
    Tagged {
        #[arg(help = "Tag name")]
        tag: String,
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    #[command(about = "List supported highlighting languages")]
    Languages {
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    #[command(about = "List available stylesheet names")]
    Styles {
        #[arg(long, help = "Emit JSON instead of a list")]
        json: bool,
    },
    #[command(about = "Print the CSS of a style")]
    Style {
        #[arg(help = "Style name")]
        name: String,
        #[arg(
            long,
            default_value = "",
            help = "Selector prefix applied by the service (e.g. 'div.syntax')"
        )]
        prefix: String,
    },
    #[command(about = "Print the tag cloud")]
    Tags {
        #[arg(long, help = "Emit JSON instead of a table")]
        json: bool,
    },
    #[command(about = "Print paste counts")]
    Count {
        #[arg(long, help = "Emit JSON instead of text")]
        json: bool,
    },
    #[command(about = "Print the URL of a paste")]
    Url {
        #[arg(help = "Paste uid")]
        uid: String,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[allow(clippy::too_many_arguments)]
fn cmd_paste(
    client: &PastebinClient,
    file: Option<PathBuf>,
    language: Option<String>,
    title: Option<String>,
    author: Option<String>,
    tags: Vec<String>,
    private: bool,
    json: bool,
) -> Result<(), Error> {
    let defaults = rcfile::load_defaults();
    let code = read_input(file.as_deref())?;
    if code.trim().is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("nothing to paste, input is empty"));
    }

    let mut options = NewPasteOptions::new();
    options.language = resolve_language(client, language.or(defaults.language), file.as_deref())?;
    options.private = private || defaults.private.unwrap_or(false);
    if let Some(title) = title.or(defaults.title) {
        options.title = title;
    }
    if let Some(author) = author.or(defaults.author) {
        options.author = author;
    }
    options.tags = tags;

    match client.new_paste(&code, &options)? {
        Some(paste) => {
            if json {
                println!("{}", paste_json(&paste));
            } else if paste.url().is_empty() {
                println!("{}", paste.uid());
            } else {
                println!("{}", paste.url());
            }
            Ok(())
        }
        None => Err(Error::new(ErrorKind::Fault)
            .with_message("the service declined to create the paste")
            .with_hint("The code may be empty after server-side filtering; try again.")),
    }
}

fn cmd_get(client: &PastebinClient, uid: &str, json: bool) -> Result<(), Error> {
    match client.get_paste(uid)? {
        Some(paste) => {
            if json {
                println!("{}", paste_json(&paste));
            } else {
                print!("{}", paste.code());
                if !paste.code().ends_with('\n') {
                    println!();
                }
            }
            Ok(())
        }
        None => Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("paste '{uid}' does not exist"))),
    }
}

fn cmd_recent(client: &PastebinClient, count: u32, json: bool) -> Result<(), Error> {
    let pastes = client.get_recent_pastes(count)?;
    emit_paste_list(&pastes, json);
    Ok(())
}

fn cmd_tagged(client: &PastebinClient, tag: &str, json: bool) -> Result<(), Error> {
    let pastes = client.get_pastes_for_tag(tag)?;
    emit_paste_list(&pastes, json);
    Ok(())
}

fn cmd_languages(client: &PastebinClient, json: bool) -> Result<(), Error> {
    let languages = client.languages()?;
    if json {
        println!("{}", json!(languages));
    } else {
        for (alias, name) in languages {
            println!("{alias:<24}{name}");
        }
    }
    Ok(())
}

fn cmd_styles(client: &PastebinClient, json: bool) -> Result<(), Error> {
    let styles = client.style_list()?;
    if json {
        println!("{}", json!(styles));
    } else {
        for style in styles {
            println!("{style}");
        }
    }
    Ok(())
}

fn cmd_style(client: &PastebinClient, name: &str, prefix: &str) -> Result<(), Error> {
    match client.get_style(name, prefix)? {
        Some(css) => {
            println!("{css}");
            Ok(())
        }
        None => Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("style '{name}' does not exist"))),
    }
}

fn cmd_tags(client: &PastebinClient, json: bool) -> Result<(), Error> {
    let entries = client.tag_cloud()?;
    if json {
        println!(
            "{}",
            serde_json::to_string(&entries).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode tag cloud")
                    .with_source(err)
            })?
        );
    } else {
        for entry in entries {
            println!("{:<24}{:>6}", entry.name, entry.count);
        }
    }
    Ok(())
}

fn cmd_count(client: &PastebinClient, json: bool) -> Result<(), Error> {
    let total = client.paste_count()?;
    let public = client.public_count()?;
    let private = client.private_count()?;
    if json {
        println!("{}", count_json(total, public, private));
    } else {
        println!("pastes:  {total}");
        println!("public:  {public}");
        println!("private: {private}");
    }
    Ok(())
}

fn cmd_url(client: &PastebinClient, uid: &str) -> Result<(), Error> {
    match client.get_paste_url(uid)? {
        Some(url) => {
            println!("{url}");
            Ok(())
        }
        None => Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("paste '{uid}' does not exist"))),
    }
}

fn emit_paste_list(pastes: &[Paste], json: bool) {
    if json {
        let records = pastes.iter().map(paste_json).collect::<Vec<_>>();
        println!("{}", json!(records));
    } else {
        for paste in pastes {
            println!(
                "{:<12}{:<22}{:<16}{}",
                paste.uid(),
                format_pub_date(paste),
                paste.language(),
                paste.title()
            );
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String, Error> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read '{}'", path.display()))
                .with_source(err)
        }),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(buffer)
        }
    }
}

fn resolve_language(
    client: &PastebinClient,
    language: Option<String>,
    file: Option<&Path>,
) -> Result<String, Error> {
    if let Some(language) = language {
        return Ok(language);
    }
    if let Some(path) = file {
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            if let Some(alias) = client.alias_for_filename(name)? {
                return Ok(alias);
            }
        }
        if let Some(mime) = mime_guess::from_path(path).first() {
            if let Some(alias) = client.alias_for_mimetype(mime.essence_str())? {
                return Ok(alias);
            }
        }
    }
    Ok("text".to_string())
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("  hint: {hint}");
        }
        return;
    }

    let value = json!({
        "error": {
            "kind": format!("{:?}", err.kind()),
            "message": err.message(),
            "method": err.method(),
            "fault_code": err.fault_code(),
            "hint": err.hint(),
        }
    });
    eprintln!("{value}");
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
