//! Interactive REPL for rating wallpapers.
//!
//! Launch with `wallpaper-rater repl` (or no subcommand) to enter interactive
//! mode. Type `/help` for available commands, Tab for completion.

use std::path::Path;

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use wallpaper_rater::{is_supported_format, reachable_scores, Rater};

use crate::render;
use crate::session::RatingSession;

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/rate", "Rate an image file and add it to the history"),
    ("/list", "List rated images (--json for machine output)"),
    ("/show", "Show the measurements behind a rating"),
    ("/delete", "Delete a rating by its number"),
    ("/clear", "Delete every rating"),
    ("/thumb", "Save a rating's thumbnail: /thumb <n> <out.jpg>"),
    ("/captions", "Show the caption table"),
    ("/policy", "Show the rating policy"),
    ("/cls", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// What the loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// REPL helper for tab completion.
#[derive(Default)]
struct RaterHelper;

impl Completer for RaterHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Image file completion
        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let cmd = parts[0];
        let args = if parts.len() > 1 { parts[1] } else { "" };

        if cmd == "/rate" {
            let prefix_start = input.len() - args.len();
            let matches: Vec<Pair> = image_files_in(".")
                .into_iter()
                .filter(|f| f.starts_with(args.trim()))
                .map(|f| Pair {
                    display: f.clone(),
                    replacement: format!("{f} "),
                })
                .collect();
            return Ok((prefix_start, matches));
        }

        Ok((pos, Vec::new()))
    }
}

fn image_files_in(dir: &str) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                if is_supported_format(name) {
                    files.push(name.to_string());
                }
            }
        }
    }
    files.sort();
    files
}

impl Hinter for RaterHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for RaterHelper {}
impl Validator for RaterHelper {}
impl Helper for RaterHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL with a fresh session.
pub fn run(rater: Rater) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mwallpaper-rater v{}\x1b[0m \x1b[90m\u{2014} How good is your wallpaper?\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<RaterHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(RaterHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".wallpaper_rater_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let mut session = RatingSession::new(rater);
    let prompt = " \x1b[36mrate>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                for out in execute(&mut session, &line).lines {
                    eprintln!("{out}");
                }
                if execute_flow(&line) == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

/// Output of one REPL command.
#[derive(Debug, Default)]
pub struct Output {
    pub lines: Vec<String>,
}

impl Output {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(format!("  {}", line.into()));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }
}

fn split_command(line: &str) -> (&str, &str) {
    let line = line.trim();
    let input = line.strip_prefix('/').unwrap_or(line);
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();
    (cmd, args)
}

fn execute_flow(line: &str) -> Flow {
    match split_command(line).0 {
        "exit" | "quit" => Flow::Exit,
        _ => Flow::Continue,
    }
}

/// Run one command line against the session.
pub fn execute(session: &mut RatingSession, line: &str) -> Output {
    let mut out = Output::default();
    if line.trim().is_empty() {
        return out;
    }

    let (cmd, args) = split_command(line);
    match cmd {
        "" | "help" | "h" | "?" => cmd_help(&mut out),
        "exit" | "quit" => out.push("\x1b[90m\u{2728}\x1b[0m Goodbye!"),
        "cls" => out.lines.push("\x1b[2J\x1b[H".to_string()),
        "rate" => cmd_rate(session, args, &mut out),
        "list" | "ls" => cmd_list(session, args, &mut out),
        "show" => cmd_show(session, args, &mut out),
        "delete" | "rm" => cmd_delete(session, args, &mut out),
        "clear" => {
            let count = session.history().len();
            session.clear();
            out.push(format!("Cleared {count} rating(s)."));
        }
        "thumb" => cmd_thumb(session, args, &mut out),
        "captions" => cmd_captions(session, &mut out),
        "policy" => cmd_policy(session, &mut out),
        _ => out.push(format!("Unknown command '/{cmd}'. Type /help for commands.")),
    }
    out
}

fn cmd_help(out: &mut Output) {
    out.blank();
    out.push("Commands:");
    out.blank();
    for (cmd, desc) in COMMANDS {
        out.push(format!("  {cmd:<18} {desc}"));
    }
    out.blank();
    out.push("Tip: Tab completion works for commands and image files.");
    out.blank();
}

fn cmd_rate(session: &mut RatingSession, args: &str, out: &mut Output) {
    if args.is_empty() {
        out.push("Usage: /rate <image file>");
        return;
    }
    match session.rate_file(args) {
        Ok((_, rating)) => {
            out.push(render::rating_line(&rating));
            out.push(format!(
                "Saved as #{}. Use /show {} for details.",
                session.history().len(),
                session.history().len()
            ));
        }
        Err(e) => out.push(format!("Could not rate {args}: {e}")),
    }
}

fn cmd_list(session: &RatingSession, args: &str, out: &mut Output) {
    if args == "--json" {
        match serde_json::to_string_pretty(&render::history_json(session.history())) {
            Ok(json) => out.push(json),
            Err(e) => out.push(format!("Could not serialize history: {e}")),
        }
        return;
    }
    out.blank();
    for line in render::history_listing(session.history()) {
        out.push(line);
    }
    out.blank();
}

fn parse_position(args: &str, usage: &str, out: &mut Output) -> Option<usize> {
    match args.split_whitespace().next().map(str::parse::<usize>) {
        Some(Ok(n)) => Some(n),
        _ => {
            out.push(usage);
            None
        }
    }
}

fn cmd_show(session: &RatingSession, args: &str, out: &mut Output) {
    let Some(position) = parse_position(args, "Usage: /show <n>", out) else {
        return;
    };
    match session.entry(position) {
        Some(entry) => {
            out.blank();
            out.push(format!("#{position} {}", entry.reference.source));
            out.push(format!("Rating: {} - {}", entry.score, entry.caption));
            for line in render::metrics_lines(&entry.metrics) {
                out.push(format!("  {line}"));
            }
            out.blank();
        }
        None => out.push(format!("No rating #{position}.")),
    }
}

fn cmd_delete(session: &mut RatingSession, args: &str, out: &mut Output) {
    let Some(position) = parse_position(args, "Usage: /delete <n>", out) else {
        return;
    };
    if session.delete_position(position) {
        out.push(format!("Deleted #{position}."));
    } else {
        out.push(format!("No rating #{position}; nothing deleted."));
    }
}

fn cmd_thumb(session: &RatingSession, args: &str, out: &mut Output) {
    let mut parts = args.split_whitespace();
    let (Some(Ok(position)), Some(path)) = (parts.next().map(str::parse::<usize>), parts.next())
    else {
        out.push("Usage: /thumb <n> <out.jpg>");
        return;
    };
    match session.export_thumbnail(position, Path::new(path)) {
        Ok(()) => out.push(format!("Thumbnail written to {path}")),
        Err(e) => out.push(format!("Could not write thumbnail: {e}")),
    }
}

fn cmd_captions(session: &RatingSession, out: &mut Output) {
    let reachable = reachable_scores(session.rater().policy());
    out.blank();
    for line in render::caption_listing(session.rater().captions(), &reachable) {
        out.push(line);
    }
    out.blank();
    out.push("* reachable under the current policy");
    out.blank();
}

fn cmd_policy(session: &RatingSession, out: &mut Output) {
    match serde_json::to_string_pretty(session.rater().policy()) {
        Ok(json) => {
            for line in json.lines() {
                out.push(line);
            }
        }
        Err(e) => out.push(format!("Cannot render policy: {e}")),
    }
}
