use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::{
    error::Error,
    fs,
    io::{self, BufRead, Read, Write},
    path::{Path, PathBuf},
    sync::mpsc,
    thread,
};
use wordtally::{
    config::{Config, ConfigStore, FileConfigStore},
    document::{export, export_file_name, ExportFormat},
    goal::{compute_progress_with_pace, GoalConfig, GoalEvent, GoalUnit, ProgressSnapshot},
    language::{LanguageProfile, LanguageTag},
    metrics::{compute_metrics, compute_metrics_for_tag, TextMetrics},
    runtime::{ChannelEventSource, FixedTicker, Pumped, Runner, SessionEvent},
    session::DocumentSession,
    store::SqliteStore,
    util::format_hms,
};

/// multilingual word counter with writing goals and auto-saved documents
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Counts words, characters and paragraphs in Chinese, Japanese, Korean, English and Spanish text, estimates reading time, and tracks progress toward a writing goal across locally saved documents."
)]
pub struct Cli {
    /// document store to use instead of the default state directory
    #[clap(long, global = true)]
    store: Option<PathBuf>,

    /// config file to use instead of the default config directory
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// count a file (or stdin) without touching the document store
    Count {
        /// file to read; stdin when omitted
        file: Option<PathBuf>,

        /// language tag deciding how words are counted (zh, en, es, ja, ko, ...)
        #[clap(short = 'l', long)]
        lang: Option<String>,

        /// goal target to report progress against
        #[clap(short = 'g', long)]
        goal: Option<String>,

        /// unit the goal is measured in
        #[clap(short = 'u', long, value_enum)]
        unit: Option<GoalUnit>,

        /// print JSON instead of text
        #[clap(long)]
        json: bool,
    },
    /// create a new document, optionally filled from a file
    New {
        #[clap(short = 't', long)]
        title: Option<String>,
        file: Option<PathBuf>,
    },
    /// list saved documents, newest first
    List,
    /// open a document and show its metrics
    Show { id: String },
    /// replace a document's content with a file (or stdin)
    Save {
        id: String,
        #[clap(short = 't', long)]
        title: Option<String>,
        file: Option<PathBuf>,
        /// writing time to record, in seconds
        #[clap(long)]
        seconds: Option<u64>,
    },
    /// delete a document
    Delete { id: String },
    /// export a document as plain text or markdown
    Export {
        id: String,
        #[clap(short = 'f', long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,
        /// output file, or a directory to place a file named after the title
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// print a document's word-count history as CSV
    History { id: String },
    /// show or change the writing goal
    Goal {
        /// new target, e.g. 750
        #[clap(short = 't', long)]
        target: Option<String>,
        #[clap(short = 'u', long, value_enum)]
        unit: Option<GoalUnit>,
    },
    /// show or change the counting language
    Lang {
        #[clap(value_enum)]
        tag: Option<LanguageTag>,
    },
    /// stream stdin into a document line by line, auto-saving as it goes
    Write {
        /// document to write into; the current one when omitted
        #[clap(long)]
        id: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let config = config_store.load();
    log::debug!("Loaded config from {}", config_store.path().display());

    let command = match cli.command {
        Command::Count {
            file,
            lang,
            goal,
            unit,
            json,
        } => {
            let text = read_input(file.as_deref())?;
            return run_count(&config, &text, lang.as_deref(), goal.as_deref(), unit, json);
        }
        other => other,
    };

    let store = match cli.store.as_ref().or(config.store_path.as_ref()) {
        Some(path) => SqliteStore::open(path)?,
        None => SqliteStore::new()?,
    };
    let mut session = DocumentSession::open(store, &config);

    match command {
        Command::Count { .. } => {}
        Command::New { title, file } => {
            let id = session.create_document().id.clone();
            if title.is_some() || file.is_some() {
                let content = match file {
                    Some(path) => fs::read_to_string(path)?,
                    None => String::new(),
                };
                session.save_document(&id, title.as_deref().unwrap_or(""), &content, 0);
            }
            println!("{id}");
        }
        Command::List => {
            let current = session.current_id().to_string();
            for summary in session.summaries() {
                let marker = if summary.id == current { '*' } else { ' ' };
                println!(
                    "{marker} {}  {}  {:>7}  {}",
                    summary.id,
                    summary
                        .updated_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M"),
                    summary.word_count,
                    summary.title
                );
            }
        }
        Command::Show { id } => {
            open_or_exit(&mut session, &id);
            let profile = LanguageProfile::for_tag(session.language());
            println!("{}", session.title());
            print_metrics(&profile, &session.metrics());
            print_progress(&profile, session.goal(), &session.progress());
            println!("writing time: {}", session.timer().display());
            if let Some(rate) = session.trend() {
                println!("trend: {rate:.1} {}/min", profile.words);
            }
        }
        Command::Save {
            id,
            title,
            file,
            seconds,
        } => {
            let existing = match session.document(&id) {
                Some(doc) => doc.clone(),
                None => not_found(&id),
            };
            let content = read_input(file.as_deref())?;
            let title = title.unwrap_or(existing.title);
            let seconds = seconds.unwrap_or(existing.writing_time_seconds);
            if let Some(saved) = session.save_document(&id, &title, &content, seconds) {
                println!("{} words  {}", saved.metrics.word_count, saved.title);
            }
        }
        Command::Delete { id } => {
            if !session.delete_document(&id) {
                not_found(&id);
            }
            println!("current: {}", session.current_id());
        }
        Command::Export { id, format, output } => {
            let record = match session.document(&id) {
                Some(doc) => doc,
                None => not_found(&id),
            };
            let payload = export(record, format);
            match output {
                Some(path) if path.is_dir() => {
                    let target = path.join(export_file_name(record, format));
                    fs::write(&target, payload)?;
                    println!("{}", target.display());
                }
                Some(path) => fs::write(path, payload)?,
                None => io::stdout().write_all(payload.as_bytes())?,
            }
        }
        Command::History { id } => {
            let record = match session.document(&id) {
                Some(doc) => doc,
                None => not_found(&id),
            };
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for point in record.history.iter() {
                wtr.serialize(point)?;
            }
            wtr.flush()?;
        }
        Command::Goal { target, unit } => {
            let mut goal = session.goal();
            if target.is_some() || unit.is_some() {
                if let Some(target) = target {
                    goal.target_value = GoalConfig::parse_target(&target);
                }
                if let Some(unit) = unit {
                    goal.unit = unit;
                }
                session.on_goal_changed(goal);
            }
            println!("{} {}", goal.effective_target(), goal.unit);
        }
        Command::Lang { tag } => {
            if let Some(tag) = tag {
                session.on_language_changed(tag);
            }
            let profile = LanguageProfile::for_tag(session.language());
            println!("{} ({})", session.language(), profile.name);
        }
        Command::Write { id } => {
            if let Some(id) = id {
                open_or_exit(&mut session, &id);
            }
            run_write(&config, &mut session)?;
        }
    }

    Ok(())
}

fn run_count(
    config: &Config,
    text: &str,
    lang: Option<&str>,
    goal: Option<&str>,
    unit: Option<GoalUnit>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let (metrics, profile) = match lang {
        Some(tag) => {
            let profile = tag
                .parse::<LanguageTag>()
                .map(LanguageProfile::for_tag)
                .unwrap_or_else(|_| LanguageProfile::for_tag(LanguageTag::En));
            (compute_metrics_for_tag(text, tag), profile)
        }
        None => (
            compute_metrics(text, config.language),
            LanguageProfile::for_tag(config.language),
        ),
    };
    let goal = GoalConfig::new(
        goal.map(GoalConfig::parse_target)
            .unwrap_or(config.goal_target),
        unit.unwrap_or(config.goal_unit),
    );
    let progress = compute_progress_with_pace(&metrics, &goal, config.writing_pace);

    if json {
        let out = serde_json::json!({ "metrics": metrics, "progress": progress });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_metrics(&profile, &metrics);
        print_progress(&profile, goal, &progress);
    }
    Ok(())
}

fn run_write(
    config: &Config,
    session: &mut DocumentSession<SqliteStore>,
) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    let mut content = session.content().to_string();

    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(&line);
            if tx.send(SessionEvent::TextChanged(content.clone())).is_err() {
                break;
            }
        }
    });

    let mut runner = Runner::new(
        ChannelEventSource::new(rx),
        FixedTicker::every_second(),
        config.autosave_secs,
    );
    let profile = LanguageProfile::for_tag(session.language());

    loop {
        match runner.pump(session) {
            Pumped::Updated(update) => match update.goal_event {
                Some(GoalEvent::Reached) => eprintln!("goal reached!"),
                Some(GoalEvent::Regressed) => eprintln!("back below the goal"),
                None => {}
            },
            Pumped::Ticked { flushed: true } => log::debug!("autosaved {}", session.current_id()),
            Pumped::Ticked { .. } | Pumped::TitleChanged => {}
            Pumped::Disconnected => break,
        }
    }

    print_metrics(&profile, &session.metrics());
    print_progress(&profile, session.goal(), &session.progress());
    println!("writing time: {}", format_hms(session.timer().accumulated_seconds));
    Ok(())
}

fn print_metrics(profile: &LanguageProfile, metrics: &TextMetrics) {
    println!("{}: {}", profile.words, metrics.word_count);
    println!("{}: {}", profile.chars, metrics.char_count);
    println!("{}: {}", profile.paragraphs, metrics.paragraph_count);
    println!("{} {}", metrics.reading_minutes, profile.reading_time);
}

fn print_progress(profile: &LanguageProfile, goal: GoalConfig, progress: &ProgressSnapshot) {
    let unit = match goal.unit {
        GoalUnit::Words => &profile.words,
        GoalUnit::Chars => &profile.chars,
    };
    if progress.is_complete {
        println!("goal: {}% ({} {unit}) complete", progress.percentage, goal.effective_target());
    } else {
        println!(
            "goal: {}% ({} {unit} to go, ~{} min)",
            progress.percentage, progress.remaining, progress.estimated_minutes_remaining
        );
    }
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn open_or_exit(session: &mut DocumentSession<SqliteStore>, id: &str) {
    if !session.load_document(id) {
        not_found(id);
    }
}

fn not_found(id: &str) -> ! {
    let mut cmd = Cli::command();
    cmd.error(ErrorKind::InvalidValue, format!("document not found: {id}"))
        .exit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_count_defaults() {
        let cli = Cli::parse_from(["wordtally", "count"]);
        assert_eq!(
            cli.command,
            Command::Count {
                file: None,
                lang: None,
                goal: None,
                unit: None,
                json: false,
            }
        );
        assert_eq!(cli.store, None);
    }

    #[test]
    fn test_cli_count_options() {
        let cli = Cli::parse_from([
            "wordtally", "count", "notes.txt", "-l", "ja", "-g", "800", "-u", "chars", "--json",
        ]);
        assert_eq!(
            cli.command,
            Command::Count {
                file: Some(PathBuf::from("notes.txt")),
                lang: Some("ja".into()),
                goal: Some("800".into()),
                unit: Some(GoalUnit::Chars),
                json: true,
            }
        );
    }

    #[test]
    fn test_cli_global_store_after_subcommand() {
        let cli = Cli::parse_from(["wordtally", "list", "--store", "/tmp/docs.db"]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/docs.db")));
        assert_eq!(cli.command, Command::List);
    }

    #[test]
    fn test_cli_export_format() {
        let cli = Cli::parse_from(["wordtally", "export", "abc"]);
        assert_eq!(
            cli.command,
            Command::Export {
                id: "abc".into(),
                format: ExportFormat::Markdown,
                output: None,
            }
        );

        let cli = Cli::parse_from(["wordtally", "export", "abc", "-f", "plain-text"]);
        assert!(matches!(
            cli.command,
            Command::Export {
                format: ExportFormat::PlainText,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_lang_rejects_unknown_tag() {
        assert!(Cli::try_parse_from(["wordtally", "lang", "fr"]).is_err());
        let cli = Cli::parse_from(["wordtally", "lang", "ko"]);
        assert_eq!(
            cli.command,
            Command::Lang {
                tag: Some(LanguageTag::Ko)
            }
        );
    }

    #[test]
    fn test_cli_verifies() {
        Cli::command().debug_assert();
    }
}
