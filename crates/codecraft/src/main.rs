//! CodeCraft - CSS playground tools on the command line
//!
//! Usage: codecraft <command> [args]

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use codecraft_dom::{DomTree, NodeId};
use codecraft_html::parse_fragment;
use codecraft_playground::{check, Advance, LevelSet, Outcome, QuizConfig, QuizSession, Rgb};
use codecraft_style::SelectorQuery;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("codecraft");

    let Some(command) = args.get(1) else {
        print_usage(program);
        return ExitCode::FAILURE;
    };

    match command.as_str() {
        "--help" | "-h" => {
            print_usage(program);
            ExitCode::SUCCESS
        }
        "--version" | "-V" => {
            println!("CodeCraft {}", VERSION);
            ExitCode::SUCCESS
        }
        "color" => {
            let [r, g, b] = match &args[2..] {
                [r, g, b] => [r, g, b],
                _ => {
                    eprintln!("Usage: {} color <R> <G> <B>", program);
                    return ExitCode::FAILURE;
                }
            };
            report(run_color(r, g, b))
        }
        "check" => {
            let [markup, reference, candidate] = match &args[2..] {
                [m, r, c] => [m, r, c],
                _ => {
                    eprintln!("Usage: {} check <MARKUP> <REFERENCE> <CANDIDATE>", program);
                    return ExitCode::FAILURE;
                }
            };
            match run_check(markup, reference, candidate) {
                Ok(true) => ExitCode::SUCCESS,
                Ok(false) => ExitCode::FAILURE,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        "query" => {
            let [markup, selector] = match &args[2..] {
                [m, s] => [m, s],
                _ => {
                    eprintln!("Usage: {} query <MARKUP> <SELECTOR>", program);
                    return ExitCode::FAILURE;
                }
            };
            report(run_query(markup, selector))
        }
        "quiz" => {
            let levels_path = match &args[2..] {
                [] => None,
                [flag, path] if flag == "--levels" => Some(path.as_str()),
                _ => {
                    eprintln!("Usage: {} quiz [--levels <FILE>]", program);
                    return ExitCode::FAILURE;
                }
            };
            report(run_quiz(levels_path))
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(program);
            ExitCode::FAILURE
        }
    }
}

fn report(result: Result<(), Box<dyn Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_usage(program: &str) {
    println!(
        r#"CodeCraft {} - CSS playground tools

USAGE:
    {} <COMMAND> [ARGS]

COMMANDS:
    color <R> <G> <B>                          Convert an RGB color to hex and HSL
    check <MARKUP> <REFERENCE> <CANDIDATE>     Check whether two selectors pick the same element
    query <MARKUP> <SELECTOR>                  Show the fragment tree and what a selector matches
    quiz [--levels <FILE>]                     Play the selector quiz on stdin

OPTIONS:
    -h, --help        Print this help message
    -V, --version     Print version information

EXAMPLES:
    {} color 102 126 234
    {} check '<ul><li>A</li><li>B</li></ul>' li li:first-child
    {} quiz
"#,
        VERSION, program, program, program, program
    );
}

fn run_color(r: &str, g: &str, b: &str) -> Result<(), Box<dyn Error>> {
    let rgb = Rgb::from_channel_strs(r, g, b)?;
    println!("{}", rgb.to_hex());
    println!("{}", rgb);
    println!("{}", rgb.to_hsl());
    Ok(())
}

fn run_check(markup: &str, reference: &str, candidate: &str) -> Result<bool, Box<dyn Error>> {
    let fragment = parse_fragment(markup)?;
    let verdict = check(candidate, reference, &fragment);
    println!("{}", if verdict.is_match() { "match" } else { "no match" });
    Ok(verdict.is_match())
}

fn run_query(markup: &str, selector: &str) -> Result<(), Box<dyn Error>> {
    let fragment = parse_fragment(markup)?;
    let matched = fragment.query_selector_all(selector)?;

    println!("=== Fragment ===\n");
    println!("{}", fragment.pretty_print());

    println!("=== Matches ({}) ===\n", matched.len());
    for id in matched {
        println!("{}", describe(&fragment, id));
    }
    Ok(())
}

fn run_quiz(levels_path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let levels = match levels_path {
        Some(path) => {
            log::debug!("loading levels from {}", path);
            let json = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
            LevelSet::from_json(&json)?
        }
        None => LevelSet::builtin(),
    };

    let mut quiz = QuizSession::new(levels, QuizConfig::default())?;
    println!("Type a selector, or /next, /hover <selector>, /quit\n");
    show_level(&quiz);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        match input.split_once(' ').map_or((input, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) => break,
            ("/next", _) => match quiz.advance() {
                Advance::Level(_) => show_level(&quiz),
                Advance::Finished { score, max_score } => {
                    println!("Done! Final score: {}/{}\n", score, max_score);
                    show_level(&quiz);
                }
            },
            ("/hover", selector) => {
                let target = if selector.is_empty() {
                    None
                } else {
                    match quiz.fragment().query_selector(selector) {
                        Ok(target) => target,
                        Err(e) => {
                            println!("Invalid selector: {}", e);
                            continue;
                        }
                    }
                };
                quiz.hover(target);
                match target {
                    Some(id) => println!("Hovering {}", describe(quiz.fragment(), id)),
                    None => println!("Hover cleared"),
                }
            }
            _ => match quiz.submit(input) {
                Some(Outcome::Correct { points_awarded, matched }) => {
                    println!("Correct! +{} points (score {})", points_awarded, quiz.score());
                    println!("{} element(s) highlighted: {}", matched.len(), quiz.fragment().serialize());
                    println!("Type /next to continue");
                }
                Some(Outcome::Incorrect { expected }) => {
                    println!("Try again! Hint: {}", expected);
                }
                None => {}
            },
        }
        io::stdout().flush()?;
    }

    println!("Score: {}/{}", quiz.score(), quiz.max_score());
    Ok(())
}

fn show_level(quiz: &QuizSession) {
    let level = quiz.current_level();
    println!("Level {}/{}", quiz.level_number(), quiz.level_count());
    println!("  {}", level.markup);
    if !level.hint.is_empty() {
        println!("  {}", level.hint);
    }
}

/// Short `<tag#id.class>` label for an element
fn describe(tree: &DomTree, id: NodeId) -> String {
    let Some(element) = tree.get(id).and_then(|n| n.as_element()) else {
        return id.to_string();
    };
    let mut label = format!("<{}", element.tag_name);
    if let Some(element_id) = element.id() {
        label.push('#');
        label.push_str(element_id);
    }
    for class in element.classes() {
        label.push('.');
        label.push_str(class);
    }
    label.push('>');
    label
}
