//! Interactive command - terminal rendition of the two-page form

use anyhow::Result;
use console::{style, Term};
use std::io::{self, BufRead};
use mermaid_core::{Config, ContextualRequest, Page, Session};

/// Keys accepted on the navigation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Open(Page),
    Quit,
}

fn parse_action(key: char) -> Option<Action> {
    match key.to_ascii_lowercase() {
        '1' | 'c' => Some(Action::Open(Page::Contextual)),
        '2' | 'm' | 'f' => Some(Action::Open(Page::MermaidFlow)),
        'q' => Some(Action::Quit),
        _ => None,
    }
}

pub fn run(config: &Config) -> Result<()> {
    let term = Term::stdout();
    let session = Session::from_config(config)?;

    term.write_line(&format!("{}", style("Mermaid").bold()))?;
    term.write_line(&format!("{}", style(session.model_label()).cyan()))?;

    loop {
        term.write_line("")?;
        term.write_line(&navigation_line())?;

        let key = term.read_char()?;
        match parse_action(key) {
            Some(Action::Open(page)) => run_page(&term, &session, page)?,
            Some(Action::Quit) => break,
            None => {
                term.write_line(&format!("{} Unknown key '{}'", style("✗").red(), key))?;
            }
        }
    }

    Ok(())
}

fn navigation_line() -> String {
    let pages: Vec<String> = Page::ALL
        .iter()
        .enumerate()
        .map(|(i, page)| format!("[{}] {}", i + 1, page.title()))
        .collect();
    format!("{}  [q] Quit", pages.join("  "))
}

fn run_page(term: &Term, session: &Session, page: Page) -> Result<()> {
    term.write_line("")?;
    term.write_line(&format!("{}", style(page.title()).bold().underlined()))?;

    let fields = page
        .placeholders()
        .iter()
        .map(|placeholder| read_field(term, placeholder))
        .collect::<Result<Vec<_>>>()?;

    term.write_line(&format!("{}", style(page.action_label()).dim()))?;

    let output = match page {
        Page::Contextual => {
            let request = ContextualRequest::new(&fields[0], &fields[1], &fields[2]);
            session.generate_contextual(&request)?
        }
        Page::MermaidFlow => session.generate_simple(&fields[0])?,
    };

    term.write_line("")?;
    term.write_line(&output)?;
    Ok(())
}

/// Line that closes a field; blank lines belong to the field
const FIELD_TERMINATOR: &str = ".";

fn read_field(term: &Term, placeholder: &str) -> Result<String> {
    term.write_line(&format!(
        "{} {}",
        style(placeholder.replace('\n', " / ")).dim(),
        style("(a line with '.' to finish)").dim()
    ))?;

    Ok(collect_field(io::stdin().lock().lines())?)
}

/// Join lines up to the terminator line or end of input
fn collect_field<I>(lines: I) -> io::Result<String>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut field = Vec::new();
    for line in lines {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line == FIELD_TERMINATOR {
            break;
        }
        field.push(line.to_string());
    }
    Ok(field.join("\n"))
}
