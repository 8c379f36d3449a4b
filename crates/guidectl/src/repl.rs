//! Interactive prompt loop.
//!
//! Inline commands: quit/exit, status, translate <text>, debug <query>.
//! Anything else is processed as a query.

use anyhow::Result;
use console::style;
use guide_core::{GuideSystem, TranslationDirection};
use std::io::{self, BufRead, Write};

use crate::commands;

pub fn run(guide: &GuideSystem) -> Result<()> {
    let status = guide.status();
    println!(
        "{} Ask me about {} - food, transport, slang, culture, safety.",
        style("Local guide ready.").cyan().bold(),
        status.city.as_deref().unwrap_or("the city")
    );
    println!("{}", style("Commands: status, translate <text>, debug <query>, quit").dim());

    let stdin = io::stdin();
    loop {
        print!("{} ", style("guide>").green().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "quit" | "exit" => break,
            "status" => commands::status(guide)?,
            _ => {
                if let Some(text) = line.strip_prefix("translate ") {
                    commands::translate(guide, text.trim(), TranslationDirection::ToStandard)?;
                } else if let Some(query) = line.strip_prefix("debug ") {
                    commands::debug(guide, query.trim())?;
                } else {
                    commands::ask(guide, line)?;
                }
            }
        }
        println!();
    }

    println!("Chalo, take care!");
    Ok(())
}
