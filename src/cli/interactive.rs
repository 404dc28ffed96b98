use super::ui;
use crate::core::{Converter, Outcome};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const QUIT_COMMANDS: [&str; 3] = ["q", "quit", "exit"];

/// Reads amounts line by line and converts each on Enter.
///
/// An empty line resubmits the preserved input, which starts out as the
/// configured default amount. Conversion errors are reported and the
/// session continues.
pub async fn run<R, W>(converter: &Converter, reader: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let pair = converter.pair();
    writeln!(
        out,
        "Converting {} to {}. Enter an amount, an empty line to resubmit, 'q' to quit.",
        pair.from, pair.to
    )?;

    let mut lines = reader.lines();
    loop {
        let preserved = converter.snapshot().await.input().map(str::to_string);
        match &preserved {
            Some(input) => write!(out, "Amount [{input}]: ")?,
            None => write!(out, "Amount: ")?,
        }
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if QUIT_COMMANDS.contains(&input) {
            break;
        }

        let spinner = ui::new_spinner("Converting...");
        let outcome = if input.is_empty() {
            converter.retry().await
        } else {
            Some(converter.submit(input).await)
        };
        spinner.finish_and_clear();

        match outcome {
            None => writeln!(out, "Nothing to convert yet")?,
            Some(Outcome::Failed(e) | Outcome::SupersededFailure(e)) => {
                writeln!(
                    out,
                    "{}",
                    ui::style_text(&format!("Error: {e}"), ui::StyleType::Error)
                )?;
                if e.is_retryable() {
                    writeln!(
                        out,
                        "{}",
                        ui::style_text("Press Enter to retry", ui::StyleType::Subtle)
                    )?;
                }
            }
            Some(Outcome::Displayed(_) | Outcome::Superseded(_)) => {
                let session = converter.snapshot().await;
                writeln!(
                    out,
                    "{}",
                    ui::display_line(pair, session.converted_amount())
                )?;
            }
        }
    }

    Ok(())
}
