use super::ui;
use crate::core::{ConversionError, Converter, Outcome};
use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment};
use futures::future::join_all;

/// Renders one row per submitted amount, in submission order.
pub fn render_outcomes(converter: &Converter, outcomes: &[(String, Outcome)]) -> String {
    let pair = converter.pair();
    let mut table = ui::new_styled_table();

    table.set_header(vec![
        ui::header_cell(&format!("Amount ({})", pair.from)),
        ui::header_cell(&format!("Result ({})", pair.to)),
        ui::header_cell("Rate"),
        ui::header_cell("Quoted At"),
        ui::header_cell("Status"),
    ]);

    for (input, outcome) in outcomes {
        if let Some(c) = outcome.conversion() {
            let status = match outcome {
                Outcome::Displayed(_) => Cell::new("displayed"),
                _ => Cell::new(ui::style_text("superseded", ui::StyleType::Subtle)),
            };
            table.add_row(vec![
                Cell::new(c.amount.to_string()).set_alignment(CellAlignment::Right),
                Cell::new(c.result.to_string()).set_alignment(CellAlignment::Right),
                ui::format_optional_cell(c.rate, |r| r.to_string()),
                Cell::new(c.quoted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
                status,
            ]);
            continue;
        }

        let (message, superseded) = match outcome {
            Outcome::SupersededFailure(e) => (format!("superseded: {e}"), true),
            Outcome::Failed(e) => (e.to_string(), false),
            Outcome::Displayed(_) | Outcome::Superseded(_) => continue,
        };
        let style_type = if superseded {
            ui::StyleType::Subtle
        } else {
            ui::StyleType::Error
        };
        table.add_row(vec![
            Cell::new(input).set_alignment(CellAlignment::Right),
            ui::na_cell(!superseded),
            ui::na_cell(false),
            ui::na_cell(false),
            Cell::new(ui::style_text(&message, style_type)),
        ]);
    }

    table.to_string()
}

/// Submits every amount concurrently, then shows all outcomes and the
/// displayed result. Fails if any conversion failed.
pub async fn run(converter: &Converter, amounts: &[String]) -> Result<()> {
    if amounts.is_empty() {
        bail!("No amount given to convert");
    }

    let pb = ui::new_progress_bar(amounts.len() as u64, true);
    pb.set_message(format!("Converting {}...", converter.pair()));

    let futures = amounts.iter().map(|input| {
        let pb_clone = pb.clone();
        async move {
            let outcome = converter.submit(input).await;
            pb_clone.inc(1);
            (input.clone(), outcome)
        }
    });
    let outcomes = join_all(futures).await;
    pb.finish_and_clear();

    println!("{}", render_outcomes(converter, &outcomes));

    let session = converter.snapshot().await;
    println!(
        "\n{}",
        ui::display_line(converter.pair(), session.converted_amount())
    );

    // Failures of superseded requests never reached the display
    let failures: Vec<&ConversionError> = outcomes
        .iter()
        .filter_map(|(_, o)| match o {
            Outcome::Failed(e) => Some(e),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        bail!(
            "{} of {} conversions failed: {}",
            failures.len(),
            outcomes.len(),
            failures[0]
        );
    }
    Ok(())
}
