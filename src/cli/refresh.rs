use super::ui;
use crate::App;
use crate::pipeline::RunOutcome;
use crate::store::Generation;
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Runs the pipeline once in the foreground, waiting for enrichment.
pub async fn run(app: &App) -> Result<()> {
    let report = match app.pipeline.run().await? {
        RunOutcome::Started(report) => report,
        RunOutcome::Skipped => anyhow::bail!("A refresh is already running"),
    };

    let spinner = ui::new_spinner("Enriching scheme metadata");
    let enriched = report
        .enrichment
        .await
        .context("Enrichment task panicked")?;
    spinner.finish_and_clear();

    let enriched = enriched.context("Failed to store enriched generation")?;
    println!(
        "{}",
        summary_table(report.parsed_rows, report.cleaned, enriched)
    );
    Ok(())
}

fn summary_table(parsed_rows: usize, cleaned: usize, enriched: usize) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Stage"), ui::header_cell("Records")]);
    table.add_row(vec![Cell::new("parsed rows"), ui::count_cell(parsed_rows)]);
    table.add_row(vec![
        Cell::new(Generation::Cleaned.to_string()),
        ui::count_cell(cleaned),
    ]);
    table.add_row(vec![
        Cell::new(Generation::Shuffled.to_string()),
        ui::count_cell(cleaned),
    ]);
    table.add_row(vec![
        Cell::new(Generation::Enriched.to_string()),
        ui::count_cell(enriched),
    ]);

    format!(
        "{}\n{}",
        ui::style_text("NAV refresh complete", ui::StyleType::Title),
        table
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_table_lists_generations() {
        let out = summary_table(120, 80, 40);
        assert!(out.contains("NAV refresh complete"));
        assert!(out.contains("cleaned"));
        assert!(out.contains("shuffled"));
        assert!(out.contains("enriched"));
        assert!(out.contains("120"));
        assert!(out.contains("40"));
    }
}
