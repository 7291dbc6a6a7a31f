use super::ui;
use crate::core::NavFeedProvider;
use crate::pipeline::feed_amc_prefixes;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeSet;

/// Prints the unique AMC prefixes found in the live feed.
pub async fn run(feed: &dyn NavFeedProvider) -> Result<()> {
    let spinner = ui::new_spinner("Fetching NAV feed");
    let prefixes = feed_amc_prefixes(feed).await;
    spinner.finish_and_clear();

    println!("{}", prefixes_table(&prefixes?));
    Ok(())
}

fn prefixes_table(prefixes: &BTreeSet<String>) -> String {
    if prefixes.is_empty() {
        return ui::style_text("No AMC prefixes found", ui::StyleType::Error);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("#"), ui::header_cell("AMC prefix")]);
    for (i, prefix) in prefixes.iter().enumerate() {
        table.add_row(vec![ui::count_cell(i + 1), Cell::new(prefix)]);
    }

    format!(
        "{}\n{}\n{}",
        ui::style_text("Unique AMC prefixes", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("{} prefixes", prefixes.len()),
            ui::StyleType::Subtle
        )
    )
}
