use crate::api::{CardsQuery, SupplierClient};
use crate::config::Settings;
use crate::error::WbResult;
use crate::excel::{read_records, write_records};
use crate::types::Record;
use chrono::NaiveDate;
use colored::Colorize;
use serde_json::Value;

fn client(settings: &Settings) -> WbResult<SupplierClient> {
    SupplierClient::new(settings.client_config()?)
}

fn print_header(title: &str, settings: &Settings) {
    println!("{}", format!("📦 wb-export - {}", title).bold().green());
    println!("   API:      {}", settings.base_url);
    println!("   Workbook: {}\n", settings.workbook.display());
}

/// Save fetched records into `sheet`, or only report the count when empty.
fn save_records(settings: &Settings, sheet: &str, records: &[Record], verbose: bool) -> WbResult<()> {
    println!("   Fetched {} records", records.len().to_string().bold());

    if records.is_empty() {
        println!("{}", "⚠️  Nothing to save, sheet left unchanged".yellow());
        return Ok(());
    }

    if verbose {
        let headers: Vec<&str> = records[0].keys().map(String::as_str).collect();
        println!("   Columns: {}", headers.join(", ").cyan());
        println!("{}", "💾 Writing sheet...".cyan());
    }

    write_records(&settings.workbook, sheet, records)?;

    println!("{}", "✅ Saved!".bold().green());
    println!(
        "   Sheet '{}' in {}\n",
        sheet.bright_blue().bold(),
        settings.workbook.display()
    );
    Ok(())
}

/// Execute the info command: nomenclatures → sheet
pub fn info(settings: &Settings, sheet: &str, verbose: bool) -> WbResult<()> {
    print_header("Catalog info", settings);
    let records = client(settings)?.get_catalog_info()?;
    save_records(settings, sheet, &records, verbose)
}

/// Execute the orders command
pub fn orders(
    settings: &Settings,
    date_from: NaiveDate,
    flag: u8,
    sheet: &str,
    verbose: bool,
) -> WbResult<()> {
    print_header("Orders", settings);
    println!("   Since: {} (flag {})", date_from, flag);
    let records = client(settings)?.get_orders(date_from, flag)?;
    save_records(settings, sheet, &records, verbose)
}

/// Execute the sales command
pub fn sales(
    settings: &Settings,
    date_from: NaiveDate,
    flag: u8,
    sheet: &str,
    verbose: bool,
) -> WbResult<()> {
    print_header("Sales", settings);
    println!("   Since: {} (flag {})", date_from, flag);
    let records = client(settings)?.get_sales(date_from, flag)?;
    save_records(settings, sheet, &records, verbose)
}

/// Execute the cards command. With `sheet = None` only the count is printed.
pub fn cards(
    settings: &Settings,
    query: &CardsQuery,
    sheet: Option<&str>,
    verbose: bool,
) -> WbResult<()> {
    print_header("Cards", settings);
    if verbose {
        println!(
            "   limit={} offset={} sort={} {}",
            query.limit,
            query.offset,
            query.sort_column,
            if query.ascending { "asc" } else { "desc" }
        );
    }
    let records = client(settings)?.list_cards(query)?;
    match sheet {
        Some(sheet) => save_records(settings, sheet, &records, verbose),
        None => {
            println!("{}", records.len());
            Ok(())
        }
    }
}

/// Execute the card command: print one card as JSON
pub fn card(settings: &Settings, imt_id: i64) -> WbResult<()> {
    let card = client(settings)?.get_card_by_group_id(imt_id)?;
    print_json(&card)
}

/// Execute the barcodes command
pub fn barcodes(settings: &Settings, quantity: u32) -> WbResult<()> {
    for barcode in client(settings)?.generate_barcodes(quantity)? {
        println!("{}", barcode);
    }
    Ok(())
}

/// Execute the delete command
pub fn delete(settings: &Settings, nomenclature_id: i64) -> WbResult<()> {
    let reply = client(settings)?.delete_item(nomenclature_id)?;
    println!(
        "{}",
        format!("🗑  Nomenclature {} deleted", nomenclature_id).green()
    );
    print_json(&reply)
}

/// Execute the show command: read a sheet back and print it as JSON
pub fn show(settings: &Settings, sheet: &str) -> WbResult<()> {
    let records = read_records(&settings.workbook, sheet)?;
    let value = Value::Array(records.into_iter().map(Value::Object).collect());
    print_json(&value)
}

fn print_json(value: &Value) -> WbResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
