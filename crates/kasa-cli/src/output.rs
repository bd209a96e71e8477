use colored::Colorize;

use kasa_coordination::{IgnoreReason, Response};
use kasa_reporting::{RankingRow, SummaryRow};
use kasa_types::ContractorRecord;

/// Print an informational message.
pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Render a dispatcher response for the terminal.
pub fn print_response(response: &Response) {
    match response {
        Response::Accrued {
            record,
            contract,
            bonus,
        } => {
            print_success(&format!(
                "{} contract credited to {} (+{})",
                contract.to_string().bold(),
                record.user_id.cyan(),
                bonus.to_string().green(),
            ));
            print_record(record);
        }
        Response::EmptyLedger => print_info("No contracts recorded yet."),
        Response::Summary { rows } => print_summary(rows),
        Response::Ranking { rows } => print_ranking(rows),
        Response::Export { csv } => print!("{csv}"),
        Response::Personal { record } => print_record(record),
        Response::NoRecord { user_id } => {
            print_info(&format!("{} has no contracts yet.", user_id.cyan()))
        }
        Response::ResetDone => print_success("Ledger reset."),
        Response::Ignored { reason } => match reason {
            IgnoreReason::UnknownMarker => print_info("Marker is not a contract marker, ignored."),
            IgnoreReason::SelfReaction => print_info("Own reaction, ignored."),
        },
    }
}

fn print_record(record: &ContractorRecord) {
    println!(
        "  TZM: {}  MET: {}  Bonus: {}",
        record.tzm_count.to_string().yellow(),
        record.met_count.to_string().yellow(),
        record.total_bonus.to_string().green(),
    );
}

fn print_summary(rows: &[SummaryRow]) {
    println!("{}", "Contract summary:".bold());
    if rows.is_empty() {
        println!("  (no known contractors)");
        return;
    }
    for row in rows {
        println!(
            "  {:<24} TZM: {:>4}  MET: {:>4}  Bonus: {}",
            row.display_name.cyan(),
            row.tzm,
            row.met,
            row.total_bonus.to_string().green(),
        );
    }
}

fn print_ranking(rows: &[RankingRow]) {
    println!("{}", "Bonus ranking:".bold());
    if rows.is_empty() {
        println!("  (no known contractors)");
        return;
    }
    for row in rows {
        println!(
            "  {}. {:<24} {}",
            row.rank.to_string().bold(),
            row.display_name.cyan(),
            row.total_bonus.to_string().green(),
        );
    }
}
