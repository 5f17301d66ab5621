use console::style;

use lexdoc::processor::Operation;

/// List operations with their identifiers.
pub fn cmd_operations() -> anyhow::Result<()> {
    println!("\n{}", style("Operations").bold());
    println!("{}", "-".repeat(50));

    for op in Operation::ALL {
        let note = if op.takes_question() {
            style(" (takes --question)").dim().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {}{}",
            style(format!("{:<20}", op.as_str())).cyan(),
            op.display_name(),
            note
        );
    }
    println!();

    Ok(())
}
