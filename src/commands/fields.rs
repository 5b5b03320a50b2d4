//! Field visibility table

use flashweb_core::{visible_fields, Action, FieldId, OPTIONAL_FIELDS};

/// Print which optional fields are shown for each action
pub fn print_fields() {
    println!("Optional fields:");
    println!();
    for spec in OPTIONAL_FIELDS {
        println!("  {:<18} - {}", spec.label, spec.help);
    }
    println!();
    println!("{:<8} {:<8} {:<8} {:<8}", "Action", "File", "Force", "Verbose");
    println!("{}", "-".repeat(36));

    for action in Action::ALL {
        let visible = visible_fields(action);
        let mark = |shown: bool| if shown { "yes" } else { "-" };
        println!(
            "{:<8} {:<8} {:<8} {:<8}",
            action.as_str(),
            mark(visible.contains(&FieldId::File)),
            mark(visible.contains(&FieldId::Force)),
            mark(visible.contains(&FieldId::Verbose)),
        );
    }
}
