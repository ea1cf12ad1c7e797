//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use warden_policy::Policy;

use super::colors::SemanticStyle;

const HEADERS: [&str; 6] = ["Priority", "Id", "Category", "Conditions", "Actions", "Active"];

/// Builds a table of policies, one row per policy.
pub fn policy_table<'a>(policies: impl IntoIterator<Item = &'a Policy>) -> Table {
    let mut table = Table::new();

    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(HEADERS.iter().map(|h| {
        if super::no_color() {
            Cell::new(h)
        } else {
            Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan)
        }
    }));

    for policy in policies {
        let conditions = policy
            .conditions
            .iter()
            .map(|c| format!("{} {} {}", c.field, c.operator, c.value))
            .collect::<Vec<_>>()
            .join("\n");
        let actions = policy
            .actions
            .iter()
            .map(|a| a.action_type.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(policy.priority),
            Cell::new(&policy.id),
            Cell::new(policy.category),
            Cell::new(if conditions.is_empty() {
                "(always)".to_string()
            } else {
                conditions
            }),
            Cell::new(actions),
            Cell::new(if policy.active { "yes" } else { "no" }),
        ]);
    }

    table
}

/// Prints the policy table followed by a count footer.
pub fn print_policy_table(policies: &[&Policy]) {
    println!("{}", policy_table(policies.iter().copied()));

    let count = policies.len();
    let word = if count == 1 { "policy" } else { "policies" };
    println!("{}", format!("({count} {word})").muted());
}
