//! UI helpers for the deploy CLI.
//!
//! Provides consistent formatting for console output.

use colored::Colorize;
use eks_blueprint::{AddOn, AddOnTier, App, CapacityStrategy, DeployConfig};

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", "═".repeat(70).bright_black());
    println!("{}", title.cyan().bold());
    println!("{}", "═".repeat(70).bright_black());
    println!();
}

/// Print a progress step with step number.
pub fn print_progress_step(current: u8, total: u8, message: &str) {
    println!(
        "{} {} {}",
        format!("[{current}/{total}]").bright_black(),
        "▶".cyan(),
        message.bold()
    );
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a per-item result.
pub fn print_check_result(name: &str, passed: bool, message: Option<&str>) {
    let status = if passed { "✓".green() } else { "✗".red() };

    let text = if let Some(msg) = message {
        format!("{name} - {msg}")
    } else {
        name.to_string()
    };

    println!("  {status} {text}");
}

fn print_field(key: &str, value: &str) {
    println!("  {:<20} {}", format!("{key}:").bright_black(), value);
}

/// Print the target environment and the shape of both stacks.
pub fn print_config_summary(config: &DeployConfig, app: &App) {
    let cluster = &app.cluster;
    let provider = cluster.cluster_provider();

    println!("{}", "Configuration Summary".bold());
    print_field("Account", &config.account);
    print_field("Region", &config.region);
    print_field("Profile", &config.profile.to_string());
    print_field("Monitoring stack", &app.monitoring.id);
    print_field("Deployment unit", cluster.id());
    print_field("Cluster", &provider.cluster_name);
    print_field("Kubernetes", &provider.version.to_string());

    let capacity = match &provider.capacity {
        CapacityStrategy::ManagedPool(group) => format!(
            "{} {} ({}, min {}, {})",
            provider.capacity.label(),
            group.id,
            group
                .instance_types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            group.min_size,
            group.node_group_capacity_type,
        ),
        CapacityStrategy::SelfManaged(group) => format!(
            "{} {} ({}, min {})",
            provider.capacity.label(),
            group.id,
            group.instance_type,
            group.min_size.map_or_else(|| "default".to_string(), |n| n.to_string()),
        ),
    };
    print_field("Capacity", &capacity);
    print_field("Add-ons", &cluster.add_ons().len().to_string());
    println!();
}

/// Print the add-on list grouped by tier, in application order.
pub fn print_add_ons(add_ons: &[AddOn]) {
    let mut current: Option<AddOnTier> = None;
    for (index, add_on) in add_ons.iter().enumerate() {
        let kind = add_on.kind();
        if current != Some(kind.tier()) {
            current = Some(kind.tier());
            println!("{}", kind.tier().name().cyan().bold());
        }
        let requires = kind
            .requires()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if requires.is_empty() {
            println!("  {:>2}. {}", index + 1, kind);
        } else {
            println!(
                "  {:>2}. {} {}",
                index + 1,
                kind,
                format!("(after {})", requires.join(", ")).bright_black()
            );
        }
    }
    println!();
}
