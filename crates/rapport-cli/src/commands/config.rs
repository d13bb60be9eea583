//! Configuration display commands

use rapport_core::{default_config_path, Config};

pub fn config_summary(config: &Config) -> String {
    let source = config
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "embedded defaults".to_string());

    let mut out = format!("⚙️  Configuration ({})\n\n", source);
    out.push_str("   [api]\n");
    out.push_str(&format!("   base_url           {}\n", config.api.base_url));
    out.push_str(&format!("   timeout_secs       {}\n", config.api.timeout.as_secs()));
    out.push_str("\n   [format]\n");
    out.push_str(&format!("   currency_suffix    {}\n", config.format.currency_suffix));
    out.push_str(&format!(
        "   grouping_separator {:?}\n",
        config.format.grouping_separator
    ));
    out.push_str("\n   [document]\n");
    out.push_str(&format!("   organisation       {}\n", config.document.organisation));
    out.push_str(&format!("   lines_per_page     {}\n", config.document.lines_per_page));
    out.push_str(&format!("   signature_label    {}\n", config.document.signature_label));
    out
}

pub fn cmd_config_show(config: &Config) {
    print!("{}", config_summary(config));
}

pub fn cmd_config_path(config: &Config) {
    match default_config_path() {
        Some(path) => {
            let status = if path.exists() { "found" } else { "not present" };
            println!("{} ({})", path.display(), status);
        }
        None => println!("No data directory available on this platform"),
    }
    if let Some(source) = &config.source {
        println!("In use: {}", source.display());
    }
}
