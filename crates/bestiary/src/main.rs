//! `bestiary` - CLI for reading, checking and indexing stat blocks
//!
//! This binary provides the command-line interface over the bestiary
//! library: building the JSON index, converting it to CSV, checking and
//! rendering single stat blocks, and managing the catalogue.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;

use bestiary::cli::{
    CheckCommand, Cli, Command, ConfigCommand, IndexCommand, OutputFormat, ScanCommand,
    SearchCommand, ShowCommand, ShowFormat,
};
use bestiary::{
    check, init_logging, json_to_csv, read_document, write_json, Config, Error, Scanner,
    StatBlock, Storage, StoredMonster,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // These must work even when the configuration itself is broken.
    if let Command::Config(ConfigCommand::Path) = cli.command {
        println!("{}", Config::default_config_path().display());
        return Ok(());
    }
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return handle_validate(file.clone().or_else(|| cli.config.clone()));
    }

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Scan(cmd) => handle_scan(&config, &cmd),
        Command::Convert(cmd) => {
            let summary = json_to_csv(&cmd.input, cmd.output.as_deref())
                .with_context(|| format!("converting {}", cmd.input.display()))?;
            println!("Wrote {} rows to {}", summary.rows, summary.path.display());
            Ok(())
        }
        Command::Check(cmd) => handle_check(&config, &cmd),
        Command::Show(cmd) => handle_show(&cmd),
        Command::Index(cmd) => handle_index(&config, &cmd),
        Command::Search(cmd) => handle_search(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

fn handle_scan(config: &Config, cmd: &ScanCommand) -> anyhow::Result<()> {
    let scan = cmd.dirs.apply(config.scan.clone())?;
    let output = cmd.output.clone().unwrap_or_else(|| scan.output_file.clone());

    let summary = Scanner::new(scan)?.scan()?;
    write_json(&summary.records, &output)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Wrote {} records → {}",
        summary.records.len(),
        output.display()
    );
    if !summary.skipped.is_empty() {
        println!("Skipped {} files (see warnings)", summary.skipped.len());
    }
    Ok(())
}

fn load_stat_block(path: &Path) -> anyhow::Result<StatBlock> {
    let doc = read_document(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(StatBlock::from_document(&doc))
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<()> {
    let mut reports = Vec::with_capacity(cmd.files.len());
    for path in &cmd.files {
        let block = load_stat_block(path)?;
        reports.push((path, check(&block, &config.check)));
    }

    if cmd.json {
        let out: Vec<_> = reports
            .iter()
            .map(|(path, report)| {
                serde_json::json!({
                    "file": path,
                    "name": report.name,
                    "consistent": report.is_consistent(),
                    "findings": report.findings,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (path, report) in &reports {
            if report.is_consistent() {
                println!("{} ({}): OK", report.name, path.display());
            } else {
                println!(
                    "{} ({}): {} finding(s)",
                    report.name,
                    path.display(),
                    report.findings.len()
                );
                for finding in &report.findings {
                    println!("  - {finding}");
                }
            }
        }
    }

    let inconsistent = reports.iter().filter(|(_, r)| !r.is_consistent()).count();
    if cmd.strict && inconsistent > 0 {
        return Err(Error::Inconsistent {
            count: inconsistent,
        }
        .into());
    }
    Ok(())
}

fn handle_show(cmd: &ShowCommand) -> anyhow::Result<()> {
    let block = load_stat_block(&cmd.file)?;
    match cmd.format {
        ShowFormat::Plain => print!("{block}"),
        ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&block)?),
    }
    Ok(())
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening catalogue {}", path.display()))
}

fn handle_index(config: &Config, cmd: &IndexCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    if cmd.rebuild {
        storage.clear()?;
    }

    let summary = Scanner::new(cmd.dirs.apply(config.scan.clone())?)?.scan()?;
    let mut inserted = 0;
    let mut duplicates = 0;
    for record in &summary.records {
        match storage.insert(record)? {
            Some(_) => inserted += 1,
            None => duplicates += 1,
        }
    }

    println!(
        "Indexed {} records into {} ({inserted} new, {duplicates} duplicates)",
        summary.records.len(),
        storage.path().display()
    );
    if !summary.skipped.is_empty() {
        println!("Skipped {} files (see warnings)", summary.skipped.len());
    }
    Ok(())
}

fn handle_search(config: &Config, cmd: &SearchCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let results = storage.search(&cmd.to_query())?;

    match cmd.format {
        OutputFormat::Json => {
            let out: Vec<_> = results
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "id": m.id,
                        "indexed_at": m.indexed_at.to_rfc3339(),
                        "record": m.record,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ if results.is_empty() => println!("No matching creatures."),
        OutputFormat::Plain => {
            for m in &results {
                let r = &m.record;
                let legendary = if r.has_legendary_actions {
                    ", legendary"
                } else {
                    ""
                };
                println!("{} (CR {}, {}{legendary})", r.name, r.cr, r.creature_type);
            }
        }
        OutputFormat::Table => print_table(&results),
    }
    Ok(())
}

fn print_table(results: &[StoredMonster]) {
    let headers = ["ID", "NAME", "CR", "TYPE", "AC", "HP", "LEG", "SOURCE"];
    let rows: Vec<[String; 8]> = results
        .iter()
        .map(|m| {
            let r = &m.record;
            [
                m.id.to_string(),
                r.name.clone(),
                r.cr.clone(),
                r.creature_type.clone(),
                r.ac.clone(),
                r.hp.clone(),
                if r.has_legendary_actions { "yes" } else { "" }.to_string(),
                r.source.clone(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", line(&headers));
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        println!("{}", line(&cells));
    }
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let by_type: serde_json::Map<String, serde_json::Value> = stats
            .by_type
            .iter()
            .map(|(t, n)| (t.clone(), (*n).into()))
            .collect();
        let status = serde_json::json!({
            "database_path": storage.path(),
            "total": stats.total,
            "legendary": stats.legendary,
            "by_type": by_type,
            "first_indexed": stats.first_indexed.map(|t| t.to_rfc3339()),
            "last_indexed": stats.last_indexed.map(|t| t.to_rfc3339()),
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map_or_else(
                || "never".to_string(),
                |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            )
        };
        println!("bestiary catalogue");
        println!("------------------");
        println!("Database:      {}", storage.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Creatures:     {}", stats.total);
        println!("Legendary:     {}", stats.legendary);
        println!("First indexed: {}", when(stats.first_indexed));
        println!("Last indexed:  {}", when(stats.last_indexed));
        if !stats.by_type.is_empty() {
            println!();
            println!("By type:");
            for (creature_type, count) in &stats.by_type {
                let label = if creature_type.is_empty() {
                    "(none)"
                } else {
                    creature_type.as_str()
                };
                println!("  {label:<14}{count}");
            }
        }
    }
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            Ok(())
        }
        Err(e) => Err(e).context("configuration is invalid"),
    }
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json: true } => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommand::Show { json: false } => {
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Scan]");
            println!("  HTML directory:     {}", config.scan.html_dir.display());
            println!("  Markdown directory: {}", config.scan.markdown_dir.display());
            println!("  Output file:        {}", config.scan.output_file.display());
            println!("  SRD suffix:         {}", config.scan.srd_suffix);
            println!("  SRD source:         {}", config.scan.srd_source);
            println!();
            println!("[Storage]");
            println!("  Database path:      {}", config.database_path().display());
            println!();
            println!("[Check]");
            println!("  Passive Perception: {}", config.check.passive_perception);
            println!("  Initiative:         {}", config.check.initiative);
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => handle_validate(file.clone())?,
    }
    Ok(())
}
