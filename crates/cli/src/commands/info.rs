use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use imagescrap_core::domain::{ChecksumGroup, MediaRecord, Pass, MIME_UNKNOWN_ERROR};
use imagescrap_core::Library;

/// Role of a file within its checksum group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Representative,
    Duplicate,
    Unhashed,
}

/// path → (group position, role)
pub(crate) fn group_roles(groups: &[ChecksumGroup]) -> HashMap<PathBuf, (usize, Role)> {
    let mut roles = HashMap::new();
    for (index, group) in groups.iter().enumerate() {
        for (pos, path) in group.sources.iter().enumerate() {
            let role = if pos == 0 {
                Role::Representative
            } else {
                Role::Duplicate
            };
            roles.insert(path.clone(), (index, role));
        }
    }
    roles
}

pub(crate) fn short_checksum(checksum: &str) -> &str {
    checksum.get(..12).unwrap_or(checksum)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn run(library: &mut Library, show_files: bool, show_groups: bool) -> Result<()> {
    let stats = library.status()?;
    let source = library.config().source_root.display().to_string();
    let catalog = library.config().catalog_path.display().to_string();

    println!();
    println!("  Imagescrap Catalog");
    println!("  ==================");
    println!();
    println!("   Source:     {source}");
    println!("   Catalog:    {catalog}");
    println!();
    println!(
        "   Files:      {:>8}        Groups:      {:>8}",
        stats.files, stats.groups
    );
    println!(
        "   Typed:      {:>8}        Duplicates:  {:>8}",
        stats.with_mimetype, stats.duplicates
    );
    println!(
        "   Hashed:     {:>8}        Dated:       {:>8}",
        stats.with_checksum, stats.with_date
    );

    let mut runs = Table::new();
    runs.load_preset(UTF8_FULL);
    runs.set_header(vec![Cell::new("Pass"), Cell::new("Last Run")]);
    for pass in [
        Pass::Scan,
        Pass::Mimetype,
        Pass::Checksum,
        Pass::CreationDate,
        Pass::Organize,
    ] {
        let last = library
            .last_run(pass)?
            .unwrap_or_else(|| "never".to_string());
        runs.add_row(vec![Cell::new(pass), Cell::new(last)]);
    }
    println!();
    println!("{runs}");

    let groups = library.checksum_groups()?;
    if show_files {
        let files = library.files()?;
        println!();
        println!("  Files");
        println!("  -----");
        println!("{}", files_table(&files, &groups));
    }
    if show_groups {
        println!();
        println!("  Checksum Groups");
        println!("  ---------------");
        println!("{}", groups_table(&groups));
    }
    if !show_files && !show_groups {
        println!();
        println!("  Use --files or --groups for the full tables.");
    }
    println!();
    Ok(())
}

fn files_table(files: &[MediaRecord], groups: &[ChecksumGroup]) -> Table {
    let roles = group_roles(groups);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("File"),
        Cell::new("Type"),
        Cell::new("Created"),
        Cell::new("Group"),
        Cell::new("Role"),
    ]);

    for record in files {
        let mime = match record.mime_type.as_deref() {
            Some(MIME_UNKNOWN_ERROR) => Cell::new(MIME_UNKNOWN_ERROR).fg(Color::Red),
            Some(m) => Cell::new(m),
            None => Cell::new("\u{2014}").fg(Color::DarkGrey),
        };
        let created = match record.creation_date {
            Some(d) => Cell::new(d.format("%Y-%m-%d %H:%M:%S")),
            None => Cell::new("\u{2014}").fg(Color::DarkGrey),
        };
        let (group, role) = match roles.get(&record.path) {
            Some(&(index, role)) => (Cell::new(index).fg(Color::Cyan), role),
            None => (Cell::new("\u{2014}").fg(Color::DarkGrey), Role::Unhashed),
        };
        let role = match role {
            Role::Representative => Cell::new("Export").fg(Color::Green),
            Role::Duplicate => Cell::new("Duplicate").fg(Color::Yellow),
            Role::Unhashed => Cell::new(""),
        };

        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(display_name(&record.path)),
            mime,
            created,
            group,
            role,
        ]);
    }
    table
}

fn groups_table(groups: &[ChecksumGroup]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#"),
        Cell::new("Checksum"),
        Cell::new("Copies"),
        Cell::new("Representative"),
    ]);
    for (index, group) in groups.iter().enumerate() {
        let representative = group
            .representative()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let copies = Cell::new(group.sources.len());
        let copies = if group.sources.len() > 1 {
            copies.fg(Color::Yellow)
        } else {
            copies
        };
        table.add_row(vec![
            Cell::new(index),
            Cell::new(short_checksum(group.checksum())),
            copies,
            Cell::new(representative),
        ]);
    }
    table
}
