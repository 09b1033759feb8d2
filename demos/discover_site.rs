//! Discovers the works of a portfolio and prints them.
//!
//! Usage:
//!   cargo run --example discover_site -- https://example.com/images/ en
//!   cargo run --example discover_site -- ./public/images ja
//!
//! The first argument is a base URL or a local folder; the second, optional
//! one is the display language (`ja` by default). Set `RUST_LOG=debug` to see
//! every probe.

use folio::prelude::*;

fn target_from_arg(arg: &str) -> SourceTarget {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        SourceTarget::Http(arg.to_string())
    } else {
        SourceTarget::Dir(PathBuf::from(arg))
    }
}

#[tokio::main]
async fn main() -> folio::error::Result<()> {
    colog::init();

    let mut args = std::env::args().skip(1);
    let Some(target_arg) = args.next() else {
        eprintln!("Usage: discover_site <base-url|folder> [ja|en]");
        return Ok(());
    };
    let language: Language = match args.next() {
        Some(code) => code.parse()?,
        None => Language::default(),
    };

    let folio = FolioConfig::builder()
        .include_video(true)
        .build()?
        .connect(target_from_arg(&target_arg))?;

    let pass = folio.discover().await;
    if pass.is_empty() {
        println!("No works found in {}", folio.source().describe());
        return Ok(());
    }

    let mut records = pass.project(language);
    folio.load_media(&mut records).await;
    let catalog = Catalog::new(records);

    println!("=== Featured ===");
    for work in catalog.featured() {
        println!(
            "  [{}] {} ({})",
            work.priority.unwrap_or_default(),
            work.title,
            work.client
        );
    }

    println!("\n=== All works ===");
    for work in catalog.records() {
        let role = work
            .role
            .as_ref()
            .map(|r| r.display_name().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {} | {} | {} | {} media", work.id, work.title, role, work.media.len());
        for media in &work.media {
            println!("      {} ({:?})", media.path(), media.kind);
        }
    }

    println!("\n=== Tags ===");
    let counts = catalog.tag_counts();
    for tag in catalog.tags() {
        println!(
            "  {} ({})",
            translate_tag(tag, language),
            counts.get(tag).copied().unwrap_or_default()
        );
    }

    let report = &pass.report;
    println!(
        "\n{} kept, {} duplicate ids, took {} ms",
        report.records_kept,
        report.duplicate_ids.len(),
        (report.finished_at - report.started_at).num_milliseconds()
    );

    Ok(())
}
