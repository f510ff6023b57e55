use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pdf_kernel::actions::{ActionDictionary, Destination, GoToAction, NamedAction, PageTarget};
use pdf_kernel::xref::Location;
use pdf_kernel::{
    CompressionLevel, PdfDictionary, PdfDocument, PdfName, PdfObject, PdfStream, PdfString,
    PdfWriter, WriterConfig,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "pdf-kernel",
    about = "Write, inspect and rewrite PDF object graphs",
    version,
    author
)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a small sample document
    Demo {
        /// Output file path
        output: PathBuf,

        /// Use object streams and an xref stream
        #[arg(long)]
        full_compression: bool,

        /// Deduplicate equal resources while copying them in
        #[arg(long)]
        smart: bool,
    },

    /// Print the trailer and cross-reference table of a file
    Inspect {
        /// Input PDF file
        input: PathBuf,
    },

    /// Open a file and write it out again
    Rewrite {
        /// Input PDF file
        input: PathBuf,

        /// Output file path
        output: PathBuf,

        /// Use object streams and an xref stream
        #[arg(long)]
        full_compression: bool,

        /// Append an incremental update instead of rewriting everything
        #[arg(long, conflicts_with = "full_compression")]
        append: bool,

        /// Deflate level 0-9 for streams
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Demo {
            output,
            full_compression,
            smart,
        } => {
            let mut config = WriterConfig::default();
            if full_compression {
                config = config.with_full_compression();
            }
            if smart {
                config = config.with_smart_mode();
            }
            let size = write_demo(&output, config)?;
            println!("Wrote {} ({size} bytes)", output.display());
        }

        Commands::Inspect { input } => {
            let mut doc = PdfDocument::open_file(&input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            let stdout = std::io::stdout();
            inspect(&mut doc, &mut stdout.lock())?;
        }

        Commands::Rewrite {
            input,
            output,
            full_compression,
            append,
            level,
        } => {
            let mut config = WriterConfig::default();
            if full_compression {
                config = config.with_full_compression();
            }
            if append {
                config = config.with_append_mode();
            }
            if let Some(level) = level {
                config = config.with_compression_level(CompressionLevel::from_level(level));
            }
            let size = rewrite(&input, &output, config)?;
            println!("Wrote {} ({size} bytes)", output.display());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Catalog, one page with a content stream, an open action, and a font
/// resource copied in twice from a separate document.
fn write_demo(path: &Path, config: WriterConfig) -> Result<u64> {
    let mut doc = PdfDocument::new();
    let mut writer = PdfWriter::create(path, config)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut fonts = PdfDocument::new();
    let helvetica = || {
        let mut font = PdfDictionary::with_type("Font");
        font.set("Subtype", PdfName::new("Type1"));
        font.set("BaseFont", PdfName::new("Helvetica"));
        font
    };
    let body = fonts.add_object(helvetica());
    let heading = fonts.add_object(helvetica());
    let body = writer.copy_object(&mut doc, &mut fonts, &PdfObject::Reference(body))?;
    let heading = writer.copy_object(&mut doc, &mut fonts, &PdfObject::Reference(heading))?;

    let pages = doc.create_next_indirect_reference();
    let page = doc.create_next_indirect_reference();

    let mut font_resources = PdfDictionary::new();
    font_resources.set("F1", body);
    font_resources.set("F2", heading);
    let mut resources = PdfDictionary::new();
    resources.set("Font", font_resources);

    let mut page_dict = PdfDictionary::with_type("Page");
    page_dict.set("Parent", pages);
    page_dict.set(
        "MediaBox",
        vec![
            PdfObject::from(0),
            PdfObject::from(0),
            PdfObject::from(595),
            PdfObject::from(842),
        ],
    );
    page_dict.set("Resources", resources);
    page_dict.set(
        "Contents",
        PdfStream::new(b"BT /F2 24 Tf 72 760 Td (pdf-kernel) Tj ET".to_vec()),
    );
    doc.set_object(page, page_dict)?;

    let mut pages_dict = PdfDictionary::with_type("Pages");
    pages_dict.set("Kids", vec![PdfObject::Reference(page)]);
    pages_dict.set("Count", 1);
    doc.set_object(pages, pages_dict)?;

    let open_action = ActionDictionary::new(GoToAction::new(Destination::fit(
        PageTarget::Reference(page),
    )))
    .then(NamedAction::first_page());
    let mut catalog = PdfDictionary::with_type("Catalog");
    catalog.set("Pages", pages);
    catalog.set("OpenAction", open_action.make_indirect(&mut doc));
    let root = doc.add_object(catalog);
    doc.set_root(root);
    doc.info_mut()?.set("Title", PdfString::new("pdf-kernel demo"));

    // Pages can go out before the rest of the document.
    writer.flush_object(&mut doc, page)?;
    let file = writer.close(&mut doc)?;
    let size = file.get_ref().metadata()?.len();
    info!(size, "demo written");
    Ok(size)
}

fn inspect(doc: &mut PdfDocument, out: &mut impl Write) -> Result<()> {
    writeln!(out, "PDF version: {}", doc.version())?;
    let keys: Vec<&str> = doc.trailer().keys().map(PdfName::as_str).collect();
    writeln!(out, "Trailer keys: {}", keys.join(", "))?;
    if let Some(startxref) = doc.startxref() {
        writeln!(out, "startxref: {startxref}")?;
    }
    if doc.is_encrypted() {
        writeln!(out, "Encrypted: yes")?;
    }
    writeln!(out, "Xref size: {}", doc.xref().size())?;

    for entry in doc.xref().iter().filter(|e| e.number() != 0) {
        let (number, generation) = (entry.number(), entry.generation());
        if entry.is_free() {
            writeln!(out, "{number:>6} {generation:>5} free")?;
            continue;
        }
        match entry.location() {
            Location::Offset(offset) => {
                writeln!(out, "{number:>6} {generation:>5} offset {offset}")?
            }
            Location::Compressed { stream, index } => writeln!(
                out,
                "{number:>6} {generation:>5} object stream {stream} index {index}"
            )?,
        }
    }

    if let Some(catalog) = doc.catalog()? {
        let kind = catalog.get_name("Type").map(PdfName::as_str).unwrap_or("?");
        writeln!(out, "Catalog type: {kind}")?;
    }
    Ok(())
}

fn rewrite(input: &Path, output: &Path, config: WriterConfig) -> Result<u64> {
    let mut doc = PdfDocument::open_file(input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    if doc.is_encrypted() && !config.append_mode {
        bail!("{} is encrypted; only --append can update it", input.display());
    }
    // The whole input is already in memory, so writing over it is safe.
    let writer = PdfWriter::create(output, config)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let file = writer.close(&mut doc)?;
    Ok(file.get_ref().metadata()?.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_demo_inspect_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let demo = dir.path().join("demo.pdf");
        write_demo(&demo, WriterConfig::default().with_smart_mode()).unwrap();

        let mut doc = PdfDocument::open_file(&demo).unwrap();
        let mut report = Vec::new();
        inspect(&mut doc, &mut report).unwrap();
        let report = String::from_utf8(report).unwrap();
        assert!(report.contains("PDF version: 1.7"));
        assert!(report.contains("Trailer keys: Root, Info, Size, ID"));
        assert!(report.contains("Catalog type: Catalog"));

        let packed = dir.path().join("packed.pdf");
        rewrite(&demo, &packed, WriterConfig::default().with_full_compression()).unwrap();
        let mut doc = PdfDocument::open_file(&packed).unwrap();
        let mut report = Vec::new();
        inspect(&mut doc, &mut report).unwrap();
        assert!(String::from_utf8(report).unwrap().contains("object stream"));
    }
}
