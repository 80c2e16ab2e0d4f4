//! unhwp CLI - HWP/HWPX content extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unhwp::{
    CleanupPreset, Document, HwpParser, JsonFormat, ParseOptions, RenderOptions, SectionSelection,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "unhwp")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract HWP/HWPX content to Markdown, HTML, text, and JSON", long_about = None)]
struct Cli {
    /// Input HWP or HWPX file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Text cleanup preset
    #[arg(long, value_enum, env = "UNHWP_CLEANUP")]
    cleanup: Option<CleanupLevel>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a document to all formats plus its images
    Convert {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum, env = "UNHWP_CLEANUP")]
        cleanup: Option<CleanupLevel>,
    },

    /// Convert a document to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        /// Rendering for tables a Markdown grid cannot express
        #[arg(long, value_enum, default_value = "html")]
        table_mode: TableMode,

        /// Text cleanup preset
        #[arg(long, value_enum, env = "UNHWP_CLEANUP")]
        cleanup: Option<CleanupLevel>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6", env = "UNHWP_MAX_HEADING")]
        max_heading: u8,

        /// Prefix for image links
        #[arg(long, value_name = "PREFIX", env = "UNHWP_IMAGE_PREFIX")]
        image_prefix: Option<String>,

        /// Embed images as data URIs
        #[arg(long)]
        embed_images: bool,

        /// Section range (e.g., "1-3", "1,3,5")
        #[arg(long)]
        sections: Option<String>,
    },

    /// Convert a document to HTML
    Html {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Emit only the body content
        #[arg(long)]
        fragment: bool,

        /// Drop inline font styling
        #[arg(long)]
        no_font_styles: bool,

        /// Embed images as data URIs
        #[arg(long)]
        embed_images: bool,

        /// Section range (e.g., "1-3", "1,3,5")
        #[arg(long)]
        sections: Option<String>,
    },

    /// Convert a document to plain text
    Text {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum, env = "UNHWP_CLEANUP")]
        cleanup: Option<CleanupLevel>,

        /// Section range (e.g., "1-3", "1,3,5")
        #[arg(long)]
        sections: Option<String>,
    },

    /// Convert a document to JSON
    Json {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Extract embedded images
    Extract {
        /// Input HWP or HWPX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization only)
    Minimal,
    /// Standard cleanup
    Standard,
    /// Aggressive cleanup (for LLM training)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableMode {
    /// Markdown tables, flattening merged cells
    Markdown,
    /// HTML tables for merged or nested layouts
    Html,
    /// ASCII art tables
    Ascii,
}

impl From<TableMode> for unhwp::TableFallback {
    fn from(mode: TableMode) -> Self {
        match mode {
            TableMode::Markdown => unhwp::TableFallback::Markdown,
            TableMode::Html => unhwp::TableFallback::Html,
            TableMode::Ascii => unhwp::TableFallback::Ascii,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            cleanup,
        }) => cmd_convert(&input, output.as_deref(), cleanup),
        Some(Commands::Markdown {
            input,
            output,
            frontmatter,
            table_mode,
            cleanup,
            max_heading,
            image_prefix,
            embed_images,
            sections,
        }) => {
            let mut options = RenderOptions::new()
                .with_frontmatter(frontmatter)
                .with_table_fallback(table_mode.into())
                .with_max_heading(max_heading)
                .with_embedded_images(embed_images);
            if let Some(prefix) = image_prefix {
                options = options.with_image_prefix(prefix);
            }
            if let Some(level) = cleanup {
                options = options.with_cleanup_preset(level.into());
            }
            cmd_markdown(&input, output.as_deref(), options, sections.as_deref())
        }
        Some(Commands::Html {
            input,
            output,
            fragment,
            no_font_styles,
            embed_images,
            sections,
        }) => {
            let options = RenderOptions::new()
                .with_html_fragment(fragment)
                .with_html_font_styles(!no_font_styles)
                .with_embedded_images(embed_images);
            cmd_html(&input, output.as_deref(), options, sections.as_deref())
        }
        Some(Commands::Text {
            input,
            output,
            cleanup,
            sections,
        }) => cmd_text(&input, output.as_deref(), cleanup, sections.as_deref()),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Extract { input, output }) => cmd_extract(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), cli.cleanup)
            } else {
                println!("{}", "Usage: unhwp <FILE> [OUTPUT]".yellow());
                println!("       unhwp --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Parse the input, restricted to a section range when one is given.
fn load(input: &Path, sections: Option<&str>) -> Result<(Document, SectionSelection), unhwp::Error> {
    let selection = match sections {
        Some(s) => SectionSelection::parse(s)?,
        None => SectionSelection::All,
    };
    log::debug!("parsing {} with sections {:?}", input.display(), selection);
    let options = ParseOptions::new().with_sections(selection.clone());
    let doc = unhwp::parse_file_with_options(input, options)?;
    Ok((doc, selection))
}

fn write_or_print(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Write every image resource into `dir`, returning the file names.
fn write_images(doc: &Document, dir: &Path) -> Result<Vec<String>, std::io::Error> {
    let mut written = Vec::new();
    for (id, resource) in &doc.resources {
        if resource.is_image() {
            let filename = resource.suggested_filename(id);
            fs::write(dir.join(&filename), &resource.data)?;
            written.push(filename);
        }
    }
    Ok(written)
}

fn cmd_convert(input: &Path, output: Option<&Path>, cleanup: Option<CleanupLevel>) -> CliResult {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message("Parsing document...");
    let doc = unhwp::parse_file(input)?;

    spinner.set_message("Extracting images...");
    let images_dir = output_dir.join("images");
    fs::create_dir_all(&images_dir)?;
    let images = write_images(&doc, &images_dir)?;
    log::debug!("wrote {} image(s) to {}", images.len(), images_dir.display());

    spinner.set_message("Rendering...");
    let mut render_options = RenderOptions::new()
        .with_frontmatter(true)
        .with_image_prefix("images/");
    if let Some(level) = cleanup {
        render_options = render_options.with_cleanup_preset(level.into());
    }
    let outputs = unhwp::render::render_all(&doc, &render_options)?;

    spinner.set_message("Writing files...");
    fs::write(output_dir.join("extract.md"), &outputs.markdown)?;
    fs::write(output_dir.join("extract.html"), &outputs.html)?;
    fs::write(output_dir.join("extract.txt"), &outputs.text)?;
    fs::write(output_dir.join("content.json"), &outputs.json)?;

    spinner.finish_with_message("Done!");

    println!("\n{} {}", "Output files:".green().bold(), output_dir.display());
    println!("  {} extract.md", "├─".dimmed());
    println!("  {} extract.html", "├─".dimmed());
    println!("  {} extract.txt", "├─".dimmed());
    println!("  {} content.json", "├─".dimmed());
    println!("  {} images/ ({} files)", "└─".dimmed(), images.len());

    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    options: RenderOptions,
    sections: Option<&str>,
) -> CliResult {
    let (doc, selection) = load(input, sections)?;
    let markdown = unhwp::render::to_markdown(&doc, &options.with_sections(selection));
    write_or_print(output, &markdown)
}

fn cmd_html(
    input: &Path,
    output: Option<&Path>,
    options: RenderOptions,
    sections: Option<&str>,
) -> CliResult {
    let (doc, selection) = load(input, sections)?;
    let html = unhwp::render::to_html(&doc, &options.with_sections(selection));
    write_or_print(output, &html)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    cleanup: Option<CleanupLevel>,
    sections: Option<&str>,
) -> CliResult {
    let (doc, selection) = load(input, sections)?;

    let mut render_options = RenderOptions::new().with_sections(selection);
    if let Some(level) = cleanup {
        render_options = render_options.with_cleanup_preset(level.into());
    }

    let text = unhwp::render::to_text(&doc, &render_options);
    write_or_print(output, &text)
}

fn cmd_json(input: &Path, output: Option<&Path>, compact: bool) -> CliResult {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = unhwp::to_json(input, format)?;
    write_or_print(output, &json)
}

fn cmd_info(input: &Path) -> CliResult {
    let parser = HwpParser::open(input)?;
    let flags = parser.flags();
    let doc = parser.parse()?;
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), parser.format());
    println!("{}: {}", "Version".bold(), parser.version());
    println!("{}: {}", "Compressed".bold(), yes_no(flags.compressed));
    println!("{}: {}", "Distribution".bold(), yes_no(flags.distributed));

    let metadata = &doc.metadata;
    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if !metadata.keywords.is_empty() {
        println!("{}: {}", "Keywords".bold(), metadata.keywords.join(", "));
    }
    if let Some(ref last_saved_by) = metadata.last_saved_by {
        println!("{}: {}", "Last saved by".bold(), last_saved_by);
    }
    if let Some(ref created) = metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Sections".bold(), doc.section_count());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraph_count());
    println!("{}: {}", "Tables".bold(), doc.table_count());
    println!("{}: {}", "Images".bold(), doc.image_count());
    println!("{}: {}", "Characters".bold(), doc.char_count());
    println!(
        "{}: {}",
        "Words".bold(),
        doc.plain_text().split_whitespace().count()
    );

    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> CliResult {
    let doc = unhwp::parse_file(input)?;

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let images = write_images(&doc, &output_dir)?;
    for filename in &images {
        println!("{} {}", "Extracted".green(), filename);
    }

    println!("\n{} {} images extracted", "Done!".green().bold(), images.len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unhwp".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("HWP/HWPX content extraction tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unhwp".dimmed());
    println!("License: MIT");
}
