//! retemplate CLI - template reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use retemplate::{
    analyze_file, extract_file, merge_responses, CommandConverter, CommandMapper,
    ReconstructOptions, RenderReport, Retemplate, Section, StyleProfile,
};

#[derive(Parser)]
#[command(name = "retemplate")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Rebuild DOCX/PPTX templates around new content", long_about = None)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the style DNA of a template
    Analyze {
        /// Template DOCX file
        #[arg(value_name = "TEMPLATE")]
        template: PathBuf,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract the content blocks of a source document
    Extract {
        /// Source DOCX or PPTX file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the `[TYPE] content` summary instead of JSON
        #[arg(long)]
        summary: bool,
    },

    /// Merge chunked mapping responses into one section list
    Merge {
        /// Response files, one per chunk, in chunk order
        #[arg(value_name = "RESPONSE", required = true)]
        responses: Vec<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rebuild a template around the content of a source document
    #[command(alias = "rebuild")]
    Reconstruct(ReconstructArgs),

    /// Show version information
    Version,
}

#[derive(Args)]
struct ReconstructArgs {
    /// Source DOCX or PPTX file
    #[arg(value_name = "SOURCE", required_unless_present = "sections")]
    source: Option<PathBuf>,

    /// Template DOCX or PPTX file
    #[arg(short, long, value_name = "FILE")]
    template: PathBuf,

    /// Output file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Use already merged sections (JSON) instead of mapping a source
    #[arg(long, value_name = "FILE", conflicts_with = "source")]
    sections: Option<PathBuf>,

    /// Mapping program (receives a JSON request on stdin)
    #[arg(long, env = "RETEMPLATE_MAPPER", value_name = "COMMAND")]
    mapper: Option<String>,

    /// JSON options file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum blocks per mapping call (0 = no chunking)
    #[arg(long, env = "RETEMPLATE_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Extra attempts after a failed mapping call
    #[arg(long, env = "RETEMPLATE_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Timeout per mapping call, in seconds
    #[arg(long, env = "RETEMPLATE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Map chunks one after another
    #[arg(long)]
    sequential: bool,

    /// Document title (defaults to the first section title)
    #[arg(long)]
    title: Option<String>,

    /// Keep the cover title as it is
    #[arg(long)]
    no_cover: bool,

    /// Keep the table of contents as it is
    #[arg(long)]
    no_toc: bool,

    /// Convert the result with this program, e.g. "soffice --headless --convert-to pdf --outdir {outdir} {input}"
    #[arg(long, value_name = "COMMAND", requires = "convert_to")]
    convert_with: Option<String>,

    /// Path of the converted rendition
    #[arg(long, value_name = "FILE")]
    convert_to: Option<PathBuf>,

    /// Write the render report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Analyze { template, json } => cmd_analyze(&template, json),
        Commands::Extract {
            source,
            output,
            summary,
        } => cmd_extract(&source, output.as_deref(), summary),
        Commands::Merge { responses, output } => cmd_merge(&responses, output.as_deref()),
        Commands::Reconstruct(args) => cmd_reconstruct(args),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_analyze(template: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profile = analyze_file(template, &Default::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("{}", "Style DNA".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), template.display());
    print_role("Heading", &profile.heading);
    print_role("Subheading", &profile.subheading);
    print_role("Body", &profile.body);
    print_role("Bullet", &profile.bullet);
    println!();
    print_safe_zone(&profile);
    Ok(())
}

fn print_role(label: &str, role: &retemplate::RoleStyle) {
    let font = &role.font;
    let mut attrs = Vec::new();
    if let Some(name) = &font.font_name {
        attrs.push(name.clone());
    }
    if let Some(size) = font.font_size {
        attrs.push(format!("{}pt", size));
    }
    if font.is_bold() {
        attrs.push("bold".to_string());
    }
    if font.italic == Some(true) {
        attrs.push("italic".to_string());
    }
    if let Some(color) = &font.color {
        attrs.push(format!("#{}", color));
    }
    println!(
        "{}: {} {}",
        label.bold(),
        role.style_name,
        attrs.join(", ").dimmed()
    );
}

fn print_safe_zone(profile: &StyleProfile) {
    match profile.first_content_index {
        Some(index) => println!(
            "{}: paragraphs 0..{} (first heading at {})",
            "Safe zone".bold(),
            profile.safe_zone_end,
            index
        ),
        None => println!(
            "{}: {}",
            "Safe zone".bold(),
            "none (no top-level heading, whole document is replaced)".yellow()
        ),
    }
}

fn cmd_extract(
    source: &Path,
    output: Option<&Path>,
    summary: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = extract_file(source)?;
    let text = if summary {
        content.to_text_summary()
    } else {
        serde_json::to_string_pretty(&content)?
    };
    write_or_print(output, &text)?;
    eprintln!("{} {} blocks", "Extracted".green(), content.len());
    Ok(())
}

fn cmd_merge(responses: &[PathBuf], output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let texts = responses
        .iter()
        .map(|path| {
            fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let sections = merge_responses(&texts)?;

    write_or_print(output, &serde_json::to_string_pretty(&sections)?)?;
    eprintln!(
        "{} {} chunk(s) into {} section(s)",
        "Merged".green(),
        texts.len(),
        sections.len()
    );
    Ok(())
}

fn cmd_reconstruct(args: ReconstructArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = match &args.config {
        Some(path) => ReconstructOptions::from_json_file(path)?,
        None => ReconstructOptions::default(),
    };
    if let Some(size) = args.chunk_size {
        options.mapping.chunk_size = size;
    }
    if let Some(retries) = args.max_retries {
        options.mapping.max_retries = retries;
    }
    if let Some(secs) = args.timeout_secs {
        options.mapping.timeout_secs = secs.max(1);
    }
    if args.sequential {
        options.mapping.parallel = false;
    }
    if let Some(title) = args.title {
        options.render.document_title = Some(title);
    }
    if args.no_cover {
        options.render.update_cover = false;
    }
    if args.no_toc {
        options.render.update_toc = false;
    }

    log::debug!("Reconstruct options: {:?}", options);
    let timeout = options.mapping.timeout();
    let mut builder = Retemplate::new().with_options(options);
    if let Some(line) = &args.mapper {
        builder = builder.with_mapper(CommandMapper::from_command_line(line)?.with_timeout(timeout));
    }
    if let Some(line) = &args.convert_with {
        builder = builder.with_converter(std::sync::Arc::new(converter_for(
            line,
            &args.output,
            args.convert_to.as_deref(),
        )?));
    }

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    let (sections, chunks) = match (&args.sections, &args.source) {
        (Some(path), _) => {
            pb.set_message("Reading sections...");
            let sections: Vec<Section> = serde_json::from_str(&fs::read_to_string(path)?)?;
            pb.inc(2);
            (sections, None)
        }
        (None, Some(source)) => {
            pb.set_message("Extracting source...");
            let content = builder.extract(source)?;
            pb.inc(1);

            pb.set_message(format!("Mapping {} blocks...", content.len()));
            let mapped = builder.map(&content);
            pb.inc(1);
            (
                mapped.sections,
                Some((mapped.chunks_total, mapped.chunks_fallback)),
            )
        }
        (None, None) => return Err("a source document or --sections is required".into()),
    };

    pb.set_message("Rendering template...");
    let mut report = builder.render_sections(&sections, &args.template, &args.output)?;
    if let Some((total, fallback)) = chunks {
        report.chunks_total = total;
        report.chunks_fallback = fallback;
    }
    pb.inc(1);
    pb.finish_with_message("Done!");

    if let Some(target) = &args.convert_to {
        builder.convert(&args.output, target)?;
    }
    if let Some(path) = &args.report {
        fs::write(path, report.to_json()?)?;
    }

    print_report(&report, args.convert_to.as_deref());
    Ok(())
}

fn converter_for(
    line: &str,
    output: &Path,
    target: Option<&Path>,
) -> Result<CommandConverter, Box<dyn std::error::Error>> {
    let ext = |path: &Path| {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| format!("{} has no extension", path.display()))
    };
    let target = target.ok_or("--convert-to is required with --convert-with")?;

    let mut parts = line.split_whitespace();
    let program = parts.next().ok_or("empty converter command")?;
    let args: Vec<&str> = parts.collect();
    let mut converter = CommandConverter::new(program, &ext(output)?, &ext(target)?);
    if !args.is_empty() {
        converter = converter.with_args(args);
    }
    Ok(converter)
}

fn print_report(report: &RenderReport, converted: Option<&Path>) {
    println!("\n{}", "Reconstruction".green().bold());
    if let Some(path) = &report.output_path {
        println!("  {} output: {}", "├─".dimmed(), path.display());
    }
    if let Some(path) = converted {
        println!("  {} converted: {}", "├─".dimmed(), path.display());
    }
    println!(
        "  {} safe zone: {} paragraph(s)",
        "├─".dimmed(),
        report.safe_zone_end
    );
    match report.cover_title_index {
        Some(index) => println!("  {} cover title: paragraph {}", "├─".dimmed(), index),
        None => println!("  {} cover title: {}", "├─".dimmed(), "unchanged".dimmed()),
    }
    println!(
        "  {} table of contents: {}/{} entries",
        "├─".dimmed(),
        report.toc_entries_updated,
        report.toc_entries_found
    );
    println!(
        "  {} sections: {} ({} items, {} duplicates dropped)",
        "├─".dimmed(),
        report.sections_rendered,
        report.items_emitted,
        report.items_deduplicated
    );
    if report.sections_unplaced > 0 {
        println!(
            "  {} {}",
            "├─".dimmed(),
            format!("{} section(s) did not fit", report.sections_unplaced).yellow()
        );
    }
    let chunks = format!(
        "{} chunk(s), {} fallback",
        report.chunks_total, report.chunks_fallback
    );
    if report.chunks_fallback > 0 {
        println!("  {} mapping: {}", "└─".dimmed(), chunks.yellow());
    } else {
        println!("  {} mapping: {}", "└─".dimmed(), chunks);
    }
}

fn write_or_print(output: Option<&Path>, text: &str) -> std::io::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!("{} {}", "Saved to".green(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "retemplate".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Template reconstruction tool");
    println!();
    println!(
        "Repository: {}",
        "https://github.com/iyulab/retemplate".dimmed()
    );
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use retemplate::FormatConverter;

    #[test]
    fn test_converter_for_takes_extensions_from_paths() {
        let converter = converter_for(
            "soffice --headless --convert-to pdf --outdir {outdir} {input}",
            Path::new("out/report.DOCX"),
            Some(Path::new("out/report.pdf")),
        )
        .unwrap();
        assert_eq!(converter.name(), "soffice");
        assert_eq!(converter.source_extension(), "docx");
        assert_eq!(converter.target_extension(), "pdf");
    }

    #[test]
    fn test_converter_for_needs_target_extension() {
        let result = converter_for("cp", Path::new("report.docx"), Some(Path::new("report")));
        assert!(result.is_err());
        assert!(converter_for("", Path::new("a.docx"), Some(Path::new("a.pdf"))).is_err());
    }

    #[test]
    fn test_cli_parses_reconstruct() {
        let cli = Cli::try_parse_from([
            "retemplate",
            "reconstruct",
            "source.docx",
            "-t",
            "template.docx",
            "-o",
            "out.docx",
            "--no-toc",
        ])
        .unwrap();
        match cli.command {
            Commands::Reconstruct(args) => {
                assert_eq!(args.source, Some(PathBuf::from("source.docx")));
                assert!(args.no_toc);
                assert!(!args.no_cover);
            }
            _ => panic!("expected reconstruct"),
        }
    }

    #[test]
    fn test_cli_rejects_source_with_sections() {
        let result = Cli::try_parse_from([
            "retemplate",
            "reconstruct",
            "source.docx",
            "--sections",
            "sections.json",
            "-t",
            "template.docx",
            "-o",
            "out.docx",
        ]);
        assert!(result.is_err());
    }
}
