//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::config::Resources;
use crate::features::FeatureSet;
use crate::matcher::{MatchKind, MatchOption};
use crate::text::tokenize;

use super::args::Commands;

/// Execute a CLI command
pub fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Encode {
            config,
            encoding,
            text,
        } => cmd_encode(&config, &encoding, &text),
        Commands::Match {
            config,
            file,
            phones,
            text,
        } => cmd_match(&config, file, phones, &text),
        Commands::Check { config } => cmd_check(&config),
        Commands::Features { config, features } => cmd_features(&config, &features),
    }
}

fn load_resources(path: &Path) -> Result<Resources> {
    let resources = Resources::from_path(path)
        .with_context(|| format!("loading configuration {}", path.display()))?;

    let problems = resources.errors().len();
    if problems > 0 {
        eprintln!(
            "{} {} configuration problem(s); run `phonmatch check` for details",
            "Warning:".yellow().bold(),
            problems
        );
    }
    Ok(resources)
}

fn format_phone(features: &FeatureSet, phone: &[f64]) -> String {
    format!("[{}]", features.feature_spec(phone).join(" "))
}

fn cmd_encode(config: &Path, encoding: &str, text: &[String]) -> Result<()> {
    let resources = load_resources(config)?;
    let Some(encoder) = resources.encoder(encoding) else {
        bail!("unknown encoding '{}'", encoding);
    };

    for source in text {
        let result = encoder.text_and_phones(source);
        println!("{} → {}", source.bold(), result.text.green());
        if !result.repr.is_empty() {
            println!("   repr: {}", result.repr.cyan());
        }
        for (i, phone) in result.phones.iter().enumerate() {
            println!("   {}. {}", i + 1, format_phone(encoder.features(), phone));
        }
    }

    Ok(())
}

fn cmd_match(config: &Path, file: Option<PathBuf>, show_phones: bool, text: &[String]) -> Result<()> {
    let resources = load_resources(config)?;
    let Some(encoder) = resources.input_encoder() else {
        bail!("no usable 'input' encoding configured");
    };
    let Some(mut matcher) = resources.matcher() else {
        bail!("no 'matcher' configured");
    };

    let mut lines: Vec<String> = Vec::new();
    if let Some(path) = file {
        let reader = std::io::BufReader::new(
            std::fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?,
        );
        for line in reader.lines() {
            lines.push(line.with_context(|| format!("reading {}", path.display()))?);
        }
    }
    lines.extend(text.iter().cloned());

    if lines.is_empty() {
        bail!("nothing to match; give text or --file");
    }

    for line in &lines {
        for token in tokenize(line, resources.delimiters()) {
            let result = encoder.text_and_phones(token);
            println!("{} → {}", token.bold(), result.text);

            if show_phones {
                for phone in &result.phones {
                    println!("      {}", format_phone(encoder.features(), phone).dimmed());
                }
            }

            let options = matcher.match_token(token, &result.phones);
            if options.is_empty() {
                println!("   {}", "No matches found".yellow());
            }
            for (i, option) in options.iter().enumerate() {
                print_option(i + 1, option);
            }
        }
    }

    Ok(())
}

fn print_option(rank: usize, option: &MatchOption) {
    let source = match &option.kind {
        MatchKind::Lexicon(name) => name.normal(),
        MatchKind::Hypothesis(name) => format!("{} (hypothesis)", name).magenta(),
    };
    let distance = option
        .distance
        .map(|d| format!(" (d={:.3})", d))
        .unwrap_or_default();

    println!("   {}. {}{} [{}]", rank, option.text().green(), distance, source);
    if option.entry.text != option.entry.lemma {
        println!("      {}", option.entry.text);
    }
    if let Some(definition) = &option.entry.definition {
        for line in definition.lines() {
            println!("      {}", line.dimmed());
        }
    }
}

fn cmd_check(config: &Path) -> Result<()> {
    let resources = Resources::from_path(config)
        .with_context(|| format!("loading configuration {}", config.display()))?;

    println!("{}", "Configuration".bold());
    println!("   feature sets: {}", resources.feature_sets().len());
    println!("   encodings:    {}", resources.encoders().len());
    println!("   lexicons:     {}", resources.lexicons().len());
    for lexicon in resources.lexicons() {
        println!("      {}: {} entries", lexicon.name(), lexicon.len());
    }
    println!("   hypotheses:   {}", resources.hypotheses().len());
    println!();

    let errors = resources.all_errors();
    if errors.is_empty() {
        println!("{}", "No problems found".green());
        return Ok(());
    }

    for error in &errors {
        println!("   {} {}", "•".red(), error);
    }
    println!();
    bail!("{} problem(s) found", errors.len())
}

fn cmd_features(config: &Path, id: &str) -> Result<()> {
    let resources = load_resources(config)?;
    let Some(features) = resources.feature_set(id) else {
        bail!("unknown feature set '{}'", id);
    };

    println!(
        "{} ({} dimensions; +{} -{} unset {})",
        features.name().bold(),
        features.num_dimensions(),
        features.plus_value(),
        features.minus_value(),
        features.unset_value()
    );
    for (i, (name, group)) in features
        .dimension_names()
        .zip(features.groups())
        .enumerate()
    {
        println!("   {:>3}. {} {}", i, name.green(), format!("({})", group).dimmed());
    }

    Ok(())
}
