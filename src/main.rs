use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use hoax_detector::{
    classification::{LabelPolicy, ModelArtifacts, NgramRange, TextNormalizer, TitleLabeler},
    config::Config,
    corpus::CorpusAssembler,
    observability,
    pipeline::{
        CorpusAccuracy, CorpusNormalizer, InferenceEngine, Verdict, train::train_from_corpus,
    },
};

#[derive(Parser)]
#[command(
    name = "hoax-detector",
    version,
    about = "Classify Indonesian news excerpts as HOAX or VALID"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize every raw CSV in the raw directory into the cleaned corpus directory
    Normalize,
    /// Train Naive Bayes and Random Forest models from the cleaned corpus
    Train(TrainArgs),
    /// Classify a text, or read texts interactively from stdin when none is given
    Predict(PredictArgs),
}

#[derive(Parser)]
struct TrainArgs {
    /// Inclusive n-gram range for TF-IDF features (overrides HOAX_NGRAM_RANGE)
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"])]
    ngram: Option<Vec<usize>>,
}

#[derive(Parser)]
struct PredictArgs {
    /// Text to classify; multiple words are joined with spaces
    text: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    observability::init(config.log_format()).context("failed to initialize tracing")?;

    match cli.command {
        Command::Normalize => normalize(&config),
        Command::Train(args) => train(config, args),
        Command::Predict(args) => predict(&config, &args),
    }
}

fn labeler(config: &Config) -> Result<TitleLabeler> {
    TitleLabeler::new(LabelPolicy {
        trusted_source_is_valid: config.kompas_default_valid(),
    })
    .context("failed to build title labeler")
}

fn normalize(config: &Config) -> Result<()> {
    let summary = CorpusNormalizer::new(TextNormalizer::indonesian(), config.normalize_workers())
        .run(config.raw_dir(), config.clean_dir())?;
    info!(
        files = summary.files.len(),
        articles = summary.articles,
        clean_dir = %config.clean_dir().display(),
        "normalization finished"
    );
    Ok(())
}

fn train(config: Config, args: TrainArgs) -> Result<()> {
    let config = match args.ngram.as_deref() {
        Some(&[low, high]) => config.with_ngram_range(NgramRange::new(low, high)?),
        Some(other) => bail!("--ngram expects two values, got {}", other.len()),
        None => config,
    };
    info!(ngram_range = %config.ngram_range(), "training models");

    let outcome = train_from_corpus(&config)?;
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "Class distribution: {} (train {}, test {})",
        outcome.distribution, outcome.train_size, outcome.test_size
    )?;
    for (name, report) in [
        ("Naive Bayes", &outcome.naive_bayes),
        ("Random Forest", &outcome.random_forest),
    ] {
        writeln!(out, "\n{name}\naccuracy: {:.3}\n{report}", report.accuracy)?;
    }
    writeln!(out, "Models saved to {}", config.model_dir().display())?;
    Ok(())
}

fn predict(config: &Config, args: &PredictArgs) -> Result<()> {
    let engine = InferenceEngine::load(
        &ModelArtifacts::new(config.model_dir()),
        TextNormalizer::indonesian(),
    )?;
    let assembler = CorpusAssembler::new(labeler(config)?);
    let accuracy = engine
        .corpus_accuracy(config.clean_dir(), &assembler)
        .unwrap_or_else(|error| {
            warn!(%error, "corpus accuracy unavailable");
            CorpusAccuracy::default()
        });

    let mut out = io::stdout().lock();
    if !args.text.is_empty() {
        let text = args.text.join(" ");
        return render(&mut out, &text, &engine.predict(&text), accuracy);
    }

    writeln!(out, "Interactive mode: enter an empty line to quit.")?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        write!(out, "» ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let text = line.context("failed to read from stdin")?;
        let text = text.trim();
        if text.is_empty() {
            break;
        }
        render(&mut out, text, &engine.predict(text), accuracy)?;
    }
    Ok(())
}

fn render(
    out: &mut impl Write,
    text: &str,
    verdict: &Verdict,
    accuracy: CorpusAccuracy,
) -> Result<()> {
    writeln!(out, "\nText            : {text}")?;
    writeln!(
        out,
        "Naive Bayes     : {} (HOAX probability {:.1}%)",
        verdict.naive_bayes_label, verdict.naive_bayes_probability
    )?;
    writeln!(
        out,
        "Random Forest   : {} (HOAX probability {:.1}%)",
        verdict.random_forest_label, verdict.random_forest_probability
    )?;
    writeln!(
        out,
        "Final prediction: {} (HOAX probability {:.1}%, {})",
        verdict.final_label, verdict.final_probability, verdict.decided_by
    )?;
    if let CorpusAccuracy {
        naive_bayes: Some(naive_bayes),
        random_forest: Some(random_forest),
    } = accuracy
    {
        writeln!(
            out,
            "Corpus accuracy : Naive Bayes {naive_bayes:.3}   Random Forest {random_forest:.3}"
        )?;
    }
    Ok(())
}
