//! spam-sieve CLI: train, evaluate, and run a Naive Bayes SMS spam filter.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use spam_sieve::api::{PredictRequest, predict_batch};
use spam_sieve::config::SieveConfig;
use spam_sieve::corpus::{CorpusStats, read_corpus};
use spam_sieve::pipeline::{self, Artifacts};

#[derive(Parser)]
#[command(name = "spam-sieve", version, about = "Naive Bayes SMS spam filter")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the model and held-out test set (overrides the config).
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print class balance, message lengths, and frequent tokens of a corpus.
    Stats {
        /// Two-column CSV corpus (label,text) with a header row.
        corpus: PathBuf,

        /// Tokens listed per class.
        #[arg(long, default_value = "10")]
        top: usize,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Split the corpus, select alpha by cross-validation, and save the model.
    Train {
        /// Two-column CSV corpus (label,text) with a header row.
        corpus: PathBuf,

        /// Seed for reproducible splits and folds.
        #[arg(long)]
        seed: Option<u64>,

        /// Share of each class held out for testing.
        #[arg(long)]
        test_fraction: Option<f64>,

        /// Candidate smoothing strengths (comma-separated, e.g. "0.1,0.5,1.0").
        #[arg(long, value_delimiter = ',')]
        alphas: Option<Vec<f64>>,

        /// Number of cross-validation folds.
        #[arg(long)]
        folds: Option<usize>,

        /// Evaluate folds on the current thread only.
        #[arg(long)]
        sequential: bool,
    },

    /// Score the saved model on the saved held-out test set.
    Evaluate {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Classify messages with the saved model.
    Predict {
        /// Messages to classify.
        messages: Vec<String>,

        /// JSON request body `{"messages": [...]}` to read instead.
        #[arg(long, conflicts_with = "messages")]
        input: Option<PathBuf>,
    },

    /// Print the default configuration as TOML, or write it to a file.
    Config {
        /// Write to this path instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SieveConfig::load(path)?,
        None => SieveConfig::default(),
    };
    if let Some(dir) = cli.models_dir {
        config.models_dir = dir;
    }

    match cli.command {
        Commands::Stats { corpus, top, json } => {
            let documents = read_corpus(&corpus)?;
            let stats = CorpusStats::compute(&documents, top);
            if json {
                let json = serde_json::to_string_pretty(&stats).into_diagnostic()?;
                println!("{json}");
            } else {
                print_stats(&stats);
            }
        }

        Commands::Train {
            corpus,
            seed,
            test_fraction,
            alphas,
            folds,
            sequential,
        } => {
            if let Some(seed) = seed {
                config.seed = Some(seed);
            }
            if let Some(fraction) = test_fraction {
                config.split.test_fraction = fraction;
            }
            if let Some(alphas) = alphas {
                config.search.alphas = alphas;
            }
            if let Some(folds) = folds {
                config.search.folds = folds;
            }
            if sequential {
                config.search.parallel = false;
            }

            let documents = read_corpus(&corpus)?;
            let mut sampler = config.sampler();
            let report = pipeline::train_and_save(&documents, &config, &mut sampler)?;

            println!("Train set:  {} messages", report.train_size);
            println!("Test set:   {} messages", report.test_size);
            println!("Cross-validation (mean spam F1 over {} folds):", config.search.folds);
            for candidate in &report.search.candidates {
                println!("  alpha = {:<6} F1 = {:.4}", candidate.alpha, candidate.mean_f1);
            }
            println!("Selected alpha: {}", report.alpha());
            println!("Vocabulary:     {} tokens", report.vocabulary);
            println!("Artifacts written to {}", config.models_dir.display());
        }

        Commands::Evaluate { json } => {
            let report = pipeline::evaluate_saved(&config.models_dir)?;
            if json {
                let json = serde_json::to_string_pretty(&report).into_diagnostic()?;
                println!("{json}");
            } else {
                print_evaluation(&report);
            }
        }

        Commands::Predict { messages, input } => {
            let request = match input {
                Some(path) => read_request(&path)?,
                None => PredictRequest::new(messages)?,
            };
            let model = spam_sieve::model::load_file(&Artifacts::in_dir(&config.models_dir).model)?;
            let results = predict_batch(&model, &request);
            let json = serde_json::to_string_pretty(&results).into_diagnostic()?;
            println!("{json}");
        }

        Commands::Config { output } => {
            let defaults = SieveConfig::default();
            match output {
                Some(path) => {
                    defaults.save(&path)?;
                    println!("Wrote default config to {}", path.display());
                }
                None => {
                    let toml = defaults.to_toml().map_err(|m| miette::miette!("{m}"))?;
                    print!("{toml}");
                }
            }
        }
    }

    Ok(())
}

fn read_request(path: &Path) -> Result<PredictRequest> {
    let content = std::fs::read_to_string(path).into_diagnostic()?;
    let value: serde_json::Value = serde_json::from_str(&content).into_diagnostic()?;
    Ok(PredictRequest::from_json(&value)?)
}

fn print_stats(stats: &CorpusStats) {
    println!("Total messages: {}", stats.total);
    println!("Class balance:");
    println!("  Ham:  {} ({:.2}%)", stats.counts.ham, stats.percentages.ham);
    println!("  Spam: {} ({:.2}%)", stats.counts.spam, stats.percentages.spam);
    println!("Average length: {:.2} characters", stats.average_length);
    println!("  Ham:  {:.2}", stats.class_average_length.ham);
    println!("  Spam: {:.2}", stats.class_average_length.spam);
    for (label, tokens) in stats.top_tokens.iter() {
        let listed: Vec<String> = tokens.iter().map(|(t, n)| format!("{t} ({n})")).collect();
        println!("Top {label} tokens: {}", listed.join(", "));
    }
}

fn print_evaluation(report: &pipeline::EvaluationReport) {
    let m = &report.metrics;
    println!("Classifier: {}", report.classifier);
    println!("  Accuracy:  {:.4}", m.accuracy);
    println!("  Precision: {:.4}", m.precision);
    println!("  Recall:    {:.4}", m.recall);
    println!("  F1:        {:.4}", m.f1);
    println!("Confusion (spam positive):");
    println!(
        "  TP {}  FP {}  FN {}  TN {}",
        m.confusion.true_positives,
        m.confusion.false_positives,
        m.confusion.false_negatives,
        m.confusion.true_negatives
    );
    if !report.misclassified.is_empty() {
        println!("Misclassified (first {}):", report.misclassified.len());
        for miss in &report.misclassified {
            println!(
                "  #{:<5} predicted {:<4} actual {}",
                miss.index,
                miss.predicted.as_str(),
                miss.actual
            );
        }
    }
    if !report.top_spam_tokens.is_empty() {
        println!("Most spam-indicative tokens:");
        for (token, margin) in &report.top_spam_tokens {
            println!("  {token:<15} {margin:+.3}");
        }
    }
}
