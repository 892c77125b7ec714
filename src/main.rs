use adaptive_noise_canceller::audio_processor::{load_wav, save_wav};
use adaptive_noise_canceller::{
    process_in_background, AudioBuffer, BufferProcessor, Classification, FilterParams,
    NoiseClassifier, Result,
};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "anc", about = "Adaptive LMS noise cancellation for WAV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the dominant noise type and print the scores as JSON
    Classify {
        input: PathBuf,
        /// Seed for the score jitter (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Cancel noise in a WAV file and write the result as 32-bit float WAV
    Process {
        input: PathBuf,
        output: PathBuf,
        /// Noise type label; classified from the input when omitted
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
        /// Override the LMS step size (requires --filter-length)
        #[arg(long, requires = "filter_length")]
        step_size: Option<f32>,
        /// Override the number of filter taps (requires --step-size)
        #[arg(long, requires = "step_size")]
        filter_length: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Commands::Classify { input, seed } => {
            let classification = classify_file(&input, seed)?;
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        Commands::Process {
            input,
            output,
            label,
            seed,
            step_size,
            filter_length,
        } => {
            let overrides = step_size
                .zip(filter_length)
                .map(|(mu, taps)| FilterParams::new(mu, taps));
            process_file(&input, &output, label, seed, overrides).await?;
        }
    }

    Ok(())
}

fn classifier(seed: Option<u64>) -> NoiseClassifier {
    match seed {
        Some(seed) => NoiseClassifier::with_seed(seed),
        None => NoiseClassifier::new(),
    }
}

fn detect(buffer: &AudioBuffer, seed: Option<u64>) -> Classification {
    let classification = classifier(seed).classify_buffer(buffer);
    info!(
        "Detected {} ({:.0}% confidence)",
        classification.label,
        classification.confidence() * 100.0
    );
    classification
}

fn classify_file(input: &Path, seed: Option<u64>) -> Result<Classification> {
    let buffer = load_wav(input)?;
    Ok(detect(&buffer, seed))
}

async fn process_file(
    input: &Path,
    output: &Path,
    label: Option<String>,
    seed: Option<u64>,
    overrides: Option<FilterParams>,
) -> Result<()> {
    let buffer = load_wav(input)?;

    let processed = match overrides {
        Some(params) => {
            info!("Using explicit filter parameters {:?}", params);
            tokio::task::spawn_blocking(move || {
                BufferProcessor::new().process_with_params(&buffer, params)
            })
            .await?
        }
        None => {
            let label = match label {
                Some(label) => label,
                None => detect(&buffer, seed).label.label().to_string(),
            };
            process_in_background(buffer, label).await?
        }
    };

    save_wav(output, &processed)?;
    println!(
        "Processed {} channel(s), {:.2} seconds -> {}",
        processed.channel_count(),
        processed.duration_secs(),
        output.display()
    );

    Ok(())
}
