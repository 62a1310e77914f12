use std::path::PathBuf;

use clap::Parser as _;
use rand::{rngs::StdRng, SeedableRng as _};
use textsynth::augmentation::{random_augment, AugmentationOptions};
use textsynth::generator::generate_batch;
use textsynth::{create_text_image_with_rng, ContextError, TextImageOptions};

#[derive(clap::Parser, Debug)]
#[command(version, long_about = None)]
struct CliArguments {
    /// Log the decisions of the pipeline, `RUST_LOG` still takes precedence.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Render a text into an image and write its layout report next to it.
    Render {
        /// The text to render.
        #[arg(
            short = 't',
            long = "text",
            value_name = "text",
            conflicts_with = "text_file_path",
            required_unless_present = "text_file_path"
        )]
        text: Option<String>,
        /// A file whose whole content is rendered.
        #[arg(long = "text-file", value_name = "text_file")]
        text_file_path: Option<PathBuf>,
        /// A JSON file with the rendering options, missing keys take their defaults.
        #[arg(long = "options", value_name = "json_file")]
        options_path: Option<PathBuf>,
        /// The path of the output PNG file.
        #[arg(short = 'o', long = "output", value_name = "png_file")]
        output_path: PathBuf,
        /// The path of the layout report, by default the output path with a `json` extension.
        #[arg(long = "layout", value_name = "json_file")]
        layout_path: Option<PathBuf>,
        /// Seed of the random generator, for reproducible images.
        #[arg(long = "seed")]
        seed: Option<u64>,
        /// Augment the rendered image with the default augmentation options.
        #[arg(long = "augment")]
        augment: bool,
    },
    /// Generate one randomized, augmented sample per non-empty line of the input file.
    Generate {
        #[arg(short = 'i', long = "input", value_name = "text_file")]
        input_path: PathBuf,
        #[arg(short = 'o', long = "output-directory", value_name = "directory")]
        output_directory: PathBuf,
        #[arg(long = "font", value_name = "ttf_file")]
        font_path: Option<PathBuf>,
        #[arg(long = "seed", default_value_t = 0)]
        seed: u64,
    },
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ContextError> {
    let arguments = CliArguments::parse();
    env_logger::builder()
        .filter_level(match arguments.verbose {
            true => log::LevelFilter::Debug,
            false => log::LevelFilter::Info,
        })
        .parse_default_env()
        .init();
    log::debug!("{:?}", arguments);

    match arguments.command {
        Command::Render {
            text,
            text_file_path,
            options_path,
            output_path,
            layout_path,
            seed,
            augment,
        } => {
            let text = match (text, text_file_path) {
                (Some(text), _) => text,
                (None, Some(text_file_path)) => std::fs::read_to_string(&text_file_path)
                    .map_err(|error| {
                        ContextError::with_error(
                            format!("Unable to read the text file {:?}", text_file_path),
                            &error,
                        )
                    })?,
                (None, None) => {
                    return Err(ContextError::with_context(
                        "No text provided, you need to provide it via the `text` or `text-file` flag",
                    ))
                }
            };
            let options = match options_path {
                Some(options_path) => TextImageOptions::from_path(&options_path)?,
                None => TextImageOptions::default(),
            };
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let (mut image, layout_report) = create_text_image_with_rng(&text, &options, &mut rng);
            if augment {
                let (augmented_image, augmentations) =
                    random_augment(&image, &AugmentationOptions::default(), &mut rng);
                log::info!("Applied the augmentations {:?}", augmentations);
                image = augmented_image;
            }

            image.save(&output_path).map_err(|error| {
                ContextError::with_error(
                    format!("Unable to save the image {:?}", output_path),
                    &error,
                )
            })?;
            let layout_path = layout_path.unwrap_or_else(|| output_path.with_extension("json"));
            layout_report.save(&layout_path)?;
            log::info!(
                "Saved the image to the path {:?} and its layout to the path {:?}",
                output_path,
                layout_path
            );
        }
        Command::Generate {
            input_path,
            output_directory,
            font_path,
            seed,
        } => {
            let input_content = std::fs::read_to_string(&input_path).map_err(|error| {
                ContextError::with_error(
                    format!("Unable to read the input file {:?}", input_path),
                    &error,
                )
            })?;
            let texts = input_content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>();

            let saved_paths =
                generate_batch(&texts, &output_directory, font_path.as_deref(), seed)?;
            log::info!(
                "Generated {} samples into the directory {:?}",
                saved_paths.len(),
                output_directory
            );
        }
    }

    Ok(())
}
