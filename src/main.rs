use clap::{Parser, Subcommand};
use mockcraft::config::{self, MockupConfig};
use mockcraft::export::{ExportFormat, ExportPolicy, Exporter, ImageSurface};
use mockcraft::feedback::{self, Notifier};
use mockcraft::imaging::calculations::calculate_downscale_dimensions;
use mockcraft::imaging::{
    self, Dimensions, EffectSpec, GeometryMode, GeometryRequest, Overlay, RasterImage,
    RustBackend, SourceFormat, ThumbnailConfig, parse_hex_color,
};
use mockcraft::output::{self, ConsoleNotifier, InspectSummary};
use mockcraft::settings::SettingsStore;
use std::path::{Path, PathBuf};

/// Flags shared by every command that reads an upload.
#[derive(clap::Args, Clone)]
struct InputArgs {
    /// Image to read (JPEG, PNG, GIF, WebP or SVG)
    input: PathBuf,

    /// Declared MIME type (guessed from the extension when omitted)
    #[arg(long)]
    mime: Option<String>,
}

/// Where a geometry result is written.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Output file (defaults to `<input stem>-<command>.<ext>` next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "mockcraft")]
#[command(about = "Image geometry and export pipeline for mockups")]
#[command(long_about = "\
Image geometry and export pipeline for mockups

Uploads are validated (10 MB limit; JPEG, PNG, GIF, WebP or SVG), then
downscaled to fit 1920x1080 when either edge exceeds 2000px. The geometry
commands write one transformed image; `export` places the upload on a mockup
stage sized by the auto-fit heuristic and serialises it:

  png    raster at the export scale
  jpeg   raster at the export scale and quality, flattened onto white
  svg    the PNG capture wrapped in an SVG of the same pixel size
  pdf    single page sized to the capture (1px = 0.264583mm), white background
  all    png + svg + pdf, in parallel, each reported on its own

Export scale and quality given on the command line are remembered in the
settings file for later runs.

Run 'mockcraft gen-config' to generate a documented mockcraft.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing mockcraft.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Settings snapshot file
    #[arg(long, default_value = ".mockcraft/settings.json", global = true)]
    settings: PathBuf,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an upload and show its dimensions and suggested mockup size
    Inspect(InputArgs),
    /// Scale an image to fill an exact size, cutting the overflow evenly
    Fit {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        out: OutputArgs,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Colour behind transparent pixels (defaults to fit.background from the config)
        #[arg(long)]
        background: Option<String>,
    },
    /// Center-crop an image to an aspect ratio
    Crop {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        out: OutputArgs,
        /// Width / height, e.g. 1.7778
        #[arg(long, conflicts_with_all = ["width", "height"])]
        ratio: Option<f64>,
        #[arg(long, requires = "height")]
        width: Option<u32>,
        #[arg(long, requires = "width")]
        height: Option<u32>,
    },
    /// Scale an image so its longer side is `size`
    Thumbnail {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        out: OutputArgs,
        /// Longer side in pixels (defaults to thumbnail.size from the config)
        #[arg(long)]
        size: Option<u32>,
    },
    /// Apply brightness, contrast, saturation, blur and a colour overlay
    Effects {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        out: OutputArgs,
        /// Percent, 100 = unchanged
        #[arg(long)]
        brightness: Option<f32>,
        /// Percent, 100 = unchanged
        #[arg(long)]
        contrast: Option<f32>,
        /// Percent, 100 = unchanged
        #[arg(long)]
        saturation: Option<f32>,
        /// Blur radius in pixels
        #[arg(long)]
        blur: Option<f32>,
        /// Overlay colour; enables the overlay
        #[arg(long)]
        overlay_color: Option<String>,
        /// Overlay opacity 0-1; enables the overlay
        #[arg(long)]
        overlay_opacity: Option<f32>,
    },
    /// Export an image as a mockup
    Export {
        #[command(flatten)]
        input: InputArgs,
        /// png, jpeg, svg, pdf or all
        #[arg(long, default_value = "png")]
        format: String,
        /// Directory for exported files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Export at this logical width instead of the auto-fit size
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Export at this logical height instead of the auto-fit size
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Capture magnification, clamped to 1-4
        #[arg(long)]
        scale: Option<f32>,
        /// Lossy quality, clamped to 0.1-1.0
        #[arg(long)]
        quality: Option<f32>,
        /// Print a data: URI instead of writing a file
        #[arg(long, conflicts_with = "clipboard")]
        data_uri: bool,
        /// Copy the PNG capture to the system clipboard
        #[arg(long)]
        clipboard: bool,
    },
    /// Print a stock mockcraft.toml with all options documented
    GenConfig,
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let notifier = ConsoleNotifier { quiet: cli.quiet };

    let config = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        _ => config::load_config(&cli.config_dir)?,
    };
    let imaging_config = config.imaging();
    let backend = RustBackend::with_limits(config.pixel_limits());

    match cli.command {
        Command::GenConfig => {}
        Command::Inspect(input) => {
            let (bytes, mime) = read_upload(&input)?;
            let image = feedback::run_geometry(&notifier, "upload", || {
                imaging::validate_upload(
                    &backend,
                    &bytes,
                    &mime,
                    bytes.len() as u64,
                    &imaging_config.constraints,
                )
            })
            .ok_or("upload rejected")?;

            let downscale = calculate_downscale_dimensions(
                image.dimensions(),
                imaging_config.downscale.threshold,
                (
                    imaging_config.downscale.max_width,
                    imaging_config.downscale.max_height,
                ),
            );
            output::print_inspect(&InspectSummary {
                name: &input.input.display().to_string(),
                image: &image,
                size_bytes: bytes.len() as u64,
                downscale,
                mockup: imaging::auto_fit_mockup_size(&image, &imaging_config.constraints),
            });
        }
        Command::Fit {
            input,
            out,
            width,
            height,
            background,
        } => {
            let mut imaging_config = imaging_config;
            if let Some(hex) = background {
                imaging_config.background =
                    parse_hex_color(&hex).ok_or(format!("'{hex}' is not a hex colour"))?;
            }
            let request = GeometryRequest {
                target_width: width,
                target_height: height,
                mode: GeometryMode::Fit,
                aspect_ratio_override: None,
            };
            let image = load_upload(&backend, &notifier, &input, &config)?;
            let result = feedback::run_geometry(&notifier, "fit", || {
                imaging::transform(&backend, &image, &request, &imaging_config)
            })
            .ok_or("fit failed")?;
            write_result("fit", &input, &out, &result)?;
        }
        Command::Crop {
            input,
            out,
            ratio,
            width,
            height,
        } => {
            let request = match (ratio, width, height) {
                (Some(ratio), _, _) => GeometryRequest {
                    target_width: 0,
                    target_height: 0,
                    mode: GeometryMode::Crop,
                    aspect_ratio_override: Some(ratio),
                },
                (None, Some(w), Some(h)) => GeometryRequest {
                    target_width: w,
                    target_height: h,
                    mode: GeometryMode::Crop,
                    aspect_ratio_override: None,
                },
                _ => return Err("crop needs --ratio or --width and --height".into()),
            };
            let image = load_upload(&backend, &notifier, &input, &config)?;
            let result = feedback::run_geometry(&notifier, "crop", || {
                imaging::transform(&backend, &image, &request, &imaging_config)
            })
            .ok_or("crop failed")?;
            write_result("crop", &input, &out, &result)?;
        }
        Command::Thumbnail { input, out, size } => {
            let thumbnail = ThumbnailConfig {
                max_size: size.unwrap_or(imaging_config.thumbnail.max_size),
                ..imaging_config.thumbnail
            };
            let image = load_upload(&backend, &notifier, &input, &config)?;
            let result = feedback::run_geometry(&notifier, "thumbnail", || {
                imaging::generate_thumbnail(&backend, &image, &thumbnail)
            })
            .ok_or("thumbnail failed")?;
            write_result("thumbnail", &input, &out, &result)?;
        }
        Command::Effects {
            input,
            out,
            brightness,
            contrast,
            saturation,
            blur,
            overlay_color,
            overlay_opacity,
        } => {
            let color = match overlay_color {
                Some(hex) => {
                    Some(parse_hex_color(&hex).ok_or(format!("'{hex}' is not a hex colour"))?)
                }
                None => None,
            };
            let overlay = (color.is_some() || overlay_opacity.is_some())
                .then(|| Overlay::from_parts(color, overlay_opacity));
            let effects = EffectSpec {
                brightness_pct: brightness,
                contrast_pct: contrast,
                saturation_pct: saturation,
                blur_px: blur,
                overlay,
            };
            let image = load_upload(&backend, &notifier, &input, &config)?;
            let result = feedback::run_geometry(&notifier, "effects", || {
                imaging::apply_effects(&backend, &image, &effects)
            })
            .ok_or("effects failed")?;
            write_result("effects", &input, &out, &result)?;
        }
        Command::Export {
            input,
            format,
            out_dir,
            width,
            height,
            scale,
            quality,
            data_uri,
            clipboard,
        } => {
            let store = SettingsStore::new(&cli.settings);
            let mut settings = store.load();
            let mut policy = if store.path().exists() {
                ExportPolicy::from_settings(&settings)
            } else {
                config.export_policy()
            };
            if let Some(scale) = scale {
                policy.set_export_scale(scale);
            }
            if let Some(quality) = quality {
                policy.set_export_quality(quality);
            }
            if scale.is_some() || quality.is_some() {
                settings.export_scale = policy.scale();
                settings.export_quality = policy.quality().value();
                if let Err(e) = store.save(&settings) {
                    log::warn!("Could not save settings to {}: {e}", store.path().display());
                }
            }

            let image = load_upload(&backend, &notifier, &input, &config)?;
            let mockup = imaging::auto_fit_mockup_size(&image, &imaging_config.constraints);
            let surface = ImageSurface::from_raster(&image)?
                .with_size(Dimensions::new(mockup.width, mockup.height));
            let mut exporter = Exporter::new(surface, policy);

            if clipboard {
                exporter = with_system_clipboard(exporter)?;
                feedback::run_export(&notifier, "image", || exporter.export_to_clipboard_image())
                    .ok_or("clipboard export failed")?;
                return Ok(());
            }

            if format.eq_ignore_ascii_case("all") {
                if width.is_some() {
                    return Err("--width/--height cannot be combined with --format all".into());
                }
                let report = {
                    let _loading = feedback::LoadingGuard::new(&notifier, "Exporting all formats...");
                    exporter.export_all()
                };
                for (format, outcome) in report.outcomes() {
                    match outcome {
                        Ok(artifact) if data_uri => println!("{}", artifact.to_data_url()),
                        Ok(artifact) => {
                            let saved = save_artifact(artifact, &out_dir)?;
                            output::print_export(format, Ok(artifact), Some(&saved));
                        }
                        Err(e) => output::print_export(format, Err(e), None),
                    }
                }
                if !feedback::report_export_all(&notifier, &report) {
                    return Err("some formats failed to export".into());
                }
                return Ok(());
            }

            let artifact = feedback::run_export(&notifier, &format, || match (width, height) {
                (Some(w), Some(h)) => exporter.export_custom_size(w, h, &format),
                _ => exporter.export(format.parse()?),
            })
            .ok_or("export failed")?;

            let parsed: ExportFormat = format.parse()?;
            if data_uri {
                println!("{}", artifact.to_data_url());
            } else {
                let saved = save_artifact(&artifact, &out_dir)?;
                output::print_export(parsed, Ok(&artifact), Some(&saved));
            }
        }
    }

    Ok(())
}

/// Read an upload and work out its declared MIME type.
fn read_upload(input: &InputArgs) -> CliResult<(Vec<u8>, String)> {
    let bytes = std::fs::read(&input.input)?;
    let mime = match &input.mime {
        Some(mime) => mime.clone(),
        None => input
            .input
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(SourceFormat::from_extension)
            .map(|f| f.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    };
    Ok((bytes, mime))
}

/// Validate and downscale an upload, reporting failures to the user.
fn load_upload(
    backend: &RustBackend,
    notifier: &dyn Notifier,
    input: &InputArgs,
    config: &MockupConfig,
) -> CliResult<RasterImage> {
    let (bytes, mime) = read_upload(input)?;
    let imaging_config = config.imaging();
    let image = feedback::run_geometry(notifier, "upload", || {
        imaging::process_upload(backend, &bytes, &mime, bytes.len() as u64, &imaging_config)
    })
    .ok_or("upload rejected")?;
    Ok(image)
}

fn write_result(
    command: &str,
    input: &InputArgs,
    out: &OutputArgs,
    image: &RasterImage,
) -> CliResult<()> {
    let path = match &out.output {
        Some(path) => path.clone(),
        None => default_output_path(&input.input, command, image.format().extension()),
    };
    std::fs::write(&path, image.bytes())?;
    output::print_transform(command, image, &path);
    Ok(())
}

fn default_output_path(input: &Path, command: &str, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}-{command}.{ext}"))
}

fn save_artifact(artifact: &mockcraft::export::ExportArtifact, dir: &Path) -> CliResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    Ok(artifact.save_in(dir)?)
}

#[cfg(feature = "clipboard")]
fn with_system_clipboard(
    exporter: Exporter<ImageSurface>,
) -> CliResult<Exporter<ImageSurface>> {
    Ok(exporter.with_clipboard(Box::new(mockcraft::export::clipboard::SystemClipboard)))
}

#[cfg(not(feature = "clipboard"))]
fn with_system_clipboard(
    _exporter: Exporter<ImageSurface>,
) -> CliResult<Exporter<ImageSurface>> {
    Err("this build of mockcraft has no clipboard support".into())
}
