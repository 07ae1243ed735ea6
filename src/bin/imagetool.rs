//! # Offline Image Tool
//!
//! Runs the transforms on local files without the HTTP server or the store.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin imagetool -- overlay photo.jpg out.png --text "draft"
//! cargo run --bin imagetool -- watermark photo.jpg out.png --mark assets/watermark.png
//! cargo run --bin imagetool -- hide photo.png out.png --text "username:alice"
//! cargo run --bin imagetool -- reveal out.png
//! cargo run --bin imagetool -- sniff out.png
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use image::DynamicImage;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use watermark_studio::common::logging::init_logger;
use watermark_studio::pixels;
use watermark_studio::processing::{overlay, steganography, watermark, OverlayFont};
use watermark_studio::store::sniff_mime;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw centered translucent text on an image
    Overlay {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value = "watermark-studio")]
        text: String,
        #[arg(long, default_value = "assets/fonts/DejaVuSans-Bold.ttf")]
        font: PathBuf,
        #[arg(long, default_value_t = 24.0)]
        font_size: f32,
    },
    /// Blend a watermark image onto an image
    Watermark {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value = "assets/watermark.png")]
        mark: PathBuf,
    },
    /// Hide text in the red-channel LSBs (output is always PNG)
    Hide {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long)]
        text: String,
    },
    /// Print the text hidden in an image
    Reveal { input: PathBuf },
    /// Print the MIME type detected from a file's magic bytes
    Sniff { input: PathBuf },
}

fn read_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(pixels::decode(&data)?.image)
}

fn write_png(path: &Path, image: &DynamicImage) -> anyhow::Result<()> {
    let data = pixels::encode_png(image)?;
    fs::write(path, &data).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("💾 Wrote {} ({} bytes)", path.display(), data.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logger();

    match Args::parse().command {
        Command::Overlay {
            input,
            output,
            text,
            font,
            font_size,
        } => {
            let font = OverlayFont::load(&font, font_size)?;
            let result = overlay(&read_image(&input)?, &font, &text);
            write_png(&output, &DynamicImage::ImageRgba8(result))?;
        }
        Command::Watermark {
            input,
            output,
            mark,
        } => {
            let result = watermark(&read_image(&input)?, &read_image(&mark)?);
            write_png(&output, &DynamicImage::ImageRgba8(result))?;
        }
        Command::Hide {
            input,
            output,
            text,
        } => {
            let image = read_image(&input)?;
            let result = steganography::encode(text.as_str(), &image)?;
            info!(
                "🔒 Hid {} bytes of text ({} bits available)",
                text.len(),
                steganography::capacity_bits(&image)
            );
            write_png(&output, &DynamicImage::ImageRgb8(result))?;
        }
        Command::Reveal { input } => {
            let text: String = steganography::decode(&read_image(&input)?)?;
            println!("{}", text);
        }
        Command::Sniff { input } => {
            let data =
                fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            println!("{}", sniff_mime(&data));
        }
    }

    Ok(())
}
