use std::path::PathBuf;

use argh::FromArgs;

use tps_image::{ControlPoint, ControlPointSet, Image, ImageSize};
use tps_spline::{cross_validate, DEFAULT_THRESHOLD};

#[derive(FromArgs)]
/// Cross-validate the sequential and parallel TPS evaluation backends.
struct Args {
    /// path to the input image; a synthetic gradient is used when omitted
    #[argh(option)]
    image_path: Option<PathBuf>,

    /// number of control points sampled along each axis
    #[argh(option, default = "3")]
    grid: usize,

    /// pass threshold for the normalized L1 error
    #[argh(option, default = "DEFAULT_THRESHOLD")]
    threshold: f32,
}

/// Round `x` up to the next multiple of 32, the row alignment used for
/// the strided image buffer.
fn align_up(x: usize) -> usize {
    (x + 31) & !31
}

/// Decode an image file to a single channel f32 buffer in `[0, 1]` with
/// an aligned row stride.
fn load_image(path: &PathBuf) -> Result<Image, Box<dyn std::error::Error>> {
    let gray = image::open(path)?.to_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    let stride = align_up(width);

    let mut data = vec![0f32; stride * height];
    for y in 0..height {
        for x in 0..width {
            data[x + y * stride] = gray.get_pixel(x as u32, y as u32).0[0] as f32 / 255.0;
        }
    }

    Ok(Image::with_stride(ImageSize { width, height }, stride, data)?)
}

/// A smooth synthetic gradient, for running the demo without an input file.
fn synthetic_image() -> Result<Image, Box<dyn std::error::Error>> {
    let size = ImageSize {
        width: 64,
        height: 64,
    };
    let stride = align_up(size.width);
    let mut data = vec![0f32; stride * size.height];
    for y in 0..size.height {
        for x in 0..size.width {
            data[x + y * stride] =
                (x as f32 / size.width as f32 + y as f32 / size.height as f32) / 2.0;
        }
    }
    Ok(Image::with_stride(size, stride, data)?)
}

/// Sample an evenly spaced grid of control points, taking each point's
/// value from the image.
fn sample_control_points(
    image: &Image,
    per_axis: usize,
) -> Result<ControlPointSet, Box<dyn std::error::Error>> {
    let size = image.size();
    let mut points = Vec::new();
    for gy in 0..per_axis {
        for gx in 0..per_axis {
            let x = (gx * size.width + size.width / 2) / per_axis;
            let y = (gy * size.height + size.height / 2) / per_axis;
            let value = image.get(x, y).ok_or("control point out of bounds")?;
            points.push(ControlPoint {
                x: x as f32,
                y: y as f32,
                value,
            });
        }
    }
    Ok(ControlPointSet::new(points, size)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let image = match &args.image_path {
        Some(path) => {
            log::info!("loading {}", path.display());
            load_image(path)?
        }
        None => synthetic_image()?,
    };
    println!(
        "image: {} (stride {})",
        image.size(),
        image.stride()
    );

    let control_points = sample_control_points(&image, args.grid)?;
    println!("control points: {}", control_points.len());

    let report = cross_validate(&image, &control_points, args.threshold)?;

    println!("diverging entries : {}", report.num_diverging);
    println!("max divergence    : {}", report.max_divergence);
    println!("gold non-finite   : {}", report.gold_non_finite);
    println!("cand non-finite   : {}", report.candidate_non_finite);
    println!("L1 error          : {:.6}", report.l1_error);
    println!("verdict           : {}", if report.pass { "PASS" } else { "FAIL" });

    std::process::exit(if report.pass { 0 } else { 1 });
}
